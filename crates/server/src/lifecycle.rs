use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use reqtrack_core::domain::requisition::{Requisition, RequisitionDraft, RequisitionId};
use reqtrack_core::errors::{ApplicationError, DomainError};
use reqtrack_db::RequisitionRepository;

/// Validates submissions and applies the approval transition against a
/// requisition store.
pub struct RequisitionLifecycle {
    repository: Arc<dyn RequisitionRepository>,
    default_approver: String,
    // Held across the read-check-write of an approval.
    approval_lock: Mutex<()>,
}

impl RequisitionLifecycle {
    pub fn new(
        repository: Arc<dyn RequisitionRepository>,
        default_approver: impl Into<String>,
    ) -> Self {
        Self { repository, default_approver: default_approver.into(), approval_lock: Mutex::new(()) }
    }

    pub fn default_approver(&self) -> &str {
        &self.default_approver
    }

    pub async fn create(&self, draft: RequisitionDraft) -> Result<Requisition, ApplicationError> {
        let new_requisition = match draft.validate(Utc::now()) {
            Ok(new_requisition) => new_requisition,
            Err(error) => {
                warn!(
                    event_name = "requisition.rejected_input",
                    reason = %error,
                    "requisition submission failed validation"
                );
                return Err(error.into());
            }
        };

        let stored = self.repository.insert(new_requisition).await?;

        info!(
            event_name = "requisition.created",
            requisition_id = %stored.id,
            requester_name = %stored.requester_name,
            item_name = %stored.item_name,
            quantity = stored.quantity,
            "requisition submitted"
        );

        Ok(stored)
    }

    pub async fn list(&self) -> Result<Vec<Requisition>, ApplicationError> {
        Ok(self.repository.list_all().await?)
    }

    pub async fn get(&self, id: RequisitionId) -> Result<Requisition, ApplicationError> {
        self.repository.find_by_id(id).await?.ok_or(ApplicationError::NotFound(id))
    }

    /// Approves a pending requisition. A missing or empty approver name falls
    /// back to the configured default.
    pub async fn approve(
        &self,
        id: RequisitionId,
        approver_name: Option<String>,
    ) -> Result<Requisition, ApplicationError> {
        let approver = approver_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.default_approver.clone());

        let _guard = self.approval_lock.lock().await;
        let mut requisition = self.get(id).await?;

        if let Err(error) = requisition.approve(approver, Utc::now()) {
            if let DomainError::AlreadyDecided { status } = &error {
                warn!(
                    event_name = "requisition.approve_conflict",
                    requisition_id = %id,
                    status = %status,
                    "approval attempted on a requisition that is no longer pending"
                );
            }
            return Err(error.into());
        }

        self.repository.update(&requisition).await?;

        info!(
            event_name = "requisition.approved",
            requisition_id = %requisition.id,
            approved_by = requisition.approved_by.as_deref().unwrap_or_default(),
            "requisition approved"
        );

        Ok(requisition)
    }
}
