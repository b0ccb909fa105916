use async_trait::async_trait;
use thiserror::Error;

use reqtrack_core::domain::requisition::{NewRequisition, Requisition, RequisitionId};
use reqtrack_core::errors::ApplicationError;

pub mod memory;
pub mod requisition;

pub use memory::InMemoryRequisitionRepository;
pub use requisition::SqlRequisitionRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("requisition {0} does not exist")]
    NotFound(RequisitionId),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound(id) => ApplicationError::NotFound(id),
            other => ApplicationError::Persistence(other.to_string()),
        }
    }
}

/// Persistence contract for requisitions. Implementations assign identifiers
/// on insert and never reuse them.
#[async_trait]
pub trait RequisitionRepository: Send + Sync {
    async fn insert(&self, requisition: NewRequisition) -> Result<Requisition, RepositoryError>;

    async fn find_by_id(&self, id: RequisitionId)
        -> Result<Option<Requisition>, RepositoryError>;

    /// All requisitions in insertion order.
    async fn list_all(&self) -> Result<Vec<Requisition>, RepositoryError>;

    async fn update(&self, requisition: &Requisition) -> Result<(), RepositoryError>;
}
