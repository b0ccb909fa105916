use std::collections::BTreeMap;

use tokio::sync::RwLock;

use reqtrack_core::domain::requisition::{NewRequisition, Requisition, RequisitionId};

use super::{RepositoryError, RequisitionRepository};

#[derive(Default)]
struct MemoryState {
    last_id: i64,
    rows: BTreeMap<RequisitionId, Requisition>,
}

#[derive(Default)]
pub struct InMemoryRequisitionRepository {
    state: RwLock<MemoryState>,
}

#[async_trait::async_trait]
impl RequisitionRepository for InMemoryRequisitionRepository {
    async fn insert(&self, requisition: NewRequisition) -> Result<Requisition, RepositoryError> {
        let mut state = self.state.write().await;
        state.last_id += 1;
        let stored = requisition.into_requisition(RequisitionId(state.last_id));
        state.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(
        &self,
        id: RequisitionId,
    ) -> Result<Option<Requisition>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.rows.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Requisition>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.rows.values().cloned().collect())
    }

    async fn update(&self, requisition: &Requisition) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        match state.rows.get_mut(&requisition.id) {
            Some(existing) => {
                *existing = requisition.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(requisition.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use reqtrack_core::domain::requisition::{
        NewRequisition, RequisitionId, RequisitionStatus,
    };

    use crate::repositories::{InMemoryRequisitionRepository, RepositoryError, RequisitionRepository};

    fn new_requisition(item_name: &str) -> NewRequisition {
        NewRequisition {
            item_name: item_name.to_string(),
            quantity: 1,
            justification: "Replacement".to_string(),
            requester_name: "Alice".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids_and_lists_in_order() {
        let repo = InMemoryRequisitionRepository::default();

        let first = repo.insert(new_requisition("Laptop")).await.expect("insert 1");
        let second = repo.insert(new_requisition("Monitor")).await.expect("insert 2");

        assert_eq!(first.id, RequisitionId(1));
        assert_eq!(second.id, RequisitionId(2));
        assert_eq!(first.status, RequisitionStatus::PendingApproval);

        let all = repo.list_all().await.expect("list");
        let names: Vec<_> = all.iter().map(|r| r.item_name.as_str()).collect();
        assert_eq!(names, ["Laptop", "Monitor"]);
    }

    #[tokio::test]
    async fn update_replaces_stored_record() {
        let repo = InMemoryRequisitionRepository::default();
        let mut stored = repo.insert(new_requisition("Laptop")).await.expect("insert");

        stored.approve("Bob", Utc::now()).expect("approve");
        repo.update(&stored).await.expect("update");

        let found = repo.find_by_id(stored.id).await.expect("find");
        assert_eq!(found, Some(stored));
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let repo = InMemoryRequisitionRepository::default();
        let ghost = new_requisition("Laptop").into_requisition(RequisitionId(99));

        let error = repo.update(&ghost).await.expect_err("unknown id");

        assert!(matches!(error, RepositoryError::NotFound(RequisitionId(99))));
        assert!(repo.list_all().await.expect("list").is_empty());
    }
}
