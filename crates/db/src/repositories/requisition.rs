use chrono::{DateTime, Utc};
use sqlx::Row;

use reqtrack_core::domain::requisition::{
    NewRequisition, Requisition, RequisitionId, RequisitionStatus,
};

use super::{RepositoryError, RequisitionRepository};
use crate::DbPool;

const SELECT_COLUMNS: &str = "SELECT id, item_name, quantity, justification, requester_name,
        status, created_at, approved_by, approved_at
 FROM requisition";

pub struct SqlRequisitionRepository {
    pool: DbPool,
}

impl SqlRequisitionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("{column}: {e}")))
}

fn row_to_requisition(row: &sqlx::sqlite::SqliteRow) -> Result<Requisition, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let item_name: String =
        row.try_get("item_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let quantity: i64 =
        row.try_get("quantity").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let justification: String =
        row.try_get("justification").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let requester_name: String =
        row.try_get("requester_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status_str: String =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let approved_by: Option<String> =
        row.try_get("approved_by").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let approved_at_str: Option<String> =
        row.try_get("approved_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let status = status_str
        .parse::<RequisitionStatus>()
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at = parse_timestamp("created_at", &created_at_str)?;
    let approved_at =
        approved_at_str.as_deref().map(|s| parse_timestamp("approved_at", s)).transpose()?;

    Ok(Requisition {
        id: RequisitionId(id),
        item_name,
        quantity,
        justification,
        requester_name,
        status,
        created_at,
        approved_by,
        approved_at,
    })
}

#[async_trait::async_trait]
impl RequisitionRepository for SqlRequisitionRepository {
    async fn insert(&self, requisition: NewRequisition) -> Result<Requisition, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO requisition (item_name, quantity, justification, requester_name,
                                      status, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&requisition.item_name)
        .bind(requisition.quantity)
        .bind(&requisition.justification)
        .bind(&requisition.requester_name)
        .bind(RequisitionStatus::PendingApproval.as_str())
        .bind(requisition.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(requisition.into_requisition(RequisitionId(result.last_insert_rowid())))
    }

    async fn find_by_id(
        &self,
        id: RequisitionId,
    ) -> Result<Option<Requisition>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_requisition).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Requisition>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> =
            sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(row_to_requisition).collect::<Result<Vec<_>, _>>()
    }

    async fn update(&self, requisition: &Requisition) -> Result<(), RepositoryError> {
        let approved_at_str = requisition.approved_at.map(|dt| dt.to_rfc3339());

        let result = sqlx::query(
            "UPDATE requisition SET
                 item_name = ?,
                 quantity = ?,
                 justification = ?,
                 requester_name = ?,
                 status = ?,
                 approved_by = ?,
                 approved_at = ?
             WHERE id = ?",
        )
        .bind(&requisition.item_name)
        .bind(requisition.quantity)
        .bind(&requisition.justification)
        .bind(&requisition.requester_name)
        .bind(requisition.status.as_str())
        .bind(&requisition.approved_by)
        .bind(&approved_at_str)
        .bind(requisition.id.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(requisition.id));
        }

        Ok(())
    }
}
