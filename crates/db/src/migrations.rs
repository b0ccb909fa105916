use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Reports whether the `requisition` table exists without applying anything.
pub async fn requisition_table_present(pool: &DbPool) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'requisition'",
    )
    .fetch_one(pool)
    .await?;

    Ok(count == 1)
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::{requisition_table_present, run_pending, MIGRATOR};
    use crate::connect_with_settings;

    const MANAGED_SCHEMA_OBJECTS: &[&str] = &["requisition", "idx_requisition_status"];

    #[tokio::test]
    async fn migrations_create_requisition_schema() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        for name in MANAGED_SCHEMA_OBJECTS {
            let count = sqlx::query(
                "SELECT COUNT(*) AS count FROM sqlite_master WHERE name = ?",
            )
            .bind(name)
            .fetch_one(&pool)
            .await
            .expect("check schema object")
            .get::<i64, _>("count");

            assert_eq!(count, 1, "expected schema object `{name}` to exist");
        }

        pool.close().await;
    }

    #[tokio::test]
    async fn table_presence_tracks_migration_state() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        assert!(!requisition_table_present(&pool).await.expect("inspect before"));

        run_pending(&pool).await.expect("run migrations");
        assert!(requisition_table_present(&pool).await.expect("inspect after"));

        pool.close().await;
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run");

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
            .fetch_one(&pool)
            .await
            .expect("count applied migrations");
        assert_eq!(applied, MIGRATOR.iter().count() as i64);

        pool.close().await;
    }

    #[tokio::test]
    async fn schema_rejects_half_recorded_approval() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let result = sqlx::query(
            "INSERT INTO requisition
                (item_name, quantity, justification, requester_name, status, created_at, approved_by)
             VALUES ('Laptop', 1, 'New hire', 'Alice', 'Approved', '2026-01-01T00:00:00Z', 'Bob')",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err(), "approved_by without approved_at must violate the schema");
        pool.close().await;
    }
}
