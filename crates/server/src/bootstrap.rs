use std::sync::Arc;

use reqtrack_core::config::{AppConfig, ConfigError};
use reqtrack_db::{connect, migrations, DbPool, RequisitionRepository, SqlRequisitionRepository};
use thiserror::Error;
use tracing::info;

use crate::lifecycle::RequisitionLifecycle;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub lifecycle: Arc<RequisitionLifecycle>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let repository: Arc<dyn RequisitionRepository> =
        Arc::new(SqlRequisitionRepository::new(db_pool.clone()));
    let lifecycle = Arc::new(RequisitionLifecycle::new(
        repository,
        config.approvals.default_approver.clone(),
    ));

    Ok(Application { config, db_pool, lifecycle })
}

#[cfg(test)]
mod tests {
    use reqtrack_core::config::{AppConfig, ConfigOverrides, LoadOptions};
    use reqtrack_core::domain::requisition::{RequisitionDraft, RequisitionStatus};

    use crate::bootstrap::{bootstrap_with_config, Application, BootstrapError};

    async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
        let config = AppConfig::load(options)?;
        bootstrap_with_config(config).await
    }

    fn overrides(database_url: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                default_approver: Some("Procurement Bot".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_on_invalid_database_url() {
        let result = bootstrap(overrides("mysql://localhost/reqtrack")).await;

        let message = result.err().expect("error").to_string();
        assert!(message.contains("database.url"));
    }

    #[tokio::test]
    async fn integration_smoke_covers_startup_and_requisition_path() {
        let app = bootstrap(overrides("sqlite::memory:"))
            .await
            .expect("bootstrap should succeed with valid overrides");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'requisition'",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("requisition table should exist after bootstrap");
        assert_eq!(table_count, 1);

        let created = app
            .lifecycle
            .create(RequisitionDraft {
                item_name: Some("Laptop".to_string()),
                quantity: Some(2),
                justification: Some("New hire".to_string()),
                requester_name: Some("Alice".to_string()),
            })
            .await
            .expect("create");
        let approved = app.lifecycle.approve(created.id, None).await.expect("approve");

        assert_eq!(approved.status, RequisitionStatus::Approved);
        assert_eq!(approved.approved_by.as_deref(), Some("Procurement Bot"));
        assert_eq!(app.lifecycle.default_approver(), "Procurement Bot");

        app.db_pool.close().await;
    }
}
