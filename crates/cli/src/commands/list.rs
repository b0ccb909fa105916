use reqtrack_core::domain::requisition::Requisition;
use reqtrack_db::{migrations, RequisitionRepository, SqlRequisitionRepository};
use serde::Serialize;

use crate::commands::{open_pool, prepare, CommandResult, StepFailure};

#[derive(Debug, Serialize)]
struct ListOutcome {
    command: &'static str,
    status: &'static str,
    count: usize,
    requisitions: Vec<Requisition>,
}

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("list") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_pool(&config).await?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let repository = SqlRequisitionRepository::new(pool.clone());
        let requisitions =
            repository.list_all().await.map_err(|error| ("query", error.to_string(), 5u8))?;
        pool.close().await;
        Ok::<Vec<Requisition>, StepFailure>(requisitions)
    });

    let requisitions = match result {
        Ok(requisitions) => requisitions,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("list", error_class, message, exit_code)
        }
    };

    let payload =
        ListOutcome { command: "list", status: "ok", count: requisitions.len(), requisitions };
    match serde_json::to_string(&payload) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure("list", "serialization", error.to_string(), 1),
    }
}
