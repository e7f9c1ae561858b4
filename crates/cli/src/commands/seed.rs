use rigforge_db::{connect_with_settings, migrations, seed_components, SEED_COMPONENTS};

use crate::commands::{build_runtime, load_config, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(result) => return *result,
    };
    let runtime = match build_runtime("seed") {
        Ok(runtime) => runtime,
        Err(result) => return *result,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        let outcome = async {
            migrations::run_pending(&pool)
                .await
                .map_err(|error| ("migration", error.to_string(), 5u8))?;
            seed_components(&pool)
                .await
                .map_err(|error| ("seed_execution", error.to_string(), 6u8))
        }
        .await;

        pool.close().await;
        outcome
    });

    match result {
        Ok(inserted) => CommandResult::success(
            "seed",
            format!(
                "inserted {inserted} of {} seed components ({} already present)",
                SEED_COMPONENTS.len(),
                SEED_COMPONENTS.len() as u64 - inserted
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}
