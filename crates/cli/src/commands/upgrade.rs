use std::collections::BTreeMap;
use std::sync::Arc;

use rigforge_core::{
    Category, QueryParser, RecommendationStore, UpgradeAdvisor, UpgradeSuggestion,
};
use rigforge_db::{connect_with_settings, SqlComponentCatalog, SqlRecommendationStore};

use crate::commands::{build_runtime, load_config, peso, CommandResult};

pub fn run(query: &str, thread: i64, json: bool) -> CommandResult {
    let config = match load_config("upgrade") {
        Ok(config) => config,
        Err(result) => return *result,
    };
    let runtime = match build_runtime("upgrade") {
        Ok(runtime) => runtime,
        Err(result) => return *result,
    };
    let parser = match QueryParser::new() {
        Ok(parser) => parser,
        Err(error) => {
            return CommandResult::failure("upgrade", "query_parser", error.to_string(), 2)
        }
    };

    let parsed = parser.parse(query);

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        let store = SqlRecommendationStore::new(pool.clone());
        let previous = store.latest_build(thread).await;
        let outcome = match previous {
            Some(previous) => {
                let catalog = Arc::new(SqlComponentCatalog::new(pool.clone()));
                let advisor = UpgradeAdvisor::new(catalog);
                let suggestions = advisor
                    .suggest_upgrades(&previous.components, &parsed.upgrade_targets, previous.budget)
                    .await;
                Ok(suggestions)
            }
            None => Err((
                "no_previous_build",
                format!("no saved recommendation found for thread {thread}"),
                5u8,
            )),
        };

        pool.close().await;
        outcome
    });

    match result {
        Ok(suggestions) if json => match serde_json::to_string_pretty(&suggestions) {
            Ok(output) => CommandResult { exit_code: 0, output },
            Err(error) => {
                CommandResult::failure("upgrade", "serialization", error.to_string(), 7)
            }
        },
        Ok(suggestions) => CommandResult { exit_code: 0, output: render(&suggestions) },
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("upgrade", error_class, message, exit_code)
        }
    }
}

fn render(suggestions: &BTreeMap<Category, UpgradeSuggestion>) -> String {
    if suggestions.is_empty() {
        return "no worthwhile upgrades found in the current catalog".to_string();
    }

    let mut lines = Vec::new();
    for (category, suggestion) in suggestions {
        lines.push(format!(
            "{category}: {} {} {} (window {} to {})",
            suggestion.current.brand,
            suggestion.current.model,
            peso(suggestion.current.price),
            peso(suggestion.price_window.min),
            peso(suggestion.price_window.max),
        ));
        for option in &suggestion.options {
            lines.push(format!(
                "  -> {} {} {}",
                option.brand,
                option.model,
                peso(option.price),
            ));
        }
    }
    lines.join("\n")
}
