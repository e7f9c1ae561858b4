use std::sync::Arc;

use rigforge_core::{
    BudgetLadder, PremadeGenerator, QueryParser, Recommendations, TierOrchestrator,
};
use rigforge_db::{connect_with_settings, SqlComponentCatalog, SqlRecommendationStore};

use crate::commands::{build_runtime, load_config, peso, CommandResult};

pub fn run(query: &str, thread: Option<i64>, json: bool) -> CommandResult {
    let config = match load_config("recommend") {
        Ok(config) => config,
        Err(result) => return *result,
    };
    let runtime = match build_runtime("recommend") {
        Ok(runtime) => runtime,
        Err(result) => return *result,
    };
    let parser = match QueryParser::new() {
        Ok(parser) => parser,
        Err(error) => {
            return CommandResult::failure("recommend", "query_parser", error.to_string(), 2)
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

        let catalog = Arc::new(SqlComponentCatalog::new(pool.clone()));
        let premade = PremadeGenerator::with_limits(
            catalog.clone(),
            BudgetLadder::default(),
            config.search.limits(),
        );
        let orchestrator = TierOrchestrator::with_premade(catalog, premade);
        let recommendations = orchestrator.recommend(&parsed).await;

        let saved = if let Some(thread) = thread {
            let store = SqlRecommendationStore::new(pool.clone());
            let outcome = store
                .save_recommendations(thread, query, &recommendations)
                .await
                .map_err(|error| ("recommendation_store", error.to_string(), 5u8));
            pool.close().await;
            outcome?;
            true
        } else {
            pool.close().await;
            false
        };

        Ok::<_, (&'static str, String, u8)>((recommendations, saved))
    });

    match result {
        Ok((recommendations, _)) if json => {
            match serde_json::to_string_pretty(&recommendations) {
                Ok(output) => CommandResult { exit_code: 0, output },
                Err(error) => {
                    CommandResult::failure("recommend", "serialization", error.to_string(), 7)
                }
            }
        }
        Ok((recommendations, saved)) => {
            CommandResult { exit_code: 0, output: render(&recommendations, thread.filter(|_| saved)) }
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("recommend", error_class, message, exit_code)
        }
    }
}

fn render(recommendations: &Recommendations, saved_thread: Option<i64>) -> String {
    let mut lines = Vec::new();

    if let Some(analysis) = &recommendations.budget_analysis {
        if analysis.is_feasible {
            lines.push(format!(
                "budget {} is feasible (floor {})",
                peso(analysis.user_budget),
                peso(analysis.min_required),
            ));
        } else {
            lines.push(analysis.message.clone());
        }
    }

    for (tier, build) in &recommendations.builds {
        lines.push(format!(
            "{tier}: {} of {} ({}% used{})",
            peso(build.total_cost),
            peso(build.target_budget),
            build.budget_utilization.round_dp(1).normalize(),
            if build.is_compatible { "" } else { ", compatibility issues" },
        ));
        for component in build.components.values() {
            lines.push(format!(
                "  {}: {} {} {}",
                component.category,
                component.brand,
                component.model,
                peso(component.price),
            ));
        }
        for issue in &build.compatibility_issues {
            lines.push(format!("  ! {issue}"));
        }
    }

    if let Some(minimum) = &recommendations.minimum_build {
        lines.push(format!("cheapest feasible alternative, {} total:", peso(minimum.total_cost)));
        for component in minimum.components.values() {
            lines.push(format!(
                "  {}: {} {} {}",
                component.category,
                component.brand,
                component.model,
                peso(component.price),
            ));
        }
    }

    if recommendations.builds.is_empty() && recommendations.minimum_build.is_none() {
        lines.push("no builds could be assembled from the current catalog".to_string());
    }
    if let Some(thread) = saved_thread {
        lines.push(format!("saved under thread {thread}"));
    }
    lines.join("\n")
}
