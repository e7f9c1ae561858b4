use rigforge_core::{Component, ComponentCatalog, ComponentFilter, QueryParser};
use rigforge_db::{connect_with_settings, SqlComponentCatalog};

use crate::commands::{build_runtime, load_config, peso, CommandResult};

pub fn run(query: &str, json: bool) -> CommandResult {
    let config = match load_config("search") {
        Ok(config) => config,
        Err(result) => return *result,
    };
    let runtime = match build_runtime("search") {
        Ok(runtime) => runtime,
        Err(result) => return *result,
    };
    let parser = match QueryParser::new() {
        Ok(parser) => parser,
        Err(error) => {
            return CommandResult::failure("search", "query_parser", error.to_string(), 2)
        }
    };

    let parsed = parser.parse(query);
    let filter = ComponentFilter {
        category: parsed.component_type,
        brand: parsed.brand.clone(),
        model_query: (!parsed.model_keywords.is_empty())
            .then(|| parsed.model_keywords.join(" ")),
        min_price: parsed.price_constraints.min_price,
        max_price: parsed.price_constraints.max_price,
        limit: 20,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        let catalog = SqlComponentCatalog::new(pool.clone());
        let results = catalog.search(&filter).await;
        pool.close().await;
        Ok::<_, (&'static str, String, u8)>(results)
    });

    match result {
        Ok(results) if json => match serde_json::to_string_pretty(&results) {
            Ok(output) => CommandResult { exit_code: 0, output },
            Err(error) => {
                CommandResult::failure("search", "serialization", error.to_string(), 7)
            }
        },
        Ok(results) => CommandResult { exit_code: 0, output: render(query, &results) },
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("search", error_class, message, exit_code)
        }
    }
}

fn render(query: &str, results: &[Component]) -> String {
    if results.is_empty() {
        return format!("no components matched `{query}`");
    }

    let mut lines = vec![format!("{} components matched `{query}`:", results.len())];
    for component in results {
        lines.push(format!(
            "  [{}] {} {} {}",
            component.category,
            component.brand,
            component.model,
            peso(component.price),
        ));
    }
    lines.join("\n")
}
