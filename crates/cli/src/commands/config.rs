use std::env;
use std::fs;
use std::path::Path;

use rigforge_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_doc = ["rigforge.toml", "config/rigforge.toml"]
        .iter()
        .find(|candidate| Path::new(candidate).exists())
        .and_then(|candidate| fs::read_to_string(candidate).ok())
        .and_then(|raw| raw.parse::<Value>().ok());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    let mut render = |key: &str, value: String, env_key: &str| {
        let source = if env::var(env_key).is_ok() {
            format!("env:{env_key}")
        } else if file_has_key(config_file_doc.as_ref(), key) {
            "file".to_string()
        } else {
            "default".to_string()
        };
        lines.push(format!("  {key} = {value} ({source})"));
    };

    render("database.url", config.database.url.clone(), "RIGFORGE_DATABASE_URL");
    render(
        "database.max_connections",
        config.database.max_connections.to_string(),
        "RIGFORGE_DATABASE_MAX_CONNECTIONS",
    );
    render(
        "database.timeout_secs",
        config.database.timeout_secs.to_string(),
        "RIGFORGE_DATABASE_TIMEOUT_SECS",
    );
    render(
        "search.timeout_secs",
        config.search.timeout_secs.to_string(),
        "RIGFORGE_SEARCH_TIMEOUT_SECS",
    );
    render(
        "search.max_iterations",
        config.search.max_iterations.to_string(),
        "RIGFORGE_SEARCH_MAX_ITERATIONS",
    );
    render(
        "search.early_exit_percent",
        config.search.early_exit_percent.to_string(),
        "RIGFORGE_SEARCH_EARLY_EXIT_PERCENT",
    );
    render("logging.level", config.logging.level.clone(), "RIGFORGE_LOGGING_LEVEL");
    render(
        "logging.format",
        config.logging.format.as_str().to_string(),
        "RIGFORGE_LOGGING_FORMAT",
    );

    lines.join("\n")
}

fn file_has_key(doc: Option<&Value>, dotted_key: &str) -> bool {
    let Some(mut node) = doc else {
        return false;
    };
    for part in dotted_key.split('.') {
        match node.get(part) {
            Some(next) => node = next,
            None => return false,
        }
    }
    true
}
