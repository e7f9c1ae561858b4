pub mod config;
pub mod migrate;
pub mod recommend;
pub mod search;
pub mod seed;
pub mod upgrade;

use rigforge_core::config::{AppConfig, LoadOptions};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Shared preamble for commands that touch the database: load config or
/// report a `config_validation` failure.
pub(crate) fn load_config(command: &str) -> Result<AppConfig, Box<CommandResult>> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        Box::new(CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        ))
    })
}

pub(crate) fn peso(amount: Decimal) -> String {
    format!("\u{20b1}{}", amount.normalize())
}

pub(crate) fn build_runtime(command: &str) -> Result<tokio::runtime::Runtime, Box<CommandResult>> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        Box::new(CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        ))
    })
}
