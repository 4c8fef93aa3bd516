pub mod chat;
pub mod config;
pub mod estimate;
pub mod insights;
pub mod records;

use std::future::Future;

use anyhow::Context;
use cirqle_core::ApplicationError;
use serde::Serialize;

pub use insights::InsightsArgs;

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

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), error.exit_code())
    }

    /// Pretty JSON document on stdout, exit code 0.
    pub fn document(command: &str, document: &impl Serialize) -> Self {
        match serde_json::to_string_pretty(document) {
            Ok(output) => Self { exit_code: 0, output },
            Err(error) => Self::failure(command, "serialization", error.to_string(), 3),
        }
    }
}

/// Drive one async command on a fresh current-thread runtime.
pub(crate) fn block_on<F: Future>(future: F) -> anyhow::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to initialize async runtime")?;
    Ok(runtime.block_on(future))
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
