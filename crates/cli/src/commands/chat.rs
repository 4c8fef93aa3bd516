use std::path::Path;

use cirqle_agent::EcoAssistant;
use cirqle_core::config::AppConfig;
use cirqle_core::ApplicationError;

use crate::commands::records::load_history;
use crate::commands::{block_on, CommandResult};

const COMMAND: &str = "chat";

pub fn run(config: &AppConfig, message: &str, history_path: Option<&Path>) -> CommandResult {
    let message = message.trim();
    if message.is_empty() {
        let error = ApplicationError::Input("message must not be empty".to_string());
        return CommandResult::from_error(COMMAND, &error);
    }

    let history = match history_path.map(load_history).transpose() {
        Ok(history) => history.unwrap_or_default(),
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };
    let assistant = match EcoAssistant::from_config(&config.llm) {
        Ok(assistant) => assistant,
        Err(error) => {
            let error = ApplicationError::Configuration(error.to_string());
            return CommandResult::from_error(COMMAND, &error);
        }
    };

    match block_on(assistant.reply(message, &history)) {
        Ok(reply) => CommandResult::success(COMMAND, reply),
        Err(error) => CommandResult::failure(COMMAND, "runtime_init", error.to_string(), 3),
    }
}
