use std::path::PathBuf;

use chrono::{DateTime, Utc};
use cirqle_agent::InsightRuntime;
use cirqle_core::config::{AppConfig, MAX_TIMEFRAME_DAYS};
use cirqle_core::{ApplicationError, BuyerId};

use crate::commands::records::load_records;
use crate::commands::{block_on, CommandResult};

const COMMAND: &str = "insights";

#[derive(Debug, Clone, Default)]
pub struct InsightsArgs {
    pub buyer_id: String,
    pub records: PathBuf,
    pub timeframe_days: Option<u32>,
    pub all_time: bool,
}

impl InsightsArgs {
    /// Explicit flags win over the configured default window.
    pub fn resolve_timeframe(&self, config: &AppConfig) -> Result<Option<u32>, ApplicationError> {
        if self.all_time {
            return Ok(None);
        }
        match self.timeframe_days {
            Some(days) if days > MAX_TIMEFRAME_DAYS => Err(ApplicationError::Input(format!(
                "--timeframe-days must be in range 0..={MAX_TIMEFRAME_DAYS}"
            ))),
            Some(0) => Ok(None),
            Some(days) => Ok(Some(days)),
            None => Ok(config.insights.default_timeframe()),
        }
    }
}

pub fn run(config: &AppConfig, args: &InsightsArgs) -> CommandResult {
    run_at(config, args, Utc::now())
}

pub fn run_at(config: &AppConfig, args: &InsightsArgs, now: DateTime<Utc>) -> CommandResult {
    let buyer = match BuyerId::parse(&args.buyer_id) {
        Ok(buyer) => buyer,
        Err(error) => return CommandResult::from_error(COMMAND, &ApplicationError::from(error)),
    };
    let timeframe_days = match args.resolve_timeframe(config) {
        Ok(timeframe_days) => timeframe_days,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };
    let records = match load_records(&args.records) {
        Ok(records) => records,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };
    let runtime = match InsightRuntime::from_config(config) {
        Ok(runtime) => runtime,
        Err(error) => {
            let error = ApplicationError::Configuration(error.to_string());
            return CommandResult::from_error(COMMAND, &error);
        }
    };

    match block_on(runtime.generate_at(&buyer, &records, timeframe_days, now)) {
        Ok(result) => CommandResult::document(COMMAND, &result),
        Err(error) => CommandResult::failure(COMMAND, "runtime_init", error.to_string(), 3),
    }
}
