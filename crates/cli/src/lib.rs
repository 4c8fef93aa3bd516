pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::anyhow;
use cirqle_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};
use clap::{Parser, Subcommand};

use crate::commands::{CommandResult, InsightsArgs};

#[derive(Debug, Parser)]
#[command(
    name = "cirqle",
    about = "Cirqle sustainability insights CLI",
    long_about = "Score purchase histories, estimate per-item CO2 savings, chat with the Eco assistant, and inspect configuration.",
    after_help = "Examples:\n  cirqle insights --buyer-id 7 --records purchases.json\n  cirqle estimate --records purchases.json\n  cirqle chat \"How do I recycle electronics?\"\n  cirqle config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Config file to load (must exist when given)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Log level override (trace|debug|info|warn|error)")]
    log_level: Option<String>,
    #[arg(long, global = true, help = "LLM model override")]
    model: Option<String>,
    #[arg(long, global = true, help = "LLM base URL override")]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// Flags sit at the top of the precedence chain, above env and file.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                log_level: self.log_level.clone(),
                llm_model: self.model.clone(),
                llm_base_url: self.base_url.clone(),
            },
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Compute sustainability insights for one buyer from a JSON records file")]
    Insights {
        #[arg(long, help = "Buyer identifier (positive integer)")]
        buyer_id: String,
        #[arg(long, help = "JSON file holding the buyer's purchase records")]
        records: PathBuf,
        #[arg(
            long,
            conflicts_with = "all_time",
            help = "Only consider purchases from the last N days (0 = all time)"
        )]
        timeframe_days: Option<u32>,
        #[arg(long, help = "Consider every purchase regardless of age")]
        all_time: bool,
    },
    #[command(about = "Show the per-item CO2 savings estimate for every record in a file")]
    Estimate {
        #[arg(long, help = "JSON file holding purchase records")]
        records: PathBuf,
    },
    #[command(about = "Ask the Eco assistant a sustainability question")]
    Chat {
        message: String,
        #[arg(long, help = "JSON file with prior {role, content} turns")]
        history: Option<PathBuf>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let command_name = cli.command.name();

    let load_options = cli.load_options();
    let config = match AppConfig::load(load_options.clone()) {
        Ok(config) => config,
        Err(error) => {
            let result = CommandResult::failure(
                command_name,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };

    if let Err(error) = init_logging(&config) {
        eprintln!("{error}");
    }

    let result = match cli.command {
        Command::Insights { buyer_id, records, timeframe_days, all_time } => {
            commands::insights::run(&config, &InsightsArgs {
                buyer_id,
                records,
                timeframe_days,
                all_time,
            })
        }
        Command::Estimate { records } => commands::estimate::run(&records),
        Command::Chat { message, history } => {
            commands::chat::run(&config, &message, history.as_deref())
        }
        Command::Config => CommandResult {
            exit_code: 0,
            output: commands::config::run(&config, &load_options),
        },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Insights { .. } => "insights",
            Self::Estimate { .. } => "estimate",
            Self::Chat { .. } => "chat",
            Self::Config => "config",
        }
    }
}

/// Logs go to stderr so stdout only carries command output.
pub fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let installed = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|error| anyhow!("failed to initialize logging: {error}"))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn global_flags_become_config_overrides() {
        let cli = Cli::parse_from([
            "cirqle",
            "config",
            "--log-level",
            "debug",
            "--model",
            "gpt-4o-mini",
            "--base-url",
            "http://localhost:11434/v1",
        ]);

        let options = cli.load_options();

        assert_eq!(options.overrides.log_level.as_deref(), Some("debug"));
        assert_eq!(options.overrides.llm_model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(options.overrides.llm_base_url.as_deref(), Some("http://localhost:11434/v1"));
        assert!(options.config_path.is_none());
        assert!(!options.require_file);
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let cli = Cli::parse_from(["cirqle", "--config", "cirqle.local.toml", "config"]);

        let options = cli.load_options();

        assert!(options.require_file);
        assert!(options.overrides.log_level.is_none());
    }
}
