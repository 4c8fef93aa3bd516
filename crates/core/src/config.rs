use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TIMEFRAME_DAYS: u32 = 180;
pub const MAX_TIMEFRAME_DAYS: u32 = 3650;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub insights: InsightsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    /// Absent means demo mode: AI sections stay empty and nothing is sent.
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
}

impl LlmConfig {
    pub fn has_credential(&self) -> bool {
        self.api_key.as_ref().is_some_and(|key| !key.expose_secret().trim().is_empty())
    }
}

#[derive(Clone, Debug)]
pub struct InsightsConfig {
    /// Lookback window used when the caller does not pick one; 0 = unbounded.
    pub default_timeframe_days: u32,
}

impl InsightsConfig {
    pub fn default_timeframe(&self) -> Option<u32> {
        (self.default_timeframe_days > 0).then_some(self.default_timeframe_days)
    }
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub llm_model: Option<String>,
    pub llm_base_url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                api_key: None,
                base_url: DEFAULT_LLM_BASE_URL.to_string(),
                model: DEFAULT_LLM_MODEL.to_string(),
            },
            insights: InsightsConfig { default_timeframe_days: DEFAULT_TIMEFRAME_DAYS },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("cirqle.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(llm) = patch.llm {
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
        }

        if let Some(insights) = patch.insights {
            if let Some(default_timeframe_days) = insights.default_timeframe_days {
                self.insights.default_timeframe_days = default_timeframe_days;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let api_key = read_env("CIRQLE_LLM_API_KEY").or_else(|| read_env("OPENAI_API_KEY"));
        if let Some(value) = api_key {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("CIRQLE_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        let model = read_env("CIRQLE_LLM_MODEL").or_else(|| read_env("OPENAI_MODEL"));
        if let Some(value) = model {
            self.llm.model = value;
        }

        if let Some(value) = read_env("CIRQLE_INSIGHTS_DEFAULT_TIMEFRAME_DAYS") {
            self.insights.default_timeframe_days =
                parse_u32("CIRQLE_INSIGHTS_DEFAULT_TIMEFRAME_DAYS", &value)?;
        }

        let log_level = read_env("CIRQLE_LOGGING_LEVEL").or_else(|| read_env("CIRQLE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("CIRQLE_LOGGING_FORMAT").or_else(|| read_env("CIRQLE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(llm_base_url) = overrides.llm_base_url {
            self.llm.base_url = llm_base_url;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_llm(&self.llm)?;
        validate_insights(&self.insights)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Config file that `AppConfig::load` would read, if any.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("cirqle.toml"), PathBuf::from("config/cirqle.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    let base_url = llm.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "llm.base_url must start with http:// or https://".to_string(),
        ));
    }

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    Ok(())
}

fn validate_insights(insights: &InsightsConfig) -> Result<(), ConfigError> {
    if insights.default_timeframe_days > MAX_TIMEFRAME_DAYS {
        return Err(ConfigError::Validation(format!(
            "insights.default_timeframe_days must be in range 0..={MAX_TIMEFRAME_DAYS} (0 = all time)"
        )));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    llm: Option<LlmPatch>,
    insights: Option<InsightsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct InsightsPatch {
    default_timeframe_days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
