use std::env;
use std::fs;
use std::path::Path;

use cirqle_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

struct FieldSpec<'a> {
    key_path: &'a str,
    value: String,
    env_keys: &'a [&'a str],
    flag: Option<&'a str>,
}

pub fn run(config: &AppConfig, options: &LoadOptions) -> String {
    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let overrides = &options.overrides;
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let llm_api_key = if config.llm.has_credential() { "<redacted>" } else { "<unset>" };
    let default_timeframe = match config.insights.default_timeframe() {
        Some(days) => days.to_string(),
        None => "0 (all time)".to_string(),
    };

    let fields = [
        FieldSpec {
            key_path: "llm.api_key",
            value: llm_api_key.to_string(),
            env_keys: &["CIRQLE_LLM_API_KEY", "OPENAI_API_KEY"],
            flag: None,
        },
        FieldSpec {
            key_path: "llm.base_url",
            value: config.llm.base_url.clone(),
            env_keys: &["CIRQLE_LLM_BASE_URL"],
            flag: overrides.llm_base_url.as_ref().map(|_| "--base-url"),
        },
        FieldSpec {
            key_path: "llm.model",
            value: config.llm.model.clone(),
            env_keys: &["CIRQLE_LLM_MODEL", "OPENAI_MODEL"],
            flag: overrides.llm_model.as_ref().map(|_| "--model"),
        },
        FieldSpec {
            key_path: "insights.default_timeframe_days",
            value: default_timeframe,
            env_keys: &["CIRQLE_INSIGHTS_DEFAULT_TIMEFRAME_DAYS"],
            flag: None,
        },
        FieldSpec {
            key_path: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["CIRQLE_LOGGING_LEVEL", "CIRQLE_LOG_LEVEL"],
            flag: overrides.log_level.as_ref().map(|_| "--log-level"),
        },
        FieldSpec {
            key_path: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["CIRQLE_LOGGING_FORMAT", "CIRQLE_LOG_FORMAT"],
            flag: None,
        },
    ];

    let mut lines =
        vec!["effective config (source precedence: flag > env > file > default):".to_string()];
    lines.extend(fields.iter().map(|field| {
        let source = match field.flag {
            Some(flag) => format!("flag ({flag})"),
            None => field_source(
                field.key_path,
                field.env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
        };
        render_line(field.key_path, &field.value, source)
    }));
    lines.push(format!(
        "- ai summaries = {}",
        if config.llm.has_credential() { "enabled" } else { "demo mode (no credential)" }
    ));

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let env_hit = env_keys.iter().find(|key| {
        env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false)
    });
    if let Some(env_key) = env_hit {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
