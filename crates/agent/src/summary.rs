//! AI summary augmentation for insight results
//!
//! The augmenter asks the configured completion service for a short narrative
//! and three follow-up tips. It is strictly best-effort: every failure is
//! absorbed here and reported as an [`AugmentOutcome`], so the deterministic
//! insight fields are never held back by the external service.

use std::sync::Arc;

use cirqle_core::config::LlmConfig;
use cirqle_core::insights::{
    AggregateInsights, AiSection, ImpactSummary, InsightMetrics, SampleOrder,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm::{client_from_config, ChatMessage, ChatRequest, LlmClient, LlmError};

pub const SUMMARY_SYSTEM_PROMPT: &str = "You are Eco AI helping summarise sustainability \
     performance. Keep tone encouraging and practical.";

const SUMMARY_INSTRUCTIONS: &str = "Using the sustainability data provided, craft a concise \
     summary (max 2 sentences) highlighting the user's positive environmental impact. Then list \
     three actionable, localised tips the user can follow next. Respond strictly as JSON with the \
     shape:\n{\"environmentalImpact\": \"...\", \"recommendedActions\": [\"tip 1\", \"tip 2\", \
     \"tip 3\"]}.\nData:\n";

pub const SUMMARY_TEMPERATURE: f32 = 0.6;
pub const SUMMARY_MAX_TOKENS: u32 = 300;

/// Bounded payload shared with the completion service
#[derive(Debug, Clone, Serialize)]
pub struct SummaryContext<'a> {
    pub metrics: &'a InsightMetrics,
    pub impact: &'a ImpactSummary,
    pub sample_orders: &'a [SampleOrder],
    pub recommendations: &'a [String],
}

impl<'a> SummaryContext<'a> {
    pub fn from_aggregate(aggregate: &'a AggregateInsights) -> Self {
        Self {
            metrics: &aggregate.metrics,
            impact: &aggregate.impact,
            sample_orders: &aggregate.sample_orders,
            recommendations: &aggregate.recommendations,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AugmentFailure {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("could not serialize summary context: {0}")]
    Context(String),
    #[error("summary payload was empty")]
    EmptyPayload,
    #[error("summary payload was not valid JSON: {0}")]
    MalformedJson(String),
    #[error("summary payload was not a JSON object")]
    NotAnObject,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AugmentOutcome {
    Generated(AiSection),
    /// No credential configured; nothing was sent.
    Skipped,
    Failed(AugmentFailure),
}

impl AugmentOutcome {
    pub fn into_section(self) -> AiSection {
        match self {
            Self::Generated(section) => section,
            Self::Skipped | Self::Failed(_) => AiSection::unavailable(),
        }
    }
}

#[derive(Clone, Default)]
pub struct SummaryAugmenter {
    client: Option<Arc<dyn LlmClient>>,
}

impl SummaryAugmenter {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client: Some(client) }
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        Ok(Self { client: client_from_config(config)? })
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub async fn augment(&self, context: &SummaryContext<'_>) -> AugmentOutcome {
        let Some(client) = &self.client else {
            return AugmentOutcome::Skipped;
        };

        match request_summary(client.as_ref(), context).await {
            Ok(section) => {
                info!(
                    event_name = "insights.ai_summary.generated",
                    actions = section.recommended_actions.len(),
                    "ai sustainability summary generated"
                );
                AugmentOutcome::Generated(section)
            }
            Err(failure) => {
                warn!(
                    event_name = "insights.ai_summary.failed",
                    error = %failure,
                    "failed to build ai sustainability summary"
                );
                AugmentOutcome::Failed(failure)
            }
        }
    }
}

async fn request_summary(
    client: &dyn LlmClient,
    context: &SummaryContext<'_>,
) -> Result<AiSection, AugmentFailure> {
    let payload = serde_json::to_string(context)
        .map_err(|error| AugmentFailure::Context(error.to_string()))?;

    let request = ChatRequest {
        messages: vec![
            ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
            ChatMessage::user(format!("{SUMMARY_INSTRUCTIONS}{payload}")),
        ],
        temperature: SUMMARY_TEMPERATURE,
        max_tokens: SUMMARY_MAX_TOKENS,
    };

    let completion = client.complete(&request).await?;
    parse_summary(&completion)
}

/// Remove a surrounding Markdown code fence, if present.
///
/// The opening fence line (with any language tag on it), a bare `json` or
/// `javascript` line right after a bare fence, and a closing fence line are
/// dropped.
pub fn strip_code_fence(raw: &str) -> String {
    let text = raw.trim();
    if !text.starts_with("```") {
        return text.to_string();
    }

    let mut lines: Vec<&str> = text.lines().skip(1).collect();
    let bare_language_line = lines.first().is_some_and(|line| {
        matches!(line.trim().to_ascii_lowercase().as_str(), "json" | "javascript")
    });
    if bare_language_line {
        lines.remove(0);
    }
    if lines.last().is_some_and(|line| line.trim().starts_with("```")) {
        lines.pop();
    }

    lines.join("\n").trim().to_string()
}

/// Parse a completion into an AI section.
///
/// Missing `environmentalImpact` yields no summary and missing
/// `recommendedActions` yields no actions; non-string actions are dropped.
pub fn parse_summary(raw: &str) -> Result<AiSection, AugmentFailure> {
    let text = strip_code_fence(raw);
    if text.is_empty() {
        return Err(AugmentFailure::EmptyPayload);
    }

    let value: Value = serde_json::from_str(&text)
        .map_err(|error| AugmentFailure::MalformedJson(error.to_string()))?;
    let Value::Object(summary) = value else {
        return Err(AugmentFailure::NotAnObject);
    };

    let environmental_impact =
        summary.get("environmentalImpact").and_then(Value::as_str).map(str::to_string);
    let recommended_actions = summary
        .get("recommendedActions")
        .and_then(Value::as_array)
        .map(|actions| actions.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();

    Ok(AiSection { environmental_impact, recommended_actions })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use cirqle_core::config::AppConfig;
    use cirqle_core::insights::{AggregateInsights, AiSection, ImpactSummary, InsightMetrics};
    use rust_decimal::Decimal;

    use super::*;
    use crate::llm::{ChatRole, LlmError};

    const PLAIN: &str = r#"{"environmentalImpact":"You kept 7.5 kg of CO2 out of the air.","recommendedActions":["Repair before replacing","Donate outgrown clothes","Shop local thrift"]}"#;

    struct ScriptedClient {
        reply: Result<String, LlmError>,
        calls: AtomicUsize,
        last_request: Mutex<Option<ChatRequest>>,
    }

    impl ScriptedClient {
        fn new(reply: Result<String, LlmError>) -> Arc<Self> {
            Arc::new(Self { reply, calls: AtomicUsize::new(0), last_request: Mutex::new(None) })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut last) = self.last_request.lock() {
                *last = Some(request.clone());
            }
            self.reply.clone()
        }
    }

    fn aggregate() -> AggregateInsights {
        AggregateInsights {
            sustainability_score: 72,
            metrics: InsightMetrics {
                orders_analyzed: 4,
                reuse_rate_pct: 75.0,
                average_order_value: Decimal::new(125050, 2),
                circular_purchases: 3,
                timeframe_days: Some(180),
            },
            impact: ImpactSummary::from_kilograms(7.5, 3.2, 0.15),
            recommendations: vec!["Keep going".to_string()],
            sample_orders: Vec::new(),
        }
    }

    #[tokio::test]
    async fn disabled_augmenter_skips_without_calling_out() {
        let aggregate = aggregate();
        let outcome = SummaryAugmenter::disabled()
            .augment(&SummaryContext::from_aggregate(&aggregate))
            .await;

        assert_eq!(outcome, AugmentOutcome::Skipped);
        assert_eq!(outcome.into_section(), AiSection::unavailable());
    }

    #[test]
    fn augmenter_from_config_without_key_is_disabled() {
        let augmenter =
            SummaryAugmenter::from_config(&AppConfig::default().llm).expect("config should work");

        assert!(!augmenter.is_enabled());
    }

    #[tokio::test]
    async fn successful_completion_populates_section() {
        let client = ScriptedClient::new(Ok(PLAIN.to_string()));
        let aggregate = aggregate();

        let outcome = SummaryAugmenter::new(client.clone())
            .augment(&SummaryContext::from_aggregate(&aggregate))
            .await;

        let section = outcome.into_section();
        assert_eq!(
            section.environmental_impact.as_deref(),
            Some("You kept 7.5 kg of CO2 out of the air.")
        );
        assert_eq!(section.recommended_actions.len(), 3);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn request_carries_system_prompt_and_context_payload() {
        let client = ScriptedClient::new(Ok(PLAIN.to_string()));
        let aggregate = aggregate();

        SummaryAugmenter::new(client.clone())
            .augment(&SummaryContext::from_aggregate(&aggregate))
            .await;

        let request = client
            .last_request
            .lock()
            .expect("lock")
            .clone()
            .expect("request should be recorded");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert_eq!(request.messages[0].content, SUMMARY_SYSTEM_PROMPT);
        assert_eq!(request.messages[1].role, ChatRole::User);
        assert!(request.messages[1].content.contains("\"environmentalImpact\""));
        assert!(request.messages[1].content.contains("\"orders_analyzed\":4"));
        assert!(request.messages[1].content.contains("\"average_order_value\":1250.5"));
        assert!(request.messages[1].content.contains("\"co2_saved\":\"7.5 kg\""));
        assert_eq!(request.max_tokens, SUMMARY_MAX_TOKENS);
    }

    #[tokio::test]
    async fn malformed_completion_degrades_to_unavailable() {
        let client = ScriptedClient::new(Ok("Sure! Here is your summary.".to_string()));
        let aggregate = aggregate();

        let outcome = SummaryAugmenter::new(client)
            .augment(&SummaryContext::from_aggregate(&aggregate))
            .await;

        assert!(matches!(outcome, AugmentOutcome::Failed(AugmentFailure::MalformedJson(_))));
        assert!(outcome.into_section().is_unavailable());
    }

    #[tokio::test]
    async fn transport_failure_degrades_to_unavailable() {
        let client = ScriptedClient::new(Err(LlmError::Timeout));
        let aggregate = aggregate();

        let outcome = SummaryAugmenter::new(client.clone())
            .augment(&SummaryContext::from_aggregate(&aggregate))
            .await;

        assert_eq!(outcome, AugmentOutcome::Failed(AugmentFailure::Llm(LlmError::Timeout)));
        assert_eq!(client.calls(), 1, "failures must not be retried");
    }

    #[test]
    fn fenced_json_parses_like_plain_json() {
        let fenced = format!("```json\n{PLAIN}\n```");

        assert_eq!(parse_summary(&fenced), parse_summary(PLAIN));
        assert!(parse_summary(&fenced).is_ok());
    }

    #[test]
    fn bare_fence_with_language_line_is_stripped() {
        let fenced = format!("  ```\nJSON\n{PLAIN}\n```  ");

        assert_eq!(strip_code_fence(&fenced), PLAIN);
    }

    #[test]
    fn fence_without_closing_line_still_parses() {
        let fenced = format!("```javascript\n{PLAIN}");

        assert_eq!(parse_summary(&fenced), parse_summary(PLAIN));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert_eq!(parse_summary(r#"["a","b"]"#), Err(AugmentFailure::NotAnObject));
        assert_eq!(parse_summary("```json\n```"), Err(AugmentFailure::EmptyPayload));
    }

    #[test]
    fn missing_fields_default_and_non_strings_are_dropped() {
        let section = parse_summary(r#"{"recommendedActions":["Walk more", 3, null]}"#)
            .expect("object should parse");

        assert_eq!(section.environmental_impact, None);
        assert_eq!(section.recommended_actions, vec!["Walk more".to_string()]);

        let bare = parse_summary(r#"{"environmentalImpact":"Nice","recommendedActions":null}"#)
            .expect("object should parse");
        assert!(bare.recommended_actions.is_empty());
    }
}
