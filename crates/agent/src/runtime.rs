use chrono::{DateTime, Utc};
use cirqle_core::config::AppConfig;
use cirqle_core::insights::{assemble, AiSection, InsightAggregator, InsightResult};
use cirqle_core::{BuyerId, PurchaseRecord};
use tracing::info;

use crate::llm::LlmError;
use crate::summary::{SummaryAugmenter, SummaryContext};

/// Drives aggregate, augment and assemble for one insight request.
///
/// The deterministic fields are always computed first; the AI summary is
/// attempted only for non-empty histories and never changes them.
#[derive(Clone, Default)]
pub struct InsightRuntime {
    aggregator: InsightAggregator,
    augmenter: SummaryAugmenter,
}

impl InsightRuntime {
    pub fn new(aggregator: InsightAggregator, augmenter: SummaryAugmenter) -> Self {
        Self { aggregator, augmenter }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, LlmError> {
        Ok(Self::new(InsightAggregator::default(), SummaryAugmenter::from_config(&config.llm)?))
    }

    pub fn ai_enabled(&self) -> bool {
        self.augmenter.is_enabled()
    }

    pub async fn generate(
        &self,
        buyer: &BuyerId,
        records: &[PurchaseRecord],
        timeframe_days: Option<u32>,
    ) -> InsightResult {
        self.generate_at(buyer, records, timeframe_days, Utc::now()).await
    }

    pub async fn generate_at(
        &self,
        buyer: &BuyerId,
        records: &[PurchaseRecord],
        timeframe_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> InsightResult {
        let aggregate = self.aggregator.aggregate(buyer, records, timeframe_days, now);

        let ai = if aggregate.is_empty() {
            AiSection::unavailable()
        } else {
            self.augmenter.augment(&SummaryContext::from_aggregate(&aggregate)).await.into_section()
        };

        info!(
            event_name = "insights.generate.completed",
            buyer_id = buyer.0,
            orders_analyzed = aggregate.metrics.orders_analyzed,
            sustainability_score = aggregate.sustainability_score,
            ai_available = !ai.is_unavailable(),
            "insights generated"
        );

        assemble(aggregate, ai)
    }
}
