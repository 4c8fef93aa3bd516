use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::types::{AggregateInsights, ImpactSummary, InsightMetrics, SampleOrder};
use super::{
    COUNT_BONUS_CAP, COUNT_BONUS_PER_CIRCULAR_ORDER, LOW_REUSE_THRESHOLD_PCT, MAX_SCORE,
    MIN_DOMINANT_CATEGORY_COUNT, REUSE_RATE_WEIGHT, SAMPLE_ORDER_LIMIT, SCORE_BASE,
};
use crate::domain::product::DEFAULT_CATEGORY_LABEL;
use crate::domain::purchase::{BuyerId, PurchaseRecord};
use crate::impact::{is_circular_purchase, round_dp, PortfolioMultipliers};

/// Signals that drive the recommendation list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationSignals<'a> {
    pub reuse_rate_pct: f64,
    pub average_order_value: Decimal,
    /// Most frequent category label and how many orders carried it
    pub dominant_category: Option<(&'a str, usize)>,
    pub total_orders: usize,
}

/// Turns a buyer's purchase history into scored portfolio insights.
///
/// The aggregator is stateless apart from its multipliers and can be shared
/// freely across concurrent calls.
#[derive(Debug, Clone)]
pub struct InsightAggregator {
    multipliers: PortfolioMultipliers,
}

impl InsightAggregator {
    pub fn new() -> Self {
        Self { multipliers: PortfolioMultipliers::default() }
    }

    pub fn with_multipliers(multipliers: PortfolioMultipliers) -> Self {
        Self { multipliers }
    }

    /// Aggregate `records` for `buyer`, keeping only purchases made in the
    /// last `timeframe_days` days relative to `now` when a positive window
    /// is given.
    pub fn aggregate(
        &self,
        buyer: &BuyerId,
        records: &[PurchaseRecord],
        timeframe_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> AggregateInsights {
        let timeframe_days = timeframe_days.filter(|days| *days > 0);
        let retained = retain_in_window(records, timeframe_days, now);

        if retained.is_empty() {
            debug!(
                event_name = "insights.aggregate.empty",
                buyer_id = buyer.0,
                supplied = records.len(),
                "no purchases in range; returning empty-state insights"
            );
            return AggregateInsights::empty();
        }

        let foreign = retained.iter().filter(|record| record.buyer_id != *buyer).count();
        if foreign > 0 {
            warn!(
                event_name = "insights.aggregate.foreign_records",
                buyer_id = buyer.0,
                foreign,
                "records for other buyers were supplied and will be analysed"
            );
        }

        let total_orders = retained.len();
        let total_spent: Decimal = retained.iter().map(|record| record.price).sum();
        let circular = retained.iter().filter(|record| is_circular_purchase(record)).count();
        let reuse_rate_pct = circular as f64 / total_orders as f64 * 100.0;
        let average_order_value = total_spent / Decimal::from(total_orders);
        let dominant_category = dominant_category(&retained);

        let impact = ImpactSummary::from_kilograms(
            circular as f64 * self.multipliers.co2_kg_per_circular_order,
            total_orders as f64 * self.multipliers.waste_kg_per_order,
            round_dp(circular as f64 * self.multipliers.trees_per_circular_order, 2),
        );
        let sustainability_score = sustainability_score(reuse_rate_pct, circular);
        let recommendations = recommendations(&RecommendationSignals {
            reuse_rate_pct,
            average_order_value,
            dominant_category,
            total_orders,
        });

        debug!(
            event_name = "insights.aggregate.completed",
            buyer_id = buyer.0,
            orders_analyzed = total_orders,
            circular_purchases = circular,
            sustainability_score,
            "aggregated purchase history"
        );

        AggregateInsights {
            sustainability_score,
            metrics: InsightMetrics {
                orders_analyzed: total_orders,
                reuse_rate_pct: round_dp(reuse_rate_pct, 1),
                average_order_value: average_order_value.round_dp(2),
                circular_purchases: circular,
                timeframe_days,
            },
            impact,
            recommendations,
            sample_orders: recent_sample(&retained, SAMPLE_ORDER_LIMIT),
        }
    }
}

impl Default for InsightAggregator {
    fn default() -> Self {
        Self::new()
    }
}

fn retain_in_window(
    records: &[PurchaseRecord],
    timeframe_days: Option<u32>,
    now: DateTime<Utc>,
) -> Vec<&PurchaseRecord> {
    // A window reaching past the earliest representable instant keeps everything.
    let cutoff = timeframe_days.and_then(|days| {
        Duration::try_days(i64::from(days)).and_then(|window| now.checked_sub_signed(window))
    });
    match cutoff {
        Some(cutoff) => records.iter().filter(|record| record.is_on_or_after(cutoff)).collect(),
        None => records.iter().collect(),
    }
}

/// Base 40, plus up to 40 from the reuse rate, plus up to 30 from the
/// circular count, capped at 100. Ties round to even.
pub fn sustainability_score(reuse_rate_pct: f64, circular_purchases: usize) -> u8 {
    let count_bonus =
        circular_purchases.saturating_mul(COUNT_BONUS_PER_CIRCULAR_ORDER).min(COUNT_BONUS_CAP);
    let raw = SCORE_BASE + reuse_rate_pct * REUSE_RATE_WEIGHT + count_bonus as f64;
    raw.round_ties_even().clamp(0.0, MAX_SCORE) as u8
}

/// Most frequent category label; ties go to the label seen first.
fn dominant_category<'a>(records: &[&'a PurchaseRecord]) -> Option<(&'a str, usize)> {
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    for &record in records {
        let label = record
            .product
            .as_ref()
            .map_or(DEFAULT_CATEGORY_LABEL, |product| product.category_label());
        match counts.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    counts.into_iter().fold(None, |best, candidate| match best {
        Some((_, best_count)) if best_count >= candidate.1 => best,
        _ => Some(candidate),
    })
}

/// Build the ordered recommendation list. Rules are independent and
/// evaluated in a fixed order; a generic note is added when none fire.
pub fn recommendations(signals: &RecommendationSignals<'_>) -> Vec<String> {
    let mut recommendations = Vec::new();

    if signals.reuse_rate_pct < LOW_REUSE_THRESHOLD_PCT {
        recommendations.push(
            "Try opting for pre-loved or upcycled items to boost your reuse rate.".to_string(),
        );
    }

    if signals.average_order_value > Decimal::ZERO {
        recommendations.push(format!(
            "Keep supporting circular purchases—your average order value is {} KES.",
            signals.average_order_value.round_dp(0)
        ));
    }

    if let Some((category, count)) = signals.dominant_category {
        let threshold = MIN_DOMINANT_CATEGORY_COUNT.max(signals.total_orders / 3);
        if count >= threshold {
            recommendations.push(format!(
                "You make a big impact in {}—explore related eco swaps to go further.",
                category.to_lowercase()
            ));
        }
    }

    if recommendations.is_empty() {
        recommendations.push(
            "Great job staying sustainable! Share your impact with friends to inspire them."
                .to_string(),
        );
    }

    recommendations
}

fn recent_sample(records: &[&PurchaseRecord], limit: usize) -> Vec<SampleOrder> {
    let mut ordered = records.to_vec();
    // Descending by timestamp; `None` sorts below any timestamp so undated records go last.
    ordered.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
    ordered.into_iter().take(limit).map(SampleOrder::from_record).collect()
}
