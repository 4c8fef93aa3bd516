//! Types for the insight pipeline

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::EMPTY_STATE_RECOMMENDATIONS;
use crate::domain::purchase::PurchaseRecord;
use crate::impact::is_circular_purchase;

/// Counts and ratios over the analysed purchases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightMetrics {
    pub orders_analyzed: usize,
    /// Share of circular purchases (0 - 100, one decimal)
    pub reuse_rate_pct: f64,
    /// Mean price paid per order (two decimals)
    #[serde(with = "rust_decimal::serde::float")]
    pub average_order_value: Decimal,
    pub circular_purchases: usize,
    /// Lookback window, `None` when every purchase was considered
    pub timeframe_days: Option<u32>,
}

impl InsightMetrics {
    pub fn empty() -> Self {
        Self {
            orders_analyzed: 0,
            reuse_rate_pct: 0.0,
            average_order_value: Decimal::ZERO,
            circular_purchases: 0,
            timeframe_days: None,
        }
    }
}

/// Portfolio-level environmental totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactSummary {
    /// Formatted magnitude, e.g. `"7.5 kg"`
    pub co2_saved: String,
    /// Formatted magnitude, e.g. `"2.4 kg"`
    pub waste_reduced: String,
    pub trees_saved: f64,
}

impl ImpactSummary {
    pub fn from_kilograms(co2_kg: f64, waste_kg: f64, trees: f64) -> Self {
        Self {
            co2_saved: format_kg(co2_kg),
            waste_reduced: format_kg(waste_kg),
            trees_saved: trees,
        }
    }

    pub fn empty() -> Self {
        Self::from_kilograms(0.0, 0.0, 0.0)
    }
}

/// Formats a mass with one decimal place, clamping negatives to zero.
pub fn format_kg(value: f64) -> String {
    format!("{:.1} kg", value.max(0.0))
}

/// A purchase reduced to the fields shared with the summary service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleOrder {
    pub title: Option<String>,
    pub category: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub purchased_at: Option<DateTime<Utc>>,
    pub is_circular: bool,
}

impl SampleOrder {
    pub fn from_record(record: &PurchaseRecord) -> Self {
        let product = record.product.as_ref();
        Self {
            title: product.and_then(|product| product.title.clone()),
            category: product.and_then(|product| product.category.clone()),
            price: record.price,
            purchased_at: record.purchased_at,
            is_circular: is_circular_purchase(record),
        }
    }
}

/// Deterministic output of the aggregator, before AI enrichment
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateInsights {
    pub sustainability_score: u8,
    pub metrics: InsightMetrics,
    pub impact: ImpactSummary,
    pub recommendations: Vec<String>,
    /// Most recent purchases first
    pub sample_orders: Vec<SampleOrder>,
}

impl AggregateInsights {
    /// Terminal result for a buyer with no purchases in range
    pub fn empty() -> Self {
        Self {
            sustainability_score: 0,
            metrics: InsightMetrics::empty(),
            impact: ImpactSummary::empty(),
            recommendations: EMPTY_STATE_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
            sample_orders: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.orders_analyzed == 0
    }
}

/// Optional generated narrative. All-or-nothing: either both fields come from
/// one successful completion or the section is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiSection {
    pub environmental_impact: Option<String>,
    pub recommended_actions: Vec<String>,
}

impl AiSection {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_unavailable(&self) -> bool {
        self.environmental_impact.is_none() && self.recommended_actions.is_empty()
    }
}

/// Final insight contract returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightResult {
    /// Bounded heuristic score (0 - 100)
    pub sustainability_score: u8,
    pub metrics: InsightMetrics,
    pub impact: ImpactSummary,
    pub recommendations: Vec<String>,
    pub ai: AiSection,
}
