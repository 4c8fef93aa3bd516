//! Impact factor tables
//!
//! Two independent sets of multipliers live here. [`ImpactFactors`] drives the
//! per-item estimate shown next to individual products, while
//! [`PortfolioMultipliers`] drives the flat per-order totals in an insight
//! summary. The numbers are illustrative heuristics, not lifecycle data.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::domain::product::normalize_label;

/// Baseline CO2 savings in kilograms for a typical circular purchase
pub const BASELINE_SAVINGS_KG: f64 = 1.8;

/// Applied on top of the weighted estimate when the item was donated
pub const DONATION_BONUS: f64 = 1.3;

pub const DEFAULT_CATEGORY_FACTOR: f64 = 1.0;
pub const DEFAULT_CONDITION_FACTOR: f64 = 1.1;

pub const CATEGORY_FACTORS: &[(&str, f64)] = &[
    ("electronics", 1.6),
    ("furniture", 1.8),
    ("clothing", 1.4),
    ("footwear", 1.3),
    ("home & living", 1.5),
    ("education", 1.1),
    ("lifestyle", 1.2),
];

pub const CONDITION_FACTORS: &[(&str, f64)] = &[
    ("new", 1.0),
    ("brand new", 1.0),
    ("used - like new", 1.4),
    ("used - good", 1.3),
    ("used", 1.2),
    ("pre-loved", 1.25),
];

/// Default per-order multipliers for portfolio summaries
pub const DEFAULT_PORTFOLIO_MULTIPLIERS: PortfolioMultipliers = PortfolioMultipliers {
    co2_kg_per_circular_order: 2.5,
    waste_kg_per_order: 0.8,
    trees_per_circular_order: 0.05,
};

/// Flat multipliers applied per analysed order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioMultipliers {
    /// Kilograms of CO2 avoided per circular order (default: 2.5)
    pub co2_kg_per_circular_order: f64,
    /// Kilograms of waste diverted per order of any kind (default: 0.8)
    pub waste_kg_per_order: f64,
    /// Tree-equivalents per circular order (default: 0.05)
    pub trees_per_circular_order: f64,
}

impl Default for PortfolioMultipliers {
    fn default() -> Self {
        DEFAULT_PORTFOLIO_MULTIPLIERS
    }
}

/// Immutable label-to-multiplier table for per-item estimates.
///
/// Keys are stored normalized (trimmed, lower-case) so lookups are
/// case-insensitive. Unknown or blank labels resolve to the table defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactFactors {
    baseline_kg: f64,
    donation_bonus: f64,
    default_category_factor: f64,
    default_condition_factor: f64,
    category_factors: BTreeMap<String, f64>,
    condition_factors: BTreeMap<String, f64>,
}

impl ImpactFactors {
    /// Empty table with the given baseline and bonus and the standard defaults
    pub fn new(baseline_kg: f64, donation_bonus: f64) -> Self {
        Self {
            baseline_kg,
            donation_bonus,
            default_category_factor: DEFAULT_CATEGORY_FACTOR,
            default_condition_factor: DEFAULT_CONDITION_FACTOR,
            category_factors: BTreeMap::new(),
            condition_factors: BTreeMap::new(),
        }
    }

    /// Shared standard table, built on first use
    pub fn standard() -> &'static ImpactFactors {
        static STANDARD: OnceLock<ImpactFactors> = OnceLock::new();
        STANDARD.get_or_init(ImpactFactors::default)
    }

    pub fn with_category_factor(mut self, label: &str, factor: f64) -> Self {
        self.category_factors.insert(normalize_label(Some(label)), factor);
        self
    }

    pub fn with_condition_factor(mut self, label: &str, factor: f64) -> Self {
        self.condition_factors.insert(normalize_label(Some(label)), factor);
        self
    }

    pub fn with_defaults(mut self, category_factor: f64, condition_factor: f64) -> Self {
        self.default_category_factor = category_factor;
        self.default_condition_factor = condition_factor;
        self
    }

    pub fn baseline_kg(&self) -> f64 {
        self.baseline_kg
    }

    pub fn donation_bonus(&self) -> f64 {
        self.donation_bonus
    }

    /// Factor for an already-normalized category key
    pub fn category_factor(&self, key: &str) -> f64 {
        self.category_factors.get(key).copied().unwrap_or(self.default_category_factor)
    }

    /// Factor for an already-normalized condition key
    pub fn condition_factor(&self, key: &str) -> f64 {
        self.condition_factors.get(key).copied().unwrap_or(self.default_condition_factor)
    }
}

impl Default for ImpactFactors {
    fn default() -> Self {
        let table = Self::new(BASELINE_SAVINGS_KG, DONATION_BONUS);
        let table = CATEGORY_FACTORS
            .iter()
            .fold(table, |table, (label, factor)| table.with_category_factor(label, *factor));
        CONDITION_FACTORS
            .iter()
            .fold(table, |table, (label, factor)| table.with_condition_factor(label, *factor))
    }
}
