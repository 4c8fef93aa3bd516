//! Sustainability Insight Engine
//!
//! Turns a buyer's purchase history into a bounded sustainability score,
//! portfolio impact totals, and an ordered list of recommendations. The
//! optional AI narrative is produced elsewhere and merged in by
//! [`assemble`].

mod aggregator;
mod assembler;
mod types;

pub use aggregator::{
    recommendations, sustainability_score, InsightAggregator, RecommendationSignals,
};
pub use assembler::assemble;
pub use types::*;

/// Score every non-empty history starts from
pub const SCORE_BASE: f64 = 40.0;

/// Weight applied to the reuse rate percentage (max contribution 40)
pub const REUSE_RATE_WEIGHT: f64 = 0.4;

/// Points per circular purchase, before the cap
pub const COUNT_BONUS_PER_CIRCULAR_ORDER: usize = 5;

/// Cap on the circular-count contribution
pub const COUNT_BONUS_CAP: usize = 30;

pub const MAX_SCORE: f64 = 100.0;

/// Reuse rates below this trigger the pre-loved nudge
pub const LOW_REUSE_THRESHOLD_PCT: f64 = 40.0;

/// Lower bound for the dominant-category nudge threshold
pub const MIN_DOMINANT_CATEGORY_COUNT: usize = 2;

/// Purchases shared with the summary service
pub const SAMPLE_ORDER_LIMIT: usize = 5;

pub const EMPTY_STATE_RECOMMENDATIONS: [&str; 2] = [
    "Make your first circular purchase to start building an impact profile.",
    "Browse community favourites for easy eco-friendly wins.",
];
