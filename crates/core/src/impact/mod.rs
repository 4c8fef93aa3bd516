//! Circular-purchase classification and CO2 impact estimation

pub mod classifier;
pub mod estimator;
pub mod factors;

pub use classifier::{is_circular, is_circular_purchase, NEW_CONDITION_LABELS};
pub use estimator::{estimate_co2, ImpactEstimate};
pub use factors::{ImpactFactors, PortfolioMultipliers, DEFAULT_PORTFOLIO_MULTIPLIERS};

/// Rounds to `places` decimal places, ties to even.
pub(crate) fn round_dp(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round_ties_even() / scale
}
