pub mod config;
pub mod domain;
pub mod errors;
pub mod impact;
pub mod insights;

pub use domain::product::{ProductDescriptor, ProductId};
pub use domain::purchase::{BuyerId, PurchaseRecord};
pub use errors::{ApplicationError, DomainError};
pub use impact::{estimate_co2, is_circular, ImpactEstimate, ImpactFactors, PortfolioMultipliers};
pub use insights::{
    assemble, AggregateInsights, AiSection, ImpactSummary, InsightAggregator, InsightMetrics,
    InsightResult, SampleOrder,
};
