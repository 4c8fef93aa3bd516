use super::types::{AggregateInsights, AiSection, InsightResult};

/// Merge deterministic aggregate output with the optional AI section.
pub fn assemble(aggregate: AggregateInsights, ai: AiSection) -> InsightResult {
    InsightResult {
        sustainability_score: aggregate.sustainability_score,
        metrics: aggregate.metrics,
        impact: aggregate.impact,
        recommendations: aggregate.recommendations,
        ai,
    }
}
