use tracing::debug;

use crate::types::{CorrelationSummary, CrossReference, MatchConfig};

/// Stable sort by confidence, highest first. Equal scores keep their
/// incoming order.
pub fn rank(references: &mut [CrossReference]) {
    references.sort_by(|a, b| b.confidence_score.total_cmp(&a.confidence_score));
}

pub fn ranked(mut references: Vec<CrossReference>) -> Vec<CrossReference> {
    rank(&mut references);
    references
}

pub fn is_ranked(references: &[CrossReference]) -> bool {
    references
        .windows(2)
        .all(|pair| pair[0].confidence_score >= pair[1].confidence_score)
}

/// Strictly above the confirmed threshold.
pub fn is_confirmed(score: f64, config: &MatchConfig) -> bool {
    score > config.confirmed_threshold
}

/// Between the pending floor and the confirmed threshold, both inclusive.
pub fn is_pending(score: f64, config: &MatchConfig) -> bool {
    score >= config.pending_floor && score <= config.confirmed_threshold
}

pub fn confirmed_count(references: &[CrossReference], config: &MatchConfig) -> usize {
    references
        .iter()
        .filter(|r| is_confirmed(r.confidence_score, config))
        .count()
}

pub fn pending_count(references: &[CrossReference], config: &MatchConfig) -> usize {
    references
        .iter()
        .filter(|r| is_pending(r.confidence_score, config))
        .count()
}

pub fn summarize(
    references: &[CrossReference],
    total_events: usize,
    config: &MatchConfig,
) -> CorrelationSummary {
    let summary = CorrelationSummary {
        confirmed: confirmed_count(references, config),
        pending: pending_count(references, config),
        total_references: references.len(),
        total_events,
    };
    debug!("Correlation summary: {:?}", summary);
    summary
}
