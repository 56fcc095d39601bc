use crate::types::{Classification, MatchConfig, Severity};
use crate::utils::contains_ci;

/// Severity of a structured record, looked up from its classification tier.
pub fn record_severity(classification: Classification) -> Severity {
    match classification {
        Classification::ClassI => Severity::High,
        Classification::ClassII => Severity::Medium,
        Classification::ClassIII | Classification::Unclassified => Severity::Low,
    }
}

/// Severity of a feed item: high when the text names a pathogen or carries a
/// high-severity phrase, medium otherwise.
pub fn feed_severity(title: &str, description: &str, config: &MatchConfig) -> Severity {
    // Each field is checked on its own so a phrase never spans the two
    let hit = config
        .pathogen_terms
        .iter()
        .chain(config.high_severity_phrases.iter())
        .any(|term| contains_ci(title, term) || contains_ci(description, term));

    if hit {
        Severity::High
    } else {
        Severity::Medium
    }
}
