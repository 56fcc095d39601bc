use std::path::Path;

use serde::{Deserialize, Serialize};

// Use the interfaces crate for core types
pub use interfaces::defs::{
    Classification, CorrelationSummary, CrossReference, EventKind, FeedItem, MatchType,
    RawPayload, Severity, StructuredRecord, TimelineEvent,
};
pub use interfaces::window::TimeWindow;

/// Largest accepted `temporal_window_days` (about a century).
pub const MAX_TEMPORAL_WINDOW_DAYS: i64 = 36_500;

/// How the match type of a cross-reference is chosen when several
/// type-bearing signals fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTypePolicy {
    /// Label with the type of the highest-weight signal that fired.
    #[default]
    HighestWeight,
    /// Label with the type of the last type-bearing signal evaluated.
    LastWins,
}

/// Per-signal weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeights {
    pub company: f64,
    pub recall_number: f64,
    /// Applied once per matching product token.
    pub product_token: f64,
    pub contamination: f64,
    pub temporal: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            company: 0.8,
            recall_number: 0.9,
            product_token: 0.2,
            contamination: 0.6,
            temporal: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// A pair is kept only when its score is strictly above this.
    pub acceptance_threshold: f64,
    /// Scores strictly above this count as confirmed.
    pub confirmed_threshold: f64,
    /// Lower inclusive bound of the pending-review bucket; the upper
    /// inclusive bound is `confirmed_threshold`.
    pub pending_floor: f64,
    pub weights: SignalWeights,
    pub temporal_window_days: i64,
    /// Product tokens must be strictly longer than this to count.
    pub min_token_length: usize,
    pub pathogen_terms: Vec<String>,
    /// Phrases in a feed item that mark it as high severity on their own.
    pub high_severity_phrases: Vec<String>,
    pub match_type_policy: MatchTypePolicy,
    pub workers: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.3,
            confirmed_threshold: 0.7,
            pending_floor: 0.5,
            weights: SignalWeights::default(),
            temporal_window_days: 3,
            min_token_length: 4,
            pathogen_terms: ["listeria", "salmonella", "e. coli", "hepatitis", "norovirus"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            high_severity_phrases: [
                "class i recall",
                "class 1 recall",
                "contamination",
                "contaminated",
                "death",
                "serious adverse",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            match_type_policy: MatchTypePolicy::default(),
            workers: 4,
        }
    }
}

impl MatchConfig {
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<()> {
        let bounds = [
            ("acceptance_threshold", self.acceptance_threshold),
            ("confirmed_threshold", self.confirmed_threshold),
            ("pending_floor", self.pending_floor),
        ];
        for (name, value) in bounds {
            if !(0.0..=1.0).contains(&value) {
                return Err(CorrelatorError::Config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.pending_floor > self.confirmed_threshold {
            return Err(CorrelatorError::Config(
                "pending_floor must not exceed confirmed_threshold".to_string(),
            ));
        }
        let weights = [
            self.weights.company,
            self.weights.recall_number,
            self.weights.product_token,
            self.weights.contamination,
            self.weights.temporal,
        ];
        if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) {
            return Err(CorrelatorError::Config(
                "signal weights must be finite and non-negative".to_string(),
            ));
        }
        if !(0..=MAX_TEMPORAL_WINDOW_DAYS).contains(&self.temporal_window_days) {
            return Err(CorrelatorError::Config(format!(
                "temporal_window_days must be within [0, {MAX_TEMPORAL_WINDOW_DAYS}], got {}",
                self.temporal_window_days
            )));
        }
        if self.workers == 0 {
            return Err(CorrelatorError::Config("workers must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CorrelatorError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Matcher task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, CorrelatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = MatchConfig::from_json(r#"{"pathogen_terms": ["cyclospora"], "weights": {"temporal": 0.1}}"#)
            .unwrap();
        assert_eq!(config.pathogen_terms, vec!["cyclospora".to_string()]);
        assert_eq!(config.weights.temporal, 0.1);
        assert_eq!(config.weights.company, 0.8);
        assert_eq!(config.acceptance_threshold, 0.3);
        assert_eq!(config.match_type_policy, MatchTypePolicy::HighestWeight);
    }

    #[test]
    fn policy_is_read_from_json() {
        let config = MatchConfig::from_json(r#"{"match_type_policy": "last_wins"}"#).unwrap();
        assert_eq!(config.match_type_policy, MatchTypePolicy::LastWins);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let err = MatchConfig::from_json(r#"{"acceptance_threshold": 1.5}"#).unwrap_err();
        assert!(matches!(err, CorrelatorError::Config(_)));
    }

    #[test]
    fn rejects_unbounded_temporal_window() {
        let err = MatchConfig::from_json(r#"{"temporal_window_days": 200000000000000}"#).unwrap_err();
        assert!(matches!(err, CorrelatorError::Config(_)));
        let err = MatchConfig::from_json(r#"{"temporal_window_days": -1}"#).unwrap_err();
        assert!(matches!(err, CorrelatorError::Config(_)));
        assert!(MatchConfig::from_json(r#"{"temporal_window_days": 36500}"#).is_ok());
    }

    #[test]
    fn rejects_zero_workers() {
        let err = MatchConfig::from_json(r#"{"workers": 0}"#).unwrap_err();
        assert!(matches!(err, CorrelatorError::Config(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = MatchConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, CorrelatorError::Serialization(_)));
    }
}
