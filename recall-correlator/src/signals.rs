//! Independent similarity rules between one structured record and one feed
//! item. Each rule inspects the pair on its own and reports zero or more
//! hits; the matcher sums them.

use chrono::Duration;
use tracing::debug;

use crate::types::{FeedItem, MatchConfig, MatchType, StructuredRecord};
use crate::utils::{contains_ci, tokenize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Company,
    RecallNumber,
    ProductKeyword,
    Contamination,
    Temporal,
}

impl SignalKind {
    /// Fixed evaluation order. Match-type tie handling and the order of
    /// `match_details` both depend on it.
    pub const EVALUATION_ORDER: [SignalKind; 5] = [
        SignalKind::Company,
        SignalKind::RecallNumber,
        SignalKind::ProductKeyword,
        SignalKind::Contamination,
        SignalKind::Temporal,
    ];

    pub fn implied_match_type(&self) -> Option<MatchType> {
        match self {
            Self::Company => Some(MatchType::Company),
            Self::RecallNumber => Some(MatchType::RecallNumber),
            Self::ProductKeyword => Some(MatchType::Product),
            Self::Contamination | Self::Temporal => None,
        }
    }

    pub fn evaluate(
        &self,
        record: &StructuredRecord,
        item: &FeedItem,
        config: &MatchConfig,
    ) -> Vec<SignalHit> {
        match self {
            Self::Company => company_signal(record, item, config).into_iter().collect(),
            Self::RecallNumber => recall_number_signal(record, item, config).into_iter().collect(),
            Self::ProductKeyword => product_keyword_signals(record, item, config),
            Self::Contamination => contamination_signal(record, item, config).into_iter().collect(),
            Self::Temporal => temporal_signal(record, item, config).into_iter().collect(),
        }
    }
}

/// One fired signal.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalHit {
    pub kind: SignalKind,
    pub contribution: f64,
    pub explanation: String,
}

impl SignalHit {
    fn new(kind: SignalKind, contribution: f64, explanation: String) -> Self {
        Self {
            kind,
            contribution,
            explanation,
        }
    }

    pub fn implied_match_type(&self) -> Option<MatchType> {
        self.kind.implied_match_type()
    }
}

/// Company name appears in the feed title.
pub fn company_signal(
    record: &StructuredRecord,
    item: &FeedItem,
    config: &MatchConfig,
) -> Option<SignalHit> {
    let company = record.company_name.as_deref()?.trim();
    if !contains_ci(&item.title, company) {
        return None;
    }
    Some(SignalHit::new(
        SignalKind::Company,
        config.weights.company,
        format!("Company name match: {}", company),
    ))
}

/// Recall number appears verbatim in the feed title or description.
pub fn recall_number_signal(
    record: &StructuredRecord,
    item: &FeedItem,
    config: &MatchConfig,
) -> Option<SignalHit> {
    let number = record.recall_number.as_deref()?.trim();
    if number.is_empty() {
        return None;
    }
    if !item.title.contains(number) && !item.description.contains(number) {
        return None;
    }
    Some(SignalHit::new(
        SignalKind::RecallNumber,
        config.weights.recall_number,
        format!("Recall number match: {}", number),
    ))
}

/// One hit per sufficiently long product token found in the feed text.
pub fn product_keyword_signals(
    record: &StructuredRecord,
    item: &FeedItem,
    config: &MatchConfig,
) -> Vec<SignalHit> {
    let Some(product) = record.product_description.as_deref() else {
        return Vec::new();
    };
    let text = format!("{} {}", item.title, item.description).to_lowercase();

    tokenize(product)
        .into_iter()
        .filter(|token| token.chars().count() > config.min_token_length)
        .filter(|token| text.contains(token.as_str()))
        .map(|token| {
            SignalHit::new(
                SignalKind::ProductKeyword,
                config.weights.product_token,
                format!("Product keyword match: {}", token),
            )
        })
        .collect()
}

/// A pathogen named in the recall reason also appears in the feed text.
pub fn contamination_signal(
    record: &StructuredRecord,
    item: &FeedItem,
    config: &MatchConfig,
) -> Option<SignalHit> {
    let reason = record.reason_for_recall.as_deref()?;

    // Title and description are checked separately; joining them would let
    // a multi-word term like "e. coli" match across the boundary.
    let shared: Vec<&str> = config
        .pathogen_terms
        .iter()
        .map(|term| term.trim())
        .filter(|term| contains_ci(reason, term))
        .filter(|term| contains_ci(&item.title, term) || contains_ci(&item.description, term))
        .collect();
    if shared.is_empty() {
        return None;
    }
    Some(SignalHit::new(
        SignalKind::Contamination,
        config.weights.contamination,
        format!("Contamination match: {}", shared.join(", ")),
    ))
}

/// Initiation and publication dates fall within the configured window.
pub fn temporal_signal(
    record: &StructuredRecord,
    item: &FeedItem,
    config: &MatchConfig,
) -> Option<SignalHit> {
    let delta = record
        .initiation_date
        .signed_duration_since(item.publication_date);
    let gap = if delta < Duration::zero() { -delta } else { delta };
    // A window too large for chrono covers every pair
    let within = Duration::try_days(config.temporal_window_days)
        .map_or(true, |window| gap <= window);
    if !within {
        return None;
    }
    Some(SignalHit::new(
        SignalKind::Temporal,
        config.weights.temporal,
        format!("Temporal proximity: {} day(s) apart", gap.num_days()),
    ))
}

/// Every hit for the pair, in evaluation order.
pub fn evaluate_all(
    record: &StructuredRecord,
    item: &FeedItem,
    config: &MatchConfig,
) -> Vec<SignalHit> {
    let hits: Vec<SignalHit> = SignalKind::EVALUATION_ORDER
        .iter()
        .flat_map(|kind| kind.evaluate(record, item, config))
        .collect();

    for hit in &hits {
        debug!(
            "Signal {:?} fired for record {} ({:+.2}): {}",
            hit.kind, record.id, hit.contribution, hit.explanation
        );
    }
    hits
}
