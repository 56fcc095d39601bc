use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::signals::{evaluate_all, SignalHit};
use crate::types::{
    CrossReference, FeedItem, MatchConfig, MatchType, MatchTypePolicy, Result, StructuredRecord,
};

/// Scores pre-rounded to this many decimal places so that float noise in
/// sums like 0.1 + 0.2 never flips a threshold comparison.
const SCORE_DECIMALS: i32 = 6;

/// Outcome of scoring one pair, whether or not it clears the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct PairScore {
    /// Sum of all contributions before clamping.
    pub raw: f64,
    /// `raw` clamped to `[0.0, 1.0]`.
    pub confidence: f64,
    pub match_type: MatchType,
    pub details: Vec<String>,
}

impl PairScore {
    pub fn from_hits(hits: &[SignalHit], policy: MatchTypePolicy) -> Self {
        let factor = 10f64.powi(SCORE_DECIMALS);
        let sum: f64 = hits.iter().map(|hit| hit.contribution).sum();
        let raw = (sum * factor).round() / factor;

        Self {
            raw,
            confidence: raw.clamp(0.0, 1.0),
            match_type: select_match_type(hits, policy),
            details: hits.iter().map(|hit| hit.explanation.clone()).collect(),
        }
    }
}

/// Picks the label for a pair. Signals that imply no type are ignored; with
/// none left the pair is labelled `Keyword`.
pub fn select_match_type(hits: &[SignalHit], policy: MatchTypePolicy) -> MatchType {
    let typed = hits
        .iter()
        .filter_map(|hit| hit.implied_match_type().map(|t| (hit.contribution, t)));

    let chosen = match policy {
        MatchTypePolicy::LastWins => typed.last().map(|(_, t)| t),
        MatchTypePolicy::HighestWeight => typed
            .fold(None, |best: Option<(f64, MatchType)>, (weight, t)| match best {
                Some((best_weight, _)) if weight <= best_weight => best,
                _ => Some((weight, t)),
            })
            .map(|(_, t)| t),
    };
    chosen.unwrap_or(MatchType::Keyword)
}

/// Runs every signal over every (record, item) pair.
#[derive(Debug, Clone)]
pub struct Matcher {
    config: Arc<MatchConfig>,
}

impl Matcher {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn score_pair(&self, record: &StructuredRecord, item: &FeedItem) -> PairScore {
        let hits = evaluate_all(record, item, &self.config);
        PairScore::from_hits(&hits, self.config.match_type_policy)
    }

    /// The cross-reference for a pair, if its score clears the acceptance
    /// threshold.
    pub fn match_pair(&self, record: &StructuredRecord, item: &FeedItem) -> Option<CrossReference> {
        let score = self.score_pair(record, item);

        // Threshold applies to the unclamped sum
        if score.raw <= self.config.acceptance_threshold {
            return None;
        }

        debug!(
            "Matched record {} with feed item '{}' at {:.2} ({})",
            record.id, item.title, score.confidence, score.match_type
        );
        Some(CrossReference {
            id: CrossReference::pair_id(record, item),
            structured_record: record.clone(),
            feed_item: item.clone(),
            confidence_score: score.confidence,
            match_type: score.match_type,
            match_details: score.details,
        })
    }

    pub fn match_record(&self, record: &StructuredRecord, items: &[FeedItem]) -> Vec<CrossReference> {
        items
            .iter()
            .filter_map(|item| self.match_pair(record, item))
            .collect()
    }

    /// All cross-references in record-major, item-minor order. Unranked.
    pub fn match_all(&self, records: &[StructuredRecord], items: &[FeedItem]) -> Vec<CrossReference> {
        let references: Vec<CrossReference> = records
            .iter()
            .flat_map(|record| self.match_record(record, items))
            .collect();

        info!(
            "Compared {} records against {} feed items: {} cross-references",
            records.len(),
            items.len(),
            references.len()
        );
        references
    }

    /// Same output as [`Matcher::match_all`], with record chunks scored on
    /// the blocking pool and merged back in chunk order.
    pub async fn match_concurrent(
        &self,
        records: Arc<Vec<StructuredRecord>>,
        items: Arc<Vec<FeedItem>>,
    ) -> Result<Vec<CrossReference>> {
        if records.is_empty() || items.is_empty() {
            return Ok(Vec::new());
        }

        // One contiguous chunk of records per worker
        let workers = self.config.workers.max(1);
        let chunk_size = records.len().div_ceil(workers);
        let mut tasks = JoinSet::new();

        for (chunk_index, start) in (0..records.len()).step_by(chunk_size).enumerate() {
            let end = (start + chunk_size).min(records.len());
            let matcher = self.clone();
            let records = Arc::clone(&records);
            let items = Arc::clone(&items);

            tasks.spawn_blocking(move || {
                let found: Vec<CrossReference> = records[start..end]
                    .iter()
                    .flat_map(|record| matcher.match_record(record, &items))
                    .collect();
                (chunk_index, found)
            });
        }

        // Restore chunk order so output matches the sequential pass
        let mut chunks = Vec::with_capacity(workers);
        while let Some(joined) = tasks.join_next().await {
            chunks.push(joined?);
        }
        chunks.sort_by_key(|(chunk_index, _)| *chunk_index);

        let references: Vec<CrossReference> =
            chunks.into_iter().flat_map(|(_, found)| found).collect();

        info!(
            "Compared {} records against {} feed items on {} workers: {} cross-references",
            records.len(),
            items.len(),
            workers,
            references.len()
        );
        Ok(references)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}
