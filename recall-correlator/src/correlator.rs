use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::matcher::Matcher;
use crate::ranking::{ranked, summarize};
use crate::timeline::TimelineBuilder;
use crate::types::{
    CorrelationSummary, CrossReference, FeedItem, MatchConfig, Result, StructuredRecord,
    TimelineEvent,
};

/// Everything the display layer needs for one time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    /// Newest first.
    pub timeline: Vec<TimelineEvent>,
    /// Highest confidence first.
    pub cross_references: Vec<CrossReference>,
    pub summary: CorrelationSummary,
}

impl CorrelationReport {
    /// Cross-references attached to the given timeline event.
    pub fn references_for(&self, event_id: &str) -> Vec<&CrossReference> {
        let Some(event) = self.timeline.iter().find(|e| e.id == event_id) else {
            return Vec::new();
        };
        self.cross_references
            .iter()
            .filter(|r| event.correlation_ids.contains(&r.id))
            .collect()
    }
}

/// Runs the timeline builder, matcher, ranker and aggregator over one batch.
pub struct Correlator {
    matcher: Matcher,
}

impl Correlator {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            matcher: Matcher::new(config),
        }
    }

    pub fn config(&self) -> &MatchConfig {
        self.matcher.config()
    }

    pub fn correlate(&self, records: &[StructuredRecord], items: &[FeedItem]) -> CorrelationReport {
        let timeline = TimelineBuilder::new(self.config()).build(records, items);
        let references = self.matcher.match_all(records, items);
        self.assemble(timeline, references)
    }

    /// Like [`Correlator::correlate`] with the pairwise pass fanned out over
    /// the configured worker count.
    pub async fn correlate_concurrent(
        &self,
        records: Vec<StructuredRecord>,
        items: Vec<FeedItem>,
    ) -> Result<CorrelationReport> {
        let timeline = TimelineBuilder::new(self.config()).build(&records, &items);
        let references = self
            .matcher
            .match_concurrent(Arc::new(records), Arc::new(items))
            .await?;
        Ok(self.assemble(timeline, references))
    }

    fn assemble(
        &self,
        mut timeline: Vec<TimelineEvent>,
        references: Vec<CrossReference>,
    ) -> CorrelationReport {
        let cross_references = ranked(references);
        attach_correlation_ids(&mut timeline, &cross_references);
        let summary = summarize(&cross_references, timeline.len(), self.config());

        info!(
            "Correlated {} events: {} cross-references ({} confirmed, {} pending review)",
            summary.total_events, summary.total_references, summary.confirmed, summary.pending
        );
        CorrelationReport {
            timeline,
            cross_references,
            summary,
        }
    }
}

impl Default for Correlator {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

/// Adds each cross-reference id to the events of both records it links.
pub fn attach_correlation_ids(timeline: &mut [TimelineEvent], references: &[CrossReference]) {
    let mut by_id: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, event) in timeline.iter().enumerate() {
        by_id.entry(event.id.clone()).or_default().push(index);
    }

    for reference in references {
        let ends = [
            reference.structured_record.source_id(),
            reference.feed_item.source_id(),
        ];
        for end in ends {
            for &index in by_id.get(&end).into_iter().flatten() {
                timeline[index].correlation_ids.insert(reference.id);
            }
        }
    }
}
