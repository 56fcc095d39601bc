use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::severity::{feed_severity, record_severity};
use crate::types::{EventKind, FeedItem, MatchConfig, RawPayload, StructuredRecord, TimelineEvent};
use crate::utils::truncate_chars;

const TITLE_PRODUCT_CHARS: usize = 100;
const NO_REASON: &str = "No reason specified";

/// Builds the merged, newest-first timeline of both record types.
pub struct TimelineBuilder<'a> {
    config: &'a MatchConfig,
}

impl<'a> TimelineBuilder<'a> {
    pub fn new(config: &'a MatchConfig) -> Self {
        Self { config }
    }

    pub fn record_event(&self, record: &StructuredRecord) -> TimelineEvent {
        let title = match record.product_description.as_deref().map(str::trim) {
            Some(product) if !product.is_empty() => format!(
                "{}: {}",
                record.classification,
                truncate_chars(product, TITLE_PRODUCT_CHARS)
            ),
            _ => record.classification.to_string(),
        };
        let description = record
            .reason_for_recall
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .unwrap_or(NO_REASON)
            .to_string();

        TimelineEvent {
            id: record.source_id(),
            kind: EventKind::StructuredRecord,
            timestamp: record.initiation_date,
            title,
            description,
            severity: record_severity(record.classification),
            source_label: format!("Enforcement ({})", record.source_endpoint),
            raw_payload: RawPayload::Structured(record.clone()),
            correlation_ids: BTreeSet::new(),
        }
    }

    pub fn feed_event(&self, item: &FeedItem) -> TimelineEvent {
        TimelineEvent {
            id: item.source_id(),
            kind: EventKind::FeedItem,
            timestamp: item.publication_date,
            title: item.title.clone(),
            description: item.description.clone(),
            severity: feed_severity(&item.title, &item.description, self.config),
            source_label: item.source_name.clone(),
            raw_payload: RawPayload::Feed(item.clone()),
            correlation_ids: BTreeSet::new(),
        }
    }

    pub fn build(&self, records: &[StructuredRecord], items: &[FeedItem]) -> Vec<TimelineEvent> {
        let mut events: Vec<TimelineEvent> = records
            .iter()
            .map(|record| self.record_event(record))
            .chain(items.iter().map(|item| self.feed_event(item)))
            .collect();

        events.sort_by(newest_first);

        debug!(
            "Projected {} structured records and {} feed items",
            records.len(),
            items.len()
        );
        info!("Built timeline with {} events", events.len());
        events
    }
}

/// Timestamp descending; identical timestamps fall back to ascending id.
pub fn newest_first(a: &TimelineEvent, b: &TimelineEvent) -> Ordering {
    b.timestamp
        .cmp(&a.timestamp)
        .then_with(|| a.id.cmp(&b.id))
}

pub fn is_sorted_desc(events: &[TimelineEvent]) -> bool {
    events.windows(2).all(|pair| pair[0].timestamp >= pair[1].timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Classification, Severity};
    use chrono::{TimeZone, Utc};

    fn record(id: &str, day: u32) -> StructuredRecord {
        StructuredRecord {
            id: id.to_string(),
            company_name: Some("Acme Foods".to_string()),
            product_description: Some("Frozen vegetable medley".to_string()),
            recall_number: Some(id.to_string()),
            classification: Classification::ClassI,
            reason_for_recall: None,
            initiation_date: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            source_endpoint: "food".to_string(),
        }
    }

    fn item(link: &str, day: u32) -> FeedItem {
        FeedItem {
            title: "Recall notice".to_string(),
            description: "Details".to_string(),
            publication_date: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            link: link.to_string(),
            source_name: "FDA Recalls".to_string(),
            category: None,
        }
    }

    #[test]
    fn record_projection() {
        let config = MatchConfig::default();
        let event = TimelineBuilder::new(&config).record_event(&record("F-1", 3));
        assert_eq!(event.kind, EventKind::StructuredRecord);
        assert_eq!(event.title, "Class I: Frozen vegetable medley");
        assert_eq!(event.description, "No reason specified");
        assert_eq!(event.severity, Severity::High);
        assert_eq!(event.source_label, "Enforcement (food)");
        assert!(event.correlation_ids.is_empty());
        assert!(matches!(event.raw_payload, RawPayload::Structured(_)));
    }

    #[test]
    fn record_without_product_uses_classification() {
        let config = MatchConfig::default();
        let mut rec = record("F-1", 3);
        rec.product_description = None;
        rec.reason_for_recall = Some("Undeclared milk".to_string());
        let event = TimelineBuilder::new(&config).record_event(&rec);
        assert_eq!(event.title, "Class I");
        assert_eq!(event.description, "Undeclared milk");
    }

    #[test]
    fn merged_newest_first() {
        let config = MatchConfig::default();
        let events = TimelineBuilder::new(&config).build(
            &[record("F-1", 3), record("F-2", 9)],
            &[item("https://example.com/a", 5)],
        );
        assert_eq!(events.len(), 3);
        assert!(is_sorted_desc(&events));
        assert_eq!(events[0].id, "enforcement:food:F-2");
        assert_eq!(events[1].kind, EventKind::FeedItem);
    }

    #[test]
    fn ties_order_by_id() {
        let config = MatchConfig::default();
        let events = TimelineBuilder::new(&config).build(
            &[record("F-9", 4), record("F-1", 4)],
            &[],
        );
        assert_eq!(events[0].id, "enforcement:food:F-1");
        assert_eq!(events[1].id, "enforcement:food:F-9");
    }

    #[test]
    fn empty_and_single_are_sorted() {
        let config = MatchConfig::default();
        let builder = TimelineBuilder::new(&config);
        assert!(builder.build(&[], &[]).is_empty());
        assert!(is_sorted_desc(&builder.build(&[], &[item("x", 1)])));
    }
}
