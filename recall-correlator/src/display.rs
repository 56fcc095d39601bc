//! Plain-text rendering of a correlation report.

use std::fmt::Write;

use crate::correlator::CorrelationReport;
use crate::types::{CrossReference, TimelineEvent};
use crate::utils::truncate_chars;

const TITLE_WIDTH: usize = 72;

pub fn render_report(report: &CorrelationReport, limit: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "── Timeline ({} events) ──", report.timeline.len());
    for event in report.timeline.iter().take(limit) {
        out.push_str(&render_event(event));
        out.push('\n');
    }
    if report.timeline.len() > limit {
        let _ = writeln!(out, "  … {} more", report.timeline.len() - limit);
    }

    let _ = writeln!(
        out,
        "\n── Cross-references ({}) ──",
        report.cross_references.len()
    );
    for reference in report.cross_references.iter().take(limit) {
        out.push_str(&render_reference(reference));
    }
    if report.cross_references.len() > limit {
        let _ = writeln!(out, "  … {} more", report.cross_references.len() - limit);
    }

    let summary = &report.summary;
    let _ = writeln!(out, "\n── Summary ──");
    let _ = writeln!(out, "  confirmed:        {}", summary.confirmed);
    let _ = writeln!(out, "  pending review:   {}", summary.pending);
    let _ = writeln!(out, "  cross-references: {}", summary.total_references);
    let _ = writeln!(out, "  timeline events:  {}", summary.total_events);
    out
}

pub fn render_event(event: &TimelineEvent) -> String {
    let links = if event.correlation_ids.is_empty() {
        String::new()
    } else {
        format!("  [{} linked]", event.correlation_ids.len())
    };
    format!(
        "  {}  {:<6}  {}  ({}){}",
        event.timestamp.format("%Y-%m-%d"),
        event.severity.to_string(),
        truncate_chars(&event.title, TITLE_WIDTH),
        event.source_label,
        links
    )
}

pub fn render_reference(reference: &CrossReference) -> String {
    let mut out = format!(
        "  {:.2}  {:<13}  {}  ↔  {}\n",
        reference.confidence_score,
        reference.match_type.to_string(),
        reference.structured_record.id,
        truncate_chars(&reference.feed_item.title, TITLE_WIDTH)
    );
    for detail in &reference.match_details {
        let _ = writeln!(out, "          - {}", detail);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlator::Correlator;
    use crate::types::{Classification, FeedItem, StructuredRecord};
    use chrono::{TimeZone, Utc};

    #[test]
    fn renders_all_sections() {
        let record = StructuredRecord {
            id: "F-1234".to_string(),
            company_name: Some("Acme Foods".to_string()),
            product_description: Some("Frozen vegetable medley".to_string()),
            recall_number: Some("F-1234".to_string()),
            classification: Classification::ClassI,
            reason_for_recall: None,
            initiation_date: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
            source_endpoint: "food".to_string(),
        };
        let item = FeedItem {
            title: "Acme Foods recall alert".to_string(),
            description: String::new(),
            publication_date: Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap(),
            link: "https://example.com/acme".to_string(),
            source_name: "FDA Recalls".to_string(),
            category: None,
        };
        let report = Correlator::default().correlate(&[record], &[item]);
        let text = render_report(&report, 10);

        assert!(text.contains("── Timeline (2 events) ──"));
        assert!(text.contains("2024-01-11  medium  Acme Foods recall alert  (FDA Recalls)  [1 linked]"));
        assert!(text.contains("1.00  company        F-1234  ↔  Acme Foods recall alert"));
        assert!(text.contains("- Company name match: Acme Foods"));
        assert!(text.contains("confirmed:        1"));
    }
}
