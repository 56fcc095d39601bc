//! Structured enforcement records in the openFDA enforcement report shape.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::types::{Classification, Result, StructuredRecord};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEnforcement {
    recall_number: Option<String>,
    event_id: Option<String>,
    recalling_firm: Option<String>,
    product_description: Option<String>,
    classification: Option<String>,
    reason_for_recall: Option<String>,
    recall_initiation_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EnforcementDocument {
    Envelope { results: Vec<RawEnforcement> },
    Bare(Vec<RawEnforcement>),
}

/// Parse an enforcement document, either `{"results": [...]}` or a bare
/// array. Entries whose initiation date is missing or malformed are skipped
/// with a warning.
pub fn parse_enforcement(content: &str, endpoint: &str) -> Result<Vec<StructuredRecord>> {
    // Accept both the API envelope and a bare array
    let raw = match serde_json::from_str::<EnforcementDocument>(content)? {
        EnforcementDocument::Envelope { results } => results,
        EnforcementDocument::Bare(results) => results,
    };
    let total = raw.len();

    let records: Vec<StructuredRecord> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(position, entry)| convert(position, entry, endpoint))
        .collect();

    info!(
        "Parsed {} of {} enforcement records from endpoint '{}'",
        records.len(),
        total,
        endpoint
    );
    Ok(records)
}

fn convert(position: usize, entry: RawEnforcement, endpoint: &str) -> Option<StructuredRecord> {
    // Recall number is the preferred id, then the event id
    let recall_number = non_empty(entry.recall_number);
    let id = recall_number
        .clone()
        .or_else(|| non_empty(entry.event_id))
        .unwrap_or_else(|| format!("{}-{}", endpoint, position));

    // Records without a usable date are dropped, not failed
    let raw_date = entry.recall_initiation_date.unwrap_or_default();
    let Some(initiation_date) = parse_date(&raw_date) else {
        warn!(
            "Skipping enforcement record {} from '{}': unparseable initiation date '{}'",
            id, endpoint, raw_date
        );
        return None;
    };

    Some(StructuredRecord {
        id,
        company_name: non_empty(entry.recalling_firm),
        product_description: non_empty(entry.product_description),
        recall_number,
        classification: entry
            .classification
            .as_deref()
            .map(Classification::parse)
            .unwrap_or(Classification::Unclassified),
        reason_for_recall: non_empty(entry.reason_for_recall),
        initiation_date,
        source_endpoint: endpoint.to_string(),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts `YYYYMMDD`, `YYYY-MM-DD` and RFC 3339. Plain dates map to
/// midnight UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // openFDA uses YYYYMMDD; exports sometimes carry ISO dates
    ["%Y%m%d", "%Y-%m-%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
