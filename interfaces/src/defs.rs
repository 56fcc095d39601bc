use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Enforcement classification tier as published by the structured feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    ClassI,
    ClassII,
    ClassIII,
    Unclassified,
}

impl Classification {
    /// Accepts "Class I", "class ii", "III", "2" and similar spellings.
    /// Anything else is `Unclassified`.
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        let tier = lowered.strip_prefix("class").unwrap_or(&lowered).trim();
        match tier {
            "i" | "1" => Self::ClassI,
            "ii" | "2" => Self::ClassII,
            "iii" | "3" => Self::ClassIII,
            _ => Self::Unclassified,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ClassI => "Class I",
            Self::ClassII => "Class II",
            Self::ClassIII => "Class III",
            Self::Unclassified => "Unclassified",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        f.write_str(label)
    }
}

/// One authoritative enforcement entry.
///
/// Optional fields may be absent; matching treats an absent field as
/// contributing no signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredRecord {
    pub id: String,
    pub company_name: Option<String>,
    pub product_description: Option<String>,
    pub recall_number: Option<String>,
    pub classification: Classification,
    pub reason_for_recall: Option<String>,
    pub initiation_date: DateTime<Utc>,
    pub source_endpoint: String,
}

impl StructuredRecord {
    /// Stable identifier of the timeline event projected from this record.
    pub fn source_id(&self) -> String {
        format!("enforcement:{}:{}", self.source_endpoint, self.id)
    }
}

/// One syndicated alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub description: String,
    pub publication_date: DateTime<Utc>,
    pub link: String,
    pub source_name: String,
    pub category: Option<String>,
}

impl FeedItem {
    /// Stable identifier derived from link and title, or from title and date
    /// when the item carries no link. Items sharing a link stay distinct as
    /// long as their titles differ.
    pub fn source_id(&self) -> String {
        let key = if self.link.trim().is_empty() {
            format!("{}|{}", self.title, self.publication_date.to_rfc3339())
        } else {
            format!("{}|{}", self.link.trim(), self.title)
        };
        format!("feed:{}", Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    StructuredRecord,
    FeedItem,
}

/// The record a timeline event was projected from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum RawPayload {
    Structured(StructuredRecord),
    Feed(FeedItem),
}

impl RawPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Structured(_) => EventKind::StructuredRecord,
            Self::Feed(_) => EventKind::FeedItem,
        }
    }
}

/// Source-agnostic, display-ready projection of either record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: String,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub source_label: String,
    pub raw_payload: RawPayload,
    #[serde(default)]
    pub correlation_ids: BTreeSet<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Company,
    RecallNumber,
    Product,
    Keyword,
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Company => "company",
            Self::RecallNumber => "recall_number",
            Self::Product => "product",
            Self::Keyword => "keyword",
        };
        f.write_str(label)
    }
}

/// A scored candidate link between one structured record and one feed item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossReference {
    pub id: Uuid,
    pub structured_record: StructuredRecord,
    pub feed_item: FeedItem,
    /// Clamped to `[0.0, 1.0]`.
    pub confidence_score: f64,
    pub match_type: MatchType,
    /// One explanation per fired signal, in evaluation order.
    pub match_details: Vec<String>,
}

impl CrossReference {
    /// Deterministic id for the (record, item) pair.
    pub fn pair_id(record: &StructuredRecord, item: &FeedItem) -> Uuid {
        let key = format!("{}|{}", record.source_id(), item.source_id());
        Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
    }
}

/// Counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationSummary {
    pub confirmed: usize,
    pub pending: usize,
    pub total_references: usize,
    pub total_events: usize,
}
