use crate::types::{Result, TimeWindow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// An upstream collaborator that resolves one source into in-memory records
/// for a time window.
#[async_trait]
pub trait RecordSource: Send + Sync {
    type Record: Send;

    /// Human-readable name for this source
    fn source_name(&self) -> String;

    /// Records whose date falls inside `window` ending at `now`.
    async fn load(&self, window: TimeWindow, now: DateTime<Utc>) -> Result<Vec<Self::Record>>;
}
