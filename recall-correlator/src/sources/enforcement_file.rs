use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::enforcement::parse_enforcement;
use crate::traits::RecordSource;
use crate::types::{Result, StructuredRecord, TimeWindow};

/// Enforcement records read from a JSON export of one endpoint.
pub struct EnforcementFileSource {
    pub path: PathBuf,
    pub endpoint: String,
}

impl EnforcementFileSource {
    pub fn new(path: impl Into<PathBuf>, endpoint: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Parses `FILE[:ENDPOINT]`. Without an endpoint the file stem is used.
    pub fn from_arg(arg: &str) -> Self {
        if let Some((path, endpoint)) = arg.rsplit_once(':') {
            if !endpoint.is_empty() && !endpoint.contains(['/', '\\']) && !path.is_empty() {
                return Self::new(path, endpoint);
            }
        }
        let path = PathBuf::from(arg);
        let endpoint = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "enforcement".to_string());
        Self { path, endpoint }
    }
}

#[async_trait]
impl RecordSource for EnforcementFileSource {
    type Record = StructuredRecord;

    fn source_name(&self) -> String {
        format!("Enforcement ({})", self.endpoint)
    }

    async fn load(&self, window: TimeWindow, now: DateTime<Utc>) -> Result<Vec<StructuredRecord>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let records: Vec<StructuredRecord> = parse_enforcement(&content, &self.endpoint)?
            .into_iter()
            .filter(|record| window.contains(now, record.initiation_date))
            .collect();

        info!(
            "Loaded {} enforcement records from {} within {}",
            records.len(),
            self.path.display(),
            window
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arg_with_endpoint() {
        let source = EnforcementFileSource::from_arg("data/food.json:food-enforcement");
        assert_eq!(source.path, PathBuf::from("data/food.json"));
        assert_eq!(source.endpoint, "food-enforcement");
    }

    #[test]
    fn arg_without_endpoint_uses_stem() {
        let source = EnforcementFileSource::from_arg("data/drug.json");
        assert_eq!(source.path, PathBuf::from("data/drug.json"));
        assert_eq!(source.endpoint, "drug");
        assert_eq!(source.source_name(), "Enforcement (drug)");
    }
}
