use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::parser::FeedParser;
use crate::traits::RecordSource;
use crate::types::{FeedItem, Result, TimeWindow};

/// Feed items read from a saved RSS or Atom document.
pub struct FeedFileSource {
    pub path: PathBuf,
    pub title: Option<String>,
}

impl FeedFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[async_trait]
impl RecordSource for FeedFileSource {
    type Record = FeedItem;

    fn source_name(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("Feed ({})", self.path.display()))
    }

    async fn load(&self, window: TimeWindow, now: DateTime<Utc>) -> Result<Vec<FeedItem>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let mut parser = FeedParser::new();
        let items: Vec<FeedItem> = parser
            .parse_items(&content, self.title.as_deref())?
            .into_iter()
            .filter(|item| window.contains(now, item.publication_date))
            .collect();

        info!(
            "Loaded {} feed items from {} within {}",
            items.len(),
            self.path.display(),
            window
        );
        Ok(items)
    }
}
