use std::collections::HashSet;

use feed_rs::parser;
use tracing::{debug, info, warn};
use url::Url;

use crate::types::{CorrelatorError, FeedItem, Result};
use crate::utils::strip_html;

const DEFAULT_SOURCE_NAME: &str = "Syndication feed";

/// Turns RSS/Atom documents into feed items, dropping entries already seen
/// by guid or link.
pub struct FeedParser {
    seen_guids: HashSet<String>,
    seen_links: HashSet<String>,
}

impl FeedParser {
    pub fn new() -> Self {
        Self {
            seen_guids: HashSet::new(),
            seen_links: HashSet::new(),
        }
    }

    /// `source_name` overrides the feed's own title as the item source label.
    pub fn parse_items(&mut self, content: &str, source_name: Option<&str>) -> Result<Vec<FeedItem>> {
        debug!("Parsing feed content ({} bytes)", content.len());

        // Attempt to parse the feed
        let feed = parser::parse(content.as_bytes())
            .map_err(|e| CorrelatorError::Parse(format!("Failed to parse feed: {}", e)))?;

        // Prefer the caller's label, then the feed title
        let source_name = source_name
            .map(str::to_string)
            .or_else(|| feed.title.as_ref().map(|t| t.content.trim().to_string()))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCE_NAME.to_string());

        let total = feed.entries.len();
        let items: Vec<FeedItem> = feed
            .entries
            .into_iter()
            .filter_map(|entry| self.convert_entry(entry, &source_name))
            .collect();

        info!(
            "Parsed {} of {} entries from feed '{}'",
            items.len(),
            total,
            source_name
        );
        Ok(items)
    }

    fn convert_entry(&mut self, entry: feed_rs::model::Entry, source_name: &str) -> Option<FeedItem> {
        // Extract basic information
        let title = entry
            .title
            .map(|t| strip_html(&t.content))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Untitled".to_string());

        // Entries without any date cannot be placed on the timeline
        let Some(published) = entry.published.or(entry.updated) else {
            warn!("Skipping feed entry '{}': no publication date", title);
            return None;
        };

        // Get the primary link
        let link = entry
            .links
            .first()
            .map(|l| l.href.trim().to_string())
            .unwrap_or_default();

        // Check for duplicates based on GUID or link
        if !entry.id.is_empty() && !self.seen_guids.insert(entry.id.clone()) {
            debug!("Skipping duplicate entry with GUID: {}", entry.id);
            return None;
        }
        if !link.is_empty() {
            if !self.seen_links.insert(link.clone()) {
                debug!("Skipping duplicate entry with link: {}", link);
                return None;
            }
            if let Err(e) = Url::parse(&link) {
                warn!("Feed entry '{}' has an invalid link '{}': {}", title, link, e);
            }
        }

        // Extract description (prefer summary over content body)
        let description = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .map(|text| strip_html(&text))
            .unwrap_or_default();

        // First non-empty category
        let category = entry
            .categories
            .into_iter()
            .map(|c| c.term.trim().to_string())
            .find(|term| !term.is_empty());

        Some(FeedItem {
            title,
            description,
            publication_date: published.with_timezone(&chrono::Utc),
            link,
            source_name: source_name.to_string(),
            category,
        })
    }

    pub fn clear_deduplication_cache(&mut self) {
        self.seen_guids.clear();
        self.seen_links.clear();
        debug!("Cleared deduplication cache");
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>FDA Recalls</title>
    <link>https://www.fda.gov</link>
    <description>Recalls, market withdrawals and safety alerts</description>
    <item>
      <title>Acme Foods recall alert</title>
      <link>https://example.com/acme</link>
      <guid>acme-1</guid>
      <description>&lt;p&gt;Frozen vegetable medley may contain &lt;b&gt;Listeria&lt;/b&gt;&lt;/p&gt;</description>
      <category>Food &amp; Beverages</category>
      <pubDate>Thu, 11 Jan 2024 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Acme Foods recall alert (repost)</title>
      <link>https://example.com/acme</link>
      <guid>acme-2</guid>
      <pubDate>Fri, 12 Jan 2024 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Undated notice</title>
      <link>https://example.com/undated</link>
      <guid>undated</guid>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items_and_drops_duplicates_and_undated() {
        let mut parser = FeedParser::new();
        let items = parser.parse_items(RSS, None).unwrap();
        assert_eq!(items.len(), 1);

        let item = &items[0];
        assert_eq!(item.title, "Acme Foods recall alert");
        assert_eq!(item.description, "Frozen vegetable medley may contain Listeria");
        assert_eq!(item.link, "https://example.com/acme");
        assert_eq!(item.source_name, "FDA Recalls");
        assert_eq!(item.category.as_deref(), Some("Food & Beverages"));
        assert_eq!(
            item.publication_date,
            Utc.with_ymd_and_hms(2024, 1, 11, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn source_name_override_and_cache() {
        let mut parser = FeedParser::new();
        let first = parser.parse_items(RSS, Some("MedWatch")).unwrap();
        assert_eq!(first[0].source_name, "MedWatch");

        assert!(parser.parse_items(RSS, None).unwrap().is_empty());
        parser.clear_deduplication_cache();
        assert_eq!(parser.parse_items(RSS, None).unwrap().len(), 1);
    }

    #[test]
    fn rejects_garbage() {
        let err = FeedParser::new().parse_items("definitely not xml", None).unwrap_err();
        assert!(matches!(err, CorrelatorError::Parse(_)));
    }
}
