// src/ingest/types.rs
use anyhow::Result;

/// One raw syndication entry, as parsed from a feed document.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub published_at: u64, // unix seconds; 0 when the feed gave no usable date
}

/// A story selected for processing. Identity is the title string;
/// a title is never processed twice across runs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub summary: String, // cleaned and capped, see SUMMARY_MAX_CHARS
    pub link: String,
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<FeedEntry>>;
    fn name(&self) -> String;
}
