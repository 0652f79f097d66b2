// tests/common/mod.rs
// Shared mock collaborators for pipeline scenario tests.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use satire_news_bot::config::SourcesConfig;
use satire_news_bot::ingest::types::{FeedEntry, SourceProvider};
use satire_news_bot::publish::Publisher;
use satire_news_bot::seen::{MemorySeenStore, SeenSet, SeenStore};
use satire_news_bot::{ImageModel, TextModel};

pub fn now_unix() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// Minimal config for pipeline construction; the feed list is unused because
/// tests inject providers directly.
pub fn test_sources(keywords: &[&str]) -> SourcesConfig {
    SourcesConfig {
        feeds: vec!["https://unused.example/rss".to_string()],
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
        window_hours: 1,
    }
}

pub fn entry(title: &str, summary: &str, published_at: u64) -> FeedEntry {
    FeedEntry {
        title: title.to_string(),
        summary: summary.to_string(),
        link: format!("https://news.example/{}", title.len()),
        published_at,
    }
}

/// Provider returning a fixed entry list.
pub struct StaticProvider {
    pub label: String,
    pub entries: Vec<FeedEntry>,
}

impl StaticProvider {
    pub fn new(label: &str, entries: Vec<FeedEntry>) -> Self {
        Self {
            label: label.to_string(),
            entries,
        }
    }
}

#[async_trait]
impl SourceProvider for StaticProvider {
    async fn fetch_latest(&self) -> Result<Vec<FeedEntry>> {
        Ok(self.entries.clone())
    }
    fn name(&self) -> String {
        self.label.clone()
    }
}

/// Provider that always fails, for partial-failure tolerance checks.
pub struct BrokenProvider;

#[async_trait]
impl SourceProvider for BrokenProvider {
    async fn fetch_latest(&self) -> Result<Vec<FeedEntry>> {
        Err(anyhow!("feed unreachable"))
    }
    fn name(&self) -> String {
        "broken".to_string()
    }
}

/// Seen store handle that can be inspected after the pipeline consumed its
/// boxed clone.
#[derive(Clone)]
pub struct SharedStore(pub Arc<MemorySeenStore>);

impl SharedStore {
    pub fn with(titles: &[&str]) -> Self {
        let set: SeenSet = titles.iter().map(|s| s.to_string()).collect();
        Self(Arc::new(MemorySeenStore::new(set)))
    }

    pub fn empty() -> Self {
        Self::with(&[])
    }

    pub fn saves(&self) -> Vec<SeenSet> {
        self.0.saves.lock().unwrap().clone()
    }
}

#[async_trait]
impl SeenStore for SharedStore {
    async fn load(&self) -> SeenSet {
        self.0.load().await
    }
    async fn save(&self, seen: &SeenSet) {
        self.0.save(seen).await
    }
}

/// Text model scripted to reply or fail.
#[derive(Clone)]
pub struct ScriptedTextModel {
    pub reply: Option<String>,
    pub calls: Arc<AtomicU32>,
}

impl ScriptedTextModel {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }
}

#[async_trait]
impl TextModel for ScriptedTextModel {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(s) => Ok(s.clone()),
            None => Err(anyhow!("generation service down")),
        }
    }
    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Image model scripted to produce a path, nothing, or an error (the poll
/// budget case surfaces as an error from the real client).
#[derive(Clone)]
pub struct ScriptedImageModel {
    pub result: Option<PathBuf>,
    pub fail: bool,
    pub calls: Arc<AtomicU32>,
}

impl ScriptedImageModel {
    pub fn producing(path: &Path) -> Self {
        Self {
            result: Some(path.to_path_buf()),
            fail: false,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn exhausted() -> Self {
        Self {
            result: None,
            fail: true,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageModel for ScriptedImageModel {
    async fn render(&self, _prompt: &str) -> Result<Option<PathBuf>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("image poll budget exhausted"));
        }
        Ok(self.result.clone())
    }
    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Publisher recording every call; optionally fails text delivery.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    pub texts: Arc<Mutex<Vec<String>>>,
    pub photos: Arc<Mutex<Vec<PathBuf>>>,
    pub fail_text: bool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_text() -> Self {
        Self {
            fail_text: true,
            ..Self::default()
        }
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.texts.lock().clone()
    }

    pub fn sent_photos(&self) -> Vec<PathBuf> {
        self.photos.lock().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn send_text(&self, text: &str) -> Result<()> {
        self.texts.lock().push(text.to_string());
        if self.fail_text {
            return Err(anyhow!("channel rejected message"));
        }
        Ok(())
    }

    async fn send_photo(&self, path: &Path) -> Result<()> {
        self.photos.lock().push(path.to_path_buf());
        Ok(())
    }
}
