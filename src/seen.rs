// src/seen.rs
//! Deduplication state: the set of titles already processed, persisted in a
//! remote GitHub Gist between runs.
//!
//! Consistency model: single writer, whole-document snapshot, last write
//! wins. The external scheduler serializes runs; nothing here guards against
//! overlapping invocations.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::warn;

pub type SeenSet = HashSet<String>;

const GIST_FILE: &str = "seen.json";

#[async_trait::async_trait]
pub trait SeenStore: Send + Sync {
    /// Fetch the persisted set. Fail-open: any transport or parse failure
    /// yields an empty set so the run still proceeds, at the cost of possible
    /// duplicates for that run only. Never fails.
    async fn load(&self) -> SeenSet;

    /// Overwrite the persisted document with the full current set. Failures
    /// are logged and swallowed; there is no retry.
    async fn save(&self, seen: &SeenSet);
}

/// Gist-backed store. The document is a JSON array of title strings under a
/// fixed gist file name.
pub struct GistSeenStore {
    client: reqwest::Client,
    token: String,
    gist_id: String,
}

impl GistSeenStore {
    pub fn new(token: String, gist_id: String) -> Self {
        let client = reqwest::Client::builder()
            // GitHub API requires a UA header
            .user_agent("satire-news-bot/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            token,
            gist_id,
        }
    }

    fn gist_url(&self) -> String {
        format!("https://api.github.com/gists/{}", self.gist_id)
    }

    async fn load_impl(&self) -> Result<SeenSet> {
        #[derive(serde::Deserialize)]
        struct Gist {
            files: std::collections::HashMap<String, GistFile>,
        }
        #[derive(serde::Deserialize)]
        struct GistFile {
            content: Option<String>,
        }

        let resp = self
            .client
            .get(self.gist_url())
            .bearer_auth(&self.token)
            .send()
            .await
            .context("gist get")?
            .error_for_status()
            .context("gist get status")?;

        let gist: Gist = resp.json().await.context("gist body")?;
        let content = gist
            .files
            .get(GIST_FILE)
            .and_then(|f| f.content.as_deref())
            .unwrap_or("[]");
        let titles: Vec<String> = serde_json::from_str(content).context("seen.json parse")?;
        Ok(titles.into_iter().collect())
    }

    async fn save_impl(&self, seen: &SeenSet) -> Result<()> {
        #[derive(Serialize)]
        struct Patch<'a> {
            files: std::collections::HashMap<&'static str, FilePatch<'a>>,
        }
        #[derive(Serialize)]
        struct FilePatch<'a> {
            content: &'a str,
        }

        // Snapshot write: the document always holds the complete set.
        let mut titles: Vec<&String> = seen.iter().collect();
        titles.sort(); // stable diffs in the gist history
        let content = serde_json::to_string_pretty(&titles).context("seen.json encode")?;

        let mut files = std::collections::HashMap::new();
        files.insert(GIST_FILE, FilePatch { content: &content });

        self.client
            .patch(self.gist_url())
            .bearer_auth(&self.token)
            .json(&Patch { files })
            .send()
            .await
            .context("gist patch")?
            .error_for_status()
            .context("gist patch status")?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SeenStore for GistSeenStore {
    async fn load(&self) -> SeenSet {
        match self.load_impl().await {
            Ok(set) => set,
            Err(e) => {
                warn!(error = ?e, "loading seen set failed, starting empty");
                SeenSet::new()
            }
        }
    }

    async fn save(&self, seen: &SeenSet) {
        if let Err(e) = self.save_impl(seen).await {
            warn!(error = ?e, "saving seen set failed");
        }
    }
}

/// In-memory store for tests: records every save and can simulate failures.
pub struct MemorySeenStore {
    state: std::sync::Mutex<SeenSet>,
    pub saves: std::sync::Mutex<Vec<SeenSet>>,
    pub fail_load: bool,
}

impl MemorySeenStore {
    pub fn new(initial: SeenSet) -> Self {
        Self {
            state: std::sync::Mutex::new(initial),
            saves: std::sync::Mutex::new(Vec::new()),
            fail_load: false,
        }
    }

    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::new(SeenSet::new())
        }
    }
}

#[async_trait::async_trait]
impl SeenStore for MemorySeenStore {
    async fn load(&self) -> SeenSet {
        if self.fail_load {
            // fail-open contract: a broken store reads as empty
            return SeenSet::new();
        }
        self.state.lock().unwrap().clone()
    }

    async fn save(&self, seen: &SeenSet) {
        *self.state.lock().unwrap() = seen.clone();
        self.saves.lock().unwrap().push(seen.clone());
    }
}
