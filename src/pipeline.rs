// src/pipeline.rs
//! Orchestration of one scheduled run: load seen set, pick the freshest
//! relevant story, generate, illustrate, publish, and persist the seen set
//! exactly once no matter what happened in between.

use std::path::PathBuf;
use tracing::{info, warn};

use crate::compose::{self, DEFAULT_IMAGE_PROMPT};
use crate::config::SourcesConfig;
use crate::generate::{self, GenerationOutcome, TextModel};
use crate::image::{render_or_skip, ImageModel};
use crate::ingest::{self, truncate_chars, types::NewsItem, types::SourceProvider};
use crate::publish::{self, Publisher};
use crate::seen::SeenStore;

/// Cap applied to the emergency fallback message sent from the failure
/// boundary.
pub const FALLBACK_MAX_CHARS: usize = 500;

/// Terminal summary of a run, for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunReport {
    /// No fresh relevant story this run; nothing was published.
    NoNews,
    Published {
        title: String,
        /// True when the fallback text was used instead of generated copy.
        degraded: bool,
        image_sent: bool,
    },
}

pub struct Pipeline {
    pub store: Box<dyn SeenStore>,
    pub providers: Vec<Box<dyn SourceProvider>>,
    pub text_model: Box<dyn TextModel>,
    pub image_model: Box<dyn ImageModel>,
    pub publisher: Box<dyn Publisher>,
    pub keywords: Vec<String>,
    pub window_hours: i64,
}

impl Pipeline {
    pub fn new(
        store: Box<dyn SeenStore>,
        providers: Vec<Box<dyn SourceProvider>>,
        text_model: Box<dyn TextModel>,
        image_model: Box<dyn ImageModel>,
        publisher: Box<dyn Publisher>,
        sources: &SourcesConfig,
    ) -> Self {
        Self {
            store,
            providers,
            text_model,
            image_model,
            publisher,
            keywords: sources.keywords.clone(),
            window_hours: sources.window_hours,
        }
    }

    /// Execute one run end to end. The seen set is written back exactly once,
    /// as the final action, on every path through this function.
    pub async fn run_once(&self) -> RunReport {
        let mut seen = self.store.load().await;
        info!(seen = seen.len(), "loaded seen set");

        let cutoff = cutoff_unix(self.window_hours);
        let fresh =
            ingest::fetch_fresh(&self.providers, cutoff, &self.keywords, &mut seen).await;
        info!(fresh = fresh.len(), "fetched fresh items");

        // Only the freshest matching story is processed; the rest are already
        // marked seen and will not come back next run.
        let report = match fresh.into_iter().next() {
            None => RunReport::NoNews,
            Some(item) => self.process_item(item).await,
        };

        self.store.save(&seen).await;
        info!(?report, "run finished");
        report
    }

    /// Generation through publishing, wrapped in a single failure boundary:
    /// an error anywhere inside degrades to a bare fallback publish and never
    /// prevents the caller's final save.
    async fn process_item(&self, item: NewsItem) -> RunReport {
        let outcome = generate::generate_post(&*self.text_model, &item.title, &item.summary).await;

        match self.publish_span(&item, &outcome).await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = ?e, title = %item.title, "publish span failed, sending fallback");
                let fallback = boundary_fallback(&item, &outcome);
                if let Err(e2) = self.publisher.send_text(&fallback).await {
                    warn!(error = ?e2, "fallback publish failed too");
                }
                RunReport::Published {
                    title: item.title,
                    degraded: true,
                    image_sent: false,
                }
            }
        }
    }

    async fn publish_span(
        &self,
        item: &NewsItem,
        outcome: &GenerationOutcome,
    ) -> anyhow::Result<RunReport> {
        match outcome {
            GenerationOutcome::Degraded { text, reason } => {
                // Degraded copy ships as-is: no image prompt exists, so the
                // image stage is skipped entirely.
                info!(title = %item.title, reason = %reason, "publishing degraded post");
                publish::deliver(&*self.publisher, text, None).await?;
                Ok(RunReport::Published {
                    title: item.title.clone(),
                    degraded: true,
                    image_sent: false,
                })
            }
            GenerationOutcome::Full(raw) => {
                let parsed = compose::split_generated(raw);
                let body = if parsed.body.is_empty() {
                    // Model emitted only the marker line; fall back to title copy.
                    generate::fallback_text(&item.title)
                } else {
                    parsed.body
                };
                let prompt = parsed
                    .image_prompt
                    .unwrap_or_else(|| DEFAULT_IMAGE_PROMPT.to_string());

                let image: Option<PathBuf> = render_or_skip(&*self.image_model, &prompt).await;
                let image_sent = publish::deliver(&*self.publisher, &body, image.as_ref()).await?;

                Ok(RunReport::Published {
                    title: item.title.clone(),
                    degraded: false,
                    image_sent,
                })
            }
        }
    }
}

/// Message sent when even publishing failed: the truncated partial copy if
/// generation produced one, otherwise the deterministic title fallback.
fn boundary_fallback(item: &NewsItem, outcome: &GenerationOutcome) -> String {
    let text = match outcome {
        GenerationOutcome::Full(raw) => {
            let parsed = compose::split_generated(raw);
            if parsed.body.is_empty() {
                generate::fallback_text(&item.title)
            } else {
                parsed.body
            }
        }
        GenerationOutcome::Degraded { text, .. } => text.clone(),
    };
    truncate_chars(&text, FALLBACK_MAX_CHARS)
}

fn cutoff_unix(window_hours: i64) -> u64 {
    let cutoff = chrono::Utc::now() - chrono::Duration::hours(window_hours);
    cutoff.timestamp().max(0) as u64
}
