//! Satirical News Bot — Binary Entrypoint
//!
//! One invocation = one pipeline run. An external scheduler (cron / CI
//! workflow) triggers the binary and serializes runs; the process holds no
//! state between invocations beyond what the gist-backed seen set carries.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use satire_news_bot::config::{Credentials, SourcesConfig};
use satire_news_bot::generate::HfTextModel;
use satire_news_bot::image::FusionArtClient;
use satire_news_bot::ingest::providers::rss::RssProvider;
use satire_news_bot::ingest::types::SourceProvider;
use satire_news_bot::pipeline::Pipeline;
use satire_news_bot::publish::TelegramPublisher;
use satire_news_bot::seen::GistSeenStore;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("satire_news_bot=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in CI where real secrets are injected.
    let _ = dotenvy::dotenv();
    init_tracing();

    // Missing credentials fail here, before any network call.
    let creds = Credentials::from_env()?;
    let sources = SourcesConfig::load_default()?;

    let providers: Vec<Box<dyn SourceProvider>> = sources
        .feeds
        .iter()
        .map(|url| Box::new(RssProvider::from_url(url)) as Box<dyn SourceProvider>)
        .collect();

    let pipeline = Pipeline::new(
        Box::new(GistSeenStore::new(creds.gist_token, creds.gist_id)),
        providers,
        Box::new(HfTextModel::new(creds.hf_token, None)),
        Box::new(FusionArtClient::new(
            creds.fusion_api_key,
            creds.fusion_secret_key,
        )),
        Box::new(TelegramPublisher::new(
            creds.telegram_token,
            creds.telegram_channel,
        )),
        &sources,
    );

    let report = pipeline.run_once().await;
    tracing::info!(?report, "done");
    Ok(())
}
