// src/config.rs
//! Startup configuration: credentials from the environment, feed list and
//! keyword filter from `config/sources.toml`.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_SOURCES_PATH: &str = "SOURCES_CONFIG_PATH";
pub const DEFAULT_SOURCES_PATH: &str = "config/sources.toml";

/// Recency window applied to feed entries when the config file names none.
pub const DEFAULT_WINDOW_HOURS: i64 = 1;

/// Secrets and channel addressing. All of these are startup preconditions:
/// a missing required variable fails the run before the pipeline starts.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub telegram_token: String,
    pub telegram_channel: String,
    pub hf_token: String,
    pub fusion_api_key: String,
    pub fusion_secret_key: String,
    pub gist_token: String,
    pub gist_id: String,
}

fn required(name: &str) -> Result<String> {
    env::var(name).map_err(|_| anyhow!("Missing {name} env var"))
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            telegram_token: required("TELEGRAM_BOT_TOKEN")?,
            telegram_channel: env::var("TELEGRAM_CHANNEL")
                .unwrap_or_else(|_| "@notreviews".to_string()),
            hf_token: required("HF_TOKEN")?,
            fusion_api_key: required("FUSIONBRAIN_API_KEY")?,
            // Secret may be absent on older API keys.
            fusion_secret_key: env::var("FUSIONBRAIN_SECRET_KEY").unwrap_or_default(),
            gist_token: required("GIST_TOKEN")?,
            gist_id: required("GIST_ID")?,
        })
    }
}

/// Feed list + relevance keywords, editable without a rebuild.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub feeds: Vec<String>,
    pub keywords: Vec<String>,
    #[serde(default = "default_window_hours")]
    pub window_hours: i64,
}

fn default_window_hours() -> i64 {
    DEFAULT_WINDOW_HOURS
}

impl SourcesConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading sources config from {}", path.display()))?;
        let mut cfg: SourcesConfig =
            toml::from_str(&content).context("parsing sources config toml")?;
        cfg.feeds = clean_list(cfg.feeds);
        cfg.keywords.retain(|k| !k.trim().is_empty());
        if cfg.feeds.is_empty() {
            anyhow::bail!("sources config lists no feeds");
        }
        Ok(cfg)
    }

    /// Load using env var + fallbacks:
    /// 1) $SOURCES_CONFIG_PATH
    /// 2) config/sources.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_SOURCES_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("SOURCES_CONFIG_PATH points to non-existent path"));
        }
        let default_p = PathBuf::from(DEFAULT_SOURCES_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Ok(Self::builtin())
    }

    /// Hardcoded fallback mirroring the channel's usual sources and topics.
    pub fn builtin() -> Self {
        Self {
            feeds: vec![
                "https://ria.ru/export/rss2/archive/index.xml".to_string(),
                "https://tass.ru/rss/v2.xml".to_string(),
                "https://lenta.ru/rss/".to_string(),
            ],
            keywords: [
                "политик", "указ", "назнач", "Совбез", "Минобороны", "президент",
                "выборы", "парламент", "госдума", "Путин", "Лавров", "Зеленский",
                "Трамп", "Россия", "США", "Китай", "Украина", "НАТО", "ООН",
                "санкции", "валюта", "доллар", "нефть", "газ", "ставка", "инфляция",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            window_hours: DEFAULT_WINDOW_HOURS,
        }
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|x: &String| x == t) {
            out.push(t.to_string());
        }
    }
    out
}
