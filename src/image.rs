// src/image.rs
//! Image generation: submit a job, poll to a terminal status within a fixed
//! budget, download the first result to a local file.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// Poll budget: attempts x delay bounds the total wait (~60s).
pub const POLL_ATTEMPTS: u32 = 10;
pub const POLL_DELAY: Duration = Duration::from_secs(6);

/// Local path the downloaded image is written to. Single-use, overwritten on
/// every run; no cleanup beyond the next overwrite.
pub const IMAGE_PATH: &str = "satire_post.jpg";

#[async_trait::async_trait]
pub trait ImageModel: Send + Sync {
    /// Best-effort render. `Ok(None)` and `Err(..)` both mean "no image";
    /// the distinction only matters for logging.
    async fn render(&self, prompt: &str) -> Result<Option<PathBuf>>;
    fn name(&self) -> &'static str;
}

/// FusionArt-style text-to-image API: run returns a job uuid, status polling
/// ends in DONE (with result file URLs) or FAIL.
pub struct FusionArtClient {
    http: reqwest::Client,
    api_key: String,
    secret_key: String,
    base_url: String,
    output_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RunResp {
    uuid: String,
}

#[derive(Debug, Deserialize)]
struct StatusResp {
    status: String,
    #[serde(default)]
    files: Vec<String>,
}

impl FusionArtClient {
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self::with_base_url(api_key, secret_key, "https://api-key.fusionbrain.ai".to_string())
    }

    pub fn with_base_url(api_key: String, secret_key: String, base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("satire-news-bot/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key,
            secret_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            output_path: PathBuf::from(IMAGE_PATH),
        }
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("X-Key", format!("Key {}", self.api_key))
            .header("X-Secret", format!("Secret {}", self.secret_key))
    }

    async fn submit(&self, prompt: &str) -> Result<String> {
        let params = serde_json::json!({
            "type": "GENERATE",
            "numImages": 1,
            "width": 1024,
            "height": 1024,
            "generateParams": { "query": prompt },
        });
        let resp = self
            .auth(self.http.post(format!("{}/key/api/v1/text2image/run", self.base_url)))
            .json(&params)
            .send()
            .await
            .context("image run send")?;
        if !resp.status().is_success() {
            return Err(anyhow!("image run status {}", resp.status()));
        }
        let run: RunResp = resp.json().await.context("image run body")?;
        Ok(run.uuid)
    }

    async fn poll_status(&self, uuid: &str) -> Result<StatusResp> {
        let resp = self
            .auth(self.http.get(format!(
                "{}/key/api/v1/text2image/status/{uuid}",
                self.base_url
            )))
            .send()
            .await
            .context("image status send")?;
        if !resp.status().is_success() {
            return Err(anyhow!("image status {}", resp.status()));
        }
        resp.json().await.context("image status body")
    }

    async fn download(&self, url: &str) -> Result<PathBuf> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .context("image download send")?
            .error_for_status()
            .context("image download status")?;
        let bytes = resp.bytes().await.context("image download body")?;
        tokio::fs::write(&self.output_path, &bytes)
            .await
            .with_context(|| format!("writing {}", self.output_path.display()))?;
        Ok(self.output_path.clone())
    }

    async fn render_impl(&self, prompt: &str) -> Result<Option<PathBuf>> {
        if self.api_key.is_empty() {
            return Err(anyhow!("missing image api key"));
        }
        let uuid = self.submit(prompt).await?;
        debug!(%uuid, "image job submitted");

        for attempt in 1..=POLL_ATTEMPTS {
            tokio::time::sleep(POLL_DELAY).await;
            let status = self.poll_status(&uuid).await?;
            match status.status.as_str() {
                "DONE" => {
                    let Some(first) = status.files.first() else {
                        return Err(anyhow!("image job done with no files"));
                    };
                    let path = self.download(first).await?;
                    return Ok(Some(path));
                }
                "FAIL" => return Err(anyhow!("image job failed")),
                other => {
                    debug!(%uuid, attempt, status = other, "image job pending");
                }
            }
        }
        // Budget exhausted without a terminal status.
        Err(anyhow!("image poll budget exhausted"))
    }
}

#[async_trait::async_trait]
impl ImageModel for FusionArtClient {
    async fn render(&self, prompt: &str) -> Result<Option<PathBuf>> {
        self.render_impl(prompt).await
    }

    fn name(&self) -> &'static str {
        "fusionart"
    }
}

/// Wrapper the orchestrator calls: folds every failure into `None`.
pub async fn render_or_skip(model: &dyn ImageModel, prompt: &str) -> Option<PathBuf> {
    match model.render(prompt).await {
        Ok(maybe_path) => maybe_path,
        Err(e) => {
            warn!(model = model.name(), error = ?e, "image generation failed");
            None
        }
    }
}
