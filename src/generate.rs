// src/generate.rs
//! Text generation: fixed persona prompt, one chat-completion call, and a
//! deterministic degradation path when the service misbehaves.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::compose::MARKER;

/// Typed outcome of the generation stage. Degradation is an ordinary branch,
/// not a caught panic or a propagated error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The model answered; the text may or may not carry the image marker.
    Full(String),
    /// The service failed; `text` is the deterministic title-only fallback.
    Degraded { text: String, reason: String },
}

impl GenerationOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, GenerationOutcome::Degraded { .. })
    }
}

#[async_trait::async_trait]
pub trait TextModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Build the persona prompt for one story. The marker instruction keeps the
/// prompt and `compose::split_generated` in lockstep.
pub fn persona_prompt(title: &str, summary: &str) -> String {
    format!(
        "Ты — ведущий сатирической колонки «Не новости». Перепиши новость как \
         короткий едкий пост для Telegram-канала: 3-5 предложений, ирония без \
         оскорблений, без хэштегов и эмодзи, по-русски.\n\
         Новость: {title}\n\
         Подробности: {summary}\n\
         В самом конце добавь отдельную строку вида\n\
         {MARKER} <короткое описание картинки к посту, на русском>"
    )
}

/// Deterministic fallback built only from the title.
pub fn fallback_text(title: &str) -> String {
    format!("{title}. Комментарии излишни — следим за развитием событий.")
}

/// Generate a post for the item. Never fails: any error from the model is
/// folded into [`GenerationOutcome::Degraded`].
pub async fn generate_post(
    model: &dyn TextModel,
    title: &str,
    summary: &str,
) -> GenerationOutcome {
    let prompt = persona_prompt(title, summary);
    match model.complete(&prompt).await {
        Ok(raw) => {
            let text = raw.trim().to_string();
            if text.is_empty() {
                warn!(model = model.name(), "model returned empty text");
                GenerationOutcome::Degraded {
                    text: fallback_text(title),
                    reason: "empty response".to_string(),
                }
            } else {
                GenerationOutcome::Full(text)
            }
        }
        Err(e) => {
            warn!(model = model.name(), error = ?e, "text generation failed");
            GenerationOutcome::Degraded {
                text: fallback_text(title),
                reason: e.to_string(),
            }
        }
    }
}

/// Hugging Face router client (OpenAI-compatible chat completions).
/// Requires `HF_TOKEN`.
pub struct HfTextModel {
    http: reqwest::Client,
    token: String,
    model: String,
}

impl HfTextModel {
    /// `model_override`: pass Some(..) to override; defaults to a small
    /// instruct model that handles Russian well enough.
    pub fn new(token: String, model_override: Option<&str>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("satire-news-bot/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        let model = model_override
            .unwrap_or("meta-llama/Meta-Llama-3-8B-Instruct")
            .to_string();
        Self { http, token, model }
    }
}

#[async_trait::async_trait]
impl TextModel for HfTextModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if self.token.is_empty() {
            return Err(anyhow!("missing HF token"));
        }

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let req = Req {
            model: &self.model,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
            temperature: 0.8,
            max_tokens: 400,
        };

        let resp = self
            .http
            .post("https://router.huggingface.co/v1/chat/completions")
            .bearer_auth(&self.token)
            .json(&req)
            .send()
            .await
            .context("hf chat completions send")?;

        if !resp.status().is_success() {
            return Err(anyhow!("hf chat completions status {}", resp.status()));
        }
        let body: Resp = resp.json().await.context("hf chat completions body")?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();
        Ok(content)
    }

    fn name(&self) -> &'static str {
        "hf-router"
    }
}
