// src/publish.rs
//! Channel delivery: text first, then (independently) the photo.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::ingest::truncate_chars;

/// Telegram caps message text at 4096 characters.
pub const MESSAGE_MAX_CHARS: usize = 4096;

#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<()>;
    async fn send_photo(&self, path: &Path) -> Result<()>;
}

/// Send the post. Text delivery decides the outcome; a photo failure is
/// logged and never turns a delivered post into an error.
pub async fn deliver(
    publisher: &dyn Publisher,
    text: &str,
    image: Option<&PathBuf>,
) -> Result<bool> {
    publisher
        .send_text(&truncate_chars(text, MESSAGE_MAX_CHARS))
        .await
        .context("sending post text")?;

    if let Some(path) = image {
        if let Err(e) = publisher.send_photo(path).await {
            warn!(error = ?e, path = %path.display(), "sending photo failed");
            return Ok(false);
        }
        return Ok(true);
    }
    Ok(false)
}

pub struct TelegramPublisher {
    client: reqwest::Client,
    token: String,
    channel: String,
}

impl TelegramPublisher {
    pub fn new(token: String, channel: String) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("satire-news-bot/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_default();
        Self {
            client,
            token,
            channel,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.token)
    }
}

#[async_trait::async_trait]
impl Publisher for TelegramPublisher {
    async fn send_text(&self, text: &str) -> Result<()> {
        let payload = serde_json::json!({
            "chat_id": self.channel,
            "text": text,
            "disable_web_page_preview": true,
        });
        let resp = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&payload)
            .send()
            .await
            .context("telegram sendMessage send")?;
        if !resp.status().is_success() {
            return Err(anyhow!("telegram sendMessage status {}", resp.status()));
        }
        Ok(())
    }

    async fn send_photo(&self, path: &Path) -> Result<()> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading photo {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("photo.jpg")
            .to_string();
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new()
            .text("chat_id", self.channel.clone())
            .part("photo", part);

        let resp = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await
            .context("telegram sendPhoto send")?;
        if !resp.status().is_success() {
            return Err(anyhow!("telegram sendPhoto status {}", resp.status()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingPublisher {
        texts: Mutex<Vec<String>>,
        photo_fails: bool,
        photo_calls: Mutex<u32>,
    }

    impl RecordingPublisher {
        fn new(photo_fails: bool) -> Self {
            Self {
                texts: Mutex::new(Vec::new()),
                photo_fails,
                photo_calls: Mutex::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl Publisher for RecordingPublisher {
        async fn send_text(&self, text: &str) -> Result<()> {
            self.texts.lock().unwrap().push(text.to_string());
            Ok(())
        }
        async fn send_photo(&self, _path: &Path) -> Result<()> {
            *self.photo_calls.lock().unwrap() += 1;
            if self.photo_fails {
                return Err(anyhow!("photo rejected"));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn long_text_is_truncated_to_channel_limit() {
        let p = RecordingPublisher::new(false);
        let long = "ы".repeat(MESSAGE_MAX_CHARS + 100);
        deliver(&p, &long, None).await.unwrap();
        let sent = p.texts.lock().unwrap();
        assert_eq!(sent[0].chars().count(), MESSAGE_MAX_CHARS);
    }

    #[tokio::test]
    async fn photo_failure_does_not_fail_delivery() {
        let p = RecordingPublisher::new(true);
        let path = PathBuf::from("nope.jpg");
        let image_sent = deliver(&p, "текст", Some(&path)).await.unwrap();
        assert!(!image_sent);
        assert_eq!(p.texts.lock().unwrap().len(), 1);
        assert_eq!(*p.photo_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn no_image_means_no_photo_call() {
        let p = RecordingPublisher::new(false);
        let image_sent = deliver(&p, "текст", None).await.unwrap();
        assert!(!image_sent);
        assert_eq!(*p.photo_calls.lock().unwrap(), 0);
    }
}
