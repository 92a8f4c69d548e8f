//! Telegram notifier: `sendMessage` s `parse_mode=HTML`.
//!
//! Bez tokenu nebo chat_id se nic neposílá (typed error), takže zápas
//! zůstane neoznačený a zkusí se v dalším cyklu.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("TELEGRAM_TOKEN / CHAT_ID missing, message not sent")]
    NotConfigured,

    #[error("Telegram request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram sendMessage failed: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Telegram API error: {0}")]
    Api(String),
}

#[derive(Debug, Deserialize)]
struct TgSendResponse {
    ok: bool,
    result: Option<TgSentMessage>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TgSentMessage {
    message_id: i64,
}

pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(20))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_base: TELEGRAM_API_BASE.to_string(),
            token: token.into().trim().to_string(),
            chat_id: chat_id.into().trim().to_string(),
        }
    }

    /// Self-hosted Bot API server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.token.is_empty() && !self.chat_id.is_empty()
    }

    fn send_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }

    /// Returns the Telegram message id.
    pub async fn send(&self, text: &str) -> Result<i64, NotifyError> {
        if !self.is_configured() {
            warn!("TELEGRAM_TOKEN/CHAT_ID missing, message not sent");
            return Err(NotifyError::NotConfigured);
        }

        let body = send_message_payload(&self.chat_id, text);
        let resp = self.client.post(self.send_url()).json(&body).send().await?;
        let status = resp.status();
        let raw = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            let body: String = raw.chars().take(200).collect();
            warn!("Telegram sendMessage failed: {}: {}", status, body);
            return Err(NotifyError::Rejected { status: status.as_u16(), body });
        }

        let parsed: TgSendResponse = serde_json::from_str(&raw)
            .map_err(|e| NotifyError::Api(format!("unreadable response: {e}")))?;
        match (parsed.ok, parsed.result) {
            (true, Some(msg)) => {
                info!("Telegram: message sent (id={})", msg.message_id);
                Ok(msg.message_id)
            }
            _ => Err(NotifyError::Api(
                parsed.description.unwrap_or_else(|| "ok=false".to_string()),
            )),
        }
    }
}

/// Numeric chat ids go out as numbers, "@channel" names as strings.
pub fn send_message_payload(chat_id: &str, text: &str) -> serde_json::Value {
    let chat: serde_json::Value = match chat_id.parse::<i64>() {
        Ok(id) => id.into(),
        Err(_) => chat_id.into(),
    };
    serde_json::json!({
        "chat_id": chat,
        "text": text,
        "parse_mode": "HTML",
        "disable_web_page_preview": true,
    })
}
