use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::TelegramError;
use crate::models::{TelegramUser, Update};

/// Long-poll wait handed to `getUpdates`, in seconds.
pub const POLL_TIMEOUT_SECS: u64 = 30;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(POLL_TIMEOUT_SECS + 30);

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<i64, TelegramError>;
    async fn send_typing(&self, chat_id: i64) -> Result<(), TelegramError>;
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Serialize)]
struct SendChatActionRequest<'a> {
    chat_id: i64,
    action: &'a str,
}

#[derive(Serialize)]
struct GetUpdatesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct TelegramMessageResult {
    message_id: i64,
}

pub struct TelegramBot {
    client: Client,
    api_url: String,
}

impl TelegramBot {
    pub fn new(base_url: &str, bot_token: &str) -> Result<Self, TelegramError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let api_url = format!("{}/bot{}", base_url.trim_end_matches('/'), bot_token);
        Ok(TelegramBot { client, api_url })
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.api_url, method);
        let response_text = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await?
            .text()
            .await?;

        let response: TelegramResponse<T> = serde_json::from_str(&response_text)?;
        if !response.ok {
            return Err(TelegramError::Api(response.description));
        }
        response.result.ok_or(TelegramError::EmptyResult)
    }

    /// Drops any registered webhook so `getUpdates` polling is allowed.
    pub async fn delete_webhook(&self) -> Result<(), TelegramError> {
        let _: bool = self.call("deleteWebhook", &serde_json::json!({})).await?;
        Ok(())
    }

    pub async fn get_me(&self) -> Result<TelegramUser, TelegramError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: POLL_TIMEOUT_SECS,
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &request).await
    }
}

#[async_trait]
impl ChatTransport for TelegramBot {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<i64, TelegramError> {
        let request = SendMessageRequest { chat_id, text };
        let msg: TelegramMessageResult = self.call("sendMessage", &request).await?;
        Ok(msg.message_id)
    }

    async fn send_typing(&self, chat_id: i64) -> Result<(), TelegramError> {
        let request = SendChatActionRequest { chat_id, action: "typing" };
        let _: bool = self.call("sendChatAction", &request).await?;
        Ok(())
    }
}
