use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::GenerationError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Anything that turns a single prompt string into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_content(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

pub struct GeminiClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_url: &str, api_key: &str, model: &str) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(GeminiClient {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_content(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/models/{}:generateContent", self.api_url, self.model);
        let body = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: prompt }] }],
        };

        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Status { status: status.as_u16(), body: text });
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)?;
        let candidate = parsed.candidates.into_iter().next().ok_or(GenerationError::NoCandidates)?;

        Ok(candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new(&server.uri(), "test-key", "gemini-2.5-flash-lite").unwrap()
    }

    #[tokio::test]
    async fn sends_prompt_and_joins_candidate_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash-lite:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"parts": [{"text": "say hi"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "hi "}, {"text": "there"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server).await.generate_content("say hi").await.unwrap();
        assert_eq!(text, "hi there");
    }

    #[tokio::test]
    async fn candidate_without_content_yields_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"finishReason": "STOP"}]
            })))
            .mount(&server)
            .await;

        let text = client_for(&server).await.generate_content("x").await.unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn missing_candidates_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.generate_content("x").await.unwrap_err();
        assert!(matches!(err, GenerationError::NoCandidates));
    }

    #[tokio::test]
    async fn non_success_status_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.generate_content("x").await.unwrap_err();
        match err {
            GenerationError::Status { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota exhausted");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_errors_do_not_expose_the_key() {
        let client = GeminiClient::new("http://127.0.0.1:1", "SECRET-KEY-123", "m").unwrap();

        let err = client.generate_content("x").await.unwrap_err();

        assert!(matches!(err, GenerationError::Http(_)));
        let shown = format!("{err} {err:?}");
        assert!(!shown.contains("SECRET-KEY-123"), "{shown}");
    }

    #[tokio::test]
    async fn garbage_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.generate_content("x").await.unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)));
    }
}
