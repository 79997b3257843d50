use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ModelError, TextModel};
use crate::core::config::ModelConfig;

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Google API error envelope
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    fn into_text(self) -> Result<String, ModelError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);

        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let reason = block_reason
                .map(|r| format!("blocked: {}", r))
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(ModelError::EmptyResponse(reason));
        }

        Ok(text)
    }
}

/// Client for the Generative Language `generateContent` REST endpoint
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
    model_name: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: config.base_url,
            model_name: config.model_name,
            api_key: config.api_key,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            urlencoding::encode(&self.model_name)
        )
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        tracing::debug!(
            "Calling model '{}' with a {}-byte prompt",
            self.model_name,
            prompt.len()
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ModelError::Http {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| ModelError::Parse(e.to_string()))?
            .into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    fn parse(value: Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    /// Serve a fake generateContent endpoint on an ephemeral port
    async fn spawn_fake_api(status: StatusCode, body: Value) -> String {
        let app = Router::new().route(
            "/v1beta/models/{model}",
            post(move |Path(model): Path<String>, Json(req): Json<Value>| {
                let body = body.clone();
                async move {
                    assert_eq!(model, "gemini-pro:generateContent");
                    assert_eq!(req["contents"][0]["parts"][0]["text"], "hello");
                    (status, Json(body))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: String) -> GeminiClient {
        GeminiClient::new(ModelConfig {
            api_key: "test-key".to_string(),
            model_name: "gemini-pro".to_string(),
            base_url,
        })
    }

    #[test]
    fn test_into_text_joins_parts_of_first_candidate() {
        let response = parse(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "| a |" }, { "text": "\n| 1 |" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }));
        assert_eq!(response.into_text().unwrap(), "| a |\n| 1 |");
    }

    #[test]
    fn test_into_text_reports_block_reason() {
        let response = parse(json!({ "promptFeedback": { "blockReason": "SAFETY" } }));
        match response.into_text() {
            Err(ModelError::EmptyResponse(reason)) => assert_eq!(reason, "blocked: SAFETY"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_endpoint_url() {
        let client = client("https://generativelanguage.googleapis.com".to_string());
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[tokio::test]
    async fn test_generate_returns_text() {
        let base_url = spawn_fake_api(
            StatusCode::OK,
            json!({ "candidates": [{ "content": { "parts": [{ "text": "42" }] } }] }),
        )
        .await;

        let answer = client(base_url).generate("hello").await.unwrap();
        assert_eq!(answer, "42");
    }

    #[tokio::test]
    async fn test_generate_surfaces_api_error_message() {
        let base_url = spawn_fake_api(
            StatusCode::BAD_REQUEST,
            json!({ "error": { "code": 400, "message": "API key not valid" } }),
        )
        .await;

        match client(base_url).generate("hello").await {
            Err(ModelError::Http { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
