use std::{
    fmt,
    future::Future,
};

use reqwest::Client;
use serde::{
    Deserialize,
    Serialize,
};
use tracing::debug;

use super::prompt::CompletionRequest;
use crate::core::{
    http::http_client,
    AppConfig,
    KosakataError,
};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Something that turns a prompt into free text. Implemented over HTTP by
/// `MessagesClient`; tests use canned responses.
pub trait TextGenerator: Send + Sync {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, KosakataError>> + Send;
}

/// Client for an Anthropic-style messages endpoint.
#[derive(Clone)]
pub struct MessagesClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl fmt::Debug for MessagesClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessagesClient")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesClient {
    pub fn new(
        client: Client,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self { client, api_url: api_url.into(), api_key: api_key.into(), model: model.into() }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, KosakataError> {
        let api_key = config.api_key.clone().ok_or(KosakataError::MissingApiKey)?;
        let client = http_client(config.request_timeout())?;
        Ok(Self::new(client, &config.api_url, api_key, &config.model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextGenerator for MessagesClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, KosakataError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: vec![Message { role: "user", content: &request.prompt }],
        };

        let resp = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(KosakataError::Custom(format!("API request failed: {} {}", status, detail.trim())));
        }

        let parsed: MessagesResponse = resp.json().await?;
        debug!(blocks = parsed.content.len(), model = %self.model, "completion received");

        parsed
            .content
            .into_iter()
            .filter(|block| block.kind.is_empty() || block.kind == "text")
            .find_map(|block| block.text.filter(|t| !t.trim().is_empty()))
            .ok_or_else(|| KosakataError::Custom("Invalid API response format".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        http::{
            HeaderMap,
            StatusCode,
        },
        routing::post,
        Json,
        Router,
    };
    use serde_json::{
        json,
        Value,
    };

    use super::*;

    async fn spawn_api(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve app");
        });
        format!("http://{}/v1/messages", addr)
    }

    async fn fake_messages(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
            return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad key" })));
        }
        let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
        let reply = format!("[INDONESIAN]\n{} / {}", body["model"].as_str().unwrap_or_default(), prompt);
        (StatusCode::OK, Json(json!({ "content": [{ "type": "text", "text": reply }] })))
    }

    #[tokio::test]
    async fn test_complete_reads_first_text_block() {
        let url = spawn_api(Router::new().route("/v1/messages", post(fake_messages))).await;
        let client = MessagesClient::new(Client::new(), url, "test-key", "test-model");

        let text = client.complete(&CompletionRequest::new("halo".to_string(), 500)).await.expect("complete");
        assert_eq!(text, "[INDONESIAN]\ntest-model / halo");
    }

    #[tokio::test]
    async fn test_http_error_is_reported() {
        let url = spawn_api(Router::new().route("/v1/messages", post(fake_messages))).await;
        let client = MessagesClient::new(Client::new(), url, "wrong", "test-model");

        let err = client.complete(&CompletionRequest::new("halo".to_string(), 500)).await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = AppConfig::default();
        assert!(matches!(MessagesClient::from_config(&config), Err(KosakataError::MissingApiKey)));

        let config = AppConfig { api_key: Some("k".to_string()), ..AppConfig::default() };
        let client = MessagesClient::from_config(&config).expect("client");
        assert_eq!(client.model(), "claude-3-haiku-20240307");
        assert!(!format!("{:?}", client).contains("\"k\""));
    }
}
