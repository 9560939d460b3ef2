//! HTTP transport over the chat service endpoint

use super::{ByteStream, Transport};
use crate::auth::Credential;
use crate::config::ChatConfig;
use crate::conversation::Turn;
use crate::error::ChatError;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Transport that POSTs to the chat endpoint and streams the plain-text body
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(config: &ChatConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint: config.endpoint.clone(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        prompt: &str,
        history: &[Turn],
        credential: &Credential,
    ) -> Result<ByteStream, ChatError> {
        let body = ChatRequest { prompt, history };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .bearer_auth(credential.token())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::timeout(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    ChatError::transport(format!("Connection failed: {e}"))
                } else {
                    ChatError::transport(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_status(status, &body));
        }

        let stream = response
            .bytes_stream()
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::timeout(format!("Response timed out mid-stream: {e}"))
                } else {
                    ChatError::transport(format!("Failed to read response: {e}"))
                }
            })
            .boxed();

        Ok(stream)
    }
}

/// Request body, coupling the new message and the full prior history.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    prompt: &'a str,
    history: &'a [Turn],
}

/// Failure payload shape: the `detail` string, when present, is surfaced
/// verbatim as the error message.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

fn error_from_status(status: StatusCode, body: &str) -> ChatError {
    if let Ok(ErrorBody {
        detail: Some(detail),
    }) = serde_json::from_str::<ErrorBody>(body)
    {
        return ChatError::request_failed(detail);
    }
    ChatError::request_failed(format!(
        "Request failed with status {}",
        status.as_u16()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatErrorKind;

    #[test]
    fn detail_field_becomes_the_error_message() {
        let err = error_from_status(StatusCode::INTERNAL_SERVER_ERROR, r#"{"detail":"overloaded"}"#);
        assert_eq!(err.kind, ChatErrorKind::RequestFailed);
        assert_eq!(err.message, "overloaded");
    }

    #[test]
    fn missing_detail_falls_back_to_status_message() {
        let err = error_from_status(StatusCode::NOT_FOUND, "");
        assert_eq!(err.message, "Request failed with status 404");
    }

    #[test]
    fn unparseable_body_falls_back_to_status_message() {
        let err = error_from_status(StatusCode::BAD_GATEWAY, "<html>nope</html>");
        assert_eq!(err.message, "Request failed with status 502");
    }

    #[test]
    fn request_body_matches_the_wire_contract() {
        let history = vec![Turn::user("hi"), Turn::model("hello")];
        let body = ChatRequest {
            prompt: "next",
            history: &history,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "prompt": "next",
                "history": [
                    {"role": "user", "text": "hi"},
                    {"role": "model", "text": "hello"},
                ],
            })
        );
    }
}
