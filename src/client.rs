use crate::config::ClientConfig;
use crate::email::Email;
use crate::error::ClientError;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

type Result<T> = std::result::Result<T, ClientError>;

const SEND_PATH: &str = "/v1/send";

/// Accepted-send acknowledgement. `raw` keeps the full response body.
#[derive(Debug, Clone, PartialEq)]
pub struct SendResponse {
    pub message_id: Option<String>,
    pub status: Option<String>,
    pub raw: Value,
}

#[derive(Deserialize)]
struct AckFields {
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Thin client for the send endpoint. One request per call, no retries.
pub struct MailClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl MailClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}{SEND_PATH}", config.base_url.trim_end_matches('/')),
            api_key: config.api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn send(&self, email: &Email) -> Result<SendResponse> {
        tracing::debug!(
            recipients = email.recipient_count(),
            tag = email.tag(),
            "sending email"
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = error_message(&body);
            tracing::warn!(status = status.as_u16(), %message, "send rejected");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ClientError::Unauthorized(message)
                }
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    ClientError::Rejected(message)
                }
                _ => ClientError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let raw: Value = serde_json::from_str(&body)
            .map_err(|e| ClientError::Decode(format!("{e}: {body}")))?;
        let ack: AckFields = serde_json::from_value(raw.clone())
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        tracing::debug!(message_id = ack.message_id.as_deref(), "email accepted");
        Ok(SendResponse {
            message_id: ack.message_id,
            status: ack.status,
            raw,
        })
    }
}

/// Prefer the API's `message`/`error` field; fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
