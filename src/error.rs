use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised while verifying or parsing inbound webhooks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// A caller-supplied argument is unusable (e.g. a blank secret).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The payload failed a structural or field-level check.
    #[error("Payload error: {0}")]
    Payload(String),

    /// No signature header was present on the request.
    #[error("Signature missing from request")]
    SignatureMissing,

    /// The signature did not match the payload.
    #[error("Signature verification failed")]
    SignatureInvalid,
}

impl WebhookError {
    pub(crate) fn payload(message: impl Into<String>) -> Self {
        WebhookError::Payload(message.into())
    }

    /// HTTP status a receiver should answer with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::Payload(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidArgument(_)
            | WebhookError::SignatureMissing
            | WebhookError::SignatureInvalid => StatusCode::UNAUTHORIZED,
        }
    }
}

pub type Result<T> = std::result::Result<T, WebhookError>;

/// Errors raised while building or sending an email.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The email failed local validation and was never sent.
    #[error("Invalid email: {0}")]
    Validation(String),

    /// The client configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The API key was refused.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// The API understood the request but refused it.
    #[error("Email rejected: {0}")]
    Rejected(String),

    /// Any other non-success response.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never completed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the expected JSON.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}
