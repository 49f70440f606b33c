//! Client for the Mail Lane sending API, plus verification and parsing of
//! the delivery webhooks it emits.
//!
//! ```
//! use mail_lane::{generate_signature, parse_webhook_payload, verify_signature};
//!
//! let body = r#"{"event":"open","email":"user@example.com","lane_id":"5805dd85-ed8c-44db-91a7-1d53a41c86a5","message_id":"msg-1","timestamp":1640995200}"#;
//! let signature = generate_signature("whsec_docs", body, true).unwrap();
//!
//! assert!(verify_signature("whsec_docs", body, &signature).unwrap());
//! let batch = parse_webhook_payload(body).unwrap();
//! assert!(!batch.is_batch);
//! assert_eq!(batch.events[0].email(), "user@example.com");
//! ```

pub mod client;
pub mod config;
pub mod email;
pub mod error;
pub mod headers;
pub mod http_server;
pub mod payload;
pub mod store;
pub mod types;
pub mod verification;
pub mod verifier;

pub use client::{MailClient, SendResponse};
pub use config::{AppConfig, ClientConfig, ConfigError, ReceiverConfig};
pub use email::{Email, EmailBuilder};
pub use error::{ClientError, WebhookError};
pub use headers::{
    extract_signature_from_header_map, extract_signature_from_headers, signature_header_name,
    SIGNATURE_HEADER,
};
pub use payload::parse_webhook_payload;
pub use types::{EventType, FieldValue, WebhookBatch, WebhookEvent};
pub use verification::{generate_signature, verify_signature};
pub use verifier::WebhookVerifier;
