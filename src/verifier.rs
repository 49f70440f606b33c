use crate::error::{Result, WebhookError};
use crate::headers;
use crate::payload;
use crate::types::WebhookBatch;
use crate::verification;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Verifies and parses webhooks signed with one shared secret.
///
/// Cloning is cheap; the secret is shared.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Arc<str>,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(WebhookError::InvalidArgument(
                "webhook secret cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            secret: Arc::from(secret),
        })
    }

    pub fn verify(&self, payload: &str, signature: &str) -> bool {
        // The secret was checked in `new`, so an error here cannot be a caller mistake.
        verification::verify_signature(&self.secret, payload, signature).unwrap_or(false)
    }

    pub fn verify_headers(&self, headers: &HashMap<String, String>, payload: &str) -> bool {
        match headers::extract_signature_from_headers(Some(headers)) {
            Some(signature) => self.verify(payload, &signature),
            None => false,
        }
    }

    pub fn sign(&self, payload: &str) -> Result<String> {
        verification::generate_signature(&self.secret, payload, true)
    }

    /// Verify, then parse. Nothing is parsed for an unauthenticated body.
    pub fn process(&self, signature: Option<&str>, payload: &str) -> Result<WebhookBatch> {
        let signature = signature
            .filter(|s| !s.trim().is_empty())
            .ok_or(WebhookError::SignatureMissing)?;

        if !self.verify(payload, signature) {
            tracing::warn!("webhook signature mismatch");
            return Err(WebhookError::SignatureInvalid);
        }

        payload::parse_webhook_payload(payload)
    }
}

impl fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventType;

    const PAYLOAD: &str = r#"{"event":"open","email":"a@b.com","lane_id":"5805dd85-ed8c-44db-91a7-1d53a41c86a5","message_id":"m","timestamp":1}"#;

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new("whsec_facade").unwrap()
    }

    #[test]
    fn blank_secret_is_rejected() {
        assert!(matches!(
            WebhookVerifier::new(" "),
            Err(WebhookError::InvalidArgument(_))
        ));
    }

    #[test]
    fn debug_output_hides_secret() {
        let out = format!("{:?}", verifier());
        assert!(!out.contains("whsec_facade"));
    }

    #[test]
    fn verify_headers_uses_extracted_signature() {
        let v = verifier();
        let sig = v.sign(PAYLOAD).unwrap();

        let mut headers = HashMap::new();
        headers.insert("HTTP_X_WEBHOOK_SIGNATURE".to_string(), sig);
        assert!(v.verify_headers(&headers, PAYLOAD));

        assert!(!v.verify_headers(&HashMap::new(), PAYLOAD));
    }

    #[test]
    fn process_accepts_signed_payload() {
        let v = verifier();
        let sig = v.sign(PAYLOAD).unwrap();
        let batch = v.process(Some(&sig), PAYLOAD).unwrap();
        assert_eq!(batch.events[0].kind(), EventType::Open);
    }

    #[test]
    fn process_rejects_missing_and_bad_signatures() {
        let v = verifier();
        assert_eq!(v.process(None, PAYLOAD), Err(WebhookError::SignatureMissing));
        assert_eq!(v.process(Some(""), PAYLOAD), Err(WebhookError::SignatureMissing));
        assert_eq!(
            v.process(Some("sha256=deadbeef"), PAYLOAD),
            Err(WebhookError::SignatureInvalid)
        );
    }

    #[test]
    fn process_surfaces_payload_errors_after_verification() {
        let v = verifier();
        let body = "[1]";
        let sig = v.sign(body).unwrap();
        assert_eq!(
            v.process(Some(&sig), body),
            Err(WebhookError::Payload("Event must be an object".into()))
        );
    }
}
