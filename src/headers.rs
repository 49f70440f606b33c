use axum::http::HeaderMap;
use std::collections::HashMap;

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Key spellings tried in order: the header itself, the CGI/env style name,
/// and the CGI name with its `HTTP_` prefix.
const SIGNATURE_KEYS: [&str; 3] = [
    SIGNATURE_HEADER,
    "X_WEBHOOK_SIGNATURE",
    "HTTP_X_WEBHOOK_SIGNATURE",
];

pub fn signature_header_name() -> &'static str {
    SIGNATURE_HEADER
}

/// Find the signature among loosely-keyed headers.
///
/// Exact spellings win. If none match, the same spellings are retried
/// ignoring ASCII case, so `X-Webhook-Signature` or `x_webhook_signature`
/// are still found.
pub fn extract_signature_from_headers(headers: Option<&HashMap<String, String>>) -> Option<String> {
    let headers = headers?;

    for key in SIGNATURE_KEYS {
        if let Some(value) = headers.get(key) {
            return Some(value.clone());
        }
    }

    SIGNATURE_KEYS.iter().find_map(|key| {
        headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.clone())
    })
}

/// Same lookup over an HTTP header map. Values that are not visible ASCII
/// are skipped.
pub fn extract_signature_from_header_map(headers: &HeaderMap) -> Option<String> {
    SIGNATURE_KEYS.iter().find_map(|key| {
        headers
            .get(*key)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn canonical_name() {
        assert_eq!(signature_header_name(), "x-webhook-signature");
    }

    #[test]
    fn finds_canonical_header() {
        let h = headers(&[("x-webhook-signature", "sha256=abc")]);
        assert_eq!(
            extract_signature_from_headers(Some(&h)),
            Some("sha256=abc".to_string())
        );
    }

    #[test]
    fn finds_env_style_header() {
        let h = headers(&[("X_WEBHOOK_SIGNATURE", "abc")]);
        assert_eq!(extract_signature_from_headers(Some(&h)), Some("abc".to_string()));
    }

    #[test]
    fn finds_cgi_style_header() {
        let h = headers(&[("HTTP_X_WEBHOOK_SIGNATURE", "def")]);
        assert_eq!(extract_signature_from_headers(Some(&h)), Some("def".to_string()));
    }

    #[test]
    fn absent_or_empty_headers_yield_none() {
        assert_eq!(extract_signature_from_headers(None), None);
        assert_eq!(extract_signature_from_headers(Some(&HashMap::new())), None);
        let h = headers(&[("content-type", "application/json")]);
        assert_eq!(extract_signature_from_headers(Some(&h)), None);
    }

    #[test]
    fn lookup_order_is_fixed() {
        let h = headers(&[
            ("HTTP_X_WEBHOOK_SIGNATURE", "third"),
            ("X_WEBHOOK_SIGNATURE", "second"),
            ("x-webhook-signature", "first"),
        ]);
        assert_eq!(extract_signature_from_headers(Some(&h)), Some("first".to_string()));

        let h = headers(&[
            ("HTTP_X_WEBHOOK_SIGNATURE", "third"),
            ("X_WEBHOOK_SIGNATURE", "second"),
        ]);
        assert_eq!(extract_signature_from_headers(Some(&h)), Some("second".to_string()));
    }

    #[test]
    fn exact_match_beats_case_folded_match() {
        let h = headers(&[
            ("X-Webhook-Signature", "folded"),
            ("X_WEBHOOK_SIGNATURE", "exact"),
        ]);
        assert_eq!(extract_signature_from_headers(Some(&h)), Some("exact".to_string()));
    }

    #[test]
    fn mixed_case_keys_are_found() {
        let h = headers(&[("X-Webhook-Signature", "abc")]);
        assert_eq!(extract_signature_from_headers(Some(&h)), Some("abc".to_string()));

        let h = headers(&[("x_webhook_signature", "def")]);
        assert_eq!(extract_signature_from_headers(Some(&h)), Some("def".to_string()));
    }

    #[test]
    fn header_map_lookup() {
        let mut map = HeaderMap::new();
        map.insert("x-webhook-signature", HeaderValue::from_static("sha256=abc"));
        assert_eq!(
            extract_signature_from_header_map(&map),
            Some("sha256=abc".to_string())
        );

        let mut map = HeaderMap::new();
        map.insert("x_webhook_signature", HeaderValue::from_static("abc"));
        assert_eq!(extract_signature_from_header_map(&map), Some("abc".to_string()));

        assert_eq!(extract_signature_from_header_map(&HeaderMap::new()), None);
    }

    #[test]
    fn header_map_skips_non_ascii_values() {
        let mut map = HeaderMap::new();
        map.insert(
            "x-webhook-signature",
            HeaderValue::from_bytes(b"sha256=\xff\xfe").unwrap(),
        );
        map.insert("x_webhook_signature", HeaderValue::from_static("sha256=abc"));
        assert_eq!(
            extract_signature_from_header_map(&map),
            Some("sha256=abc".to_string())
        );

        let mut map = HeaderMap::new();
        map.insert(
            "x-webhook-signature",
            HeaderValue::from_bytes(b"caf\xc3\xa9").unwrap(),
        );
        assert_eq!(extract_signature_from_header_map(&map), None);
    }
}
