//! Parsing and validation of webhook request bodies.
//!
//! A body is either one event object or an array of event objects. Each event
//! must carry the required fields below; a fixed set of optional fields is
//! copied through and everything else is ignored. The first failing check
//! aborts the whole parse.

use crate::error::{Result, WebhookError};
use crate::types::{EventType, FieldValue, WebhookBatch, WebhookEvent};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Checked for presence in this order before any format check runs.
pub const REQUIRED_FIELDS: [&str; 5] = ["event", "email", "lane_id", "message_id", "timestamp"];

pub const OPTIONAL_FIELDS: [&str; 10] = [
    "metadata",
    "tag",
    "url",
    "is_hard",
    "text",
    "reason",
    "unsubscribe_group_id",
    "client_device",
    "client_os",
    "client_ip",
];

const HYPHENATED_UUID_LEN: usize = 36;

pub fn parse_webhook_payload(payload: &str) -> Result<WebhookBatch> {
    if payload.trim().is_empty() {
        return Err(WebhookError::payload("Webhook payload cannot be empty"));
    }

    let root: Value = serde_json::from_str(payload)
        .map_err(|e| WebhookError::payload(format!("Invalid JSON payload: {e}")))?;

    let batch = match root {
        Value::Array(items) => {
            let events = items
                .iter()
                .map(validate_and_parse_event)
                .collect::<Result<Vec<_>>>()?;
            WebhookBatch {
                is_batch: true,
                events,
            }
        }
        Value::Object(_) => WebhookBatch {
            is_batch: false,
            events: vec![validate_and_parse_event(&root)?],
        },
        _ => {
            return Err(WebhookError::payload(
                "Payload must be a JSON object or array of objects",
            ))
        }
    };

    tracing::debug!(
        is_batch = batch.is_batch,
        events = batch.events.len(),
        "parsed webhook payload"
    );
    Ok(batch)
}

fn validate_and_parse_event(value: &Value) -> Result<WebhookEvent> {
    let object = value
        .as_object()
        .ok_or_else(|| WebhookError::payload("Event must be an object"))?;

    let mut fields = BTreeMap::new();
    for name in REQUIRED_FIELDS {
        let raw = object
            .get(name)
            .ok_or_else(|| WebhookError::payload(format!("Missing required field: {name}")))?;
        fields.insert(name.to_string(), scalar_value(raw));
    }

    let kind = match &fields["event"] {
        FieldValue::Text(name) => EventType::from_wire(name),
        _ => None,
    }
    .ok_or_else(|| WebhookError::payload(format!("Invalid event type: {}", fields["event"])))?;

    let email = match &fields["email"] {
        FieldValue::Text(email) if is_email_shaped(email) => email.clone(),
        other => {
            return Err(WebhookError::payload(format!(
                "Invalid email format: {other}"
            )))
        }
    };

    let timestamp = fields["timestamp"]
        .as_integer()
        .ok_or_else(|| WebhookError::payload("Invalid timestamp format"))?;

    let lane_id = match &fields["lane_id"] {
        FieldValue::Text(id) if is_lane_id(id) => id.clone(),
        other => {
            return Err(WebhookError::payload(format!(
                "Invalid lane_id format: {other}"
            )))
        }
    };

    copy_optional_fields(object, &mut fields);

    Ok(WebhookEvent {
        kind,
        email,
        lane_id,
        message_id: fields["message_id"].clone(),
        timestamp,
        fields,
    })
}

fn copy_optional_fields(object: &Map<String, Value>, fields: &mut BTreeMap<String, FieldValue>) {
    for name in OPTIONAL_FIELDS {
        if let Some(raw) = object.get(name) {
            fields.insert(name.to_string(), nested_value(raw));
        }
    }
}

/// String, i64, and bool keep their type; everything else is raw JSON text.
fn scalar_value(value: &Value) -> FieldValue {
    match value {
        Value::String(s) => FieldValue::Text(s.clone()),
        Value::Bool(b) => FieldValue::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => FieldValue::Integer(i),
            None => FieldValue::RawJson(n.to_string()),
        },
        other => FieldValue::RawJson(other.to_string()),
    }
}

/// Like [`scalar_value`], but objects and arrays become nested values.
fn nested_value(value: &Value) -> FieldValue {
    match value {
        Value::Object(map) => FieldValue::Mapping(
            map.iter()
                .map(|(k, v)| (k.clone(), nested_value(v)))
                .collect(),
        ),
        Value::Array(items) => FieldValue::Sequence(items.iter().map(nested_value).collect()),
        other => scalar_value(other),
    }
}

// Coarse on purpose: this only rejects values that are clearly not addresses.
pub(crate) fn is_email_shaped(email: &str) -> bool {
    !email.is_empty() && email.contains('@') && email.contains('.')
}

/// 8-4-4-4-12 hex groups, either case. Braced, URN, and simple forms are
/// rejected by the length check.
pub(crate) fn is_lane_id(id: &str) -> bool {
    id.len() == HYPHENATED_UUID_LEN && Uuid::try_parse(id).is_ok()
}
