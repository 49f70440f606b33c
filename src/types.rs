use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Delivery-lifecycle event kinds reported by the sending API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Delivery,
    Open,
    Click,
    Drop,
    SpamComplaint,
    Unsubscribe,
    Bounce,
}

impl EventType {
    pub const ALL: [EventType; 7] = [
        EventType::Delivery,
        EventType::Open,
        EventType::Click,
        EventType::Drop,
        EventType::SpamComplaint,
        EventType::Unsubscribe,
        EventType::Bounce,
    ];

    /// Exact, case-sensitive match against the wire name.
    pub fn from_wire(name: &str) -> Option<Self> {
        EventType::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Delivery => "delivery",
            EventType::Open => "open",
            EventType::Click => "click",
            EventType::Drop => "drop",
            EventType::SpamComplaint => "spam_complaint",
            EventType::Unsubscribe => "unsubscribe",
            EventType::Bounce => "bounce",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single event field value, typed the way it arrived in JSON.
///
/// Anything that is not a string, an i64-sized integer, a boolean, or (for
/// optional fields) a plain object/array is kept as its raw JSON text.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Mapping(BTreeMap<String, FieldValue>),
    Sequence(Vec<FieldValue>),
    RawJson(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Render back into a `serde_json::Value`.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Integer(n) => Value::from(*n),
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            FieldValue::Sequence(items) => {
                Value::Array(items.iter().map(FieldValue::to_json).collect())
            }
            FieldValue::RawJson(raw) => {
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()))
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{n}"),
            FieldValue::Boolean(b) => write!(f, "{b}"),
            FieldValue::RawJson(raw) => f.write_str(raw),
            FieldValue::Mapping(_) | FieldValue::Sequence(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Integer(n) => serializer.serialize_i64(*n),
            FieldValue::Boolean(b) => serializer.serialize_bool(*b),
            FieldValue::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            FieldValue::Sequence(items) => {
                let mut out = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    out.serialize_element(item)?;
                }
                out.end()
            }
            FieldValue::RawJson(_) => self.to_json().serialize(serializer),
        }
    }
}

/// One validated webhook event.
///
/// The required fields are checked at parse time, so their accessors are
/// infallible. Every field that was copied from the payload, required or
/// optional, is also reachable through [`WebhookEvent::get`].
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    pub(crate) kind: EventType,
    pub(crate) email: String,
    pub(crate) lane_id: String,
    pub(crate) message_id: FieldValue,
    pub(crate) timestamp: i64,
    pub(crate) fields: BTreeMap<String, FieldValue>,
}

impl WebhookEvent {
    pub fn kind(&self) -> EventType {
        self.kind
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn lane_id(&self) -> &str {
        &self.lane_id
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// The `message_id` exactly as it arrived (usually text).
    pub fn message_id(&self) -> &FieldValue {
        &self.message_id
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn tag(&self) -> Option<&str> {
        self.get("tag").and_then(FieldValue::as_text)
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl Serialize for WebhookEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            out.serialize_entry(k, v)?;
        }
        out.end()
    }
}

/// Result of parsing one webhook request body.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookBatch {
    pub is_batch: bool,
    pub events: Vec<WebhookEvent>,
}

impl WebhookBatch {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl IntoIterator for WebhookBatch {
    type Item = WebhookEvent;
    type IntoIter = std::vec::IntoIter<WebhookEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_round_trips_wire_names() {
        for kind in EventType::ALL {
            assert_eq!(EventType::from_wire(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn event_type_match_is_case_sensitive() {
        assert_eq!(EventType::from_wire("Delivery"), None);
        assert_eq!(EventType::from_wire("SPAM_COMPLAINT"), None);
        assert_eq!(EventType::from_wire(""), None);
    }

    #[test]
    fn raw_json_renders_as_parsed_value() {
        let value = FieldValue::RawJson("1.5".into());
        assert_eq!(value.to_json(), serde_json::json!(1.5));
        assert_eq!(value.to_string(), "1.5");
    }

    #[test]
    fn nested_values_serialize_as_plain_json() {
        let mut inner = BTreeMap::new();
        inner.insert("campaign".to_string(), FieldValue::Text("spring".into()));
        inner.insert(
            "ids".to_string(),
            FieldValue::Sequence(vec![FieldValue::Integer(1), FieldValue::Boolean(false)]),
        );
        let value = FieldValue::Mapping(inner);

        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "campaign": "spring", "ids": [1, false] })
        );
        assert_eq!(json, value.to_json());
    }
}
