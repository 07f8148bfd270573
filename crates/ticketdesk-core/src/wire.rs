//! Notification message envelope.
//!
//! Clients send `{ "type": "new-ticket" | "update-ticket", "ticket": {...} }`;
//! the channel rebroadcasts `{ "type": "ticket-created" | "ticket-updated", "data": {...} }`.
//! The outbound names are accepted inbound as well, and `data` is accepted
//! in place of `ticket`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::event::{EventKind, TicketEvent};

/// Timestamp fields rendered as strings before broadcast.
const TIMESTAMP_FIELDS: [&str; 2] = ["createdAt", "updatedAt"];

#[derive(Error, Debug)]
pub enum WireError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message of type '{0}' carries no ticket")]
    MissingPayload(String),

    #[error("ticket payload of '{0}' is not an object")]
    PayloadNotObject(String),
}

/// Untyped envelope, before the message type is interpreted.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
    ticket: Option<Value>,
    data: Option<Value>,
}

/// Channel → client message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub data: Value,
}

impl OutboundMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A parsed message.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Event(TicketEvent),
    /// A well-formed message of a type nobody handles.
    Unrecognized(String),
}

fn inbound_kind(kind: &str) -> Option<EventKind> {
    match kind {
        "new-ticket" => Some(EventKind::Created),
        "update-ticket" => Some(EventKind::Updated),
        other => EventKind::parse(other),
    }
}

fn parse_with(text: &str, kind_of: fn(&str) -> Option<EventKind>) -> Result<Parsed, WireError> {
    let raw: RawEnvelope = serde_json::from_str(text)?;
    let Some(kind) = kind_of(&raw.kind) else {
        return Ok(Parsed::Unrecognized(raw.kind));
    };
    let payload = raw
        .ticket
        .or(raw.data)
        .filter(|v| !v.is_null())
        .ok_or_else(|| WireError::MissingPayload(raw.kind.clone()))?;
    if !payload.is_object() {
        return Err(WireError::PayloadNotObject(raw.kind));
    }
    Ok(Parsed::Event(TicketEvent { kind, payload }))
}

/// Parse a client → channel message.
pub fn parse_inbound(text: &str) -> Result<Parsed, WireError> {
    parse_with(text, inbound_kind)
}

/// Parse a channel → client message.
pub fn parse_outbound(text: &str) -> Result<Parsed, WireError> {
    parse_with(text, EventKind::parse)
}

/// Normalise a ticket payload for broadcast.
///
/// Guarantees an `id` (taken from `_id` when absent) and mirrors it into
/// `_id`; renders timestamp fields as strings, dropping null ones.
pub fn enrich(payload: Value) -> Value {
    let Value::Object(mut map) = payload else {
        return payload;
    };

    let id = ticket_id_in(&map).map(str::to_string);
    if let Some(id) = id {
        map.insert("id".to_string(), Value::String(id.clone()));
        map.entry("_id").or_insert(Value::String(id));
    }

    for field in TIMESTAMP_FIELDS {
        match map.remove(field) {
            None | Some(Value::Null) => {}
            Some(value) => {
                map.insert(field.to_string(), Value::String(timestamp_string(value)));
            }
        }
    }

    Value::Object(map)
}

fn timestamp_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn ticket_id_in(map: &Map<String, Value>) -> Option<&str> {
    non_empty_str(map.get("id")).or_else(|| non_empty_str(map.get("_id")))
}

/// The id of a ticket payload: `id`, falling back to `_id`.
pub fn ticket_id(payload: &Value) -> Option<&str> {
    payload.as_object().and_then(ticket_id_in)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inbound_names_map_to_event_kinds() {
        let created = parse_inbound(r#"{"type":"new-ticket","ticket":{"id":"t1"}}"#).unwrap();
        assert!(matches!(created, Parsed::Event(TicketEvent { kind: EventKind::Created, .. })));

        let updated = parse_inbound(r#"{"type":"ticket-updated","data":{"id":"t1"}}"#).unwrap();
        assert!(matches!(updated, Parsed::Event(TicketEvent { kind: EventKind::Updated, .. })));
    }

    #[test]
    fn test_unrecognized_type_is_not_an_error() {
        let parsed = parse_inbound(r#"{"type":"complaint-update","complaint":{}}"#).unwrap();
        assert_eq!(parsed, Parsed::Unrecognized("complaint-update".to_string()));
    }

    #[test]
    fn test_outbound_parser_rejects_inbound_names() {
        let parsed = parse_outbound(r#"{"type":"new-ticket","ticket":{"id":"t1"}}"#).unwrap();
        assert_eq!(parsed, Parsed::Unrecognized("new-ticket".to_string()));
    }

    #[test]
    fn test_malformed_messages() {
        assert!(matches!(parse_inbound("not json"), Err(WireError::Json(_))));
        assert!(matches!(parse_inbound(r#"{"ticket":{}}"#), Err(WireError::Json(_))));
        assert!(matches!(
            parse_inbound(r#"{"type":"new-ticket"}"#),
            Err(WireError::MissingPayload(_))
        ));
        assert!(matches!(
            parse_inbound(r#"{"type":"new-ticket","ticket":"t1"}"#),
            Err(WireError::PayloadNotObject(_))
        ));
    }

    #[test]
    fn test_enrich_fills_id_from_alternate_field() {
        let enriched = enrich(json!({"_id": "abc", "status": "open"}));
        assert_eq!(enriched["id"], "abc");
        assert_eq!(enriched["_id"], "abc");

        let enriched = enrich(json!({"id": "t1", "_id": "legacy"}));
        assert_eq!(enriched["id"], "t1");
        assert_eq!(enriched["_id"], "legacy");
    }

    #[test]
    fn test_enrich_stringifies_timestamps() {
        let enriched = enrich(json!({
            "id": "t1",
            "createdAt": 1_700_000_000_000_i64,
            "updatedAt": null,
        }));
        assert_eq!(enriched["createdAt"], "2023-11-14T22:13:20+00:00");
        assert!(enriched.get("updatedAt").is_none());

        let enriched = enrich(json!({"id": "t1", "createdAt": "2024-01-01T00:00:00Z"}));
        assert_eq!(enriched["createdAt"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_outbound_shape() {
        let msg = OutboundMessage {
            kind: EventKind::Created,
            data: json!({"id": "t1"}),
        };
        let value: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(value, json!({"type": "ticket-created", "data": {"id": "t1"}}));
    }
}
