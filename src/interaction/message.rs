//! Channel message envelopes and their WebSocket wire form
//!
//! Text frames carry `[join_ref, ref, topic, event, payload]`. The object
//! form `{"topic", "event", "payload", "ref", "join_ref"}` is accepted on
//! decode.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::Message;

use crate::{DocketError, Result};

/// Event name of a reply to a push
pub const PHX_REPLY: &str = "phx_reply";

/// How a message travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Client push to the server, carries a ref
    Push,
    /// Broadcast to every subscriber of a topic
    Broadcast,
    /// Broadcast to every subscriber except the sender
    BroadcastFrom,
    /// Server reply to a push
    Reply,
}

/// A message sent or received on a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// Delivery kind
    pub kind: MessageKind,
    /// Channel topic
    pub topic: String,
    /// Event name
    pub event: String,
    /// Correlation id of a push and its reply
    pub reference: Option<String>,
    /// Ref of the join that opened the channel
    pub join_ref: Option<String>,
    /// Event payload
    pub payload: Value,
}

#[derive(Deserialize)]
struct ObjectFrame {
    topic: String,
    event: String,
    #[serde(default)]
    payload: Value,
    #[serde(default, rename = "ref")]
    reference: Option<String>,
    #[serde(default)]
    join_ref: Option<String>,
}

impl MessageEnvelope {
    /// Envelope for a push with the given ref
    pub fn push(
        topic: impl Into<String>,
        event: impl Into<String>,
        payload: Value,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            kind: MessageKind::Push,
            topic: topic.into(),
            event: event.into(),
            reference: Some(reference.into()),
            join_ref: None,
            payload,
        }
    }

    /// Envelope for a broadcast (no ref)
    pub fn broadcast(topic: impl Into<String>, event: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: MessageKind::Broadcast,
            topic: topic.into(),
            event: event.into(),
            reference: None,
            join_ref: None,
            payload,
        }
    }

    /// Envelope for a broadcast that skips the sender
    pub fn broadcast_from(
        topic: impl Into<String>,
        event: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            kind: MessageKind::BroadcastFrom,
            ..Self::broadcast(topic, event, payload)
        }
    }

    /// Envelope for a reply to the push with `reference`
    pub fn reply(
        topic: impl Into<String>,
        reference: impl Into<String>,
        status: &str,
        response: Value,
    ) -> Self {
        Self {
            kind: MessageKind::Reply,
            topic: topic.into(),
            event: PHX_REPLY.to_string(),
            reference: Some(reference.into()),
            join_ref: None,
            payload: json!({ "status": status, "response": response }),
        }
    }

    /// Set the join ref
    #[must_use]
    pub fn with_join_ref(mut self, join_ref: Option<String>) -> Self {
        self.join_ref = join_ref;
        self
    }

    /// Reply status (`ok`, `error`, ...) of a reply envelope
    #[must_use]
    pub fn reply_status(&self) -> Option<&str> {
        match self.kind {
            MessageKind::Reply => self.payload.get("status").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Encode as a text frame in array form
    ///
    /// # Errors
    ///
    /// Returns error if the payload cannot be serialized
    pub fn encode(&self) -> Result<Message> {
        let frame = json!([
            self.join_ref,
            self.reference,
            self.topic,
            self.event,
            self.payload,
        ]);
        Ok(Message::Text(serde_json::to_string(&frame)?))
    }

    /// Decode a WebSocket frame
    ///
    /// Returns `Ok(None)` for control frames.
    ///
    /// # Errors
    ///
    /// Returns error for binary frames or malformed text
    pub fn decode(message: &Message) -> Result<Option<Self>> {
        match message {
            Message::Text(text) => Self::decode_text(text).map(Some),
            Message::Binary(_) => Err(DocketError::InvalidMessage(
                "binary frames do not carry envelopes".to_string(),
            )),
            Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => Ok(None),
        }
    }

    fn decode_text(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;

        let frame = match value {
            Value::Array(items) => array_frame(items)?,
            Value::Object(map) => serde_json::from_value::<ObjectFrame>(Value::Object(map))?,
            other => {
                return Err(DocketError::InvalidMessage(format!(
                    "expected array or object frame, got {other}"
                )))
            }
        };

        let kind = if frame.event == PHX_REPLY {
            MessageKind::Reply
        } else if frame.reference.is_some() {
            MessageKind::Push
        } else {
            MessageKind::Broadcast
        };

        Ok(Self {
            kind,
            topic: frame.topic,
            event: frame.event,
            reference: frame.reference,
            join_ref: frame.join_ref,
            payload: frame.payload,
        })
    }
}

fn array_frame(items: Vec<Value>) -> Result<ObjectFrame> {
    let [join_ref, reference, topic, event, payload]: [Value; 5] =
        items.try_into().map_err(|items: Vec<Value>| {
            DocketError::InvalidMessage(format!("expected 5 frame elements, got {}", items.len()))
        })?;

    Ok(ObjectFrame {
        topic: string_field("topic", topic)?,
        event: string_field("event", event)?,
        payload,
        reference: optional_ref("ref", reference)?,
        join_ref: optional_ref("join_ref", join_ref)?,
    })
}

fn string_field(name: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(DocketError::InvalidMessage(format!(
            "{name} must be a string, got {other}"
        ))),
    }
}

fn optional_ref(name: &str, value: Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(DocketError::InvalidMessage(format!(
            "{name} must be a string or null, got {other}"
        ))),
    }
}
