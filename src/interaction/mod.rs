//! Interactions captured from tests for documentation

mod http;
mod message;

pub use http::{ControllerAnnotation, HttpExchange, HttpRequest, HttpResponse};
pub use message::{MessageEnvelope, MessageKind, PHX_REPLY};

use serde::{Deserialize, Serialize};

/// A captured unit to be documented
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Interaction {
    /// Request/response pair
    Http(HttpExchange),
    /// Channel message
    Message(MessageEnvelope),
}

impl Interaction {
    /// Largest request, response or payload body in bytes
    #[must_use]
    pub fn largest_body(&self) -> usize {
        match self {
            Self::Http(exchange) => exchange.request.body.len().max(exchange.response.body.len()),
            Self::Message(envelope) => envelope.payload.to_string().len(),
        }
    }
}

impl From<HttpExchange> for Interaction {
    fn from(exchange: HttpExchange) -> Self {
        Self::Http(exchange)
    }
}

impl From<MessageEnvelope> for Interaction {
    fn from(envelope: MessageEnvelope) -> Self {
        Self::Message(envelope)
    }
}
