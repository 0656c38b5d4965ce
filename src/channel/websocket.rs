//! Channel over a WebSocket connection

use std::fmt::Display;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use crate::interaction::MessageEnvelope;
use crate::{DocketError, Result};

use super::{Channel, PHX_JOIN};

/// A channel topic multiplexed over a WebSocket
///
/// `S` is usually a `tokio_tungstenite::WebSocketStream`; any sink of
/// [`Message`] works for sending, and a stream of them for receiving.
pub struct WsChannel<S> {
    socket: S,
    topic: String,
    join_ref: Option<String>,
    next_ref: u64,
}

impl<S> WsChannel<S> {
    /// Wrap a socket for `topic`; refs start at 1
    pub fn new(socket: S, topic: impl Into<String>) -> Self {
        Self {
            socket,
            topic: topic.into(),
            join_ref: None,
            next_ref: 1,
        }
    }

    /// Unwrap the socket
    pub fn into_inner(self) -> S {
        self.socket
    }
}

impl<S> WsChannel<S>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    /// Join the topic, remembering the join ref for later frames
    ///
    /// # Errors
    ///
    /// Returns error if the join frame cannot be sent
    pub async fn join(&mut self, payload: Value) -> Result<MessageEnvelope> {
        let reference = self.next_ref();
        let envelope = MessageEnvelope::push(self.topic.clone(), PHX_JOIN, payload, reference.clone())
            .with_join_ref(Some(reference.clone()));

        self.dispatch(&envelope).await?;
        self.join_ref = Some(reference);
        Ok(envelope)
    }
}

impl<S, E> WsChannel<S>
where
    S: Stream<Item = std::result::Result<Message, E>> + Unpin,
    E: Display,
{
    /// Next envelope from the server, skipping control frames
    ///
    /// Returns `Ok(None)` once the connection is closed.
    ///
    /// # Errors
    ///
    /// Returns error if the transport fails or a frame cannot be decoded
    pub async fn next_envelope(&mut self) -> Result<Option<MessageEnvelope>> {
        while let Some(frame) = self.socket.next().await {
            let frame = frame.map_err(|e| DocketError::Dispatch(format!("receive failed: {e}")))?;

            if frame.is_close() {
                debug!("Server closed channel {}", self.topic);
                return Ok(None);
            }

            if let Some(envelope) = MessageEnvelope::decode(&frame)? {
                if envelope.topic != self.topic {
                    warn!(
                        "Frame for topic {} received on channel {}",
                        envelope.topic, self.topic
                    );
                }
                return Ok(Some(envelope));
            }
        }

        Ok(None)
    }
}

impl<S> Channel for WsChannel<S>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    fn topic(&self) -> &str {
        &self.topic
    }

    fn join_ref(&self) -> Option<&str> {
        self.join_ref.as_deref()
    }

    fn next_ref(&mut self) -> String {
        let reference = self.next_ref;
        self.next_ref += 1;
        reference.to_string()
    }

    async fn dispatch(&mut self, envelope: &MessageEnvelope) -> Result<()> {
        if envelope.topic != self.topic {
            return Err(DocketError::Dispatch(format!(
                "envelope topic {} does not match channel {}",
                envelope.topic, self.topic
            )));
        }

        let frame = envelope.encode()?;
        debug!("Dispatch {:?} {} on {}", envelope.kind, envelope.event, self.topic);

        self.socket
            .send(frame)
            .await
            .map_err(|e| DocketError::Dispatch(format!("send failed: {e}")))
    }
}
