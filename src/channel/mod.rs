//! Channel glue: the socket primitive documented messages are sent through

mod websocket;

pub use websocket::WsChannel;

use crate::interaction::MessageEnvelope;
use crate::Result;

/// Event name of a channel join
pub const PHX_JOIN: &str = "phx_join";

/// A joined channel that can send envelopes
///
/// Implemented by [`WsChannel`] for WebSocket transports; test harnesses
/// with their own socket type implement it directly.
#[allow(async_fn_in_trait)]
pub trait Channel {
    /// Topic this channel is joined to
    fn topic(&self) -> &str;

    /// Ref of the join, if the transport tracks one
    fn join_ref(&self) -> Option<&str>;

    /// Allocate the ref for the next push
    fn next_ref(&mut self) -> String;

    /// Send an envelope over the transport
    ///
    /// # Errors
    ///
    /// Returns [`DocketError::Dispatch`](crate::DocketError::Dispatch) if the
    /// transport fails
    async fn dispatch(&mut self, envelope: &MessageEnvelope) -> Result<()>;
}
