//! Doc helpers: resolve options, record, then hand back or dispatch

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::call_site::CallSite;
use crate::channel::Channel;
use crate::config::Config;
use crate::interaction::{HttpExchange, Interaction, MessageEnvelope};
use crate::options::{resolve, DocOptions, ResolvedOptions};
use crate::recorder::{MemoryRecorder, Recorder};
use crate::Result;

/// Entry point for documenting interactions from tests
pub struct Docket<R = MemoryRecorder> {
    config: Arc<Config>,
    recorder: Arc<R>,
    enabled: bool,
}

impl Docket<MemoryRecorder> {
    /// Create a docket collecting into a [`MemoryRecorder`]
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid
    pub fn new(config: Config) -> Result<Self> {
        let recorder = MemoryRecorder::with_limits(config.limits.clone());
        Self::with_recorder(config, Arc::new(recorder))
    }
}

impl<R: Recorder> Docket<R> {
    /// Create a docket recording into `recorder`
    ///
    /// Whether docs are collected is decided here, from the config's
    /// override or environment variable.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid
    pub fn with_recorder(config: Config, recorder: Arc<R>) -> Result<Self> {
        config.validate()?;

        let enabled = config.is_enabled();
        debug!(
            "Doc collection {} (env var {})",
            if enabled { "enabled" } else { "disabled" },
            config.env_var
        );

        Ok(Self {
            config: Arc::new(config),
            recorder,
            enabled,
        })
    }

    /// Whether interactions are being recorded
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The configuration
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The recorder
    #[must_use]
    pub fn recorder(&self) -> &Arc<R> {
        &self.recorder
    }

    /// Resolve options against this docket's title table
    #[must_use]
    pub fn resolve(&self, site: &CallSite, options: DocOptions) -> ResolvedOptions {
        resolve(site, &self.config.titles, options)
    }

    /// Document an HTTP exchange, returning it for further assertions
    ///
    /// # Errors
    ///
    /// Returns error if the description is required but undeterminable, or
    /// the recorder rejects the exchange
    pub fn doc(
        &self,
        exchange: HttpExchange,
        site: &CallSite,
        options: DocOptions,
    ) -> Result<HttpExchange> {
        if self.enabled {
            self.record(Interaction::Http(exchange.clone()), site, options)?;
        }
        Ok(exchange)
    }

    /// Document a received or constructed channel message
    ///
    /// # Errors
    ///
    /// Returns error if the description is required but undeterminable, or
    /// the recorder rejects the message
    pub fn doc_message(
        &self,
        envelope: MessageEnvelope,
        site: &CallSite,
        options: DocOptions,
    ) -> Result<MessageEnvelope> {
        if self.enabled {
            self.record(Interaction::Message(envelope.clone()), site, options)?;
        }
        Ok(envelope)
    }

    /// Document a push, then send it on `channel`
    ///
    /// # Errors
    ///
    /// Returns error if recording fails (nothing is sent) or dispatch fails
    pub async fn doc_push<C: Channel>(
        &self,
        channel: &mut C,
        event: &str,
        payload: Value,
        site: &CallSite,
        options: DocOptions,
    ) -> Result<MessageEnvelope> {
        let reference = channel.next_ref();
        let envelope = MessageEnvelope::push(channel.topic(), event, payload, reference)
            .with_join_ref(channel.join_ref().map(str::to_string));

        self.doc_dispatch(channel, envelope, site, options).await
    }

    /// Document a broadcast, then send it on `channel`
    ///
    /// # Errors
    ///
    /// Returns error if recording fails (nothing is sent) or dispatch fails
    pub async fn doc_broadcast<C: Channel>(
        &self,
        channel: &mut C,
        event: &str,
        payload: Value,
        site: &CallSite,
        options: DocOptions,
    ) -> Result<MessageEnvelope> {
        let envelope = MessageEnvelope::broadcast(channel.topic(), event, payload);
        self.doc_dispatch(channel, envelope, site, options).await
    }

    /// Document a broadcast that skips the sender, then send it on `channel`
    ///
    /// # Errors
    ///
    /// Returns error if recording fails (nothing is sent) or dispatch fails
    pub async fn doc_broadcast_from<C: Channel>(
        &self,
        channel: &mut C,
        event: &str,
        payload: Value,
        site: &CallSite,
        options: DocOptions,
    ) -> Result<MessageEnvelope> {
        let envelope = MessageEnvelope::broadcast_from(channel.topic(), event, payload);
        self.doc_dispatch(channel, envelope, site, options).await
    }

    async fn doc_dispatch<C: Channel>(
        &self,
        channel: &mut C,
        envelope: MessageEnvelope,
        site: &CallSite,
        options: DocOptions,
    ) -> Result<MessageEnvelope> {
        let envelope = self.doc_message(envelope, site, options)?;
        channel.dispatch(&envelope).await?;
        Ok(envelope)
    }

    fn record(&self, interaction: Interaction, site: &CallSite, options: DocOptions) -> Result<()> {
        let resolved = self.resolve(site, options);

        let resolved = if self.config.strict_descriptions {
            resolved.require_description()?
        } else {
            if !resolved.description.is_determined() {
                warn!(
                    "Recording {}:{} without a description ({})",
                    resolved.file, resolved.line, site.function
                );
            }
            resolved
        };

        self.recorder.record(interaction, resolved)
    }
}

impl<R> Clone for Docket<R> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            recorder: Arc::clone(&self.recorder),
            enabled: self.enabled,
        }
    }
}

/// Document an HTTP exchange from the current call site
///
/// `doc!(docket, exchange)` or `doc!(docket, exchange, options)`.
#[macro_export]
macro_rules! doc {
    ($docket:expr, $exchange:expr) => {
        $crate::doc!($docket, $exchange, $crate::DocOptions::default())
    };
    ($docket:expr, $exchange:expr, $options:expr) => {
        $docket.doc($exchange, &$crate::call_site!(), $options)
    };
}

/// Document a channel message from the current call site
#[macro_export]
macro_rules! doc_message {
    ($docket:expr, $envelope:expr) => {
        $crate::doc_message!($docket, $envelope, $crate::DocOptions::default())
    };
    ($docket:expr, $envelope:expr, $options:expr) => {
        $docket.doc_message($envelope, &$crate::call_site!(), $options)
    };
}

/// Document and send a push from the current call site; `.await` the result
#[macro_export]
macro_rules! doc_push {
    ($docket:expr, $channel:expr, $event:expr, $payload:expr) => {
        $crate::doc_push!($docket, $channel, $event, $payload, $crate::DocOptions::default())
    };
    ($docket:expr, $channel:expr, $event:expr, $payload:expr, $options:expr) => {
        $docket.doc_push(&mut $channel, $event, $payload, &$crate::call_site!(), $options)
    };
}

/// Document and send a broadcast from the current call site; `.await` the result
#[macro_export]
macro_rules! doc_broadcast {
    ($docket:expr, $channel:expr, $event:expr, $payload:expr) => {
        $crate::doc_broadcast!($docket, $channel, $event, $payload, $crate::DocOptions::default())
    };
    ($docket:expr, $channel:expr, $event:expr, $payload:expr, $options:expr) => {
        $docket.doc_broadcast(&mut $channel, $event, $payload, &$crate::call_site!(), $options)
    };
}

/// Document and send a sender-excluding broadcast; `.await` the result
#[macro_export]
macro_rules! doc_broadcast_from {
    ($docket:expr, $channel:expr, $event:expr, $payload:expr) => {
        $crate::doc_broadcast_from!(
            $docket,
            $channel,
            $event,
            $payload,
            $crate::DocOptions::default()
        )
    };
    ($docket:expr, $channel:expr, $event:expr, $payload:expr, $options:expr) => {
        $docket.doc_broadcast_from(&mut $channel, $event, $payload, &$crate::call_site!(), $options)
    };
}
