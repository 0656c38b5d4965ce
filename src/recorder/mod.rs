//! Recorders receiving documented interactions

mod memory;

pub use memory::MemoryRecorder;

use serde::{Deserialize, Serialize};

use crate::fingerprint;
use crate::interaction::Interaction;
use crate::options::ResolvedOptions;
use crate::Result;

/// Sink for interactions and their resolved options
pub trait Recorder: Send + Sync {
    /// Store one documented interaction
    ///
    /// # Errors
    ///
    /// Returns error if the recorder cannot accept the interaction
    fn record(&self, interaction: Interaction, options: ResolvedOptions) -> Result<()>;
}

impl<R: Recorder + ?Sized> Recorder for std::sync::Arc<R> {
    fn record(&self, interaction: Interaction, options: ResolvedOptions) -> Result<()> {
        (**self).record(interaction, options)
    }
}

/// Recorder that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecorder;

impl Recorder for NullRecorder {
    fn record(&self, _interaction: Interaction, _options: ResolvedOptions) -> Result<()> {
        Ok(())
    }
}

/// A stored interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Position in recording order
    pub seq: usize,
    /// Fingerprint of interaction and call site
    pub id: [u8; 32],
    /// The interaction
    pub interaction: Interaction,
    /// Its resolved options
    pub options: ResolvedOptions,
}

impl Record {
    /// Build a record, fingerprinting the interaction
    #[must_use]
    pub fn new(seq: usize, interaction: Interaction, options: ResolvedOptions) -> Self {
        let id = fingerprint::fingerprint(&interaction, &options);
        Self {
            seq,
            id,
            interaction,
            options,
        }
    }

    /// Short hex id
    #[must_use]
    pub fn short_id(&self) -> String {
        fingerprint::short_id(&self.id)
    }
}
