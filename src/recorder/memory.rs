//! In-process recorder grouping records by documentation group

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use tracing::{debug, info};

use crate::config::LimitsConfig;
use crate::interaction::Interaction;
use crate::options::ResolvedOptions;
use crate::{DocketError, Result};

use super::{Record, Recorder};

/// Collects records in memory, keyed by group title (or module)
pub struct MemoryRecorder {
    groups: DashMap<String, Vec<Record>>,
    next_seq: AtomicUsize,
    record_count: AtomicUsize,
    limits: LimitsConfig,
}

impl MemoryRecorder {
    /// Create a recorder with default limits
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(LimitsConfig::default())
    }

    /// Create a recorder with the given limits
    #[must_use]
    pub fn with_limits(limits: LimitsConfig) -> Self {
        Self {
            groups: DashMap::new(),
            next_seq: AtomicUsize::new(0),
            record_count: AtomicUsize::new(0),
            limits,
        }
    }

    /// Number of records held
    #[must_use]
    pub fn len(&self) -> usize {
        self.record_count.load(Ordering::Acquire)
    }

    /// Whether no records are held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Group keys, sorted
    #[must_use]
    pub fn groups(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.groups.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Records of one group in recording order
    #[must_use]
    pub fn group(&self, key: &str) -> Vec<Record> {
        self.groups
            .get(key)
            .map(|records| records.value().clone())
            .unwrap_or_default()
    }

    /// All records in recording order
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        let mut all: Vec<Record> = self
            .groups
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(|record| record.seq);
        all
    }

    /// Drop all records
    ///
    /// Records pushed while clearing are kept and stay counted.
    pub fn clear(&self) {
        let mut dropped = 0;
        self.groups.retain(|_, records| {
            dropped += records.len();
            false
        });
        self.record_count.fetch_sub(dropped, Ordering::AcqRel);
        info!("Cleared {dropped} doc records");
    }

    /// Check the body size, then claim one record slot
    fn reserve(&self, interaction: &Interaction) -> Result<()> {
        let size = interaction.largest_body();
        if size > self.limits.max_body_size {
            return Err(DocketError::DataTooLarge {
                size,
                limit: self.limits.max_body_size,
            });
        }

        let max_records = self.limits.max_records;
        self.record_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count < max_records).then_some(count + 1)
            })
            .map(|_| ())
            .map_err(|_| DocketError::RecorderFull { limit: max_records })
    }
}

impl Default for MemoryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder for MemoryRecorder {
    fn record(&self, interaction: Interaction, options: ResolvedOptions) -> Result<()> {
        self.reserve(&interaction)?;

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let record = Record::new(seq, interaction, options);
        let key = record.options.group_key().to_string();

        debug!(
            "Recorded interaction: {} (group: {}, seq: {})",
            record.short_id(),
            key,
            seq
        );

        self.groups.entry(key).or_default().push(record);

        Ok(())
    }
}
