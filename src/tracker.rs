//! Change detection over the last accepted record
//!
//! The process remembers exactly one fingerprint. Each accepted record is
//! classified against it and then replaces it; there is no history and no
//! durability across restarts.

use crate::record::Record;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

/// Outcome of comparing a record against the previously stored fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classification {
    New,
    Same,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::New => "New",
            Classification::Same => "Same",
        }
    }
}

/// How the last accepted record is remembered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerStrategy {
    /// Store the record itself and compare structural equality
    #[default]
    Raw,
    /// Store a SHA-256 digest with fixed field ordering and compare digests
    Digest,
}

/// Stored representation of the last accepted record
#[derive(Debug, Clone, PartialEq, Eq)]
enum Fingerprint {
    Raw(Record),
    Digest([u8; 32]),
}

/// Tracker errors
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("tracker state lock poisoned")]
    StatePoisoned,
}

/// Lock-guarded fingerprint of the last accepted record.
///
/// `classify` performs its read-compare-write inside a single critical
/// section, so concurrent identical records can never both observe `New`.
pub struct ChangeTracker {
    strategy: TrackerStrategy,
    last_seen: Mutex<Option<Fingerprint>>,
}

impl ChangeTracker {
    /// Create a tracker with empty state.
    pub fn new(strategy: TrackerStrategy) -> Self {
        Self {
            strategy,
            last_seen: Mutex::new(None),
        }
    }

    pub fn strategy(&self) -> TrackerStrategy {
        self.strategy
    }

    /// Classify a validated record and update the stored fingerprint.
    ///
    /// The first record ever seen is `New`. A record whose fingerprint
    /// matches the stored one is `Same`; anything else is `New` and
    /// replaces the stored fingerprint.
    pub fn classify(&self, record: &Record) -> Result<Classification, TrackerError> {
        let incoming = self.fingerprint(record);

        let mut last_seen = self
            .last_seen
            .lock()
            .map_err(|_| TrackerError::StatePoisoned)?;

        let classification = match last_seen.as_ref() {
            Some(previous) if *previous == incoming => Classification::Same,
            _ => {
                *last_seen = Some(incoming);
                Classification::New
            }
        };

        debug!(
            identifier = %record.identifier,
            result = classification.as_str(),
            "record classified"
        );

        Ok(classification)
    }

    /// Whether any record has been accepted since process start.
    pub fn remembers_record(&self) -> Result<bool, TrackerError> {
        self.last_seen
            .lock()
            .map(|state| state.is_some())
            .map_err(|_| TrackerError::StatePoisoned)
    }

    fn fingerprint(&self, record: &Record) -> Fingerprint {
        match self.strategy {
            TrackerStrategy::Raw => Fingerprint::Raw(record.clone()),
            TrackerStrategy::Digest => Fingerprint::Digest(digest_record(record)),
        }
    }
}

/// SHA-256 over the record fields in fixed order.
///
/// The identifier bytes and the number bytes are separated by a NUL so that
/// field boundaries cannot shift.
fn digest_record(record: &Record) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(record.identifier.as_bytes());
    hasher.update([0u8]);
    hasher.update(record.random_number.to_be_bytes());
    hasher.finalize().into()
}
