//! Results of the hidden-object prefix probes.

use serde::{Deserialize, Serialize};

/// What a single bounded listing under one prefix returned.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PrefixProbe {
    /// Objects returned by the capped listing.
    pub object_count: u64,

    /// Whether the listing filled its cap, meaning more objects may exist.
    pub truncated: bool,

    /// First few keys, in listing order.
    pub samples: Vec<String>,

    /// Sample keys missing from the authoritative enumeration. Only filled in
    /// when the probe ran alongside a full scan.
    pub unseen_samples: Vec<String>,
}

/// Outcome of one prefix probe. Failures are kept per prefix.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeStatus {
    Found(PrefixProbe),
    Failed { error: String },
}

impl ProbeStatus {
    /// Object count when the probe succeeded.
    pub fn object_count(&self) -> Option<u64> {
        match self {
            ProbeStatus::Found(probe) => Some(probe.object_count),
            ProbeStatus::Failed { .. } => None,
        }
    }
}
