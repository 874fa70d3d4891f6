//! The structured result of reconciling one container.

use serde::{Deserialize, Serialize};

/// Candidate explanation attached to a comparison that exceeded tolerance.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CauseTag {
    /// Old object versions or provider snapshots still occupy space.
    VersionRetention,
    /// Deleted objects not yet reclaimed.
    SoftDeletion,
    MetadataOverhead,
    /// Block allocation rounding on the storage nodes.
    AllocationOverhead,
    /// The listing returned fewer objects than the container holds.
    ListingUndercount,
    EventualConsistencyLag,
    /// Bytes belonging to sibling containers of the same account.
    OtherContainers,
    AccountMetadataOverhead,
}

/// Which reported value an anomaly was found in.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Account,
    Container,
}

/// A reported value that cannot be true (negative sizes or counts).
///
/// Anomalies never stop reconciliation; the raw value is still used so the
/// caller sees its effect on the differences.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DataIntegrityAnomaly {
    pub tier: Tier,
    pub field: String,
    pub value: i64,
    pub message: String,
}

/// A signed difference and its tolerance verdict.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Comparison {
    pub difference: i64,
    pub within_tolerance: bool,
}

impl Comparison {
    pub fn new(difference: i64, tolerance: u64) -> Self {
        Self {
            difference,
            within_tolerance: difference.unsigned_abs() <= tolerance,
        }
    }
}

/// Result of comparing the three usage tiers for one container.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DiscrepancyReport {
    pub container: String,

    /// Bytes reported by the account stat.
    pub account_bytes: i64,

    /// Bytes reported by the container stat.
    pub container_bytes: i64,

    /// Sum of sizes over the complete enumeration.
    pub enumerated_bytes: u64,

    pub container_object_count: i64,
    pub enumerated_object_count: u64,

    /// `container_object_count - enumerated_object_count`.
    pub object_count_difference: i64,

    /// `container_bytes - enumerated_bytes`.
    pub container_vs_enumerated: Comparison,

    /// `account_bytes - container_bytes`.
    pub account_vs_container: Comparison,

    pub tolerance: u64,

    pub causes: Vec<CauseTag>,

    pub anomalies: Vec<DataIntegrityAnomaly>,

    pub versions_location: Option<String>,
}

impl DiscrepancyReport {
    /// True when both byte comparisons are within tolerance.
    pub fn is_consistent(&self) -> bool {
        self.container_vs_enumerated.within_tolerance && self.account_vs_container.within_tolerance
    }
}
