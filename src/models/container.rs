//! Reported usage at the account and container tiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Container-level usage as reported by the backend's stat call.
///
/// Counts are signed because they are copied verbatim from the backend; a
/// negative value is an anomaly to report, not something to clamp.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq, Eq)]
pub struct ContainerStats {
    /// Container name.
    pub name: String,

    /// Reported number of objects.
    pub object_count: i64,

    /// Reported bytes used.
    pub bytes_used: i64,

    /// When the container was last modified.
    pub last_modified: Option<DateTime<Utc>>,

    /// Container receiving old object versions, when versioning is enabled.
    pub versions_location: Option<String>,
}

/// Account-level usage as reported by the backend's stat call.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq, Eq, Default)]
pub struct AccountStats {
    pub container_count: i64,
    pub object_count: i64,
    pub bytes_used: i64,
}

/// One row of the account's container listing.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq, Eq)]
pub struct ContainerSummary {
    pub name: String,
    pub object_count: i64,
    pub bytes_used: i64,
}
