//! Account-wide overview of every container.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    container::AccountStats,
    object::ObjectRecord,
    report::{Comparison, DataIntegrityAnomaly},
};

/// One container as seen from the account listing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ContainerSurvey {
    pub name: String,
    pub object_count: i64,
    pub bytes_used: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub versions_location: Option<String>,

    /// Full listing for small containers, a short preview otherwise.
    pub samples: Vec<ObjectRecord>,

    /// Reported objects not included in `samples`.
    pub objects_not_shown: u64,

    /// Stat or listing failure for this container, if any.
    pub error: Option<String>,
}

/// Account stats compared against the sum of its containers.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AccountSurvey {
    pub account: AccountStats,
    pub containers: Vec<ContainerSurvey>,

    /// Sum of `bytes_used` over the container listing.
    pub summed_container_bytes: i64,

    /// `account.bytes_used - summed_container_bytes`.
    pub account_vs_containers: Comparison,

    pub tolerance: u64,

    /// Containers that look like they hold old object versions.
    pub version_containers: Vec<String>,

    pub anomalies: Vec<DataIntegrityAnomaly>,
}
