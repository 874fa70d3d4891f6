//! Logical backup sets derived from timestamped path prefixes.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::object::ObjectRecord;

/// Objects sharing one `YYYYMMDD_HHMMSS/` path prefix.
///
/// Built once per classification and never updated afterwards.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BackupSet {
    /// The timestamp segment, e.g. `20250726_140000`.
    pub key: String,

    /// Decoded start time. `None` when the digits do not form a real
    /// calendar date and time of day (the key still classifies).
    pub started_at: Option<NaiveDateTime>,

    /// Members in listing order.
    pub members: Vec<ObjectRecord>,

    /// Sum of member sizes.
    pub total_bytes: u64,

    /// Number of members.
    pub object_count: u64,
}
