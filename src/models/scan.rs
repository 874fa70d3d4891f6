//! Everything produced by a full scan of one container.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    backup_set::BackupSet, object::ObjectRecord, probe::ProbeStatus, report::DiscrepancyReport,
};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ContainerScan {
    /// Identifier for correlating log lines of one run.
    pub scan_id: Uuid,

    pub report: DiscrepancyReport,

    pub backup_sets: BTreeMap<String, BackupSet>,

    /// Objects outside the backup-set naming convention.
    pub unclassified: Vec<ObjectRecord>,

    /// Present only when probing was requested.
    pub probes: Option<BTreeMap<String, ProbeStatus>>,
}
