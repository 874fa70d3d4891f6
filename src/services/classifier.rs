//! Groups objects into backup sets by their `YYYYMMDD_HHMMSS/` prefix.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::{
    models::{backup_set::BackupSet, object::ObjectRecord},
    services::aggregator::aggregate_by,
};

const BACKUP_SET_KEY_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Backup sets plus everything that did not match the naming convention.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub backup_sets: BTreeMap<String, BackupSet>,
    /// In input order.
    pub unclassified: Vec<ObjectRecord>,
}

/// True iff `segment` is exactly 8 ASCII digits, `_`, 6 ASCII digits.
pub fn is_backup_set_key(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 15
        && bytes[..8].iter().all(u8::is_ascii_digit)
        && bytes[8] == b'_'
        && bytes[9..].iter().all(u8::is_ascii_digit)
}

/// The backup-set key of an object path: its first segment, when that
/// segment matches the convention. Paths without `/` never have one.
pub fn backup_set_key(path: &str) -> Option<&str> {
    let (first, _) = path.split_once('/')?;
    is_backup_set_key(first).then_some(first)
}

pub fn classify(objects: &[ObjectRecord]) -> Classification {
    let mut groups = aggregate_by(objects, |obj| backup_set_key(&obj.name).map(str::to_owned));
    let unclassified = groups
        .remove(&None)
        .map(|group| group.members)
        .unwrap_or_default();

    let backup_sets = groups
        .into_iter()
        .filter_map(|(key, group)| key.map(|key| (key, group)))
        .map(|(key, group)| {
            let set = BackupSet {
                started_at: NaiveDateTime::parse_from_str(&key, BACKUP_SET_KEY_FORMAT).ok(),
                key: key.clone(),
                members: group.members,
                total_bytes: group.totals.total_bytes,
                object_count: group.totals.object_count,
            };
            (key, set)
        })
        .collect();

    Classification {
        backup_sets,
        unclassified,
    }
}
