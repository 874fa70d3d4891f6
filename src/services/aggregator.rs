//! Count and size totals over an enumerated object set.
//!
//! Integer accumulation only; conversion to MB/GB is left to whoever
//! displays the numbers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::object::ObjectRecord;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub object_count: u64,
    pub total_bytes: u64,
}

impl Totals {
    fn add(&mut self, obj: &ObjectRecord) {
        self.object_count = self.object_count.saturating_add(1);
        self.total_bytes = self.total_bytes.saturating_add(obj.bytes);
    }
}

/// Objects sharing one group key, with their totals.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Group {
    pub totals: Totals,
    /// Members in input order.
    pub members: Vec<ObjectRecord>,
}

pub fn aggregate<'a>(objects: impl IntoIterator<Item = &'a ObjectRecord>) -> Totals {
    let mut totals = Totals::default();
    for obj in objects {
        totals.add(obj);
    }
    totals
}

/// Group `objects` by `key_fn`, keeping input order inside each group.
pub fn aggregate_by<K, F>(objects: &[ObjectRecord], key_fn: F) -> BTreeMap<K, Group>
where
    K: Ord,
    F: Fn(&ObjectRecord) -> K,
{
    let mut groups: BTreeMap<K, Group> = BTreeMap::new();
    for obj in objects {
        let group = groups.entry(key_fn(obj)).or_default();
        group.totals.add(obj);
        group.members.push(obj.clone());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objects() -> Vec<ObjectRecord> {
        vec![
            ObjectRecord::new("a/1", 100_000),
            ObjectRecord::new("b/1", 150_000),
            ObjectRecord::new("a/2", 249_500),
        ]
    }

    #[test]
    fn test_aggregate_sums_count_and_bytes() {
        let totals = aggregate(&objects());
        assert_eq!(totals.object_count, 3);
        assert_eq!(totals.total_bytes, 499_500);
    }

    #[test]
    fn test_aggregate_empty() {
        assert_eq!(aggregate(&[]), Totals::default());
    }

    #[test]
    fn test_aggregate_saturates_instead_of_wrapping() {
        let huge = vec![
            ObjectRecord::new("x", u64::MAX),
            ObjectRecord::new("y", u64::MAX),
        ];
        assert_eq!(aggregate(&huge).total_bytes, u64::MAX);
    }

    #[test]
    fn test_aggregate_by_first_segment() {
        let groups = aggregate_by(&objects(), |o| {
            o.name.split('/').next().unwrap_or_default().to_string()
        });
        assert_eq!(groups.len(), 2);
        let a = &groups["a"];
        assert_eq!(a.totals.object_count, 2);
        assert_eq!(a.totals.total_bytes, 349_500);
        assert_eq!(a.members[0].name, "a/1");
        assert_eq!(a.members[1].name, "a/2");
        assert_eq!(groups["b"].totals.total_bytes, 150_000);
    }
}
