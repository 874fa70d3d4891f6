//! Compares account, container and enumerated byte totals.
//!
//! Pure computation: every input is fetched beforehand by the caller.

use crate::models::{
    container::{AccountStats, ContainerStats},
    report::{CauseTag, Comparison, DataIntegrityAnomaly, DiscrepancyReport, Tier},
};

/// Differences up to this many bytes are treated as metadata rounding.
pub const DEFAULT_TOLERANCE_BYTES: u64 = 1000;

const CONTAINER_EXCESS_CAUSES: [CauseTag; 4] = [
    CauseTag::VersionRetention,
    CauseTag::SoftDeletion,
    CauseTag::MetadataOverhead,
    CauseTag::AllocationOverhead,
];

const CONTAINER_SHORTFALL_CAUSES: [CauseTag; 2] =
    [CauseTag::ListingUndercount, CauseTag::EventualConsistencyLag];

const ACCOUNT_EXCESS_CAUSES: [CauseTag; 2] =
    [CauseTag::OtherContainers, CauseTag::AccountMetadataOverhead];

pub fn reconcile(
    account: &AccountStats,
    container: &ContainerStats,
    enumerated_count: u64,
    enumerated_bytes: u64,
    tolerance: u64,
) -> DiscrepancyReport {
    let container_vs_enumerated = Comparison::new(
        signed_difference(container.bytes_used, enumerated_bytes),
        tolerance,
    );
    let account_vs_container = Comparison::new(
        account.bytes_used.saturating_sub(container.bytes_used),
        tolerance,
    );

    let mut causes = Vec::new();
    if !container_vs_enumerated.within_tolerance {
        if container_vs_enumerated.difference > 0 {
            causes.extend(CONTAINER_EXCESS_CAUSES);
        } else {
            causes.extend(CONTAINER_SHORTFALL_CAUSES);
        }
    }
    if !account_vs_container.within_tolerance {
        causes.extend(ACCOUNT_EXCESS_CAUSES);
    }

    let mut anomalies = account_anomalies(account);
    anomalies.extend(container_anomalies(container));

    DiscrepancyReport {
        container: container.name.clone(),
        account_bytes: account.bytes_used,
        container_bytes: container.bytes_used,
        enumerated_bytes,
        container_object_count: container.object_count,
        enumerated_object_count: enumerated_count,
        object_count_difference: signed_difference(container.object_count, enumerated_count),
        container_vs_enumerated,
        account_vs_container,
        tolerance,
        causes,
        anomalies,
        versions_location: container.versions_location.clone(),
    }
}

/// `reported - observed`, clamped to the `i64` range.
pub fn signed_difference(reported: i64, observed: u64) -> i64 {
    let difference = i128::from(reported) - i128::from(observed);
    difference.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

pub fn account_anomalies(account: &AccountStats) -> Vec<DataIntegrityAnomaly> {
    let mut anomalies: Vec<_> = [
        ("container_count", account.container_count),
        ("object_count", account.object_count),
        ("bytes_used", account.bytes_used),
    ]
    .into_iter()
    .filter(|(_, value)| *value < 0)
    .map(|(field, value)| DataIntegrityAnomaly {
        tier: Tier::Account,
        field: field.to_string(),
        value,
        message: format!("account reports negative {}: {}", field, value),
    })
    .collect();
    if account.object_count == 0 && account.bytes_used > 0 {
        anomalies.push(DataIntegrityAnomaly {
            tier: Tier::Account,
            field: "bytes_used".to_string(),
            value: account.bytes_used,
            message: format!(
                "account reports {} bytes but no objects",
                account.bytes_used
            ),
        });
    }
    anomalies
}

pub fn container_anomalies(container: &ContainerStats) -> Vec<DataIntegrityAnomaly> {
    container_value_anomalies(&container.name, container.object_count, container.bytes_used)
}

/// Impossible counts or sizes reported for the named container: negatives,
/// and bytes held by an empty container.
pub fn container_value_anomalies(
    name: &str,
    object_count: i64,
    bytes_used: i64,
) -> Vec<DataIntegrityAnomaly> {
    let mut anomalies: Vec<_> = [("object_count", object_count), ("bytes_used", bytes_used)]
        .into_iter()
        .filter(|(_, value)| *value < 0)
        .map(|(field, value)| DataIntegrityAnomaly {
            tier: Tier::Container,
            field: field.to_string(),
            value,
            message: format!("container `{}` reports negative {}: {}", name, field, value),
        })
        .collect();
    if object_count == 0 && bytes_used > 0 {
        anomalies.push(DataIntegrityAnomaly {
            tier: Tier::Container,
            field: "bytes_used".to_string(),
            value: bytes_used,
            message: format!(
                "container `{}` reports {} bytes but no objects",
                name, bytes_used
            ),
        });
    }
    anomalies
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(bytes_used: i64) -> AccountStats {
        AccountStats {
            container_count: 1,
            object_count: 3,
            bytes_used,
        }
    }

    fn container(bytes_used: i64) -> ContainerStats {
        ContainerStats {
            name: "backups".into(),
            object_count: 3,
            bytes_used,
            last_modified: None,
            versions_location: None,
        }
    }

    #[test]
    fn test_small_difference_is_within_tolerance() {
        let report = reconcile(&account(500_000), &container(500_000), 3, 499_500, 1000);
        assert_eq!(report.container_vs_enumerated.difference, 500);
        assert!(report.container_vs_enumerated.within_tolerance);
        assert!(report.account_vs_container.within_tolerance);
        assert!(report.causes.is_empty());
        assert!(report.is_consistent());
        assert_eq!(report.object_count_difference, 0);
    }

    #[test]
    fn test_container_excess_tags() {
        let report = reconcile(
            &account(10_000_000),
            &container(10_000_000),
            3,
            8_000_000,
            DEFAULT_TOLERANCE_BYTES,
        );
        assert_eq!(report.container_vs_enumerated.difference, 2_000_000);
        assert!(!report.container_vs_enumerated.within_tolerance);
        assert_eq!(
            report.causes,
            vec![
                CauseTag::VersionRetention,
                CauseTag::SoftDeletion,
                CauseTag::MetadataOverhead,
                CauseTag::AllocationOverhead,
            ]
        );
    }

    #[test]
    fn test_container_shortfall_tags() {
        let report = reconcile(&account(5_000), &container(5_000), 4, 9_000, 1000);
        assert_eq!(report.container_vs_enumerated.difference, -4_000);
        assert_eq!(
            report.causes,
            vec![CauseTag::ListingUndercount, CauseTag::EventualConsistencyLag]
        );
        assert_eq!(report.object_count_difference, -1);
    }

    #[test]
    fn test_account_excess_tags() {
        let report = reconcile(&account(9_000), &container(5_000), 3, 5_000, 1000);
        assert_eq!(report.account_vs_container.difference, 4_000);
        assert_eq!(
            report.causes,
            vec![CauseTag::OtherContainers, CauseTag::AccountMetadataOverhead]
        );
    }

    #[test]
    fn test_tolerance_boundary_is_symmetric() {
        let at = reconcile(&account(2_000), &container(2_000), 1, 1_000, 1000);
        assert!(at.container_vs_enumerated.within_tolerance);
        let beyond = reconcile(&account(2_001), &container(2_001), 1, 1_000, 1000);
        assert!(!beyond.container_vs_enumerated.within_tolerance);

        let below = reconcile(&account(1_000), &container(1_000), 1, 2_000, 1000);
        assert!(below.container_vs_enumerated.within_tolerance);
        let further = reconcile(&account(1_000), &container(1_000), 1, 2_001, 1000);
        assert!(!further.container_vs_enumerated.within_tolerance);
    }

    #[test]
    fn test_zero_tolerance_override() {
        let report = reconcile(&account(101), &container(101), 1, 100, 0);
        assert!(!report.container_vs_enumerated.within_tolerance);
        assert_eq!(report.tolerance, 0);
    }

    #[test]
    fn test_negative_reported_bytes_are_anomalies() {
        let report = reconcile(&account(-5), &container(-10), 0, 0, 1000);
        assert_eq!(report.anomalies.len(), 2);
        assert_eq!(report.anomalies[0].tier, Tier::Account);
        assert_eq!(report.anomalies[1].tier, Tier::Container);
        assert_eq!(report.anomalies[1].value, -10);
        assert_eq!(report.container_vs_enumerated.difference, -10);
        assert_eq!(report.account_vs_container.difference, 5);
    }

    #[test]
    fn test_bytes_without_objects_are_anomalies() {
        let acct = AccountStats {
            container_count: 1,
            object_count: 0,
            bytes_used: 4_096,
        };
        let cont = ContainerStats {
            object_count: 0,
            ..container(4_096)
        };
        let report = reconcile(&acct, &cont, 0, 0, 1000);
        assert_eq!(report.anomalies.len(), 2);
        assert_eq!(report.anomalies[0].tier, Tier::Account);
        assert_eq!(report.anomalies[1].tier, Tier::Container);
        assert_eq!(report.anomalies[1].field, "bytes_used");
        assert_eq!(report.anomalies[1].value, 4_096);
        assert_eq!(report.container_vs_enumerated.difference, 4_096);

        assert!(container_value_anomalies("empty", 0, 0).is_empty());
        assert!(container_value_anomalies("full", 3, 4_096).is_empty());
    }

    #[test]
    fn test_inputs_are_not_modified() {
        let acct = account(10);
        let cont = container(20);
        let _ = reconcile(&acct, &cont, 0, 0, 1);
        assert_eq!(acct, account(10));
        assert_eq!(cont, container(20));
    }

    #[test]
    fn test_signed_difference_clamps() {
        assert_eq!(signed_difference(i64::MIN, u64::MAX), i64::MIN);
        assert_eq!(signed_difference(0, 5), -5);
    }
}
