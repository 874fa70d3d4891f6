//! Full container scans: stats, enumeration, classification, reconciliation.

use std::collections::BTreeMap;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    errors::ScanResult,
    models::scan::ContainerScan,
    services::{
        aggregator::aggregate,
        classifier::classify,
        client::{Connector, StorageClient},
        enumerator::{DEFAULT_PAGE_SIZE, ListingOptions, enumerate},
        prober::{DEFAULT_PROBE_LIMIT, mark_unseen, probe},
        reconciler::{DEFAULT_TOLERANCE_BYTES, reconcile},
        retry::{RetrySettings, with_retry},
    },
};

/// Knobs for one scan. Defaults follow the usual Swift listing limits.
#[derive(Clone, Debug)]
pub struct ScanOptions {
    pub page_size: usize,
    /// Restrict enumeration to keys with this prefix. The container totals
    /// are not prefix-aware, so expect a difference when this is set.
    pub prefix: Option<String>,
    pub tolerance: u64,
    pub retry: RetrySettings,
    /// Prefixes to probe for hidden objects; `None` skips probing.
    pub probe_prefixes: Option<Vec<String>>,
    pub probe_limit: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            prefix: None,
            tolerance: DEFAULT_TOLERANCE_BYTES,
            retry: RetrySettings::default(),
            probe_prefixes: None,
            probe_limit: DEFAULT_PROBE_LIMIT,
        }
    }
}

impl ScanOptions {
    fn listing(&self) -> ListingOptions {
        ListingOptions {
            page_size: self.page_size,
            prefix: self.prefix.clone(),
            retry: self.retry.clone(),
        }
    }
}

/// Scan one container on `session`.
///
/// Probes, when requested, run on separate sessions from `connector`.
pub async fn scan_container(
    session: &dyn StorageClient,
    connector: &dyn Connector,
    container: &str,
    options: &ScanOptions,
    cancel: &CancellationToken,
) -> ScanResult<ContainerScan> {
    let scan_id = Uuid::new_v4();
    info!("scan {}: starting container {}", scan_id, container);

    let account = with_retry(&options.retry, container, cancel, || session.head_account()).await?;
    let stats = with_retry(&options.retry, container, cancel, || {
        session.head_container(container)
    })
    .await?;

    let listing = enumerate(session, container, &options.listing(), cancel).await?;
    let totals = aggregate(&listing.objects);
    let classification = classify(&listing.objects);
    let report = reconcile(
        &account,
        &stats,
        totals.object_count,
        totals.total_bytes,
        options.tolerance,
    );

    let probes = match &options.probe_prefixes {
        Some(prefixes) => {
            let mut results = probe(connector, container, prefixes, options.probe_limit).await;
            mark_unseen(&mut results, &listing.objects);
            Some(results)
        }
        None => None,
    };

    for anomaly in &report.anomalies {
        warn!("scan {}: {}", scan_id, anomaly.message);
    }
    info!(
        "scan {}: {} objects / {} bytes in {} pages, container reports {} bytes (diff {}, within tolerance: {})",
        scan_id,
        totals.object_count,
        totals.total_bytes,
        listing.pages,
        stats.bytes_used,
        report.container_vs_enumerated.difference,
        report.container_vs_enumerated.within_tolerance
    );

    Ok(ContainerScan {
        scan_id,
        report,
        backup_sets: classification.backup_sets,
        unclassified: classification.unclassified,
        probes,
    })
}

/// Scan several containers concurrently, one session each.
///
/// A failure is kept in that container's entry; the others still complete.
pub async fn scan_containers(
    connector: &dyn Connector,
    containers: &[String],
    options: &ScanOptions,
    cancel: &CancellationToken,
) -> BTreeMap<String, ScanResult<ContainerScan>> {
    let scans = containers.iter().map(|container| async move {
        let result = scan_on_new_session(connector, container, options, cancel).await;
        if let Err(err) = &result {
            warn!("{}", err);
        }
        (container.clone(), result)
    });

    join_all(scans).await.into_iter().collect()
}

async fn scan_on_new_session(
    connector: &dyn Connector,
    container: &str,
    options: &ScanOptions,
    cancel: &CancellationToken,
) -> ScanResult<ContainerScan> {
    let session = with_retry(&options.retry, container, cancel, || connector.connect()).await?;
    scan_container(&*session, connector, container, options, cancel).await
}
