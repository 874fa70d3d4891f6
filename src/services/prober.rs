//! Hidden-object probes: bounded listings under a handful of prefixes.
//!
//! Probes are diagnostic. Their counts never feed the reconciliation numbers,
//! and a failing prefix is recorded without affecting the others.

use std::collections::BTreeMap;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::{
    errors::ProbeFailure,
    models::{
        object::ObjectRecord,
        probe::{PrefixProbe, ProbeStatus},
    },
    services::client::{Connector, StorageClient},
};

/// Prefixes tried when the caller gives none: everything, date-like,
/// dot- and underscore-prefixed, and common backup tool conventions.
pub const DEFAULT_PROBE_PREFIXES: [&str; 7] = ["", "20", ".", "_", "backup", "old", "tmp"];
pub const DEFAULT_PROBE_LIMIT: usize = 100;
pub const PROBE_SAMPLE_SIZE: usize = 3;

pub fn default_prefixes() -> Vec<String> {
    DEFAULT_PROBE_PREFIXES.iter().map(|p| p.to_string()).collect()
}

/// One capped listing of `container` under `prefix`.
pub async fn probe_prefix(
    client: &dyn StorageClient,
    container: &str,
    prefix: &str,
    limit: usize,
) -> Result<PrefixProbe, ProbeFailure> {
    let limit = limit.max(1);
    let filter = (!prefix.is_empty()).then_some(prefix);
    let page = client
        .list_objects(container, None, limit, filter)
        .await
        .map_err(|source| ProbeFailure {
            prefix: prefix.to_string(),
            source,
        })?;

    Ok(PrefixProbe {
        object_count: page.len() as u64,
        truncated: page.len() >= limit,
        samples: page
            .objects
            .iter()
            .take(PROBE_SAMPLE_SIZE)
            .map(|obj| obj.name.clone())
            .collect(),
        unseen_samples: Vec::new(),
    })
}

/// Probe every prefix concurrently, each on its own session.
pub async fn probe(
    connector: &dyn Connector,
    container: &str,
    prefixes: &[String],
    limit: usize,
) -> BTreeMap<String, ProbeStatus> {
    let probes = prefixes.iter().map(|prefix| async move {
        let outcome = match connector.connect().await {
            Ok(session) => probe_prefix(&*session, container, prefix, limit).await,
            Err(source) => Err(ProbeFailure {
                prefix: prefix.clone(),
                source,
            }),
        };
        let status = match outcome {
            Ok(found) => {
                debug!(
                    "{}: prefix `{}` -> {} objects",
                    container, prefix, found.object_count
                );
                ProbeStatus::Found(found)
            }
            Err(failure) => {
                warn!("{}: {}", container, failure);
                ProbeStatus::Failed {
                    error: failure.to_string(),
                }
            }
        };
        (prefix.clone(), status)
    });

    join_all(probes).await.into_iter().collect()
}

/// Fill in `unseen_samples` using the authoritative listing.
///
/// `listing` must be sorted by key, as returned by the enumerator.
pub fn mark_unseen(probes: &mut BTreeMap<String, ProbeStatus>, listing: &[ObjectRecord]) {
    for status in probes.values_mut() {
        if let ProbeStatus::Found(found) = status {
            found.unseen_samples = found
                .samples
                .iter()
                .filter(|key| {
                    listing
                        .binary_search_by(|obj| obj.name.as_str().cmp(key.as_str()))
                        .is_err()
                })
                .cloned()
                .collect();
        }
    }
}
