//! Account-wide survey: every container, its reported usage and a sample
//! listing, plus the account total against the sum of its containers.

use std::collections::BTreeSet;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    errors::{ScanError, ScanResult},
    models::{
        container::ContainerSummary,
        report::Comparison,
        survey::{AccountSurvey, ContainerSurvey},
    },
    services::{
        client::StorageClient,
        reconciler::{DEFAULT_TOLERANCE_BYTES, account_anomalies, container_value_anomalies},
        retry::{RetrySettings, with_retry},
    },
};

/// Scope name used in errors raised outside any single container.
pub const ACCOUNT_SCOPE: &str = "(account)";

/// Containers reporting at most this many objects get a full listing.
pub const DEFAULT_DETAIL_OBJECT_LIMIT: usize = 20;
/// Objects listed for containers above the detail limit.
pub const DEFAULT_PREVIEW_SAMPLE_SIZE: usize = 5;

#[derive(Clone, Debug)]
pub struct SurveyOptions {
    pub tolerance: u64,
    pub detail_object_limit: usize,
    pub preview_sample_size: usize,
    pub retry: RetrySettings,
}

impl Default for SurveyOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE_BYTES,
            detail_object_limit: DEFAULT_DETAIL_OBJECT_LIMIT,
            preview_sample_size: DEFAULT_PREVIEW_SAMPLE_SIZE,
            retry: RetrySettings::default(),
        }
    }
}

/// Survey every container of the account on one session.
///
/// Failing to stat the account or list its containers aborts the survey. A
/// failure on an individual container is recorded on its entry instead.
pub async fn survey_account(
    session: &dyn StorageClient,
    options: &SurveyOptions,
    cancel: &CancellationToken,
) -> ScanResult<AccountSurvey> {
    let account =
        with_retry(&options.retry, ACCOUNT_SCOPE, cancel, || session.head_account()).await?;
    let listed =
        with_retry(&options.retry, ACCOUNT_SCOPE, cancel, || session.list_containers()).await?;
    info!(
        "account reports {} containers / {} bytes, listing returned {} containers",
        account.container_count,
        account.bytes_used,
        listed.len()
    );

    let mut anomalies = account_anomalies(&account);
    let mut containers = Vec::with_capacity(listed.len());
    for summary in &listed {
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled {
                container: ACCOUNT_SCOPE.to_string(),
            });
        }
        anomalies.extend(container_value_anomalies(
            &summary.name,
            summary.object_count,
            summary.bytes_used,
        ));
        containers.push(survey_container(session, summary, options, cancel).await);
    }

    let summed_container_bytes = listed
        .iter()
        .fold(0i64, |sum, c| sum.saturating_add(c.bytes_used));
    let account_vs_containers = Comparison::new(
        account.bytes_used.saturating_sub(summed_container_bytes),
        options.tolerance,
    );
    if !account_vs_containers.within_tolerance {
        warn!(
            "account reports {} bytes more than its containers",
            account_vs_containers.difference
        );
    }

    Ok(AccountSurvey {
        account,
        version_containers: version_containers(&containers),
        containers,
        summed_container_bytes,
        account_vs_containers,
        tolerance: options.tolerance,
        anomalies,
    })
}

async fn survey_container(
    session: &dyn StorageClient,
    summary: &ContainerSummary,
    options: &SurveyOptions,
    cancel: &CancellationToken,
) -> ContainerSurvey {
    let mut entry = ContainerSurvey {
        name: summary.name.clone(),
        object_count: summary.object_count,
        bytes_used: summary.bytes_used,
        last_modified: None,
        versions_location: None,
        samples: Vec::new(),
        objects_not_shown: 0,
        error: None,
    };

    match with_retry(&options.retry, &summary.name, cancel, || {
        session.head_container(&summary.name)
    })
    .await
    {
        Ok(stats) => {
            entry.last_modified = stats.last_modified;
            entry.versions_location = stats.versions_location;
        }
        Err(err) => {
            warn!("{}", err);
            entry.error = Some(err.to_string());
            return entry;
        }
    }

    let reported = u64::try_from(summary.object_count).unwrap_or(0);
    if reported == 0 {
        return entry;
    }
    let limit = if reported <= options.detail_object_limit as u64 {
        options.detail_object_limit
    } else {
        options.preview_sample_size
    };

    match with_retry(&options.retry, &summary.name, cancel, || {
        session.list_objects(&summary.name, None, limit.max(1), None)
    })
    .await
    {
        Ok(page) => {
            debug!("{}: sampled {} objects", summary.name, page.len());
            entry.objects_not_shown = reported.saturating_sub(page.len() as u64);
            entry.samples = page.objects;
        }
        Err(err) => {
            warn!("{}", err);
            entry.error = Some(err.to_string());
        }
    }
    entry
}

/// Names that look like version stores, plus every container another one
/// points at as its versions location.
pub fn version_containers(containers: &[ContainerSurvey]) -> Vec<String> {
    let mut names = BTreeSet::new();
    for container in containers {
        let lower = container.name.to_lowercase();
        if lower.contains("version") || container.name.ends_with("_versions") {
            names.insert(container.name.clone());
        }
        if let Some(location) = &container.versions_location {
            names.insert(location.clone());
        }
    }
    names.into_iter().collect()
}
