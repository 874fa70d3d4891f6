//! Handlers for account surveys, container scans and prefix probes.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    errors::AppError,
    handlers::AppState,
    models::{probe::ProbeStatus, scan::ContainerScan, survey::AccountSurvey},
    services::{
        prober::{default_prefixes, probe},
        scan::{ScanOptions, scan_container, scan_containers},
        survey::survey_account,
    },
};

#[derive(Debug, Default, Deserialize)]
pub struct ScanQuery {
    pub tolerance: Option<u64>,
    pub prefix: Option<String>,
    pub page_size: Option<usize>,
    /// Run the default hidden-object probes too.
    #[serde(default)]
    pub probe: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProbeQuery {
    /// Comma-separated prefixes; the default exploration list when absent.
    /// An empty entry (e.g. a leading comma) probes the whole container.
    pub prefixes: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct MultiScanQuery {
    /// Comma-separated container names.
    pub containers: String,
    pub tolerance: Option<u64>,
}

/// Per-container entry of a multi-container scan.
#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanEntry {
    Completed { scan: Box<ContainerScan> },
    Failed { error: String, status: u16 },
}

impl ScanQuery {
    fn apply(self, defaults: &ScanOptions) -> ScanOptions {
        let mut options = defaults.clone();
        if let Some(tolerance) = self.tolerance {
            options.tolerance = tolerance;
        }
        if let Some(page_size) = self.page_size {
            options.page_size = page_size;
        }
        options.prefix = self.prefix.filter(|p| !p.is_empty());
        if self.probe {
            options.probe_prefixes = Some(default_prefixes());
        }
        options
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

/// `GET /account`
pub async fn get_account(State(state): State<AppState>) -> Result<Json<AccountSurvey>, AppError> {
    let cancel = state.shutdown.child_token();
    let survey = survey_account(&state.inventory, &state.survey, &cancel).await?;
    Ok(Json(survey))
}

/// `GET /containers/{container}/scan`
pub async fn scan_one(
    State(state): State<AppState>,
    Path(container): Path<String>,
    Query(query): Query<ScanQuery>,
) -> Result<Json<ContainerScan>, AppError> {
    let options = query.apply(&state.scan);
    let cancel = state.shutdown.child_token();
    let scan = scan_container(
        &state.inventory,
        &state.inventory,
        &container,
        &options,
        &cancel,
    )
    .await?;
    Ok(Json(scan))
}

/// `GET /containers/{container}/probe`
pub async fn probe_container(
    State(state): State<AppState>,
    Path(container): Path<String>,
    Query(query): Query<ProbeQuery>,
) -> Json<BTreeMap<String, ProbeStatus>> {
    let prefixes = query
        .prefixes
        .as_deref()
        .map(split_list)
        .unwrap_or_else(default_prefixes);
    let limit = query.limit.unwrap_or(state.scan.probe_limit);
    Json(probe(&state.inventory, &container, &prefixes, limit).await)
}

/// `GET /scan?containers=a,b`
///
/// Always 200; failures are reported per container.
pub async fn scan_many(
    State(state): State<AppState>,
    Query(query): Query<MultiScanQuery>,
) -> Result<Json<BTreeMap<String, ScanEntry>>, AppError> {
    let containers: Vec<String> = split_list(&query.containers)
        .into_iter()
        .filter(|c| !c.is_empty())
        .collect();
    if containers.is_empty() {
        return Err(AppError::bad_request("no containers given"));
    }

    let mut options = state.scan.clone();
    if let Some(tolerance) = query.tolerance {
        options.tolerance = tolerance;
    }
    let cancel = state.shutdown.child_token();
    let results = scan_containers(&state.inventory, &containers, &options, &cancel).await;

    let body = results
        .into_iter()
        .map(|(name, result)| {
            let entry = match result {
                Ok(scan) => ScanEntry::Completed {
                    scan: Box::new(scan),
                },
                Err(err) => ScanEntry::Failed {
                    status: AppError::status_for(&err).as_u16(),
                    error: err.to_string(),
                },
            };
            (name, entry)
        })
        .collect();
    Ok(Json(body))
}
