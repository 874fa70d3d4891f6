//! Defines routes for the reconciliation API.
//!
//! ## Structure
//! - `GET /healthz`, `GET /readyz`: liveness and readiness
//! - `GET /account`: account survey across all containers
//! - `GET /containers/{container}/scan`: full scan + reconciliation report
//!   (supports tolerance, prefix, page_size, probe)
//! - `GET /containers/{container}/probe`: hidden-object prefix probes
//! - `GET /scan?containers=a,b`: concurrent scans, one result per container

use crate::handlers::{
    AppState,
    health_handlers::{healthz, readyz},
    scan_handlers::{get_account, probe_container, scan_many, scan_one},
};
use axum::{Router, routing::get};

/// Build and return the router for all reconciliation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/account", get(get_account))
        .route("/scan", get(scan_many))
        .route("/containers/{container}/scan", get(scan_one))
        .route("/containers/{container}/probe", get(probe_container))
}
