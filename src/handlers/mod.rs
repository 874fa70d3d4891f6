//! HTTP handlers. Reports leave the service as JSON; nothing here formats
//! numbers for humans.

use tokio_util::sync::CancellationToken;

use crate::services::{inventory::SqliteInventory, scan::ScanOptions, survey::SurveyOptions};

pub mod health_handlers;
pub mod scan_handlers;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub inventory: SqliteInventory,
    /// Defaults for scans; query parameters override per request.
    pub scan: ScanOptions,
    pub survey: SurveyOptions,
    /// Cancelled on shutdown; each request works on a child token.
    pub shutdown: CancellationToken,
}
