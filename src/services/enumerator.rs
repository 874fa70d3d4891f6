//! Cursor-driven enumeration of a whole container.
//!
//! Pages are requested strictly one after another: each request starts after
//! the last key of the previous page. The result is either the complete,
//! ordered, duplicate-free listing or an error; partial listings are never
//! returned.

use std::collections::BTreeMap;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    errors::{ScanError, ScanResult},
    models::object::ObjectRecord,
    services::{
        client::StorageClient,
        retry::{RetrySettings, with_retry},
    },
};

pub const DEFAULT_PAGE_SIZE: usize = 1000;
pub const MAX_PAGE_SIZE: usize = 10_000;

#[derive(Clone, Debug)]
pub struct ListingOptions {
    /// Records requested per page. Clamped to `1..=MAX_PAGE_SIZE`.
    pub page_size: usize,
    pub prefix: Option<String>,
    pub retry: RetrySettings,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            prefix: None,
            retry: RetrySettings::default(),
        }
    }
}

/// A complete listing of one container.
#[derive(Debug, Clone)]
pub struct Enumeration {
    pub container: String,
    /// Ordered by key, ascending, no duplicates.
    pub objects: Vec<ObjectRecord>,
    /// Listing requests that returned successfully.
    pub pages: usize,
    /// Records dropped as overlap: at or below the cursor, or repeated
    /// within a page.
    pub duplicates: usize,
}

/// List every object in `container`.
///
/// Stops on a short or empty page. A page whose last key does not move past
/// the current cursor is a [`ScanError::PaginationFault`]. Cancellation is
/// checked before every page; whatever was collected so far is dropped.
pub async fn enumerate(
    client: &dyn StorageClient,
    container: &str,
    options: &ListingOptions,
    cancel: &CancellationToken,
) -> ScanResult<Enumeration> {
    let limit = options.page_size.clamp(1, MAX_PAGE_SIZE);
    let prefix = options.prefix.as_deref();

    let mut collected: BTreeMap<String, ObjectRecord> = BTreeMap::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0;
    let mut duplicates = 0;

    loop {
        if cancel.is_cancelled() {
            debug!(
                "enumeration of {} cancelled after {} pages, discarding {} records",
                container,
                pages,
                collected.len()
            );
            return Err(ScanError::Cancelled {
                container: container.to_string(),
            });
        }

        let page = with_retry(&options.retry, container, cancel, || {
            client.list_objects(container, cursor.as_deref(), limit, prefix)
        })
        .await?;
        pages += 1;

        let returned = page.len();
        let Some(last_key) = page.last_key() else {
            debug!("{}: empty page {}, listing complete", container, pages);
            break;
        };
        if let Some(current) = cursor.as_deref() {
            if last_key <= current {
                warn!(
                    "{}: page {} ended at `{}`, which does not advance cursor `{}`",
                    container, pages, last_key, current
                );
                return Err(ScanError::PaginationFault {
                    container: container.to_string(),
                    cursor: current.to_string(),
                });
            }
        }
        let next_cursor = last_key.to_string();

        for obj in page.objects {
            let overlaps = cursor.as_deref().is_some_and(|c| obj.name.as_str() <= c);
            if overlaps || collected.insert(obj.name.clone(), obj).is_some() {
                duplicates += 1;
            }
        }
        debug!(
            "{}: page {} returned {} records, cursor -> `{}`",
            container, pages, returned, next_cursor
        );
        cursor = Some(next_cursor);

        if returned < limit {
            break;
        }
    }

    if duplicates > 0 {
        warn!("{}: backend repeated {} records", container, duplicates);
    }

    Ok(Enumeration {
        container: container.to_string(),
        objects: collected.into_values().collect(),
        pages,
        duplicates,
    })
}
