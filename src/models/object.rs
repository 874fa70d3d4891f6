//! Represents one entry of a container listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single object as returned by a listing page.
///
/// This is a snapshot of listing metadata only. It is owned by the result set
/// of one scan and never written back to the backend.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ObjectRecord {
    /// Full path key, unique within the container (e.g. `20250726_140000/db.sql`).
    pub name: String,

    /// Size in bytes.
    pub bytes: u64,

    /// When the object was last modified, if the backend reported it.
    pub last_modified: Option<DateTime<Utc>>,

    /// Opaque content hash (usually an ETag).
    pub hash: Option<String>,
}

impl ObjectRecord {
    pub fn new(name: impl Into<String>, bytes: u64) -> Self {
        Self {
            name: name.into(),
            bytes,
            last_modified: None,
            hash: None,
        }
    }
}

/// One page of a listing request, in the order the backend returned it.
#[derive(Clone, Debug, Default)]
pub struct ObjectPage {
    pub objects: Vec<ObjectRecord>,
}

impl ObjectPage {
    pub fn new(objects: Vec<ObjectRecord>) -> Self {
        Self { objects }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Key of the last record on the page.
    pub fn last_key(&self) -> Option<&str> {
        self.objects.last().map(|obj| obj.name.as_str())
    }
}
