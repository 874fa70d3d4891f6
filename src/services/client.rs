//! The storage client seam.
//!
//! Everything that talks to a backend goes through [`StorageClient`]. Wire
//! protocol, authentication and transport-level retries live behind it; the
//! reconciler only sees stats, pages, and [`ClientError`].

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    container::{AccountStats, ContainerStats, ContainerSummary},
    object::ObjectPage,
};

/// Failures reported by a storage client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("network error: {message}")]
    Network { message: String, retryable: bool },
    /// Token expiry and similar; a fresh attempt usually re-authenticates.
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("container `{0}` not found")]
    ContainerNotFound(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("{0}")]
    Other(String),
}

impl ClientError {
    /// Check if a fresh attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network { retryable, .. } => *retryable,
            ClientError::Auth(_) => true,
            ClientError::ContainerNotFound(_) => false,
            ClientError::Malformed(_) => false,
            ClientError::Other(_) => false,
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        ClientError::Network {
            message: message.into(),
            retryable: true,
        }
    }
}

/// One session against a storage account.
///
/// A session is not assumed to be safe for several logical scans at once;
/// concurrent work asks a [`Connector`] for its own session.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn head_account(&self) -> Result<AccountStats, ClientError>;

    async fn head_container(&self, container: &str) -> Result<ContainerStats, ClientError>;

    /// Return up to `limit` objects with key strictly greater than `cursor`,
    /// ordered by key, optionally restricted to keys starting with `prefix`.
    async fn list_objects(
        &self,
        container: &str,
        cursor: Option<&str>,
        limit: usize,
        prefix: Option<&str>,
    ) -> Result<ObjectPage, ClientError>;

    /// All containers of the account with their reported usage.
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, ClientError>;
}

/// Opens independent sessions for concurrent scans.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn StorageClient>, ClientError>;
}
