//! src/services/inventory.rs
//!
//! SqliteInventory: a `StorageClient` over a SQLite snapshot of an account.
//! A snapshot holds what the backend reported at capture time: the account
//! stat row, one row per container stat and one row per listing entry.
//! Reconciling against a snapshot is repeatable and needs no credentials.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, SqlitePool, sqlite::Sqlite};
use tracing::debug;

use crate::{
    models::{
        container::{AccountStats, ContainerStats, ContainerSummary},
        object::{ObjectPage, ObjectRecord},
    },
    services::client::{ClientError, Connector, StorageClient},
};

/// Schema of an inventory snapshot.
pub const SCHEMA_SQL: &str = include_str!("../../migrations/0001_init.sql");

/// Raw listing row; sizes are checked before becoming an [`ObjectRecord`].
#[derive(FromRow, Debug)]
struct ObjectRow {
    name: String,
    bytes: i64,
    last_modified: Option<DateTime<Utc>>,
    hash: Option<String>,
}

impl TryFrom<ObjectRow> for ObjectRecord {
    type Error = ClientError;

    fn try_from(row: ObjectRow) -> Result<Self, Self::Error> {
        let bytes = u64::try_from(row.bytes).map_err(|_| {
            ClientError::Malformed(format!(
                "object `{}` has negative size {}",
                row.name, row.bytes
            ))
        })?;
        Ok(ObjectRecord {
            name: row.name,
            bytes,
            last_modified: row.last_modified,
            hash: row.hash,
        })
    }
}

#[derive(Clone)]
pub struct SqliteInventory {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl SqliteInventory {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    async fn ensure_container(&self, container: &str) -> Result<(), ClientError> {
        sqlx::query_scalar::<_, i64>("SELECT 1 FROM containers WHERE name = ?")
            .bind(container)
            .fetch_optional(&*self.db)
            .await
            .map_err(map_db_error)?
            .map(|_| ())
            .ok_or_else(|| ClientError::ContainerNotFound(container.to_string()))
    }
}

/// Create the snapshot tables if they do not exist yet.
pub async fn apply_schema(db: &SqlitePool) -> Result<(), sqlx::Error> {
    let statements = SCHEMA_SQL
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty());

    for stmt in statements {
        debug!("Executing schema SQL: {}", stmt);
        sqlx::query(stmt).execute(db).await?;
    }
    Ok(())
}

/// Pool exhaustion and I/O are worth another attempt; anything else is not.
fn map_db_error(err: sqlx::Error) -> ClientError {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => ClientError::transient(err.to_string()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            ClientError::Malformed(err.to_string())
        }
        other => ClientError::Other(other.to_string()),
    }
}

#[async_trait]
impl StorageClient for SqliteInventory {
    async fn head_account(&self) -> Result<AccountStats, ClientError> {
        sqlx::query_as::<_, AccountStats>(
            "SELECT container_count, object_count, bytes_used FROM account_stats WHERE id = 1",
        )
        .fetch_optional(&*self.db)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| ClientError::Malformed("snapshot has no account stats".into()))
    }

    async fn head_container(&self, container: &str) -> Result<ContainerStats, ClientError> {
        sqlx::query_as::<_, ContainerStats>(
            "SELECT name, object_count, bytes_used, last_modified, versions_location
             FROM containers WHERE name = ?",
        )
        .bind(container)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => ClientError::ContainerNotFound(container.to_string()),
            other => map_db_error(other),
        })
    }

    /// Keys are compared with SQLite's binary collation, which matches Rust
    /// string ordering. The prefix test is an exact substring comparison so
    /// `_` and `%` in a prefix are literal.
    async fn list_objects(
        &self,
        container: &str,
        cursor: Option<&str>,
        limit: usize,
        prefix: Option<&str>,
    ) -> Result<ObjectPage, ClientError> {
        self.ensure_container(container).await?;

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT name, bytes, last_modified, hash FROM objects WHERE container = ",
        );
        builder.push_bind(container);

        if let Some(prefix) = prefix {
            builder.push(" AND substr(name, 1, length(");
            builder.push_bind(prefix);
            builder.push(")) = ");
            builder.push_bind(prefix);
        }

        if let Some(cursor) = cursor {
            builder.push(" AND name > ");
            builder.push_bind(cursor);
        }

        builder.push(" ORDER BY name ASC LIMIT ");
        builder.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));

        let rows: Vec<ObjectRow> = builder
            .build_query_as()
            .fetch_all(&*self.db)
            .await
            .map_err(map_db_error)?;

        let objects = rows
            .into_iter()
            .map(ObjectRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ObjectPage::new(objects))
    }

    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, ClientError> {
        sqlx::query_as::<_, ContainerSummary>(
            "SELECT name, object_count, bytes_used FROM containers ORDER BY name ASC",
        )
        .fetch_all(&*self.db)
        .await
        .map_err(map_db_error)
    }
}

/// Every session shares the pool; each query checks out its own connection.
#[async_trait]
impl Connector for SqliteInventory {
    async fn connect(&self) -> Result<Box<dyn StorageClient>, ClientError> {
        Ok(Box::new(self.clone()))
    }
}
