use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, trace};
use waypoint_core::error::{Result, StorageError};
use waypoint_core::repository::{ReadRepository, Repository};
use waypoint_core::{LinkName, LinkTable, RemoteUrl};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Postgres implementation of the repository contract.
///
/// All operations are single statements against the `links` table.
/// Uniqueness of `internal_name` is enforced by the primary key, so
/// concurrent inserts of the same name are settled by the database.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a repository from an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new connection pool.
    ///
    /// Fails if the database cannot be reached.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations. A current schema is a no-op.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Query(format!("cannot apply migrations: {e}")))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::Corrupt(message),
        _ => StorageError::Query(message),
    }
}

fn decode_entry(row: &PgRow) -> Result<(LinkName, RemoteUrl)> {
    let name: String = row.try_get("internal_name").map_err(map_sqlx_error)?;
    let url: String = row.try_get("remote_url").map_err(map_sqlx_error)?;
    Ok((LinkName::new(name), RemoteUrl::new(url)))
}

#[async_trait]
impl ReadRepository for PostgresRepository {
    async fn list_all(&self) -> Result<LinkTable> {
        let rows = sqlx::query("SELECT internal_name, remote_url FROM links")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let table = rows.iter().map(decode_entry).collect::<Result<LinkTable>>()?;
        debug!(entries = table.len(), "listed links");
        Ok(table)
    }

    async fn resolve(&self, name: &LinkName) -> Result<Option<RemoteUrl>> {
        let row = sqlx::query(
            r#"
            SELECT remote_url
            FROM links
            WHERE internal_name = $1
            "#,
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            trace!(name = %name, "link not found");
            return Ok(None);
        };

        let url: String = row.try_get("remote_url").map_err(map_sqlx_error)?;
        Ok(RemoteUrl::non_empty(url))
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn insert(&self, name: &LinkName, url: &RemoteUrl) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO links (internal_name, remote_url)
            VALUES ($1, $2)
            "#,
        )
        .bind(name.as_str())
        .bind(url.as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::DuplicateKey(name.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }
}
