//! Embedded SQLite gateway.
//!
//! One append-only table per credential kind (see `migrations/`). Inserts
//! use `INSERT OR IGNORE`, so a colliding identity key is reported as zero
//! rows affected rather than as a constraint error. The pool holds exactly
//! one connection, which also keeps `sqlite::memory:` databases alive for
//! the life of the gateway.

use std::str::FromStr;

use medcred_core::{
    try_wrap_async, CredentialId, CredentialKind, CredentialRecord, LicenseScope, LicenseType,
    Outcome, PersistenceError, StateCode, Timestamp,
};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::gateway::{check_scope, CredentialGateway, CredentialLedger};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed credential store.
#[derive(Debug, Clone)]
pub struct SqliteGateway {
    pool: SqlitePool,
}

impl SqliteGateway {
    /// Open (creating if missing) the database at `url` and apply migrations.
    ///
    /// Accepts `sqlite://path`, `sqlite:path`, `sqlite::memory:` or a bare
    /// file path.
    ///
    /// # Errors
    ///
    /// `PersistenceError::Unavailable` if the URL is malformed, the database
    /// cannot be opened, or a migration fails.
    pub async fn connect(url: &str) -> Result<Self, PersistenceError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| PersistenceError::unavailable_by(format!("invalid database URL {url:?}"), e))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| PersistenceError::unavailable_by("could not open SQLite database", e))?;
        tracing::info!(url = %url, "connected to SQLite");

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| PersistenceError::unavailable_by("database migrations failed", e))?;
        tracing::info!("database migrations applied");

        Ok(Self { pool })
    }

    /// A private in-memory database, mainly for tests.
    ///
    /// # Errors
    ///
    /// As [`SqliteGateway::connect`].
    pub async fn in_memory() -> Result<Self, PersistenceError> {
        Self::connect("sqlite::memory:").await
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for the connection to be released.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn insert(&self, record: &CredentialRecord) -> Result<u64, sqlx::Error> {
        let id = record.id.to_string();
        let created_at = record.created_at.to_iso8601();
        let result = match &record.license {
            Some(scope) => {
                sqlx::query(
                    "INSERT OR IGNORE INTO license_numbers (id, value, state_code, license_type, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .bind(&id)
                .bind(&record.value)
                .bind(scope.state_code.as_str())
                .bind(scope.license_type.as_str())
                .bind(&created_at)
                .execute(&self.pool)
                .await?
            }
            None => {
                let sql = format!(
                    "INSERT OR IGNORE INTO {} (id, value, created_at) VALUES (?1, ?2, ?3)",
                    record.kind.table()
                );
                sqlx::query(&sql)
                    .bind(&id)
                    .bind(&record.value)
                    .bind(&created_at)
                    .execute(&self.pool)
                    .await?
            }
        };
        Ok(result.rows_affected())
    }
}

impl CredentialGateway for SqliteGateway {
    async fn add(&self, record: &CredentialRecord) -> Result<(), PersistenceError> {
        check_scope(record)?;
        try_wrap_async(self.insert(record), |fault| {
            PersistenceError::insert_failed_by(
                format!("insert into {} failed", record.kind.table()),
                fault,
            )
        })
        .await
        .ensure(|rows| *rows > 0, PersistenceError::no_rows_affected())
        .tap(|_| tracing::debug!(kind = %record.kind, id = %record.id, "credential stored"))
        .map(drop)
    }
}

impl CredentialLedger for SqliteGateway {
    async fn recent(
        &self,
        kind: CredentialKind,
        limit: usize,
    ) -> Result<Vec<CredentialRecord>, PersistenceError> {
        let scope_columns = match kind {
            CredentialKind::License => "state_code, license_type",
            _ => "NULL AS state_code, NULL AS license_type",
        };
        let sql = format!(
            "SELECT id, value, created_at, {scope_columns} FROM {}
             ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            kind.table()
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, CredentialRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                PersistenceError::unavailable_by(format!("could not read {}", kind.table()), e)
            })?;

        Ok(rows.into_iter().filter_map(|row| row.into_record(kind)).collect())
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: String,
    value: String,
    created_at: String,
    state_code: Option<String>,
    license_type: Option<String>,
}

impl CredentialRow {
    /// Convert to a record, skipping (and logging) rows that no longer parse.
    fn into_record(self, kind: CredentialKind) -> Option<CredentialRecord> {
        let id = match CredentialId::from_str(&self.id) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(table = kind.table(), id = %self.id, error = %e, "skipping row with malformed id");
                return None;
            }
        };
        let created_at = match Timestamp::parse(&self.created_at) {
            Ok(ts) => ts,
            Err(e) => {
                tracing::warn!(table = kind.table(), %id, error = %e, "skipping row with malformed timestamp");
                return None;
            }
        };
        let license = match (self.state_code, self.license_type) {
            (Some(state), Some(license_type)) => {
                let scope = StateCode::new(state).and_then(|state_code| {
                    LicenseType::from_str(&license_type).map(|license_type| LicenseScope {
                        state_code,
                        license_type,
                    })
                });
                match scope {
                    Ok(scope) => Some(scope),
                    Err(e) => {
                        tracing::warn!(table = kind.table(), %id, error = %e, "skipping row with malformed license scope");
                        return None;
                    }
                }
            }
            _ => None,
        };
        Some(CredentialRecord {
            kind,
            id,
            value: self.value,
            created_at,
            license,
        })
    }
}
