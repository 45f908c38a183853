//! Gateway capabilities and runtime adapter selection.

use std::future::Future;

use medcred_core::{CredentialKind, CredentialRecord, PersistenceError};

use crate::memory::InMemoryGateway;
use crate::sqlite::SqliteGateway;

/// Write capability: durably store one issued credential.
pub trait CredentialGateway: Send + Sync {
    /// Insert `record` into the table for its kind.
    ///
    /// Completes with `Ok(())` only if exactly one row was stored.
    fn add(
        &self,
        record: &CredentialRecord,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

/// Read capability: list recently issued credentials.
pub trait CredentialLedger: Send + Sync {
    /// Up to `limit` records of `kind`, newest first.
    fn recent(
        &self,
        kind: CredentialKind,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<CredentialRecord>, PersistenceError>> + Send;
}

/// Reject records whose license scope does not match their kind.
pub(crate) fn check_scope(record: &CredentialRecord) -> Result<(), PersistenceError> {
    let is_license = record.kind == CredentialKind::License;
    match (is_license, record.license.is_some()) {
        (true, false) => Err(PersistenceError::insert_failed(
            "license record is missing its state and license type",
        )),
        (false, true) => Err(PersistenceError::insert_failed(format!(
            "{} record must not carry a license scope",
            record.kind
        ))),
        _ => Ok(()),
    }
}

/// Gateway chosen at startup from configuration.
#[derive(Debug, Clone)]
pub enum AnyGateway {
    /// Embedded SQLite database.
    Sqlite(SqliteGateway),
    /// Process-local store; nothing survives a restart.
    Memory(InMemoryGateway),
}

impl AnyGateway {
    /// Open the SQLite store at `database_url`, or fall back to the
    /// in-memory store when no URL is configured.
    ///
    /// # Errors
    ///
    /// `PersistenceError::Unavailable` if a URL is given but the database
    /// cannot be opened or migrated.
    pub async fn open(database_url: Option<&str>) -> Result<Self, PersistenceError> {
        match database_url {
            Some(url) => SqliteGateway::connect(url).await.map(Self::Sqlite),
            None => {
                tracing::warn!(
                    "no database URL configured, running in-memory only. \
                     Issued credentials will not survive restarts."
                );
                Ok(Self::Memory(InMemoryGateway::new()))
            }
        }
    }

    /// Short backend name for diagnostics.
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::Memory(_) => "memory",
        }
    }
}

impl CredentialGateway for AnyGateway {
    async fn add(&self, record: &CredentialRecord) -> Result<(), PersistenceError> {
        match self {
            Self::Sqlite(gateway) => gateway.add(record).await,
            Self::Memory(gateway) => gateway.add(record).await,
        }
    }
}

impl CredentialLedger for AnyGateway {
    async fn recent(
        &self,
        kind: CredentialKind,
        limit: usize,
    ) -> Result<Vec<CredentialRecord>, PersistenceError> {
        match self {
            Self::Sqlite(gateway) => gateway.recent(kind, limit).await,
            Self::Memory(gateway) => gateway.recent(kind, limit).await,
        }
    }
}
