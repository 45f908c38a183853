//! In-memory gateway.
//!
//! Mirrors the SQLite adapter's contract: records are appended per kind,
//! and inserting an id that is already present affects no rows.

use std::collections::HashMap;
use std::sync::Arc;

use medcred_core::{CredentialKind, CredentialRecord, Outcome, PersistenceError};
use parking_lot::RwLock;

use crate::gateway::{check_scope, CredentialGateway, CredentialLedger};

/// Process-local credential store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    tables: Arc<RwLock<HashMap<CredentialKind, Vec<CredentialRecord>>>>,
}

impl InMemoryGateway {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records of `kind`.
    pub fn len(&self, kind: CredentialKind) -> usize {
        self.tables.read().get(&kind).map_or(0, Vec::len)
    }

    /// Whether no records of any kind are stored.
    pub fn is_empty(&self) -> bool {
        self.tables.read().values().all(Vec::is_empty)
    }

    /// Append `record` unless its id is already present. Returns rows affected.
    fn insert(&self, record: &CredentialRecord) -> u64 {
        let mut tables = self.tables.write();
        let table = tables.entry(record.kind).or_default();
        if table.iter().any(|existing| existing.id == record.id) {
            return 0;
        }
        table.push(record.clone());
        1
    }
}

impl CredentialGateway for InMemoryGateway {
    async fn add(&self, record: &CredentialRecord) -> Result<(), PersistenceError> {
        check_scope(record)
            .map(|()| self.insert(record))
            .ensure(|rows| *rows > 0, PersistenceError::no_rows_affected())
            .tap(|_| tracing::debug!(kind = %record.kind, id = %record.id, "credential stored in memory"))
            .map(drop)
    }
}

impl CredentialLedger for InMemoryGateway {
    async fn recent(
        &self,
        kind: CredentialKind,
        limit: usize,
    ) -> Result<Vec<CredentialRecord>, PersistenceError> {
        Ok(self
            .tables
            .read()
            .get(&kind)
            .map(|table| table.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medcred_core::{DeaNumber, IssuedCredential, NpiNumber};

    fn npi_record() -> CredentialRecord {
        IssuedCredential::issue(NpiNumber::new("1234567893").unwrap()).to_record()
    }

    #[tokio::test]
    async fn add_then_recent() {
        let gateway = InMemoryGateway::new();
        assert!(gateway.is_empty());
        let record = npi_record();
        gateway.add(&record).await.unwrap();
        assert_eq!(gateway.len(CredentialKind::Npi), 1);
        assert_eq!(gateway.recent(CredentialKind::Npi, 5).await.unwrap(), vec![record]);
        assert!(gateway.recent(CredentialKind::Dea, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_id_affects_no_rows() {
        let gateway = InMemoryGateway::new();
        let record = npi_record();
        gateway.add(&record).await.unwrap();

        let err = gateway.add(&record).await.unwrap_err();
        match err {
            PersistenceError::InsertFailed { message, cause } => {
                assert_eq!(message, "no rows affected");
                assert!(cause.is_none());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(gateway.len(CredentialKind::Npi), 1);
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_limited() {
        let gateway = InMemoryGateway::new();
        let mut ids = Vec::new();
        for _ in 0..5 {
            let record = npi_record();
            ids.push(record.id);
            gateway.add(&record).await.unwrap();
        }
        let recent = gateway.recent(CredentialKind::Npi, 3).await.unwrap();
        let recent_ids: Vec<_> = recent.iter().map(|r| r.id).collect();
        assert_eq!(recent_ids, vec![ids[4], ids[3], ids[2]]);
    }

    #[tokio::test]
    async fn kinds_are_kept_apart() {
        let gateway = InMemoryGateway::new();
        let ndea = IssuedCredential::issue(DeaNumber::new("MS1234563").unwrap()).to_record();
        gateway.add(&ndea).await.unwrap();
        assert_eq!(gateway.len(CredentialKind::Ndea), 1);
        assert_eq!(gateway.len(CredentialKind::Dea), 0);
    }

    #[tokio::test]
    async fn clones_share_data() {
        let gateway = InMemoryGateway::new();
        let other = gateway.clone();
        gateway.add(&npi_record()).await.unwrap();
        assert_eq!(other.len(CredentialKind::Npi), 1);
    }
}
