//! File-backed SQLite gateway: records survive closing and reopening.

use medcred_core::{CredentialKind, DeaNumber, IssuedCredential, NpiNumber};
use medcred_store::{CredentialGateway, CredentialLedger, SqliteGateway};

#[tokio::test]
async fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("medcred.db").display());

    let npi = IssuedCredential::issue(NpiNumber::new("1234567893").unwrap()).to_record();
    let dea = IssuedCredential::issue(DeaNumber::new("AB1234563").unwrap()).to_record();
    {
        let gateway = SqliteGateway::connect(&url).await.unwrap();
        gateway.add(&npi).await.unwrap();
        gateway.add(&dea).await.unwrap();
        gateway.close().await;
    }

    let reopened = SqliteGateway::connect(&url).await.unwrap();
    assert_eq!(reopened.recent(CredentialKind::Npi, 10).await.unwrap(), vec![npi]);
    assert_eq!(reopened.recent(CredentialKind::Dea, 10).await.unwrap(), vec![dea]);
    assert!(reopened.recent(CredentialKind::Ndea, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("twice.db").display());
    SqliteGateway::connect(&url).await.unwrap().close().await;
    SqliteGateway::connect(&url).await.unwrap().close().await;
}

#[tokio::test]
async fn bad_url_is_unavailable() {
    let err = SqliteGateway::connect("sqlite:///nonexistent-dir/deeper/medcred.db")
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("store unavailable"), "{err}");
}
