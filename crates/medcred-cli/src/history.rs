//! # History Subcommand
//!
//! Lists recently issued credentials of one kind, newest first. Only
//! meaningful with a database URL; the in-memory store starts empty on
//! every invocation.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use medcred_core::{CredentialKind, CredentialRecord};
use medcred_service::CredentialService;
use medcred_store::CredentialLedger;

use crate::OutputFormat;

/// Arguments for the `medcred history` subcommand.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Credential kind: npi, dea, ndea or license.
    pub kind: CredentialKind,
    /// Maximum number of records to list.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

/// Execute the history subcommand. Returns the process exit code.
pub async fn run_history<G: CredentialLedger>(
    args: &HistoryArgs,
    service: &CredentialService<G>,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<u8> {
    let records = service
        .history(args.kind, args.limit)
        .await
        .with_context(|| format!("could not list {} history", args.kind.as_str()))?;
    if records.is_empty() {
        tracing::info!(kind = %args.kind, "no credentials issued yet");
    }
    for record in &records {
        format.emit(out, describe(record), record)?;
    }
    Ok(0)
}

fn describe(record: &CredentialRecord) -> String {
    match &record.license {
        Some(scope) => format!(
            "{}  {}  {} {}  {}",
            record.created_at, record.id, scope.state_code, scope.license_type, record.value
        ),
        None => format!("{}  {}  {}", record.created_at, record.id, record.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medcred_service::dto::GenerateLicenseRequest;
    use medcred_store::InMemoryGateway;

    #[tokio::test]
    async fn lists_license_history_with_scope() {
        let service = CredentialService::seeded(InMemoryGateway::new(), 41);
        service
            .generate_license(&GenerateLicenseRequest {
                state_code: "FL".into(),
                last_name: String::new(),
                license_type: "pharmacy".into(),
            })
            .await
            .unwrap();

        let args = HistoryArgs {
            kind: CredentialKind::License,
            limit: 10,
        };
        let mut out = Vec::new();
        assert_eq!(run_history(&args, &service, OutputFormat::Text, &mut out).await.unwrap(), 0);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("  FL pharmacy  PS"), "{text}");
    }

    #[tokio::test]
    async fn empty_history_prints_nothing() {
        let service = CredentialService::seeded(InMemoryGateway::new(), 42);
        let args = HistoryArgs {
            kind: CredentialKind::Dea,
            limit: 10,
        };
        let mut out = Vec::new();
        run_history(&args, &service, OutputFormat::Json, &mut out).await.unwrap();
        assert!(out.is_empty());
    }
}
