//! # Composition Root
//!
//! Builds the gateway, random source, service and command registry once
//! at startup from the resolved configuration, and hands them to the
//! subcommand handlers by reference.

use std::sync::Arc;

use medcred_core::PersistenceError;
use medcred_service::{CommandRegistry, CredentialService};
use medcred_store::AnyGateway;

use crate::config::MedcredConfig;

/// Everything a subcommand needs.
#[derive(Debug)]
pub struct App {
    pub service: Arc<CredentialService<AnyGateway>>,
    pub registry: CommandRegistry<AnyGateway>,
}

/// Wire the application from `config`.
///
/// # Errors
///
/// `PersistenceError::Unavailable` if a database URL is configured but the
/// store cannot be opened.
pub async fn compose(config: &MedcredConfig) -> Result<App, PersistenceError> {
    let gateway = AnyGateway::open(config.database_url.as_deref()).await?;
    tracing::debug!(backend = gateway.backend(), "gateway ready");

    let service = match config.rng_seed {
        Some(seed) => {
            tracing::info!(seed, "using seeded random source");
            CredentialService::seeded(gateway, seed)
        }
        None => CredentialService::from_entropy(gateway),
    };
    let service = Arc::new(service);
    let registry = CommandRegistry::new(Arc::clone(&service));

    Ok(App { service, registry })
}
