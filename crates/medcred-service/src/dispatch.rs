//! # Command Registry
//!
//! Routes tagged commands to service entry points. Each handler decodes its
//! request DTO from a JSON payload, calls the service and folds the result
//! into either the success payload or `{"error": message}`. The registry
//! never frames these payloads further; transport envelopes belong to the
//! caller.
//!
//! | Tag | Request | Success payload |
//! |-----|---------|-----------------|
//! | `generate-npi` | `GenerateNpiRequest` | `{"npi": ...}` |
//! | `validate-npi` | `ValidateNpiRequest` | `{"isValid": true}` |
//! | `generate-dea` | `GenerateDeaRequest` | `{"dea": ...}` |
//! | `validate-dea` | `ValidateDeaRequest` | `{"isValid": true}` |
//! | `generate-license` | `GenerateLicenseRequest` | `{"licenseNumber": ...}` |
//! | `validate-license` | `ValidateLicenseRequest` | `{"isValid": true}` |

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use medcred_core::{CredentialError, Outcome};
use medcred_store::CredentialGateway;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dto::{
    ErrorResponse, GenerateDeaRequest, GenerateLicenseRequest, GenerateNpiRequest,
    ValidateDeaRequest, ValidateLicenseRequest, ValidateNpiRequest,
};
use crate::service::CredentialService;

type Reply = Pin<Box<dyn Future<Output = Value> + Send>>;
type Handler<G> = Box<dyn Fn(Arc<CredentialService<G>>, Value) -> Reply + Send + Sync>;

/// A tagged command: `{"command": "generate-npi", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Registered tag selecting the handler.
    pub command: String,
    /// Request DTO for the handler; `null` when omitted.
    #[serde(default)]
    pub payload: Value,
}

/// Tag-keyed table of service handlers.
pub struct CommandRegistry<G> {
    service: Arc<CredentialService<G>>,
    handlers: HashMap<&'static str, Handler<G>>,
}

impl<G> std::fmt::Debug for CommandRegistry<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.tags())
            .finish()
    }
}

impl<G> CommandRegistry<G> {
    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.handlers.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    /// The service handlers are bound to.
    pub fn service(&self) -> &Arc<CredentialService<G>> {
        &self.service
    }
}

impl<G: CredentialGateway + 'static> CommandRegistry<G> {
    /// A registry with every credential command registered.
    pub fn new(service: Arc<CredentialService<G>>) -> Self {
        let mut registry = Self {
            service,
            handlers: HashMap::new(),
        };
        registry.register("generate-npi", |service, request: GenerateNpiRequest| async move {
            service.generate_npi(&request).await
        });
        registry.register("validate-npi", |service, request: ValidateNpiRequest| async move {
            service.validate_npi(&request)
        });
        registry.register("generate-dea", |service, request: GenerateDeaRequest| async move {
            service.generate_dea(&request).await
        });
        registry.register("validate-dea", |service, request: ValidateDeaRequest| async move {
            service.validate_dea(&request)
        });
        registry.register("generate-license", |service, request: GenerateLicenseRequest| async move {
            service.generate_license(&request).await
        });
        registry.register("validate-license", |service, request: ValidateLicenseRequest| async move {
            service.validate_license(&request)
        });
        registry
    }

    /// Register `handler` under `tag`, replacing any previous handler.
    pub fn register<Req, Res, F, Fut>(&mut self, tag: &'static str, handler: F)
    where
        Req: DeserializeOwned + Send + 'static,
        Res: Serialize + 'static,
        F: Fn(Arc<CredentialService<G>>, Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Res, CredentialError>> + Send + 'static,
    {
        let boxed: Handler<G> = Box::new(move |service, payload| {
            let decoded = serde_json::from_value::<Req>(payload)
                .tap_error(|e| tracing::warn!(tag, error = %e, "malformed command payload"))
                .map(|request| handler(service, request));
            Box::pin(async move {
                match decoded {
                    Ok(call) => call.await.fold(success_payload, error_payload),
                    Err(e) => error_payload(format!("invalid {tag} payload: {e}")),
                }
            })
        });
        if self.handlers.insert(tag, boxed).is_some() {
            tracing::debug!(tag, "command handler replaced");
        }
    }

    /// Run the handler registered for `tag`.
    ///
    /// Unknown tags and malformed payloads produce an error payload; this
    /// method itself never fails.
    pub async fn dispatch(&self, tag: &str, payload: Value) -> Value {
        match self.handlers.get(tag) {
            Some(handler) => {
                tracing::debug!(tag, "dispatching command");
                handler(Arc::clone(&self.service), payload).await
            }
            None => {
                tracing::warn!(tag, "unknown command");
                error_payload(format!("unknown command {tag:?}"))
            }
        }
    }

    /// Dispatch a decoded [`Command`].
    pub async fn dispatch_command(&self, command: Command) -> Value {
        self.dispatch(&command.command, command.payload).await
    }
}

fn success_payload<T: Serialize>(response: T) -> Value {
    serde_json::to_value(response)
        .unwrap_or_else(|e| error_payload(format!("could not encode response: {e}")))
}

fn error_payload(error: impl std::fmt::Display) -> Value {
    serde_json::to_value(ErrorResponse::new(error))
        .unwrap_or_else(|_| Value::String("error".to_string()))
}
