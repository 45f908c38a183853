//! # medcred-service — Credential Services
//!
//! The orchestration layer between the dispatch surface and the core:
//!
//! - [`CredentialService`] generates, persists and validates credentials
//!   over any [`medcred_store::CredentialGateway`].
//! - [`dto`] holds the request/response records exchanged with callers.
//! - [`CommandRegistry`] routes tagged JSON commands to the service.
//!
//! The service returns `Result` values only; rendering them into a
//! transport envelope is left to the caller.

pub mod dispatch;
pub mod dto;
pub mod service;

pub use dispatch::{Command, CommandRegistry};
pub use service::CredentialService;
