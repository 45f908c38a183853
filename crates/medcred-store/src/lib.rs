//! # medcred-store — Persistence Gateways for Issued Credentials
//!
//! Issued credentials are written through the [`CredentialGateway`]
//! capability and read back through [`CredentialLedger`]. Two adapters
//! implement both:
//!
//! - [`SqliteGateway`]: an embedded SQLite database over SQLx, one
//!   append-only table per credential kind, opened with a single
//!   connection so writes are serialised.
//! - [`InMemoryGateway`]: a process-local store with the same insert
//!   semantics, used when no database URL is configured and in tests.
//!
//! [`AnyGateway`] selects between them at runtime.
//!
//! ## Insert Contract
//!
//! An insert that affects zero rows is a failure:
//! `PersistenceError::InsertFailed { message: "no rows affected" }`. A
//! storage fault or a panic raised while inserting is caught at the
//! gateway's fault boundary and surfaces as `InsertFailed` with the fault
//! as its source.

pub mod gateway;
pub mod memory;
pub mod sqlite;

pub use gateway::{AnyGateway, CredentialGateway, CredentialLedger};
pub use memory::InMemoryGateway;
pub use sqlite::SqliteGateway;
