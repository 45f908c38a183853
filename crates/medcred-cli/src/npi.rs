//! # NPI Subcommand
//!
//! - `generate`: Issue one or more NPIs (`--organization` for type 2).
//! - `validate`: Check an NPI's format, entity digit and Luhn check digit.

use std::io::Write;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use medcred_service::dto::{GenerateNpiRequest, ValidateNpiRequest};
use medcred_service::CredentialService;
use medcred_store::CredentialGateway;

use crate::{report_validation, OutputFormat, MAX_BATCH};

/// Arguments for the `medcred npi` subcommand.
#[derive(Args, Debug)]
pub struct NpiArgs {
    #[command(subcommand)]
    pub command: NpiCommand,
}

/// NPI subcommands.
#[derive(Subcommand, Debug)]
pub enum NpiCommand {
    /// Generate NPIs.
    Generate {
        /// Issue organization NPIs (leading digit 2).
        #[arg(long)]
        organization: bool,
        /// Number of NPIs to issue.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=MAX_BATCH as i64))]
        count: u32,
    },

    /// Validate an NPI.
    Validate {
        /// The 10-digit NPI.
        npi: String,
    },
}

/// Execute an NPI subcommand. Returns the process exit code.
pub async fn run_npi<G: CredentialGateway>(
    args: &NpiArgs,
    service: &CredentialService<G>,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<u8> {
    match &args.command {
        NpiCommand::Generate {
            organization,
            count,
        } => {
            let request = GenerateNpiRequest {
                is_organization: *organization,
            };
            for _ in 0..*count {
                let response = service
                    .generate_npi(&request)
                    .await
                    .context("NPI generation failed")?;
                format.emit(out, &response.npi, &response)?;
            }
            Ok(0)
        }
        NpiCommand::Validate { npi } => report_validation(
            out,
            format,
            service.validate_npi(&ValidateNpiRequest { npi: npi.clone() }),
        ),
    }
}
