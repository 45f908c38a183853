//! # Dispatch Subcommand
//!
//! Routes tagged JSON commands through the command registry:
//!
//! ```json
//! {"command": "validate-dea", "payload": {"dea": "AB1234563", "lastName": "Baker"}}
//! ```
//!
//! A single command may be passed as an argument. Otherwise commands are
//! read from stdin, one JSON object per line, and each reply is printed on
//! its own line. Replies are always JSON regardless of `--output`.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use medcred_service::{Command, CommandRegistry};
use medcred_store::CredentialGateway;

/// Arguments for the `medcred dispatch` subcommand.
#[derive(Args, Debug, Default)]
pub struct DispatchArgs {
    /// A command object. Reads newline-delimited commands from stdin when
    /// omitted or `-`.
    pub command: Option<String>,

    /// Stop at the first command that replies with an error.
    #[arg(long)]
    pub fail_fast: bool,
}

/// Execute the dispatch subcommand.
///
/// Returns exit code 1 if any reply carried an `error` field.
pub async fn run_dispatch<G: CredentialGateway + 'static>(
    args: &DispatchArgs,
    registry: &CommandRegistry<G>,
    input: impl BufRead,
    out: &mut impl Write,
) -> Result<u8> {
    let lines: Vec<String> = match args.command.as_deref() {
        Some(inline) if inline != "-" => vec![inline.to_string()],
        _ => input
            .lines()
            .collect::<std::io::Result<_>>()
            .context("failed to read commands from stdin")?,
    };

    let mut failed = 0usize;
    for (index, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let reply = match serde_json::from_str::<Command>(line) {
            Ok(command) => registry.dispatch_command(command).await,
            Err(e) => serde_json::json!({ "error": format!("malformed command on line {}: {e}", index + 1) }),
        };
        writeln!(out, "{}", serde_json::to_string(&reply)?)?;

        if is_error(&reply) {
            failed += 1;
            if args.fail_fast {
                break;
            }
        }
    }

    if failed > 0 {
        tracing::info!(failed, "some commands replied with an error");
    }
    Ok(u8::from(failed > 0))
}

fn is_error(reply: &Value) -> bool {
    reply.get("error").is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use medcred_service::CredentialService;
    use medcred_store::InMemoryGateway;

    fn registry() -> CommandRegistry<InMemoryGateway> {
        CommandRegistry::new(Arc::new(CredentialService::seeded(InMemoryGateway::new(), 51)))
    }

    async fn run(args: DispatchArgs, stdin: &str) -> (u8, Vec<Value>) {
        let mut out = Vec::new();
        let code = run_dispatch(&args, &registry(), stdin.as_bytes(), &mut out).await.unwrap();
        let replies = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        (code, replies)
    }

    #[tokio::test]
    async fn inline_command() {
        let args = DispatchArgs {
            command: Some(r#"{"command":"validate-npi","payload":{"npi":"1234567893"}}"#.into()),
            fail_fast: false,
        };
        let (code, replies) = run(args, "").await;
        assert_eq!(code, 0);
        assert_eq!(replies, vec![serde_json::json!({"isValid": true})]);
    }

    #[tokio::test]
    async fn stdin_batch_reports_errors() {
        let stdin = concat!(
            r#"{"command":"generate-npi","payload":{"isOrganization":true}}"#,
            "\n\n",
            "not json\n",
            r#"{"command":"nope"}"#,
            "\n",
        );
        let (code, replies) = run(DispatchArgs::default(), stdin).await;
        assert_eq!(code, 1);
        assert_eq!(replies.len(), 3);
        assert!(replies[0]["npi"].as_str().unwrap().starts_with('2'));
        assert!(replies[1]["error"].as_str().unwrap().starts_with("malformed command on line 3"));
        assert_eq!(replies[2]["error"], "unknown command \"nope\"");
    }

    #[tokio::test]
    async fn fail_fast_stops_early() {
        let stdin = "{}\n{\"command\":\"validate-npi\",\"payload\":{\"npi\":\"1234567893\"}}\n";
        let args = DispatchArgs {
            command: Some("-".into()),
            fail_fast: true,
        };
        let (code, replies) = run(args, stdin).await;
        assert_eq!(code, 1);
        assert_eq!(replies.len(), 1);
    }
}
