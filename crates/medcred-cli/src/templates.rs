//! # Templates Subcommand
//!
//! Prints the state license template registry followed by the generic
//! fallback templates used for every other state.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use medcred_core::jurisdiction::{fallback_template, registered_templates, LicenseTemplate};
use medcred_core::LicenseType;

use crate::OutputFormat;

/// Arguments for the `medcred templates` subcommand.
#[derive(Args, Debug, Default)]
pub struct TemplatesArgs {
    /// Only show templates for this state.
    #[arg(long)]
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TemplateRow {
    state_code: &'static str,
    license_type: LicenseType,
    format: String,
    length: usize,
}

impl TemplateRow {
    fn new(state_code: &'static str, license_type: LicenseType, template: &LicenseTemplate) -> Self {
        Self {
            state_code,
            license_type,
            format: template.describe(),
            length: template.total_len(),
        }
    }
}

/// Execute the templates subcommand. Returns the process exit code.
pub fn run_templates(args: &TemplatesArgs, format: OutputFormat, out: &mut impl Write) -> Result<u8> {
    let filter = args.state.as_deref().map(|s| s.trim().to_ascii_uppercase());
    let registered = registered_templates()
        .filter(|(code, _, _)| filter.as_deref().map_or(true, |f| f == *code))
        .map(|(code, ty, template)| TemplateRow::new(code, ty, template));
    let fallbacks = LicenseType::ALL
        .into_iter()
        .map(|ty| TemplateRow::new("*", ty, fallback_template(ty)));

    for row in registered.chain(fallbacks) {
        let text = format!("{:<3} {:<9} {}", row.state_code, row.license_type.as_str(), row.format);
        format.emit(out, text, &row)?;
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(state: Option<&str>, format: OutputFormat) -> String {
        let args = TemplatesArgs {
            state: state.map(String::from),
        };
        let mut out = Vec::new();
        assert_eq!(run_templates(&args, format, &mut out).unwrap(), 0);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn lists_registry_and_fallbacks() {
        let text = render(None, OutputFormat::Text);
        assert!(text.contains("FL  medical   ME + 6 digits\n"), "{text}");
        assert!(text.contains("WA  pharmacy  PH + 7 digits + Luhn check digit\n"));
        assert!(text.ends_with("*   medical   MD + 7 digits\n*   pharmacy  RPH + 7 digits\n"));
    }

    #[test]
    fn state_filter() {
        let text = render(Some("tx"), OutputFormat::Json);
        let rows: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0]["stateCode"], "TX");
        assert_eq!(rows[0]["format"], "surname initial + 4 digits");
        assert_eq!(rows[0]["length"], 5);
        assert_eq!(rows[3]["stateCode"], "*");
    }
}
