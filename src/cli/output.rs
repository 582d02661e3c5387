//! Output formatting utilities

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::io::IsTerminal;

use crate::cli::OutputFormat;

/// Resolve `Auto`: a table on a terminal, TSV when piped
pub fn effective_format(format: OutputFormat) -> OutputFormat {
    match format {
        OutputFormat::Auto => {
            if std::io::stdout().is_terminal() {
                OutputFormat::Table
            } else {
                OutputFormat::Tsv
            }
        }
        other => other,
    }
}

/// Serialize a whole result for `--output json|yaml`
pub fn render_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<Option<String>> {
    match format {
        OutputFormat::Json => Ok(Some(serde_json::to_string_pretty(value).into_diagnostic()?)),
        OutputFormat::Yaml => Ok(Some(serde_yml::to_string(value).into_diagnostic()?)),
        _ => Ok(None),
    }
}

/// Print a structured rendering; returns false when the format is row-based
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match render_structured(value, format)? {
        Some(text) => {
            if text.ends_with('\n') {
                print!("{}", text);
            } else {
                println!("{}", text);
            }
            Ok(true)
        }
        None => Ok(false),
    }
}
