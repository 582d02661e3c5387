//! YAML error reporting with source spans

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors from reading a YAML input file
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("Failed to read file: {0}")]
    #[diagnostic(code(mtbf::yaml::io))]
    Io(#[from] std::io::Error),
}

/// A parse or type error pinned to a location in the source
#[derive(Debug, Error, Diagnostic)]
#[error("Invalid YAML in {filename}: {message}")]
#[diagnostic(code(mtbf::yaml::syntax), help("Check indentation and the field names in the file"))]
pub struct YamlSyntaxError {
    pub filename: String,
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl YamlSyntaxError {
    /// Wrap a serde_yml error, pointing at the reported location when there is one
    pub fn from_serde_error(error: &serde_yml::Error, content: &str, filename: &str) -> Self {
        let span = error.location().map(|loc| {
            let offset = offset_of(content, loc.line(), loc.column()).unwrap_or(loc.index());
            SourceSpan::from((offset.min(content.len()), 1usize))
        });
        Self {
            filename: filename.to_string(),
            message: error.to_string(),
            src: NamedSource::new(filename, content.to_string()),
            span,
        }
    }
}

/// Byte offset of a 1-based line/column position
fn offset_of(content: &str, line: usize, column: usize) -> Option<usize> {
    let line_start: usize = content
        .split_inclusive('\n')
        .take(line.checked_sub(1)?)
        .map(str::len)
        .sum();
    Some(line_start + column.saturating_sub(1))
}
