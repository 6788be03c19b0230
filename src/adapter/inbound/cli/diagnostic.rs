//! Miette-based diagnostics for scenario scripts.
//!
//! Renders a malformed script line with the surrounding source and a label
//! under the offending command.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use super::script::{ScriptError, OPERATIONS};

/// Script error with source location context.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(streamledger::script))]
pub struct ScriptDiagnostic {
    /// Human-readable error message.
    pub message: String,

    /// The script being parsed.
    #[source_code]
    pub src: String,

    /// Byte offset and length of the offending line.
    #[label("here")]
    pub span: SourceSpan,

    /// Optional help text with suggestions for fixing the error.
    #[help]
    pub help: Option<String>,
}

impl ScriptDiagnostic {
    /// Build a diagnostic for `err` within `src`.
    #[must_use]
    pub fn new(err: &ScriptError, src: impl Into<String>) -> Self {
        let help = if err.reason.starts_with("unknown operation") {
            Some(format!("known operations: {}", OPERATIONS.join(", ")))
        } else {
            Some("lines have the form '<caller> <operation> [args...]'".to_string())
        };
        Self {
            message: format!("script error on line {}: {}", err.line, err.reason),
            src: src.into(),
            span: (err.offset, err.len).into(),
            help,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::inbound::cli::script;

    #[test]
    fn unknown_operation_lists_known_ones() {
        let source = "alice dance\n";
        let err = script::parse(source).unwrap_err();
        let diagnostic = ScriptDiagnostic::new(&err, source);

        assert_eq!(diagnostic.span.offset(), 0);
        assert_eq!(diagnostic.span.len(), "alice dance".len());
        assert!(diagnostic.help.unwrap().contains("create-market"));
    }
}
