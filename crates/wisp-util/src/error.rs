//! Error types shared by every pipeline stage.
//!
//! The language aborts on the first error instead of collecting diagnostics,
//! so there is no batching `Handler`/`DiagnosticBuilder` here the way a
//! compiler would have one — just one enum per error kind, each carrying the
//! span where it happened.

use crate::span::Span;
use thiserror::Error;

/// One frame of a runtime traceback, built by walking the call stack from
/// the point of failure back to the top-level call.
#[derive(Clone, Debug)]
pub struct TraceFrame {
    pub file_name: String,
    pub line: u32,
    pub display_name: String,
}

#[derive(Debug, Error)]
pub enum WispError {
    #[error("Illegal Character: {details}")]
    IllegalChar { span: Span, details: String },

    #[error("Expected Character: {details}")]
    ExpectedChar { span: Span, details: String },

    #[error("Invalid Syntax: {details}")]
    InvalidSyntax { span: Span, details: String },

    #[error("Runtime Error: {details}")]
    Runtime { span: Span, details: String, traceback: Vec<TraceFrame> },
}

impl WispError {
    pub fn span(&self) -> &Span {
        match self {
            WispError::IllegalChar { span, .. }
            | WispError::ExpectedChar { span, .. }
            | WispError::InvalidSyntax { span, .. }
            | WispError::Runtime { span, .. } => span,
        }
    }

    /// Renders the way the original interpreter's `Error.as_string()` does:
    /// the error name and details, followed by a traceback (for runtime
    /// errors) or a single file/line line. Does not render a source-arrow
    /// excerpt; that is left to the embedding driver.
    pub fn as_string(&self) -> String {
        let mut out = String::new();
        if let WispError::Runtime { traceback, .. } = self {
            out.push_str(&self.generate_traceback(traceback));
        }
        let (name, details) = match self {
            WispError::IllegalChar { details, .. } => ("Illegal Character", details.as_str()),
            WispError::ExpectedChar { details, .. } => ("Expected Character", details.as_str()),
            WispError::InvalidSyntax { details, .. } => ("Invalid Syntax", details.as_str()),
            WispError::Runtime { details, .. } => ("Runtime Error", details.as_str()),
        };
        out.push_str(&format!("{name}: {details}\n"));
        if !matches!(self, WispError::Runtime { .. }) {
            let span = self.span();
            out.push_str(&format!(
                "File {}, line {}",
                span.start.file_name, span.start.line
            ));
        }
        out
    }

    fn generate_traceback(&self, traceback: &[TraceFrame]) -> String {
        let mut out = String::from("Traceback (most recent call last):\n");
        for frame in traceback {
            out.push_str(&format!(
                "  File {}, line {}, in {}\n",
                frame.file_name, frame.line, frame.display_name
            ));
        }
        out
    }
}
