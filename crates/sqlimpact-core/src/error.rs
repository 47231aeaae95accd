//! Error types

use miette::SourceSpan;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ProcedureName;

/// Source location of a syntax error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset from start of source (0 when unknown)
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl Span {
    /// Create a span with line and column information
    pub fn with_location(line: usize, column: usize) -> Self {
        Self {
            offset: 0,
            length: 1,
            line,
            column,
        }
    }

    /// Fill in the byte offset by locating `line`/`column` inside `source`
    pub fn resolve_offset(mut self, source: &str) -> Self {
        let mut line = 1;
        let mut column = 1;

        for (i, ch) in source.char_indices() {
            if line == self.line && column == self.column {
                self.offset = i;
                return self;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        self.offset = source.len();
        self
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.offset.into(), span.length)
    }
}

/// A syntax error reported by the parser
///
/// Displays as `<message> Line:<line>:<column>`.
#[derive(Debug, Clone, PartialEq, Eq, Error, miette::Diagnostic, Serialize, Deserialize)]
#[error("{message} Line:{}:{}", .span.line, .span.column)]
#[diagnostic(code(sqlimpact::syntax_error))]
pub struct SyntaxError {
    pub message: String,
    #[label("here")]
    pub span: Span,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            span: Span::with_location(line, column),
        }
    }

    pub fn line(&self) -> usize {
        self.span.line
    }

    pub fn column(&self) -> usize {
        self.span.column
    }
}

/// Failure of a single analysis call
#[derive(Debug, Clone, Error, miette::Diagnostic)]
pub enum AnalysisError {
    /// E1000: the script does not parse; nothing was extracted
    #[error("script has {} syntax error(s)", .errors.len())]
    #[diagnostic(code(sqlimpact::syntax))]
    Syntax {
        #[related]
        errors: Vec<SyntaxError>,
    },

    /// E2001: more than one procedure definition in one script
    #[error("Only one procedure definition is allowed per script: found {second} after {first}")]
    #[diagnostic(
        code(sqlimpact::duplicate_definition),
        help("split the script so that each file defines a single procedure")
    )]
    DuplicateDefinition {
        first: ProcedureName,
        second: ProcedureName,
    },
}

impl AnalysisError {
    /// Get the error code string (e.g., "E1000")
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::Syntax { .. } => "E1000",
            AnalysisError::DuplicateDefinition { .. } => "E2001",
        }
    }

    /// Syntax errors carried by this failure, empty for other kinds
    pub fn syntax_errors(&self) -> &[SyntaxError] {
        match self {
            AnalysisError::Syntax { errors } => errors,
            AnalysisError::DuplicateDefinition { .. } => &[],
        }
    }
}

impl From<Vec<SyntaxError>> for AnalysisError {
    fn from(errors: Vec<SyntaxError>) -> Self {
        AnalysisError::Syntax { errors }
    }
}
