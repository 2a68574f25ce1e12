//! Error types for parsing and compilation.

use std::fmt::Write;

use crate::span::Span;
use thiserror::Error;

/// The query text could not be parsed.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    /// Suggested fix, shown under the source snippet.
    pub hint: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// A call to a function other than INTERSECTS or DWITHIN.
    pub fn unsupported_function(name: &str, span: Span) -> Self {
        Self::new(format!("unsupported filter function '{}'", name), span)
            .with_hint("only INTERSECTS and DWITHIN may be called")
    }

    /// Render the error with the offending part of `source` underlined.
    pub fn format_with_source(&self, source: &str) -> String {
        render("error", &self.message, source, self.span, self.hint.as_deref())
    }
}

/// What went wrong while compiling a parsed condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorKind {
    /// Literal of the wrong type for the operator.
    TypeMismatch,
    /// Literal that cannot be used where it appears.
    InvalidLiteral,
    /// `DWITHIN` unit outside the distance unit table.
    UnknownUnit,
}

/// A parsed condition could not be turned into a filter tree.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
    pub span: Span,
    pub kind: CompileErrorKind,
}

impl CompileError {
    pub fn new(message: impl Into<String>, span: Span, kind: CompileErrorKind) -> Self {
        Self {
            message: message.into(),
            span,
            kind,
        }
    }

    pub fn type_mismatch(expected: &str, got: &str, span: Span) -> Self {
        Self::new(
            format!("type mismatch: expected {}, got {}", expected, got),
            span,
            CompileErrorKind::TypeMismatch,
        )
    }

    pub fn invalid_literal(message: impl Into<String>, span: Span) -> Self {
        Self::new(message, span, CompileErrorKind::InvalidLiteral)
    }

    pub fn unknown_unit(unit: &str, span: Span) -> Self {
        Self::new(
            format!("unknown distance unit '{}'", unit),
            span,
            CompileErrorKind::UnknownUnit,
        )
    }

    /// Render the error with the offending part of `source` underlined.
    pub fn format_with_source(&self, source: &str) -> String {
        let label = format!("error[{:?}]", self.kind);
        render(&label, &self.message, source, self.span, None)
    }
}

/// Any error turning CQL text into a filter tree.
#[derive(Debug, Clone, Error)]
pub enum LangError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),
}

impl LangError {
    /// Render the error with the offending part of `source` underlined.
    pub fn format_with_source(&self, source: &str) -> String {
        match self {
            LangError::Parse(e) => e.format_with_source(source),
            LangError::Compile(e) => e.format_with_source(source),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            LangError::Parse(e) => e.span,
            LangError::Compile(e) => e.span,
        }
    }
}

/// Build a report like
///
/// ```text
/// error: expected literal value, found Eq
///  --> line 1:8
///   |
/// 1 | title == 'a'
///   |        ^
///   = hint: use '=' for equality
/// ```
fn render(label: &str, message: &str, source: &str, span: Span, hint: Option<&str>) -> String {
    let location = span.location(source);
    let gutter = " ".repeat(location.line.to_string().len());

    let mut out = String::new();
    let _ = writeln!(out, "{}: {}", label, message);
    let _ = writeln!(out, "{} --> line {}", gutter, location);

    if let Some(text) = source.lines().nth(location.line - 1) {
        // Underline at least one column, never past the end of the line.
        let line_chars = text.chars().count();
        let span_chars = span
            .slice(source)
            .map_or(1, |covered| covered.chars().take_while(|&c| c != '\n').count());
        let width = span_chars.clamp(1, (line_chars + 1).saturating_sub(location.column).max(1));

        let _ = writeln!(out, "{} |", gutter);
        let _ = writeln!(out, "{} | {}", location.line, text);
        let _ = writeln!(
            out,
            "{} | {}{}",
            gutter,
            " ".repeat(location.column - 1),
            "^".repeat(width)
        );
    }

    if let Some(hint) = hint {
        let _ = writeln!(out, "{} = hint: {}", gutter, hint);
    }
    out
}
