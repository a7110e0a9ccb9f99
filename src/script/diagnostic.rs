//! Diagnostics and compilation results.

use crate::script::errors::{AsmError, Stage};
use cashasm_derive::Error;
use std::fmt::{self, Write};

/// Name used for inline source that does not come from the identifier table.
pub const INLINE_SOURCE: &str = "<source>";

/// Location of a token inside a named script.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    /// Script (or operation) name, [`INLINE_SOURCE`] for inline text.
    pub script: String,
    /// 1-based line.
    pub line: usize,
    /// 1-based column, in characters.
    pub column: usize,
    /// Length of the span in characters (at least 1).
    pub len: usize,
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.script, self.line, self.column)
    }
}

/// One structured error produced during compilation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub error: AsmError,
    pub location: Option<SourceSpan>,
}

impl Diagnostic {
    pub fn new(error: AsmError, location: Option<SourceSpan>) -> Self {
        Self { error, location }
    }

    /// Returns the stage that produced this diagnostic.
    pub fn stage(&self) -> Stage {
        self.error.stage()
    }

    /// Returns the human-readable message (without location).
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(span) => write!(f, "{span}: {}", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

/// Outcome of one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilationResult {
    /// Compiled bytecode; empty for an empty program.
    Success { bytecode: Vec<u8> },
    /// Every diagnostic, in source order.
    Failure {
        /// Earliest stage present among `errors`.
        error_type: Stage,
        errors: Vec<Diagnostic>,
    },
}

impl CompilationResult {
    /// Builds a result from compiled bytes and accumulated diagnostics.
    pub(crate) fn from_parts(bytecode: Vec<u8>, errors: Vec<Diagnostic>) -> Self {
        match errors.iter().map(Diagnostic::stage).min() {
            None => CompilationResult::Success { bytecode },
            Some(error_type) => CompilationResult::Failure { error_type, errors },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CompilationResult::Success { .. })
    }

    /// Returns the bytecode of a successful compilation.
    pub fn bytecode(&self) -> Option<&[u8]> {
        match self {
            CompilationResult::Success { bytecode } => Some(bytecode),
            CompilationResult::Failure { .. } => None,
        }
    }

    /// Returns the diagnostics of a failed compilation (empty on success).
    pub fn errors(&self) -> &[Diagnostic] {
        match self {
            CompilationResult::Success { .. } => &[],
            CompilationResult::Failure { errors, .. } => errors,
        }
    }

    /// Joins every diagnostic into one display string, one per line.
    pub fn joined_messages(&self) -> String {
        self.errors()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Converts into a `Result` for `?`-style callers.
    pub fn into_result(self) -> Result<Vec<u8>, CompileFailure> {
        match self {
            CompilationResult::Success { bytecode } => Ok(bytecode),
            CompilationResult::Failure { error_type, errors } => {
                Err(CompileFailure { error_type, errors })
            }
        }
    }
}

/// Failed compilation as an error value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("compilation failed ({error_type})")]
pub struct CompileFailure {
    pub error_type: Stage,
    pub errors: Vec<Diagnostic>,
}

impl CompileFailure {
    /// Number of aggregated diagnostics.
    pub fn count(&self) -> usize {
        self.errors.len()
    }
}

/// Formats a compiler-style diagnostic with a source excerpt.
///
/// `source` is the text of the script named in the diagnostic's location,
/// if available.
pub fn render_diagnostic(diagnostic: &Diagnostic, source: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {}",
        diagnostic.stage().as_str(),
        diagnostic.error
    );

    let Some(span) = &diagnostic.location else {
        return out;
    };
    let _ = writeln!(out, " --> {span}");

    if let Some(raw_line) = source.and_then(|s| s.lines().nth(span.line.saturating_sub(1))) {
        let line_text = raw_line.trim_end_matches('\r');
        let indent = " ".repeat(span.column.saturating_sub(1));
        let _ = writeln!(out, "     |");
        let _ = writeln!(out, "{:>4} | {}", span.line, line_text);
        let _ = writeln!(out, "     | {}{}", indent, "^".repeat(span.len.max(1)));
    }

    out
}
