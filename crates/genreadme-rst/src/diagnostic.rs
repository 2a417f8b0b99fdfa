//! System messages raised while parsing and writing.

use crate::{Error, Result};
use std::fmt;

/// Severity of a diagnostic, using the docutils numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Informational (1).
    Info = 1,
    /// Warning (2). The default halt level.
    Warning = 2,
    /// Error (3).
    Error = 3,
    /// Severe (4).
    Severe = 4,
}

impl Level {
    /// Upper-case label used in messages, e.g. `WARNING`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Severe => "SEVERE",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.label(), *self as u8)
    }
}

/// A single system message with its source line (1-based, 0 when unknown).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity.
    pub level: Level,
    /// Line in the source document the message refers to.
    pub line: usize,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            return write!(f, "<string>: ({}) {}", self.level, self.message);
        }
        write!(f, "<string>:{}: ({}) {}", self.line, self.level, self.message)
    }
}

/// Collects diagnostics and turns the first one at the halt level into an error.
#[derive(Debug)]
pub(crate) struct Reporter {
    halt_level: Level,
    diagnostics: Vec<Diagnostic>,
}

impl Reporter {
    pub(crate) const fn new(halt_level: Level) -> Self {
        Self {
            halt_level,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn report(&mut self, level: Level, line: usize, message: impl Into<String>) -> Result<()> {
        let diagnostic = Diagnostic {
            level,
            line,
            message: message.into(),
        };
        if level >= self.halt_level {
            return Err(Error::Halted(diagnostic));
        }
        self.diagnostics.push(diagnostic);
        Ok(())
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
