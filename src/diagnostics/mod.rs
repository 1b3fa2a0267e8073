// Диагностика
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of [`Diagnostic::source`].
pub const DIAGNOSTIC_SOURCE: &str = "Structurizr DSL";
/// Value of [`Diagnostic::severity`].
pub const DIAGNOSTIC_SEVERITY: &str = "Error";
/// Value of [`Diagnostic::code`].
pub const DIAGNOSTIC_CODE: &str = "dsl-syntax";

/// Human readable advice attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub issue: String,
    pub fix: String,
}

impl Suggestion {
    pub fn new(issue: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            issue: issue.into(),
            fix: fix.into(),
        }
    }
}

/// One parsed Structurizr DSL syntax error.
///
/// `source`, `severity` and `code` are constant tags kept so the records can
/// be fed to IDE problem matchers unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub context: String,
    pub suggestion: Suggestion,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub severity: String,
    pub code: String,
}

impl Diagnostic {
    /// Builds a diagnostic with the constant tags filled in and `column = 1`.
    pub fn new(
        message: String,
        file: String,
        line: u32,
        context: String,
        suggestion: Suggestion,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            message,
            file,
            line,
            column: 1,
            context,
            suggestion,
            timestamp,
            source: DIAGNOSTIC_SOURCE.to_string(),
            severity: DIAGNOSTIC_SEVERITY.to_string(),
            code: DIAGNOSTIC_CODE.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.file, self.line, self.column, self.message
        )?;
        if !self.context.is_empty() {
            write!(f, "\n  Context: {}", self.context)?;
        }
        write!(
            f,
            "\n  Issue: {}\n  Fix: {}",
            self.suggestion.issue, self.suggestion.fix
        )
    }
}
