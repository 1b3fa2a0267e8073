/*!
# DSL Error Extractor

Turns one free-text Structurizr error line into a [`Diagnostic`].

The text coupling to the upstream phrasing lives behind [`ErrorExtractor`];
[`DslErrorParser`] only sees the extracted [`ErrorLocation`], so a structured
error channel can replace the regex without touching callers.

Expected shape:

```text
workspace.dsl: <message> at line <N> of <filePath>:<context>
```
*/

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::ParseFailure;
use crate::diagnostics::Diagnostic;
use crate::rules::SuggestionMatcher;

/// Marker every candidate console line must contain.
pub const DSL_ERROR_MARKER: &str = "workspace.dsl";

// message, line, file, context
static DSL_ERROR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)workspace\.dsl:\s*(.+?)\s+at line (\d+) of (.+?):(.*)")
        .expect("DSL error pattern is valid")
});

/// Raw fields pulled out of an error line, already trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLocation {
    pub message: String,
    pub line: u32,
    pub file: String,
    pub context: String,
}

/// Strategy for recognizing DSL errors in raw text.
pub trait ErrorExtractor {
    fn extract_location(&self, raw_text: &str) -> Result<ErrorLocation, ParseFailure>;
}

/// Regex based extractor for the Structurizr CLI/Lite error phrasing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexExtractor;

impl ErrorExtractor for RegexExtractor {
    fn extract_location(&self, raw_text: &str) -> Result<ErrorLocation, ParseFailure> {
        let caps = DSL_ERROR_PATTERN
            .captures(raw_text)
            .ok_or(ParseFailure::UnrecognizedFormat)?;

        let group = |i: usize| {
            caps.get(i)
                .map(|m| m.as_str())
                .ok_or(ParseFailure::UnrecognizedFormat)
        };

        let message = group(1)?.trim();
        let line_text = group(2)?;
        let file = group(3)?.trim();
        let context = group(4)?.trim();

        if message.is_empty() {
            return Err(ParseFailure::EmptyMessage);
        }

        // Паттерн захватывает только цифры, но число может не влезть в u32
        let line = line_text
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ParseFailure::InvalidLine(line_text.to_string()))?;

        Ok(ErrorLocation {
            message: message.to_string(),
            line,
            file: file.to_string(),
            context: context.to_string(),
        })
    }
}

/// Extractor plus suggestion matcher: the `extract` operation.
#[derive(Debug, Clone)]
pub struct DslErrorParser<E: ErrorExtractor = RegexExtractor> {
    extractor: E,
    matcher: SuggestionMatcher,
}

impl DslErrorParser<RegexExtractor> {
    pub fn new(matcher: SuggestionMatcher) -> Self {
        Self::with_extractor(RegexExtractor, matcher)
    }
}

impl Default for DslErrorParser<RegexExtractor> {
    fn default() -> Self {
        Self::new(SuggestionMatcher::default())
    }
}

impl<E: ErrorExtractor> DslErrorParser<E> {
    pub fn with_extractor(extractor: E, matcher: SuggestionMatcher) -> Self {
        Self { extractor, matcher }
    }

    /// Parses `raw_text`, timestamping the diagnostic with the current time.
    pub fn extract(&self, raw_text: &str) -> Result<Diagnostic, ParseFailure> {
        self.extract_at(raw_text, Utc::now())
    }

    /// Same as [`extract`](Self::extract) with an explicit timestamp.
    pub fn extract_at(
        &self,
        raw_text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Diagnostic, ParseFailure> {
        let location = self.extractor.extract_location(raw_text)?;
        let suggestion = self
            .matcher
            .suggest(&location.message, &location.context)
            .clone();

        Ok(Diagnostic::new(
            location.message,
            location.file,
            location.line,
            location.context,
            suggestion,
            timestamp,
        ))
    }

    pub fn matcher(&self) -> &SuggestionMatcher {
        &self.matcher
    }
}

/// Console filter: only `error` level lines mentioning `workspace.dsl`.
pub fn is_dsl_error_event(level: &str, text: &str) -> bool {
    level == "error" && text.contains(DSL_ERROR_MARKER)
}
