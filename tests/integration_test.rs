/*!
# Integration Tests for the Structurizr DSL bridge

Extraction, suggestions and the diagnostic log working together.
*/

use pretty_assertions::assert_eq;
use structurizr_bridge::{DiagnosticLog, DslErrorParser, ParseFailure, SuggestionMatcher};
use tempfile::TempDir;

const DYNAMIC_VIEW_ERROR: &str = "workspace.dsl: Unexpected tokens (expected: include, exclude, autolayout, default, animation, title, description, properties) at line 776 of /usr/local/structurizr/workspace.dsl: dynamic \"ErrorHandlingFlow\" {";

fn error_at(line: u32) -> String {
    format!(
        "workspace.dsl: Unknown relationship at line {} of /usr/local/structurizr/workspace.dsl: api -> db \"Reads\"",
        line
    )
}

#[test]
fn test_dynamic_view_scenario() {
    let diagnostic = DslErrorParser::default().extract(DYNAMIC_VIEW_ERROR).unwrap();

    assert_eq!(diagnostic.line, 776);
    assert_eq!(diagnostic.column, 1);
    assert_eq!(diagnostic.file, "/usr/local/structurizr/workspace.dsl");
    assert!(diagnostic.message.starts_with("Unexpected tokens"));
    assert_eq!(diagnostic.context, "dynamic \"ErrorHandlingFlow\" {");
    assert!(diagnostic
        .suggestion
        .issue
        .contains("dynamic view syntax is incorrect"));
    assert_eq!(diagnostic.source, "Structurizr DSL");
    assert_eq!(diagnostic.severity, "Error");
    assert_eq!(diagnostic.code, "dsl-syntax");
}

#[test]
fn test_unknown_relationship_scenario() {
    let diagnostic = DslErrorParser::default().extract(&error_at(42)).unwrap();
    assert!(diagnostic.suggestion.fix.contains("source -> destination"));
}

#[test]
fn test_non_matching_text_leaves_log_unchanged() {
    let dir = TempDir::new().unwrap();
    let log = DiagnosticLog::new(dir.path().join("dsl-errors.json"));
    log.append(DslErrorParser::default().extract(&error_at(1)).unwrap())
        .unwrap();

    let result = DslErrorParser::default().extract("some random non-matching text");

    assert_eq!(result, Err(ParseFailure::UnrecognizedFormat));
    assert_eq!(log.len(), 1);
}

#[test]
fn test_recent_returns_last_appended_in_order() {
    let dir = TempDir::new().unwrap();
    let log = DiagnosticLog::new(dir.path().join("dsl-errors.json"));
    let parser = DslErrorParser::default();

    for line in [10, 20, 30] {
        log.append(parser.extract(&error_at(line)).unwrap()).unwrap();
    }

    let lines: Vec<u32> = log.recent(2).iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![20, 30]);

    let lines: Vec<u32> = log.recent(10).iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![10, 20, 30]);
}

#[test]
fn test_clear_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let log = DiagnosticLog::new(dir.path().join("dsl-errors.json"));
    log.append(DslErrorParser::default().extract(&error_at(5)).unwrap())
        .unwrap();

    log.clear().unwrap();
    assert!(log.is_empty());
    log.clear().unwrap();
    assert!(log.is_empty());
    assert_eq!(log.load().unwrap().len(), 0);
}

#[test]
fn test_line_always_equals_captured_number() {
    let parser = DslErrorParser::default();
    for line in [1u32, 9, 10, 776, 65_535, u32::MAX] {
        let diagnostic = parser.extract(&error_at(line)).unwrap();
        assert_eq!(diagnostic.line, line);
    }
}

#[test]
fn test_inputs_without_markers_fail() {
    let parser = DslErrorParser::default();
    for text in [
        "Unexpected tokens at line 3 of /w/workspace.dsl: x",
        "workspace.dsl: Unexpected tokens on line 3 of /w/workspace.dsl: x",
        "workspace.dsl Unexpected tokens at line 3 of /w/workspace.dsl: x",
    ] {
        assert!(parser.extract(text).is_err(), "{}", text);
    }
}

#[test]
fn test_suggest_total_over_assorted_inputs() {
    let matcher = SuggestionMatcher::default();
    let inputs = [
        ("", ""),
        ("Unexpected tokens", ""),
        ("", "dynamic"),
        ("relationship", "dynamic"),
        ("Юникод", "😀"),
    ];
    for (message, context) in inputs {
        let issue = &matcher.suggest(message, context).issue;
        assert!(!issue.is_empty());
    }
}

#[test]
fn test_log_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dsl-errors.json");
    {
        let log = DiagnosticLog::new(&path);
        log.append(DslErrorParser::default().extract(DYNAMIC_VIEW_ERROR).unwrap())
            .unwrap();
    }

    let reopened = DiagnosticLog::new(&path);
    let all = reopened.all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].line, 776);
}
