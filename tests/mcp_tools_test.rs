/*!
Tool calls through the JSON-RPC front door of the MCP server.
*/

use serde_json::{json, Value};
use std::sync::Arc;
use structurizr_bridge::{DiagnosticLog, DslErrorBridge, DslErrorParser, McpServer};
use tempfile::TempDir;

struct Harness {
    _dir: TempDir,
    server: McpServer,
    next_id: u64,
}

impl Harness {
    fn new() -> Self {
        Self::with_default_recent(10)
    }

    fn with_default_recent(default_recent: usize) -> Self {
        let dir = TempDir::new().unwrap();
        let log = Arc::new(DiagnosticLog::new(dir.path().join("dsl-errors.json")));
        let bridge = DslErrorBridge::new(DslErrorParser::default(), log, default_recent);
        Self {
            _dir: dir,
            server: McpServer::new(bridge),
            next_id: 1,
        }
    }

    fn call_tool(&mut self, name: &str, arguments: Value) -> Value {
        let request = json!({
            "jsonrpc": "2.0",
            "id": self.next_id,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        });
        self.next_id += 1;
        let response = self
            .server
            .handle_line(&request.to_string())
            .expect("tools/call must be answered");
        serde_json::to_value(response).unwrap()
    }

    fn text(response: &Value) -> &str {
        response["result"]["content"][0]["text"].as_str().unwrap()
    }
}

fn error_text(line: u32) -> String {
    format!(
        "workspace.dsl: Unknown relationship at line {} of /w/workspace.dsl: a -> b",
        line
    )
}

#[test]
fn test_process_then_get() {
    let mut h = Harness::new();

    let resp = h.call_tool("processDslError", json!({ "errorText": error_text(7) }));
    assert_eq!(resp["result"]["isError"], false);
    let diagnostic: Value = serde_json::from_str(Harness::text(&resp)).unwrap();
    assert_eq!(diagnostic["line"], 7);
    assert_eq!(diagnostic["code"], "dsl-syntax");

    let resp = h.call_tool("getDslErrors", json!({}));
    let list: Vec<Value> = serde_json::from_str(Harness::text(&resp)).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["file"], "/w/workspace.dsl");
}

#[test]
fn test_unparseable_error_is_reported_and_not_logged() {
    let mut h = Harness::new();

    let resp = h.call_tool(
        "processDslError",
        json!({ "errorText": "some random non-matching text" }),
    );
    assert_eq!(resp["result"]["isError"], true);
    assert!(Harness::text(&resp).starts_with("Could not parse DSL error"));

    let resp = h.call_tool("getDslErrors", json!({ "count": 100 }));
    assert_eq!(Harness::text(&resp), "[]");
}

#[test]
fn test_get_respects_count_and_order() {
    let mut h = Harness::new();
    for line in 1..=3 {
        h.call_tool("processDslError", json!({ "errorText": error_text(line) }));
    }

    let resp = h.call_tool("getDslErrors", json!({ "count": 2 }));
    let list: Vec<Value> = serde_json::from_str(Harness::text(&resp)).unwrap();
    let lines: Vec<u64> = list.iter().map(|d| d["line"].as_u64().unwrap()).collect();
    assert_eq!(lines, vec![2, 3]);
}

#[test]
fn test_oversized_default_count_still_served() {
    let mut h = Harness::with_default_recent(200);
    for line in 1..=3 {
        h.call_tool("processDslError", json!({ "errorText": error_text(line) }));
    }

    let resp = h.call_tool("getDslErrors", json!({}));
    assert!(resp.get("error").is_none(), "{}", resp);
    let list: Vec<Value> = serde_json::from_str(Harness::text(&resp)).unwrap();
    assert_eq!(list.len(), 3);
}

#[test]
fn test_clear_twice() {
    let mut h = Harness::new();
    h.call_tool("processDslError", json!({ "errorText": error_text(1) }));

    for _ in 0..2 {
        let resp = h.call_tool("clearDslErrors", json!({}));
        assert_eq!(resp["result"]["isError"], false);
    }
    let resp = h.call_tool("getDslErrors", json!({}));
    assert_eq!(Harness::text(&resp), "[]");
}

#[test]
fn test_fix_is_advisory() {
    let mut h = Harness::new();
    h.call_tool("processDslError", json!({ "errorText": error_text(12) }));

    let resp = h.call_tool(
        "fixDslError",
        json!({ "line": 12, "fix": "apiApplication -> database \"Reads from\"" }),
    );
    let text = Harness::text(&resp);
    assert!(text.contains("line 12"));
    assert!(text.contains("apiApplication -> database"));
    assert!(text.contains("Recorded error at /w/workspace.dsl:12"));
    assert!(text.contains("does not modify files"));
}

#[test]
fn test_fix_rejects_non_positive_line() {
    let mut h = Harness::new();
    let resp = h.call_tool("fixDslError", json!({ "line": 0, "fix": "x" }));
    assert_eq!(resp["error"]["code"], -32602);
}
