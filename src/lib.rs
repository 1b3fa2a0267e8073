/*!
# Structurizr DSL Bridge

Developer-tooling sidecar for Structurizr: it watches the browser console of
the Structurizr web UI, turns DSL syntax errors into structured diagnostics
with fix suggestions, keeps them in a JSON log and serves them to IDE
assistants over the Model Context Protocol.

It is a log-and-suggest sidecar, not a compiler: the DSL itself is never
parsed, validated or edited.

## Architecture

```text
Structurizr Bridge
├── Extractor   - regex extraction of `workspace.dsl: ... at line N of ...`
├── Rules       - ordered substring rules -> {issue, fix}
├── Store       - append-only JSON diagnostic log
├── Browser     - DevTools console watcher (attach or launch)
├── MCP server  - processDslError / getDslErrors / clearDslErrors / fixDslError
└── IDE config  - registers the server with Cursor, Claude Desktop, VS Code
```

## Usage

### CLI
```bash
# MCP server on stdio plus console watcher
structurizr-bridge serve --watch

# Watch a browser started with --remote-debugging-port=9222
structurizr-bridge watch

# Parse one line by hand
structurizr-bridge parse 'workspace.dsl: Unknown relationship at line 3 of /w/workspace.dsl: a -> b'

# Register with Cursor
structurizr-bridge install cursor
```

### Library
```rust
use structurizr_bridge::DslErrorParser;

let parser = DslErrorParser::default();
let diagnostic = parser
    .extract("workspace.dsl: Unknown relationship at line 3 of /w/workspace.dsl: a -> b")
    .unwrap();
assert_eq!(diagnostic.line, 3);
assert!(diagnostic.suggestion.fix.contains("source -> destination"));
```
*/

pub mod browser;
pub mod cli_common;
pub mod configuration;
pub mod core;
pub mod diagnostics;
pub mod extractor;
pub mod ide_config;
pub mod mcp_server;
pub mod rules;
pub mod store;

// Re-export main types for convenience
pub use browser::{ConsoleEvent, ConsoleWatcher};
pub use configuration::BridgeConfig;
pub use core::{BrowserError, IdeConfigError, ParseFailure, StoreError};
pub use diagnostics::{Diagnostic, Suggestion};
pub use extractor::{DslErrorParser, ErrorExtractor, ErrorLocation, RegexExtractor};
pub use mcp_server::{DslErrorBridge, McpServer};
pub use rules::{BuiltinRules, RulePredicate, SuggestionMatcher, SuggestionRule};
pub use store::DiagnosticLog;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_functionality() {
        let parser = DslErrorParser::default();
        assert!(parser.extract("").is_err());
    }

    #[test]
    fn test_default_matcher_has_builtin_rules() {
        let matcher = SuggestionMatcher::default();
        assert_eq!(matcher.rules().len(), BuiltinRules::get_all_rules().len());
    }
}
