/*!
# Suggestion Rules

Ordered, substring-based classifier that maps a DSL error message and its
context to a human-readable `{issue, fix}` pair.

The rule list is explicit data handed to [`SuggestionMatcher::new`]: rules are
evaluated in order, the first matching rule wins, and the fallback is returned
when nothing matches. Custom rules from the configuration file are appended
after the built-in ones, so the ordering stays auditable by reading
`BuiltinRules::get_all_rules()` followed by the config file.

## Usage

```rust
use structurizr_bridge::rules::SuggestionMatcher;

let matcher = SuggestionMatcher::default();
let suggestion = matcher.suggest("Unknown relationship", "a -> b");
assert!(suggestion.fix.contains("source -> destination"));
```

## Configuration Example

```toml
[rules]
builtin = true

[[rules.custom]]
id = "missing-brace"
issue = "A block is not closed"
fix = "Add the closing `}` for the block that starts on the reported line"
when = { message_contains = "Expected }" }

[[rules.custom]]
id = "deployment-node"
issue = "Deployment node syntax is incorrect"
fix = "Use `deploymentNode <name> [description] [technology] { ... }`"
when = { all = [{ message_contains = "Unexpected tokens" }, { context_contains = "deploymentNode" }] }
```
*/

pub mod builtin;
pub mod config;

pub use builtin::BuiltinRules;
pub use config::{CustomRuleConfig, RulesConfig};

use crate::diagnostics::Suggestion;
use serde::{Deserialize, Serialize};

/// Cheap substring predicate over `(message, context)`.
///
/// `All([])` is always true and `Any([])` is always false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulePredicate {
    MessageContains(String),
    ContextContains(String),
    /// Matches when either the message or the context contains the needle
    EitherContains(String),
    All(Vec<RulePredicate>),
    Any(Vec<RulePredicate>),
}

impl RulePredicate {
    pub fn matches(&self, message: &str, context: &str) -> bool {
        match self {
            RulePredicate::MessageContains(needle) => message.contains(needle.as_str()),
            RulePredicate::ContextContains(needle) => context.contains(needle.as_str()),
            RulePredicate::EitherContains(needle) => {
                message.contains(needle.as_str()) || context.contains(needle.as_str())
            }
            RulePredicate::All(preds) => preds.iter().all(|p| p.matches(message, context)),
            RulePredicate::Any(preds) => preds.iter().any(|p| p.matches(message, context)),
        }
    }
}

/// A `(predicate, suggestion)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRule {
    /// Rule identifier (e.g., "dynamic-view-declaration")
    pub id: String,
    pub when: RulePredicate,
    pub suggestion: Suggestion,
}

impl SuggestionRule {
    pub fn new(id: impl Into<String>, when: RulePredicate, suggestion: Suggestion) -> Self {
        Self {
            id: id.into(),
            when,
            suggestion,
        }
    }
}

/// First-match-wins evaluator over an ordered rule list.
#[derive(Debug, Clone)]
pub struct SuggestionMatcher {
    rules: Vec<SuggestionRule>,
    fallback: Suggestion,
}

impl SuggestionMatcher {
    pub fn new(rules: Vec<SuggestionRule>, fallback: Suggestion) -> Self {
        Self { rules, fallback }
    }

    /// Builds the matcher described by a rules configuration.
    pub fn from_config(config: &RulesConfig) -> Self {
        let mut rules = if config.builtin {
            BuiltinRules::get_all_rules()
        } else {
            Vec::new()
        };
        rules.extend(
            config
                .custom
                .iter()
                .filter(|r| r.enabled)
                .map(CustomRuleConfig::to_rule),
        );

        let fallback = config
            .fallback
            .clone()
            .unwrap_or_else(BuiltinRules::fallback);

        tracing::debug!("Suggestion matcher built with {} rules", rules.len());
        Self::new(rules, fallback)
    }

    /// Returns the suggestion of the first matching rule, or the fallback.
    pub fn suggest(&self, message: &str, context: &str) -> &Suggestion {
        self.matching_rule(message, context)
            .map(|rule| &rule.suggestion)
            .unwrap_or(&self.fallback)
    }

    /// The first rule whose predicate matches, if any.
    pub fn matching_rule(&self, message: &str, context: &str) -> Option<&SuggestionRule> {
        self.rules.iter().find(|rule| rule.when.matches(message, context))
    }

    pub fn rules(&self) -> &[SuggestionRule] {
        &self.rules
    }

    pub fn fallback(&self) -> &Suggestion {
        &self.fallback
    }
}

impl Default for SuggestionMatcher {
    fn default() -> Self {
        Self::new(BuiltinRules::get_all_rules(), BuiltinRules::fallback())
    }
}
