/*!
# Builtin Suggestion Rules

The error shapes the Structurizr DSL parser is known to emit, in evaluation
order. New rules go at the end of the list, before the fallback.
*/

use super::{RulePredicate, SuggestionRule};
use crate::diagnostics::Suggestion;

/// Reference page the fallback points to.
pub const DSL_REFERENCE_URL: &str = "https://docs.structurizr.com/dsl/language";

/// Built-in suggestion rules
pub struct BuiltinRules;

impl BuiltinRules {
    /// Get all builtin rules in evaluation order
    pub fn get_all_rules() -> Vec<SuggestionRule> {
        vec![
            // Dynamic view declared without scope or key
            SuggestionRule::new(
                "dynamic-view-declaration",
                RulePredicate::All(vec![
                    RulePredicate::MessageContains("Unexpected tokens".to_string()),
                    RulePredicate::ContextContains("dynamic".to_string()),
                ]),
                Suggestion::new(
                    "The dynamic view syntax is incorrect",
                    "Declare dynamic views as `dynamic <container or component identifier> <key> { ... }`: \
                     the scope identifier comes first and the view key second, \
                     e.g. `dynamic apiApplication \"ErrorHandlingFlow\" { ... }`",
                ),
            ),
            // Relationship between unknown or misspelled elements
            SuggestionRule::new(
                "relationship-syntax",
                RulePredicate::Any(vec![
                    RulePredicate::MessageContains("Unknown relationship".to_string()),
                    RulePredicate::EitherContains("relationship".to_string()),
                ]),
                Suggestion::new(
                    "The relationship syntax is incorrect or refers to an unknown element",
                    "Declare relationships as `source -> destination \"description\"`, \
                     where source and destination are identifiers defined in the model",
                ),
            ),
        ]
    }

    /// Generic suggestion returned when no rule matches
    pub fn fallback() -> Suggestion {
        Suggestion::new(
            "Structurizr DSL syntax error",
            format!(
                "Check the statement on the reported line against the Structurizr DSL language reference: {}",
                DSL_REFERENCE_URL
            ),
        )
    }
}
