/*!
# Rules Configuration

The `[rules]` section of the bridge configuration: toggles the built-in
rules, adds custom rules and optionally replaces the fallback suggestion.
*/

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{RulePredicate, SuggestionRule};
use crate::diagnostics::Suggestion;

/// User-defined rule as written in the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomRuleConfig {
    /// Rule identifier
    pub id: String,

    /// Whether the rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    pub issue: String,

    pub fix: String,

    /// Predicate over the error message and context
    pub when: RulePredicate,
}

impl CustomRuleConfig {
    pub fn to_rule(&self) -> SuggestionRule {
        SuggestionRule::new(
            self.id.clone(),
            self.when.clone(),
            Suggestion::new(self.issue.clone(), self.fix.clone()),
        )
    }
}

fn default_true() -> bool {
    true
}

/// Rules section of the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Evaluate the built-in rules before the custom ones
    #[serde(default = "default_true")]
    pub builtin: bool,

    #[serde(default)]
    pub custom: Vec<CustomRuleConfig>,

    /// Replacement for the generic fallback suggestion
    #[serde(default)]
    pub fallback: Option<Suggestion>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            custom: Vec::new(),
            fallback: None,
        }
    }
}

impl RulesConfig {
    /// Validate rules, returning non-fatal warnings
    pub fn validate(&self) -> Result<Vec<String>> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for rule in &self.custom {
            if !seen.insert(rule.id.as_str()) {
                warnings.push(format!("Duplicate custom rule id '{}'", rule.id));
            }
            if has_empty_needle(&rule.when) {
                warnings.push(format!(
                    "Custom rule '{}' has an empty substring and matches every error",
                    rule.id
                ));
            }
            if rule.fix.trim().is_empty() {
                warnings.push(format!("Custom rule '{}' has an empty fix", rule.id));
            }
        }

        if !self.builtin && self.custom.is_empty() {
            warnings.push("No suggestion rules enabled; every error gets the fallback".to_string());
        }

        Ok(warnings)
    }
}

fn has_empty_needle(pred: &RulePredicate) -> bool {
    match pred {
        RulePredicate::MessageContains(s)
        | RulePredicate::ContextContains(s)
        | RulePredicate::EitherContains(s) => s.is_empty(),
        RulePredicate::All(preds) | RulePredicate::Any(preds) => {
            preds.iter().any(has_empty_needle)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_custom_rules_from_toml() {
        let toml_text = r#"
builtin = false

[[custom]]
id = "deployment-node"
issue = "Deployment node syntax is incorrect"
fix = "Use deploymentNode <name> { ... }"
when = { all = [{ message_contains = "Unexpected tokens" }, { context_contains = "deploymentNode" }] }

[fallback]
issue = "Syntax error"
fix = "See the docs"
"#;
        let config: RulesConfig = toml::from_str(toml_text).unwrap();

        assert!(!config.builtin);
        assert_eq!(config.custom.len(), 1);
        assert!(config.custom[0].enabled);
        assert_eq!(
            config.custom[0].when,
            RulePredicate::All(vec![
                RulePredicate::MessageContains("Unexpected tokens".to_string()),
                RulePredicate::ContextContains("deploymentNode".to_string()),
            ])
        );
        assert_eq!(config.fallback.unwrap().issue, "Syntax error");
    }

    #[test]
    fn test_default_config_has_no_warnings() {
        assert!(RulesConfig::default().validate().unwrap().is_empty());
    }

    #[test]
    fn test_validation_warnings() {
        let rule = CustomRuleConfig {
            id: "dup".to_string(),
            enabled: true,
            issue: "i".to_string(),
            fix: "f".to_string(),
            when: RulePredicate::Any(vec![RulePredicate::MessageContains(String::new())]),
        };
        let config = RulesConfig {
            builtin: true,
            custom: vec![rule.clone(), rule],
            fallback: None,
        };

        let warnings = config.validate().unwrap();
        assert!(warnings.iter().any(|w| w.contains("Duplicate")));
        assert!(warnings.iter().any(|w| w.contains("empty substring")));
    }
}
