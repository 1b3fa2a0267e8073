/// <module>
///   <name>tools</name>
///   <purpose>Реализация MCP инструментов для работы с ошибками Structurizr DSL</purpose>
/// </module>
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::mcp_server::analyzer::DslErrorBridge;
use crate::mcp_server::types::{McpError, McpResult, ToolOutput};
use crate::store::MAX_RECENT_LIMIT;

pub const PROCESS_DSL_ERROR: &str = "processDslError";
pub const GET_DSL_ERRORS: &str = "getDslErrors";
pub const CLEAR_DSL_ERRORS: &str = "clearDslErrors";
pub const FIX_DSL_ERROR: &str = "fixDslError";

/// Hard bounds of the `getDslErrors` count argument.
pub const MIN_COUNT: i64 = 1;
pub const MAX_COUNT: i64 = MAX_RECENT_LIMIT as i64;

/// <type>
///   <name>ProcessDslErrorArgs</name>
///   <purpose>Аргументы processDslError</purpose>
/// </type>
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDslErrorArgs {
    /// Raw error text, e.g. `workspace.dsl: <message> at line <N> of <file>: <context>`
    pub error_text: String,
}

/// <type>
///   <name>GetDslErrorsArgs</name>
///   <purpose>Аргументы getDslErrors</purpose>
/// </type>
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetDslErrorsArgs {
    /// Number of most recent errors to return (1-100, default 10)
    #[serde(default)]
    #[schemars(range(min = 1, max = 100))]
    pub count: Option<i64>,
}

/// <type>
///   <name>ClearDslErrorsArgs</name>
///   <purpose>clearDslErrors не принимает аргументов</purpose>
/// </type>
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ClearDslErrorsArgs {}

/// <type>
///   <name>FixDslErrorArgs</name>
///   <purpose>Аргументы fixDslError</purpose>
/// </type>
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FixDslErrorArgs {
    /// 1-based line number of the error in the DSL file
    #[schemars(range(min = 1))]
    pub line: i64,
    /// Suggested replacement or instructions for the line
    pub fix: String,
}

/// Tool list returned by `tools/list`
pub fn tool_definitions() -> Vec<Value> {
    vec![
        tool(
            PROCESS_DSL_ERROR,
            "Parse a Structurizr DSL error message, record it and return the structured diagnostic with a fix suggestion",
            input_schema::<ProcessDslErrorArgs>(),
        ),
        tool(
            GET_DSL_ERRORS,
            "Get the most recent Structurizr DSL errors captured from the browser console",
            input_schema::<GetDslErrorsArgs>(),
        ),
        tool(
            CLEAR_DSL_ERRORS,
            "Clear all recorded Structurizr DSL errors",
            input_schema::<ClearDslErrorsArgs>(),
        ),
        tool(
            FIX_DSL_ERROR,
            "Describe a fix for a DSL error on the given line. Advisory only: no file is modified",
            input_schema::<FixDslErrorArgs>(),
        ),
    ]
}

fn tool(name: &str, description: &str, input_schema: Value) -> Value {
    json!({
        "name": name,
        "description": description,
        "inputSchema": input_schema
    })
}

fn input_schema<T: JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    let mut value = serde_json::to_value(schema).unwrap_or_else(|_| json!({}));
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
        obj.insert("type".to_string(), json!("object"));
    }
    value
}

/// Deserializes tool arguments; a missing object means "no arguments"
pub fn parse_args<T: DeserializeOwned>(arguments: Option<&Value>) -> McpResult<T> {
    let value = match arguments {
        None | Some(Value::Null) => json!({}),
        Some(v) => v.clone(),
    };
    serde_json::from_value(value).map_err(|e| McpError::InvalidParameter(e.to_string()))
}

// Implementation functions for MCP tools

pub fn process_dsl_error_impl(bridge: &DslErrorBridge, args: ProcessDslErrorArgs) -> ToolOutput {
    let diagnostic = match bridge.parser().extract(&args.error_text) {
        Ok(d) => d,
        Err(e) => {
            tracing::debug!("processDslError: {}", e);
            return ToolOutput::error(format!("Could not parse DSL error: {}", e));
        }
    };

    if let Err(e) = bridge.log().append(diagnostic.clone()) {
        tracing::error!("Failed to record diagnostic: {}", e);
        return ToolOutput::error(format!("Diagnostic was parsed but not recorded: {}", e));
    }

    match serde_json::to_string_pretty(&diagnostic) {
        Ok(text) => ToolOutput::text(text),
        Err(e) => ToolOutput::error(format!("Serialization failed: {}", e)),
    }
}

pub fn get_dsl_errors_impl(
    bridge: &DslErrorBridge,
    args: GetDslErrorsArgs,
) -> McpResult<ToolOutput> {
    let count = args.count.unwrap_or(bridge.default_recent() as i64);
    if !(MIN_COUNT..=MAX_COUNT).contains(&count) {
        return Err(McpError::InvalidParameter(format!(
            "count must be between {} and {}, got {}",
            MIN_COUNT, MAX_COUNT, count
        )));
    }

    let diagnostics = bridge.log().recent(count as usize);
    serde_json::to_string_pretty(&diagnostics)
        .map(ToolOutput::text)
        .map_err(|e| McpError::Internal(e.to_string()))
}

pub fn clear_dsl_errors_impl(bridge: &DslErrorBridge, _args: ClearDslErrorsArgs) -> ToolOutput {
    match bridge.log().clear() {
        Ok(()) => ToolOutput::text("All DSL errors cleared"),
        Err(e) => ToolOutput::error(format!("Failed to clear DSL errors: {}", e)),
    }
}

pub fn fix_dsl_error_impl(bridge: &DslErrorBridge, args: FixDslErrorArgs) -> McpResult<ToolOutput> {
    if args.line < 1 || args.line > u32::MAX as i64 {
        return Err(McpError::InvalidParameter(format!(
            "line must be a positive integer, got {}",
            args.line
        )));
    }

    let mut text = format!("Suggested fix for line {}:\n{}\n", args.line, args.fix);

    // Ссылаемся на последнюю зафиксированную ошибку на этой строке, если она есть
    if let Some(known) = bridge
        .log()
        .all()
        .into_iter()
        .rev()
        .find(|d| i64::from(d.line) == args.line)
    {
        text.push_str(&format!(
            "\nRecorded error at {}:{}: {}\n",
            known.file, known.line, known.message
        ));
    }

    text.push_str(
        "\nThe bridge does not modify files. Apply this change to the DSL source manually \
         and reload the Structurizr page to verify it.",
    );
    Ok(ToolOutput::text(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definitions_have_object_schemas() {
        let tools = tool_definitions();
        let names: Vec<_> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(
            names,
            vec![PROCESS_DSL_ERROR, GET_DSL_ERRORS, CLEAR_DSL_ERRORS, FIX_DSL_ERROR]
        );
        for tool in &tools {
            assert_eq!(tool["inputSchema"]["type"], "object");
        }
        assert_eq!(tools[0]["inputSchema"]["required"][0], "errorText");
    }

    #[test]
    fn test_parse_args_defaults() {
        let args: GetDslErrorsArgs = parse_args(None).unwrap();
        assert!(args.count.is_none());

        let args: GetDslErrorsArgs = parse_args(Some(&json!({"count": 5}))).unwrap();
        assert_eq!(args.count, Some(5));
    }

    #[test]
    fn test_parse_args_type_mismatch() {
        let err = parse_args::<GetDslErrorsArgs>(Some(&json!({"count": "ten"}))).unwrap_err();
        assert!(matches!(err, McpError::InvalidParameter(_)));

        let err = parse_args::<ProcessDslErrorArgs>(Some(&json!({}))).unwrap_err();
        assert!(matches!(err, McpError::InvalidParameter(_)));
    }
}
