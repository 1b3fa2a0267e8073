/// <module>
///   <name>types</name>
///   <purpose>JSON-RPC и MCP типы данных для сервера</purpose>
/// </module>
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// MCP protocol revision announced when the client does not ask for one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// <type>
///   <name>McpResult</name>
///   <purpose>Результат выполнения MCP операций</purpose>
/// </type>
pub type McpResult<T> = Result<T, McpError>;

/// <type>
///   <name>McpError</name>
///   <purpose>Ошибки протокола, возвращаемые клиенту как JSON-RPC error</purpose>
/// </type>
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum McpError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl McpError {
    /// JSON-RPC 2.0 error code
    pub fn code(&self) -> i32 {
        match self {
            McpError::Parse(_) => -32700,
            McpError::InvalidRequest(_) => -32600,
            McpError::MethodNotFound(_) => -32601,
            McpError::UnknownTool(_) | McpError::InvalidParameter(_) => -32602,
            McpError::Internal(_) => -32603,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    /// Absent for notifications; an explicit `null` is `Some(Value::Null)`
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<Value>,
}

// Вызывается только когда поле присутствует, иначе срабатывает default
fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(id: Value, error: &McpError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code: error.code(),
                message: error.to_string(),
                data: None,
            }),
            id,
        }
    }
}

/// <type>
///   <name>ToolOutput</name>
///   <purpose>Текстовый результат вызова инструмента (tools/call)</purpose>
/// </type>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }

    pub fn into_value(self) -> Value {
        json!({
            "content": [{
                "type": "text",
                "text": self.text
            }],
            "isError": self.is_error
        })
    }
}
