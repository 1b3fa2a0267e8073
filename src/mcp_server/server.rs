/// MCP сервер для ошибок Structurizr DSL
///
/// Реализован через простой JSON-RPC протокол (одно сообщение на строку)
/// без внешних MCP библиотек.
///
/// Поддерживает:
/// - Инициализацию протокола и ping
/// - Получение списка инструментов
/// - Вызов processDslError, getDslErrors, clearDslErrors, fixDslError
use anyhow::Result;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::mcp_server::analyzer::DslErrorBridge;
use crate::mcp_server::tools::{
    self, CLEAR_DSL_ERRORS, FIX_DSL_ERROR, GET_DSL_ERRORS, PROCESS_DSL_ERROR,
};
use crate::mcp_server::types::{
    JsonRpcRequest, JsonRpcResponse, McpError, McpResult, DEFAULT_PROTOCOL_VERSION,
};

pub const SERVER_NAME: &str = "structurizr-bridge";

#[derive(Debug, Clone)]
pub struct McpServer {
    bridge: DslErrorBridge,
}

impl McpServer {
    pub fn new(bridge: DslErrorBridge) -> Self {
        Self { bridge }
    }

    pub fn bridge(&self) -> &DslErrorBridge {
        &self.bridge
    }

    /// Handles one raw line; `None` when nothing must be written back
    pub fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle_request(request),
            Err(e) => {
                tracing::warn!("Failed to parse request: {}", e);
                Some(JsonRpcResponse::failure(
                    Value::Null,
                    &McpError::Parse(e.to_string()),
                ))
            }
        }
    }

    /// Dispatches a request; notifications never get a response
    pub fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let notification = request.is_notification();
        let id = request.id.clone().unwrap_or(Value::Null);

        if request.jsonrpc != "2.0" {
            let err = McpError::InvalidRequest(format!(
                "unsupported jsonrpc version '{}'",
                request.jsonrpc
            ));
            return (!notification).then(|| JsonRpcResponse::failure(id, &err));
        }

        let outcome = self.dispatch(&request.method, request.params.as_ref());
        if notification {
            if let Err(e) = outcome {
                tracing::debug!("Notification {} ignored: {}", request.method, e);
            }
            return None;
        }

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => {
                tracing::debug!("Request {} failed: {}", request.method, e);
                JsonRpcResponse::failure(id, &e)
            }
        })
    }

    fn dispatch(&self, method: &str, params: Option<&Value>) -> McpResult<Value> {
        match method {
            "initialize" => {
                let requested = params
                    .and_then(|p| p.get("protocolVersion"))
                    .and_then(|v| v.as_str())
                    .unwrap_or(DEFAULT_PROTOCOL_VERSION);
                Ok(json!({
                    "protocolVersion": requested,
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION")
                    },
                    "capabilities": {
                        "tools": {}
                    }
                }))
            }
            "notifications/initialized" | "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tools::tool_definitions() })),
            "tools/call" => self.call_tool(params),
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }

    fn call_tool(&self, params: Option<&Value>) -> McpResult<Value> {
        let params =
            params.ok_or_else(|| McpError::InvalidParameter("missing params".to_string()))?;
        let tool_name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| McpError::InvalidParameter("missing tool name".to_string()))?;
        let args = params.get("arguments");

        tracing::info!("Tool call: {}", tool_name);

        let output = match tool_name {
            PROCESS_DSL_ERROR => self.bridge.process_dsl_error(tools::parse_args(args)?),
            GET_DSL_ERRORS => self.bridge.get_dsl_errors(tools::parse_args(args)?)?,
            CLEAR_DSL_ERRORS => self.bridge.clear_dsl_errors(tools::parse_args(args)?),
            FIX_DSL_ERROR => self.bridge.fix_dsl_error(tools::parse_args(args)?)?,
            other => return Err(McpError::UnknownTool(other.to_string())),
        };
        Ok(output.into_value())
    }

    /// Serves requests from stdin until EOF
    pub async fn run(&self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serves line-delimited JSON-RPC from `reader` to `writer` until EOF
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            let n = reader.read_line(&mut line).await?;
            if n == 0 {
                break; // EOF
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            tracing::debug!("Received: {}", line);

            if let Some(response) = self.handle_line(line) {
                let response_str = serde_json::to_string(&response)?;
                writer.write_all(response_str.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
                tracing::debug!("Sent: {}", response_str);
            }
        }

        tracing::info!("stdin closed, MCP server stopping");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::DslErrorParser;
    use crate::store::DiagnosticLog;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn server(dir: &TempDir) -> McpServer {
        let log = Arc::new(DiagnosticLog::new(dir.path().join("log.json")));
        McpServer::new(DslErrorBridge::new(DslErrorParser::default(), log, 10))
    }

    fn call(server: &McpServer, line: &str) -> Value {
        let response = server.handle_line(line).expect("response expected");
        serde_json::to_value(response).unwrap()
    }

    #[test]
    fn test_initialize_echoes_protocol_version() {
        let dir = TempDir::new().unwrap();
        let resp = call(
            &server(&dir),
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26"}}"#,
        );
        assert_eq!(resp["result"]["protocolVersion"], "2025-03-26");
        assert_eq!(resp["result"]["serverInfo"]["name"], SERVER_NAME);
    }

    #[test]
    fn test_notification_gets_no_response() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);
        assert!(server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .is_none());
    }

    #[test]
    fn test_null_id_request_is_answered() {
        let dir = TempDir::new().unwrap();
        let resp = call(&server(&dir), r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#);
        assert!(resp["id"].is_null());
        assert_eq!(resp["result"], json!({}));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let resp = call(&server(&dir), "{not json");
        assert_eq!(resp["error"]["code"], -32700);
        assert!(resp["id"].is_null());
    }

    #[test]
    fn test_unknown_method_and_tool() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);

        let resp = call(&server, r#"{"jsonrpc":"2.0","id":2,"method":"resources/list"}"#);
        assert_eq!(resp["error"]["code"], -32601);

        let resp = call(
            &server,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"editFile","arguments":{}}}"#,
        );
        assert_eq!(resp["error"]["code"], -32602);
    }

    #[test]
    fn test_get_dsl_errors_count_out_of_range() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);
        for count in ["0", "101", "-4"] {
            let line = format!(
                r#"{{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{{"name":"getDslErrors","arguments":{{"count":{}}}}}}}"#,
                count
            );
            let resp = call(&server, &line);
            assert_eq!(resp["error"]["code"], -32602, "count {}", count);
        }
    }

    #[tokio::test]
    async fn test_serve_over_buffers() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
            "\n"
        );
        let mut output = Vec::new();

        server.serve(input.as_bytes(), &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["result"]["tools"].as_array().unwrap().len(), 4);
        assert_eq!(lines[1]["id"], 2);
    }
}
