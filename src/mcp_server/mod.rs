/// <module>
///   <name>mcp_server</name>
///   <purpose>Model Context Protocol server for Structurizr DSL diagnostics</purpose>
///   <description>
///     Exposes processDslError, getDslErrors, clearDslErrors and fixDslError
///     to IDE assistants over line-delimited JSON-RPC on stdio.
///   </description>
/// </module>
mod analyzer;
mod server;
mod tools;
mod types;

pub use analyzer::DslErrorBridge;
pub use server::{McpServer, SERVER_NAME};
pub use tools::{
    tool_definitions, ClearDslErrorsArgs, FixDslErrorArgs, GetDslErrorsArgs, ProcessDslErrorArgs,
    CLEAR_DSL_ERRORS, FIX_DSL_ERROR, GET_DSL_ERRORS, PROCESS_DSL_ERROR,
};
pub use types::{JsonRpcRequest, JsonRpcResponse, McpError, McpResult, ToolOutput};
