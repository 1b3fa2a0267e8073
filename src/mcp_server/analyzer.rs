/// <module>
///   <name>analyzer</name>
///   <purpose>Состояние MCP сервера: парсер ошибок DSL и журнал диагностик</purpose>
/// </module>
use std::sync::Arc;

use crate::configuration::BridgeConfig;
use crate::extractor::DslErrorParser;
use crate::mcp_server::tools::{
    self, ClearDslErrorsArgs, FixDslErrorArgs, GetDslErrorsArgs, ProcessDslErrorArgs,
};
use crate::mcp_server::types::{McpResult, ToolOutput};
use crate::rules::SuggestionMatcher;
use crate::store::{DiagnosticLog, MAX_RECENT_LIMIT};

/// <type>
///   <name>DslErrorBridge</name>
///   <purpose>Общая точка входа для инструментов MCP</purpose>
///   <description>
///     Держит парсер ошибок и журнал диагностик. Журнал разделяется с
///     наблюдателем консоли браузера через Arc.
///   </description>
/// </type>
#[derive(Debug, Clone)]
pub struct DslErrorBridge {
    parser: Arc<DslErrorParser>,
    log: Arc<DiagnosticLog>,
    default_recent: usize,
}

impl DslErrorBridge {
    /// `default_recent` is clamped to the `getDslErrors` count range
    pub fn new(parser: DslErrorParser, log: Arc<DiagnosticLog>, default_recent: usize) -> Self {
        Self {
            parser: Arc::new(parser),
            log,
            default_recent: default_recent.clamp(1, MAX_RECENT_LIMIT),
        }
    }

    /// Builds the parser and log described by `config`
    pub fn from_config(config: &BridgeConfig) -> Self {
        let matcher = SuggestionMatcher::from_config(&config.rules);
        Self::new(
            DslErrorParser::new(matcher),
            Arc::new(config.open_log()),
            config.log.default_recent,
        )
    }

    pub fn parser(&self) -> &DslErrorParser {
        &self.parser
    }

    pub fn log(&self) -> &DiagnosticLog {
        &self.log
    }

    /// Shared handle for the console watcher
    pub fn shared_log(&self) -> Arc<DiagnosticLog> {
        Arc::clone(&self.log)
    }

    pub fn shared_parser(&self) -> Arc<DslErrorParser> {
        Arc::clone(&self.parser)
    }

    pub fn default_recent(&self) -> usize {
        self.default_recent
    }
}

// Методы для MCP интеграции
impl DslErrorBridge {
    /// <tool>
    ///   <name>processDslError</name>
    ///   <description>Разбирает текст ошибки, сохраняет диагностику</description>
    /// </tool>
    pub fn process_dsl_error(&self, args: ProcessDslErrorArgs) -> ToolOutput {
        tools::process_dsl_error_impl(self, args)
    }

    /// <tool>
    ///   <name>getDslErrors</name>
    ///   <description>Последние N диагностик (1..100, по умолчанию 10)</description>
    /// </tool>
    pub fn get_dsl_errors(&self, args: GetDslErrorsArgs) -> McpResult<ToolOutput> {
        tools::get_dsl_errors_impl(self, args)
    }

    /// <tool>
    ///   <name>clearDslErrors</name>
    ///   <description>Очищает журнал</description>
    /// </tool>
    pub fn clear_dsl_errors(&self, args: ClearDslErrorsArgs) -> ToolOutput {
        tools::clear_dsl_errors_impl(self, args)
    }

    /// <tool>
    ///   <name>fixDslError</name>
    ///   <description>Рекомендация по исправлению строки; файлы не изменяются</description>
    /// </tool>
    pub fn fix_dsl_error(&self, args: FixDslErrorArgs) -> McpResult<ToolOutput> {
        tools::fix_dsl_error_impl(self, args)
    }
}
