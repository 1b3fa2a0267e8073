/// MCP сервер для ошибок Structurizr DSL
///
/// Отдельный бинарник для IDE, которые запускают сервер без аргументов.
/// Настраивается через переменные окружения:
/// - STRUCTURIZR_BRIDGE_CONFIG: файл конфигурации (TOML/YAML)
/// - STRUCTURIZR_BRIDGE_LOG: файл журнала диагностик
/// - STRUCTURIZR_BRIDGE_WATCH=1: наблюдать за консолью браузера
///
/// Для запуска: cargo run --bin structurizr-mcp-server
use anyhow::Result;
use std::env;
use std::path::PathBuf;

use structurizr_bridge::{BridgeConfig, ConsoleWatcher, DslErrorBridge, McpServer};

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging to stderr
    structurizr_bridge::cli_common::init_logging(tracing::Level::INFO)?;

    let config_path = env::var("STRUCTURIZR_BRIDGE_CONFIG").ok().map(PathBuf::from);
    let config = BridgeConfig::load(config_path.as_deref())?;
    let watch = matches!(
        env::var("STRUCTURIZR_BRIDGE_WATCH").as_deref(),
        Ok("1") | Ok("true")
    );

    tracing::info!(
        "Starting Structurizr MCP server (log: {}, watch: {})",
        config.log.path.display(),
        watch
    );

    let bridge = DslErrorBridge::from_config(&config);

    if watch {
        let mut watcher = ConsoleWatcher::new(
            config.browser.clone(),
            bridge.shared_parser(),
            bridge.shared_log(),
        );
        tokio::spawn(async move {
            if let Err(e) = watcher.run(true).await {
                tracing::error!("Console watcher stopped: {}", e);
            }
        });
    }

    McpServer::new(bridge).run().await
}
