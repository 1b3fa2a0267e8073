/*!
# Structurizr Bridge CLI

Command-line interface for the Structurizr DSL error bridge.
*/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

use structurizr_bridge::cli_common::{self, CommonArgs, OutputFormat, OutputWriter};
use structurizr_bridge::configuration::{BridgeConfig, ENV_LOG_PATH};
use structurizr_bridge::ide_config::{self, IdeTarget, ServerEntry};
use structurizr_bridge::store::remove_log_file;
use structurizr_bridge::{ConsoleWatcher, DslErrorBridge, McpServer};

#[derive(Parser)]
#[command(
    name = "structurizr-bridge",
    version = env!("CARGO_PKG_VERSION"),
    about = "Captures Structurizr DSL syntax errors from the browser console and serves them over MCP"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server on stdio
    Serve {
        /// Also watch the browser console in the same process
        #[arg(long)]
        watch: bool,

        /// Launch a browser when none is listening on the debugging port
        #[arg(long)]
        launch: bool,
    },

    /// Watch the browser console and record DSL errors
    Watch {
        /// Launch a browser when none is listening on the debugging port
        #[arg(long)]
        launch: bool,

        /// Remote debugging port
        #[arg(short, long)]
        port: Option<u16>,

        /// Structurizr URL (page selection and launch URL)
        #[arg(long)]
        url: Option<String>,

        /// Stop when the page closes instead of re-attaching
        #[arg(long)]
        no_reconnect: bool,
    },

    /// Parse one error line and print the diagnostic
    Parse {
        /// Raw error text
        text: String,

        /// Append the diagnostic to the log
        #[arg(long)]
        record: bool,

        /// Output format (text, json)
        #[arg(short = 'f', long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show recorded DSL errors
    List {
        /// Number of most recent errors (defaults to log.default_recent)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Output format (text, json)
        #[arg(short = 'f', long, default_value = "text")]
        format: OutputFormat,
    },

    /// Clear the diagnostic log
    Clear {
        /// Delete the log file instead of emptying it
        #[arg(long)]
        purge: bool,
    },

    /// Register the MCP server in an IDE configuration file
    Install {
        /// cursor, claude-desktop or vscode
        target: IdeTarget,

        /// Configuration file to edit instead of the target's default
        #[arg(long)]
        path: Option<PathBuf>,

        /// Server entry name
        #[arg(long, default_value = "structurizr-dsl")]
        name: String,

        /// Let the installed server watch the browser console
        #[arg(long)]
        watch: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli_common::init_logging(cli.common.log_level())?;

    let mut config = cli.common.load_config()?;

    match cli.command {
        Commands::Serve { watch, launch } => {
            config.browser.launch |= launch;
            serve(config, watch).await
        }
        Commands::Watch {
            launch,
            port,
            url,
            no_reconnect,
        } => {
            config.browser.launch |= launch;
            if let Some(port) = port {
                config.browser.port = port;
            }
            if let Some(url) = url {
                config.browser.structurizr_url = url;
            }
            watch(config, !no_reconnect).await
        }
        Commands::Parse {
            text,
            record,
            format,
        } => parse(&config, &text, record, format),
        Commands::List { count, format } => {
            let log = config.open_log();
            let diagnostics = log.recent(count.unwrap_or(config.log.default_recent));
            OutputWriter::stdout(format).write_diagnostics(&diagnostics)
        }
        Commands::Clear { purge } => {
            if purge {
                remove_log_file(&config.log.path)?;
            } else {
                config.open_log().clear()?;
            }
            cli_common::print_success(&format!("Cleared {}", config.log.path.display()));
            Ok(())
        }
        Commands::Install {
            target,
            path,
            name,
            watch,
        } => install(&cli.common, &config, target, path, &name, watch),
    }
}

async fn serve(config: BridgeConfig, watch: bool) -> Result<()> {
    let bridge = DslErrorBridge::from_config(&config);
    info!(
        "Structurizr MCP server started, log: {}",
        config.log.path.display()
    );

    let watcher_task = watch.then(|| {
        let mut watcher = ConsoleWatcher::new(
            config.browser.clone(),
            bridge.shared_parser(),
            bridge.shared_log(),
        );
        tokio::spawn(async move {
            if let Err(e) = watcher.run(true).await {
                tracing::error!("Console watcher stopped: {}", e);
            }
        })
    });

    let result = McpServer::new(bridge).run().await;

    if let Some(task) = watcher_task {
        task.abort();
    }
    result
}

async fn watch(config: BridgeConfig, reconnect: bool) -> Result<()> {
    let bridge = DslErrorBridge::from_config(&config);
    let mut watcher = ConsoleWatcher::new(
        config.browser.clone(),
        bridge.shared_parser(),
        bridge.shared_log(),
    );

    info!(
        "Watching {} via {}, recording to {}",
        config.browser.structurizr_url,
        config.browser.devtools_endpoint(),
        config.log.path.display()
    );

    tokio::select! {
        result = watcher.run(reconnect) => result.context("Console watcher failed")?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }
    Ok(())
}

fn parse(config: &BridgeConfig, text: &str, record: bool, format: OutputFormat) -> Result<()> {
    let bridge = DslErrorBridge::from_config(config);

    let diagnostic = bridge
        .parser()
        .extract(text)
        .context("Could not parse DSL error")?;

    OutputWriter::stdout(format).write_diagnostic(&diagnostic)?;

    if record {
        bridge.log().append(diagnostic)?;
        info!("Recorded in {}", config.log.path.display());
    }
    Ok(())
}

fn install(
    common: &CommonArgs,
    config: &BridgeConfig,
    target: IdeTarget,
    path: Option<PathBuf>,
    name: &str,
    watch: bool,
) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => target.default_path()?,
    };

    let command = std::env::current_exe().context("Cannot determine the bridge executable")?;

    let mut args = vec!["serve".to_string()];
    if watch {
        args.push("--watch".to_string());
    }
    if let Some(config_path) = &common.config {
        let config_path = std::fs::canonicalize(config_path)
            .with_context(|| format!("Config file {} not found", config_path.display()))?;
        args.push("--config".to_string());
        args.push(config_path.display().to_string());
    }

    // IDE запускает сервер из произвольного каталога, поэтому путь журнала абсолютный
    let log_path = std::path::absolute(&config.log.path)
        .with_context(|| format!("Invalid log path {}", config.log.path.display()))?;
    let mut env = BTreeMap::new();
    env.insert(ENV_LOG_PATH.to_string(), log_path.display().to_string());

    let entry = ServerEntry {
        command: command.display().to_string(),
        args,
        env,
    };

    let replaced = ide_config::merge_server_entry(&path, target.servers_key(), name, &entry)?;
    cli_common::print_success(&format!(
        "{} '{}' for {} in {}",
        if replaced { "Updated" } else { "Registered" },
        name,
        target,
        path.display()
    ));
    Ok(())
}
