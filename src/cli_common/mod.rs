//! Общий модуль для CLI утилит
//!
//! Содержит общую функциональность, используемую обоими бинарниками:
//! - Инициализация логирования (всегда в stderr: stdout занят JSON-RPC)
//! - Общие аргументы
//! - Форматирование вывода

use anyhow::Result;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

pub mod args;
pub mod output;

pub use args::CommonArgs;
pub use output::{OutputFormat, OutputWriter};

/// Инициализирует логирование в stderr без ANSI
pub fn init_logging(level: tracing::Level) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Выводит успешное завершение операции
pub fn print_success(message: &str) {
    println!("{} {}", "✅".green(), message.green());
}
