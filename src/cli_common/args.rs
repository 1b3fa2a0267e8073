//! Общие аргументы командной строки

use clap::Parser;
use std::path::PathBuf;

use crate::configuration::BridgeConfig;

/// Общие аргументы для всех команд
#[derive(Parser, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Configuration file (TOML or YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Diagnostic log file (overrides config and STRUCTURIZR_BRIDGE_LOG)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl CommonArgs {
    /// Определяет уровень логирования на основе флагов
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Config file, environment, then these flags
    pub fn load_config(&self) -> anyhow::Result<BridgeConfig> {
        let mut config = BridgeConfig::load(self.config.as_deref())?;
        if let Some(path) = &self.log_file {
            config.log.path = path.clone();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        let args = CommonArgs {
            quiet: true,
            verbose: true,
            ..CommonArgs::default()
        };
        assert_eq!(args.log_level(), tracing::Level::ERROR);

        let args = CommonArgs {
            verbose: true,
            ..CommonArgs::default()
        };
        assert_eq!(args.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_log_file_flag_overrides_config() {
        let args = CommonArgs {
            log_file: Some(PathBuf::from("/tmp/custom.json")),
            ..CommonArgs::default()
        };
        let config = args.load_config().unwrap();
        assert_eq!(config.log.path, PathBuf::from("/tmp/custom.json"));
    }
}
