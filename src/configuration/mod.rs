/*!
# Configuration Management

Bridge configuration loaded in layers: built-in defaults, then a TOML or YAML
file, then environment variables, then command-line flags (applied by the
binaries).

## Configuration Example

```toml
[log]
path = "dsl-errors.json"
default_recent = 10
max_recent = 100

[browser]
host = "127.0.0.1"
port = 9222
structurizr_url = "http://localhost:8080"
launch = true
launch_timeout_secs = 15

[rules]
builtin = true
```

## Environment

| Variable                  | Overrides              |
|---------------------------|------------------------|
| `STRUCTURIZR_BRIDGE_LOG`  | `log.path`             |
| `STRUCTURIZR_URL`         | `browser.structurizr_url` |
| `STRUCTURIZR_DEBUG_PORT`  | `browser.port`         |
| `CHROME_PATH`             | `browser.chrome_path`  |
*/

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::read_text_file;
use crate::rules::RulesConfig;
use crate::store::{DiagnosticLog, DEFAULT_MAX_RECENT, MAX_RECENT_LIMIT};

pub const ENV_LOG_PATH: &str = "STRUCTURIZR_BRIDGE_LOG";
pub const ENV_STRUCTURIZR_URL: &str = "STRUCTURIZR_URL";
pub const ENV_DEBUG_PORT: &str = "STRUCTURIZR_DEBUG_PORT";
pub const ENV_CHROME_PATH: &str = "CHROME_PATH";

/// Diagnostic log settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// JSON file holding the diagnostics
    #[serde(default = "default_log_path")]
    pub path: PathBuf,

    /// `getDslErrors` count when none is given
    #[serde(default = "default_recent")]
    pub default_recent: usize,

    /// Upper bound for `getDslErrors`
    #[serde(default = "default_max_recent")]
    pub max_recent: usize,
}

fn default_log_path() -> PathBuf {
    PathBuf::from("dsl-errors.json")
}

fn default_recent() -> usize {
    10
}

fn default_max_recent() -> usize {
    DEFAULT_MAX_RECENT
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
            default_recent: default_recent(),
            max_recent: default_max_recent(),
        }
    }
}

/// Browser (Chrome DevTools Protocol) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// Remote debugging port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Structurizr web UI; used to pick the page target and as launch URL
    #[serde(default = "default_structurizr_url")]
    pub structurizr_url: String,

    /// Launch a browser when none is listening on `port`
    #[serde(default)]
    pub launch: bool,

    /// Explicit Chrome/Chromium executable
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Launch without a window
    #[serde(default)]
    pub headless: bool,

    #[serde(default = "default_launch_timeout")]
    pub launch_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9222
}

fn default_structurizr_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_launch_timeout() -> u64 {
    15
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            structurizr_url: default_structurizr_url(),
            launch: false,
            chrome_path: None,
            headless: false,
            launch_timeout_secs: default_launch_timeout(),
        }
    }
}

impl BrowserConfig {
    /// `http://host:port`, the DevTools HTTP endpoint
    pub fn devtools_endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub rules: RulesConfig,
}

impl BridgeConfig {
    /// Load configuration from a `.toml`, `.yaml` or `.yml` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = read_text_file(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("toml")
            .to_lowercase();

        let config: Self = match extension.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content).with_context(|| {
                format!("Failed to parse YAML config from {}", path.display())
            })?,
            _ => toml::from_str(&content).with_context(|| {
                format!("Failed to parse TOML config from {}", path.display())
            })?,
        };

        for warning in config.validate()? {
            tracing::warn!("{}: {}", path.display(), warning);
        }
        Ok(config)
    }

    /// Defaults, optional file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from_file(p)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_LOG_PATH).filter(|v| !v.is_empty()) {
            self.log.path = PathBuf::from(path);
        }
        if let Some(url) = lookup(ENV_STRUCTURIZR_URL).filter(|v| !v.is_empty()) {
            self.browser.structurizr_url = url;
        }
        if let Some(port) = lookup(ENV_DEBUG_PORT) {
            match port.parse() {
                Ok(port) => self.browser.port = port,
                Err(_) => tracing::warn!("Ignoring invalid {}={}", ENV_DEBUG_PORT, port),
            }
        }
        if let Some(chrome) = lookup(ENV_CHROME_PATH).filter(|v| !v.is_empty()) {
            self.browser.chrome_path = Some(PathBuf::from(chrome));
        }
    }

    /// Validate configuration; hard errors fail, soft issues are returned
    pub fn validate(&self) -> Result<Vec<String>> {
        if self.log.max_recent == 0 || self.log.max_recent > MAX_RECENT_LIMIT {
            bail!(
                "log.max_recent must be within 1..={} (got {})",
                MAX_RECENT_LIMIT,
                self.log.max_recent
            );
        }
        if self.log.default_recent == 0 || self.log.default_recent > self.log.max_recent {
            bail!(
                "log.default_recent must be within 1..={} (got {})",
                self.log.max_recent,
                self.log.default_recent
            );
        }

        let mut warnings = self.rules.validate()?;
        if url::Url::parse(&self.browser.structurizr_url).is_err() {
            warnings.push(format!(
                "browser.structurizr_url '{}' is not a valid URL",
                self.browser.structurizr_url
            ));
        }
        if self.browser.launch_timeout_secs == 0 {
            warnings.push(
                "browser.launch_timeout_secs is 0; launching will time out immediately".to_string(),
            );
        }
        Ok(warnings)
    }

    /// Opens the diagnostic log described by this configuration
    pub fn open_log(&self) -> DiagnosticLog {
        DiagnosticLog::with_max_recent(&self.log.path, self.log.max_recent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.log.default_recent, 10);
        assert_eq!(config.log.max_recent, 100);
        assert_eq!(config.browser.devtools_endpoint(), "http://127.0.0.1:9222");
        assert!(config.validate().unwrap().is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bridge.toml");
        std::fs::write(&path, "[browser]\nport = 9333\nlaunch = true\n").unwrap();

        let config = BridgeConfig::load_from_file(&path).unwrap();
        assert_eq!(config.browser.port, 9333);
        assert!(config.browser.launch);
        assert_eq!(config.browser.host, "127.0.0.1");
        assert_eq!(config.log.path, PathBuf::from("dsl-errors.json"));
        assert!(config.rules.builtin);
    }

    #[test]
    fn test_yaml_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bridge.yaml");
        std::fs::write(&path, "log:\n  path: /tmp/errors.json\n  max_recent: 20\n").unwrap();

        let config = BridgeConfig::load_from_file(&path).unwrap();
        assert_eq!(config.log.path, PathBuf::from("/tmp/errors.json"));
        assert_eq!(config.log.max_recent, 20);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_LOG_PATH, "/var/tmp/dsl.json"),
            (ENV_DEBUG_PORT, "9500"),
            (ENV_STRUCTURIZR_URL, "http://localhost:9090"),
        ]
        .into_iter()
        .collect();

        let mut config = BridgeConfig::default();
        config.apply_env_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.log.path, PathBuf::from("/var/tmp/dsl.json"));
        assert_eq!(config.browser.port, 9500);
        assert_eq!(config.browser.structurizr_url, "http://localhost:9090");
        assert!(config.browser.chrome_path.is_none());
    }

    #[test]
    fn test_invalid_env_port_is_ignored() {
        let mut config = BridgeConfig::default();
        config.apply_env_from(|key| (key == ENV_DEBUG_PORT).then(|| "not-a-port".to_string()));
        assert_eq!(config.browser.port, 9222);
    }

    #[test]
    fn test_default_recent_above_max_is_rejected() {
        let mut config = BridgeConfig::default();
        config.log.default_recent = 200;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_recent_above_tool_limit_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bridge.toml");
        std::fs::write(&path, "[log]\nmax_recent = 500\ndefault_recent = 200\n").unwrap();

        let err = BridgeConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("log.max_recent must be within 1..=100"));

        let mut config = BridgeConfig::default();
        config.log.max_recent = MAX_RECENT_LIMIT;
        config.log.default_recent = MAX_RECENT_LIMIT;
        assert!(config.validate().is_ok());
    }
}
