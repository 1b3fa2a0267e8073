/*!
# IDE Configuration

Registers the MCP server in an IDE assistant's configuration file. The merge
touches exactly one entry under the server table and preserves everything
else in the file.
*/

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::{read_text_file, write_atomic, IdeConfigError};

/// Supported IDE integrations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdeTarget {
    Cursor,
    ClaudeDesktop,
    Vscode,
}

impl IdeTarget {
    /// Key holding the server table
    pub fn servers_key(&self) -> &'static str {
        match self {
            IdeTarget::Vscode => "servers",
            IdeTarget::Cursor | IdeTarget::ClaudeDesktop => "mcpServers",
        }
    }

    /// Default configuration file for the target
    pub fn default_path(&self) -> Result<PathBuf, IdeConfigError> {
        match self {
            IdeTarget::Cursor => dirs::home_dir()
                .map(|home| home.join(".cursor").join("mcp.json"))
                .ok_or(IdeConfigError::UnknownLocation("Cursor")),
            IdeTarget::ClaudeDesktop => dirs::config_dir()
                .map(|dir| dir.join("Claude").join("claude_desktop_config.json"))
                .ok_or(IdeConfigError::UnknownLocation("Claude Desktop")),
            IdeTarget::Vscode => Ok(PathBuf::from(".vscode").join("mcp.json")),
        }
    }
}

impl FromStr for IdeTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cursor" => Ok(IdeTarget::Cursor),
            "claude" | "claude-desktop" => Ok(IdeTarget::ClaudeDesktop),
            "vscode" | "code" => Ok(IdeTarget::Vscode),
            _ => Err(format!(
                "Unknown IDE target: {} (expected cursor, claude-desktop or vscode)",
                s
            )),
        }
    }
}

impl fmt::Display for IdeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdeTarget::Cursor => write!(f, "cursor"),
            IdeTarget::ClaudeDesktop => write!(f, "claude-desktop"),
            IdeTarget::Vscode => write!(f, "vscode"),
        }
    }
}

/// One stdio server launch entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerEntry {
    pub command: String,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

/// Inserts or replaces `name` under `servers_key` in the JSON file at `path`.
///
/// A missing file is created. A file that is not a JSON object is left
/// untouched and reported as an error.
pub fn merge_server_entry(
    path: &Path,
    servers_key: &str,
    name: &str,
    entry: &ServerEntry,
) -> Result<bool, IdeConfigError> {
    let mut root = read_config(path)?;

    let servers = root
        .entry(servers_key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    let servers = servers
        .as_object_mut()
        .ok_or_else(|| IdeConfigError::NotAnObject {
            path: path.to_path_buf(),
            key: servers_key.to_string(),
        })?;

    let value = serde_json::to_value(entry).map_err(|source| IdeConfigError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })?;
    let replaced = servers.insert(name.to_string(), value).is_some();

    let json = serde_json::to_string_pretty(&Value::Object(root)).map_err(|source| {
        IdeConfigError::InvalidJson {
            path: path.to_path_buf(),
            source,
        }
    })?;
    write_atomic(path, &json).map_err(|source| IdeConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(
        "{} MCP server '{}' in {}",
        if replaced { "Updated" } else { "Registered" },
        name,
        path.display()
    );
    Ok(replaced)
}

fn read_config(path: &Path) -> Result<Map<String, Value>, IdeConfigError> {
    let content = match read_text_file(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(source) => {
            return Err(IdeConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(IdeConfigError::NotAnObject {
            path: path.to_path_buf(),
            key: "<root>".to_string(),
        }),
        Err(source) => Err(IdeConfigError::InvalidJson {
            path: path.to_path_buf(),
            source,
        }),
    }
}
