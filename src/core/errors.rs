/*!
# Error System for the DSL bridge

Typed failures for every stage of the pipeline: extraction, persistence and
the browser collaborator. Binaries wrap these in `anyhow` with context.
*/

use std::path::PathBuf;
use thiserror::Error;

/// Error text did not have the shape of a Structurizr DSL syntax error.
///
/// Callers treat this as "not a DSL syntax error" and take no action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("text does not match the `workspace.dsl: <message> at line <N> of <file>:<context>` format")]
    UnrecognizedFormat,

    #[error("line number `{0}` is not a positive integer")]
    InvalidLine(String),

    #[error("error message is empty")]
    EmptyMessage,
}

/// Failures of the file-backed diagnostic log.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read diagnostic log {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("diagnostic log {path} is not a JSON array of diagnostics: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize diagnostics: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write diagnostic log {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while attaching to or launching the browser.
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("DevTools endpoint {endpoint} is unreachable: {source}")]
    Discovery {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no page target is open in the browser at {0}")]
    NoPageTarget(String),

    #[error("Chrome/Chromium executable not found; set CHROME_PATH or browser.chrome_path")]
    ExecutableNotFound,

    #[error("failed to launch {path}: {source}")]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("browser did not expose a DevTools endpoint within {0} seconds")]
    LaunchTimeout(u64),

    #[error("invalid DevTools URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("DevTools websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Failures while merging a server entry into an IDE configuration file.
#[derive(Error, Debug)]
pub enum IdeConfigError {
    #[error("cannot determine the configuration directory for {0}")]
    UnknownLocation(&'static str),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid JSON: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: expected `{key}` to be a JSON object")]
    NotAnObject { path: PathBuf, key: String },
}
