//! Minimal Chrome DevTools Protocol client: target discovery over HTTP and a
//! websocket session that yields console events.

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::ConsoleEvent;
use crate::core::BrowserError;

/// Entry of `/json/list`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub target_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub web_socket_debugger_url: Option<String>,
}

/// Lists DevTools targets at `endpoint` (`http://host:port`)
pub async fn list_targets(
    client: &reqwest::Client,
    endpoint: &str,
) -> Result<Vec<TargetInfo>, BrowserError> {
    let discovery = |source| BrowserError::Discovery {
        endpoint: endpoint.to_string(),
        source,
    };

    client
        .get(format!("{}/json/list", endpoint))
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(discovery)?
        .json::<Vec<TargetInfo>>()
        .await
        .map_err(discovery)
}

/// True once `/json/version` answers successfully
pub async fn is_endpoint_ready(client: &reqwest::Client, endpoint: &str) -> bool {
    match client.get(format!("{}/json/version", endpoint)).send().await {
        Ok(resp) => resp.status().is_success(),
        Err(_) => false,
    }
}

/// Picks the page showing Structurizr, falling back to the first page.
pub fn select_page_target<'a>(
    targets: &'a [TargetInfo],
    url_prefix: &str,
) -> Option<&'a TargetInfo> {
    let pages = || {
        targets
            .iter()
            .filter(|t| t.target_type == "page" && t.web_socket_debugger_url.is_some())
    };
    pages()
        .find(|t| !url_prefix.is_empty() && t.url.starts_with(url_prefix))
        .or_else(|| pages().next())
}

/// Maps a raw CDP event to a console event, ignoring everything else.
///
/// Handles `Runtime.consoleAPICalled`, `Log.entryAdded` and
/// `Runtime.exceptionThrown` (reported with level `error`).
pub fn console_event_from_message(message: &Value) -> Option<ConsoleEvent> {
    let method = message.get("method")?.as_str()?;
    let params = message.get("params")?;

    match method {
        "Runtime.consoleAPICalled" => {
            let level = params.get("type")?.as_str()?;
            let text = params
                .get("args")
                .and_then(|a| a.as_array())
                .map(|args| {
                    args.iter()
                        .filter_map(remote_object_text)
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default();
            Some(ConsoleEvent::new(level, text))
        }
        "Log.entryAdded" => {
            let entry = params.get("entry")?;
            Some(ConsoleEvent::new(
                entry.get("level")?.as_str()?,
                entry.get("text")?.as_str()?,
            ))
        }
        "Runtime.exceptionThrown" => {
            let details = params.get("exceptionDetails")?;
            let text = details
                .get("exception")
                .and_then(|e| e.get("description"))
                .and_then(|d| d.as_str())
                .or_else(|| details.get("text").and_then(|t| t.as_str()))?;
            Some(ConsoleEvent::new("error", text))
        }
        _ => None,
    }
}

fn remote_object_text(arg: &Value) -> Option<String> {
    match arg.get("value") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) | None => arg
            .get("description")
            .and_then(|d| d.as_str())
            .map(str::to_string),
        Some(other) => Some(other.to_string()),
    }
}

/// Parses one text frame, logging and dropping anything that is not JSON
pub fn decode_frame(text: &str) -> Option<Value> {
    match serde_json::from_str(text) {
        Ok(message) => Some(message),
        Err(e) => {
            tracing::debug!("Skipping malformed DevTools frame ({}): {:.200}", e, text);
            None
        }
    }
}

/// Websocket session attached to one page target
pub struct CdpSession {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_id: u64,
}

impl CdpSession {
    pub async fn connect(ws_url: &str) -> Result<Self, BrowserError> {
        url::Url::parse(ws_url)?;
        let (ws, _) = connect_async(ws_url).await?;
        tracing::debug!("Connected to DevTools target {}", ws_url);
        Ok(Self { ws, next_id: 1 })
    }

    /// Sends a command without waiting for its reply
    pub async fn send_command(&mut self, method: &str, params: Value) -> Result<u64, BrowserError> {
        let id = self.next_id;
        self.next_id += 1;
        let payload = json!({ "id": id, "method": method, "params": params });
        self.ws.send(Message::Text(payload.to_string().into())).await?;
        Ok(id)
    }

    /// Enables the domains that report console output
    pub async fn enable_console(&mut self) -> Result<(), BrowserError> {
        self.send_command("Runtime.enable", json!({})).await?;
        self.send_command("Log.enable", json!({})).await?;
        Ok(())
    }

    /// Next JSON message; `None` once the browser closes the socket
    ///
    /// Text frames that are not JSON are skipped.
    pub async fn next_message(&mut self) -> Result<Option<Value>, BrowserError> {
        while let Some(frame) = self.ws.next().await {
            match frame? {
                Message::Text(text) => {
                    if let Some(message) = decode_frame(text.as_str()) {
                        return Ok(Some(message));
                    }
                }
                Message::Close(_) => return Ok(None),
                // ping/pong are answered by tungstenite
                _ => continue,
            }
        }
        Ok(None)
    }
}
