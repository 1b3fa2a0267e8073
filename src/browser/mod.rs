/*!
# Browser Console Watcher

Attaches to (or launches) a Chrome-family browser showing the Structurizr web
UI, listens to its console over the DevTools Protocol and records every
Structurizr DSL syntax error in the diagnostic log.

Only `error` level events whose text contains `workspace.dsl` reach the
extractor; text that does not parse is ignored.
*/

pub mod cdp;
pub mod launcher;

use std::sync::Arc;
use std::time::Duration;
use tokio::process::Child;

use crate::configuration::BrowserConfig;
use crate::core::BrowserError;
use crate::diagnostics::Diagnostic;
use crate::extractor::{is_dsl_error_event, DslErrorParser};
use crate::store::DiagnosticLog;

use cdp::CdpSession;

/// Delay between reconnect attempts after the page goes away
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// `(level, text)` pair delivered by the browser console
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleEvent {
    pub level: String,
    pub text: String,
}

impl ConsoleEvent {
    pub fn new(level: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            text: text.into(),
        }
    }
}

/// Connects console events to the parser and the log
pub struct ConsoleWatcher {
    config: BrowserConfig,
    parser: Arc<DslErrorParser>,
    log: Arc<DiagnosticLog>,
    client: reqwest::Client,
    launched: Option<Child>,
}

impl ConsoleWatcher {
    pub fn new(
        config: BrowserConfig,
        parser: Arc<DslErrorParser>,
        log: Arc<DiagnosticLog>,
    ) -> Self {
        Self {
            config,
            parser,
            log,
            client: reqwest::Client::new(),
            launched: None,
        }
    }

    /// Parses and records one console event.
    ///
    /// Returns the diagnostic only when it was written to the log.
    pub fn handle_event(&self, event: &ConsoleEvent) -> Option<Diagnostic> {
        if !is_dsl_error_event(&event.level, &event.text) {
            return None;
        }

        let diagnostic = match self.parser.extract(&event.text) {
            Ok(d) => d,
            Err(e) => {
                tracing::debug!("Console error is not a DSL syntax error ({}): {}", e, event.text);
                return None;
            }
        };

        match self.log.append(diagnostic.clone()) {
            Ok(total) => {
                tracing::info!(
                    "Captured DSL error at {}:{} ({} recorded)",
                    diagnostic.file,
                    diagnostic.line,
                    total
                );
                Some(diagnostic)
            }
            Err(e) => {
                tracing::error!("Failed to record DSL error: {}", e);
                None
            }
        }
    }

    /// Finds the Structurizr page, launching a browser if configured to
    pub async fn attach(&mut self) -> Result<CdpSession, BrowserError> {
        let endpoint = self.config.devtools_endpoint();

        let targets = match cdp::list_targets(&self.client, &endpoint).await {
            Ok(targets) => targets,
            Err(e) if self.config.launch && self.launched.is_none() => {
                tracing::info!("{}; launching a browser", e);
                self.launched = Some(launcher::launch(&self.config, &self.client).await?);
                cdp::list_targets(&self.client, &endpoint).await?
            }
            Err(e) => return Err(e),
        };

        let target = cdp::select_page_target(&targets, &self.config.structurizr_url)
            .ok_or_else(|| BrowserError::NoPageTarget(endpoint.clone()))?;
        let ws_url = target
            .web_socket_debugger_url
            .as_deref()
            .ok_or_else(|| BrowserError::NoPageTarget(endpoint.clone()))?;

        tracing::info!("Attaching to '{}' ({})", target.title, target.url);
        let mut session = CdpSession::connect(ws_url).await?;
        session.enable_console().await?;
        Ok(session)
    }

    /// Processes console events until the page closes
    pub async fn watch_session(&self, mut session: CdpSession) -> Result<usize, BrowserError> {
        let mut captured = 0;
        while let Some(message) = session.next_message().await? {
            if let Some(event) = cdp::console_event_from_message(&message) {
                if self.handle_event(&event).is_some() {
                    captured += 1;
                }
            }
        }
        Ok(captured)
    }

    /// Attaches and watches; with `reconnect`, keeps re-attaching forever.
    ///
    /// Attach failures are retried too, since the browser or the Structurizr
    /// page is often opened after the bridge starts. Without `reconnect` an
    /// attach failure is returned to the caller.
    pub async fn run(&mut self, reconnect: bool) -> Result<(), BrowserError> {
        let mut failed_attaches = 0u32;

        loop {
            match self.attach().await {
                Ok(session) => {
                    failed_attaches = 0;
                    match self.watch_session(session).await {
                        Ok(captured) => {
                            tracing::info!("DevTools session closed after {} DSL errors", captured)
                        }
                        Err(e) => tracing::warn!("DevTools session ended: {}", e),
                    }
                }
                Err(e) if reconnect => {
                    // Первую неудачу показываем, дальше повторяем молча
                    if failed_attaches == 0 {
                        tracing::warn!("{}; retrying every {:?}", e, RECONNECT_DELAY);
                    } else {
                        tracing::debug!("Attach attempt {} failed: {}", failed_attaches + 1, e);
                    }
                    failed_attaches = failed_attaches.saturating_add(1);
                }
                Err(e) => return Err(e),
            }

            if !reconnect {
                return Ok(());
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    }
}
