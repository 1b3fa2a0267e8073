//! Chrome/Chromium discovery and launch with remote debugging enabled.

use std::path::PathBuf;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::{sleep, Instant};

use super::cdp;
use crate::configuration::BrowserConfig;
use crate::core::BrowserError;

const EXECUTABLE_NAMES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
    "msedge",
];

#[cfg(target_os = "macos")]
const WELL_KNOWN_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

#[cfg(target_os = "windows")]
const WELL_KNOWN_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const WELL_KNOWN_PATHS: &[&str] = &["/usr/bin/google-chrome", "/usr/bin/chromium"];

/// Locates a browser executable: explicit path, then PATH, then well-known locations
pub fn find_chrome(explicit: Option<&PathBuf>) -> Result<PathBuf, BrowserError> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.clone());
        }
        tracing::warn!("Configured browser {} does not exist", path.display());
    }

    EXECUTABLE_NAMES
        .iter()
        .find_map(|name| which::which(name).ok())
        .or_else(|| {
            WELL_KNOWN_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|p| p.exists())
        })
        .ok_or(BrowserError::ExecutableNotFound)
}

/// Dedicated profile so the launched instance never reuses a running browser
pub fn profile_dir(port: u16) -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("structurizr-bridge")
        .join(format!("chrome-profile-{}", port))
}

/// Command-line arguments for a debuggable browser showing Structurizr
pub fn launch_args(config: &BrowserConfig) -> Vec<String> {
    let mut args = vec![
        format!("--remote-debugging-port={}", config.port),
        format!("--user-data-dir={}", profile_dir(config.port).display()),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
    ];
    if config.headless {
        args.push("--headless=new".to_string());
    }
    args.push(config.structurizr_url.clone());
    args
}

/// Spawns the browser and waits until its DevTools endpoint answers.
///
/// The browser is killed when the returned [`Child`] is dropped.
pub async fn launch(
    config: &BrowserConfig,
    client: &reqwest::Client,
) -> Result<Child, BrowserError> {
    let executable = find_chrome(config.chrome_path.as_ref())?;
    let args = launch_args(config);

    tracing::info!("Launching {} {}", executable.display(), args.join(" "));

    let mut child = Command::new(&executable)
        .args(&args)
        .kill_on_drop(true)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|source| BrowserError::Launch {
            path: executable.clone(),
            source,
        })?;

    let endpoint = config.devtools_endpoint();
    let deadline = Instant::now() + Duration::from_secs(config.launch_timeout_secs);

    while Instant::now() < deadline {
        if cdp::is_endpoint_ready(client, &endpoint).await {
            tracing::info!("Browser DevTools ready at {}", endpoint);
            return Ok(child);
        }
        if let Ok(Some(status)) = child.try_wait() {
            return Err(BrowserError::Launch {
                path: executable,
                source: std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("browser exited early with {}", status),
                ),
            });
        }
        sleep(Duration::from_millis(250)).await;
    }

    Err(BrowserError::LaunchTimeout(config.launch_timeout_secs))
}
