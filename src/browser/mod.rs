//! Native browser session management via `chromiumoxide`.
//!
//! Finds a usable Chromium-family executable, launches one session per run,
//! and drains its CDP event stream in the background. The session is owned by
//! the run for its whole lifetime and closed unconditionally on exit.

pub mod dialog_list;
pub mod navigator;

use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Browser;
use futures::StreamExt;
use std::path::Path;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::core::config::HarvestConfig;
use crate::core::error::HarvestError;

pub use dialog_list::DialogList;

/// Review dialogs only get a scrollable pane at a desktop-sized viewport.
const VIEWPORT_WIDTH: u32 = 1400;
const VIEWPORT_HEIGHT: u32 = 900;

/// Find a usable Chromium-family browser executable.
///
/// Resolution order:
/// 1. `CHROME_EXECUTABLE` env var (explicit override)
/// 2. PATH scan - finds package-manager installs on all platforms.
/// 3. OS-specific well-known install paths.
pub fn find_chrome_executable() -> Option<String> {
    if let Ok(p) = std::env::var("CHROME_EXECUTABLE") {
        if Path::new(&p).exists() {
            return Some(p);
        }
    }

    if let Ok(path_var) = std::env::var("PATH") {
        let candidates = [
            "google-chrome",
            "chromium",
            "chromium-browser",
            "chrome",
            "brave-browser",
        ];
        for dir in std::env::split_paths(&path_var) {
            for exe in candidates {
                let full = dir.join(exe);
                if full.exists() {
                    return Some(full.to_string_lossy().to_string());
                }
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        let candidates = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "linux")]
    {
        let candidates = [
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/bin/brave-browser",
            "/usr/local/bin/chromium",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        let candidates = [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\BraveSoftware\Brave-Browser\Application\brave.exe",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    None
}

fn session_config(exe: &str, cfg: &HarvestConfig) -> Result<BrowserConfig, HarvestError> {
    let mut builder = BrowserConfig::builder()
        .chrome_executable(exe)
        .viewport(Viewport {
            width: VIEWPORT_WIDTH,
            height: VIEWPORT_HEIGHT,
            device_scale_factor: Some(1.0),
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        })
        .window_size(VIEWPORT_WIDTH, VIEWPORT_HEIGHT)
        .arg("--disable-gpu")
        .arg("--no-sandbox") // often required in CI / restricted environments
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .arg("--disable-sync")
        .arg("--disable-translate")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--hide-scrollbars")
        .arg("--mute-audio")
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--lang=en-IN");

    if !cfg.headless {
        builder = builder.with_head();
    }

    builder.build().map_err(HarvestError::Launch)
}

/// Launch the browser session and spawn its CDP event drain.
pub async fn launch(cfg: &HarvestConfig) -> Result<(Browser, JoinHandle<()>), HarvestError> {
    let exe = find_chrome_executable().ok_or_else(|| {
        HarvestError::Launch(
            "no browser found; install Chrome or Chromium, or set CHROME_EXECUTABLE".into(),
        )
    })?;
    info!(browser = %exe, headless = cfg.headless, "launching browser");

    let config = session_config(&exe, cfg)?;
    let (browser, mut handler) = Browser::launch(config).await?;
    let drain = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                warn!("CDP handler error: {}", e);
            }
        }
    });
    Ok((browser, drain))
}

/// Close the session and stop the event drain. Errors are logged, never
/// surfaced; shutdown must not shadow a harvest failure.
pub async fn shutdown(mut browser: Browser, drain: JoinHandle<()>) {
    if let Err(e) = browser.close().await {
        warn!("browser close error (non-fatal): {}", e);
    }
    drain.abort();
}
