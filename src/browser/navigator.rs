//! Store navigation: open the listing, then the reviews dialog.

use std::time::{Duration, Instant};

use chromiumoxide::Page;
use tracing::{debug, info};

use super::dialog_list::DialogList;
use crate::core::config::HarvestConfig;
use crate::core::error::HarvestError;

const SEE_ALL_REVIEWS_LABEL: &str = "See all reviews";
const POLL_INTERVAL: Duration = Duration::from_millis(250);
/// How long the dialog may take to materialize after the button click.
const DIALOG_WAIT: Duration = Duration::from_secs(15);

/// Navigate to the configured store listing, click the reviews button, and
/// wait until the dialog holding the virtualized list is present. Returns
/// the list accessor bound to the open dialog.
///
/// Fatal outcomes: [`HarvestError::NavigationTimeout`] when the page never
/// becomes ready, [`HarvestError::DialogNotFound`] when the button or the
/// dialog never shows up.
pub async fn open_reviews_dialog(
    page: Page,
    cfg: &HarvestConfig,
) -> Result<DialogList, HarvestError> {
    let url = cfg.store_url();
    info!(%url, "navigating to store listing");

    let nav = async {
        page.goto(url.as_str()).await?;
        Ok::<(), chromiumoxide::error::CdpError>(())
    };
    tokio::time::timeout(cfg.nav_timeout, nav)
        .await
        .map_err(|_| HarvestError::NavigationTimeout {
            timeout: cfg.nav_timeout,
        })??;
    wait_for_ready(&page, cfg.nav_timeout).await?;

    click_see_all_reviews(&page, cfg.nav_timeout).await?;
    // The dialog animates in; give it a beat before polling for it.
    tokio::time::sleep(Duration::from_millis(1000)).await;
    wait_for_dialog(&page, DIALOG_WAIT).await?;
    info!("reviews dialog is open");
    Ok(DialogList::new(page))
}

async fn wait_for_ready(page: &Page, timeout: Duration) -> Result<(), HarvestError> {
    let deadline = Instant::now() + timeout;
    loop {
        let ready = page
            .evaluate("document.readyState")
            .await
            .ok()
            .and_then(|v| v.into_value::<serde_json::Value>().ok())
            .and_then(|j| j.as_str().map(|s| s == "complete" || s == "interactive"))
            .unwrap_or(false);
        if ready {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(HarvestError::NavigationTimeout { timeout });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Poll for the reviews button and click it. The listing hydrates lazily, so
/// the button may appear well after the document is ready.
async fn click_see_all_reviews(page: &Page, timeout: Duration) -> Result<(), HarvestError> {
    let js = format!(
        r#"(() => {{
            const spans = document.querySelectorAll('button span');
            for (const span of spans) {{
                if ((span.textContent || '').includes('{SEE_ALL_REVIEWS_LABEL}')) {{
                    const button = span.closest('button');
                    if (button) {{
                        button.click();
                        return true;
                    }}
                }}
            }}
            return false;
        }})()"#
    );

    let deadline = Instant::now() + timeout;
    loop {
        let clicked = page
            .evaluate(js.as_str())
            .await
            .ok()
            .and_then(|v| v.into_value::<serde_json::Value>().ok())
            .and_then(|j| j.as_bool())
            .unwrap_or(false);
        if clicked {
            debug!("reviews button clicked");
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(HarvestError::DialogNotFound);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

async fn wait_for_dialog(page: &Page, timeout: Duration) -> Result<(), HarvestError> {
    let deadline = Instant::now() + timeout;
    loop {
        let present = page
            .evaluate(r#"document.querySelector('div[role="dialog"]') !== null"#)
            .await
            .ok()
            .and_then(|v| v.into_value::<serde_json::Value>().ok())
            .and_then(|j| j.as_bool())
            .unwrap_or(false);
        if present {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(HarvestError::DialogNotFound);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
