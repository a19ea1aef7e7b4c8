//! Live CDP binding for the review list inside the store dialog.

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::Page;

use crate::list::{ItemHandle, ListAccessor, ListError, ScrollTier};

const DIALOG_SELECTOR: &str = r#"div[role="dialog"]"#;
const LIST_SELECTOR: &str = r#"div[aria-label="User reviews"]"#;
const CARD_SELECTOR: &str = "div.RHo1pe";
/// Fraction of the container height advanced per scroll gesture.
const SCROLL_STEP_RATIO: f64 = 0.92;

const PAGE_DOWN_VIRTUAL_KEY: i64 = 34;

/// JS prelude binding `cards` to the card collection of the first dialog,
/// or `null` when no dialog is present. Every index-addressed query goes
/// through this one collection, so an index names the same card everywhere.
fn cards_prelude() -> String {
    format!(
        "const dialog = document.querySelector('{DIALOG_SELECTOR}'); \
         const cards = dialog ? dialog.querySelectorAll('{CARD_SELECTOR}') : null;"
    )
}

fn count_js() -> String {
    format!(
        r#"(() => {{
            {prelude}
            return cards ? cards.length : null;
        }})()"#,
        prelude = cards_prelude()
    )
}

fn item_html_js(index: usize) -> String {
    format!(
        r#"(() => {{
            {prelude}
            const card = cards ? cards[{index}] : null;
            return card ? card.outerHTML : null;
        }})()"#,
        prelude = cards_prelude()
    )
}

fn bring_into_view_js(index: usize) -> String {
    format!(
        r#"(() => {{
            {prelude}
            const card = cards ? cards[{index}] : null;
            if (!card) return false;
            card.scrollIntoView({{ block: 'center', behavior: 'instant' }});
            return true;
        }})()"#,
        prelude = cards_prelude()
    )
}

/// `ListAccessor` over the live dialog DOM. All reads go through one-shot
/// JS evaluations so no DOM reference is ever held across scrolls.
pub struct DialogList {
    page: Page,
}

impl DialogList {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    async fn eval(&self, js: String) -> Result<serde_json::Value, String> {
        self.page
            .evaluate(js)
            .await
            .map_err(|e| e.to_string())?
            .into_value::<serde_json::Value>()
            .map_err(|e| e.to_string())
    }

    async fn press_page_down(&self) -> Result<(), ListError> {
        let down = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyDown)
            .key("PageDown".to_string())
            .windows_virtual_key_code(PAGE_DOWN_VIRTUAL_KEY)
            .build()
            .map_err(ListError::ScrollFailed)?;
        self.page
            .execute(down)
            .await
            .map_err(|e| ListError::ScrollFailed(e.to_string()))?;

        let up = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyUp)
            .key("PageDown".to_string())
            .windows_virtual_key_code(PAGE_DOWN_VIRTUAL_KEY)
            .build()
            .map_err(ListError::ScrollFailed)?;
        self.page
            .execute(up)
            .await
            .map_err(|e| ListError::ScrollFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ListAccessor for DialogList {
    async fn rendered_count(&self) -> Result<usize, ListError> {
        match self.eval(count_js()).await {
            Ok(serde_json::Value::Null) => Err(ListError::QueryFailed(
                "review dialog is no longer present".into(),
            )),
            Ok(value) => value
                .as_u64()
                .map(|n| n as usize)
                .ok_or_else(|| ListError::QueryFailed(format!("unexpected count payload: {value}"))),
            Err(e) => Err(ListError::QueryFailed(e)),
        }
    }

    async fn item_at(&self, index: usize) -> Result<ItemHandle, ListError> {
        match self.eval(item_html_js(index)).await {
            Ok(serde_json::Value::String(html)) => Ok(ItemHandle::new(index, html)),
            Ok(_) => Err(ListError::ItemUnavailable { index }),
            Err(e) => Err(ListError::QueryFailed(e)),
        }
    }

    async fn scroll_forward(&self, tier: ScrollTier) -> Result<(), ListError> {
        match tier {
            ScrollTier::Container => {
                let js = format!(
                    r#"(() => {{
                        const dialog = document.querySelector('{DIALOG_SELECTOR}');
                        if (!dialog) return false;
                        const list = dialog.querySelector('{LIST_SELECTOR}') || dialog;
                        list.scrollBy(0, list.clientHeight * {SCROLL_STEP_RATIO});
                        return true;
                    }})()"#
                );
                match self.eval(js).await {
                    Ok(value) if value.as_bool() == Some(true) => Ok(()),
                    Ok(_) => Err(ListError::ScrollFailed(
                        "no scrollable list container".into(),
                    )),
                    Err(e) => Err(ListError::ScrollFailed(e)),
                }
            }
            ScrollTier::Keyboard => self.press_page_down().await,
        }
    }

    async fn bring_into_view(&self, index: usize) -> Result<(), ListError> {
        match self.eval(bring_into_view_js(index)).await {
            Ok(value) if value.as_bool() == Some(true) => Ok(()),
            Ok(_) => Err(ListError::ItemUnavailable { index }),
            Err(e) => Err(ListError::QueryFailed(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_queries_share_the_dialog_scoped_collection() {
        let prelude = cards_prelude();
        assert!(prelude.contains(r#"document.querySelector('div[role="dialog"]')"#));
        for js in [count_js(), item_html_js(4), bring_into_view_js(4)] {
            assert!(js.contains(&prelude), "shared collection missing in: {js}");
        }
    }

    #[test]
    fn item_queries_address_the_requested_slot() {
        assert!(item_html_js(17).contains("cards[17]"));
        assert!(bring_into_view_js(17).contains("cards[17]"));
    }
}
