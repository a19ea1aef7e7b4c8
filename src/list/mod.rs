//! Capability interface over a virtualized, lazily-rendered list.

pub mod driver;

use async_trait::async_trait;
use thiserror::Error;

pub use driver::{DriveOutcome, DriverState, ScrollDriver, ScrollPolicy, StopReason};

/// Failures surfaced by a concrete list binding.
#[derive(Debug, Error)]
pub enum ListError {
    /// The rendered-count probe itself failed. Without the count neither
    /// growth nor exhaustion can be decided, so callers treat this as fatal.
    #[error("rendered-count probe failed: {0}")]
    QueryFailed(String),

    #[error("item {index} is not currently rendered")]
    ItemUnavailable { index: usize },

    /// One scroll gesture could not be issued. Recoverable: the driver
    /// escalates to the next tier or lets the idle limit decide.
    #[error("scroll gesture failed: {0}")]
    ScrollFailed(String),
}

/// Scroll mechanism for one gesture. `Container` scrolls the list element
/// itself; `Keyboard` pages via synthetic input when the container reference
/// is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTier {
    Container,
    Keyboard,
}

/// Snapshot of one rendered item, resolved by index at read time.
///
/// Handles are never cached across scrolls; the virtualizer may recycle live
/// nodes at any point, so the snapshot is taken eagerly and extraction works
/// on it alone.
#[derive(Debug, Clone)]
pub struct ItemHandle {
    index: usize,
    html: String,
}

impl ItemHandle {
    pub fn new(index: usize, html: impl Into<String>) -> Self {
        Self {
            index,
            html: html.into(),
        }
    }

    /// Rendered index this handle was resolved at.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

/// The narrow surface the harvest core needs from a live list. Concrete
/// bindings (the CDP dialog binding, simulated lists in tests) implement
/// this; everything above it stays automation-library-agnostic.
#[async_trait]
pub trait ListAccessor: Send + Sync {
    /// Number of items currently materialized by the virtualizer.
    async fn rendered_count(&self) -> Result<usize, ListError>;

    /// Snapshot the item at `index` out of the current rendering state.
    async fn item_at(&self, index: usize) -> Result<ItemHandle, ListError>;

    /// Issue one forward scroll gesture at the given tier.
    async fn scroll_forward(&self, tier: ScrollTier) -> Result<(), ListError>;

    /// Scroll the item at `index` into the viewport.
    async fn bring_into_view(&self, index: usize) -> Result<(), ListError>;
}
