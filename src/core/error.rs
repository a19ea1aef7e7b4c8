use std::time::Duration;

use thiserror::Error;

use crate::harvest::checkpoint::CheckpointError;
use crate::list::ListError;

/// Run-level failures. Anything here aborts the whole run; per-item and
/// per-field trouble is absorbed lower down and never reaches this type.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("browser session error: {0}")]
    Session(#[from] chromiumoxide::error::CdpError),

    #[error("page did not become ready within {timeout:?}")]
    NavigationTimeout { timeout: Duration },

    #[error("reviews dialog did not appear")]
    DialogNotFound,

    /// The rendered state of the list can no longer be observed, so neither
    /// progress nor exhaustion can be decided.
    #[error("list state unreadable: {0}")]
    ExtractionUnavailable(#[from] ListError),

    /// Batches already checkpointed before this one remain valid on disk.
    #[error("failed to persist batch {batch}: {source}")]
    Persistence {
        batch: usize,
        source: CheckpointError,
    },
}
