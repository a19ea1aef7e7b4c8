use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One harvested review, exactly as it lands in a batch workbook.
///
/// Field declaration order is the artifact column order. Absent values are
/// explicit: string fields degrade to empty, numeric fields to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    /// Raw date text as shown on the card, deliberately unparsed.
    pub date: String,
    /// Star rating 1-5, truncated from the card's decimal marker.
    pub rating: Option<u8>,
    pub review_text: String,
    pub helpful_votes: Option<u64>,
}

/// Why a harvest run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// The configured record cap was reached.
    MaxRecords,
    /// The list stopped yielding new items before the cap.
    ListExhausted,
}

/// Final accounting for one run.
#[derive(Debug, Clone)]
pub struct HarvestSummary {
    pub records_written: usize,
    pub batches_written: usize,
    pub stop_cause: StopCause,
    /// Artifacts persisted this run, in batch order.
    pub artifacts: Vec<PathBuf>,
}
