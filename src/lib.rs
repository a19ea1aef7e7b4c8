pub mod browser;
pub mod core;
pub mod extract;
pub mod harvest;
pub mod list;

// --- Primary exports ---
pub use browser::DialogList;
pub use core::config::HarvestConfig;
pub use core::error::HarvestError;
pub use core::types::{HarvestSummary, Review, StopCause};
pub use extract::extract_review;
pub use harvest::checkpoint::{BatchCheckpointer, CheckpointError};
pub use harvest::orchestrator::run_harvest;
pub use harvest::window::harvest_window;
pub use list::{
    DriveOutcome, DriverState, ItemHandle, ListAccessor, ListError, ScrollDriver, ScrollPolicy,
    ScrollTier, StopReason,
};
