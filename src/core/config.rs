use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const DEFAULT_OUT_PREFIX: &str = "reviews";
pub const DEFAULT_MAX_RECORDS: usize = 1000;
pub const DEFAULT_BATCH_SIZE: usize = 200;
/// Page load timeout, seconds.
pub const DEFAULT_NAV_TIMEOUT_SECS: u64 = 60;
/// Settle time between scroll gestures, seconds.
pub const DEFAULT_SCROLL_PAUSE_SECS: f64 = 1.5;

const STORE_DETAILS_ENDPOINT: &str = "https://play.google.com/store/apps/details";

/// Knobs for one harvest run. Built from the CLI; every field except the app
/// id has a default.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Store listing to open, e.g. `in.stablemoney.app`.
    pub app_id: String,
    /// Name stem for the per-batch artifacts.
    pub out_prefix: String,
    /// Directory the artifacts are written into. Created if missing.
    pub out_dir: PathBuf,
    /// Total record cap across all batches. `0` harvests until exhaustion.
    pub max_records: usize,
    /// Records per artifact.
    pub batch_size: usize,
    pub nav_timeout: Duration,
    pub scroll_pause: Duration,
    /// The browser runs visible unless this is set.
    pub headless: bool,
}

impl HarvestConfig {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            out_prefix: DEFAULT_OUT_PREFIX.to_string(),
            out_dir: PathBuf::from("."),
            max_records: DEFAULT_MAX_RECORDS,
            batch_size: DEFAULT_BATCH_SIZE,
            nav_timeout: Duration::from_secs(DEFAULT_NAV_TIMEOUT_SECS),
            scroll_pause: Duration::from_secs_f64(DEFAULT_SCROLL_PAUSE_SECS),
            headless: false,
        }
    }

    /// Store details URL for the configured app. The `hl` pin keeps the
    /// review-card markup in the layout the extractor's selectors expect.
    pub fn store_url(&self) -> Url {
        Url::parse_with_params(
            STORE_DETAILS_ENDPOINT,
            &[
                ("id", self.app_id.as_str()),
                ("hl", "en_IN"),
                ("pli", "1"),
            ],
        )
        .expect("static store endpoint")
    }
}
