use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use playharvest::core::config::{
    DEFAULT_BATCH_SIZE, DEFAULT_MAX_RECORDS, DEFAULT_NAV_TIMEOUT_SECS, DEFAULT_OUT_PREFIX,
    DEFAULT_SCROLL_PAUSE_SECS,
};
use playharvest::{
    browser, run_harvest, BatchCheckpointer, HarvestConfig, HarvestSummary, ScrollDriver,
    ScrollPolicy,
};

#[derive(Parser, Debug)]
#[command(
    name = "playharvest",
    about = "Harvest Google Play reviews into batched CSV checkpoints",
    version
)]
struct Cli {
    /// Play Store application id, e.g. com.example.app
    #[arg(long)]
    app: String,

    /// Prefix for checkpoint artifacts ({prefix}_batch{N}.csv)
    #[arg(long, default_value = DEFAULT_OUT_PREFIX)]
    out_prefix: String,

    /// Directory that receives the checkpoint artifacts
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Stop after this many reviews; 0 harvests until the list is exhausted
    #[arg(long, default_value_t = DEFAULT_MAX_RECORDS)]
    max_reviews: usize,

    /// Reviews per checkpoint artifact
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Navigation timeout in seconds
    #[arg(long, default_value_t = DEFAULT_NAV_TIMEOUT_SECS)]
    timeout: u64,

    /// Pause between scroll gestures in seconds
    #[arg(long, default_value_t = DEFAULT_SCROLL_PAUSE_SECS, value_parser = parse_pause)]
    pause: f64,

    /// Run the browser without a visible window
    #[arg(long)]
    headless: bool,
}

/// Accepts only pause values `Duration` can represent; `inf`, `nan`,
/// negatives, and overflowing floats are parse errors.
fn parse_pause(raw: &str) -> Result<f64, String> {
    let secs: f64 = raw.parse().map_err(|err| format!("{err}"))?;
    Duration::try_from_secs_f64(secs)
        .map(|_| secs)
        .map_err(|_| String::from("expected a non-negative, finite number of seconds"))
}

impl Cli {
    fn into_config(self) -> HarvestConfig {
        let mut config = HarvestConfig::new(self.app);
        config.out_prefix = self.out_prefix;
        config.out_dir = self.out_dir;
        config.max_records = self.max_reviews;
        config.batch_size = self.batch_size.max(1);
        config.nav_timeout = Duration::from_secs(self.timeout);
        if let Ok(pause) = Duration::try_from_secs_f64(self.pause) {
            config.scroll_pause = pause;
        }
        config.headless = self.headless;
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,chromiumoxide=warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Cli::parse().into_config();
    info!(
        "Harvesting reviews for {} into {}",
        config.app_id,
        config.out_dir.display()
    );

    let (browser, drain) = browser::launch(&config).await?;

    // Run the harvest inside a block so the browser is torn down on any exit path.
    let result: Result<HarvestSummary, playharvest::HarvestError> = async {
        let page = browser.new_page("about:blank").await?;
        let list = browser::navigator::open_reviews_dialog(page, &config).await?;

        let checkpointer =
            BatchCheckpointer::new(config.out_dir.clone(), config.out_prefix.clone());
        let mut driver = ScrollDriver::new(ScrollPolicy {
            pause: config.scroll_pause,
            ..ScrollPolicy::default()
        });

        run_harvest(
            &list,
            &mut driver,
            &checkpointer,
            config.max_records,
            config.batch_size,
        )
        .await
    }
    .await;

    browser::shutdown(browser, drain).await;

    let summary = result?;
    info!(
        "Harvest complete: {} reviews across {} batches ({:?})",
        summary.records_written, summary.batches_written, summary.stop_cause
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn try_parse(extra: &[&str]) -> Result<Cli, clap::Error> {
        let mut argv = vec!["playharvest", "--app", "com.example.app"];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv)
    }

    #[test]
    fn pause_values_without_a_duration_are_rejected_at_parse_time() {
        for bad in ["inf", "nan", "-2", "1e30"] {
            let flag = format!("--pause={bad}");
            assert!(try_parse(&[&flag]).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn pause_seconds_carry_into_the_scroll_pause() {
        let cli = try_parse(&["--pause", "0.25"]).expect("parse");
        assert_eq!(cli.into_config().scroll_pause, Duration::from_millis(250));

        let cli = try_parse(&[]).expect("parse");
        assert_eq!(cli.into_config().scroll_pause, Duration::from_millis(1500));
    }
}
