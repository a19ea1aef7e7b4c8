use tracing::{debug, info};

use crate::core::error::HarvestError;
use crate::core::types::{HarvestSummary, StopCause};
use crate::harvest::checkpoint::BatchCheckpointer;
use crate::harvest::window::harvest_window;
use crate::list::{ListAccessor, ScrollDriver};

/// The sequential harvest loop: next window, extract, checkpoint, advance.
///
/// `max_records == 0` harvests without a cap. A batch is fully persisted
/// before the next window is requested, so an interruption can only lose
/// rows that were never checkpointed; everything already written stays on
/// disk as valid artifacts.
pub async fn run_harvest<A>(
    list: &A,
    driver: &mut ScrollDriver,
    checkpointer: &BatchCheckpointer,
    max_records: usize,
    batch_size: usize,
) -> Result<HarvestSummary, HarvestError>
where
    A: ListAccessor + ?Sized,
{
    let batch_size = batch_size.max(1);
    let mut written: usize = 0;
    let mut batch_num: usize = 1;
    let mut artifacts = Vec::new();

    let stop_cause = loop {
        if max_records > 0 && written >= max_records {
            break StopCause::MaxRecords;
        }
        let limit = if max_records == 0 {
            batch_size
        } else {
            batch_size.min(max_records - written)
        };

        debug!(start = written, limit, batch = batch_num, "requesting next window");
        let records = harvest_window(list, driver, written, limit).await?;
        if records.is_empty() {
            break StopCause::ListExhausted;
        }

        let artifact = checkpointer
            .persist(&records, batch_num)
            .map_err(|source| HarvestError::Persistence {
                batch: batch_num,
                source,
            })?;
        artifacts.push(artifact);
        written += records.len();
        batch_num += 1;
    };

    let summary = HarvestSummary {
        records_written: written,
        batches_written: batch_num - 1,
        stop_cause,
        artifacts,
    };
    info!(
        records = summary.records_written,
        batches = summary.batches_written,
        cause = ?summary.stop_cause,
        "harvest loop finished"
    );
    Ok(summary)
}
