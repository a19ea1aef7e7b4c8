use tracing::debug;

use crate::core::types::Review;
use crate::extract::extract_review;
use crate::list::{ListAccessor, ListError, ScrollDriver};

/// Harvest the index window `[start, start + limit)`.
///
/// Drives the list toward `start + limit` rendered items first, then maps
/// the extractor over whatever portion of the window actually rendered, in
/// index order. An empty result is the end-of-data signal, not a fault.
pub async fn harvest_window<A>(
    list: &A,
    driver: &mut ScrollDriver,
    start: usize,
    limit: usize,
) -> Result<Vec<Review>, ListError>
where
    A: ListAccessor + ?Sized,
{
    let target = start + limit;
    let outcome = driver.drive_until(list, target).await?;
    let end = outcome.rendered.min(target);
    if end <= start {
        return Ok(Vec::new());
    }
    if outcome.rendered < target {
        debug!(
            rendered = outcome.rendered,
            target,
            reason = ?outcome.reason,
            "window clamped to the rendered tail"
        );
    }

    let mut records = Vec::with_capacity(end - start);
    for index in start..end {
        match list.item_at(index).await {
            Ok(item) => {
                debug_assert_eq!(item.index(), index);
                records.push(extract_review(&item));
            }
            Err(err) => {
                debug!(index, error = %err, "item unreadable, keeping an empty row in its slot");
                records.push(Review::default());
            }
        }
    }
    Ok(records)
}
