//! Parallel document processing utilities.
//!
//! This module fans document work out across CPU cores using Rayon. Results
//! come back in input order regardless of which thread finished first, so
//! parallel and sequential runs produce identical downstream output.

use crate::utils::progress::ProgressBar;
use rayon::prelude::*;

/// Apply `work` to every item, either across the Rayon pool or on the
/// current thread, ticking a progress bar as items complete.
///
/// Output order always matches input order.
pub fn map_with_progress<I, T, F>(items: &[I], label: &str, sequential: bool, work: F) -> Vec<T>
where
    I: Sync,
    T: Send,
    F: Fn(&I) -> T + Send + Sync,
{
    let progress = if items.len() > 1 {
        ProgressBar::new(items.len(), label)
    } else {
        ProgressBar::hidden()
    };

    let run = |item: &I| {
        let result = work(item);
        progress.inc();
        result
    };

    let results: Vec<T> = if sequential {
        items.iter().map(run).collect()
    } else {
        items.par_iter().map(run).collect()
    };

    progress.finish();
    results
}
