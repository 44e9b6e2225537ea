//! Download orchestrator — multi-symbol fetches with progress reporting.

use super::provider::{DataError, DataProvider, DownloadProgress};
use super::store::CsvStore;
use chrono::NaiveDate;

/// Download multiple symbols into the store.
///
/// Symbols whose stored range already covers `[start, end]` are skipped
/// unless `force` is set. Returns a summary of successes and failures.
pub fn download_symbols(
    provider: &dyn DataProvider,
    store: &CsvStore,
    symbols: &[&str],
    start: NaiveDate,
    end: NaiveDate,
    force: bool,
    progress: &dyn DownloadProgress,
) -> DownloadSummary {
    let total = symbols.len();
    let mut succeeded = 0;
    let mut failed = 0;
    let mut errors: Vec<(String, DataError)> = Vec::new();

    for (i, symbol) in symbols.iter().enumerate() {
        progress.on_start(symbol, i, total);

        if !force && store.covers(symbol, start, end) {
            progress.on_complete(symbol, i, total, &Ok(()));
            succeeded += 1;
            continue;
        }

        let result = provider
            .fetch(symbol, start, end)
            .and_then(|fetched| store.write(symbol, &fetched.bars));
        progress.on_complete(symbol, i, total, &result);

        match result {
            Ok(()) => succeeded += 1,
            Err(e) => {
                errors.push((symbol.to_string(), e));
                failed += 1;
            }
        }
    }

    progress.on_batch_complete(succeeded, failed, total);

    DownloadSummary {
        total,
        succeeded,
        failed,
        errors,
    }
}

/// Summary of a batch download operation.
#[derive(Debug)]
pub struct DownloadSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<(String, DataError)>,
}

impl DownloadSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}
