//! Bar loading and data resolution for the runner.
//!
//! Given a list of symbols, resolves bars with the fallback policy:
//! 1. If stored data exists → use it
//! 2. If not stored and a provider is available → download and store
//! 3. If no data and `synthetic` is enabled → generate synthetic bars (tagged)
//! 4. Otherwise → fail with a clear error
//!
//! Synthetic data is a developer-only debug mode; anything computed from it
//! is tagged so reports can warn.

use alphalab_core::data::{CsvStore, DataError, DataProvider, DataSource, RawBar};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no stored data for '{symbol}' and network disabled (use synthetic mode for fake data)")]
    NoStoredDataOffline { symbol: String },

    #[error("no stored data for '{symbol}' and download failed: {reason}")]
    DownloadFailed { symbol: String, reason: String },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Options controlling how bars are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Never make network requests.
    pub offline: bool,
    /// Generate synthetic bars when real data is unavailable.
    pub synthetic: bool,
}

/// Result of loading bars, including provenance.
#[derive(Debug)]
pub struct LoadedData {
    /// Bars per symbol, clipped to the requested range.
    pub bars: HashMap<String, Vec<RawBar>>,
    /// Data source per symbol.
    pub sources: HashMap<String, DataSource>,
    /// Deterministic BLAKE3 hash over all bar data.
    pub dataset_hash: String,
    /// Whether any symbol used synthetic data.
    pub has_synthetic: bool,
}

/// Load bars for a set of symbols, with fallback to download or synthetic.
pub fn load_bars(
    symbols: &[&str],
    store: &CsvStore,
    provider: Option<&dyn DataProvider>,
    opts: &LoadOptions,
) -> Result<LoadedData, LoadError> {
    let mut bars: HashMap<String, Vec<RawBar>> = HashMap::new();
    let mut sources: HashMap<String, DataSource> = HashMap::new();
    let mut has_synthetic = false;

    for symbol in symbols {
        // 1. Stored data
        if let Ok(stored) = store.load(symbol) {
            bars.insert(symbol.to_string(), clip_range(stored, opts));
            sources.insert(symbol.to_string(), DataSource::Store);
            continue;
        }

        // 2. Download
        if !opts.offline {
            if let Some(prov) = provider {
                match prov.fetch(symbol, opts.start, opts.end) {
                    Ok(fetched) => {
                        store.write(symbol, &fetched.bars)?;
                        bars.insert(symbol.to_string(), clip_range(fetched.bars, opts));
                        sources.insert(symbol.to_string(), fetched.source);
                        continue;
                    }
                    Err(e) => {
                        if !opts.synthetic {
                            return Err(LoadError::DownloadFailed {
                                symbol: symbol.to_string(),
                                reason: e.to_string(),
                            });
                        }
                        // Fall through to synthetic.
                    }
                }
            }
        }

        // 3. Synthetic fallback
        if opts.synthetic {
            eprintln!(
                "WARNING: generating synthetic data for {symbol} — results will be tagged as synthetic"
            );
            bars.insert(
                symbol.to_string(),
                alphalab_core::data::generate_bars(symbol, opts.start, opts.end),
            );
            sources.insert(symbol.to_string(), DataSource::Synthetic);
            has_synthetic = true;
            continue;
        }

        // 4. Fail
        return Err(LoadError::NoStoredDataOffline {
            symbol: symbol.to_string(),
        });
    }

    let dataset_hash = compute_dataset_hash(&bars);

    Ok(LoadedData {
        bars,
        sources,
        dataset_hash,
        has_synthetic,
    })
}

fn clip_range(bars: Vec<RawBar>, opts: &LoadOptions) -> Vec<RawBar> {
    bars.into_iter()
        .filter(|bar| bar.date >= opts.start && bar.date <= opts.end)
        .collect()
}

/// Deterministic BLAKE3 hash over all bar data, in sorted symbol order so it
/// does not depend on HashMap iteration.
fn compute_dataset_hash(bars: &HashMap<String, Vec<RawBar>>) -> String {
    let sorted: BTreeMap<&String, &Vec<RawBar>> = bars.iter().collect();
    let mut hasher = blake3::Hasher::new();
    for (symbol, series) in sorted {
        hasher.update(symbol.as_bytes());
        for bar in series.iter() {
            hasher.update(bar.date.to_string().as_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
            hasher.update(&bar.adj_close.to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_store() -> CsvStore {
        let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir()
            .join(format!("alphalab_loader_test_{}_{id}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        CsvStore::new(dir)
    }

    fn sample_bars() -> Vec<RawBar> {
        [(2, 101.0), (3, 102.0), (4, 103.0)]
            .iter()
            .map(|&(day, close)| RawBar {
                date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                open: close - 1.0,
                high: close + 1.0,
                low: close - 2.0,
                close,
                volume: 1000,
                adj_close: close,
            })
            .collect()
    }

    fn opts() -> LoadOptions {
        LoadOptions {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            offline: true,
            synthetic: false,
        }
    }

    #[test]
    fn loads_from_store() {
        let store = temp_store();
        store.write("SPY", &sample_bars()).unwrap();

        let loaded = load_bars(&["SPY"], &store, None, &opts()).unwrap();
        assert_eq!(loaded.bars["SPY"].len(), 3);
        assert_eq!(loaded.sources["SPY"], DataSource::Store);
        assert!(!loaded.has_synthetic);
    }

    #[test]
    fn clips_to_requested_range() {
        let store = temp_store();
        store.write("SPY", &sample_bars()).unwrap();

        let narrow = LoadOptions {
            start: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            offline: true,
            synthetic: false,
        };
        let loaded = load_bars(&["SPY"], &store, None, &narrow).unwrap();
        assert_eq!(loaded.bars["SPY"].len(), 1);
        assert_eq!(loaded.bars["SPY"][0].close, 102.0);
    }

    #[test]
    fn offline_without_store_fails() {
        let store = temp_store();
        let err = load_bars(&["SPY"], &store, None, &opts()).unwrap_err();
        assert!(matches!(err, LoadError::NoStoredDataOffline { .. }));
    }

    #[test]
    fn synthetic_fallback_is_tagged() {
        let store = temp_store();
        let mut o = opts();
        o.synthetic = true;

        let loaded = load_bars(&["SPY"], &store, None, &o).unwrap();
        assert!(loaded.has_synthetic);
        assert_eq!(loaded.sources["SPY"], DataSource::Synthetic);
        assert!(!loaded.bars["SPY"].is_empty());
    }

    #[test]
    fn dataset_hash_is_stable_and_data_sensitive() {
        let store = temp_store();
        store.write("SPY", &sample_bars()).unwrap();

        let a = load_bars(&["SPY"], &store, None, &opts()).unwrap();
        let b = load_bars(&["SPY"], &store, None, &opts()).unwrap();
        assert_eq!(a.dataset_hash, b.dataset_hash);

        let mut changed = sample_bars();
        changed[0].close += 1.0;
        store.write("SPY", &changed).unwrap();
        let c = load_bars(&["SPY"], &store, None, &opts()).unwrap();
        assert_ne!(a.dataset_hash, c.dataset_hash);
    }
}
