//! Local CSV store, one file per symbol.
//!
//! Layout: `{dir}/{SYMBOL}.csv` plus a `{SYMBOL}.meta.json` sidecar carrying
//! the date range, bar count, and a BLAKE3 hash of the data. Writes are
//! atomic (write to .tmp, rename into place).

use super::provider::{DataError, RawBar};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Metadata sidecar for a stored symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMeta {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bar_count: usize,
    pub data_hash: String,
    pub cached_at: chrono::NaiveDateTime,
}

/// The CSV bar store.
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn bars_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    fn meta_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.meta.json"))
    }

    /// Write bars for a symbol, sorted by date, replacing any previous file.
    pub fn write(&self, symbol: &str, bars: &[RawBar]) -> Result<(), DataError> {
        if bars.is_empty() {
            return Err(DataError::StoreError("no bars to store".into()));
        }

        fs::create_dir_all(&self.dir)
            .map_err(|e| DataError::StoreError(format!("failed to create dir: {e}")))?;

        let mut sorted: Vec<&RawBar> = bars.iter().collect();
        sorted.sort_by_key(|bar| bar.date);

        let path = self.bars_path(symbol);
        let tmp_path = path.with_extension("csv.tmp");

        let mut writer = csv::Writer::from_path(&tmp_path)
            .map_err(|e| DataError::StoreError(format!("open {}: {e}", tmp_path.display())))?;
        for bar in &sorted {
            writer
                .serialize(bar)
                .map_err(|e| DataError::StoreError(format!("serialize bar: {e}")))?;
        }
        writer
            .flush()
            .map_err(|e| DataError::StoreError(format!("flush: {e}")))?;
        drop(writer);

        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::StoreError(format!("atomic rename failed: {e}"))
        })?;

        let meta = StoreMeta {
            symbol: symbol.to_string(),
            start_date: sorted.first().unwrap().date,
            end_date: sorted.last().unwrap().date,
            bar_count: sorted.len(),
            data_hash: hash_bars(&sorted),
            cached_at: chrono::Local::now().naive_local(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| DataError::StoreError(format!("meta serialization: {e}")))?;
        fs::write(self.meta_path(symbol), meta_json)
            .map_err(|e| DataError::StoreError(format!("meta write: {e}")))?;

        Ok(())
    }

    /// Load all bars for a symbol.
    pub fn load(&self, symbol: &str) -> Result<Vec<RawBar>, DataError> {
        let path = self.bars_path(symbol);
        if !path.exists() {
            return Err(DataError::NoStoredData {
                symbol: symbol.to_string(),
            });
        }

        let mut reader = csv::Reader::from_path(&path)
            .map_err(|e| DataError::StoreError(format!("open {}: {e}", path.display())))?;
        let mut bars = Vec::new();
        for row in reader.deserialize() {
            let bar: RawBar =
                row.map_err(|e| DataError::StoreError(format!("parse {symbol}: {e}")))?;
            bars.push(bar);
        }
        if bars.is_empty() {
            return Err(DataError::StoreError(format!(
                "stored file for {symbol} has no rows"
            )));
        }
        Ok(bars)
    }

    /// Read the metadata sidecar, if present and parseable.
    pub fn meta(&self, symbol: &str) -> Option<StoreMeta> {
        let content = fs::read_to_string(self.meta_path(symbol)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Whether stored data fully covers `[start, end]`.
    pub fn covers(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> bool {
        match self.meta(symbol) {
            Some(meta) => meta.start_date <= start && meta.end_date >= end,
            None => false,
        }
    }

    /// All symbols present in the store, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Ok(entries) = fs::read_dir(&self.dir) {
            for entry in entries.flatten() {
                let name = entry.file_name().to_string_lossy().to_string();
                if let Some(symbol) = name.strip_suffix(".csv") {
                    out.push(symbol.to_string());
                }
            }
        }
        out.sort();
        out
    }
}

fn hash_bars(bars: &[&RawBar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
        hasher.update(&bar.adj_close.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
