//! Artifact export — per-run manifest, equity CSV, and equity Parquet.
//!
//! Artifacts land under `{out_dir}/{run_id}/`:
//! - `manifest.json` — the full `BacktestReport`
//! - `equity.csv` — date, equity, turnover, net_return, cumulative_return
//! - `equity.parquet` — the same table for analysis tools
//!
//! Structural failures upstream mean this module is never reached — no
//! partial artifact directories are produced for failed runs.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::{Column, DataFrame, NamedFrom, ParquetWriter, Series};

use crate::runner::BacktestReport;

/// Paths of the artifacts written for one run.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub manifest: PathBuf,
    pub equity_csv: PathBuf,
    pub equity_parquet: PathBuf,
}

/// Save the full artifact set for a run. Returns the written paths.
pub fn save_artifacts(report: &BacktestReport, out_dir: &Path) -> Result<ArtifactPaths> {
    let run_dir = out_dir.join(&report.run_id);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact directory {}", run_dir.display()))?;

    let manifest = run_dir.join("manifest.json");
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    std::fs::write(&manifest, json)
        .with_context(|| format!("failed to write {}", manifest.display()))?;

    let equity_csv = run_dir.join("equity.csv");
    write_equity_csv(&equity_csv, report)?;

    let equity_parquet = run_dir.join("equity.parquet");
    write_equity_parquet(&equity_parquet, report)?;

    Ok(ArtifactPaths {
        run_dir,
        manifest,
        equity_csv,
        equity_parquet,
    })
}

fn write_equity_csv(path: &Path, report: &BacktestReport) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(["date", "equity", "turnover", "net_return", "cumulative_return"])?;

    let curve = &report.curve;
    for i in 0..curve.len() {
        writer.write_record([
            curve.dates[i].to_string(),
            format!("{:.4}", curve.equity[i]),
            format!("{:.6}", curve.turnover[i]),
            format!("{:.8}", curve.net_return[i]),
            format!("{:.8}", curve.cumulative_return[i]),
        ])?;
    }
    writer.flush().context("failed to flush equity CSV")?;
    Ok(())
}

fn write_equity_parquet(path: &Path, report: &BacktestReport) -> Result<()> {
    let curve = &report.curve;
    let dates: Vec<String> = curve.dates.iter().map(|d| d.to_string()).collect();

    let mut df = DataFrame::new(vec![
        Column::Series(Series::new("date".into(), dates).into()),
        Column::Series(Series::new("equity".into(), curve.equity.clone()).into()),
        Column::Series(Series::new("turnover".into(), curve.turnover.clone()).into()),
        Column::Series(Series::new("net_return".into(), curve.net_return.clone()).into()),
        Column::Series(Series::new(
            "cumulative_return".into(),
            curve.cumulative_return.clone(),
        ).into()),
    ])
    .context("failed to build equity dataframe")?;

    let mut file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .context("failed to write equity parquet")?;
    Ok(())
}
