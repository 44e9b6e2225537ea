//! AlphaLab CLI — download and run commands.
//!
//! Commands:
//! - `download` — fetch market data from Yahoo Finance into the local store
//! - `run` — execute a backtest from a TOML config file or inline flags
//! - `store status` — report stored symbols and date ranges

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use alphalab_core::data::{download_symbols, CsvStore, StdoutProgress, YahooProvider};
use alphalab_runner::{
    run_single_backtest, run_sweep, save_artifacts, BacktestConfig, BacktestReport, StrategyKind,
};

#[derive(Parser)]
#[command(
    name = "alphalab",
    about = "AlphaLab CLI — iterative portfolio backtesting"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download market data from Yahoo Finance into the local store.
    Download {
        /// Symbols to download (e.g., SPY QQQ AAPL).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD). Defaults to 10 years ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Force re-download even if stored.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Store directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        store_dir: PathBuf,
    },
    /// Execute a backtest from a TOML config file or inline flags.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Strategy name: equal_weight or trend_following (with --tickers).
        #[arg(long)]
        strategy: Option<String>,

        /// Tickers (required with --strategy).
        #[arg(long, num_args = 1..)]
        tickers: Vec<String>,

        /// Start date (YYYY-MM-DD). Defaults to 5 years ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Offline mode: no network access.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Use synthetic data as fallback.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Also run every other strategy and print a comparison.
        #[arg(long, default_value_t = false)]
        compare: bool,

        /// Store directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        store_dir: PathBuf,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "results")]
        out_dir: PathBuf,
    },
    /// Report stored symbols and their date ranges.
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// List stored symbols, bar counts, and date ranges.
    Status {
        /// Store directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        store_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Download {
            symbols,
            start,
            end,
            force,
            store_dir,
        } => run_download(symbols, start, end, force, store_dir),
        Commands::Run {
            config,
            strategy,
            tickers,
            start,
            end,
            offline,
            synthetic,
            compare,
            store_dir,
            out_dir,
        } => run_backtest_cmd(
            config, strategy, tickers, start, end, offline, synthetic, compare, store_dir, out_dir,
        ),
        Commands::Store { action } => match action {
            StoreAction::Status { store_dir } => run_store_status(&store_dir),
        },
    }
}

fn parse_date_arg(value: Option<&str>, default_days_back: i64) -> Result<NaiveDate> {
    match value {
        Some(s) => Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?),
        None => {
            Ok(chrono::Local::now().date_naive() - chrono::Duration::days(default_days_back))
        }
    }
}

fn run_download(
    symbols: Vec<String>,
    start: Option<String>,
    end: Option<String>,
    force: bool,
    store_dir: PathBuf,
) -> Result<()> {
    let start_date = parse_date_arg(start.as_deref(), 365 * 10)?;
    let end_date = parse_date_arg(end.as_deref(), 0)?;

    let provider = YahooProvider::new();
    let store = CsvStore::new(store_dir);
    let progress = StdoutProgress;

    let sym_refs: Vec<&str> = symbols.iter().map(|s| s.as_str()).collect();
    let summary = download_symbols(
        &provider, &store, &sym_refs, start_date, end_date, force, &progress,
    );

    if !summary.all_succeeded() {
        for (sym, err) in &summary.errors {
            eprintln!("Error for {sym}: {err}");
        }
        std::process::exit(1);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_backtest_cmd(
    config_path: Option<PathBuf>,
    strategy_name: Option<String>,
    tickers: Vec<String>,
    start: Option<String>,
    end: Option<String>,
    offline: bool,
    synthetic: bool,
    compare: bool,
    store_dir: PathBuf,
    out_dir: PathBuf,
) -> Result<()> {
    if config_path.is_some() && strategy_name.is_some() {
        bail!("--config and --strategy are mutually exclusive");
    }
    if config_path.is_none() && strategy_name.is_none() {
        bail!("one of --config or --strategy is required");
    }

    let mut config = if let Some(path) = config_path {
        BacktestConfig::from_file(&path)?
    } else {
        build_config_from_flags(
            &strategy_name.unwrap(),
            &tickers,
            start.as_deref(),
            end.as_deref(),
            &store_dir,
        )?
    };
    // CLI flags can force offline/synthetic on top of the config file, but
    // never un-set what the file requests.
    config.data.offline |= offline;
    config.data.synthetic |= synthetic;
    let offline = config.data.offline;

    let store = CsvStore::new(&config.data.store_dir);
    let provider = YahooProvider::new();
    let provider_ref: Option<&dyn alphalab_core::data::DataProvider> =
        if offline { None } else { Some(&provider) };

    let report = run_single_backtest(&config, &store, provider_ref)?;
    print_summary(&report);

    if compare {
        let symbols: Vec<&str> = config.backtest.tickers.iter().map(|s| s.as_str()).collect();
        let opts = alphalab_runner::LoadOptions {
            start: config.start_date(),
            end: config.end_date(),
            offline,
            synthetic: config.data.synthetic,
        };
        let loaded = alphalab_runner::load_bars(&symbols, &store, provider_ref, &opts)?;
        let sweep = run_sweep(
            &config,
            &[StrategyKind::EqualWeight, StrategyKind::TrendFollowing],
            &loaded,
        )?;
        print_comparison(&sweep);
    }

    let paths = save_artifacts(&report, &out_dir)?;
    println!("Artifacts saved to: {}", paths.run_dir.display());

    Ok(())
}

fn build_config_from_flags(
    strategy: &str,
    tickers: &[String],
    start: Option<&str>,
    end: Option<&str>,
    store_dir: &Path,
) -> Result<BacktestConfig> {
    match strategy {
        "equal_weight" | "trend_following" => {}
        other => bail!("unknown strategy '{other}'. Valid: equal_weight, trend_following"),
    }
    if tickers.is_empty() {
        bail!("--tickers is required with --strategy");
    }

    let start_date = parse_date_arg(start, 365 * 5)?;
    let end_date = parse_date_arg(end, 0)?;

    // Build a TOML string and parse it — the config goes through the same
    // validation path as a file.
    let ticker_list = tickers
        .iter()
        .map(|t| format!("\"{t}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let toml_str = format!(
        r#"[backtest]
tickers = [{ticker_list}]
start_date = "{start_date}"
end_date = "{end_date}"

[strategy]
kind = "{strategy}"

[data]
store_dir = "{}"
"#,
        store_dir.display()
    );

    Ok(BacktestConfig::from_toml(&toml_str)?)
}

fn run_store_status(store_dir: &Path) -> Result<()> {
    if !store_dir.exists() {
        println!("Store directory does not exist: {}", store_dir.display());
        return Ok(());
    }

    let store = CsvStore::new(store_dir);
    let symbols = store.symbols();
    if symbols.is_empty() {
        println!("Store is empty: {}", store_dir.display());
        return Ok(());
    }

    println!("Store: {}", store_dir.display());
    println!("Symbols: {}", symbols.len());
    println!();
    println!("{:<8} {:<25} {:<12}", "Symbol", "Date Range", "Bars");
    println!("{}", "-".repeat(47));
    for symbol in &symbols {
        match store.meta(symbol) {
            Some(meta) => println!(
                "{:<8} {:<25} {:<12}",
                symbol,
                format!("{} to {}", meta.start_date, meta.end_date),
                format!("{} bars", meta.bar_count)
            ),
            None => println!("{:<8} {:<25} {:<12}", symbol, "(no meta)", "-"),
        }
    }

    Ok(())
}

fn print_summary(report: &BacktestReport) {
    println!();
    println!("=== Backtest Result ===");
    println!("Strategy:       {}", report.strategy);
    println!("Tickers:        {}", report.tickers.join(", "));
    println!(
        "Period:         {} to {}",
        report.start_date, report.end_date
    );
    println!("Trading days:   {}", report.n_dates);
    println!("Capital:        {:.2}", report.initial_capital);
    println!("Cost:           {:.1} bps", report.cost_bps);
    println!();
    println!("--- Performance ---");
    println!(
        "Total Return:   {:.2}%",
        report.metrics.total_return * 100.0
    );
    println!("CAGR:           {:.2}%", report.metrics.cagr * 100.0);
    println!("Sharpe:         {:.3}", report.metrics.sharpe);
    println!("Sortino:        {:.3}", report.metrics.sortino);
    println!("Calmar:         {:.3}", report.metrics.calmar);
    println!(
        "Max Drawdown:   {:.2}%",
        report.metrics.max_drawdown * 100.0
    );
    println!(
        "Avg Turnover:   {:.2}%/day",
        report.metrics.avg_daily_turnover * 100.0
    );
    if report.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}

fn print_comparison(sweep: &alphalab_runner::SweepReport) {
    println!("--- Strategy Comparison ---");
    println!(
        "{:<18} {:>12} {:>10} {:>12}",
        "Strategy", "Total Ret", "Sharpe", "Max DD"
    );
    for entry in &sweep.entries {
        println!(
            "{:<18} {:>11.2}% {:>10.3} {:>11.2}%",
            entry.strategy,
            entry.metrics.total_return * 100.0,
            entry.metrics.sharpe,
            entry.metrics.max_drawdown * 100.0
        );
    }
    println!();
}
