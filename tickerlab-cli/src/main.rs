//! tickerlab CLI — scripted access to the market data loader.
//!
//! Commands:
//! - `show` — load and print close/returns previews plus the data hash
//! - `volatility` — print the per-ticker risk table
//! - `export` — write close and returns tables as CSV

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use tickerlab_core::data::{
    DataProvider, MarketDataLoader, MarketSnapshot, StdoutProgress, SyntheticProvider,
    TickerFrame, YahooProvider,
};
use tickerlab_core::stats::volatility;
use tickerlab_core::watchlist::Watchlist;

#[derive(Parser)]
#[command(name = "tickerlab", about = "tickerlab CLI — historical price tables and volatility")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Arguments shared by every data-loading command.
#[derive(Args)]
struct LoadArgs {
    /// Tickers to load. Defaults to the watchlist.
    #[arg(long, num_args = 1..)]
    tickers: Vec<String>,

    /// Start date (YYYY-MM-DD). Defaults to the watchlist start.
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD, inclusive). Defaults to the watchlist end.
    #[arg(long)]
    end: Option<String>,

    /// Watchlist TOML file. Defaults to ./watchlist.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use deterministic synthetic data instead of Yahoo Finance.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Cache TTL in seconds. Defaults to the watchlist value.
    #[arg(long)]
    ttl_secs: Option<u64>,

    /// Suppress per-ticker progress output.
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load data and print table previews.
    Show {
        #[command(flatten)]
        load: LoadArgs,

        /// Preview rows per table.
        #[arg(long, default_value_t = 5)]
        rows: usize,
    },
    /// Load data and print daily/annualized volatility per ticker.
    Volatility {
        #[command(flatten)]
        load: LoadArgs,
    },
    /// Load data and write close.csv and returns.csv.
    Export {
        #[command(flatten)]
        load: LoadArgs,

        /// Output directory.
        #[arg(long, default_value = "export")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Show { load, rows } => {
            let snapshot = run_load(&load)?;
            print_show(&snapshot, rows);
            Ok(())
        }
        Commands::Volatility { load } => {
            let snapshot = run_load(&load)?;
            print_volatility(&snapshot);
            Ok(())
        }
        Commands::Export { load, out_dir } => {
            let snapshot = run_load(&load)?;
            export_csv(&snapshot, &out_dir)
        }
    }
}

/// Resolve the watchlist, build the loader, and perform the load.
fn run_load(args: &LoadArgs) -> Result<Arc<MarketSnapshot>> {
    let watchlist = match &args.config {
        Some(path) => Watchlist::from_file(path).map_err(|e| anyhow!(e))?,
        None => {
            let default_path = PathBuf::from("watchlist.toml");
            if default_path.exists() {
                Watchlist::from_file(&default_path).map_err(|e| anyhow!(e))?
            } else {
                Watchlist::default_oslo()
            }
        }
    };

    let tickers = if args.tickers.is_empty() {
        watchlist.tickers.clone()
    } else {
        args.tickers.clone()
    };
    let start = parse_date(args.start.as_deref(), watchlist.start)?;
    let end = parse_date(args.end.as_deref(), watchlist.end)?;

    let provider: Arc<dyn DataProvider> = if args.synthetic {
        Arc::new(SyntheticProvider)
    } else {
        Arc::new(YahooProvider::new())
    };
    let ttl = Duration::from_secs(args.ttl_secs.unwrap_or(watchlist.cache_ttl_secs));
    let loader = MarketDataLoader::new(provider, ttl);

    let progress = StdoutProgress;
    let snapshot = loader.load_with_progress(
        &tickers,
        start,
        end,
        if args.quiet { None } else { Some(&progress) },
    )?;
    Ok(snapshot)
}

fn parse_date(arg: Option<&str>, default: NaiveDate) -> Result<NaiveDate> {
    match arg {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD")),
        None => Ok(default),
    }
}

fn print_show(snapshot: &MarketSnapshot, rows: usize) {
    println!(
        "Available tickers: {} | Rows: {}",
        snapshot.close.tickers().join(", "),
        snapshot.close.height()
    );
    println!("Data hash: {}", snapshot.fingerprint);
    println!("Fetched at: {}", snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S"));

    println!("\nClose prices (last {rows}):");
    print_frame_tail(&snapshot.close, rows, |v| format!("{v:>12.2}"));

    println!("\nDaily returns (last {rows}):");
    print_frame_tail(&snapshot.returns, rows, |v| format!("{:>11.2}%", v * 100.0));
}

fn print_frame_tail(frame: &TickerFrame, rows: usize, fmt: impl Fn(f64) -> String) {
    print!("{:<12}", "date");
    for ticker in frame.tickers() {
        print!("{ticker:>12}");
    }
    println!();
    for (date, values) in frame.tail(rows) {
        print!("{:<12}", date.format("%Y-%m-%d"));
        for v in values {
            if v.is_finite() {
                print!("{}", fmt(v));
            } else {
                print!("{:>12}", "-");
            }
        }
        println!();
    }
}

fn print_volatility(snapshot: &MarketSnapshot) {
    println!(
        "{:<10} {:>16} {:>17}",
        "Ticker", "Daily Std (%)", "Annual Std (%)"
    );
    for stat in volatility(&snapshot.returns) {
        if stat.daily_std.is_finite() {
            println!(
                "{:<10} {:>16.4} {:>17.2}",
                stat.ticker,
                stat.daily_std * 100.0,
                stat.annual_std * 100.0
            );
        } else {
            println!("{:<10} {:>16} {:>17}", stat.ticker, "-", "-");
        }
    }
}

fn export_csv(snapshot: &MarketSnapshot, out_dir: &PathBuf) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output directory {}", out_dir.display()))?;

    let close_path = out_dir.join("close.csv");
    write_frame_csv(&snapshot.close, &close_path)?;
    println!("Wrote {}", close_path.display());

    let returns_path = out_dir.join("returns.csv");
    write_frame_csv(&snapshot.returns, &returns_path)?;
    println!("Wrote {}", returns_path.display());

    Ok(())
}

/// Write a frame as CSV: date column first, one column per ticker, empty
/// cells for missing values.
fn write_frame_csv(frame: &TickerFrame, path: &std::path::Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;

    let mut header = vec!["date".to_string()];
    header.extend(frame.tickers().iter().cloned());
    writer.write_record(&header)?;

    for (row, date) in frame.dates().iter().enumerate() {
        let mut record = vec![date.format("%Y-%m-%d").to_string()];
        for col in 0..frame.width() {
            let v = frame.value(row, col);
            record.push(if v.is_finite() {
                format!("{v}")
            } else {
                String::new()
            });
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
