//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use crate::adapters::cached_data_adapter::CachedDataAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config::{StrengthConfig, cache_ttl_from_port, quote_table_from_port};
use crate::domain::currency::{Currency, InstrumentPair};
use crate::domain::engine::{StrengthEngine, StrengthReport};
use crate::domain::error::StrengthError;
use crate::domain::market_data::fetch_price_matrix;
use crate::domain::pair_resolver::{Orientation, resolve_pair};
use crate::domain::ranking::Snapshot;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use crate::ports::report_port::ReportPort;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Parser, Debug)]
#[command(name = "fxstrength", about = "Currency relative strength meter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute and print the current strength ranking
    Meter {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Write the full smoothed history as CSV
        #[arg(long)]
        history: Option<PathBuf>,
        /// Seconds between refreshes when --count > 1
        #[arg(long, default_value_t = 60)]
        interval: u64,
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,
    },
    /// Show how every ordered currency pair resolves
    Pairs {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a meter configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Meter {
            config,
            data_dir,
            history,
            interval,
            count,
        } => run_meter(
            &config,
            data_dir.as_deref(),
            history.as_deref(),
            Duration::from_secs(interval),
            count,
        ),
        Command::Pairs { config, data_dir } => run_pairs(&config, data_dir.as_deref()),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StrengthError> {
    tracing::info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

pub fn build_engine(adapter: &dyn ConfigPort) -> Result<StrengthEngine, StrengthError> {
    let config = StrengthConfig::from_port(adapter)?;
    let quotes = quote_table_from_port(adapter)?;
    StrengthEngine::new(config, quotes)
}

/// `--data-dir` wins over `[data] csv_dir`.
pub fn resolve_data_dir(
    override_dir: Option<&Path>,
    adapter: &dyn ConfigPort,
) -> Result<PathBuf, StrengthError> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    adapter
        .get_string("data", "csv_dir")
        .filter(|s| !s.trim().is_empty())
        .map(|s| PathBuf::from(s.trim()))
        .ok_or_else(|| StrengthError::ConfigMissing {
            section: "data".into(),
            key: "csv_dir".into(),
        })
}

/// Fetch every needed pair and run the engine once.
///
/// `Ok(None)` means no quoted pair within the configured currencies had data.
pub fn refresh(
    data_port: &dyn PriceDataPort,
    engine: &StrengthEngine,
) -> Result<Option<StrengthReport>, StrengthError> {
    let fetch = fetch_price_matrix(data_port, engine.quotes(), &engine.config().currencies)?;
    tracing::info!(
        fetched = fetch.fetched.len(),
        skipped = fetch.skipped.len(),
        samples = fetch.matrix.len(),
        "price data loaded"
    );
    if fetch.matrix.is_empty() {
        return Ok(None);
    }
    engine.compute(&fetch.matrix).map(Some)
}

/// Console rendering of one snapshot.
pub struct SnapshotView<'a> {
    pub snapshot: &'a Snapshot,
    pub config: &'a StrengthConfig,
}

impl fmt::Display for SnapshotView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot;
        let thresholds = &self.config.alerts;
        let at = snapshot
            .timestamp
            .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            f,
            "Currency strength at {} (RSI {}, smoothing {})",
            at, self.config.rsi_period, self.config.smoothing
        )?;
        writeln!(
            f,
            "{:>3}  {:<4} {:>6}  {:<16} {:<8} OPPONENTS",
            "#", "CUR", "SCORE", "BAND", "TREND"
        )?;
        for r in &snapshot.ranking {
            let marker = if r.is_reduced_confidence() { " *" } else { "" };
            writeln!(
                f,
                "{:>3}  {:<4} {:>6.2}  {:<16} {:<8} {}/{}{}",
                r.rank,
                r.currency.to_string(),
                r.score,
                r.band.to_string(),
                r.velocity.to_string(),
                r.opponents_used,
                r.opponents_possible,
                marker
            )?;
        }

        if !snapshot.insufficient.is_empty() {
            writeln!(f, "\nInsufficient data:")?;
            for i in &snapshot.insufficient {
                writeln!(f, "  {}  {}", i.currency, i.reason)?;
            }
        }

        let alerts = &snapshot.alerts;
        writeln!(f, "\nDivergence: {:.2}", alerts.divergence)?;
        if alerts.any() {
            writeln!(f, "Alerts:")?;
            if alerts.divergence_alert {
                writeln!(
                    f,
                    "  divergence {:.2} > {:.2}",
                    alerts.divergence, thresholds.divergence_above
                )?;
            }
            for c in &alerts.strong {
                writeln!(f, "  {} strong (> {:.2})", c, thresholds.strong_above)?;
            }
            for c in &alerts.weak {
                writeln!(f, "  {} weak (< {:.2})", c, thresholds.weak_below)?;
            }
        }
        Ok(())
    }
}

pub fn run_meter(
    config_path: &Path,
    data_dir: Option<&Path>,
    history: Option<&Path>,
    interval: Duration,
    count: u32,
) -> Result<(), StrengthError> {
    let adapter = load_config(config_path)?;
    let engine = build_engine(&adapter)?;
    let dir = resolve_data_dir(data_dir, &adapter)?;
    let ttl = cache_ttl_from_port(&adapter)?;

    tracing::info!(data_dir = %dir.display(), ttl_secs = ttl.as_secs(), "using csv data");
    let data_port = CachedDataAdapter::new(CsvAdapter::new(dir), ttl);

    for iteration in 0..count {
        if iteration > 0 {
            thread::sleep(interval);
            println!();
        }

        let report = refresh(&data_port, &engine)?.ok_or_else(|| StrengthError::InsufficientData {
            currency: "all".into(),
            reason: "no quoted pair within the configured currencies has data".into(),
        })?;

        let snapshot = report.snapshot();
        print!(
            "{}",
            SnapshotView {
                snapshot: &snapshot,
                config: engine.config(),
            }
        );

        if let Some(path) = history {
            CsvReportAdapter.write(&report, path)?;
        }
    }

    Ok(())
}

fn orientation_label(orientation: Option<Orientation>) -> &'static str {
    match orientation {
        Some(Orientation::Direct) => "Direct",
        Some(Orientation::Inverted) => "Inverted",
        None => "Unavailable",
    }
}

/// Resolution of every ordered pair, in configured currency order.
///
/// Without a data directory only the quote table is consulted.
pub fn pair_table(
    engine: &StrengthEngine,
    data_port: Option<&dyn PriceDataPort>,
) -> Result<Vec<(Currency, Currency, Option<Orientation>)>, StrengthError> {
    let currencies = &engine.config().currencies;
    let matrix = match data_port {
        Some(port) => Some(fetch_price_matrix(port, engine.quotes(), currencies)?.matrix),
        None => None,
    };

    let mut rows = Vec::new();
    for &base in currencies {
        for &quote in currencies.iter().filter(|&&q| q != base) {
            let orientation = match &matrix {
                Some(m) => resolve_pair(engine.quotes(), m, base, quote)
                    .ok()
                    .map(|r| r.orientation),
                None => engine.quotes().orientation(base, quote),
            };
            rows.push((base, quote, orientation));
        }
    }
    Ok(rows)
}

/// Pairs the data source can serve that the quote table never requests.
pub fn unquoted_sources(
    engine: &StrengthEngine,
    data_port: &dyn PriceDataPort,
) -> Result<Vec<InstrumentPair>, StrengthError> {
    Ok(data_port
        .list_pairs()?
        .into_iter()
        .filter(|pair| !engine.quotes().contains(pair))
        .collect())
}

pub fn run_pairs(config_path: &Path, data_dir: Option<&Path>) -> Result<(), StrengthError> {
    let adapter = load_config(config_path)?;
    let engine = build_engine(&adapter)?;

    let port = match resolve_data_dir(data_dir, &adapter) {
        Ok(dir) => Some(CsvAdapter::new(dir)),
        Err(StrengthError::ConfigMissing { .. }) => None,
        Err(e) => return Err(e),
    };
    let rows = pair_table(&engine, port.as_ref().map(|p| p as &dyn PriceDataPort))?;

    for (base, quote, orientation) in rows {
        println!("{}/{}  {}", base, quote, orientation_label(orientation));
    }

    if let Some(port) = &port {
        let unused = unquoted_sources(&engine, port)?;
        if !unused.is_empty() {
            println!("\nData files outside the quote table:");
            for pair in unused {
                println!("  {}", pair.symbol());
            }
        }
    }
    Ok(())
}

pub fn run_validate(config_path: &Path) -> Result<(), StrengthError> {
    let adapter = load_config(config_path)?;
    let engine = build_engine(&adapter)?;
    cache_ttl_from_port(&adapter)?;

    let config = engine.config();
    let pairs = engine.quotes().pairs_within(&config.currencies);
    println!("Config validated successfully");
    println!(
        "  currencies: {}",
        config
            .currencies
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",")
    );
    println!("  rsi_period: {}, smoothing: {}", config.rsi_period, config.smoothing);
    println!("  quoted pairs in use: {}", pairs.len());
    println!("  minimum samples: {}", config.min_samples());

    Ok(())
}
