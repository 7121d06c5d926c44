//! Allocator CLI - portfolio analysis over CSV price histories.
//!
//! Every command prints one JSON `ApiResponse` envelope on stdout. Logs go to
//! stderr and are controlled with `RUST_LOG`.

use allocator_core::{
    align, allocation_sweep, analyze,
    ingest::{discover_csv_files, load_csv},
    returns::parse_date,
    AlignmentPolicy, AnalysisConfig, ApiResponse, AssetReturnSeries, DateWindow, ParseError,
    SplitPoints, WeightVector,
};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "allocator")]
#[command(about = "Weighted portfolio returns and risk metrics from CSV price histories")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List CSV price files in a directory
    Files {
        /// Directory to scan
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Analyze a weighted portfolio
    Analyze {
        /// CSV file per asset (repeatable)
        #[arg(short, long = "file", required = true)]
        files: Vec<PathBuf>,
        /// Explicit weights, e.g. TLT=0.4,SPY=0.6
        #[arg(short, long, conflicts_with = "split")]
        weights: Option<String>,
        /// Split points s1,s2 for exactly three assets
        #[arg(long)]
        split: Option<String>,
        /// Use equal weights when no weights or split points are configured
        #[arg(long, conflicts_with_all = ["weights", "split"])]
        equal_weights: bool,
        /// Window start (inclusive)
        #[arg(long, value_parser = cli_date, requires = "end", conflicts_with = "first_year")]
        start: Option<NaiveDate>,
        /// Window end (inclusive)
        #[arg(long, value_parser = cli_date, requires = "start")]
        end: Option<NaiveDate>,
        /// First calendar year of the window
        #[arg(long, requires = "last_year")]
        first_year: Option<i32>,
        /// Last calendar year of the window
        #[arg(long, requires = "first_year")]
        last_year: Option<i32>,
        #[command(flatten)]
        settings: Settings,
    },
    /// Sweep the weight split between two assets
    Sweep {
        /// CSV file per asset (exactly two)
        #[arg(short, long = "file", required = true)]
        files: Vec<PathBuf>,
        /// Weight increment for the first asset
        #[arg(long, default_value = "0.1")]
        step: f64,
        #[command(flatten)]
        settings: Settings,
    },
}

#[derive(clap::Args)]
struct Settings {
    /// Annual risk-free rate for the Sharpe ratio
    #[arg(long)]
    risk_free: Option<f64>,
    /// Return periods per year
    #[arg(long)]
    periods: Option<u32>,
    /// Alignment policy (date-intersection or tail-trim)
    #[arg(long, value_parser = cli_policy)]
    policy: Option<AlignmentPolicy>,
    /// Config file (defaults to $ALLOCATOR_CONFIG or the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Settings {
    fn load_config(&self) -> Result<AnalysisConfig> {
        let path = self
            .config
            .clone()
            .unwrap_or_else(AnalysisConfig::default_path);
        let mut config = AnalysisConfig::load_from_path(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?;

        if let Some(rate) = self.risk_free {
            config.risk_free_rate = rate;
        }
        if let Some(periods) = self.periods {
            config.annualization_periods = periods;
        }
        if let Some(policy) = self.policy {
            config.alignment = policy;
        }
        Ok(config)
    }
}

fn cli_date(text: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(text).ok_or_else(|| format!("not a date: {text}"))
}

fn cli_policy(text: &str) -> std::result::Result<AlignmentPolicy, String> {
    match text {
        "date-intersection" | "date" => Ok(AlignmentPolicy::DateIntersection),
        "tail-trim" | "tail" => Ok(AlignmentPolicy::TailTrim),
        other => Err(format!(
            "unknown policy {other:?}, expected date-intersection or tail-trim"
        )),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Files { dir } => handle_files(&dir),
        Commands::Analyze {
            files,
            weights,
            split,
            equal_weights,
            start,
            end,
            first_year,
            last_year,
            settings,
        } => {
            let window = match (start, end, first_year, last_year) {
                (Some(start), Some(end), _, _) => Some(DateWindow::new(start, end)),
                (_, _, Some(first), Some(last)) => Some(DateWindow::years(first, last)),
                _ => None,
            };
            window
                .transpose()
                .map_err(anyhow::Error::from)
                .and_then(|window| {
                    let choice = WeightChoice {
                        weights: weights.as_deref(),
                        split: split.as_deref(),
                        equal_weights,
                    };
                    handle_analyze(&files, &choice, window, &settings)
                })
        }
        Commands::Sweep {
            files,
            step,
            settings,
        } => handle_sweep(&files, step, &settings),
    };

    match result {
        Ok(data) => {
            println!("{}", render(&ApiResponse::ok(data)));
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "command failed");
            println!("{}", render(&ApiResponse::<()>::err(format!("{e:#}"))));
            ExitCode::FAILURE
        }
    }
}

fn render<T: Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string_pretty(response).unwrap_or_else(|e| {
        json!({ "ok": false, "error": format!("failed to encode response: {e}") }).to_string()
    })
}

#[derive(Serialize)]
struct Rejected {
    asset: String,
    errors: Vec<ParseError>,
}

/// Load and build every file, logging rows the builder rejected.
fn load_series(files: &[PathBuf]) -> Result<(Vec<AssetReturnSeries>, Vec<Rejected>)> {
    let mut series = Vec::with_capacity(files.len());
    let mut rejected = Vec::new();

    for path in files {
        let source = load_csv(path).with_context(|| format!("failed to read {}", path.display()))?;
        let outcome = source.build();

        for error in &outcome.rejected {
            tracing::warn!(asset = %source.asset, %error, "rejected observation field");
        }
        if !outcome.rejected.is_empty() {
            rejected.push(Rejected {
                asset: source.asset.clone(),
                errors: outcome.rejected,
            });
        }
        series.push(outcome.series);
    }

    Ok((series, rejected))
}

fn parse_weights(text: &str) -> Result<BTreeMap<String, f64>> {
    let mut weights = BTreeMap::new();
    for pair in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((asset, weight)) = pair.split_once('=') else {
            bail!("expected ASSET=WEIGHT, got {pair:?}");
        };
        let weight: f64 = weight
            .trim()
            .parse()
            .with_context(|| format!("invalid weight for {}", asset.trim()))?;
        if weights.insert(asset.trim().to_string(), weight).is_some() {
            bail!("asset {} weighted twice", asset.trim());
        }
    }
    Ok(weights)
}

fn parse_split(text: &str) -> Result<SplitPoints> {
    let Some((first, second)) = text.split_once(',') else {
        bail!("expected split points as s1,s2, got {text:?}");
    };
    Ok(SplitPoints::new(
        first.trim().parse().context("invalid first split point")?,
        second.trim().parse().context("invalid second split point")?,
    ))
}

fn handle_files(dir: &Path) -> Result<Value> {
    let mut files = Vec::new();
    for path in discover_csv_files(dir)? {
        let source = load_csv(&path).with_context(|| format!("failed to read {}", path.display()))?;
        files.push(json!({
            "path": path,
            "asset": source.asset,
            "observations": source.observations.len(),
        }));
    }
    Ok(json!({ "files": files }))
}

/// Weight options given on the command line.
struct WeightChoice<'a> {
    weights: Option<&'a str>,
    split: Option<&'a str>,
    equal_weights: bool,
}

/// Fill in equal weights when asked to and nothing else is configured.
///
/// Returns whether equal weights were applied. Without `--equal-weights` an
/// unconfigured weight vector is an error.
fn apply_equal_weights(
    config: &mut AnalysisConfig,
    assets: &[&str],
    equal_weights: bool,
) -> Result<bool> {
    if config.weights.is_some() || config.split.is_some() {
        return Ok(false);
    }
    if !equal_weights {
        bail!("no weights configured: pass --weights, --split or --equal-weights");
    }

    let equal = WeightVector::equal(assets.iter().copied())?;
    tracing::info!(assets = equal.len(), "using equal weights");
    config.weights = Some(
        equal
            .entries()
            .iter()
            .map(|e| (e.asset.clone(), e.weight))
            .collect(),
    );
    Ok(true)
}

fn handle_analyze(
    files: &[PathBuf],
    choice: &WeightChoice<'_>,
    window: Option<DateWindow>,
    settings: &Settings,
) -> Result<Value> {
    let mut config = settings.load_config()?;
    if let Some(text) = choice.weights {
        config.weights = Some(parse_weights(text)?);
        config.split = None;
    }
    if let Some(text) = choice.split {
        config.split = Some(parse_split(text)?);
        config.weights = None;
    }
    if window.is_some() {
        config.window = window;
    }

    let (series, rejected) = load_series(files)?;

    let assets: Vec<&str> = series.iter().map(|s| s.asset()).collect();
    let weights_defaulted = apply_equal_weights(&mut config, &assets, choice.equal_weights)?;

    let report = analyze(&series, &config)?;
    Ok(json!({
        "report": report,
        "weights_defaulted": weights_defaulted,
        "rejected": rejected,
    }))
}

fn handle_sweep(files: &[PathBuf], step: f64, settings: &Settings) -> Result<Value> {
    if files.len() != 2 {
        bail!("sweep needs exactly 2 files, got {}", files.len());
    }
    let config = settings.load_config()?;
    config.validate()?;

    let (series, rejected) = load_series(files)?;
    let panel = align(&series, config.alignment)?;
    if panel.is_empty() {
        bail!("the two assets share no return dates");
    }

    let points = allocation_sweep(&panel, step, &config.summary_options())?;
    Ok(json!({
        "assets": panel.assets(),
        "alignment": panel.policy(),
        "panel_rows": panel.len(),
        "misaligned_rows": panel.misaligned_rows(),
        "points": points,
        "rejected": rejected,
    }))
}
