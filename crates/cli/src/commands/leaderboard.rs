//! Leaderboard commands

use anyhow::{anyhow, Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use ramp_leaderboard_application::{compute_leaderboard, leaderboard_fingerprint, validate_records};
use ramp_leaderboard_common::config::{LeaderboardSettings, SettingsOverrides};
use ramp_leaderboard_common::datetime::format_datetime;
use ramp_leaderboard_domain::{
    Diagnostic, Leaderboard, LeaderboardConfig, LeaderboardError, MissingMetadataPolicy,
    TiePolicy,
};
use ramp_leaderboard_infrastructure::{load_input, LeaderboardCache, MetadataRegistry};

use crate::commands::CommandContext;
use crate::output::{colors, JsonFormatter, OutputFormat, PlainFormatter, TableFormatter};

/// Missing metadata handling
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum MissingMetadataArg {
    /// Abort when a ranked submission has no metadata
    Fail,
    /// Use placeholder metadata and report a diagnostic
    Placeholder,
}

impl From<MissingMetadataArg> for MissingMetadataPolicy {
    fn from(arg: MissingMetadataArg) -> Self {
        match arg {
            MissingMetadataArg::Fail => MissingMetadataPolicy::Fail,
            MissingMetadataArg::Placeholder => MissingMetadataPolicy::Placeholder,
        }
    }
}

/// Options shared by every command that computes a leaderboard
#[derive(Args, Debug, Clone, Default)]
pub struct LeaderboardArgs {
    /// Metric to rank by
    #[arg(long, value_name = "METRIC")]
    pub primary: Option<String>,

    /// Metric breaking ties within a tie group
    #[arg(long, value_name = "METRIC")]
    pub secondary: Option<String>,

    /// Give tied submissions the same rank
    #[arg(long)]
    pub shared_ranks: bool,

    /// What to do with submissions without metadata
    #[arg(long, value_enum)]
    pub missing_metadata: Option<MissingMetadataArg>,

    /// Row of RAMP scores.csv files to read (train, valid, test)
    #[arg(long)]
    pub step: Option<String>,

    /// Submission metadata file (.csv or .json)
    #[arg(long, value_name = "FILE")]
    pub metadata: Option<PathBuf>,
}

impl LeaderboardArgs {
    fn overrides(&self, precision: Option<usize>) -> SettingsOverrides {
        SettingsOverrides {
            primary_metric: self.primary.clone(),
            secondary_metric: self.secondary.clone(),
            tie_policy: self.shared_ranks.then_some(TiePolicy::Shared),
            missing_metadata: self.missing_metadata.map(Into::into),
            step: self.step.clone(),
            precision,
        }
    }
}

/// Display filters of `show`, applied after ranking
#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    pub limit: Option<usize>,
    pub precision: Option<usize>,
    pub complete_only: bool,
    pub no_cache: bool,
}

/// Export file format
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

/// One computed leaderboard and where it came from
#[derive(Debug, Serialize)]
pub struct LeaderboardReport {
    pub input: String,
    pub cached: bool,
    pub leaderboard: Leaderboard,
}

/// Outcome of `validate`
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub input: String,
    pub accepted: usize,
    pub rejected: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Everything resolved from settings before inputs are read
struct Prepared {
    settings: LeaderboardSettings,
    config: Arc<LeaderboardConfig>,
    metadata: Option<Arc<MetadataRegistry>>,
}

fn prepare(ctx: &CommandContext, args: &LeaderboardArgs, precision: Option<usize>) -> Result<Prepared> {
    let settings = LeaderboardSettings::load(ctx.settings_path.as_deref(), &args.overrides(precision))
        .context("Failed to load leaderboard settings")?;
    let config = settings
        .to_leaderboard_config()
        .map_err(|e| fatal(LeaderboardError::from(e)))?;

    let metadata = args
        .metadata
        .as_deref()
        .map(|path| {
            MetadataRegistry::load(path)
                .with_context(|| format!("Failed to load metadata from {}", path.display()))
        })
        .transpose()?
        .map(Arc::new);

    Ok(Prepared {
        settings,
        config: Arc::new(config),
        metadata,
    })
}

/// Error for a fatal leaderboard failure, naming its code
fn fatal(error: LeaderboardError) -> anyhow::Error {
    anyhow!("{} [{}]", error, error.error_code())
}

/// Load one input and compute its leaderboard, consulting the cache.
///
/// Rows that could not be parsed are appended to the diagnostics after the
/// cache lookup, so cached entries only hold engine output.
pub fn compute_input(
    path: &Path,
    config: &LeaderboardConfig,
    step: &str,
    extra_metadata: Option<&MetadataRegistry>,
    cache: Option<&dyn LeaderboardCache>,
) -> Result<LeaderboardReport> {
    let input = load_input(path, &config.metrics, step)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    let mut metadata = input.metadata.unwrap_or_default();
    if let Some(extra) = extra_metadata {
        metadata.merge(extra.clone());
    }

    let key = match cache {
        Some(_) => Some(leaderboard_fingerprint(config, &input.records, Some(metadata.entries()))?),
        None => None,
    };

    let cached = match (cache, key.as_deref()) {
        (Some(cache), Some(key)) => cache.get(key).unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring leaderboard cache");
            None
        }),
        _ => None,
    };
    let from_cache = cached.is_some();

    let mut leaderboard = match cached {
        Some(board) => board,
        None => {
            let board = compute_leaderboard(input.records, config, &metadata).map_err(fatal)?;
            if let (Some(cache), Some(key)) = (cache, key.as_deref()) {
                if let Err(e) = cache.put(key, &board) {
                    warn!(error = %e, "Failed to cache leaderboard");
                }
            }
            board
        }
    };
    leaderboard
        .diagnostics
        .extend(input.malformed.iter().map(Diagnostic::from));

    info!(input = %input.name, cached = from_cache, rows = leaderboard.len(), "Leaderboard ready");
    Ok(LeaderboardReport {
        input: input.name,
        cached: from_cache,
        leaderboard,
    })
}

/// Drop incomplete rows and cut to `limit`, keeping ranks as computed
pub fn apply_view(board: &mut Leaderboard, view: &ViewOptions) {
    if view.complete_only {
        board.rows.retain(|row| row.is_complete);
    }
    if let Some(limit) = view.limit {
        board.rows.truncate(limit);
    }
}

/// Compute and print one leaderboard per input.
///
/// Inputs are computed concurrently and printed in the order given.
pub async fn show(
    ctx: &CommandContext,
    inputs: Vec<PathBuf>,
    args: LeaderboardArgs,
    view: ViewOptions,
) -> Result<()> {
    let prepared = prepare(ctx, &args, view.precision.or(ctx.config.precision))?;
    let cache = ctx.cache(view.no_cache);
    let step = prepared.settings.step.clone();

    let handles: Vec<_> = inputs
        .into_iter()
        .map(|path| {
            let config = Arc::clone(&prepared.config);
            let metadata = prepared.metadata.clone();
            let cache = cache.clone();
            let step = step.clone();
            tokio::task::spawn_blocking(move || {
                compute_input(&path, &config, &step, metadata.as_deref(), cache.as_deref())
            })
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        let mut report = handle.await.context("Leaderboard task failed")??;
        apply_view(&mut report.leaderboard, &view);
        reports.push(report);
    }

    let precision = prepared.settings.display.precision;
    match ctx.output_format() {
        OutputFormat::Json => {
            if let [report] = reports.as_slice() {
                println!("{}", JsonFormatter::format(&report.leaderboard)?);
            } else {
                println!("{}", JsonFormatter::format(&reports)?);
            }
        }
        OutputFormat::Plain => {
            for report in &reports {
                if reports.len() > 1 {
                    println!("# {}", report.input);
                }
                println!("{}", PlainFormatter::leaderboard(&report.leaderboard, precision));
                print_diagnostics(&report.leaderboard.diagnostics, false);
            }
        }
        OutputFormat::Table => {
            for report in &reports {
                print_table(ctx, report, precision);
            }
        }
    }

    Ok(())
}

fn print_table(ctx: &CommandContext, report: &LeaderboardReport, precision: usize) {
    let board = &report.leaderboard;

    let mut title = format!("Leaderboard: {}", report.input);
    if report.cached {
        title.push_str(" (cached)");
    }
    println!("{}", colors::bold(&title));

    let mut ranking = format!("Ranked by {}", board.primary_metric);
    if let Some(secondary) = &board.secondary_metric {
        ranking.push_str(&format!(", ties broken by {}", secondary));
    }
    if board.tie_policy == TiePolicy::Shared {
        ranking.push_str(", shared ranks");
    }
    println!("{}", colors::dim(&ranking));
    println!();

    if board.is_empty() {
        println!("{}", colors::warning("No submissions."));
    } else {
        println!("{}", TableFormatter::leaderboard(board, precision, ctx.styled()));
    }
    print_diagnostics(&board.diagnostics, true);
    println!();
}

/// Diagnostics go to stderr so stdout stays the leaderboard itself
fn print_diagnostics(diagnostics: &[Diagnostic], as_table: bool) {
    if diagnostics.is_empty() {
        return;
    }
    eprintln!(
        "{}",
        colors::warning(&format!("{} diagnostic(s):", diagnostics.len()))
    );
    if as_table {
        eprintln!("{}", TableFormatter::diagnostics(diagnostics));
    } else {
        for d in diagnostics {
            eprintln!("{}\t{}\t{}", d.code, d.kind, d.message);
        }
    }
}

/// Compute a leaderboard and write it as JSON or CSV
pub async fn export(
    ctx: &CommandContext,
    input: PathBuf,
    args: LeaderboardArgs,
    format: ExportFormat,
    output_file: Option<PathBuf>,
) -> Result<()> {
    let prepared = prepare(ctx, &args, None)?;
    let step = prepared.settings.step.clone();
    let config = Arc::clone(&prepared.config);
    let metadata = prepared.metadata.clone();

    let report = tokio::task::spawn_blocking(move || {
        compute_input(&input, &config, &step, metadata.as_deref(), None)
    })
    .await
    .context("Leaderboard task failed")??;

    let output = match format {
        ExportFormat::Json => JsonFormatter::format(&report.leaderboard)?,
        ExportFormat::Csv => leaderboard_csv(&report.leaderboard)?,
    };

    if let Some(file) = output_file {
        std::fs::write(&file, output)
            .with_context(|| format!("Failed to write {}", file.display()))?;
        eprintln!(
            "{}",
            colors::success(&format!("Exported to: {}", file.display()))
        );
    } else {
        print!("{}", output);
    }

    Ok(())
}

/// One CSV row per leaderboard row; every metric gets value, std and folds
pub fn leaderboard_csv(board: &Leaderboard) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<String> = [
        "rank",
        "tie_group_id",
        "submission_id",
        "display_name",
        "author",
        "timestamp",
        "is_complete",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect();
    for metric in &board.metrics {
        header.push(metric.to_string());
        header.push(format!("{}_std", metric));
        header.push(format!("{}_folds", metric));
    }
    writer.write_record(&header)?;

    let number = |v: f64| if v.is_finite() { v.to_string() } else { String::new() };

    for row in &board.rows {
        let mut record = vec![
            row.rank.to_string(),
            row.tie_group_id.to_string(),
            row.submission_id.to_string(),
            row.metadata.display_name.clone(),
            row.metadata.author.clone(),
            row.metadata
                .timestamp
                .as_ref()
                .map(format_datetime)
                .unwrap_or_default(),
            row.is_complete.to_string(),
        ];
        for metric in &board.metrics {
            match row.score(metric) {
                Some(score) => {
                    record.push(number(score.value));
                    record.push(number(score.std_dev));
                    record.push(format!("{}/{}", score.n_folds_used, score.n_folds_expected));
                }
                None => record.extend([String::new(), String::new(), String::new()]),
            }
        }
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to finish CSV output: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Ingest an input without ranking and report every rejected record.
///
/// Fails when anything was rejected.
pub async fn validate(ctx: &CommandContext, input: PathBuf, args: LeaderboardArgs) -> Result<()> {
    let prepared = prepare(ctx, &args, None)?;
    let step = prepared.settings.step.clone();
    let config = Arc::clone(&prepared.config);

    let report = tokio::task::spawn_blocking(move || -> Result<ValidationReport> {
        let loaded = load_input(&input, &config.metrics, &step)
            .with_context(|| format!("Failed to load {}", input.display()))?;
        let ingestion = validate_records(loaded.records, &config.metrics);

        let mut diagnostics: Vec<Diagnostic> = loaded.malformed.iter().map(Diagnostic::from).collect();
        diagnostics.extend(ingestion.diagnostics());

        Ok(ValidationReport {
            input: loaded.name,
            accepted: ingestion.accepted,
            rejected: diagnostics.len(),
            diagnostics,
        })
    })
    .await
    .context("Validation task failed")??;

    match ctx.output_format() {
        OutputFormat::Json => println!("{}", JsonFormatter::format(&report)?),
        OutputFormat::Plain => println!("{}", PlainFormatter::format(&report)?),
        OutputFormat::Table => {
            println!("{}", colors::bold(&format!("Validation: {}", report.input)));
            println!("Accepted: {}", report.accepted);
            println!("Rejected: {}", report.rejected);
            if !report.diagnostics.is_empty() {
                println!("{}", TableFormatter::diagnostics(&report.diagnostics));
            }
        }
    }

    if report.rejected > 0 {
        anyhow::bail!(
            "{} of {} records rejected",
            report.rejected,
            report.accepted + report.rejected
        );
    }

    if ctx.output_format() == OutputFormat::Table {
        println!("{}", colors::success("All records accepted"));
    }
    Ok(())
}
