//! RAMP Leaderboard CLI
//!
//! Command-line interface for computing, exporting and validating RAMP
//! leaderboards.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use ramp_leaderboard_cli::commands::leaderboard::{self, ExportFormat, LeaderboardArgs, ViewOptions};
use ramp_leaderboard_cli::commands::{preferences, CommandContext};
use ramp_leaderboard_cli::config::Config;
use ramp_leaderboard_cli::output::OutputFormat;
use ramp_leaderboard_common::config::TelemetrySettings;
use ramp_leaderboard_common::telemetry::init_tracing;

/// Output format for CLI commands
#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum CliOutputFormat {
    /// JSON output
    Json,
    /// Table output (default)
    #[default]
    Table,
    /// Plain text output
    Plain,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::Table => OutputFormat::Table,
            CliOutputFormat::Plain => OutputFormat::Plain,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ramp-leaderboard")]
#[command(author, version, about = "RAMP leaderboard CLI")]
#[command(long_about = "Compute RAMP leaderboards from cross-validation fold scores.\n\n\
    Inputs are score record files (CSV, JSON, JSON Lines) or RAMP kit directories.")]
#[command(propagate_version = true)]
struct Cli {
    /// Leaderboard settings file (defaults to ./ramp-leaderboard.toml)
    #[arg(long, global = true, env = "RAMP_LB_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format (defaults to the saved preference)
    #[arg(short = 'o', long, global = true, value_enum)]
    format: Option<CliOutputFormat>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute and show leaderboards
    #[command(alias = "s")]
    Show {
        /// Record files or RAMP kit directories
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        args: LeaderboardArgs,

        /// Number of rows to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Decimal places of scores
        #[arg(long)]
        precision: Option<usize>,

        /// Only show submissions with every fold valid
        #[arg(long)]
        complete_only: bool,

        /// Neither read nor write the leaderboard cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Export a leaderboard
    Export {
        /// Record file or RAMP kit directory
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[command(flatten)]
        args: LeaderboardArgs,

        /// Export format
        #[arg(short, long, value_enum, default_value = "json")]
        to: ExportFormat,

        /// Output file path (prints to stdout if not specified)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Check an input without ranking it
    Validate {
        /// Record file or RAMP kit directory
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[command(flatten)]
        args: LeaderboardArgs,
    },

    /// Show or change preferences
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current preferences
    Show,
    /// Set a preference
    Set {
        /// Preference key
        key: String,
        /// Preference value
        value: String,
    },
    /// Get a preference
    Get {
        /// Preference key
        key: String,
    },
    /// Reset preferences to defaults
    Reset,
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "ramp-leaderboard", &mut std::io::stdout());
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle completions command early (doesn't need config)
    if let Commands::Completions { shell } = cli.command {
        generate_completions(shell);
        return Ok(());
    }

    let mut config = Config::load()?;
    if let Some(format) = cli.format {
        config.output_format = format.into();
    }
    if cli.no_color {
        config.colored = false;
    }
    if !config.colored {
        colored::control::set_override(false);
    }

    let telemetry = TelemetrySettings::load(cli.config.as_deref())?;
    let (log_format, log_level) = config.tracing_setup(&telemetry, cli.verbose);
    init_tracing(log_format, &log_level)?;

    let ctx = CommandContext::new(config, cli.config, cli.verbose);

    // Execute command
    let result = match cli.command {
        Commands::Show {
            inputs,
            args,
            limit,
            precision,
            complete_only,
            no_cache,
        } => {
            let view = ViewOptions {
                limit,
                precision,
                complete_only,
                no_cache,
            };
            leaderboard::show(&ctx, inputs, args, view).await
        }

        Commands::Export {
            input,
            args,
            to,
            output,
        } => leaderboard::export(&ctx, input, args, to, output).await,

        Commands::Validate { input, args } => leaderboard::validate(&ctx, input, args).await,

        Commands::Config { command } => match command {
            Some(ConfigCommands::Show) | None => preferences::show(&ctx),
            Some(ConfigCommands::Set { key, value }) => preferences::set(&key, &value),
            Some(ConfigCommands::Get { key }) => preferences::get(&ctx, &key),
            Some(ConfigCommands::Reset) => preferences::reset(),
        },

        Commands::Completions { .. } => {
            // Already handled above
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        use colored::Colorize;
        eprintln!("{} {}", "Error:".red().bold(), e);
        if ctx.verbose {
            eprintln!("\n{}", "Caused by:".dimmed());
            eprintln!("{:?}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}
