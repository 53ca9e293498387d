//! Steady CLI - inspect run exports, generate test records, show config

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;

use steady::clock::{self, Clock};
use steady::error::{FixSuggestion, Result};
use steady::logs::{LogExport, LogFilter, LogLevel};
use steady::store::{generate::generate, DataExport, GenerateOptions, RecordKind};
use steady::SteadyConfig;

#[derive(Parser)]
#[command(name = "steady")]
#[command(about = "Steady - resilient e2e run logs and test data")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/steady/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print entries and summary of a log export
    Logs {
        /// Path to a logs-<run>.json file
        file: PathBuf,

        /// Only entries at exactly this level (debug, info, warn, error)
        #[arg(short, long)]
        level: Option<String>,

        /// Only entries with this tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Print summary and keys of a data export
    Data {
        /// Path to a data-<run>.json file
        file: PathBuf,
    },

    /// Generate synthetic records as JSON
    Generate {
        /// Record kind (user, employee, leave, performance, admin, custom)
        kind: String,

        /// Prefix for generated names and ids
        #[arg(short, long, default_value = "test")]
        prefix: String,

        /// Number of records
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Leave out the creation timestamp
        #[arg(long)]
        no_timestamp: bool,

        /// Seed for reproducible random values
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Show effective configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config (file + environment) as TOML
    Show,

    /// Print the default config file path
    Path,
}

fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Logs { file, level, tag } => show_logs(&file, level.as_deref(), tag),
        Commands::Data { file } => show_data(&file),
        Commands::Generate {
            kind,
            prefix,
            count,
            no_timestamp,
            seed,
        } => generate_records(&kind, prefix, count, !no_timestamp, seed),
        Commands::Config { action } => handle_config_command(action, cli.config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn show_logs(file: &Path, level: Option<&str>, tag: Option<String>) -> Result<()> {
    let export = LogExport::read(file)?;

    let mut filter = LogFilter::all();
    if let Some(level) = level {
        filter = filter.with_level(level.parse()?);
    }
    if let Some(tag) = tag {
        filter = filter.with_tag(tag);
    }

    let matching: Vec<_> = export.logs.iter().filter(|e| filter.matches(e)).collect();
    println!(
        "{} {} ({} of {} entries)",
        "Log export".cyan().bold(),
        export.timestamp.to_rfc3339(),
        matching.len(),
        export.logs.len()
    );
    println!();

    for entry in &matching {
        let line = entry.to_string();
        let line = match entry.level {
            LogLevel::Debug => line.dimmed(),
            LogLevel::Info => line.normal(),
            LogLevel::Warn => line.yellow(),
            LogLevel::Error => line.red(),
        };
        println!("{}", line);
    }

    println!();
    println!("{}", "Summary:".cyan().bold());
    println!("  total: {}", export.summary.total);
    for level in LogLevel::ALL {
        println!("  {:<6} {}", level.as_str(), export.summary.count(level));
    }
    if !export.summary.by_tag.is_empty() {
        println!("  {}", "by tag:".dimmed());
        for (tag, count) in &export.summary.by_tag {
            println!("    {:<30} {}", tag, count);
        }
    }

    Ok(())
}

fn show_data(file: &Path) -> Result<()> {
    let export = DataExport::read(file)?;

    println!(
        "{} {}",
        "Data export".cyan().bold(),
        export.timestamp.to_rfc3339()
    );
    println!("  entries: {}", export.data.len());
    println!("  approx bytes: {}", export.summary.approx_bytes);
    for (kind, count) in &export.summary.by_type {
        println!("  {:<8} {}", kind, count);
    }

    if !export.data.is_empty() {
        println!();
        println!("{}", "Keys:".cyan().bold());
        for key in export.data.keys() {
            println!("  {} {}", "•".dimmed(), key);
        }
    }

    Ok(())
}

fn generate_records(
    kind: &str,
    prefix: String,
    count: usize,
    include_timestamp: bool,
    seed: Option<u64>,
) -> Result<()> {
    let kind: RecordKind = kind.parse()?;
    let now = clock::system().now();

    let records: Vec<Value> = (0..count)
        .map(|i| {
            let mut options = GenerateOptions::default()
                .with_prefix(prefix.clone())
                .with_timestamp(include_timestamp);
            if let Some(seed) = seed {
                options = options.with_seed(seed.wrapping_add(i as u64));
            }
            generate(kind, &options, now)
        })
        .collect();

    let output = match records.as_slice() {
        [single] => serde_json::to_string_pretty(single)?,
        _ => serde_json::to_string_pretty(&records)?,
    };
    println!("{}", output);
    Ok(())
}

fn handle_config_command(action: ConfigAction, path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = match path {
                Some(path) => SteadyConfig::load_from(path)?,
                None => SteadyConfig::load()?,
            }
            .with_env()?;
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", SteadyConfig::config_path().display());
        }
    }
    Ok(())
}
