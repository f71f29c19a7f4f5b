mod settings;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use owo_colors::OwoColorize;
use releases_core::ValidationOptions;
use releases_core::ics::{WriteOptions, WriteReport, convert};
use releases_core::merge::merge_folder;
use settings::{Overrides, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "releases-ical")]
#[command(about = "Build an iCalendar file from a CSV listing of public data releases by federal agencies")]
struct Cli {
    /// Turn verbosity on
    #[arg(short, long)]
    verbose: bool,

    /// Turn debugging on
    #[arg(short, long)]
    debug: bool,

    /// Path to CSV listing of public data releases by federal agencies [default: ./releases.csv]
    #[arg(short, long, value_name = "PATH")]
    list_path: Option<PathBuf>,

    /// Path where the iCalendar file should be written [default: ./releases.ical]
    #[arg(short, long, value_name = "PATH")]
    ical_path: Option<PathBuf>,

    /// Merge every CSV listing under this folder, then convert the result
    #[arg(short, long, value_name = "DIR")]
    merge_folder: Option<PathBuf>,

    /// TOML settings file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Calendar display name (X-WR-CALNAME)
    #[arg(long)]
    calendar_name: Option<String>,

    /// Warn about malformed download URLs instead of skipping their rows
    #[arg(long)]
    lenient_urls: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            list_path: self.list_path.clone(),
            ical_path: self.ical_path.clone(),
            merge_folder: self.merge_folder.clone(),
            calendar_name: self.calendar_name.clone(),
            lenient_urls: self.lenient_urls,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = settings::load_settings(cli.config.as_deref(), cli.overrides())?;
    init_logging(log_level(cli.verbose, cli.debug, &settings.log_level));

    tracing::debug!(settings = ?settings, "Settings loaded");

    let report = run(&settings)?;
    print_report(&report, &settings);

    Ok(())
}

/// `--debug` wins over `--verbose`, which wins over the configured level.
fn log_level(verbose: bool, debug: bool, configured: &str) -> &str {
    if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        configured
    }
}

/// Install the stderr subscriber. `RUST_LOG` takes precedence when set.
fn init_logging(level: &str) {
    let (filter, invalid) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, false),
        Err(_) => match EnvFilter::try_new(level) {
            Ok(filter) => (filter, false),
            Err(_) => (EnvFilter::new("warn"), true),
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if invalid {
        tracing::warn!(level = %level, "Invalid log level in settings, keeping warn");
    }
}

fn run(settings: &Settings) -> Result<WriteReport> {
    let options = WriteOptions {
        calendar_name: settings.calendar_name.clone(),
        validation: ValidationOptions {
            url_policy: settings.url_policy,
        },
        dtstamp: Utc::now(),
    };

    match &settings.merge_folder {
        Some(folder) => {
            // Removed when `merged` drops, after conversion has read it
            let merged = tempfile::Builder::new()
                .prefix("releases-merged-")
                .suffix(".csv")
                .tempfile()
                .context("Could not create a temporary file for the merged listing")?;

            merge_folder(folder, merged.path())
                .with_context(|| format!("Could not merge CSV files in {}", folder.display()))?;

            convert(merged.path(), &settings.ical_path, &options)
                .with_context(|| format!("Could not write {}", settings.ical_path.display()))
        }
        None => convert(&settings.list_path, &settings.ical_path, &options).with_context(|| {
            format!(
                "Could not convert {} to {}",
                settings.list_path.display(),
                settings.ical_path.display()
            )
        }),
    }
}

fn print_report(report: &WriteReport, settings: &Settings) {
    println!(
        "{}",
        format!(
            "Wrote {} release events to {}",
            report.written,
            settings.ical_path.display()
        )
        .green()
    );

    if report.skipped.is_empty() {
        return;
    }

    println!(
        "{}",
        format!("Skipped {} invalid releases:", report.skipped.len()).yellow()
    );
    for skipped in &report.skipped {
        println!(
            "  line {}: {} {}",
            skipped.line,
            skipped.title,
            format!("({})", skipped.error).dimmed()
        );
    }
}
