//! pkmreport CLI - HT/DM clinic report workbooks
//!
//! Command-line interface for exporting Puskesmas statistics to Excel.

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use pkmreport_core::{
    ClinicStatRow, DiseaseType, RecordedStatistics, ReportConfig, ReportRenderer, ReportRequest,
    ReportType, StatisticsCalculator, StatisticsDataset,
};
use pkmreport_render::header::period_label;
use pkmreport_render::{Column, ColumnMap, ExcelReportRenderer, PeriodBlock};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pkmreport")]
#[command(author, version, about = "HT/DM Puskesmas report workbooks", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Workbook settings (TOML)
    #[arg(short, long, global = true, env = "PKMREPORT_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a statistics dataset to an Excel report
    Export {
        /// Statistics dataset (JSON)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Report type (all, monthly, quarterly)
        #[arg(short = 't', long = "type", default_value = "all")]
        report_type: ReportType,

        /// Disease programme (ht, dm); defaults to the dataset's
        #[arg(short, long)]
        disease: Option<DiseaseType>,

        /// Report year; defaults to the dataset's
        #[arg(short, long)]
        year: Option<i32>,

        /// Derive missing quarters and the year from the months
        #[arg(long)]
        rollup: bool,

        /// Output file (conventional report name if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a blank per-Puskesmas template
    Template {
        /// Clinic list (JSON array of `{"name", "target"}`)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Disease programme (ht, dm)
        #[arg(short, long, default_value = "ht")]
        disease: DiseaseType,

        /// Template year; defaults to the current year
        #[arg(short, long)]
        year: Option<i32>,

        /// Output file (conventional report name if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the column layout of a report type
    Columns {
        /// Report type (all, monthly, quarterly, puskesmas)
        #[arg(short = 't', long = "type", default_value = "all")]
        report_type: ReportType,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Export {
            input,
            report_type,
            disease,
            year,
            rollup,
            output,
        } => cmd_export(&config, &input, report_type, disease, year, rollup, output),
        Commands::Template {
            input,
            disease,
            year,
            output,
        } => cmd_template(&config, &input, disease, year, output),
        Commands::Columns { report_type, json } => cmd_columns(report_type, json),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Load the workbook settings, falling back to defaults without a file
fn load_config(path: Option<&Path>) -> Result<ReportConfig> {
    let Some(path) = path else {
        return Ok(ReportConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: ReportConfig =
        toml::from_str(&text).with_context(|| format!("Invalid config: {}", path.display()))?;
    info!(path = %path.display(), "loaded config");
    Ok(config)
}

fn cmd_export(
    config: &ReportConfig,
    input: &Path,
    report_type: ReportType,
    disease: Option<DiseaseType>,
    year: Option<i32>,
    rollup: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    if report_type == ReportType::Puskesmas {
        anyhow::bail!("Use `pkmreport template` for the puskesmas template");
    }

    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read dataset: {}", input.display()))?;
    let dataset = StatisticsDataset::from_json(&text)
        .with_context(|| format!("Invalid dataset: {}", input.display()))?;

    let request = ReportRequest::new(
        disease.unwrap_or(dataset.disease),
        year.unwrap_or(dataset.year),
        report_type,
    );
    if request.disease != dataset.disease || request.year != dataset.year {
        warn!(
            dataset_year = dataset.year,
            dataset_disease = %dataset.disease,
            "dataset does not cover the requested year and disease; values will be zero"
        );
    }

    let recorded = dataset.recorded();
    let rolled_up = dataset.rollup();
    let stats: &dyn StatisticsCalculator = if rollup { &rolled_up } else { &recorded };

    let path = output.unwrap_or_else(|| PathBuf::from(request.file_name()));
    write_report(config, &request, &dataset.clinics, stats, &path)
}

fn cmd_template(
    config: &ReportConfig,
    input: &Path,
    disease: DiseaseType,
    year: Option<i32>,
    output: Option<PathBuf>,
) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read clinic list: {}", input.display()))?;
    let clinics: Vec<ClinicStatRow> = serde_json::from_str(&text)
        .with_context(|| format!("Invalid clinic list: {}", input.display()))?;

    let year = year.unwrap_or_else(|| chrono::Local::now().year());
    let request = ReportRequest::new(disease, year, ReportType::Puskesmas);
    // the template never reads statistics
    let stats = RecordedStatistics::new(year, disease);

    let path = output.unwrap_or_else(|| PathBuf::from(request.file_name()));
    write_report(config, &request, &clinics, &stats, &path)
}

fn write_report(
    config: &ReportConfig,
    request: &ReportRequest,
    clinics: &[ClinicStatRow],
    stats: &dyn StatisticsCalculator,
    path: &Path,
) -> Result<()> {
    let bytes = ExcelReportRenderer::from_config(config)
        .render(request, clinics, stats)
        .with_context(|| format!("Failed to render {} report", request.report_type))?;
    std::fs::write(path, &bytes).with_context(|| format!("Failed to write: {}", path.display()))?;

    println!(
        "Wrote {} ({} clinics, {} bytes)",
        path.display(),
        clinics.len(),
        bytes.len()
    );
    Ok(())
}

#[derive(Serialize)]
struct ColumnListing {
    report_type: ReportType,
    last_column: Column,
    blocks: Vec<PeriodBlock>,
}

fn cmd_columns(report_type: ReportType, json: bool) -> Result<()> {
    let map = ColumnMap::new(report_type);
    let listing = ColumnListing {
        report_type,
        last_column: map.last_column(),
        blocks: map.blocks(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("{report_type}: A-{}", listing.last_column);
    println!("  {:<20} A", "NO");
    println!("  {:<20} B", "NAMA PUSKESMAS");
    println!("  {:<20} C", "SASARAN");
    let year = chrono::Local::now().year();
    for block in &listing.blocks {
        println!(
            "  {:<20} {}-{}",
            period_label(block.period, year),
            block.first(),
            block.last()
        );
    }
    Ok(())
}
