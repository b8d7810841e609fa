use anyhow::{Context as _, Result};
use carbonsight::config::{self, PipelineSettings};
use carbonsight::inventory::{self, DerivedDataset, Source};
use carbonsight::report;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "carbonsight",
    about = "Greenhouse-gas activity data: validate, derive CO2e, find hotspots"
)]
pub struct Cli {
    /// Path to a JSON settings file. Defaults to the platform config directory.
    #[arg(long, global = true, env = "CARBONSIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Only log to the console
    #[arg(long, global = true)]
    pub no_log_file: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the built-in five-record sample dataset as CSV
    Sample {
        #[arg(short, long, default_value = "data/raw/emissions_data.csv")]
        output: PathBuf,
    },
    /// Check required columns and report missing values
    Validate {
        /// Activity data (CSV, TSV, Parquet, JSON, XLSX/XLS/ODS)
        #[arg(short, long)]
        file: PathBuf,

        /// Fail if any value is missing
        #[arg(long)]
        strict: bool,
    },
    /// Derive emissions_co2e_kg for every record
    Compute {
        #[arg(short, long)]
        file: PathBuf,

        /// Write the derived dataset (csv, parquet or json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the largest emitters
    Top {
        #[arg(short, long)]
        file: PathBuf,

        /// Number of records. Defaults to the configured top_n.
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        count: Option<i64>,
    },
    /// Cut the emission factor of one activity type by a percentage
    Simulate {
        #[arg(short, long)]
        file: PathBuf,

        /// Activity type to adjust, matched exactly
        #[arg(short, long)]
        activity: String,

        /// Reduction in percent, 0 to 100
        #[arg(short, long, allow_negative_numbers = true)]
        percent: f64,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Total emissions per activity type
    Summary {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run_command(cli: Cli) -> Result<()> {
    let settings = config::load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Sample { output } => handle_sample(&output),
        Commands::Validate { file, strict } => handle_validate(&file, strict, &settings),
        Commands::Compute { file, output } => handle_compute(&file, output.as_deref(), &settings),
        Commands::Top { file, count } => handle_top(&file, count, &settings),
        Commands::Simulate {
            file,
            activity,
            percent,
            output,
        } => handle_simulate(&file, &activity, percent, output.as_deref(), &settings),
        Commands::Summary { file, output } => handle_summary(&file, output.as_deref(), &settings),
    }
}

fn handle_sample(output: &Path) -> Result<()> {
    inventory::write_sample_csv(output)?;
    println!("Sample data written to {}", output.display());
    Ok(())
}

fn handle_validate(file: &Path, strict: bool, settings: &PipelineSettings) -> Result<()> {
    let dataset = inventory::load(file)?;
    let report = inventory::validate(&dataset, &settings.required_columns)?;

    println!(
        "{}: {} rows, {} columns",
        file.display(),
        report.row_count,
        report.fields.len()
    );
    for field in &report.fields {
        println!(
            "  {:<24} {:<9} missing: {}",
            field.name,
            field.kind.as_str(),
            field.missing
        );
    }

    if strict || settings.strict_validation {
        report.into_strict()?;
        println!("Strict validation passed.");
    } else if report.has_warnings() {
        println!("Warning: {} missing values detected.", report.total_missing());
    } else {
        println!("No missing values detected.");
    }
    Ok(())
}

fn derive(file: &Path, settings: &PipelineSettings) -> Result<DerivedDataset> {
    let outcome = inventory::run_pipeline(Source::Path(file.to_path_buf()), settings)
        .with_context(|| format!("Pipeline failed for {}", file.display()))?;
    if outcome.report.has_warnings() {
        println!(
            "Note: {} missing values in input (see `validate`).",
            outcome.report.total_missing()
        );
    }
    Ok(outcome.derived)
}

fn resolve_output(path: &Path, settings: &PipelineSettings) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(&settings.export_format)
    }
}

fn handle_compute(file: &Path, output: Option<&Path>, settings: &PipelineSettings) -> Result<()> {
    let derived = derive(file, settings)?;
    print!("{}", report::render_table(&derived.records()?));
    println!(
        "Total: {:.3} kg CO2e",
        inventory::total_emissions(&derived)?
    );

    if let Some(output) = output {
        let output = resolve_output(output, settings);
        report::export(&derived, &output)?;
        println!("Derived dataset written to {}", output.display());
    }
    Ok(())
}

fn handle_top(file: &Path, count: Option<i64>, settings: &PipelineSettings) -> Result<()> {
    let derived = derive(file, settings)?;
    let n = match count {
        Some(n) => n,
        None => i64::try_from(settings.top_n).context("top_n is too large")?,
    };

    let top = inventory::top_emitters(&derived, n)?;
    print!("{}", report::render_table(&top.records()?));
    Ok(())
}

fn handle_simulate(
    file: &Path,
    activity: &str,
    percent: f64,
    output: Option<&Path>,
    settings: &PipelineSettings,
) -> Result<()> {
    let derived = derive(file, settings)?;
    let before = inventory::total_emissions(&derived)?;

    let simulation = inventory::simulate_reduction(&derived, activity, percent)?;
    if let Some(warning) = &simulation.warning {
        println!("Warning: {warning}. Data unchanged.");
    }

    let after = inventory::total_emissions(&simulation.dataset)?;
    print!("{}", report::render_table(&simulation.dataset.records()?));
    println!(
        "Total: {before:.3} -> {after:.3} kg CO2e ({} records adjusted)",
        simulation.matched
    );

    if let Some(output) = output {
        let output = resolve_output(output, settings);
        report::export(&simulation.dataset, &output)?;
        println!("Scenario written to {}", output.display());
    }
    Ok(())
}

fn handle_summary(file: &Path, output: Option<&Path>, settings: &PipelineSettings) -> Result<()> {
    let derived = derive(file, settings)?;
    let summaries = inventory::summary_by_activity(&derived)?;
    print!("{}", report::render_summary(&summaries));

    if let Some(output) = output {
        let output = resolve_output(output, settings);
        report::export_summary(&summaries, &output)?;
        println!("Summary written to {}", output.display());
    }
    Ok(())
}
