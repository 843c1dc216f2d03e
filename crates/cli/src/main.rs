//! CLI tool for generating project-approval slide decks from an issue
//! tracker CSV export.

use anyhow::{Context, Result};
use clap::Parser;
use deck_core::{
    AssemblyOptions, LogProgress, NameLookupTable, RawTable, ReportConfig, ReportPipeline,
    RunSummary,
};
use deck_pptx::PptxTemplate;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Generate one approval deck per sponsor department.
#[derive(Parser, Debug)]
#[command(name = "approval-deck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Issue tracker export (.csv)
    data: PathBuf,

    /// Output prefix; decks are written to PREFIX/<name>_<group>.pptx
    prefix: PathBuf,

    /// Template presentation providing the slide layouts
    #[arg(short, long, default_value = "template.pptx")]
    template: PathBuf,

    /// Username to full name lookup table (.csv)
    #[arg(short, long, default_value = "names.csv")]
    names: PathBuf,

    /// Report configuration (JSON); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Insert a blank slide after every title slide
    #[arg(short, long)]
    double_sided: bool,

    /// Leave out the cover slide
    #[arg(long)]
    no_cover: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = load_config(args.config.as_deref())?;
    let names = NameLookupTable::load(&args.names)
        .with_context(|| format!("Failed to load names from {}", args.names.display()))?;
    log::debug!("Loaded {} name(s)", names.len());

    let raw = read_table(&args.data)?;
    log::info!("Read {} row(s) from {}", raw.rows.len(), args.data.display());

    let template = PptxTemplate::open(&args.template)
        .with_context(|| format!("Failed to load template {}", args.template.display()))?;

    let options = AssemblyOptions {
        double_sided: args.double_sided,
        subtitle: Some(created_on()),
        skip_cover: args.no_cover,
    };

    let pipeline = ReportPipeline::new(&config);
    let mut summary = RunSummary::default();
    let groups = pipeline.prepare(&raw, &names, &mut summary);
    log::info!("{} group(s) to render", groups.len());

    pipeline
        .generate(
            &template,
            &groups,
            &args.prefix,
            options,
            &mut LogProgress,
            &mut summary,
        )
        .context("Failed to generate decks")?;

    summary.log();
    Ok(())
}

/// Configuration from a JSON file, or the built-in report.
fn load_config(path: Option<&Path>) -> Result<ReportConfig> {
    match path {
        Some(path) => ReportConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display())),
        None => Ok(ReportConfig::default()),
    }
}

/// Read the export into a raw table.
fn read_table(path: &Path) -> Result<RawTable> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    RawTable::from_csv_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Subtitle for the cover and section title slides.
fn created_on() -> String {
    format!(
        "Created on {}",
        chrono::Local::now().date_naive().format("%m-%d-%Y")
    )
}
