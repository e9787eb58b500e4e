//! CLI entry point for cepmatch.
//!
//! `ranges` flags candidate postal-code ranges that overlap a reference set;
//! `regions` exports the points that fall inside drawn regions.

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cepmatch::config::{parse_list, Config};
use cepmatch::matcher::{
    filter_options, match_candidates_indexed, FilterSelection, MatchSummary, ReferenceIndex,
};
use cepmatch::output::{write_candidates, write_exported_rows};
use cepmatch::parser::{parse_points, parse_ranges, parse_regions};
use cepmatch::session::DrawingSession;

/// Postal-code range coverage and drawn-region point matching tool.
#[derive(Parser, Debug)]
#[command(name = "cepmatch")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flag candidate ranges that overlap any reference range
    Ranges(RangesArgs),
    /// Export points inside drawn regions, tagged with the region color
    Regions(RegionsArgs),
}

/// Options shared by both subcommands.
#[derive(ClapArgs, Debug)]
struct CommonArgs {
    /// Output file (required)
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Input field delimiter (a single character, or "tab")
    #[arg(short = 'd', long = "delimiter", default_value = ",")]
    delimiter: String,

    /// Number of worker threads (0 = auto-detect, 1 = sequential)
    #[arg(long = "threads", short = 'j', default_value = "0")]
    threads: usize,
}

#[derive(ClapArgs, Debug)]
struct RangesArgs {
    /// Reference coverage file (required)
    #[arg(short = 'b', long = "base")]
    base: PathBuf,

    /// Candidate range file (required)
    #[arg(short = 'c', long = "candidates")]
    candidates: PathBuf,

    /// Column holding the lower bound
    #[arg(long = "start-column", default_value = "CEP inicial")]
    start_column: String,

    /// Column holding the upper bound
    #[arg(long = "end-column", default_value = "CEP final")]
    end_column: String,

    /// Name of the added result column
    #[arg(long = "result-column", default_value = "belongs")]
    result_column: String,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(ClapArgs, Debug)]
struct RegionsArgs {
    /// Point file with latitude/longitude columns (required)
    #[arg(short = 'p', long = "points")]
    points: PathBuf,

    /// GeoJSON FeatureCollection of drawn regions (required)
    #[arg(short = 'r', long = "regions")]
    regions: PathBuf,

    /// Selected states (comma-separated; default: all)
    #[arg(long = "states")]
    states: Option<String>,

    /// Selected cities (comma-separated; default: all)
    #[arg(long = "cities")]
    cities: Option<String>,

    /// Attributes left out of the export (comma-separated)
    #[arg(long = "exclude", default_value = "estado_filtro,cidade_filtro")]
    exclude: String,

    /// Color for regions drawn without one
    #[arg(long = "default-color", default_value = "#3388ff")]
    default_color: String,

    /// Name of the added region color column
    #[arg(long = "color-column", default_value = "COR_POLIGONO")]
    color_column: String,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Ranges(a) => {
            let config = ranges_config(&a)?;
            with_pool(&config, || run_ranges(&a, &config))?;
        }
        Command::Regions(a) => {
            let config = regions_config(&a)?;
            with_pool(&config, || run_regions(&a, &config))?;
        }
    }

    info!("Done!");
    Ok(())
}

/// Apply the shared options to `config`.
fn apply_common(config: &mut Config, common: &CommonArgs) -> Result<()> {
    if !config.set_delimiter(&common.delimiter) {
        bail!(
            "Delimiter must be a single character or 'tab', got '{}'.",
            common.delimiter
        );
    }
    config.threads = common.threads;
    Ok(())
}

fn ranges_config(args: &RangesArgs) -> Result<Config> {
    if !args.base.exists() {
        bail!("Base file not found: {}", args.base.display());
    }
    if !args.candidates.exists() {
        bail!("Candidate file not found: {}", args.candidates.display());
    }

    let mut config = Config::new();
    apply_common(&mut config, &args.common)?;

    if args.start_column.trim().is_empty() || args.end_column.trim().is_empty() {
        bail!("Bound column names cannot be empty.");
    }
    config.start_column = args.start_column.clone();
    config.end_column = args.end_column.clone();
    config.result_column = args.result_column.clone();

    Ok(config)
}

fn regions_config(args: &RegionsArgs) -> Result<Config> {
    if !args.points.exists() {
        bail!("Point file not found: {}", args.points.display());
    }
    if !args.regions.exists() {
        bail!("Region file not found: {}", args.regions.display());
    }

    let mut config = Config::new();
    apply_common(&mut config, &args.common)?;

    config.parse_excluded(&args.exclude);
    config.default_region_color = args.default_color.clone();
    config.region_color_column = args.color_column.clone();

    Ok(config)
}

/// Run `f` inside a rayon pool sized from the configuration.
fn with_pool<F>(config: &Config, f: F) -> Result<()>
where
    F: FnOnce() -> Result<()> + Send,
{
    let num_threads = config.effective_threads();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .context("Failed to create thread pool")?;

    info!(threads = num_threads, "worker pool ready");
    pool.install(f)
}

fn run_ranges(args: &RangesArgs, config: &Config) -> Result<()> {
    info!("Parsing base file: {}", args.base.display());
    let base = parse_ranges(&args.base, config)
        .with_context(|| format!("Failed to read base file {}", args.base.display()))?;

    info!("Parsing candidate file: {}", args.candidates.display());
    let candidates = parse_ranges(&args.candidates, config).with_context(|| {
        format!("Failed to read candidate file {}", args.candidates.display())
    })?;

    let started = Instant::now();
    let index = ReferenceIndex::new(&base.ranges());
    let matched = match_candidates_indexed(&candidates.candidates, &index);
    let summary = MatchSummary::from_candidates(&matched);
    info!(
        reference = index.len(),
        candidates = summary.total,
        belonging = summary.belonging,
        malformed = summary.malformed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "matched ranges"
    );

    info!("Writing output to: {}", args.common.output.display());
    let file = File::create(&args.common.output).context("Failed to create output file")?;
    let mut writer = BufWriter::new(file);
    write_candidates(&mut writer, &candidates.headers, &matched, config)?;
    writer.flush()?;

    Ok(())
}

fn run_regions(args: &RegionsArgs, config: &Config) -> Result<()> {
    let data = parse_points(&args.points, config)
        .with_context(|| format!("Failed to read point file {}", args.points.display()))?;

    let mut session = DrawingSession::new(config.default_region_color.clone());
    parse_regions(&args.regions, &mut session)
        .with_context(|| format!("Failed to read region file {}", args.regions.display()))?;

    let (states, cities) = filter_options(&data.points);
    info!(
        states = states.len(),
        cities = cities.len(),
        "filter options: {}",
        states.join(", ")
    );

    let selection = FilterSelection::from_lists(
        args.states.as_deref().map(parse_list),
        args.cities.as_deref().map(parse_list),
    );

    let started = Instant::now();
    let (rows, summary) =
        session.export_with_summary(&data.points, &selection, &config.excluded_attributes)?;
    info!(
        regions = summary.regions,
        rows = summary.rows,
        empty_regions = summary.empty_regions,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "exported regions"
    );

    info!("Writing output to: {}", args.common.output.display());
    let file = File::create(&args.common.output).context("Failed to create output file")?;
    let mut writer = BufWriter::new(file);
    write_exported_rows(&mut writer, &rows, config)?;
    writer.flush()?;

    Ok(())
}
