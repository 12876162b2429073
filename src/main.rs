use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

use project_harvest::app::ports::FetcherPort;
use project_harvest::config::{load_targets, Settings};
use project_harvest::domain::{FallbackMetadata, Field, RawContent, TargetDescriptor};
use project_harvest::infra::{LogNotifier, ReqwestFetcher};
use project_harvest::logging;
use project_harvest::observability::metrics as harvest_metrics;
use project_harvest::pipeline::processing::extract::{ExtractionRegistry, Provenance};
use project_harvest::pipeline::processing::normalize::Normalizer;
use project_harvest::pipeline::processing::quality_gate::QualityGate;
use project_harvest::pipeline::report::XlsxArtifactStore;
use project_harvest::pipeline::{Harvester, Pipeline, RunOutcome};

#[derive(Parser)]
#[command(name = "project_harvest")]
#[command(about = "Collects project and contact records from websites into a scored spreadsheet")]
#[command(version)]
struct Cli {
    /// TOML config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every target, process, and append the results to the report
    Run {
        /// websites.json file listing the targets
        #[arg(long)]
        targets: Option<PathBuf>,
        /// Report workbook to append to
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print the rows instead of writing the report
        #[arg(long)]
        dry_run: bool,
    },
    /// Run extraction on a single page and show what was found
    Extract {
        /// Page URL; decides which site strategy is used
        #[arg(long)]
        url: String,
        /// Read the markup from a saved file instead of fetching the URL
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List the registered site strategies in dispatch order
    Strategies,
}

fn build_pipeline(settings: &Settings) -> Pipeline {
    Pipeline::new(
        ExtractionRegistry::new(),
        Normalizer::new(settings.phone_policy(), QualityGate::new()),
    )
}

fn print_outcome(outcome: &RunOutcome) {
    let summary = &outcome.summary;
    println!("\n📊 Harvest results (run {}):", summary.run_id);
    println!("   Targets: {}", summary.targets);
    println!("   Pages fetched: {}", summary.pages_fetched);
    println!("   Fetch failures: {}", summary.fetch_failures);
    println!("   Records kept: {}", summary.records_kept);
    println!("   Duplicates removed: {}", summary.duplicates_removed);
    println!("   Average quality: {:.2}", summary.average_score);
    println!(
        "   Bands: {} high / {} medium / {} low",
        summary.bands.high, summary.bands.medium, summary.bands.low
    );
    match &summary.artifact_path {
        Some(path) => println!("   Report: {} ({} rows)", path.display(), summary.artifact_rows),
        None => println!("   Report: not written (dry run)"),
    }

    if summary.dry_run {
        println!();
        for record in &outcome.report.records {
            let fields = &record.fields;
            println!(
                "{}\t{}\t{}\t{}\t{}\t{:.2}\t{}",
                fields.name.value,
                fields.location.value,
                fields.project_type.value,
                fields.contact_name.value,
                fields.mobile_number.value,
                record.quality_score.value(),
                fields.source_tags()
            );
        }
    }
}

async fn run(settings: &Settings, targets: Option<PathBuf>, output: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let targets_path = targets.unwrap_or_else(|| settings.targets_file.clone());
    let targets = load_targets(&targets_path)
        .with_context(|| format!("loading targets from {}", targets_path.display()))?;
    let artifact_path = output.unwrap_or_else(|| settings.artifact_path());

    info!(targets = targets.len(), artifact = %artifact_path.display(), dry_run, "Starting run");
    println!("🚀 Harvesting {} targets...", targets.len());

    let harvester = Harvester::new(
        build_pipeline(settings),
        Arc::new(ReqwestFetcher::new(&settings.fetch)?),
        Arc::new(XlsxArtifactStore::new(artifact_path, settings.output.sheet_name.clone())),
        Arc::new(LogNotifier),
        settings.fetch.concurrency,
    );

    match harvester.run(&targets, dry_run).await {
        Ok(outcome) => {
            print_outcome(&outcome);
            Ok(())
        }
        Err(e) => {
            error!("Run failed: {}", e);
            println!("❌ Run failed: {}", e);
            Err(e.into())
        }
    }
}

async fn extract(settings: &Settings, url: String, file: Option<PathBuf>) -> Result<()> {
    let raw = match file {
        Some(path) => RawContent::Page(
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?,
        ),
        None => ReqwestFetcher::new(&settings.fetch)?.fetch(&url).await,
    };
    if let RawContent::FetchFailed { reason } = &raw {
        println!("⚠️  Fetch failed: {reason}");
    }

    let pipeline = build_pipeline(settings);
    let target = TargetDescriptor::new(url.clone(), url, FallbackMetadata::default());
    let extracted = pipeline.registry().extract(&target, &raw);

    println!("Strategy: {}", extracted.strategy());
    for field in Field::ALL {
        match extracted.provenance(field) {
            Provenance::Live => println!("   {:<14} live    {}", field, extracted.get(field).unwrap_or_default()),
            Provenance::Absent => println!("   {:<14} absent", field),
        }
    }
    let clean = pipeline.complete(&target, &extracted);
    println!("Quality score: {} ({})", clean.quality_score, clean.quality_score.band());
    Ok(())
}

fn list_strategies() {
    let registry = ExtractionRegistry::new();
    println!("Site strategies, in dispatch order:");
    for (signature, family) in registry.dispatch_order() {
        println!("   {:<14} {}", family, signature);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("loading configuration")?;
    let _log_guard = logging::init_logging(&settings.logging.dir, &settings.logging.level)?;
    let prometheus = harvest_metrics::init()?;

    let result = match cli.command {
        Commands::Run {
            targets,
            output,
            dry_run,
        } => run(&settings, targets, output, dry_run).await,
        Commands::Extract { url, file } => extract(&settings, url, file).await,
        Commands::Strategies => {
            list_strategies();
            Ok(())
        }
    };

    debug!(snapshot = %prometheus.render(), "metrics snapshot");
    result
}
