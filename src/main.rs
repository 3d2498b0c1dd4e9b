//! Job Harvest main entry point
//!
//! This is the command-line interface for the browser-driven job harvester.

use chrono::Utc;
use clap::Parser;
use job_harvest::browser::ChromeSession;
use job_harvest::config::{apply_overrides, load_config_with_hash, Config, ConfigOverrides};
use job_harvest::output::csv::{read_csv, write_csv};
use job_harvest::output::write_markdown_report;
use job_harvest::storage::{open_storage, RunStatus, SqliteStorage, Storage};
use job_harvest::{HarvestReport, Harvester};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Job Harvest: a browser-driven job listing harvester
///
/// Job Harvest drives a Chrome session across a careers site, collects the
/// listing cards into deduplicated records, and enriches each record with
/// the qualification sections of its detail page.
#[derive(Parser, Debug)]
#[command(name = "job-harvest")]
#[command(version)]
#[command(about = "A browser-driven job listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without opening a browser
    #[arg(long)]
    dry_run: bool,

    /// Enrich the records of an existing CSV instead of running discovery
    #[arg(long, value_name = "CSV")]
    from_csv: Option<PathBuf>,

    /// Override the search keyword
    #[arg(long)]
    keyword: Option<String>,

    /// Override the location filter
    #[arg(long)]
    location: Option<String>,

    /// Override the listing page ceiling
    #[arg(long)]
    max_pages: Option<u32>,

    /// Override the number of records to enrich
    #[arg(long)]
    enrichment_cap: Option<u32>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            keyword: self.keyword.clone(),
            location: self.location.clone(),
            max_pages: self.max_pages,
            enrichment_cap: self.enrichment_cap,
            headless: self.headed.then_some(false),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let overrides = cli.overrides();
    let config = if overrides.is_empty() {
        config
    } else {
        tracing::info!("Applying command-line overrides");
        apply_overrides(config, &overrides)?
    };

    if cli.dry_run {
        handle_dry_run(&config, cli.from_csv.as_deref());
        return Ok(());
    }

    handle_harvest(config, &config_hash, cli.from_csv.as_deref()).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("job_harvest=info,warn"),
            1 => EnvFilter::new("job_harvest=debug,info"),
            2 => EnvFilter::new("job_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be harvested
fn handle_dry_run(config: &Config, from_csv: Option<&Path>) {
    println!("=== Job Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Strategy: {}", config.site.strategy);
    println!("  Start URL: {}", config.site.start_url);
    if let Some(company) = &config.site.company {
        println!("  Company: {}", company);
    }

    println!("\nSearch:");
    if config.search.keyword.is_empty() {
        println!("  Keyword: (none)");
    } else {
        println!("  Keyword: {}", config.search.keyword);
    }
    if let Some(location) = &config.search.location {
        println!("  Location: {}", location);
    }

    println!("\nLimits:");
    println!("  Max pages: {}", config.limits.max_pages);
    println!("  Max scrolls per page: {}", config.limits.max_scrolls);
    println!("  Enrichment cap: {}", config.limits.enrichment_cap);

    println!("\nBrowser:");
    println!("  Headless: {}", config.browser.headless);
    println!(
        "  Window: {}x{}",
        config.browser.window_width, config.browser.window_height
    );

    println!("\nOutput:");
    println!(
        "  CSV: {}",
        config
            .output
            .csv_path
            .clone()
            .unwrap_or_else(|| "(timestamped)".to_string())
    );
    if let Some(path) = &config.output.database_path {
        println!("  Database: {}", path);
        if Path::new(path).exists() {
            match open_storage(Path::new(path)).and_then(|storage| storage.get_latest_run()) {
                Ok(Some(run)) => println!(
                    "  Last run: #{} {} started {} ({} records)",
                    run.id,
                    run.status.to_db_string(),
                    run.started_at,
                    run.record_count
                ),
                Ok(None) => println!("  Last run: (none)"),
                Err(e) => tracing::warn!("Could not read the archive: {}", e),
            }
        }
    }
    if let Some(path) = &config.output.summary_path {
        println!("  Summary: {}", path);
    }

    println!("\n✓ Configuration is valid");
    match from_csv {
        Some(path) => println!("✓ Would enrich the records in {}", path.display()),
        None => println!(
            "✓ Would harvest up to {} pages from {}",
            config.limits.max_pages, config.site.start_url
        ),
    }
}

/// Handles a harvest or an enrich-only run, then writes every output
async fn handle_harvest(
    config: Config,
    config_hash: &str,
    from_csv: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let existing = match from_csv {
        Some(path) => {
            let records = read_csv(path)?;
            tracing::info!("Loaded {} records from {}", records.len(), path.display());
            Some(records)
        }
        None => None,
    };

    let strategy = if existing.is_some() {
        "enrich-only"
    } else {
        config.site.strategy.as_str()
    };
    let mut archive = match &config.output.database_path {
        Some(path) => {
            let mut storage = open_storage(Path::new(path))?;
            let run_id = storage.create_run(config_hash, strategy)?;
            tracing::info!("Archiving as run {} in {}", run_id, path);
            Some((storage, run_id))
        }
        None => None,
    };

    let result = run_browser(&config, existing).await;
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            if let Some((storage, run_id)) = archive.as_mut() {
                storage.finish_run(*run_id, RunStatus::Failed, 0)?;
            }
            return Err(e);
        }
    };

    let csv_path = config
        .output
        .csv_path
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(|| default_csv_path(&report));
    write_csv(&csv_path, &report.records, report.enriched())?;
    tracing::info!(
        "Wrote {} records to {}",
        report.records.len(),
        csv_path.display()
    );

    if let Some((storage, run_id)) = archive.as_mut() {
        archive_report(storage, *run_id, &report)?;
    }

    if let Some(path) = &config.output.summary_path {
        write_markdown_report(&report, Path::new(path))?;
        tracing::info!("Wrote run report to {}", path);
    }

    if report.is_partial() {
        tracing::warn!("Harvest finished with partial results");
    } else {
        tracing::info!("Harvest completed successfully");
    }

    Ok(())
}

/// Launches Chrome, runs the harvester, and always closes the browser
async fn run_browser(
    config: &Config,
    existing: Option<Vec<job_harvest::DetailRecord>>,
) -> Result<HarvestReport, Box<dyn std::error::Error>> {
    let browser = ChromeSession::launch(&config.browser).await?;
    let mut harvester = Harvester::new(config.clone(), browser);

    let result = match existing {
        Some(records) => harvester.enrich_existing(records).await,
        None => harvester.run().await,
    };

    harvester.into_browser().close().await;
    Ok(result?)
}

fn archive_report(
    storage: &mut SqliteStorage,
    run_id: i64,
    report: &HarvestReport,
) -> Result<(), Box<dyn std::error::Error>> {
    let inserted = storage.insert_records(run_id, &report.records)?;
    let status = if report.is_partial() {
        RunStatus::Partial
    } else {
        RunStatus::Completed
    };
    storage.finish_run(run_id, status, inserted)?;

    let run = storage.get_run(run_id)?;
    tracing::info!(
        "Archived {} records for run {} ({})",
        run.record_count,
        run.id,
        run.status.to_db_string()
    );
    Ok(())
}

/// `<strategy>_jobs_<keyword-slug>_<timestamp>.csv`
fn default_csv_path(report: &HarvestReport) -> PathBuf {
    let slug = slugify(&report.keyword);
    let slug = if slug.is_empty() { "all".to_string() } else { slug };
    let strategy = report.strategy.replace('-', "_");
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("{}_jobs_{}_{}.csv", strategy, slug, timestamp))
}

fn slugify(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
