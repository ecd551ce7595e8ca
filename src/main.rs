//! CBMS Events - Provincial Event Logistics Dashboard
//!
//! A CLI tool that keeps a synced view of the provincial registration
//! spreadsheet, aggregates participants into logistics analytics, and can
//! request an AI briefing from a local Ollama model.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (store unreachable, config failure, etc.)

mod analytics;
mod cli;
mod config;
mod insight;
mod models;
mod report;
mod store;
mod sync;

use analytics::{summarize, EventFilter};
use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::Config;
use insight::ollama::{OllamaConfig, OllamaSummarizer};
use insight::InsightRequester;
use models::Participant;
use std::sync::Arc;
use std::time::Duration;
use store::memory::{sample_records, InMemoryStore};
use store::sheets::SheetsStore;
use store::RecordStore;
use sync::bus::UpdateBus;
use sync::{SyncConfig, SyncController, SyncStatus};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("CBMS Events v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Run failed: {:#}", e);
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .cbms-events.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".cbms-events.toml");

    if path.exists() {
        eprintln!(".cbms-events.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .cbms-events.toml")?;

    println!("Created .cbms-events.toml with default settings.");
    println!("Edit it to set the store endpoint, model, and refresh interval.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the dashboard in the selected mode.
async fn run(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let filter: EventFilter = config
        .general
        .default_event
        .parse()
        .unwrap_or(EventFilter::All);

    let bus = UpdateBus::new();
    let store = build_store(&args, &config, &bus)?;

    if args.once {
        run_once(store, &filter, &args, &config).await
    } else {
        run_watch(store, bus, &filter, &args, &config).await
    }
}

/// Build the record store client from the arguments.
fn build_store(args: &Args, config: &Config, bus: &UpdateBus) -> Result<Arc<dyn RecordStore>> {
    if args.demo {
        info!("Using built-in demo records");
        let store = InMemoryStore::with_records(sample_records()).with_bus(bus.clone());
        return Ok(Arc::new(store));
    }

    let endpoint = config
        .store
        .endpoint
        .clone()
        .context("No record store endpoint configured")?;

    info!("Record store: {}", endpoint);
    let store = SheetsStore::new(endpoint, config.store.timeout_seconds)
        .context("Failed to build the record store client")?
        .with_bus(bus.clone());

    Ok(Arc::new(store))
}

/// --once: single fetch, render, optional insight, exit.
async fn run_once(
    store: Arc<dyn RecordStore>,
    filter: &EventFilter,
    args: &Args,
    config: &Config,
) -> Result<()> {
    let records = store
        .fetch_all()
        .await
        .context("Failed to fetch registration records")?;
    info!("Fetched {} records", records.len());

    let summary = summarize(&records, filter);
    print_summary(&summary, SyncStatus::Idle, filter, args.format)?;

    if args.insight {
        request_insight(&records, filter, config).await;
    }

    Ok(())
}

/// Default mode: run the sync controller and re-render on every settled
/// snapshot until Ctrl-C.
async fn run_watch(
    store: Arc<dyn RecordStore>,
    bus: UpdateBus,
    filter: &EventFilter,
    args: &Args,
    config: &Config,
) -> Result<()> {
    let interval = Duration::from_secs(config.sync.interval_seconds);
    let mut controller = SyncController::new(Arc::clone(&store), bus, SyncConfig { interval });
    let mut snapshots = controller.subscribe();
    controller.start();

    if args.demo {
        spawn_demo_registration(store);
    }

    println!(
        "Watching registrations (refresh every {}s, filter: {}). Ctrl-C to exit.",
        interval.as_secs(),
        filter
    );

    loop {
        tokio::select! {
            shutdown = tokio::signal::ctrl_c() => {
                shutdown.context("Failed to listen for Ctrl-C")?;
                info!("Shutting down");
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                // Render settled states only; syncing is transient.
                if snapshot.status == SyncStatus::Syncing {
                    continue;
                }
                let summary = summarize(&snapshot.records, filter);
                print_summary(&summary, snapshot.status, filter, args.format)?;
            }
        }
    }

    controller.shutdown();
    Ok(())
}

/// In demo watch mode, append a walk-in registration after a while so the
/// bus-driven refresh can be seen working.
fn spawn_demo_registration(store: Arc<dyn RecordStore>) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(45)).await;

        let record = Participant::new(
            "Provincial CBMS Summit".to_string(),
            "Juban".to_string(),
            "Walk-in Registrant".to_string(),
            models::Sex::Male,
            "Guest".to_string(),
            "walkin@sorsogon.gov.ph".to_string(),
            true,
            models::AccommodationSelection {
                day2: true,
                ..models::AccommodationSelection::default()
            },
        );

        info!("Demo: appending a walk-in registration");
        if let Err(e) = store.append(&record).await {
            warn!("Demo registration failed: {}", e);
        }
    });
}

fn print_summary(
    summary: &models::AnalyticsSummary,
    status: SyncStatus,
    filter: &EventFilter,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", report::render_text(summary, status, filter)),
        OutputFormat::Json => println!("{}", report::render_json(summary)?),
    }
    Ok(())
}

/// Request the AI insight and surface the outcome to the user. Failures
/// are reported but never abort the run.
async fn request_insight(records: &[Participant], filter: &EventFilter, config: &Config) {
    let summarizer = match OllamaSummarizer::new(OllamaConfig {
        ollama_url: config.model.ollama_url.clone(),
        model_name: config.model.name.clone(),
        temperature: config.model.temperature,
        timeout_seconds: config.model.timeout_seconds,
    }) {
        Ok(summarizer) => summarizer,
        Err(e) => {
            error!("Failed to build the insight client: {}", e);
            eprintln!("\nInsight unavailable: {}", e);
            return;
        }
    };

    let requester = InsightRequester::new(Arc::new(summarizer));

    println!("\nRequesting AI logistics insight from {}...", config.model.name);
    match requester.request(records, filter).await {
        Ok(narrative) => {
            println!("\n=== AI Logistics Insight ===\n{}", narrative);
        }
        Err(e) => {
            warn!("Insight request failed: {}", e);
            eprintln!("\nInsight request failed: {}", e);
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .cbms-events.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
