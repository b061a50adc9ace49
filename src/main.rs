use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use mayor::business::{self, Business};
use mayor::executive::Executive;
use mayor::job::JobContract;
use mayor::storage::{AssignmentStore, JsonlStore};
use mayor::worker::Roster;
use mayor::world::WorldSnapshot;
use mayor::world::action::RecordingSink;
use mayor::{CycleReport, Mayor};

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

fn setup_logging(level: Option<&str>) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mayor")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("mayor.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let mut builder = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none()
        && let Some(level) = level
    {
        builder.parse_filters(level);
    }
    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Read a world snapshot; `.json` files are JSON, anything else YAML
fn load_world(path: &Path) -> Result<WorldSnapshot> {
    let content = fs::read_to_string(path).context(format!("Failed to read world snapshot {}", path.display()))?;
    let world = if path.extension().is_some_and(|e| e == "json") {
        serde_json::from_str(&content).context("Failed to parse world snapshot as JSON")?
    } else {
        serde_yaml::from_str(&content).context("Failed to parse world snapshot as YAML")?
    };
    Ok(world)
}

/// The requested colony, or the first room in the snapshot
fn resolve_colony(world: &WorldSnapshot, colony: Option<&str>) -> Result<String> {
    match colony {
        Some(colony) => Ok(colony.to_string()),
        None => world
            .rooms
            .first()
            .map(|r| r.name.clone())
            .ok_or_else(|| eyre!("World snapshot has no rooms; pass --colony")),
    }
}

fn open_store(config: &Config) -> Result<JsonlStore> {
    JsonlStore::new(&config.storage.dir).context(format!("Failed to open store at {}", config.storage.dir.display()))
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Cycle { world, colony, json } => handle_cycle_command(world, colony.as_deref(), *json, config),
        Commands::Jobs { world, colony } => handle_jobs_command(world, colony.as_deref(), config),
        Commands::Show { colony } => handle_show_command(colony.as_deref(), config),
        Commands::Reset { colony } => handle_reset_command(colony, config),
    }
}

fn handle_cycle_command(world_path: &Path, colony: Option<&str>, json: bool, config: &Config) -> Result<()> {
    let world = load_world(world_path)?;
    let colony = resolve_colony(&world, colony)?;
    info!("Running cycle {} for {}", world.tick, colony);

    let mut store = open_store(config)?;
    let businesses = business::discover(&world, &colony, &config.business_settings());
    let mut sink = RecordingSink::new();

    let report = Mayor::new(colony.as_str(), config.scheduler.clone())
        .run_cycle(&world, &businesses, &mut store, &mut sink)
        .context("Scheduling cycle failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report).context("Failed to encode report")?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &CycleReport) {
    println!("{} {} tick {}", "Colony:".green(), report.colony, report.tick);

    println!("{}", "Bosses:".cyan());
    for boss in &report.bosses {
        let owner = boss.owner.as_deref().unwrap_or("contract");
        println!(
            "  {:<28} {:>6.1}  {:<18} {}",
            boss.job,
            boss.priority,
            owner.dimmed(),
            boss.workers.join(", ")
        );
        for worker in &boss.subcontractors {
            println!("    {} {}", "borrowing".dimmed(), worker);
        }
    }

    for assignment in &report.assigned {
        println!("  {} {} -> {}", "assigned".green(), assignment.worker, assignment.job);
    }
    for sub in &report.subcontracted {
        println!(
            "  {} {} -> {} for {}",
            "subcontracted".blue(),
            sub.worker,
            sub.lender,
            sub.borrower
        );
    }
    for promoted in &report.promoted {
        println!("  {} {} -> {}", "promoted".green(), promoted.worker, promoted.job);
    }
    for released in &report.released {
        println!("  {} {} from {}", "released".yellow(), released.worker, released.job);
    }
    for retired in &report.retired {
        println!("  {} {}", "retired".dimmed(), retired);
    }
    if !report.idle.is_empty() {
        println!("  {} {}", "idle".yellow(), report.idle.join(", "));
    }
    if report.stale > 0 {
        println!("  {} {} stale records dropped", "warning:".yellow(), report.stale);
    }

    if !report.spawn_requests.is_empty() {
        println!("{}", "Spawn requests:".cyan());
        for request in &report.spawn_requests {
            let body: Vec<String> = request.body.iter().map(|p| format!("{:?}", p).to_lowercase()).collect();
            println!("  {:<24} [{}] cost {}", request.business, body.join(","), request.cost());
        }
    }

    if !report.actions.is_empty() {
        println!("{}", "Actions:".cyan());
        for action in &report.actions {
            println!("  {:<12} {:<10} {}", action.worker, action.action.name(), action.result);
        }
    }
}

fn handle_jobs_command(world_path: &Path, colony: Option<&str>, config: &Config) -> Result<()> {
    let world = load_world(world_path)?;
    let colony = resolve_colony(&world, colony)?;
    let store = open_store(config)?;
    let roster = Roster::from_world(&world, store.load_workers().context("Failed to load worker memories")?);
    let businesses: Vec<Box<dyn Business>> = business::discover(&world, &colony, &config.business_settings());

    let mut rows = Vec::new();
    for business in &businesses {
        let executive = Executive::new(business.as_ref(), &roster);
        for job in executive.permanent_jobs(&world) {
            rows.push((job.priority(None), job.id().encode(), executive.id().to_string()));
        }
        for job in executive.contract_jobs(&world, &roster) {
            rows.push((job.priority(None), job.id().encode(), "contract".to_string()));
        }
    }
    rows.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    println!("{} {} ({} jobs)", "Jobs for".green(), colony, rows.len());
    for (priority, job, owner) in rows {
        println!("  {:>6.1}  {:<28} {}", priority, job, owner.dimmed());
    }
    Ok(())
}

fn handle_show_command(colony: Option<&str>, config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let colonies = match colony {
        Some(colony) => store.colony(colony)?.into_iter().collect(),
        None => store.colonies()?,
    };

    if colonies.is_empty() {
        println!("{}", "No persisted bosses".yellow());
        return Ok(());
    }

    for record in colonies {
        println!(
            "{} {} tick {} (saved {})",
            "Colony:".green(),
            record.id,
            record.tick,
            record.saved_at.format("%Y-%m-%d %H:%M:%S")
        );
        for boss in &record.bosses {
            println!("  {:<28} {}", boss.job_id, boss.worker_ids.join(", "));
            for sub in &boss.subcontractors {
                println!("    {} {} via {}", "borrowing".dimmed(), sub.worker_id, sub.job_id);
            }
        }
    }
    Ok(())
}

fn handle_reset_command(colony: &str, config: &Config) -> Result<()> {
    let mut store = open_store(config)?;
    if store.clear_colony(colony).context("Failed to clear colony")? {
        info!("Cleared persisted bosses of {}", colony);
        println!("{} {}", "Cleared:".green(), colony);
    } else {
        println!("{} {}", "Nothing stored for".yellow(), colony);
    }
    Ok(())
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging at the configured level
    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
