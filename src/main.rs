//! Unplanned Hospital Visits Dashboard
//!
//! Opens the interactive dashboard, or with `--export DIR` writes the
//! views for one selection as `report.json` plus PNG charts.

mod charts;
mod export;
mod gui;

use anyhow::{anyhow, Context, Result};
use eframe::egui;
use gui::DashboardApp;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use uhv_dashboard::cli::Args;
use uhv_dashboard::config::{Config, DEFAULT_CONFIG_FILE};
use uhv_dashboard::report::ReportSources;
use uhv_dashboard::{DashboardViews, DataLoader};

fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args)?;
    info!("UHV Dashboard v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    if let Some(ref dir) = args.export {
        if let Err(e) = run_export(&args, &config, dir) {
            error!("Export failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    run_gui(config)
}

/// Handle --init-config: write a default configuration file.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

/// Headless export of one selection.
fn run_export(args: &Args, config: &Config, dir: &Path) -> Result<()> {
    let group = config.default_group()?;
    let selection = args.selection(group);

    let hospital = DataLoader::load_hospital_table(&config.data.hospital_csv)
        .context("Failed to load hospital table")?;
    let state = DataLoader::load_state_table(&config.data.state_csv)
        .context("Failed to load state table")?;

    let views = DashboardViews::compute(&hospital, &state, &selection)
        .context("Failed to compute dashboard views")?;

    let sources = ReportSources {
        hospital_csv: config.data.hospital_csv.clone(),
        state_csv: config.data.state_csv.clone(),
    };
    let files = export::export_dashboard(dir, sources, &selection, &views)?;
    for file in &files {
        println!("  {}", file.display());
    }

    if args.open {
        open::that(dir).with_context(|| format!("Failed to open {}", dir.display()))?;
    }
    Ok(())
}

fn run_gui(config: Config) -> Result<()> {
    let group = config.default_group()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Unplanned Hospital Visits"),
        ..Default::default()
    };

    eframe::run_native(
        "Unplanned Hospital Visits",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, &config, group)))),
    )
    .map_err(|e| anyhow!("Failed to start dashboard window: {}", e))
}
