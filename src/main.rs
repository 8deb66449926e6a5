//! OrderStat - batch statistics for order conversion runs.
//!
//! A CLI tool that scans directories of converted and rejected real-estate
//! orders, feeds them through the statistics accumulator, and renders the
//! run report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad config, unreadable input, ...)
//!   2 - Failed orders present with --fail-on-errors

use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use orderstat::cli::{Args, OutputFormat};
use orderstat::config::Config;
use orderstat::models::{Outcome, Snapshot};
use orderstat::report;
use orderstat::scanner::{OrderScanner, ScanConfig, ScannedFile};
use orderstat::Accumulator;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    // Initialize logging
    init_logging(&args);

    info!("OrderStat v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the batch
    match run(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .orderstat.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".orderstat.toml");

    if path.exists() {
        eprintln!("⚠️  .orderstat.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .orderstat.toml")?;

    println!("✅ Created .orderstat.toml with default settings.");
    println!("   Edit it to customize task name, extensions, excludes, and more.");
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

/// Run the complete batch workflow. Returns exit code (0 or 2).
fn run(args: Args) -> Result<i32> {
    let started = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let scan_config = ScanConfig::from(&config.scanner);

    // Step 1: Discover order files
    let input = match args.input.clone() {
        Some(input) => input,
        None => anyhow::bail!("--input is required"),
    };
    let ok_files = OrderScanner::new(input, scan_config.clone()).scan()?;
    let failed_files = match args.failed.clone() {
        Some(dir) => OrderScanner::new(dir, scan_config).scan()?,
        None => Vec::new(),
    };
    info!(
        "Found {} converted and {} rejected order files",
        ok_files.len(),
        failed_files.len()
    );

    // Handle --dry-run: list files and exit
    if args.dry_run {
        return handle_dry_run(&ok_files, &failed_files);
    }

    // Step 2: Build the accumulator for this run
    let run_id = config
        .general
        .run_id
        .clone()
        .unwrap_or_else(|| Utc::now().format("%Y%m%d-%H%M%S").to_string());
    let settings = serde_json::to_value(&config).context("Failed to encode settings")?;
    let mut acc = Accumulator::new(&config.general.task, &run_id, settings);

    if let Some(ref path) = args.resume {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;
        acc.unserialize(snapshot);
        info!("Resumed from snapshot: {}", path.display());
    }

    // Step 3: Feed every order through the accumulator
    println!(
        "📊 Processing {} converted and {} rejected orders...",
        ok_files.len(),
        failed_files.len()
    );

    let bar = ProgressBar::new((ok_files.len() + failed_files.len()) as u64);
    bar.set_style(
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    feed(&mut acc, &ok_files, Outcome::Ok, &bar);
    feed(&mut acc, &failed_files, Outcome::Fail, &bar);
    bar.finish_and_clear();

    // Step 4: Render the results
    let rendered = match config.report.format {
        OutputFormat::Text => acc.render(),
        OutputFormat::Json => report::render_json_snapshot(&acc)?,
    };

    match config.report.output {
        Some(ref path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("✅ Report saved to: {}", path.display());
        }
        None => println!("{}", rendered),
    }

    if let Some(ref path) = args.snapshot {
        let snapshot = serde_json::to_string_pretty(&acc.serialize())
            .context("Failed to encode snapshot")?;
        fs::write(path, snapshot)
            .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
        println!("💾 Snapshot saved to: {}", path.display());
    }

    // Print summary
    let stat = acc.stat();
    println!("\n📊 Conversion Summary:");
    println!("   Orders counted: {}", stat.count("total"));
    println!(
        "   - ✅ ok: {} | ❌ failed: {}",
        stat.count("ok"),
        stat.count("fail")
    );
    println!("   Payment records: {}", acc.len());
    println!("   Duration: {:.1}s", started.elapsed().as_secs_f64());

    // Check --fail-on-errors threshold
    if args.fail_on_errors && stat.count("fail") > 0 {
        eprintln!(
            "\n⛔ {} orders failed conversion. Failing (exit code 2).",
            stat.count("fail")
        );
        return Ok(2);
    }

    Ok(0)
}

/// Reads each file and records it under the given outcome. Unreadable files
/// are logged and skipped, like any other malformed order.
fn feed(acc: &mut Accumulator, files: &[ScannedFile], outcome: Outcome, bar: &ProgressBar) {
    for file in files {
        match fs::read_to_string(&file.path) {
            Ok(content) => match outcome {
                Outcome::Ok => acc.ok(Some(content.into())),
                Outcome::Fail => acc.fail(Some(content.into())),
            },
            Err(e) => warn!("Cannot read {}: {}", file.relative, e),
        }
        bar.inc(1);
    }
}

/// Handle --dry-run: print what would be processed, exit.
fn handle_dry_run(ok_files: &[ScannedFile], failed_files: &[ScannedFile]) -> Result<i32> {
    println!("\n🔍 Dry run: scanning order files (nothing is counted)...\n");

    if ok_files.is_empty() && failed_files.is_empty() {
        println!("   No matching order files found.");
    } else {
        for file in ok_files {
            println!("     📄 {} ({} bytes, ok)", file.relative, file.size);
        }
        for file in failed_files {
            println!("     📄 {} ({} bytes, failed)", file.relative, file.size);
        }
        println!(
            "\n   Total: {} files",
            ok_files.len() + failed_files.len()
        );
    }

    println!("\n✅ Dry run complete.");
    Ok(0)
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
            info!("Loaded default config from .orderstat.toml");
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
