use clap::Parser;
use shogo::prelude::*;
use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Reconciles the MITO generator database against its packaged diagrams
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Execution data JSON (logVerification / connectionVerification)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the generator's SQLite database
    #[arg(long, env = "MITO_DB_PATH")]
    db: Option<PathBuf>,

    /// Path to the diagram archive (JAR)
    #[arg(long, env = "MITO_JAR_PATH")]
    jar: Option<PathBuf>,

    /// Log run to check for log consistency (overrides logVerification.logName)
    #[arg(long)]
    run_id: Option<String>,

    /// Diagram to check; repeatable (overrides connectionVerification.diagramName)
    #[arg(short, long = "diagram")]
    diagrams: Vec<String>,

    /// Check every diagram found in the archive
    #[arg(long, conflicts_with = "diagrams")]
    all_diagrams: bool,

    /// Print the reports as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Stop checking after this many seconds and report what was checked
    #[arg(long, value_name = "SECONDS")]
    time_budget: Option<u64>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();
    let total_start = Instant::now();

    // --- 1. Configuration ---
    let config = match &cli.config {
        Some(path) => RunConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load configuration: {}", e))),
        None => RunConfig::default(),
    };
    let paths = InputPaths::resolve(cli.db.clone(), cli.jar.clone(), &config)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    paths
        .verify()
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));

    // --- 2. Sources ---
    let database = MitoDatabase::open(&paths.database)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    let archive = DiagramArchive::open(&paths.archive)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));

    let run_id = cli.run_id.or_else(|| config.run_id().map(str::to_string));
    let diagrams = if cli.all_diagrams {
        archive
            .diagram_names()
            .unwrap_or_else(|e| exit_with_error(&e.to_string()))
    } else if !cli.diagrams.is_empty() {
        cli.diagrams
    } else {
        config.diagram().map(str::to_string).into_iter().collect()
    };
    if run_id.is_none() && diagrams.is_empty() {
        exit_with_error(
            "Nothing to check: give --run-id, --diagram or --all-diagrams, or a config file naming them.",
        );
    }

    // --- 3. Rules ---
    let mut interrupt = Interrupt::new();
    if let Some(seconds) = cli.time_budget {
        interrupt = interrupt.with_budget(Duration::from_secs(seconds));
    }
    let validator = Validator::new(&database, &archive).with_interrupt(interrupt);
    let reports = validator
        .check_all(run_id.as_deref(), &diagrams)
        .unwrap_or_else(|e| exit_with_error(&format!("Validation aborted: {}", e)));

    // --- 4. Results ---
    if cli.json {
        let json = ReportFormatter::format_json(&reports)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to render reports: {}", e)));
        println!("{}", json);
    } else {
        print!("{}", ReportFormatter::format_text(&reports));
    }

    let summary = RunSummary::of(&reports);
    info!(
        rules = summary.rules,
        checked = summary.checked,
        failed = summary.failed,
        elapsed = ?total_start.elapsed(),
        "run finished"
    );
    process::exit(if summary.passed() { 0 } else { 1 });
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("shogo=info,shogo_cli=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    process::exit(2);
}
