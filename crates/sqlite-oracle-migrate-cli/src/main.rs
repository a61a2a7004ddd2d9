//! sqlite-oracle-migrate CLI - one-shot SQLite to Oracle migration.

use clap::Parser;
use sqlite_oracle_migrate::config::{DEFAULT_CONFIG_FILE, SAMPLE_CONFIG};
use sqlite_oracle_migrate::{
    Config, MigrateError, MigrationResult, Orchestrator, ProgressCallback, ProgressUpdate,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

#[derive(Parser)]
#[command(name = "sqlite-oracle-migrate")]
#[command(about = "Migrate every table of a SQLite database into an Oracle schema")]
#[command(version)]
struct Cli {
    /// Path to INI configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Write a commented sample configuration file and exit
    #[arg(long)]
    create_config: bool,

    /// Overwrite an existing file when used with --create-config
    #[arg(long, requires = "create_config")]
    force: bool,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    /// Seconds to wait for the migration to stop after Ctrl-C (default: 60)
    #[arg(long, default_value = "60")]
    shutdown_timeout: u64,

    /// Print progress updates as JSON lines to stderr
    #[arg(long)]
    progress: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut detailed = cli.verbosity.eq_ignore_ascii_case("debug");

    match run(cli, &mut detailed).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            if detailed {
                eprintln!("{}", e.format_detailed());
            } else {
                eprintln!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every table was migrated.
async fn run(cli: Cli, detailed: &mut bool) -> Result<bool, MigrateError> {
    if cli.create_config {
        write_sample_config(&cli.config, cli.force)?;
        println!("Sample configuration written to {}", cli.config.display());
        println!("Edit it with your connection details, then run without --create-config.");
        return Ok(true);
    }

    let config = Config::load(&cli.config)?;

    // debug_mode in the file overrides --verbosity
    let verbosity = if config.migration.debug_mode {
        *detailed = true;
        "debug"
    } else {
        cli.verbosity.as_str()
    };
    setup_logging(verbosity, &cli.log_format).map_err(MigrateError::Config)?;
    info!("Loaded configuration from {:?}", cli.config);

    // Setup signal handling for graceful shutdown (SIGINT and SIGTERM)
    let cancel_token = setup_signal_handler(cli.shutdown_timeout)?;

    let progress: Option<ProgressCallback> = if cli.progress {
        Some(Arc::new(|update: &ProgressUpdate| {
            if let Ok(line) = serde_json::to_string(update) {
                eprintln!("{}", line);
            }
        }))
    } else {
        None
    };

    // The pipeline uses blocking drivers; keep it off the signal task's thread.
    let token = cancel_token.clone();
    let mut handle = tokio::task::spawn_blocking(move || {
        let mut orchestrator = Orchestrator::connect(config)?;
        if let Some(progress) = progress {
            orchestrator = orchestrator.with_progress(progress);
        }
        orchestrator.run(&token)
    });

    let joined = tokio::select! {
        joined = &mut handle => joined,
        _ = cancel_token.cancelled() => {
            let timeout = Duration::from_secs(cli.shutdown_timeout);
            match tokio::time::timeout(timeout, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    error!(
                        "Migration did not stop within {}s, exiting",
                        cli.shutdown_timeout
                    );
                    // Dropping the runtime would wait for the blocking task.
                    std::process::exit(1);
                }
            }
        }
    };

    let result = joined.map_err(|e| MigrateError::Io(std::io::Error::other(e)))??;

    if cli.output_json {
        println!("{}", result.to_json()?);
    } else {
        print_summary(&result);
    }

    // An interrupt never reports success, even if the run got to the end.
    Ok(result.is_success() && !cancel_token.is_cancelled())
}

fn print_summary(result: &MigrationResult) {
    if result.is_success() {
        println!("\nMigration completed!");
    } else {
        println!("\nMigration finished with errors.");
    }
    println!("  Run ID: {}", result.run_id);
    println!("  Duration: {:.2}s", result.duration_seconds);
    println!(
        "  Tables: {}/{}",
        result.tables_success, result.tables_total
    );
    println!("  Rows: {}", result.rows_transferred);
    println!("  Throughput: {} rows/sec", result.rows_per_second);
    if !result.failed_tables.is_empty() {
        println!("  Failed tables: {:?}", result.failed_tables);
    }
}

fn write_sample_config(path: &Path, force: bool) -> Result<(), MigrateError> {
    if path.exists() && !force {
        return Err(MigrateError::Config(format!(
            "{} already exists; use --force to overwrite it",
            path.display()
        )));
    }
    std::fs::write(path, SAMPLE_CONFIG)?;
    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("unknown verbosity '{}'", other)),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("unknown log format '{}'", other)),
    }

    Ok(())
}

/// Setup signal handlers for graceful shutdown.
/// Handles both SIGINT (Ctrl-C) and SIGTERM.
/// Returns a CancellationToken that will be cancelled when a signal is received.
#[cfg(unix)]
fn setup_signal_handler(shutdown_timeout: u64) -> Result<CancellationToken, MigrateError> {
    let cancel_token = CancellationToken::new();

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let token = cancel_token.clone();
    tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        };
        eprintln!(
            "\nReceived {}. Stopping after the current row (timeout: {}s)...",
            name, shutdown_timeout
        );
        token.cancel();
    });

    Ok(cancel_token)
}

/// Setup signal handler for Windows (only Ctrl-C)
#[cfg(not(unix))]
fn setup_signal_handler(shutdown_timeout: u64) -> Result<CancellationToken, MigrateError> {
    let cancel_token = CancellationToken::new();
    let token = cancel_token.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!(
                "\nReceived Ctrl-C. Stopping after the current row (timeout: {}s)...",
                shutdown_timeout
            );
            token.cancel();
        }
    });

    Ok(cancel_token)
}
