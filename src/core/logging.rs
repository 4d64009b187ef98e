//! Logging Module
//!
//! Sets up `tracing` with:
//! - A JSON file layer on a daily-rolling appender
//! - A pretty stdout layer (omitted in TUI mode)
//! - `log` macros forwarded into `tracing`
//! - Background gzip compression of rolled-over log files

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Base name of the rolling log file
pub const LOG_FILE_PREFIX: &str = "attribute-extractor.log";

// ============================================================================
// Logging Initialization
// ============================================================================

/// Initialize the logging system.
///
/// This sets up:
/// 1. A stdout logger (pretty formatted with colors).
/// 2. A file logger (JSON formatted) in `log_dir`.
/// 3. Redirects standard `log` crate events to `tracing`.
///
/// Returns a `WorkerGuard` which must be kept alive for the duration of the application
/// to ensure buffered logs are flushed on shutdown.
pub fn init(log_dir: &Path) -> WorkerGuard {
    init_with_stdout(log_dir, true)
}

/// Initialize the logging system for TUI mode.
///
/// Identical to [`init()`] but omits the stdout layer to avoid corrupting
/// the terminal while ratatui is in raw/alternate-screen mode.
pub fn init_tui(log_dir: &Path) -> WorkerGuard {
    init_with_stdout(log_dir, false)
}

fn init_with_stdout(log_dir: &Path, stdout: bool) -> WorkerGuard {
    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("Failed to create logs directory: {}", e);
        }
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(env_filter.clone());

    let stdout_layer = stdout.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .pretty()
            .with_filter(env_filter)
    });

    // try_init: a second init (tests, embedding) keeps the first subscriber
    if let Err(e) = tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
    {
        eprintln!("Failed to install tracing subscriber: {}", e);
    }

    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {}", e);
    }

    let log_dir_clone = log_dir.to_path_buf();
    std::thread::spawn(move || {
        compress_old_logs(&log_dir_clone);
    });

    log::info!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir.join(LOG_FILE_PREFIX)
    );

    guard
}

// ============================================================================
// Log Compression
// ============================================================================

/// Compress rolled log files other than today's. Returns the files compressed.
pub fn compress_old_logs(log_dir: &Path) -> Vec<PathBuf> {
    let today_suffix = chrono::Local::now().format("%Y-%m-%d").to_string();
    let rolled_prefix = format!("{}.", LOG_FILE_PREFIX);
    let mut compressed = Vec::new();

    let Ok(entries) = fs::read_dir(log_dir) else {
        return compressed;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        let should_compress = name.starts_with(&rolled_prefix)
            && !name.ends_with(&today_suffix)
            && !name.ends_with(".gz");

        if should_compress {
            match gzip_rolled_log(&path) {
                Ok(archive) => {
                    log::info!("Compressed old log into {:?}", archive);
                    compressed.push(path);
                }
                Err(e) => log::warn!("Failed to compress old log {:?}: {}", path, e),
            }
        }
    }

    compressed
}

/// Gzip one rolled log next to itself and remove the plain copy.
/// An existing archive is left alone and reported as `AlreadyExists`.
fn gzip_rolled_log(path: &Path) -> io::Result<PathBuf> {
    let mut archive_name = path.file_name().unwrap_or_default().to_os_string();
    archive_name.push(".gz");
    let archive = path.with_file_name(archive_name);

    let mut output = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&archive)
        .map(|file| GzEncoder::new(file, Compression::default()))?;
    io::copy(&mut fs::File::open(path)?, &mut output)?;
    output.finish()?;

    fs::remove_file(path)?;
    Ok(archive)
}

// ============================================================================
// Tests
// ============================================================================
