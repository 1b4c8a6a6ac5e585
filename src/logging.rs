//! Process-wide file logging.
//!
//! [`init`] installs a `tracing` subscriber that appends `timestamp level message` lines to a
//! log file. Only the first call installs anything; later calls return the path chosen by the
//! first one.

use std::{
	fs::OpenOptions,
	path::{Path, PathBuf},
	sync::{Mutex, OnceLock},
};

use tracing::{info, Level};
use tracing_subscriber::fmt::{self, time::ChronoLocal};

/// Timestamp layout of every log line, e.g. `2024-05-01 13:37:00`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static LOG_FILE: OnceLock<PathBuf> = OnceLock::new();
static INIT: Mutex<()> = Mutex::new(());

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
	#[error("Failed to open log file {}: {source}", .path.display())]
	Open {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("Failed to install log subscriber: {0}")]
	Install(String),
}

/// Sets up logging to `path` at `level`.
///
/// Idempotent: after the first successful call this only returns the path chosen first.
pub fn init(path: &Path, level: Level) -> Result<&'static Path, LoggingError> {
	let _guard = INIT.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
	if let Some(existing) = LOG_FILE.get() {
		return Ok(existing.as_path())
	}

	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		std::fs::create_dir_all(parent)
			.map_err(|source| LoggingError::Open { path: path.to_path_buf(), source })?;
	}

	let file = OpenOptions::new()
		.create(true)
		.append(true)
		.open(path)
		.map_err(|source| LoggingError::Open { path: path.to_path_buf(), source })?;

	let subscriber = fmt::Subscriber::builder()
		.with_max_level(level)
		.with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
		.with_ansi(false)
		.with_target(false)
		.with_writer(Mutex::new(file))
		.finish();

	// Fails if a host application already installed its own subscriber.
	tracing::subscriber::set_global_default(subscriber)
		.map_err(|e| LoggingError::Install(e.to_string()))?;

	let path = LOG_FILE.get_or_init(|| path.to_path_buf());
	info!(task = "tracing_setup", result = "success", "logging to {}", path.display());

	Ok(path.as_path())
}

/// Path logging was initialised with, if it has been.
pub fn log_file() -> Option<&'static Path> {
	LOG_FILE.get().map(PathBuf::as_path)
}
