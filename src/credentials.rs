//! API key resolution.
//!
//! A key is never compiled in. [`resolve_api_key`] walks a caller-supplied list of
//! [`ApiKeySource`]s in order and returns the first non-blank key, or
//! [`CredentialError::Missing`] naming every source that was tried.

use std::{
	fmt::{Debug, Display},
	io::{BufRead, IsTerminal, Write},
	path::PathBuf,
};

use tracing::{debug, info, instrument};

/// Environment variable read when none is configured.
pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";

/// An API key. Its `Debug` output never prints the secret, and it has no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
	pub fn new(key: impl Into<String>) -> Self {
		Self(key.into())
	}

	pub fn expose(&self) -> &str {
		&self.0
	}
}

impl Debug for ApiKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "ApiKey(***)")
	}
}

/// Places an API key may come from.
#[derive(Debug, Clone)]
pub enum ApiKeySource {
	/// A key passed in directly, e.g. from a command-line flag.
	Explicit(Option<String>),
	/// An environment variable.
	Environment(String),
	/// A variable inside a dotenv file. `None` searches the current directory and its parents
	/// for `.env`. The file is loaded into the process environment, without overriding
	/// variables that are already set.
	DotEnv { path: Option<PathBuf>, var: String },
	/// Ask on the terminal. Skipped when stdin is not a terminal.
	Interactive,
}

impl Display for ApiKeySource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Explicit(_) => write!(f, "explicit key"),
			Self::Environment(var) => write!(f, "${}", var),
			Self::DotEnv { path: Some(path), var } => write!(f, "{} in {}", var, path.display()),
			Self::DotEnv { path: None, var } => write!(f, "{} in .env", var),
			Self::Interactive => write!(f, "interactive prompt"),
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
	#[error("No API key found (tried: {})", .tried.join(", "))]
	Missing { tried: Vec<String> },
}

/// Standard lookup order: explicit key, environment, `.env`, then (if allowed) the terminal.
pub fn default_sources(
	explicit: Option<String>,
	env_var: &str,
	interactive: bool,
) -> Vec<ApiKeySource> {
	let mut sources = vec![
		ApiKeySource::Explicit(explicit),
		ApiKeySource::Environment(env_var.to_string()),
		ApiKeySource::DotEnv { path: None, var: env_var.to_string() },
	];
	if interactive {
		sources.push(ApiKeySource::Interactive);
	}
	sources
}

/// Returns the key from the first source that yields a non-blank value.
#[instrument(skip_all)]
pub fn resolve_api_key(sources: &[ApiKeySource]) -> Result<ApiKey, CredentialError> {
	for source in sources {
		if let Some(key) = read_source(source).filter(|key| !key.trim().is_empty()) {
			info!("API key resolved from {}", source);
			return Ok(ApiKey::new(key.trim()))
		}
		debug!("No API key in {}", source);
	}

	Err(CredentialError::Missing { tried: sources.iter().map(ToString::to_string).collect() })
}

fn read_source(source: &ApiKeySource) -> Option<String> {
	match source {
		ApiKeySource::Explicit(key) => key.clone(),
		ApiKeySource::Environment(var) => std::env::var(var).ok(),
		ApiKeySource::DotEnv { path, var } => read_dotenv(path.as_ref(), var),
		ApiKeySource::Interactive => prompt_terminal(),
	}
}

fn read_dotenv(path: Option<&PathBuf>, var: &str) -> Option<String> {
	match path {
		Some(path) => dotenv::from_path(path).ok()?,
		None => {
			dotenv::dotenv().ok()?;
		},
	}

	std::env::var(var).ok()
}

fn prompt_terminal() -> Option<String> {
	let stdin = std::io::stdin();
	if !stdin.is_terminal() {
		return None
	}

	print!("Enter API key: ");
	std::io::stdout().flush().ok()?;

	let mut line = String::new();
	stdin.lock().read_line(&mut line).ok()?;
	Some(line.trim().to_string())
}
