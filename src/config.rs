use std::{
	fs,
	path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, info};

use crate::{credentials::DEFAULT_API_KEY_ENV, llm, models::Models};

/// Directory name used under the platform config and data directories.
pub const APP_DIR: &str = "flowchart-weaver";

/// Log file name used when none is configured.
pub const DEFAULT_LOG_FILE: &str = "flowchart_generator.log";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Configuration file not found: {}", .0.display())]
	MissingFile(PathBuf),
	#[error("Failed to read configuration: {0}")]
	Io(#[from] std::io::Error),
	#[error("Invalid configuration: {0}")]
	Parse(#[from] toml::de::Error),
}

/// Application configuration loaded from a TOML file.
///
/// Every key is optional:
///
/// ```toml
/// model = "llama-3.3-70b-versatile"
/// api_base = "https://api.groq.com/openai/v1"
/// api_key_env = "GROQ_API_KEY"
/// temperature = 0.1
/// renderer_path = "/usr/local/bin/mmdc"
/// render_timeout_secs = 60
/// styling = false
/// log_file = "/var/log/flowchart_generator.log"
/// log_level = "info"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
	pub model: Models,
	pub api_base: String,
	/// Environment variable holding the API key.
	pub api_key_env: String,
	pub temperature: f32,
	/// Overrides the platform lookup of the Mermaid CLI.
	pub renderer_path: Option<PathBuf>,
	/// Unset means the renderer may run forever.
	pub render_timeout_secs: Option<u64>,
	/// Append ISO 5807 class definitions to generated diagrams.
	pub styling: bool,
	pub log_file: Option<PathBuf>,
	pub log_level: String,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			model: Models::default(),
			api_base: llm::DEFAULT_API_BASE.to_string(),
			api_key_env: DEFAULT_API_KEY_ENV.to_string(),
			temperature: llm::DEFAULT_TEMPERATURE,
			renderer_path: None,
			render_timeout_secs: None,
			styling: false,
			log_file: None,
			log_level: "info".to_string(),
		}
	}
}

impl AppConfig {
	/// Load configuration from a TOML file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		if !path.exists() {
			return Err(ConfigError::MissingFile(path.to_path_buf()))
		}

		let content = fs::read_to_string(path)?;
		let config = Self::parse(&content)?;
		info!("Loaded configuration from {}", path.display());

		Ok(config)
	}

	pub fn parse(content: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(content)?)
	}

	/// Loads `explicit` if given, which must exist. Otherwise loads the per-user config file when
	/// there is one, falling back to defaults.
	pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
		if let Some(path) = explicit {
			return Self::load(path)
		}

		match default_config_path().filter(|path| path.exists()) {
			Some(path) => Self::load(path),
			None => {
				debug!("No configuration file found, using defaults");
				Ok(Self::default())
			},
		}
	}

	/// Configured log file, or `flowchart_generator.log` in the platform data directory.
	pub fn log_file_path(&self) -> PathBuf {
		self.log_file.clone().unwrap_or_else(|| {
			dirs::data_local_dir()
				.map(|dir| dir.join(APP_DIR))
				.unwrap_or_default()
				.join(DEFAULT_LOG_FILE)
		})
	}
}

/// `<config dir>/flowchart-weaver/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}
