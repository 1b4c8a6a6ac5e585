use std::{
	fmt::Display,
	path::{Path, PathBuf},
	str::FromStr,
	time::Duration,
};

use clap::{builder::PossibleValue, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::{credentials::CredentialError, llm::LlmError, render::RenderError};

/// Base name of every rendered file, the extension is taken from [`OutputFormat`].
pub const OUTPUT_FILE_STEM: &str = "flowchart";

/// File formats the renderer can produce.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
	#[default]
	Png,
	Svg,
	Pdf,
}

impl OutputFormat {
	pub const ALL: [OutputFormat; 3] = [Self::Png, Self::Svg, Self::Pdf];

	/// File extension, also the renderer's format selector.
	pub fn extension(&self) -> &'static str {
		match self {
			Self::Png => "png",
			Self::Svg => "svg",
			Self::Pdf => "pdf",
		}
	}

	/// Maps an interactive menu choice (`1`, `2` or `3`) to a format.
	///
	/// Anything else selects [`OutputFormat::Png`].
	pub fn from_menu_choice(choice: &str) -> Self {
		match choice.trim() {
			"2" => Self::Svg,
			"3" => Self::Pdf,
			_ => Self::Png,
		}
	}

	/// Name of the rendered file, e.g. `flowchart.svg`.
	pub fn file_name(&self) -> String {
		format!("{}.{}", OUTPUT_FILE_STEM, self.extension())
	}
}

impl Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.extension())
	}
}

impl FromStr for OutputFormat {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"png" | "1" => Ok(Self::Png),
			"svg" | "2" => Ok(Self::Svg),
			"pdf" | "3" => Ok(Self::Pdf),
			other => Err(format!("Invalid output format: {} \n Valid formats: png | svg | pdf", other)),
		}
	}
}

/// Clap value enum implementation for argument parsing.
impl ValueEnum for OutputFormat {
	fn value_variants<'a>() -> &'a [Self] {
		&Self::ALL
	}

	fn to_possible_value(&self) -> Option<PossibleValue> {
		Some(PossibleValue::new(self.extension()))
	}
}

/// A single user request for a flowchart.
///
/// Built once per invocation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramRequest {
	description: String,
	output_format: OutputFormat,
	output_directory: PathBuf,
}

impl DiagramRequest {
	/// Creates a request, rejecting empty or whitespace-only descriptions.
	pub fn new(
		description: impl Into<String>,
		output_format: OutputFormat,
		output_directory: impl Into<PathBuf>,
	) -> Result<Self, OrchestrationError> {
		let description = description.into();
		if description.trim().is_empty() {
			return Err(OrchestrationError::EmptyDescription)
		}

		Ok(Self { description, output_format, output_directory: output_directory.into() })
	}

	pub fn description(&self) -> &str {
		&self.description
	}

	pub fn output_format(&self) -> OutputFormat {
		self.output_format
	}

	pub fn output_directory(&self) -> &Path {
		&self.output_directory
	}
}

/// Terminal result of a run, handed to whatever presents it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
	pub success: bool,
	pub output_path: PathBuf,
	/// Renderer stderr on failure, or the error message when the run failed earlier.
	pub diagnostic_text: String,
	/// Diagram code handed to the renderer. Empty if the run failed before rendering.
	pub diagram_text: String,
}

impl RenderOutcome {
	pub fn succeeded(output_path: PathBuf) -> Self {
		Self {
			success: true,
			output_path,
			diagnostic_text: String::new(),
			diagram_text: String::new(),
		}
	}

	pub fn failed(output_path: PathBuf, diagnostic_text: impl Into<String>) -> Self {
		Self {
			success: false,
			output_path,
			diagnostic_text: diagnostic_text.into(),
			diagram_text: String::new(),
		}
	}

	pub fn with_diagram_text(mut self, diagram_text: impl Into<String>) -> Self {
		self.diagram_text = diagram_text.into();
		self
	}
}

/// Stages a run moves through. Runs only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
	Idle,
	PromptBuilt,
	ResponseReceived,
	Sanitized,
	Rendered,
	Succeeded,
	Failed,
}

impl RunState {
	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::Succeeded | Self::Failed)
	}
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
	/// The description was empty or only whitespace.
	EmptyDescription,
	/// Renderer executable not found at the resolved path.
	ToolNotInstalled { path: PathBuf },
	/// No API key could be resolved.
	CredentialMissing(#[from] CredentialError),
	/// The chat-completion call failed.
	InferenceCallFailed(#[from] LlmError),
	/// Renderer exited with a non-zero status.
	RenderFailed { diagnostic: String, diagram_text: String },
	/// Renderer ran past the configured timeout and was killed.
	TimedOut { timeout: Duration },
	/// Renderer could not be started.
	Spawn(std::io::Error),
	/// Transient or output file could not be written.
	Filesystem(std::io::Error),
}

impl Display for OrchestrationError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::EmptyDescription => write!(f, "Please enter a process description"),
			Self::ToolNotInstalled { path } => write!(
				f,
				"Mermaid CLI (mmdc) not found at {}. Install it using: npm install -g @mermaid-js/mermaid-cli",
				path.display()
			),
			Self::CredentialMissing(e) => write!(f, "{}", e),
			Self::InferenceCallFailed(e) => write!(f, "Error generating flowchart: {}", e),
			Self::RenderFailed { diagnostic, .. } =>
				write!(f, "Error running mmdc: {}", diagnostic),
			Self::TimedOut { timeout } => write!(f, "mmdc did not finish within {:?}", timeout),
			Self::Spawn(e) => write!(f, "Error generating image: {}", e),
			Self::Filesystem(e) => write!(f, "Filesystem error: {}", e),
		}
	}
}

impl From<RenderError> for OrchestrationError {
	fn from(e: RenderError) -> Self {
		match e {
			RenderError::ToolNotInstalled { path } => Self::ToolNotInstalled { path },
			RenderError::TimedOut { timeout } => Self::TimedOut { timeout },
			RenderError::Spawn(e) => Self::Spawn(e),
			RenderError::Filesystem(e) => Self::Filesystem(e),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn output_format_parses_names_and_menu_digits() {
		assert_eq!("svg".parse::<OutputFormat>(), Ok(OutputFormat::Svg));
		assert_eq!(" PDF ".parse::<OutputFormat>(), Ok(OutputFormat::Pdf));
		assert_eq!("1".parse::<OutputFormat>(), Ok(OutputFormat::Png));
		assert!("gif".parse::<OutputFormat>().is_err());
	}

	#[test]
	fn unknown_menu_choice_defaults_to_png() {
		assert_eq!(OutputFormat::from_menu_choice("3"), OutputFormat::Pdf);
		assert_eq!(OutputFormat::from_menu_choice(""), OutputFormat::Png);
		assert_eq!(OutputFormat::from_menu_choice("7"), OutputFormat::Png);
	}

	#[test]
	fn file_name_uses_fixed_stem() {
		for format in OutputFormat::ALL {
			assert_eq!(format.file_name(), format!("flowchart.{}", format.extension()));
		}
	}

	#[test]
	fn request_rejects_blank_description() {
		assert!(matches!(
			DiagramRequest::new("  \n\t", OutputFormat::Png, "."),
			Err(OrchestrationError::EmptyDescription)
		));
		let req = DiagramRequest::new("user login flow", OutputFormat::Svg, "/tmp").unwrap();
		assert_eq!(req.description(), "user login flow");
		assert_eq!(req.output_directory(), Path::new("/tmp"));
	}

	#[test]
	fn blank_description_message_is_user_facing() {
		let err = DiagramRequest::new("  ", OutputFormat::Svg, ".").unwrap_err();
		assert_eq!(err.to_string(), "Please enter a process description");
	}

	#[test]
	fn sub_second_timeout_is_not_truncated() {
		let err = OrchestrationError::from(RenderError::TimedOut {
			timeout: Duration::from_millis(500),
		});
		assert_eq!(err.to_string(), "mmdc did not finish within 500ms");
	}

	#[test]
	fn terminal_states() {
		assert!(RunState::Succeeded.is_terminal());
		assert!(RunState::Failed.is_terminal());
		assert!(!RunState::Sanitized.is_terminal());
	}
}
