use std::{
	io::Write,
	path::{Path, PathBuf},
	process::Stdio,
	time::Duration,
};

use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, error, info, instrument, warn};

use crate::types::{OutputFormat, RenderOutcome};

/// Renderer executable name on everything but Windows.
pub const MMDC: &str = "mmdc";

/// Background passed to the renderer.
const BACKGROUND: &str = "transparent";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
	#[error("Mermaid CLI not found at {}", .path.display())]
	ToolNotInstalled { path: PathBuf },
	#[error("Renderer did not exit within {timeout:?}")]
	TimedOut { timeout: Duration },
	#[error("Failed to start renderer: {0}")]
	Spawn(#[source] std::io::Error),
	#[error("Filesystem error: {0}")]
	Filesystem(#[source] std::io::Error),
}

/// Drives the external Mermaid CLI.
///
/// Every call to [`Renderer::render`] writes its input to its own transient file, so renders
/// running at the same time never share one.
#[derive(Debug, Clone)]
pub struct Renderer {
	executable: PathBuf,
	timeout: Option<Duration>,
	transient_dir: PathBuf,
}

impl Renderer {
	pub fn new(executable: impl Into<PathBuf>) -> Self {
		Self { executable: executable.into(), timeout: None, transient_dir: std::env::temp_dir() }
	}

	/// Renderer at the platform's usual install location.
	///
	/// On Windows this is `mmdc.cmd` under the roaming app-data `npm` directory, elsewhere the
	/// first `mmdc` found on `PATH`.
	pub fn locate() -> Self {
		Self::new(default_executable())
	}

	/// Kills the renderer if it has not exited after `timeout`.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	/// Directory transient input files are written to. Defaults to the system temp dir.
	pub fn with_transient_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.transient_dir = dir.into();
		self
	}

	pub fn is_installed(&self) -> bool {
		self.executable.is_file()
	}

	pub fn ensure_installed(&self) -> Result<(), RenderError> {
		if self.is_installed() {
			return Ok(())
		}

		error!("Mermaid CLI (mmdc) not found at {}", self.executable.display());
		Err(RenderError::ToolNotInstalled { path: self.executable.clone() })
	}

	/// Renders `diagram_text` to `output_directory/flowchart.<format>`.
	///
	/// A non-zero renderer exit is not an error: it is returned as an unsuccessful
	/// [`RenderOutcome`] carrying the renderer's stderr. The transient input file is removed
	/// whatever happens.
	#[instrument(skip(self, diagram_text))]
	pub async fn render(
		&self,
		diagram_text: &str,
		output_format: OutputFormat,
		output_directory: &Path,
	) -> Result<RenderOutcome, RenderError> {
		self.ensure_installed()?;

		tokio::fs::create_dir_all(output_directory).await.map_err(|e| {
			error!("Failed to create output directory {}: {}", output_directory.display(), e);
			RenderError::Filesystem(e)
		})?;
		let output_path = output_directory.join(output_format.file_name());

		let transient = write_transient(&self.transient_dir, diagram_text)?;

		let mut command = Command::new(&self.executable);
		command
			.arg("-i")
			.arg(transient.path())
			.arg("-o")
			.arg(&output_path)
			.arg("-b")
			.arg(BACKGROUND)
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.kill_on_drop(true);

		debug!("Running {:?}", command.as_std());

		let output = match self.timeout {
			Some(timeout) => tokio::time::timeout(timeout, command.output()).await.map_err(|_| {
				error!("Renderer timed out after {:?}", timeout);
				RenderError::TimedOut { timeout }
			})?,
			None => command.output().await,
		}
		.map_err(|e| {
			error!("Failed to start {}: {}", self.executable.display(), e);
			RenderError::Spawn(e)
		})?;

		let transient_path = transient.path().to_path_buf();
		if let Err(e) = transient.close() {
			warn!("Failed to remove transient file {}: {}", transient_path.display(), e);
		}

		let outcome = if output.status.success() {
			info!("Flowchart saved as: {}", output_path.display());
			RenderOutcome::succeeded(output_path)
		} else {
			let diagnostic = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
			error!("Renderer exited with {}: {}", output.status, diagnostic);
			RenderOutcome::failed(output_path, diagnostic)
		};

		Ok(outcome.with_diagram_text(diagram_text))
	}
}

impl Default for Renderer {
	fn default() -> Self {
		Self::locate()
	}
}

#[cfg(windows)]
fn default_executable() -> PathBuf {
	dirs::data_dir()
		.map(|dir| dir.join("npm").join("mmdc.cmd"))
		.unwrap_or_else(|| PathBuf::from("mmdc.cmd"))
}

#[cfg(not(windows))]
fn default_executable() -> PathBuf {
	std::env::var_os("PATH")
		.and_then(|paths| {
			std::env::split_paths(&paths).map(|dir| dir.join(MMDC)).find(|path| path.is_file())
		})
		.unwrap_or_else(|| PathBuf::from(MMDC))
}

/// Writes the renderer input to a uniquely named `flowchart-*.mmd` in `dir`.
///
/// The file is deleted when the returned handle is dropped or closed.
fn write_transient(dir: &Path, contents: &str) -> Result<NamedTempFile, RenderError> {
	let file = tempfile::Builder::new()
		.prefix("flowchart-")
		.suffix(".mmd")
		.tempfile_in(dir)
		.and_then(|mut file| {
			file.write_all(contents.as_bytes())?;
			file.flush()?;
			Ok(file)
		})
		.map_err(|e| {
			error!("Failed to write transient file in {}: {}", dir.display(), e);
			RenderError::Filesystem(e)
		})?;
	debug!("Wrote transient file {}", file.path().display());

	Ok(file)
}

#[cfg(all(test, unix))]
mod tests {
	use std::fs;

	use tempfile::tempdir;

	use super::*;
	use crate::mock::{stub_renderer, COPY_INPUT, EXIT_OK};

	#[tokio::test]
	async fn succeeds_for_every_format() {
		let dir = tempdir().unwrap();
		let renderer = Renderer::new(stub_renderer(dir.path(), EXIT_OK));

		for format in OutputFormat::ALL {
			let outcome =
				renderer.render("flowchart TD\nA --> B", format, dir.path()).await.unwrap();
			assert!(outcome.success);
			assert!(outcome.output_path.ends_with(format!("flowchart.{}", format)));
			assert_eq!(outcome.output_path, dir.path().join(format.file_name()));
		}
	}

	#[tokio::test]
	async fn non_zero_exit_reports_stderr() {
		let dir = tempdir().unwrap();
		let renderer =
			Renderer::new(stub_renderer(dir.path(), "printf boom >&2\nexit 1"));

		let outcome = renderer.render("flowchart TD", OutputFormat::Png, dir.path()).await.unwrap();
		assert!(!outcome.success);
		assert_eq!(outcome.diagnostic_text, "boom");
	}

	#[tokio::test]
	async fn missing_executable_short_circuits() {
		let dir = tempdir().unwrap();
		let out = dir.path().join("out");
		let transient = dir.path().join("transient");
		fs::create_dir(&transient).unwrap();

		let renderer = Renderer::new(dir.path().join("no-such-mmdc")).with_transient_dir(&transient);
		let err = renderer.render("flowchart TD", OutputFormat::Svg, &out).await.unwrap_err();

		assert!(matches!(err, RenderError::ToolNotInstalled { .. }));
		assert!(!out.exists());
		assert_eq!(fs::read_dir(&transient).unwrap().count(), 0);
	}

	#[tokio::test]
	async fn passes_arguments_and_cleans_up_transient_file() {
		let dir = tempdir().unwrap();
		let transient = dir.path().join("transient");
		fs::create_dir(&transient).unwrap();
		let args_log = dir.path().join("args");
		let script = format!("echo \"$@\" > {}\n{}", args_log.display(), COPY_INPUT);

		let renderer =
			Renderer::new(stub_renderer(dir.path(), &script)).with_transient_dir(&transient);
		let outcome =
			renderer.render("flowchart TD\nA --> B", OutputFormat::Pdf, dir.path()).await.unwrap();

		assert!(outcome.success);
		assert_eq!(fs::read_to_string(&outcome.output_path).unwrap(), "flowchart TD\nA --> B");

		let args = fs::read_to_string(&args_log).unwrap();
		let args: Vec<&str> = args.split_whitespace().collect();
		assert_eq!(args[0], "-i");
		let transient_name = Path::new(args[1]).file_name().unwrap().to_str().unwrap();
		assert!(transient_name.starts_with("flowchart-") && transient_name.ends_with(".mmd"));
		assert_eq!(outcome.diagram_text, "flowchart TD\nA --> B");
		assert_eq!(&args[2..], ["-o", outcome.output_path.to_str().unwrap(), "-b", "transparent"]);

		assert_eq!(fs::read_dir(&transient).unwrap().count(), 0);
	}

	#[tokio::test]
	async fn creates_missing_output_directory() {
		let dir = tempdir().unwrap();
		let out = dir.path().join("nested").join("out");
		let renderer = Renderer::new(stub_renderer(dir.path(), EXIT_OK));

		let outcome = renderer.render("flowchart TD", OutputFormat::Png, &out).await.unwrap();
		assert!(outcome.success);
		assert!(out.is_dir());
	}

	#[tokio::test]
	async fn unwritable_transient_dir_is_filesystem_error() {
		let dir = tempdir().unwrap();
		let renderer = Renderer::new(stub_renderer(dir.path(), EXIT_OK))
			.with_transient_dir(dir.path().join("does-not-exist"));

		let err = renderer.render("flowchart TD", OutputFormat::Png, dir.path()).await.unwrap_err();
		assert!(matches!(err, RenderError::Filesystem(_)));
	}

	#[tokio::test]
	async fn hung_renderer_is_killed_after_timeout() {
		let dir = tempdir().unwrap();
		let renderer = Renderer::new(stub_renderer(dir.path(), "sleep 30"))
			.with_timeout(Duration::from_millis(200));

		let err = renderer.render("flowchart TD", OutputFormat::Png, dir.path()).await.unwrap_err();
		assert!(matches!(err, RenderError::TimedOut { timeout } if timeout == Duration::from_millis(200)));
		assert_eq!(err.to_string(), "Renderer did not exit within 200ms");
	}
}
