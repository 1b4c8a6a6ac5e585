use std::{
	error::Error,
	io::{self, BufRead, Write},
	path::PathBuf,
	process::ExitCode,
	str::FromStr,
	sync::Arc,
	time::Duration,
};

use clap::Parser;
use flowchart_weaver::{
	credentials::{default_sources, resolve_api_key},
	logging, AppConfig, ChatCompletionLlm, DiagramRequest, Models, Orchestrator, OutputFormat,
	Renderer,
};
use tracing::{debug, error, info, Level};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Process to draw. Asked for interactively when omitted.
	description: Option<String>,
	/// Output format.
	#[arg(short, long, value_enum)]
	format: Option<OutputFormat>,
	/// Directory the flowchart is written to.
	#[arg(short, long, default_value = ".")]
	output_dir: PathBuf,
	/// Path to configuration file (TOML).
	#[arg(short, long)]
	config: Option<PathBuf>,
	/// Chat model to use.
	#[arg(long, value_enum)]
	model: Option<Models>,
	/// Base URL of the OpenAI-compatible API.
	#[arg(long)]
	api_base: Option<String>,
	/// Environment variable holding the API key.
	#[arg(long)]
	api_key_env: Option<String>,
	/// Ask for the API key on the terminal if no other source has one.
	#[arg(long)]
	prompt_api_key: bool,
	/// Path to the Mermaid CLI executable.
	#[arg(long)]
	renderer: Option<PathBuf>,
	/// Kill the renderer after this many seconds.
	#[arg(long)]
	render_timeout: Option<u64>,
	/// Append ISO 5807 class definitions to the diagram.
	#[arg(long)]
	styled: bool,
	/// Log file.
	#[arg(long)]
	log_file: Option<PathBuf>,
	/// Log level
	#[arg(long)]
	log_level: Option<Level>,
}

impl Args {
	/// Command-line flags take precedence over the configuration file.
	fn merge_into(&self, mut config: AppConfig) -> AppConfig {
		if let Some(model) = self.model {
			config.model = model;
		}
		if let Some(api_base) = &self.api_base {
			config.api_base = api_base.clone();
		}
		if let Some(api_key_env) = &self.api_key_env {
			config.api_key_env = api_key_env.clone();
		}
		if let Some(renderer) = &self.renderer {
			config.renderer_path = Some(renderer.clone());
		}
		if let Some(timeout) = self.render_timeout {
			config.render_timeout_secs = Some(timeout);
		}
		if let Some(log_file) = &self.log_file {
			config.log_file = Some(log_file.clone());
		}
		if let Some(level) = self.log_level {
			config.log_level = level.to_string();
		}
		config.styling |= self.styled;
		config
	}
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
	let args = Args::parse();
	let config = args.merge_into(AppConfig::discover(args.config.as_deref())?);

	let level = Level::from_str(&config.log_level).unwrap_or_else(|_| {
		eprintln!("Invalid log level: {}. Using 'info' instead.", config.log_level);
		Level::INFO
	});
	logging::init(&config.log_file_path(), level)?;
	debug!(?args, "parsed arguments");

	dotenv::dotenv().ok();

	println!("Standard Flowchart Generator");
	println!("==========================");

	let interactive = args.description.is_none();
	let description = match args.description.clone() {
		Some(description) => description,
		None => ask_description()?,
	};
	let format = match args.format {
		Some(format) => format,
		None if interactive => ask_format()?,
		None => OutputFormat::default(),
	};
	let request = match DiagramRequest::new(description, format, &args.output_dir) {
		Ok(request) => request,
		Err(e) => {
			eprintln!("Error: {}", e);
			return Ok(ExitCode::FAILURE)
		},
	};

	let renderer = match &config.renderer_path {
		Some(path) => Renderer::new(path),
		None => Renderer::locate(),
	};
	let renderer = match config.render_timeout_secs {
		Some(secs) => renderer.with_timeout(Duration::from_secs(secs)),
		None => renderer,
	};
	if let Err(e) = renderer.ensure_installed() {
		eprintln!("Error: {}", e);
		eprintln!("Please install it using: npm install -g @mermaid-js/mermaid-cli");
		return Ok(ExitCode::FAILURE)
	}

	let sources = default_sources(None, &config.api_key_env, args.prompt_api_key);
	let api_key = match resolve_api_key(&sources) {
		Ok(key) => key,
		Err(e) => {
			error!("{}", e);
			eprintln!("Error: {}", e);
			return Ok(ExitCode::FAILURE)
		},
	};

	let llm = ChatCompletionLlm::new(&api_key, &config.api_base, config.model)
		.with_temperature(config.temperature);
	let orchestrator = Arc::new(Orchestrator::new(llm, renderer).with_styling(config.styling));

	info!(model = %config.model, format = %format, "generating flowchart");

	let outcome = flowchart_weaver::submit(orchestrator, request)
		.outcome()
		.await
		.ok_or("flowchart generation stopped unexpectedly")?;

	if !outcome.diagram_text.is_empty() {
		print!("{}", generated_code_block(&outcome.diagram_text));
	}

	if outcome.success {
		println!("\nFlowchart saved as: {}", outcome.output_path.display());
		Ok(ExitCode::SUCCESS)
	} else {
		eprintln!("\n{}", outcome.diagnostic_text);
		Ok(ExitCode::FAILURE)
	}
}

const RULE: &str = "--------------------------";

/// The generated Mermaid code framed by dashed rules, as shown before the result line.
fn generated_code_block(diagram_text: &str) -> String {
	format!("\nGenerated Flowchart Code:\n{RULE}\n{diagram_text}\n{RULE}\n")
}

/// Prompts until a non-blank description is entered.
fn ask_description() -> io::Result<String> {
	loop {
		let answer = ask("\nDescribe the process for the flowchart: ")?;
		if !answer.trim().is_empty() {
			return Ok(answer)
		}
		println!("Please enter a process description.");
	}
}

fn ask_format() -> io::Result<OutputFormat> {
	println!("\nOutput formats:");
	for (i, format) in OutputFormat::ALL.iter().enumerate() {
		println!("{}. {}", i + 1, format.extension().to_uppercase());
	}
	Ok(OutputFormat::from_menu_choice(&ask("Choose format (1-3, default is 1): ")?))
}

fn ask(question: &str) -> io::Result<String> {
	print!("{}", question);
	io::stdout().flush()?;

	let mut line = String::new();
	if io::stdin().lock().read_line(&mut line)? == 0 {
		return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"))
	}
	Ok(line.trim().to_string())
}
