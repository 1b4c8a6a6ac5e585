//! Turns a plain-language description of a process into a rendered flowchart.
//!
//! A run prompts a chat model for Mermaid flowchart code following ISO 5807:1985 symbols, cleans
//! up the reply and hands it to the Mermaid CLI (`mmdc`), which writes
//! `flowchart.<png|svg|pdf>` into the requested directory.
//!
//! The pieces compose in a single forward pass, driven by [`Orchestrator`]:
//!
//! - [`prompt::build_prompt`] builds the user prompt around the description.
//! - [`Llm::complete`] asks the model. [`ChatCompletionLlm`] talks to any OpenAI-compatible API,
//!   Groq by default.
//! - [`sanitize::sanitize`] strips the markdown fences models like to add.
//! - [`Renderer::render`] writes a transient input file and runs the Mermaid CLI against it.
//!
//! For immediate use you must:
//! - install the Mermaid CLI: `npm install -g @mermaid-js/mermaid-cli`
//! - make an API key available, by default through the `GROQ_API_KEY` environment variable or a
//!   `.env` file
//!
//! # Example
//!
//! ```ignore
//! use flowchart_weaver::{
//!     credentials::{default_sources, resolve_api_key},
//!     ChatCompletionLlm, DiagramRequest, Models, Orchestrator, OutputFormat, Renderer,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let key = resolve_api_key(&default_sources(None, "GROQ_API_KEY", false))?;
//!     let llm = ChatCompletionLlm::new(&key, flowchart_weaver::llm::DEFAULT_API_BASE, Models::default());
//!     let orchestrator = Orchestrator::new(llm, Renderer::locate());
//!
//!     let request = DiagramRequest::new("user login flow", OutputFormat::Svg, ".")?;
//!     let outcome = orchestrator.run(&request).await?;
//!
//!     println!("Flowchart saved as: {}", outcome.output_path.display());
//!     Ok(())
//! }
//! ```

pub mod architecture;
pub mod config;
pub mod credentials;
pub mod llm;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod prompt;
pub mod render;
pub mod sanitize;
pub mod styling;
pub mod task;
pub mod types;

#[cfg(test)]
mod mock;
#[cfg(test)]
mod tests;

pub use config::AppConfig;
pub use llm::{ChatCompletionLlm, Llm, LlmError};
pub use models::Models;
pub use orchestrator::Orchestrator;
pub use render::{RenderError, Renderer};
pub use task::{submit, submit_with_callback, RunHandle};
pub use types::{DiagramRequest, OrchestrationError, OutputFormat, RenderOutcome, RunState};
