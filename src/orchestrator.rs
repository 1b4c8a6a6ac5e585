use tracing::{debug, error, info, instrument, trace};

use crate::{
	llm::Llm,
	prompt::{build_prompt, SYSTEM_INSTRUCTION},
	render::Renderer,
	sanitize::sanitize,
	styling::apply_iso_styles,
	types::{DiagramRequest, OrchestrationError, RenderOutcome, RunState},
};

/// The machine that turns a [`DiagramRequest`] into a rendered flowchart.
///
/// A run moves strictly forward through [`RunState`]:
///
/// `Idle -> PromptBuilt -> ResponseReceived -> Sanitized -> Rendered -> Succeeded | Failed`
///
/// Any failure ends the run. Nothing is retried.
#[derive(Debug)]
pub struct Orchestrator<L: Llm> {
	llm: L,
	renderer: Renderer,
	styling: bool,
}

impl<L: Llm> Orchestrator<L> {
	pub fn new(llm: L, renderer: Renderer) -> Self {
		Self { llm, renderer, styling: false }
	}

	/// Appends the ISO 5807 class definitions to every diagram before rendering.
	pub fn with_styling(mut self, styling: bool) -> Self {
		self.styling = styling;
		self
	}

	pub fn llm(&self) -> &L {
		&self.llm
	}

	/// Runs the whole pipeline for `request`.
	///
	/// The renderer is checked before the model is prompted, so a missing Mermaid CLI never
	/// costs an API call. A renderer exiting non-zero is reported as
	/// [`OrchestrationError::RenderFailed`].
	#[instrument(
		skip(self, request),
		fields(model = %self.llm.name(), format = %request.output_format())
	)]
	pub async fn run(&self, request: &DiagramRequest) -> Result<RenderOutcome, OrchestrationError> {
		let mut state = RunState::Idle;

		let result = self.drive(request, &mut state).await;
		match &result {
			Ok(outcome) => {
				transition(&mut state, RunState::Succeeded);
				info!("Flowchart saved as: {}", outcome.output_path.display());
			},
			Err(e) => {
				error!("Run failed after {:?}: {}", state, e);
				transition(&mut state, RunState::Failed);
			},
		}

		result
	}

	/// Like [`Orchestrator::run`], but every error is folded into an unsuccessful
	/// [`RenderOutcome`] whose diagnostic text is the error message.
	pub async fn run_to_outcome(&self, request: &DiagramRequest) -> RenderOutcome {
		let output_path = request.output_directory().join(request.output_format().file_name());

		match self.run(request).await {
			Ok(outcome) => outcome,
			Err(OrchestrationError::RenderFailed { diagnostic, diagram_text }) =>
				RenderOutcome::failed(output_path, diagnostic).with_diagram_text(diagram_text),
			Err(e) => RenderOutcome::failed(output_path, e.to_string()),
		}
	}

	async fn drive(
		&self,
		request: &DiagramRequest,
		state: &mut RunState,
	) -> Result<RenderOutcome, OrchestrationError> {
		self.renderer.ensure_installed()?;

		let prompt = build_prompt(request.description());
		transition(state, RunState::PromptBuilt);

		let raw = self.llm.complete(SYSTEM_INSTRUCTION, &prompt).await?;
		transition(state, RunState::ResponseReceived);

		let mut diagram = sanitize(&raw);
		if self.styling {
			diagram = apply_iso_styles(&diagram);
		}
		transition(state, RunState::Sanitized);
		debug!("Generated flowchart code:\n{}", diagram);

		let outcome = self
			.renderer
			.render(&diagram, request.output_format(), request.output_directory())
			.await?;
		transition(state, RunState::Rendered);

		if outcome.success {
			Ok(outcome)
		} else {
			Err(OrchestrationError::RenderFailed {
				diagnostic: outcome.diagnostic_text,
				diagram_text: outcome.diagram_text,
			})
		}
	}
}

fn transition(state: &mut RunState, next: RunState) {
	debug_assert!(!state.is_terminal(), "run already ended in {:?}", state);
	trace!("{:?} -> {:?}", state, next);
	*state = next;
}
