//! Running an orchestration off the caller's task.
//!
//! A presentation layer submits one [`DiagramRequest`] at a time and keeps handling its own
//! events while the run makes its network call and waits for the renderer. The
//! [`RenderOutcome`] comes back over a oneshot channel ([`submit`]) or through a callback
//! ([`submit_with_callback`]). Runs cannot be cancelled once submitted.

use std::sync::Arc;

use tokio::{sync::oneshot, task::JoinHandle};
use tracing::{debug, warn, Instrument};

use crate::{
	llm::Llm,
	orchestrator::Orchestrator,
	types::{DiagramRequest, RenderOutcome},
};

/// Receiving end of a submitted run.
#[derive(Debug)]
pub struct RunHandle {
	receiver: oneshot::Receiver<RenderOutcome>,
}

impl RunHandle {
	/// Waits for the run to finish.
	///
	/// Returns `None` only if the run's task panicked before producing an outcome.
	pub async fn outcome(self) -> Option<RenderOutcome> {
		self.receiver.await.ok()
	}
}

/// Spawns a run on the current tokio runtime.
pub fn submit<L: Llm + 'static>(
	orchestrator: Arc<Orchestrator<L>>,
	request: DiagramRequest,
) -> RunHandle {
	let (sender, receiver) = oneshot::channel();
	let id = uuid::Uuid::new_v4();

	spawn_run(orchestrator, request, id, move |outcome| {
		if sender.send(outcome).is_err() {
			warn!("Run {} finished but its handle was dropped", id);
		}
	});

	RunHandle { receiver }
}

/// Spawns a run and hands its outcome to `callback` once finished.
pub fn submit_with_callback<L, F>(
	orchestrator: Arc<Orchestrator<L>>,
	request: DiagramRequest,
	callback: F,
) -> JoinHandle<()>
where
	L: Llm + 'static,
	F: FnOnce(RenderOutcome) + Send + 'static,
{
	spawn_run(orchestrator, request, uuid::Uuid::new_v4(), callback)
}

fn spawn_run<L, F>(
	orchestrator: Arc<Orchestrator<L>>,
	request: DiagramRequest,
	id: uuid::Uuid,
	deliver: F,
) -> JoinHandle<()>
where
	L: Llm + 'static,
	F: FnOnce(RenderOutcome) + Send + 'static,
{
	debug!("Submitting run {}", id);

	tokio::spawn(
		async move {
			let outcome = orchestrator.run_to_outcome(&request).await;
			deliver(outcome);
		}
		.instrument(tracing::info_span!("run", %id)),
	)
}
