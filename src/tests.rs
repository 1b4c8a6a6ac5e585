#![cfg(unix)]

use std::{fs, sync::Arc};

use futures::future::join_all;
use tempfile::tempdir;

use crate::{
	mock::{stub_renderer, MockLlm, COPY_INPUT},
	*,
};

#[tokio::test]
async fn login_flow_scenario() {
	let dir = tempdir().unwrap();
	let orchestrator = Arc::new(Orchestrator::new(
		MockLlm::replying("```mermaid\nflowchart TD\nA([Start]) --> B([End])\n```"),
		Renderer::new(stub_renderer(dir.path(), COPY_INPUT)),
	));
	let request = DiagramRequest::new("user login flow", OutputFormat::Svg, dir.path()).unwrap();

	let outcome = submit(orchestrator, request).outcome().await.unwrap();

	assert!(outcome.success, "{}", outcome.diagnostic_text);
	assert_eq!(outcome.output_path, dir.path().join("flowchart.svg"));
	assert_eq!(
		fs::read_to_string(&outcome.output_path).unwrap(),
		"flowchart TD\nA([Start]) --> B([End])"
	);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_renders_keep_their_own_input() {
	let dir = tempdir().unwrap();
	let transient = dir.path().join("transient");
	fs::create_dir(&transient).unwrap();
	// Sleep between read and copy so the renders overlap.
	let renderer = Arc::new(
		Renderer::new(stub_renderer(dir.path(), &format!("sleep 0.2\n{}", COPY_INPUT)))
			.with_transient_dir(&transient),
	);

	let runs = (0..8).map(|i| {
		let renderer = Arc::clone(&renderer);
		let out = dir.path().join(format!("run-{}", i));
		tokio::spawn(async move {
			let text = format!("flowchart TD\nA([Run {}]) --> B([End {}])", i, i);
			let outcome = renderer.render(&text, OutputFormat::Svg, &out).await.unwrap();
			(text, outcome)
		})
	});

	for result in join_all(runs).await {
		let (text, outcome) = result.unwrap();
		assert!(outcome.success);
		assert_eq!(fs::read_to_string(&outcome.output_path).unwrap(), text);
	}

	assert_eq!(fs::read_dir(&transient).unwrap().count(), 0);
}

#[tokio::test]
async fn every_format_lands_in_requested_directory() {
	let dir = tempdir().unwrap();
	let orchestrator = Orchestrator::new(
		MockLlm::replying("flowchart TD\nA --> B"),
		Renderer::new(stub_renderer(dir.path(), COPY_INPUT)),
	);

	for format in OutputFormat::ALL {
		let out = dir.path().join(format.extension());
		let request = DiagramRequest::new("order fulfilment", format, &out).unwrap();

		let outcome = orchestrator.run(&request).await.unwrap();
		assert_eq!(outcome.output_path, out.join(format!("flowchart.{}", format)));
		assert!(outcome.output_path.is_file());
	}

	assert_eq!(orchestrator.llm().calls(), 3);
}
