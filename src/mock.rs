use std::{
	path::{Path, PathBuf},
	sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::llm::{Llm, LlmError};

/// Stub renderer body that succeeds without writing anything.
pub const EXIT_OK: &str = "exit 0";

/// Stub renderer body that copies the input file (`-i`) to the output path (`-o`).
pub const COPY_INPUT: &str = "cp \"$2\" \"$4\"";

/// Writes an executable shell script standing in for `mmdc` and returns its path.
#[cfg(unix)]
pub fn stub_renderer(dir: &Path, body: &str) -> PathBuf {
	use std::os::unix::fs::PermissionsExt;

	let path = dir.join(format!("mmdc-{}", uuid::Uuid::new_v4()));
	std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
	std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
	path
}

/// An [`Llm`] returning a canned answer and counting how often it was asked.
#[derive(Debug)]
pub struct MockLlm {
	response: Result<String, String>,
	calls: AtomicUsize,
}

impl MockLlm {
	pub fn replying(response: impl Into<String>) -> Self {
		Self { response: Ok(response.into()), calls: AtomicUsize::new(0) }
	}

	pub fn failing(message: impl Into<String>) -> Self {
		Self { response: Err(message.into()), calls: AtomicUsize::new(0) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl Llm for MockLlm {
	fn name(&self) -> &str {
		"MockLlm"
	}

	async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.response.clone().map_err(LlmError::Other)
	}
}
