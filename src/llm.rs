use std::fmt::Debug;

use async_openai::{
	config::OpenAIConfig,
	error::OpenAIError,
	types::{
		ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
		ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
	},
	Client,
};
use async_trait::async_trait;
use tracing::{debug, error, instrument};

use crate::{credentials::ApiKey, models::Models};

/// Default endpoint, Groq's OpenAI-compatible API.
pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Default sampling temperature. Kept low so the model sticks to the rules.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// A text-generation service able to answer one system + user message pair.
///
/// [`ChatCompletionLlm`] is the implementation used in production. Anything else implementing
/// this trait can be handed to [`crate::Orchestrator`], which is how the tests stub the network.
#[async_trait]
pub trait Llm: Debug + Send + Sync {
	/// Model name, used for logging.
	fn name(&self) -> &str;

	/// Sends `system` and `user` as a single chat completion and returns the text of the first
	/// choice.
	async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
	#[error("Failed to prompt {model}: {source}")]
	Request {
		model: String,
		#[source]
		source: OpenAIError,
	},
	#[error("Failed to get content from {0} response")]
	EmptyResponse(String),
	#[error("{0}")]
	Other(String),
}

/// Chat completion over any OpenAI-compatible endpoint.
pub struct ChatCompletionLlm {
	client: Client<OpenAIConfig>,
	model: Models,
	temperature: f32,
}

impl Debug for ChatCompletionLlm {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ChatCompletionLlm")
			.field("model", &self.model)
			.field("temperature", &self.temperature)
			.finish_non_exhaustive()
	}
}

impl ChatCompletionLlm {
	pub fn new(api_key: &ApiKey, api_base: &str, model: Models) -> Self {
		let config = OpenAIConfig::new().with_api_base(api_base).with_api_key(api_key.expose());

		Self { client: Client::with_config(config), model, temperature: DEFAULT_TEMPERATURE }
	}

	pub fn with_temperature(mut self, temperature: f32) -> Self {
		self.temperature = temperature;
		self
	}
}

#[async_trait]
impl Llm for ChatCompletionLlm {
	fn name(&self) -> &str {
		self.model.name()
	}

	#[instrument(skip(self, system, user), fields(model = %self.model))]
	async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
		let build = |e: OpenAIError| {
			error!("Failed to build chat completion request: {}", e);
			LlmError::Other(e.to_string())
		};

		let messages: Vec<ChatCompletionRequestMessage> = vec![
			ChatCompletionRequestSystemMessageArgs::default()
				.content(system)
				.build()
				.map_err(build)?
				.into(),
			ChatCompletionRequestUserMessageArgs::default().content(user).build().map_err(build)?.into(),
		];

		let request = CreateChatCompletionRequestArgs::default()
			.model(self.model.name())
			.messages(messages)
			.temperature(self.temperature)
			.build()
			.map_err(build)?;

		debug!("Prompting {}", self.model);

		let response = self.client.chat().create(request).await.map_err(|e| {
			error!("Failed to prompt {}: {}", self.model, e);
			LlmError::Request { model: self.model.name().to_string(), source: e }
		})?;

		response
			.choices
			.into_iter()
			.next()
			.and_then(|choice| choice.message.content)
			.ok_or_else(|| LlmError::EmptyResponse(self.model.name().to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn debug_output_does_not_leak_the_key() {
		let key = ApiKey::new("sk-very-secret");
		let llm = ChatCompletionLlm::new(&key, DEFAULT_API_BASE, Models::default())
			.with_temperature(0.3);

		let debug = format!("{:?}", llm);
		assert!(!debug.contains("sk-very-secret"));
		assert!(debug.contains("0.3"));
		assert_eq!(llm.name(), "llama-3.3-70b-versatile");
	}
}
