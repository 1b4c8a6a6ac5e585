//! Instructions sent to the chat model.
//!
//! Both the system message and the user prompt are fixed text; only the process description
//! varies between runs.

/// First token every generated diagram must start with.
pub const STARTING_TOKEN: &str = "flowchart TD";

/// System message sent ahead of every prompt.
pub const SYSTEM_INSTRUCTION: &str = "Generate Mermaid flowchart code using standard symbols. Use \
                                      only basic arrows (--> or -->|label|) without any special \
                                      characters.";

/// Symbol markers the model is allowed to use, as `(meaning, syntax)`.
pub const SYMBOLS: [(&str, &str); 5] = [
	("Start/End", "([Text])"),
	("Process", "[Text]"),
	("Decision", "{Text}"),
	("Input/Output", "[/Text/]"),
	("Subroutine", "[[Text]]"),
];

const EXAMPLE: &str = "flowchart TD
    A([Start]) --> B[/Input/]
    B --> C[Process]
    C --> D{Decision}";

/// Builds the user prompt for `description`.
///
/// The description is embedded verbatim. Callers are expected to reject blank descriptions
/// before getting here, see [`crate::DiagramRequest::new`].
pub fn build_prompt(description: &str) -> String {
	let symbols = SYMBOLS
		.iter()
		.map(|(meaning, syntax)| format!("   - {}: {}", meaning, syntax))
		.collect::<Vec<_>>()
		.join("\n");

	format!(
		"Create a Mermaid flowchart following ISO 5807:1985 standards for: {description}

Rules:
1. Start with '{STARTING_TOKEN}'
2. Use these symbols exactly:
{symbols}
3. Use simple arrows: -->
4. For labeled arrows use: -->|Label|
5. No special characters in the arrows
6. Keep labels simple and clear
7. Each node should have a unique single-letter ID (A, B, C, etc.)

Example format:
{EXAMPLE}
"
	)
}
