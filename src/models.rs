use std::{fmt::Display, str::FromStr};

use clap::{builder::PossibleValue, ValueEnum};
use serde::{Deserialize, Serialize};

/// Chat models known to produce usable Mermaid output.
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Models {
	#[default]
	Llama33Versatile,
	Llama31Instant,
	Gpt4oMini,
	Gpt4o,
}

/// Clap value enum implementation for argument parsing.
impl ValueEnum for Models {
	fn value_variants<'a>() -> &'a [Self] {
		&[Self::Llama33Versatile, Self::Llama31Instant, Self::Gpt4oMini, Self::Gpt4o]
	}

	fn to_possible_value(&self) -> Option<PossibleValue> {
		Some(PossibleValue::new(self.name()))
	}
}

impl Models {
	/// Get the model name as the API expects it.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Llama33Versatile => "llama-3.3-70b-versatile",
			Self::Llama31Instant => "llama-3.1-8b-instant",
			Self::Gpt4oMini => "gpt-4o-mini",
			Self::Gpt4o => "gpt-4o",
		}
	}
}

impl Display for Models {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name())
	}
}

impl FromStr for Models {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		<Self as ValueEnum>::value_variants()
			.iter()
			.find(|model| model.name() == s)
			.copied()
			.ok_or_else(|| format!("Unknown model: {}", s))
	}
}

impl TryFrom<String> for Models {
	type Error = String;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<Models> for String {
	fn from(model: Models) -> Self {
		model.name().to_string()
	}
}
