//! Cleanup of model output before it is handed to the renderer.

const FENCE: &str = "```";
const MERMAID_FENCE: &str = "```mermaid";

/// Strips markdown code fences wrapped around `raw` and trims surrounding whitespace.
///
/// A leading `` ```mermaid `` or `` ``` `` is removed whether or not a newline follows it. When
/// the text opened with a fence, everything from the next fence on is dropped, which also drops
/// any prose the model appended after the closing fence. Otherwise only a trailing fence is
/// removed. Stripping repeats until nothing changes, so `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(raw: &str) -> String {
	let mut current = raw.trim();

	loop {
		let stripped = strip_fences(current).trim();
		if stripped == current {
			return stripped.to_string()
		}
		current = stripped;
	}
}

fn strip_fences(text: &str) -> &str {
	let Some(body) = strip_leading_fences(text) else {
		return text.strip_suffix(FENCE).unwrap_or(text)
	};

	match body.find(FENCE) {
		Some(end) => &body[..end],
		None => body,
	}
}

/// Removes every opening fence at the start of `text`, `None` if there was none.
fn strip_leading_fences(text: &str) -> Option<&str> {
	let mut rest = text;
	let mut fenced = false;

	loop {
		let trimmed = rest.trim_start();
		let Some(after) =
			trimmed.strip_prefix(MERMAID_FENCE).or_else(|| trimmed.strip_prefix(FENCE))
		else {
			break
		};
		rest = after;
		fenced = true;
	}

	fenced.then_some(rest)
}
