/// Class definitions giving every ISO 5807 symbol a plain white fill and dark outline.
///
/// Node IDs are assigned to classes by the letters the prompt asks the model to use, so the
/// mapping only holds for diagrams following the single-letter ID rule.
pub const ISO_5807_STYLES: &str = "

classDef process fill:#fff,stroke:#333,stroke-width:2px;
classDef decision fill:#fff,stroke:#333,stroke-width:2px;
classDef io fill:#fff,stroke:#333,stroke-width:2px;
classDef terminal fill:#fff,stroke:#333,stroke-width:2px,rx:10;

class A,Z terminal;
class B,I io;
class C,E,G,H process;
class D,F decision;";

/// Appends [`ISO_5807_STYLES`] to a sanitized diagram.
pub fn apply_iso_styles(diagram: &str) -> String {
	let mut styled = String::with_capacity(diagram.len() + ISO_5807_STYLES.len());
	styled.push_str(diagram);
	styled.push_str(ISO_5807_STYLES);
	styled
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keeps_diagram_as_prefix() {
		let styled = apply_iso_styles("flowchart TD\nA --> B");
		assert!(styled.starts_with("flowchart TD\nA --> B\n\nclassDef process"));
		assert!(styled.ends_with("class D,F decision;"));
	}
}
