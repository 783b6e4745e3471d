//! Discovery prompt: user query + minimum child count into one single-line instruction.

use crate::error::ExplorerError;

/// Schema and formatting instructions sent with every query.
pub const DISCOVERY_TEMPLATE: &str = r#"
Given the search query between square brackets:
generate JSON object with the following keys:
"title",
"description" (Show interesting information in a consistent tone),
"url" (Reference link if possible),
"children" (a list of other related information with the same structure as the main object),
"prompts" (a list of prompts to discover more about the title)
Use the following instructions:
- Prompt example "Given a+b=120, Solve for b" the prompts can be ("Linear Algebra", "Linear Equations in Algebra")
- Prompts will be a standalone questions, so make it fully qualified
- You may answer questions directly in the description with clear steps
- Format the description in markdown
"#;

/// Builds the instruction string for `user_query`.
///
/// Fails with [`ExplorerError::InvalidInput`] when the query is empty or whitespace-only.
/// Template whitespace runs (newlines, indentation) collapse to one space; line breaks in
/// the query become spaces, everything else in the query is kept verbatim.
pub fn build_prompt(user_query: &str, min_children: u32) -> Result<String, ExplorerError> {
    if user_query.trim().is_empty() {
        return Err(ExplorerError::InvalidInput("empty prompt".to_string()));
    }
    let instructions = format!(
        "{}\n- Show at least {} children",
        DISCOVERY_TEMPLATE, min_children
    );
    let query = user_query.replace(&['\r', '\n'][..], " ");
    Ok(format!(
        "{} Query: [{}]",
        collapse_whitespace(&instructions),
        query
    ))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Prompt builder bound to the session's configured minimum child count.
#[derive(Clone, Debug)]
pub struct PromptBuilder {
    min_children: u32,
}

impl PromptBuilder {
    pub fn new(min_children: u32) -> Self {
        Self { min_children }
    }

    pub fn min_children(&self) -> u32 {
        self.min_children
    }

    pub fn build(&self, user_query: &str) -> Result<String, ExplorerError> {
        build_prompt(user_query, self.min_children)
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_query_and_no_newlines() {
        for n in [0, 1, 7] {
            let p = build_prompt("Rust ownership\nand borrowing", n).unwrap();
            assert!(!p.contains('\n'));
            assert!(p.contains(&format!("Show at least {} children", n)));
        }
        let p = build_prompt("Solve a+b=120 for b", 3).unwrap();
        assert!(p.contains("Solve a+b=120 for b"));
        assert!(p.ends_with("Query: [Solve a+b=120 for b]"));
    }

    #[test]
    fn embeds_schema_keys() {
        let p = build_prompt("tides", 1).unwrap();
        for key in ["\"title\"", "\"description\"", "\"url\"", "\"children\"", "\"prompts\""] {
            assert!(p.contains(key), "missing {} in {}", key, p);
        }
        assert!(p.contains("Format the description in markdown"));
    }

    #[test]
    fn collapses_indentation_to_single_spaces() {
        let p = build_prompt("x", 1).unwrap();
        assert!(!p.contains("  "));
        assert_eq!(p, p.trim());
    }

    #[test]
    fn keeps_query_spacing_verbatim() {
        let p = build_prompt("a  b\r\nc", 1).unwrap();
        assert!(p.contains("[a  b  c]"));
        assert!(!p.contains('\r'));
    }

    #[test]
    fn rejects_empty_and_blank_queries() {
        assert!(matches!(
            build_prompt("", 1),
            Err(ExplorerError::InvalidInput(_))
        ));
        assert!(matches!(
            build_prompt("   ", 4),
            Err(ExplorerError::InvalidInput(_))
        ));
        assert!(matches!(
            PromptBuilder::new(2).build("\n\t"),
            Err(ExplorerError::InvalidInput(_))
        ));
    }

    #[test]
    fn builder_uses_configured_minimum() {
        let b = PromptBuilder::new(5);
        assert_eq!(b.min_children(), 5);
        assert!(b.build("volcanoes").unwrap().contains("Show at least 5 children"));
    }
}
