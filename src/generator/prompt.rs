/// The output-format contract sent with every generation request.
///
/// The prompt is loaded from `prompt.txt` at compile time using the
/// `include_str!` macro, making it easy to edit without dealing with
/// Rust string syntax.
pub const RECIPE_FORMAT_PROMPT: &str = include_str!("prompt.txt");

/// Build the full generation prompt around the user's free-text request
pub fn build_generation_prompt(request: &str) -> String {
    format!(
        "Create a detailed recipe based on: \"{}\".\n{}",
        request.trim(),
        RECIPE_FORMAT_PROMPT
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_embedded() {
        assert!(!RECIPE_FORMAT_PROMPT.is_empty());
        assert!(RECIPE_FORMAT_PROMPT.contains("Return JSON"));
        assert!(RECIPE_FORMAT_PROMPT.contains("readyInMinutes"));
        assert!(RECIPE_FORMAT_PROMPT.contains("instructions"));
    }

    #[test]
    fn test_build_generation_prompt_quotes_the_request() {
        let prompt = build_generation_prompt("  chicken, rice, and broccoli ");
        assert!(prompt.contains("\"chicken, rice, and broccoli\""));
        assert!(prompt.contains("Return JSON"));
    }
}
