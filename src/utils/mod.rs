// Utility functions

use std::path::PathBuf;

/// Get the ~/.ideaforge directory holding the database and secrets file.
///
/// Returns None when no home directory can be determined.
pub fn ideaforge_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ideaforge"))
}

/// Truncate text to at most `max_chars` characters, appending an ellipsis
/// when anything was cut. Splits on character boundaries, never bytes.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Generate a unique identifier for new records
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_passthrough() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("exact", 5), "exact");
    }

    #[test]
    fn test_truncate_text_cuts_and_marks() {
        let result = truncate_text("abcdefghij", 8);
        assert_eq!(result, "abcde...");
        assert_eq!(result.chars().count(), 8);
    }

    #[test]
    fn test_truncate_text_multibyte() {
        let text = "é".repeat(10);
        let result = truncate_text(&text, 6);
        assert_eq!(result.chars().count(), 6);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_generate_id() {
        let id1 = generate_id();
        let id2 = generate_id();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36);
    }
}
