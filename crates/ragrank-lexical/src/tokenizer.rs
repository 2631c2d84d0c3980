//! Query and document tokenization.
//!
//! Indexing and querying must tokenize identically, so both go through
//! [`tokenize`]: lowercase, then split on Unicode whitespace. Punctuation is
//! kept attached to its word (`"gateway."` and `"gateway"` are different
//! terms).

/// Tokenize text into lowercase whitespace-separated terms.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        assert_eq!(
            tokenize("The Control PLANE"),
            vec!["the", "control", "plane"]
        );
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        assert_eq!(tokenize("  a\tb\n\nc  "), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tokenize_keeps_punctuation() {
        assert_eq!(tokenize("gateway. Gateway"), vec!["gateway.", "gateway"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_tokenize_unicode_lowercase() {
        assert_eq!(tokenize("ÉCOLE Straße"), vec!["école", "straße"]);
    }
}
