//! Input preparation for embedding requests.

/// Maximum input length for embedding requests (characters, not tokens)
pub const MAX_INPUT_CHARS: usize = 8000;

/// Keep the first `max_chars` characters of `text`.
///
/// Counts chars rather than bytes so a multi-byte sequence is never split.
pub fn truncate_input(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(truncate_input("hello", MAX_INPUT_CHARS), "hello");
        assert_eq!(truncate_input("", MAX_INPUT_CHARS), "");
    }

    #[test]
    fn test_exact_length_untouched() {
        let text = "a".repeat(MAX_INPUT_CHARS);
        assert_eq!(truncate_input(&text, MAX_INPUT_CHARS).len(), MAX_INPUT_CHARS);
    }

    #[test]
    fn test_long_text_truncated() {
        let text = "word ".repeat(10_000);
        assert_eq!(text.len(), 50_000);

        let truncated = truncate_input(&text, MAX_INPUT_CHARS);
        assert_eq!(truncated.chars().count(), MAX_INPUT_CHARS);
        assert!(text.starts_with(truncated));
    }

    #[test]
    fn test_multibyte_not_split() {
        let text = "é".repeat(10);
        let truncated = truncate_input(&text, 3);
        assert_eq!(truncated, "ééé");
        assert_eq!(truncated.len(), 6);
    }
}
