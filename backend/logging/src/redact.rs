//! Log Redaction
//!
//! Scrubs API keys and bearer tokens from strings prior to logging.
//! Remote engine error bodies can echo credentials back; everything
//! that came from an engine goes through here before hitting the logs.

use regex::Regex;
use std::sync::LazyLock;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9\-_]{8,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    API_KEY_RE.replace_all(input, "[REDACTED_KEY]").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_api_keys_and_bearer_tokens() {
        let raw = "OpenAI rejected key sk-proj-abcdef123456 (Bearer eyJhbGciOiJIUzI1NiJ9)";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("sk-proj-abcdef123456"));
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiJ9"));
        assert!(clean.contains("[REDACTED_KEY]"));
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(
            redact_sensitive_data("tesseract exited with code 1"),
            "tesseract exited with code 1"
        );
    }
}
