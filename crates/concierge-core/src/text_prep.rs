//! Text preparation — transcript normalization and line wrapping.
//!
//! Pure functions, no I/O.

use regex::Regex;
use std::sync::LazyLock;

// Compiled regexes — allocated once, reused across calls.
static RE_JOINERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_]").unwrap());
static RE_NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Normalize a transcript for keyword matching.
///
/// Lowercases, removes hyphens and underscores (so `check-out` reads as
/// `checkout`), then removes every character that is neither a word
/// character nor whitespace. Whitespace is left as is.
///
/// Word characters are Unicode-aware: Devanagari and Kannada transcripts
/// keep their letters and combining marks.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let joined = RE_JOINERS.replace_all(&lower, "");
    RE_NON_WORD.replace_all(&joined, "").into_owned()
}

/// Wrap text into lines of at most `width` characters.
///
/// Breaks at whitespace; words longer than `width` are hard-split.
/// Counts chars, not bytes, so multi-byte scripts never split mid-character.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0usize;

    for word in text.split_whitespace() {
        let mut word = word;
        let mut word_len = word.chars().count();

        while word_len > width {
            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            let split_at = word
                .char_indices()
                .nth(width)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            lines.push(word[..split_at].to_string());
            word = &word[split_at..];
            word_len -= width;
        }

        if word_len == 0 {
            continue;
        }

        if line_len > 0 && line_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.push_str(word);
        line_len += word_len;
    }

    if !line.is_empty() {
        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── normalize ───────────────────────────────────────────────────

    #[test]
    fn lowercases() {
        assert_eq!(normalize("BREAKFAST"), "breakfast");
    }

    #[test]
    fn strips_punctuation() {
        assert_eq!(normalize("what's the WIFI password?"), "whats the wifi password");
        assert_eq!(normalize("I'd like to order BREAKFAST!!"), "id like to order breakfast");
    }

    #[test]
    fn joins_hyphenated_words() {
        assert_eq!(normalize("late check-out"), "late checkout");
        assert_eq!(normalize("wi_fi"), "wifi");
    }

    #[test]
    fn keeps_whitespace_runs() {
        assert_eq!(normalize("gym  ,  please"), "gym    please");
    }

    #[test]
    fn strips_curly_quotes() {
        assert_eq!(normalize("what’s up"), "whats up");
    }

    #[test]
    fn keeps_devanagari() {
        assert_eq!(normalize("पानी चाहिए।"), "पानी चाहिए");
    }

    #[test]
    fn idempotent() {
        for input in [
            "I'd like to order BREAKFAST!!",
            "  Check-Out time?? ",
            "wi_fi / internet",
            "पानी चाहिए।",
            "",
            "---",
        ] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), "");
    }

    // ── wrap_text ───────────────────────────────────────────────────

    #[test]
    fn short_text_single_line() {
        assert_eq!(wrap_text("Hello world.", 40), vec!["Hello world."]);
    }

    #[test]
    fn wraps_at_word_boundary() {
        let lines = wrap_text("The swimming pool is open from 6 AM to 8 PM.", 16);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.chars().count() <= 16, "line too long: {line:?}");
        }
        assert_eq!(lines.join(" "), "The swimming pool is open from 6 AM to 8 PM.");
    }

    #[test]
    fn hard_splits_long_word() {
        let text = "a".repeat(30);
        let lines = wrap_text(&text, 10);
        assert_eq!(lines, vec!["a".repeat(10), "a".repeat(10), "a".repeat(10)]);
    }

    #[test]
    fn wraps_multibyte_by_chars() {
        let lines = wrap_text("नमस्ते नमस्ते", 6);
        assert_eq!(lines, vec!["नमस्ते", "नमस्ते"]);
    }

    #[test]
    fn empty_wraps_to_nothing() {
        assert!(wrap_text("   ", 10).is_empty());
    }
}
