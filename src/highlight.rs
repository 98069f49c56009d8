//! Optional `<<< >>>`-marker highlighting of matched patterns within a
//! record's text, built from the same pattern-extraction utility the
//! evaluator exposes (§4.1.4).
//!
//! Kept for API completeness, though it isn't wired into the default CLI
//! output format, which emits raw record content.

use regex::Regex;

const START_MARKER: &str = "<<<";
const END_MARKER: &str = ">>>";

/// Wraps every occurrence of each pattern in `text` with `<<<`/`>>>`
/// markers, applying patterns in order. Empty patterns are skipped; a
/// pattern that fails to compile as a regex (`use_regex: true`) leaves the
/// text unchanged for that pattern rather than erroring.
#[must_use]
pub fn highlight(text: &str, patterns: &[&str], ignore_case: bool, use_regex: bool) -> String {
    if text.is_empty() || patterns.is_empty() {
        return text.to_string();
    }

    let mut result = text.to_string();
    for pattern in patterns {
        if pattern.is_empty() {
            continue;
        }
        let source = if use_regex {
            (*pattern).to_string()
        } else {
            regex::escape(pattern)
        };
        let compiled = if ignore_case {
            Regex::new(&format!("(?i){source}"))
        } else {
            Regex::new(&source)
        };
        if let Ok(regex) = compiled {
            result = regex
                .replace_all(&result, |caps: &regex::Captures<'_>| {
                    format!("{START_MARKER}{}{END_MARKER}", &caps[0])
                })
                .into_owned();
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlights_substring_matches() {
        let out = highlight("Error: Connection failed", &["Error", "failed"], false, false);
        assert_eq!(out, "<<<Error>>>: Connection <<<failed>>>");
    }

    #[test]
    fn ignore_case_highlights_regardless_of_pattern_case() {
        let out = highlight("ERROR occurred", &["error"], true, false);
        assert_eq!(out, "<<<ERROR>>> occurred");
    }

    #[test]
    fn empty_patterns_leave_text_untouched() {
        assert_eq!(highlight("hello", &[], false, false), "hello");
    }

    #[test]
    fn invalid_regex_pattern_is_skipped_not_fatal() {
        let out = highlight("a ( b", &["("], false, true);
        assert_eq!(out, "a ( b");
    }
}
