//! Evaluator for boolean search expressions.
//!
//! `evaluate(ast, text, config)` is pure aside from an optional compiled
//! regex cache keyed by pattern string (see [`PatternTable`]).

use std::collections::HashMap;

use regex::Regex;

use super::ast::AstNode;

/// The four matching-mode flags that govern how a `Word` pattern is matched
/// against a record's text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchConfig {
    pub ignore_case: bool,
    pub use_regex: bool,
    pub word_boundary: bool,
    pub strip_quotes: bool,
}

/// A read-only table of precompiled patterns, built once per run and shared
/// across workers.
///
/// Built by walking the AST and compiling each distinct `Word` pattern as a
/// regex (plain, when `use_regex` is set, or `\b`-escaped, when
/// `word_boundary` is set). A pattern that fails to compile is simply
/// absent from the table: callers treat a missing entry as "never
/// matches" rather than propagating a compile error, so one bad pattern
/// degrades its own term instead of aborting the whole run.
#[derive(Debug, Default)]
pub struct PatternTable {
    compiled: HashMap<String, Regex>,
    /// True unless compilation was attempted for at least one pattern and
    /// every attempt failed.
    any_valid: bool,
}

impl PatternTable {
    /// Walks `ast`, collecting distinct `Word` patterns and compiling each
    /// one under `config`. Returns the table; `PatternTable::is_usable`
    /// reports whether at least one pattern compiled (or none needed to).
    #[must_use]
    pub fn build(ast: &AstNode, config: MatchConfig) -> Self {
        if !config.use_regex && !config.word_boundary {
            // Substring/quote-stripping modes never need precompilation.
            return Self {
                compiled: HashMap::new(),
                any_valid: true,
            };
        }

        let mut compiled = HashMap::new();
        let mut attempted = false;

        for pattern in ast.patterns() {
            if pattern.is_empty() || compiled.contains_key(pattern) {
                continue;
            }
            attempted = true;
            if let Some(regex) = compile_for(pattern, config) {
                compiled.insert(pattern.to_string(), regex);
            }
        }

        let any_valid = !attempted || !compiled.is_empty();
        Self { compiled, any_valid }
    }

    /// False only when every pattern that required compilation failed.
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        self.any_valid
    }

    fn get(&self, pattern: &str) -> Option<&Regex> {
        self.compiled.get(pattern)
    }
}

fn compile_for(pattern: &str, config: MatchConfig) -> Option<Regex> {
    let source = if config.use_regex {
        pattern.to_string()
    } else {
        format!(r"\b{}\b", regex::escape(pattern))
    };
    build_regex(&source, config.ignore_case).ok()
}

fn build_regex(source: &str, ignore_case: bool) -> Result<Regex, regex::Error> {
    if ignore_case {
        Regex::new(&format!("(?i){source}"))
    } else {
        Regex::new(source)
    }
}

/// Evaluates boolean expressions (ASTs) against a record's text.
pub struct Evaluator<'a> {
    config: MatchConfig,
    patterns: Option<&'a PatternTable>,
}

impl<'a> Evaluator<'a> {
    #[must_use]
    pub const fn new(config: MatchConfig, patterns: Option<&'a PatternTable>) -> Self {
        Self { config, patterns }
    }

    /// Evaluates `ast` against `text`.
    ///
    /// `And`/`Or` short-circuit; `Word` matching never panics, since an
    /// uncompilable pattern simply never matches (see [`PatternTable`]).
    #[must_use]
    pub fn evaluate(&self, ast: &AstNode, text: &str) -> bool {
        match ast {
            AstNode::Word(pattern) => self.match_word(pattern, text),
            AstNode::Not(child) => !self.evaluate(child, text),
            AstNode::And(left, right) => self.evaluate(left, text) && self.evaluate(right, text),
            AstNode::Or(left, right) => self.evaluate(left, text) || self.evaluate(right, text),
        }
    }

    fn match_word(&self, pattern: &str, text: &str) -> bool {
        if pattern.is_empty() {
            return false;
        }

        if self.config.use_regex {
            return self.match_with_table_or_compile(pattern, text);
        }

        if self.config.word_boundary {
            if self.config.strip_quotes {
                let stripped_pattern = strip_quote_runs(pattern);
                let stripped_text = strip_quote_runs(text);
                return match self.patterns.and_then(|t| t.get(pattern)) {
                    Some(regex) => regex.is_match(&stripped_text),
                    None => {
                        let source = format!(r"\b{}\b", regex::escape(&stripped_pattern));
                        build_regex(&source, self.config.ignore_case)
                            .is_ok_and(|regex| regex.is_match(&stripped_text))
                    }
                };
            }
            return self.match_with_table_or_compile(pattern, text);
        }

        if self.config.strip_quotes {
            let stripped_pattern = strip_quote_runs(pattern);
            let stripped_text = strip_quote_runs(text);
            return Self::substring_match(&stripped_pattern, &stripped_text, self.config.ignore_case);
        }

        Self::substring_match(pattern, text, self.config.ignore_case)
    }

    fn match_with_table_or_compile(&self, pattern: &str, text: &str) -> bool {
        if let Some(regex) = self.patterns.and_then(|t| t.get(pattern)) {
            return regex.is_match(text);
        }
        match compile_for(pattern, self.config) {
            Some(regex) => regex.is_match(text),
            None => false,
        }
    }

    fn substring_match(pattern: &str, text: &str, ignore_case: bool) -> bool {
        if ignore_case {
            text.to_lowercase().contains(&pattern.to_lowercase())
        } else {
            text.contains(pattern)
        }
    }
}

/// Removes a leading and trailing quote character (`"`, `'`, or `` ` ``)
/// from every maximal quoted run in `s`, leaving unquoted text untouched.
fn strip_quote_runs(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if matches!(ch, '"' | '\'' | '`') {
            if let Some(offset) = chars[i + 1..].iter().position(|&c| c == ch) {
                let close = i + 1 + offset;
                result.extend(&chars[i + 1..close]);
                i = close + 1;
                continue;
            }
        }
        result.push(ch);
        i += 1;
    }

    result
}
