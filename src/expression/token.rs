//! Tokenizer for boolean search expressions.

use crate::error::{LogsiftError, Result};

/// Kind of lexeme produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    And,
    Or,
    Not,
    LParen,
    RParen,
}

/// A single lexeme, immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    /// UTF-8 byte offset into the original query string.
    pub position: usize,
}

/// Tokenizes `expression` into an ordered sequence of [`Token`]s.
///
/// # Errors
///
/// Returns [`LogsiftError::Tokenization`] for an unterminated quote or an
/// empty (post-trim) expression.
pub fn tokenize(expression: &str) -> Result<Vec<Token>> {
    if expression.trim().is_empty() {
        return Err(LogsiftError::tokenization("Empty expression", expression, 0));
    }

    let chars: Vec<char> = expression.chars().collect();
    let byte_at = byte_offsets(&chars);
    let len = chars.len();
    let mut pos = 0;
    let mut tokens = Vec::new();

    while pos < len {
        let ch = chars[pos];

        if ch.is_whitespace() {
            pos += 1;
            continue;
        }

        if ch == '(' {
            tokens.push(Token {
                kind: TokenKind::LParen,
                value: "(".to_string(),
                position: byte_at[pos],
            });
            pos += 1;
            continue;
        }

        if ch == ')' {
            tokens.push(Token {
                kind: TokenKind::RParen,
                value: ")".to_string(),
                position: byte_at[pos],
            });
            pos += 1;
            continue;
        }

        if let Some((kind, word, new_pos)) = match_keyword(&chars, pos) {
            tokens.push(Token {
                kind,
                value: word,
                position: byte_at[pos],
            });
            pos = new_pos;
            continue;
        }

        if ch == '"' || ch == '\'' {
            let (token, new_pos) = read_quoted_string(&chars, &byte_at, pos, expression)?;
            tokens.push(token);
            pos = new_pos;
            continue;
        }

        let (token, new_pos) = read_word(&chars, &byte_at, pos);
        tokens.push(token);
        pos = new_pos;
    }

    if tokens.is_empty() {
        return Err(LogsiftError::tokenization(
            "No tokens found in expression",
            expression,
            0,
        ));
    }

    Ok(tokens)
}

/// Maps each char index to its UTF-8 byte offset, with a trailing sentinel
/// equal to the total byte length so `cursor == chars.len()` is also valid.
fn byte_offsets(chars: &[char]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(chars.len() + 1);
    let mut offset = 0;
    for ch in chars {
        offsets.push(offset);
        offset += ch.len_utf8();
    }
    offsets.push(offset);
    offsets
}

/// Tries to match `AND`/`OR`/`NOT` as a standalone word at `pos`.
///
/// A keyword only counts when the characters immediately before and after it
/// (if any) are not alphanumeric or `_`, otherwise it's part of a longer
/// word (e.g. `ANDROID`, `NOTICE`).
fn match_keyword(chars: &[char], pos: usize) -> Option<(TokenKind, String, usize)> {
    const KEYWORDS: [(&str, TokenKind); 3] =
        [("AND", TokenKind::And), ("OR", TokenKind::Or), ("NOT", TokenKind::Not)];

    for (keyword, kind) in KEYWORDS {
        let kw_len = keyword.len();
        let end = pos + kw_len;
        if end > chars.len() {
            continue;
        }

        let candidate: String = chars[pos..end].iter().collect();
        if !candidate.eq_ignore_ascii_case(keyword) {
            continue;
        }

        if pos > 0 {
            let prev = chars[pos - 1];
            if prev.is_alphanumeric() || prev == '_' {
                continue;
            }
        }

        if end < chars.len() {
            let next = chars[end];
            if next.is_alphanumeric() || next == '_' {
                continue;
            }
        }

        return Some((kind, keyword.to_string(), end));
    }

    None
}

fn read_quoted_string(
    chars: &[char],
    byte_at: &[usize],
    pos: usize,
    expression: &str,
) -> Result<(Token, usize)> {
    let quote = chars[pos];
    let value_start = pos + 1;
    let mut cursor = value_start;

    while cursor < chars.len() && chars[cursor] != quote {
        cursor += 1;
    }

    if cursor >= chars.len() {
        return Err(LogsiftError::tokenization(
            "Unterminated quoted string",
            expression,
            byte_at[pos],
        ));
    }

    let value: String = chars[value_start..cursor].iter().collect();
    Ok((
        Token {
            kind: TokenKind::Word,
            value,
            position: byte_at[value_start],
        },
        cursor + 1,
    ))
}

fn read_word(chars: &[char], byte_at: &[usize], pos: usize) -> (Token, usize) {
    let start = pos;
    let mut cursor = pos;

    while cursor < chars.len() {
        let ch = chars[cursor];
        if ch.is_whitespace() || ch == '(' || ch == ')' {
            break;
        }
        cursor += 1;
    }

    let value: String = chars[start..cursor].iter().collect();
    (
        Token {
            kind: TokenKind::Word,
            value,
            position: byte_at[start],
        },
        cursor,
    )
}
