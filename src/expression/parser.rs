//! Recursive-descent parser for boolean search expressions.
//!
//! ```text
//! expression := term   ( OR   term   )*        -- left-assoc
//! term       := unary  ( AND  unary  )*        -- left-assoc
//! unary      := NOT unary | factor
//! factor     := LPAREN expression RPAREN | WORD
//! ```
//!
//! Precedence (low to high): OR, AND, NOT.

use super::ast::AstNode;
use super::token::{Token, TokenKind, tokenize};
use crate::error::{LogsiftError, Result};

/// Tokenizes and parses `expression` into an [`AstNode`].
///
/// # Errors
///
/// Returns [`LogsiftError::Tokenization`] or [`LogsiftError::Parse`].
pub fn parse(expression: &str) -> Result<AstNode> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser::new(&tokens, expression);
    let ast = parser.parse_expression()?;

    if parser.pos < parser.tokens.len() {
        let token = &parser.tokens[parser.pos];
        return Err(LogsiftError::parse(
            format!("Unexpected token '{}'", token.value),
            expression,
            token.position,
        ));
    }

    Ok(ast)
}

struct Parser<'a> {
    tokens: &'a [Token],
    expression: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], expression: &'a str) -> Self {
        Self {
            tokens,
            expression,
            pos: 0,
        }
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn matches(&self, kind: TokenKind) -> bool {
        self.current().is_some_and(|t| t.kind == kind)
    }

    /// Position to report when a token was expected but input ran out.
    fn end_position(&self) -> usize {
        self.expression.len()
    }

    fn consume(&mut self, kind: TokenKind, context: &str) -> Result<&'a Token> {
        if !self.matches(kind) {
            return match self.current() {
                Some(token) => Err(LogsiftError::parse(
                    format!("Expected {context} but got '{}'", token.value),
                    self.expression,
                    token.position,
                )),
                None => Err(LogsiftError::parse(
                    format!("Expected {context} but reached end of expression"),
                    self.expression,
                    self.end_position(),
                )),
            };
        }

        let token = &self.tokens[self.pos];
        self.pos += 1;
        Ok(token)
    }

    fn parse_expression(&mut self) -> Result<AstNode> {
        let mut left = self.parse_term()?;

        while self.matches(TokenKind::Or) {
            self.consume(TokenKind::Or, "'OR'")?;
            let right = self.parse_term()?;
            left = AstNode::Or(Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> Result<AstNode> {
        let mut left = self.parse_unary()?;

        while self.matches(TokenKind::And) {
            self.consume(TokenKind::And, "'AND'")?;
            let right = self.parse_unary()?;
            left = AstNode::And(Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<AstNode> {
        if self.matches(TokenKind::Not) {
            self.consume(TokenKind::Not, "'NOT'")?;
            let operand = self.parse_unary()?;
            return Ok(AstNode::Not(Box::new(operand)));
        }

        self.parse_factor()
    }

    fn parse_factor(&mut self) -> Result<AstNode> {
        if self.matches(TokenKind::LParen) {
            let lparen = self.consume(TokenKind::LParen, "'('")?;
            let lparen_pos = lparen.position;
            let expr = self.parse_expression()?;

            if !self.matches(TokenKind::RParen) {
                return Err(LogsiftError::parse(
                    "Unbalanced parentheses, missing ')'",
                    self.expression,
                    lparen_pos,
                ));
            }

            self.consume(TokenKind::RParen, "')'")?;
            return Ok(expr);
        }

        if self.matches(TokenKind::Word) {
            let token = self.consume(TokenKind::Word, "WORD")?;
            return Ok(AstNode::Word(token.value.clone()));
        }

        match self.current() {
            Some(token) => Err(LogsiftError::parse(
                format!("Expected WORD or '(' but got '{}'", token.value),
                self.expression,
                token.position,
            )),
            None => Err(LogsiftError::parse(
                "Expected WORD or '(' but reached end of expression",
                self.expression,
                self.end_position(),
            )),
        }
    }
}
