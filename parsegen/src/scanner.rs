use regex::Regex;
use std::collections::HashSet;

use crate::error::ParseError;
use crate::position::Position;
use crate::tokens::{Token, TokenKind};

/// Longest-match scanner with one token of pushback.
///
/// Whitespace is not skipped; a grammar that allows it must say so with a
/// literal or regex terminal.
#[derive(Debug)]
pub struct Scanner<'a, K: TokenKind> {
    cursor: Position<'a>,
    /// Cursor index before the last call to `next`.
    prev: usize,
    literals: HashSet<String>,
    longest_literal: usize,
    regexes: Vec<(K, Regex)>,
}

impl<'a, K: TokenKind> Scanner<'a, K> {
    /// Creates a scanner over `input`. Regexes are tried in the given order,
    /// the first one wins among matches of equal length.
    pub fn new(input: &'a str, literals: &[&str], regexes: &[(K, &str)]) -> Result<Self, ParseError> {
        let literals: HashSet<String> = literals
            .iter()
            .filter(|lit| !lit.is_empty())
            .map(|lit| lit.to_string())
            .collect();
        let longest_literal = literals.iter().map(String::len).max().unwrap_or(0);

        let regexes = regexes
            .iter()
            .map(|(kind, pattern)| {
                Regex::new(&format!("^(?:{})", pattern))
                    .map(|re| (*kind, re))
                    .map_err(|e| ParseError::InvalidRegex {
                        pattern: pattern.to_string(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Scanner {
            cursor: Position::new(input),
            prev: 0,
            literals,
            longest_literal,
            regexes,
        })
    }

    /// Byte offset of the next unread character.
    pub fn position(&self) -> usize {
        self.cursor.idx()
    }

    /// Reads the next token. At the end of input this keeps returning `END`.
    pub fn next(&mut self) -> Result<Token<'a, K>, ParseError> {
        self.prev = self.cursor.idx();
        let position = self.cursor.idx();
        if self.cursor.at_end() {
            log::trace!("scanned END at {}", position);
            return Ok(Token::new(K::END, "", position));
        }

        let (regex_kind, regex_len) = self.longest_regex();
        let literal_len = self.longest_literal_match();

        let token = if regex_len > literal_len {
            Token::new(regex_kind, self.cursor.advance(regex_len), position)
        } else if literal_len > 0 {
            Token::new(K::TEXT, self.cursor.advance(literal_len), position)
        } else {
            let near: String = self.cursor.rest().chars().take(16).collect();
            return Err(ParseError::UnexpectedToken { position, near });
        };
        log::trace!("scanned {:?} '{}' at {}", token.kind, token.text, position);
        Ok(token)
    }

    /// Pushes back the token returned by the last `next`. Only one level of
    /// pushback is kept.
    pub fn undo(&mut self) {
        self.cursor.reset(self.prev);
    }

    /// Reads the next token, requiring the literal `text`.
    pub fn expect_text(&mut self, text: &str) -> Result<Token<'a, K>, ParseError> {
        let token = self.next()?;
        if token.is_text(text) {
            Ok(token)
        } else {
            Err(ParseError::Mismatch {
                found: token.to_string(),
                expected: text.to_owned(),
            })
        }
    }

    /// Reads the next token, requiring a regex terminal of type `kind`.
    pub fn expect_kind(&mut self, kind: K) -> Result<Token<'a, K>, ParseError> {
        let token = self.next()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(ParseError::UnexpectedKind {
                found: token.to_string(),
                expected: format!("{:?}", kind),
            })
        }
    }

    /// Requires that all input has been consumed.
    pub fn expect_end(&mut self) -> Result<(), ParseError> {
        let token = self.next()?;
        if token.is_end() {
            Ok(())
        } else {
            Err(ParseError::TrailingInput {
                position: token.position,
            })
        }
    }

    fn longest_regex(&self) -> (K, usize) {
        let rest = self.cursor.rest();
        let mut best = (K::END, 0);
        for (kind, re) in &self.regexes {
            if let Some(m) = re.find(rest) {
                if m.end() > best.1 {
                    best = (*kind, m.end());
                }
            }
        }
        best
    }

    fn longest_literal_match(&self) -> usize {
        let rest = self.cursor.rest();
        let bound = self.longest_literal.min(rest.len());
        (1..=bound)
            .rev()
            .find(|&len| rest.is_char_boundary(len) && self.literals.contains(&rest[..len]))
            .unwrap_or(0)
    }
}
