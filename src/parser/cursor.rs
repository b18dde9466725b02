//! Cursor over a token stream with speculative matching.
//!
//! `mark`/`reset` save and restore the position so callers can try a
//! construct and back out without side effects. `consume` is the building
//! block: it never errors, it either advances past a matching token or
//! restores the cursor and reports no match.

use super::lexer::{Token, TokenKind};

/// A saved cursor position, restored with [`TokenCursor::reset`].
#[derive(Debug, Clone, Copy)]
pub struct Mark(usize);

/// Read cursor over a lexed token stream.
pub struct TokenCursor<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn mark(&self) -> Mark {
        Mark(self.pos)
    }

    pub fn reset(&mut self, mark: Mark) {
        self.pos = mark.0;
    }

    /// Number of tokens left, including the Eof terminal.
    pub fn available(&self) -> usize {
        self.tokens.len() - self.pos
    }

    /// The current token, without advancing. The returned reference borrows
    /// the underlying stream, not the cursor.
    pub fn peek(&self) -> Option<&'a Token<'a>> {
        self.tokens.get(self.pos)
    }

    /// Advance past the current token and return it.
    pub fn bump(&mut self) -> Option<&'a Token<'a>> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// Advance past the next token satisfying the filters.
    ///
    /// Whitespace (and, unless `skip_comments` is off, comments) before the
    /// candidate are consumed along the way. On a mismatch the cursor is
    /// restored to where it was and `None` is returned - this never raises.
    pub fn consume(
        &mut self,
        value: Option<&str>,
        kind: Option<TokenKind>,
        skip_whitespace: bool,
        skip_comments: bool,
    ) -> Option<&'a Token<'a>> {
        let mark = self.mark();
        while let Some(token) = self.bump() {
            if skip_whitespace && token.is_whitespace() {
                continue;
            }
            if skip_comments && token.is_comment() {
                continue;
            }
            if let Some(value) = value {
                if token.text != value {
                    self.reset(mark);
                    return None;
                }
            }
            if let Some(kind) = kind {
                if token.kind != kind {
                    self.reset(mark);
                    return None;
                }
            }
            return Some(token);
        }
        self.reset(mark);
        None
    }

    /// Consume the next non-trivia token if it has the given kind.
    pub fn consume_kind(&mut self, kind: TokenKind) -> Option<&'a Token<'a>> {
        self.consume(None, Some(kind), true, true)
    }

    /// Scan forward unconditionally for the first token matching the
    /// filters; restores the cursor if the stream is exhausted first.
    pub fn find(&mut self, value: Option<&str>, kind: Option<TokenKind>) -> Option<&'a Token<'a>> {
        let mark = self.mark();
        while let Some(token) = self.bump() {
            if let Some(value) = value {
                if token.text != value {
                    continue;
                }
            }
            if let Some(kind) = kind {
                if token.kind != kind {
                    continue;
                }
            }
            return Some(token);
        }
        self.reset(mark);
        None
    }
}
