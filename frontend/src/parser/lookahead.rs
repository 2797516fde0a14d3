use crate::token::Token;
use std::collections::VecDeque;

/// Sliding window of lexed tokens supporting arbitrary lookahead.
///
/// Consumed tokens are dropped from the front once the window grows past
/// `max_size`, keeping at least `min_size` tokens around.
pub struct LookaheadBuffer {
    buffer: VecDeque<Token>,
    /// Index of the next token to consume
    position: usize,
    max_size: usize,
    min_size: usize,
    consumed_count: usize,
}

impl LookaheadBuffer {
    pub fn new() -> Self {
        Self::with_capacity(64, 32)
    }

    pub fn with_capacity(max_size: usize, min_size: usize) -> Self {
        LookaheadBuffer {
            buffer: VecDeque::with_capacity(max_size),
            position: 0,
            max_size,
            min_size,
            consumed_count: 0,
        }
    }

    pub fn peek(&self) -> Option<&Token> {
        self.buffer.get(self.position)
    }

    pub fn peek_at(&self, relative_pos: usize) -> Option<&Token> {
        self.buffer.get(self.position + relative_pos)
    }

    /// Consumes the current token, returning a copy of it.
    pub fn advance(&mut self) -> Option<Token> {
        let token = self.buffer.get(self.position).cloned()?;
        self.position += 1;
        self.consumed_count += 1;
        if self.should_cleanup() {
            self.cleanup();
        }
        Some(token)
    }

    pub fn push(&mut self, token: Token) {
        self.buffer.push_back(token);
    }

    /// Inserts `token` so that it is the next one consumed. Used to split
    /// `>>` while closing nested generic argument lists.
    pub fn insert_at_current(&mut self, token: Token) {
        self.buffer.insert(self.position, token);
    }

    pub fn available_tokens(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    pub fn has_at_least(&self, count: usize) -> bool {
        self.available_tokens() >= count
    }

    pub fn is_empty(&self) -> bool {
        self.available_tokens() == 0
    }

    fn should_cleanup(&self) -> bool {
        self.buffer.len() > self.max_size && self.position > self.max_size / 2
    }

    fn cleanup(&mut self) {
        let removable = if self.buffer.len() > self.min_size {
            self.position.min(self.buffer.len() - self.min_size)
        } else {
            0
        };
        self.buffer.drain(..removable);
        self.position -= removable;
    }

    /// Tokens handed to the parser so far.
    pub fn consumed(&self) -> usize {
        self.consumed_count
    }
}

impl Default for LookaheadBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Kind;

    fn op(lexeme: &str) -> Token {
        Token::new(Kind::Operator, lexeme, 1, 0)
    }

    fn number(value: usize) -> Token {
        Token::new(Kind::Number, value.to_string(), 1, 0)
    }

    #[test]
    fn peek_and_advance() {
        let mut buffer = LookaheadBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.peek(), None);

        buffer.push(number(42));
        buffer.push(op("+"));
        buffer.push(number(24));

        assert_eq!(buffer.peek().map(|t| t.lexeme.as_str()), Some("42"));
        assert_eq!(buffer.peek_at(2).map(|t| t.lexeme.as_str()), Some("24"));
        assert_eq!(buffer.available_tokens(), 3);

        assert_eq!(buffer.advance().map(|t| t.lexeme), Some("42".to_string()));
        assert_eq!(buffer.peek().map(|t| t.lexeme.as_str()), Some("+"));
        assert_eq!(buffer.available_tokens(), 2);
    }

    #[test]
    fn advance_past_end_is_none() {
        let mut buffer = LookaheadBuffer::new();
        buffer.push(number(1));
        assert!(buffer.advance().is_some());
        assert!(buffer.advance().is_none());
        assert_eq!(buffer.consumed(), 1);
    }

    #[test]
    fn cleanup_keeps_unconsumed_tokens() {
        let mut buffer = LookaheadBuffer::with_capacity(4, 2);
        for i in 0..6 {
            buffer.push(number(i));
        }
        for _ in 0..3 {
            buffer.advance();
        }
        assert_eq!(buffer.available_tokens(), 3);
        assert_eq!(buffer.peek().map(|t| t.lexeme.as_str()), Some("3"));
        assert_eq!(buffer.consumed(), 3);
    }

    #[test]
    fn insert_at_current_becomes_next() {
        let mut buffer = LookaheadBuffer::new();
        buffer.push(op(">>"));
        buffer.push(op(";"));
        buffer.advance();
        buffer.insert_at_current(op(">"));
        assert_eq!(buffer.peek().map(|t| t.lexeme.as_str()), Some(">"));
        assert_eq!(buffer.peek_at(1).map(|t| t.lexeme.as_str()), Some(";"));
    }
}
