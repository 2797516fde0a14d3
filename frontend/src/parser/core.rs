use log::debug;

use super::error::{ParserError, ParserResult};
use super::token_source::{TokenProvider, TokenSource, VecTokenSource};
use crate::ast::{Line, Program};
use crate::lexer::Lexer;
use crate::token::{Kind, LexemeInterner, Token};

/// Recursive-descent parser over any [`TokenSource`].
///
/// The grammar itself lives in the `decl`, `stmt` and `expr` modules as free
/// functions taking the parser; this type only owns the token cursor.
pub struct Parser<'a> {
    token_provider: TokenProvider<Box<dyn TokenSource + 'a>>,
    /// Line of the most recently consumed token.
    previous_line: Line,
}

impl<'a> Parser<'a> {
    pub fn with_source(source: impl TokenSource + 'a) -> Self {
        let source: Box<dyn TokenSource + 'a> = Box::new(source);
        Parser {
            token_provider: TokenProvider::with_buffer_capacity(source, 128, 64),
            previous_line: 1,
        }
    }

    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_source(VecTokenSource::new(tokens))
    }

    /// Lexes `input` with the caller's interner and parses from the result.
    pub fn from_source_text(input: &str, interner: &mut LexemeInterner) -> Self {
        Self::new(Lexer::new(input, interner).tokenize())
    }

    pub fn parse_program(&mut self) -> ParserResult<Program> {
        let program = super::decl::parse_program(self)?;
        debug!(
            "parsed {} class(es) from {} token(s)",
            program.classes.len(),
            self.token_provider.consumed()
        );
        Ok(program)
    }

    pub fn peek(&mut self) -> Option<&Token> {
        self.token_provider.peek()
    }

    pub fn peek_n(&mut self, pos: usize) -> Option<&Token> {
        self.token_provider.peek_at(pos)
    }

    pub fn next(&mut self) -> Option<Token> {
        let token = self.token_provider.advance();
        if let Some(token) = &token {
            self.previous_line = token.line;
        }
        token
    }

    /// Makes `token` the next one consumed.
    pub fn push_front(&mut self, token: Token) {
        self.token_provider.push_front(token);
    }

    pub fn previous_line(&self) -> Line {
        self.previous_line
    }

    /// Line of the current token, or of the last consumed one at end of input.
    pub fn current_line(&mut self) -> Line {
        let fallback = self.previous_line;
        self.peek().map_or(fallback, |t| t.line)
    }

    pub fn line_count(&self) -> u32 {
        self.token_provider.line_count()
    }

    /// Failure reported by the token source, if the stream ended on one.
    pub fn take_source_error(&mut self) -> Option<ParserError> {
        self.token_provider.take_source_error()
    }

    pub fn is_at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    pub fn check_operator(&mut self, op: &str) -> bool {
        self.peek().is_some_and(|t| t.is_operator(op))
    }

    pub fn check_operator_at(&mut self, pos: usize, op: &str) -> bool {
        self.peek_n(pos).is_some_and(|t| t.is_operator(op))
    }

    pub fn check_keyword(&mut self, word: &str) -> bool {
        self.peek().is_some_and(|t| t.is_keyword(word))
    }

    pub fn check_kind_at(&mut self, pos: usize, kind: Kind) -> bool {
        self.peek_n(pos).is_some_and(|t| t.kind == kind)
    }

    /// Consumes the operator `op` if it is next.
    pub fn accept_operator(&mut self, op: &str) -> bool {
        if self.check_operator(op) {
            self.next();
            true
        } else {
            false
        }
    }

    pub fn accept_keyword(&mut self, word: &str) -> bool {
        if self.check_keyword(word) {
            self.next();
            true
        } else {
            false
        }
    }

    pub fn expect_operator(&mut self, op: &str) -> ParserResult<Token> {
        match self.peek() {
            Some(t) if t.is_operator(op) => self.advance_checked(),
            _ => Err(self.error_expected(&format!("'{}'", op))),
        }
    }

    pub fn expect_keyword(&mut self, word: &str) -> ParserResult<Token> {
        match self.peek() {
            Some(t) if t.is_keyword(word) => self.advance_checked(),
            _ => Err(self.error_expected(&format!("'{}'", word))),
        }
    }

    pub fn expect_identifier(&mut self) -> ParserResult<Token> {
        match self.peek() {
            Some(t) if t.kind == Kind::Identifier => self.advance_checked(),
            _ => Err(self.error_expected("identifier")),
        }
    }

    /// Consumes any token, failing at end of input.
    pub fn advance_checked(&mut self) -> ParserResult<Token> {
        match self.next() {
            Some(token) => Ok(token),
            None => Err(self.error_expected("token")),
        }
    }

    /// Error describing what was expected against what is actually next.
    /// Lexer error tokens and token source failures take precedence.
    pub fn error_expected(&mut self, expected: &str) -> ParserError {
        let line = self.previous_line;
        match self.peek().cloned() {
            Some(token) if token.kind == Kind::Error => ParserError::lexical_error(token.line, token.lexeme),
            Some(token) => ParserError::unexpected_token(token.line, expected, token.lexeme),
            None => self
                .token_provider
                .take_source_error()
                .unwrap_or_else(|| ParserError::unexpected_eof(line, expected)),
        }
    }
}
