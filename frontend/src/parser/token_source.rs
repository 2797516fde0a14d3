use std::io::BufRead;

use super::error::{ParserError, ParserResult};
use super::lookahead::LookaheadBuffer;
use crate::token::{Kind, Token};

/// Trait for token sources that can provide tokens to the parser
pub trait TokenSource {
    /// Get the next token from the source, `None` once exhausted
    fn next_token(&mut self) -> ParserResult<Option<Token>>;

    /// Line of the most recently produced token
    fn line_count(&self) -> u32;
}

impl<T: TokenSource + ?Sized> TokenSource for Box<T> {
    fn next_token(&mut self) -> ParserResult<Option<Token>> {
        (**self).next_token()
    }

    fn line_count(&self) -> u32 {
        (**self).line_count()
    }
}

/// Token provider that combines a TokenSource with a LookaheadBuffer
pub struct TokenProvider<T: TokenSource> {
    source: T,
    buffer: LookaheadBuffer,
    /// First error reported by the source; the stream ends there.
    source_error: Option<ParserError>,
}

impl<T: TokenSource> TokenProvider<T> {
    pub fn new(source: T) -> Self {
        Self::with_buffer_capacity(source, 64, 32)
    }

    pub fn with_buffer_capacity(source: T, max_size: usize, min_size: usize) -> Self {
        TokenProvider {
            source,
            buffer: LookaheadBuffer::with_capacity(max_size, min_size),
            source_error: None,
        }
    }

    /// Peek at the current token without consuming it
    pub fn peek(&mut self) -> Option<&Token> {
        self.ensure_token_available(0);
        self.buffer.peek()
    }

    /// Peek at a token at relative position without consuming
    pub fn peek_at(&mut self, relative_pos: usize) -> Option<&Token> {
        self.ensure_token_available(relative_pos);
        self.buffer.peek_at(relative_pos)
    }

    /// Consume the current token and advance to the next
    pub fn advance(&mut self) -> Option<Token> {
        self.ensure_token_available(0);
        self.buffer.advance()
    }

    /// Push a token back so it is the next one consumed
    pub fn push_front(&mut self, token: Token) {
        self.buffer.insert_at_current(token);
    }

    fn ensure_token_available(&mut self, relative_pos: usize) {
        while self.source_error.is_none() && !self.buffer.has_at_least(relative_pos + 1) {
            match self.source.next_token() {
                Ok(Some(token)) => self.buffer.push(token),
                Ok(None) => break,
                Err(e) => self.source_error = Some(e),
            }
        }
    }

    pub fn take_source_error(&mut self) -> Option<ParserError> {
        self.source_error.take()
    }

    pub fn line_count(&self) -> u32 {
        self.source.line_count()
    }

    pub fn consumed(&self) -> usize {
        self.buffer.consumed()
    }
}

/// Serves an already lexed token vector.
pub struct VecTokenSource {
    tokens: std::vec::IntoIter<Token>,
    line: u32,
}

impl VecTokenSource {
    pub fn new(tokens: Vec<Token>) -> Self {
        VecTokenSource {
            tokens: tokens.into_iter(),
            line: 1,
        }
    }
}

impl TokenSource for VecTokenSource {
    fn next_token(&mut self) -> ParserResult<Option<Token>> {
        let token = self.tokens.next();
        if let Some(token) = &token {
            self.line = token.line;
        }
        Ok(token)
    }

    fn line_count(&self) -> u32 {
        self.line
    }
}

/// Reads tokens back from the line-oriented staging format
/// `Token: <KIND> Lexem: @<lexeme>@ Line: <n> Id: <id>`.
pub struct DumpTokenSource<R: BufRead> {
    reader: R,
    dump_line: u32,
    line: u32,
}

impl<R: BufRead> DumpTokenSource<R> {
    pub fn new(reader: R) -> Self {
        DumpTokenSource {
            reader,
            dump_line: 0,
            line: 1,
        }
    }

    fn read_raw_line(&mut self) -> ParserResult<Option<String>> {
        let mut text = String::new();
        let read = self
            .reader
            .read_line(&mut text)
            .map_err(|e| ParserError::io_error(format!("Failed to read token dump: {}", e)))?;
        if read == 0 {
            return Ok(None);
        }
        self.dump_line += 1;
        if text.ends_with('\n') {
            text.pop();
        }
        Ok(Some(text))
    }

    fn parse_line(&self, start_line: u32, text: &str) -> ParserResult<Token> {
        let malformed = |what: &str| ParserError::malformed_dump(start_line, format!("{} in '{}'", what, text));

        let rest = text.strip_prefix("Token: ").ok_or_else(|| malformed("missing 'Token:' prefix"))?;
        let (kind_name, rest) = rest.split_once(" Lexem: @").ok_or_else(|| malformed("missing lexeme"))?;
        let kind = Kind::from_name(kind_name).ok_or_else(|| malformed("unknown token kind"))?;
        // The lexeme itself may contain '@', so split on the last marker.
        let (lexeme, rest) = rest.rsplit_once("@ Line: ").ok_or_else(|| malformed("missing line"))?;
        let (line, id) = rest.split_once(" Id: ").ok_or_else(|| malformed("missing id"))?;
        let line = line.trim().parse::<u32>().map_err(|_| malformed("bad line number"))?;
        let id = id.trim().parse::<u32>().map_err(|_| malformed("bad id"))?;

        Ok(Token::new(kind, lexeme, line, id))
    }
}

/// A string lexeme carrying a raw newline continues on the next dump line.
fn opens_lexeme(text: &str) -> bool {
    text.strip_prefix("Token: ")
        .and_then(|rest| rest.split_once(" Lexem: @"))
        .is_some_and(|(_, lexeme)| lexeme.starts_with('"') && !lexeme.contains("@ Line: "))
}

impl<R: BufRead> TokenSource for DumpTokenSource<R> {
    fn next_token(&mut self) -> ParserResult<Option<Token>> {
        loop {
            let Some(mut text) = self.read_raw_line()? else {
                return Ok(None);
            };
            let start_line = self.dump_line;
            if text.trim().is_empty() {
                continue;
            }
            while opens_lexeme(&text) {
                let Some(next) = self.read_raw_line()? else {
                    return Err(ParserError::malformed_dump(
                        start_line,
                        format!("unterminated lexeme in '{}'", text),
                    ));
                };
                text.push('\n');
                text.push_str(&next);
            }
            let token = self.parse_line(start_line, text.trim_end_matches('\r'))?;
            self.line = token.line;
            return Ok(Some(token));
        }
    }

    fn line_count(&self) -> u32 {
        self.line
    }
}
