use log::debug;
use string_interner::Symbol;

use crate::token::{is_keyword, is_operator, Kind, LexemeInterner, Token};

/// Single pass scanner over the source characters.
///
/// Lexing is total: malformed literals and stray characters become
/// `Kind::Error` tokens in the stream instead of aborting the scan.
pub struct Lexer<'i> {
    source: Vec<char>,
    pos: usize,
    line: u32,
    tokens: Vec<Token>,
    interner: &'i mut LexemeInterner,
}

impl<'i> Lexer<'i> {
    pub fn new(source: &str, interner: &'i mut LexemeInterner) -> Self {
        Lexer {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            tokens: Vec::new(),
            interner,
        }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        while let Some(c) = self.current() {
            if c.is_ascii_whitespace() {
                if c == '\n' {
                    self.line += 1;
                }
                self.pos += 1;
            } else if c.is_ascii_alphabetic() || c == '_' {
                let token = self.consume_identifier_or_keyword();
                self.tokens.push(token);
            } else if c.is_ascii_digit()
                || (c == '.' && self.at(self.pos + 1).is_some_and(|n| n.is_ascii_digit()))
            {
                let token = self.consume_number();
                self.tokens.push(token);
            } else if c == '"' {
                let token = self.consume_string_literal();
                self.tokens.push(token);
            } else if c == '\'' {
                let token = self.consume_char_literal();
                self.tokens.push(token);
            } else if c == '/' && matches!(self.at(self.pos + 1), Some('/') | Some('*')) {
                self.consume_comment();
            } else if is_operator(c.encode_utf8(&mut [0u8; 4])) {
                let token = self.consume_operator();
                self.tokens.push(token);
            } else {
                let token = self.create_token(Kind::Error, c.to_string());
                self.tokens.push(token);
                self.pos += 1;
            }
        }
        debug!("lexed {} tokens over {} lines", self.tokens.len(), self.line);
        self.tokens
    }

    fn current(&self) -> Option<char> {
        self.at(self.pos)
    }

    fn at(&self, index: usize) -> Option<char> {
        self.source.get(index).copied()
    }

    fn text(&self, start: usize, end: usize) -> String {
        let end = end.min(self.source.len());
        self.source[start.min(end)..end].iter().collect()
    }

    fn create_token(&mut self, kind: Kind, lexeme: String) -> Token {
        let id = self.interner.get_or_intern(&lexeme).to_usize() as u32 + 1;
        Token::new(kind, lexeme, self.line, id)
    }

    fn consume_identifier_or_keyword(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.current() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '[' || c == ']' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let word = self.text(start, self.pos);
        let kind = if is_keyword(&word) {
            Kind::Keyword
        } else {
            Kind::Identifier
        };
        self.create_token(kind, word)
    }

    /// A `+`/`-` directly before the digits is folded into the literal
    /// when it follows whitespace, `=`, or the start of input.
    fn sign_applies(&self) -> bool {
        if self.pos == 0 {
            return false;
        }
        let sign = self.source[self.pos - 1];
        if sign != '-' && sign != '+' {
            return false;
        }
        let folds = self.pos - 1 == 0
            || self.source[self.pos - 2].is_ascii_whitespace()
            || self.source[self.pos - 2] == '=';
        folds
            && self
                .tokens
                .last()
                .is_some_and(|t| t.kind == Kind::Operator && t.lexeme.len() == 1 && t.lexeme.starts_with(sign))
    }

    fn consume_number(&mut self) -> Token {
        let mut start = self.pos;
        let mut is_float = false;

        if self.sign_applies() {
            self.tokens.pop();
            start = self.pos - 1;
        }

        while let Some(c) = self.current() {
            if c == '.' {
                if is_float {
                    let text = self.text(start, self.pos);
                    return self.create_token(Kind::Error, text);
                }
                is_float = true;
            } else if !c.is_ascii_digit() {
                break;
            }
            self.pos += 1;
        }

        if matches!(self.current(), Some('e') | Some('E')) {
            is_float = true;
            self.pos += 1;
            if matches!(self.current(), Some('+') | Some('-')) {
                self.pos += 1;
            }
            if !self.current().is_some_and(|c| c.is_ascii_digit()) {
                let text = self.text(start, self.pos);
                return self.create_token(Kind::Error, text);
            }
            while self.current().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }

        if matches!(self.current(), Some('f') | Some('F') | Some('d') | Some('D')) {
            is_float = true;
            self.pos += 1;
        }

        let kind = if is_float { Kind::FloatNumber } else { Kind::Number };
        let text = self.text(start, self.pos);
        self.create_token(kind, text)
    }

    fn consume_string_literal(&mut self) -> Token {
        let start = self.pos;
        let start_line = self.line;
        self.pos += 1;
        while let Some(c) = self.current() {
            if c == '"' {
                break;
            }
            if c == '\n' {
                self.line += 1;
            }
            if c == '\\' && self.pos + 1 < self.source.len() {
                self.pos += 2;
            } else {
                self.pos += 1;
            }
        }
        let closed = self.current() == Some('"');
        if closed {
            self.pos += 1;
        }
        let text = self.text(start, self.pos);
        let kind = if closed { Kind::StringLiteral } else { Kind::Error };
        let mut token = self.create_token(kind, text);
        token.line = start_line;
        token
    }

    fn consume_char_literal(&mut self) -> Token {
        let start = self.pos;
        self.pos += 1;
        if self.current() == Some('\\') {
            self.pos += 2;
        } else {
            self.pos += 1;
        }
        if self.current() == Some('\'') {
            self.pos += 1;
            let text = self.text(start, self.pos);
            return self.create_token(Kind::CharLiteral, text);
        }
        self.pos = self.pos.min(self.source.len());
        let text = self.text(start, self.pos);
        self.create_token(Kind::Error, text)
    }

    fn consume_comment(&mut self) {
        if self.at(self.pos + 1) == Some('/') {
            self.pos += 2;
            while self.current().is_some_and(|c| c != '\n') {
                self.pos += 1;
            }
            return;
        }
        self.pos += 2;
        while let Some(c) = self.current() {
            if c == '*' && self.at(self.pos + 1) == Some('/') {
                self.pos += 2;
                return;
            }
            if c == '\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
    }

    fn consume_operator(&mut self) -> Token {
        let start = self.pos;
        while self.pos < self.source.len() && is_operator(&self.text(start, self.pos + 1)) {
            self.pos += 1;
        }
        let text = self.text(start, self.pos);
        self.create_token(Kind::Operator, text)
    }
}

/// Tokenizes `source` with a fresh interner, so ids start over at 1.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut interner = LexemeInterner::new();
    Lexer::new(source, &mut interner).tokenize()
}
