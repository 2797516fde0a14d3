use std::fmt;

use crate::ast::Line;

#[derive(Debug, Clone, PartialEq)]
pub enum ParserErrorKind {
    UnexpectedToken { expected: String, found: String },
    UnexpectedEof { expected: String },
    /// An `Error` token produced by the lexer reached the grammar.
    LexicalError { lexeme: String },
    InvalidLiteral { lexeme: String },
    Unsupported { construct: String },
    MalformedDump { message: String },
    Io { message: String },
}

pub type ParserResult<T> = Result<T, ParserError>;

#[derive(Debug, Clone, PartialEq)]
pub struct ParserError {
    pub kind: ParserErrorKind,
    pub line: Line,
}

impl ParserError {
    pub fn unexpected_token(line: Line, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self {
            kind: ParserErrorKind::UnexpectedToken {
                expected: expected.into(),
                found: found.into(),
            },
            line,
        }
    }

    pub fn unexpected_eof(line: Line, expected: impl Into<String>) -> Self {
        Self {
            kind: ParserErrorKind::UnexpectedEof { expected: expected.into() },
            line,
        }
    }

    pub fn lexical_error(line: Line, lexeme: impl Into<String>) -> Self {
        Self {
            kind: ParserErrorKind::LexicalError { lexeme: lexeme.into() },
            line,
        }
    }

    pub fn invalid_literal(line: Line, lexeme: impl Into<String>) -> Self {
        Self {
            kind: ParserErrorKind::InvalidLiteral { lexeme: lexeme.into() },
            line,
        }
    }

    pub fn unsupported(line: Line, construct: impl Into<String>) -> Self {
        Self {
            kind: ParserErrorKind::Unsupported { construct: construct.into() },
            line,
        }
    }

    pub fn malformed_dump(line: Line, message: impl Into<String>) -> Self {
        Self {
            kind: ParserErrorKind::MalformedDump { message: message.into() },
            line,
        }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self {
            kind: ParserErrorKind::Io { message: message.into() },
            line: 0,
        }
    }

    pub fn message(&self) -> String {
        match &self.kind {
            ParserErrorKind::UnexpectedToken { expected, found } => {
                format!("Expected {}, found '{}'", expected, found)
            }
            ParserErrorKind::UnexpectedEof { expected } => {
                format!("Expected {}, found end of input", expected)
            }
            ParserErrorKind::LexicalError { lexeme } => format!("Invalid token '{}'", lexeme),
            ParserErrorKind::InvalidLiteral { lexeme } => format!("Invalid literal '{}'", lexeme),
            ParserErrorKind::Unsupported { construct } => format!("{} are not supported", construct),
            ParserErrorKind::MalformedDump { message } => format!("Malformed token dump: {}", message),
            ParserErrorKind::Io { message } => message.clone(),
        }
    }
}

/// `<message> at line <n>`
impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}", self.message(), self.line)
    }
}

impl std::error::Error for ParserError {}
