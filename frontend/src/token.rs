use std::fmt;

use string_interner::backend::StringBackend;
use string_interner::{DefaultSymbol, StringInterner};

/// Interner handing out dense, monotonic symbols per distinct lexeme.
/// Token ids are derived from it (`symbol + 1`), so ids start at 1.
pub type LexemeInterner = StringInterner<StringBackend<DefaultSymbol>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Keyword,
    Identifier,
    Number,
    FloatNumber,
    StringLiteral,
    CharLiteral,
    Operator,
    Unknown,
    Error,
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Keyword => "KEYWORD",
            Kind::Identifier => "IDENTIFIER",
            Kind::Number => "NUMBER",
            Kind::FloatNumber => "FLOAT_NUMBER",
            Kind::StringLiteral => "STRING_LITERAL",
            Kind::CharLiteral => "CHAR_LITERAL",
            Kind::Operator => "OPERATOR",
            Kind::Unknown => "UNKNOWN",
            Kind::Error => "ERROR",
        }
    }

    pub fn from_name(name: &str) -> Option<Kind> {
        let kind = match name {
            "KEYWORD" => Kind::Keyword,
            "IDENTIFIER" => Kind::Identifier,
            "NUMBER" => Kind::Number,
            "FLOAT_NUMBER" => Kind::FloatNumber,
            "STRING_LITERAL" => Kind::StringLiteral,
            "CHAR_LITERAL" => Kind::CharLiteral,
            "OPERATOR" => Kind::Operator,
            "UNKNOWN" => Kind::Unknown,
            "ERROR" => Kind::Error,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: Kind,
    pub lexeme: String,
    pub line: u32,
    pub id: u32,
}

impl Token {
    pub fn new(kind: Kind, lexeme: impl Into<String>, line: u32, id: u32) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            line,
            id,
        }
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == Kind::Keyword && self.lexeme == word
    }

    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == Kind::Operator && self.lexeme == op
    }
}

/// Renders one line of the token staging format.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token: {} Lexem: @{}@ Line: {} Id: {}",
            self.kind, self.lexeme, self.line, self.id
        )
    }
}

/// Renders a whole token stream in the staging format, one token per line.
pub fn dump_tokens(tokens: &[Token]) -> String {
    let mut out = String::with_capacity(tokens.len() * 48);
    for token in tokens {
        out.push_str(&token.to_string());
        out.push('\n');
    }
    out
}

pub const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char",
    "class", "const", "continue", "default", "do", "double", "else",
    "enum", "extends", "final", "finally", "float", "for", "goto",
    "if", "implements", "import", "instanceof", "int", "interface",
    "long", "native", "new", "null", "package", "private", "protected",
    "public", "return", "short", "static", "strictfp", "super",
    "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while", "true", "false", "String", "ArrayList",
    "HashMap", "HashSet",
];

pub const OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "%", "++", "--", "==", "!=", ">", "<", ">=", "<=",
    "&&", "||", "!", "=", "+=", "-=", "*=", "/=", "%=", "&", "|", "^", "~",
    "<<", ">>", ">>>", "?", ":", "::", ".", ",", ";", "(", ")", "{", "}", "[",
    "]",
];

/// Also true for a primitive or `String` with glued `[]` pairs (`char[]`,
/// `int[][]`), which the lexer reads as one word.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word) || is_glued_array_type(word)
}

fn is_glued_array_type(word: &str) -> bool {
    let mut base = word;
    while let Some(stripped) = base.strip_suffix("[]") {
        base = stripped;
    }
    base.len() < word.len()
        && matches!(
            base,
            "boolean" | "byte" | "char" | "short" | "int" | "long" | "float" | "double" | "String"
        )
}

pub fn is_operator(op: &str) -> bool {
    OPERATORS.contains(&op)
}

/// Keywords that name a type and may start a declaration.
pub fn is_type_keyword(word: &str) -> bool {
    matches!(
        word,
        "boolean" | "byte" | "char" | "short" | "int" | "long" | "float" | "double"
            | "void" | "String" | "ArrayList" | "HashMap" | "HashSet"
    ) || word.ends_with("[]")
}
