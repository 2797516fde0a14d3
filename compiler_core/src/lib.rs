use std::fmt;
use std::io::BufRead;
use std::path::Path;

use frontend::ast::Program;
use frontend::parser::DumpTokenSource;
use frontend::{Lexer, LexemeInterner, Parser, ParserError, ParserResult, SemanticAnalyzer, SemanticError, Token};
use log::{debug, info};
use string_interner::{DefaultSymbol, Symbol};

/// Knobs shared by the analysis and generation stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Stop semantic analysis at the first error instead of collecting all of them.
    pub fail_fast: bool,
    /// Spaces per indentation level in generated code.
    pub indent_width: usize,
    /// Emit forward declarations for every method except `main`.
    pub emit_prototypes: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            fail_fast: false,
            indent_width: 4,
            emit_prototypes: true,
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn emit_prototypes(mut self, emit: bool) -> Self {
        self.emit_prototypes = emit;
        self
    }
}

/// A code generator the session can hand a checked program to.
pub trait Backend {
    type Error: std::error::Error;

    fn generate(&self, program: &Program, config: &CompilerConfig) -> Result<String, Self::Error>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    Parse(ParserError),
    Semantic(Vec<SemanticError>),
    CodeGen(String),
}

impl CompileError {
    /// One diagnostic per line, in the order they were found.
    pub fn diagnostics(&self) -> Vec<String> {
        match self {
            CompileError::Parse(err) => vec![err.to_string()],
            CompileError::Semantic(errors) => errors.iter().map(ToString::to_string).collect(),
            CompileError::CodeGen(message) => vec![message.clone()],
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Parse(err) => write!(f, "Parse error: {}", err),
            CompileError::Semantic(errors) => {
                write!(f, "Semantic analysis failed with {} error(s)", errors.len())?;
                for err in errors {
                    write!(f, "\n  {}", err)?;
                }
                Ok(())
            }
            CompileError::CodeGen(message) => write!(f, "Code generation error: {}", message),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParserError> for CompileError {
    fn from(err: ParserError) -> Self {
        CompileError::Parse(err)
    }
}

impl From<Vec<SemanticError>> for CompileError {
    fn from(errors: Vec<SemanticError>) -> Self {
        CompileError::Semantic(errors)
    }
}

/// Central context of one translation run.
///
/// Owns the lexeme interner, so token ids stay stable across every source
/// lexed through the same session, and the configuration the later stages
/// read. Each stage can be driven on its own (the CLI does) or all at once
/// through [`translate`](Self::translate).
pub struct CompilerSession {
    interner: LexemeInterner,
    config: CompilerConfig,
}

impl CompilerSession {
    pub fn new() -> Self {
        Self::with_config(CompilerConfig::default())
    }

    pub fn with_config(config: CompilerConfig) -> Self {
        CompilerSession {
            interner: LexemeInterner::new(),
            config,
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn tokenize(&mut self, source: &str) -> Vec<Token> {
        let tokens = Lexer::new(source, &mut self.interner).tokenize();
        debug!("lexed {} token(s), {} distinct lexeme(s)", tokens.len(), self.interner.len());
        tokens
    }

    pub fn parse_program(&mut self, source: &str) -> ParserResult<Program> {
        let tokens = self.tokenize(source);
        Parser::new(tokens).parse_program()
    }

    pub fn parse_file<P: AsRef<Path>>(&mut self, path: P) -> ParserResult<Program> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ParserError::io_error(format!("Failed to read {}: {}", path.display(), e)))?;
        self.parse_program(&content)
    }

    /// Parses a token dump written by [`frontend::token::dump_tokens`].
    pub fn parse_dump<R: BufRead>(&mut self, reader: R) -> ParserResult<Program> {
        Parser::with_source(DumpTokenSource::new(reader)).parse_program()
    }

    pub fn check_program(&self, program: &Program) -> Result<(), Vec<SemanticError>> {
        SemanticAnalyzer::new()
            .fail_fast(self.config.fail_fast)
            .analyze(program)
    }

    /// Lexes, parses, analyzes and generates. Generation only runs on a
    /// program that passed analysis.
    pub fn translate<B: Backend>(&mut self, source: &str, backend: &B) -> Result<String, CompileError> {
        let program = self.parse_program(source)?;
        info!("parsed {} class(es)", program.classes.len());
        self.check_program(&program)?;
        info!("analysis passed, generating code");
        backend
            .generate(&program, &self.config)
            .map_err(|e| CompileError::CodeGen(e.to_string()))
    }

    /// The lexeme a token id was assigned to in this session.
    pub fn lexeme(&self, id: u32) -> Option<&str> {
        let index = (id as usize).checked_sub(1)?;
        let symbol = DefaultSymbol::try_from_usize(index)?;
        self.interner.resolve(symbol)
    }
}

impl Default for CompilerSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const HELLO: &str = "public class Hello {\n\
                         public static void main(String[] args) {\n\
                         int x = 1;\n\
                         System.out.println(x);\n\
                         }\n\
                         }\n";

    /// Renders the class and method names, enough to see the program reached the backend.
    struct OutlineBackend;

    impl Backend for OutlineBackend {
        type Error = fmt::Error;

        fn generate(&self, program: &Program, config: &CompilerConfig) -> Result<String, fmt::Error> {
            let mut out = String::new();
            for class in &program.classes {
                out.push_str(&class.name);
                for method in class.methods() {
                    out.push_str(&" ".repeat(config.indent_width));
                    out.push_str(&method.name);
                }
            }
            Ok(out)
        }
    }

    struct FailingBackend;

    impl Backend for FailingBackend {
        type Error = fmt::Error;

        fn generate(&self, _: &Program, _: &CompilerConfig) -> Result<String, fmt::Error> {
            Err(fmt::Error)
        }
    }

    #[test]
    fn default_config() {
        let config = CompilerConfig::default();
        assert!(!config.fail_fast);
        assert_eq!(config.indent_width, 4);
        assert!(config.emit_prototypes);

        let tuned = CompilerConfig::new().fail_fast(true).indent_width(2).emit_prototypes(false);
        assert!(tuned.fail_fast);
        assert_eq!(tuned.indent_width, 2);
        assert!(!tuned.emit_prototypes);
    }

    #[test]
    fn ids_are_shared_across_sources() {
        let mut session = CompilerSession::new();
        let first = session.tokenize("int x");
        let second = session.tokenize("x int y");
        assert_eq!(first[0].id, second[1].id);
        assert_eq!(first[1].id, second[0].id);
        assert_eq!(second[2].id, 3);
        assert_eq!(session.lexeme(3), Some("y"));
        assert_eq!(session.lexeme(0), None);
        assert_eq!(session.lexeme(99), None);
    }

    #[test]
    fn translate_runs_every_stage() {
        let mut session = CompilerSession::with_config(CompilerConfig::new().indent_width(1));
        let out = session.translate(HELLO, &OutlineBackend).unwrap();
        assert_eq!(out, "Hello main");
    }

    #[rstest]
    #[case("public class A {\nstatic void f() {\nint x = 1\n}\n}\n", "Expected ';', found '}' at line 4")]
    #[case("class A {}", "Expected 'public' class declaration, found end of input at line 1")]
    fn translate_stops_on_parse_errors(#[case] source: &str, #[case] expected: &str) {
        let err = CompilerSession::new().translate(source, &OutlineBackend).unwrap_err();
        assert!(matches!(err, CompileError::Parse(_)));
        assert_eq!(err.diagnostics(), vec![expected.to_string()]);
    }

    #[test]
    fn translate_never_generates_after_failed_analysis() {
        let source = "public class A {\n\
                      static void f() {\n\
                      boolean b = 1;\n\
                      int y = z;\n\
                      }\n\
                      }\n";
        let err = CompilerSession::new().translate(source, &FailingBackend).unwrap_err();
        assert_eq!(
            err.diagnostics(),
            vec![
                "Cannot assign int to variable of type boolean at line 3".to_string(),
                "Undefined variable: z at line 4".to_string(),
            ]
        );

        let mut strict = CompilerSession::with_config(CompilerConfig::new().fail_fast(true));
        match strict.translate(source, &OutlineBackend) {
            Err(CompileError::Semantic(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected a semantic failure, got {:?}", other),
        }
    }

    #[test]
    fn backend_failures_are_reported_as_codegen_errors() {
        let err = CompilerSession::new().translate(HELLO, &FailingBackend).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Code generation error: an error occurred when formatting an argument"
        );
    }

    #[test]
    fn dump_parses_like_source() {
        let mut session = CompilerSession::new();
        let tokens = session.tokenize(HELLO);
        let dump = frontend::token::dump_tokens(&tokens);
        let from_dump = session.parse_dump(dump.as_bytes()).unwrap();
        assert_eq!(from_dump, session.parse_program(HELLO).unwrap());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = CompilerSession::new()
            .parse_file("/definitely/not/here.java")
            .unwrap_err();
        assert!(matches!(err.kind, frontend::ParserErrorKind::Io { .. }));
        assert!(err.message().starts_with("Failed to read /definitely/not/here.java"));
    }
}
