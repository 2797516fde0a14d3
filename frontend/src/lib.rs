pub mod ast;
pub mod lexer;
pub mod parser;
pub mod symbol_table;
pub mod token;
pub mod tree;
pub mod type_checker;
pub mod type_decl;
pub mod visitor;

pub use ast::Program;
pub use lexer::{tokenize, Lexer};
pub use parser::{Parser, ParserError, ParserErrorKind, ParserResult};
pub use token::{Kind, LexemeInterner, Token};
pub use type_checker::{SemanticAnalyzer, SemanticError, SemanticErrorKind};
pub use type_decl::TypeDecl;
