pub mod core;
pub mod decl;
pub mod expr;
pub mod stmt;
pub mod lookahead;
pub mod token_source;

pub mod error;

pub use core::Parser;
pub use error::{ParserError, ParserErrorKind, ParserResult};
pub use token_source::{DumpTokenSource, TokenSource, VecTokenSource};
