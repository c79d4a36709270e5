//! Scanner and recursive descent parser for sluice configuration files.
//!
//! This crate takes source bytes and produces the AST defined in
//! `sluice-ast`. The scanner performs automatic statement-terminator
//! insertion at newlines; the parser is LL(1) with precedence climbing for
//! binary operators and recovers from errors so that every problem in a file
//! is reported in one pass.

pub mod parser;
pub mod scanner;
pub mod token;

pub use parser::{parse_expression, parse_file};
pub use scanner::{quote, unquote, ErrorHandler, Mode, Scanner};
pub use token::Token;
