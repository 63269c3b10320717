//! Tokenizer, parser, and formatter for MiniC, a small C-like language.
//!
//! The pipeline is text → tokens → syntax tree. Tokenizing never fails:
//! anything unrecognized becomes an `Unknown` token. Parsing stops at the
//! first syntax error and reports the offending token.
//!
//! # Quick start
//!
//! ## Tokenize and parse
//!
//! ```
//! use minic_syntax::{Stmt, TokenKind, parse, tokenize};
//!
//! let tokens = tokenize("int x = 5;");
//! assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::EndOfInput));
//!
//! let program = parse(&tokens).unwrap();
//! assert!(matches!(program.statements[0], Stmt::VariableDeclaration(_)));
//! ```
//!
//! ## Locate a syntax error
//!
//! ```
//! use minic_syntax::parse_str;
//!
//! let err = parse_str("int x = ;").unwrap_err();
//! assert_eq!(err.span().map(|s| s.start), Some(8));
//! assert_eq!(err.message(), "expected expression");
//! ```
//!
//! ## Drive an editor
//!
//! ```
//! use minic_syntax::{HighlightClass, analyze};
//!
//! let analysis = analyze("print(1); /* open");
//! assert_eq!(
//!     analysis.highlights.last().map(|h| h.class),
//!     Some(HighlightClass::Invalid)
//! );
//! assert_eq!(analysis.error_span().map(|s| s.start), Some(10));
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod builder;
pub mod formatter;
pub mod highlight;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{
    ArrayRank, Expr, FunctionDeclaration, Parameter, Program, Stmt, VariableDeclaration,
};
pub use formatter::{format, format_expr};
pub use highlight::{Analysis, Highlight, HighlightClass, analyze, highlight_class};
pub use lexer::tokenize;
pub use parser::{SyntaxError, SyntaxErrorKind, parse};
pub use token::{Span, Token, TokenKind};

/// Tokenize and parse a MiniC source string in one step.
pub fn parse_str(input: &str) -> Result<Program, SyntaxError> {
    parse(&tokenize(input))
}
