//! Per-edit analysis for editors: token highlight classes plus the first
//! syntax error.
//!
//! The editor maps each [`HighlightClass`] to a color of its own theme.

use log::debug;
use serde::Serialize;

use crate::ast::Program;
use crate::lexer::tokenize;
use crate::parser::{SyntaxError, parse};
use crate::token::{Span, Token, TokenKind};

/// Editor-facing group of token kinds sharing one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightClass {
    /// Control-flow keywords and boolean literals.
    Keyword,
    /// `print`.
    Builtin,
    /// `int`, `float`, `string`, `bool`.
    Type,
    Identifier,
    Number,
    String,
    Operator,
    Delimiter,
    Comment,
    /// Unknown characters, unterminated strings and comments.
    Invalid,
}

/// Fixed mapping from token kind to highlight class.
///
/// `null`, `.` and the end-of-input marker have no class and are left
/// uncolored.
#[must_use]
pub const fn highlight_class(kind: TokenKind) -> Option<HighlightClass> {
    let class = match kind {
        TokenKind::If
        | TokenKind::Else
        | TokenKind::While
        | TokenKind::For
        | TokenKind::Return
        | TokenKind::True
        | TokenKind::False => HighlightClass::Keyword,
        TokenKind::Print => HighlightClass::Builtin,
        TokenKind::Int | TokenKind::Float | TokenKind::String | TokenKind::Bool => {
            HighlightClass::Type
        }
        TokenKind::Identifier => HighlightClass::Identifier,
        TokenKind::Number => HighlightClass::Number,
        TokenKind::StringLiteral => HighlightClass::String,
        TokenKind::Plus
        | TokenKind::Minus
        | TokenKind::Star
        | TokenKind::Slash
        | TokenKind::Assign
        | TokenKind::EqualEqual
        | TokenKind::BangEqual
        | TokenKind::Less
        | TokenKind::Greater
        | TokenKind::LessEqual
        | TokenKind::GreaterEqual
        | TokenKind::AndAnd
        | TokenKind::OrOr
        | TokenKind::Bang => HighlightClass::Operator,
        TokenKind::LeftParen
        | TokenKind::RightParen
        | TokenKind::LeftBrace
        | TokenKind::RightBrace
        | TokenKind::LeftBracket
        | TokenKind::RightBracket
        | TokenKind::Semicolon
        | TokenKind::Comma => HighlightClass::Delimiter,
        TokenKind::Comment | TokenKind::MultilineComment => HighlightClass::Comment,
        TokenKind::Unknown => HighlightClass::Invalid,
        TokenKind::Null | TokenKind::Dot | TokenKind::EndOfInput => return None,
    };
    Some(class)
}

/// A span of source text to color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub span: Span,
    pub class: HighlightClass,
}

/// Result of running the whole pipeline over one source snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub tokens: Vec<Token>,
    pub highlights: Vec<Highlight>,
    /// Parsed tree, present when there is no syntax error.
    pub program: Option<Program>,
    pub error: Option<SyntaxError>,
}

impl Analysis {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Span to underline for the syntax error. `None` when there is no
    /// error or the error is at end of input.
    #[must_use]
    pub fn error_span(&self) -> Option<Span> {
        self.error.as_ref().and_then(SyntaxError::span)
    }
}

/// Tokenize and parse `source`, collecting everything an editor needs to
/// redraw after a change.
#[must_use]
pub fn analyze(source: &str) -> Analysis {
    let tokens = tokenize(source);

    let highlights = tokens
        .iter()
        .filter_map(|token| {
            highlight_class(token.kind).map(|class| Highlight {
                span: token.span,
                class,
            })
        })
        .collect();

    let (program, error) = match parse(&tokens) {
        Ok(program) => (Some(program), None),
        Err(err) => {
            debug!("analysis found syntax error: {err}");
            (None, Some(err))
        }
    };

    Analysis {
        tokens,
        highlights,
        program,
        error,
    }
}
