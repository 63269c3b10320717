use std::fmt;

use serde::Serialize;

/// Source location of a token.
///
/// `start` and `end` are byte offsets into the source text (half-open).
/// `line` and `column` are 1-based and point at the first character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    /// Length of the span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Keywords
    If,
    Else,
    While,
    For,
    Return,
    Int,
    Float,
    String,
    Bool,
    True,
    False,
    Null,
    Print,

    /// Name that is not a keyword.
    Identifier,
    /// Integer or decimal literal (`42`, `3.14`).
    Number,
    /// Quoted string, quotes included (`"hi"`, `'c'`).
    StringLiteral,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Assign,
    EqualEqual,
    BangEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    AndAnd,
    OrOr,
    Bang,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,
    Dot,

    /// Line comment (`// ...`), trailing newline included.
    Comment,
    /// Block comment (`/* ... */`).
    MultilineComment,
    /// Unrecognized character, unterminated string, or unterminated
    /// block comment.
    Unknown,
    /// Zero-length marker after the last token.
    EndOfInput,
}

/// Keyword spellings, looked up after an identifier has been scanned.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("for", TokenKind::For),
    ("return", TokenKind::Return),
    ("int", TokenKind::Int),
    ("float", TokenKind::Float),
    ("string", TokenKind::String),
    ("bool", TokenKind::Bool),
    ("true", TokenKind::True),
    ("false", TokenKind::False),
    ("null", TokenKind::Null),
    ("print", TokenKind::Print),
];

/// Operators made of two characters. Tried before the one-character set.
pub const TWO_CHAR_OPERATORS: &[(&str, TokenKind)] = &[
    ("==", TokenKind::EqualEqual),
    ("!=", TokenKind::BangEqual),
    ("<=", TokenKind::LessEqual),
    (">=", TokenKind::GreaterEqual),
    ("&&", TokenKind::AndAnd),
    ("||", TokenKind::OrOr),
];

/// Single-character operators and delimiters.
pub const ONE_CHAR_OPERATORS: &[(char, TokenKind)] = &[
    ('+', TokenKind::Plus),
    ('-', TokenKind::Minus),
    ('*', TokenKind::Star),
    ('/', TokenKind::Slash),
    ('=', TokenKind::Assign),
    ('<', TokenKind::Less),
    ('>', TokenKind::Greater),
    ('!', TokenKind::Bang),
    ('(', TokenKind::LeftParen),
    (')', TokenKind::RightParen),
    ('{', TokenKind::LeftBrace),
    ('}', TokenKind::RightBrace),
    ('[', TokenKind::LeftBracket),
    (']', TokenKind::RightBracket),
    (';', TokenKind::Semicolon),
    (',', TokenKind::Comma),
    ('.', TokenKind::Dot),
];

impl TokenKind {
    /// Look up a keyword by its exact spelling.
    #[must_use]
    pub fn keyword(text: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(word, _)| *word == text)
            .map(|(_, kind)| *kind)
    }

    #[must_use]
    pub const fn is_keyword(self) -> bool {
        matches!(
            self,
            Self::If
                | Self::Else
                | Self::While
                | Self::For
                | Self::Return
                | Self::Int
                | Self::Float
                | Self::String
                | Self::Bool
                | Self::True
                | Self::False
                | Self::Null
                | Self::Print
        )
    }

    /// `int`, `float`, `string` or `bool`.
    #[must_use]
    pub const fn is_type_keyword(self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::String | Self::Bool)
    }

    #[must_use]
    pub const fn is_comment(self) -> bool {
        matches!(self, Self::Comment | Self::MultilineComment)
    }

    /// Keywords the parser resynchronizes on after an error.
    #[must_use]
    pub const fn starts_statement(self) -> bool {
        matches!(
            self,
            Self::For | Self::If | Self::While | Self::Print | Self::Return
        )
    }

    /// Canonical source spelling, if the kind has exactly one.
    #[must_use]
    pub const fn lexeme(self) -> Option<&'static str> {
        let text = match self {
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::For => "for",
            Self::Return => "return",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Bool => "bool",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
            Self::Print => "print",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Assign => "=",
            Self::EqualEqual => "==",
            Self::BangEqual => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::Bang => "!",
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBrace => "{",
            Self::RightBrace => "}",
            Self::LeftBracket => "[",
            Self::RightBracket => "]",
            Self::Semicolon => ";",
            Self::Comma => ",",
            Self::Dot => ".",
            Self::Identifier
            | Self::Number
            | Self::StringLiteral
            | Self::Comment
            | Self::MultilineComment
            | Self::Unknown
            | Self::EndOfInput => return None,
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.lexeme() {
            return write!(f, "'{text}'");
        }
        match self {
            Self::Identifier => write!(f, "identifier"),
            Self::Number => write!(f, "number"),
            Self::StringLiteral => write!(f, "string literal"),
            Self::Comment | Self::MultilineComment => write!(f, "comment"),
            Self::EndOfInput => write!(f, "end of input"),
            _ => write!(f, "unknown token"),
        }
    }
}

/// A single token with its kind, source text, and location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
