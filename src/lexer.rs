use log::trace;

use crate::token::{ONE_CHAR_OPERATORS, Span, TWO_CHAR_OPERATORS, Token, TokenKind};

/// Tokenize MiniC source text into a sequence of tokens.
///
/// Never fails: characters that cannot start a token, unterminated
/// strings, and unterminated block comments come out as
/// [`TokenKind::Unknown`]. The last token is always
/// [`TokenKind::EndOfInput`] with an empty span at the end of `input`.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        let start = if input.starts_with('\u{FEFF}') {
            '\u{FEFF}'.len_utf8()
        } else {
            0
        };
        Self {
            input,
            pos: start,
            line: 1,
            col: 1,
        }
    }

    fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            let Some(ch) = self.peek() else {
                break;
            };

            let start = self.mark();
            let kind = match ch {
                '/' if self.peek_next() == Some('/') => self.read_line_comment(),
                '/' if self.peek_next() == Some('*') => self.read_block_comment(),
                '"' | '\'' => self.read_string(ch),
                c if c.is_ascii_digit() => self.read_number(),
                c if c.is_alphabetic() || c == '_' => self.read_identifier(start.start),
                _ => self.read_operator(),
            };
            tokens.push(self.finish(kind, start));
        }

        let end = self.mark();
        tokens.push(Token {
            kind: TokenKind::EndOfInput,
            text: String::new(),
            span: end,
        });

        trace!("tokenized {} bytes into {} tokens", self.input.len(), tokens.len());
        tokens
    }

    /// Zero-length span at the current position.
    const fn mark(&self) -> Span {
        Span {
            start: self.pos,
            end: self.pos,
            line: self.line,
            column: self.col,
        }
    }

    fn finish(&self, kind: TokenKind, start: Span) -> Token {
        Token {
            kind,
            text: self.input[start.start..self.pos].to_string(),
            span: Span {
                end: self.pos,
                ..start
            },
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn read_line_comment(&mut self) -> TokenKind {
        // the newline belongs to the comment
        while let Some(ch) = self.advance() {
            if ch == '\n' {
                break;
            }
        }
        TokenKind::Comment
    }

    fn read_block_comment(&mut self) -> TokenKind {
        self.advance(); // skip /
        self.advance(); // skip *

        loop {
            if self.rest().starts_with("*/") {
                self.advance();
                self.advance();
                return TokenKind::MultilineComment;
            }
            if self.advance().is_none() {
                return TokenKind::Unknown;
            }
        }
    }

    fn read_string(&mut self, quote: char) -> TokenKind {
        self.advance(); // skip opening quote

        loop {
            match self.peek() {
                None | Some('\n') => return TokenKind::Unknown,
                Some('\\') => {
                    self.advance();
                    // escaped character is taken verbatim, even a quote
                    if self.advance().is_none() {
                        return TokenKind::Unknown;
                    }
                }
                Some(c) if c == quote => {
                    self.advance();
                    return TokenKind::StringLiteral;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn read_number(&mut self) -> TokenKind {
        let mut seen_dot = false;

        loop {
            match self.peek() {
                Some(c) if c.is_ascii_digit() => {
                    self.advance();
                }
                Some('.')
                    if !seen_dot && self.peek_next().is_some_and(|c| c.is_ascii_digit()) =>
                {
                    seen_dot = true;
                    self.advance();
                }
                _ => break,
            }
        }

        TokenKind::Number
    }

    fn read_identifier(&mut self, start: usize) -> TokenKind {
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.advance();
        }

        TokenKind::keyword(&self.input[start..self.pos]).unwrap_or(TokenKind::Identifier)
    }

    fn read_operator(&mut self) -> TokenKind {
        let rest = self.rest();
        if let Some((_, kind)) = TWO_CHAR_OPERATORS
            .iter()
            .find(|(text, _)| rest.starts_with(*text))
        {
            self.advance();
            self.advance();
            return *kind;
        }

        let Some(ch) = self.advance() else {
            return TokenKind::Unknown;
        };
        ONE_CHAR_OPERATORS
            .iter()
            .find(|(op, _)| *op == ch)
            .map_or(TokenKind::Unknown, |(_, kind)| *kind)
    }
}
