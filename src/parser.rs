use std::fmt;

use log::debug;

use crate::ast::{
    ArrayRank, Expr, FunctionDeclaration, Parameter, Program, Stmt, VariableDeclaration,
};
use crate::token::{Span, Token, TokenKind};

/// Nesting depth at which the parser gives up instead of recursing further.
/// Each level costs a full trip down the precedence chain, so this stays
/// well inside a default 2 MiB thread stack in debug builds.
const MAX_NESTING: usize = 64;

/// Longest run of left-associative operators (`a + b + ...`, `f()()...`).
/// Such runs parse in a loop but produce a tree as deep as the run is long.
const MAX_CHAIN: usize = 256;

/// Classifies a syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// A specific token was required, e.g. `;` after a declaration.
    Expected {
        expected: TokenKind,
        context: &'static str,
    },
    /// A type keyword was required (`int`, `float`, `string`, `bool`).
    ExpectedType { context: &'static str },
    /// No expression can start at this token.
    ExpectedExpression,
    /// Left side of `=` is not a variable, index, or property.
    InvalidAssignmentTarget,
    /// Expressions or statements nested deeper than the parser allows.
    NestingTooDeep,
    /// Too many operators chained at one precedence level.
    ChainTooLong,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected { expected, context } => {
                write!(f, "expected {expected} {context}")
            }
            Self::ExpectedType { context } => {
                write!(f, "expected type name {context}")
            }
            Self::ExpectedExpression => write!(f, "expected expression"),
            Self::InvalidAssignmentTarget => write!(f, "invalid assignment target"),
            Self::NestingTooDeep => {
                write!(f, "nesting exceeds {MAX_NESTING} levels")
            }
            Self::ChainTooLong => {
                write!(f, "more than {MAX_CHAIN} chained operators")
            }
        }
    }
}

/// Error produced during parsing.
///
/// `token` is the offending token, or `None` when the parser ran into
/// the end of input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub token: Option<Token>,
}

impl SyntaxError {
    /// Human-readable message without location.
    #[must_use]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Source span to underline, if the error is not at end of input.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        self.token.as_ref().map(|token| token.span)
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token {
            Some(token) => write!(
                f,
                "{} at line {}, column {} (found '{}')",
                self.kind, token.span.line, token.span.column, token.text
            ),
            None => write!(f, "{} at end of input", self.kind),
        }
    }
}

/// Parse a token stream into a `Program`.
///
/// Comment tokens are ignored. Parsing stops at the first syntax error.
///
/// # Errors
///
/// Returns `SyntaxError` for the first construct that does not fit the
/// grammar, located at the offending token.
pub fn parse(tokens: &[Token]) -> Result<Program, SyntaxError> {
    Parser::new(tokens).parse()
}

type ParseResult<T> = Result<T, SyntaxError>;

struct Parser<'a> {
    tokens: Vec<&'a Token>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens: tokens.iter().filter(|t| !t.kind.is_comment()).collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn parse(mut self) -> ParseResult<Program> {
        debug!("parsing {} tokens", self.tokens.len());

        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.declaration()?);
        }

        Ok(Program { statements })
    }

    // -- declarations --

    fn declaration(&mut self) -> ParseResult<Stmt> {
        let result = self.nested(|parser| {
            if parser.check_type() {
                if parser.looks_like_function() {
                    parser.function_declaration().map(Stmt::FunctionDeclaration)
                } else {
                    parser.variable_declaration().map(Stmt::VariableDeclaration)
                }
            } else {
                parser.statement()
            }
        });

        if let Err(err) = &result {
            debug!("{err}; synchronizing");
            self.synchronize();
        }

        result
    }

    /// Classify `type [..]* IDENT (` as a function header without
    /// moving the cursor.
    fn looks_like_function(&self) -> bool {
        let mut index = self.pos + 1;

        while self.kind_at(index) == Some(TokenKind::LeftBracket) {
            let mut depth = 0usize;
            loop {
                match self.kind_at(index) {
                    Some(TokenKind::LeftBracket) => depth += 1,
                    Some(TokenKind::RightBracket) => {
                        depth -= 1;
                        if depth == 0 {
                            index += 1;
                            break;
                        }
                    }
                    None | Some(TokenKind::EndOfInput) => return false,
                    Some(_) => {}
                }
                index += 1;
            }
        }

        self.kind_at(index) == Some(TokenKind::Identifier)
            && self.kind_at(index + 1) == Some(TokenKind::LeftParen)
    }

    fn function_declaration(&mut self) -> ParseResult<FunctionDeclaration> {
        let return_type = self.consume_type("for function return type")?;
        let array = self.array_rank()?;
        let name = self
            .consume(TokenKind::Identifier, "as function name")?
            .clone();
        self.consume(TokenKind::LeftParen, "after function name")?;

        let mut parameters = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                parameters.push(self.parameter()?);
                if self.matches(&[TokenKind::Comma]).is_none() {
                    break;
                }
            }
        }

        self.consume(TokenKind::RightParen, "after parameters")?;
        self.consume(TokenKind::LeftBrace, "before function body")?;
        let body = self.block()?;

        Ok(FunctionDeclaration {
            return_type,
            array,
            name,
            parameters,
            body,
        })
    }

    fn parameter(&mut self) -> ParseResult<Parameter> {
        let type_token = self.consume_type("for parameter")?;
        let array = self.array_rank()?;
        let name = self
            .consume(TokenKind::Identifier, "as parameter name")?
            .clone();

        Ok(Parameter {
            type_token,
            array,
            name,
        })
    }

    fn variable_declaration(&mut self) -> ParseResult<VariableDeclaration> {
        let type_token = self.consume_type("for variable declaration")?;
        let array = self.array_rank()?;
        let name = self
            .consume(TokenKind::Identifier, "as variable name")?
            .clone();

        let initializer = if self.matches(&[TokenKind::Assign]).is_some() {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenKind::Semicolon, "after variable declaration")?;

        Ok(VariableDeclaration {
            type_token,
            array,
            name,
            initializer,
        })
    }

    /// `( "[" expression? "]" )*` after a base type.
    fn array_rank(&mut self) -> ParseResult<Option<ArrayRank>> {
        if !self.check(TokenKind::LeftBracket) {
            return Ok(None);
        }

        let mut dimensions = Vec::new();
        while self.matches(&[TokenKind::LeftBracket]).is_some() {
            let size = if self.check(TokenKind::RightBracket) {
                None
            } else {
                Some(self.expression()?)
            };
            self.consume(TokenKind::RightBracket, "after array dimension")?;
            dimensions.push(size);
        }

        Ok(Some(ArrayRank { dimensions }))
    }

    // -- statements --

    fn statement(&mut self) -> ParseResult<Stmt> {
        self.nested(Self::statement_inner)
    }

    fn statement_inner(&mut self) -> ParseResult<Stmt> {
        let Some(token) = self.matches(&[
            TokenKind::For,
            TokenKind::If,
            TokenKind::Print,
            TokenKind::Return,
            TokenKind::While,
            TokenKind::LeftBrace,
        ]) else {
            return self.expression_statement();
        };

        match token.kind {
            TokenKind::For => self.for_statement(),
            TokenKind::If => self.if_statement(),
            TokenKind::Print => self.print_statement(token),
            TokenKind::Return => self.return_statement(token),
            TokenKind::While => self.while_statement(),
            _ => Ok(Stmt::Block(self.block()?)),
        }
    }

    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "after 'for'")?;

        let initializer = if self.matches(&[TokenKind::Semicolon]).is_some() {
            None
        } else if self.check_type() {
            Some(Box::new(Stmt::VariableDeclaration(
                self.variable_declaration()?,
            )))
        } else {
            Some(Box::new(self.expression_statement()?))
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::Semicolon, "after loop condition")?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RightParen, "after for clauses")?;

        let body = Box::new(self.statement()?);

        Ok(Stmt::For {
            initializer,
            condition,
            increment,
            body,
        })
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "after 'if'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "after condition")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(&[TokenKind::Else]).is_some() {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn print_statement(&mut self, keyword: &Token) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "after 'print'")?;
        let expression = self.expression()?;
        self.consume(TokenKind::RightParen, "after print argument")?;
        self.consume(TokenKind::Semicolon, "after print statement")?;

        Ok(Stmt::Print {
            keyword: keyword.clone(),
            expression,
        })
    }

    fn return_statement(&mut self, keyword: &Token) -> ParseResult<Stmt> {
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::Semicolon, "after return value")?;

        Ok(Stmt::Return {
            keyword: keyword.clone(),
            value,
        })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "after 'while'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "after condition")?;
        let body = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    /// Statements up to the closing brace. The `{` is already consumed.
    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.declaration()?);
        }
        self.consume(TokenKind::RightBrace, "after block")?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "after expression")?;
        Ok(Stmt::Expression(expr))
    }

    // -- expressions, loosest binding first --

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        self.nested(|parser| {
            let expr = parser.logic_or()?;

            let Some(equals) = parser.matches(&[TokenKind::Assign]) else {
                return Ok(expr);
            };
            let value = parser.assignment()?;

            if !expr.is_assignable() {
                return Err(SyntaxError {
                    kind: SyntaxErrorKind::InvalidAssignmentTarget,
                    token: Some(equals.clone()),
                });
            }

            Ok(Expr::Assignment {
                target: Box::new(expr),
                equals: equals.clone(),
                value: Box::new(value),
            })
        })
    }

    fn logic_or(&mut self) -> ParseResult<Expr> {
        self.binary(&[TokenKind::OrOr], Self::logic_and)
    }

    fn logic_and(&mut self) -> ParseResult<Expr> {
        self.binary(&[TokenKind::AndAnd], Self::equality)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary(
            &[TokenKind::EqualEqual, TokenKind::BangEqual],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.binary(
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.binary(&[TokenKind::Plus, TokenKind::Minus], Self::factor)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.binary(&[TokenKind::Star, TokenKind::Slash], Self::unary)
    }

    /// Left-associative loop shared by every binary precedence level.
    fn binary(
        &mut self,
        operators: &[TokenKind],
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;
        let mut links = 0;

        while let Some(operator) = self.matches(operators) {
            Self::extend_chain(&mut links, operator)?;
            let right = operand(self)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator: operator.clone(),
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        let Some(operator) = self.matches(&[TokenKind::Bang, TokenKind::Minus]) else {
            return self.call();
        };

        let operand = self.nested(Self::unary)?;
        Ok(Expr::Unary {
            operator: operator.clone(),
            operand: Box::new(operand),
        })
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        let mut links = 0;

        while let Some(token) =
            self.matches(&[TokenKind::LeftParen, TokenKind::LeftBracket, TokenKind::Dot])
        {
            Self::extend_chain(&mut links, token)?;
            expr = match token.kind {
                TokenKind::LeftParen => self.finish_call(expr)?,
                TokenKind::LeftBracket => {
                    let index = self.expression()?;
                    self.consume(TokenKind::RightBracket, "after array index")?;
                    Expr::ArrayIndex {
                        array: Box::new(expr),
                        index: Box::new(index),
                    }
                }
                _ => {
                    let property = self
                        .consume(TokenKind::Identifier, "as property name after '.'")?
                        .clone();
                    Expr::PropertyAccess {
                        object: Box::new(expr),
                        property,
                    }
                }
            };
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                arguments.push(self.expression()?);
                if self.matches(&[TokenKind::Comma]).is_none() {
                    break;
                }
            }
        }

        let paren = self
            .consume(TokenKind::RightParen, "after arguments")?
            .clone();

        Ok(Expr::Call {
            callee: Box::new(callee),
            arguments,
            paren,
        })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if let Some(token) = self.matches(&[
            TokenKind::False,
            TokenKind::True,
            TokenKind::Null,
            TokenKind::Number,
            TokenKind::StringLiteral,
        ]) {
            return Ok(Expr::Literal(token.clone()));
        }

        if let Some(token) = self.matches(&[TokenKind::Identifier]) {
            return Ok(Expr::Variable(token.clone()));
        }

        if self.matches(&[TokenKind::LeftParen]).is_some() {
            let expr = self.assignment()?;
            self.consume(TokenKind::RightParen, "after expression")?;
            return Ok(expr);
        }

        Err(self.error(SyntaxErrorKind::ExpectedExpression))
    }

    // -- recovery --

    /// Skip to a likely statement boundary: just past a `;`, or at a
    /// keyword that starts a statement.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().is_some_and(|t| t.is(TokenKind::Semicolon)) {
                return;
            }
            if self.peek().is_some_and(|t| t.kind.starts_statement()) {
                return;
            }
            self.advance();
        }
    }

    // -- cursor --

    /// Count one more operator in a left-deep chain.
    fn extend_chain(links: &mut usize, operator: &Token) -> ParseResult<()> {
        *links += 1;
        if *links > MAX_CHAIN {
            return Err(SyntaxError {
                kind: SyntaxErrorKind::ChainTooLong,
                token: Some(operator.clone()),
            });
        }
        Ok(())
    }

    fn nested<T>(&mut self, rule: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(SyntaxErrorKind::NestingTooDeep));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).copied()
    }

    fn previous(&self) -> Option<&'a Token> {
        self.pos
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index).copied())
    }

    fn kind_at(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    fn is_at_end(&self) -> bool {
        self.peek().is_none_or(|t| t.is(TokenKind::EndOfInput))
    }

    fn advance(&mut self) -> Option<&'a Token> {
        if !self.is_at_end() {
            self.pos += 1;
        }
        self.previous()
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().is_some_and(|t| t.is(kind))
    }

    fn check_type(&self) -> bool {
        !self.is_at_end() && self.peek().is_some_and(|t| t.kind.is_type_keyword())
    }

    /// Consume the current token if it is one of `kinds`.
    fn matches(&mut self, kinds: &[TokenKind]) -> Option<&'a Token> {
        if kinds.iter().any(|kind| self.check(*kind)) {
            self.advance()
        } else {
            None
        }
    }

    fn consume(&mut self, expected: TokenKind, context: &'static str) -> ParseResult<&'a Token> {
        match self.peek() {
            Some(token) if self.check(expected) => {
                self.pos += 1;
                Ok(token)
            }
            _ => Err(self.error(SyntaxErrorKind::Expected { expected, context })),
        }
    }

    fn consume_type(&mut self, context: &'static str) -> ParseResult<Token> {
        match self.peek() {
            Some(token) if self.check_type() => {
                self.pos += 1;
                Ok(token.clone())
            }
            _ => Err(self.error(SyntaxErrorKind::ExpectedType { context })),
        }
    }

    /// Error at the current token, or at end of input.
    fn error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        let token = self
            .peek()
            .filter(|t| !t.is(TokenKind::EndOfInput))
            .cloned();
        SyntaxError { kind, token }
    }
}
