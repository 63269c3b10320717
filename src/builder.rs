//! Programmatic construction of syntax trees.
//!
//! Tokens created here are synthetic: their text is the canonical
//! spelling and their span is empty.

use crate::ast::{
    ArrayRank, Expr, FunctionDeclaration, Parameter, Program, Stmt, VariableDeclaration,
};
use crate::token::{Span, Token, TokenKind};

impl Token {
    /// Token that does not come from any source text.
    #[must_use]
    pub fn synthetic(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            span: Span::default(),
        }
    }

    /// Synthetic token spelled with the kind's fixed lexeme.
    #[must_use]
    pub fn fixed(kind: TokenKind) -> Self {
        Self::synthetic(kind, kind.lexeme().unwrap_or_default())
    }
}

impl Program {
    /// Create an empty program.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            statements: Vec::new(),
        }
    }

    /// Append a top-level statement.
    #[must_use]
    pub fn statement(mut self, stmt: impl Into<Stmt>) -> Self {
        self.statements.push(stmt.into());
        self
    }
}

impl Expr {
    /// Numeric literal.
    ///
    /// MiniC has no negative or non-finite literals, so a negative value
    /// becomes a unary minus and NaN or infinity a division by zero. The
    /// result always formats to source that parses back to the same shape.
    #[must_use]
    pub fn number(value: impl Into<f64>) -> Self {
        let value = value.into();
        if value.is_nan() {
            return Self::binary(Self::number(0), TokenKind::Slash, Self::number(0));
        }
        if value.is_sign_negative() {
            return Self::unary(TokenKind::Minus, Self::number(-value));
        }
        if value.is_infinite() {
            return Self::binary(Self::number(1), TokenKind::Slash, Self::number(0));
        }
        Self::Literal(Token::synthetic(TokenKind::Number, value.to_string()))
    }

    /// Double-quoted string literal. Quotes and backslashes are escaped.
    #[must_use]
    pub fn string(value: &str) -> Self {
        let mut text = String::with_capacity(value.len() + 2);
        text.push('"');
        for ch in value.chars() {
            match ch {
                '"' => text.push_str("\\\""),
                '\\' => text.push_str("\\\\"),
                '\n' => text.push_str("\\n"),
                _ => text.push(ch),
            }
        }
        text.push('"');
        Self::Literal(Token::synthetic(TokenKind::StringLiteral, text))
    }

    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::Literal(Token::fixed(if value {
            TokenKind::True
        } else {
            TokenKind::False
        }))
    }

    #[must_use]
    pub fn null() -> Self {
        Self::Literal(Token::fixed(TokenKind::Null))
    }

    /// Reference to a variable.
    #[must_use]
    pub fn var(name: &str) -> Self {
        Self::Variable(Token::synthetic(TokenKind::Identifier, name))
    }

    /// Binary operation. `operator` must be an operator kind.
    #[must_use]
    pub fn binary(left: Self, operator: TokenKind, right: Self) -> Self {
        Self::Binary {
            left: Box::new(left),
            operator: Token::fixed(operator),
            right: Box::new(right),
        }
    }

    /// Prefix `!` or `-`.
    #[must_use]
    pub fn unary(operator: TokenKind, operand: Self) -> Self {
        Self::Unary {
            operator: Token::fixed(operator),
            operand: Box::new(operand),
        }
    }

    #[must_use]
    pub fn assign(target: Self, value: Self) -> Self {
        Self::Assignment {
            target: Box::new(target),
            equals: Token::fixed(TokenKind::Assign),
            value: Box::new(value),
        }
    }

    #[must_use]
    pub fn call(callee: Self, arguments: Vec<Self>) -> Self {
        Self::Call {
            callee: Box::new(callee),
            arguments,
            paren: Token::fixed(TokenKind::RightParen),
        }
    }

    #[must_use]
    pub fn index(array: Self, index: Self) -> Self {
        Self::ArrayIndex {
            array: Box::new(array),
            index: Box::new(index),
        }
    }

    #[must_use]
    pub fn property(object: Self, name: &str) -> Self {
        Self::PropertyAccess {
            object: Box::new(object),
            property: Token::synthetic(TokenKind::Identifier, name),
        }
    }
}

impl Stmt {
    #[must_use]
    pub fn print(expression: Expr) -> Self {
        Self::Print {
            keyword: Token::fixed(TokenKind::Print),
            expression,
        }
    }

    #[must_use]
    pub const fn expression(expr: Expr) -> Self {
        Self::Expression(expr)
    }

    #[must_use]
    pub const fn block(statements: Vec<Self>) -> Self {
        Self::Block(statements)
    }

    #[must_use]
    pub fn return_value(value: Option<Expr>) -> Self {
        Self::Return {
            keyword: Token::fixed(TokenKind::Return),
            value,
        }
    }

    #[must_use]
    pub fn if_else(condition: Expr, then_branch: Self, else_branch: Option<Self>) -> Self {
        Self::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        }
    }

    #[must_use]
    pub fn while_loop(condition: Expr, body: Self) -> Self {
        Self::While {
            condition,
            body: Box::new(body),
        }
    }

    /// `for` loop. The initializer should be a variable declaration or an
    /// expression statement.
    #[must_use]
    pub fn for_loop(
        initializer: Option<Self>,
        condition: Option<Expr>,
        increment: Option<Expr>,
        body: Self,
    ) -> Self {
        Self::For {
            initializer: initializer.map(Box::new),
            condition,
            increment,
            body: Box::new(body),
        }
    }
}

impl From<VariableDeclaration> for Stmt {
    fn from(decl: VariableDeclaration) -> Self {
        Self::VariableDeclaration(decl)
    }
}

impl From<FunctionDeclaration> for Stmt {
    fn from(func: FunctionDeclaration) -> Self {
        Self::FunctionDeclaration(func)
    }
}

impl From<Expr> for Stmt {
    fn from(expr: Expr) -> Self {
        Self::Expression(expr)
    }
}

impl VariableDeclaration {
    /// Declaration of `name` with a type keyword kind (`TokenKind::Int`, ...).
    #[must_use]
    pub fn new(type_kind: TokenKind, name: &str) -> Self {
        Self {
            type_token: Token::fixed(type_kind),
            array: None,
            name: Token::synthetic(TokenKind::Identifier, name),
            initializer: None,
        }
    }

    /// Make this an array with the given dimension sizes.
    #[must_use]
    pub fn array(mut self, dimensions: Vec<Option<Expr>>) -> Self {
        self.array = Some(ArrayRank { dimensions });
        self
    }

    #[must_use]
    pub fn init(mut self, value: Expr) -> Self {
        self.initializer = Some(value);
        self
    }
}

impl Parameter {
    #[must_use]
    pub fn new(type_kind: TokenKind, name: &str) -> Self {
        Self {
            type_token: Token::fixed(type_kind),
            array: None,
            name: Token::synthetic(TokenKind::Identifier, name),
        }
    }

    /// Mark the parameter as an array of the given rank.
    #[must_use]
    pub fn array(mut self, rank: usize) -> Self {
        self.array = Some(ArrayRank {
            dimensions: vec![None; rank.max(1)],
        });
        self
    }
}

impl FunctionDeclaration {
    #[must_use]
    pub fn new(return_kind: TokenKind, name: &str) -> Self {
        Self {
            return_type: Token::fixed(return_kind),
            array: None,
            name: Token::synthetic(TokenKind::Identifier, name),
            parameters: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Return an array of the given rank.
    #[must_use]
    pub fn returns_array_of_rank(mut self, rank: usize) -> Self {
        self.array = Some(ArrayRank {
            dimensions: vec![None; rank.max(1)],
        });
        self
    }

    #[must_use]
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Append a statement to the body.
    #[must_use]
    pub fn statement(mut self, stmt: impl Into<Stmt>) -> Self {
        self.body.push(stmt.into());
        self
    }
}
