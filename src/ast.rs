//! Syntax tree produced by the parser.
//!
//! Every node owns its children. Nodes keep the tokens they were built
//! from so callers can map any part of the tree back to a source span.

use crate::token::{Span, Token};

/// Complete MiniC source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// Statement or declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `int x = 1;`, `float[] xs;`
    VariableDeclaration(VariableDeclaration),
    /// `int add(int a, int b) { ... }`
    FunctionDeclaration(FunctionDeclaration),
    /// `if (cond) stmt [else stmt]`
    If {
        condition: Expr,
        then_branch: Box<Self>,
        else_branch: Option<Box<Self>>,
    },
    /// `while (cond) stmt`
    While { condition: Expr, body: Box<Self> },
    /// `for (init; cond; incr) stmt`, every clause optional.
    For {
        initializer: Option<Box<Self>>,
        condition: Option<Expr>,
        increment: Option<Expr>,
        body: Box<Self>,
    },
    /// `return [expr];`
    Return { keyword: Token, value: Option<Expr> },
    /// `print(expr);`
    Print { keyword: Token, expression: Expr },
    /// `{ ... }`
    Block(Vec<Self>),
    /// Expression followed by `;`.
    Expression(Expr),
}

/// Variable declaration with optional array rank and initializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDeclaration {
    pub type_token: Token,
    pub array: Option<ArrayRank>,
    pub name: Token,
    pub initializer: Option<Expr>,
}

/// Function declaration. The body is the statement list of its block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDeclaration {
    pub return_type: Token,
    pub array: Option<ArrayRank>,
    pub name: Token,
    pub parameters: Vec<Parameter>,
    pub body: Vec<Stmt>,
}

/// Function parameter: `int a`, `string[] names`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub type_token: Token,
    pub array: Option<ArrayRank>,
    pub name: Token,
}

/// Bracket groups after a base type, one entry per `[ ]` pair.
///
/// Sizes are kept as written and never validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrayRank {
    pub dimensions: Vec<Option<Expr>>,
}

impl ArrayRank {
    /// Number of `[ ]` pairs.
    #[must_use]
    pub const fn rank(&self) -> usize {
        self.dimensions.len()
    }
}

/// Expression node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `target = value`. The target is a variable, index, or property.
    Assignment {
        target: Box<Self>,
        equals: Token,
        value: Box<Self>,
    },
    /// Infix operator application.
    Binary {
        left: Box<Self>,
        operator: Token,
        right: Box<Self>,
    },
    /// `!x`, `-x`
    Unary { operator: Token, operand: Box<Self> },
    /// `callee(arguments)`. `paren` is the closing `)`.
    Call {
        callee: Box<Self>,
        arguments: Vec<Self>,
        paren: Token,
    },
    /// `array[index]`
    ArrayIndex { array: Box<Self>, index: Box<Self> },
    /// `object.property`
    PropertyAccess { object: Box<Self>, property: Token },
    /// Reference to a named variable.
    Variable(Token),
    /// Number, string, `true`, `false`, or `null`.
    Literal(Token),
}

impl Expr {
    /// Token that best locates this expression in the source.
    ///
    /// Operators for operator nodes, the name for variables and
    /// properties, the closing paren for calls.
    #[must_use]
    pub fn token(&self) -> &Token {
        match self {
            Self::Assignment { equals, .. } => equals,
            Self::Binary { operator, .. } | Self::Unary { operator, .. } => operator,
            Self::Call { paren, .. } => paren,
            Self::ArrayIndex { array, .. } => array.token(),
            Self::PropertyAccess { property, .. } => property,
            Self::Variable(token) | Self::Literal(token) => token,
        }
    }

    #[must_use]
    pub fn span(&self) -> Span {
        self.token().span
    }

    /// Whether the expression may appear on the left of `=`.
    #[must_use]
    pub const fn is_assignable(&self) -> bool {
        matches!(
            self,
            Self::Variable(_) | Self::ArrayIndex { .. } | Self::PropertyAccess { .. }
        )
    }
}

impl VariableDeclaration {
    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.array.is_some()
    }
}

impl FunctionDeclaration {
    #[must_use]
    pub const fn returns_array(&self) -> bool {
        self.array.is_some()
    }
}

impl Parameter {
    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.array.is_some()
    }
}
