//! Pretty-printer that serializes a MiniC syntax tree back into canonical
//! source text.
//!
//! Four-space indentation, braces on the header line, a blank line around
//! function declarations, and only the parentheses that precedence needs.

use crate::ast::{
    ArrayRank, Expr, FunctionDeclaration, Parameter, Program, Stmt, VariableDeclaration,
};
use crate::token::TokenKind;

const INDENT: &str = "    ";

/// Binding strength, loosest first. Mirrors the parser's call chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Assignment,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
    Postfix,
    Primary,
}

impl Precedence {
    const fn of_operator(kind: TokenKind) -> Self {
        match kind {
            TokenKind::OrOr => Self::Or,
            TokenKind::AndAnd => Self::And,
            TokenKind::EqualEqual | TokenKind::BangEqual => Self::Equality,
            TokenKind::Less
            | TokenKind::LessEqual
            | TokenKind::Greater
            | TokenKind::GreaterEqual => Self::Comparison,
            TokenKind::Plus | TokenKind::Minus => Self::Term,
            _ => Self::Factor,
        }
    }

    const fn of(expr: &Expr) -> Self {
        match expr {
            Expr::Assignment { .. } => Self::Assignment,
            Expr::Binary { operator, .. } => Self::of_operator(operator.kind),
            Expr::Unary { .. } => Self::Unary,
            Expr::Call { .. } | Expr::ArrayIndex { .. } | Expr::PropertyAccess { .. } => {
                Self::Postfix
            }
            Expr::Variable(_) | Expr::Literal(_) => Self::Primary,
        }
    }

    const fn next(self) -> Self {
        match self {
            Self::Assignment => Self::Or,
            Self::Or => Self::And,
            Self::And => Self::Equality,
            Self::Equality => Self::Comparison,
            Self::Comparison => Self::Term,
            Self::Term => Self::Factor,
            Self::Factor => Self::Unary,
            Self::Unary => Self::Postfix,
            Self::Postfix | Self::Primary => Self::Primary,
        }
    }
}

/// Format a `Program` into MiniC source.
///
/// Comments are not part of the tree and are therefore not reproduced.
#[must_use]
pub fn format(program: &Program) -> String {
    let mut out = String::new();
    format_statements(&mut out, &program.statements, 0);

    // Trailing newline
    if !out.ends_with('\n') {
        out.push('\n');
    }

    out
}

/// Format a single expression.
#[must_use]
pub fn format_expr(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr, Precedence::Assignment);
    out
}

/// One statement per line, with blank lines around function declarations.
fn format_statements(out: &mut String, statements: &[Stmt], indent: usize) {
    let mut prev_was_function = false;

    for (i, stmt) in statements.iter().enumerate() {
        let is_function = matches!(stmt, Stmt::FunctionDeclaration(_));
        if i > 0 && (is_function || prev_was_function) {
            out.push('\n');
        }

        pad(out, indent);
        write_stmt(out, stmt, indent);
        out.push('\n');
        prev_was_function = is_function;
    }
}

fn pad(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str(INDENT);
    }
}

/// Write a statement starting at the current column. Continuation lines
/// are indented by `indent`. No trailing newline.
fn write_stmt(out: &mut String, stmt: &Stmt, indent: usize) {
    match stmt {
        Stmt::VariableDeclaration(decl) => write_variable(out, decl),
        Stmt::FunctionDeclaration(func) => write_function(out, func, indent),
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            out.push_str("if (");
            write_expr(out, condition, Precedence::Assignment);
            out.push(')');

            let Some(else_branch) = else_branch else {
                write_body(out, then_branch, indent);
                return;
            };

            // an `if` without `else` in the then-branch would capture our
            // `else` on reparse, so it gets braces
            let braced = if has_open_if(then_branch) {
                out.push_str(" {\n");
                pad(out, indent + 1);
                write_stmt(out, then_branch, indent + 1);
                out.push('\n');
                pad(out, indent);
                out.push('}');
                true
            } else {
                write_body(out, then_branch, indent);
                matches!(then_branch.as_ref(), Stmt::Block(_))
            };

            if braced {
                out.push_str(" else");
            } else {
                out.push('\n');
                pad(out, indent);
                out.push_str("else");
            }

            if matches!(else_branch.as_ref(), Stmt::If { .. }) {
                out.push(' ');
                write_stmt(out, else_branch, indent);
            } else {
                write_body(out, else_branch, indent);
            }
        }
        Stmt::While { condition, body } => {
            out.push_str("while (");
            write_expr(out, condition, Precedence::Assignment);
            out.push(')');
            write_body(out, body, indent);
        }
        Stmt::For {
            initializer,
            condition,
            increment,
            body,
        } => {
            out.push_str("for (");
            match initializer {
                Some(init) => write_stmt(out, init, indent),
                None => out.push(';'),
            }
            if let Some(condition) = condition {
                out.push(' ');
                write_expr(out, condition, Precedence::Assignment);
            }
            out.push(';');
            if let Some(increment) = increment {
                out.push(' ');
                write_expr(out, increment, Precedence::Assignment);
            }
            out.push(')');
            write_body(out, body, indent);
        }
        Stmt::Return { value, .. } => {
            out.push_str("return");
            if let Some(value) = value {
                out.push(' ');
                write_expr(out, value, Precedence::Assignment);
            }
            out.push(';');
        }
        Stmt::Print { expression, .. } => {
            out.push_str("print(");
            write_expr(out, expression, Precedence::Assignment);
            out.push_str(");");
        }
        Stmt::Block(statements) => write_block(out, statements, indent),
        Stmt::Expression(expr) => {
            write_expr(out, expr, Precedence::Assignment);
            out.push(';');
        }
    }
}

/// Body of `if`/`while`/`for`: a block stays on the header line, anything
/// else goes on its own indented line.
fn write_body(out: &mut String, body: &Stmt, indent: usize) {
    if let Stmt::Block(statements) = body {
        out.push(' ');
        write_block(out, statements, indent);
    } else {
        out.push('\n');
        pad(out, indent + 1);
        write_stmt(out, body, indent + 1);
    }
}

fn write_block(out: &mut String, statements: &[Stmt], indent: usize) {
    out.push_str("{\n");
    format_statements(out, statements, indent + 1);
    pad(out, indent);
    out.push('}');
}

/// Whether `stmt` ends in an `if` that has no `else`.
fn has_open_if(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::If {
            else_branch: None, ..
        } => true,
        Stmt::If {
            else_branch: Some(else_branch),
            ..
        } => has_open_if(else_branch),
        Stmt::While { body, .. } | Stmt::For { body, .. } => has_open_if(body),
        _ => false,
    }
}

fn write_variable(out: &mut String, decl: &VariableDeclaration) {
    out.push_str(&decl.type_token.text);
    write_rank(out, decl.array.as_ref());
    out.push(' ');
    out.push_str(&decl.name.text);
    if let Some(initializer) = &decl.initializer {
        out.push_str(" = ");
        write_expr(out, initializer, Precedence::Assignment);
    }
    out.push(';');
}

fn write_function(out: &mut String, func: &FunctionDeclaration, indent: usize) {
    out.push_str(&func.return_type.text);
    write_rank(out, func.array.as_ref());
    out.push(' ');
    out.push_str(&func.name.text);
    out.push('(');
    for (i, param) in func.parameters.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_parameter(out, param);
    }
    out.push_str(") ");
    write_block(out, &func.body, indent);
}

fn write_parameter(out: &mut String, param: &Parameter) {
    out.push_str(&param.type_token.text);
    write_rank(out, param.array.as_ref());
    out.push(' ');
    out.push_str(&param.name.text);
}

fn write_rank(out: &mut String, rank: Option<&ArrayRank>) {
    let Some(rank) = rank else {
        return;
    };
    for size in &rank.dimensions {
        out.push('[');
        if let Some(size) = size {
            write_expr(out, size, Precedence::Assignment);
        }
        out.push(']');
    }
}

/// Write `expr`, parenthesized if it binds looser than `min`.
fn write_expr(out: &mut String, expr: &Expr, min: Precedence) {
    let precedence = Precedence::of(expr);
    let grouped = precedence < min;
    if grouped {
        out.push('(');
    }

    match expr {
        Expr::Assignment { target, value, .. } => {
            write_expr(out, target, Precedence::Postfix);
            out.push_str(" = ");
            write_expr(out, value, Precedence::Assignment);
        }
        Expr::Binary {
            left,
            operator,
            right,
        } => {
            write_expr(out, left, precedence);
            out.push(' ');
            out.push_str(&operator.text);
            out.push(' ');
            write_expr(out, right, precedence.next());
        }
        Expr::Unary { operator, operand } => {
            out.push_str(&operator.text);
            write_expr(out, operand, Precedence::Unary);
        }
        Expr::Call {
            callee, arguments, ..
        } => {
            write_expr(out, callee, Precedence::Postfix);
            out.push('(');
            for (i, argument) in arguments.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, argument, Precedence::Assignment);
            }
            out.push(')');
        }
        Expr::ArrayIndex { array, index } => {
            write_expr(out, array, Precedence::Postfix);
            out.push('[');
            write_expr(out, index, Precedence::Assignment);
            out.push(']');
        }
        Expr::PropertyAccess { object, property } => {
            write_expr(out, object, Precedence::Postfix);
            out.push('.');
            out.push_str(&property.text);
        }
        Expr::Variable(token) | Expr::Literal(token) => out.push_str(&token.text),
    }

    if grouped {
        out.push(')');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_declaration() {
        let program = Program::new()
            .statement(VariableDeclaration::new(TokenKind::Int, "x").init(Expr::number(5)));
        assert_eq!(format(&program), "int x = 5;\n");
    }

    #[test]
    fn array_declaration() {
        let program = Program::new().statement(
            VariableDeclaration::new(TokenKind::Float, "grid")
                .array(vec![Some(Expr::number(3)), None]),
        );
        assert_eq!(format(&program), "float[3][] grid;\n");
    }

    #[test]
    fn function_spacing() {
        let program = Program::new()
            .statement(VariableDeclaration::new(TokenKind::Int, "a"))
            .statement(
                FunctionDeclaration::new(TokenKind::Int, "id")
                    .param(Parameter::new(TokenKind::Int, "v"))
                    .statement(Stmt::return_value(Some(Expr::var("v")))),
            )
            .statement(VariableDeclaration::new(TokenKind::Int, "b"));

        let expected = "\
int a;

int id(int v) {
    return v;
}

int b;
";
        assert_eq!(format(&program), expected);
    }

    #[test]
    fn parenthesizes_by_precedence() {
        let sum = Expr::binary(Expr::var("a"), TokenKind::Plus, Expr::var("b"));
        let product = Expr::binary(sum, TokenKind::Star, Expr::var("c"));
        assert_eq!(format_expr(&product), "(a + b) * c");
    }

    #[test]
    fn right_operand_of_same_level_is_grouped() {
        let inner = Expr::binary(Expr::var("b"), TokenKind::Minus, Expr::var("c"));
        let outer = Expr::binary(Expr::var("a"), TokenKind::Minus, inner);
        assert_eq!(format_expr(&outer), "a - (b - c)");

        let left = Expr::binary(Expr::var("a"), TokenKind::Minus, Expr::var("b"));
        let chain = Expr::binary(left, TokenKind::Minus, Expr::var("c"));
        assert_eq!(format_expr(&chain), "a - b - c");
    }

    #[test]
    fn assignment_chain_needs_no_parens() {
        let expr = Expr::assign(
            Expr::var("a"),
            Expr::assign(Expr::var("b"), Expr::number(5)),
        );
        assert_eq!(format_expr(&expr), "a = b = 5");
    }

    #[test]
    fn postfix_on_unary_is_grouped() {
        let negated = Expr::unary(TokenKind::Minus, Expr::var("xs"));
        let index = Expr::index(negated, Expr::number(0));
        assert_eq!(format_expr(&index), "(-xs)[0]");
    }

    #[test]
    fn else_if_chain() {
        let stmt = Stmt::if_else(
            Expr::var("a"),
            Stmt::block(vec![Stmt::print(Expr::number(1))]),
            Some(Stmt::if_else(
                Expr::var("b"),
                Stmt::print(Expr::number(2)),
                Some(Stmt::print(Expr::number(3))),
            )),
        );
        let expected = "\
if (a) {
    print(1);
} else if (b)
    print(2);
else
    print(3);
";
        assert_eq!(format(&Program::new().statement(stmt)), expected);
    }

    #[test]
    fn dangling_else_gets_braces() {
        let stmt = Stmt::if_else(
            Expr::var("a"),
            Stmt::if_else(Expr::var("b"), Stmt::print(Expr::number(1)), None),
            Some(Stmt::print(Expr::number(2))),
        );
        let expected = "\
if (a) {
    if (b)
        print(1);
} else
    print(2);
";
        assert_eq!(format(&Program::new().statement(stmt)), expected);
    }

    #[test]
    fn for_loop_clauses() {
        let full = Stmt::for_loop(
            Some(VariableDeclaration::new(TokenKind::Int, "i").init(Expr::number(0)).into()),
            Some(Expr::binary(Expr::var("i"), TokenKind::Less, Expr::number(3))),
            Some(Expr::assign(
                Expr::var("i"),
                Expr::binary(Expr::var("i"), TokenKind::Plus, Expr::number(1)),
            )),
            Stmt::block(Vec::new()),
        );
        let empty = Stmt::for_loop(None, None, None, Stmt::block(Vec::new()));
        let program = Program::new().statement(full).statement(empty);
        let expected = "\
for (int i = 0; i < 3; i = i + 1) {
}
for (;;) {
}
";
        assert_eq!(format(&program), expected);
    }

    #[test]
    fn empty_program() {
        assert_eq!(format(&Program::new()), "\n");
    }
}
