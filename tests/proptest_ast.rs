//! Property-based tests with proptest.
//!
//! Generate random syntax trees through the builder API, format them,
//! parse them back, and verify the round-trip produces a stable
//! (idempotent) output.
//!
//! We check `format(parse(format(ast))) == format(ast)` rather than
//! `ast == parse(format(ast))` because parsed tokens carry real spans
//! while built ones are synthetic.

use minic_syntax::{
    Expr, FunctionDeclaration, Parameter, Program, Stmt, TokenKind, VariableDeclaration, format,
    parse_str, tokenize,
};
use proptest::prelude::*;

// -- Leaf strategies --

/// Identifier that is not a keyword.
fn identifier() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,7}".prop_filter("keywords are not identifiers", |s| {
        TokenKind::keyword(s).is_none()
    })
}

fn type_kind() -> impl Strategy<Value = TokenKind> {
    prop_oneof![
        Just(TokenKind::Int),
        Just(TokenKind::Float),
        Just(TokenKind::String),
        Just(TokenKind::Bool),
    ]
}

fn binary_operator() -> impl Strategy<Value = TokenKind> {
    prop_oneof![
        Just(TokenKind::Plus),
        Just(TokenKind::Minus),
        Just(TokenKind::Star),
        Just(TokenKind::Slash),
        Just(TokenKind::EqualEqual),
        Just(TokenKind::BangEqual),
        Just(TokenKind::Less),
        Just(TokenKind::LessEqual),
        Just(TokenKind::Greater),
        Just(TokenKind::GreaterEqual),
        Just(TokenKind::AndAnd),
        Just(TokenKind::OrOr),
    ]
}

fn literal() -> impl Strategy<Value = Expr> {
    prop_oneof![
        (0u32..1000).prop_map(Expr::number),
        (-1000i32..0).prop_map(Expr::number),
        (-1.0e6f64..1.0e6).prop_map(Expr::number),
        "[a-zA-Z0-9 \"\\\\]{0,8}".prop_map(|s| Expr::string(&s)),
        any::<bool>().prop_map(Expr::boolean),
        Just(Expr::null()),
    ]
}

// -- Expressions --

/// Expression at a given depth (limits recursion)
fn expr(depth: u32) -> BoxedStrategy<Expr> {
    let leaf = prop_oneof![
        2 => literal(),
        3 => identifier().prop_map(|name| Expr::var(&name)),
    ];

    if depth == 0 {
        return leaf.boxed();
    }

    let sub = || expr(depth - 1);
    prop_oneof![
        4 => leaf,
        2 => (sub(), binary_operator(), sub())
            .prop_map(|(left, op, right)| Expr::binary(left, op, right)),
        1 => (prop_oneof![Just(TokenKind::Bang), Just(TokenKind::Minus)], sub())
            .prop_map(|(op, operand)| Expr::unary(op, operand)),
        1 => (assignable(depth - 1), sub())
            .prop_map(|(target, value)| Expr::assign(target, value)),
        1 => (sub(), prop::collection::vec(sub(), 0..=3))
            .prop_map(|(callee, args)| Expr::call(callee, args)),
        1 => (sub(), sub()).prop_map(|(array, index)| Expr::index(array, index)),
        1 => (sub(), identifier()).prop_map(|(object, name)| Expr::property(object, &name)),
    ]
    .boxed()
}

/// Expression valid on the left of `=`.
fn assignable(depth: u32) -> BoxedStrategy<Expr> {
    prop_oneof![
        2 => identifier().prop_map(|name| Expr::var(&name)),
        1 => (expr(depth), expr(depth)).prop_map(|(array, index)| Expr::index(array, index)),
        1 => (expr(depth), identifier()).prop_map(|(object, name)| Expr::property(object, &name)),
    ]
    .boxed()
}

// -- Statements --

fn variable_declaration() -> impl Strategy<Value = VariableDeclaration> {
    (
        type_kind(),
        identifier(),
        prop::option::of(prop::collection::vec(prop::option::of(expr(1)), 1..=2)),
        prop::option::of(expr(2)),
    )
        .prop_map(|(kind, name, dimensions, init)| {
            let mut decl = VariableDeclaration::new(kind, &name);
            if let Some(dimensions) = dimensions {
                decl = decl.array(dimensions);
            }
            if let Some(init) = init {
                decl = decl.init(init);
            }
            decl
        })
}

/// Statement at a given depth. Never a declaration, so it is valid as
/// the body of `if`, `while`, and `for`.
fn stmt(depth: u32) -> BoxedStrategy<Stmt> {
    let leaf = prop_oneof![
        expr(2).prop_map(Stmt::print),
        expr(2).prop_map(Stmt::expression),
        prop::option::of(expr(1)).prop_map(Stmt::return_value),
    ];

    if depth == 0 {
        return leaf.boxed();
    }

    let sub = || stmt(depth - 1);
    let initializer = prop_oneof![
        variable_declaration().prop_map(Stmt::from),
        expr(1).prop_map(Stmt::expression),
    ];

    prop_oneof![
        3 => leaf,
        1 => prop::collection::vec(item(depth - 1), 0..=3).prop_map(Stmt::block),
        2 => (expr(1), sub(), prop::option::of(sub()))
            .prop_map(|(cond, then, other)| Stmt::if_else(cond, then, other)),
        1 => (expr(1), sub()).prop_map(|(cond, body)| Stmt::while_loop(cond, body)),
        1 => (
            prop::option::of(initializer),
            prop::option::of(expr(1)),
            prop::option::of(expr(1)),
            sub(),
        )
            .prop_map(|(init, cond, step, body)| Stmt::for_loop(init, cond, step, body)),
    ]
    .boxed()
}

/// Anything allowed inside a block: declarations or statements.
fn item(depth: u32) -> BoxedStrategy<Stmt> {
    prop_oneof![
        1 => variable_declaration().prop_map(Stmt::from),
        3 => stmt(depth),
    ]
    .boxed()
}

fn parameter() -> impl Strategy<Value = Parameter> {
    (type_kind(), identifier(), 0usize..=2).prop_map(|(kind, name, rank)| {
        let param = Parameter::new(kind, &name);
        if rank > 0 { param.array(rank) } else { param }
    })
}

fn function_declaration() -> impl Strategy<Value = FunctionDeclaration> {
    (
        type_kind(),
        identifier(),
        0usize..=2,
        prop::collection::vec(parameter(), 0..=3),
        prop::collection::vec(item(2), 0..=4),
    )
        .prop_map(|(kind, name, rank, params, body)| {
            let mut func = FunctionDeclaration::new(kind, &name);
            if rank > 0 {
                func = func.returns_array_of_rank(rank);
            }
            for param in params {
                func = func.param(param);
            }
            for stmt in body {
                func = func.statement(stmt);
            }
            func
        })
}

/// Full program
fn program() -> impl Strategy<Value = Program> {
    prop::collection::vec(
        prop_oneof![
            3 => item(2),
            1 => function_declaration().prop_map(Stmt::from),
        ],
        0..=5,
    )
    .prop_map(|statements| Program { statements })
}

// -- Property tests --

proptest! {
    /// Formatting is idempotent: format(parse(format(x))) == format(x).
    /// This is the core round-trip property.
    #[test]
    fn format_idempotent(program in program()) {
        let r1 = format(&program);
        let parsed = parse_str(&r1)
            .map_err(|e| {
                TestCaseError::fail(
                    std::format!("parse error: {e}\n--- output ---\n{r1}"))
            })?;
        let r2 = format(&parsed);
        prop_assert_eq!(r1, r2);
    }

    /// Formatted output never contains unrecognized text.
    #[test]
    fn format_never_produces_unknown_tokens(program in program()) {
        let formatted = format(&program);
        let unknown: Vec<_> = tokenize(&formatted)
            .into_iter()
            .filter(|t| t.is(TokenKind::Unknown))
            .collect();
        prop_assert!(unknown.is_empty(), "unknown tokens {:?} in\n{}", unknown, formatted);
    }

    /// Top-level statement count survives the round-trip.
    #[test]
    fn statement_count_preserved(program in program()) {
        let formatted = format(&program);
        let parsed = parse_str(&formatted).unwrap();
        prop_assert_eq!(program.statements.len(), parsed.statements.len());
    }

    /// Function names and arities survive the round-trip.
    #[test]
    fn function_signatures_preserved(program in program()) {
        let signatures = |p: &Program| -> Vec<(String, usize, bool)> {
            p.statements
                .iter()
                .filter_map(|stmt| match stmt {
                    Stmt::FunctionDeclaration(func) => Some((
                        func.name.text.clone(),
                        func.parameters.len(),
                        func.returns_array(),
                    )),
                    _ => None,
                })
                .collect()
        };
        let parsed = parse_str(&format(&program)).unwrap();
        prop_assert_eq!(signatures(&program), signatures(&parsed));
    }

    /// Formatting a single expression and parsing it back is stable.
    #[test]
    fn expression_format_idempotent(e in expr(3)) {
        let source = std::format!("{};", minic_syntax::format_expr(&e));
        let parsed = parse_str(&source)
            .map_err(|err| TestCaseError::fail(std::format!("parse error: {err}\n{source}")))?;
        let Some(Stmt::Expression(reparsed)) = parsed.statements.first() else {
            return Err(TestCaseError::fail("expected an expression statement"));
        };
        prop_assert_eq!(minic_syntax::format_expr(reparsed), minic_syntax::format_expr(&e));
    }
}
