#![allow(dead_code)]

use minic_syntax::{Program, TokenKind, format, parse, parse_str, tokenize};

/// Parse `input` and assert that formatting reproduces it exactly.
pub fn roundtrip(input: &str) {
    let tokens = tokenize(input);
    let program = parse(&tokens).expect("parse failed");
    let output = format(&program);
    assert_eq!(
        output, input,
        "round-trip mismatch:\n--- expected ---\n{input}\n--- got ---\n{output}"
    );
}

/// Token kinds of `input`, end marker included.
pub fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input).iter().map(|t| t.kind).collect()
}

/// Helper: format an AST, parse it back, and assert the output is stable.
pub fn assert_format_stable(original: &Program) {
    let formatted = format(original);
    let parsed = parse_str(&formatted).unwrap_or_else(|e| {
        panic!(
            "failed to re-parse formatted output: {e}\n\
             --- formatted ---\n{formatted}"
        )
    });

    let reformatted = format(&parsed);
    assert_eq!(
        formatted, reformatted,
        "formatting is not idempotent\n--- first ---\n{formatted}\n--- second ---\n{reformatted}"
    );
    assert_eq!(
        original.statements.len(),
        parsed.statements.len(),
        "statement count mismatch\n--- formatted ---\n{formatted}"
    );
}
