//! Tests for expressions read once and reinterpreted as patterns
//!
//! Array and object literals, parenthesized lists and `async(...)` calls
//! become destructuring targets or arrow parameters only when `=` or `=>`
//! follows them.

use esfront::ast::*;
use esfront::{ErrorKind, ParseOptions, parse};

#[allow(clippy::unwrap_used)]
fn parse_ok(source: &str) -> Program {
    parse(source, &ParseOptions::default()).unwrap()
}

#[allow(clippy::unwrap_used)]
fn error_kind(source: &str) -> ErrorKind {
    parse(source, &ParseOptions::default()).unwrap_err().kind
}

#[allow(clippy::panic)]
fn expression(program: &Program) -> &Expression {
    match program.body.first() {
        Some(Statement::Expression(stmt)) => stmt.expression.unparenthesized(),
        other => panic!("expected an expression statement, got {:?}", other),
    }
}

// ============ REST ELEMENTS ============

#[test]
fn test_array_rest_must_be_last() {
    assert!(parse("[...x] = y", &ParseOptions::default()).is_ok());
    assert_eq!(error_kind("[...x,] = y"), ErrorKind::InvalidDestructuringTarget);
    assert_eq!(error_kind("[...x, z] = y"), ErrorKind::InvalidDestructuringTarget);
}

#[test]
fn test_rest_with_default_rejected() {
    assert_eq!(error_kind("[...x = 1] = y"), ErrorKind::InvalidDestructuringTarget);
    assert_eq!(error_kind("[...[a] = b] = c"), ErrorKind::InvalidDestructuringTarget);
    assert_eq!(error_kind("({...x = 1} = y)"), ErrorKind::InvalidDestructuringTarget);
}

#[test]
fn test_nested_rest_without_default_accepted() {
    assert!(parse("[...[...a]] = b", &ParseOptions::default()).is_ok());
    assert!(parse("[...[a, b]] = c", &ParseOptions::default()).is_ok());
}

#[test]
fn test_object_rest_must_be_last() {
    assert!(parse("({a, ...rest} = obj)", &ParseOptions::default()).is_ok());
    assert_eq!(error_kind("({...x,} = y)"), ErrorKind::InvalidDestructuringTarget);
    assert_eq!(error_kind("({...x, y} = z)"), ErrorKind::InvalidDestructuringTarget);
}

#[test]
fn test_object_rest_target_must_be_simple() {
    assert!(parse("({...a.b} = c)", &ParseOptions::default()).is_ok());
    assert_eq!(error_kind("({...[a]} = c)"), ErrorKind::InvalidDestructuringTarget);
}

#[test]
#[allow(clippy::panic)]
fn test_array_pattern_shape() {
    let program = parse_ok("[a, , b = 1, ...c] = d");
    let Expression::Assignment(assign) = expression(&program) else {
        panic!("expected an assignment");
    };
    let Pattern::Array(array) = &assign.left else {
        panic!("expected an array pattern");
    };
    assert_eq!(array.elements.len(), 4);
    assert!(array.elements[1].is_none());
    assert!(matches!(array.elements[2], Some(Pattern::Assignment(_))));
    assert!(matches!(array.elements[3], Some(Pattern::Rest(_))));
}

// ============ SHORTHAND INITIALIZERS ============

#[test]
fn test_shorthand_initializer_outside_pattern() {
    assert_eq!(error_kind("({a = 1})"), ErrorKind::InvalidDestructuringTarget);
    assert_eq!(error_kind("x = {a = 1}"), ErrorKind::InvalidDestructuringTarget);
    assert_eq!(error_kind("f({a = 1})"), ErrorKind::InvalidDestructuringTarget);
}

#[test]
fn test_shorthand_initializer_inside_pattern() {
    assert!(parse("({a = 1} = b)", &ParseOptions::default()).is_ok());
    assert!(parse("[{a = 1}] = x", &ParseOptions::default()).is_ok());
    assert!(parse("({a: {b = 1}} = x)", &ParseOptions::default()).is_ok());
    assert!(parse("({a = 1}) => a", &ParseOptions::default()).is_ok());
    assert!(parse("async ({a = 1}) => a", &ParseOptions::default()).is_ok());
}

#[test]
fn test_shorthand_initializer_in_default_value_still_reported() {
    assert_eq!(error_kind("(a = {b = 1}) => a"), ErrorKind::InvalidDestructuringTarget);
}

#[test]
fn test_duplicate_proto() {
    assert_eq!(error_kind("({__proto__: a, __proto__: b})"), ErrorKind::UnexpectedToken);
    assert!(parse("({__proto__: a, __proto__: b} = x)", &ParseOptions::default()).is_ok());
    assert!(parse("({__proto__: a, ['__proto__']: b})", &ParseOptions::default()).is_ok());
    assert!(parse("({__proto__: a, __proto__})", &ParseOptions::default()).is_ok());
}

// ============ INVALID TARGETS ============

#[test]
fn test_non_target_elements() {
    assert_eq!(error_kind("[a + 1] = 2"), ErrorKind::InvalidDestructuringTarget);
    assert_eq!(error_kind("({a: 1} = x)"), ErrorKind::InvalidDestructuringTarget);
    assert_eq!(error_kind("({a() {}} = x)"), ErrorKind::InvalidDestructuringTarget);
    assert_eq!(error_kind("({get a() {}} = x)"), ErrorKind::InvalidDestructuringTarget);
}

#[test]
fn test_simple_assignment_targets() {
    assert_eq!(error_kind("1 = 2"), ErrorKind::InvalidLeftHandSide);
    assert_eq!(error_kind("a + 1 = 2"), ErrorKind::InvalidLeftHandSide);
    assert_eq!(error_kind("f() = 1"), ErrorKind::InvalidLeftHandSide);
    assert_eq!(error_kind("([a]) = 1"), ErrorKind::InvalidLeftHandSide);
    assert_eq!(error_kind("[a] += 1"), ErrorKind::InvalidLeftHandSide);
    assert!(parse("(a) = 1", &ParseOptions::default()).is_ok());
    assert!(parse("((a.b)) += 1", &ParseOptions::default()).is_ok());
    assert!(parse("[(a), (b.c)] = d", &ParseOptions::default()).is_ok());
}

#[test]
fn test_update_targets() {
    assert!(parse("a++; --b.c", &ParseOptions::default()).is_ok());
    assert_eq!(error_kind("1++"), ErrorKind::InvalidLeftHandSide);
    assert_eq!(error_kind("++f()"), ErrorKind::InvalidLeftHandSide);
}

// ============ ARROW PARAMETERS ============

#[test]
#[allow(clippy::panic)]
fn test_arrow_parameters_from_parenthesized_list() {
    let program = parse_ok("(a, [b], {c}, d = 1, ...e) => a");
    let Expression::ArrowFunction(arrow) = expression(&program) else {
        panic!("expected an arrow function");
    };
    assert_eq!(arrow.params.len(), 5);
    assert!(matches!(arrow.params[0], Pattern::Identifier(_)));
    assert!(matches!(arrow.params[1], Pattern::Array(_)));
    assert!(matches!(arrow.params[2], Pattern::Object(_)));
    assert!(matches!(arrow.params[3], Pattern::Assignment(_)));
    assert!(matches!(arrow.params[4], Pattern::Rest(_)));
    assert!(matches!(arrow.body, ArrowFunctionBody::Expression(_)));
}

#[test]
fn test_invalid_arrow_parameters() {
    assert_eq!(error_kind("((a)) => 1"), ErrorKind::InvalidDestructuringTarget);
    assert_eq!(error_kind("(a + b) => 1"), ErrorKind::InvalidDestructuringTarget);
    assert_eq!(error_kind("(a.b) => 1"), ErrorKind::InvalidDestructuringTarget);
    assert_eq!(error_kind("([a.b]) => 1"), ErrorKind::InvalidDestructuringTarget);
    assert_eq!(error_kind("(...a, b) => 1"), ErrorKind::UnexpectedToken);
}

#[test]
fn test_arrow_body_is_never_reinterpreted() {
    // a block-bodied arrow ends the expression; `.x` cannot continue it
    assert_eq!(error_kind("(x)=>{}.x in y"), ErrorKind::UnexpectedToken);
    assert_eq!(error_kind("({a: 1})=>{}"), ErrorKind::InvalidDestructuringTarget);
    assert!(parse("(x) => ({}).x in y", &ParseOptions::default()).is_ok());
}

#[test]
fn test_duplicate_arrow_parameters() {
    assert_eq!(error_kind("(a, a) => 1"), ErrorKind::DuplicateBinding);
    assert_eq!(error_kind("([a], {b: a}) => 1"), ErrorKind::DuplicateBinding);
    assert!(parse("function f(a, a) {}", &ParseOptions::default()).is_ok());
}

#[test]
#[allow(clippy::panic)]
fn test_async_arrow_or_call() {
    let program = parse_ok("async (a, ...b) => a");
    let Expression::ArrowFunction(arrow) = expression(&program) else {
        panic!("expected an arrow function");
    };
    assert!(arrow.async_);
    assert_eq!(arrow.params.len(), 2);

    let program = parse_ok("async (a, ...b)");
    assert!(matches!(expression(&program), Expression::Call(_)));

    let program = parse_ok("async x => x");
    assert!(matches!(expression(&program), Expression::ArrowFunction(arrow) if arrow.async_));

    assert_eq!(error_kind("async (...a, b) => 1"), ErrorKind::InvalidDestructuringTarget);
    assert_eq!(error_kind("async (...a = 1) => 1"), ErrorKind::InvalidDestructuringTarget);
}

#[test]
fn test_async_arrow_await_parameter() {
    assert_eq!(error_kind("async (await) => 1"), ErrorKind::ReservedWordUsage);
    assert!(parse("(await) => 1", &ParseOptions::default()).is_ok());
}

#[test]
fn test_arrow_on_new_line_rejected() {
    assert!(parse("(a)\n=> a", &ParseOptions::default()).is_err());
    assert!(parse("a\n=> a", &ParseOptions::default()).is_err());
}

#[test]
fn test_arrow_head_must_start_assignment_expression() {
    assert!(parse("x = (a) => a", &ParseOptions::default()).is_ok());
    assert!(parse("f((a) => a, b => b)", &ParseOptions::default()).is_ok());
    assert!(parse("a + (b) => c", &ParseOptions::default()).is_err());
    assert!(parse("!x => x", &ParseOptions::default()).is_err());
}

#[test]
fn test_yield_in_arrow_parameters() {
    assert_eq!(
        error_kind("function* g() { (a = yield) => 1; }"),
        ErrorKind::UnexpectedToken
    );
    assert!(parse("function* g() { (a = yield); }", &ParseOptions::default()).is_ok());
}

#[test]
fn test_empty_parentheses_need_arrow() {
    assert!(parse("() => 1", &ParseOptions::default()).is_ok());
    assert_eq!(error_kind("()"), ErrorKind::UnexpectedToken);
    assert_eq!(error_kind("(a, b,)"), ErrorKind::UnexpectedToken);
    assert!(parse("(a, b,) => 1", &ParseOptions::default()).is_ok());
}

// ============ BINDING PATTERNS ============

#[test]
fn test_binding_patterns_in_declarations() {
    assert!(parse("let {a, b: [c, d = 1], ...e} = f;", &ParseOptions::default()).is_ok());
    assert!(parse("const [x, , ...y] = z;", &ParseOptions::default()).is_ok());
    assert_eq!(error_kind("let {a: b.c} = d;"), ErrorKind::UnexpectedToken);
    assert_eq!(error_kind("let [...a = 1] = b;"), ErrorKind::InvalidDestructuringTarget);
}

#[test]
fn test_destructuring_declaration_requires_initializer() {
    assert_eq!(error_kind("let [a];"), ErrorKind::UnexpectedToken);
    assert_eq!(error_kind("var {a};"), ErrorKind::UnexpectedToken);
}
