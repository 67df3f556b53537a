//! Tests for `for` statement head disambiguation
//!
//! A `for (` head can start a classic loop, a for-in loop or a for-of loop,
//! with either a declaration or an expression on the left.

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

#[allow(clippy::unwrap_used)]
fn error_kind_with(source: &str, options: ParseOptions) -> ErrorKind {
    parse(source, &options).unwrap_err().kind
}

#[allow(clippy::panic)]
fn single(program: &Program) -> &Statement {
    match program.body.as_slice() {
        [statement] => statement,
        other => panic!("expected one statement, got {}", other.len()),
    }
}

fn ident_name(expr: &Expression) -> Option<&str> {
    match expr.unparenthesized() {
        Expression::Identifier(id) => Some(id.name.as_str()),
        _ => None,
    }
}

// ============ FOR-IN / FOR-OF WITH DECLARATIONS ============

#[test]
#[allow(clippy::panic)]
fn test_for_in_let_with_shadowing_body() {
    let program = parse_ok("for (let foo in bar) { let foo = 1; }");
    let Statement::ForIn(stmt) = single(&program) else {
        panic!("expected ForInStatement");
    };
    let ForInOfLeft::Variable(decl) = &stmt.left else {
        panic!("expected a declaration on the left");
    };
    assert_eq!(decl.kind, VariableKind::Let);
    assert_eq!(decl.declarations.len(), 1);
    assert!(decl.declarations[0].init.is_none());
    assert!(matches!(&decl.declarations[0].id, Pattern::Identifier(id) if id.name == "foo"));
    assert_eq!(ident_name(&stmt.right), Some("bar"));
    let Statement::Block(body) = stmt.body.as_ref() else {
        panic!("expected a block body");
    };
    assert_eq!(body.body.len(), 1);
}

#[test]
fn test_for_of_each_declaration_kind() {
    for kind in ["var", "let", "const"] {
        let program = parse_ok(&format!("for ({} x of xs);", kind));
        assert!(matches!(single(&program), Statement::ForOf(stmt) if !stmt.await_), "{}", kind);
        let program = parse_ok(&format!("for ({} x in xs);", kind));
        assert!(matches!(single(&program), Statement::ForIn(_)), "{}", kind);
    }
}

#[test]
#[allow(clippy::panic)]
fn test_for_of_destructuring_declaration() {
    let program = parse_ok("for (const [a, {b}] of pairs) ;");
    let Statement::ForOf(stmt) = single(&program) else {
        panic!("expected ForOfStatement");
    };
    let ForInOfLeft::Variable(decl) = &stmt.left else {
        panic!("expected a declaration on the left");
    };
    assert!(matches!(decl.declarations[0].id, Pattern::Array(_)));
}

#[test]
fn test_multiple_declarators_in_for_in_of() {
    assert_eq!(error_kind("for (let x, y of z);"), ErrorKind::InvalidForHead);
    assert_eq!(error_kind("for (var a, b in c);"), ErrorKind::InvalidForHead);
    assert_eq!(error_kind("for (const a = 1, b = 2 of c);"), ErrorKind::InvalidForHead);
}

#[test]
fn test_initializer_in_for_of() {
    assert_eq!(error_kind("for (let x = 1 of y);"), ErrorKind::InvalidForHead);
    assert_eq!(error_kind("for (var x = 1 of y);"), ErrorKind::InvalidForHead);
    assert_eq!(error_kind("for (let x = 1 in y);"), ErrorKind::InvalidForHead);
    assert_eq!(error_kind("for (const x = 1 in y);"), ErrorKind::InvalidForHead);
}

#[test]
#[allow(clippy::panic)]
fn test_legacy_var_initializer_in_for_in() {
    let program = parse_ok("for (var x = 1 in y);");
    let Statement::ForIn(stmt) = single(&program) else {
        panic!("expected ForInStatement");
    };
    let ForInOfLeft::Variable(decl) = &stmt.left else {
        panic!("expected a declaration on the left");
    };
    assert!(decl.declarations[0].init.is_some());
}

#[test]
fn test_legacy_var_initializer_rejected_outside_sloppy_scripts() {
    assert_eq!(error_kind("'use strict'; for (var x = 1 in y);"), ErrorKind::InvalidForHead);
    assert_eq!(error_kind("for (var [x] = 1 in y);"), ErrorKind::InvalidForHead);
    assert_eq!(
        error_kind_with("for (var x = 1 in y);", ParseOptions::default().with_disable_legacy_compat(true)),
        ErrorKind::InvalidForHead
    );
    assert_eq!(
        error_kind_with("for (var x = 1 in y);", ParseOptions::module()),
        ErrorKind::InvalidForHead
    );
}

#[test]
fn test_destructuring_errors_in_declaration_head() {
    assert_eq!(error_kind("for (let [...a,] of c);"), ErrorKind::InvalidForHead);
    assert_eq!(error_kind("for (const {...a, b} of c);"), ErrorKind::InvalidForHead);
}

#[test]
fn test_semicolon_after_for_in_right_side() {
    assert_eq!(error_kind("for (x in y; z);"), ErrorKind::InvalidForHead);
    assert_eq!(error_kind("for (let x of y;;);"), ErrorKind::InvalidForHead);
}

// ============ CLASSIC FOR ============

#[test]
#[allow(clippy::panic)]
fn test_classic_for_with_expressions() {
    let program = parse_ok("for (a;b;c);");
    let Statement::For(stmt) = single(&program) else {
        panic!("expected ForStatement");
    };
    let Some(ForInit::Expression(init)) = &stmt.init else {
        panic!("expected an expression init");
    };
    assert_eq!(ident_name(init), Some("a"));
    assert_eq!(stmt.test.as_ref().and_then(ident_name), Some("b"));
    assert_eq!(stmt.update.as_ref().and_then(ident_name), Some("c"));
    assert!(matches!(stmt.body.as_ref(), Statement::Empty(_)));
}

#[test]
#[allow(clippy::panic)]
fn test_classic_for_empty_head() {
    let program = parse_ok("for (;;) break;");
    let Statement::For(stmt) = single(&program) else {
        panic!("expected ForStatement");
    };
    assert!(stmt.init.is_none());
    assert!(stmt.test.is_none());
    assert!(stmt.update.is_none());
}

#[test]
fn test_const_without_initializer() {
    assert_eq!(error_kind("for (const x;;);"), ErrorKind::InvalidForHead);
    assert_eq!(error_kind("for (let [a];;);"), ErrorKind::InvalidForHead);
}

#[test]
fn test_classic_for_head_needs_both_semicolons() {
    assert_eq!(
        error_kind("for (var [foo] = arr, [bar] = arr2);"),
        ErrorKind::UnexpectedToken
    );
    assert_eq!(error_kind("for (a; b);"), ErrorKind::UnexpectedToken);
}

#[test]
#[allow(clippy::panic)]
fn test_destructuring_declarators_in_classic_for() {
    let program = parse_ok("for (var [foo] = arr, [bar] = arr2;;);");
    let Statement::For(stmt) = single(&program) else {
        panic!("expected ForStatement");
    };
    let Some(ForInit::Variable(decl)) = &stmt.init else {
        panic!("expected a declaration init");
    };
    assert_eq!(decl.kind, VariableKind::Var);
    assert_eq!(decl.declarations.len(), 2);
    for declarator in &decl.declarations {
        assert!(matches!(declarator.id, Pattern::Array(_)));
        assert!(declarator.init.is_some());
    }
}

#[test]
#[allow(clippy::panic)]
fn test_object_pattern_assignment_in_init() {
    let program = parse_ok("for ({x = y} = (z);;) {}");
    let Statement::For(stmt) = single(&program) else {
        panic!("expected ForStatement");
    };
    let Some(ForInit::Expression(Expression::Assignment(assign))) = &stmt.init else {
        panic!("expected an assignment init");
    };
    let Pattern::Object(object) = &assign.left else {
        panic!("expected an object pattern");
    };
    let [ObjectPatternProperty::Property { value, shorthand, .. }] = object.properties.as_slice() else {
        panic!("expected one property");
    };
    assert!(*shorthand);
    let Pattern::Assignment(default) = value else {
        panic!("expected a default value");
    };
    assert!(matches!(default.left.as_ref(), Pattern::Identifier(id) if id.name == "x"));
    assert_eq!(ident_name(&default.right), Some("y"));
    assert_eq!(ident_name(&assign.right), Some("z"));
}

#[test]
fn test_in_operator_allowed_inside_parentheses_of_init() {
    let program = parse_ok("for (var x = (a in b);;);");
    assert!(matches!(single(&program), Statement::For(_)));
    let program = parse_ok("for (f(a in b);;);");
    assert!(matches!(single(&program), Statement::For(_)));
}

// ============ EXPRESSION HEADS ============

#[test]
#[allow(clippy::panic)]
fn test_for_in_with_expression_targets() {
    let program = parse_ok("for ((a) in b);");
    let Statement::ForIn(stmt) = single(&program) else {
        panic!("expected ForInStatement");
    };
    assert!(matches!(&stmt.left, ForInOfLeft::Pattern(Pattern::Identifier(id)) if id.name == "a"));

    let program = parse_ok("for (a.b[c] of d);");
    let Statement::ForOf(stmt) = single(&program) else {
        panic!("expected ForOfStatement");
    };
    assert!(matches!(stmt.left, ForInOfLeft::Pattern(Pattern::Member(_))));

    let program = parse_ok("for ([a, ...b] of c);");
    let Statement::ForOf(stmt) = single(&program) else {
        panic!("expected ForOfStatement");
    };
    assert!(matches!(stmt.left, ForInOfLeft::Pattern(Pattern::Array(_))));
}

#[test]
fn test_invalid_expression_targets() {
    assert_eq!(error_kind("for (a + b in c);"), ErrorKind::InvalidLeftHandSide);
    assert_eq!(error_kind("for (f() of c);"), ErrorKind::InvalidLeftHandSide);
    assert_eq!(error_kind("for ([...a,] of c);"), ErrorKind::InvalidLeftHandSide);
}

#[test]
#[allow(clippy::panic)]
fn test_let_as_identifier_in_sloppy_for_in() {
    let program = parse_ok("for (let in x);");
    let Statement::ForIn(stmt) = single(&program) else {
        panic!("expected ForInStatement");
    };
    assert!(matches!(&stmt.left, ForInOfLeft::Pattern(Pattern::Identifier(id)) if id.name == "let"));
}

#[test]
fn test_for_of_left_side_may_not_start_with_let() {
    assert_eq!(error_kind("for (let.x of y);"), ErrorKind::InvalidForHead);
}

#[test]
fn test_for_of_left_side_may_not_be_async() {
    assert_eq!(error_kind("for (async of x);"), ErrorKind::InvalidForHead);
    let program = parse_ok("for (async in x);");
    assert!(matches!(single(&program), Statement::ForIn(_)));
}

// ============ FOR AWAIT ============

#[test]
#[allow(clippy::panic)]
fn test_for_await_of_in_async_function() {
    let program = parse_ok("async function f() { for await (const x of xs) ; }");
    let Statement::FunctionDeclaration(function) = single(&program) else {
        panic!("expected a function");
    };
    assert!(matches!(&function.body.body[0], Statement::ForOf(stmt) if stmt.await_));
}

#[test]
fn test_for_await_requires_for_of() {
    assert_eq!(
        error_kind("async function f() { for await (x in xs) ; }"),
        ErrorKind::InvalidForHead
    );
    assert_eq!(
        error_kind("async function f() { for await (;;) ; }"),
        ErrorKind::InvalidForHead
    );
    assert!(parse("function f() { for await (x of xs) ; }", &ParseOptions::default()).is_err());
}

#[test]
fn test_top_level_for_await_in_module() {
    assert!(parse("for await (const x of xs) ;", &ParseOptions::module()).is_ok());
}

// ============ BINDINGS ============

#[test]
fn test_duplicate_bindings_in_head() {
    assert_eq!(error_kind("for (let [z, z];;);"), ErrorKind::DuplicateBinding);
    assert_eq!(error_kind("for (let a, {y}=z, y);"), ErrorKind::DuplicateBinding);
    assert_eq!(error_kind("for (const [x, x] of y);"), ErrorKind::DuplicateBinding);
}

#[test]
fn test_sibling_loops_may_reuse_names() {
    let program = parse_ok("for (let a;;); for (let a;;);");
    assert_eq!(program.body.len(), 2);
}

#[test]
fn test_var_in_body_collides_with_head_binding() {
    assert_eq!(error_kind("for (let x;;) { var x; }"), ErrorKind::DuplicateBinding);
    assert_eq!(error_kind("for (const x of y) { var x; }"), ErrorKind::DuplicateBinding);
    assert_eq!(error_kind("let x; for (var x;;);"), ErrorKind::DuplicateBinding);
}

#[test]
fn test_body_block_may_shadow_head_binding() {
    assert!(parse("for (let x;;) { let x; }", &ParseOptions::default()).is_ok());
    assert!(parse("for (var x in y) { let x; }", &ParseOptions::default()).is_ok());
}

// ============ LOOP BODIES ============

#[test]
fn test_function_declaration_as_loop_body() {
    assert!(parse("for (x in y) function f() {}", &ParseOptions::default()).is_ok());
    assert_eq!(
        error_kind("'use strict'; for (x in y) function f() {}"),
        ErrorKind::IllegalFunctionInStatementPosition
    );
    assert_eq!(
        error_kind("for (;;) function* g() {}"),
        ErrorKind::IllegalFunctionInStatementPosition
    );
    assert_eq!(
        error_kind_with(
            "for (x of y) function f() {}",
            ParseOptions::default().with_disable_legacy_compat(true)
        ),
        ErrorKind::IllegalFunctionInStatementPosition
    );
}

#[test]
fn test_declarations_rejected_as_loop_body() {
    assert_eq!(
        error_kind("for (x of y) class C {}"),
        ErrorKind::IllegalFunctionInStatementPosition
    );
    assert_eq!(error_kind("for (x of y) let [a] = b;"), ErrorKind::UnexpectedToken);
    assert_eq!(error_kind("for (;;) const a = 1;"), ErrorKind::UnexpectedToken);
}

#[test]
fn test_labelled_continue_targets_loop() {
    assert!(parse("outer: for (;;) { for (;;) continue outer; }", &ParseOptions::default()).is_ok());
    assert_eq!(
        error_kind("outer: { for (;;) continue outer; }"),
        ErrorKind::InvalidControlFlow
    );
}
