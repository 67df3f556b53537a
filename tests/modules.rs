//! Tests for module code
//!
//! Import and export declarations, the export-name table, and the
//! differences between module and script goal symbols.

use esfront::ast::*;
use esfront::{ErrorKind, ParseOptions, parse};

fn module_accepts(source: &str) -> bool {
    parse(source, &ParseOptions::module()).is_ok()
}

#[allow(clippy::unwrap_used)]
fn parse_module(source: &str) -> Program {
    parse(source, &ParseOptions::module()).unwrap()
}

#[allow(clippy::unwrap_used)]
fn module_error(source: &str) -> ErrorKind {
    parse(source, &ParseOptions::module()).unwrap_err().kind
}

#[allow(clippy::unwrap_used)]
fn script_error(source: &str) -> ErrorKind {
    parse(source, &ParseOptions::default()).unwrap_err().kind
}

// ============ IMPORTS ============

#[test]
#[allow(clippy::panic)]
fn test_import_specifier_forms() {
    let program = parse_module(r#"import a, { b, c as d, "e f" as g } from "m";"#);
    let Some(Statement::Import(import)) = program.body.first() else {
        panic!("expected an import declaration");
    };
    assert_eq!(import.specifiers.len(), 4);
    assert!(matches!(import.specifiers.first(), Some(ImportSpecifier::Default { .. })));
    assert!(matches!(
        import.specifiers.get(3),
        Some(ImportSpecifier::Named { imported: ModuleExportName::String(_), .. })
    ));
    assert!(matches!(&import.source.value, LiteralValue::String(source) if source.as_str() == "m"));
}

#[test]
fn test_namespace_and_bare_imports() {
    assert!(module_accepts(r#"import * as ns from "m";"#));
    assert!(module_accepts(r#"import a, * as ns from "m";"#));
    assert!(module_accepts(r#"import "m";"#));
    assert!(module_accepts(r#"import {} from "m";"#));
    assert_eq!(module_error(r#"import * from "m";"#), ErrorKind::UnexpectedToken);
    assert_eq!(module_error(r#"import a "m";"#), ErrorKind::UnexpectedToken);
    assert_eq!(module_error(r#"import { a } from m;"#), ErrorKind::UnexpectedToken);
}

#[test]
fn test_import_binding_restrictions() {
    assert_eq!(module_error(r#"import { "a" } from "m";"#), ErrorKind::UnexpectedToken);
    assert_eq!(module_error(r#"import { if } from "m";"#), ErrorKind::ReservedWordUsage);
    assert!(module_accepts(r#"import { if as x } from "m";"#));
    assert_eq!(module_error(r#"import { a as await } from "m";"#), ErrorKind::ReservedWordUsage);
}

#[test]
fn test_import_bindings_are_lexical() {
    assert_eq!(module_error(r#"import a from "m"; let a;"#), ErrorKind::DuplicateBinding);
    assert_eq!(module_error(r#"import a from "m"; var a;"#), ErrorKind::DuplicateBinding);
    assert_eq!(module_error(r#"import { a, b as a } from "m";"#), ErrorKind::DuplicateBinding);
    assert!(module_accepts(r#"import a from "m"; function f() { let a; }"#));
}

// ============ EXPORTS ============

#[test]
#[allow(clippy::panic)]
fn test_export_declarations() {
    let program = parse_module("export const a = 1, [b] = [2]; export function f() {} export class C {}");
    assert_eq!(program.body.len(), 3);
    let Some(Statement::ExportNamed(export)) = program.body.first() else {
        panic!("expected a named export");
    };
    assert!(export.declaration.is_some());
    assert!(export.specifiers.is_empty());
    assert!(export.source.is_none());
}

#[test]
fn test_export_default_forms() {
    assert!(module_accepts("export default function () {}"));
    assert!(module_accepts("export default function f() {} f();"));
    assert!(module_accepts("export default async function () {}"));
    assert!(module_accepts("export default class {}"));
    assert!(module_accepts("export default 1 + 2;"));
    assert!(module_accepts("export default (a, b) => a;"));
}

#[test]
fn test_export_lists() {
    assert!(module_accepts("var a, b; export { a, b as c };"));
    assert!(module_accepts("export { a }; var a;"));
    assert!(module_accepts("export { f }; function f() {}"));
    assert!(module_accepts("export { x }; { var x; }"));
    assert!(module_accepts(r#"export { a as "a b" }; let a;"#));
    assert!(module_accepts(r#"export { "a b" as c, if } from "m";"#));
    assert!(module_accepts(r#"export * from "m"; export * as ns from "n";"#));
}

#[test]
fn test_undefined_exports() {
    assert_eq!(module_error("export { x };"), ErrorKind::UndefinedExport);
    assert_eq!(module_error("export { x }; { let x; }"), ErrorKind::UndefinedExport);
    assert_eq!(module_error("export { x }; function f() { var x; }"), ErrorKind::UndefinedExport);
}

#[test]
fn test_export_list_local_restrictions() {
    assert_eq!(module_error(r#"export { "a" };"#), ErrorKind::UnexpectedToken);
    assert_eq!(module_error("export { if };"), ErrorKind::ReservedWordUsage);
    assert_eq!(module_error("export { await };"), ErrorKind::ReservedWordUsage);
}

#[test]
fn test_duplicate_exports() {
    assert_eq!(module_error("var a; export { a, a };"), ErrorKind::DuplicateBinding);
    assert_eq!(module_error("export let a = 1; export { a };"), ErrorKind::DuplicateBinding);
    assert_eq!(module_error("export default 1; export default 2;"), ErrorKind::DuplicateBinding);
    assert_eq!(
        module_error("var a; export { a as default }; export default 1;"),
        ErrorKind::DuplicateBinding
    );
    assert_eq!(
        module_error(r#"export * as ns from "m"; export * as ns from "n";"#),
        ErrorKind::DuplicateBinding
    );
    assert!(module_accepts(r#"export * from "m"; export * from "n";"#));
}

// ============ GOAL SYMBOLS ============

#[test]
fn test_module_syntax_outside_modules() {
    assert_eq!(script_error(r#"import a from "m";"#), ErrorKind::UnexpectedToken);
    assert_eq!(script_error("export var a;"), ErrorKind::UnexpectedToken);
    assert_eq!(script_error("import.meta"), ErrorKind::UnexpectedToken);
    assert!(parse(r#"import("m")"#, &ParseOptions::default()).is_ok());
}

#[test]
fn test_module_declarations_only_at_top_level() {
    assert_eq!(module_error("{ export var a; }"), ErrorKind::UnexpectedToken);
    assert_eq!(module_error(r#"function f() { import a from "m"; }"#), ErrorKind::UnexpectedToken);
    assert!(module_accepts(r#"function f() { return import("m"); }"#));
}

#[test]
fn test_import_meta_in_modules() {
    assert!(module_accepts("import.meta.url"));
    assert!(module_accepts("function f() { return import.meta; }"));
    assert_eq!(module_error("import.foo"), ErrorKind::UnexpectedToken);
}

#[test]
fn test_module_code_is_strict_and_async() {
    assert!(module_accepts("await x;"));
    assert!(module_accepts("for await (const x of y);"));
    assert_eq!(module_error("var await;"), ErrorKind::ReservedWordUsage);
    assert_eq!(module_error("with (a) {}"), ErrorKind::StrictModeViolation);
    assert_eq!(module_error("010"), ErrorKind::StrictModeViolation);
    assert_eq!(module_error("{ function f() {} function f() {} }"), ErrorKind::DuplicateBinding);
}
