//! Tests for ESTree JSON output
//!
//! Node shapes, optional range and location fields, and the literal
//! encodings that differ from the in-memory tree.

use esfront::{ParseOptions, parse_to_estree};
use serde_json::{Value, json};

#[allow(clippy::unwrap_used)]
fn estree(source: &str) -> Value {
    parse_to_estree(source, &ParseOptions::default()).unwrap()
}

/// The expression of the first expression statement.
fn first_expression(tree: &Value) -> &Value {
    &tree["body"][0]["expression"]
}

#[test]
fn test_program_shape() {
    let tree = estree("a;\nb;");
    assert_eq!(tree["type"], "Program");
    assert_eq!(tree["sourceType"], "script");
    assert_eq!(tree["start"], json!(0));
    assert_eq!(tree["end"], json!(5));
    assert_eq!(tree["body"].as_array().map(Vec::len), Some(2));

    let module = parse_to_estree("export {};", &ParseOptions::module());
    assert_eq!(module.ok().map(|tree| tree["sourceType"].clone()), Some(json!("module")));
}

#[test]
fn test_type_is_the_first_key() {
    let tree = estree("let x = [1, { y }];");
    let text = tree.to_string();
    assert!(text.starts_with(r#"{"type":"Program","start":0"#));
    assert!(text.contains(r#"{"type":"VariableDeclaration","start":0"#));
    assert!(text.contains(r#"{"type":"ObjectExpression","start":12"#));
}

#[test]
fn test_ranges_can_be_disabled() {
    let tree = parse_to_estree("a + b", &ParseOptions::default().with_ranges(false));
    let text = tree.map(|tree| tree.to_string()).unwrap_or_default();
    assert!(text.starts_with(r#"{"type":"Program","body""#));
    assert!(!text.contains("\"start\""));
    assert!(!text.contains("\"loc\""));
}

#[test]
#[allow(clippy::unwrap_used)]
fn test_loc_lines_and_columns() {
    let tree = parse_to_estree("a;\n  \"\u{1F600}\"; b", &ParseOptions::default().with_loc(true)).unwrap();
    assert_eq!(tree["loc"]["start"], json!({ "line": 1, "column": 0 }));
    let b = &tree["body"][2]["expression"];
    assert_eq!(b["name"], "b");
    // the emoji is two UTF-16 units
    assert_eq!(b["loc"]["start"], json!({ "line": 2, "column": 8 }));
    assert_eq!(b["loc"]["end"], json!({ "line": 2, "column": 9 }));
}

#[test]
fn test_directives() {
    let tree = estree(r#"'use strict'; "other"; a;"#);
    assert_eq!(tree["body"][0]["directive"], "use strict");
    assert_eq!(tree["body"][1]["directive"], "other");
    assert!(tree["body"][2].get("directive").is_none());

    let tree = estree("function f() { 'x'; }");
    assert_eq!(tree["body"][0]["body"]["body"][0]["directive"], "x");
}

#[test]
fn test_literals() {
    let tree = estree(r#"1; 1.5; "s"; true; null; 10n; /ab+/gi;"#);
    let literal = |index: usize| tree["body"][index]["expression"].clone();

    assert_eq!(literal(0)["value"], json!(1));
    assert_eq!(literal(0)["raw"], "1");
    assert_eq!(literal(1)["value"], json!(1.5));
    assert_eq!(literal(2)["value"], "s");
    assert_eq!(literal(2)["raw"], r#""s""#);
    assert_eq!(literal(3)["value"], json!(true));
    assert_eq!(literal(4)["value"], Value::Null);
    assert_eq!(literal(4)["raw"], "null");

    assert_eq!(literal(5)["value"], Value::Null);
    assert_eq!(literal(5)["bigint"], "10");
    assert_eq!(literal(5)["raw"], "10n");

    assert_eq!(literal(6)["type"], "Literal");
    assert_eq!(literal(6)["value"], Value::Null);
    assert_eq!(literal(6)["regex"], json!({ "pattern": "ab+", "flags": "gi" }));
    assert_eq!(literal(6)["raw"], "/ab+/gi");
}

#[test]
fn test_integral_numbers_render_as_integers() {
    let tree = estree("0x10; 1e3; 2.0;");
    assert_eq!(tree["body"][0]["expression"]["value"], json!(16));
    assert_eq!(tree["body"][1]["expression"]["value"], json!(1000));
    assert_eq!(tree["body"][2]["expression"]["value"], json!(2));
    assert!(tree.to_string().contains(r#""value":2,"raw":"2.0""#));
}

#[test]
fn test_template_literal() {
    let tree = estree("`a${x}b`");
    let template = first_expression(&tree);
    assert_eq!(template["type"], "TemplateLiteral");
    assert_eq!(template["expressions"][0]["name"], "x");
    assert_eq!(template["quasis"][0]["value"], json!({ "raw": "a", "cooked": "a" }));
    assert_eq!(template["quasis"][0]["tail"], json!(false));
    assert_eq!(template["quasis"][1]["tail"], json!(true));

    let tree = estree(r"tag`\unicode`");
    let quasi = &first_expression(&tree)["quasi"]["quasis"][0];
    assert_eq!(quasi["value"]["cooked"], Value::Null);
    assert_eq!(quasi["value"]["raw"], r"\unicode");
}

#[test]
fn test_optional_chain_is_wrapped() {
    let tree = estree("a?.b.c()");
    let chain = first_expression(&tree);
    assert_eq!(chain["type"], "ChainExpression");
    let call = &chain["expression"];
    assert_eq!(call["type"], "CallExpression");
    assert_eq!(call["optional"], json!(false));
    assert_eq!(call["callee"]["type"], "MemberExpression");
    assert_eq!(call["callee"]["object"]["optional"], json!(true));

    let tree = estree("a.b");
    assert_eq!(first_expression(&tree)["type"], "MemberExpression");
}

#[test]
fn test_parentheses_are_transparent() {
    let tree = estree("((a));");
    let inner = first_expression(&tree);
    assert_eq!(inner["type"], "Identifier");
    assert_eq!(inner["start"], json!(2));
    assert_eq!(inner["end"], json!(3));

    let tree = estree("(a, b) * c");
    assert_eq!(first_expression(&tree)["left"]["type"], "SequenceExpression");
}

#[test]
fn test_arrow_expression_flag() {
    let tree = estree("x => x; async (y) => { return y; };");
    let concise = &tree["body"][0]["expression"];
    assert_eq!(concise["type"], "ArrowFunctionExpression");
    assert_eq!(concise["expression"], json!(true));
    assert_eq!(concise["async"], json!(false));
    assert_eq!(concise["id"], Value::Null);

    let block = &tree["body"][1]["expression"];
    assert_eq!(block["expression"], json!(false));
    assert_eq!(block["async"], json!(true));
    assert_eq!(block["body"]["type"], "BlockStatement");
}

#[test]
fn test_for_statements() {
    let tree = estree("for (let [a] of b); for (x in y); for (;;) break;");
    assert_eq!(tree["body"][0]["type"], "ForOfStatement");
    assert_eq!(tree["body"][0]["await"], json!(false));
    assert_eq!(tree["body"][0]["left"]["type"], "VariableDeclaration");
    assert_eq!(tree["body"][0]["left"]["declarations"][0]["id"]["type"], "ArrayPattern");
    assert_eq!(tree["body"][1]["left"]["type"], "Identifier");
    assert_eq!(tree["body"][2]["init"], Value::Null);
    assert_eq!(tree["body"][2]["test"], Value::Null);
}

#[test]
fn test_assignment_targets_are_patterns() {
    let tree = estree("[a, ...b] = c; ({ x = 1 } = d);");
    let array = &tree["body"][0]["expression"]["left"];
    assert_eq!(array["type"], "ArrayPattern");
    assert_eq!(array["elements"][1]["type"], "RestElement");

    let object = &tree["body"][1]["expression"]["left"];
    assert_eq!(object["type"], "ObjectPattern");
    assert_eq!(object["properties"][0]["shorthand"], json!(true));
    assert_eq!(object["properties"][0]["value"]["type"], "AssignmentPattern");
}

#[test]
fn test_class_members() {
    let tree = estree("class A extends B { static x = 1; #y; get z() {} static {} }");
    let class = &tree["body"][0];
    assert_eq!(class["type"], "ClassDeclaration");
    assert_eq!(class["superClass"]["name"], "B");
    let members = &class["body"]["body"];
    assert_eq!(members[0]["type"], "PropertyDefinition");
    assert_eq!(members[0]["static"], json!(true));
    assert_eq!(members[1]["key"]["type"], "PrivateIdentifier");
    assert_eq!(members[1]["key"]["name"], "y");
    assert_eq!(members[2]["type"], "MethodDefinition");
    assert_eq!(members[2]["kind"], "get");
    assert_eq!(members[2]["value"]["type"], "FunctionExpression");
    assert_eq!(members[3]["type"], "StaticBlock");
}

#[test]
fn test_module_declarations() {
    let tree = parse_to_estree(
        r#"import d, * as ns from "m"; export { d as "e f" }; export * as all from "n";"#,
        &ParseOptions::module(),
    );
    let tree = tree.unwrap_or(Value::Null);
    let import = &tree["body"][0];
    assert_eq!(import["type"], "ImportDeclaration");
    assert_eq!(import["specifiers"][0]["type"], "ImportDefaultSpecifier");
    assert_eq!(import["specifiers"][1]["type"], "ImportNamespaceSpecifier");
    assert_eq!(import["source"]["value"], "m");

    let export = &tree["body"][1];
    assert_eq!(export["type"], "ExportNamedDeclaration");
    assert_eq!(export["declaration"], Value::Null);
    assert_eq!(export["specifiers"][0]["exported"]["type"], "Literal");
    assert_eq!(export["specifiers"][0]["exported"]["value"], "e f");

    assert_eq!(tree["body"][2]["type"], "ExportAllDeclaration");
    assert_eq!(tree["body"][2]["exported"]["name"], "all");
}

#[test]
#[allow(clippy::unwrap_used)]
fn test_reparsing_is_stable() {
    let source = "for (let [a, , ...b] of c) { ({ x = 1 } = d); }";
    let options = ParseOptions::default();
    let first = esfront::parse(source, &options).unwrap();
    let second = esfront::parse(source, &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_layout_does_not_change_the_tree() {
    let options = ParseOptions::default().with_ranges(false);
    let pairs = [
        (
            "for(let[a,b]of c){x}",
            "for (let [a, b] of c) {\n    x\n}",
        ),
        (
            "for ({x = y} = (z);;) {}",
            "for /* head */ ({ x = y } = z ; ; ) { }",
        ),
        (
            "a = b\n(c)",
            "a = b(c);",
        ),
        (
            "label: for (;;) { break label }",
            "label:\nfor (;;) {\n  break label;\n}",
        ),
    ];
    for (compact, spaced) in pairs {
        let left = parse_to_estree(compact, &options).ok();
        let right = parse_to_estree(spaced, &options).ok();
        assert!(left.is_some(), "{}", compact);
        assert_eq!(left, right, "{}", compact);
    }
}
