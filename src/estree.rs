//! ESTree JSON rendering of the syntax tree.
//!
//! Every node is a JSON object whose first key is `type`, followed by
//! `start`/`end` byte offsets and a `loc` block when the options ask for
//! them. Parenthesized expressions are transparent.

use serde_json::{Map, Value, json};

use crate::ast::*;
use crate::lexer::Span;
use crate::options::ParseOptions;

/// Render an already parsed program. `source` must be the text it was
/// parsed from.
pub fn to_estree(program: &Program, source: &str, options: &ParseOptions) -> Value {
    let builder = Builder {
        source,
        lines: LineIndex::new(source),
        include_ranges: options.include_ranges,
        include_loc: options.include_loc,
    };
    builder.program(program)
}

/// Byte offsets of line starts, for offset to line/column conversion.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let mut chars = source.char_indices().peekable();
        while let Some((offset, ch)) = chars.next() {
            match ch {
                '\r' => {
                    if let Some((_, '\n')) = chars.peek() {
                        chars.next();
                        line_starts.push(offset + 2);
                    } else {
                        line_starts.push(offset + 1);
                    }
                }
                '\n' => line_starts.push(offset + 1),
                '\u{2028}' | '\u{2029}' => line_starts.push(offset + ch.len_utf8()),
                _ => {}
            }
        }
        LineIndex { line_starts }
    }

    /// 1-based line and 0-based column (in UTF-16 code units) of a byte
    /// offset.
    pub fn position(&self, source: &str, offset: usize) -> (usize, usize) {
        let line = self.line_starts.partition_point(|&start| start <= offset).max(1);
        let line_start = self.line_starts.get(line - 1).copied().unwrap_or(0);
        let column = source
            .get(line_start..offset)
            .map(|text| text.encode_utf16().count())
            .unwrap_or(0);
        (line, column)
    }
}

struct Builder<'s> {
    source: &'s str,
    lines: LineIndex,
    include_ranges: bool,
    include_loc: bool,
}

impl Builder<'_> {
    fn node(&self, kind: &str, span: Span, fields: Vec<(&str, Value)>) -> Value {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::from(kind));
        if self.include_ranges {
            map.insert("start".to_string(), Value::from(span.start));
            map.insert("end".to_string(), Value::from(span.end));
        }
        if self.include_loc {
            let (start_line, start_column) = self.lines.position(self.source, span.start);
            let (end_line, end_column) = self.lines.position(self.source, span.end);
            map.insert(
                "loc".to_string(),
                json!({
                    "start": { "line": start_line, "column": start_column },
                    "end": { "line": end_line, "column": end_column },
                }),
            );
        }
        for (key, value) in fields {
            map.insert(key.to_string(), value);
        }
        Value::Object(map)
    }

    fn raw(&self, span: Span) -> Value {
        Value::from(self.source.get(span.start..span.end).unwrap_or(""))
    }

    fn program(&self, program: &Program) -> Value {
        self.node(
            "Program",
            program.span,
            vec![
                ("body", self.statements(&program.body)),
                ("sourceType", Value::from(program.source_type.as_str())),
            ],
        )
    }

    // ============ STATEMENTS ============

    fn statements(&self, statements: &[Statement]) -> Value {
        Value::Array(statements.iter().map(|s| self.statement(s)).collect())
    }

    fn block(&self, block: &BlockStatement) -> Value {
        self.node("BlockStatement", block.span, vec![("body", self.statements(&block.body))])
    }

    fn optional_statement(&self, statement: Option<&Statement>) -> Value {
        statement.map_or(Value::Null, |s| self.statement(s))
    }

    fn statement(&self, statement: &Statement) -> Value {
        match statement {
            Statement::VariableDeclaration(decl) => self.variable_declaration(decl),
            Statement::FunctionDeclaration(function) => self.function("FunctionDeclaration", function),
            Statement::ClassDeclaration(class) => self.class("ClassDeclaration", class),
            Statement::Block(block) => self.block(block),
            Statement::If(stmt) => self.node(
                "IfStatement",
                stmt.span,
                vec![
                    ("test", self.expression(&stmt.test)),
                    ("consequent", self.statement(&stmt.consequent)),
                    ("alternate", self.optional_statement(stmt.alternate.as_deref())),
                ],
            ),
            Statement::Switch(stmt) => {
                let cases = stmt
                    .cases
                    .iter()
                    .map(|case| {
                        self.node(
                            "SwitchCase",
                            case.span,
                            vec![
                                ("consequent", self.statements(&case.consequent)),
                                ("test", self.optional_expression(case.test.as_ref())),
                            ],
                        )
                    })
                    .collect();
                self.node(
                    "SwitchStatement",
                    stmt.span,
                    vec![
                        ("discriminant", self.expression(&stmt.discriminant)),
                        ("cases", Value::Array(cases)),
                    ],
                )
            }
            Statement::For(stmt) => {
                let init = match &stmt.init {
                    Some(ForInit::Variable(decl)) => self.variable_declaration(decl),
                    Some(ForInit::Expression(expr)) => self.expression(expr),
                    None => Value::Null,
                };
                self.node(
                    "ForStatement",
                    stmt.span,
                    vec![
                        ("init", init),
                        ("test", self.optional_expression(stmt.test.as_ref())),
                        ("update", self.optional_expression(stmt.update.as_ref())),
                        ("body", self.statement(&stmt.body)),
                    ],
                )
            }
            Statement::ForIn(stmt) => self.node(
                "ForInStatement",
                stmt.span,
                vec![
                    ("left", self.for_left(&stmt.left)),
                    ("right", self.expression(&stmt.right)),
                    ("body", self.statement(&stmt.body)),
                ],
            ),
            Statement::ForOf(stmt) => self.node(
                "ForOfStatement",
                stmt.span,
                vec![
                    ("await", Value::from(stmt.await_)),
                    ("left", self.for_left(&stmt.left)),
                    ("right", self.expression(&stmt.right)),
                    ("body", self.statement(&stmt.body)),
                ],
            ),
            Statement::While(stmt) => self.node(
                "WhileStatement",
                stmt.span,
                vec![("test", self.expression(&stmt.test)), ("body", self.statement(&stmt.body))],
            ),
            Statement::DoWhile(stmt) => self.node(
                "DoWhileStatement",
                stmt.span,
                vec![("body", self.statement(&stmt.body)), ("test", self.expression(&stmt.test))],
            ),
            Statement::Try(stmt) => {
                let handler = stmt.handler.as_ref().map_or(Value::Null, |clause| {
                    self.node(
                        "CatchClause",
                        clause.span,
                        vec![
                            ("param", clause.param.as_ref().map_or(Value::Null, |p| self.pattern(p))),
                            ("body", self.block(&clause.body)),
                        ],
                    )
                });
                self.node(
                    "TryStatement",
                    stmt.span,
                    vec![
                        ("block", self.block(&stmt.block)),
                        ("handler", handler),
                        ("finalizer", stmt.finalizer.as_ref().map_or(Value::Null, |b| self.block(b))),
                    ],
                )
            }
            Statement::With(stmt) => self.node(
                "WithStatement",
                stmt.span,
                vec![("object", self.expression(&stmt.object)), ("body", self.statement(&stmt.body))],
            ),
            Statement::Return(stmt) => self.node(
                "ReturnStatement",
                stmt.span,
                vec![("argument", self.optional_expression(stmt.argument.as_ref()))],
            ),
            Statement::Break(stmt) => self.node(
                "BreakStatement",
                stmt.span,
                vec![("label", self.optional_identifier(stmt.label.as_ref()))],
            ),
            Statement::Continue(stmt) => self.node(
                "ContinueStatement",
                stmt.span,
                vec![("label", self.optional_identifier(stmt.label.as_ref()))],
            ),
            Statement::Throw(stmt) => self.node(
                "ThrowStatement",
                stmt.span,
                vec![("argument", self.expression(&stmt.argument))],
            ),
            Statement::Import(decl) => self.import_declaration(decl),
            Statement::ExportNamed(decl) => {
                let specifiers = decl
                    .specifiers
                    .iter()
                    .map(|spec| {
                        self.node(
                            "ExportSpecifier",
                            spec.span,
                            vec![
                                ("local", self.module_export_name(&spec.local)),
                                ("exported", self.module_export_name(&spec.exported)),
                            ],
                        )
                    })
                    .collect();
                self.node(
                    "ExportNamedDeclaration",
                    decl.span,
                    vec![
                        ("declaration", self.optional_statement(decl.declaration.as_deref())),
                        ("specifiers", Value::Array(specifiers)),
                        ("source", decl.source.as_ref().map_or(Value::Null, |s| self.literal(s))),
                    ],
                )
            }
            Statement::ExportDefault(decl) => {
                let declaration = match &decl.declaration {
                    ExportDefaultKind::Function(function) => self.function("FunctionDeclaration", function),
                    ExportDefaultKind::Class(class) => self.class("ClassDeclaration", class),
                    ExportDefaultKind::Expression(expr) => self.expression(expr),
                };
                self.node("ExportDefaultDeclaration", decl.span, vec![("declaration", declaration)])
            }
            Statement::ExportAll(decl) => self.node(
                "ExportAllDeclaration",
                decl.span,
                vec![
                    (
                        "exported",
                        decl.exported.as_ref().map_or(Value::Null, |name| self.module_export_name(name)),
                    ),
                    ("source", self.literal(&decl.source)),
                ],
            ),
            Statement::Expression(stmt) => {
                let mut fields = vec![("expression", self.expression(&stmt.expression))];
                if let Some(directive) = &stmt.directive {
                    fields.push(("directive", Value::from(directive.as_str())));
                }
                self.node("ExpressionStatement", stmt.span, fields)
            }
            Statement::Empty(span) => self.node("EmptyStatement", *span, vec![]),
            Statement::Debugger(span) => self.node("DebuggerStatement", *span, vec![]),
            Statement::Labeled(stmt) => self.node(
                "LabeledStatement",
                stmt.span,
                vec![("label", self.identifier(&stmt.label)), ("body", self.statement(&stmt.body))],
            ),
        }
    }

    fn variable_declaration(&self, decl: &VariableDeclaration) -> Value {
        let declarations = decl
            .declarations
            .iter()
            .map(|d| {
                self.node(
                    "VariableDeclarator",
                    d.span,
                    vec![("id", self.pattern(&d.id)), ("init", self.optional_expression(d.init.as_ref()))],
                )
            })
            .collect();
        self.node(
            "VariableDeclaration",
            decl.span,
            vec![
                ("declarations", Value::Array(declarations)),
                ("kind", Value::from(decl.kind.as_str())),
            ],
        )
    }

    fn for_left(&self, left: &ForInOfLeft) -> Value {
        match left {
            ForInOfLeft::Variable(decl) => self.variable_declaration(decl),
            ForInOfLeft::Pattern(pattern) => self.pattern(pattern),
        }
    }

    fn import_declaration(&self, decl: &ImportDeclaration) -> Value {
        let specifiers = decl
            .specifiers
            .iter()
            .map(|spec| match spec {
                ImportSpecifier::Default { local, span } => {
                    self.node("ImportDefaultSpecifier", *span, vec![("local", self.identifier(local))])
                }
                ImportSpecifier::Namespace { local, span } => {
                    self.node("ImportNamespaceSpecifier", *span, vec![("local", self.identifier(local))])
                }
                ImportSpecifier::Named { imported, local, span } => self.node(
                    "ImportSpecifier",
                    *span,
                    vec![
                        ("imported", self.module_export_name(imported)),
                        ("local", self.identifier(local)),
                    ],
                ),
            })
            .collect();
        self.node(
            "ImportDeclaration",
            decl.span,
            vec![("specifiers", Value::Array(specifiers)), ("source", self.literal(&decl.source))],
        )
    }

    fn module_export_name(&self, name: &ModuleExportName) -> Value {
        match name {
            ModuleExportName::Identifier(id) => self.identifier(id),
            ModuleExportName::String(lit) => self.literal(lit),
        }
    }

    // ============ FUNCTIONS AND CLASSES ============

    fn function(&self, kind: &str, function: &Function) -> Value {
        self.node(
            kind,
            function.span,
            vec![
                ("id", self.optional_identifier(function.id.as_ref())),
                ("expression", Value::Bool(false)),
                ("generator", Value::Bool(function.generator)),
                ("async", Value::Bool(function.async_)),
                ("params", self.patterns(&function.params)),
                ("body", self.block(&function.body)),
            ],
        )
    }

    fn class(&self, kind: &str, class: &Class) -> Value {
        let members = class
            .body
            .members
            .iter()
            .map(|member| match member {
                ClassMember::Method(method) => self.node(
                    "MethodDefinition",
                    method.span,
                    vec![
                        ("static", Value::Bool(method.static_)),
                        ("computed", Value::Bool(method.key.is_computed())),
                        ("key", self.property_key(&method.key)),
                        ("kind", Value::from(method.kind.as_str())),
                        ("value", self.function("FunctionExpression", &method.value)),
                    ],
                ),
                ClassMember::Property(prop) => self.node(
                    "PropertyDefinition",
                    prop.span,
                    vec![
                        ("static", Value::Bool(prop.static_)),
                        ("computed", Value::Bool(prop.key.is_computed())),
                        ("key", self.property_key(&prop.key)),
                        ("value", self.optional_expression(prop.value.as_ref())),
                    ],
                ),
                ClassMember::StaticBlock(block) => {
                    self.node("StaticBlock", block.span, vec![("body", self.statements(&block.body))])
                }
            })
            .collect();

        self.node(
            kind,
            class.span,
            vec![
                ("id", self.optional_identifier(class.id.as_ref())),
                (
                    "superClass",
                    class.super_class.as_deref().map_or(Value::Null, |e| self.expression(e)),
                ),
                ("body", self.node("ClassBody", class.body.span, vec![("body", Value::Array(members))])),
            ],
        )
    }

    // ============ EXPRESSIONS ============

    fn optional_expression(&self, expr: Option<&Expression>) -> Value {
        expr.map_or(Value::Null, |e| self.expression(e))
    }

    fn expressions_or_spreads(&self, items: &[ExpressionOrSpread]) -> Value {
        Value::Array(items.iter().map(|item| self.expression_or_spread(item)).collect())
    }

    fn expression_or_spread(&self, item: &ExpressionOrSpread) -> Value {
        match item {
            ExpressionOrSpread::Expression(expr) => self.expression(expr),
            ExpressionOrSpread::Spread(spread) => self.spread(spread),
        }
    }

    fn spread(&self, spread: &SpreadElement) -> Value {
        self.node("SpreadElement", spread.span, vec![("argument", self.expression(&spread.argument))])
    }

    fn identifier(&self, id: &Identifier) -> Value {
        self.node("Identifier", id.span, vec![("name", Value::from(id.name.as_str()))])
    }

    fn optional_identifier(&self, id: Option<&Identifier>) -> Value {
        id.map_or(Value::Null, |id| self.identifier(id))
    }

    fn private_identifier(&self, id: &PrivateIdentifier) -> Value {
        self.node("PrivateIdentifier", id.span, vec![("name", Value::from(id.name.as_str()))])
    }

    fn literal(&self, lit: &Literal) -> Value {
        let mut fields = vec![];
        match &lit.value {
            LiteralValue::Null => fields.push(("value", Value::Null)),
            LiteralValue::Boolean(b) => fields.push(("value", Value::Bool(*b))),
            LiteralValue::Number(n) => fields.push(("value", number_value(*n))),
            LiteralValue::String(s) => fields.push(("value", Value::from(s.as_str()))),
            LiteralValue::BigInt(digits) => {
                fields.push(("value", Value::Null));
                fields.push(("raw", self.raw(lit.span)));
                fields.push(("bigint", Value::from(digits.as_str())));
                return self.node("Literal", lit.span, fields);
            }
            LiteralValue::RegExp { pattern, flags } => {
                fields.push(("value", Value::Null));
                fields.push(("raw", self.raw(lit.span)));
                fields.push((
                    "regex",
                    json!({ "pattern": pattern.as_str(), "flags": flags.as_str() }),
                ));
                return self.node("Literal", lit.span, fields);
            }
        }
        fields.push(("raw", self.raw(lit.span)));
        self.node("Literal", lit.span, fields)
    }

    fn template_literal(&self, template: &TemplateLiteral) -> Value {
        let quasis = template
            .quasis
            .iter()
            .map(|quasi| {
                let cooked = quasi.cooked.as_ref().map_or(Value::Null, |c| Value::from(c.as_str()));
                self.node(
                    "TemplateElement",
                    quasi.span,
                    vec![
                        ("value", json!({ "raw": quasi.raw.as_str(), "cooked": cooked })),
                        ("tail", Value::Bool(quasi.tail)),
                    ],
                )
            })
            .collect();
        let expressions = template.expressions.iter().map(|e| self.expression(e)).collect();
        self.node(
            "TemplateLiteral",
            template.span,
            vec![("expressions", Value::Array(expressions)), ("quasis", Value::Array(quasis))],
        )
    }

    fn property_key(&self, key: &PropertyKey) -> Value {
        match key {
            PropertyKey::Identifier(id) => self.identifier(id),
            PropertyKey::Literal(lit) => self.literal(lit),
            PropertyKey::Private(id) => self.private_identifier(id),
            PropertyKey::Computed(expr) => self.expression(expr),
        }
    }

    fn expression(&self, expr: &Expression) -> Value {
        match expr {
            Expression::Identifier(id) => self.identifier(id),
            Expression::Literal(lit) => self.literal(lit),
            Expression::This(span) => self.node("ThisExpression", *span, vec![]),
            Expression::Super(span) => self.node("Super", *span, vec![]),
            Expression::Array(array) => {
                let elements = array
                    .elements
                    .iter()
                    .map(|element| element.as_ref().map_or(Value::Null, |e| self.expression_or_spread(e)))
                    .collect();
                self.node("ArrayExpression", array.span, vec![("elements", Value::Array(elements))])
            }
            Expression::Object(object) => {
                let properties = object
                    .properties
                    .iter()
                    .map(|member| match member {
                        ObjectMember::Property(prop) => self.node(
                            "Property",
                            prop.span,
                            vec![
                                ("method", Value::Bool(prop.method)),
                                ("shorthand", Value::Bool(prop.shorthand)),
                                ("computed", Value::Bool(prop.key.is_computed())),
                                ("key", self.property_key(&prop.key)),
                                ("value", self.expression(&prop.value)),
                                ("kind", Value::from(prop.kind.as_str())),
                            ],
                        ),
                        ObjectMember::Spread(spread) => self.spread(spread),
                    })
                    .collect();
                self.node("ObjectExpression", object.span, vec![("properties", Value::Array(properties))])
            }
            Expression::Function(function) => self.function("FunctionExpression", function),
            Expression::ArrowFunction(arrow) => {
                let (is_expression, body) = match &arrow.body {
                    ArrowFunctionBody::Expression(expr) => (true, self.expression(expr)),
                    ArrowFunctionBody::Block(block) => (false, self.block(block)),
                };
                self.node(
                    "ArrowFunctionExpression",
                    arrow.span,
                    vec![
                        ("id", Value::Null),
                        ("expression", Value::Bool(is_expression)),
                        ("generator", Value::Bool(false)),
                        ("async", Value::Bool(arrow.async_)),
                        ("params", self.patterns(&arrow.params)),
                        ("body", body),
                    ],
                )
            }
            Expression::Class(class) => self.class("ClassExpression", class),
            Expression::TemplateLiteral(template) => self.template_literal(template),
            Expression::TaggedTemplate(tagged) => self.node(
                "TaggedTemplateExpression",
                tagged.span,
                vec![("tag", self.expression(&tagged.tag)), ("quasi", self.template_literal(&tagged.quasi))],
            ),
            Expression::Member(member) => {
                let (computed, property) = match &member.property {
                    MemberProperty::Identifier(id) => (false, self.identifier(id)),
                    MemberProperty::Private(id) => (false, self.private_identifier(id)),
                    MemberProperty::Computed(expr) => (true, self.expression(expr)),
                };
                self.node(
                    "MemberExpression",
                    member.span,
                    vec![
                        ("object", self.expression(&member.object)),
                        ("property", property),
                        ("computed", Value::Bool(computed)),
                        ("optional", Value::Bool(member.optional)),
                    ],
                )
            }
            Expression::Call(call) => self.node(
                "CallExpression",
                call.span,
                vec![
                    ("callee", self.expression(&call.callee)),
                    ("arguments", self.expressions_or_spreads(&call.arguments)),
                    ("optional", Value::Bool(call.optional)),
                ],
            ),
            Expression::New(new) => self.node(
                "NewExpression",
                new.span,
                vec![
                    ("callee", self.expression(&new.callee)),
                    ("arguments", self.expressions_or_spreads(&new.arguments)),
                ],
            ),
            Expression::Chain(chain) => self.node(
                "ChainExpression",
                chain.span,
                vec![("expression", self.expression(&chain.expression))],
            ),
            Expression::Unary(unary) => self.node(
                "UnaryExpression",
                unary.span,
                vec![
                    ("operator", Value::from(unary.operator.as_str())),
                    ("prefix", Value::Bool(true)),
                    ("argument", self.expression(&unary.argument)),
                ],
            ),
            Expression::Update(update) => self.node(
                "UpdateExpression",
                update.span,
                vec![
                    ("operator", Value::from(update.operator.as_str())),
                    ("prefix", Value::Bool(update.prefix)),
                    ("argument", self.expression(&update.argument)),
                ],
            ),
            Expression::Binary(binary) => self.node(
                "BinaryExpression",
                binary.span,
                vec![
                    ("left", self.expression(&binary.left)),
                    ("operator", Value::from(binary.operator.as_str())),
                    ("right", self.expression(&binary.right)),
                ],
            ),
            Expression::Logical(logical) => self.node(
                "LogicalExpression",
                logical.span,
                vec![
                    ("left", self.expression(&logical.left)),
                    ("operator", Value::from(logical.operator.as_str())),
                    ("right", self.expression(&logical.right)),
                ],
            ),
            Expression::Conditional(cond) => self.node(
                "ConditionalExpression",
                cond.span,
                vec![
                    ("test", self.expression(&cond.test)),
                    ("consequent", self.expression(&cond.consequent)),
                    ("alternate", self.expression(&cond.alternate)),
                ],
            ),
            Expression::Assignment(assign) => self.node(
                "AssignmentExpression",
                assign.span,
                vec![
                    ("operator", Value::from(assign.operator.as_str())),
                    ("left", self.pattern(&assign.left)),
                    ("right", self.expression(&assign.right)),
                ],
            ),
            Expression::Sequence(seq) => {
                let expressions = seq.expressions.iter().map(|e| self.expression(e)).collect();
                self.node("SequenceExpression", seq.span, vec![("expressions", Value::Array(expressions))])
            }
            Expression::Yield(expr) => self.node(
                "YieldExpression",
                expr.span,
                vec![
                    ("delegate", Value::Bool(expr.delegate)),
                    ("argument", self.optional_expression(expr.argument.as_deref())),
                ],
            ),
            Expression::Await(expr) => self.node(
                "AwaitExpression",
                expr.span,
                vec![("argument", self.expression(&expr.argument))],
            ),
            Expression::MetaProperty(meta) => self.node(
                "MetaProperty",
                meta.span,
                vec![("meta", self.identifier(&meta.meta)), ("property", self.identifier(&meta.property))],
            ),
            Expression::Import(import) => self.node(
                "ImportExpression",
                import.span,
                vec![("source", self.expression(&import.source))],
            ),
            Expression::PrivateIdentifier(id) => self.private_identifier(id),
            Expression::Parenthesized(paren) => self.expression(&paren.expression),
        }
    }

    // ============ PATTERNS ============

    fn patterns(&self, patterns: &[Pattern]) -> Value {
        Value::Array(patterns.iter().map(|p| self.pattern(p)).collect())
    }

    fn pattern(&self, pattern: &Pattern) -> Value {
        match pattern {
            Pattern::Identifier(id) => self.identifier(id),
            Pattern::Member(expr) => self.expression(expr),
            Pattern::Object(object) => {
                let properties = object
                    .properties
                    .iter()
                    .map(|prop| match prop {
                        ObjectPatternProperty::Property {
                            key,
                            value,
                            shorthand,
                            span,
                        } => self.node(
                            "Property",
                            *span,
                            vec![
                                ("method", Value::Bool(false)),
                                ("shorthand", Value::Bool(*shorthand)),
                                ("computed", Value::Bool(key.is_computed())),
                                ("key", self.property_key(key)),
                                ("value", self.pattern(value)),
                                ("kind", Value::from("init")),
                            ],
                        ),
                        ObjectPatternProperty::Rest(rest) => self.rest(rest),
                    })
                    .collect();
                self.node("ObjectPattern", object.span, vec![("properties", Value::Array(properties))])
            }
            Pattern::Array(array) => {
                let elements = array
                    .elements
                    .iter()
                    .map(|element| element.as_ref().map_or(Value::Null, |p| self.pattern(p)))
                    .collect();
                self.node("ArrayPattern", array.span, vec![("elements", Value::Array(elements))])
            }
            Pattern::Assignment(assign) => self.node(
                "AssignmentPattern",
                assign.span,
                vec![("left", self.pattern(&assign.left)), ("right", self.expression(&assign.right))],
            ),
            Pattern::Rest(rest) => self.rest(rest),
        }
    }

    fn rest(&self, rest: &RestElement) -> Value {
        self.node("RestElement", rest.span, vec![("argument", self.pattern(&rest.argument))])
    }
}

/// Integral numbers render without a fraction, as JavaScript prints them.
fn number_value(n: f64) -> Value {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Value::from(n as i64);
    }
    serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
}
