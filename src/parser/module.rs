//! `import` and `export` declarations.

use super::Parser;
use crate::ast::*;
use crate::context::Context;
use crate::error::{ErrorKind, ParseError};
use crate::lexer::{Span, TokenKind};
use crate::scope::BindingKind;
use crate::string_dict::Atom;

impl<'a> Parser<'a> {
    /// `import ... from "source";` or `import "source";`
    pub(super) fn parse_import_declaration(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Import)?;

        let mut specifiers = vec![];
        if !matches!(self.current.kind, TokenKind::String(_)) {
            if matches!(self.current.kind, TokenKind::Identifier(_)) {
                let local = self.parse_binding_identifier(ctx)?;
                let span = local.span;
                specifiers.push(ImportSpecifier::Default { local, span });
                if !self.match_token(&TokenKind::Comma)? {
                    self.require_contextual("from")?;
                    return self.finish_import(ctx, start, specifiers);
                }
            }

            if self.check(&TokenKind::Star) {
                let ns_start = self.current.span;
                self.advance()?;
                self.require_contextual("as")?;
                let local = self.parse_binding_identifier(ctx)?;
                specifiers.push(ImportSpecifier::Namespace {
                    local,
                    span: self.span_from(ns_start),
                });
            } else if self.check(&TokenKind::LBrace) {
                self.parse_named_imports(ctx, &mut specifiers)?;
            } else {
                return Err(self.unexpected_token("import specifier"));
            }
            self.require_contextual("from")?;
        }

        self.finish_import(ctx, start, specifiers)
    }

    /// Source, semicolon and local bindings of an import declaration.
    fn finish_import(
        &mut self,
        ctx: Context,
        start: Span,
        specifiers: Vec<ImportSpecifier>,
    ) -> Result<Statement, ParseError> {
        let source = self.parse_module_source()?;
        self.expect_semicolon()?;

        for specifier in &specifiers {
            self.declare_name(specifier.local(), BindingKind::Import, ctx)?;
        }

        Ok(Statement::Import(ImportDeclaration {
            specifiers,
            source,
            span: self.span_from(start),
        }))
    }

    /// `{ a, b as c, "d" as e }`
    fn parse_named_imports(&mut self, ctx: Context, specifiers: &mut Vec<ImportSpecifier>) -> Result<(), ParseError> {
        self.require_token(&TokenKind::LBrace)?;

        while !self.check(&TokenKind::RBrace) {
            let spec_start = self.current.span;
            let token = self.current.clone();
            let imported = self.parse_module_export_name()?;

            let local = if self.check_contextual("as") {
                self.advance()?;
                self.parse_binding_identifier(ctx)?
            } else {
                // Without `as` the imported name is also the local binding
                let ModuleExportName::Identifier(id) = &imported else {
                    return Err(self.unexpected_token("'as'"));
                };
                if !matches!(token.kind, TokenKind::Identifier(_)) {
                    return Err(ParseError::new(
                        ErrorKind::ReservedWordUsage,
                        format!("Unexpected keyword '{}'", id.name),
                        id.span,
                    ));
                }
                self.check_binding_identifier(&id.name, token.escaped, id.span, ctx)?;
                id.clone()
            };

            specifiers.push(ImportSpecifier::Named {
                imported,
                local,
                span: self.span_from(spec_start),
            });

            if !self.check(&TokenKind::RBrace) {
                self.require_token(&TokenKind::Comma)?;
            }
        }

        self.require_token(&TokenKind::RBrace)
    }

    pub(super) fn parse_export_declaration(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Export)?;

        match &self.current.kind {
            TokenKind::Star => self.parse_export_all(start),
            TokenKind::LBrace => self.parse_export_named_list(ctx, start),
            TokenKind::Default => self.parse_export_default(ctx, start),
            _ => self.parse_export_declaration_statement(ctx, start),
        }
    }

    /// `export * from "m";` or `export * as name from "m";`
    fn parse_export_all(&mut self, start: Span) -> Result<Statement, ParseError> {
        self.require_token(&TokenKind::Star)?;

        let exported = if self.check_contextual("as") {
            self.advance()?;
            let name = self.parse_module_export_name()?;
            self.add_export_name(name.name(), name.span())?;
            Some(name)
        } else {
            None
        };

        self.require_contextual("from")?;
        let source = self.parse_module_source()?;
        self.expect_semicolon()?;

        Ok(Statement::ExportAll(ExportAllDeclaration {
            exported,
            source,
            span: self.span_from(start),
        }))
    }

    /// `export { a, b as c } [from "m"];`
    fn parse_export_named_list(&mut self, ctx: Context, start: Span) -> Result<Statement, ParseError> {
        self.require_token(&TokenKind::LBrace)?;

        let mut specifiers = vec![];
        // A local that is only acceptable when re-exporting from another module
        let mut invalid_local: Option<ParseError> = None;
        while !self.check(&TokenKind::RBrace) {
            let spec_start = self.current.span;
            let token = self.current.clone();
            let local = self.parse_module_export_name()?;

            if invalid_local.is_none() {
                invalid_local = match &local {
                    ModuleExportName::String(lit) => Some(ParseError::new(
                        ErrorKind::UnexpectedToken,
                        "A string literal cannot be used as an exported binding without 'from'",
                        lit.span,
                    )),
                    ModuleExportName::Identifier(id) => {
                        if matches!(token.kind, TokenKind::Identifier(_)) {
                            self.check_identifier_reference(&id.name, token.escaped, id.span, ctx).err()
                        } else {
                            Some(ParseError::new(
                                ErrorKind::ReservedWordUsage,
                                format!("Unexpected keyword '{}'", id.name),
                                id.span,
                            ))
                        }
                    }
                };
            }

            let exported = if self.check_contextual("as") {
                self.advance()?;
                self.parse_module_export_name()?
            } else {
                local.clone()
            };
            self.add_export_name(exported.name(), exported.span())?;

            specifiers.push(ExportSpecifier {
                local,
                exported,
                span: self.span_from(spec_start),
            });

            if !self.check(&TokenKind::RBrace) {
                self.require_token(&TokenKind::Comma)?;
            }
        }
        self.require_token(&TokenKind::RBrace)?;

        let source = if self.check_contextual("from") {
            self.advance()?;
            Some(self.parse_module_source()?)
        } else {
            if let Some(err) = invalid_local {
                return Err(err);
            }
            for specifier in &specifiers {
                self.local_exports
                    .push((specifier.local.name(), specifier.local.span()));
            }
            None
        };
        self.expect_semicolon()?;

        Ok(Statement::ExportNamed(ExportNamedDeclaration {
            declaration: None,
            specifiers,
            source,
            span: self.span_from(start),
        }))
    }

    /// `export default function ...`, `export default class ...` or
    /// `export default expression;`
    fn parse_export_default(&mut self, ctx: Context, start: Span) -> Result<Statement, ParseError> {
        let default_span = self.current.span;
        self.require_token(&TokenKind::Default)?;
        let default_name = self.intern("default");
        self.add_export_name(default_name, default_span)?;

        let async_function = self.check_contextual("async") && self.async_function_ahead()?;
        let declaration = if async_function || self.check(&TokenKind::Function) {
            ExportDefaultKind::Function(Box::new(self.parse_default_export_function(ctx)?))
        } else if self.check(&TokenKind::Class) {
            ExportDefaultKind::Class(Box::new(self.parse_class(ctx, true, true)?))
        } else {
            let expr = self.parse_assignment_expression(ctx.with_in(true))?;
            self.expect_semicolon()?;
            ExportDefaultKind::Expression(expr)
        };

        Ok(Statement::ExportDefault(ExportDefaultDeclaration {
            declaration,
            span: self.span_from(start),
        }))
    }

    /// `export var|let|const|function|class ...`
    fn parse_export_declaration_statement(&mut self, ctx: Context, start: Span) -> Result<Statement, ParseError> {
        let async_function = self.check_contextual("async") && self.async_function_ahead()?;
        let declaration = if async_function {
            self.parse_function_declaration(ctx)?
        } else if self.check_contextual("let") {
            self.parse_variable_statement(ctx, VariableKind::Let)?
        } else {
            match &self.current.kind {
                TokenKind::Var => self.parse_variable_statement(ctx, VariableKind::Var)?,
                TokenKind::Const => self.parse_variable_statement(ctx, VariableKind::Const)?,
                TokenKind::Function => self.parse_function_declaration(ctx)?,
                TokenKind::Class => {
                    let class = self.parse_class(ctx, true, false)?;
                    Statement::ClassDeclaration(Box::new(class))
                }
                _ => return Err(self.unexpected_token("declaration after 'export'")),
            }
        };

        for (name, span) in declared_names(&declaration) {
            self.add_export_name(name, span)?;
        }

        Ok(Statement::ExportNamed(ExportNamedDeclaration {
            declaration: Some(Box::new(declaration)),
            specifiers: vec![],
            source: None,
            span: self.span_from(start),
        }))
    }

    // ============ HELPERS ============

    /// An identifier name (reserved words included) or a string literal.
    fn parse_module_export_name(&mut self) -> Result<ModuleExportName, ParseError> {
        if let TokenKind::String(value) = &self.current.kind {
            let value = value.clone();
            let span = self.current.span;
            self.advance()?;
            return Ok(ModuleExportName::String(Literal {
                value: LiteralValue::String(value),
                span,
            }));
        }
        Ok(ModuleExportName::Identifier(self.parse_identifier_name()?))
    }

    fn parse_module_source(&mut self) -> Result<Literal, ParseError> {
        let TokenKind::String(value) = &self.current.kind else {
            return Err(self.unexpected_token("module specifier string"));
        };
        let value = value.clone();
        let span = self.current.span;
        self.advance()?;
        Ok(Literal {
            value: LiteralValue::String(value),
            span,
        })
    }

    fn require_contextual(&mut self, word: &str) -> Result<(), ParseError> {
        if self.check_contextual(word) {
            return self.advance();
        }
        Err(self.unexpected_token(&format!("'{}'", word)))
    }

    fn add_export_name(&mut self, name: Atom, span: Span) -> Result<(), ParseError> {
        if self.exported_names.contains(&name) {
            return Err(ParseError::new(
                ErrorKind::DuplicateBinding,
                format!("Duplicate export of '{}'", name),
                span,
            ));
        }
        self.exported_names.insert(name);
        Ok(())
    }
}

/// Names introduced by an exported declaration.
fn declared_names(statement: &Statement) -> Vec<(Atom, Span)> {
    match statement {
        Statement::VariableDeclaration(declaration) => {
            let mut ids = Vec::new();
            for declarator in &declaration.declarations {
                declarator.id.bound_names(&mut ids);
            }
            ids.into_iter().map(|id| (id.name.clone(), id.span)).collect()
        }
        Statement::FunctionDeclaration(function) => {
            function.id.iter().map(|id| (id.name.clone(), id.span)).collect()
        }
        Statement::ClassDeclaration(class) => class.id.iter().map(|id| (id.name.clone(), id.span)).collect(),
        _ => vec![],
    }
}
