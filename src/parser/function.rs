//! Functions, methods, arrow functions and classes.

use super::expression::is_property_name_start;
use super::pattern::PatternMode;
use super::{Parser, PrivateNameScope};
use crate::ast::*;
use crate::context::Context;
use crate::error::{ErrorKind, ParseError};
use crate::lexer::{Span, TokenKind};
use crate::scope::{BindingKind, ScopeKind};
use crate::string_dict::Atom;

/// Where a `function` keyword was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionPosition {
    Declaration,
    /// `export default function` may omit the name
    DefaultExport,
    Expression,
}

/// How strictly a parameter list is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamsKind {
    /// Plain `function`: duplicate names allowed in sloppy simple lists
    Function,
    Method,
    Getter,
    Setter,
}

impl<'a> Parser<'a> {
    pub(super) fn parse_function_declaration(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        let function = self.parse_function(ctx, FunctionPosition::Declaration)?;
        Ok(Statement::FunctionDeclaration(Box::new(function)))
    }

    pub(super) fn parse_default_export_function(&mut self, ctx: Context) -> Result<Function, ParseError> {
        self.parse_function(ctx, FunctionPosition::DefaultExport)
    }

    pub(super) fn parse_function_expression(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        let function = self.parse_function(ctx, FunctionPosition::Expression)?;
        Ok(Expression::Function(Box::new(function)))
    }

    /// `[async] function [*] [name] (params) { body }`
    fn parse_function(&mut self, ctx: Context, position: FunctionPosition) -> Result<Function, ParseError> {
        let start = self.current.span;
        let is_async = self.check_contextual("async");
        if is_async {
            self.advance()?;
        }
        self.require_token(&TokenKind::Function)?;
        let is_generator = self.match_token(&TokenKind::Star)?;

        let has_name = matches!(self.current.kind, TokenKind::Identifier(_));
        let id = match position {
            FunctionPosition::Declaration => Some(self.parse_binding_identifier(ctx)?),
            FunctionPosition::DefaultExport if has_name => Some(self.parse_binding_identifier(ctx)?),
            FunctionPosition::Expression if has_name => {
                // The name of a function expression is bound inside it
                let name_ctx = Context {
                    allow_yield: is_generator,
                    allow_await: is_async,
                    ..ctx
                };
                Some(self.parse_binding_identifier(name_ctx)?)
            }
            _ => None,
        };

        if position != FunctionPosition::Expression {
            if let Some(id) = &id {
                let kind = if is_async || is_generator {
                    BindingKind::AsyncOrGeneratorFunction
                } else {
                    BindingKind::Function
                };
                self.declare_name(id, kind, ctx)?;
            }
        }

        let fn_ctx = ctx.enter_function(is_async, is_generator);
        let (params, body) = self.parse_params_and_body(fn_ctx, ParamsKind::Function, id.as_ref())?;

        Ok(Function {
            id,
            params,
            body,
            generator: is_generator,
            async_: is_async,
            span: self.span_from(start),
        })
    }

    /// Parameters and body of an object or class method, starting at `(`.
    pub(super) fn parse_method(
        &mut self,
        ctx: Context,
        start: Span,
        is_async: bool,
        is_generator: bool,
        accessor: Option<MethodKind>,
        super_call: bool,
    ) -> Result<Function, ParseError> {
        let method_ctx = ctx.enter_method(is_async, is_generator, super_call);
        let kind = match accessor {
            Some(MethodKind::Get) => ParamsKind::Getter,
            Some(MethodKind::Set) => ParamsKind::Setter,
            _ => ParamsKind::Method,
        };
        let (params, body) = self.parse_params_and_body(method_ctx, kind, None)?;

        Ok(Function {
            id: None,
            params,
            body,
            generator: is_generator,
            async_: is_async,
            span: self.span_from(start),
        })
    }

    /// Formal parameters and body of a non-arrow function, in a scope of
    /// their own. `name` is re-checked if the body turns out to be strict.
    fn parse_params_and_body(
        &mut self,
        fn_ctx: Context,
        kind: ParamsKind,
        name: Option<&Identifier>,
    ) -> Result<(Vec<Pattern>, BlockStatement), ParseError> {
        self.with_function_state(|p| {
            p.push_scope(ScopeKind::Function);
            let result = p.parse_params_and_body_in_scope(fn_ctx, kind, name);
            p.pop_scope();
            result
        })
    }

    fn parse_params_and_body_in_scope(
        &mut self,
        fn_ctx: Context,
        kind: ParamsKind,
        name: Option<&Identifier>,
    ) -> Result<(Vec<Pattern>, BlockStatement), ParseError> {
        let params_start = self.current.span;
        let params = self.parse_formal_parameters(fn_ctx.with_parameters(true))?;

        match kind {
            ParamsKind::Getter if !params.is_empty() => {
                return Err(ParseError::new(
                    ErrorKind::UnexpectedToken,
                    "Getter must not have any formal parameters",
                    params_start,
                ));
            }
            ParamsKind::Setter if params.len() != 1 || matches!(params.first(), Some(Pattern::Rest(_))) => {
                return Err(ParseError::new(
                    ErrorKind::UnexpectedToken,
                    "Setter must have exactly one formal parameter",
                    params_start,
                ));
            }
            _ => {}
        }

        let names = bound_param_names(&params);
        for (param, span) in &names {
            self.scopes.declare(param, BindingKind::Param, *span, fn_ctx.annex_b())?;
        }

        let body_start = self.current.span;
        self.require_token(&TokenKind::LBrace)?;
        let (statements, use_strict) = self.parse_body_with_directives(fn_ctx, false)?;
        self.require_token(&TokenKind::RBrace)?;
        let body = BlockStatement {
            body: statements,
            span: self.span_from(body_start),
        };

        let simple = params.iter().all(Pattern::is_simple);
        if use_strict && !simple {
            return Err(ParseError::new(
                ErrorKind::StrictModeViolation,
                "Illegal 'use strict' directive in function with non-simple parameter list",
                body_start,
            ));
        }

        let strict = fn_ctx.strict || use_strict;
        if strict || !simple || kind != ParamsKind::Function {
            check_duplicate_params(&names)?;
        }

        if use_strict {
            let strict_ctx = fn_ctx.with_strict(true);
            if let Some(id) = name {
                self.check_binding_identifier(&id.name, false, id.span, strict_ctx)?;
            }
            for (param, span) in &names {
                self.check_binding_identifier(param, false, *span, strict_ctx)?;
            }
        }

        Ok((params, body))
    }

    /// `( a, b = 1, ...rest )`
    fn parse_formal_parameters(&mut self, ctx: Context) -> Result<Vec<Pattern>, ParseError> {
        self.require_token(&TokenKind::LParen)?;

        let mut params = vec![];
        while !self.check(&TokenKind::RParen) {
            if self.check(&TokenKind::DotDotDot) {
                let rest_start = self.current.span;
                self.advance()?;
                let argument = self.parse_binding_target(ctx)?;
                if self.check(&TokenKind::Eq) {
                    return Err(self.error(
                        ErrorKind::InvalidDestructuringTarget,
                        "Rest parameter may not have a default initializer",
                    ));
                }
                if !self.check(&TokenKind::RParen) {
                    return Err(self.error(
                        ErrorKind::UnexpectedToken,
                        "Rest parameter must be last formal parameter",
                    ));
                }
                params.push(Pattern::Rest(RestElement {
                    argument: Box::new(argument),
                    span: self.span_from(rest_start),
                }));
                break;
            }

            params.push(self.parse_binding_element(ctx)?);
            if !self.check(&TokenKind::RParen) {
                self.require_token(&TokenKind::Comma)?;
            }
        }

        self.require_token(&TokenKind::RParen)?;
        Ok(params)
    }

    // ============ ARROW FUNCTIONS ============

    /// Finish an arrow function whose head has been read as `items` (and an
    /// optional rest parameter). The current token is `=>`. `cover_mark` is
    /// the cover error count before the head was read.
    pub(super) fn parse_arrow_function(
        &mut self,
        ctx: Context,
        start: Span,
        items: Vec<Expression>,
        rest: Option<RestElement>,
        is_async: bool,
        cover_mark: usize,
    ) -> Result<Expression, ParseError> {
        let mut params = Vec::with_capacity(items.len() + 1);
        for item in items {
            params.push(self.reinterpret_as_pattern(item, PatternMode::Binding, ctx)?);
        }
        if let Some(rest) = rest {
            params.push(Pattern::Rest(rest));
        }
        self.check_cover_errors(cover_mark)?;

        if let Some(span) = self.yield_await.iter().find(|span| span.start >= start.start) {
            return Err(ParseError::new(
                ErrorKind::UnexpectedToken,
                "Arrow parameters cannot contain yield or await expressions",
                *span,
            ));
        }

        let names = bound_param_names(&params);
        check_duplicate_params(&names)?;
        if is_async {
            if let Some((_, span)) = names.iter().find(|(name, _)| *name == "await") {
                return Err(ParseError::new(
                    ErrorKind::ReservedWordUsage,
                    "'await' is not a valid parameter name in an async function",
                    *span,
                ));
            }
        }

        self.require_token(&TokenKind::Arrow)?;
        let arrow_ctx = ctx.enter_arrow(is_async);
        let body = self.with_function_state(|p| {
            p.push_scope(ScopeKind::Function);
            let result = p.parse_arrow_body(ctx, arrow_ctx, &params, &names);
            p.pop_scope();
            result
        })?;

        Ok(Expression::ArrowFunction(Box::new(ArrowFunctionExpression {
            params,
            body,
            async_: is_async,
            span: self.span_from(start),
        })))
    }

    fn parse_arrow_body(
        &mut self,
        ctx: Context,
        arrow_ctx: Context,
        params: &[Pattern],
        names: &[(Atom, Span)],
    ) -> Result<ArrowFunctionBody, ParseError> {
        for (name, span) in names {
            self.scopes.declare(name, BindingKind::Param, *span, arrow_ctx.annex_b())?;
        }

        if !self.check(&TokenKind::LBrace) {
            let expr = self.parse_assignment_expression(arrow_ctx.with_in(ctx.allow_in))?;
            return Ok(ArrowFunctionBody::Expression(Box::new(expr)));
        }

        let body_start = self.current.span;
        self.advance()?;
        let (statements, use_strict) = self.parse_body_with_directives(arrow_ctx, false)?;
        self.require_token(&TokenKind::RBrace)?;

        if use_strict {
            if !params.iter().all(Pattern::is_simple) {
                return Err(ParseError::new(
                    ErrorKind::StrictModeViolation,
                    "Illegal 'use strict' directive in function with non-simple parameter list",
                    body_start,
                ));
            }
            let strict_ctx = arrow_ctx.with_strict(true);
            for (name, span) in names {
                self.check_binding_identifier(name, false, *span, strict_ctx)?;
            }
        }

        Ok(ArrowFunctionBody::Block(BlockStatement {
            body: statements,
            span: self.span_from(body_start),
        }))
    }

    // ============ CLASSES ============

    /// `class [name] [extends expr] { members }`. Class code is always
    /// strict.
    pub(super) fn parse_class(
        &mut self,
        ctx: Context,
        is_declaration: bool,
        name_optional: bool,
    ) -> Result<Class, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Class)?;
        let class_ctx = ctx.with_strict(true);

        let id = if matches!(self.current.kind, TokenKind::Identifier(_)) {
            Some(self.parse_binding_identifier(class_ctx)?)
        } else if is_declaration && !name_optional {
            return Err(self.unexpected_token("class name"));
        } else {
            None
        };
        if is_declaration {
            if let Some(id) = &id {
                self.declare_name(id, BindingKind::Class, ctx)?;
            }
        }

        let super_class = if self.match_token(&TokenKind::Extends)? {
            let mark = self.cover_errors.len();
            let heritage = self.parse_lhs(class_ctx)?;
            self.check_cover_errors(mark)?;
            Some(Box::new(heritage))
        } else {
            None
        };

        let body = self.parse_class_body(class_ctx, super_class.is_some())?;

        Ok(Class {
            id,
            super_class,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_class_body(&mut self, ctx: Context, derived: bool) -> Result<ClassBody, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBrace)?;

        self.private_names.push(PrivateNameScope::default());
        let members = self.parse_class_members(ctx, derived);
        let private_scope = self.private_names.pop().unwrap_or_default();
        let members = members?;
        self.require_token(&TokenKind::RBrace)?;

        // References to names this class does not declare belong to an
        // enclosing class, if there is one
        for (name, span) in private_scope.used {
            if private_scope.declared.iter().any(|(declared, _, _)| *declared == name) {
                continue;
            }
            match self.private_names.last_mut() {
                Some(outer) => outer.used.push((name, span)),
                None => {
                    return Err(ParseError::new(
                        ErrorKind::UnexpectedToken,
                        format!("Private field '#{}' must be declared in an enclosing class", name),
                        span,
                    ));
                }
            }
        }

        Ok(ClassBody {
            members,
            span: self.span_from(start),
        })
    }

    fn parse_class_members(&mut self, ctx: Context, derived: bool) -> Result<Vec<ClassMember>, ParseError> {
        let mut members = vec![];
        let mut has_constructor = false;

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if self.match_token(&TokenKind::Semicolon)? {
                continue;
            }

            let member = self.parse_class_member(ctx, derived)?;
            if let ClassMember::Method(method) = &member {
                if method.kind == MethodKind::Constructor {
                    if has_constructor {
                        return Err(ParseError::new(
                            ErrorKind::UnexpectedToken,
                            "A class may only have one constructor",
                            method.key.span(),
                        ));
                    }
                    has_constructor = true;
                }
            }
            members.push(member);
        }

        Ok(members)
    }

    fn parse_class_member(&mut self, ctx: Context, derived: bool) -> Result<ClassMember, ParseError> {
        let start = self.current.span;

        let mut is_static = false;
        if self.check_contextual("static") {
            let next = self.peek_token()?;
            if next.kind == TokenKind::LBrace {
                return self.parse_static_block(ctx, start);
            }
            if is_property_name_start(&next.kind) || next.kind == TokenKind::Star {
                is_static = true;
                self.advance()?;
            }
        }

        let mut accessor = None;
        let mut is_async = false;
        if self.check_contextual("get") || self.check_contextual("set") {
            let next = self.peek_token()?;
            if is_property_name_start(&next.kind) {
                accessor = Some(if self.check_contextual("get") {
                    MethodKind::Get
                } else {
                    MethodKind::Set
                });
                self.advance()?;
            }
        } else if self.check_contextual("async") {
            let next = self.peek_token()?;
            if !next.newline_before && (is_property_name_start(&next.kind) || next.kind == TokenKind::Star) {
                is_async = true;
                self.advance()?;
            }
        }
        let is_generator = accessor.is_none() && self.match_token(&TokenKind::Star)?;

        let key = self.parse_property_key(ctx, true)?;
        if let PropertyKey::Private(private) = &key {
            if private.name == "constructor" {
                return Err(ParseError::new(
                    ErrorKind::UnexpectedToken,
                    "Classes may not have a private field named '#constructor'",
                    private.span,
                ));
            }
        }
        let key_name = key.static_name();
        if is_static && key_name == Some("prototype") {
            return Err(ParseError::new(
                ErrorKind::UnexpectedToken,
                "Classes may not have a static property named 'prototype'",
                key.span(),
            ));
        }

        if accessor.is_some() || is_async || is_generator || self.check(&TokenKind::LParen) {
            let is_constructor = !is_static && key_name == Some("constructor");
            if is_constructor && (accessor.is_some() || is_async || is_generator) {
                return Err(ParseError::new(
                    ErrorKind::UnexpectedToken,
                    "Class constructor may not be an accessor, generator or async method",
                    key.span(),
                ));
            }

            let value_start = self.current.span;
            let value = self.parse_method(
                ctx,
                value_start,
                is_async,
                is_generator,
                accessor,
                is_constructor && derived,
            )?;
            if let PropertyKey::Private(private) = &key {
                self.declare_private_name(&private.name, accessor, is_static, private.span)?;
            }

            let kind = if is_constructor {
                MethodKind::Constructor
            } else {
                accessor.unwrap_or(MethodKind::Method)
            };
            return Ok(ClassMember::Method(MethodDefinition {
                key,
                value,
                kind,
                static_: is_static,
                span: self.span_from(start),
            }));
        }

        if key_name == Some("constructor") {
            return Err(ParseError::new(
                ErrorKind::UnexpectedToken,
                "Classes may not have a field named 'constructor'",
                key.span(),
            ));
        }
        if let PropertyKey::Private(private) = &key {
            self.declare_private_name(&private.name, None, is_static, private.span)?;
        }

        let value = if self.match_token(&TokenKind::Eq)? {
            let field_ctx = ctx.enter_class_field();
            Some(self.with_function_state(|p| {
                p.push_scope(ScopeKind::Function);
                let value = p.parse_assignment_expression(field_ctx);
                p.pop_scope();
                value
            })?)
        } else {
            None
        };
        self.expect_semicolon()?;

        Ok(ClassMember::Property(PropertyDefinition {
            key,
            value,
            static_: is_static,
            span: self.span_from(start),
        }))
    }

    /// `static { statements }`
    fn parse_static_block(&mut self, ctx: Context, start: Span) -> Result<ClassMember, ParseError> {
        self.advance()?;
        self.require_token(&TokenKind::LBrace)?;

        let block_ctx = ctx.enter_static_block();
        let body = self.with_function_state(|p| {
            p.push_scope(ScopeKind::StaticBlock);
            let body = p.parse_statement_list(block_ctx);
            p.pop_scope();
            body
        })?;
        self.require_token(&TokenKind::RBrace)?;

        Ok(ClassMember::StaticBlock(StaticBlock {
            body,
            span: self.span_from(start),
        }))
    }

    /// A private name may be declared once, or twice as a getter/setter
    /// pair with the same placement.
    fn declare_private_name(
        &mut self,
        name: &Atom,
        accessor: Option<MethodKind>,
        is_static: bool,
        span: Span,
    ) -> Result<(), ParseError> {
        let Some(scope) = self.private_names.last_mut() else {
            return Ok(());
        };

        let mut previous = scope.declared.iter().filter(|(declared, _, _)| declared == name);
        let first = previous.next().map(|(_, kind, was_static)| (*kind, *was_static));
        let more = previous.next().is_some();
        let allowed = match (first, more) {
            (None, _) => true,
            (Some((Some(prev), was_static)), false) => {
                was_static == is_static
                    && matches!(
                        (prev, accessor),
                        (MethodKind::Get, Some(MethodKind::Set)) | (MethodKind::Set, Some(MethodKind::Get))
                    )
            }
            _ => false,
        };
        if !allowed {
            return Err(ParseError::new(
                ErrorKind::DuplicateBinding,
                format!("Identifier '#{}' has already been declared", name),
                span,
            ));
        }

        scope.declared.push((name.clone(), accessor, is_static));
        Ok(())
    }
}

/// Names bound by a parameter list, in source order.
fn bound_param_names(params: &[Pattern]) -> Vec<(Atom, Span)> {
    let mut ids = Vec::new();
    for param in params {
        param.bound_names(&mut ids);
    }
    ids.into_iter().map(|id| (id.name.clone(), id.span)).collect()
}

fn check_duplicate_params(names: &[(Atom, Span)]) -> Result<(), ParseError> {
    for (index, (name, span)) in names.iter().enumerate() {
        if names.iter().take(index).any(|(earlier, _)| earlier == name) {
            return Err(ParseError::new(
                ErrorKind::DuplicateBinding,
                format!("Duplicate parameter name '{}' not allowed in this context", name),
                *span,
            ));
        }
    }
    Ok(())
}
