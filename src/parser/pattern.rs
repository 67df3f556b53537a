//! Destructuring patterns: parsed directly in binding positions, or
//! reinterpreted from an array/object/parenthesized expression once `=` or
//! `=>` shows a pattern was meant.

use super::{CoverErrorKind, Parser};
use crate::ast::*;
use crate::context::Context;
use crate::error::{ErrorKind, ParseError};
use crate::lexer::TokenKind;

/// Which grammar a reinterpreted expression must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PatternMode {
    /// Declarations and parameters: only identifiers may be bound
    Binding,
    /// Assignment targets: member expressions are allowed too
    Assignment,
}

impl<'a> Parser<'a> {
    // ============ BINDING PATTERNS ============

    /// Identifier, array pattern or object pattern in a binding position.
    pub(super) fn parse_binding_target(&mut self, ctx: Context) -> Result<Pattern, ParseError> {
        self.descend()?;
        let result = match &self.current.kind {
            TokenKind::LBracket => self.parse_array_binding_pattern(ctx),
            TokenKind::LBrace => self.parse_object_binding_pattern(ctx),
            _ => self.parse_binding_identifier(ctx).map(Pattern::Identifier),
        };
        self.ascend();
        result
    }

    /// Binding target with an optional `= default`.
    pub(super) fn parse_binding_element(&mut self, ctx: Context) -> Result<Pattern, ParseError> {
        let start = self.current.span;
        let target = self.parse_binding_target(ctx)?;
        if !self.match_token(&TokenKind::Eq)? {
            return Ok(target);
        }
        let right = self.parse_assignment_expression(ctx.with_in(true))?;
        Ok(Pattern::Assignment(AssignmentPattern {
            left: Box::new(target),
            right: Box::new(right),
            span: self.span_from(start),
        }))
    }

    fn parse_array_binding_pattern(&mut self, ctx: Context) -> Result<Pattern, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBracket)?;

        let mut elements = vec![];
        while !self.check(&TokenKind::RBracket) {
            if self.match_token(&TokenKind::Comma)? {
                elements.push(None);
                continue;
            }

            if self.check(&TokenKind::DotDotDot) {
                let rest_start = self.current.span;
                self.advance()?;
                let argument = self.parse_binding_target(ctx)?;
                if !self.check(&TokenKind::RBracket) {
                    return Err(self.rest_not_last());
                }
                elements.push(Some(Pattern::Rest(RestElement {
                    argument: Box::new(argument),
                    span: self.span_from(rest_start),
                })));
                break;
            }

            elements.push(Some(self.parse_binding_element(ctx)?));
            if !self.check(&TokenKind::RBracket) {
                self.require_token(&TokenKind::Comma)?;
            }
        }
        self.require_token(&TokenKind::RBracket)?;

        Ok(Pattern::Array(ArrayPattern {
            elements,
            span: self.span_from(start),
        }))
    }

    fn parse_object_binding_pattern(&mut self, ctx: Context) -> Result<Pattern, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBrace)?;

        let mut properties = vec![];
        while !self.check(&TokenKind::RBrace) {
            let prop_start = self.current.span;

            if self.match_token(&TokenKind::DotDotDot)? {
                // Object rest only binds a plain identifier
                let argument = self.parse_binding_identifier(ctx)?;
                if !self.check(&TokenKind::RBrace) {
                    return Err(self.rest_not_last());
                }
                properties.push(ObjectPatternProperty::Rest(RestElement {
                    argument: Box::new(Pattern::Identifier(argument)),
                    span: self.span_from(prop_start),
                }));
                break;
            }

            let key_token = self.current.clone();
            let key = self.parse_property_key(ctx, false)?;

            let (value, shorthand) = if self.match_token(&TokenKind::Colon)? {
                (self.parse_binding_element(ctx)?, false)
            } else {
                let PropertyKey::Identifier(id) = &key else {
                    return Err(self.unexpected_token("':'"));
                };
                if !matches!(key_token.kind, TokenKind::Identifier(_)) {
                    return Err(ParseError::new(
                        ErrorKind::ReservedWordUsage,
                        format!("Unexpected keyword '{}'", id.name),
                        id.span,
                    ));
                }
                self.check_binding_identifier(&id.name, key_token.escaped, id.span, ctx)?;
                let target = Pattern::Identifier(id.clone());

                let value = if self.match_token(&TokenKind::Eq)? {
                    let right = self.parse_assignment_expression(ctx.with_in(true))?;
                    Pattern::Assignment(AssignmentPattern {
                        left: Box::new(target),
                        right: Box::new(right),
                        span: self.span_from(prop_start),
                    })
                } else {
                    target
                };
                (value, true)
            };

            properties.push(ObjectPatternProperty::Property {
                key,
                value,
                shorthand,
                span: self.span_from(prop_start),
            });

            if !self.check(&TokenKind::RBrace) {
                self.require_token(&TokenKind::Comma)?;
            }
        }
        self.require_token(&TokenKind::RBrace)?;

        Ok(Pattern::Object(ObjectPattern {
            properties,
            span: self.span_from(start),
        }))
    }

    fn rest_not_last(&self) -> ParseError {
        self.error(
            ErrorKind::InvalidDestructuringTarget,
            "Rest element must be last element",
        )
    }

    // ============ REINTERPRETATION ============

    /// Turn an expression read through the cover grammar into a pattern.
    /// Cover errors owned by literals that become patterns are discarded.
    pub(super) fn reinterpret_as_pattern(
        &mut self,
        expr: Expression,
        mode: PatternMode,
        ctx: Context,
    ) -> Result<Pattern, ParseError> {
        match expr {
            Expression::Identifier(id) => {
                check_target_identifier(&id, ctx)?;
                Ok(Pattern::Identifier(id))
            }
            Expression::Member(member) if mode == PatternMode::Assignment => {
                Ok(Pattern::Member(Box::new(Expression::Member(member))))
            }
            Expression::Parenthesized(paren) if mode == PatternMode::Assignment => {
                let span = paren.span;
                match *paren.expression {
                    inner @ (Expression::Identifier(_) | Expression::Member(_) | Expression::Parenthesized(_)) => {
                        self.simple_assignment_target(inner, ctx)
                    }
                    _ => Err(invalid_target(span)),
                }
            }
            Expression::Array(array) => self.reinterpret_array(array, mode, ctx),
            Expression::Object(object) => self.reinterpret_object(object, mode, ctx),
            Expression::Assignment(assign) if assign.operator == AssignmentOp::Assign => {
                if mode == PatternMode::Binding {
                    revalidate_binding(&assign.left, self, ctx)?;
                }
                Ok(Pattern::Assignment(AssignmentPattern {
                    left: Box::new(assign.left),
                    right: assign.right,
                    span: assign.span,
                }))
            }
            other => Err(invalid_target(other.span())),
        }
    }

    fn reinterpret_array(
        &mut self,
        array: ArrayExpression,
        mode: PatternMode,
        ctx: Context,
    ) -> Result<Pattern, ParseError> {
        let count = array.elements.len();
        let mut elements = Vec::with_capacity(count);

        for (index, element) in array.elements.into_iter().enumerate() {
            let pattern = match element {
                None => None,
                Some(ExpressionOrSpread::Expression(expr)) => Some(self.reinterpret_as_pattern(expr, mode, ctx)?),
                Some(ExpressionOrSpread::Spread(spread)) => {
                    if index + 1 != count || array.trailing_comma.is_some() {
                        return Err(ParseError::new(
                            ErrorKind::InvalidDestructuringTarget,
                            "Rest element must be last element",
                            spread.span,
                        ));
                    }
                    if matches!(spread.argument, Expression::Assignment(_)) {
                        return Err(ParseError::new(
                            ErrorKind::InvalidDestructuringTarget,
                            "Rest element may not have a default initializer",
                            spread.argument.span(),
                        ));
                    }
                    let argument = self.reinterpret_as_pattern(spread.argument, mode, ctx)?;
                    Some(Pattern::Rest(RestElement {
                        argument: Box::new(argument),
                        span: spread.span,
                    }))
                }
            };
            elements.push(pattern);
        }

        Ok(Pattern::Array(ArrayPattern {
            elements,
            span: array.span,
        }))
    }

    fn reinterpret_object(
        &mut self,
        object: ObjectExpression,
        mode: PatternMode,
        ctx: Context,
    ) -> Result<Pattern, ParseError> {
        let count = object.properties.len();
        let mut properties = Vec::with_capacity(count);

        for (index, member) in object.properties.into_iter().enumerate() {
            match member {
                ObjectMember::Property(prop) => {
                    if prop.method || prop.kind != PropertyKind::Init {
                        return Err(invalid_target(prop.span));
                    }

                    let value = if prop.shorthand {
                        match prop.value {
                            Expression::Identifier(id) => {
                                check_target_identifier(&id, ctx)?;
                                Pattern::Identifier(id)
                            }
                            Expression::Assignment(assign) => {
                                self.discard_cover_error(CoverErrorKind::ShorthandInit, prop.span);
                                revalidate_binding(&assign.left, self, ctx)?;
                                Pattern::Assignment(AssignmentPattern {
                                    left: Box::new(assign.left),
                                    right: assign.right,
                                    span: assign.span,
                                })
                            }
                            other => return Err(invalid_target(other.span())),
                        }
                    } else {
                        self.reinterpret_as_pattern(prop.value, mode, ctx)?
                    };

                    properties.push(ObjectPatternProperty::Property {
                        key: prop.key,
                        value,
                        shorthand: prop.shorthand,
                        span: prop.span,
                    });
                }
                ObjectMember::Spread(spread) => {
                    if index + 1 != count || object.trailing_comma.is_some() {
                        return Err(ParseError::new(
                            ErrorKind::InvalidDestructuringTarget,
                            "Rest element must be last element",
                            spread.span,
                        ));
                    }
                    let argument = match mode {
                        PatternMode::Binding => match spread.argument {
                            Expression::Identifier(id) => {
                                check_target_identifier(&id, ctx)?;
                                Pattern::Identifier(id)
                            }
                            other => return Err(invalid_target(other.span())),
                        },
                        PatternMode::Assignment => self
                            .simple_assignment_target(spread.argument, ctx)
                            .map_err(|err| err.recast(ErrorKind::InvalidLeftHandSide, ErrorKind::InvalidDestructuringTarget))?,
                    };
                    properties.push(ObjectPatternProperty::Rest(RestElement {
                        argument: Box::new(argument),
                        span: spread.span,
                    }));
                }
            }
        }

        self.discard_cover_error(CoverErrorKind::DuplicateProto, object.span);
        Ok(Pattern::Object(ObjectPattern {
            properties,
            span: object.span,
        }))
    }

    // ============ ASSIGNMENT TARGETS ============

    /// Left side of `=`: a destructuring pattern or a simple target.
    pub(super) fn to_assignment_target(&mut self, expr: Expression, ctx: Context) -> Result<Pattern, ParseError> {
        match expr {
            Expression::Array(_) | Expression::Object(_) => {
                self.reinterpret_as_pattern(expr, PatternMode::Assignment, ctx)
            }
            other => self.simple_assignment_target(other, ctx),
        }
    }

    /// Left side of a compound assignment: an identifier or member
    /// expression, possibly parenthesized.
    pub(super) fn simple_assignment_target(&mut self, expr: Expression, ctx: Context) -> Result<Pattern, ParseError> {
        self.check_simple_target(
            &expr,
            ctx,
            ErrorKind::InvalidLeftHandSide,
            "Invalid left-hand side in assignment",
        )?;

        let mut expr = expr;
        loop {
            match expr {
                Expression::Parenthesized(paren) => expr = *paren.expression,
                Expression::Identifier(id) => return Ok(Pattern::Identifier(id)),
                Expression::Member(member) => return Ok(Pattern::Member(Box::new(Expression::Member(member)))),
                other => {
                    return Err(ParseError::new(
                        ErrorKind::InvalidLeftHandSide,
                        "Invalid left-hand side in assignment",
                        other.span(),
                    ));
                }
            }
        }
    }

    /// `expr` may be assigned to by `=`, `++`, `--` or a compound operator.
    pub(super) fn check_simple_target(
        &self,
        expr: &Expression,
        ctx: Context,
        kind: ErrorKind,
        message: &str,
    ) -> Result<(), ParseError> {
        match expr.unparenthesized() {
            Expression::Identifier(id) => check_target_identifier(id, ctx),
            Expression::Member(_) => Ok(()),
            _ => Err(ParseError::new(kind, message, expr.span())),
        }
    }
}

fn invalid_target(span: crate::lexer::Span) -> ParseError {
    ParseError::new(
        ErrorKind::InvalidDestructuringTarget,
        "Invalid destructuring assignment target",
        span,
    )
}

/// `eval` and `arguments` cannot be assigned to in strict code.
fn check_target_identifier(id: &Identifier, ctx: Context) -> Result<(), ParseError> {
    if ctx.strict && (id.name == "eval" || id.name == "arguments") {
        return Err(ParseError::new(
            ErrorKind::StrictModeViolation,
            format!("Unexpected eval or arguments in strict mode: '{}'", id.name),
            id.span,
        ));
    }
    Ok(())
}

/// Re-check a pattern built in assignment mode now that it is known to bind
/// names: member targets are no longer allowed.
fn revalidate_binding(pattern: &Pattern, parser: &Parser<'_>, ctx: Context) -> Result<(), ParseError> {
    match pattern {
        Pattern::Identifier(id) => parser.check_binding_identifier(&id.name, false, id.span, ctx),
        Pattern::Member(expr) => Err(invalid_target(expr.span())),
        Pattern::Object(object) => {
            for prop in &object.properties {
                match prop {
                    ObjectPatternProperty::Property { value, .. } => revalidate_binding(value, parser, ctx)?,
                    ObjectPatternProperty::Rest(rest) => revalidate_binding(&rest.argument, parser, ctx)?,
                }
            }
            Ok(())
        }
        Pattern::Array(array) => {
            for element in array.elements.iter().flatten() {
                revalidate_binding(element, parser, ctx)?;
            }
            Ok(())
        }
        Pattern::Assignment(assign) => revalidate_binding(&assign.left, parser, ctx),
        Pattern::Rest(rest) => revalidate_binding(&rest.argument, parser, ctx),
    }
}
