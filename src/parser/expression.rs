//! Expression parsing: the precedence ladder, primary expressions, array and
//! object literals, templates, calls and optional chains.
//!
//! Assignment expressions come in two flavours. [`Parser::parse_assignment_expression`]
//! owns the cover errors recorded while it ran and reports them before
//! returning; [`Parser::parse_assignment_cover`] leaves them parked so an
//! enclosing literal can still be turned into a pattern.

use super::pattern::PatternMode;
use super::{CoverError, CoverErrorKind, Parser};
use crate::ast::*;
use crate::context::Context;
use crate::error::{ErrorKind, ParseError};
use crate::lexer::{Span, TemplatePart, TokenKind};
use crate::string_dict::Atom;

/// Binary or logical operator found at the current token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InfixOp {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

impl<'a> Parser<'a> {
    /// Expression, including the comma operator.
    pub(super) fn parse_expression(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        let mark = self.cover_errors.len();
        let expr = self.parse_expression_cover(ctx)?;
        self.check_cover_errors(mark)?;
        Ok(expr)
    }

    /// Like [`Self::parse_expression`] but leaves cover errors for the caller.
    pub(super) fn parse_expression_cover(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        let start = self.current.span;
        let first = self.parse_assignment_cover(ctx)?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }

        let mut expressions = vec![first];
        while self.match_token(&TokenKind::Comma)? {
            expressions.push(self.parse_assignment_cover(ctx)?);
        }
        Ok(Expression::Sequence(SequenceExpression {
            expressions,
            span: self.span_from(start),
        }))
    }

    pub(super) fn parse_assignment_expression(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        let mark = self.cover_errors.len();
        let expr = self.parse_assignment_cover(ctx)?;
        self.check_cover_errors(mark)?;
        Ok(expr)
    }

    pub(super) fn parse_assignment_cover(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        self.descend()?;
        let saved_start = self.assignment_start;
        self.assignment_start = self.current.span.start;
        let result = self.parse_assignment_inner(ctx);
        self.assignment_start = saved_start;
        self.ascend();
        result
    }

    fn parse_assignment_inner(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        if ctx.allow_yield && self.check_contextual("yield") {
            return self.parse_yield_expression(ctx);
        }

        let start = self.current.span;
        let expr = self.parse_conditional(ctx)?;
        if matches!(expr, Expression::ArrowFunction(_)) {
            return Ok(expr);
        }

        let Some(operator) = self.current_assignment_op() else {
            return Ok(expr);
        };

        let left = if operator == AssignmentOp::Assign {
            self.to_assignment_target(expr, ctx)?
        } else {
            self.simple_assignment_target(expr, ctx)?
        };
        self.advance()?;
        let right = self.parse_assignment_expression(ctx)?;

        Ok(Expression::Assignment(AssignmentExpression {
            operator,
            left,
            right: Box::new(right),
            span: self.span_from(start),
        }))
    }

    fn parse_yield_expression(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        let start = self.current.span;
        if ctx.in_parameters {
            return Err(self.error(
                ErrorKind::UnexpectedToken,
                "Yield expression not allowed in formal parameter",
            ));
        }
        self.advance()?;
        self.yield_await.push(start);

        let mut delegate = false;
        let argument = if self.current.newline_before {
            None
        } else if self.match_token(&TokenKind::Star)? {
            delegate = true;
            Some(Box::new(self.parse_assignment_expression(ctx)?))
        } else if starts_expression(&self.current.kind) {
            Some(Box::new(self.parse_assignment_expression(ctx)?))
        } else {
            None
        };

        Ok(Expression::Yield(YieldExpression {
            argument,
            delegate,
            span: self.span_from(start),
        }))
    }

    fn parse_conditional(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        let start = self.current.span;
        let test = self.parse_binary(ctx, 0)?;
        if matches!(test, Expression::ArrowFunction(_)) {
            return Ok(test);
        }

        if !self.match_token(&TokenKind::Question)? {
            return Ok(test);
        }

        let consequent = self.parse_assignment_expression(ctx.with_in(true))?;
        self.require_token(&TokenKind::Colon)?;
        let alternate = self.parse_assignment_expression(ctx)?;

        Ok(Expression::Conditional(ConditionalExpression {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
            span: self.span_from(start),
        }))
    }

    /// Precedence climbing over binary and logical operators.
    fn parse_binary(&mut self, ctx: Context, min_prec: u8) -> Result<Expression, ParseError> {
        self.descend()?;
        let result = self.parse_binary_inner(ctx, min_prec);
        self.ascend();
        result
    }

    fn parse_binary_inner(&mut self, ctx: Context, min_prec: u8) -> Result<Expression, ParseError> {
        let start = self.current.span;

        let mut left = if let TokenKind::PrivateName(name) = &self.current.kind {
            // `#x in obj`
            let name = name.clone();
            self.advance()?;
            if !(self.check(&TokenKind::In) && ctx.allow_in && IN_PRECEDENCE >= min_prec) {
                return Err(ParseError::new(
                    ErrorKind::UnexpectedToken,
                    "Unexpected private name",
                    start,
                ));
            }
            self.record_private_use(&name, start)?;
            Expression::PrivateIdentifier(PrivateIdentifier { name, span: start })
        } else {
            self.parse_unary(ctx)?
        };
        if matches!(left, Expression::ArrowFunction(_)) {
            return Ok(left);
        }

        while let Some((op, prec)) = self.current_infix_op(ctx) {
            if prec < min_prec {
                break;
            }
            if op == InfixOp::Binary(BinaryOp::Exp)
                && matches!(left, Expression::Unary(_) | Expression::Await(_))
            {
                return Err(self.error(
                    ErrorKind::UnexpectedToken,
                    "Unary operator used immediately before exponentiation expression; parentheses are required",
                ));
            }
            self.advance()?;

            // `**` is right associative
            let next_prec = if op == InfixOp::Binary(BinaryOp::Exp) {
                prec
            } else {
                prec + 1
            };
            let right = self.parse_binary(ctx, next_prec)?;
            let span = self.span_from(start);

            left = match op {
                InfixOp::Binary(operator) => Expression::Binary(BinaryExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                    span,
                }),
                InfixOp::Logical(operator) => {
                    if mixes_nullish(operator, &left) || mixes_nullish(operator, &right) {
                        return Err(ParseError::new(
                            ErrorKind::UnexpectedToken,
                            "Nullish coalescing operator cannot be mixed with '&&' or '||' without parentheses",
                            span,
                        ));
                    }
                    Expression::Logical(LogicalExpression {
                        operator,
                        left: Box::new(left),
                        right: Box::new(right),
                        span,
                    })
                }
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        self.descend()?;
        let result = self.parse_unary_inner(ctx);
        self.ascend();
        result
    }

    fn parse_unary_inner(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        let start = self.current.span;

        if let Some(operator) = self.current_unary_op() {
            self.advance()?;
            let argument = self.parse_unary(ctx)?;

            if operator == UnaryOp::Delete {
                if ctx.strict && matches!(argument.unparenthesized(), Expression::Identifier(_)) {
                    return Err(ParseError::new(
                        ErrorKind::StrictModeViolation,
                        "Delete of an unqualified identifier in strict mode",
                        argument.span(),
                    ));
                }
                if is_private_member(&argument) {
                    return Err(ParseError::new(
                        ErrorKind::UnexpectedToken,
                        "Private fields can not be deleted",
                        argument.span(),
                    ));
                }
            }

            return Ok(Expression::Unary(UnaryExpression {
                operator,
                argument: Box::new(argument),
                span: self.span_from(start),
            }));
        }

        if let Some(operator) = self.current_update_op() {
            self.advance()?;
            let argument = self.parse_unary(ctx)?;
            self.check_simple_target(
                &argument,
                ctx,
                ErrorKind::InvalidLeftHandSide,
                "Invalid left-hand side expression in prefix operation",
            )?;
            return Ok(Expression::Update(UpdateExpression {
                operator,
                argument: Box::new(argument),
                prefix: true,
                span: self.span_from(start),
            }));
        }

        if ctx.allow_await && self.check_contextual("await") {
            return self.parse_await_expression(ctx);
        }

        self.parse_postfix(ctx)
    }

    fn parse_await_expression(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        let start = self.current.span;
        if ctx.in_parameters {
            return Err(self.error(
                ErrorKind::UnexpectedToken,
                "Await expression not allowed in formal parameter",
            ));
        }
        self.advance()?;
        self.yield_await.push(start);

        let argument = self.parse_unary(ctx)?;
        Ok(Expression::Await(AwaitExpression {
            argument: Box::new(argument),
            span: self.span_from(start),
        }))
    }

    fn parse_postfix(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        let start = self.current.span;
        let expr = self.parse_lhs(ctx)?;
        if matches!(expr, Expression::ArrowFunction(_)) || self.current.newline_before {
            return Ok(expr);
        }

        let Some(operator) = self.current_update_op() else {
            return Ok(expr);
        };
        self.check_simple_target(
            &expr,
            ctx,
            ErrorKind::InvalidLeftHandSide,
            "Invalid left-hand side expression in postfix operation",
        )?;
        self.advance()?;

        Ok(Expression::Update(UpdateExpression {
            operator,
            argument: Box::new(expr),
            prefix: false,
            span: self.span_from(start),
        }))
    }

    /// Left-hand-side expression: `new`, member access, calls, tagged
    /// templates and optional chains.
    pub(super) fn parse_lhs(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        let start = self.current.span;
        let expr = if self.check(&TokenKind::New) {
            self.parse_new_expression(ctx)?
        } else {
            self.parse_primary(ctx)?
        };
        if matches!(expr, Expression::ArrowFunction(_)) {
            return Ok(expr);
        }
        self.parse_call_tail(ctx, start, expr, true)
    }

    fn parse_new_expression(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        self.descend()?;
        let result = self.parse_new_expression_inner(ctx);
        self.ascend();
        result
    }

    fn parse_new_expression_inner(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::New)?;

        if self.match_token(&TokenKind::Dot)? {
            let escaped = self.current.escaped;
            let property = self.parse_identifier_name()?;
            if property.name != "target" || escaped {
                return Err(ParseError::new(
                    ErrorKind::UnexpectedToken,
                    "The only valid meta property for new is 'new.target'",
                    property.span,
                ));
            }
            if !ctx.allow_new_target {
                return Err(ParseError::new(
                    ErrorKind::UnexpectedToken,
                    "new.target expression is not allowed here",
                    start,
                ));
            }
            let meta = Identifier {
                name: self.intern("new"),
                span: start,
            };
            return Ok(Expression::MetaProperty(MetaProperty {
                meta,
                property,
                span: self.span_from(start),
            }));
        }

        let callee_start = self.current.span;
        let callee = if self.check(&TokenKind::New) {
            self.parse_new_expression(ctx)?
        } else {
            self.parse_primary(ctx)?
        };
        if matches!(callee, Expression::Import(_) | Expression::Super(_)) {
            return Err(ParseError::new(
                ErrorKind::UnexpectedToken,
                "Cannot use new with this expression",
                callee.span(),
            ));
        }
        let callee = self.parse_call_tail(ctx, callee_start, callee, false)?;

        let arguments = if self.check(&TokenKind::LParen) {
            self.parse_arguments(ctx, false)?.0
        } else {
            vec![]
        };

        Ok(Expression::New(NewExpression {
            callee: Box::new(callee),
            arguments,
            span: self.span_from(start),
        }))
    }

    /// Member accesses, calls and tagged templates after `expr`. Calls and
    /// `?.` are not allowed in the callee of `new`.
    fn parse_call_tail(
        &mut self,
        ctx: Context,
        start: Span,
        expr: Expression,
        allow_call: bool,
    ) -> Result<Expression, ParseError> {
        let mut expr = expr;
        let mut in_chain = false;

        loop {
            match &self.current.kind {
                TokenKind::Dot => {
                    self.advance()?;
                    let property = self.parse_member_name()?;
                    expr = Expression::Member(MemberExpression {
                        object: Box::new(expr),
                        property,
                        optional: false,
                        span: self.span_from(start),
                    });
                }
                TokenKind::LBracket => {
                    self.advance()?;
                    let property = self.parse_expression(ctx.with_in(true))?;
                    self.require_token(&TokenKind::RBracket)?;
                    expr = Expression::Member(MemberExpression {
                        object: Box::new(expr),
                        property: MemberProperty::Computed(Box::new(property)),
                        optional: false,
                        span: self.span_from(start),
                    });
                }
                TokenKind::LParen if allow_call => {
                    let (arguments, _) = self.parse_arguments(ctx, false)?;
                    expr = Expression::Call(CallExpression {
                        callee: Box::new(expr),
                        arguments,
                        optional: false,
                        span: self.span_from(start),
                    });
                }
                TokenKind::QuestionDot => {
                    if !allow_call {
                        return Err(self.error(
                            ErrorKind::UnexpectedToken,
                            "Invalid optional chain from new expression",
                        ));
                    }
                    self.advance()?;
                    in_chain = true;
                    expr = match &self.current.kind {
                        TokenKind::LParen => {
                            let (arguments, _) = self.parse_arguments(ctx, false)?;
                            Expression::Call(CallExpression {
                                callee: Box::new(expr),
                                arguments,
                                optional: true,
                                span: self.span_from(start),
                            })
                        }
                        TokenKind::LBracket => {
                            self.advance()?;
                            let property = self.parse_expression(ctx.with_in(true))?;
                            self.require_token(&TokenKind::RBracket)?;
                            Expression::Member(MemberExpression {
                                object: Box::new(expr),
                                property: MemberProperty::Computed(Box::new(property)),
                                optional: true,
                                span: self.span_from(start),
                            })
                        }
                        TokenKind::TemplateHead(_) | TokenKind::TemplateNoSub(_) => {
                            return Err(self.error(
                                ErrorKind::UnexpectedToken,
                                "Invalid tagged template on optional chain",
                            ));
                        }
                        _ => {
                            let property = self.parse_member_name()?;
                            Expression::Member(MemberExpression {
                                object: Box::new(expr),
                                property,
                                optional: true,
                                span: self.span_from(start),
                            })
                        }
                    };
                }
                TokenKind::TemplateHead(_) | TokenKind::TemplateNoSub(_) => {
                    if in_chain {
                        return Err(self.error(
                            ErrorKind::UnexpectedToken,
                            "Invalid tagged template on optional chain",
                        ));
                    }
                    let quasi = self.parse_template_literal(ctx, true)?;
                    expr = Expression::TaggedTemplate(TaggedTemplateExpression {
                        tag: Box::new(expr),
                        quasi,
                        span: self.span_from(start),
                    });
                }
                _ => break,
            }
        }

        if in_chain {
            expr = Expression::Chain(ChainExpression {
                expression: Box::new(expr),
                span: self.span_from(start),
            });
        }
        Ok(expr)
    }

    /// Property name after `.` or `?.`, including `#private`.
    fn parse_member_name(&mut self) -> Result<MemberProperty, ParseError> {
        if let TokenKind::PrivateName(name) = &self.current.kind {
            let name = name.clone();
            let span = self.current.span;
            self.advance()?;
            self.record_private_use(&name, span)?;
            return Ok(MemberProperty::Private(PrivateIdentifier { name, span }));
        }
        Ok(MemberProperty::Identifier(self.parse_identifier_name()?))
    }

    /// `( args )`. With `cover`, arguments keep their cover errors so the
    /// list can still become arrow parameters (`async (...) =>`).
    pub(super) fn parse_arguments(
        &mut self,
        ctx: Context,
        cover: bool,
    ) -> Result<(Vec<ExpressionOrSpread>, Option<Span>), ParseError> {
        let arg_ctx = ctx.with_in(true);
        self.require_token(&TokenKind::LParen)?;

        let mut arguments = vec![];
        let mut trailing_comma = None;
        while !self.check(&TokenKind::RParen) {
            if self.check(&TokenKind::DotDotDot) {
                let spread_start = self.current.span;
                self.advance()?;
                let argument = self.parse_argument(arg_ctx, cover)?;
                arguments.push(ExpressionOrSpread::Spread(SpreadElement {
                    argument,
                    span: self.span_from(spread_start),
                }));
            } else {
                arguments.push(ExpressionOrSpread::Expression(self.parse_argument(arg_ctx, cover)?));
            }

            if !self.check(&TokenKind::RParen) {
                let comma = self.current.span;
                self.require_token(&TokenKind::Comma)?;
                if self.check(&TokenKind::RParen) {
                    trailing_comma = Some(comma);
                }
            }
        }

        self.require_token(&TokenKind::RParen)?;
        Ok((arguments, trailing_comma))
    }

    fn parse_argument(&mut self, ctx: Context, cover: bool) -> Result<Expression, ParseError> {
        if cover {
            self.parse_assignment_cover(ctx)
        } else {
            self.parse_assignment_expression(ctx)
        }
    }

    // ============ PRIMARY EXPRESSIONS ============

    fn parse_primary(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        let start = self.current.span;

        match &self.current.kind {
            TokenKind::Number(n) => {
                let n = *n;
                self.check_legacy_octal(ctx)?;
                self.advance()?;
                Ok(literal(LiteralValue::Number(n), start))
            }
            TokenKind::String(s) => {
                let s = s.clone();
                self.check_legacy_octal(ctx)?;
                self.advance()?;
                Ok(literal(LiteralValue::String(s), start))
            }
            TokenKind::BigInt(digits) => {
                let digits = digits.clone();
                self.advance()?;
                Ok(literal(LiteralValue::BigInt(digits), start))
            }
            TokenKind::True => {
                self.advance()?;
                Ok(literal(LiteralValue::Boolean(true), start))
            }
            TokenKind::False => {
                self.advance()?;
                Ok(literal(LiteralValue::Boolean(false), start))
            }
            TokenKind::Null => {
                self.advance()?;
                Ok(literal(LiteralValue::Null, start))
            }
            TokenKind::Slash | TokenKind::SlashEq => {
                self.rescan_regexp()?;
                let TokenKind::RegExp { pattern, flags } = self.current.kind.clone() else {
                    return Err(self.unexpected_token("regular expression"));
                };
                let span = self.current.span;
                self.advance()?;
                Ok(literal(LiteralValue::RegExp { pattern, flags }, span))
            }
            TokenKind::TemplateHead(_) | TokenKind::TemplateNoSub(_) => {
                Ok(Expression::TemplateLiteral(self.parse_template_literal(ctx, false)?))
            }
            TokenKind::This => {
                self.advance()?;
                Ok(Expression::This(start))
            }
            TokenKind::Super => self.parse_super(ctx),
            TokenKind::Function => self.parse_function_expression(ctx),
            TokenKind::Class => {
                let class = self.parse_class(ctx, false, false)?;
                Ok(Expression::Class(Box::new(class)))
            }
            TokenKind::LBracket => self.parse_array_literal(ctx),
            TokenKind::LBrace => self.parse_object_literal(ctx),
            TokenKind::LParen => self.parse_parenthesized_or_arrow(ctx),
            TokenKind::Import => self.parse_import_meta_or_call(ctx),
            TokenKind::PrivateName(_) => Err(self.error(ErrorKind::UnexpectedToken, "Unexpected private name")),
            TokenKind::Identifier(_) => self.parse_identifier_expression(ctx),
            _ => Err(self.unexpected_token("expression")),
        }
    }

    /// An identifier, or one of the forms it may start: `x => ...`,
    /// `async x => ...`, `async (...) => ...`, `async function`.
    fn parse_identifier_expression(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        let start = self.current.span;
        let at_start = start.start == self.assignment_start;

        if self.check_contextual("async") {
            let next = self.peek_token()?;
            if !next.newline_before {
                match next.kind {
                    TokenKind::Function => return self.parse_function_expression(ctx),
                    TokenKind::Identifier(_) if at_start => {
                        // `for (async of x)` reads `async` as a plain identifier
                        let arrow_follows = self.arrow_after_next()?;
                        if arrow_follows {
                            return self.parse_async_identifier_arrow(ctx, start);
                        }
                    }
                    TokenKind::LParen if at_start => return self.parse_async_call_or_arrow(ctx, start),
                    _ => {}
                }
            }
        }

        let id = self.parse_identifier_reference(ctx)?;
        if at_start && self.check(&TokenKind::Arrow) && !self.current.newline_before {
            let mark = self.cover_errors.len();
            return self.parse_arrow_function(ctx, start, vec![Expression::Identifier(id)], None, false, mark);
        }
        Ok(Expression::Identifier(id))
    }

    /// The token two ahead of the current one is `=>` on the same line.
    fn arrow_after_next(&mut self) -> Result<bool, ParseError> {
        let checkpoint = self.lexer.checkpoint();
        let second = match self.lexer.next_token() {
            Ok(_) => self.lexer.next_token(),
            Err(err) => Err(err),
        };
        self.lexer.restore(checkpoint);
        let second = second?;
        Ok(second.kind == TokenKind::Arrow && !second.newline_before)
    }

    /// `async x => body`
    fn parse_async_identifier_arrow(&mut self, ctx: Context, start: Span) -> Result<Expression, ParseError> {
        self.advance()?;
        let mark = self.cover_errors.len();
        let param = self.parse_identifier_reference(ctx)?;
        if !self.check(&TokenKind::Arrow) || self.current.newline_before {
            return Err(self.unexpected_token("'=>'"));
        }
        self.parse_arrow_function(ctx, start, vec![Expression::Identifier(param)], None, true, mark)
    }

    /// `async(...)`: arrow parameters if `=>` follows, otherwise a call of a
    /// function named `async`.
    fn parse_async_call_or_arrow(&mut self, ctx: Context, start: Span) -> Result<Expression, ParseError> {
        let callee = self.parse_identifier_reference(ctx)?;
        let mark = self.cover_errors.len();
        let (arguments, trailing_comma) = self.parse_arguments(ctx, true)?;

        if self.check(&TokenKind::Arrow) && !self.current.newline_before {
            let mut items = Vec::with_capacity(arguments.len());
            let mut rest = None;
            let count = arguments.len();
            for (index, argument) in arguments.into_iter().enumerate() {
                match argument {
                    ExpressionOrSpread::Expression(expr) => items.push(expr),
                    ExpressionOrSpread::Spread(spread) => {
                        if index + 1 != count || trailing_comma.is_some() {
                            return Err(ParseError::new(
                                ErrorKind::InvalidDestructuringTarget,
                                "Rest parameter must be last formal parameter",
                                spread.span,
                            ));
                        }
                        if matches!(spread.argument, Expression::Assignment(_)) {
                            return Err(ParseError::new(
                                ErrorKind::InvalidDestructuringTarget,
                                "Rest parameter may not have a default initializer",
                                spread.span,
                            ));
                        }
                        let argument = self.reinterpret_as_pattern(spread.argument, PatternMode::Binding, ctx)?;
                        rest = Some(RestElement {
                            argument: Box::new(argument),
                            span: spread.span,
                        });
                    }
                }
            }
            return self.parse_arrow_function(ctx, start, items, rest, true, mark);
        }

        self.check_cover_errors(mark)?;
        Ok(Expression::Call(CallExpression {
            callee: Box::new(Expression::Identifier(callee)),
            arguments,
            optional: false,
            span: self.span_from(start),
        }))
    }

    /// `( ... )`: a parenthesized expression, or the parameter list of an
    /// arrow function when `=>` follows.
    fn parse_parenthesized_or_arrow(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        let start = self.current.span;
        let at_start = start.start == self.assignment_start;
        let mark = self.cover_errors.len();
        let inner_ctx = ctx.with_in(true);
        self.require_token(&TokenKind::LParen)?;

        let mut items = vec![];
        let mut rest = None;
        let mut trailing_comma = None;
        while !self.check(&TokenKind::RParen) {
            if self.check(&TokenKind::DotDotDot) {
                let rest_start = self.current.span;
                self.advance()?;
                let argument = self.parse_binding_target(inner_ctx)?;
                if !self.check(&TokenKind::RParen) {
                    return Err(self.error(
                        ErrorKind::UnexpectedToken,
                        "Rest parameter must be last formal parameter",
                    ));
                }
                rest = Some(RestElement {
                    argument: Box::new(argument),
                    span: self.span_from(rest_start),
                });
                break;
            }

            items.push(self.parse_assignment_cover(inner_ctx)?);

            if !self.check(&TokenKind::RParen) {
                let comma = self.current.span;
                self.require_token(&TokenKind::Comma)?;
                if self.check(&TokenKind::RParen) {
                    trailing_comma = Some(comma);
                }
            }
        }
        self.require_token(&TokenKind::RParen)?;

        if at_start && self.check(&TokenKind::Arrow) && !self.current.newline_before {
            return self.parse_arrow_function(ctx, start, items, rest, false, mark);
        }

        if items.is_empty() || rest.is_some() {
            return Err(self.unexpected_token("'=>'"));
        }
        if let Some(comma) = trailing_comma {
            return Err(ParseError::new(ErrorKind::UnexpectedToken, "Unexpected token ','", comma));
        }

        let expression = if items.len() == 1 {
            match items.pop() {
                Some(expr) => expr,
                None => return Err(self.unexpected_token("expression")),
            }
        } else {
            let first = items.first().map(Expression::span).unwrap_or(start);
            let last = items.last().map(Expression::span).unwrap_or(start);
            Expression::Sequence(SequenceExpression {
                expressions: items,
                span: Span::new(first.start, last.end, first.line, first.column),
            })
        };

        Ok(Expression::Parenthesized(ParenthesizedExpression {
            expression: Box::new(expression),
            span: self.span_from(start),
        }))
    }

    fn parse_super(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        let span = self.current.span;
        self.advance()?;
        let allowed = match &self.current.kind {
            TokenKind::LParen => ctx.allow_super_call,
            TokenKind::Dot | TokenKind::LBracket => ctx.allow_super_property,
            _ => false,
        };
        if !allowed {
            return Err(ParseError::new(
                ErrorKind::UnexpectedToken,
                "'super' keyword unexpected here",
                span,
            ));
        }
        Ok(Expression::Super(span))
    }

    /// `import.meta` or `import(source)`.
    fn parse_import_meta_or_call(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Import)?;

        if self.match_token(&TokenKind::Dot)? {
            let escaped = self.current.escaped;
            let property = self.parse_identifier_name()?;
            if property.name != "meta" || escaped {
                return Err(ParseError::new(
                    ErrorKind::UnexpectedToken,
                    "The only valid meta property for import is 'import.meta'",
                    property.span,
                ));
            }
            if !ctx.module {
                return Err(ParseError::new(
                    ErrorKind::UnexpectedToken,
                    "Cannot use 'import.meta' outside a module",
                    start,
                ));
            }
            let meta = Identifier {
                name: self.intern("import"),
                span: start,
            };
            return Ok(Expression::MetaProperty(MetaProperty {
                meta,
                property,
                span: self.span_from(start),
            }));
        }

        if !self.check(&TokenKind::LParen) {
            return Err(self.unexpected_token("'(' or '.'"));
        }
        self.advance()?;
        let source = self.parse_assignment_expression(ctx.with_in(true))?;
        self.require_token(&TokenKind::RParen)?;

        Ok(Expression::Import(ImportExpression {
            source: Box::new(source),
            span: self.span_from(start),
        }))
    }

    // ============ LITERALS ============

    fn parse_array_literal(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        let start = self.current.span;
        let element_ctx = ctx.with_in(true);
        self.require_token(&TokenKind::LBracket)?;

        let mut elements = vec![];
        let mut trailing_comma = None;
        while !self.check(&TokenKind::RBracket) {
            if self.check(&TokenKind::Comma) {
                self.advance()?;
                elements.push(None);
                continue;
            }

            let element = if self.check(&TokenKind::DotDotDot) {
                let spread_start = self.current.span;
                self.advance()?;
                let argument = self.parse_assignment_cover(element_ctx)?;
                ExpressionOrSpread::Spread(SpreadElement {
                    argument,
                    span: self.span_from(spread_start),
                })
            } else {
                ExpressionOrSpread::Expression(self.parse_assignment_cover(element_ctx)?)
            };
            elements.push(Some(element));

            if !self.check(&TokenKind::RBracket) {
                let comma = self.current.span;
                self.require_token(&TokenKind::Comma)?;
                if self.check(&TokenKind::RBracket) {
                    trailing_comma = Some(comma);
                }
            }
        }
        self.require_token(&TokenKind::RBracket)?;

        Ok(Expression::Array(ArrayExpression {
            elements,
            trailing_comma,
            span: self.span_from(start),
        }))
    }

    fn parse_object_literal(&mut self, ctx: Context) -> Result<Expression, ParseError> {
        let start = self.current.span;
        let member_ctx = ctx.with_in(true);
        self.require_token(&TokenKind::LBrace)?;

        let mut properties = vec![];
        let mut trailing_comma = None;
        let mut has_proto = false;
        let mut duplicate_proto = false;
        while !self.check(&TokenKind::RBrace) {
            if self.check(&TokenKind::DotDotDot) {
                let spread_start = self.current.span;
                self.advance()?;
                let argument = self.parse_assignment_cover(member_ctx)?;
                properties.push(ObjectMember::Spread(SpreadElement {
                    argument,
                    span: self.span_from(spread_start),
                }));
            } else {
                let property = self.parse_object_property(member_ctx)?;
                if is_proto_setter(&property) {
                    duplicate_proto |= has_proto;
                    has_proto = true;
                }
                properties.push(ObjectMember::Property(property));
            }

            if !self.check(&TokenKind::RBrace) {
                let comma = self.current.span;
                self.require_token(&TokenKind::Comma)?;
                if self.check(&TokenKind::RBrace) {
                    trailing_comma = Some(comma);
                }
            }
        }
        self.require_token(&TokenKind::RBrace)?;

        let span = self.span_from(start);
        if duplicate_proto {
            self.cover_errors.push(CoverError {
                kind: CoverErrorKind::DuplicateProto,
                span,
            });
        }

        Ok(Expression::Object(ObjectExpression {
            properties,
            trailing_comma,
            span,
        }))
    }

    fn parse_object_property(&mut self, ctx: Context) -> Result<Property, ParseError> {
        let start = self.current.span;

        let mut kind = PropertyKind::Init;
        let mut is_async = false;
        if self.check_contextual("get") || self.check_contextual("set") {
            let next = self.peek_token()?;
            if is_property_name_start(&next.kind) {
                kind = if self.check_contextual("get") {
                    PropertyKind::Get
                } else {
                    PropertyKind::Set
                };
                self.advance()?;
            }
        } else if self.check_contextual("async") {
            let next = self.peek_token()?;
            if !next.newline_before && (is_property_name_start(&next.kind) || next.kind == TokenKind::Star) {
                is_async = true;
                self.advance()?;
            }
        }
        let is_generator = kind == PropertyKind::Init && self.match_token(&TokenKind::Star)?;

        let key_token = self.current.clone();
        let key = self.parse_property_key(ctx, false)?;

        if kind != PropertyKind::Init || is_async || is_generator || self.check(&TokenKind::LParen) {
            let value_start = self.current.span;
            let accessor = match kind {
                PropertyKind::Get => Some(MethodKind::Get),
                PropertyKind::Set => Some(MethodKind::Set),
                PropertyKind::Init => None,
            };
            let value = self.parse_method(ctx, value_start, is_async, is_generator, accessor, false)?;
            return Ok(Property {
                key,
                value: Expression::Function(Box::new(value)),
                kind,
                method: kind == PropertyKind::Init,
                shorthand: false,
                span: self.span_from(start),
            });
        }

        if self.match_token(&TokenKind::Colon)? {
            let value = self.parse_assignment_cover(ctx)?;
            return Ok(Property {
                key,
                value,
                kind,
                method: false,
                shorthand: false,
                span: self.span_from(start),
            });
        }

        // Shorthand `{x}` or `{x = init}`
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
        self.check_identifier_reference(&id.name, key_token.escaped, id.span, ctx)?;
        let id = id.clone();

        if self.match_token(&TokenKind::Eq)? {
            let right = self.parse_assignment_expression(ctx)?;
            let span = self.span_from(start);
            let value = Expression::Assignment(AssignmentExpression {
                operator: AssignmentOp::Assign,
                left: Pattern::Identifier(id),
                right: Box::new(right),
                span,
            });
            self.cover_errors.push(CoverError {
                kind: CoverErrorKind::ShorthandInit,
                span,
            });
            return Ok(Property {
                key,
                value,
                kind,
                method: false,
                shorthand: true,
                span,
            });
        }

        Ok(Property {
            key,
            value: Expression::Identifier(id),
            kind,
            method: false,
            shorthand: true,
            span: self.span_from(start),
        })
    }

    /// Property name in an object literal, class body or object pattern.
    pub(super) fn parse_property_key(&mut self, ctx: Context, allow_private: bool) -> Result<PropertyKey, ParseError> {
        let start = self.current.span;
        match &self.current.kind {
            TokenKind::String(s) => {
                let s = s.clone();
                self.check_legacy_octal(ctx)?;
                self.advance()?;
                Ok(PropertyKey::Literal(Literal {
                    value: LiteralValue::String(s),
                    span: start,
                }))
            }
            TokenKind::Number(n) => {
                let n = *n;
                self.check_legacy_octal(ctx)?;
                self.advance()?;
                Ok(PropertyKey::Literal(Literal {
                    value: LiteralValue::Number(n),
                    span: start,
                }))
            }
            TokenKind::BigInt(digits) => {
                let digits = digits.clone();
                self.advance()?;
                Ok(PropertyKey::Literal(Literal {
                    value: LiteralValue::BigInt(digits),
                    span: start,
                }))
            }
            TokenKind::LBracket => {
                self.advance()?;
                let expr = self.parse_assignment_expression(ctx.with_in(true))?;
                self.require_token(&TokenKind::RBracket)?;
                Ok(PropertyKey::Computed(Box::new(expr)))
            }
            TokenKind::PrivateName(name) => {
                if !allow_private {
                    return Err(self.error(ErrorKind::UnexpectedToken, "Unexpected private name"));
                }
                let name = name.clone();
                self.advance()?;
                Ok(PropertyKey::Private(PrivateIdentifier { name, span: start }))
            }
            _ => Ok(PropertyKey::Identifier(self.parse_identifier_name()?)),
        }
    }

    /// Template literal starting at the current `TemplateHead` or
    /// `TemplateNoSub` token. Only tagged templates may contain escapes
    /// without a cooked value.
    pub(super) fn parse_template_literal(&mut self, ctx: Context, tagged: bool) -> Result<TemplateLiteral, ParseError> {
        let start = self.current.span;
        let (part, tail) = match &self.current.kind {
            TokenKind::TemplateNoSub(part) => (part.clone(), true),
            TokenKind::TemplateHead(part) => (part.clone(), false),
            _ => return Err(self.unexpected_token("template literal")),
        };

        let mut quasis = vec![template_element(part, tail, start, tagged)?];
        let mut expressions = vec![];
        self.advance()?;

        if !tail {
            loop {
                expressions.push(self.parse_expression(ctx.with_in(true))?);
                if !self.check(&TokenKind::RBrace) {
                    return Err(self.unexpected_token("'}' in template literal"));
                }

                let token = self.lexer.rescan_template_continuation(self.current.span)?;
                let (part, tail) = match &token.kind {
                    TokenKind::TemplateTail(part) => (part.clone(), true),
                    TokenKind::TemplateMiddle(part) => (part.clone(), false),
                    _ => return Err(self.unexpected_token("template continuation")),
                };
                quasis.push(template_element(part, tail, token.span, tagged)?);
                self.current = token;
                self.advance()?;
                if tail {
                    break;
                }
            }
        }

        Ok(TemplateLiteral {
            quasis,
            expressions,
            span: self.span_from(start),
        })
    }

    /// Note a `#name` reference; it is resolved when the enclosing class
    /// body ends.
    fn record_private_use(&mut self, name: &Atom, span: Span) -> Result<(), ParseError> {
        let Some(scope) = self.private_names.last_mut() else {
            return Err(ParseError::new(
                ErrorKind::UnexpectedToken,
                format!("Private field '#{}' must be declared in an enclosing class", name),
                span,
            ));
        };
        scope.used.push((name.clone(), span));
        Ok(())
    }

    // ============ OPERATOR TABLES ============

    fn current_infix_op(&self, ctx: Context) -> Option<(InfixOp, u8)> {
        use InfixOp::{Binary, Logical};
        Some(match &self.current.kind {
            TokenKind::QuestionQuestion => (Logical(LogicalOp::NullishCoalescing), 4),
            TokenKind::PipePipe => (Logical(LogicalOp::Or), 4),
            TokenKind::AmpAmp => (Logical(LogicalOp::And), 5),
            TokenKind::Pipe => (Binary(BinaryOp::BitOr), 6),
            TokenKind::Caret => (Binary(BinaryOp::BitXor), 7),
            TokenKind::Amp => (Binary(BinaryOp::BitAnd), 8),
            TokenKind::EqEq => (Binary(BinaryOp::Eq), 9),
            TokenKind::BangEq => (Binary(BinaryOp::NotEq), 9),
            TokenKind::EqEqEq => (Binary(BinaryOp::StrictEq), 9),
            TokenKind::BangEqEq => (Binary(BinaryOp::StrictNotEq), 9),
            TokenKind::Lt => (Binary(BinaryOp::Lt), 10),
            TokenKind::LtEq => (Binary(BinaryOp::LtEq), 10),
            TokenKind::Gt => (Binary(BinaryOp::Gt), 10),
            TokenKind::GtEq => (Binary(BinaryOp::GtEq), 10),
            TokenKind::In if ctx.allow_in => (Binary(BinaryOp::In), IN_PRECEDENCE),
            TokenKind::Instanceof => (Binary(BinaryOp::Instanceof), 10),
            TokenKind::LtLt => (Binary(BinaryOp::LShift), 11),
            TokenKind::GtGt => (Binary(BinaryOp::RShift), 11),
            TokenKind::GtGtGt => (Binary(BinaryOp::URShift), 11),
            TokenKind::Plus => (Binary(BinaryOp::Add), 12),
            TokenKind::Minus => (Binary(BinaryOp::Sub), 12),
            TokenKind::Star => (Binary(BinaryOp::Mul), 13),
            TokenKind::Slash => (Binary(BinaryOp::Div), 13),
            TokenKind::Percent => (Binary(BinaryOp::Mod), 13),
            TokenKind::StarStar => (Binary(BinaryOp::Exp), 14),
            _ => return None,
        })
    }

    fn current_unary_op(&self) -> Option<UnaryOp> {
        match &self.current.kind {
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            _ => None,
        }
    }

    fn current_update_op(&self) -> Option<UpdateOp> {
        match &self.current.kind {
            TokenKind::PlusPlus => Some(UpdateOp::Increment),
            TokenKind::MinusMinus => Some(UpdateOp::Decrement),
            _ => None,
        }
    }

    fn current_assignment_op(&self) -> Option<AssignmentOp> {
        match &self.current.kind {
            TokenKind::Eq => Some(AssignmentOp::Assign),
            TokenKind::PlusEq => Some(AssignmentOp::AddAssign),
            TokenKind::MinusEq => Some(AssignmentOp::SubAssign),
            TokenKind::StarEq => Some(AssignmentOp::MulAssign),
            TokenKind::SlashEq => Some(AssignmentOp::DivAssign),
            TokenKind::PercentEq => Some(AssignmentOp::ModAssign),
            TokenKind::StarStarEq => Some(AssignmentOp::ExpAssign),
            TokenKind::AmpEq => Some(AssignmentOp::BitAndAssign),
            TokenKind::PipeEq => Some(AssignmentOp::BitOrAssign),
            TokenKind::CaretEq => Some(AssignmentOp::BitXorAssign),
            TokenKind::LtLtEq => Some(AssignmentOp::LShiftAssign),
            TokenKind::GtGtEq => Some(AssignmentOp::RShiftAssign),
            TokenKind::GtGtGtEq => Some(AssignmentOp::URShiftAssign),
            TokenKind::AmpAmpEq => Some(AssignmentOp::AndAssign),
            TokenKind::PipePipeEq => Some(AssignmentOp::OrAssign),
            TokenKind::QuestionQuestionEq => Some(AssignmentOp::NullishAssign),
            _ => None,
        }
    }
}

const IN_PRECEDENCE: u8 = 10;

fn literal(value: LiteralValue, span: Span) -> Expression {
    Expression::Literal(Literal { value, span })
}

/// Build a template element; its span covers the text between the
/// delimiters of `token_span`.
fn template_element(
    part: TemplatePart,
    tail: bool,
    token_span: Span,
    tagged: bool,
) -> Result<TemplateElement, ParseError> {
    if !tagged && part.cooked.is_none() {
        return Err(ParseError::new(
            ErrorKind::Lexical,
            "Invalid escape sequence in template",
            token_span,
        ));
    }
    // Closing delimiter is "`" for the tail and "${" otherwise
    let closing = if tail { 1 } else { 2 };
    let start = token_span.start + 1;
    let end = token_span.end.saturating_sub(closing).max(start);
    Ok(TemplateElement {
        cooked: part.cooked,
        raw: part.raw,
        tail,
        span: Span::new(start, end, token_span.line, token_span.column + 1),
    })
}

/// `??` next to an unparenthesized `&&`/`||` operand, or the reverse.
fn mixes_nullish(operator: LogicalOp, operand: &Expression) -> bool {
    let Expression::Logical(inner) = operand else {
        return false;
    };
    match operator {
        LogicalOp::NullishCoalescing => inner.operator != LogicalOp::NullishCoalescing,
        LogicalOp::And | LogicalOp::Or => inner.operator == LogicalOp::NullishCoalescing,
    }
}

fn is_private_member(expr: &Expression) -> bool {
    match expr {
        Expression::Member(member) => matches!(member.property, MemberProperty::Private(_)),
        Expression::Chain(chain) => is_private_member(&chain.expression),
        _ => false,
    }
}

/// Non-computed, non-shorthand `__proto__: value` entry.
fn is_proto_setter(property: &Property) -> bool {
    property.kind == PropertyKind::Init
        && !property.method
        && !property.shorthand
        && property.key.static_name() == Some("__proto__")
}

/// Token that may begin a property name (after `get`, `set`, `async`, `static`).
pub(super) fn is_property_name_start(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier(_)
            | TokenKind::String(_)
            | TokenKind::Number(_)
            | TokenKind::BigInt(_)
            | TokenKind::LBracket
            | TokenKind::PrivateName(_)
    ) || kind.keyword_str().is_some()
}

/// Token that may begin an assignment expression (decides whether `yield`
/// has an operand).
fn starts_expression(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Number(_)
            | TokenKind::String(_)
            | TokenKind::BigInt(_)
            | TokenKind::RegExp { .. }
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
            | TokenKind::Identifier(_)
            | TokenKind::PrivateName(_)
            | TokenKind::TemplateHead(_)
            | TokenKind::TemplateNoSub(_)
            | TokenKind::Class
            | TokenKind::Delete
            | TokenKind::Function
            | TokenKind::Import
            | TokenKind::New
            | TokenKind::Super
            | TokenKind::This
            | TokenKind::Typeof
            | TokenKind::Void
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus
            | TokenKind::Slash
            | TokenKind::SlashEq
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace
    )
}
