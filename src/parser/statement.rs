//! Statement parsing: dispatch, declarations, control flow and the `for`
//! head disambiguation.

use tracing::trace;

use super::{Label, Parser};
use crate::ast::*;
use crate::context::Context;
use crate::error::{ErrorKind, ParseError};
use crate::lexer::{Span, TokenKind};
use crate::scope::{BindingKind, ScopeKind, VarOrigin};

impl<'a> Parser<'a> {
    /// Parse a statement or declaration inside a statement list.
    pub(super) fn parse_statement_list_item(
        &mut self,
        ctx: Context,
        top_level: bool,
    ) -> Result<Statement, ParseError> {
        let let_declaration = self.check_contextual("let") && self.let_starts_declaration()?;
        let async_function = self.check_contextual("async") && self.async_function_ahead()?;
        if let_declaration {
            return self.parse_variable_statement(ctx, VariableKind::Let);
        }
        if async_function {
            return self.parse_function_declaration(ctx);
        }

        match &self.current.kind {
            TokenKind::Function => self.parse_function_declaration(ctx),
            TokenKind::Class => {
                let class = self.parse_class(ctx, true, false)?;
                Ok(Statement::ClassDeclaration(Box::new(class)))
            }
            TokenKind::Const => self.parse_variable_statement(ctx, VariableKind::Const),
            TokenKind::Import if top_level && ctx.module => {
                let next = self.peek_token()?;
                if matches!(next.kind, TokenKind::LParen | TokenKind::Dot) {
                    self.parse_statement_inner(ctx, false)
                } else {
                    self.parse_import_declaration(ctx)
                }
            }
            TokenKind::Export if top_level && ctx.module => self.parse_export_declaration(ctx),
            _ => self.parse_statement_inner(ctx, false),
        }
    }

    /// Parse a statement in a single-statement position (`if` branch, loop
    /// body, labelled body, `with` body).
    pub(super) fn parse_statement(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        self.parse_statement_inner(ctx, true)
    }

    fn parse_statement_inner(&mut self, ctx: Context, single: bool) -> Result<Statement, ParseError> {
        self.descend()?;
        let result = match &self.current.kind {
            TokenKind::LBrace => Ok(Statement::Block(self.parse_block_statement(ctx)?)),
            TokenKind::Var => self.parse_variable_statement(ctx, VariableKind::Var),
            TokenKind::Semicolon => {
                let span = self.current.span;
                self.advance()?;
                Ok(Statement::Empty(span))
            }
            TokenKind::If => self.parse_if_statement(ctx),
            TokenKind::For => self.parse_for_statement(ctx),
            TokenKind::While => self.parse_while_statement(ctx),
            TokenKind::Do => self.parse_do_while_statement(ctx),
            TokenKind::Continue => self.parse_continue_statement(ctx),
            TokenKind::Break => self.parse_break_statement(ctx),
            TokenKind::Return => self.parse_return_statement(ctx),
            TokenKind::With => self.parse_with_statement(ctx),
            TokenKind::Switch => self.parse_switch_statement(ctx),
            TokenKind::Throw => self.parse_throw_statement(ctx),
            TokenKind::Try => self.parse_try_statement(ctx),
            TokenKind::Debugger => {
                let start = self.current.span;
                self.advance()?;
                self.expect_semicolon()?;
                Ok(Statement::Debugger(self.span_from(start)))
            }
            TokenKind::Function => Err(self.error(
                ErrorKind::IllegalFunctionInStatementPosition,
                "Function declarations are not allowed in this position",
            )),
            TokenKind::Class => Err(self.error(
                ErrorKind::IllegalFunctionInStatementPosition,
                "Class declarations are not allowed in this position",
            )),
            TokenKind::Const => Err(self.error(
                ErrorKind::UnexpectedToken,
                "Lexical declaration cannot appear in a single-statement context",
            )),
            TokenKind::Export => Err(self.error(
                ErrorKind::UnexpectedToken,
                "'export' may only appear at the top level of a module",
            )),
            TokenKind::Import => {
                let next = self.peek_token()?;
                if matches!(next.kind, TokenKind::LParen | TokenKind::Dot) {
                    self.parse_expression_statement(ctx)
                } else {
                    Err(self.error(
                        ErrorKind::UnexpectedToken,
                        "Cannot use import statement outside a module",
                    ))
                }
            }
            TokenKind::Identifier(_) => self.parse_identifier_statement(ctx, single),
            _ => self.parse_expression_statement(ctx),
        };
        self.ascend();
        result
    }

    /// Statements that open with an identifier: labels, `let`/`async`
    /// misuse in single-statement positions, or plain expressions.
    fn parse_identifier_statement(&mut self, ctx: Context, single: bool) -> Result<Statement, ParseError> {
        let next = self.peek_token()?;

        if self.check_contextual("let") {
            let declaration_like = matches!(next.kind, TokenKind::LBracket)
                || (single
                    && !next.newline_before
                    && matches!(next.kind, TokenKind::Identifier(_) | TokenKind::LBrace));
            if declaration_like {
                return Err(self.error(
                    ErrorKind::UnexpectedToken,
                    "Lexical declaration cannot appear in a single-statement context",
                ));
            }
        }

        if self.check_contextual("async") && next.kind == TokenKind::Function && !next.newline_before {
            return Err(self.error(
                ErrorKind::IllegalFunctionInStatementPosition,
                "Async function declarations are not allowed in this position",
            ));
        }

        if next.kind == TokenKind::Colon {
            return self.parse_labeled_statement(ctx, single);
        }

        self.parse_expression_statement(ctx)
    }

    fn parse_expression_statement(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        let start = self.current.span;
        let expression = self.parse_expression(ctx.with_in(true))?;
        self.expect_semicolon()?;
        Ok(Statement::Expression(ExpressionStatement {
            expression,
            directive: None,
            span: self.span_from(start),
        }))
    }

    /// `let` followed by something that can only start a binding.
    fn let_starts_declaration(&mut self) -> Result<bool, ParseError> {
        let next = self.peek_token()?;
        Ok(matches!(
            next.kind,
            TokenKind::Identifier(_) | TokenKind::LBracket | TokenKind::LBrace
        ))
    }

    /// `async` directly followed (same line) by `function`.
    pub(super) fn async_function_ahead(&mut self) -> Result<bool, ParseError> {
        let next = self.peek_token()?;
        Ok(next.kind == TokenKind::Function && !next.newline_before)
    }

    // ============ DECLARATIONS ============

    pub(super) fn parse_variable_statement(
        &mut self,
        ctx: Context,
        kind: VariableKind,
    ) -> Result<Statement, ParseError> {
        let declaration = self.parse_variable_declaration(ctx, kind)?;
        self.expect_semicolon()?;
        Ok(Statement::VariableDeclaration(VariableDeclaration {
            span: self.span_from(declaration.span),
            ..declaration
        }))
    }

    /// Parse `var|let|const` and its declarator list, declaring every bound
    /// name as soon as its declarator is complete.
    pub(super) fn parse_variable_declaration(
        &mut self,
        ctx: Context,
        kind: VariableKind,
    ) -> Result<VariableDeclaration, ParseError> {
        let start = self.current.span;
        self.advance()?;

        let mut declarations = vec![];
        loop {
            declarations.push(self.parse_variable_declarator(ctx, kind)?);
            if !self.match_token(&TokenKind::Comma)? {
                break;
            }
        }

        Ok(VariableDeclaration {
            kind,
            declarations,
            span: self.span_from(start),
        })
    }

    fn parse_variable_declarator(
        &mut self,
        ctx: Context,
        kind: VariableKind,
    ) -> Result<VariableDeclarator, ParseError> {
        let start = self.current.span;
        let id = self.parse_binding_target(ctx)?;

        let init = if self.match_token(&TokenKind::Eq)? {
            Some(self.parse_assignment_expression(ctx)?)
        } else {
            None
        };

        self.declare_pattern(&id, binding_kind(kind), ctx)?;

        if init.is_none() {
            if kind == VariableKind::Const {
                return Err(ParseError::new(
                    ErrorKind::UnexpectedToken,
                    "Missing initializer in const declaration",
                    id.span(),
                ));
            }
            if !id.is_simple() {
                return Err(ParseError::new(
                    ErrorKind::UnexpectedToken,
                    "Missing initializer in destructuring declaration",
                    id.span(),
                ));
            }
        }

        Ok(VariableDeclarator {
            id,
            init,
            span: self.span_from(start),
        })
    }

    /// Declare every name bound by `pattern` in the current scope.
    pub(super) fn declare_pattern(
        &mut self,
        pattern: &Pattern,
        kind: BindingKind,
        ctx: Context,
    ) -> Result<(), ParseError> {
        let mut names = Vec::new();
        pattern.bound_names(&mut names);
        for id in names {
            self.declare_name(id, kind, ctx)?;
        }
        Ok(())
    }

    pub(super) fn declare_name(
        &mut self,
        id: &Identifier,
        kind: BindingKind,
        ctx: Context,
    ) -> Result<(), ParseError> {
        if matches!(kind, BindingKind::Let | BindingKind::Const | BindingKind::Class)
            && id.name == "let"
        {
            return Err(ParseError::new(
                ErrorKind::ReservedWordUsage,
                "let is disallowed as a lexically bound name",
                id.span,
            ));
        }
        self.scopes.declare(&id.name, kind, id.span, ctx.annex_b())
    }

    // ============ BLOCKS ============

    pub(super) fn parse_block_statement(&mut self, ctx: Context) -> Result<BlockStatement, ParseError> {
        self.push_scope(ScopeKind::Block);
        let block = self.parse_block_in_current_scope(ctx);
        self.pop_scope();
        block
    }

    /// `{ ... }` whose declarations go into the scope that is already open.
    pub(super) fn parse_block_in_current_scope(&mut self, ctx: Context) -> Result<BlockStatement, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBrace)?;
        let body = self.parse_statement_list(ctx)?;
        self.require_token(&TokenKind::RBrace)?;
        Ok(BlockStatement {
            body,
            span: self.span_from(start),
        })
    }

    /// Statement list items up to (not including) `}`.
    pub(super) fn parse_statement_list(&mut self, ctx: Context) -> Result<Vec<Statement>, ParseError> {
        let mut body = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            body.push(self.parse_statement_list_item(ctx, false)?);
        }
        Ok(body)
    }

    // ============ CONTROL FLOW ============

    fn parse_if_statement(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::If)?;
        self.require_token(&TokenKind::LParen)?;
        let test = self.parse_expression(ctx.with_in(true))?;
        self.require_token(&TokenKind::RParen)?;

        let consequent = Box::new(self.parse_if_branch(ctx)?);
        let alternate = if self.match_token(&TokenKind::Else)? {
            Some(Box::new(self.parse_if_branch(ctx)?))
        } else {
            None
        };

        Ok(Statement::If(IfStatement {
            test,
            consequent,
            alternate,
            span: self.span_from(start),
        }))
    }

    /// An `if` branch; sloppy scripts may use a plain function declaration,
    /// which gets a block scope of its own.
    fn parse_if_branch(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        if self.check(&TokenKind::Function) && ctx.annex_b() && !self.peek_is(&TokenKind::Star)? {
            trace!("function declaration accepted as if-statement branch");
            return self.parse_scoped_function_declaration(ctx);
        }
        self.parse_statement(ctx)
    }

    fn parse_scoped_function_declaration(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        self.push_scope(ScopeKind::Block);
        let declaration = self.parse_function_declaration(ctx);
        self.pop_scope();
        declaration
    }

    /// Body of an iteration statement.
    ///
    /// Declarations are never allowed here, except that a sloppy script with
    /// legacy compatibility on may use a single plain function declaration.
    fn parse_loop_body(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        let body_ctx = ctx.enter_iteration();
        match &self.current.kind {
            TokenKind::Function => {
                if ctx.annex_b() && !self.peek_is(&TokenKind::Star)? {
                    trace!("function declaration accepted as loop body");
                    self.parse_scoped_function_declaration(body_ctx)
                } else {
                    Err(self.error(
                        ErrorKind::IllegalFunctionInStatementPosition,
                        "Function declarations are not allowed as the body of a loop",
                    ))
                }
            }
            TokenKind::Class => Err(self.error(
                ErrorKind::IllegalFunctionInStatementPosition,
                "Class declarations are not allowed as the body of a loop",
            )),
            _ => self.parse_statement(body_ctx),
        }
    }

    fn parse_while_statement(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::While)?;
        self.require_token(&TokenKind::LParen)?;
        let test = self.parse_expression(ctx.with_in(true))?;
        self.require_token(&TokenKind::RParen)?;
        let body = Box::new(self.parse_loop_body(ctx)?);

        Ok(Statement::While(WhileStatement {
            test,
            body,
            span: self.span_from(start),
        }))
    }

    fn parse_do_while_statement(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Do)?;
        let body = Box::new(self.parse_loop_body(ctx)?);
        self.require_token(&TokenKind::While)?;
        self.require_token(&TokenKind::LParen)?;
        let test = self.parse_expression(ctx.with_in(true))?;
        self.require_token(&TokenKind::RParen)?;
        // A semicolon is inserted after `do ... while (x)` even without a newline
        self.match_token(&TokenKind::Semicolon)?;

        Ok(Statement::DoWhile(DoWhileStatement {
            body,
            test,
            span: self.span_from(start),
        }))
    }

    // ============ FOR STATEMENTS ============

    fn parse_for_statement(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::For)?;

        let is_await = if self.check_contextual("await") {
            if !ctx.allow_await || ctx.in_parameters {
                return Err(self.error(
                    ErrorKind::StrictModeViolation,
                    "for await is only valid in async functions and the top level of modules",
                ));
            }
            self.advance()?;
            true
        } else {
            false
        };

        self.require_token(&TokenKind::LParen)?;

        self.push_scope(ScopeKind::ForHead);
        let result = self.parse_for_head_and_body(ctx, start, is_await);
        self.pop_scope();
        result
    }

    fn parse_for_head_and_body(
        &mut self,
        ctx: Context,
        start: Span,
        is_await: bool,
    ) -> Result<Statement, ParseError> {
        if self.check(&TokenKind::Semicolon) {
            if is_await {
                return Err(self.for_await_error());
            }
            return self.parse_for_tail(ctx, start, None);
        }

        let kind = if self.check(&TokenKind::Var) {
            Some(VariableKind::Var)
        } else if self.check(&TokenKind::Const) {
            Some(VariableKind::Const)
        } else if self.check_contextual("let") && self.let_starts_declaration()? {
            Some(VariableKind::Let)
        } else {
            None
        };

        match kind {
            Some(kind) => self.parse_for_declaration_head(ctx, start, is_await, kind),
            None => self.parse_for_expression_head(ctx, start, is_await),
        }
    }

    /// `for (var|let|const ...`
    fn parse_for_declaration_head(
        &mut self,
        ctx: Context,
        start: Span,
        is_await: bool,
        kind: VariableKind,
    ) -> Result<Statement, ParseError> {
        let head_ctx = ctx.with_in(false);
        let decl_start = self.current.span;
        self.advance()?;

        let first = self.parse_for_declarator(head_ctx)?;

        let is_of = self.check_contextual("of");
        if is_of || self.check(&TokenKind::In) {
            if let Some(init) = &first.init {
                let legacy_initializer = !is_of
                    && kind == VariableKind::Var
                    && first.id.is_simple()
                    && ctx.annex_b()
                    && !is_await;
                if !legacy_initializer {
                    return Err(ParseError::new(
                        ErrorKind::InvalidForHead,
                        format!(
                            "for-{} loop variable declaration may not have an initializer",
                            if is_of { "of" } else { "in" }
                        ),
                        init.span(),
                    ));
                }
                trace!("initializer accepted in for-in variable declaration");
            }
            if is_await && !is_of {
                return Err(self.for_await_error());
            }

            self.declare_for_binding(&first.id, kind, is_of, ctx)?;
            let declaration = VariableDeclaration {
                kind,
                declarations: vec![first],
                span: self.span_from(decl_start),
            };
            return self.parse_for_in_of_tail(ctx, start, ForInOfLeft::Variable(declaration), is_of, is_await);
        }

        self.declare_for_binding(&first.id, kind, false, ctx)?;
        check_classic_for_declarator(kind, &first)?;

        let mut declarations = vec![first];
        while self.match_token(&TokenKind::Comma)? {
            let declarator = self.parse_for_declarator(head_ctx)?;
            self.declare_for_binding(&declarator.id, kind, false, ctx)?;
            check_classic_for_declarator(kind, &declarator)?;
            declarations.push(declarator);
        }

        if self.check(&TokenKind::In) || self.check_contextual("of") {
            return Err(self.error(
                ErrorKind::InvalidForHead,
                "Invalid left-hand side in for loop: must have a single binding",
            ));
        }
        if is_await {
            return Err(self.for_await_error());
        }

        let declaration = VariableDeclaration {
            kind,
            declarations,
            span: self.span_from(decl_start),
        };
        self.parse_for_tail(ctx, start, Some(ForInit::Variable(declaration)))
    }

    /// One declarator of a `for` head. Destructuring errors in the head are
    /// reported as for-head errors.
    fn parse_for_declarator(&mut self, head_ctx: Context) -> Result<VariableDeclarator, ParseError> {
        let start = self.current.span;
        let id = self
            .parse_binding_target(head_ctx)
            .map_err(|err| err.recast(ErrorKind::InvalidDestructuringTarget, ErrorKind::InvalidForHead))?;
        let init = if self.match_token(&TokenKind::Eq)? {
            Some(self.parse_assignment_expression(head_ctx)?)
        } else {
            None
        };
        Ok(VariableDeclarator {
            id,
            init,
            span: self.span_from(start),
        })
    }

    fn declare_for_binding(
        &mut self,
        id: &Pattern,
        kind: VariableKind,
        is_of: bool,
        ctx: Context,
    ) -> Result<(), ParseError> {
        if kind != VariableKind::Var {
            return self.declare_pattern(id, binding_kind(kind), ctx);
        }
        let origin = if is_of {
            VarOrigin::ForOf
        } else {
            VarOrigin::Declaration
        };
        let mut names = Vec::new();
        id.bound_names(&mut names);
        for name in names {
            self.scopes.declare_var(&name.name, name.span, origin)?;
        }
        Ok(())
    }

    /// `for (expr ...`
    fn parse_for_expression_head(
        &mut self,
        ctx: Context,
        start: Span,
        is_await: bool,
    ) -> Result<Statement, ParseError> {
        let head_token = self.current.clone();
        let starts_with_let = self.check_contextual("let");
        let starts_with_async = self.check_contextual("async");

        let mark = self.cover_errors.len();
        let expr = self.parse_expression_cover(ctx.with_in(false))?;

        let is_of = self.check_contextual("of");
        if is_of || self.check(&TokenKind::In) {
            if is_of && starts_with_let {
                return Err(ParseError::new(
                    ErrorKind::InvalidForHead,
                    "The left-hand side of a for-of loop may not start with 'let'",
                    head_token.span,
                ));
            }
            let bare_async = matches!(&expr, Expression::Identifier(id) if id.span == head_token.span);
            if is_of && !is_await && starts_with_async && bare_async {
                return Err(ParseError::new(
                    ErrorKind::InvalidForHead,
                    "The left-hand side of a for-of loop may not be 'async'",
                    head_token.span,
                ));
            }
            if is_await && !is_of {
                return Err(self.for_await_error());
            }

            let target = self
                .to_assignment_target(expr, ctx)
                .map_err(|err| err.recast(ErrorKind::InvalidDestructuringTarget, ErrorKind::InvalidLeftHandSide))?;
            self.check_cover_errors(mark)?;
            return self.parse_for_in_of_tail(ctx, start, ForInOfLeft::Pattern(target), is_of, is_await);
        }

        self.check_cover_errors(mark)?;
        if is_await {
            return Err(self.for_await_error());
        }
        self.parse_for_tail(ctx, start, Some(ForInit::Expression(expr)))
    }

    /// After the left side of a for-in/for-of: the keyword, the right side
    /// and the body.
    fn parse_for_in_of_tail(
        &mut self,
        ctx: Context,
        start: Span,
        left: ForInOfLeft,
        is_of: bool,
        is_await: bool,
    ) -> Result<Statement, ParseError> {
        self.advance()?;

        let right = if is_of {
            self.parse_assignment_expression(ctx.with_in(true))?
        } else {
            self.parse_expression(ctx.with_in(true))?
        };

        if self.check(&TokenKind::Semicolon) {
            return Err(self.error(
                ErrorKind::InvalidForHead,
                format!("Unexpected ';' in for-{} loop head", if is_of { "of" } else { "in" }),
            ));
        }
        self.require_token(&TokenKind::RParen)?;
        let body = Box::new(self.parse_loop_body(ctx)?);
        let span = self.span_from(start);

        Ok(if is_of {
            Statement::ForOf(ForOfStatement {
                left,
                right,
                body,
                await_: is_await,
                span,
            })
        } else {
            Statement::ForIn(ForInStatement {
                left,
                right,
                body,
                span,
            })
        })
    }

    /// `; test ; update ) body` of a classic for statement.
    fn parse_for_tail(
        &mut self,
        ctx: Context,
        start: Span,
        init: Option<ForInit>,
    ) -> Result<Statement, ParseError> {
        self.require_token(&TokenKind::Semicolon)?;

        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression(ctx.with_in(true))?)
        };

        self.require_token(&TokenKind::Semicolon)?;

        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression(ctx.with_in(true))?)
        };

        self.require_token(&TokenKind::RParen)?;
        let body = Box::new(self.parse_loop_body(ctx)?);

        Ok(Statement::For(ForStatement {
            init,
            test,
            update,
            body,
            span: self.span_from(start),
        }))
    }

    fn for_await_error(&self) -> ParseError {
        self.error(
            ErrorKind::InvalidForHead,
            "for await is only valid with for-of loops",
        )
    }

    // ============ SWITCH / TRY / WITH ============

    fn parse_switch_statement(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Switch)?;
        self.require_token(&TokenKind::LParen)?;
        let discriminant = self.parse_expression(ctx.with_in(true))?;
        self.require_token(&TokenKind::RParen)?;
        self.require_token(&TokenKind::LBrace)?;

        self.push_scope(ScopeKind::Switch);
        let cases = self.parse_switch_cases(ctx.enter_switch());
        self.pop_scope();
        let cases = cases?;

        self.require_token(&TokenKind::RBrace)?;
        Ok(Statement::Switch(SwitchStatement {
            discriminant,
            cases,
            span: self.span_from(start),
        }))
    }

    fn parse_switch_cases(&mut self, ctx: Context) -> Result<Vec<SwitchCase>, ParseError> {
        let mut cases = vec![];
        let mut seen_default = false;

        while !self.check(&TokenKind::RBrace) {
            let case_start = self.current.span;
            let test = if self.match_token(&TokenKind::Case)? {
                Some(self.parse_expression(ctx.with_in(true))?)
            } else if self.check(&TokenKind::Default) {
                if seen_default {
                    return Err(self.error(
                        ErrorKind::UnexpectedToken,
                        "More than one default clause in switch statement",
                    ));
                }
                seen_default = true;
                self.advance()?;
                None
            } else {
                return Err(self.unexpected_token("'case', 'default' or '}'"));
            };
            self.require_token(&TokenKind::Colon)?;

            let mut consequent = vec![];
            while !self.check(&TokenKind::Case)
                && !self.check(&TokenKind::Default)
                && !self.check(&TokenKind::RBrace)
                && !self.is_at_end()
            {
                consequent.push(self.parse_statement_list_item(ctx, false)?);
            }

            cases.push(SwitchCase {
                test,
                consequent,
                span: self.span_from(case_start),
            });
        }

        Ok(cases)
    }

    fn parse_try_statement(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Try)?;
        let block = self.parse_block_statement(ctx)?;

        let handler = if self.check(&TokenKind::Catch) {
            self.push_scope(ScopeKind::Catch);
            let handler = self.parse_catch_clause(ctx);
            self.pop_scope();
            Some(handler?)
        } else {
            None
        };

        let finalizer = if self.match_token(&TokenKind::Finally)? {
            Some(self.parse_block_statement(ctx)?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(self.error(ErrorKind::UnexpectedToken, "Missing catch or finally after try"));
        }

        Ok(Statement::Try(TryStatement {
            block,
            handler,
            finalizer,
            span: self.span_from(start),
        }))
    }

    /// `catch (param) { ... }`; the parameter and the body share one scope.
    fn parse_catch_clause(&mut self, ctx: Context) -> Result<CatchClause, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Catch)?;

        let param = if self.match_token(&TokenKind::LParen)? {
            let param = self.parse_binding_target(ctx)?;
            self.scopes.set_simple_catch(param.is_simple());
            self.declare_pattern(&param, BindingKind::CatchParam, ctx)?;
            self.require_token(&TokenKind::RParen)?;
            Some(param)
        } else {
            None
        };

        let body = self.parse_block_in_current_scope(ctx)?;
        Ok(CatchClause {
            param,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_with_statement(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        if ctx.strict {
            return Err(self.error(
                ErrorKind::StrictModeViolation,
                "Strict mode code may not include a with statement",
            ));
        }
        let start = self.current.span;
        self.require_token(&TokenKind::With)?;
        self.require_token(&TokenKind::LParen)?;
        let object = self.parse_expression(ctx.with_in(true))?;
        self.require_token(&TokenKind::RParen)?;
        let body = Box::new(self.parse_statement(ctx)?);

        Ok(Statement::With(WithStatement {
            object,
            body,
            span: self.span_from(start),
        }))
    }

    // ============ JUMPS ============

    fn parse_return_statement(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        if !ctx.in_function_body {
            return Err(self.error(ErrorKind::InvalidControlFlow, "Illegal return statement"));
        }
        let start = self.current.span;
        self.require_token(&TokenKind::Return)?;

        let argument = if self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.is_at_end()
            || self.current.newline_before
        {
            None
        } else {
            Some(self.parse_expression(ctx.with_in(true))?)
        };

        self.expect_semicolon()?;
        Ok(Statement::Return(ReturnStatement {
            argument,
            span: self.span_from(start),
        }))
    }

    /// Optional label after `break`/`continue`, on the same line.
    fn parse_jump_label(&mut self, ctx: Context) -> Result<Option<Identifier>, ParseError> {
        if matches!(self.current.kind, TokenKind::Identifier(_)) && !self.current.newline_before {
            Ok(Some(self.parse_identifier_reference(ctx)?))
        } else {
            Ok(None)
        }
    }

    fn parse_break_statement(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Break)?;
        let label = self.parse_jump_label(ctx)?;

        match &label {
            Some(label) => {
                if !self.labels.iter().any(|l| l.name == label.name) {
                    return Err(ParseError::new(
                        ErrorKind::InvalidControlFlow,
                        format!("Undefined label '{}'", label.name),
                        label.span,
                    ));
                }
            }
            None => {
                if ctx.iteration_depth == 0 && ctx.switch_depth == 0 {
                    return Err(ParseError::new(
                        ErrorKind::InvalidControlFlow,
                        "Illegal break statement",
                        start,
                    ));
                }
            }
        }

        self.expect_semicolon()?;
        Ok(Statement::Break(BreakStatement {
            label,
            span: self.span_from(start),
        }))
    }

    fn parse_continue_statement(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Continue)?;
        let label = self.parse_jump_label(ctx)?;

        if ctx.iteration_depth == 0 {
            return Err(ParseError::new(
                ErrorKind::InvalidControlFlow,
                "Illegal continue statement: no surrounding iteration statement",
                start,
            ));
        }
        if let Some(label) = &label {
            let target = self.labels.iter().find(|l| l.name == label.name);
            match target {
                Some(l) if l.is_loop => {}
                Some(_) => {
                    return Err(ParseError::new(
                        ErrorKind::InvalidControlFlow,
                        format!(
                            "Illegal continue statement: '{}' does not denote an iteration statement",
                            label.name
                        ),
                        label.span,
                    ));
                }
                None => {
                    return Err(ParseError::new(
                        ErrorKind::InvalidControlFlow,
                        format!("Undefined label '{}'", label.name),
                        label.span,
                    ));
                }
            }
        }

        self.expect_semicolon()?;
        Ok(Statement::Continue(ContinueStatement {
            label,
            span: self.span_from(start),
        }))
    }

    fn parse_throw_statement(&mut self, ctx: Context) -> Result<Statement, ParseError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Throw)?;
        if self.current.newline_before {
            return Err(self.error(ErrorKind::UnexpectedToken, "Illegal newline after throw"));
        }
        let argument = self.parse_expression(ctx.with_in(true))?;
        self.expect_semicolon()?;
        Ok(Statement::Throw(ThrowStatement {
            argument,
            span: self.span_from(start),
        }))
    }

    /// `a: b: body`. Every label of the chain names a loop if the body is
    /// one.
    fn parse_labeled_statement(&mut self, ctx: Context, single: bool) -> Result<Statement, ParseError> {
        let mut chain: Vec<Identifier> = vec![];
        loop {
            let label = self.parse_identifier_reference(ctx)?;
            let duplicate = self.labels.iter().any(|l| l.name == label.name)
                || chain.iter().any(|l| l.name == label.name);
            if duplicate {
                return Err(ParseError::new(
                    ErrorKind::InvalidControlFlow,
                    format!("Label '{}' has already been declared", label.name),
                    label.span,
                ));
            }
            self.require_token(&TokenKind::Colon)?;
            chain.push(label);

            let more = matches!(self.current.kind, TokenKind::Identifier(_))
                && self.peek_is(&TokenKind::Colon)?;
            if !more {
                break;
            }
        }

        let is_loop = matches!(
            self.current.kind,
            TokenKind::For | TokenKind::While | TokenKind::Do
        );
        let saved_len = self.labels.len();
        for label in &chain {
            self.labels.push(Label {
                name: label.name.clone(),
                is_loop,
            });
        }

        let body = if self.check(&TokenKind::Function) {
            if single || !ctx.annex_b() || self.peek_is(&TokenKind::Star)? {
                Err(self.error(
                    ErrorKind::IllegalFunctionInStatementPosition,
                    "Labelled function declarations are not allowed here",
                ))
            } else {
                trace!("labelled function declaration accepted");
                self.parse_function_declaration(ctx)
            }
        } else {
            self.parse_statement(ctx)
        };
        self.labels.truncate(saved_len);
        let mut body = body?;

        for label in chain.into_iter().rev() {
            let span = self.span_from(label.span);
            body = Statement::Labeled(LabeledStatement {
                label,
                body: Box::new(body),
                span,
            });
        }
        Ok(body)
    }
}

pub(super) fn binding_kind(kind: VariableKind) -> BindingKind {
    match kind {
        VariableKind::Var => BindingKind::Var,
        VariableKind::Let => BindingKind::Let,
        VariableKind::Const => BindingKind::Const,
    }
}

/// A classic for head requires `const` and destructuring declarators to be
/// initialized.
fn check_classic_for_declarator(kind: VariableKind, declarator: &VariableDeclarator) -> Result<(), ParseError> {
    if declarator.init.is_some() {
        return Ok(());
    }
    if kind == VariableKind::Const {
        return Err(ParseError::new(
            ErrorKind::InvalidForHead,
            "Missing initializer in const declaration",
            declarator.span,
        ));
    }
    if !declarator.id.is_simple() {
        return Err(ParseError::new(
            ErrorKind::InvalidForHead,
            "Missing initializer in destructuring declaration",
            declarator.span,
        ));
    }
    Ok(())
}
