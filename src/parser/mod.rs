//! Parser for ECMAScript source code
//!
//! Uses recursive descent with precedence climbing for binary expressions.
//! Array literals, object literals and parenthesized expressions are read
//! once as expressions and reinterpreted as patterns when a later token
//! (`=`, `=>`, `in`, `of`) shows that a pattern was meant. Errors that only
//! apply when such a literal stays an expression are parked as cover errors
//! and reported by the enclosing assignment expression if nothing claimed
//! them.
//!
//! The grammar [`Context`] is passed by value into every production; the
//! [`ScopeTracker`] is the only declaration state kept on the parser.

mod expression;
mod function;
mod module;
mod pattern;
mod statement;

use crate::ast::*;
use crate::context::Context;
use crate::error::{ErrorKind, ParseError};
use crate::lexer::{Lexer, Span, Token, TokenKind, keyword_kind};
use crate::options::ParseOptions;
use crate::prelude::FxHashSet;
use crate::scope::{ScopeKind, ScopeTracker};
use crate::string_dict::{Atom, StringDict};

/// Words reserved only in strict mode code.
const STRICT_RESERVED: &[&str] = &[
    "implements",
    "interface",
    "let",
    "package",
    "private",
    "protected",
    "public",
    "static",
    "yield",
];

fn is_strict_reserved(name: &str) -> bool {
    STRICT_RESERVED.contains(&name)
}

/// An error that only applies if a literal is finally read as an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoverErrorKind {
    /// `{x = 1}` outside a pattern
    ShorthandInit,
    /// Two `__proto__: value` entries in one object literal
    DuplicateProto,
}

#[derive(Debug, Clone, Copy)]
struct CoverError {
    kind: CoverErrorKind,
    span: Span,
}

impl CoverError {
    fn into_error(self) -> ParseError {
        match self.kind {
            CoverErrorKind::ShorthandInit => ParseError::new(
                ErrorKind::InvalidDestructuringTarget,
                "Invalid shorthand property initializer",
                self.span,
            ),
            CoverErrorKind::DuplicateProto => ParseError::new(
                ErrorKind::UnexpectedToken,
                "Duplicate __proto__ fields are not allowed in object literals",
                self.span,
            ),
        }
    }
}

#[derive(Debug, Clone)]
struct Label {
    name: Atom,
    /// The label (directly or through other labels) names a loop
    is_loop: bool,
}

/// Private names declared and used inside one class body.
#[derive(Debug, Default)]
struct PrivateNameScope {
    /// Name -> (accessor kind, is static); `None` for fields and methods
    declared: Vec<(Atom, Option<MethodKind>, bool)>,
    used: Vec<(Atom, Span)>,
}

/// Parser for ECMAScript source code
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    previous: Token,
    options: ParseOptions,
    scopes: ScopeTracker,
    cover_errors: Vec<CoverError>,
    /// Offset where the innermost assignment expression began; only an
    /// arrow head starting there may be followed by `=>`
    assignment_start: usize,
    /// Yield and await expressions seen in the current function
    yield_await: Vec<Span>,
    labels: Vec<Label>,
    private_names: Vec<PrivateNameScope>,
    depth: u32,
    exported_names: FxHashSet<Atom>,
    /// `export { x }` locals, checked once the whole module is read
    local_exports: Vec<(Atom, Span)>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, string_dict: &'a mut StringDict, options: ParseOptions) -> Self {
        let module = options.module;
        Self {
            lexer: Lexer::new(source, string_dict),
            current: Token::eof(0, 1, 1),
            previous: Token::eof(0, 1, 1),
            options,
            scopes: ScopeTracker::new(module),
            cover_errors: Vec::new(),
            assignment_start: 0,
            yield_await: Vec::new(),
            labels: Vec::new(),
            private_names: Vec::new(),
            depth: 0,
            exported_names: FxHashSet::default(),
            local_exports: Vec::new(),
        }
    }

    /// Helper to intern a string in the dictionary
    #[inline]
    fn intern(&mut self, s: &str) -> Atom {
        self.lexer.string_dict().get_or_insert(s)
    }

    /// Parse a complete program
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        self.advance()?;
        let ctx = Context::from_options(&self.options);

        let (body, _) = self.parse_body_with_directives(ctx, true)?;

        for (name, span) in std::mem::take(&mut self.local_exports) {
            if !self.scopes.is_declared_at_top(&name) {
                return Err(ParseError::new(
                    ErrorKind::UndefinedExport,
                    format!("Export '{}' is not defined", name),
                    span,
                ));
            }
        }

        let source = self.lexer.source();
        let source_type = if self.options.module {
            SourceType::Module
        } else {
            SourceType::Script
        };
        Ok(Program {
            body,
            source_type,
            span: Span::new(0, source.len(), 1, 1),
        })
    }

    /// Parse a statement list that may open with a directive prologue, up
    /// to `}` (function bodies) or end of input (`top_level`).
    ///
    /// Returns the statements and whether a `"use strict"` directive was
    /// found.
    fn parse_body_with_directives(
        &mut self,
        ctx: Context,
        top_level: bool,
    ) -> Result<(Vec<Statement>, bool), ParseError> {
        let mut ctx = ctx;
        let mut body = Vec::new();
        let mut in_prologue = true;
        let mut use_strict = false;
        let mut octal_in_prologue: Option<Span> = None;

        loop {
            let at_end = if top_level {
                self.is_at_end()
            } else {
                self.check(&TokenKind::RBrace)
            };
            if at_end {
                break;
            }

            if in_prologue {
                if let TokenKind::String(_) = self.current.kind {
                    let token = self.current.clone();
                    let statement = self.parse_statement_list_item(ctx, top_level)?;
                    let statement = match statement {
                        Statement::Expression(mut stmt) if is_exactly_token(&stmt.expression, &token) => {
                            let raw = self.directive_raw(token.span);
                            if token.legacy_octal && octal_in_prologue.is_none() {
                                octal_in_prologue = Some(token.span);
                            }
                            if raw == "use strict" {
                                use_strict = true;
                                if let Some(span) = octal_in_prologue {
                                    return Err(ParseError::new(
                                        ErrorKind::StrictModeViolation,
                                        "Octal escape sequences are not allowed in strict mode",
                                        span,
                                    ));
                                }
                                ctx = ctx.with_strict(true);
                            }
                            stmt.directive = Some(raw);
                            Statement::Expression(stmt)
                        }
                        other => {
                            in_prologue = false;
                            other
                        }
                    };
                    body.push(statement);
                    continue;
                }
                in_prologue = false;
            }

            body.push(self.parse_statement_list_item(ctx, top_level)?);
        }

        Ok((body, use_strict))
    }

    /// Raw text of a directive string token, without its quotes.
    fn directive_raw(&mut self, span: Span) -> Atom {
        let text = self
            .lexer
            .source()
            .get(span.start + 1..span.end.saturating_sub(1))
            .unwrap_or("");
        self.intern(text)
    }

    // ============ CONTEXT HELPERS ============

    /// Enter one level of syntactic nesting.
    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.options.max_nesting_depth {
            return Err(ParseError::new(
                ErrorKind::UnexpectedToken,
                "maximum nesting depth exceeded",
                self.current.span,
            ));
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Report the first cover error recorded since `mark`.
    fn check_cover_errors(&mut self, mark: usize) -> Result<(), ParseError> {
        if let Some(err) = self.cover_errors.get(mark).copied() {
            return Err(err.into_error());
        }
        Ok(())
    }

    /// Drop the cover error of `kind` recorded for exactly `span`.
    fn discard_cover_error(&mut self, kind: CoverErrorKind, span: Span) {
        self.cover_errors
            .retain(|err| !(err.kind == kind && err.span == span));
    }

    /// Run `f` with a fresh label set, as function bodies do.
    fn with_function_state<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let labels = std::mem::take(&mut self.labels);
        let yield_await_mark = self.yield_await.len();
        let result = f(self);
        self.labels = labels;
        self.yield_await.truncate(yield_await_mark);
        result
    }

    fn push_scope(&mut self, kind: ScopeKind) {
        self.scopes.push(kind);
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    // ============ IDENTIFIERS ============

    /// Validate `name` used as an identifier reference or label.
    fn check_identifier_reference(
        &self,
        name: &str,
        escaped: bool,
        span: Span,
        ctx: Context,
    ) -> Result<(), ParseError> {
        if escaped && keyword_kind(name).is_some() {
            return Err(ParseError::new(
                ErrorKind::ReservedWordUsage,
                "Keyword must not contain escaped characters",
                span,
            ));
        }
        if ctx.strict && is_strict_reserved(name) {
            return Err(ParseError::new(
                ErrorKind::ReservedWordUsage,
                format!("Unexpected strict mode reserved word '{}'", name),
                span,
            ));
        }
        match name {
            "yield" if ctx.allow_yield => Err(ParseError::new(
                ErrorKind::ReservedWordUsage,
                "Cannot use 'yield' as an identifier inside a generator",
                span,
            )),
            "await" if ctx.allow_await || ctx.module || ctx.in_static_block => {
                Err(ParseError::new(
                    ErrorKind::ReservedWordUsage,
                    "Cannot use 'await' as an identifier here",
                    span,
                ))
            }
            "arguments" if ctx.in_class_field => Err(ParseError::new(
                ErrorKind::ReservedWordUsage,
                "'arguments' is not allowed in class field initializer or static initialization block",
                span,
            )),
            _ => Ok(()),
        }
    }

    /// Validate `name` used as a binding.
    fn check_binding_identifier(
        &self,
        name: &str,
        escaped: bool,
        span: Span,
        ctx: Context,
    ) -> Result<(), ParseError> {
        if ctx.strict && (name == "eval" || name == "arguments") {
            return Err(ParseError::new(
                ErrorKind::StrictModeViolation,
                format!("Unexpected eval or arguments in strict mode: '{}'", name),
                span,
            ));
        }
        self.check_identifier_reference(name, escaped, span, ctx)
    }

    fn parse_identifier_reference(&mut self, ctx: Context) -> Result<Identifier, ParseError> {
        let TokenKind::Identifier(name) = &self.current.kind else {
            return Err(self.unexpected_token("identifier"));
        };
        let name = name.clone();
        let span = self.current.span;
        self.check_identifier_reference(&name, self.current.escaped, span, ctx)?;
        self.advance()?;
        Ok(Identifier { name, span })
    }

    fn parse_binding_identifier(&mut self, ctx: Context) -> Result<Identifier, ParseError> {
        let TokenKind::Identifier(name) = &self.current.kind else {
            return Err(self.unexpected_token("identifier"));
        };
        let name = name.clone();
        let span = self.current.span;
        self.check_binding_identifier(&name, self.current.escaped, span, ctx)?;
        self.advance()?;
        Ok(Identifier { name, span })
    }

    /// Any identifier or reserved word, as after `.` or in a property key.
    fn parse_identifier_name(&mut self) -> Result<Identifier, ParseError> {
        let Some(name) = self.current_identifier_name() else {
            return Err(self.unexpected_token("identifier"));
        };
        let span = self.current.span;
        self.advance()?;
        Ok(Identifier { name, span })
    }

    fn current_identifier_name(&mut self) -> Option<Atom> {
        match &self.current.kind {
            TokenKind::Identifier(name) => Some(name.clone()),
            kind => {
                let word = kind.keyword_str()?;
                Some(self.intern(word))
            }
        }
    }

    /// Current token is the unescaped contextual keyword `word`.
    fn check_contextual(&self, word: &str) -> bool {
        !self.current.escaped && matches!(&self.current.kind, TokenKind::Identifier(s) if s == word)
    }

    // ============ TOKEN HELPERS ============

    fn advance(&mut self) -> Result<(), ParseError> {
        let next = self.lexer.next_token()?;
        self.previous = std::mem::replace(&mut self.current, next);
        Ok(())
    }

    fn require_token(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance()
        } else {
            Err(self.unexpected_token(&token_description(kind)))
        }
    }

    fn expect_semicolon(&mut self) -> Result<(), ParseError> {
        if self.check(&TokenKind::Semicolon) {
            return self.advance();
        }

        // ASI: accept if at end, before }, or after newline
        if self.is_at_end() || self.check(&TokenKind::RBrace) || self.current.newline_before {
            return Ok(());
        }

        Err(self.unexpected_token("';'"))
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    /// Look at the token after the current one without consuming anything.
    fn peek_token(&mut self) -> Result<Token, ParseError> {
        let checkpoint = self.lexer.checkpoint();
        let next = self.lexer.next_token();
        self.lexer.restore(checkpoint);
        next
    }

    /// Check if the next token (after current) is of the given kind
    fn peek_is(&mut self, kind: &TokenKind) -> Result<bool, ParseError> {
        let next = self.peek_token()?;
        Ok(std::mem::discriminant(&next.kind) == std::mem::discriminant(kind))
    }

    fn match_token(&mut self, kind: &TokenKind) -> Result<bool, ParseError> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn is_at_end(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    /// Replace a `/` or `/=` token with the regular expression it starts.
    fn rescan_regexp(&mut self) -> Result<(), ParseError> {
        let newline_before = self.current.newline_before;
        let mut token = self.lexer.rescan_as_regexp(self.current.span)?;
        token.newline_before = newline_before;
        self.current = token;
        Ok(())
    }

    fn span_from(&self, start: Span) -> Span {
        Span::new(
            start.start,
            self.previous.span.end,
            start.line,
            start.column,
        )
    }

    fn error(&self, kind: ErrorKind, message: impl Into<String>) -> ParseError {
        ParseError::new(kind, message, self.current.span)
    }

    fn unexpected_token(&self, expected: &str) -> ParseError {
        let found = match &self.current.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!(
                "token '{}'",
                self.lexer
                    .source()
                    .get(self.current.span.start..self.current.span.end)
                    .unwrap_or("")
            ),
        };
        ParseError::new(
            ErrorKind::UnexpectedToken,
            format!("Unexpected {}, expected {}", found, expected),
            self.current.span,
        )
    }

    /// Reject a legacy octal literal or escape in strict code.
    fn check_legacy_octal(&self, ctx: Context) -> Result<(), ParseError> {
        if ctx.strict && self.current.legacy_octal {
            return Err(self.error(
                ErrorKind::StrictModeViolation,
                "Octal literals and escape sequences are not allowed in strict mode",
            ));
        }
        Ok(())
    }
}

/// The expression is nothing but the literal read from `token`.
fn is_exactly_token(expr: &Expression, token: &Token) -> bool {
    matches!(expr, Expression::Literal(lit) if lit.span == token.span)
}

fn token_description(kind: &TokenKind) -> String {
    let text = match kind {
        TokenKind::LParen => "(",
        TokenKind::RParen => ")",
        TokenKind::LBrace => "{",
        TokenKind::RBrace => "}",
        TokenKind::LBracket => "[",
        TokenKind::RBracket => "]",
        TokenKind::Semicolon => ";",
        TokenKind::Colon => ":",
        TokenKind::Comma => ",",
        TokenKind::Dot => ".",
        TokenKind::Eq => "=",
        TokenKind::Arrow => "=>",
        TokenKind::Identifier(_) => "identifier",
        TokenKind::String(_) => "string",
        other => match other.keyword_str() {
            Some(word) => word,
            None => return format!("{:?}", other),
        },
    };
    format!("'{}'", text)
}
