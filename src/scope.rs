//! Declaration scopes and redeclaration checks.
//!
//! Scopes live in an append-only arena and refer to their parent by index.
//! The parser pushes a frame when it enters a block, function, catch clause,
//! for-head, switch or static block, and pops it on exit; popped frames stay
//! in the arena but are never consulted again.
//!
//! `var` declarations walk from the current frame up to the nearest function
//! boundary and are recorded in every frame they pass through, so a later
//! lexical declaration in any of those frames sees the conflict.

use crate::error::{ErrorKind, ParseError};
use crate::lexer::Span;
use crate::prelude::{FxHashSet, IndexMap, index_map_new};
use crate::string_dict::Atom;

/// Index of a [`Scope`] in the tracker's arena.
pub type ScopeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Script or module top level
    Program,
    Function,
    Block,
    /// Catch parameter together with the catch body
    Catch,
    /// Declarations made in a `for (let ...)` head
    ForHead,
    /// All `case` clauses of one switch statement
    Switch,
    StaticBlock,
}

impl ScopeKind {
    /// `var` declarations stop at this frame.
    pub fn is_var_boundary(self) -> bool {
        matches!(
            self,
            ScopeKind::Program | ScopeKind::Function | ScopeKind::StaticBlock
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Let,
    Const,
    Class,
    /// Plain `function` declaration
    Function,
    /// `async function`, `function*` or `async function*` declaration
    AsyncOrGeneratorFunction,
    Param,
    CatchParam,
    Import,
}

impl BindingKind {
    pub fn is_lexical(self) -> bool {
        matches!(
            self,
            BindingKind::Let
                | BindingKind::Const
                | BindingKind::Class
                | BindingKind::Import
                | BindingKind::Function
                | BindingKind::AsyncOrGeneratorFunction
        )
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// Lexically declared names in declaration order
    pub lexical: IndexMap<Atom, BindingKind>,
    /// Var-declared names declared here or hoisted through here
    pub vars: FxHashSet<Atom>,
    pub params: FxHashSet<Atom>,
    pub catch_params: FxHashSet<Atom>,
    /// The catch parameter is a single identifier
    pub simple_catch: bool,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Scope {
            kind,
            parent,
            lexical: index_map_new(),
            vars: FxHashSet::default(),
            params: FxHashSet::default(),
            catch_params: FxHashSet::default(),
            simple_catch: false,
        }
    }
}

/// Where a `var` binding came from; the Annex B catch-parameter exemption
/// does not cover `for (var e of ...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarOrigin {
    Declaration,
    ForOf,
}

pub struct ScopeTracker {
    scopes: Vec<Scope>,
    current: ScopeId,
    /// Top-level function declarations are lexical in modules
    module: bool,
}

impl ScopeTracker {
    pub fn new(module: bool) -> Self {
        ScopeTracker {
            scopes: vec![Scope::new(ScopeKind::Program, None)],
            current: 0,
            module,
        }
    }

    pub fn current_kind(&self) -> ScopeKind {
        self.scope(self.current)
            .map(|scope| scope.kind)
            .unwrap_or(ScopeKind::Program)
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    pub fn push(&mut self, kind: ScopeKind) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Scope::new(kind, Some(self.current)));
        self.current = id;
        id
    }

    pub fn pop(&mut self) {
        if let Some(parent) = self.scope(self.current).and_then(|scope| scope.parent) {
            self.current = parent;
        }
    }

    /// Mark the current catch frame's parameter as a plain identifier.
    pub fn set_simple_catch(&mut self, simple: bool) {
        if let Some(scope) = self.scopes.get_mut(self.current) {
            scope.simple_catch = simple;
        }
    }

    /// Record `name` in the current frame.
    ///
    /// `annex_b` enables the sloppy-mode rule that lets two plain function
    /// declarations share a name inside one block.
    pub fn declare(
        &mut self,
        name: &Atom,
        kind: BindingKind,
        span: Span,
        annex_b: bool,
    ) -> Result<(), ParseError> {
        match kind {
            BindingKind::Var => self.declare_var(name, span, VarOrigin::Declaration),
            BindingKind::Param => {
                if let Some(scope) = self.scopes.get_mut(self.current) {
                    scope.params.insert(name.clone());
                }
                Ok(())
            }
            BindingKind::CatchParam => {
                let inserted = self
                    .scopes
                    .get_mut(self.current)
                    .is_some_and(|scope| scope.catch_params.insert(name.clone()));
                if inserted {
                    Ok(())
                } else {
                    Err(duplicate(name, span))
                }
            }
            BindingKind::Function | BindingKind::AsyncOrGeneratorFunction
                if self.functions_are_var_scoped() =>
            {
                self.declare_var(name, span, VarOrigin::Declaration)
            }
            _ => self.declare_lexical(name, kind, span, annex_b),
        }
    }

    /// Function declarations directly in a function body or at script top
    /// level behave like `var`.
    fn functions_are_var_scoped(&self) -> bool {
        match self.current_kind() {
            ScopeKind::Function | ScopeKind::StaticBlock => true,
            ScopeKind::Program => !self.module,
            _ => false,
        }
    }

    fn declare_lexical(
        &mut self,
        name: &Atom,
        kind: BindingKind,
        span: Span,
        annex_b: bool,
    ) -> Result<(), ParseError> {
        let Some(scope) = self.scopes.get_mut(self.current) else {
            return Ok(());
        };

        if let Some(existing) = scope.lexical.get(name) {
            let both_plain_functions =
                *existing == BindingKind::Function && kind == BindingKind::Function;
            if !(annex_b && both_plain_functions) {
                return Err(duplicate(name, span));
            }
        }
        if scope.vars.contains(name) {
            return Err(duplicate(name, span));
        }
        if scope.kind == ScopeKind::Function && scope.params.contains(name) {
            return Err(duplicate(name, span));
        }
        if scope.catch_params.contains(name) {
            return Err(duplicate(name, span));
        }

        scope.lexical.insert(name.clone(), kind);
        Ok(())
    }

    /// Hoist a `var` binding to the nearest function boundary.
    pub fn declare_var(&mut self, name: &Atom, span: Span, origin: VarOrigin) -> Result<(), ParseError> {
        let mut id = Some(self.current);
        while let Some(scope) = id.and_then(|id| self.scopes.get_mut(id)) {
            if scope.lexical.contains_key(name) {
                return Err(duplicate(name, span));
            }
            if scope.catch_params.contains(name)
                && !(scope.simple_catch && origin == VarOrigin::Declaration)
            {
                return Err(duplicate(name, span));
            }
            scope.vars.insert(name.clone());
            if scope.kind.is_var_boundary() {
                break;
            }
            id = scope.parent;
        }
        Ok(())
    }

    /// Whether the program frame declares `name` in any way.
    pub fn is_declared_at_top(&self, name: &str) -> bool {
        self.scopes
            .first()
            .is_some_and(|top| top.lexical.contains_key(name) || top.vars.contains(name))
    }
}

fn duplicate(name: &Atom, span: Span) -> ParseError {
    ParseError::new(
        ErrorKind::DuplicateBinding,
        format!("Identifier '{}' has already been declared", name),
        span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(s: &str) -> Atom {
        Atom::from(s)
    }

    fn kind_of(result: Result<(), ParseError>) -> Option<ErrorKind> {
        result.err().map(|err| err.kind)
    }

    #[test]
    fn test_lexical_duplicate_in_same_frame() {
        let mut scopes = ScopeTracker::new(false);
        let z = atom("z");
        assert!(scopes.declare(&z, BindingKind::Let, Span::default(), true).is_ok());
        assert_eq!(
            kind_of(scopes.declare(&z, BindingKind::Let, Span::default(), true)),
            Some(ErrorKind::DuplicateBinding)
        );
    }

    #[test]
    fn test_sibling_blocks_do_not_conflict() {
        let mut scopes = ScopeTracker::new(false);
        let a = atom("a");
        scopes.push(ScopeKind::Block);
        assert!(scopes.declare(&a, BindingKind::Let, Span::default(), true).is_ok());
        scopes.pop();
        scopes.push(ScopeKind::Block);
        assert!(scopes.declare(&a, BindingKind::Let, Span::default(), true).is_ok());
        scopes.pop();
    }

    #[test]
    fn test_var_hoist_hits_for_head_lexical() {
        let mut scopes = ScopeTracker::new(false);
        let x = atom("x");
        scopes.push(ScopeKind::ForHead);
        assert!(scopes.declare(&x, BindingKind::Let, Span::default(), true).is_ok());
        scopes.push(ScopeKind::Block);
        assert_eq!(
            kind_of(scopes.declare(&x, BindingKind::Var, Span::default(), true)),
            Some(ErrorKind::DuplicateBinding)
        );
    }

    #[test]
    fn test_lexical_after_hoisted_var_in_same_block() {
        let mut scopes = ScopeTracker::new(false);
        let b = atom("b");
        scopes.push(ScopeKind::Block);
        assert!(scopes.declare(&b, BindingKind::Var, Span::default(), true).is_ok());
        assert_eq!(
            kind_of(scopes.declare(&b, BindingKind::Let, Span::default(), true)),
            Some(ErrorKind::DuplicateBinding)
        );
    }

    #[test]
    fn test_var_recorded_in_outer_frames() {
        let mut scopes = ScopeTracker::new(false);
        let x = atom("x");
        scopes.push(ScopeKind::Block);
        assert!(scopes.declare(&x, BindingKind::Var, Span::default(), true).is_ok());
        scopes.pop();
        assert_eq!(
            kind_of(scopes.declare(&x, BindingKind::Let, Span::default(), true)),
            Some(ErrorKind::DuplicateBinding)
        );
    }

    #[test]
    fn test_var_stops_at_function_boundary() {
        let mut scopes = ScopeTracker::new(false);
        let x = atom("x");
        scopes.push(ScopeKind::Function);
        assert!(scopes.declare(&x, BindingKind::Var, Span::default(), true).is_ok());
        scopes.pop();
        assert!(scopes.declare(&x, BindingKind::Let, Span::default(), true).is_ok());
    }

    #[test]
    fn test_catch_param_and_nested_for_let() {
        let mut scopes = ScopeTracker::new(false);
        let e = atom("e");
        scopes.push(ScopeKind::Catch);
        assert!(scopes.declare(&e, BindingKind::CatchParam, Span::default(), true).is_ok());
        scopes.push(ScopeKind::ForHead);
        assert!(scopes.declare(&e, BindingKind::Let, Span::default(), true).is_ok());
    }

    #[test]
    fn test_catch_param_conflicts_with_body_lexical() {
        let mut scopes = ScopeTracker::new(false);
        let e = atom("e");
        scopes.push(ScopeKind::Catch);
        assert!(scopes.declare(&e, BindingKind::CatchParam, Span::default(), true).is_ok());
        assert_eq!(
            kind_of(scopes.declare(&e, BindingKind::Let, Span::default(), true)),
            Some(ErrorKind::DuplicateBinding)
        );
    }

    #[test]
    fn test_var_redeclaring_simple_catch_param() {
        let mut scopes = ScopeTracker::new(false);
        let e = atom("e");
        scopes.push(ScopeKind::Catch);
        scopes.set_simple_catch(true);
        assert!(scopes.declare(&e, BindingKind::CatchParam, Span::default(), true).is_ok());
        assert!(scopes.declare(&e, BindingKind::Var, Span::default(), true).is_ok());
        assert_eq!(
            kind_of(scopes.declare_var(&e, Span::default(), VarOrigin::ForOf)),
            Some(ErrorKind::DuplicateBinding)
        );
    }

    #[test]
    fn test_var_redeclaring_destructured_catch_param() {
        let mut scopes = ScopeTracker::new(false);
        let e = atom("e");
        scopes.push(ScopeKind::Catch);
        assert!(scopes.declare(&e, BindingKind::CatchParam, Span::default(), true).is_ok());
        assert_eq!(
            kind_of(scopes.declare(&e, BindingKind::Var, Span::default(), true)),
            Some(ErrorKind::DuplicateBinding)
        );
    }

    #[test]
    fn test_block_function_duplicates() {
        let mut scopes = ScopeTracker::new(false);
        let f = atom("f");
        scopes.push(ScopeKind::Block);
        assert!(scopes.declare(&f, BindingKind::Function, Span::default(), true).is_ok());
        assert!(scopes.declare(&f, BindingKind::Function, Span::default(), true).is_ok());
        assert_eq!(
            kind_of(scopes.declare(&f, BindingKind::Function, Span::default(), false)),
            Some(ErrorKind::DuplicateBinding)
        );
        assert_eq!(
            kind_of(scopes.declare(&f, BindingKind::AsyncOrGeneratorFunction, Span::default(), true)),
            Some(ErrorKind::DuplicateBinding)
        );
    }

    #[test]
    fn test_top_level_functions_are_var_scoped_in_scripts() {
        let mut scopes = ScopeTracker::new(false);
        let f = atom("f");
        assert!(scopes.declare(&f, BindingKind::Function, Span::default(), false).is_ok());
        assert!(scopes.declare(&f, BindingKind::Var, Span::default(), false).is_ok());
        assert!(scopes.is_declared_at_top("f"));

        let mut scopes = ScopeTracker::new(true);
        assert!(scopes.declare(&f, BindingKind::Function, Span::default(), false).is_ok());
        assert_eq!(
            kind_of(scopes.declare(&f, BindingKind::Var, Span::default(), false)),
            Some(ErrorKind::DuplicateBinding)
        );
    }

    #[test]
    fn test_param_conflicts_with_body_lexical() {
        let mut scopes = ScopeTracker::new(false);
        let a = atom("a");
        scopes.push(ScopeKind::Function);
        assert!(scopes.declare(&a, BindingKind::Param, Span::default(), true).is_ok());
        assert!(scopes.declare(&a, BindingKind::Var, Span::default(), true).is_ok());
        assert_eq!(
            kind_of(scopes.declare(&a, BindingKind::Let, Span::default(), true)),
            Some(ErrorKind::DuplicateBinding)
        );
    }
}
