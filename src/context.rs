//! Grammar context threaded through the parser by value.
//!
//! A [`Context`] is `Copy`; every clause that changes a flag builds a new
//! value with one of the `with_*` helpers and hands it down, so the caller's
//! copy is never touched.

use crate::options::ParseOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub strict: bool,
    pub module: bool,
    pub disable_legacy_compat: bool,
    /// `in` may be read as the binary operator
    pub allow_in: bool,
    /// `await` is a keyword (async function or module top level)
    pub allow_await: bool,
    /// `yield` is a keyword (generator body)
    pub allow_yield: bool,
    /// `return` is allowed
    pub in_function_body: bool,
    /// `super.x` / `super[x]` is allowed
    pub allow_super_property: bool,
    /// `super(...)` is allowed
    pub allow_super_call: bool,
    pub allow_new_target: bool,
    /// Class field initializer or static block; `arguments` is forbidden
    pub in_class_field: bool,
    /// Formal parameter list; yield and await expressions are forbidden
    pub in_parameters: bool,
    /// Class static block; `await` is reserved
    pub in_static_block: bool,
    pub iteration_depth: u32,
    pub switch_depth: u32,
}

impl Context {
    /// Top-level context for a script or module.
    pub fn from_options(options: &ParseOptions) -> Self {
        Context {
            strict: options.strict || options.module,
            module: options.module,
            disable_legacy_compat: options.disable_legacy_compat,
            allow_in: true,
            allow_await: options.module,
            allow_yield: false,
            in_function_body: false,
            allow_super_property: false,
            allow_super_call: false,
            allow_new_target: false,
            in_class_field: false,
            in_parameters: false,
            in_static_block: false,
            iteration_depth: 0,
            switch_depth: 0,
        }
    }

    /// Annex B relaxations apply: sloppy script code with legacy
    /// compatibility left on.
    pub fn annex_b(&self) -> bool {
        !self.strict && !self.module && !self.disable_legacy_compat
    }

    pub fn with_strict(self, strict: bool) -> Self {
        Context { strict: self.strict || strict, ..self }
    }

    pub fn with_in(self, allow_in: bool) -> Self {
        Context { allow_in, ..self }
    }

    pub fn with_parameters(self, in_parameters: bool) -> Self {
        Context { in_parameters, ..self }
    }

    pub fn enter_iteration(self) -> Self {
        Context {
            iteration_depth: self.iteration_depth + 1,
            ..self
        }
    }

    pub fn enter_switch(self) -> Self {
        Context {
            switch_depth: self.switch_depth + 1,
            ..self
        }
    }

    /// Context for the parameters and body of an ordinary function or
    /// generator. Iteration and switch nesting do not cross function
    /// boundaries, and neither does `super` access.
    pub fn enter_function(self, is_async: bool, is_generator: bool) -> Self {
        Context {
            allow_in: true,
            allow_await: is_async,
            allow_yield: is_generator,
            in_function_body: true,
            allow_super_property: false,
            allow_super_call: false,
            allow_new_target: true,
            in_class_field: false,
            in_parameters: false,
            in_static_block: false,
            iteration_depth: 0,
            switch_depth: 0,
            ..self
        }
    }

    /// Context for a method body: like a function, plus `super` access.
    pub fn enter_method(self, is_async: bool, is_generator: bool, super_call: bool) -> Self {
        Context {
            allow_super_property: true,
            allow_super_call: super_call,
            ..self.enter_function(is_async, is_generator)
        }
    }

    /// Context for an arrow function. `this`, `super`, `new.target` and
    /// `arguments` restrictions are inherited from the enclosing code.
    pub fn enter_arrow(self, is_async: bool) -> Self {
        Context {
            allow_in: true,
            allow_await: is_async,
            allow_yield: false,
            in_function_body: true,
            in_parameters: false,
            iteration_depth: 0,
            switch_depth: 0,
            ..self
        }
    }

    /// Context for a class field initializer or static block.
    pub fn enter_class_field(self) -> Self {
        Context {
            allow_in: true,
            allow_await: false,
            allow_yield: false,
            in_function_body: false,
            allow_super_property: true,
            allow_super_call: false,
            allow_new_target: true,
            in_class_field: true,
            in_parameters: false,
            in_static_block: false,
            iteration_depth: 0,
            switch_depth: 0,
            ..self
        }
    }

    /// Context for the statements of a `static { }` block.
    pub fn enter_static_block(self) -> Self {
        Context {
            in_static_block: true,
            ..self.enter_class_field()
        }
    }
}
