//! Parser configuration.

use serde::Deserialize;

/// Options accepted by [`crate::parse`] and [`crate::parse_to_estree`].
///
/// Deserializes from camelCase JSON, e.g. `{"module": true, "includeLoc": true}`.
/// Missing fields take their default value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    /// Parse as an ES module (implies strict mode)
    pub module: bool,
    /// Treat the source as strict from the start
    pub strict: bool,
    /// Turn off the Annex B sloppy-mode relaxations
    pub disable_legacy_compat: bool,
    /// Emit `start`/`end` offsets in ESTree output
    pub include_ranges: bool,
    /// Emit `loc` line/column positions in ESTree output
    pub include_loc: bool,
    /// Maximum nesting of statements, expressions and patterns
    pub max_nesting_depth: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            module: false,
            strict: false,
            disable_legacy_compat: false,
            include_ranges: true,
            include_loc: false,
            max_nesting_depth: 200,
        }
    }
}

impl ParseOptions {
    /// Default options for module code.
    pub fn module() -> Self {
        ParseOptions {
            module: true,
            ..Self::default()
        }
    }

    pub fn with_module(mut self, module: bool) -> Self {
        self.module = module;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_disable_legacy_compat(mut self, disable: bool) -> Self {
        self.disable_legacy_compat = disable;
        self
    }

    pub fn with_ranges(mut self, include_ranges: bool) -> Self {
        self.include_ranges = include_ranges;
        self
    }

    pub fn with_loc(mut self, include_loc: bool) -> Self {
        self.include_loc = include_loc;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: u32) -> Self {
        self.max_nesting_depth = depth;
        self
    }
}
