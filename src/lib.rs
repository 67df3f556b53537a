//! ECMAScript parser front-end producing ESTree syntax trees
//!
//! Parses scripts and modules in one pass, reporting the first early error
//! (destructuring targets, for-loop heads, duplicate bindings, strict mode
//! restrictions) instead of producing a tree.
//!
//! # Example
//!
//! ```
//! use esfront::{ParseOptions, parse, parse_to_estree};
//! use esfront::ast::Statement;
//!
//! let program = parse("for (let x of xs) f(x);", &ParseOptions::default()).unwrap();
//! assert!(matches!(program.body[0], Statement::ForOf(_)));
//!
//! let tree = parse_to_estree("a = 1", &ParseOptions::default()).unwrap();
//! assert_eq!(tree["type"], "Program");
//!
//! let err = parse("for (const x;;);", &ParseOptions::default()).unwrap_err();
//! assert_eq!(err.kind, esfront::ErrorKind::InvalidForHead);
//! ```

pub mod ast;
pub mod context;
pub mod error;
pub mod estree;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod prelude;
pub mod scope;
pub mod string_dict;

pub use error::{ErrorKind, ParseError, SourceLocation};
pub use options::ParseOptions;
pub use parser::Parser;
pub use string_dict::{Atom, StringDict};

use ast::Program;

/// Parse a source text into the typed syntax tree.
pub fn parse(source: &str, options: &ParseOptions) -> Result<Program, ParseError> {
    let source_type = if options.module { "module" } else { "script" };
    let span = tracing::debug_span!("parse", source_type, len = source.len());
    let _guard = span.enter();

    let mut dict = StringDict::with_common_strings();
    let mut parser = Parser::new(source, &mut dict, options.clone());
    match parser.parse_program() {
        Ok(program) => {
            tracing::debug!(statements = program.body.len(), "parsed");
            Ok(program)
        }
        Err(err) => {
            tracing::debug!(kind = ?err.kind, offset = err.location.offset, "parse failed");
            Err(err)
        }
    }
}

/// Parse a source text and render it as ESTree JSON.
pub fn parse_to_estree(source: &str, options: &ParseOptions) -> Result<serde_json::Value, ParseError> {
    let program = parse(source, options)?;
    Ok(estree::to_estree(&program, source, options))
}
