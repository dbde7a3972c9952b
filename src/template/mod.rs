//! Brace-expression templates
//!
//! Templates are plain text with `{expression}` spans. Each span holds a
//! small JavaScript-like expression (property access, calls, literals,
//! template strings, arrow functions) evaluated against a [`Context`] by
//! an interpreter in this module. No host code is ever executed.

mod ast;
pub mod builtins;
mod context;
mod error;
mod eval;
mod lexer;
mod parser;
mod render;
mod scanner;
mod value;

pub use ast::Expr;
pub use context::Context;
pub use error::{Result, TemplateError};
pub use eval::{evaluate, Scope};
pub use parser::parse_expression;
pub use render::{evaluate_dynamic_js, Template, Templates};
pub use scanner::{find_matching_brace, Span};
pub use value::{format_number, parse_js_number, Function, Value};
