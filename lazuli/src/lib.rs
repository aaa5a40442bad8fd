//! Lazuli Interpreter Library
//!
//! A small dynamically-typed language with call-by-need argument passing:
//! arguments travel as memoized thunks over scope snapshots and are only
//! evaluated when the callee reads them. Source flows through the lexer
//! and parser into an AST the interpreter walks directly.

pub mod ast;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;

pub use ast::Span;
pub use error::{CompileError, Result};
