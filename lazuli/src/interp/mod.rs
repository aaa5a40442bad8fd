//! Tree-walking interpreter with call-by-need argument passing.

mod console;
mod error;
mod eval;
mod scope;
mod thunk;
mod value;

pub use console::Console;
pub use error::{ErrorKind, RunResult, RuntimeError};
pub use eval::Interpreter;
pub use scope::{Binding, ScopeSnapshot, ScopeStack};
pub use thunk::Thunk;
pub use value::{NIL, TRUE, Value};
