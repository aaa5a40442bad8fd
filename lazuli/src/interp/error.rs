//! Runtime errors and the user-exception control path

use std::fmt;

use crate::ast::{BinOp, UnOp};

/// Runtime error during interpretation
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Kinds of runtime errors
#[derive(Debug, Clone)]
pub enum ErrorKind {
    /// Unknown name, or a duplicate definition
    NameError,
    /// Operand, condition, or raise tag of the wrong type
    TypeError,
    /// Input exhausted or unreadable
    IoError,
    /// Call depth exceeded
    StackOverflow,
    /// Control flow: a raised user exception in flight, carrying its tag.
    /// try/catch consumes it; everything else passes it through untouched.
    UserException(String),
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        // Compare discriminants only: a UserException is the same kind of
        // error whatever its tag says
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl RuntimeError {
    pub fn variable_not_found(name: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::NameError,
            message: format!("Variable {name} not found"),
        }
    }

    pub fn assignment_to_undefined(name: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::NameError,
            message: format!("Undefined variable {name} in assignment"),
        }
    }

    pub fn duplicate_definition(name: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::NameError,
            message: format!("Duplicate definition for variable {name}"),
        }
    }

    pub fn function_not_found(name: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::NameError,
            message: format!("Function {name} not found"),
        }
    }

    pub fn overload_not_found(name: &str, arity: usize) -> Self {
        RuntimeError {
            kind: ErrorKind::NameError,
            message: format!("Function {name} taking {arity} params not found"),
        }
    }

    pub fn builtin_extra_args(name: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::NameError,
            message: format!("No {name}() function that takes > 1 parameter"),
        }
    }

    pub fn incompatible_types(op: BinOp) -> Self {
        RuntimeError {
            kind: ErrorKind::TypeError,
            message: format!("Incompatible types for {op} operation"),
        }
    }

    pub fn incompatible_operator(op: BinOp, type_name: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::TypeError,
            message: format!("Incompatible operator {op} for type {type_name}"),
        }
    }

    pub fn incompatible_unary(op: UnOp) -> Self {
        RuntimeError {
            kind: ErrorKind::TypeError,
            message: format!("Incompatible type for {op} operation"),
        }
    }

    pub fn condition_not_bool(stmt: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::TypeError,
            message: format!("Incompatible type for {stmt} condition"),
        }
    }

    pub fn raise_not_string(type_name: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::TypeError,
            message: format!("Raised exception type is not a string, it is of type: {type_name}"),
        }
    }

    pub fn input_not_int(line: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::TypeError,
            message: format!("Input is not an integer: {line}"),
        }
    }

    pub fn end_of_input() -> Self {
        RuntimeError {
            kind: ErrorKind::IoError,
            message: "end of input".to_string(),
        }
    }

    pub fn io_error(msg: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::IoError,
            message: msg.to_string(),
        }
    }

    pub fn stack_overflow() -> Self {
        RuntimeError {
            kind: ErrorKind::StackOverflow,
            message: "too deep recursion".to_string(),
        }
    }

    /// A user exception carrying `tag`. The message is what the top level
    /// prints if no catch clause ever consumes it.
    pub fn user_exception(tag: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::UserException(tag.to_string()),
            message: format!("Unhandled user-defined exception: {tag}"),
        }
    }

    /// The tag when this error is a user exception in flight, `None` for
    /// every fatal error.
    pub fn exception_tag(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::UserException(tag) => Some(tag.as_str()),
            _ => None,
        }
    }
}

impl ErrorKind {
    /// Category prefix used in top-level reports
    pub fn category(&self) -> &'static str {
        match self {
            ErrorKind::NameError => "Name error",
            ErrorKind::TypeError => "Type error",
            ErrorKind::IoError => "IO error",
            ErrorKind::StackOverflow => "Stack overflow",
            ErrorKind::UserException(_) => "Fault",
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.category(), self.message)
    }
}

impl std::error::Error for RuntimeError {}

/// Result type for interpreter operations
pub type RunResult<T> = Result<T, RuntimeError>;
