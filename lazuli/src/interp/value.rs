//! Runtime values

use std::fmt;
use std::rc::Rc;

/// The nil value, reused wherever a statement has no result.
pub const NIL: Value = Value::Nil;

/// The true value, reused by the short-circuit paths.
pub const TRUE: Value = Value::Bool(true);

/// A runtime value. Values are immutable; bindings and scope snapshots
/// share them instead of copying string contents.
#[derive(Debug, Clone)]
pub enum Value {
    /// 64-bit signed integer
    Int(i64),
    /// Immutable string
    Str(Rc<String>),
    /// Boolean
    Bool(bool),
    /// The nil value
    Nil,
}

impl Value {
    /// Type name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Nil => "nil",
        }
    }
}

impl fmt::Display for Value {
    /// The printable form used by `print` and prompt output: digits for
    /// ints, raw contents for strings, `true`/`false`, `nil`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Nil => write!(f, "nil"),
        }
    }
}

impl PartialEq for Value {
    /// Identically-typed values compare by value; values of two different
    /// types are never equal.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Int(1).type_name(), "int");
        assert_eq!(Value::Str(Rc::new("x".to_string())).type_name(), "string");
        assert_eq!(Value::Bool(true).type_name(), "bool");
        assert_eq!(Value::Nil.type_name(), "nil");
    }

    #[test]
    fn test_display_int() {
        assert_eq!(format!("{}", Value::Int(42)), "42");
        assert_eq!(format!("{}", Value::Int(-7)), "-7");
    }

    #[test]
    fn test_display_string_is_raw() {
        let v = Value::Str(Rc::new("hello world".to_string()));
        assert_eq!(format!("{v}"), "hello world");
    }

    #[test]
    fn test_display_bool_and_nil() {
        assert_eq!(format!("{}", Value::Bool(true)), "true");
        assert_eq!(format!("{}", Value::Bool(false)), "false");
        assert_eq!(format!("{}", Value::Nil), "nil");
    }

    #[test]
    fn test_eq_same_type() {
        assert_eq!(Value::Int(5), Value::Int(5));
        assert_ne!(Value::Int(5), Value::Int(6));
        assert_eq!(
            Value::Str(Rc::new("a".to_string())),
            Value::Str(Rc::new("a".to_string()))
        );
        assert_eq!(Value::Nil, Value::Nil);
    }

    #[test]
    fn test_eq_across_types_is_false() {
        assert_ne!(Value::Int(5), Value::Str(Rc::new("5".to_string())));
        assert_ne!(Value::Bool(true), Value::Int(1));
        assert_ne!(Value::Nil, Value::Int(0));
        assert_ne!(Value::Nil, Value::Bool(false));
    }

    #[test]
    fn test_constants() {
        assert_eq!(NIL, Value::Nil);
        assert_eq!(TRUE, Value::Bool(true));
    }

    #[test]
    fn test_clone_shares_string() {
        let v = Value::Str(Rc::new("shared".to_string()));
        let w = v.clone();
        if let (Value::Str(a), Value::Str(b)) = (&v, &w) {
            assert!(Rc::ptr_eq(a, b));
        } else {
            panic!("expected string values");
        }
    }
}
