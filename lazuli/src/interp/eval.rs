//! Tree-walking evaluator with call-by-need argument passing
//!
//! Arguments are never evaluated at the call site. Each one is wrapped in
//! a thunk together with a snapshot of the scope at the call, and is
//! evaluated the first time the callee actually reads it. The result is
//! memoized on the thunk, so every alias of an argument observes a single
//! evaluation, side effects included.

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{BinOp, CatchClause, Expr, FuncDef, Program, Spanned, Stmt, UnOp};

use super::console::Console;
use super::error::{RunResult, RuntimeError};
use super::scope::{Binding, ScopeSnapshot, ScopeStack};
use super::thunk::Thunk;
use super::value::{NIL, TRUE, Value};

/// Upper bound on nested user calls
const MAX_CALL_DEPTH: usize = 10_000;

/// Stack growth parameters for deep evaluation recursion
const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// Signal produced by executing a statement
#[derive(Debug)]
enum Signal {
    /// Fall through to the next statement
    Continue,
    /// Unwind to the enclosing call with a result
    Return(Value),
}

/// Which scope expressions resolve free names against: the live stack, or
/// the snapshot captured by the thunk currently being forced.
#[derive(Clone, Copy)]
enum ScopeRef<'a, 'p> {
    Live,
    Captured(&'a ScopeSnapshot<'p>),
}

/// The interpreter. It borrows the parsed program for its whole run so
/// that thunks can share argument expressions instead of cloning them.
pub struct Interpreter<'p> {
    /// User functions by name, then by parameter count
    functions: HashMap<&'p str, HashMap<usize, &'p FuncDef>>,
    /// The live scope: one frame per active call
    scope: ScopeStack<'p>,
    /// Host console used by print/inputi/inputs
    console: Console,
    /// Current user-call depth, bounded by MAX_CALL_DEPTH
    call_depth: usize,
}

impl<'p> Interpreter<'p> {
    /// Interpreter over process stdio.
    pub fn new(program: &'p Program) -> Self {
        Self::with_console(program, Console::stdio())
    }

    /// Interpreter with an explicit console; tests script it.
    pub fn with_console(program: &'p Program, console: Console) -> Self {
        let mut functions: HashMap<&'p str, HashMap<usize, &'p FuncDef>> = HashMap::new();
        for func in &program.funcs {
            // Among definitions with the same name and parameter count,
            // the last one wins
            functions
                .entry(func.name.node.as_str())
                .or_default()
                .insert(func.params.len(), func);
        }
        Interpreter {
            functions,
            scope: ScopeStack::new(),
            console,
            call_depth: 0,
        }
    }

    /// Runs the program by calling its zero-parameter `main`.
    pub fn run(&mut self) -> RunResult<()> {
        self.call("main", &[], ScopeRef::Live)?;
        Ok(())
    }

    /// Consumes the interpreter, handing back its console so captured
    /// output can be inspected.
    pub fn into_console(self) -> Console {
        self.console
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    /// Runs a statement sequence in a fresh block. The block is popped on
    /// every exit path, unwinds for errors and user exceptions included.
    fn run_statements(&mut self, stmts: &'p [Spanned<Stmt>]) -> RunResult<Signal> {
        self.scope.push_block();
        let outcome = self.run_sequence(stmts);
        self.scope.pop_block();
        outcome
    }

    fn run_sequence(&mut self, stmts: &'p [Spanned<Stmt>]) -> RunResult<Signal> {
        for stmt in stmts {
            if let Signal::Return(value) = self.execute(stmt)? {
                return Ok(Signal::Return(value));
            }
        }
        Ok(Signal::Continue)
    }

    fn execute(&mut self, stmt: &'p Spanned<Stmt>) -> RunResult<Signal> {
        match &stmt.node {
            Stmt::VarDecl { name } => {
                if !self.scope.declare(name, Binding::Value(NIL)) {
                    return Err(RuntimeError::duplicate_definition(name));
                }
                Ok(Signal::Continue)
            }
            Stmt::Assign { name, expr } => {
                // The right-hand side is not evaluated here: it becomes a
                // thunk over a snapshot of the scope as it is right now
                let thunk = Thunk::new(expr, self.scope.snapshot());
                if !self.scope.rebind(name, Binding::Thunk(thunk)) {
                    return Err(RuntimeError::assignment_to_undefined(name));
                }
                Ok(Signal::Continue)
            }
            Stmt::Call { func, args } => {
                self.call(func, args, ScopeRef::Live)?;
                Ok(Signal::Continue)
            }
            Stmt::Return { expr } => {
                // Returning is strict: the result crosses a frame boundary,
                // so it is evaluated while the frame still has its names
                let value = match expr {
                    Some(expr) => self.eval(expr, ScopeRef::Live)?,
                    None => NIL,
                };
                Ok(Signal::Return(value))
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                let branch = match self.eval(cond, ScopeRef::Live)? {
                    Value::Bool(true) => Some(then_body),
                    Value::Bool(false) => else_body.as_ref(),
                    _ => return Err(RuntimeError::condition_not_bool("if")),
                };
                match branch {
                    Some(body) => self.run_statements(body),
                    None => Ok(Signal::Continue),
                }
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => {
                self.execute(init)?;
                loop {
                    match self.eval(cond, ScopeRef::Live)? {
                        Value::Bool(true) => {}
                        Value::Bool(false) => break,
                        _ => return Err(RuntimeError::condition_not_bool("for")),
                    }
                    // Each iteration gets its own block; a return skips
                    // the update assignment
                    if let Signal::Return(value) = self.run_statements(body)? {
                        return Ok(Signal::Return(value));
                    }
                    self.execute(update)?;
                }
                Ok(Signal::Continue)
            }
            Stmt::Raise { tag } => {
                // The operand is evaluated strictly, before unwinding
                match self.eval(tag, ScopeRef::Live)? {
                    Value::Str(tag) => Err(RuntimeError::user_exception(&tag)),
                    value => Err(RuntimeError::raise_not_string(value.type_name())),
                }
            }
            Stmt::Try { body, catchers } => self.run_try(body, catchers),
        }
    }

    /// Runs a try body and dispatches a raised user exception to the first
    /// catch clause with an equal tag. Fatal errors are not catchable.
    fn run_try(
        &mut self,
        body: &'p [Spanned<Stmt>],
        catchers: &'p [CatchClause],
    ) -> RunResult<Signal> {
        let err = match self.run_statements(body) {
            Err(err) if err.exception_tag().is_some() => err,
            outcome => return outcome,
        };
        // The try block has already been popped by the unwind. Catch
        // clauses run against the enclosing scope, inside one extra block
        self.scope.push_block();
        let matched = catchers
            .iter()
            .find(|clause| Some(clause.tag.node.as_str()) == err.exception_tag());
        let outcome = match matched {
            Some(clause) => self.run_statements(&clause.body),
            None => Err(err),
        };
        self.scope.pop_block();
        outcome
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// Evaluates an expression, forcing thunks as variables are read.
    fn eval(&mut self, expr: &'p Spanned<Expr>, scope: ScopeRef<'_, 'p>) -> RunResult<Value> {
        // Grow stack if we're running low
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.eval_inner(expr, scope)
        })
    }

    fn eval_inner(&mut self, expr: &'p Spanned<Expr>, scope: ScopeRef<'_, 'p>) -> RunResult<Value> {
        match &expr.node {
            Expr::IntLit(n) => Ok(Value::Int(*n)),
            Expr::StrLit(text) => Ok(Value::Str(Rc::new(text.clone()))),
            Expr::BoolLit(b) => Ok(Value::Bool(*b)),
            Expr::NilLit => Ok(NIL),
            Expr::Var(name) => match self.resolve(name, scope) {
                Some(Binding::Value(value)) => Ok(value),
                Some(Binding::Thunk(thunk)) => self.force(&thunk),
                None => Err(RuntimeError::variable_not_found(name)),
            },
            Expr::Call { func, args } => self.call(func, args, scope),
            Expr::Binary { left, op, right } => match op {
                // && and || are short-circuiting and strict about operand
                // types: both sides must be bool, but the right side is
                // only evaluated (and only checked) when it can still
                // change the result
                BinOp::And => match self.eval(left, scope)? {
                    Value::Bool(false) => Ok(Value::Bool(false)),
                    lhs @ Value::Bool(true) => {
                        let rhs = self.eval(right, scope)?;
                        eval_binary(BinOp::And, lhs, rhs)
                    }
                    lhs => Err(RuntimeError::incompatible_operator(
                        BinOp::And,
                        lhs.type_name(),
                    )),
                },
                BinOp::Or => match self.eval(left, scope)? {
                    Value::Bool(true) => Ok(TRUE),
                    lhs @ Value::Bool(false) => {
                        let rhs = self.eval(right, scope)?;
                        eval_binary(BinOp::Or, lhs, rhs)
                    }
                    lhs => Err(RuntimeError::incompatible_operator(
                        BinOp::Or,
                        lhs.type_name(),
                    )),
                },
                op => {
                    let lhs = self.eval(left, scope)?;
                    let rhs = self.eval(right, scope)?;
                    eval_binary(*op, lhs, rhs)
                }
            },
            Expr::Unary { op, operand } => {
                let value = self.eval(operand, scope)?;
                eval_unary(*op, value)
            }
        }
    }

    /// Looks a name up in whichever scope applies.
    fn resolve(&self, name: &str, scope: ScopeRef<'_, 'p>) -> Option<Binding<'p>> {
        match scope {
            ScopeRef::Live => self.scope.lookup(name),
            ScopeRef::Captured(snapshot) => snapshot.lookup(name),
        }
    }

    /// Snapshot for a new thunk: a fresh structural copy of the live
    /// stack, or the forced thunk's own capture shared as-is.
    fn capture(&self, scope: ScopeRef<'_, 'p>) -> ScopeSnapshot<'p> {
        match scope {
            ScopeRef::Live => self.scope.snapshot(),
            ScopeRef::Captured(snapshot) => snapshot.clone(),
        }
    }

    /// Forces a thunk: returns the memo when present, otherwise evaluates
    /// the captured expression against the captured scope and fills the
    /// memo. A failed forcing leaves the memo empty, so a later read
    /// evaluates the expression again.
    fn force(&mut self, thunk: &Thunk<'p>) -> RunResult<Value> {
        if let Some(value) = thunk.forced() {
            return Ok(value);
        }
        let snapshot = thunk.scope().clone();
        let value = self.eval(thunk.expr(), ScopeRef::Captured(&snapshot))?;
        thunk.memoize(value.clone());
        Ok(value)
    }

    // ------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------

    /// Calls a function by name. The built-ins print/inputi/inputs are
    /// dispatched first; user definitions cannot shadow them.
    fn call(
        &mut self,
        name: &'p str,
        args: &'p [Spanned<Expr>],
        scope: ScopeRef<'_, 'p>,
    ) -> RunResult<Value> {
        match name {
            "print" => self.builtin_print(args, scope),
            "inputi" | "inputs" => self.builtin_input(name, args, scope),
            _ => self.call_function(name, args, scope),
        }
    }

    /// Calls a user function with automatic stack growth.
    fn call_function(
        &mut self,
        name: &'p str,
        args: &'p [Spanned<Expr>],
        scope: ScopeRef<'_, 'p>,
    ) -> RunResult<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.call_function_inner(name, args, scope)
        })
    }

    fn call_function_inner(
        &mut self,
        name: &'p str,
        args: &'p [Spanned<Expr>],
        scope: ScopeRef<'_, 'p>,
    ) -> RunResult<Value> {
        let func = self.find_function(name, args.len())?;

        // Argument thunks are built before the callee frame exists, and
        // all of them share one snapshot. A call without arguments needs
        // no capture at all
        let params: Vec<(&'p str, Thunk<'p>)> = if args.is_empty() {
            Vec::new()
        } else {
            let snapshot = self.capture(scope);
            func.params
                .iter()
                .zip(args)
                .map(|(param, arg)| (param.node.as_str(), Thunk::new(arg, snapshot.clone())))
                .collect()
        };

        self.call_depth += 1;
        if self.call_depth > MAX_CALL_DEPTH {
            self.call_depth -= 1;
            return Err(RuntimeError::stack_overflow());
        }

        self.scope.push_frame();
        let outcome = self.run_call(func, params);
        self.scope.pop_frame();
        self.call_depth -= 1;

        // Falling off the end of a function yields nil
        match outcome? {
            Signal::Return(value) => Ok(value),
            Signal::Continue => Ok(NIL),
        }
    }

    /// Callee side of a call once its frame is pushed: the formals go into
    /// the frame's first block, then the body runs. Split out so the
    /// caller pops the frame on every path.
    fn run_call(&mut self, func: &'p FuncDef, params: Vec<(&'p str, Thunk<'p>)>) -> RunResult<Signal> {
        for (name, thunk) in params {
            if !self.scope.declare(name, Binding::Thunk(thunk)) {
                return Err(RuntimeError::duplicate_definition(name));
            }
        }
        self.run_statements(&func.body)
    }

    fn find_function(&self, name: &str, arity: usize) -> RunResult<&'p FuncDef> {
        let overloads = self
            .functions
            .get(name)
            .ok_or_else(|| RuntimeError::function_not_found(name))?;
        overloads
            .get(&arity)
            .copied()
            .ok_or_else(|| RuntimeError::overload_not_found(name, arity))
    }

    // ------------------------------------------------------------------
    // Built-ins
    // ------------------------------------------------------------------

    /// print(...): strict in every argument; writes the concatenated
    /// printable forms as one output line and yields nil.
    fn builtin_print(
        &mut self,
        args: &'p [Spanned<Expr>],
        scope: ScopeRef<'_, 'p>,
    ) -> RunResult<Value> {
        let mut line = String::new();
        for arg in args {
            let value = self.eval(arg, scope)?;
            line.push_str(&value.to_string());
        }
        self.console.write_line(&line);
        Ok(NIL)
    }

    /// inputi()/inputs(): an optional prompt argument is printed first,
    /// then one line is read. inputi requires the line to parse as an
    /// integer.
    fn builtin_input(
        &mut self,
        name: &'p str,
        args: &'p [Spanned<Expr>],
        scope: ScopeRef<'_, 'p>,
    ) -> RunResult<Value> {
        if args.len() > 1 {
            return Err(RuntimeError::builtin_extra_args(name));
        }
        if let Some(prompt) = args.first() {
            let value = self.eval(prompt, scope)?;
            self.console.write_line(&value.to_string());
        }
        let line = self.console.read_line()?;
        if name == "inputi" {
            let parsed = line
                .trim()
                .parse::<i64>()
                .map_err(|_| RuntimeError::input_not_int(&line))?;
            Ok(Value::Int(parsed))
        } else {
            Ok(Value::Str(Rc::new(line)))
        }
    }
}

/// Applies a binary operator to two evaluated operands. Dispatch is by
/// operand type; == and != are total across every type pair.
fn eval_binary(op: BinOp, left: Value, right: Value) -> RunResult<Value> {
    // Division by zero outranks type checking: it is a catchable user
    // exception, raised once both operands are evaluated
    if op == BinOp::Div && right == Value::Int(0) {
        return Err(RuntimeError::user_exception("div0"));
    }
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => match op {
            BinOp::Add => Ok(Value::Int(a + b)),
            BinOp::Sub => Ok(Value::Int(a - b)),
            BinOp::Mul => Ok(Value::Int(a * b)),
            BinOp::Div => Ok(Value::Int(floor_div(*a, *b))),
            BinOp::Eq => Ok(Value::Bool(a == b)),
            BinOp::Ne => Ok(Value::Bool(a != b)),
            BinOp::Lt => Ok(Value::Bool(a < b)),
            BinOp::Le => Ok(Value::Bool(a <= b)),
            BinOp::Gt => Ok(Value::Bool(a > b)),
            BinOp::Ge => Ok(Value::Bool(a >= b)),
            BinOp::And | BinOp::Or => {
                Err(RuntimeError::incompatible_operator(op, left.type_name()))
            }
        },
        (Value::Str(a), Value::Str(b)) => match op {
            BinOp::Add => Ok(Value::Str(Rc::new(format!("{a}{b}")))),
            BinOp::Eq => Ok(Value::Bool(a == b)),
            BinOp::Ne => Ok(Value::Bool(a != b)),
            _ => Err(RuntimeError::incompatible_operator(op, left.type_name())),
        },
        (Value::Bool(a), Value::Bool(b)) => match op {
            BinOp::And => Ok(Value::Bool(*a && *b)),
            BinOp::Or => Ok(Value::Bool(*a || *b)),
            BinOp::Eq => Ok(Value::Bool(a == b)),
            BinOp::Ne => Ok(Value::Bool(a != b)),
            _ => Err(RuntimeError::incompatible_operator(op, left.type_name())),
        },
        (Value::Nil, Value::Nil) => match op {
            BinOp::Eq => Ok(TRUE),
            BinOp::Ne => Ok(Value::Bool(false)),
            _ => Err(RuntimeError::incompatible_operator(op, left.type_name())),
        },
        // Operands of two different types: equality comparison is defined
        // and false, everything else is an error
        _ => match op {
            BinOp::Eq => Ok(Value::Bool(false)),
            BinOp::Ne => Ok(TRUE),
            _ => Err(RuntimeError::incompatible_types(op)),
        },
    }
}

fn eval_unary(op: UnOp, value: Value) -> RunResult<Value> {
    match (op, &value) {
        (UnOp::Neg, Value::Int(n)) => Ok(Value::Int(-n)),
        (UnOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        _ => Err(RuntimeError::incompatible_unary(op)),
    }
}

/// Integer division rounding toward negative infinity. Rust's `/`
/// truncates toward zero, which differs for mixed-sign operands.
fn floor_div(a: i64, b: i64) -> i64 {
    let quotient = a / b;
    if a % b != 0 && (a < 0) != (b < 0) {
        quotient - 1
    } else {
        quotient
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::ErrorKind;
    use crate::parser::parse;

    fn int(n: i64) -> Value {
        Value::Int(n)
    }

    fn string(s: &str) -> Value {
        Value::Str(Rc::new(s.to_string()))
    }

    fn run_with(source: &str, input: &[&str]) -> (RunResult<()>, Vec<String>) {
        let program = parse(source).expect("test program should parse");
        let mut interp = Interpreter::with_console(&program, Console::buffered(input));
        let outcome = interp.run();
        let output = interp.into_console().output().to_vec();
        (outcome, output)
    }

    fn run_ok(source: &str) -> Vec<String> {
        let (outcome, output) = run_with(source, &[]);
        assert!(outcome.is_ok(), "program failed: {:?}", outcome.err());
        output
    }

    fn run_err(source: &str) -> RuntimeError {
        let (outcome, output) = run_with(source, &[]);
        match outcome {
            Err(err) => err,
            Ok(()) => panic!("program unexpectedly succeeded, output {output:?}"),
        }
    }

    // ============================================
    // Floor division
    // ============================================

    #[test]
    fn test_floor_div_rounds_toward_negative_infinity() {
        assert_eq!(floor_div(7, 2), 3);
        assert_eq!(floor_div(-7, 2), -4);
        assert_eq!(floor_div(7, -2), -4);
        assert_eq!(floor_div(-7, -2), 3);
    }

    #[test]
    fn test_floor_div_exact() {
        assert_eq!(floor_div(6, 3), 2);
        assert_eq!(floor_div(-6, 3), -2);
        assert_eq!(floor_div(0, 5), 0);
    }

    // ============================================
    // Binary dispatch
    // ============================================

    #[test]
    fn test_int_arithmetic() {
        assert_eq!(eval_binary(BinOp::Add, int(2), int(3)).unwrap(), int(5));
        assert_eq!(eval_binary(BinOp::Sub, int(2), int(3)).unwrap(), int(-1));
        assert_eq!(eval_binary(BinOp::Mul, int(4), int(3)).unwrap(), int(12));
        assert_eq!(eval_binary(BinOp::Div, int(7), int(2)).unwrap(), int(3));
        assert_eq!(eval_binary(BinOp::Div, int(-7), int(2)).unwrap(), int(-4));
    }

    #[test]
    fn test_int_comparisons() {
        assert_eq!(eval_binary(BinOp::Lt, int(1), int(2)).unwrap(), TRUE);
        assert_eq!(eval_binary(BinOp::Ge, int(2), int(2)).unwrap(), TRUE);
        assert_eq!(eval_binary(BinOp::Eq, int(2), int(3)).unwrap(), Value::Bool(false));
        assert_eq!(eval_binary(BinOp::Ne, int(2), int(3)).unwrap(), TRUE);
    }

    #[test]
    fn test_division_by_zero_is_a_user_exception() {
        let err = eval_binary(BinOp::Div, int(5), int(0)).unwrap_err();
        assert_eq!(err.exception_tag(), Some("div0"));
    }

    #[test]
    fn test_division_by_zero_beats_type_checking() {
        // The exception fires before operand types are examined
        let err = eval_binary(BinOp::Div, string("a"), int(0)).unwrap_err();
        assert_eq!(err.exception_tag(), Some("div0"));
    }

    #[test]
    fn test_string_concat_and_equality() {
        assert_eq!(
            eval_binary(BinOp::Add, string("ab"), string("cd")).unwrap(),
            string("abcd")
        );
        assert_eq!(
            eval_binary(BinOp::Eq, string("x"), string("x")).unwrap(),
            TRUE
        );
        assert_eq!(
            eval_binary(BinOp::Ne, string("x"), string("y")).unwrap(),
            TRUE
        );
    }

    #[test]
    fn test_string_rejects_other_operators() {
        let err = eval_binary(BinOp::Sub, string("a"), string("b")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
        assert_eq!(err.message, "Incompatible operator - for type string");
    }

    #[test]
    fn test_bool_table() {
        assert_eq!(
            eval_binary(BinOp::And, TRUE, Value::Bool(false)).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(eval_binary(BinOp::Or, Value::Bool(false), TRUE).unwrap(), TRUE);
        assert_eq!(eval_binary(BinOp::Eq, TRUE, TRUE).unwrap(), TRUE);
    }

    #[test]
    fn test_bool_rejects_arithmetic() {
        let err = eval_binary(BinOp::Add, TRUE, TRUE).unwrap_err();
        assert_eq!(err.message, "Incompatible operator + for type bool");
    }

    #[test]
    fn test_nil_equality() {
        assert_eq!(eval_binary(BinOp::Eq, NIL, NIL).unwrap(), TRUE);
        assert_eq!(eval_binary(BinOp::Ne, NIL, NIL).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_cross_type_equality_is_false() {
        assert_eq!(
            eval_binary(BinOp::Eq, int(5), string("5")).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(eval_binary(BinOp::Ne, int(5), string("5")).unwrap(), TRUE);
        assert_eq!(eval_binary(BinOp::Eq, NIL, int(0)).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_cross_type_ordering_is_an_error() {
        let err = eval_binary(BinOp::Lt, int(1), string("2")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
        assert_eq!(err.message, "Incompatible types for < operation");
    }

    #[test]
    fn test_int_rejects_logical_operators() {
        let err = eval_binary(BinOp::And, int(1), int(2)).unwrap_err();
        assert_eq!(err.message, "Incompatible operator && for type int");
    }

    // ============================================
    // Unary dispatch
    // ============================================

    #[test]
    fn test_unary_ok() {
        assert_eq!(eval_unary(UnOp::Neg, int(5)).unwrap(), int(-5));
        assert_eq!(eval_unary(UnOp::Not, Value::Bool(false)).unwrap(), TRUE);
    }

    #[test]
    fn test_unary_type_errors() {
        let err = eval_unary(UnOp::Neg, TRUE).unwrap_err();
        assert_eq!(err.message, "Incompatible type for neg operation");
        let err = eval_unary(UnOp::Not, int(1)).unwrap_err();
        assert_eq!(err.message, "Incompatible type for ! operation");
    }

    // ============================================
    // Printing
    // ============================================

    #[test]
    fn test_print_concatenates_without_separator() {
        let output = run_ok(r#"func main() { print("a: ", 5, "!"); }"#);
        assert_eq!(output, ["a: 5!"]);
    }

    #[test]
    fn test_print_forms() {
        let output = run_ok(r#"func main() { print(true, " ", nil, " ", -3); }"#);
        assert_eq!(output, ["true nil -3"]);
    }

    #[test]
    fn test_print_empty_line() {
        let output = run_ok("func main() { print(); }");
        assert_eq!(output, [""]);
    }

    // ============================================
    // Laziness
    // ============================================

    #[test]
    fn test_unused_argument_is_never_evaluated() {
        let output = run_ok(
            r#"
            func noisy() { print("ping"); return 3; }
            func ignore(x) { return 0; }
            func main() { ignore(noisy()); print("done"); }
            "#,
        );
        assert_eq!(output, ["done"]);
    }

    #[test]
    fn test_forcing_memoizes_value_and_effects() {
        let output = run_ok(
            r#"
            func noisy() { print("ping"); return 3; }
            func twice(x) { print(x); print(x); }
            func main() { twice(noisy()); }
            "#,
        );
        // The first read runs noisy, the second reuses the memo
        assert_eq!(output, ["ping", "3", "3"]);
    }

    #[test]
    fn test_reassignment_discards_pending_computation() {
        let output = run_ok(
            r#"
            func noisy() { print("ping"); return 3; }
            func main() {
                var x;
                x = noisy();
                x = 5;
                print(x);
            }
            "#,
        );
        assert_eq!(output, ["5"]);
    }

    #[test]
    fn test_failed_forcing_is_not_memoized() {
        let output = run_ok(
            r#"
            func boom() { raise "e"; }
            func main() {
                var x;
                x = boom();
                try { print(x); } catch "e" { print("one"); }
                try { print(x); } catch "e" { print("two"); }
            }
            "#,
        );
        assert_eq!(output, ["one", "two"]);
    }

    // ============================================
    // Control flow
    // ============================================

    #[test]
    fn test_if_else() {
        let output = run_ok(
            r#"
            func main() {
                if (1 < 2) { print("then"); } else { print("else"); }
                if (2 < 1) { print("then"); } else { print("else"); }
            }
            "#,
        );
        assert_eq!(output, ["then", "else"]);
    }

    #[test]
    fn test_if_condition_must_be_bool() {
        let err = run_err("func main() { if (1) { print(1); } }");
        assert_eq!(err.kind, ErrorKind::TypeError);
        assert_eq!(err.message, "Incompatible type for if condition");
    }

    #[test]
    fn test_for_loop_counts() {
        let output = run_ok(
            r#"
            func main() {
                var i;
                for (i = 1; i <= 3; i = i + 1) { print(i); }
            }
            "#,
        );
        assert_eq!(output, ["1", "2", "3"]);
    }

    #[test]
    fn test_for_condition_must_be_bool() {
        let err = run_err(
            r#"
            func main() {
                var i;
                for (i = 0; i + 1; i = i + 1) { print(i); }
            }
            "#,
        );
        assert_eq!(err.message, "Incompatible type for for condition");
    }

    #[test]
    fn test_return_from_loop_skips_update() {
        let output = run_ok(
            r#"
            func first() {
                var i;
                for (i = 1; i <= 10; i = i + 1) { return i; }
            }
            func main() { print(first()); }
            "#,
        );
        assert_eq!(output, ["1"]);
    }

    #[test]
    fn test_fallthrough_returns_nil() {
        let output = run_ok(
            r#"
            func nothing() { print("ran"); }
            func main() { print(nothing()); }
            "#,
        );
        assert_eq!(output, ["ran", "nil"]);
    }

    #[test]
    fn test_short_circuit_skips_right_operand() {
        let output = run_ok(
            r#"
            func boom() { raise "x"; }
            func main() {
                if (false && boom()) { print("yes"); } else { print("no"); }
                if (true || boom()) { print("yes"); } else { print("no"); }
            }
            "#,
        );
        assert_eq!(output, ["no", "yes"]);
    }

    #[test]
    fn test_logical_operands_must_be_bool() {
        let err = run_err("func main() { if (5 && true) { print(1); } }");
        assert_eq!(err.message, "Incompatible operator && for type int");

        let err = run_err("func main() { if (true && 5) { print(1); } }");
        assert_eq!(err.message, "Incompatible types for && operation");
    }

    // ============================================
    // Names and calls
    // ============================================

    #[test]
    fn test_missing_main_is_a_name_error() {
        let err = run_err("func helper() { return 1; }");
        assert_eq!(err.kind, ErrorKind::NameError);
        assert_eq!(err.message, "Function main not found");
    }

    #[test]
    fn test_unknown_function() {
        let err = run_err("func main() { ghost(); }");
        assert_eq!(err.message, "Function ghost not found");
    }

    #[test]
    fn test_wrong_arity_names_the_count() {
        let err = run_err(
            r#"
            func foo(a) { return a; }
            func main() { foo(1, 2); }
            "#,
        );
        assert_eq!(err.message, "Function foo taking 2 params not found");
    }

    #[test]
    fn test_arity_overloads_coexist() {
        let output = run_ok(
            r#"
            func foo(a) { print("one"); }
            func foo(a, b) { print("two"); }
            func main() { foo(1); foo(1, 2); }
            "#,
        );
        assert_eq!(output, ["one", "two"]);
    }

    #[test]
    fn test_last_definition_wins() {
        let output = run_ok(
            r#"
            func foo() { print("first"); }
            func foo() { print("second"); }
            func main() { foo(); }
            "#,
        );
        assert_eq!(output, ["second"]);
    }

    #[test]
    fn test_duplicate_formals_are_a_name_error() {
        let err = run_err(
            r#"
            func bad(a, a) { return a; }
            func main() { bad(1, 2); }
            "#,
        );
        assert_eq!(err.message, "Duplicate definition for variable a");
    }

    #[test]
    fn test_builtin_wins_over_user_definition() {
        let output = run_ok(
            r#"
            func print(x) { return x; }
            func main() { print("still the builtin"); }
            "#,
        );
        assert_eq!(output, ["still the builtin"]);
    }

    #[test]
    fn test_variable_not_found() {
        let err = run_err("func main() { print(ghost); }");
        assert_eq!(err.message, "Variable ghost not found");
    }

    #[test]
    fn test_assignment_to_undeclared() {
        let err = run_err("func main() { x = 1; }");
        assert_eq!(err.message, "Undefined variable x in assignment");
    }

    #[test]
    fn test_duplicate_declaration() {
        let err = run_err("func main() { var x; var x; }");
        assert_eq!(err.message, "Duplicate definition for variable x");
    }

    #[test]
    fn test_deep_recursion_hits_the_depth_guard() {
        let err = run_err("func main() { main(); }");
        assert_eq!(err.kind, ErrorKind::StackOverflow);
    }

    // ============================================
    // Input built-ins
    // ============================================

    #[test]
    fn test_inputi_reads_an_integer() {
        let (outcome, output) = run_with(
            r#"func main() { print(inputi() + 1); }"#,
            &["41"],
        );
        assert!(outcome.is_ok());
        assert_eq!(output, ["42"]);
    }

    #[test]
    fn test_inputi_prompt_is_printed_first() {
        let (outcome, output) = run_with(
            r#"func main() { print(inputi("how many? ")); }"#,
            &[" 7 "],
        );
        assert!(outcome.is_ok());
        assert_eq!(output, ["how many? ", "7"]);
    }

    #[test]
    fn test_inputi_rejects_non_integer_input() {
        let (outcome, _) = run_with("func main() { print(inputi()); }", &["forty"]);
        let err = outcome.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
        assert_eq!(err.message, "Input is not an integer: forty");
    }

    #[test]
    fn test_inputi_end_of_input_is_io_error() {
        let (outcome, _) = run_with("func main() { print(inputi()); }", &[]);
        assert_eq!(outcome.unwrap_err().kind, ErrorKind::IoError);
    }

    #[test]
    fn test_input_builtins_reject_extra_arguments() {
        let (outcome, _) = run_with(r#"func main() { inputi("a", "b"); }"#, &[]);
        let err = outcome.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NameError);
        assert_eq!(err.message, "No inputi() function that takes > 1 parameter");

        let (outcome, _) = run_with(r#"func main() { inputs("a", "b"); }"#, &[]);
        let err = outcome.unwrap_err();
        assert_eq!(err.message, "No inputs() function that takes > 1 parameter");
    }

    #[test]
    fn test_inputs_returns_the_line_verbatim() {
        let (outcome, output) = run_with(
            r#"func main() { print(inputs() + "!"); }"#,
            &["  spaced  "],
        );
        assert!(outcome.is_ok());
        assert_eq!(output, ["  spaced  !"]);
    }
}
