//! Memoized deferred computations

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::{Expr, Spanned};

use super::scope::ScopeSnapshot;
use super::value::Value;

/// A deferred computation: an unevaluated expression paired with the scope
/// snapshot it must eventually be evaluated in, plus a write-once memo.
///
/// Cloning a thunk produces another handle to the same cell. Every binding
/// and snapshot that aliases it therefore observes a single forcing event:
/// whichever alias is read first pays for the evaluation, the rest reuse
/// the memo.
#[derive(Clone)]
pub struct Thunk<'p> {
    inner: Rc<ThunkInner<'p>>,
}

struct ThunkInner<'p> {
    expr: &'p Spanned<Expr>,
    scope: ScopeSnapshot<'p>,
    /// `None` until forced. Only a successful evaluation writes the cell,
    /// so a thunk whose forcing failed stays unforced.
    memo: RefCell<Option<Value>>,
}

impl<'p> Thunk<'p> {
    pub fn new(expr: &'p Spanned<Expr>, scope: ScopeSnapshot<'p>) -> Self {
        Thunk {
            inner: Rc::new(ThunkInner {
                expr,
                scope,
                memo: RefCell::new(None),
            }),
        }
    }

    /// The captured expression.
    pub fn expr(&self) -> &'p Spanned<Expr> {
        self.inner.expr
    }

    /// The scope snapshot captured when the thunk was built.
    pub fn scope(&self) -> &ScopeSnapshot<'p> {
        &self.inner.scope
    }

    /// The memoized result of an earlier forcing, if there was one.
    pub fn forced(&self) -> Option<Value> {
        self.inner.memo.borrow().clone()
    }

    /// Record the result of a successful forcing.
    pub fn memoize(&self, value: Value) {
        *self.inner.memo.borrow_mut() = Some(value);
    }
}

impl fmt::Debug for Thunk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thunk")
            .field("span", &self.inner.expr.span)
            .field("forced", &self.inner.memo.borrow().is_some())
            .finish()
    }
}
