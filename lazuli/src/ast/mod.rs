//! Abstract Syntax Tree definitions

mod expr;
mod span;

pub use expr::*;
pub use span::*;

use serde::{Deserialize, Serialize};

/// A program is a sequence of function definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub funcs: Vec<FuncDef>,
}

/// Function definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncDef {
    pub name: Spanned<String>,
    pub params: Vec<Spanned<String>>,
    pub body: Vec<Spanned<Stmt>>,
    pub span: Span,
}

/// Statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    /// Variable declaration: `var name;`
    VarDecl { name: String },

    /// Assignment: `name = expr;`
    Assign {
        name: String,
        expr: Spanned<Expr>,
    },

    /// A call evaluated for its effects: `f(a, b);`
    Call {
        func: String,
        args: Vec<Spanned<Expr>>,
    },

    /// `return;` or `return expr;`
    Return { expr: Option<Spanned<Expr>> },

    /// `if (cond) { ... }` with an optional else branch
    If {
        cond: Spanned<Expr>,
        then_body: Vec<Spanned<Stmt>>,
        else_body: Option<Vec<Spanned<Stmt>>>,
    },

    /// `for (init; cond; update) { ... }` where init and update are
    /// assignments
    For {
        init: Box<Spanned<Stmt>>,
        cond: Spanned<Expr>,
        update: Box<Spanned<Stmt>>,
        body: Vec<Spanned<Stmt>>,
    },

    /// `raise expr;` where the operand must evaluate to a string tag
    Raise { tag: Spanned<Expr> },

    /// `try { ... }` followed by catch clauses
    Try {
        body: Vec<Spanned<Stmt>>,
        catchers: Vec<CatchClause>,
    },
}

/// One `catch "tag" { ... }` clause of a try statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatchClause {
    pub tag: Spanned<String>,
    pub body: Vec<Spanned<Stmt>>,
}
