//! Recursive descent parser
//!
//! Grammar summary:
//!
//! ```text
//! program   := funcdef*
//! funcdef   := "func" IDENT "(" (IDENT ("," IDENT)*)? ")" block
//! block     := "{" statement* "}"
//! statement := "var" IDENT ";"
//!            | IDENT "=" expression ";"
//!            | IDENT "(" args ")" ";"
//!            | "return" expression? ";"
//!            | "if" "(" expression ")" block ("else" block)?
//!            | "for" "(" assignment ";" expression ";" assignment ")" block
//!            | "raise" expression ";"
//!            | "try" block ("catch" STRING block)*
//! ```
//!
//! Expression precedence, loosest first: `||`, `&&`, `== !=`,
//! `< <= > >=`, `+ -`, `* /`, unary `- !`, primary.


use crate::ast::{BinOp, CatchClause, Expr, FuncDef, Program, Span, Spanned, Stmt, UnOp};
use crate::error::{CompileError, Result};
use crate::lexer::{Token, tokenize};

/// Tokenize and parse source text into a program
pub fn parse(source: &str) -> Result<Program> {
    let tokens = tokenize(source)?;
    Parser::new(tokens).program()
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<(Token, Span)>) -> Self {
        Parser { tokens, pos: 0 }
    }

    // ------------------------------------------------------------------
    // Token stream helpers
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn peek_second(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1).map(|(token, _)| token)
    }

    fn peek_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some((_, span)) => *span,
            None => self.eof_span(),
        }
    }

    fn eof_span(&self) -> Span {
        match self.tokens.last() {
            Some((_, span)) => Span::new(span.end, span.end),
            None => Span::new(0, 0),
        }
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        let entry = self.tokens.get(self.pos).cloned();
        if entry.is_some() {
            self.pos += 1;
        }
        entry
    }

    /// Consumes the next token if it equals `token`.
    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token, context: &str) -> Result<Span> {
        match self.advance() {
            Some((token, span)) if token == expected => Ok(span),
            Some((token, span)) => Err(CompileError::parser(
                format!("expected {expected} {context}, found {token}"),
                span,
            )),
            None => Err(CompileError::parser(
                format!("expected {expected} {context}, found end of input"),
                self.eof_span(),
            )),
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<Spanned<String>> {
        match self.advance() {
            Some((Token::Ident(name), span)) => Ok(Spanned::new(name, span)),
            Some((token, span)) => Err(CompileError::parser(
                format!("expected {what}, found {token}"),
                span,
            )),
            None => Err(CompileError::parser(
                format!("expected {what}, found end of input"),
                self.eof_span(),
            )),
        }
    }

    fn expect_string(&mut self, what: &str) -> Result<Spanned<String>> {
        match self.advance() {
            Some((Token::StrLit(text), span)) => Ok(Spanned::new(text, span)),
            Some((token, span)) => Err(CompileError::parser(
                format!("expected {what}, found {token}"),
                span,
            )),
            None => Err(CompileError::parser(
                format!("expected {what}, found end of input"),
                self.eof_span(),
            )),
        }
    }

    fn unexpected(&self, what: &str) -> CompileError {
        match self.tokens.get(self.pos) {
            Some((token, span)) => {
                CompileError::parser(format!("expected {what}, found {token}"), *span)
            }
            None => CompileError::parser(
                format!("expected {what}, found end of input"),
                self.eof_span(),
            ),
        }
    }

    // ------------------------------------------------------------------
    // Declarations and statements
    // ------------------------------------------------------------------

    fn program(mut self) -> Result<Program> {
        let mut funcs = Vec::new();
        while self.peek().is_some() {
            funcs.push(self.func_def()?);
        }
        Ok(Program { funcs })
    }

    fn func_def(&mut self) -> Result<FuncDef> {
        let start = self.expect(Token::Func, "to start a function definition")?;
        let name = self.expect_ident("a function name")?;
        self.expect(Token::LParen, "after the function name")?;
        let mut params = Vec::new();
        if self.peek() != Some(&Token::RParen) {
            loop {
                params.push(self.expect_ident("a parameter name")?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RParen, "after the parameter list")?;
        let (body, body_span) = self.block("to open the function body")?;
        Ok(FuncDef {
            name,
            params,
            body,
            span: start.merge(body_span),
        })
    }

    fn block(&mut self, context: &str) -> Result<(Vec<Spanned<Stmt>>, Span)> {
        let open = self.expect(Token::LBrace, context)?;
        let mut stmts = Vec::new();
        while self.peek().is_some() && self.peek() != Some(&Token::RBrace) {
            stmts.push(self.statement()?);
        }
        let close = self.expect(Token::RBrace, "to close the block")?;
        Ok((stmts, open.merge(close)))
    }

    fn statement(&mut self) -> Result<Spanned<Stmt>> {
        match self.peek() {
            Some(Token::Var) => self.var_decl(),
            Some(Token::Return) => self.return_stmt(),
            Some(Token::If) => self.if_stmt(),
            Some(Token::For) => self.for_stmt(),
            Some(Token::Raise) => self.raise_stmt(),
            Some(Token::Try) => self.try_stmt(),
            Some(Token::Ident(_)) => match self.peek_second() {
                Some(Token::Assign) => {
                    let assign = self.assignment()?;
                    let end = self.expect(Token::Semi, "after the assignment")?;
                    let span = assign.span.merge(end);
                    Ok(Spanned::new(assign.node, span))
                }
                Some(Token::LParen) => self.call_stmt(),
                _ => {
                    self.pos += 1;
                    Err(self.unexpected("`=` or `(` after the identifier"))
                }
            },
            _ => Err(self.unexpected("a statement")),
        }
    }

    fn var_decl(&mut self) -> Result<Spanned<Stmt>> {
        let start = self.expect(Token::Var, "to declare a variable")?;
        let name = self.expect_ident("a variable name")?;
        let end = self.expect(Token::Semi, "after the variable name")?;
        Ok(Spanned::new(
            Stmt::VarDecl { name: name.node },
            start.merge(end),
        ))
    }

    /// `name = expr` without the trailing semicolon, shared with for headers.
    fn assignment(&mut self) -> Result<Spanned<Stmt>> {
        let name = self.expect_ident("a variable name")?;
        self.expect(Token::Assign, "after the variable name")?;
        let expr = self.expression()?;
        let span = name.span.merge(expr.span);
        Ok(Spanned::new(
            Stmt::Assign {
                name: name.node,
                expr,
            },
            span,
        ))
    }

    fn call_stmt(&mut self) -> Result<Spanned<Stmt>> {
        let name = self.expect_ident("a function name")?;
        let (args, _) = self.call_args()?;
        let end = self.expect(Token::Semi, "after the call")?;
        Ok(Spanned::new(
            Stmt::Call {
                func: name.node,
                args,
            },
            name.span.merge(end),
        ))
    }

    fn return_stmt(&mut self) -> Result<Spanned<Stmt>> {
        let start = self.expect(Token::Return, "to start the statement")?;
        let expr = if self.peek() == Some(&Token::Semi) {
            None
        } else {
            Some(self.expression()?)
        };
        let end = self.expect(Token::Semi, "after the return statement")?;
        Ok(Spanned::new(Stmt::Return { expr }, start.merge(end)))
    }

    fn if_stmt(&mut self) -> Result<Spanned<Stmt>> {
        let start = self.expect(Token::If, "to start the statement")?;
        self.expect(Token::LParen, "after `if`")?;
        let cond = self.expression()?;
        self.expect(Token::RParen, "after the condition")?;
        let (then_body, mut end) = self.block("to open the if body")?;
        let else_body = if self.eat(&Token::Else) {
            let (body, else_span) = self.block("to open the else body")?;
            end = else_span;
            Some(body)
        } else {
            None
        };
        Ok(Spanned::new(
            Stmt::If {
                cond,
                then_body,
                else_body,
            },
            start.merge(end),
        ))
    }

    fn for_stmt(&mut self) -> Result<Spanned<Stmt>> {
        let start = self.expect(Token::For, "to start the statement")?;
        self.expect(Token::LParen, "after `for`")?;
        let init = self.assignment()?;
        self.expect(Token::Semi, "after the loop initializer")?;
        let cond = self.expression()?;
        self.expect(Token::Semi, "after the loop condition")?;
        let update = self.assignment()?;
        self.expect(Token::RParen, "after the loop update")?;
        let (body, end) = self.block("to open the loop body")?;
        Ok(Spanned::new(
            Stmt::For {
                init: Box::new(init),
                cond,
                update: Box::new(update),
                body,
            },
            start.merge(end),
        ))
    }

    fn raise_stmt(&mut self) -> Result<Spanned<Stmt>> {
        let start = self.expect(Token::Raise, "to start the statement")?;
        let tag = self.expression()?;
        let end = self.expect(Token::Semi, "after the raise statement")?;
        Ok(Spanned::new(Stmt::Raise { tag }, start.merge(end)))
    }

    fn try_stmt(&mut self) -> Result<Spanned<Stmt>> {
        let start = self.expect(Token::Try, "to start the statement")?;
        let (body, mut end) = self.block("to open the try body")?;
        let mut catchers = Vec::new();
        while self.eat(&Token::Catch) {
            let tag = self.expect_string("an exception tag string")?;
            let (catch_body, catch_span) = self.block("to open the catch body")?;
            end = catch_span;
            catchers.push(CatchClause {
                tag,
                body: catch_body,
            });
        }
        Ok(Spanned::new(Stmt::Try { body, catchers }, start.merge(end)))
    }

    // ------------------------------------------------------------------
    // Expressions, one method per precedence level
    // ------------------------------------------------------------------

    fn expression(&mut self) -> Result<Spanned<Expr>> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.and_expr()?;
        while self.eat(&Token::OrOr) {
            let right = self.and_expr()?;
            left = binary(left, BinOp::Or, right);
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.equality()?;
        while self.eat(&Token::AndAnd) {
            let right = self.equality()?;
            left = binary(left, BinOp::And, right);
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.comparison()?;
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => BinOp::Eq,
                Some(Token::NotEq) => BinOp::Ne,
                _ => break,
            };
            self.pos += 1;
            let right = self.comparison()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn comparison(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinOp::Lt,
                Some(Token::Le) => BinOp::Le,
                Some(Token::Gt) => BinOp::Gt,
                Some(Token::Ge) => BinOp::Ge,
                _ => break,
            };
            self.pos += 1;
            let right = self.additive()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn additive(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.multiplicative()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => break,
            };
            self.pos += 1;
            let right = self.unary()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Spanned<Expr>> {
        let op = match self.peek() {
            Some(Token::Minus) => UnOp::Neg,
            Some(Token::Bang) => UnOp::Not,
            _ => return self.primary(),
        };
        let op_span = self.peek_span();
        self.pos += 1;
        let operand = self.unary()?;
        let span = op_span.merge(operand.span);
        Ok(Spanned::new(
            Expr::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    fn primary(&mut self) -> Result<Spanned<Expr>> {
        match self.tokens.get(self.pos).cloned() {
            Some((Token::IntLit(n), span)) => {
                self.pos += 1;
                Ok(Spanned::new(Expr::IntLit(n), span))
            }
            Some((Token::StrLit(text), span)) => {
                self.pos += 1;
                Ok(Spanned::new(Expr::StrLit(text), span))
            }
            Some((Token::True, span)) => {
                self.pos += 1;
                Ok(Spanned::new(Expr::BoolLit(true), span))
            }
            Some((Token::False, span)) => {
                self.pos += 1;
                Ok(Spanned::new(Expr::BoolLit(false), span))
            }
            Some((Token::Nil, span)) => {
                self.pos += 1;
                Ok(Spanned::new(Expr::NilLit, span))
            }
            Some((Token::Ident(name), span)) => {
                self.pos += 1;
                if self.peek() == Some(&Token::LParen) {
                    let (args, end) = self.call_args()?;
                    Ok(Spanned::new(
                        Expr::Call { func: name, args },
                        span.merge(end),
                    ))
                } else {
                    Ok(Spanned::new(Expr::Var(name), span))
                }
            }
            Some((Token::LParen, span)) => {
                self.pos += 1;
                let inner = self.expression()?;
                let close = self.expect(Token::RParen, "to close the grouping")?;
                Ok(Spanned::new(inner.node, span.merge(close)))
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn call_args(&mut self) -> Result<(Vec<Spanned<Expr>>, Span)> {
        self.expect(Token::LParen, "to start the argument list")?;
        let mut args = Vec::new();
        if self.peek() != Some(&Token::RParen) {
            loop {
                args.push(self.expression()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        let close = self.expect(Token::RParen, "after the arguments")?;
        Ok((args, close))
    }
}

fn binary(left: Spanned<Expr>, op: BinOp, right: Spanned<Expr>) -> Spanned<Expr> {
    let span = left.span.merge(right.span);
    Spanned::new(
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}
