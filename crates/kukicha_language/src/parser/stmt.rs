//! Statement and block parsing, including the `onerr` clause.

use kukicha_base::Symbol;

use crate::ast::{
    Block, ElseArm, Expr, ExprKind, OnErr, OnErrHandler, SelectCase, SelectComm, Stmt, StmtKind,
    SwitchCase, TypeCase, TypeExpr,
};
use crate::error::{ParseError, ParseErrorKind};
use crate::token::TokenKind;

use super::{IndentKind, ParseResult, Parser};

impl<'a, 'int> Parser<'a, 'int> {
    /// Parses `Newline Indent stmt* Dedent`, recovering per statement.
    pub(crate) fn parse_block(&mut self) -> ParseResult<Block<'a>> {
        self.expect(TokenKind::Newline, "end of line")?;
        if !self.at(TokenKind::Indent) {
            return Err(ParseError::new(ParseErrorKind::ExpectedBlock, self.span()));
        }
        self.advance();
        self.indent_kinds.push(IndentKind::Block);

        let mut stmts = Vec::new();
        loop {
            match self.kind() {
                TokenKind::Dedent => {
                    // A layout dedent from a continuation line resolves
                    // silently; a block dedent ends this block.
                    if self.indent_kinds.last() == Some(&IndentKind::Layout) {
                        self.advance();
                        self.indent_kinds.pop();
                        continue;
                    }
                    self.advance();
                    self.indent_kinds.pop();
                    break;
                }
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Eof => break,
                _ => match self.parse_statement() {
                    Ok(stmt) => stmts.push(stmt),
                    Err(err) => {
                        self.errors.push(err);
                        self.synchronize();
                    }
                },
            }
        }
        Ok(self.ctx.stmts.alloc_slice(stmts))
    }

    pub(crate) fn parse_statement(&mut self) -> ParseResult<Stmt<'a>> {
        let start = self.span();
        match self.kind() {
            TokenKind::Var => {
                self.advance();
                let (names, ty, values, onerr) = self.parse_var_parts()?;
                self.end_statement()?;
                Ok(Stmt {
                    kind: StmtKind::Var {
                        names,
                        ty,
                        values,
                        onerr,
                        short: false,
                    },
                    span: start.merge(self.prev_span()),
                })
            }
            TokenKind::Return => {
                self.advance();
                let values = if matches!(
                    self.kind(),
                    TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof
                ) {
                    self.ctx.expr_refs.alloc_slice(Vec::new())
                } else {
                    self.parse_expr_list()?
                };
                self.end_statement()?;
                Ok(Stmt {
                    kind: StmtKind::Return { values },
                    span: start.merge(self.prev_span()),
                })
            }
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::Switch => self.parse_switch_stmt(),
            TokenKind::Select => self.parse_select_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Defer => {
                self.advance();
                let call = self.parse_expr()?;
                self.end_statement()?;
                Ok(Stmt {
                    kind: StmtKind::Defer { call },
                    span: start.merge(self.prev_span()),
                })
            }
            TokenKind::Go => {
                self.advance();
                if self.at(TokenKind::Newline) {
                    let body = self.parse_block()?;
                    Ok(Stmt {
                        kind: StmtKind::GoBlock { body },
                        span: start.merge(self.prev_span()),
                    })
                } else {
                    let call = self.parse_expr()?;
                    self.end_statement()?;
                    Ok(Stmt {
                        kind: StmtKind::Go { call },
                        span: start.merge(self.prev_span()),
                    })
                }
            }
            TokenKind::Send => {
                self.advance();
                let value = self.parse_expr()?;
                self.expect(TokenKind::To, "'to'")?;
                let channel = self.parse_expr()?;
                self.end_statement()?;
                Ok(Stmt {
                    kind: StmtKind::Send { channel, value },
                    span: start.merge(self.prev_span()),
                })
            }
            TokenKind::Break => {
                self.advance();
                self.end_statement()?;
                Ok(Stmt {
                    kind: StmtKind::Break,
                    span: start,
                })
            }
            TokenKind::Continue => {
                self.advance();
                self.end_statement()?;
                Ok(Stmt {
                    kind: StmtKind::Continue,
                    span: start,
                })
            }
            TokenKind::Else | TokenKind::When | TokenKind::Otherwise => Err(ParseError::new(
                ParseErrorKind::ExpectedStatement {
                    found: self.kind().describe(),
                },
                self.span(),
            )),
            _ => self.parse_simple_stmt(),
        }
    }

    /// `var` declaration parts: names, optional type, optional values,
    /// optional onerr. Shared between local and global declarations.
    pub(crate) fn parse_var_parts(
        &mut self,
    ) -> ParseResult<(
        &'a [Symbol],
        Option<&'a TypeExpr<'a>>,
        &'a [&'a Expr<'a>],
        Option<OnErr<'a>>,
    )> {
        let mut names = vec![self.expect_ident()?];
        while self.eat(TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }
        let ty = if self.type_starts_here() {
            let ty = self.parse_type()?;
            Some(self.ctx.ty(ty))
        } else {
            None
        };
        let values = if self.eat(TokenKind::Assign) {
            self.parse_expr_list()?
        } else {
            self.ctx.expr_refs.alloc_slice(Vec::new())
        };
        let onerr = self.parse_onerr()?;
        Ok((self.ctx.syms.alloc_slice(names), ty, values, onerr))
    }

    /// Short declarations, assignments, increment/decrement, and expression
    /// statements — everything that begins with an expression.
    fn parse_simple_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        let start = self.span();
        let first = self.parse_expr()?;

        if self.at(TokenKind::Comma) {
            let mut targets = vec![first];
            while self.eat(TokenKind::Comma) {
                targets.push(self.parse_expr()?);
            }
            if self.eat(TokenKind::Walrus) {
                let names = self.binding_names(&targets)?;
                let values = self.parse_expr_list()?;
                let onerr = self.parse_onerr()?;
                self.end_statement()?;
                return Ok(Stmt {
                    kind: StmtKind::Var {
                        names,
                        ty: None,
                        values,
                        onerr,
                        short: true,
                    },
                    span: start.merge(self.prev_span()),
                });
            }
            self.expect(TokenKind::Assign, "':=' or '='")?;
            let values = self.parse_expr_list()?;
            let onerr = self.parse_onerr()?;
            self.end_statement()?;
            return Ok(Stmt {
                kind: StmtKind::Assign {
                    targets: self.ctx.expr_refs.alloc_slice(targets),
                    values,
                    onerr,
                },
                span: start.merge(self.prev_span()),
            });
        }

        if self.eat(TokenKind::Walrus) {
            let names = self.binding_names(&[first])?;
            let values = self.parse_expr_list()?;
            let onerr = self.parse_onerr()?;
            self.end_statement()?;
            return Ok(Stmt {
                kind: StmtKind::Var {
                    names,
                    ty: None,
                    values,
                    onerr,
                    short: true,
                },
                span: start.merge(self.prev_span()),
            });
        }

        if self.eat(TokenKind::Assign) {
            let values = self.parse_expr_list()?;
            let onerr = self.parse_onerr()?;
            self.end_statement()?;
            return Ok(Stmt {
                kind: StmtKind::Assign {
                    targets: self.ctx.expr_refs.alloc_slice(vec![first]),
                    values,
                    onerr,
                },
                span: start.merge(self.prev_span()),
            });
        }

        if self.at(TokenKind::PlusPlus) || self.at(TokenKind::MinusMinus) {
            let increment = self.at(TokenKind::PlusPlus);
            self.advance();
            self.end_statement()?;
            return Ok(Stmt {
                kind: StmtKind::IncDec {
                    target: first,
                    increment,
                },
                span: start.merge(self.prev_span()),
            });
        }

        let onerr = self.parse_onerr()?;
        self.end_statement()?;
        Ok(Stmt {
            kind: StmtKind::Expr {
                expr: first,
                onerr,
            },
            span: start.merge(self.prev_span()),
        })
    }

    /// Validates short-declaration targets: identifiers or `_` only.
    fn binding_names(&mut self, targets: &[&'a Expr<'a>]) -> ParseResult<&'a [Symbol]> {
        let mut names = Vec::with_capacity(targets.len());
        for target in targets {
            match target.kind {
                ExprKind::Ident(sym) => names.push(sym),
                ExprKind::Discard => names.push(self.interner.intern("_")),
                _ => {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidAssignmentTarget,
                        target.span,
                    ))
                }
            }
        }
        Ok(self.ctx.syms.alloc_slice(names))
    }

    pub(crate) fn parse_expr_list(&mut self) -> ParseResult<&'a [&'a Expr<'a>]> {
        let mut values = vec![self.parse_expr()?];
        while self.eat(TokenKind::Comma) {
            values.push(self.parse_expr()?);
        }
        Ok(self.ctx.expr_refs.alloc_slice(values))
    }

    // =========================================================================
    // OnErr clause
    // =========================================================================

    /// Parses an optional `onerr` clause after a declaration, assignment, or
    /// expression statement.
    fn parse_onerr(&mut self) -> ParseResult<Option<OnErr<'a>>> {
        if !self.at(TokenKind::OnErr) {
            return Ok(None);
        }
        let start = self.span();
        self.advance();

        let mut clause = OnErr {
            handler: None,
            explain: None,
            alias: None,
            bare_return: false,
            span: start,
        };

        if self.eat(TokenKind::As) {
            clause.alias = Some(self.expect_ident()?);
        }

        if self.eat(TokenKind::Explain) {
            clause.explain = Some(self.expect_string()?);
        }

        clause.handler = self.parse_onerr_handler(&mut clause)?;
        clause.span = start.merge(self.prev_span());
        Ok(Some(clause))
    }

    fn parse_onerr_handler(
        &mut self,
        clause: &mut OnErr<'a>,
    ) -> ParseResult<Option<OnErrHandler<'a>>> {
        match self.kind() {
            TokenKind::Newline if self.peek_kind(1) == TokenKind::Indent => {
                let body = self.parse_block()?;
                Ok(Some(OnErrHandler::Block(body)))
            }
            TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof => {
                // Nothing else on the line: bare propagation, unless a
                // standalone `explain` already took that role.
                if clause.explain.is_none() {
                    clause.bare_return = true;
                }
                Ok(None)
            }
            TokenKind::Panic => {
                self.advance();
                let message = self.parse_expr()?;
                Ok(Some(OnErrHandler::Panic(message)))
            }
            TokenKind::Return => {
                self.advance();
                if matches!(
                    self.kind(),
                    TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof
                ) {
                    clause.bare_return = true;
                    Ok(None)
                } else {
                    let values = self.parse_expr_list()?;
                    Ok(Some(OnErrHandler::Return(values)))
                }
            }
            TokenKind::Discard => {
                self.advance();
                Ok(Some(OnErrHandler::Discard))
            }
            TokenKind::ErrorKw if matches!(self.peek_kind(1), TokenKind::Str { .. }) => {
                let replacement = self.parse_expr()?;
                Ok(Some(OnErrHandler::ErrorReturn(replacement)))
            }
            _ => {
                let fallback = self.parse_expr()?;
                Ok(Some(OnErrHandler::Fallback(fallback)))
            }
        }
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    fn parse_if_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        let start = self.span();
        self.advance();

        let init = if matches!(self.kind(), TokenKind::Ident(_))
            && self.peek_kind(1) == TokenKind::Walrus
        {
            let init_start = self.span();
            let name = self.expect_ident()?;
            self.advance();
            let value = self.parse_expr()?;
            self.expect(TokenKind::Semicolon, "';'")?;
            let names = self.ctx.syms.alloc_slice(vec![name]);
            let values = self.ctx.expr_refs.alloc_slice(vec![value]);
            Some(self.ctx.stmt(Stmt {
                kind: StmtKind::Var {
                    names,
                    ty: None,
                    values,
                    onerr: None,
                    short: true,
                },
                span: init_start.merge(self.prev_span()),
            }))
        } else {
            None
        };

        let cond = self.parse_expr()?;
        let then_block = self.parse_block()?;

        let else_arm = if self.at(TokenKind::Else) {
            self.advance();
            if self.at(TokenKind::If) {
                let nested = self.parse_if_stmt()?;
                Some(ElseArm::If(self.ctx.stmt(nested)))
            } else {
                Some(ElseArm::Block(self.parse_block()?))
            }
        } else {
            None
        };

        Ok(Stmt {
            kind: StmtKind::If {
                init,
                cond,
                then_block,
                else_arm,
            },
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_switch_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        let start = self.span();
        self.advance();

        let mut binding = None;
        let mut subject = None;
        let mut is_type_switch = false;

        if !self.at(TokenKind::Newline) {
            if matches!(self.kind(), TokenKind::Ident(_))
                && self.peek_kind(1) == TokenKind::Walrus
            {
                binding = Some(self.expect_ident()?);
                self.advance();
            }
            self.in_switch_header = true;
            let subj = self.parse_expr();
            self.in_switch_header = false;
            let subj = subj?;
            if self.at(TokenKind::Dot)
                && self.peek_kind(1) == TokenKind::LParen
                && self.peek_kind(2) == TokenKind::Type
            {
                self.advance();
                self.advance();
                self.advance();
                self.expect(TokenKind::RParen, "')'")?;
                is_type_switch = true;
            } else if binding.is_some() {
                return Err(self.unexpected("'.(type)' after the switch binding"));
            }
            subject = Some(subj);
        }

        self.expect(TokenKind::Newline, "end of line")?;
        self.expect(TokenKind::Indent, "an indented case block")?;

        let mut cases = Vec::new();
        let mut type_cases = Vec::new();
        let mut default = None;
        loop {
            match self.kind() {
                TokenKind::Dedent => {
                    self.advance();
                    break;
                }
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Eof => break,
                TokenKind::When => {
                    let case_start = self.span();
                    self.advance();
                    if is_type_switch {
                        let ty = self.parse_type()?;
                        let body = self.parse_block()?;
                        type_cases.push(TypeCase {
                            ty: self.ctx.ty(ty),
                            body,
                            span: case_start.merge(self.prev_span()),
                        });
                    } else {
                        let values = self.parse_expr_list()?;
                        let body = self.parse_block()?;
                        cases.push(SwitchCase {
                            values,
                            body,
                            span: case_start.merge(self.prev_span()),
                        });
                    }
                }
                TokenKind::Otherwise => {
                    self.advance();
                    default = Some(self.parse_block()?);
                }
                _ => return Err(self.unexpected("'when' or 'otherwise'")),
            }
        }

        let span = start.merge(self.prev_span());
        if is_type_switch {
            Ok(Stmt {
                kind: StmtKind::TypeSwitch {
                    binding,
                    subject: subject.expect("type switch has a subject"),
                    cases: self.ctx.type_cases.alloc_slice(type_cases),
                    default,
                },
                span,
            })
        } else {
            Ok(Stmt {
                kind: StmtKind::Switch {
                    subject,
                    cases: self.ctx.switch_cases.alloc_slice(cases),
                    default,
                },
                span,
            })
        }
    }

    fn parse_select_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        let start = self.span();
        self.advance();
        self.expect(TokenKind::Newline, "end of line")?;
        self.expect(TokenKind::Indent, "an indented case block")?;

        let mut cases = Vec::new();
        let mut default = None;
        loop {
            match self.kind() {
                TokenKind::Dedent => {
                    self.advance();
                    break;
                }
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Eof => break,
                TokenKind::When => {
                    let case_start = self.span();
                    self.advance();
                    let comm = self.parse_select_comm()?;
                    let body = self.parse_block()?;
                    cases.push(SelectCase {
                        comm,
                        body,
                        span: case_start.merge(self.prev_span()),
                    });
                }
                TokenKind::Otherwise => {
                    self.advance();
                    default = Some(self.parse_block()?);
                }
                _ => return Err(self.unexpected("'when' or 'otherwise'")),
            }
        }

        Ok(Stmt {
            kind: StmtKind::Select {
                cases: self.ctx.select_cases.alloc_slice(cases),
                default,
            },
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_select_comm(&mut self) -> ParseResult<SelectComm<'a>> {
        match self.kind() {
            TokenKind::Receive => {
                self.advance();
                let channel = self.parse_expr()?;
                Ok(SelectComm::Recv {
                    bindings: self.ctx.syms.alloc_slice(Vec::new()),
                    channel,
                })
            }
            TokenKind::Send => {
                self.advance();
                let value = self.parse_expr()?;
                self.expect(TokenKind::To, "'to'")?;
                let channel = self.parse_expr()?;
                Ok(SelectComm::Send { channel, value })
            }
            TokenKind::Ident(_) => {
                let mut bindings = vec![self.expect_ident()?];
                if self.eat(TokenKind::Comma) {
                    bindings.push(self.expect_ident()?);
                }
                self.expect(TokenKind::Walrus, "':='")?;
                self.expect(TokenKind::Receive, "'receive'")?;
                let channel = self.parse_expr()?;
                Ok(SelectComm::Recv {
                    bindings: self.ctx.syms.alloc_slice(bindings),
                    channel,
                })
            }
            _ => Err(self.unexpected("a channel operation")),
        }
    }

    fn parse_for_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        let start = self.span();
        self.advance();

        if self.at(TokenKind::Newline) {
            let body = self.parse_block()?;
            return Ok(Stmt {
                kind: StmtKind::ForCond { cond: None, body },
                span: start.merge(self.prev_span()),
            });
        }

        if let TokenKind::Ident(first) = self.kind() {
            match self.peek_kind(1) {
                TokenKind::In => {
                    self.advance();
                    self.advance();
                    let iterable = self.parse_expr()?;
                    let body = self.parse_block()?;
                    return Ok(Stmt {
                        kind: StmtKind::ForRange {
                            index: None,
                            value: first,
                            iterable,
                            body,
                        },
                        span: start.merge(self.prev_span()),
                    });
                }
                TokenKind::Comma
                    if matches!(self.peek_kind(2), TokenKind::Ident(_))
                        && self.peek_kind(3) == TokenKind::In =>
                {
                    self.advance();
                    self.advance();
                    let value = self.expect_ident()?;
                    self.advance();
                    let iterable = self.parse_expr()?;
                    let body = self.parse_block()?;
                    return Ok(Stmt {
                        kind: StmtKind::ForRange {
                            index: Some(first),
                            value,
                            iterable,
                            body,
                        },
                        span: start.merge(self.prev_span()),
                    });
                }
                TokenKind::From => {
                    self.advance();
                    self.advance();
                    let from = self.parse_expr()?;
                    let inclusive = if self.eat(TokenKind::Through) {
                        true
                    } else {
                        self.expect(TokenKind::To, "'to' or 'through'")?;
                        false
                    };
                    let to = self.parse_expr()?;
                    let body = self.parse_block()?;
                    return Ok(Stmt {
                        kind: StmtKind::ForNumeric {
                            var: first,
                            from,
                            to,
                            inclusive,
                            body,
                        },
                        span: start.merge(self.prev_span()),
                    });
                }
                _ => {}
            }
        }

        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt {
            kind: StmtKind::ForCond {
                cond: Some(cond),
                body,
            },
            span: start.merge(self.prev_span()),
        })
    }
}
