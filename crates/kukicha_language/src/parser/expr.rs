//! Expression parsing: Pratt precedence climbing plus postfix forms.
//!
//! Precedence, lowest to highest: pipe `|>`, `or`, `and`, equality,
//! comparison, additive, multiplicative, unary prefix, postfix (call,
//! index/slice, field, `as` cast, `.(T)` assertion, struct literal).
//! All binary operators associate left; `a |> b |> c` nests as
//! `(a |> b) |> c`.

use kukicha_base::{Span, Symbol};

use crate::ast::{
    Arg, BinaryOp, Expr, ExprKind, FieldInit, LambdaBody, Param, TypeExpr, TypeKind, UnaryOp,
};
use crate::error::{ParseError, ParseErrorKind};
use crate::token::TokenKind;

use super::{ParseResult, Parser};

/// Binding powers for the Pratt loop.
mod bp {
    pub const PIPE: u8 = 1;
    pub const OR: u8 = 2;
    pub const AND: u8 = 3;
    pub const EQUALITY: u8 = 4;
    pub const COMPARISON: u8 = 5;
    pub const ADDITIVE: u8 = 6;
    pub const MULTIPLICATIVE: u8 = 7;
}

enum InfixOp {
    Pipe,
    Bin(BinaryOp),
}

fn infix_of(kind: TokenKind) -> Option<(InfixOp, u8)> {
    let entry = match kind {
        TokenKind::PipeOp => (InfixOp::Pipe, bp::PIPE),
        TokenKind::Or => (InfixOp::Bin(BinaryOp::Or), bp::OR),
        TokenKind::And => (InfixOp::Bin(BinaryOp::And), bp::AND),
        TokenKind::EqEq | TokenKind::Equals => (InfixOp::Bin(BinaryOp::Eq), bp::EQUALITY),
        TokenKind::NotEq => (InfixOp::Bin(BinaryOp::NotEq), bp::EQUALITY),
        TokenKind::Lt => (InfixOp::Bin(BinaryOp::Lt), bp::COMPARISON),
        TokenKind::Gt => (InfixOp::Bin(BinaryOp::Gt), bp::COMPARISON),
        TokenKind::LtEq => (InfixOp::Bin(BinaryOp::LtEq), bp::COMPARISON),
        TokenKind::GtEq => (InfixOp::Bin(BinaryOp::GtEq), bp::COMPARISON),
        TokenKind::Plus => (InfixOp::Bin(BinaryOp::Add), bp::ADDITIVE),
        TokenKind::Minus => (InfixOp::Bin(BinaryOp::Sub), bp::ADDITIVE),
        TokenKind::Star => (InfixOp::Bin(BinaryOp::Mul), bp::MULTIPLICATIVE),
        TokenKind::Slash => (InfixOp::Bin(BinaryOp::Div), bp::MULTIPLICATIVE),
        TokenKind::Percent => (InfixOp::Bin(BinaryOp::Mod), bp::MULTIPLICATIVE),
        _ => return None,
    };
    Some(entry)
}

impl<'a, 'int> Parser<'a, 'int> {
    pub(crate) fn mk_expr(&self, kind: ExprKind<'a>, span: Span) -> &'a Expr<'a> {
        self.ctx.expr(Expr { kind, span })
    }

    pub(crate) fn parse_expr(&mut self) -> ParseResult<&'a Expr<'a>> {
        self.parse_bin(0)
    }

    fn parse_bin(&mut self, min_bp: u8) -> ParseResult<&'a Expr<'a>> {
        let mut lhs = self.parse_unary()?;
        while let Some((op, power)) = infix_of(self.kind()) {
            if power < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_bin(power + 1)?;
            let span = lhs.span.merge(rhs.span);
            lhs = match op {
                InfixOp::Pipe => self.mk_expr(ExprKind::Pipe { left: lhs, right: rhs }, span),
                InfixOp::Bin(op) => {
                    self.mk_expr(ExprKind::Binary { op, left: lhs, right: rhs }, span)
                }
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> ParseResult<&'a Expr<'a>> {
        let start = self.span();
        match self.kind() {
            TokenKind::Not => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(operand.span);
                Ok(self.mk_expr(ExprKind::Unary { op: UnaryOp::Not, operand }, span))
            }
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(operand.span);
                Ok(self.mk_expr(ExprKind::Unary { op: UnaryOp::Neg, operand }, span))
            }
            TokenKind::Reference => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(operand.span);
                Ok(self.mk_expr(ExprKind::AddressOf(operand), span))
            }
            TokenKind::Dereference => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(operand.span);
                Ok(self.mk_expr(ExprKind::Deref(operand), span))
            }
            TokenKind::Receive => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(operand.span);
                Ok(self.mk_expr(ExprKind::Receive(operand), span))
            }
            TokenKind::Panic => {
                self.advance();
                let operand = self.parse_expr()?;
                let span = start.merge(operand.span);
                Ok(self.mk_expr(ExprKind::Panic(operand), span))
            }
            TokenKind::Close => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(operand.span);
                Ok(self.mk_expr(ExprKind::Close(operand), span))
            }
            TokenKind::Recover => {
                self.advance();
                if self.at(TokenKind::LParen) && self.peek_kind(1) == TokenKind::RParen {
                    self.advance();
                    self.advance();
                }
                Ok(self.mk_expr(ExprKind::Recover, start.merge(self.prev_span())))
            }
            TokenKind::Make => {
                self.advance();
                self.expect(TokenKind::LParen, "'('")?;
                self.skip_layout();
                let ty = self.parse_type()?;
                let mut args = Vec::new();
                while self.eat(TokenKind::Comma) {
                    self.skip_layout();
                    args.push(self.parse_expr()?);
                    self.skip_layout();
                }
                self.expect(TokenKind::RParen, "')'")?;
                let span = start.merge(self.prev_span());
                Ok(self.mk_expr(
                    ExprKind::Make {
                        ty: self.ctx.ty(ty),
                        args: self.ctx.expr_refs.alloc_slice(args),
                    },
                    span,
                ))
            }
            TokenKind::ErrorKw => {
                self.advance();
                // `error "message"` constructs an error; a bare `error` is
                // an ordinary identifier (substituted inside onerr handlers).
                if matches!(self.kind(), TokenKind::Str { .. } | TokenKind::LParen) {
                    let message = self.parse_unary()?;
                    let span = start.merge(message.span);
                    Ok(self.mk_expr(ExprKind::ErrorNew(message), span))
                } else {
                    let sym = self.interner.intern("error");
                    Ok(self.mk_expr(ExprKind::Ident(sym), start))
                }
            }
            TokenKind::Empty => {
                self.advance();
                let ty = if self.type_starts_here() {
                    let ty = self.parse_type()?;
                    Some(self.ctx.ty(ty))
                } else {
                    None
                };
                Ok(self.mk_expr(ExprKind::Empty { ty }, start.merge(self.prev_span())))
            }
            _ => {
                let primary = self.parse_primary()?;
                self.parse_postfix(primary)
            }
        }
    }

    fn parse_primary(&mut self) -> ParseResult<&'a Expr<'a>> {
        let start = self.span();
        match self.kind() {
            TokenKind::Int { value, lexeme } => {
                self.advance();
                Ok(self.mk_expr(ExprKind::Int { value, lexeme }, start))
            }
            TokenKind::Float { value, lexeme } => {
                self.advance();
                Ok(self.mk_expr(ExprKind::Float { value, lexeme }, start))
            }
            TokenKind::Str { value, interpolated } => {
                self.advance();
                Ok(self.mk_expr(ExprKind::Str { value, interpolated }, start))
            }
            TokenKind::Rune(c) => {
                self.advance();
                Ok(self.mk_expr(ExprKind::Rune(c), start))
            }
            TokenKind::True => {
                self.advance();
                Ok(self.mk_expr(ExprKind::Bool(true), start))
            }
            TokenKind::False => {
                self.advance();
                Ok(self.mk_expr(ExprKind::Bool(false), start))
            }
            TokenKind::Underscore | TokenKind::Discard => {
                self.advance();
                Ok(self.mk_expr(ExprKind::Discard, start))
            }
            TokenKind::Ident(sym) => {
                if self.peek_kind(1) == TokenKind::FatArrow {
                    return self.parse_single_param_lambda(sym);
                }
                self.advance();
                Ok(self.mk_expr(ExprKind::Ident(sym), start))
            }
            TokenKind::LParen => {
                if self.lambda_ahead() {
                    return self.parse_lambda();
                }
                self.advance();
                self.skip_layout();
                let inner = self.parse_expr()?;
                self.skip_layout();
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elems = Vec::new();
                self.skip_layout();
                while !self.at(TokenKind::RBracket) && !self.at(TokenKind::Eof) {
                    elems.push(self.parse_expr()?);
                    self.skip_layout();
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                    self.skip_layout();
                }
                self.expect(TokenKind::RBracket, "']'")?;
                let span = start.merge(self.prev_span());
                Ok(self.mk_expr(
                    ExprKind::ListLit {
                        elem_ty: None,
                        elems: self.ctx.expr_refs.alloc_slice(elems),
                    },
                    span,
                ))
            }
            TokenKind::List => {
                let ty = self.parse_type()?;
                self.expect(TokenKind::LBrace, "'{'")?;
                let mut elems = Vec::new();
                self.skip_layout();
                while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
                    elems.push(self.parse_expr()?);
                    self.skip_layout();
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                    self.skip_layout();
                }
                self.expect(TokenKind::RBrace, "'}'")?;
                let span = start.merge(self.prev_span());
                let elem_ty = match ty.kind {
                    TypeKind::List(elem) => Some(elem),
                    _ => None,
                };
                Ok(self.mk_expr(
                    ExprKind::ListLit {
                        elem_ty,
                        elems: self.ctx.expr_refs.alloc_slice(elems),
                    },
                    span,
                ))
            }
            TokenKind::Map => {
                let ty = self.parse_type()?;
                let (key_ty, value_ty) = match ty.kind {
                    TypeKind::Map { key, value } => (key, value),
                    _ => {
                        return Err(ParseError::new(
                            ParseErrorKind::ExpectedType {
                                found: "a malformed map type".to_string(),
                            },
                            ty.span,
                        ))
                    }
                };
                self.expect(TokenKind::LBrace, "'{'")?;
                let mut pairs = Vec::new();
                self.skip_layout();
                while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
                    let key = self.parse_expr()?;
                    self.expect(TokenKind::Colon, "':'")?;
                    let value = self.parse_expr()?;
                    pairs.push((key, value));
                    self.skip_layout();
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                    self.skip_layout();
                }
                self.expect(TokenKind::RBrace, "'}'")?;
                let span = start.merge(self.prev_span());
                Ok(self.mk_expr(
                    ExprKind::MapLit {
                        key_ty,
                        value_ty,
                        pairs: self.ctx.pairs.alloc_slice(pairs),
                    },
                    span,
                ))
            }
            TokenKind::Func => {
                // Function literal: `func(params) rets` with a block body.
                self.advance();
                self.expect(TokenKind::LParen, "'('")?;
                let params = self.parse_params(true)?;
                self.expect(TokenKind::RParen, "')'")?;
                let results = self.parse_result_types()?;
                let body = self.parse_block()?;
                let span = start.merge(self.prev_span());
                Ok(self.mk_expr(
                    ExprKind::Lambda {
                        params,
                        results,
                        body: LambdaBody::Block(body),
                    },
                    span,
                ))
            }
            other => Err(ParseError::new(
                ParseErrorKind::ExpectedExpression {
                    found: other.describe(),
                },
                self.span(),
            )),
        }
    }

    /// Looks ahead from a `(` for the `) =>` that marks an arrow lambda.
    fn lambda_ahead(&self) -> bool {
        let mut depth = 0usize;
        let mut i = self.pos;
        loop {
            match self.peek_kind(i - self.pos) {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return self.peek_kind(i - self.pos + 1) == TokenKind::FatArrow;
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            i += 1;
        }
    }

    fn parse_single_param_lambda(&mut self, name: Symbol) -> ParseResult<&'a Expr<'a>> {
        let start = self.span();
        self.advance();
        self.advance();
        let params = self.ctx.params.alloc_slice(vec![Param {
            name,
            ty: None,
            default: None,
            span: start,
        }]);
        let body = self.parse_lambda_body()?;
        let span = start.merge(self.prev_span());
        Ok(self.mk_expr(
            ExprKind::Lambda {
                params,
                results: self.ctx.types.alloc_slice(Vec::new()),
                body,
            },
            span,
        ))
    }

    fn parse_lambda(&mut self) -> ParseResult<&'a Expr<'a>> {
        let start = self.span();
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parse_params(false)?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::FatArrow, "'=>'")?;
        let body = self.parse_lambda_body()?;
        let span = start.merge(self.prev_span());
        Ok(self.mk_expr(
            ExprKind::Lambda {
                params,
                results: self.ctx.types.alloc_slice(Vec::new()),
                body,
            },
            span,
        ))
    }

    fn parse_lambda_body(&mut self) -> ParseResult<LambdaBody<'a>> {
        if self.at(TokenKind::Newline) && self.peek_kind(1) == TokenKind::Indent {
            Ok(LambdaBody::Block(self.parse_block()?))
        } else {
            Ok(LambdaBody::Expr(self.parse_expr()?))
        }
    }

    fn parse_postfix(&mut self, mut expr: &'a Expr<'a>) -> ParseResult<&'a Expr<'a>> {
        loop {
            match self.kind() {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_args()?;
                    self.expect(TokenKind::RParen, "')'")?;
                    let spread = args.iter().any(|a| a.spread);
                    let span = expr.span.merge(self.prev_span());
                    expr = self.mk_expr(
                        ExprKind::Call {
                            callee: expr,
                            args,
                            spread,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    self.skip_layout();
                    if self.eat(TokenKind::Colon) {
                        let end = if self.at(TokenKind::RBracket) {
                            None
                        } else {
                            Some(self.parse_expr()?)
                        };
                        self.expect(TokenKind::RBracket, "']'")?;
                        let span = expr.span.merge(self.prev_span());
                        expr = self.mk_expr(
                            ExprKind::Slice {
                                object: expr,
                                start: None,
                                end,
                            },
                            span,
                        );
                    } else {
                        let first = self.parse_expr()?;
                        if self.eat(TokenKind::Colon) {
                            let end = if self.at(TokenKind::RBracket) {
                                None
                            } else {
                                Some(self.parse_expr()?)
                            };
                            self.expect(TokenKind::RBracket, "']'")?;
                            let span = expr.span.merge(self.prev_span());
                            expr = self.mk_expr(
                                ExprKind::Slice {
                                    object: expr,
                                    start: Some(first),
                                    end,
                                },
                                span,
                            );
                        } else {
                            self.expect(TokenKind::RBracket, "']'")?;
                            let span = expr.span.merge(self.prev_span());
                            expr = self.mk_expr(
                                ExprKind::Index {
                                    object: expr,
                                    index: first,
                                },
                                span,
                            );
                        }
                    }
                }
                TokenKind::Dot => {
                    // Leave `.(type)` for the switch parser.
                    if self.in_switch_header
                        && self.peek_kind(1) == TokenKind::LParen
                        && self.peek_kind(2) == TokenKind::Type
                    {
                        break;
                    }
                    self.advance();
                    if self.eat(TokenKind::LParen) {
                        let ty = self.parse_type()?;
                        self.expect(TokenKind::RParen, "')'")?;
                        let span = expr.span.merge(self.prev_span());
                        expr = self.mk_expr(
                            ExprKind::TypeAssert {
                                expr,
                                ty: self.ctx.ty(ty),
                            },
                            span,
                        );
                    } else {
                        let name = self.expect_ident()?;
                        let span = expr.span.merge(self.prev_span());
                        expr = self.mk_expr(ExprKind::Field { object: expr, name }, span);
                    }
                }
                TokenKind::LBrace => {
                    let ty = match self.struct_lit_type(expr) {
                        Some(ty) => ty,
                        None => break,
                    };
                    self.advance();
                    let mut fields = Vec::new();
                    self.skip_layout();
                    while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
                        let field_start = self.span();
                        let name = self.expect_ident()?;
                        self.expect(TokenKind::Colon, "':'")?;
                        let value = self.parse_expr()?;
                        fields.push(FieldInit {
                            name,
                            value,
                            span: field_start.merge(self.prev_span()),
                        });
                        self.skip_layout();
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                        self.skip_layout();
                    }
                    self.expect(TokenKind::RBrace, "'}'")?;
                    let span = expr.span.merge(self.prev_span());
                    expr = self.mk_expr(
                        ExprKind::StructLit {
                            ty,
                            fields: self.ctx.field_inits.alloc_slice(fields),
                        },
                        span,
                    );
                }
                TokenKind::As => {
                    self.advance();
                    let ty = self.parse_type()?;
                    let span = expr.span.merge(self.prev_span());
                    expr = self.mk_expr(
                        ExprKind::Cast {
                            expr,
                            ty: self.ctx.ty(ty),
                        },
                        span,
                    );
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// A `{` after an identifier or `pkg.Name` begins a struct literal;
    /// anything else does not.
    fn struct_lit_type(&self, expr: &'a Expr<'a>) -> Option<&'a TypeExpr<'a>> {
        match expr.kind {
            ExprKind::Ident(sym) => Some(self.ctx.ty(TypeExpr {
                kind: TypeKind::Named(sym),
                span: expr.span,
            })),
            ExprKind::Field { object, name } => match object.kind {
                ExprKind::Ident(package) => Some(self.ctx.ty(TypeExpr {
                    kind: TypeKind::Qualified { package, name },
                    span: expr.span,
                })),
                _ => None,
            },
            _ => None,
        }
    }

    /// Comma-separated argument list, supporting named arguments
    /// (`name: value`) and the spread marker (`xs many`).
    fn parse_args(&mut self) -> ParseResult<&'a [Arg<'a>]> {
        let mut args = Vec::new();
        self.skip_layout();
        while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
            let start = self.span();
            let name = match self.kind() {
                TokenKind::Ident(sym) if self.peek_kind(1) == TokenKind::Colon => {
                    self.advance();
                    self.advance();
                    Some(sym)
                }
                _ => None,
            };
            let value = self.parse_expr()?;
            let spread = self.eat(TokenKind::Many);
            args.push(Arg {
                name,
                value,
                spread,
                span: start.merge(self.prev_span()),
            });
            self.skip_layout();
            if !self.eat(TokenKind::Comma) {
                break;
            }
            self.skip_layout();
        }
        Ok(self.ctx.args.alloc_slice(args))
    }
}
