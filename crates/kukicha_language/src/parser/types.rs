//! Type annotation parsing.
//!
//! `list`, `map`, `channel`, `of`, and `many` act as keywords only here;
//! everywhere else the parser reads them back as identifiers.

use crate::ast::{TypeExpr, TypeKind};
use crate::error::{ParseError, ParseErrorKind};
use crate::token::TokenKind;

use super::{ParseResult, Parser};

impl<'a, 'int> Parser<'a, 'int> {
    /// Parses a type annotation by value; callers allocate into the arena
    /// where a reference is needed.
    pub(crate) fn parse_type(&mut self) -> ParseResult<TypeExpr<'a>> {
        let start = self.span();
        match self.kind() {
            TokenKind::List => {
                self.advance();
                self.expect(TokenKind::Of, "'of'")?;
                let elem = self.parse_type()?;
                let span = start.merge(elem.span);
                Ok(TypeExpr {
                    kind: TypeKind::List(self.ctx.ty(elem)),
                    span,
                })
            }
            TokenKind::Map => {
                self.advance();
                self.expect(TokenKind::Of, "'of'")?;
                let key = self.parse_type()?;
                self.expect(TokenKind::To, "'to'")?;
                let value = self.parse_type()?;
                let span = start.merge(value.span);
                Ok(TypeExpr {
                    kind: TypeKind::Map {
                        key: self.ctx.ty(key),
                        value: self.ctx.ty(value),
                    },
                    span,
                })
            }
            TokenKind::Channel => {
                self.advance();
                self.expect(TokenKind::Of, "'of'")?;
                let elem = self.parse_type()?;
                let span = start.merge(elem.span);
                Ok(TypeExpr {
                    kind: TypeKind::Channel(self.ctx.ty(elem)),
                    span,
                })
            }
            TokenKind::Reference => {
                self.advance();
                let target = self.parse_type()?;
                let span = start.merge(target.span);
                Ok(TypeExpr {
                    kind: TypeKind::Reference(self.ctx.ty(target)),
                    span,
                })
            }
            TokenKind::Many => {
                self.advance();
                let elem = self.parse_type()?;
                let span = start.merge(elem.span);
                Ok(TypeExpr {
                    kind: TypeKind::Variadic(self.ctx.ty(elem)),
                    span,
                })
            }
            TokenKind::Func => {
                self.advance();
                self.expect(TokenKind::LParen, "'('")?;
                let mut params = Vec::new();
                while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
                    self.skip_layout();
                    params.push(self.parse_type()?);
                    self.skip_layout();
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RParen, "')'")?;
                let results = self.parse_result_types()?;
                let span = start.merge(self.prev_span());
                Ok(TypeExpr {
                    kind: TypeKind::Func {
                        params: self.ctx.types.alloc_slice(params),
                        results,
                    },
                    span,
                })
            }
            TokenKind::ErrorKw => {
                self.advance();
                let sym = self.interner.intern("error");
                Ok(TypeExpr {
                    kind: TypeKind::Named(sym),
                    span: start,
                })
            }
            TokenKind::Ident(sym) => {
                self.advance();
                if self.at(TokenKind::Dot) {
                    if let TokenKind::Ident(name) = self.peek_kind(1) {
                        self.advance();
                        self.advance();
                        return Ok(TypeExpr {
                            kind: TypeKind::Qualified { package: sym, name },
                            span: start.merge(self.prev_span()),
                        });
                    }
                }
                Ok(TypeExpr {
                    kind: TypeKind::Named(sym),
                    span: start,
                })
            }
            other => Err(ParseError::new(
                ParseErrorKind::ExpectedType {
                    found: other.describe(),
                },
                self.span(),
            )),
        }
    }

    /// Parses a function's return types: empty, a single type, or a
    /// parenthesized list.
    pub(crate) fn parse_result_types(&mut self) -> ParseResult<&'a [TypeExpr<'a>]> {
        if self.at(TokenKind::LParen) {
            self.advance();
            let mut results = Vec::new();
            while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
                self.skip_layout();
                results.push(self.parse_type()?);
                self.skip_layout();
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen, "')'")?;
            return Ok(self.ctx.types.alloc_slice(results));
        }
        if self.type_starts_here() {
            let ty = self.parse_type()?;
            return Ok(self.ctx.types.alloc_slice(vec![ty]));
        }
        Ok(self.ctx.types.alloc_slice(Vec::new()))
    }

    /// Whether the current token can begin a type annotation.
    pub(crate) fn type_starts_here(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::Ident(_)
                | TokenKind::List
                | TokenKind::Map
                | TokenKind::Channel
                | TokenKind::Reference
                | TokenKind::Many
                | TokenKind::Func
                | TokenKind::ErrorKw
        )
    }
}
