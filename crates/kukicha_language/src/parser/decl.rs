//! Top-level declaration parsing.

use crate::ast::{
    Decl, DeclKind, FuncDecl, ImportDecl, InterfaceDecl, MethodSig, PackageDecl, Param, Program,
    Receiver, SkillDecl, StructDecl, StructField,
};
use crate::error::{ParseError, ParseErrorKind};
use crate::token::TokenKind;

use super::{ParseResult, Parser};

impl<'a, 'int> Parser<'a, 'int> {
    pub(crate) fn parse_top_level(&mut self, program: &mut Program<'a>) -> ParseResult<()> {
        match self.kind() {
            TokenKind::Petiole => {
                let start = self.span();
                self.advance();
                let name = self.expect_ident()?;
                self.end_statement()?;
                if program.package.is_some() {
                    return Err(ParseError::new(ParseErrorKind::DuplicatePackageDecl, start));
                }
                program.package = Some(PackageDecl {
                    name,
                    span: start.merge(self.prev_span()),
                });
                Ok(())
            }
            TokenKind::Skill => {
                let start = self.span();
                self.advance();
                let name = self.expect_string()?;
                let description = match self.kind() {
                    TokenKind::Str { value, .. } => {
                        self.advance();
                        Some(value)
                    }
                    _ => None,
                };
                self.end_statement()?;
                program.skill = Some(SkillDecl {
                    name,
                    description,
                    span: start.merge(self.prev_span()),
                });
                Ok(())
            }
            TokenKind::Import => {
                let start = self.span();
                self.advance();
                let path = self.expect_string()?;
                let alias = if self.eat(TokenKind::As) {
                    Some(self.expect_ident()?)
                } else {
                    None
                };
                self.end_statement()?;
                program.imports.push(ImportDecl {
                    path,
                    alias,
                    span: start.merge(self.prev_span()),
                });
                Ok(())
            }
            TokenKind::Func => {
                let decl = self.parse_func_decl()?;
                program.decls.push(decl);
                Ok(())
            }
            TokenKind::Type => {
                let decl = self.parse_type_decl()?;
                program.decls.push(decl);
                Ok(())
            }
            TokenKind::Interface => {
                let decl = self.parse_interface_decl()?;
                program.decls.push(decl);
                Ok(())
            }
            TokenKind::Var => {
                let start = self.span();
                self.advance();
                let (names, ty, values, onerr) = self.parse_var_parts()?;
                self.end_statement()?;
                program.decls.push(Decl {
                    kind: DeclKind::Var {
                        names,
                        ty,
                        values,
                        onerr,
                    },
                    span: start.merge(self.prev_span()),
                });
                Ok(())
            }
            other => Err(ParseError::new(
                ParseErrorKind::ExpectedDeclaration {
                    found: other.describe(),
                },
                self.span(),
            )),
        }
    }

    /// `func Name(params) rets` and `func Name on recv Type(params) rets`.
    fn parse_func_decl(&mut self) -> ParseResult<Decl<'a>> {
        let start = self.span();
        self.advance();
        let name = self.expect_ident()?;

        let receiver = if self.eat(TokenKind::On) {
            let recv_start = self.span();
            let recv_name = self.expect_ident()?;
            let recv_ty = self.parse_type()?;
            Some(Receiver {
                name: recv_name,
                ty: self.ctx.ty(recv_ty),
                span: recv_start.merge(self.prev_span()),
            })
        } else {
            None
        };

        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parse_params(true)?;
        self.expect(TokenKind::RParen, "')'")?;
        let results = self.parse_result_types()?;
        let body = self.parse_block()?;

        Ok(Decl {
            kind: DeclKind::Func(FuncDecl {
                name,
                receiver,
                params,
                results,
                body,
            }),
            span: start.merge(self.prev_span()),
        })
    }

    /// Parameter list between parentheses. When `require_types` is set
    /// (function declarations), a missing annotation is an error; lambda
    /// parameters may omit it.
    pub(crate) fn parse_params(&mut self, require_types: bool) -> ParseResult<&'a [Param<'a>]> {
        let mut params = Vec::new();
        self.skip_layout();
        while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
            let start = self.span();
            let name = self.expect_ident()?;
            let ty = if self.type_starts_here() {
                let ty = self.parse_type()?;
                Some(self.ctx.ty(ty))
            } else {
                if require_types {
                    return Err(ParseError::new(
                        ParseErrorKind::ExpectedParameterType {
                            name: self.interner.resolve(name).to_string(),
                        },
                        start,
                    ));
                }
                None
            };
            let default = if self.eat(TokenKind::Assign) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            params.push(Param {
                name,
                ty,
                default,
                span: start.merge(self.prev_span()),
            });
            self.skip_layout();
            if !self.eat(TokenKind::Comma) {
                break;
            }
            self.skip_layout();
        }
        Ok(self.ctx.params.alloc_slice(params))
    }

    /// `type Name` + field block, `type Name Target`, or `type Name = Target`.
    fn parse_type_decl(&mut self) -> ParseResult<Decl<'a>> {
        let start = self.span();
        self.advance();
        let name = self.expect_ident()?;

        if self.eat(TokenKind::Assign) {
            let target = self.parse_type()?;
            self.end_statement()?;
            return Ok(Decl {
                kind: DeclKind::TypeAlias {
                    name,
                    target: self.ctx.ty(target),
                    is_alias: true,
                },
                span: start.merge(self.prev_span()),
            });
        }

        if self.type_starts_here() {
            let target = self.parse_type()?;
            self.end_statement()?;
            return Ok(Decl {
                kind: DeclKind::TypeAlias {
                    name,
                    target: self.ctx.ty(target),
                    is_alias: false,
                },
                span: start.merge(self.prev_span()),
            });
        }

        // Struct declaration: an indented block of `field Type` lines.
        self.expect(TokenKind::Newline, "end of line")?;
        self.expect(TokenKind::Indent, "an indented field block")?;
        let mut fields = Vec::new();
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
                _ => {
                    let field_start = self.span();
                    let field_name = self.expect_ident()?;
                    let ty = self.parse_type()?;
                    let json_alias = match self.kind() {
                        TokenKind::Str { value, .. } => {
                            self.advance();
                            Some(value)
                        }
                        _ => None,
                    };
                    self.end_statement()?;
                    fields.push(StructField {
                        name: field_name,
                        ty: self.ctx.ty(ty),
                        json_alias,
                        span: field_start.merge(self.prev_span()),
                    });
                }
            }
        }

        Ok(Decl {
            kind: DeclKind::Struct(StructDecl {
                name,
                fields: self.ctx.fields.alloc_slice(fields),
            }),
            span: start.merge(self.prev_span()),
        })
    }

    /// `interface Name` + an indented block of method signatures.
    fn parse_interface_decl(&mut self) -> ParseResult<Decl<'a>> {
        let start = self.span();
        self.advance();
        let name = self.expect_ident()?;
        self.expect(TokenKind::Newline, "end of line")?;
        self.expect(TokenKind::Indent, "an indented method block")?;

        let mut methods = Vec::new();
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
                _ => {
                    let sig_start = self.span();
                    let method_name = self.expect_ident()?;
                    self.expect(TokenKind::LParen, "'('")?;
                    let params = self.parse_params(true)?;
                    self.expect(TokenKind::RParen, "')'")?;
                    let results = self.parse_result_types()?;
                    self.end_statement()?;
                    methods.push(MethodSig {
                        name: method_name,
                        params,
                        results,
                        span: sig_start.merge(self.prev_span()),
                    });
                }
            }
        }

        Ok(Decl {
            kind: DeclKind::Interface(InterfaceDecl {
                name,
                methods: self.ctx.methods.alloc_slice(methods),
            }),
            span: start.merge(self.prev_span()),
        })
    }
}
