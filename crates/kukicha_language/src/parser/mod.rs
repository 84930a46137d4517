//! Recursive-descent parser for kukicha.
//!
//! The parser consumes the lexer's token stream (including the synthetic
//! `Indent`/`Dedent`/`Newline` tokens) and produces an arena-allocated
//! [`Program`]. Expressions use Pratt parsing; see `expr.rs` for the
//! precedence ladder. Statements and declarations are in `stmt.rs` and this
//! module.
//!
//! # Error recovery
//!
//! A failed construct records a [`ParseError`] and synchronizes to the next
//! statement or declaration boundary (a `Newline` at the current block
//! level), so one bad declaration does not suppress the rest of the file.
//!
//! # Layout inside parentheses
//!
//! Parentheses do not suppress `Indent`/`Dedent` in the lexer, so argument
//! lists spanning lines carry layout tokens. The parser skips those as
//! *layout noise*, recording each skipped `Indent` on a kind stack so the
//! matching `Dedent`s — which may arrive after the statement's own newline
//! — resolve silently instead of ending an enclosing block early.

mod decl;
mod expr;
mod stmt;
mod types;


use kukicha_base::{Span, Symbol, Interner};

use crate::arena_ctx::AstContext;
use crate::ast::Program;
use crate::error::{ParseError, ParseErrorKind};
use crate::token::{Token, TokenKind};

pub(crate) type ParseResult<T> = Result<T, ParseError>;

/// Why an `Indent` was consumed. Dedents resolve against this stack in
/// last-in-first-out order, matching the lexer's indent stack, so a
/// continuation dedent inside an argument list never closes a real block
/// (or the other way around).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IndentKind {
    /// Line-continuation layout inside parentheses or brackets.
    Layout,
    /// A statement block opened by `parse_block`.
    Block,
}

/// The parser state machine.
pub struct Parser<'a, 'int> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) interner: &'int mut Interner,
    pub(crate) ctx: AstContext<'a>,
    pub(crate) errors: Vec<ParseError>,
    /// Open indents and what opened them; see [`IndentKind`].
    pub(crate) indent_kinds: Vec<IndentKind>,
    /// Set while parsing a `switch` subject so `.(type)` is left for the
    /// switch parser instead of being taken as a type assertion.
    pub(crate) in_switch_header: bool,
}

impl<'a, 'int> Parser<'a, 'int> {
    pub fn new(tokens: Vec<Token>, interner: &'int mut Interner, ctx: AstContext<'a>) -> Self {
        Parser {
            tokens,
            pos: 0,
            interner,
            ctx,
            errors: Vec::new(),
            indent_kinds: Vec::new(),
            in_switch_header: false,
        }
    }

    /// Parses the whole compilation unit, recovering at declaration
    /// boundaries. Errors are collected; retrieve them with
    /// [`Parser::take_errors`].
    pub fn parse_program(&mut self) -> Program<'a> {
        let mut program = Program::default();
        loop {
            match self.kind() {
                TokenKind::Newline => {
                    self.advance();
                    continue;
                }
                TokenKind::Dedent => {
                    // Layout leftovers from multi-line calls, or debris from
                    // a recovered declaration; either way not a declaration.
                    self.advance();
                    self.indent_kinds.pop();
                    continue;
                }
                TokenKind::Eof => break,
                _ => {}
            }
            if let Err(err) = self.parse_top_level(&mut program) {
                self.errors.push(err);
                self.synchronize();
            }
        }
        program
    }

    /// Returns the accumulated parse errors, leaving the list empty.
    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    // =========================================================================
    // Token cursor
    // =========================================================================

    pub(crate) fn kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    pub(crate) fn span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|t| t.span)
            .unwrap_or_default()
    }

    pub(crate) fn prev_span(&self) -> Span {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.span)
            .unwrap_or_default()
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self
            .tokens
            .get(self.pos)
            .copied()
            .unwrap_or(Token::new(TokenKind::Eof, Span::default()));
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: self.kind().describe(),
            },
            self.span(),
        )
    }

    /// Consumes an identifier. Context-sensitive keywords (`list`, `of`,
    /// `to`, ...) are accepted and reinterpreted as plain names here.
    pub(crate) fn expect_ident(&mut self) -> ParseResult<Symbol> {
        match self.kind() {
            TokenKind::Ident(sym) => {
                self.advance();
                Ok(sym)
            }
            other => {
                if let Some(text) = other.context_keyword_text() {
                    self.advance();
                    Ok(self.interner.intern(text))
                } else {
                    Err(ParseError::new(
                        ParseErrorKind::ExpectedIdentifier {
                            found: other.describe(),
                        },
                        self.span(),
                    ))
                }
            }
        }
    }

    /// Consumes a string literal, returning its value symbol.
    pub(crate) fn expect_string(&mut self) -> ParseResult<Symbol> {
        match self.kind() {
            TokenKind::Str { value, .. } => {
                self.advance();
                Ok(value)
            }
            _ => Err(self.unexpected("a string literal")),
        }
    }

    // =========================================================================
    // Layout handling
    // =========================================================================

    /// Skips newline and indentation tokens inside a parenthesized or
    /// bracketed context. Skipped `Indent`s are recorded as layout entries;
    /// a `Dedent` is consumed here only when it resolves one of those.
    pub(crate) fn skip_layout(&mut self) {
        loop {
            match self.kind() {
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Indent => {
                    self.advance();
                    self.indent_kinds.push(IndentKind::Layout);
                }
                TokenKind::Dedent
                    if self.indent_kinds.last() == Some(&IndentKind::Layout) =>
                {
                    self.advance();
                    self.indent_kinds.pop();
                }
                _ => break,
            }
        }
    }

    /// Ends a simple statement: consumes the trailing `Newline`, or leaves a
    /// block-closing `Dedent`/`Eof` in place. A statement whose last
    /// construct was itself an indented block (a lambda body, an `onerr`
    /// block handler) has already consumed its terminator.
    pub(crate) fn end_statement(&mut self) -> ParseResult<()> {
        match self.kind() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Dedent | TokenKind::Eof => Ok(()),
            _ if self.prev_kind() == TokenKind::Dedent => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    fn prev_kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// Skips to the next statement boundary after an error: past the next
    /// `Newline` at this block level, or up to (not past) a closing
    /// `Dedent`. Nested indented blocks belonging to the bad construct are
    /// skipped whole.
    pub(crate) fn synchronize(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.kind() {
                TokenKind::Eof => return,
                TokenKind::Indent => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::Dedent => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    self.advance();
                }
                TokenKind::Newline => {
                    self.advance();
                    if depth == 0 {
                        return;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
    }
}
