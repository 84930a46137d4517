//! Expression nodes.

use kukicha_base::{Span, Symbol};

use super::decl::Param;
use super::stmt::Block;
use super::types::TypeExpr;

/// Binary operator kinds. English words (`and`, `or`, `equals`) and their
/// symbolic forms collapse to the same kind here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    /// The Go spelling of the operator.
    pub fn go_text(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// Prefix operator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `not x`
    Not,
    /// `-x`
    Neg,
}

/// A call argument: positional, named (`name: value`), or spread (`xs many`).
#[derive(Debug)]
pub struct Arg<'a> {
    pub name: Option<Symbol>,
    pub value: &'a Expr<'a>,
    pub spread: bool,
    pub span: Span,
}

/// One `name: value` entry in a struct literal.
#[derive(Debug)]
pub struct FieldInit<'a> {
    pub name: Symbol,
    pub value: &'a Expr<'a>,
    pub span: Span,
}

/// An arrow lambda's body: exactly one of expression or block.
#[derive(Debug)]
pub enum LambdaBody<'a> {
    Expr(&'a Expr<'a>),
    Block(Block<'a>),
}

/// An expression with its source span.
#[derive(Debug)]
pub struct Expr<'a> {
    pub kind: ExprKind<'a>,
    pub span: Span,
}

/// Expression variants.
#[derive(Debug)]
pub enum ExprKind<'a> {
    /// Variable or function reference: `total`
    Ident(Symbol),

    /// Integer literal; lexeme preserves the written base (`0xFF`, `0755`).
    Int { value: i64, lexeme: Symbol },

    /// Float literal, lexeme preserved.
    Float { value: f64, lexeme: Symbol },

    /// String literal; `interpolated` when it contains `{expr}` segments.
    Str { value: Symbol, interpolated: bool },

    /// Rune literal: `'a'`
    Rune(char),

    /// `true` / `false`
    Bool(bool),

    /// `left op right`
    Binary {
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },

    /// `not x`, `-x`
    Unary { op: UnaryOp, operand: &'a Expr<'a> },

    /// `left |> right`. Chains are left-associative: `a |> b |> c` is
    /// `Pipe(Pipe(a, b), c)`.
    Pipe {
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },

    /// `callee(args)`; `spread` when the final argument used `xs many`.
    Call {
        callee: &'a Expr<'a>,
        args: &'a [Arg<'a>],
        spread: bool,
    },

    /// `object.name` — field access or method reference; a call through it
    /// is represented as `Call { callee: Field { .. } }`.
    Field { object: &'a Expr<'a>, name: Symbol },

    /// `xs[i]`
    Index {
        object: &'a Expr<'a>,
        index: &'a Expr<'a>,
    },

    /// `xs[start:end]`, both bounds optional.
    Slice {
        object: &'a Expr<'a>,
        start: Option<&'a Expr<'a>>,
        end: Option<&'a Expr<'a>>,
    },

    /// `Point{x: 1, y: 2}`
    StructLit {
        ty: &'a TypeExpr<'a>,
        fields: &'a [FieldInit<'a>],
    },

    /// `[1, 2, 3]`, optionally prefixed with an element type annotation.
    ListLit {
        elem_ty: Option<&'a TypeExpr<'a>>,
        elems: &'a [&'a Expr<'a>],
    },

    /// `map of K to V{k: v, ...}`
    MapLit {
        key_ty: &'a TypeExpr<'a>,
        value_ty: &'a TypeExpr<'a>,
        pairs: &'a [(&'a Expr<'a>, &'a Expr<'a>)],
    },

    /// `receive ch`
    Receive(&'a Expr<'a>),

    /// `expr as T`
    Cast {
        expr: &'a Expr<'a>,
        ty: &'a TypeExpr<'a>,
    },

    /// `expr.(T)`
    TypeAssert {
        expr: &'a Expr<'a>,
        ty: &'a TypeExpr<'a>,
    },

    /// `empty` — the zero value, optionally typed: `empty int`.
    Empty { ty: Option<&'a TypeExpr<'a>> },

    /// `_` or `discard` — blank binding, or the pipe placeholder in an
    /// argument position.
    Discard,

    /// `error "message"` — constructs a fresh error value.
    ErrorNew(&'a Expr<'a>),

    /// `make(channel of int, 10)`
    Make {
        ty: &'a TypeExpr<'a>,
        args: &'a [&'a Expr<'a>],
    },

    /// `close(ch)`
    Close(&'a Expr<'a>),

    /// `panic(msg)` / `panic msg`
    Panic(&'a Expr<'a>),

    /// `recover()`
    Recover,

    /// `(params) => body` or `x => body`.
    Lambda {
        params: &'a [Param<'a>],
        results: &'a [TypeExpr<'a>],
        body: LambdaBody<'a>,
    },

    /// `reference x` — address-of.
    AddressOf(&'a Expr<'a>),

    /// `dereference p`
    Deref(&'a Expr<'a>),
}

impl<'a> Expr<'a> {
    /// Returns the identifier symbol if this is a bare identifier.
    pub fn ident(&self) -> Option<Symbol> {
        match self.kind {
            ExprKind::Ident(sym) => Some(sym),
            _ => None,
        }
    }

    /// Returns `true` if this expression is a string/number/rune/bool
    /// literal (the security lints distinguish literal from computed
    /// arguments).
    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Int { .. }
                | ExprKind::Float { .. }
                | ExprKind::Str { .. }
                | ExprKind::Rune(_)
                | ExprKind::Bool(_)
        )
    }

    /// Returns `true` for a non-interpolated string literal.
    pub fn is_plain_string(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Str {
                interpolated: false,
                ..
            }
        )
    }
}
