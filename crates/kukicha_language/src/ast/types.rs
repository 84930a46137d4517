//! Type expressions.

use kukicha_base::{Span, Symbol};

/// A type annotation as written in source.
#[derive(Debug)]
pub struct TypeExpr<'a> {
    pub kind: TypeKind<'a>,
    pub span: Span,
}

/// The shape of a type annotation.
#[derive(Debug)]
pub enum TypeKind<'a> {
    /// `int`, `string`, `Celsius`, or a stdlib placeholder like `any`.
    Named(Symbol),

    /// Package-qualified: `pg.Pool`, `http.ResponseWriter`.
    Qualified { package: Symbol, name: Symbol },

    /// `list of T`
    List(&'a TypeExpr<'a>),

    /// `map of K to V`
    Map {
        key: &'a TypeExpr<'a>,
        value: &'a TypeExpr<'a>,
    },

    /// `channel of T`
    Channel(&'a TypeExpr<'a>),

    /// `reference T` — a pointer.
    Reference(&'a TypeExpr<'a>),

    /// `many T` — a variadic parameter type.
    Variadic(&'a TypeExpr<'a>),

    /// `func(T, U) R` — a function type.
    Func {
        params: &'a [TypeExpr<'a>],
        results: &'a [TypeExpr<'a>],
    },
}

impl<'a> TypeExpr<'a> {
    /// Returns the bare name for a `Named` type, if this is one.
    pub fn named(&self) -> Option<Symbol> {
        match self.kind {
            TypeKind::Named(sym) => Some(sym),
            _ => None,
        }
    }

    /// Returns `true` if this annotation is the variadic form `many T`.
    pub fn is_variadic(&self) -> bool {
        matches!(self.kind, TypeKind::Variadic(_))
    }
}
