//! Arena context for AST allocation.
//!
//! [`AstContext`] bundles the typed arenas the parser allocates into. The
//! `'a` lifetime ties every node reference to the arenas' scope; dropping
//! the arenas releases the whole tree at once.
//!
//! # Example
//!
//! ```
//! use kukicha_language::AstArenas;
//!
//! let arenas = AstArenas::default();
//! let ctx = arenas.context();
//! # let _ = ctx;
//! ```

use kukicha_base::{Arena, Symbol};

use crate::ast::{Arg, Expr, FieldInit, MethodSig, Param, Stmt, StructField, SwitchCase, SelectCase, TypeCase, TypeExpr};

/// Owning bundle of arenas for one compilation unit.
#[derive(Default)]
pub struct AstArenas<'a> {
    pub exprs: Arena<Expr<'a>>,
    pub expr_refs: Arena<&'a Expr<'a>>,
    pub stmts: Arena<Stmt<'a>>,
    pub types: Arena<TypeExpr<'a>>,
    pub params: Arena<Param<'a>>,
    pub args: Arena<Arg<'a>>,
    pub fields: Arena<StructField<'a>>,
    pub field_inits: Arena<FieldInit<'a>>,
    pub methods: Arena<MethodSig<'a>>,
    pub switch_cases: Arena<SwitchCase<'a>>,
    pub type_cases: Arena<TypeCase<'a>>,
    pub select_cases: Arena<SelectCase<'a>>,
    pub pairs: Arena<(&'a Expr<'a>, &'a Expr<'a>)>,
    pub syms: Arena<Symbol>,
}

impl<'a> AstArenas<'a> {
    /// Borrows the arenas as a copyable context for the parser.
    pub fn context(&'a self) -> AstContext<'a> {
        AstContext {
            exprs: &self.exprs,
            expr_refs: &self.expr_refs,
            stmts: &self.stmts,
            types: &self.types,
            params: &self.params,
            args: &self.args,
            fields: &self.fields,
            field_inits: &self.field_inits,
            methods: &self.methods,
            switch_cases: &self.switch_cases,
            type_cases: &self.type_cases,
            select_cases: &self.select_cases,
            pairs: &self.pairs,
            syms: &self.syms,
        }
    }
}

/// Borrowed, copyable collection of typed arenas used during parsing.
#[derive(Clone, Copy)]
pub struct AstContext<'a> {
    pub exprs: &'a Arena<Expr<'a>>,
    pub expr_refs: &'a Arena<&'a Expr<'a>>,
    pub stmts: &'a Arena<Stmt<'a>>,
    pub types: &'a Arena<TypeExpr<'a>>,
    pub params: &'a Arena<Param<'a>>,
    pub args: &'a Arena<Arg<'a>>,
    pub fields: &'a Arena<StructField<'a>>,
    pub field_inits: &'a Arena<FieldInit<'a>>,
    pub methods: &'a Arena<MethodSig<'a>>,
    pub switch_cases: &'a Arena<SwitchCase<'a>>,
    pub type_cases: &'a Arena<TypeCase<'a>>,
    pub select_cases: &'a Arena<SelectCase<'a>>,
    pub pairs: &'a Arena<(&'a Expr<'a>, &'a Expr<'a>)>,
    pub syms: &'a Arena<Symbol>,
}

impl<'a> AstContext<'a> {
    /// Allocates an expression node.
    pub fn expr(&self, expr: Expr<'a>) -> &'a Expr<'a> {
        self.exprs.alloc(expr)
    }

    /// Allocates a type expression node.
    pub fn ty(&self, ty: TypeExpr<'a>) -> &'a TypeExpr<'a> {
        self.types.alloc(ty)
    }

    /// Allocates a statement node.
    pub fn stmt(&self, stmt: Stmt<'a>) -> &'a Stmt<'a> {
        self.stmts.alloc(stmt)
    }
}
