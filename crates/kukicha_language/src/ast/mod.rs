//! AST node definitions for kukicha.
//!
//! The tree is a closed set of sum types in three categories — declarations,
//! statements, expressions — plus type expressions. Every node pairs its
//! variant data (`*Kind`) with the source [`Span`] it was parsed from, so
//! diagnostics and `//line` directives can always point back at source.
//!
//! Nodes are arena-allocated (`&'a` children) and immutable after parsing;
//! semantic results live in side tables keyed by span, not on the nodes.

mod decl;
mod expr;
mod stmt;
mod types;

pub use decl::{
    Decl, DeclKind, FuncDecl, ImportDecl, InterfaceDecl, MethodSig, PackageDecl, Param, Program,
    Receiver, SkillDecl, StructDecl, StructField,
};
pub use expr::{Arg, BinaryOp, Expr, ExprKind, FieldInit, LambdaBody, UnaryOp};
pub use stmt::{
    Block, ElseArm, OnErr, OnErrHandler, SelectCase, SelectComm, Stmt, StmtKind, SwitchCase,
    TypeCase,
};
pub use types::{TypeExpr, TypeKind};
