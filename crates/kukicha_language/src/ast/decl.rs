//! Top-level declaration nodes and the program root.

use kukicha_base::{Span, Symbol};

use super::expr::Expr;
use super::stmt::{Block, OnErr};
use super::types::TypeExpr;

/// `petiole main` (synonym `leaf`). At most one per file.
#[derive(Debug, Clone, Copy)]
pub struct PackageDecl {
    pub name: Symbol,
    pub span: Span,
}

/// `skill "name" "description"` — MCP tool metadata.
#[derive(Debug, Clone, Copy)]
pub struct SkillDecl {
    pub name: Symbol,
    pub description: Option<Symbol>,
    pub span: Span,
}

/// `import "stdlib/strings"` with optional `as alias`.
#[derive(Debug, Clone, Copy)]
pub struct ImportDecl {
    pub path: Symbol,
    pub alias: Option<Symbol>,
    pub span: Span,
}

/// A struct field: `name Type`, with optional JSON alias sugar
/// (`name Type "json_name"`).
#[derive(Debug)]
pub struct StructField<'a> {
    pub name: Symbol,
    pub ty: &'a TypeExpr<'a>,
    pub json_alias: Option<Symbol>,
    pub span: Span,
}

/// `type Name` followed by an indented field block.
#[derive(Debug)]
pub struct StructDecl<'a> {
    pub name: Symbol,
    pub fields: &'a [StructField<'a>],
}

/// One signature inside an interface block.
#[derive(Debug)]
pub struct MethodSig<'a> {
    pub name: Symbol,
    pub params: &'a [Param<'a>],
    pub results: &'a [TypeExpr<'a>],
    pub span: Span,
}

/// `interface Name` followed by an indented signature block.
#[derive(Debug)]
pub struct InterfaceDecl<'a> {
    pub name: Symbol,
    pub methods: &'a [MethodSig<'a>],
}

/// A function parameter, with an optional default value.
#[derive(Debug)]
pub struct Param<'a> {
    pub name: Symbol,
    pub ty: Option<&'a TypeExpr<'a>>,
    pub default: Option<&'a Expr<'a>>,
    pub span: Span,
}

/// A method receiver: `on recv Type` / `on recv reference Type`.
#[derive(Debug)]
pub struct Receiver<'a> {
    pub name: Symbol,
    pub ty: &'a TypeExpr<'a>,
    pub span: Span,
}

/// A function or method declaration.
#[derive(Debug)]
pub struct FuncDecl<'a> {
    pub name: Symbol,
    pub receiver: Option<Receiver<'a>>,
    pub params: &'a [Param<'a>],
    pub results: &'a [TypeExpr<'a>],
    pub body: Block<'a>,
}

/// A declaration with its source span.
#[derive(Debug)]
pub struct Decl<'a> {
    pub kind: DeclKind<'a>,
    pub span: Span,
}

/// Top-level declaration variants.
#[derive(Debug)]
pub enum DeclKind<'a> {
    /// Struct type declaration.
    Struct(StructDecl<'a>),

    /// `type Celsius float64` (named type) or `type Row = list of int`
    /// (alias, `is_alias` set).
    TypeAlias {
        name: Symbol,
        target: &'a TypeExpr<'a>,
        is_alias: bool,
    },

    /// Interface declaration.
    Interface(InterfaceDecl<'a>),

    /// Function or method declaration.
    Func(FuncDecl<'a>),

    /// Global variable declaration.
    Var {
        names: &'a [Symbol],
        ty: Option<&'a TypeExpr<'a>>,
        values: &'a [&'a Expr<'a>],
        onerr: Option<OnErr<'a>>,
    },
}

/// The parsed compilation unit.
#[derive(Debug, Default)]
pub struct Program<'a> {
    pub package: Option<PackageDecl>,
    pub skill: Option<SkillDecl>,
    pub imports: Vec<ImportDecl>,
    pub decls: Vec<Decl<'a>>,
}

impl<'a> Program<'a> {
    /// The declared package name, or `None` for the `main` default.
    pub fn package_name(&self) -> Option<Symbol> {
        self.package.map(|p| p.name)
    }
}
