//! Statement nodes and the `onerr` clause.

use kukicha_base::{Span, Symbol};

use super::expr::Expr;
use super::types::TypeExpr;

/// A block is a slice of statements allocated in the AST arena.
pub type Block<'a> = &'a [Stmt<'a>];

/// How an `onerr` clause handles the caught error.
#[derive(Debug)]
pub enum OnErrHandler<'a> {
    /// `onerr panic "failed: {error}"`
    Panic(&'a Expr<'a>),

    /// `onerr return v1, v2`
    Return(&'a [&'a Expr<'a>]),

    /// `onerr discard` — drop the error entirely.
    Discard,

    /// `onerr error "replacement message"` — return zero values plus a
    /// fresh error in place of the caught one.
    ErrorReturn(&'a Expr<'a>),

    /// `onerr <expr>` — assign a fallback value and continue.
    Fallback(&'a Expr<'a>),

    /// An indented handler block.
    Block(Block<'a>),
}

/// The `onerr` clause attached to a declaration, assignment, or expression
/// statement. An attribute, not a statement of its own.
///
/// `bare_return` set with no handler is the propagation shorthand
/// (`x := f() onerr`); a standalone `explain` has neither flag nor handler
/// and synthesizes propagation around the wrapped error.
#[derive(Debug)]
pub struct OnErr<'a> {
    pub handler: Option<OnErrHandler<'a>>,
    pub explain: Option<Symbol>,
    pub alias: Option<Symbol>,
    pub bare_return: bool,
    pub span: Span,
}

/// One `when` arm of a value switch.
#[derive(Debug)]
pub struct SwitchCase<'a> {
    pub values: &'a [&'a Expr<'a>],
    pub body: Block<'a>,
    pub span: Span,
}

/// One `when` arm of a type switch.
#[derive(Debug)]
pub struct TypeCase<'a> {
    pub ty: &'a TypeExpr<'a>,
    pub body: Block<'a>,
    pub span: Span,
}

/// The communication operation of a `select` arm.
#[derive(Debug)]
pub enum SelectComm<'a> {
    /// `when receive ch` / `when v := receive ch` / `when v, ok := receive ch`
    Recv {
        bindings: &'a [Symbol],
        channel: &'a Expr<'a>,
    },
    /// `when send v to ch`
    Send {
        channel: &'a Expr<'a>,
        value: &'a Expr<'a>,
    },
}

/// One arm of a `select` statement.
#[derive(Debug)]
pub struct SelectCase<'a> {
    pub comm: SelectComm<'a>,
    pub body: Block<'a>,
    pub span: Span,
}

/// The trailing arm of an `if`/`else` chain.
#[derive(Debug)]
pub enum ElseArm<'a> {
    /// `else if ...` — a nested [`StmtKind::If`].
    If(&'a Stmt<'a>),
    /// A final `else` block.
    Block(Block<'a>),
}

/// A statement with its source span.
#[derive(Debug)]
pub struct Stmt<'a> {
    pub kind: StmtKind<'a>,
    pub span: Span,
}

/// Statement variants.
#[derive(Debug)]
pub enum StmtKind<'a> {
    /// `var x int = e` or the short form `x := e`. Multiple names bind
    /// multiple return values: `a, b := f()`.
    Var {
        names: &'a [Symbol],
        ty: Option<&'a TypeExpr<'a>>,
        values: &'a [&'a Expr<'a>],
        onerr: Option<OnErr<'a>>,
        short: bool,
    },

    /// `target = value` (multi-target assignment supported).
    Assign {
        targets: &'a [&'a Expr<'a>],
        values: &'a [&'a Expr<'a>],
        onerr: Option<OnErr<'a>>,
    },

    /// `x++` / `x--`
    IncDec {
        target: &'a Expr<'a>,
        increment: bool,
    },

    /// `return` with zero or more values.
    Return { values: &'a [&'a Expr<'a>] },

    /// `if init; cond` with consequence and optional else chain.
    If {
        init: Option<&'a Stmt<'a>>,
        cond: &'a Expr<'a>,
        then_block: Block<'a>,
        else_arm: Option<ElseArm<'a>>,
    },

    /// `switch subject` with `when` arms; `subject` absent for the bare
    /// condition form.
    Switch {
        subject: Option<&'a Expr<'a>>,
        cases: &'a [SwitchCase<'a>],
        default: Option<Block<'a>>,
    },

    /// `switch v := x.(type)` with `when Type` arms.
    TypeSwitch {
        binding: Option<Symbol>,
        subject: &'a Expr<'a>,
        cases: &'a [TypeCase<'a>],
        default: Option<Block<'a>>,
    },

    /// `select` over channel operations.
    Select {
        cases: &'a [SelectCase<'a>],
        default: Option<Block<'a>>,
    },

    /// `for x in xs` / `for i, x in xs`
    ForRange {
        index: Option<Symbol>,
        value: Symbol,
        iterable: &'a Expr<'a>,
        body: Block<'a>,
    },

    /// `for i from a to b` (exclusive) / `from a through b` (inclusive).
    ForNumeric {
        var: Symbol,
        from: &'a Expr<'a>,
        to: &'a Expr<'a>,
        inclusive: bool,
        body: Block<'a>,
    },

    /// `for cond` — condition loop; `cond` absent for the infinite form.
    ForCond {
        cond: Option<&'a Expr<'a>>,
        body: Block<'a>,
    },

    /// `defer call()`
    Defer { call: &'a Expr<'a> },

    /// `go call()`
    Go { call: &'a Expr<'a> },

    /// `go` followed by an indented block, launched as an anonymous task.
    GoBlock { body: Block<'a> },

    /// `send v to ch`
    Send {
        channel: &'a Expr<'a>,
        value: &'a Expr<'a>,
    },

    /// `break`
    Break,

    /// `continue`
    Continue,

    /// A bare expression evaluated for effect.
    Expr {
        expr: &'a Expr<'a>,
        onerr: Option<OnErr<'a>>,
    },
}

impl<'a> Stmt<'a> {
    /// Returns the `onerr` clause if this statement form carries one.
    pub fn onerr(&self) -> Option<&OnErr<'a>> {
        match &self.kind {
            StmtKind::Var { onerr, .. }
            | StmtKind::Assign { onerr, .. }
            | StmtKind::Expr { onerr, .. } => onerr.as_ref(),
            _ => None,
        }
    }
}
