//! # kukicha-base
//!
//! Structural atoms for the kukicha compiler.
//!
//! This crate provides the foundational types shared by the frontend and the
//! code generator:
//!
//! - [`Arena`] — bump allocation for stable AST references
//! - [`Interner`]/[`Symbol`] — string interning for O(1) equality
//! - [`Span`]/[`LineIndex`] — source location tracking
//! - [`Diagnostic`]/[`Severity`] — accumulated compiler messages
//!
//! # Design Principles
//!
//! This crate has **no knowledge of kukicha syntax or I/O**. It provides only
//! generic, reusable infrastructure that the language and compile crates
//! build upon.
//!
//! # Example
//!
//! ```
//! use kukicha_base::{Arena, Interner, Span};
//!
//! let arena: Arena<&str> = Arena::new();
//! let mut interner = Interner::new();
//!
//! let name = interner.intern("main");
//! let span = Span::new(0, 4);
//!
//! let allocated = arena.alloc("main");
//! assert_eq!(*allocated, "main");
//! ```

pub mod arena;
pub mod diagnostic;
pub mod intern;
pub mod span;
pub mod style;

pub use arena::Arena;
pub use diagnostic::{sort_diagnostics, Diagnostic, Position, Severity};
pub use intern::{Interner, Symbol, SymbolEq};
pub use span::{LineIndex, Span};
pub use style::Style;
