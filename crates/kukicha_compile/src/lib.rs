//! # kukicha-compile
//!
//! Back half of the kukicha compiler: Go code generation and the pipeline
//! driver.
//!
//! The frontend (lexer, parser, analyzer) lives in `kukicha-language`; this
//! crate turns its annotated AST into Go source and bridges to the Go
//! toolchain.
//!
//! # Entry points
//!
//! | Function | Phases | Use case |
//! |----------|--------|----------|
//! | [`check`] | lex + parse + analyze | Diagnostics only |
//! | [`compile_source`] | full pipeline, no I/O | Library embedding, tests |
//! | [`build`] | full pipeline + `go build` | Producing binaries |
//! | [`run`] | [`build`] + execute | Development loop |
//!
//! # Example
//!
//! ```
//! use kukicha_compile::{compile_source, GenOptions};
//!
//! let source = "func main()\n    print(\"tea time\")\n";
//! let output = compile_source(source, "app.kuki", &GenOptions::default()).unwrap();
//! assert!(output.go_source.starts_with("// Code generated by kukicha"));
//! ```

pub mod codegen;
pub mod compile;
pub mod diagnostic;
pub mod options;

pub use codegen::{Generator, GENERATOR_VERSION};
pub use compile::{build, check, compile_source, run, CheckReport, CompileError, CompileOutput};
pub use diagnostic::{DiagnosticReport, JsonDiagnostic};
pub use options::{GenOptions, DEFAULT_MODULE_BASE};
