//! Kukicha compilation pipeline.
//!
//! End-to-end driver turning `.kuki` source into Go source and, through the
//! Go toolchain, runnable binaries.
//!
//! # Pipeline Overview
//!
//! ```text
//! Kukicha Source (.kuki)
//!       │
//!       ▼
//! ┌───────────────────┐
//! │  1. Lexer         │ Tokenize, INDENT/DEDENT
//! └─────────┬─────────┘
//!           ▼
//! ┌───────────────────┐
//! │  2. Parser        │ Build arena AST
//! └─────────┬─────────┘
//!           ▼
//! ┌───────────────────┐
//! │  3. Analyzer      │ Names, arities, onerr, security
//! └─────────┬─────────┘
//!           ▼
//! ┌───────────────────┐
//! │  4. CodeGen       │ Emit Go source + //line directives
//! └─────────┬─────────┘
//!           ▼
//!       Go Source ──► go build (external)
//! ```
//!
//! Each phase runs to completion and accumulates diagnostics; the driver
//! sorts them by source position and stops before the next phase whenever
//! an error (not a warning) was emitted.
//!
//! # Example
//!
//! ```
//! use kukicha_compile::{compile_source, GenOptions};
//!
//! let source = "func main()\n    name := \"World\"\n    print(\"Hello, {name}!\")\n";
//! let output = compile_source(source, "hello.kuki", &GenOptions::default()).unwrap();
//! assert!(output.go_source.contains("package main"));
//! assert!(output.go_source.contains("Hello, %v!"));
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use kukicha_base::{sort_diagnostics, Diagnostic, Interner, LineIndex};
use kukicha_language::{Analyzer, AstArenas, Lexer, Parser};
use log::{debug, warn};

use crate::codegen::Generator;
use crate::options::GenOptions;

/// Successful compilation: the generated Go source plus any warnings.
#[derive(Debug)]
pub struct CompileOutput {
    pub go_source: String,
    pub warnings: Vec<Diagnostic>,
}

/// Front-half result for `check`: everything the phases reported.
#[derive(Debug)]
pub struct CheckReport {
    pub file: String,
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    /// Renders every diagnostic against the source, in position order.
    pub fn render(&self) -> String {
        let index = LineIndex::new(&self.source);
        self.diagnostics
            .iter()
            .map(|d| d.render(&self.file, &self.source, &index))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Why a pipeline invocation failed.
#[derive(Debug)]
pub enum CompileError {
    /// Reading the input or writing the output failed.
    Io(std::io::Error),
    /// The source had errors; diagnostics are position-sorted.
    Source {
        file: String,
        source: String,
        diagnostics: Vec<Diagnostic>,
    },
    /// The downstream Go toolchain rejected the build or is unavailable.
    Toolchain(String),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Io(err) => write!(f, "{}", err),
            CompileError::Source {
                file,
                source,
                diagnostics,
            } => {
                let index = LineIndex::new(source);
                for (i, diagnostic) in diagnostics.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}", diagnostic.render(file, source, &index))?;
                }
                Ok(())
            }
            CompileError::Toolchain(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        CompileError::Io(err)
    }
}

/// Runs lexer, parser, and analyzer; produces the Go source on success.
///
/// This is the pure core of the pipeline: no filesystem access, no process
/// invocation. Errors short-circuit before code generation; warnings ride
/// along in the output.
pub fn compile_source(
    source: &str,
    file: &str,
    options: &GenOptions,
) -> Result<CompileOutput, Vec<Diagnostic>> {
    let mut interner = Interner::new();

    debug!("lexing {}", file);
    let lexed = Lexer::new(source, &mut interner).tokenize();
    let mut diagnostics = lexed.errors;

    debug!("parsing {}", file);
    let arenas = AstArenas::default();
    let ctx = arenas.context();
    let mut parser = Parser::new(lexed.tokens, &mut interner, ctx);
    let program = parser.parse_program();
    diagnostics.extend(parser.take_errors().iter().map(|e| e.to_diagnostic()));
    drop(parser);

    if diagnostics.iter().any(|d| d.is_error()) {
        sort_diagnostics(&mut diagnostics);
        return Err(diagnostics);
    }

    debug!("analyzing {}", file);
    let analysis = Analyzer::new(file, &interner).analyze(&program);
    diagnostics.extend(analysis.diagnostics.iter().cloned());
    sort_diagnostics(&mut diagnostics);
    if diagnostics.iter().any(|d| d.is_error()) {
        return Err(diagnostics);
    }

    if !diagnostics.is_empty() {
        warn!("{}: {} warning(s)", file, diagnostics.len());
    }

    debug!("generating Go for {}", file);
    let generator = Generator::new(&program, &analysis, &interner, source, file, options.clone());
    let go_source = generator.generate();

    Ok(CompileOutput {
        go_source,
        warnings: diagnostics,
    })
}

/// Runs the front half of the pipeline over a file: lexer, parser, and
/// semantic analysis. All diagnostics are reported; none block.
pub fn check(path: &Path) -> Result<CheckReport, CompileError> {
    let source = fs::read_to_string(path)?;
    let file = path.display().to_string();

    let mut interner = Interner::new();
    let lexed = Lexer::new(&source, &mut interner).tokenize();
    let mut diagnostics = lexed.errors;

    let arenas = AstArenas::default();
    let ctx = arenas.context();
    let mut parser = Parser::new(lexed.tokens, &mut interner, ctx);
    let program = parser.parse_program();
    diagnostics.extend(parser.take_errors().iter().map(|e| e.to_diagnostic()));
    drop(parser);

    if !diagnostics.iter().any(|d| d.is_error()) {
        let analysis = Analyzer::new(&file, &interner).analyze(&program);
        diagnostics.extend(analysis.diagnostics);
    }
    sort_diagnostics(&mut diagnostics);

    Ok(CheckReport {
        file,
        source,
        diagnostics,
    })
}

/// Full pipeline: compile `path`, write the Go source next to it, and hand
/// the result to `go build`. Returns the built binary's path.
pub fn build(path: &Path, options: &GenOptions) -> Result<PathBuf, CompileError> {
    let source = fs::read_to_string(path)?;
    let file = path.display().to_string();

    let output = compile_source(&source, &file, options).map_err(|diagnostics| {
        CompileError::Source {
            file: file.clone(),
            source: source.clone(),
            diagnostics,
        }
    })?;

    let go_path = path.with_extension("go");
    fs::write(&go_path, &output.go_source)?;
    debug!("wrote {}", go_path.display());

    let binary = path.with_extension("");
    let result = Command::new("go")
        .arg("build")
        .arg("-o")
        .arg(&binary)
        .arg(&go_path)
        .output()
        .map_err(|err| CompileError::Toolchain(format!("failed to invoke go: {}", err)))?;

    if !result.status.success() {
        // The generated source carries //line directives, so go's own
        // messages already point at the .kuki file.
        return Err(CompileError::Toolchain(
            String::from_utf8_lossy(&result.stderr).into_owned(),
        ));
    }

    Ok(binary)
}

/// Builds and then executes the produced artifact with `args`. Returns the
/// child's exit code.
pub fn run(path: &Path, args: &[String], options: &GenOptions) -> Result<i32, CompileError> {
    let binary = build(path, options)?;
    let status = Command::new(&binary)
        .args(args)
        .status()
        .map_err(|err| CompileError::Toolchain(format!("failed to run {}: {}", binary.display(), err)))?;
    Ok(status.code().unwrap_or(1))
}
