//! Go code generation.
//!
//! One pass over the annotated AST, writing into an indented string buffer.
//! The generator tracks, across the pass:
//!
//! - auto-import needs (`fmt` for interpolation, `errors` for `error "..."`
//!   literals, `os` for MCP stderr printing)
//! - the package-alias map produced by import collision repair
//! - the current function's return types, for zero values and coercion
//! - the current `onerr` error-variable name, for `{error}` substitution
//! - a monotonic counter for unique temporaries, shared by onerr expansion,
//!   pipe flattening, and numeric-for lowering so names never collide
//!
//! `//line` directives are emitted ahead of declarations and statements so
//! downstream Go diagnostics point back at the `.kuki` source.

mod expr;
mod generics;
mod stmt;

#[cfg(test)]
mod tests;

use std::fmt::Write;

use kukicha_base::{Interner, LineIndex, Span, Symbol};
use kukicha_language::analysis::Analysis;
use kukicha_language::ast::*;
use rustc_hash::FxHashMap;

use crate::options::GenOptions;

pub use generics::GenericCtx;

/// Generator version stamped into the output header.
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Go predeclared names that an imported package must not shadow.
const GO_PREDECLARED: &[&str] = &[
    "string", "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16", "uint32",
    "uint64", "float32", "float64", "bool", "byte", "rune", "error", "any", "len", "cap", "new",
    "make", "append", "copy", "delete", "panic", "recover", "print", "println", "complex64",
    "complex128", "uintptr",
];

/// How a declared type is shaped, for zero-value synthesis.
#[derive(Debug, Clone)]
enum TypeShape {
    Struct,
    /// Named or aliased scalar; holds the Go zero literal of the target.
    Scalar(String),
    Opaque,
}

/// Which stdlib package family the current file belongs to, if any. Only
/// these files take part in placeholder generic inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdlibKind {
    None,
    Iter,
    Slices,
    Fetch,
    Json,
}

impl StdlibKind {
    fn of_path(path: &str) -> StdlibKind {
        if !path.contains("stdlib/") {
            return StdlibKind::None;
        }
        if path.contains("stdlib/iter") {
            StdlibKind::Iter
        } else if path.contains("stdlib/slices") || path.contains("stdlib/slice") {
            StdlibKind::Slices
        } else if path.contains("stdlib/fetch") {
            StdlibKind::Fetch
        } else if path.contains("stdlib/json") {
            StdlibKind::Json
        } else {
            StdlibKind::None
        }
    }

    fn infers_generics(self) -> bool {
        self != StdlibKind::None
    }
}

/// The Go source generator. Create with [`Generator::new`], run with
/// [`Generator::generate`].
pub struct Generator<'a, 'int> {
    pub(crate) program: &'a Program<'a>,
    pub(crate) analysis: &'a Analysis,
    pub(crate) interner: &'int Interner,
    pub(crate) options: GenOptions,
    pub(crate) file: String,
    pub(crate) line_index: LineIndex,
    pub(crate) stdlib_kind: StdlibKind,

    pub(crate) body: String,
    pub(crate) indent: usize,
    pub(crate) tmp_counter: usize,
    pub(crate) onerr_var: Option<String>,
    pub(crate) onerr_alias: Option<String>,
    pub(crate) current_results: &'a [TypeExpr<'a>],
    pub(crate) generics: Option<GenericCtx>,

    pub(crate) needs_fmt: bool,
    pub(crate) needs_errors: bool,
    pub(crate) needs_os: bool,
    pub(crate) aliases: FxHashMap<String, String>,

    fn_decls: FxHashMap<Symbol, &'a FuncDecl<'a>>,
    type_shapes: FxHashMap<String, TypeShape>,
    last_directive_line: usize,
}

impl<'a, 'int> Generator<'a, 'int> {
    pub fn new(
        program: &'a Program<'a>,
        analysis: &'a Analysis,
        interner: &'int Interner,
        source: &str,
        file: &str,
        mut options: GenOptions,
    ) -> Self {
        if analysis.mcp_target {
            options.mcp_target = true;
        }

        let mut fn_decls = FxHashMap::default();
        let mut type_shapes = FxHashMap::default();
        for decl in &program.decls {
            match &decl.kind {
                DeclKind::Func(f) if f.receiver.is_none() => {
                    fn_decls.insert(f.name, f);
                }
                DeclKind::Struct(s) => {
                    type_shapes.insert(interner.resolve(s.name).to_string(), TypeShape::Struct);
                }
                DeclKind::TypeAlias { name, target, .. } => {
                    let shape = match scalar_zero(target, interner) {
                        Some(zero) => TypeShape::Scalar(zero),
                        None => TypeShape::Opaque,
                    };
                    type_shapes.insert(interner.resolve(*name).to_string(), shape);
                }
                _ => {}
            }
        }

        Generator {
            program,
            analysis,
            interner,
            options,
            file: file.to_string(),
            line_index: LineIndex::new(source),
            stdlib_kind: StdlibKind::of_path(file),
            body: String::new(),
            indent: 0,
            tmp_counter: 0,
            onerr_var: None,
            onerr_alias: None,
            current_results: &[],
            generics: None,
            needs_fmt: false,
            needs_errors: false,
            needs_os: false,
            aliases: FxHashMap::default(),
            fn_decls,
            type_shapes,
            last_directive_line: 0,
        }
    }

    /// Generates the complete Go source file.
    pub fn generate(mut self) -> String {
        // References need the alias map before the body is generated.
        let planned = self.plan_imports();

        let program = self.program;
        for decl in &program.decls {
            self.gen_decl(decl);
        }

        let mut out = String::new();
        writeln!(
            out,
            "// Code generated by kukicha v{}. DO NOT EDIT.",
            GENERATOR_VERSION
        )
        .unwrap();
        let package = self
            .program
            .package
            .map(|p| self.interner.resolve(p.name).to_string())
            .unwrap_or_else(|| "main".to_string());
        writeln!(out, "package {}\n", package).unwrap();

        let imports = self.final_imports(planned);
        if !imports.is_empty() {
            writeln!(out, "import (").unwrap();
            for import in &imports {
                match &import.alias {
                    Some(alias) => {
                        writeln!(out, "\t{} \"{}\"", alias, import.path).unwrap()
                    }
                    None => writeln!(out, "\t\"{}\"", import.path).unwrap(),
                }
            }
            writeln!(out, ")\n").unwrap();
        }

        out.push_str(&self.body);
        out
    }

    // =========================================================================
    // Emission helpers
    // =========================================================================

    pub(crate) fn next_tmp(&mut self) -> usize {
        self.tmp_counter += 1;
        self.tmp_counter
    }

    pub(crate) fn ind(&self) -> String {
        "\t".repeat(self.indent)
    }

    pub(crate) fn resolve(&self, sym: Symbol) -> &'int str {
        self.interner.resolve(sym)
    }

    /// Emits a `//line` directive when the source line advances. Directives
    /// sit in column one; Go ignores indented ones.
    pub(crate) fn line_directive(&mut self, span: Span) {
        let line = self.line_index.line(span.start);
        if line != self.last_directive_line {
            writeln!(self.body, "//line {}:{}", self.file, line).unwrap();
            self.last_directive_line = line;
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn gen_decl(&mut self, decl: &'a Decl<'a>) {
        match &decl.kind {
            DeclKind::Struct(s) => self.gen_struct(s, decl.span),
            DeclKind::Interface(i) => self.gen_interface(i, decl.span),
            DeclKind::TypeAlias {
                name,
                target,
                is_alias,
            } => {
                self.line_directive(decl.span);
                let target = self.type_str(target);
                let eq = if *is_alias { "= " } else { "" };
                let name = self.resolve(*name);
                writeln!(self.body, "type {} {}{}\n", name, eq, target).unwrap();
            }
            DeclKind::Var {
                names, ty, values, ..
            } => {
                self.line_directive(decl.span);
                let names: Vec<&str> = names.iter().map(|n| self.resolve(*n)).collect();
                let names = names.join(", ");
                let ty = ty.map(|t| self.type_str(t));
                let values: Vec<String> = values.iter().map(|v| self.expr_str(v)).collect();
                match (ty, values.is_empty()) {
                    (Some(ty), true) => writeln!(self.body, "var {} {}\n", names, ty).unwrap(),
                    (Some(ty), false) => {
                        writeln!(self.body, "var {} {} = {}\n", names, ty, values.join(", "))
                            .unwrap()
                    }
                    (None, _) => {
                        writeln!(self.body, "var {} = {}\n", names, values.join(", ")).unwrap()
                    }
                }
            }
            DeclKind::Func(f) => self.gen_func(f, decl.span),
        }
    }

    fn gen_struct(&mut self, s: &StructDecl<'a>, span: Span) {
        self.line_directive(span);
        writeln!(self.body, "type {} struct {{", self.resolve(s.name)).unwrap();
        for field in s.fields {
            let ty = self.type_str(field.ty);
            let name = self.resolve(field.name);
            match field.json_alias {
                Some(alias) => {
                    let alias = self.resolve(alias);
                    writeln!(self.body, "\t{} {} `json:\"{}\"`", name, ty, alias).unwrap();
                }
                None => writeln!(self.body, "\t{} {}", name, ty).unwrap(),
            }
        }
        writeln!(self.body, "}}\n").unwrap();
    }

    fn gen_interface(&mut self, i: &InterfaceDecl<'a>, span: Span) {
        self.line_directive(span);
        writeln!(self.body, "type {} interface {{", self.resolve(i.name)).unwrap();
        for method in i.methods {
            let params = self.param_list(method.params);
            let results = self.result_list(method.results);
            writeln!(
                self.body,
                "\t{}({}){}",
                self.resolve(method.name),
                params,
                results
            )
            .unwrap();
        }
        writeln!(self.body, "}}\n").unwrap();
    }

    fn gen_func(&mut self, f: &'a FuncDecl<'a>, span: Span) {
        self.line_directive(span);
        self.generics = if self.stdlib_kind.infers_generics() {
            generics::infer(self, f)
        } else {
            None
        };
        self.current_results = f.results;

        let receiver = f.receiver.as_ref().map(|recv| {
            format!(
                "({} {}) ",
                self.resolve(recv.name),
                self.type_str(recv.ty)
            )
        });
        let type_params = self
            .generics
            .as_ref()
            .map(|g| g.param_list())
            .unwrap_or_default();
        let params = self.param_list(f.params);
        let results = self.result_list(f.results);

        writeln!(
            self.body,
            "func {}{}{}({}){} {{",
            receiver.unwrap_or_default(),
            self.resolve(f.name),
            type_params,
            params,
            results
        )
        .unwrap();
        self.indent = 1;
        self.gen_block(f.body);
        self.indent = 0;
        writeln!(self.body, "}}\n").unwrap();

        self.current_results = &[];
        self.generics = None;
    }

    pub(crate) fn param_list(&mut self, params: &'a [Param<'a>]) -> String {
        let rendered: Vec<String> = params
            .iter()
            .map(|p| {
                let name = self.resolve(p.name).to_string();
                match p.ty {
                    Some(ty) => format!("{} {}", name, self.type_str(ty)),
                    None => format!("{} any", name),
                }
            })
            .collect();
        rendered.join(", ")
    }

    pub(crate) fn result_list(&mut self, results: &'a [TypeExpr<'a>]) -> String {
        match results.len() {
            0 => String::new(),
            1 => format!(" {}", self.type_str(&results[0])),
            _ => {
                let rendered: Vec<String> =
                    results.iter().map(|t| self.type_str(t)).collect();
                format!(" ({})", rendered.join(", "))
            }
        }
    }

    // =========================================================================
    // Types and zero values
    // =========================================================================

    pub(crate) fn type_str(&mut self, ty: &TypeExpr<'a>) -> String {
        match &ty.kind {
            TypeKind::Named(sym) => {
                let name = self.resolve(*sym);
                if let Some(generics) = &self.generics {
                    if let Some(substituted) = generics.substitute(name) {
                        return substituted.to_string();
                    }
                }
                match name {
                    "float" => "float64".to_string(),
                    other => other.to_string(),
                }
            }
            TypeKind::Qualified { package, name } => {
                let package = self.package_ref(*package);
                format!("{}.{}", package, self.resolve(*name))
            }
            TypeKind::List(elem) => format!("[]{}", self.type_str(elem)),
            TypeKind::Map { key, value } => {
                format!("map[{}]{}", self.type_str(key), self.type_str(value))
            }
            TypeKind::Channel(elem) => format!("chan {}", self.type_str(elem)),
            TypeKind::Reference(target) => format!("*{}", self.type_str(target)),
            TypeKind::Variadic(elem) => format!("...{}", self.type_str(elem)),
            TypeKind::Func { params, results } => {
                let params: Vec<String> = params.iter().map(|t| self.type_str(t)).collect();
                let mut out = format!("func({})", params.join(", "));
                match results.len() {
                    0 => {}
                    1 => {
                        let only = self.type_str(&results[0]);
                        out.push(' ');
                        out.push_str(&only);
                    }
                    _ => {
                        let rendered: Vec<String> =
                            results.iter().map(|t| self.type_str(t)).collect();
                        out.push_str(&format!(" ({})", rendered.join(", ")));
                    }
                }
                out
            }
        }
    }

    /// The Go zero value of a type, used by bare-return onerr expansion and
    /// the `empty T` form.
    pub(crate) fn zero_value(&mut self, ty: &TypeExpr<'a>) -> String {
        match &ty.kind {
            TypeKind::Named(sym) => {
                let name = self.resolve(*sym).to_string();
                if let Some(generics) = &self.generics {
                    if let Some(param) = generics.substitute(&name) {
                        // Unconstrained type parameters have no literal zero.
                        return format!("*new({})", param);
                    }
                }
                if let Some(zero) = primitive_zero(&name) {
                    return zero.to_string();
                }
                match self.type_shapes.get(&name) {
                    Some(TypeShape::Scalar(zero)) => format!("{}({})", name, zero),
                    Some(TypeShape::Struct) | Some(TypeShape::Opaque) => {
                        format!("{}{{}}", name)
                    }
                    None => format!("{}{{}}", name),
                }
            }
            TypeKind::Qualified { .. } => format!("{}{{}}", self.type_str(ty)),
            TypeKind::List(_)
            | TypeKind::Map { .. }
            | TypeKind::Channel(_)
            | TypeKind::Reference(_)
            | TypeKind::Variadic(_)
            | TypeKind::Func { .. } => "nil".to_string(),
        }
    }

    /// Whether `name` is a declared named type over a scalar, the shape the
    /// return-coercion rule applies to.
    pub(crate) fn is_named_scalar(&self, name: &str) -> bool {
        matches!(self.type_shapes.get(name), Some(TypeShape::Scalar(_)))
    }

    /// Resolves a package reference through the alias map.
    pub(crate) fn package_ref(&self, sym: Symbol) -> String {
        let name = self.interner.resolve(sym);
        match self.aliases.get(name) {
            Some(alias) => alias.clone(),
            None => name.to_string(),
        }
    }

    // =========================================================================
    // Imports
    // =========================================================================

    fn plan_imports(&mut self) -> Vec<PlannedImport> {
        let mut planned: Vec<PlannedImport> = Vec::new();

        for import in &self.program.imports {
            let written = self.resolve(import.path).to_string();
            let is_stdlib = written.starts_with("stdlib/");
            let path = if is_stdlib {
                format!("{}/{}", self.options.module_base, written)
            } else {
                written.clone()
            };

            let last = last_segment(&path).to_string();
            let (default_name, version_alias) = if is_version_segment(&last) {
                (penultimate_segment(&path).to_string(), true)
            } else {
                (last, false)
            };
            let surface = match import.alias {
                Some(alias) => self.resolve(alias).to_string(),
                None => default_name.clone(),
            };

            planned.push(PlannedImport {
                path,
                alias: None,
                surface,
                final_name: default_name,
                is_stdlib,
                explicit_alias: import.alias.is_some(),
                needs_alias: version_alias,
            });
            if let Some(alias) = import.alias {
                let alias = self.resolve(alias).to_string();
                let entry = planned.last_mut().unwrap();
                entry.final_name = alias;
                entry.needs_alias = true;
            }
        }

        // Collision repair: same target package name from two paths gets the
        // stdlib one a kuki-prefixed alias; Go predeclared names always do.
        for i in 0..planned.len() {
            if GO_PREDECLARED.contains(&planned[i].final_name.as_str())
                && !planned[i].explicit_alias
            {
                planned[i].final_name = format!("kuki{}", planned[i].final_name);
                planned[i].needs_alias = true;
            }
        }
        for i in 0..planned.len() {
            let clashes = planned
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && other.final_name == planned[i].final_name);
            if clashes && planned[i].is_stdlib {
                planned[i].final_name = format!("kuki{}", planned[i].final_name);
                planned[i].needs_alias = true;
            }
        }

        for import in &planned {
            if import.surface != import.final_name {
                self.aliases
                    .insert(import.surface.clone(), import.final_name.clone());
            }
        }

        planned
            .into_iter()
            .map(|mut p| {
                if p.needs_alias {
                    p.alias = Some(p.final_name.clone());
                }
                p
            })
            .collect()
    }

    /// Appends auto-imports discovered during body generation.
    fn final_imports(&self, mut planned: Vec<PlannedImport>) -> Vec<PlannedImport> {
        let mut add = |path: &str, planned: &mut Vec<PlannedImport>| {
            if !planned.iter().any(|p| p.path == path) {
                planned.push(PlannedImport::auto(path));
            }
        };
        if self.needs_fmt {
            add("fmt", &mut planned);
        }
        if self.needs_errors {
            add("errors", &mut planned);
        }
        if self.needs_os {
            add("os", &mut planned);
        }
        planned
    }

    pub(crate) fn func_decl_of(&self, sym: Symbol) -> Option<&'a FuncDecl<'a>> {
        self.fn_decls.get(&sym).copied()
    }
}

/// One line of the emitted import block.
pub(crate) struct PlannedImport {
    pub path: String,
    pub alias: Option<String>,
    surface: String,
    final_name: String,
    is_stdlib: bool,
    explicit_alias: bool,
    needs_alias: bool,
}

impl PlannedImport {
    fn auto(path: &str) -> Self {
        PlannedImport {
            path: path.to_string(),
            alias: None,
            surface: last_segment(path).to_string(),
            final_name: last_segment(path).to_string(),
            is_stdlib: false,
            explicit_alias: false,
            needs_alias: false,
        }
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn penultimate_segment(path: &str) -> &str {
    let mut parts = path.rsplit('/');
    parts.next();
    parts.next().unwrap_or(path)
}

/// `v2`, `v3`, ... — Go module major-version path suffixes.
fn is_version_segment(segment: &str) -> bool {
    segment.len() > 1
        && segment.starts_with('v')
        && segment[1..].chars().all(|c| c.is_ascii_digit())
}

fn primitive_zero(name: &str) -> Option<&'static str> {
    match name {
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32"
        | "uint64" | "byte" | "rune" | "uintptr" => Some("0"),
        "float" | "float32" | "float64" => Some("0.0"),
        "string" => Some("\"\""),
        "bool" => Some("false"),
        "error" | "any" | "any2" => Some("nil"),
        _ => None,
    }
}

/// Zero literal for a named-type declaration's scalar target, if it has one.
fn scalar_zero(target: &TypeExpr<'_>, interner: &Interner) -> Option<String> {
    match target.kind {
        TypeKind::Named(sym) => {
            primitive_zero(interner.resolve(sym)).map(|z| z.to_string())
        }
        _ => None,
    }
}
