//! Semantic analysis.
//!
//! Two passes over the parsed program:
//!
//! 1. **Collect** — package name, imports, declared types, and function
//!    signatures go into the symbol tables.
//! 2. **Check** — resolve names against lexical scopes, verify call arities
//!    against collected signatures, validate struct literals, enforce the
//!    `onerr` rules, and run the security lints (see `security.rs`).
//!
//! The analyzer never mutates the AST. Its results — diagnostics plus the
//! return-arity side table the code generator needs for pipe flattening —
//! come back in an [`Analysis`] value.

mod security;

use kukicha_base::{Diagnostic, Interner, Span, Symbol};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::*;
use crate::interp;

/// Identifiers that resolve without declaration.
const BUILTINS: &[&str] = &[
    "print", "len", "cap", "append", "copy", "delete", "min", "max", "nil",
];

/// Go/kukicha primitive type names, resolvable in value position for
/// conversions and generic instantiation.
const PRIMITIVES: &[&str] = &[
    "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16", "uint32", "uint64",
    "float32", "float64", "string", "bool", "byte", "rune", "any", "any2", "error",
];

/// A collected function signature.
#[derive(Debug, Clone)]
pub struct FuncSig {
    pub name: Symbol,
    pub params: Vec<ParamInfo>,
    pub results: usize,
    pub error_last: bool,
    pub span: Span,
}

/// What arity checking needs to know about one parameter.
#[derive(Debug, Clone)]
pub struct ParamInfo {
    pub name: Symbol,
    pub has_default: bool,
    pub variadic: bool,
}

impl FuncSig {
    fn required(&self) -> usize {
        self.params
            .iter()
            .filter(|p| !p.has_default && !p.variadic)
            .count()
    }

    fn variadic(&self) -> bool {
        self.params.last().is_some_and(|p| p.variadic)
    }
}

/// Analyzer output: diagnostics plus side tables for code generation.
#[derive(Debug, Default)]
pub struct Analysis {
    pub diagnostics: Vec<Diagnostic>,
    /// Declared result count of every call expression, keyed by the call's
    /// span. Unknown callees default to one result.
    pub return_counts: FxHashMap<Span, usize>,
    /// Top-level function signatures by name.
    pub functions: FxHashMap<Symbol, FuncSig>,
    /// Whether a `skill` declaration marked this unit as an MCP tool.
    pub mcp_target: bool,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }
}

/// Walks the program; see module docs for the pass structure.
pub struct Analyzer<'a, 'int> {
    interner: &'int Interner,
    file: &'a str,
    diagnostics: Vec<Diagnostic>,
    return_counts: FxHashMap<Span, usize>,
    functions: FxHashMap<Symbol, FuncSig>,
    methods: FxHashMap<Symbol, FuncSig>,
    types: FxHashSet<Symbol>,
    globals: FxHashSet<Symbol>,
    imports: FxHashSet<Symbol>,
    scopes: Vec<FxHashSet<Symbol>>,
    /// Results of the function being checked: (count, error-last).
    current_results: (usize, bool),
    current_fn_is_handler: bool,
    /// Arrow lambdas leave their result types implicit, so return statements
    /// inside one are not checked against the enclosing declaration.
    in_lambda: bool,
    package_name: Option<String>,
    is_test_file: bool,
    in_stdlib: bool,
    onerr_alias: Option<Symbol>,
}

impl<'a, 'int> Analyzer<'a, 'int> {
    pub fn new(file: &'a str, interner: &'int Interner) -> Self {
        Analyzer {
            interner,
            file,
            diagnostics: Vec::new(),
            return_counts: FxHashMap::default(),
            functions: FxHashMap::default(),
            methods: FxHashMap::default(),
            types: FxHashSet::default(),
            globals: FxHashSet::default(),
            imports: FxHashSet::default(),
            scopes: Vec::new(),
            current_results: (0, false),
            current_fn_is_handler: false,
            in_lambda: false,
            package_name: None,
            is_test_file: file.ends_with("_test.kuki"),
            in_stdlib: file.contains("stdlib/"),
            onerr_alias: None,
        }
    }

    /// Runs both passes and returns the collected results.
    pub fn analyze(mut self, program: &Program<'a>) -> Analysis {
        self.collect(program);
        self.check(program);
        Analysis {
            diagnostics: self.diagnostics,
            return_counts: self.return_counts,
            functions: self.functions,
            mcp_target: program.skill.is_some(),
        }
    }

    fn error(&mut self, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::error(message, span));
    }

    fn warn(&mut self, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::warning(message, span));
    }

    fn resolve_str(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    // =========================================================================
    // Pass 1: collect
    // =========================================================================

    fn collect(&mut self, program: &Program<'a>) {
        self.package_name = program
            .package
            .map(|p| self.resolve_str(p.name).to_string());

        for import in &program.imports {
            let name = match import.alias {
                Some(alias) => self.resolve_str(alias).to_string(),
                None => import_package_name(self.resolve_str(import.path)).to_string(),
            };
            if let Some(sym) = self.interner.lookup(&name) {
                self.imports.insert(sym);
            }
        }

        for decl in &program.decls {
            match &decl.kind {
                DeclKind::Struct(s) => {
                    self.types.insert(s.name);
                }
                DeclKind::Interface(i) => {
                    self.types.insert(i.name);
                }
                DeclKind::TypeAlias { name, .. } => {
                    self.types.insert(*name);
                }
                DeclKind::Func(f) => {
                    let sig = signature_of(f, decl.span, self.interner);
                    if f.receiver.is_some() {
                        self.methods.insert(f.name, sig);
                    } else if self.functions.insert(f.name, sig).is_some() {
                        let name = self.resolve_str(f.name).to_string();
                        self.error(
                            format!("function '{}' is declared more than once", name),
                            decl.span,
                        );
                    }
                }
                DeclKind::Var { names, .. } => {
                    for name in names.iter() {
                        self.globals.insert(*name);
                    }
                }
            }
        }
    }

    // =========================================================================
    // Pass 2: check
    // =========================================================================

    fn check(&mut self, program: &Program<'a>) {
        for decl in &program.decls {
            match &decl.kind {
                DeclKind::Func(f) => self.check_func(f),
                DeclKind::Var {
                    values, onerr, ..
                } => {
                    self.scopes.push(FxHashSet::default());
                    for value in values.iter() {
                        self.check_expr(value);
                    }
                    // Package-level declarations have no surrounding
                    // statement to expand an error check into.
                    if let Some(clause) = onerr {
                        self.error(
                            "'onerr' is not allowed on a package-level declaration",
                            clause.span,
                        );
                    }
                    self.scopes.pop();
                }
                DeclKind::Struct(s) => {
                    let mut seen = FxHashSet::default();
                    for field in s.fields {
                        if !seen.insert(field.name) {
                            let name = self.resolve_str(field.name).to_string();
                            self.error(
                                format!("duplicate field '{}' in struct declaration", name),
                                field.span,
                            );
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn check_func(&mut self, f: &FuncDecl<'a>) {
        self.current_results = (f.results.len(), results_end_in_error(f.results, self.interner));
        self.current_fn_is_handler = is_http_handler(f, self.interner);

        self.scopes.push(FxHashSet::default());
        if let Some(recv) = &f.receiver {
            self.declare(recv.name);
        }
        for param in f.params {
            self.declare(param.name);
            if let Some(default) = param.default {
                self.check_expr(default);
            }
        }
        self.check_block(f.body);
        self.scopes.pop();
    }

    fn declare(&mut self, name: Symbol) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name);
        }
    }

    fn check_block(&mut self, block: Block<'a>) {
        self.scopes.push(FxHashSet::default());
        for stmt in block {
            self.check_stmt(stmt);
        }
        self.scopes.pop();
    }

    fn check_stmt(&mut self, stmt: &Stmt<'a>) {
        match &stmt.kind {
            StmtKind::Var {
                names,
                values,
                onerr,
                ..
            } => {
                for value in values.iter() {
                    self.check_expr(value);
                }
                for name in names.iter() {
                    self.declare(*name);
                }
                if let Some(clause) = onerr {
                    self.check_onerr(clause);
                }
            }
            StmtKind::Assign {
                targets,
                values,
                onerr,
            } => {
                for target in targets.iter() {
                    self.check_expr(target);
                }
                for value in values.iter() {
                    self.check_expr(value);
                }
                if let Some(clause) = onerr {
                    self.check_onerr(clause);
                }
            }
            StmtKind::IncDec { target, .. } => self.check_expr(target),
            StmtKind::Return { values } => self.check_return(values, stmt.span),
            StmtKind::If {
                init,
                cond,
                then_block,
                else_arm,
            } => {
                self.scopes.push(FxHashSet::default());
                if let Some(init) = init {
                    self.check_stmt(init);
                }
                self.check_expr(cond);
                self.check_block(then_block);
                match else_arm {
                    Some(ElseArm::If(nested)) => self.check_stmt(nested),
                    Some(ElseArm::Block(block)) => self.check_block(block),
                    None => {}
                }
                self.scopes.pop();
            }
            StmtKind::Switch {
                subject,
                cases,
                default,
            } => {
                if let Some(subject) = subject {
                    self.check_expr(subject);
                }
                for case in cases.iter() {
                    for value in case.values.iter() {
                        self.check_expr(value);
                    }
                    self.check_block(case.body);
                }
                if let Some(default) = default {
                    self.check_block(default);
                }
            }
            StmtKind::TypeSwitch {
                binding,
                subject,
                cases,
                default,
            } => {
                self.check_expr(subject);
                self.scopes.push(FxHashSet::default());
                if let Some(binding) = binding {
                    self.declare(*binding);
                }
                for case in cases.iter() {
                    self.check_block(case.body);
                }
                if let Some(default) = default {
                    self.check_block(default);
                }
                self.scopes.pop();
            }
            StmtKind::Select { cases, default } => {
                for case in cases.iter() {
                    self.scopes.push(FxHashSet::default());
                    match &case.comm {
                        SelectComm::Recv { bindings, channel } => {
                            self.check_expr(channel);
                            for binding in bindings.iter() {
                                self.declare(*binding);
                            }
                        }
                        SelectComm::Send { channel, value } => {
                            self.check_expr(channel);
                            self.check_expr(value);
                        }
                    }
                    self.check_block(case.body);
                    self.scopes.pop();
                }
                if let Some(default) = default {
                    self.check_block(default);
                }
            }
            StmtKind::ForRange {
                index,
                value,
                iterable,
                body,
            } => {
                self.check_expr(iterable);
                self.scopes.push(FxHashSet::default());
                if let Some(index) = index {
                    self.declare(*index);
                }
                self.declare(*value);
                self.check_block(body);
                self.scopes.pop();
            }
            StmtKind::ForNumeric {
                var,
                from,
                to,
                body,
                ..
            } => {
                self.check_expr(from);
                self.check_expr(to);
                self.scopes.push(FxHashSet::default());
                self.declare(*var);
                self.check_block(body);
                self.scopes.pop();
            }
            StmtKind::ForCond { cond, body } => {
                if let Some(cond) = cond {
                    self.check_expr(cond);
                }
                self.check_block(body);
            }
            StmtKind::Defer { call } | StmtKind::Go { call } => self.check_expr(call),
            StmtKind::GoBlock { body } => self.check_block(body),
            StmtKind::Send { channel, value } => {
                self.check_expr(channel);
                self.check_expr(value);
            }
            StmtKind::Break | StmtKind::Continue => {}
            StmtKind::Expr { expr, onerr } => {
                self.check_expr(expr);
                if let Some(clause) = onerr {
                    self.check_onerr(clause);
                }
            }
        }
    }

    fn check_return(&mut self, values: &[&Expr<'a>], span: Span) {
        for value in values {
            self.check_expr(value);
        }
        let (expected, _) = self.current_results;

        // `return x |> f()` where f returns multiple values parses but is
        // rejected here rather than miscompiled.
        if let Some(value) = values.first() {
            if let ExprKind::Pipe { right, .. } = &value.kind {
                if self.pipe_stage_results(right) > 1 {
                    self.error(
                        "cannot return a pipe whose final stage yields multiple values",
                        value.span,
                    );
                    return;
                }
            }
        }

        if self.in_lambda {
            return;
        }
        let count = values.len();
        // A single call may expand to several results; anything else must
        // match the declared return list.
        let passthrough = count == 1
            && matches!(
                values[0].kind,
                ExprKind::Call { .. } | ExprKind::Pipe { .. }
            );
        if count != expected && !passthrough {
            self.error(
                format!(
                    "return supplies {} value(s) but the function declares {}",
                    count, expected
                ),
                span,
            );
        }
    }

    /// Declared result count of the final stage of a pipe.
    fn pipe_stage_results(&self, stage: &Expr<'a>) -> usize {
        match &stage.kind {
            ExprKind::Call { callee, .. } => self.callee_results(callee),
            ExprKind::Ident(sym) => self
                .functions
                .get(sym)
                .map(|sig| sig.results)
                .unwrap_or(1),
            _ => 1,
        }
    }

    fn callee_results(&self, callee: &Expr<'a>) -> usize {
        match &callee.kind {
            ExprKind::Ident(sym) => {
                let name = self.resolve_str(*sym);
                match name {
                    "print" | "delete" => 0,
                    "len" | "cap" | "append" | "copy" | "min" | "max" => 1,
                    _ => self.functions.get(sym).map(|sig| sig.results).unwrap_or(1),
                }
            }
            // Method call: use local knowledge when the method name is
            // declared in this unit, otherwise degrade to one result.
            ExprKind::Field { name, .. } => {
                self.methods.get(name).map(|sig| sig.results).unwrap_or(1)
            }
            _ => 1,
        }
    }

    fn check_expr(&mut self, expr: &Expr<'a>) {
        match &expr.kind {
            ExprKind::Ident(sym) => self.check_ident(*sym, expr.span),
            ExprKind::Binary { left, right, .. } => {
                self.check_expr(left);
                self.check_expr(right);
            }
            ExprKind::Unary { operand, .. }
            | ExprKind::Receive(operand)
            | ExprKind::AddressOf(operand)
            | ExprKind::Deref(operand)
            | ExprKind::Close(operand)
            | ExprKind::Panic(operand)
            | ExprKind::ErrorNew(operand) => self.check_expr(operand),
            ExprKind::Pipe { left, right } => {
                self.check_expr(left);
                self.check_pipe_rhs(right);
            }
            ExprKind::Call { .. } => self.check_call(expr, 0),
            ExprKind::Field { object, .. } => self.check_expr(object),
            ExprKind::Index { object, index } => {
                self.check_expr(object);
                self.check_expr(index);
            }
            ExprKind::Slice { object, start, end } => {
                self.check_expr(object);
                if let Some(start) = start {
                    self.check_expr(start);
                }
                if let Some(end) = end {
                    self.check_expr(end);
                }
            }
            ExprKind::StructLit { fields, .. } => {
                let mut seen = FxHashSet::default();
                for field in fields.iter() {
                    if !seen.insert(field.name) {
                        let name = self.resolve_str(field.name).to_string();
                        self.error(
                            format!("duplicate field '{}' in struct literal", name),
                            field.span,
                        );
                    }
                    self.check_expr(field.value);
                }
            }
            ExprKind::ListLit { elems, .. } => {
                for elem in elems.iter() {
                    self.check_expr(elem);
                }
            }
            ExprKind::MapLit { pairs, .. } => {
                for (key, value) in pairs.iter() {
                    self.check_expr(key);
                    self.check_expr(value);
                }
            }
            ExprKind::Cast { expr, .. } | ExprKind::TypeAssert { expr, .. } => {
                self.check_expr(expr)
            }
            ExprKind::Make { args, .. } => {
                for arg in args.iter() {
                    self.check_expr(arg);
                }
            }
            ExprKind::Lambda { params, body, .. } => {
                self.scopes.push(FxHashSet::default());
                for param in params.iter() {
                    self.declare(param.name);
                }
                let outer = self.in_lambda;
                self.in_lambda = true;
                match body {
                    LambdaBody::Expr(expr) => self.check_expr(expr),
                    LambdaBody::Block(block) => self.check_block(block),
                }
                self.in_lambda = outer;
                self.scopes.pop();
            }
            ExprKind::Int { .. }
            | ExprKind::Float { .. }
            | ExprKind::Str { .. }
            | ExprKind::Rune(_)
            | ExprKind::Bool(_)
            | ExprKind::Empty { .. }
            | ExprKind::Discard
            | ExprKind::Recover => {}
        }
    }

    fn check_ident(&mut self, sym: Symbol, span: Span) {
        let name = self.resolve_str(sym);
        if name == "_" || BUILTINS.contains(&name) || PRIMITIVES.contains(&name) {
            return;
        }
        if self.scopes.iter().any(|scope| scope.contains(&sym))
            || self.globals.contains(&sym)
            || self.functions.contains_key(&sym)
            || self.types.contains(&sym)
            || self.imports.contains(&sym)
        {
            return;
        }
        if Some(sym) == self.onerr_alias {
            return;
        }
        let name = name.to_string();
        self.error(format!("undefined name '{}'", name), span);
    }

    /// Checks a call expression. `piped_args` is the number of extra leading
    /// arguments threaded in by an enclosing pipe.
    fn check_call(&mut self, call: &Expr<'a>, piped_args: usize) {
        let (callee, args) = match &call.kind {
            ExprKind::Call { callee, args, .. } => (*callee, *args),
            _ => return,
        };

        self.return_counts
            .insert(call.span, self.callee_results(callee));

        security::check_call(self, call, callee, args, piped_args);

        match &callee.kind {
            ExprKind::Ident(sym) => {
                self.check_ident(*sym, callee.span);
                if let Some(sig) = self.functions.get(sym).cloned() {
                    self.check_arity(&sig, args, piped_args, call.span);
                }
            }
            _ => self.check_expr(callee),
        }

        for arg in args {
            // A placeholder consumes the piped value; it is filled in by
            // code generation, not evaluated here.
            if !matches!(arg.value.kind, ExprKind::Discard) {
                self.check_expr(arg.value);
            }
        }
    }

    fn check_arity(&mut self, sig: &FuncSig, args: &[Arg<'a>], piped_args: usize, span: Span) {
        let name = self.resolve_str(sig.name).to_string();
        let mut positional = piped_args;
        let mut named = 0usize;
        for arg in args {
            match arg.name {
                Some(arg_name) => {
                    named += 1;
                    if !sig.params.iter().any(|p| p.name == arg_name) {
                        let arg_name = self.resolve_str(arg_name).to_string();
                        self.error(
                            format!("no parameter named '{}' in call to '{}'", arg_name, name),
                            arg.span,
                        );
                    }
                }
                None => positional += 1,
            }
        }
        let supplied = positional + named;
        if supplied < sig.required() {
            self.error(
                format!(
                    "not enough arguments in call to '{}': have {}, want at least {}",
                    name,
                    supplied,
                    sig.required()
                ),
                span,
            );
        } else if supplied > sig.params.len() && !sig.variadic() {
            self.error(
                format!(
                    "too many arguments in call to '{}': have {}, want {}",
                    name,
                    supplied,
                    sig.params.len()
                ),
                span,
            );
        }
    }

    /// The right-hand side of a pipe: a call receiving the piped value, or a
    /// bare identifier applied to it.
    fn check_pipe_rhs(&mut self, rhs: &Expr<'a>) {
        match &rhs.kind {
            ExprKind::Call { args, .. } => {
                let has_placeholder = args
                    .iter()
                    .any(|a| matches!(a.value.kind, ExprKind::Discard));
                let piped = if has_placeholder { 0 } else { 1 };
                self.check_call(rhs, piped);
            }
            ExprKind::Ident(sym) => {
                let name = self.resolve_str(*sym);
                if name != "print" {
                    self.check_ident(*sym, rhs.span);
                }
            }
            ExprKind::Pipe { left, right } => {
                self.check_pipe_rhs(left);
                self.check_pipe_rhs(right);
            }
            _ => self.check_expr(rhs),
        }
    }

    // =========================================================================
    // OnErr rules
    // =========================================================================

    fn check_onerr(&mut self, clause: &OnErr<'a>) {
        let (_, error_last) = self.current_results;

        let propagates = clause.bare_return
            || (clause.handler.is_none() && clause.explain.is_some())
            || matches!(clause.handler, Some(OnErrHandler::ErrorReturn(_)));
        if propagates && !error_last {
            self.error(
                "bare 'onerr return' requires the enclosing function's last return type to be error",
                clause.span,
            );
        }

        if matches!(clause.handler, Some(OnErrHandler::Discard)) && !self.is_test_file {
            self.warn(
                "'onerr discard' silently drops the error; handle it or propagate it",
                clause.span,
            );
        }

        if matches!(clause.handler, Some(OnErrHandler::Panic(_))) {
            if let Some(package) = &self.package_name {
                if package != "main" {
                    self.warn(
                        "'onerr panic' in a library package aborts the caller; return the error instead",
                        clause.span,
                    );
                }
            }
        }

        let previous_alias = self.onerr_alias;
        self.onerr_alias = clause.alias;
        match &clause.handler {
            Some(OnErrHandler::Panic(message)) => {
                self.check_handler_interpolation(message, clause);
                self.check_expr(message);
            }
            Some(OnErrHandler::Return(values)) => {
                for value in values.iter() {
                    self.check_handler_interpolation(value, clause);
                    self.check_expr(value);
                }
                let (expected, _) = self.current_results;
                if values.len() != expected {
                    self.error(
                        format!(
                            "'onerr return' supplies {} value(s) but the function declares {}",
                            values.len(),
                            expected
                        ),
                        clause.span,
                    );
                }
            }
            Some(OnErrHandler::ErrorReturn(replacement)) => {
                self.check_handler_interpolation(replacement, clause);
                self.check_expr(replacement);
            }
            Some(OnErrHandler::Fallback(value)) => {
                self.check_handler_interpolation(value, clause);
                self.check_expr(value);
            }
            Some(OnErrHandler::Block(block)) => {
                for stmt in block.iter() {
                    self.check_handler_stmt_interpolation(stmt, clause);
                }
                self.check_block(block);
            }
            Some(OnErrHandler::Discard) | None => {}
        }
        self.onerr_alias = previous_alias;
    }

    /// Inside an onerr handler, `{err}` is a common slip for `{error}` (or
    /// the alias); reject it with a targeted message.
    fn check_handler_interpolation(&mut self, expr: &Expr<'a>, clause: &OnErr<'a>) {
        if let ExprKind::Str {
            value,
            interpolated: true,
        } = expr.kind
        {
            let text = self.resolve_str(value).to_string();
            for segment in interp::expr_segments(&text) {
                if segment == "err" {
                    let suggestion = match clause.alias {
                        Some(alias) => format!("{{{}}}", self.resolve_str(alias)),
                        None => "{error}".to_string(),
                    };
                    self.error(
                        format!("'{{err}}' is not defined here; use '{}'", suggestion),
                        expr.span,
                    );
                }
            }
        }
        // Recurse into compound messages like `"prefix" + detail`.
        match &expr.kind {
            ExprKind::Binary { left, right, .. } => {
                self.check_handler_interpolation(left, clause);
                self.check_handler_interpolation(right, clause);
            }
            ExprKind::ErrorNew(inner) => self.check_handler_interpolation(inner, clause),
            _ => {}
        }
    }

    fn check_handler_stmt_interpolation(&mut self, stmt: &Stmt<'a>, clause: &OnErr<'a>) {
        match &stmt.kind {
            StmtKind::Var { values, .. } | StmtKind::Return { values } => {
                for value in values.iter() {
                    self.check_handler_interpolation(value, clause);
                }
            }
            StmtKind::Assign { values, .. } => {
                for value in values.iter() {
                    self.check_handler_interpolation(value, clause);
                }
            }
            StmtKind::Expr { expr, .. } => self.check_handler_interpolation(expr, clause),
            _ => {}
        }
    }
}

/// Builds a [`FuncSig`] from a declaration.
fn signature_of(f: &FuncDecl<'_>, span: Span, interner: &Interner) -> FuncSig {
    FuncSig {
        name: f.name,
        params: f
            .params
            .iter()
            .map(|p| ParamInfo {
                name: p.name,
                has_default: p.default.is_some(),
                variadic: p.ty.is_some_and(|t| t.is_variadic()),
            })
            .collect(),
        results: f.results.len(),
        error_last: results_end_in_error(f.results, interner),
        span,
    }
}

fn results_end_in_error(results: &[TypeExpr<'_>], interner: &Interner) -> bool {
    results
        .last()
        .and_then(|t| t.named())
        .is_some_and(|sym| interner.resolve(sym) == "error")
}

/// A function whose parameter list includes an `http.ResponseWriter` is an
/// HTTP handler for the purposes of the security lints.
fn is_http_handler(f: &FuncDecl<'_>, interner: &Interner) -> bool {
    f.params.iter().any(|p| match p.ty.map(|t| &t.kind) {
        Some(TypeKind::Qualified { package, name }) => {
            interner.resolve(*package) == "http" && interner.resolve(*name) == "ResponseWriter"
        }
        _ => false,
    })
}

/// The package name an import path binds without an alias: its last
/// segment, or the penultimate one when the last is a `vN` major-version
/// suffix.
fn import_package_name(path: &str) -> &str {
    let mut parts = path.rsplit('/');
    let last = parts.next().unwrap_or(path);
    let versioned = last.len() > 1
        && last.starts_with('v')
        && last[1..].chars().all(|c| c.is_ascii_digit());
    if versioned {
        parts.next().unwrap_or(last)
    } else {
        last
    }
}

#[cfg(test)]
mod tests;
