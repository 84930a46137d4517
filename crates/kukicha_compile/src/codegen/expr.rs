//! Expression rendering.
//!
//! Expressions render to strings so callers can compose them into statement
//! emission. The interesting cases are pipes (three insertion strategies),
//! the `print` builtin, call-site expansion of named arguments and
//! parameter defaults, and string interpolation.

use kukicha_base::Symbol;
use kukicha_language::ast::*;
use kukicha_language::interp::{self, Segment};

use super::Generator;

/// Go operator precedence, used to decide where parentheses are required.
fn go_prec(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => 1,
        BinaryOp::And => 2,
        BinaryOp::Eq
        | BinaryOp::NotEq
        | BinaryOp::Lt
        | BinaryOp::Gt
        | BinaryOp::LtEq
        | BinaryOp::GtEq => 3,
        BinaryOp::Add | BinaryOp::Sub => 4,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 5,
    }
}

impl<'a, 'int> Generator<'a, 'int> {
    pub(crate) fn expr_str(&mut self, expr: &'a Expr<'a>) -> String {
        match &expr.kind {
            ExprKind::Ident(sym) => self.ident_str(*sym),
            ExprKind::Int { lexeme, .. } | ExprKind::Float { lexeme, .. } => {
                self.resolve(*lexeme).to_string()
            }
            ExprKind::Str {
                value,
                interpolated,
            } => {
                let raw = self.resolve(*value).to_string();
                if *interpolated {
                    self.needs_fmt = true;
                    let (format, args) = self.interp_parts(&raw);
                    format!("fmt.Sprintf(\"{}\", {})", format, args.join(", "))
                } else {
                    format!("\"{}\"", go_escape(&raw))
                }
            }
            ExprKind::Rune(c) => format!("'{}'", rune_escape(*c)),
            ExprKind::Bool(b) => b.to_string(),
            ExprKind::Binary { op, left, right } => {
                let parent = go_prec(*op);
                let lhs = self.child_str(left, parent, false);
                let rhs = self.child_str(right, parent, matches!(
                    op,
                    BinaryOp::Sub | BinaryOp::Div | BinaryOp::Mod
                ));
                format!("{} {} {}", lhs, op.go_text(), rhs)
            }
            ExprKind::Unary { op, operand } => {
                let rendered = self.expr_str(operand);
                let rendered = if matches!(operand.kind, ExprKind::Binary { .. }) {
                    format!("({})", rendered)
                } else {
                    rendered
                };
                match op {
                    UnaryOp::Not => format!("!{}", rendered),
                    UnaryOp::Neg => format!("-{}", rendered),
                }
            }
            ExprKind::Pipe { left, right } => {
                let value = self.expr_str(left);
                self.pipe_apply(&value, right)
            }
            ExprKind::Call {
                callee,
                args,
                spread: _,
            } => self.call_str(callee, args, None),
            ExprKind::Field { object, name } => {
                let object = self.expr_str(object);
                format!("{}.{}", object, self.resolve(*name))
            }
            ExprKind::Index { object, index } => {
                let object = self.expr_str(object);
                let index = self.expr_str(index);
                format!("{}[{}]", object, index)
            }
            ExprKind::Slice { object, start, end } => {
                let object = self.expr_str(object);
                let start = start.map(|e| self.expr_str(e)).unwrap_or_default();
                let end = end.map(|e| self.expr_str(e)).unwrap_or_default();
                format!("{}[{}:{}]", object, start, end)
            }
            ExprKind::StructLit { ty, fields } => {
                let ty = self.type_str(ty);
                let fields: Vec<String> = fields
                    .iter()
                    .map(|f| {
                        let value = self.expr_str(f.value);
                        format!("{}: {}", self.resolve(f.name), value)
                    })
                    .collect();
                format!("{}{{{}}}", ty, fields.join(", "))
            }
            ExprKind::ListLit { elem_ty, elems } => {
                let elem = match elem_ty {
                    Some(ty) => self.type_str(ty),
                    None => self.infer_elem_type(elems),
                };
                let elems: Vec<String> = elems.iter().map(|e| self.expr_str(e)).collect();
                format!("[]{}{{{}}}", elem, elems.join(", "))
            }
            ExprKind::MapLit {
                key_ty,
                value_ty,
                pairs,
            } => {
                let key_ty = self.type_str(key_ty);
                let value_ty = self.type_str(value_ty);
                let pairs: Vec<String> = pairs
                    .iter()
                    .map(|(k, v)| {
                        let k = self.expr_str(k);
                        let v = self.expr_str(v);
                        format!("{}: {}", k, v)
                    })
                    .collect();
                format!("map[{}]{}{{{}}}", key_ty, value_ty, pairs.join(", "))
            }
            ExprKind::Receive(channel) => {
                let channel = self.expr_str(channel);
                format!("<-{}", channel)
            }
            ExprKind::Cast { expr, ty } => {
                let ty = self.type_str(ty);
                let expr = self.expr_str(expr);
                format!("{}({})", ty, expr)
            }
            ExprKind::TypeAssert { expr, ty } => {
                let expr = self.expr_str(expr);
                let ty = self.type_str(ty);
                format!("{}.({})", expr, ty)
            }
            ExprKind::Empty { ty } => match ty {
                Some(ty) => self.zero_value(ty),
                None => "nil".to_string(),
            },
            ExprKind::Discard => "_".to_string(),
            ExprKind::ErrorNew(message) => self.error_new_str(message),
            ExprKind::Make { ty, args } => {
                let ty = self.type_str(ty);
                let mut parts = vec![ty];
                for arg in args.iter() {
                    parts.push(self.expr_str(arg));
                }
                format!("make({})", parts.join(", "))
            }
            ExprKind::Close(channel) => {
                let channel = self.expr_str(channel);
                format!("close({})", channel)
            }
            ExprKind::Panic(message) => {
                let message = self.expr_str(message);
                format!("panic({})", message)
            }
            ExprKind::Recover => "recover()".to_string(),
            ExprKind::Lambda {
                params,
                results,
                body,
            } => self.lambda_str(params, results, body),
            ExprKind::AddressOf(operand) => {
                // The address of a call has no lvalue; `new` creates the
                // heap cell instead.
                let rendered = self.expr_str(operand);
                if matches!(operand.kind, ExprKind::Call { .. }) {
                    format!("new({})", rendered)
                } else {
                    format!("&{}", rendered)
                }
            }
            ExprKind::Deref(operand) => {
                let rendered = self.expr_str(operand);
                format!("*{}", rendered)
            }
        }
    }

    fn child_str(&mut self, child: &'a Expr<'a>, parent_prec: u8, right_strict: bool) -> String {
        let rendered = self.expr_str(child);
        if let ExprKind::Binary { op, .. } = child.kind {
            let child_prec = go_prec(op);
            if child_prec < parent_prec || (right_strict && child_prec == parent_prec) {
                return format!("({})", rendered);
            }
        }
        rendered
    }

    /// Identifier rendering: package aliases apply, and inside an onerr
    /// handler the name `error` (or the clause alias) resolves to the
    /// handler's unique error variable.
    fn ident_str(&mut self, sym: Symbol) -> String {
        let name = self.resolve(sym);
        if let Some(err) = &self.onerr_var {
            if name == "error" {
                return err.clone();
            }
            if let Some(alias) = &self.onerr_alias {
                if name == alias.as_str() {
                    return err.clone();
                }
            }
        }
        self.package_ref(sym)
    }

    fn error_new_str(&mut self, message: &'a Expr<'a>) -> String {
        if let ExprKind::Str {
            value,
            interpolated,
        } = message.kind
        {
            let raw = self.resolve(value).to_string();
            if interpolated {
                self.needs_fmt = true;
                let (format, args) = self.interp_parts(&raw);
                return format!("fmt.Errorf(\"{}\", {})", format, args.join(", "));
            }
            self.needs_errors = true;
            return format!("errors.New(\"{}\")", go_escape(&raw));
        }
        self.needs_errors = true;
        let message = self.expr_str(message);
        format!("errors.New({})", message)
    }

    // =========================================================================
    // Calls
    // =========================================================================

    /// Renders a call. `piped` is a pre-rendered value being threaded in as
    /// the leading argument by a pipe.
    pub(crate) fn call_str(
        &mut self,
        callee: &'a Expr<'a>,
        args: &'a [Arg<'a>],
        piped: Option<&str>,
    ) -> String {
        if let ExprKind::Ident(sym) = callee.kind {
            let name = self.resolve(sym).to_string();
            match name.as_str() {
                "print" => {
                    let values: Vec<&'a Expr<'a>> = args.iter().map(|a| a.value).collect();
                    return self.print_str(piped, &values);
                }
                "len" | "cap" | "append" | "copy" | "delete" | "min" | "max" => {
                    let rendered = self.plain_args(args, piped);
                    return format!("{}({})", name, rendered.join(", "));
                }
                _ => {}
            }
            if let Some(decl) = self.func_decl_of(sym) {
                let positional = args.iter().filter(|a| a.name.is_none()).count()
                    + piped.map(|_| 1).unwrap_or(0);
                let has_named = args.iter().any(|a| a.name.is_some());
                let has_defaults = decl.params.iter().any(|p| p.default.is_some());
                let variadic = decl
                    .params
                    .last()
                    .and_then(|p| p.ty)
                    .is_some_and(|t| t.is_variadic());
                let needs_expansion =
                    has_named || (has_defaults && !variadic && positional < decl.params.len());
                if needs_expansion {
                    let rendered = self.expand_default_args(decl, args, piped);
                    return format!("{}({})", name, rendered.join(", "));
                }
            }
        }

        let callee = self.expr_str(callee);
        let rendered = self.plain_args(args, piped);
        format!("{}({})", callee, rendered.join(", "))
    }

    fn plain_args(&mut self, args: &'a [Arg<'a>], piped: Option<&str>) -> Vec<String> {
        let mut rendered = Vec::with_capacity(args.len() + 1);
        if let Some(piped) = piped {
            rendered.push(piped.to_string());
        }
        for arg in args {
            let mut value = self.expr_str(arg.value);
            if arg.spread {
                value.push_str("...");
            }
            rendered.push(value);
        }
        rendered
    }

    /// Reorders named arguments into declaration order and fills omitted
    /// parameters from their declared defaults.
    fn expand_default_args(
        &mut self,
        decl: &'a FuncDecl<'a>,
        args: &'a [Arg<'a>],
        piped: Option<&str>,
    ) -> Vec<String> {
        let mut positional: Vec<String> = piped.map(|p| vec![p.to_string()]).unwrap_or_default();
        positional.extend(
            args.iter()
                .filter(|a| a.name.is_none())
                .map(|a| self.expr_str(a.value)),
        );
        let mut positional = positional.into_iter();

        let mut rendered = Vec::with_capacity(decl.params.len());
        for param in decl.params {
            if let Some(next) = positional.next() {
                rendered.push(next);
                continue;
            }
            let named = args
                .iter()
                .find(|a| a.name == Some(param.name))
                .map(|a| a.value);
            match (named, param.default) {
                (Some(value), _) => rendered.push(self.expr_str(value)),
                (None, Some(default)) => rendered.push(self.expr_str(default)),
                (None, None) => {}
            }
        }
        rendered
    }

    /// The `print` builtin: stdout normally, stderr for MCP targets so the
    /// protocol stream stays clean. A single interpolated string becomes a
    /// formatted print.
    fn print_str(&mut self, piped: Option<&str>, values: &[&'a Expr<'a>]) -> String {
        self.needs_fmt = true;
        let stderr = self.options.mcp_target;
        if stderr {
            self.needs_os = true;
        }

        if piped.is_none() && values.len() == 1 {
            if let ExprKind::Str {
                value,
                interpolated: true,
            } = values[0].kind
            {
                let raw = self.resolve(value).to_string();
                let (format, args) = self.interp_parts(&raw);
                return if stderr {
                    format!(
                        "fmt.Fprintf(os.Stderr, \"{}\\n\", {})",
                        format,
                        args.join(", ")
                    )
                } else {
                    format!("fmt.Printf(\"{}\\n\", {})", format, args.join(", "))
                };
            }
        }

        let mut rendered: Vec<String> = Vec::new();
        if let Some(piped) = piped {
            rendered.push(piped.to_string());
        }
        for value in values.iter() {
            rendered.push(self.expr_str(value));
        }
        if stderr {
            format!("fmt.Fprintln(os.Stderr, {})", rendered.join(", "))
        } else {
            format!("fmt.Println({})", rendered.join(", "))
        }
    }

    // =========================================================================
    // Pipes
    // =========================================================================

    /// Applies one pipe stage to an already-rendered value.
    ///
    /// Strategies, in order: a `_` placeholder argument takes the value in
    /// place; otherwise the value becomes the first argument (data-first);
    /// a bare identifier is called with the value, with `print` mapping to
    /// the standard-output print.
    pub(crate) fn pipe_apply(&mut self, value: &str, stage: &'a Expr<'a>) -> String {
        match &stage.kind {
            ExprKind::Call { callee, args, .. } => {
                let has_placeholder = args
                    .iter()
                    .any(|a| matches!(a.value.kind, ExprKind::Discard));
                if has_placeholder {
                    let mut replaced = false;
                    let callee = self.expr_str(callee);
                    let rendered: Vec<String> = args
                        .iter()
                        .map(|arg| {
                            if !replaced && matches!(arg.value.kind, ExprKind::Discard) {
                                replaced = true;
                                value.to_string()
                            } else {
                                let mut text = self.expr_str(arg.value);
                                if arg.spread {
                                    text.push_str("...");
                                }
                                text
                            }
                        })
                        .collect();
                    format!("{}({})", callee, rendered.join(", "))
                } else {
                    self.call_str(callee, args, Some(value))
                }
            }
            ExprKind::Ident(sym) => {
                let name = self.resolve(*sym).to_string();
                if name == "print" {
                    self.print_str(Some(value), &[])
                } else {
                    format!("{}({})", self.package_ref(*sym), value)
                }
            }
            ExprKind::Field { .. } => {
                let stage = self.expr_str(stage);
                format!("{}({})", stage, value)
            }
            _ => {
                let stage = self.expr_str(stage);
                format!("{}({})", stage, value)
            }
        }
    }

    // =========================================================================
    // Lambdas
    // =========================================================================

    fn lambda_str(
        &mut self,
        params: &'a [Param<'a>],
        results: &'a [TypeExpr<'a>],
        body: &'a LambdaBody<'a>,
    ) -> String {
        let params = self.param_list(params);
        match body {
            LambdaBody::Expr(expr) => {
                let expr = self.expr_str(expr);
                format!("func({}) any {{ return {} }}", params, expr)
            }
            LambdaBody::Block(block) => {
                let results = if results.is_empty() {
                    if block_returns_value(block) {
                        " any".to_string()
                    } else {
                        String::new()
                    }
                } else {
                    self.result_list(results)
                };
                let mut out = format!("func({}){} {{\n", params, results);
                let saved = std::mem::take(&mut self.body);
                self.indent += 1;
                self.gen_block(block);
                self.indent -= 1;
                let inner = std::mem::replace(&mut self.body, saved);
                out.push_str(&inner);
                out.push_str(&format!("{}}}", self.ind()));
                out
            }
        }
    }

    // =========================================================================
    // Interpolation
    // =========================================================================

    /// Lowers an interpolated string to a `%v` format plus argument list.
    pub(crate) fn interp_parts(&mut self, raw: &str) -> (String, Vec<String>) {
        let mut format = String::new();
        let mut args = Vec::new();
        for segment in interp::segments(raw) {
            match segment {
                Segment::Lit(text) => format.push_str(&go_format_escape(&text)),
                Segment::Expr(text) => {
                    format.push_str("%v");
                    args.push(self.interp_expr_str(&text));
                }
            }
        }
        (format, args)
    }

    /// Renders one `{...}` segment. The `as Type` sugar lowers to a
    /// conversion; inside an onerr handler, `error` (or the alias) resolves
    /// to the unique error variable.
    fn interp_expr_str(&mut self, text: &str) -> String {
        let text = text.trim();
        if let Some(err) = &self.onerr_var {
            if text == "error" {
                return err.clone();
            }
            if let Some(alias) = &self.onerr_alias {
                if text == alias.as_str() {
                    return err.clone();
                }
            }
        }
        if let Some((expr, ty)) = text.rsplit_once(" as ") {
            let ty = match ty.trim() {
                "float" => "float64",
                other => other,
            };
            return format!("{}({})", ty, self.substitute_aliases(expr.trim()));
        }
        self.substitute_aliases(text)
    }

    /// Rewrites a leading `pkg.` prefix through the import alias map.
    fn substitute_aliases(&self, text: &str) -> String {
        if let Some((head, rest)) = text.split_once('.') {
            if let Some(alias) = self.aliases.get(head) {
                return format!("{}.{}", alias, rest);
            }
        }
        text.to_string()
    }

    /// Escapes a raw fragment for inclusion in a Go format string.
    pub(crate) fn go_quote_fragment(&self, raw: String) -> String {
        go_format_escape(&raw)
    }

    fn infer_elem_type(&mut self, elems: &'a [&'a Expr<'a>]) -> String {
        match elems.first().map(|e| &e.kind) {
            Some(ExprKind::Int { .. }) => "int".to_string(),
            Some(ExprKind::Float { .. }) => "float64".to_string(),
            Some(ExprKind::Str { .. }) => "string".to_string(),
            Some(ExprKind::Bool(_)) => "bool".to_string(),
            Some(ExprKind::Rune(_)) => "rune".to_string(),
            _ => "any".to_string(),
        }
    }
}

/// Whether a lambda block ends up producing a value.
fn block_returns_value(block: Block<'_>) -> bool {
    block.iter().any(|stmt| match &stmt.kind {
        StmtKind::Return { values } => !values.is_empty(),
        _ => false,
    })
}

/// Escapes text for a plain Go string literal.
pub(crate) fn go_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\x00"),
            other => out.push(other),
        }
    }
    out
}

/// Escapes text for a Go format string: literal `%` doubles.
fn go_format_escape(raw: &str) -> String {
    go_escape(raw).replace('%', "%%")
}

fn rune_escape(c: char) -> String {
    match c {
        '\\' => "\\\\".to_string(),
        '\'' => "\\'".to_string(),
        '\n' => "\\n".to_string(),
        '\t' => "\\t".to_string(),
        '\r' => "\\r".to_string(),
        '\0' => "\\x00".to_string(),
        other => other.to_string(),
    }
}
