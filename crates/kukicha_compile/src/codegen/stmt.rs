//! Statement generation, including the onerr expansion engine and the
//! numeric-for lowering.

use std::fmt::Write;

use kukicha_base::Symbol;
use kukicha_language::ast::*;

use super::Generator;

/// What an onerr-bearing statement binds its call results to.
enum Binding<'s> {
    /// `x := f()` — fresh names, `:=` binding.
    Names(&'s [String]),
    /// `x.field = f()` — pre-existing targets, `=` assignment with a
    /// separately declared error variable.
    Targets(&'s [String]),
    /// A bare expression statement.
    None,
}

impl<'a, 'int> Generator<'a, 'int> {
    pub(crate) fn gen_block(&mut self, block: Block<'a>) {
        for stmt in block {
            self.gen_stmt(stmt);
        }
    }

    pub(crate) fn gen_stmt(&mut self, stmt: &'a Stmt<'a>) {
        self.line_directive(stmt.span);
        match &stmt.kind {
            StmtKind::Var {
                names,
                ty,
                values,
                onerr,
                short,
            } => self.gen_var(names, *ty, values, onerr.as_ref(), *short),
            StmtKind::Assign {
                targets,
                values,
                onerr,
            } => self.gen_assign(targets, values, onerr.as_ref()),
            StmtKind::IncDec { target, increment } => {
                let target = self.expr_str(target);
                let op = if *increment { "++" } else { "--" };
                let ind = self.ind();
                writeln!(self.body, "{}{}{}", ind, target, op).unwrap();
            }
            StmtKind::Return { values } => self.gen_return(values),
            StmtKind::If {
                init,
                cond,
                then_block,
                else_arm,
            } => self.gen_if(*init, cond, then_block, else_arm.as_ref()),
            StmtKind::Switch {
                subject,
                cases,
                default,
            } => self.gen_switch(*subject, cases, *default),
            StmtKind::TypeSwitch {
                binding,
                subject,
                cases,
                default,
            } => self.gen_type_switch(*binding, subject, cases, *default),
            StmtKind::Select { cases, default } => self.gen_select(cases, *default),
            StmtKind::ForRange {
                index,
                value,
                iterable,
                body,
            } => self.gen_for_range(*index, *value, iterable, body),
            StmtKind::ForNumeric {
                var,
                from,
                to,
                inclusive,
                body,
            } => self.gen_for_numeric(*var, from, to, *inclusive, body),
            StmtKind::ForCond { cond, body } => {
                let header = match cond {
                    Some(cond) => {
                        let cond = self.expr_str(cond);
                        format!("for {} {{", cond)
                    }
                    None => "for {".to_string(),
                };
                let ind = self.ind();
                writeln!(self.body, "{}{}", ind, header).unwrap();
                self.indent += 1;
                self.gen_block(body);
                self.indent -= 1;
                writeln!(self.body, "{}}}", ind).unwrap();
            }
            StmtKind::Defer { call } => {
                let call = self.expr_str(call);
                let ind = self.ind();
                writeln!(self.body, "{}defer {}", ind, call).unwrap();
            }
            StmtKind::Go { call } => {
                let call = self.expr_str(call);
                let ind = self.ind();
                writeln!(self.body, "{}go {}", ind, call).unwrap();
            }
            StmtKind::GoBlock { body } => {
                let ind = self.ind();
                writeln!(self.body, "{}go func() {{", ind).unwrap();
                self.indent += 1;
                self.gen_block(body);
                self.indent -= 1;
                writeln!(self.body, "{}}}()", ind).unwrap();
            }
            StmtKind::Send { channel, value } => {
                let channel = self.expr_str(channel);
                let value = self.expr_str(value);
                let ind = self.ind();
                writeln!(self.body, "{}{} <- {}", ind, channel, value).unwrap();
            }
            StmtKind::Break => {
                let ind = self.ind();
                writeln!(self.body, "{}break", ind).unwrap();
            }
            StmtKind::Continue => {
                let ind = self.ind();
                writeln!(self.body, "{}continue", ind).unwrap();
            }
            StmtKind::Expr { expr, onerr } => match onerr {
                Some(clause) => {
                    self.gen_onerr(Binding::None, expr, clause);
                }
                None => {
                    let expr = self.expr_str(expr);
                    let ind = self.ind();
                    writeln!(self.body, "{}{}", ind, expr).unwrap();
                }
            },
        }
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    fn gen_var(
        &mut self,
        names: &'a [Symbol],
        ty: Option<&'a TypeExpr<'a>>,
        values: &'a [&'a Expr<'a>],
        onerr: Option<&'a OnErr<'a>>,
        short: bool,
    ) {
        let rendered_names: Vec<String> =
            names.iter().map(|n| self.resolve(*n).to_string()).collect();

        if let (Some(clause), &[value]) = (onerr, values) {
            self.gen_onerr(Binding::Names(&rendered_names), value, clause);
            return;
        }

        let names = rendered_names.join(", ");
        let ind = self.ind();
        if short {
            let values: Vec<String> = values.iter().map(|v| self.expr_str(v)).collect();
            writeln!(self.body, "{}{} := {}", ind, names, values.join(", ")).unwrap();
            return;
        }
        match (ty, values.is_empty()) {
            (Some(ty), true) => {
                let ty = self.type_str(ty);
                writeln!(self.body, "{}var {} {}", ind, names, ty).unwrap();
            }
            (Some(ty), false) => {
                let ty = self.type_str(ty);
                let values: Vec<String> = values.iter().map(|v| self.expr_str(v)).collect();
                writeln!(
                    self.body,
                    "{}var {} {} = {}",
                    ind,
                    names,
                    ty,
                    values.join(", ")
                )
                .unwrap();
            }
            (None, _) => {
                let values: Vec<String> = values.iter().map(|v| self.expr_str(v)).collect();
                writeln!(self.body, "{}var {} = {}", ind, names, values.join(", ")).unwrap();
            }
        }
    }

    fn gen_assign(
        &mut self,
        targets: &'a [&'a Expr<'a>],
        values: &'a [&'a Expr<'a>],
        onerr: Option<&'a OnErr<'a>>,
    ) {
        let rendered_targets: Vec<String> = targets.iter().map(|t| self.expr_str(t)).collect();

        if let (Some(clause), &[value]) = (onerr, values) {
            self.gen_onerr(Binding::Targets(&rendered_targets), value, clause);
            return;
        }

        let values: Vec<String> = values.iter().map(|v| self.expr_str(v)).collect();
        let ind = self.ind();
        writeln!(
            self.body,
            "{}{} = {}",
            ind,
            rendered_targets.join(", "),
            values.join(", ")
        )
        .unwrap();
    }

    fn gen_return(&mut self, values: &'a [&'a Expr<'a>]) {
        let mut rendered = Vec::with_capacity(values.len());
        for (i, value) in values.iter().enumerate() {
            let mut text = self.expr_str(value);
            if let Some(coerced) = self.coerce_return(i, value, &text) {
                text = coerced;
            }
            rendered.push(text);
        }
        let ind = self.ind();
        if rendered.is_empty() {
            writeln!(self.body, "{}return", ind).unwrap();
        } else {
            writeln!(self.body, "{}return {}", ind, rendered.join(", ")).unwrap();
        }
    }

    /// Wraps an arithmetic return value in a conversion when the declared
    /// result is a named scalar type. Calls, identifiers, casts, and zero
    /// values come through already typed and are left alone.
    fn coerce_return(
        &mut self,
        index: usize,
        value: &'a Expr<'a>,
        rendered: &str,
    ) -> Option<String> {
        let declared = self.current_results.get(index)?;
        let name = match declared.kind {
            TypeKind::Named(sym) => self.resolve(sym).to_string(),
            _ => return None,
        };
        if !self.is_named_scalar(&name) {
            return None;
        }
        let arithmetic = matches!(
            value.kind,
            ExprKind::Binary {
                op: BinaryOp::Add
                    | BinaryOp::Sub
                    | BinaryOp::Mul
                    | BinaryOp::Div
                    | BinaryOp::Mod,
                ..
            }
        );
        if arithmetic {
            Some(format!("{}({})", name, rendered))
        } else {
            None
        }
    }

    // =========================================================================
    // OnErr expansion
    // =========================================================================

    /// Expands `<binding> <value> onerr <handler>`.
    ///
    /// A unique `err_N` is drawn from the generator's counter for every
    /// expansion, so nested and sibling onerr uses never shadow each other.
    fn gen_onerr(&mut self, binding: Binding<'_>, value: &'a Expr<'a>, clause: &'a OnErr<'a>) {
        // Discard omits the check entirely and blanks every result.
        if matches!(clause.handler, Some(OnErrHandler::Discard)) {
            self.gen_onerr_discard(&binding, value);
            return;
        }

        if let ExprKind::Pipe { .. } = value.kind {
            if self.pipe_needs_flattening(value) {
                self.gen_flattened_pipe(&binding, value, clause);
                return;
            }
        }

        let err = format!("err_{}", self.next_tmp());
        let call = self.expr_str(value);
        let ind = self.ind();
        match &binding {
            Binding::Names(names) => {
                writeln!(
                    self.body,
                    "{}{}, {} := {}",
                    ind,
                    names.join(", "),
                    err,
                    call
                )
                .unwrap();
            }
            Binding::Targets(targets) => {
                writeln!(self.body, "{}var {} error", ind, err).unwrap();
                writeln!(
                    self.body,
                    "{}{}, {} = {}",
                    ind,
                    targets.join(", "),
                    err,
                    call
                )
                .unwrap();
            }
            Binding::None => {
                let results = self.call_results(value);
                if results >= 2 {
                    let blanks = vec!["_"; results - 1].join(", ");
                    writeln!(self.body, "{}{}, {} := {}", ind, blanks, err, call).unwrap();
                } else {
                    writeln!(self.body, "{}{} := {}", ind, err, call).unwrap();
                }
            }
        }
        self.gen_err_check(&binding, &err, clause);
    }

    fn gen_onerr_discard(&mut self, binding: &Binding<'_>, value: &'a Expr<'a>) {
        let call = self.expr_str(value);
        let ind = self.ind();
        match binding {
            Binding::Names(names) => {
                writeln!(self.body, "{}{}, _ := {}", ind, names.join(", "), call).unwrap();
            }
            Binding::Targets(targets) => {
                writeln!(self.body, "{}{}, _ = {}", ind, targets.join(", "), call).unwrap();
            }
            Binding::None => {
                let results = self.call_results(value).max(1);
                let blanks = vec!["_"; results].join(", ");
                writeln!(self.body, "{}{} = {}", ind, blanks, call).unwrap();
            }
        }
    }

    /// Emits `if err_N != nil { ... }` with the handler expansion.
    fn gen_err_check(&mut self, binding: &Binding<'_>, err: &str, clause: &'a OnErr<'a>) {
        let ind = self.ind();
        writeln!(self.body, "{}if {} != nil {{", ind, err).unwrap();
        self.indent += 1;

        let saved_var = self.onerr_var.replace(err.to_string());
        let saved_alias = std::mem::replace(
            &mut self.onerr_alias,
            clause.alias.map(|a| self.interner.resolve(a).to_string()),
        );

        if let Some(hint) = clause.explain {
            self.needs_fmt = true;
            let hint = self.go_quote_fragment(self.interner.resolve(hint).to_string());
            let inner = self.ind();
            writeln!(
                self.body,
                "{}{} = fmt.Errorf(\"{}: %w\", {})",
                inner, err, hint, err
            )
            .unwrap();
        }

        match &clause.handler {
            Some(OnErrHandler::Panic(message)) => {
                let message = self.expr_str(message);
                let inner = self.ind();
                writeln!(self.body, "{}panic({})", inner, message).unwrap();
            }
            Some(OnErrHandler::Return(values)) => {
                let rendered: Vec<String> = values.iter().map(|v| self.expr_str(v)).collect();
                let inner = self.ind();
                writeln!(self.body, "{}return {}", inner, rendered.join(", ")).unwrap();
            }
            Some(OnErrHandler::ErrorReturn(replacement)) => {
                let replacement = self.expr_str(replacement);
                let zeros = self.non_error_zeros();
                let inner = self.ind();
                if zeros.is_empty() {
                    writeln!(self.body, "{}return {}", inner, replacement).unwrap();
                } else {
                    writeln!(
                        self.body,
                        "{}return {}, {}",
                        inner,
                        zeros.join(", "),
                        replacement
                    )
                    .unwrap();
                }
            }
            Some(OnErrHandler::Fallback(default)) => {
                let default = self.expr_str(default);
                let inner = self.ind();
                match binding {
                    Binding::Names(names) => {
                        writeln!(self.body, "{}{} = {}", inner, names[0], default).unwrap()
                    }
                    Binding::Targets(targets) => {
                        writeln!(self.body, "{}{} = {}", inner, targets[0], default).unwrap()
                    }
                    Binding::None => {
                        writeln!(self.body, "{}_ = {}", inner, default).unwrap()
                    }
                }
            }
            Some(OnErrHandler::Block(block)) => {
                self.gen_block(block);
            }
            Some(OnErrHandler::Discard) => unreachable!("discard omits the check"),
            None => {
                // Bare propagation: zero values for every non-error result,
                // the error itself last, unwrapped.
                self.gen_bare_return(err);
            }
        }

        self.onerr_var = saved_var;
        self.onerr_alias = saved_alias;
        self.indent -= 1;
        writeln!(self.body, "{}}}", ind).unwrap();
    }

    fn gen_bare_return(&mut self, err: &str) {
        let zeros = self.non_error_zeros();
        let inner = self.ind();
        if zeros.is_empty() {
            writeln!(self.body, "{}return {}", inner, err).unwrap();
        } else {
            writeln!(self.body, "{}return {}, {}", inner, zeros.join(", "), err).unwrap();
        }
    }

    /// Zero values for the enclosing function's results, minus the trailing
    /// error slot.
    fn non_error_zeros(&mut self) -> Vec<String> {
        let results = self.current_results;
        if results.is_empty() {
            return Vec::new();
        }
        results[..results.len() - 1]
            .iter()
            .map(|ty| self.zero_value(ty))
            .collect()
    }

    // =========================================================================
    // Pipe flattening under onerr
    // =========================================================================

    /// A pipe needs flattening when any stage returns several values; each
    /// such stage then gets its own error check.
    fn pipe_needs_flattening(&self, pipe: &'a Expr<'a>) -> bool {
        let (_, stages) = split_pipe(pipe);
        stages.iter().any(|stage| self.call_results(stage) >= 2)
    }

    pub(crate) fn call_results(&self, expr: &'a Expr<'a>) -> usize {
        match &expr.kind {
            ExprKind::Call { .. } => self
                .analysis
                .return_counts
                .get(&expr.span)
                .copied()
                .unwrap_or(1),
            ExprKind::Pipe { right, .. } => self.call_results(right),
            _ => 1,
        }
    }

    fn gen_flattened_pipe(
        &mut self,
        binding: &Binding<'_>,
        pipe: &'a Expr<'a>,
        clause: &'a OnErr<'a>,
    ) {
        let (base, stages) = split_pipe(pipe);
        let mut current = self.expr_str(base);

        let last = stages.len() - 1;
        for (i, stage) in stages.iter().enumerate() {
            let call = self.pipe_apply(&current, stage);
            let multi = self.call_results(stage) >= 2;
            let is_last = i == last;

            if multi {
                let err = format!("err_{}", self.next_tmp());
                let ind = self.ind();
                if is_last {
                    match binding {
                        Binding::Names(names) => {
                            writeln!(
                                self.body,
                                "{}{}, {} := {}",
                                ind,
                                names.join(", "),
                                err,
                                call
                            )
                            .unwrap();
                        }
                        Binding::Targets(targets) => {
                            writeln!(self.body, "{}var {} error", ind, err).unwrap();
                            writeln!(
                                self.body,
                                "{}{}, {} = {}",
                                ind,
                                targets.join(", "),
                                err,
                                call
                            )
                            .unwrap();
                        }
                        Binding::None => {
                            let blanks =
                                vec!["_"; self.call_results(stage).saturating_sub(1).max(1)]
                                    .join(", ");
                            writeln!(self.body, "{}{}, {} := {}", ind, blanks, err, call)
                                .unwrap();
                        }
                    }
                    self.gen_err_check(binding, &err, clause);
                } else {
                    let tmp = format!("tmp_{}", self.next_tmp());
                    writeln!(self.body, "{}{}, {} := {}", ind, tmp, err, call).unwrap();
                    self.gen_err_check(binding, &err, clause);
                    current = tmp;
                }
            } else if is_last {
                let ind = self.ind();
                match binding {
                    Binding::Names(names) => {
                        writeln!(self.body, "{}{} := {}", ind, names.join(", "), call).unwrap();
                    }
                    Binding::Targets(targets) => {
                        writeln!(self.body, "{}{} = {}", ind, targets.join(", "), call).unwrap();
                    }
                    Binding::None => {
                        writeln!(self.body, "{}{}", ind, call).unwrap();
                    }
                }
            } else {
                current = call;
            }
        }
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    fn gen_if(
        &mut self,
        init: Option<&'a Stmt<'a>>,
        cond: &'a Expr<'a>,
        then_block: Block<'a>,
        else_arm: Option<&'a ElseArm<'a>>,
    ) {
        let header = self.if_header(init, cond);
        let ind = self.ind();
        writeln!(self.body, "{}{} {{", ind, header).unwrap();
        self.indent += 1;
        self.gen_block(then_block);
        self.indent -= 1;
        self.gen_else(else_arm);
        let ind = self.ind();
        writeln!(self.body, "{}}}", ind).unwrap();
    }

    fn gen_else(&mut self, else_arm: Option<&'a ElseArm<'a>>) {
        match else_arm {
            None => {}
            Some(ElseArm::Block(block)) => {
                let ind = self.ind();
                writeln!(self.body, "{}}} else {{", ind).unwrap();
                self.indent += 1;
                self.gen_block(block);
                self.indent -= 1;
            }
            Some(ElseArm::If(nested)) => {
                if let StmtKind::If {
                    init,
                    cond,
                    then_block,
                    else_arm,
                } = &nested.kind
                {
                    let header = self.if_header(*init, cond);
                    let ind = self.ind();
                    // `if` header re-spelled inline to chain as `else if`.
                    writeln!(self.body, "{}}} else {} {{", ind, &header[..]).unwrap();
                    self.indent += 1;
                    self.gen_block(then_block);
                    self.indent -= 1;
                    self.gen_else(else_arm.as_ref());
                }
            }
        }
    }

    fn if_header(&mut self, init: Option<&'a Stmt<'a>>, cond: &'a Expr<'a>) -> String {
        let cond = self.expr_str(cond);
        match init {
            Some(init) => {
                let init = self.inline_stmt_str(init);
                format!("if {}; {}", init, cond)
            }
            None => format!("if {}", cond),
        }
    }

    /// Renders a simple statement without indentation or newline, for `if`
    /// init clauses.
    fn inline_stmt_str(&mut self, stmt: &'a Stmt<'a>) -> String {
        match &stmt.kind {
            StmtKind::Var { names, values, .. } => {
                let names: Vec<String> =
                    names.iter().map(|n| self.resolve(*n).to_string()).collect();
                let values: Vec<String> = values.iter().map(|v| self.expr_str(v)).collect();
                format!("{} := {}", names.join(", "), values.join(", "))
            }
            _ => String::new(),
        }
    }

    fn gen_switch(
        &mut self,
        subject: Option<&'a Expr<'a>>,
        cases: &'a [SwitchCase<'a>],
        default: Option<Block<'a>>,
    ) {
        let header = match subject {
            Some(subject) => {
                let subject = self.expr_str(subject);
                format!("switch {} {{", subject)
            }
            None => "switch {".to_string(),
        };
        let ind = self.ind();
        writeln!(self.body, "{}{}", ind, header).unwrap();
        for case in cases {
            let values: Vec<String> = case.values.iter().map(|v| self.expr_str(v)).collect();
            writeln!(self.body, "{}case {}:", ind, values.join(", ")).unwrap();
            self.indent += 1;
            self.gen_block(case.body);
            self.indent -= 1;
        }
        if let Some(default) = default {
            writeln!(self.body, "{}default:", ind).unwrap();
            self.indent += 1;
            self.gen_block(default);
            self.indent -= 1;
        }
        writeln!(self.body, "{}}}", ind).unwrap();
    }

    fn gen_type_switch(
        &mut self,
        binding: Option<Symbol>,
        subject: &'a Expr<'a>,
        cases: &'a [TypeCase<'a>],
        default: Option<Block<'a>>,
    ) {
        let subject = self.expr_str(subject);
        let ind = self.ind();
        match binding {
            Some(binding) => {
                let binding = self.resolve(binding);
                writeln!(
                    self.body,
                    "{}switch {} := {}.(type) {{",
                    ind, binding, subject
                )
                .unwrap();
            }
            None => writeln!(self.body, "{}switch {}.(type) {{", ind, subject).unwrap(),
        }
        for case in cases {
            let ty = self.type_str(case.ty);
            writeln!(self.body, "{}case {}:", ind, ty).unwrap();
            self.indent += 1;
            self.gen_block(case.body);
            self.indent -= 1;
        }
        if let Some(default) = default {
            writeln!(self.body, "{}default:", ind).unwrap();
            self.indent += 1;
            self.gen_block(default);
            self.indent -= 1;
        }
        writeln!(self.body, "{}}}", ind).unwrap();
    }

    fn gen_select(&mut self, cases: &'a [SelectCase<'a>], default: Option<Block<'a>>) {
        let ind = self.ind();
        writeln!(self.body, "{}select {{", ind).unwrap();
        for case in cases {
            let header = match &case.comm {
                SelectComm::Recv { bindings, channel } => {
                    let channel = self.expr_str(channel);
                    match bindings.len() {
                        0 => format!("case <-{}:", channel),
                        1 => {
                            let v = self.resolve(bindings[0]);
                            format!("case {} := <-{}:", v, channel)
                        }
                        _ => {
                            let v = self.resolve(bindings[0]);
                            let ok = self.resolve(bindings[1]);
                            format!("case {}, {} := <-{}:", v, ok, channel)
                        }
                    }
                }
                SelectComm::Send { channel, value } => {
                    let channel = self.expr_str(channel);
                    let value = self.expr_str(value);
                    format!("case {} <- {}:", channel, value)
                }
            };
            writeln!(self.body, "{}{}", ind, header).unwrap();
            self.indent += 1;
            self.gen_block(case.body);
            self.indent -= 1;
        }
        if let Some(default) = default {
            writeln!(self.body, "{}default:", ind).unwrap();
            self.indent += 1;
            self.gen_block(default);
            self.indent -= 1;
        }
        writeln!(self.body, "{}}}", ind).unwrap();
    }

    fn gen_for_range(
        &mut self,
        index: Option<Symbol>,
        value: Symbol,
        iterable: &'a Expr<'a>,
        body: Block<'a>,
    ) {
        let iterable = self.expr_str(iterable);
        let value = self.resolve(value).to_string();
        let header = match index {
            Some(index) => {
                let index = self.resolve(index);
                format!("for {}, {} := range {} {{", index, value, iterable)
            }
            // Iterator stdlib files range over lazy sequences, which bind a
            // single variable.
            None if self.stdlib_kind == super::StdlibKind::Iter => {
                format!("for {} := range {} {{", value, iterable)
            }
            None => format!("for _, {} := range {} {{", value, iterable),
        };
        let ind = self.ind();
        writeln!(self.body, "{}{}", ind, header).unwrap();
        self.indent += 1;
        self.gen_block(body);
        self.indent -= 1;
        writeln!(self.body, "{}}}", ind).unwrap();
    }

    /// Lowers `for i from A to/through B`, supporting descending ranges by
    /// computing a step at runtime. The ascending `from 0 to N` case becomes
    /// a plain range-over-integer loop.
    fn gen_for_numeric(
        &mut self,
        var: Symbol,
        from: &'a Expr<'a>,
        to: &'a Expr<'a>,
        inclusive: bool,
        body: Block<'a>,
    ) {
        let var = self.resolve(var).to_string();
        let ind = self.ind();

        let ascending_from_zero =
            !inclusive && matches!(from.kind, ExprKind::Int { value: 0, .. });
        if ascending_from_zero {
            let to = self.expr_str(to);
            writeln!(self.body, "{}for {} := range {} {{", ind, var, to).unwrap();
        } else {
            let n = self.next_tmp();
            let (start, end, step) =
                (format!("start_{}", n), format!("end_{}", n), format!("step_{}", n));
            let from = self.expr_str(from);
            let to = self.expr_str(to);
            writeln!(
                self.body,
                "{}{}, {}, {} := {}, {}, 1",
                ind, start, end, step, from, to
            )
            .unwrap();
            writeln!(self.body, "{}if {} > {} {{", ind, start, end).unwrap();
            writeln!(self.body, "{}\t{} = -1", ind, step).unwrap();
            writeln!(self.body, "{}}}", ind).unwrap();
            let bound = if inclusive {
                format!("{}+{}", end, step)
            } else {
                end.clone()
            };
            writeln!(
                self.body,
                "{}for {} := {}; {} != {}; {} += {} {{",
                ind, var, start, var, bound, var, step
            )
            .unwrap();
        }

        self.indent += 1;
        self.gen_block(body);
        self.indent -= 1;
        writeln!(self.body, "{}}}", ind).unwrap();
    }
}

/// Decomposes a pipe chain into its leftmost value and the stage list.
fn split_pipe<'a>(expr: &'a Expr<'a>) -> (&'a Expr<'a>, Vec<&'a Expr<'a>>) {
    match &expr.kind {
        ExprKind::Pipe { left, right } => {
            let (base, mut stages) = split_pipe(left);
            stages.push(right);
            (base, stages)
        }
        _ => (expr, Vec::new()),
    }
}
