//! Security lints over call sites.
//!
//! Pattern-matched checks against known-dangerous stdlib calls. Each match
//! is a hard error naming the unsafe call and its safe alternative in the
//! same sentence. Calls reached through a pipe are checked with their
//! argument positions adjusted for the piped value.

use crate::ast::{Arg, Expr, ExprKind};

use super::Analyzer;

/// Entry point from the analyzer's call walk. `piped_args` counts leading
/// arguments threaded in by an enclosing pipe.
pub(super) fn check_call<'a, 'int>(
    an: &mut Analyzer<'a, 'int>,
    call: &Expr<'a>,
    callee: &Expr<'a>,
    args: &[Arg<'a>],
    piped_args: usize,
) {
    let (package, function) = match qualified_callee(an, callee) {
        Some(pair) => pair,
        None => return,
    };

    match (package.as_str(), function.as_str()) {
        ("pg", name)
            if matches!(name, "Query" | "QueryRow" | "Exec")
                || (name.starts_with("Tx")
                    && matches!(&name[2..], "Query" | "QueryRow" | "Exec")) =>
        {
            check_sql(an, call, &function, args, piped_args);
        }
        ("http", "HTML") => {
            if last_arg_is_dynamic(args) {
                an.error(
                    "XSS risk: non-literal content passed to http.HTML; use http.SafeHTML",
                    call.span,
                );
            }
        }
        ("fetch", "Get" | "Post" | "New") => {
            if an.current_fn_is_handler {
                an.error(
                    format!(
                        "SSRF risk: fetch.{} inside an HTTP handler can reach internal hosts; use fetch.SafeGet",
                        function
                    ),
                    call.span,
                );
            }
        }
        ("files", _) => {
            if an.current_fn_is_handler {
                an.error(
                    format!(
                        "path traversal risk: files.{} inside an HTTP handler; use a sandboxed helper",
                        function
                    ),
                    call.span,
                );
            }
        }
        ("shell", "Run") => {
            if args.iter().any(|a| !a.value.is_plain_string()) {
                an.error(
                    "command injection risk: non-literal argument to shell.Run; use the multi-argument shell.RunArgs",
                    call.span,
                );
            }
        }
        ("http", "Redirect" | "RedirectPermanent") => {
            if an.in_stdlib {
                return;
            }
            if last_arg_is_dynamic(args) {
                an.error(
                    format!(
                        "open redirect risk: non-literal URL passed to http.{}; use http.SafeRedirect with an allow-list",
                        function
                    ),
                    call.span,
                );
            }
        }
        _ => {}
    }
}

/// The SQL text of a `pg` call sits after the pool/tx handle. With a piped
/// value prepended, the written argument positions shift left accordingly.
fn check_sql<'a, 'int>(
    an: &mut Analyzer<'a, 'int>,
    call: &Expr<'a>,
    function: &str,
    args: &[Arg<'a>],
    piped_args: usize,
) {
    let sql_position = 1usize.saturating_sub(piped_args);
    let sql_arg = args.iter().filter(|a| a.name.is_none()).nth(sql_position);
    if let Some(arg) = sql_arg {
        if matches!(
            arg.value.kind,
            ExprKind::Str {
                interpolated: true,
                ..
            }
        ) {
            an.error(
                format!(
                    "SQL injection risk: interpolated string passed to pg.{}; use $1, $2 parameter placeholders",
                    function
                ),
                call.span,
            );
        }
    }
}

/// Resolves `pkg.Function` callees; anything else is not lint-relevant.
fn qualified_callee<'a, 'int>(
    an: &Analyzer<'a, 'int>,
    callee: &Expr<'a>,
) -> Option<(String, String)> {
    match &callee.kind {
        ExprKind::Field { object, name } => match object.kind {
            ExprKind::Ident(package) => Some((
                an.interner.resolve(package).to_string(),
                an.interner.resolve(*name).to_string(),
            )),
            _ => None,
        },
        _ => None,
    }
}

/// The content/URL argument of the writer-style calls is the final one.
fn last_arg_is_dynamic(args: &[Arg<'_>]) -> bool {
    args.last()
        .map(|a| !a.value.is_plain_string())
        .unwrap_or(false)
}
