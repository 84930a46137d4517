//! Placeholder-to-generic substitution for stdlib sources.
//!
//! Stdlib iterator/slice/fetch/json files use the reserved placeholder type
//! names `any` and `any2` in signatures. For those files the generator
//! synthesizes real type parameters:
//!
//! - `any` becomes `T`, unconstrained
//! - `any2` becomes `K` (`comparable` when used as a map key) or `U` when it
//!   appears in an iterator file's return types
//!
//! Functions that would have to produce a zero value *typed as* the bare
//! generic parameter stay non-generic unless they are on the curated
//! allow-list, matching what the runtime library actually ships.

use kukicha_language::ast::{FuncDecl, TypeExpr, TypeKind};
use rustc_hash::FxHashMap;

use super::{Generator, StdlibKind};

/// Functions allowed to return a bare generic value.
const ZERO_RETURN_ALLOWLIST: &[&str] = &[
    "First", "Last", "Find", "At", "Reduce", "Fold", "Min", "Max", "Sum",
];

/// Active generic substitution for one function.
#[derive(Debug, Clone)]
pub struct GenericCtx {
    params: Vec<(String, String)>,
    subst: FxHashMap<String, String>,
}

impl GenericCtx {
    /// The synthesized parameter for a placeholder name, if any.
    pub fn substitute(&self, name: &str) -> Option<&str> {
        self.subst.get(name).map(|s| s.as_str())
    }

    /// Renders `[T any, K comparable]` for the function header.
    pub fn param_list(&self) -> String {
        let rendered: Vec<String> = self
            .params
            .iter()
            .map(|(name, constraint)| format!("{} {}", name, constraint))
            .collect();
        format!("[{}]", rendered.join(", "))
    }
}

#[derive(Default)]
struct Scan {
    any: bool,
    any2: bool,
    any2_as_map_key: bool,
}

/// Decides whether `f` becomes generic and with which parameters.
pub(super) fn infer<'a, 'int>(
    generator: &Generator<'a, 'int>,
    f: &'a FuncDecl<'a>,
) -> Option<GenericCtx> {
    let mut scan = Scan::default();
    for param in f.params {
        if let Some(ty) = param.ty {
            scan_type(generator, ty, &mut scan, false);
        }
    }
    let mut any2_in_results = false;
    for result in f.results {
        let before = scan.any2;
        scan_type(generator, result, &mut scan, false);
        if scan.any2 && !before {
            any2_in_results = true;
        }
    }

    if !scan.any && !scan.any2 {
        return None;
    }

    // A bare placeholder result means the body must conjure a zero value of
    // the parameter; only allow-listed functions do that.
    let returns_bare_placeholder = f.results.iter().any(|r| {
        matches!(&r.kind, TypeKind::Named(sym)
            if matches!(generator.resolve(*sym), "any" | "any2"))
    });
    if returns_bare_placeholder
        && !ZERO_RETURN_ALLOWLIST.contains(&generator.resolve(f.name))
    {
        return None;
    }

    let mut params = Vec::new();
    let mut subst = FxHashMap::default();
    if scan.any {
        params.push(("T".to_string(), "any".to_string()));
        subst.insert("any".to_string(), "T".to_string());
    }
    if scan.any2 {
        let name = if generator.stdlib_kind == StdlibKind::Iter && any2_in_results {
            "U"
        } else {
            "K"
        };
        let constraint = if scan.any2_as_map_key {
            "comparable"
        } else {
            "any"
        };
        params.push((name.to_string(), constraint.to_string()));
        subst.insert("any2".to_string(), name.to_string());
    }

    Some(GenericCtx { params, subst })
}

fn scan_type<'a, 'int>(
    generator: &Generator<'a, 'int>,
    ty: &TypeExpr<'a>,
    scan: &mut Scan,
    as_map_key: bool,
) {
    match &ty.kind {
        TypeKind::Named(sym) => match generator.resolve(*sym) {
            "any" => scan.any = true,
            "any2" => {
                scan.any2 = true;
                if as_map_key {
                    scan.any2_as_map_key = true;
                }
            }
            _ => {}
        },
        TypeKind::Qualified { .. } => {}
        TypeKind::List(elem) | TypeKind::Channel(elem) | TypeKind::Variadic(elem) => {
            scan_type(generator, elem, scan, false)
        }
        TypeKind::Reference(target) => scan_type(generator, target, scan, false),
        TypeKind::Map { key, value } => {
            scan_type(generator, key, scan, true);
            scan_type(generator, value, scan, false);
        }
        TypeKind::Func { params, results } => {
            for param in params.iter() {
                scan_type(generator, param, scan, false);
            }
            for result in results.iter() {
                scan_type(generator, result, scan, false);
            }
        }
    }
}
