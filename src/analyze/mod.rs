//! Semantic analysis passes over the built AST.
//!
//! - [`operators`]: the binary/unary operator type table shared by
//!   [`type_check`] and [`crate::optimize::constant_fold`].
//! - [`type_check`]: bottom-up type inference plus the checking pass that
//!   reports mismatches, unresolved names, and arity errors.
//! - [`exhaustiveness`]: pattern-matrix coverage checking for `match`
//!   expressions over closed types.
//! - [`reachability`]: flags `match` arms no value can reach.
//! - [`overlap`]: flags `match` arm pairs that can match the same value.

pub mod exhaustiveness;
pub mod operators;
pub mod overlap;
pub mod reachability;
pub mod type_check;

pub use exhaustiveness::{check_exhaustiveness, ExhaustivenessResult};
pub use overlap::{check_overlap, OverlapWarning};
pub use reachability::{check_reachability, UnreachableArm};
pub use type_check::{check_types, infer_types, TypeInferenceResult};

use crate::ast::nodes::{Expr, Module};
use crate::diagnostics::Diagnostics;

/// Runs every semantic pass over `module` and returns the combined
/// diagnostics plus the type table, matching the "Semantic Analyzer"
/// component boundary (§4.4-§4.7): type checking first (so exhaustiveness
/// and overlap can use inferred scrutinee types), then per-match
/// exhaustiveness/reachability/overlap over every `match` expression the
/// module contains.
pub fn analyze(module: &Module) -> (Diagnostics, TypeInferenceResult) {
    let mut diagnostics = Diagnostics::new();
    let inference = check_types(module, &mut diagnostics);

    for match_expr in collect_matches(module) {
        let scrutinee_ty = match_expr
            .scrutinee
            .as_ref()
            .and_then(|s| inference.get(s.id()).cloned());

        if let Some(result) = check_exhaustiveness(match_expr, scrutinee_ty.as_ref(), false) {
            if !result.exhaustive {
                let witness = result.witness.as_deref().unwrap_or("_");
                diagnostics
                    .error_staged(
                        crate::diagnostics::DiagnosticStage::Semantic,
                        format!("match is not exhaustive: pattern '{witness}' is not covered"),
                        match_expr.span.range(),
                    )
                    .emit();
            }
        }

        for arm in check_reachability(match_expr) {
            diagnostics
                .warning_staged(crate::diagnostics::DiagnosticStage::Semantic, arm.message, arm.span.range())
                .emit();
        }

        for overlap in check_overlap(match_expr) {
            diagnostics
                .warning_staged(
                    crate::diagnostics::DiagnosticStage::Semantic,
                    overlap.message,
                    overlap.span.range(),
                )
                .emit();
        }
    }

    (diagnostics, inference)
}

/// Every `match` expression in `module`, in traversal order.
///
/// The `Visitor` trait's `visit_expr` takes `&Expr` without carrying the
/// caller's lifetime through its return type, so matches are collected
/// with a small manual walk that keeps borrows tied to `module` directly
/// rather than through the visitor framework.
fn collect_matches(module: &Module) -> Vec<&crate::ast::nodes::MatchExpr> {
    let mut out = Vec::new();
    for def in module.function_defs.values() {
        for stmt in &def.body.stmts {
            walk_stmt_for_matches(stmt, &mut out);
        }
    }
    for var in &module.variables {
        walk_for_matches(&var.value, &mut out);
    }
    for statute in module.statutes.values() {
        for def in &statute.definitions {
            walk_for_matches(&def.value, &mut out);
        }
        for element in &statute.elements {
            walk_for_matches(&element.description, &mut out);
        }
        for illustration in &statute.illustrations {
            if let Some(body) = &illustration.body {
                for stmt in &body.stmts {
                    walk_stmt_for_matches(stmt, &mut out);
                }
            }
        }
    }
    out
}

fn walk_for_matches<'m>(expr: &'m Expr, out: &mut Vec<&'m crate::ast::nodes::MatchExpr>) {
    match expr {
        Expr::Match(m) => {
            if let Some(scrutinee) = &m.scrutinee {
                walk_for_matches(scrutinee, out);
            }
            for arm in &m.arms {
                if let Some(guard) = &arm.guard {
                    walk_for_matches(guard, out);
                }
                walk_for_matches(&arm.body, out);
            }
            out.push(m);
        }
        Expr::FieldAccess(e) => walk_for_matches(&e.base, out),
        Expr::IndexAccess(e) => {
            walk_for_matches(&e.base, out);
            walk_for_matches(&e.index, out);
        }
        Expr::Call(e) => {
            for arg in &e.args {
                walk_for_matches(arg, out);
            }
        }
        Expr::Binary(e) => {
            walk_for_matches(&e.lhs, out);
            walk_for_matches(&e.rhs, out);
        }
        Expr::Unary(e) => walk_for_matches(&e.operand, out),
        Expr::StructLiteral(e) => {
            for field in &e.fields {
                walk_for_matches(&field.value, out);
            }
        }
        Expr::Identifier(_) | Expr::Literal(_) | Expr::Pass(_) => {}
    }
}

fn walk_stmt_for_matches<'m>(stmt: &'m crate::ast::nodes::Stmt, out: &mut Vec<&'m crate::ast::nodes::MatchExpr>) {
    use crate::ast::nodes::Stmt;

    match stmt {
        Stmt::VariableDecl(s) => walk_for_matches(&s.value, out),
        Stmt::Assignment(s) => {
            walk_for_matches(&s.target, out);
            walk_for_matches(&s.value, out);
        }
        Stmt::Return(s) => {
            if let Some(value) = &s.value {
                walk_for_matches(value, out);
            }
        }
        Stmt::Pass(_) => {}
        Stmt::Expression(s) => walk_for_matches(&s.expr, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::nodes::*;
    use crate::span::SourceSpan;
    use indexmap::IndexMap;

    fn span() -> SourceSpan {
        SourceSpan::new(0, 1, 1, 1)
    }

    #[test]
    fn empty_module_analyzes_cleanly() {
        let module = Module {
            span: span(),
            source_path: None,
            imports: Vec::new(),
            type_defs: IndexMap::new(),
            function_defs: IndexMap::new(),
            statutes: IndexMap::new(),
            variables: Vec::new(),
            items: Vec::new(),
        };
        let (diagnostics, _) = analyze(&module);
        assert!(diagnostics.is_empty());
    }
}
