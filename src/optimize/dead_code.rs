//! Dead-code elimination (§4.9).
//!
//! Ported from `original_source/src/yuho/ast/dead_code.py`: runs after
//! constant folding (by default — see [`DeadCodeEliminator::fold_constants_first`])
//! and, for every `match` expression bottom-up:
//!
//! 1. drops arms [`check_reachability`](crate::analyze::check_reachability)
//!    reports as unreachable,
//! 2. simplifies a guard that folded down to the literal `TRUE` by dropping
//!    it (making the arm unconditional),
//! 3. collapses the whole match into its body when exactly one catch-all
//!    arm (wildcard or binding, no guard) remains.
//!
//! Each simplification is counted in [`EliminationStats`] for reporting.

use crate::analyze::check_reachability;
use crate::ast::nodes::*;
use crate::ast::transformer::{walk_transform_expr, Transformer};
use crate::optimize::constant_fold::ConstantFolder;

/// Counts of simplifications a [`DeadCodeEliminator`] pass performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EliminationStats {
    pub removed_match_arms: usize,
    pub removed_true_guards: usize,
    pub simplified_matches: usize,
}

/// Dead-code-eliminating [`Transformer`].
pub struct DeadCodeEliminator {
    pub fold_constants_first: bool,
    pub stats: EliminationStats,
}

impl DeadCodeEliminator {
    pub fn new() -> Self {
        Self {
            fold_constants_first: true,
            stats: EliminationStats::default(),
        }
    }

    /// Controls whether [`eliminate_dead_code`] folds constants first (the
    /// default): doing so lets a guard like `true && x` collapse to the
    /// literal `TRUE` before this pass looks for `guard = TRUE` to simplify.
    pub fn fold_constants_first(mut self, value: bool) -> Self {
        self.fold_constants_first = value;
        self
    }

    fn is_true_literal(expr: &Expr) -> bool {
        matches!(
            expr,
            Expr::Literal(LiteralExpr {
                value: Literal::Bool(true),
                ..
            })
        )
    }

    fn simplify_match(&mut self, m: MatchExpr) -> Expr {
        let unreachable: std::collections::HashSet<usize> = check_reachability(&m)
            .into_iter()
            .map(|u| u.arm_index)
            .collect();

        let mut arms = Vec::with_capacity(m.arms.len());
        for (i, arm) in m.arms.into_iter().enumerate() {
            if unreachable.contains(&i) {
                self.stats.removed_match_arms += 1;
                continue;
            }

            let MatchArm {
                span,
                pattern,
                guard,
                body,
            } = arm;
            let guard = match guard {
                Some(g) if Self::is_true_literal(&g) => {
                    self.stats.removed_true_guards += 1;
                    None
                }
                other => other,
            };
            arms.push(MatchArm {
                span,
                pattern,
                guard,
                body,
            });
        }

        if arms.len() == 1 && arms[0].pattern.is_catch_all() && arms[0].guard.is_none() {
            self.stats.simplified_matches += 1;
            return arms.into_iter().next().unwrap().body;
        }

        Expr::Match(Box::new(MatchExpr {
            id: m.id,
            span: m.span,
            scrutinee: m.scrutinee,
            arms,
            ensure_exhaustiveness: m.ensure_exhaustiveness,
        }))
    }
}

impl Default for DeadCodeEliminator {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer for DeadCodeEliminator {
    fn transform_expr(&mut self, expr: &Expr) -> Expr {
        let transformed = walk_transform_expr(self, expr);
        match transformed {
            Expr::Match(m) => self.simplify_match(*m),
            other => other,
        }
    }
}

/// Runs the dead-code eliminator over `module`, optionally folding constants
/// first (see [`DeadCodeEliminator::fold_constants_first`]), and returns the
/// rewritten module alongside the elimination statistics.
pub fn eliminate_dead_code(module: &Module, fold_constants_first: bool) -> (Module, EliminationStats) {
    let base = if fold_constants_first {
        ConstantFolder::new(false).transform_module(module)
    } else {
        module.clone()
    };

    let mut eliminator = DeadCodeEliminator::new().fold_constants_first(fold_constants_first);
    let rewritten = eliminator.transform_module(&base);
    (rewritten, eliminator.stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::SourceSpan;

    fn span() -> SourceSpan {
        SourceSpan::new(0, 1, 1, 1)
    }

    fn int_lit(v: i64) -> Expr {
        Expr::Literal(LiteralExpr {
            id: NodeId::from_raw(0),
            span: span(),
            value: Literal::Int(v),
        })
    }

    fn bool_pattern(v: bool) -> Pattern {
        Pattern::Literal(LiteralPattern {
            span: span(),
            value: Literal::Bool(v),
        })
    }

    fn wildcard() -> Pattern {
        Pattern::Wildcard(WildcardPattern { span: span() })
    }

    fn arm(pattern: Pattern, guard: Option<Expr>, body: Expr) -> MatchArm {
        MatchArm {
            span: span(),
            pattern,
            guard,
            body,
        }
    }

    #[test]
    fn drops_unreachable_arm() {
        let m = MatchExpr {
            id: NodeId::from_raw(1),
            span: span(),
            scrutinee: None,
            arms: vec![
                arm(wildcard(), None, int_lit(1)),
                arm(bool_pattern(true), None, int_lit(2)),
            ],
            ensure_exhaustiveness: false,
        };
        let mut eliminator = DeadCodeEliminator::new();
        let result = eliminator.transform_expr(&Expr::Match(Box::new(m)));
        // Single catch-all arm remains after dropping arm #2, so the whole
        // match collapses to its body.
        assert_eq!(result, int_lit(1));
        assert_eq!(eliminator.stats.removed_match_arms, 1);
        assert_eq!(eliminator.stats.simplified_matches, 1);
    }

    #[test]
    fn removes_true_guard() {
        let guard = Expr::Literal(LiteralExpr {
            id: NodeId::from_raw(0),
            span: span(),
            value: Literal::Bool(true),
        });
        let m = MatchExpr {
            id: NodeId::from_raw(1),
            span: span(),
            scrutinee: None,
            arms: vec![arm(wildcard(), Some(guard), int_lit(1))],
            ensure_exhaustiveness: false,
        };
        let mut eliminator = DeadCodeEliminator::new();
        let result = eliminator.transform_expr(&Expr::Match(Box::new(m)));
        assert_eq!(result, int_lit(1));
        assert_eq!(eliminator.stats.removed_true_guards, 1);
        assert_eq!(eliminator.stats.simplified_matches, 1);
    }

    #[test]
    fn leaves_non_catch_all_single_arm_as_match() {
        let m = MatchExpr {
            id: NodeId::from_raw(1),
            span: span(),
            scrutinee: None,
            arms: vec![arm(bool_pattern(true), None, int_lit(1))],
            ensure_exhaustiveness: false,
        };
        let mut eliminator = DeadCodeEliminator::new();
        let result = eliminator.transform_expr(&Expr::Match(Box::new(m)));
        assert!(matches!(result, Expr::Match(_)));
        assert_eq!(eliminator.stats.simplified_matches, 0);
    }
}
