//! Unreachable match-arm detection.
//!
//! Ported from `original_source/src/yuho/ast/reachability.py`: walk a
//! `match`'s arms in order, and flag an arm as unreachable once the
//! patterns of every *unguarded* arm before it already cover every value
//! the current arm's pattern could match. Guarded arms neither block later
//! arms (their coverage is conditional on the guard) nor are themselves
//! ever reported unreachable (reachability can't be proven false for a
//! pattern whose match is gated by an arbitrary runtime condition).

use super::exhaustiveness::{extract, is_useful, AbstractPattern, PatternMatrix};
use crate::ast::nodes::MatchExpr;
use crate::span::SourceSpan;

#[derive(Debug, Clone, PartialEq)]
pub struct UnreachableArm {
    pub arm_index: usize,
    pub span: SourceSpan,
    pub message: String,
}

/// Reports every arm of `match_expr` whose pattern matches no value left
/// uncovered by the unguarded arms preceding it.
///
/// Matches the original's message format: `match arm #{i} is unreachable
/// (covered by earlier patterns)`, 1-based arm numbering.
pub fn check_reachability(match_expr: &MatchExpr) -> Vec<UnreachableArm> {
    let mut findings = Vec::new();
    let mut matrix = PatternMatrix::new();

    for (i, arm) in match_expr.arms.iter().enumerate() {
        let abstract_pattern = extract(&arm.pattern);

        if !is_useful(&matrix, &abstract_pattern) {
            findings.push(UnreachableArm {
                arm_index: i,
                span: arm.span,
                message: format!("match arm #{} is unreachable (covered by earlier patterns)", i + 1),
            });
        }

        // Guards taint coverage: a guarded arm's pattern is only
        // conditionally handled, so it never contributes to what later
        // arms can treat as already-covered.
        if arm.guard.is_none() {
            matrix.push(abstract_pattern, i);
        }
    }

    findings
}

/// Does `covering` (an earlier, unguarded arm) fully cover `pattern`? Used
/// by the overlap checker to skip pairs reachability already explains.
pub fn fully_covers(covering: &AbstractPattern, pattern: &AbstractPattern) -> bool {
    covering.covers(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::nodes::*;

    fn span() -> SourceSpan {
        SourceSpan::new(0, 1, 1, 1)
    }

    fn bool_lit(v: bool) -> Pattern {
        Pattern::Literal(LiteralPattern {
            span: span(),
            value: Literal::Bool(v),
        })
    }

    fn wildcard() -> Pattern {
        Pattern::Wildcard(WildcardPattern { span: span() })
    }

    fn arm(pattern: Pattern, guard: Option<Expr>) -> MatchArm {
        MatchArm {
            span: span(),
            pattern,
            guard,
            body: Expr::Literal(LiteralExpr {
                id: NodeId::from_raw(0),
                span: span(),
                value: Literal::Int(0),
            }),
        }
    }

    fn match_expr(arms: Vec<MatchArm>) -> MatchExpr {
        MatchExpr {
            id: NodeId::from_raw(0),
            span: span(),
            scrutinee: None,
            arms,
            ensure_exhaustiveness: false,
        }
    }

    #[test]
    fn arm_after_wildcard_is_unreachable() {
        let m = match_expr(vec![arm(wildcard(), None), arm(bool_lit(true), None)]);
        let findings = check_reachability(&m);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].arm_index, 1);
        assert!(findings[0].message.contains("#2"));
    }

    #[test]
    fn duplicate_literal_is_unreachable() {
        let m = match_expr(vec![arm(bool_lit(true), None), arm(bool_lit(true), None)]);
        let findings = check_reachability(&m);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].arm_index, 1);
    }

    #[test]
    fn guarded_wildcard_does_not_block_later_arms() {
        let guard = Expr::Literal(LiteralExpr {
            id: NodeId::from_raw(1),
            span: span(),
            value: Literal::Bool(true),
        });
        let m = match_expr(vec![arm(wildcard(), Some(guard)), arm(bool_lit(true), None)]);
        let findings = check_reachability(&m);
        assert!(findings.is_empty());
    }

    #[test]
    fn no_overlap_is_fully_reachable() {
        let m = match_expr(vec![arm(bool_lit(true), None), arm(bool_lit(false), None)]);
        assert!(check_reachability(&m).is_empty());
    }
}
