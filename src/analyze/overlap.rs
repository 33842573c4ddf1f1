//! Pattern overlap detection.
//!
//! Distinct from [`super::reachability`]: reachability asks "is this arm
//! dead", overlap asks "do these two arms describe the same value", which
//! stays a useful warning even for arm pairs reachability doesn't flag
//! (guarded arms, or arms that are individually reachable but still share
//! coverage). Ported from `original_source/src/yuho/ast/overlap.py`:
//! every unordered pair of arms is compared, skipping a pair where one
//! pattern already fully [`AbstractPattern::covers`] the other *and*
//! neither arm is guarded (that case is reachability's to report); a
//! guarded arm's coverage is conditional on a runtime guard, so per
//! `overlap.py:119-120` a guarded arm on either side of a pair is always
//! reported as overlapping, regardless of what its pattern shape would
//! otherwise decide.

use super::exhaustiveness::{extract, AbstractPattern};
use crate::ast::nodes::MatchExpr;
use crate::span::SourceSpan;

#[derive(Debug, Clone, PartialEq)]
pub struct OverlapWarning {
    pub first_arm_index: usize,
    pub second_arm_index: usize,
    pub span: SourceSpan,
    pub message: String,
}

/// Reports every pair of arms in `match_expr` whose patterns can match the
/// same value, in pair order `(i, j)` with `i < j`.
pub fn check_overlap(match_expr: &MatchExpr) -> Vec<OverlapWarning> {
    let abstracted: Vec<(AbstractPattern, bool)> = match_expr
        .arms
        .iter()
        .map(|a| (extract(&a.pattern), a.guard.is_some()))
        .collect();

    let mut findings = Vec::new();
    for i in 0..abstracted.len() {
        for j in (i + 1)..abstracted.len() {
            let (a, a_guarded) = &abstracted[i];
            let (b, b_guarded) = &abstracted[j];
            let either_guarded = *a_guarded || *b_guarded;

            if !either_guarded && (a.covers(b) || b.covers(a)) {
                // One pattern fully subsumes the other and neither arm's
                // coverage is conditional on a guard; reachability already
                // explains this pair.
                continue;
            }

            let description = describe_overlap(a, b, either_guarded);

            if let Some(description) = description {
                findings.push(OverlapWarning {
                    first_arm_index: i,
                    second_arm_index: j,
                    span: match_expr.arms[j].span,
                    message: format!("arms #{} and #{} overlap: {description}", i + 1, j + 1),
                });
            }
        }
    }
    findings
}

/// Synthesizes a human-readable description of why `a` and `b` overlap, or
/// `None` if they provably cannot match the same value.
///
/// `either_guarded` short-circuits to a conservative "overlap" verdict
/// regardless of pattern shape: a guard is an arbitrary runtime condition,
/// so whether a guarded arm's pattern actually excludes the other's values
/// can never be decided statically (spec §4.7, `overlap.py:119-120`).
fn describe_overlap(a: &AbstractPattern, b: &AbstractPattern, either_guarded: bool) -> Option<String> {
    if either_guarded {
        return Some("at least one arm is guarded, so overlap cannot be ruled out statically".to_string());
    }
    match (a, b) {
        (AbstractPattern::Wildcard, AbstractPattern::Wildcard) => {
            Some("both are catch-all patterns".to_string())
        }
        (AbstractPattern::Wildcard, other) | (other, AbstractPattern::Wildcard) => {
            Some(format!("wildcard overlaps with {other}"))
        }
        (AbstractPattern::Literal(x), AbstractPattern::Literal(y)) => {
            if x == y {
                Some(format!("duplicate literal pattern: {x}"))
            } else {
                None
            }
        }
        (
            AbstractPattern::Struct { name: n1, children: c1 },
            AbstractPattern::Struct { name: n2, children: c2 },
        ) => {
            if n1 != n2 {
                return None;
            }
            if c1.iter().zip(c2).all(|(x, y)| describe_overlap(x, y, false).is_some()) {
                Some(format!("both match constructor '{n1}'"))
            } else {
                None
            }
        }
        _ => Some("patterns can match the same value".to_string()),
    }
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

    fn struct_pat(name: &str, fields: Vec<FieldPattern>) -> Pattern {
        Pattern::Struct(StructPattern {
            span: span(),
            name: name.to_string(),
            fields,
        })
    }

    fn field(name: &str, pattern: Pattern) -> FieldPattern {
        FieldPattern {
            span: span(),
            name: name.to_string(),
            pattern: Box::new(pattern),
        }
    }

    fn binding(name: &str) -> Pattern {
        Pattern::Binding(BindingPattern {
            span: span(),
            name: name.to_string(),
        })
    }

    fn arm(pattern: Pattern) -> MatchArm {
        MatchArm {
            span: span(),
            pattern,
            guard: None,
            body: Expr::Literal(LiteralExpr {
                id: NodeId::from_raw(0),
                span: span(),
                value: Literal::Int(0),
            }),
        }
    }

    fn guarded_arm(pattern: Pattern) -> MatchArm {
        MatchArm {
            guard: Some(Expr::Literal(LiteralExpr {
                id: NodeId::from_raw(1),
                span: span(),
                value: Literal::Bool(true),
            })),
            ..arm(pattern)
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
    fn duplicate_literals_overlap() {
        let m = match_expr(vec![arm(bool_lit(true)), arm(bool_lit(true))]);
        let findings = check_overlap(&m);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("duplicate literal pattern: TRUE"));
    }

    #[test]
    fn distinct_literals_do_not_overlap() {
        let m = match_expr(vec![arm(bool_lit(true)), arm(bool_lit(false))]);
        assert!(check_overlap(&m).is_empty());
    }

    #[test]
    fn wildcard_and_binding_are_both_catch_all() {
        let m = match_expr(vec![arm(binding("x")), arm(Pattern::Wildcard(WildcardPattern { span: span() }))]);
        let findings = check_overlap(&m);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("both are catch-all patterns"));
    }

    #[test]
    fn struct_covering_struct_is_left_to_reachability() {
        let m = match_expr(vec![
            arm(struct_pat("Foo", vec![field("x", binding("a"))])),
            arm(struct_pat("Foo", vec![field("x", binding("a"))])),
        ]);
        // Identical struct shapes: one fully covers the other, so overlap
        // defers to reachability instead of double-reporting.
        assert!(check_overlap(&m).is_empty());
    }

    #[test]
    fn struct_same_constructor_distinguishable_fields_do_not_overlap() {
        let m = match_expr(vec![
            arm(struct_pat("Foo", vec![field("x", bool_lit(true))])),
            arm(struct_pat("Foo", vec![field("x", bool_lit(false))])),
        ]);
        assert!(check_overlap(&m).is_empty());
    }

    #[test]
    fn struct_with_one_mutually_exclusive_field_does_not_overlap() {
        // x can never match both arms even though y could; overlap requires
        // *every* field to overlap, not just one.
        let m = match_expr(vec![
            arm(struct_pat(
                "Foo",
                vec![field("x", bool_lit(true)), field("y", binding("a"))],
            )),
            arm(struct_pat(
                "Foo",
                vec![field("x", bool_lit(false)), field("y", binding("b"))],
            )),
        ]);
        assert!(check_overlap(&m).is_empty());
    }

    #[test]
    fn guarded_arm_with_otherwise_disjoint_pattern_still_overlaps() {
        // Without the guard these two literal patterns would never overlap
        // (TRUE != FALSE); the guard makes coverage conditional, so overlap
        // must be reported rather than ruled out statically.
        let m = match_expr(vec![guarded_arm(bool_lit(true)), arm(bool_lit(false))]);
        let findings = check_overlap(&m);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("guarded"));
    }

    #[test]
    fn guarded_arm_covering_an_earlier_pattern_is_still_reported() {
        // Identical struct shapes would normally be left to reachability
        // (one fully covers the other), but a guarded arm's coverage can't
        // be assumed, so overlap must still flag the pair.
        let m = match_expr(vec![
            guarded_arm(struct_pat("Foo", vec![field("x", binding("a"))])),
            arm(struct_pat("Foo", vec![field("x", binding("a"))])),
        ]);
        let findings = check_overlap(&m);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("guarded"));
    }
}
