//! Exhaustiveness checking for `match` expressions.
//!
//! Ports the pattern-matrix algorithm described in spec.md §4.5. The full
//! `exhaustiveness.py` algorithm body was not present in the retrieval
//! pack (only its export surface in `original_source/src/yuho/ast/__init__.py`),
//! so this module follows spec.md's description directly: patterns are
//! abstracted into a closed [`AbstractPattern`] shape, arms are tested for
//! *usefulness* against the matrix of preceding arms, and a match is
//! exhaustive iff a fresh wildcard is not useful against the full matrix of
//! unguarded arms.
//!
//! [`reachability`](super::reachability) reuses the same `AbstractPattern`/
//! `PatternMatrix`/usefulness machinery — both rest on the same notion of
//! "does this pattern match some value no earlier pattern already covers".

use std::fmt;

use crate::ast::nodes::{Literal, MatchExpr, Pattern, TypeExpr};

/// A pattern reduced to the shape the usefulness algorithm cares about:
/// does it match everything (wildcard), a specific scalar (literal), or a
/// named constructor with sub-patterns (struct)?
#[derive(Debug, Clone, PartialEq)]
pub enum AbstractPattern {
    Wildcard,
    Literal(String),
    Struct {
        name: String,
        children: Vec<AbstractPattern>,
    },
}

impl AbstractPattern {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, AbstractPattern::Wildcard)
    }

    /// Does `self` match every value that `other` matches? Used to skip
    /// overlap-reporting for pairs already flagged by reachability (one
    /// pattern fully subsumes the other).
    pub fn covers(&self, other: &AbstractPattern) -> bool {
        match (self, other) {
            (AbstractPattern::Wildcard, _) => true,
            (_, AbstractPattern::Wildcard) => false,
            (AbstractPattern::Literal(a), AbstractPattern::Literal(b)) => a == b,
            (
                AbstractPattern::Struct { name: n1, children: c1 },
                AbstractPattern::Struct { name: n2, children: c2 },
            ) => n1 == n2 && c1.len() == c2.len() && c1.iter().zip(c2).all(|(a, b)| a.covers(b)),
            _ => false,
        }
    }
}

impl fmt::Display for AbstractPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbstractPattern::Wildcard => write!(f, "_"),
            AbstractPattern::Literal(v) => write!(f, "{v}"),
            AbstractPattern::Struct { name, children } => {
                if children.is_empty() {
                    write!(f, "{name}")
                } else {
                    write!(f, "{name}(")?;
                    for (i, c) in children.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{c}")?;
                    }
                    write!(f, ")")
                }
            }
        }
    }
}

/// Abstracts a concrete [`Pattern`] into the shape the usefulness algorithm
/// operates over. A [`crate::ast::nodes::BindingPattern`] is irrefutable
/// (matches anything), so it abstracts the same as a wildcard.
pub fn extract(pattern: &Pattern) -> AbstractPattern {
    match pattern {
        Pattern::Wildcard(_) | Pattern::Binding(_) => AbstractPattern::Wildcard,
        Pattern::Literal(p) => AbstractPattern::Literal(literal_key(&p.value)),
        Pattern::Struct(s) => AbstractPattern::Struct {
            name: s.name.clone(),
            children: s.fields.iter().map(|f| extract(&f.pattern)).collect(),
        },
    }
}

fn literal_key(value: &Literal) -> String {
    value.to_string()
}

/// One row of a pattern matrix: the (here, single-column) pattern sequence
/// of one arm, plus which source arm it came from.
#[derive(Debug, Clone)]
pub struct PatternRow {
    pub patterns: Vec<AbstractPattern>,
    pub arm_index: usize,
}

/// A pattern matrix: the patterns of every *unguarded* arm considered so
/// far, in source order.
#[derive(Debug, Clone, Default)]
pub struct PatternMatrix {
    pub rows: Vec<PatternRow>,
}

impl PatternMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, pattern: AbstractPattern, arm_index: usize) {
        self.rows.push(PatternRow {
            patterns: vec![pattern],
            arm_index,
        });
    }

    /// Specializes the matrix by a constructor pattern: keeps rows whose
    /// first column is that constructor or a wildcard, splicing the kept
    /// constructor row's children into the new first columns.
    fn specialize(&self, pattern: &AbstractPattern) -> PatternMatrix {
        let mut rows = Vec::new();
        for row in &self.rows {
            let Some(head) = row.patterns.first() else {
                continue;
            };
            match head {
                AbstractPattern::Wildcard => rows.push(PatternRow {
                    patterns: row.patterns[1..].to_vec(),
                    arm_index: row.arm_index,
                }),
                _ if head.covers(pattern) || pattern.covers(head) => {
                    let mut new_patterns = Vec::new();
                    if let AbstractPattern::Struct { children, .. } = head {
                        new_patterns.extend(children.iter().cloned());
                    }
                    new_patterns.extend(row.patterns[1..].iter().cloned());
                    rows.push(PatternRow {
                        patterns: new_patterns,
                        arm_index: row.arm_index,
                    });
                }
                _ => {}
            }
        }
        PatternMatrix { rows }
    }
}

/// `U(M, p)`: is `p` useful against matrix `M`? True iff some value matched
/// by `p` is matched by no row of `M`.
///
/// Matches `original_source/src/yuho/ast/reachability.py`'s
/// `_pattern_useful_in_matrix`: a single-column algorithm (Yuho structs are
/// product types with exactly one constructor, so full Maranget-style
/// signature-completeness reasoning over sum types is unnecessary here).
pub fn is_useful(matrix: &PatternMatrix, pattern: &AbstractPattern) -> bool {
    if matrix.is_empty() {
        return true;
    }
    if !matrix.rows.iter().any(|r| !r.patterns.is_empty()) {
        // Every row has already consumed its only column: fully matched.
        return false;
    }

    if pattern.is_wildcard() {
        // A wildcard is useful unless some row's first column already
        // covers everything (a wildcard or binding of its own).
        return !matrix
            .rows
            .iter()
            .any(|r| r.patterns.first().is_some_and(AbstractPattern::is_wildcard));
    }

    let specialized = matrix.specialize(pattern);
    if specialized.is_empty() {
        return true;
    }

    match pattern {
        AbstractPattern::Struct { children, .. } if !children.is_empty() => {
            let mut current = specialized;
            for child in children {
                if current.rows.is_empty() {
                    return true;
                }
                if !is_useful(&current, child) {
                    return false;
                }
                current = current.specialize(child);
            }
            true
        }
        _ => !specialized.rows.iter().any(|r| r.patterns.is_empty()),
    }
}

/// Result of checking one `match` expression for exhaustiveness.
#[derive(Debug, Clone)]
pub struct ExhaustivenessResult {
    pub exhaustive: bool,
    /// A minimal scrutinee description not matched by any arm, present
    /// only when `exhaustive` is false.
    pub witness: Option<String>,
}

/// Is `ty` a closed type — one with a finite, statically-known set of
/// constructors — per the resolved Open Question in SPEC_FULL.md §A.9?
/// Booleans (two literal constructors) and named structs (a single
/// product-type constructor) are closed; every other builtin has an
/// unbounded domain.
pub fn is_closed_type(ty: &TypeExpr) -> bool {
    matches!(
        ty,
        TypeExpr::Builtin(crate::ast::nodes::BuiltinType::Bool) | TypeExpr::Named(_)
    )
}

/// Checks one match expression's arms for exhaustiveness.
///
/// `scrutinee_type` is the inferred type of the scrutinee, if known.
/// Exhaustiveness is evaluated whenever the type is closed (§A.9) or
/// `ensure_exhaustiveness` is set, matching `node.ensure_exhaustiveness` in
/// the AST plus the caller's own opt-in flag.
pub fn check_exhaustiveness(
    node: &MatchExpr,
    scrutinee_type: Option<&TypeExpr>,
    force: bool,
) -> Option<ExhaustivenessResult> {
    let closed = scrutinee_type.is_some_and(is_closed_type);
    if !(closed || node.ensure_exhaustiveness || force) {
        return None;
    }

    let mut matrix = PatternMatrix::new();
    for (i, arm) in node.arms.iter().enumerate() {
        if arm.guard.is_none() {
            matrix.push(extract(&arm.pattern), i);
        }
    }

    let wildcard = AbstractPattern::Wildcard;
    if !is_useful(&matrix, &wildcard) {
        return Some(ExhaustivenessResult {
            exhaustive: true,
            witness: None,
        });
    }

    let witness = synthesize_witness(&matrix, scrutinee_type);
    Some(ExhaustivenessResult {
        exhaustive: false,
        witness: Some(witness),
    })
}

/// Synthesizes a minimal value not covered by `matrix`, preferring the
/// fewest bindings and wildcards at the deepest positions (§4.5 tie-break).
fn synthesize_witness(matrix: &PatternMatrix, scrutinee_type: Option<&TypeExpr>) -> String {
    if matches!(
        scrutinee_type,
        Some(TypeExpr::Builtin(crate::ast::nodes::BuiltinType::Bool))
    ) {
        let covered: Vec<&str> = matrix
            .rows
            .iter()
            .filter_map(|r| r.patterns.first())
            .filter_map(|p| match p {
                AbstractPattern::Literal(v) => Some(v.as_str()),
                _ => None,
            })
            .collect();
        for candidate in ["FALSE", "TRUE"] {
            if !covered.contains(&candidate) {
                return candidate.to_string();
            }
        }
    }

    if let Some(TypeExpr::Named(name)) = scrutinee_type {
        let has_struct_row = matrix.rows.iter().any(|r| {
            matches!(r.patterns.first(), Some(AbstractPattern::Struct { name: n, .. }) if n == name)
        });
        if !has_struct_row {
            return format!("{name}(..)");
        }
    }

    "_".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::nodes::*;
    use crate::span::SourceSpan;

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

    fn match_expr(arms: Vec<MatchArm>, ensure: bool) -> MatchExpr {
        MatchExpr {
            id: NodeId::from_raw(0),
            span: span(),
            scrutinee: None,
            arms,
            ensure_exhaustiveness: ensure,
        }
    }

    #[test]
    fn bool_match_exhaustive() {
        let m = match_expr(vec![arm(bool_lit(true), None), arm(bool_lit(false), None)], false);
        let result = check_exhaustiveness(
            &m,
            Some(&TypeExpr::Builtin(BuiltinType::Bool)),
            false,
        )
        .unwrap();
        assert!(result.exhaustive);
    }

    #[test]
    fn bool_match_missing_case_reports_witness() {
        let m = match_expr(vec![arm(bool_lit(true), None)], false);
        let result = check_exhaustiveness(
            &m,
            Some(&TypeExpr::Builtin(BuiltinType::Bool)),
            false,
        )
        .unwrap();
        assert!(!result.exhaustive);
        assert_eq!(result.witness.as_deref(), Some("FALSE"));
    }

    #[test]
    fn wildcard_arm_is_exhaustive() {
        let m = match_expr(vec![arm(wildcard(), None)], false);
        let result = check_exhaustiveness(
            &m,
            Some(&TypeExpr::Builtin(BuiltinType::Bool)),
            false,
        )
        .unwrap();
        assert!(result.exhaustive);
    }

    #[test]
    fn open_type_not_checked_without_force() {
        let m = match_expr(vec![arm(bool_lit(true), None)], false);
        assert!(check_exhaustiveness(&m, Some(&TypeExpr::Builtin(BuiltinType::Int)), false).is_none());
    }

    #[test]
    fn witness_not_matched_by_any_arm() {
        let m = match_expr(vec![arm(bool_lit(true), None)], false);
        let result =
            check_exhaustiveness(&m, Some(&TypeExpr::Builtin(BuiltinType::Bool)), false).unwrap();
        assert_ne!(result.witness.as_deref(), Some("TRUE"));
    }
}
