//! Constant folding (§4.8).
//!
//! Ported from `original_source/src/yuho/ast/constant_folder.py`: a bottom-up
//! [`Transformer`] that evaluates arithmetic, boolean, comparison, and
//! string-concatenation sub-expressions whose operands are already literals,
//! replacing them with a single [`LiteralExpr`] carrying the original
//! expression's `id`/span (§3.4 — rewritten nodes are new trees, but they
//! keep the node identity and source location of the expression they
//! replace, so side tables and diagnostics pointing at the pre-fold span
//! still land in the right place).
//!
//! Integer division truncates toward zero (Rust's native `/`), the resolved
//! Open Question of SPEC_FULL.md §A.9 — not Python's flooring `//`. Mixed
//! int/float operands promote to float before folding, matching
//! `analyze::operators`' type-level promotion rule.

use crate::ast::nodes::*;
use crate::ast::transformer::{walk_transform_expr, Transformer};
use crate::span::SourceSpan;

/// Raised only when [`ConstantFolder::strict`] is set and a constant
/// division/modulo by a literal zero is encountered; otherwise such an
/// expression is simply left un-folded for a later stage (type checker or
/// evaluator) to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("division by zero in constant expression")]
pub struct ConstantFoldingError {
    pub span: SourceSpan,
}

/// Bottom-up constant-folding [`Transformer`].
///
/// Construct with [`ConstantFolder::new`] and drive it through
/// [`fold_module`], which also surfaces any [`ConstantFoldingError`]
/// collected in `strict` mode.
pub struct ConstantFolder {
    strict: bool,
    errors: Vec<ConstantFoldingError>,
}

impl ConstantFolder {
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            errors: Vec::new(),
        }
    }

    fn literal_expr(id: NodeId, span: SourceSpan, value: Literal) -> Expr {
        Expr::Literal(LiteralExpr { id, span, value })
    }

    fn fold_binary(&mut self, b: &BinaryExpr) -> Option<Expr> {
        let (Expr::Literal(lhs), Expr::Literal(rhs)) = (b.lhs.as_ref(), b.rhs.as_ref()) else {
            return None;
        };

        match eval_binary(b.op, &lhs.value, &rhs.value) {
            EvalOutcome::Folded(value) => Some(Self::literal_expr(b.id, b.span, value)),
            EvalOutcome::NotFoldable => None,
            EvalOutcome::DivisionByZero => {
                if self.strict {
                    self.errors.push(ConstantFoldingError { span: b.span });
                }
                None
            }
        }
    }

    fn fold_unary(&mut self, u: &UnaryExpr) -> Option<Expr> {
        let Expr::Literal(operand) = u.operand.as_ref() else {
            return None;
        };

        let value = match (u.op, &operand.value) {
            (UnaryOp::Neg, Literal::Int(v)) => Literal::Int(v.checked_neg()?),
            (UnaryOp::Neg, Literal::Float(v)) => Literal::Float(-v),
            (UnaryOp::Not, Literal::Bool(v)) => Literal::Bool(!v),
            _ => return None,
        };
        Some(Self::literal_expr(u.id, u.span, value))
    }
}

impl Transformer for ConstantFolder {
    fn transform_expr(&mut self, expr: &Expr) -> Expr {
        let folded = walk_transform_expr(self, expr);
        match &folded {
            Expr::Binary(b) => self.fold_binary(b).unwrap_or(folded),
            Expr::Unary(u) => self.fold_unary(u).unwrap_or(folded),
            _ => folded,
        }
    }
}

enum EvalOutcome {
    Folded(Literal),
    NotFoldable,
    DivisionByZero,
}

/// The constant folder's own literal-value arithmetic, deliberately separate
/// from `analyze::operators`' operand-*type* table (see that module's doc
/// comment): this function computes the runtime value, not just whether the
/// operator is well-typed for the operands.
fn eval_binary(op: BinaryOp, lhs: &Literal, rhs: &Literal) -> EvalOutcome {
    use BinaryOp::*;
    use Literal::*;

    match (op, lhs, rhs) {
        // Numeric arithmetic, with int/float promotion.
        (Add | Sub | Mul | Div | Mod, Int(a), Int(b)) => eval_int_arith(op, *a, *b),
        (Add | Sub | Mul | Div | Mod, Float(a), Float(b)) => {
            EvalOutcome::Folded(eval_float_arith(op, *a, *b))
        }
        (Add | Sub | Mul | Div | Mod, Int(a), Float(b)) => {
            EvalOutcome::Folded(eval_float_arith(op, *a as f64, *b))
        }
        (Add | Sub | Mul | Div | Mod, Float(a), Int(b)) => {
            EvalOutcome::Folded(eval_float_arith(op, *a, *b as f64))
        }

        // String concatenation.
        (Add, String(a), String(b)) => EvalOutcome::Folded(String(format!("{a}{b}"))),

        // Numeric comparisons.
        (Lt | LtEq | Gt | GtEq, Int(a), Int(b)) => {
            EvalOutcome::Folded(Bool(compare(op, a.partial_cmp(b))))
        }
        (Lt | LtEq | Gt | GtEq, Float(a), Float(b)) => {
            EvalOutcome::Folded(Bool(compare(op, a.partial_cmp(b))))
        }
        (Lt | LtEq | Gt | GtEq, Int(a), Float(b)) => {
            EvalOutcome::Folded(Bool(compare(op, (*a as f64).partial_cmp(b))))
        }
        (Lt | LtEq | Gt | GtEq, Float(a), Int(b)) => {
            EvalOutcome::Folded(Bool(compare(op, a.partial_cmp(&(*b as f64)))))
        }

        // Equality, closed to same-shaped literal pairs.
        (Eq | NotEq, Int(a), Int(b)) => EvalOutcome::Folded(Bool(eq(op, a == b))),
        (Eq | NotEq, Float(a), Float(b)) => EvalOutcome::Folded(Bool(eq(op, a == b))),
        (Eq | NotEq, Bool(a), Bool(b)) => EvalOutcome::Folded(Bool(eq(op, a == b))),
        (Eq | NotEq, String(a), String(b)) => EvalOutcome::Folded(Bool(eq(op, a == b))),

        // Boolean logic.
        (And, Bool(a), Bool(b)) => EvalOutcome::Folded(Bool(*a && *b)),
        (Or, Bool(a), Bool(b)) => EvalOutcome::Folded(Bool(*a || *b)),

        _ => EvalOutcome::NotFoldable,
    }
}

fn eval_int_arith(op: BinaryOp, a: i64, b: i64) -> EvalOutcome {
    match op {
        BinaryOp::Add => match a.checked_add(b) {
            Some(v) => EvalOutcome::Folded(Literal::Int(v)),
            None => EvalOutcome::NotFoldable,
        },
        BinaryOp::Sub => match a.checked_sub(b) {
            Some(v) => EvalOutcome::Folded(Literal::Int(v)),
            None => EvalOutcome::NotFoldable,
        },
        BinaryOp::Mul => match a.checked_mul(b) {
            Some(v) => EvalOutcome::Folded(Literal::Int(v)),
            None => EvalOutcome::NotFoldable,
        },
        BinaryOp::Div => {
            if b == 0 {
                EvalOutcome::DivisionByZero
            } else {
                // Truncating toward zero: Rust's native integer `/`.
                EvalOutcome::Folded(Literal::Int(a / b))
            }
        }
        BinaryOp::Mod => {
            if b == 0 {
                EvalOutcome::DivisionByZero
            } else {
                EvalOutcome::Folded(Literal::Int(a % b))
            }
        }
        _ => EvalOutcome::NotFoldable,
    }
}

fn eval_float_arith(op: BinaryOp, a: f64, b: f64) -> Literal {
    let v = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Mod => a % b,
        _ => unreachable!("eval_float_arith only called for arithmetic operators"),
    };
    Literal::Float(v)
}

fn compare(op: BinaryOp, ordering: Option<std::cmp::Ordering>) -> bool {
    use std::cmp::Ordering::*;
    match (op, ordering) {
        (BinaryOp::Lt, Some(Less)) => true,
        (BinaryOp::LtEq, Some(Less | Equal)) => true,
        (BinaryOp::Gt, Some(Greater)) => true,
        (BinaryOp::GtEq, Some(Greater | Equal)) => true,
        _ => false,
    }
}

fn eq(op: BinaryOp, equal: bool) -> bool {
    if op == BinaryOp::Eq {
        equal
    } else {
        !equal
    }
}

/// Runs the constant folder over `module`, returning the rewritten module.
///
/// `strict` controls [`ConstantFoldingError`] behavior for constant
/// division/modulo by literal zero: `false` (default) silently declines to
/// fold such expressions; `true` reports the first one encountered as an
/// error instead.
pub fn fold_module(module: &Module, strict: bool) -> Result<Module, ConstantFoldingError> {
    let mut folder = ConstantFolder::new(strict);
    let folded = folder.transform_module(module);
    match folder.errors.into_iter().next() {
        Some(err) => Err(err),
        None => Ok(folded),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn span() -> SourceSpan {
        SourceSpan::new(0, 1, 1, 1)
    }

    fn int(v: i64) -> Expr {
        Expr::Literal(LiteralExpr {
            id: NodeId::from_raw(0),
            span: span(),
            value: Literal::Int(v),
        })
    }

    fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary(BinaryExpr {
            id: NodeId::from_raw(1),
            span: span(),
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn empty_module() -> Module {
        Module {
            span: span(),
            source_path: None,
            imports: Vec::new(),
            type_defs: IndexMap::new(),
            function_defs: IndexMap::new(),
            statutes: IndexMap::new(),
            variables: Vec::new(),
            items: Vec::new(),
        }
    }

    #[test]
    fn folds_nested_arithmetic_in_one_pass() {
        // 1 + 2 * 3
        let expr = binary(BinaryOp::Add, int(1), binary(BinaryOp::Mul, int(2), int(3)));
        let mut folder = ConstantFolder::new(false);
        let folded = folder.transform_expr(&expr);
        assert_eq!(
            folded,
            Expr::Literal(LiteralExpr {
                id: NodeId::from_raw(1),
                span: span(),
                value: Literal::Int(7),
            })
        );
    }

    #[test]
    fn division_by_zero_is_skipped_by_default() {
        let expr = binary(BinaryOp::Div, int(1), int(0));
        let mut folder = ConstantFolder::new(false);
        let folded = folder.transform_expr(&expr);
        assert!(matches!(folded, Expr::Binary(_)));
    }

    #[test]
    fn division_by_zero_errors_in_strict_mode() {
        let expr = binary(BinaryOp::Div, int(1), int(0));
        let mut folder = ConstantFolder::new(true);
        folder.transform_expr(&expr);
        assert_eq!(folder.errors.len(), 1);
    }

    #[test]
    fn int_division_truncates_toward_zero() {
        let expr = binary(BinaryOp::Div, int(-7), int(2));
        let mut folder = ConstantFolder::new(false);
        let folded = folder.transform_expr(&expr);
        assert_eq!(
            folded,
            Expr::Literal(LiteralExpr {
                id: NodeId::from_raw(1),
                span: span(),
                value: Literal::Int(-3),
            })
        );
    }

    #[test]
    fn mixed_int_float_promotes_to_float() {
        let expr = binary(
            BinaryOp::Add,
            int(1),
            Expr::Literal(LiteralExpr {
                id: NodeId::from_raw(0),
                span: span(),
                value: Literal::Float(0.5),
            }),
        );
        let mut folder = ConstantFolder::new(false);
        let folded = folder.transform_expr(&expr);
        assert_eq!(
            folded,
            Expr::Literal(LiteralExpr {
                id: NodeId::from_raw(1),
                span: span(),
                value: Literal::Float(1.5),
            })
        );
    }

    #[test]
    fn string_concatenation_folds() {
        let a = Expr::Literal(LiteralExpr {
            id: NodeId::from_raw(0),
            span: span(),
            value: Literal::String("foo".into()),
        });
        let b = Expr::Literal(LiteralExpr {
            id: NodeId::from_raw(0),
            span: span(),
            value: Literal::String("bar".into()),
        });
        let expr = binary(BinaryOp::Add, a, b);
        let mut folder = ConstantFolder::new(false);
        let folded = folder.transform_expr(&expr);
        assert_eq!(
            folded,
            Expr::Literal(LiteralExpr {
                id: NodeId::from_raw(1),
                span: span(),
                value: Literal::String("foobar".into()),
            })
        );
    }

    #[test]
    fn fold_module_is_identity_on_empty_module() {
        let module = empty_module();
        let folded = fold_module(&module, false).unwrap();
        assert_eq!(folded, module);
    }
}
