//! The shared binary/unary operator table.
//!
//! Per the "shared operator table hazard" design note (spec.md §9 /
//! SPEC_FULL.md §4.4): both the type checker ([`super::type_check`]) and the
//! constant folder ([`crate::optimize::constant_fold`]) must agree on what
//! each operator accepts and what it produces. Rather than encode that
//! twice, both import [`binary_result_type`]/[`unary_result_type`] from
//! here.
//!
//! Only the *type-level* contract lives in this module (operand types to
//! result type); the constant folder additionally needs the concrete
//! runtime semantics (e.g. truncating integer division), which it computes
//! directly against [`crate::ast::nodes::Literal`] values rather than
//! through this table — duplicating only the arithmetic Rust's own
//! operators already give it for free.

use crate::ast::nodes::{BinaryOp, BuiltinType, TypeExpr, UnaryOp};

/// Is `ty` one of the two numeric builtins int/float?
fn is_numeric(ty: &TypeExpr) -> bool {
    matches!(
        ty,
        TypeExpr::Builtin(BuiltinType::Int) | TypeExpr::Builtin(BuiltinType::Float)
    )
}

fn is_float(ty: &TypeExpr) -> bool {
    matches!(ty, TypeExpr::Builtin(BuiltinType::Float))
}

fn builtin(b: BuiltinType) -> TypeExpr {
    TypeExpr::Builtin(b)
}

/// Computes the result type of `lhs op rhs`, or `None` if the operator does
/// not accept that pair of operand types.
///
/// `int op float` (and vice-versa) promotes to float, matching §4.4's
/// "unification is invariant; no implicit coercion other than `int -> float`
/// when an operand is explicitly floating" rule, and §4.8's "mixed int/float
/// operands promote to float before folding".
pub fn binary_result_type(op: BinaryOp, lhs: &TypeExpr, rhs: &TypeExpr) -> Option<TypeExpr> {
    use BinaryOp::*;

    match op {
        Add | Sub | Mul | Div | Mod => {
            if is_numeric(lhs) && is_numeric(rhs) {
                if is_float(lhs) || is_float(rhs) {
                    Some(builtin(BuiltinType::Float))
                } else {
                    Some(builtin(BuiltinType::Int))
                }
            } else if op == Add
                && matches!(lhs, TypeExpr::Builtin(BuiltinType::String))
                && matches!(rhs, TypeExpr::Builtin(BuiltinType::String))
            {
                // String `+` concatenation (§4.6 operator closed set).
                Some(builtin(BuiltinType::String))
            } else {
                None
            }
        }
        Lt | LtEq | Gt | GtEq => {
            if is_numeric(lhs) && is_numeric(rhs) {
                Some(builtin(BuiltinType::Bool))
            } else {
                None
            }
        }
        Eq | NotEq => {
            // Comparison accepts any pair of like-shaped operands; exact
            // operand-type agreement is the type checker's job (§4.4), not
            // this table's.
            Some(builtin(BuiltinType::Bool))
        }
        And | Or => {
            if matches!(lhs, TypeExpr::Builtin(BuiltinType::Bool))
                && matches!(rhs, TypeExpr::Builtin(BuiltinType::Bool))
            {
                Some(builtin(BuiltinType::Bool))
            } else {
                None
            }
        }
    }
}

/// Computes the result type of `op operand`, or `None` if not accepted.
pub fn unary_result_type(op: UnaryOp, operand: &TypeExpr) -> Option<TypeExpr> {
    match op {
        UnaryOp::Neg => {
            if is_numeric(operand) {
                Some(operand.clone())
            } else {
                None
            }
        }
        UnaryOp::Not => {
            if matches!(operand, TypeExpr::Builtin(BuiltinType::Bool)) {
                Some(builtin(BuiltinType::Bool))
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_plus_int_is_int() {
        let int = builtin(BuiltinType::Int);
        assert_eq!(
            binary_result_type(BinaryOp::Add, &int, &int),
            Some(builtin(BuiltinType::Int))
        );
    }

    #[test]
    fn int_plus_float_promotes() {
        let int = builtin(BuiltinType::Int);
        let float = builtin(BuiltinType::Float);
        assert_eq!(
            binary_result_type(BinaryOp::Add, &int, &float),
            Some(builtin(BuiltinType::Float))
        );
    }

    #[test]
    fn string_concat() {
        let s = builtin(BuiltinType::String);
        assert_eq!(
            binary_result_type(BinaryOp::Add, &s, &s),
            Some(builtin(BuiltinType::String))
        );
    }

    #[test]
    fn bool_and_requires_bool_operands() {
        let b = builtin(BuiltinType::Bool);
        let i = builtin(BuiltinType::Int);
        assert_eq!(
            binary_result_type(BinaryOp::And, &b, &b),
            Some(builtin(BuiltinType::Bool))
        );
        assert_eq!(binary_result_type(BinaryOp::And, &b, &i), None);
    }

    #[test]
    fn unary_not_requires_bool() {
        let b = builtin(BuiltinType::Bool);
        assert_eq!(
            unary_result_type(UnaryOp::Not, &b),
            Some(builtin(BuiltinType::Bool))
        );
        assert_eq!(unary_result_type(UnaryOp::Not, &builtin(BuiltinType::Int)), None);
    }
}
