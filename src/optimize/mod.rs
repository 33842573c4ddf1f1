//! Optimizer passes over the built AST.
//!
//! Both passes are [`crate::ast::transformer::Transformer`]s: each produces a
//! **new** AST rather than mutating the one it is given (§3.4's
//! persistent-tree discipline), so a caller that wants both the original and
//! the optimized module can keep the original around untouched.
//!
//! - [`constant_fold`]: bottom-up evaluation of compile-time-constant
//!   arithmetic/boolean/string sub-expressions.
//! - [`dead_code`]: match-arm pruning and collapse, run after constant
//!   folding by default so folded guards (`TRUE`/`FALSE` literals) are
//!   already in place before reachability is recomputed.

pub mod constant_fold;
pub mod dead_code;

pub use constant_fold::{fold_module, ConstantFoldingError, ConstantFolder};
pub use dead_code::{eliminate_dead_code, DeadCodeEliminator, EliminationStats};
