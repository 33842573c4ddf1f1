//! The immutable, typed AST (§3) and the machinery built over it.
//!
//! - [`nodes`]: the closed set of AST node types rooted at
//!   [`nodes::Module`], plus the literal/type/pattern value types they own.
//! - [`node_id`]: stable per-node identity, used as the key for side
//!   tables (inferred types, elimination stats) instead of mutating nodes.
//! - [`builder`]: lowers the parser's concrete syntax tree into this AST.
//! - [`visitor`]/[`transformer`]: the dual read-only/rewriting traversal
//!   framework (§4.3) every semantic pass and optimizer pass is built on.

pub mod builder;
pub mod node_id;
pub mod nodes;
pub mod transformer;
pub mod visitor;
