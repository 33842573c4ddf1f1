//! Stable node identity, independent of where a node lives in memory.
//!
//! Grounded on `plotnik-compiler`'s `DefId` idiom (`analyze::type_check::symbol`):
//! a `u32` newtype with `from_raw`/`as_u32` conversions, used as a side-table
//! key instead of a pointer. AST nodes never cross-reference each other by
//! pointer (see the "avoid cyclic references" design note); a `NodeId` is
//! the handle analyses use to attach metadata (inferred types, elimination
//! stats) without mutating the node itself.

use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out strictly increasing [`NodeId`]s during a single AST build.
///
/// One generator is created per [`super::builder::AstBuilder`] call; ids are
/// never reused across builds, so `NodeId` equality implies "same node from
/// the same build", not just "same numeric id".
#[derive(Debug)]
pub struct NodeIdGenerator {
    next: AtomicU32,
}

impl NodeIdGenerator {
    pub fn new() -> Self {
        Self {
            next: AtomicU32::new(0),
        }
    }

    pub fn next(&self) -> NodeId {
        NodeId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for NodeIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
