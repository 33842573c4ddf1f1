//! Yuho: compiler core for a small DSL that encodes legal statutes as
//! structured, analyzable, and transpilable data.
//!
//! # Pipeline
//!
//! ```text
//! source text -> [parser] -> CST + parse diagnostics
//!             -> [ast]    -> AST + build diagnostics
//!             -> [analyze]-> type table + semantic diagnostics
//!             -> [optimize] (optional) -> optimized AST
//!             -> [transpile] -> target-format string
//! ```
//!
//! [`service::analyze_source`] and [`service::analyze_file`] compose the
//! first three stages into a single call with per-stage timing and
//! structured, non-panicking error reporting.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod analyze;
pub mod ast;
pub mod diagnostics;
pub mod optimize;
pub mod parser;
pub mod service;
pub mod span;
pub mod transpile;

pub use diagnostics::{Diagnostics, DiagnosticsPrinter, Severity};
pub use span::SourceSpan;

/// Errors that can occur during parsing.
///
/// These are *fatal* errors only: exhaustion of the fuel limits that bound
/// parser work on pathological input. Ordinary syntax errors are reported
/// as [`Diagnostics`] alongside a still-produced (partial) tree, not as
/// `Err` here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Execution fuel exhausted (too many parser operations on one input).
    #[error("execution limit exceeded")]
    ExecFuelExhausted,

    /// Recursion fuel exhausted (input nested too deeply).
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,
}

/// Result type for fallible crate operations whose only failure mode is a
/// fatal, non-recoverable condition (see [`Error`]).
pub type Result<T> = std::result::Result<T, Error>;
