//! Parser infrastructure for the Yuho statute DSL.
//!
//! # Architecture
//!
//! This parser produces a lossless concrete syntax tree (CST) via Rowan's
//! green tree builder. Key design decisions, borrowed from rust-analyzer,
//! rnix-parser, and taplo:
//!
//! - Zero-copy parsing: tokens carry spans, text sliced only when building
//!   tree nodes.
//! - Trivia buffering: whitespace/comments collected, then attached as
//!   leading trivia.
//! - Checkpoint-based wrapping: retroactively wrap nodes for postfix/binary
//!   productions.
//! - Explicit recovery sets: per-production sets determine when to bail vs
//!   consume diagnostics.
//!
//! # Recovery Strategy
//!
//! The parser is resilient — it always produces a tree. Recovery follows
//! these rules:
//!
//! 1. Unknown tokens get wrapped in `SyntaxKind::Error` nodes and consumed.
//! 2. Missing expected tokens emit a diagnostic but don't consume (parent
//!    may handle).
//! 3. Recovery sets define "synchronization points" per production.
//! 4. Fuel exhaustion (`exec_fuel`, `recursion_fuel`) returns an actual
//!    error immediately rather than a diagnostic.

mod core;
mod cst;
mod grammar;
mod lexer;

pub use cst::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken, TokenSet, YuhoLang, token_sets};
pub use core::{DEFAULT_EXEC_FUEL, DEFAULT_RECURSION_FUEL, ParseResult, Parser};
pub use lexer::{Token, lex, token_text};

use std::fs;
use std::path::Path;

use crate::Error;

/// Parses `source` into a [`ParseResult`] using the default fuel limits.
///
/// `file_label` is not stored on the result (the CST and diagnostics are
/// source-relative only); callers attach it when converting diagnostics
/// or spans for display.
pub fn parse(source: &str) -> Result<ParseResult, Error> {
    Parser::new(source, lex(source)).parse()
}

/// Reads `path` and parses its contents.
///
/// Fails with [`FileReadError::NotFound`] or [`FileReadError::InvalidUtf8`]
/// before parsing ever runs; a successful read always proceeds to
/// [`parse`], whose only failure modes are fuel exhaustion.
pub fn parse_file(path: &Path) -> Result<ParseResult, FileReadError> {
    let bytes = fs::read(path).map_err(|source| FileReadError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| FileReadError::InvalidUtf8 {
        path: path.to_path_buf(),
    })?;
    parse(&text).map_err(|source| FileReadError::Fatal { source })
}

/// Failure modes specific to reading a source file from disk, layered on
/// top of [`Error`] (the parser's own fatal-error type).
#[derive(Debug, thiserror::Error)]
pub enum FileReadError {
    #[error("file not found: {path}: {source}")]
    NotFound {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("file is not valid UTF-8: {path}")]
    InvalidUtf8 { path: std::path::PathBuf },
    #[error(transparent)]
    Fatal { source: Error },
}
