//! The analysis service (§4.11): the single façade every external
//! consumer (CLI, LSP, MCP) goes through. Composes parse -> AST build ->
//! semantic analysis with per-stage timing, never raising for a
//! user-recoverable failure (missing file, syntax error, type error) —
//! those are recorded structurally in [`AnalysisResult::errors`] instead.
//!
//! Grounded on `original_source/src/yuho/services/analysis.py`: the same
//! two entry points (`analyze_file`/`analyze_source`), the same
//! `AnalysisError`/`ASTSummary`/`SemanticSummary`/`AnalysisResult` shape,
//! and the same "each stage timed independently, short-circuit on
//! failure" control flow. `perf_counter()` becomes [`std::time::Instant`];
//! the dataclasses become plain structs with a `to_dict`-equivalent
//! [`serde::Serialize`] derive, since a Rust JSON consumer wants
//! `serde_json::to_value` rather than a hand-written dict builder.

use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use crate::ast::builder::AstBuilder;
use crate::ast::nodes::Module;
use crate::diagnostics::DiagnosticStage;
use crate::parser::{self, SyntaxNode};
use crate::span::SourceSpan;

/// A location in source text, round-tripped through [`SourceSpan`] plus the
/// file label the caller supplied (§6.2's `location` JSON shape).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Location {
    fn from_span(file: &str, span: SourceSpan, source: &str) -> Self {
        let (end_line, end_col) = span.end_line_column(source);
        Self {
            file: file.to_string(),
            line: span.line,
            col: span.column,
            end_line,
            end_col,
        }
    }
}

/// A single structured failure from any pipeline stage (§7's four-kind
/// error taxonomy, flattened into one shape for the facade).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisError {
    pub stage: &'static str,
    pub message: String,
    pub error_code: &'static str,
    pub location: Option<Location>,
    pub node_type: Option<&'static str>,
}

impl AnalysisError {
    fn new(stage: &'static str, error_code: &'static str, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            error_code,
            location: None,
            node_type: None,
        }
    }

    fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    fn with_node_type(mut self, node_type: &'static str) -> Self {
        self.node_type = Some(node_type);
        self
    }
}

/// Structural counts over a built [`Module`] (§4.11), matching the
/// original's `ASTSummary.from_module` field set one for one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AstSummary {
    pub imports: usize,
    pub structs: usize,
    pub functions: usize,
    pub statutes: usize,
    pub variables: usize,
    pub references: usize,
    pub assertions: usize,
    pub definitions: usize,
    pub elements: usize,
    pub penalties: usize,
    pub illustrations: usize,
    pub total_nodes: usize,
}

impl AstSummary {
    pub fn from_module(module: &Module) -> Self {
        let definitions = module.statutes.values().map(|s| s.definitions.len()).sum();
        let elements = module.statutes.values().map(|s| s.elements.len()).sum();
        let penalties = module.statutes.values().filter(|s| s.penalty.is_some()).count();
        let illustrations = module.statutes.values().map(|s| s.illustrations.len()).sum();

        Self {
            imports: module.imports.len(),
            structs: module.type_defs.len(),
            functions: module.function_defs.len(),
            statutes: module.statutes.len(),
            variables: module.variables.len(),
            references: module.references().len(),
            assertions: module.assertions(),
            definitions,
            elements,
            penalties,
            illustrations,
            total_nodes: module.total_nodes(),
        }
    }
}

/// A single semantic diagnostic surfaced in [`SemanticSummary::issues`],
/// independent of the internal [`crate::diagnostics::DiagnosticMessage`]
/// representation so the service's JSON shape doesn't couple to
/// `rowan::TextRange`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticIssue {
    pub severity: &'static str,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

/// Aggregated semantic-analysis output (§4.11).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticSummary {
    pub issues: Vec<SemanticIssue>,
    pub errors: usize,
    pub warnings: usize,
}

impl SemanticSummary {
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// The per-stage-timed, structured result every consumer of the core
/// builds against (§4.11/§6.2). Never constructed with a fatal `Result`
/// wrapper: every recoverable failure mode already lives in `errors`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub file: String,
    #[serde(skip)]
    pub source: String,
    #[serde(skip)]
    pub tree: Option<SyntaxNode>,
    #[serde(skip)]
    pub ast: Option<Module>,
    pub errors: Vec<AnalysisError>,
    pub ast_summary: Option<AstSummary>,
    pub semantic_summary: Option<SemanticSummary>,
    pub parse_duration_ms: f64,
    pub ast_duration_ms: f64,
    pub semantic_duration_ms: f64,
    pub total_duration_ms: f64,
}

impl AnalysisResult {
    fn new(file: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            source: source.into(),
            tree: None,
            ast: None,
            errors: Vec::new(),
            ast_summary: None,
            semantic_summary: None,
            parse_duration_ms: 0.0,
            ast_duration_ms: 0.0,
            semantic_duration_ms: 0.0,
            total_duration_ms: 0.0,
        }
    }

    /// `true` iff parsing, AST building, and (when requested) semantic
    /// checking all succeeded without producing any error-severity
    /// diagnostic (§6.5's exit-code-0 condition).
    pub fn is_valid(&self) -> bool {
        if !self.errors.is_empty() {
            return false;
        }
        match &self.semantic_summary {
            Some(summary) => !summary.has_errors(),
            None => self.ast.is_some(),
        }
    }

    /// Rounds every duration field to 3 decimal places, matching §6.2's
    /// "durations in milliseconds rounded to 3 dp" serialization contract.
    /// [`Serialize`] does not round floats itself, so callers that need the
    /// exact JSON shape should round before calling `serde_json::to_value`,
    /// e.g. via this helper's returned clone.
    pub fn with_rounded_durations(mut self) -> Self {
        let round = |ms: f64| (ms * 1000.0).round() / 1000.0;
        self.parse_duration_ms = round(self.parse_duration_ms);
        self.ast_duration_ms = round(self.ast_duration_ms);
        self.semantic_duration_ms = round(self.semantic_duration_ms);
        self.total_duration_ms = round(self.total_duration_ms);
        self
    }
}

/// Reads `path` and hands its contents to [`analyze_source`], reporting
/// file-not-found/non-UTF-8 as a structured `errors` entry instead of an
/// `Err` (§4.11: "the service never raises for user-recoverable
/// failures").
pub fn analyze_file(path: &Path, run_semantic: bool) -> AnalysisResult {
    let file_label = path.display().to_string();

    if !path.exists() {
        let mut result = AnalysisResult::new(file_label.clone(), "");
        result.errors.push(AnalysisError::new(
            "parse",
            "file_not_found",
            format!("File not found: {}", path.display()),
        ));
        return result;
    }

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(io_err) => {
            let mut result = AnalysisResult::new(file_label.clone(), "");
            result.errors.push(AnalysisError::new(
                "parse",
                "file_read_failed",
                format!("Failed to read file: {io_err}"),
            ));
            return result;
        }
    };

    let source = match String::from_utf8(bytes) {
        Ok(source) => source,
        Err(_) => {
            let mut result = AnalysisResult::new(file_label.clone(), "");
            result.errors.push(AnalysisError::new(
                "parse",
                "file_read_failed",
                format!("File is not valid UTF-8: {}", path.display()),
            ));
            return result;
        }
    };

    analyze_source(&source, &file_label, run_semantic)
}

/// Analyzes `text` through parse -> AST build -> (optionally) semantic
/// checks, timing each stage independently (§4.11/§5's "analyses are pure
/// functions of the input string").
pub fn analyze_source(text: &str, file_label: &str, run_semantic: bool) -> AnalysisResult {
    let total_start = Instant::now();
    let file_label = file_label.to_string();
    let source = text.to_string();
    let mut result = AnalysisResult::new(file_label.clone(), source.clone());

    let parse_start = Instant::now();
    let parse_result = match parser::parse(&source) {
        Ok(pr) => pr,
        Err(err) => {
            result.parse_duration_ms = elapsed_ms(parse_start);
            result.errors.push(AnalysisError::new(
                "parse",
                "parser_fuel_exhausted",
                err.to_string(),
            ));
            result.total_duration_ms = elapsed_ms(total_start);
            return result;
        }
    };
    result.parse_duration_ms = elapsed_ms(parse_start);

    result.errors.extend(parse_diagnostics_to_errors(
        &file_label,
        &source,
        &parse_result,
    ));
    result.tree = Some(parse_result.root.clone());

    if parse_result.diagnostics.has_errors() {
        result.total_duration_ms = elapsed_ms(total_start);
        return result;
    }

    let ast_start = Instant::now();
    let build_result = AstBuilder::new(&source)
        .with_path(std::path::PathBuf::from(&file_label))
        .build(&parse_result.root);
    result.ast_duration_ms = elapsed_ms(ast_start);

    let module = match build_result {
        Ok(module) => module,
        Err(err @ crate::ast::builder::AstBuildError::UnexpectedShape { expected, span, .. }) => {
            let location = Location::from_span(&file_label, span, &source);
            result.errors.push(
                AnalysisError::new("ast", "ast_build_failed", format!("Failed to build AST: {err}"))
                    .with_location(location)
                    .with_node_type(expected),
            );
            result.total_duration_ms = elapsed_ms(total_start);
            return result;
        }
    };

    result.ast_summary = Some(AstSummary::from_module(&module));

    if run_semantic {
        let semantic_start = Instant::now();
        result.semantic_summary = Some(run_semantic_checks(&module, &source));
        result.semantic_duration_ms = elapsed_ms(semantic_start);
    }

    result.ast = Some(module);
    result.total_duration_ms = elapsed_ms(total_start);
    result
}

fn run_semantic_checks(module: &Module, source: &str) -> SemanticSummary {
    let (diagnostics, _types) = crate::analyze::analyze(module);

    let mut issues = Vec::with_capacity(diagnostics.len());
    let mut errors = 0;
    let mut warnings = 0;

    for message in diagnostics.iter() {
        let span = SourceSpan::from_range(message.range(), source);
        if message.is_warning() {
            warnings += 1;
        } else {
            errors += 1;
        }
        issues.push(SemanticIssue {
            severity: if message.is_warning() { "warning" } else { "error" },
            message: message.message().to_string(),
            line: span.line,
            column: span.column,
        });
    }

    SemanticSummary {
        issues,
        errors,
        warnings,
    }
}

fn parse_diagnostics_to_errors(
    file_label: &str,
    source: &str,
    parse_result: &parser::ParseResult,
) -> Vec<AnalysisError> {
    parse_result
        .diagnostics
        .iter()
        .filter(|d| d.stage == DiagnosticStage::Parse && d.is_error())
        .map(|d| {
            let span = SourceSpan::from_range(d.range(), source);
            AnalysisError::new("parse", "parse_error", d.message().to_string())
                .with_location(Location::from_span(file_label, span, source))
        })
        .collect()
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::nodes::Expr;

    #[test]
    fn empty_module_is_valid() {
        let result = analyze_source("", "<string>", true);
        assert!(result.is_valid());
        assert_eq!(result.errors.len(), 0);
        assert!(result.ast_summary.is_some());
    }

    #[test]
    fn missing_file_reports_a_structured_error_not_a_panic() {
        let result = analyze_file(Path::new("/nonexistent/path/to/file.yh"), true);
        assert!(!result.is_valid());
        assert_eq!(result.errors[0].error_code, "file_not_found");
    }

    #[test]
    fn analyze_file_reads_and_analyzes_a_real_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::with_suffix(".yh").unwrap();
        write!(file, "let x: bool = true;").unwrap();
        file.flush().unwrap();

        let result = analyze_file(file.path(), true);
        assert!(result.is_valid());
        assert_eq!(result.file, file.path().display().to_string());
    }

    #[test]
    fn timings_are_recorded_for_every_run() {
        let result = analyze_source("let y: int = 1 + 2;", "<string>", true);
        assert!(result.total_duration_ms >= 0.0);
        assert!(result.parse_duration_ms >= 0.0);
    }

    #[test]
    fn run_semantic_false_skips_the_semantic_summary() {
        let result = analyze_source("let y: int = 1 + 2;", "<string>", false);
        assert!(result.semantic_summary.is_none());
    }

    // -----------------------------------------------------------------
    // End-to-end scenarios
    // -----------------------------------------------------------------

    #[test]
    fn exhaustive_boolean_match_reports_no_diagnostics() {
        let source = indoc::indoc! {r#"
            let x: bool = true;
            let y = match x {
                true => "t",
                false => "f",
            };
        "#};
        let result = analyze_source(source, "<string>", true);
        assert!(result.is_valid());
        let summary = result.semantic_summary.expect("semantic summary");
        assert_eq!(summary.errors, 0);
        assert_eq!(summary.warnings, 0);
    }

    #[test]
    fn missing_case_in_boolean_match_reports_a_witness() {
        let source = indoc::indoc! {r#"
            let x: bool = true;
            let y = match x {
                true => "t",
            };
        "#};
        let result = analyze_source(source, "<string>", true);
        assert!(!result.is_valid());
        let summary = result.semantic_summary.expect("semantic summary");
        assert_eq!(summary.errors, 1);
        assert!(summary.issues[0].message.contains("not exhaustive"));
        assert!(summary.issues[0].message.contains("FALSE"));
    }

    #[test]
    fn arm_covered_by_an_earlier_wildcard_is_unreachable() {
        let source = indoc::indoc! {r#"
            let x: bool = true;
            let y = match x {
                _ => "a",
                true => "b",
                false => "c",
            };
        "#};
        let result = analyze_source(source, "<string>", true);
        let summary = result.semantic_summary.expect("semantic summary");
        assert!(summary.warnings >= 1);
        assert!(summary
            .issues
            .iter()
            .any(|i| i.severity == "warning" && i.message.contains("unreachable")));
    }

    #[test]
    fn constant_fold_collapses_arithmetic_to_a_single_literal() {
        let source = "let y: int = 1 + 2 * 3;";
        let parse_result = parser::parse(source).expect("fuel not exhausted");
        let module = AstBuilder::new(source)
            .build(&parse_result.root)
            .expect("module builds");

        let original_span = match &module.variables[0].value {
            Expr::Binary(b) => b.span,
            other => panic!("expected a binary expression, got {other:?}"),
        };
        let original_start = source.find('1').unwrap() as u32;
        assert_eq!(original_span.start, original_start);

        let folded = crate::optimize::fold_module(&module, false).expect("folds cleanly");
        match &folded.variables[0].value {
            Expr::Literal(lit) => {
                assert_eq!(lit.value, crate::ast::nodes::Literal::Int(7));
                assert_eq!(lit.span.start, original_start);
            }
            other => panic!("expected a folded literal, got {other:?}"),
        }
    }

    #[test]
    fn penalty_with_inverted_imprisonment_range_reports_an_error() {
        let source = indoc::indoc! {r#"
            statute S1 "test statute" {
                penalty {
                    5y;
                    1y;
                }
            }
        "#};
        let result = analyze_source(source, "<string>", true);
        assert!(!result.is_valid());
        let summary = result.semantic_summary.expect("semantic summary");
        assert!(summary.errors >= 1);
        assert!(summary
            .issues
            .iter()
            .any(|i| i.message.contains("exceeds maximum")));
    }

    #[test]
    fn every_transpile_target_produces_stable_non_empty_output() {
        let source = indoc::indoc! {r#"
            statute S1 "test statute" {
                element "actus reus" {
                    pass
                }
                penalty {
                    1y;
                }
                illustration {
                    pass
                }
            }
        "#};
        let parse_result = parser::parse(source).expect("fuel not exhausted");
        let module = AstBuilder::new(source)
            .build(&parse_result.root)
            .expect("module builds");

        for target in crate::transpile::TranspileTarget::ALL {
            let first = crate::transpile::TranspilerRegistry::transpile(target, &module)
                .unwrap_or_else(|e| panic!("{target:?} failed: {e}"));
            let second = crate::transpile::TranspilerRegistry::transpile(target, &module)
                .unwrap_or_else(|e| panic!("{target:?} failed on second run: {e}"));
            assert!(!first.is_empty(), "{target:?} produced empty output");
            assert_eq!(first, second, "{target:?} is not stable across runs");
        }
    }
}
