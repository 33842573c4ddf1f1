//! The Mermaid transpiler (§4.10): one `flowchart TD` diagram per statute —
//! section node, definitions, elements grouped by role, penalty, with
//! `match` expressions rendered as decision diamonds and labeled branches.
//!
//! Grounded on
//! `original_source/archive/yuho_v4/transpilers/mermaid_transpiler.py`'s
//! node-counter + `self.output` line-accumulation approach (`_add_*`
//! methods appending `id[label]` and `a --> b` lines one statement at a
//! time); the counter is reimplemented here as a small struct threaded
//! through the render calls instead of `self` mutation, since there is no
//! visitor instance to hang it from. The archive script only emits a
//! flowchart/mindmap pair over a flat statement list with no statute/element
//! role grouping — the per-statute, per-role structure is this transpiler's
//! own contribution, driven by §4.10's "section -> definitions -> elements
//! by role -> penalty nodes" contract.

use crate::ast::nodes::*;

use super::english::expr_to_text;
use super::{TranspileError, TranspileTarget, Transpiler};

pub struct MermaidTranspiler;

impl Transpiler for MermaidTranspiler {
    fn target(&self) -> TranspileTarget {
        TranspileTarget::Mermaid
    }

    fn transpile(&self, module: &Module) -> Result<String, TranspileError> {
        let mut out = String::from("flowchart TD\n");
        let mut counter = NodeCounter::default();

        if module.statutes.is_empty() {
            out.push_str("    empty[No statutes]\n");
            return Ok(out);
        }

        for statute in module.statutes.values() {
            render_statute(statute, &mut counter, &mut out);
        }

        Ok(out)
    }
}

/// Mints Mermaid node ids (`S0`, `D1`, `E2`, ...) the way the archive
/// script's `self.node_counter` did, one shared counter per diagram so ids
/// never collide across statutes.
#[derive(Default)]
struct NodeCounter(usize);

impl NodeCounter {
    fn next(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}{}", self.0);
        self.0 += 1;
        id
    }
}

fn render_statute(statute: &Statute, counter: &mut NodeCounter, out: &mut String) {
    let section_id = counter.next("S");
    let label = match &statute.title {
        Some(title) => format!("Section {}: {}", statute.section, mm_escape(title)),
        None => format!("Section {}", statute.section),
    };
    out.push_str(&format!("    {section_id}[\"{label}\"]\n"));

    if !statute.definitions.is_empty() {
        let defs_id = counter.next("D");
        out.push_str(&format!("    {defs_id}[Definitions]\n"));
        out.push_str(&format!("    {section_id} --> {defs_id}\n"));
        for def in &statute.definitions {
            let id = counter.next("D");
            out.push_str(&format!(
                "    {id}[\"{}: {}\"]\n",
                mm_escape(&def.name),
                mm_escape(&expr_to_text(&def.value))
            ));
            out.push_str(&format!("    {defs_id} --> {id}\n"));
        }
    }

    for role in [ElementRole::ActusReus, ElementRole::MensRea, ElementRole::Circumstance] {
        let matching: Vec<&Element> = statute.elements.iter().filter(|e| e.role == role).collect();
        if matching.is_empty() {
            continue;
        }
        let role_id = counter.next("R");
        out.push_str(&format!("    {role_id}[{}]\n", role));
        out.push_str(&format!("    {section_id} --> {role_id}\n"));
        for element in matching {
            let id = counter.next("E");
            out.push_str(&format!(
                "    {id}[\"{}: {}\"]\n",
                mm_escape(&element.name),
                mm_escape(&expr_to_text(&element.description))
            ));
            out.push_str(&format!("    {role_id} --> {id}\n"));
            render_match_decisions(&element.description, &id, counter, out);
        }
    }

    if let Some(penalty) = &statute.penalty {
        let penalty_id = counter.next("P");
        let mut label = String::from("Penalty");
        if let Some((min, max)) = &penalty.imprisonment {
            label.push_str(&format!("\\nimprisonment {min} to {max}"));
        }
        if let Some((min, max)) = &penalty.fine {
            label.push_str(&format!(
                "\\nfine \\${:.2} to \\${:.2}",
                min.as_decimal(),
                max.as_decimal()
            ));
        }
        out.push_str(&format!("    {penalty_id}[\"{}\"]\n", mm_escape(&label)));
        out.push_str(&format!("    {section_id} --> {penalty_id}\n"));
    }

    for (i, illustration) in statute.illustrations.iter().enumerate() {
        let id = counter.next("I");
        let text = illustration
            .text
            .as_deref()
            .map(mm_escape)
            .unwrap_or_else(|| format!("Illustration {}", i + 1));
        out.push_str(&format!("    {id}[\"{text}\"]\n"));
        out.push_str(&format!("    {section_id} --> {id}\n"));
    }
}

/// Any `match` expression reachable from `expr` becomes a decision diamond
/// with one labeled branch per arm (§4.10), wired from `parent_id`.
fn render_match_decisions(expr: &Expr, parent_id: &str, counter: &mut NodeCounter, out: &mut String) {
    if let Expr::Match(m) = expr {
        let decision_id = counter.next("MC");
        let label = match &m.scrutinee {
            Some(scrutinee) => format!("match {}", expr_to_text(scrutinee)),
            None => "match".to_string(),
        };
        out.push_str(&format!("    {decision_id}{{\"{}\"}}\n", mm_escape(&label)));
        out.push_str(&format!("    {parent_id} --> {decision_id}\n"));

        for (i, arm) in m.arms.iter().enumerate() {
            let branch_id = counter.next("C");
            let branch_label = match &arm.guard {
                Some(guard) => format!("case {} ({}) if {}", i + 1, pattern_label(&arm.pattern), expr_to_text(guard)),
                None => format!("case {} ({})", i + 1, pattern_label(&arm.pattern)),
            };
            out.push_str(&format!("    {branch_id}[\"{}\"]\n", mm_escape(&branch_label)));
            out.push_str(&format!("    {decision_id} -->|{}| {branch_id}\n", i + 1));
            render_match_decisions(&arm.body, &branch_id, counter, out);
        }
    }
}

fn pattern_label(pattern: &Pattern) -> String {
    match pattern {
        Pattern::Wildcard(_) => "_".to_string(),
        Pattern::Literal(p) => p.value.to_string(),
        Pattern::Binding(p) => p.name.clone(),
        Pattern::Struct(p) => p.name.clone(),
    }
}

/// Escapes characters Mermaid's quoted-label syntax treats specially.
fn mm_escape(text: &str) -> String {
    text.replace('"', "&quot;").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::SourceSpan;
    use indexmap::IndexMap;

    fn span() -> SourceSpan {
        SourceSpan::new(0, 1, 1, 1)
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
    fn starts_with_flowchart_header() {
        let out = MermaidTranspiler.transpile(&empty_module()).unwrap();
        assert!(out.starts_with("flowchart TD\n"));
    }

    #[test]
    fn renders_a_statute_node_and_its_penalty() {
        let mut module = empty_module();
        module.statutes.insert(
            "S1".into(),
            Statute {
                id: NodeId::from_raw(0),
                span: span(),
                section: "S1".into(),
                title: Some("Theft".into()),
                definitions: vec![],
                elements: vec![],
                penalty: Some(Penalty {
                    id: NodeId::from_raw(1),
                    span: span(),
                    imprisonment: None,
                    fine: Some((
                        Money { currency: Currency::Usd, minor_units: 100 },
                        Money { currency: Currency::Usd, minor_units: 500 },
                    )),
                    supplementary: None,
                }),
                illustrations: vec![],
            },
        );
        let out = MermaidTranspiler.transpile(&module).unwrap();
        assert!(out.contains("Section S1: Theft"));
        assert!(out.contains("fine \\$1.00 to \\$5.00"));
    }

    #[test]
    fn match_expression_becomes_a_decision_diamond() {
        let mut module = empty_module();
        let pattern = Pattern::Literal(LiteralPattern { span: span(), value: Literal::Bool(true) });
        let arm = MatchArm {
            span: span(),
            pattern,
            guard: None,
            body: Expr::Literal(LiteralExpr { id: NodeId::from_raw(4), span: span(), value: Literal::Int(1) }),
        };
        let match_expr = Expr::Match(MatchExpr {
            id: NodeId::from_raw(2),
            span: span(),
            scrutinee: Some(Expr::Identifier(IdentifierExpr { id: NodeId::from_raw(3), span: span(), name: "x".into() })),
            arms: vec![arm],
            ensure_exhaustiveness: false,
        });
        module.statutes.insert(
            "S1".into(),
            Statute {
                id: NodeId::from_raw(0),
                span: span(),
                section: "S1".into(),
                title: None,
                definitions: vec![],
                elements: vec![Element {
                    id: NodeId::from_raw(1),
                    span: span(),
                    role: ElementRole::ActusReus,
                    name: "cond".into(),
                    description: match_expr,
                }],
                penalty: None,
                illustrations: vec![],
            },
        );
        let out = MermaidTranspiler.transpile(&module).unwrap();
        assert!(out.contains("{\"match x\"}"));
        assert!(out.contains("case 1 (TRUE)"));
    }
}
