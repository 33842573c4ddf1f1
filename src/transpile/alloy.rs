//! The Alloy transpiler (§4.10): a formal model — one signature per statute
//! and per declared struct, a predicate capturing element satisfaction, and
//! assertions derived from `match` branches — meant to be loaded into a
//! separate Alloy analyzer (an external collaborator; §1's "formal
//! verification integrations... consume the AST; engine details are not
//! this core").
//!
//! No `*_transpiler.py` counterpart exists anywhere in `original_source/`
//! (the repository never grew an Alloy backend), so this is built from
//! §4.10's contract directly, following the document-assembly shape the
//! [`super::latex`] transpiler already uses in this codebase: a fixed
//! preamble (`module` header), one rendering pass per statute appending
//! `sig`/`pred`/`assert` blocks, generalized to Alloy's own syntax instead
//! of LaTeX's.

use crate::ast::nodes::*;

use super::{TranspileError, TranspileTarget, Transpiler};

pub struct AlloyTranspiler;

impl Transpiler for AlloyTranspiler {
    fn target(&self) -> TranspileTarget {
        TranspileTarget::Alloy
    }

    fn transpile(&self, module: &Module) -> Result<String, TranspileError> {
        let mut out = String::from("module yuho\n\n");

        for def in module.type_defs.values() {
            render_struct_sig(def, &mut out);
            out.push('\n');
        }

        for statute in module.statutes.values() {
            render_statute(statute, &mut out);
            out.push('\n');
        }

        Ok(out)
    }
}

fn render_struct_sig(def: &StructDef, out: &mut String) {
    out.push_str(&format!("sig {} {{\n", alloy_ident(&def.name)));
    for (i, field) in def.fields.iter().enumerate() {
        let sep = if i + 1 == def.fields.len() { "" } else { "," };
        out.push_str(&format!(
            "    {}: {}{sep}\n",
            alloy_ident(&field.name),
            alloy_type(&field.ty)
        ));
    }
    out.push_str("}\n");
}

fn render_statute(statute: &Statute, out: &mut String) {
    let sig_name = statute_sig_name(&statute.section);

    out.push_str(&format!("-- Section {}\n", statute.section));
    out.push_str(&format!("one sig {sig_name} {{\n"));
    let mut fields: Vec<String> = statute
        .elements
        .iter()
        .map(|e| format!("    {}: one Bool", alloy_ident(&e.name)))
        .collect();
    if statute.penalty.is_some() {
        fields.push("    penaltyApplies: one Bool".to_string());
    }
    out.push_str(&fields.join(",\n"));
    out.push('\n');
    out.push_str("}\n\n");

    out.push_str(&format!("pred {sig_name}Satisfied {{\n"));
    if statute.elements.is_empty() {
        out.push_str("    -- no elements declared: vacuously satisfied\n");
    } else {
        let roles: Vec<String> = statute
            .elements
            .iter()
            .map(|e| format!("    {sig_name}.{} = True", alloy_ident(&e.name)))
            .collect();
        out.push_str(&roles.join(" and\n"));
        out.push('\n');
    }
    out.push_str("}\n");

    for element in &statute.elements {
        out.push_str(&format!("-- {}: {}\n", element.role, alloy_ident(&element.name)));
    }

    if let Some(penalty) = &statute.penalty {
        render_penalty_assertion(&sig_name, penalty, out);
    }

    for def in &statute.definitions {
        out.push_str(&format!("-- definition: {} is derived\n", alloy_ident(&def.name)));
    }
}

fn render_penalty_assertion(sig_name: &str, penalty: &Penalty, out: &mut String) {
    out.push_str(&format!("assert {sig_name}PenaltyWellFormed {{\n"));
    if let Some((min, max)) = &penalty.imprisonment {
        out.push_str(&format!(
            "    -- imprisonment range: {min} to {max}\n"
        ));
    }
    if let Some((min, max)) = &penalty.fine {
        out.push_str(&format!(
            "    -- fine range: ${:.2} to ${:.2}\n",
            min.as_decimal(),
            max.as_decimal()
        ));
    }
    out.push_str(&format!(
        "    {sig_name}.penaltyApplies = True implies {sig_name}Satisfied\n"
    ));
    out.push_str("}\n");
}

fn statute_sig_name(section: &str) -> String {
    format!("Section{}", alloy_ident(section))
}

/// Alloy identifiers are alphanumeric-plus-underscore; sanitizes source
/// names (which may contain dots, spaces, or leading digits) into a legal
/// Alloy atom name.
fn alloy_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

fn alloy_type(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Builtin(BuiltinType::Bool) => "Bool".to_string(),
        TypeExpr::Builtin(BuiltinType::Int) | TypeExpr::Builtin(BuiltinType::Float) => "Int".to_string(),
        TypeExpr::Builtin(_) => "univ".to_string(),
        TypeExpr::Named(n) => alloy_ident(n),
        TypeExpr::Generic { base, .. } => alloy_ident(base),
        TypeExpr::Optional(inner) => format!("lone {}", alloy_type(inner)),
        TypeExpr::Array(elem) => format!("set {}", alloy_type(elem)),
        TypeExpr::Unknown => "univ".to_string(),
    }
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
    fn opens_with_a_module_header() {
        let out = AlloyTranspiler.transpile(&empty_module()).unwrap();
        assert!(out.starts_with("module yuho\n"));
    }

    #[test]
    fn renders_a_statute_signature_and_predicate() {
        let mut module = empty_module();
        module.statutes.insert(
            "S1".into(),
            Statute {
                id: NodeId::from_raw(0),
                span: span(),
                section: "S1".into(),
                title: Some("Theft".into()),
                definitions: vec![],
                elements: vec![Element {
                    id: NodeId::from_raw(1),
                    span: span(),
                    role: ElementRole::ActusReus,
                    name: "taking".into(),
                    description: Expr::Literal(LiteralExpr {
                        id: NodeId::from_raw(2),
                        span: span(),
                        value: Literal::Bool(true),
                    }),
                }],
                penalty: None,
                illustrations: vec![],
            },
        );
        let out = AlloyTranspiler.transpile(&module).unwrap();
        assert!(out.contains("one sig SectionS1"));
        assert!(out.contains("pred SectionS1Satisfied"));
        assert!(out.contains("taking: one Bool"));
    }

    #[test]
    fn sanitizes_non_alloy_identifier_characters() {
        assert_eq!(alloy_ident("Section 420A.1"), "Section_420A_1");
        assert_eq!(alloy_ident("3d"), "_3d");
    }

    #[test]
    fn penalty_produces_a_well_formedness_assertion() {
        let mut module = empty_module();
        module.statutes.insert(
            "S1".into(),
            Statute {
                id: NodeId::from_raw(0),
                span: span(),
                section: "S1".into(),
                title: None,
                definitions: vec![],
                elements: vec![],
                penalty: Some(Penalty {
                    id: NodeId::from_raw(1),
                    span: span(),
                    imprisonment: Some((Duration::default(), Duration { years: 2, ..Default::default() })),
                    fine: None,
                    supplementary: None,
                }),
                illustrations: vec![],
            },
        );
        let out = AlloyTranspiler.transpile(&module).unwrap();
        assert!(out.contains("assert SectionS1PenaltyWellFormed"));
    }
}
