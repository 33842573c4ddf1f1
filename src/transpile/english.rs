//! The English (controlled natural language) transpiler (§4.10).
//!
//! Grounded on `original_source/src/yuho/transpile/english.py`: renders each
//! statute as a short structured paragraph (title, definitions, elements
//! grouped by role, penalty range, illustrations) rather than emitting Yuho
//! syntax back out. Expressions are rendered with ordinary infix notation
//! (`amount > 100`, not `BinaryExprNode(Gt, ...)`) so the output reads as
//! prose a non-programmer reviewing the statute could follow.

use crate::ast::nodes::*;

use super::{TranspileError, TranspileTarget, Transpiler};

pub struct EnglishTranspiler;

impl Transpiler for EnglishTranspiler {
    fn target(&self) -> TranspileTarget {
        TranspileTarget::English
    }

    fn transpile(&self, module: &Module) -> Result<String, TranspileError> {
        let mut out = String::new();

        if module.statutes.is_empty() && module.type_defs.is_empty() && module.function_defs.is_empty() {
            out.push_str("(empty module)\n");
            return Ok(out);
        }

        for def in module.type_defs.values() {
            render_struct_def(def, &mut out);
            out.push('\n');
        }
        for def in module.function_defs.values() {
            render_function_def(def, &mut out);
            out.push('\n');
        }
        for statute in module.statutes.values() {
            render_statute(statute, &mut out);
            out.push('\n');
        }

        Ok(out)
    }
}

fn render_struct_def(def: &StructDef, out: &mut String) {
    out.push_str(&format!("Structure \"{}\" has the following fields:\n", def.name));
    for f in &def.fields {
        out.push_str(&format!("  - {}: {}\n", f.name, f.ty));
    }
}

fn render_function_def(def: &FunctionDef, out: &mut String) {
    let params: Vec<String> = def.params.iter().map(|p| format!("{} ({})", p.name, p.ty)).collect();
    out.push_str(&format!("Function \"{}\" takes {}.\n", def.name, if params.is_empty() {
        "no parameters".to_string()
    } else {
        params.join(", ")
    }));
}

fn render_statute(statute: &Statute, out: &mut String) {
    match &statute.title {
        Some(title) => out.push_str(&format!("Section {} — {}\n", statute.section, title)),
        None => out.push_str(&format!("Section {}\n", statute.section)),
    }

    if !statute.definitions.is_empty() {
        out.push_str("Definitions:\n");
        for def in &statute.definitions {
            out.push_str(&format!("  - {} is {}\n", def.name, expr_to_text(&def.value)));
        }
    }

    if !statute.elements.is_empty() {
        out.push_str("To establish this offense, the following must be proven:\n");
        for role in [ElementRole::ActusReus, ElementRole::MensRea, ElementRole::Circumstance] {
            let matching: Vec<&Element> = statute.elements.iter().filter(|e| e.role == role).collect();
            if matching.is_empty() {
                continue;
            }
            out.push_str(&format!("  {}:\n", role_heading(role)));
            for element in matching {
                out.push_str(&format!(
                    "    - {}: {}\n",
                    element.name,
                    expr_to_text(&element.description)
                ));
            }
        }
    }

    if let Some(penalty) = &statute.penalty {
        out.push_str("Penalty upon conviction:\n");
        if let Some((min, max)) = &penalty.imprisonment {
            out.push_str(&format!("  - imprisonment between {} and {}\n", min, max));
        }
        if let Some((min, max)) = &penalty.fine {
            out.push_str(&format!(
                "  - a fine between ${:.2} and ${:.2}\n",
                min.as_decimal(),
                max.as_decimal()
            ));
        }
        if let Some(supplementary) = &penalty.supplementary {
            out.push_str(&format!("  - {}\n", supplementary));
        }
    }

    if !statute.illustrations.is_empty() {
        out.push_str("Illustrations:\n");
        for (i, illustration) in statute.illustrations.iter().enumerate() {
            match &illustration.text {
                Some(text) => out.push_str(&format!("  ({}) {}\n", i + 1, text)),
                None => out.push_str(&format!("  ({}) [see accompanying example]\n", i + 1)),
            }
        }
    }
}

fn role_heading(role: ElementRole) -> &'static str {
    match role {
        ElementRole::ActusReus => "the guilty act (actus reus)",
        ElementRole::MensRea => "the guilty mind (mens rea)",
        ElementRole::Circumstance => "attendant circumstances",
    }
}

/// Renders an expression as an ordinary infix English phrase. Not a
/// pretty-printer round-trippable back to Yuho syntax — this is prose, not
/// source.
pub fn expr_to_text(expr: &Expr) -> String {
    match expr {
        Expr::Identifier(e) => e.name.clone(),
        Expr::FieldAccess(e) => format!("{}'s {}", expr_to_text(&e.base), e.field),
        Expr::IndexAccess(e) => format!("{}[{}]", expr_to_text(&e.base), expr_to_text(&e.index)),
        Expr::Call(e) => {
            let args: Vec<String> = e.args.iter().map(expr_to_text).collect();
            format!("{}({})", e.callee, args.join(", "))
        }
        Expr::Binary(e) => format!(
            "{} {} {}",
            expr_to_text(&e.lhs),
            binary_op_text(e.op),
            expr_to_text(&e.rhs)
        ),
        Expr::Unary(e) => match e.op {
            UnaryOp::Neg => format!("-{}", expr_to_text(&e.operand)),
            UnaryOp::Not => format!("not {}", expr_to_text(&e.operand)),
        },
        Expr::Literal(e) => e.value.to_string(),
        Expr::StructLiteral(e) => {
            let fields: Vec<String> = e
                .fields
                .iter()
                .map(|f| format!("{} = {}", f.name, expr_to_text(&f.value)))
                .collect();
            format!("{} {{ {} }}", e.name, fields.join(", "))
        }
        Expr::Match(e) => {
            let scrutinee = e
                .scrutinee
                .as_ref()
                .map(expr_to_text)
                .unwrap_or_else(|| "the given value".to_string());
            let mut arms = Vec::new();
            for arm in &e.arms {
                let condition = match &arm.guard {
                    Some(guard) => format!("{} where {}", pattern_to_text(&arm.pattern), expr_to_text(guard)),
                    None => pattern_to_text(&arm.pattern),
                };
                arms.push(format!("if {} matches {}, then {}", scrutinee, condition, expr_to_text(&arm.body)));
            }
            arms.join("; otherwise ")
        }
        Expr::Pass(_) => "(unspecified)".to_string(),
    }
}

fn binary_op_text(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "plus",
        BinaryOp::Sub => "minus",
        BinaryOp::Mul => "times",
        BinaryOp::Div => "divided by",
        BinaryOp::Mod => "modulo",
        BinaryOp::Eq => "equals",
        BinaryOp::NotEq => "does not equal",
        BinaryOp::Lt => "is less than",
        BinaryOp::LtEq => "is at most",
        BinaryOp::Gt => "is greater than",
        BinaryOp::GtEq => "is at least",
        BinaryOp::And => "and",
        BinaryOp::Or => "or",
    }
}

fn pattern_to_text(pattern: &Pattern) -> String {
    match pattern {
        Pattern::Wildcard(_) => "anything".to_string(),
        Pattern::Literal(p) => p.value.to_string(),
        Pattern::Binding(p) => p.name.clone(),
        Pattern::Struct(p) => {
            let fields: Vec<String> = p
                .fields
                .iter()
                .map(|f| format!("{} = {}", f.name, pattern_to_text(&f.pattern)))
                .collect();
            format!("{} {{ {} }}", p.name, fields.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use crate::span::SourceSpan;

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
    fn empty_module_says_so() {
        let out = EnglishTranspiler.transpile(&empty_module()).unwrap();
        assert_eq!(out, "(empty module)\n");
    }

    #[test]
    fn statute_with_elements_and_penalty_reads_as_prose() {
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
                penalty: Some(Penalty {
                    id: NodeId::from_raw(3),
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

        let out = EnglishTranspiler.transpile(&module).unwrap();
        assert!(out.contains("Section S1 — Theft"));
        assert!(out.contains("guilty act"));
        assert!(out.contains("fine between $1.00 and $5.00"));
    }

    #[test]
    fn binary_expr_reads_as_infix_phrase() {
        let lhs = Expr::Identifier(IdentifierExpr { id: NodeId::from_raw(0), span: span(), name: "amount".into() });
        let rhs = Expr::Literal(LiteralExpr { id: NodeId::from_raw(1), span: span(), value: Literal::Int(100) });
        let expr = Expr::Binary(BinaryExpr {
            id: NodeId::from_raw(2),
            span: span(),
            op: BinaryOp::Gt,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        });
        assert_eq!(expr_to_text(&expr), "amount is greater than 100");
    }
}
