//! The LaTeX transpiler (§4.10).
//!
//! Grounded on `original_source/src/yuho/transpile/latex.py`: emits a
//! self-contained `.tex` document using a handful of custom macros
//! (`\statute`, `\element`, `\penalty`) defined in the preamble, rather than
//! hand-nesting `itemize`/`description` environments inline — matching the
//! original's "define the vocabulary once, use it per statute" structure.

use crate::ast::nodes::*;

use super::english::expr_to_text;
use super::{TranspileError, TranspileTarget, Transpiler};

pub struct LatexTranspiler;

impl Transpiler for LatexTranspiler {
    fn target(&self) -> TranspileTarget {
        TranspileTarget::Latex
    }

    fn transpile(&self, module: &Module) -> Result<String, TranspileError> {
        let mut out = String::new();
        out.push_str(PREAMBLE);
        out.push_str("\\begin{document}\n\n");

        for statute in module.statutes.values() {
            render_statute(statute, &mut out);
            out.push('\n');
        }

        out.push_str("\\end{document}\n");
        Ok(out)
    }
}

const PREAMBLE: &str = r#"\documentclass{article}
\usepackage[margin=1in]{geometry}
\usepackage{tcolorbox}
\usepackage[colorlinks=true,linkcolor=blue,urlcolor=blue]{hyperref}

\newcommand{\statute}[2]{\section*{Section #1 --- #2}}
\newcommand{\element}[2]{\item \textbf{#1}: #2}
\newcommand{\penaltyitem}[1]{\item #1}

\newenvironment{definitionlist}{\begin{description}}{\end{description}}
\newcommand{\definitionitem}[2]{\item[#1] #2}

\newtcolorbox{illustrationbox}[1]{
  colback=yellow!5,
  colframe=yellow!60!black,
  title={Illustration #1}
}

"#;

fn render_statute(statute: &Statute, out: &mut String) {
    let title = statute.title.as_deref().unwrap_or("");
    out.push_str(&format!(
        "\\statute{{{}}}{{{}}}\n",
        tex_escape(&statute.section),
        tex_escape(title)
    ));

    if !statute.definitions.is_empty() {
        out.push_str("\\subsection*{Definitions}\n\\begin{definitionlist}\n");
        for def in &statute.definitions {
            out.push_str(&format!(
                "  \\definitionitem{{{}}}{{{}}}\n",
                tex_escape(&def.name),
                tex_escape(&expr_to_text(&def.value))
            ));
        }
        out.push_str("\\end{definitionlist}\n");
    }

    if !statute.elements.is_empty() {
        out.push_str("\\subsection*{Elements}\n\\begin{itemize}\n");
        for element in &statute.elements {
            out.push_str(&format!(
                "  \\element{{{}}}{{{}}}\n",
                tex_escape(&element.name),
                tex_escape(&expr_to_text(&element.description))
            ));
        }
        out.push_str("\\end{itemize}\n");
    }

    if let Some(penalty) = &statute.penalty {
        out.push_str("\\subsection*{Penalty}\n\\begin{itemize}\n");
        if let Some((min, max)) = &penalty.imprisonment {
            out.push_str(&format!("  \\penaltyitem{{Imprisonment: {} to {}}}\n", min, max));
        }
        if let Some((min, max)) = &penalty.fine {
            out.push_str(&format!(
                "  \\penaltyitem{{Fine: \\${:.2} to \\${:.2}}}\n",
                min.as_decimal(),
                max.as_decimal()
            ));
        }
        if let Some(supplementary) = &penalty.supplementary {
            out.push_str(&format!("  \\penaltyitem{{{}}}\n", tex_escape(supplementary)));
        }
        out.push_str("\\end{itemize}\n");
    }

    if !statute.illustrations.is_empty() {
        out.push_str("\\subsection*{Illustrations}\n");
        for (i, illustration) in statute.illustrations.iter().enumerate() {
            let text = illustration.text.as_deref().unwrap_or("(see accompanying example)");
            out.push_str(&format!(
                "\\begin{{illustrationbox}}{{{}}}\n{}\n\\end{{illustrationbox}}\n",
                i + 1,
                tex_escape(text)
            ));
        }
    }
}

/// Escapes LaTeX's reserved special characters in plain text content.
fn tex_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '\\' => out.push_str("\\textbackslash{}"),
            other => out.push(other),
        }
    }
    out
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
    fn wraps_in_a_document_environment() {
        let out = LatexTranspiler.transpile(&empty_module()).unwrap();
        assert!(out.contains("\\begin{document}"));
        assert!(out.contains("\\end{document}"));
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(tex_escape("50% & more"), "50\\% \\& more");
    }

    #[test]
    fn renders_a_statute_section() {
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
                penalty: None,
                illustrations: vec![],
            },
        );
        let out = LatexTranspiler.transpile(&module).unwrap();
        assert!(out.contains("\\statute{S1}{Theft}"));
    }

    #[test]
    fn preamble_declares_hyperlinks_and_illustration_box() {
        let out = LatexTranspiler.transpile(&empty_module()).unwrap();
        assert!(out.contains("\\usepackage"));
        assert!(out.contains("hyperref"));
        assert!(out.contains("\\newtcolorbox{illustrationbox}"));
    }

    #[test]
    fn renders_illustrations_in_a_color_framed_box() {
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
                penalty: None,
                illustrations: vec![Illustration {
                    id: NodeId::from_raw(1),
                    span: span(),
                    text: Some("A takes B's wallet.".into()),
                    body: None,
                }],
            },
        );
        let out = LatexTranspiler.transpile(&module).unwrap();
        assert!(out.contains("\\begin{illustrationbox}{1}"));
        assert!(out.contains("A takes B's wallet."));
    }
}
