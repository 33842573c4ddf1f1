//! Type inference and checking.
//!
//! Two cooperating passes sharing one [`TypeInferenceResult`] side table
//! (§4.4): [`infer_types`] is a pure bottom-up pass with no failure mode —
//! an unresolvable name or operator just yields [`TypeExpr::Unknown`] —
//! and [`check_types`] re-walks the tree against the resulting table,
//! emitting the actual diagnostics. Splitting them keeps "what type does
//! this expression have" usable on its own (the optimizer and the English
//! transpiler both want types without wanting a hard failure on open
//! programs).

use std::collections::HashMap;

use super::operators;
use crate::ast::nodes::*;
use crate::diagnostics::{DiagnosticStage, Diagnostics};

/// Maps every expression (and variable declaration) in a module to its
/// inferred type, keyed by [`NodeId`].
#[derive(Debug, Clone, Default)]
pub struct TypeInferenceResult {
    types: HashMap<NodeId, TypeExpr>,
}

impl TypeInferenceResult {
    pub fn get(&self, id: NodeId) -> Option<&TypeExpr> {
        self.types.get(&id)
    }

    fn insert(&mut self, id: NodeId, ty: TypeExpr) -> TypeExpr {
        self.types.insert(id, ty.clone());
        ty
    }
}

type Env = HashMap<String, TypeExpr>;

fn literal_type(value: &Literal) -> TypeExpr {
    let builtin = match value {
        Literal::Int(_) => BuiltinType::Int,
        Literal::Float(_) => BuiltinType::Float,
        Literal::Bool(_) => BuiltinType::Bool,
        Literal::String(_) => BuiltinType::String,
        Literal::Money(_) => BuiltinType::Money,
        Literal::Percent(_) => BuiltinType::Percent,
        Literal::Date(_) => BuiltinType::Date,
        Literal::Duration(_) => BuiltinType::Duration,
    };
    TypeExpr::Builtin(builtin)
}

struct Inferrer<'m> {
    module: &'m Module,
    result: TypeInferenceResult,
}

impl<'m> Inferrer<'m> {
    fn struct_fields(&self, name: &str) -> Option<&[FieldDef]> {
        self.module.type_defs.get(name).map(|d| d.fields.as_slice())
    }

    fn field_type(&self, base: &TypeExpr, field: &str) -> Option<TypeExpr> {
        match base {
            TypeExpr::Named(name) => self
                .struct_fields(name)?
                .iter()
                .find(|f| f.name == field)
                .map(|f| f.ty.clone()),
            _ => None,
        }
    }

    fn bind_pattern(&self, pattern: &Pattern, scrutinee_ty: Option<&TypeExpr>, env: &mut Env) {
        match pattern {
            Pattern::Wildcard(_) | Pattern::Literal(_) => {}
            Pattern::Binding(p) => {
                env.insert(p.name.clone(), scrutinee_ty.cloned().unwrap_or(TypeExpr::Unknown));
            }
            Pattern::Struct(s) => {
                let fields = self.struct_fields(&s.name).map(|f| f.to_vec());
                for field_pattern in &s.fields {
                    let field_ty = fields
                        .as_ref()
                        .and_then(|fs| fs.iter().find(|f| f.name == field_pattern.name))
                        .map(|f| f.ty.clone());
                    self.bind_pattern(&field_pattern.pattern, field_ty.as_ref(), env);
                }
            }
        }
    }

    fn infer_expr(&mut self, expr: &Expr, env: &Env) -> TypeExpr {
        let ty = match expr {
            Expr::Identifier(e) => env.get(&e.name).cloned().unwrap_or(TypeExpr::Unknown),
            Expr::FieldAccess(e) => {
                let base_ty = self.infer_expr(&e.base, env);
                self.field_type(&base_ty, &e.field).unwrap_or(TypeExpr::Unknown)
            }
            Expr::IndexAccess(e) => {
                let base_ty = self.infer_expr(&e.base, env);
                self.infer_expr(&e.index, env);
                match base_ty {
                    TypeExpr::Array(inner) => *inner,
                    _ => TypeExpr::Unknown,
                }
            }
            Expr::Call(e) => {
                for arg in &e.args {
                    self.infer_expr(arg, env);
                }
                self.module
                    .function_defs
                    .get(&e.callee)
                    .and_then(|f| f.return_type.clone())
                    .unwrap_or(TypeExpr::Unknown)
            }
            Expr::Binary(e) => {
                let lhs = self.infer_expr(&e.lhs, env);
                let rhs = self.infer_expr(&e.rhs, env);
                operators::binary_result_type(e.op, &lhs, &rhs).unwrap_or(TypeExpr::Unknown)
            }
            Expr::Unary(e) => {
                let operand = self.infer_expr(&e.operand, env);
                operators::unary_result_type(e.op, &operand).unwrap_or(TypeExpr::Unknown)
            }
            Expr::Literal(e) => literal_type(&e.value),
            Expr::StructLiteral(e) => {
                for field in &e.fields {
                    self.infer_expr(&field.value, env);
                }
                TypeExpr::Named(e.name.clone())
            }
            Expr::Match(e) => self.infer_match(e, env),
            Expr::Pass(_) => TypeExpr::Builtin(BuiltinType::Void),
        };
        self.result.insert(expr.id(), ty)
    }

    fn infer_match(&mut self, match_expr: &MatchExpr, env: &Env) -> TypeExpr {
        let scrutinee_ty = match_expr
            .scrutinee
            .as_ref()
            .map(|s| self.infer_expr(s, env));

        let mut unified: Option<TypeExpr> = None;
        for arm in &match_expr.arms {
            let mut arm_env = env.clone();
            self.bind_pattern(&arm.pattern, scrutinee_ty.as_ref(), &mut arm_env);
            if let Some(guard) = &arm.guard {
                self.infer_expr(guard, &arm_env);
            }
            let body_ty = self.infer_expr(&arm.body, &arm_env);
            unified = Some(match unified {
                None => body_ty,
                Some(existing) if existing == body_ty => existing,
                Some(_) => TypeExpr::Unknown,
            });
        }
        unified.unwrap_or(TypeExpr::Unknown)
    }

    fn infer_var_decl(&mut self, decl: &VariableDeclStmt, env: &Env) -> TypeExpr {
        let value_ty = self.infer_expr(&decl.value, env);
        let ty = decl.declared_type.clone().unwrap_or(value_ty);
        self.result.insert(decl.id, ty)
    }

    fn infer_stmt(&mut self, stmt: &Stmt, env: &mut Env) {
        match stmt {
            Stmt::VariableDecl(s) => {
                let ty = self.infer_var_decl(s, env);
                env.insert(s.name.clone(), ty);
            }
            Stmt::Assignment(s) => {
                self.infer_expr(&s.target, env);
                self.infer_expr(&s.value, env);
            }
            Stmt::Return(s) => {
                if let Some(value) = &s.value {
                    self.infer_expr(value, env);
                }
            }
            Stmt::Pass(_) => {}
            Stmt::Expression(s) => {
                self.infer_expr(&s.expr, env);
            }
        }
    }

    fn infer_block(&mut self, block: &Block, env: &mut Env) {
        for stmt in &block.stmts {
            self.infer_stmt(stmt, env);
        }
    }
}

/// Infers a type for every expression and variable declaration in
/// `module`, never failing — unresolved names and ill-typed operators
/// simply yield [`TypeExpr::Unknown`].
pub fn infer_types(module: &Module) -> TypeInferenceResult {
    let mut inferrer = Inferrer {
        module,
        result: TypeInferenceResult::default(),
    };

    let mut global_env = Env::new();
    for var in &module.variables {
        let ty = inferrer.infer_var_decl(var, &global_env);
        global_env.insert(var.name.clone(), ty);
    }

    for def in module.function_defs.values() {
        let mut env = global_env.clone();
        for param in &def.params {
            env.insert(param.name.clone(), param.ty.clone());
        }
        inferrer.infer_block(&def.body, &mut env);
    }

    for statute in module.statutes.values() {
        let mut env = global_env.clone();
        for def in &statute.definitions {
            let ty = inferrer.infer_var_decl(def, &env);
            env.insert(def.name.clone(), ty);
        }
        for element in &statute.elements {
            inferrer.infer_expr(&element.description, &env);
        }
        for illustration in &statute.illustrations {
            if let Some(body) = &illustration.body {
                inferrer.infer_block(body, &mut env.clone());
            }
        }
    }

    inferrer.result
}

/// Levenshtein edit distance, used to suggest a fix for an unresolved name
/// that is one typo away from something in scope (§4.4 "Did you mean").
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut prev = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let temp = row[j];
            row[j] = if a[i - 1] == b[j - 1] {
                prev
            } else {
                1 + prev.min(row[j]).min(row[j - 1])
            };
            prev = temp;
        }
    }
    row[b.len()]
}

fn suggest(name: &str, candidates: &Env) -> Option<String> {
    candidates
        .keys()
        .find(|candidate| edit_distance(name, candidate) == 1)
        .cloned()
}

struct Checker<'m> {
    module: &'m Module,
    inference: &'m TypeInferenceResult,
    diagnostics: &'m mut Diagnostics,
}

impl<'m> Checker<'m> {
    fn check_expr(&mut self, expr: &Expr, env: &Env) {
        match expr {
            Expr::Identifier(e) => {
                if !env.contains_key(&e.name) {
                    let mut builder = self.diagnostics.error_staged(
                        DiagnosticStage::Semantic,
                        format!("unresolved identifier '{}'", e.name),
                        e.span.range(),
                    );
                    if let Some(candidate) = suggest(&e.name, env) {
                        builder = builder.fix(
                            format!("did you mean '{candidate}'?"),
                            candidate,
                        );
                    }
                    builder.emit();
                }
            }
            Expr::FieldAccess(e) => {
                self.check_expr(&e.base, env);
                let base_ty = self.inference.get(e.base.id()).cloned().unwrap_or(TypeExpr::Unknown);
                if let TypeExpr::Named(name) = &base_ty {
                    if let Some(def) = self.module.type_defs.get(name) {
                        if !def.fields.iter().any(|f| f.name == e.field) {
                            self.diagnostics
                                .error_staged(
                                    DiagnosticStage::Semantic,
                                    format!("struct '{name}' has no field '{}'", e.field),
                                    e.span.range(),
                                )
                                .emit();
                        }
                    }
                }
            }
            Expr::IndexAccess(e) => {
                self.check_expr(&e.base, env);
                self.check_expr(&e.index, env);
            }
            Expr::Call(e) => {
                for arg in &e.args {
                    self.check_expr(arg, env);
                }
                if let Some(def) = self.module.function_defs.get(&e.callee) {
                    if def.params.len() != e.args.len() {
                        self.diagnostics
                            .error_staged(
                                DiagnosticStage::Semantic,
                                format!(
                                    "function '{}' expects {} argument{}, found {}",
                                    e.callee,
                                    def.params.len(),
                                    if def.params.len() == 1 { "" } else { "s" },
                                    e.args.len()
                                ),
                                e.span.range(),
                            )
                            .emit();
                    }
                } else {
                    self.diagnostics
                        .error_staged(
                            DiagnosticStage::Semantic,
                            format!("undefined function '{}'", e.callee),
                            e.span.range(),
                        )
                        .emit();
                }
            }
            Expr::Binary(e) => {
                self.check_expr(&e.lhs, env);
                self.check_expr(&e.rhs, env);
                let lhs_ty = self.inference.get(e.lhs.id()).cloned().unwrap_or(TypeExpr::Unknown);
                let rhs_ty = self.inference.get(e.rhs.id()).cloned().unwrap_or(TypeExpr::Unknown);
                if lhs_ty != TypeExpr::Unknown
                    && rhs_ty != TypeExpr::Unknown
                    && operators::binary_result_type(e.op, &lhs_ty, &rhs_ty).is_none()
                {
                    self.diagnostics
                        .error_staged(
                            DiagnosticStage::Semantic,
                            format!("cannot apply operator '{}' to types '{lhs_ty}' and '{rhs_ty}'", e.op),
                            e.span.range(),
                        )
                        .emit();
                }
            }
            Expr::Unary(e) => {
                self.check_expr(&e.operand, env);
                let operand_ty = self.inference.get(e.operand.id()).cloned().unwrap_or(TypeExpr::Unknown);
                if operand_ty != TypeExpr::Unknown && operators::unary_result_type(e.op, &operand_ty).is_none() {
                    self.diagnostics
                        .error_staged(
                            DiagnosticStage::Semantic,
                            format!("cannot apply operator '{}' to type '{operand_ty}'", e.op),
                            e.span.range(),
                        )
                        .emit();
                }
            }
            Expr::Literal(_) => {}
            Expr::StructLiteral(e) => {
                for field in &e.fields {
                    self.check_expr(&field.value, env);
                }
                if let Some(def) = self.module.type_defs.get(&e.name) {
                    let declared: Vec<&str> = def.fields.iter().map(|f| f.name.as_str()).collect();
                    for field in &e.fields {
                        if !declared.contains(&field.name.as_str()) {
                            self.diagnostics
                                .error_staged(
                                    DiagnosticStage::Semantic,
                                    format!("struct '{}' has no field '{}'", e.name, field.name),
                                    field.span.range(),
                                )
                                .emit();
                        }
                    }
                    for name in declared {
                        if !e.fields.iter().any(|f| f.name == name) {
                            self.diagnostics
                                .error_staged(
                                    DiagnosticStage::Semantic,
                                    format!("struct literal '{}' is missing field '{name}'", e.name),
                                    e.span.range(),
                                )
                                .emit();
                        }
                    }
                } else {
                    self.diagnostics
                        .error_staged(
                            DiagnosticStage::Semantic,
                            format!("undefined struct type '{}'", e.name),
                            e.span.range(),
                        )
                        .emit();
                }
            }
            Expr::Match(e) => self.check_match(e, env),
            Expr::Pass(_) => {}
        }
    }

    fn check_match(&mut self, match_expr: &MatchExpr, env: &Env) {
        if let Some(scrutinee) = &match_expr.scrutinee {
            self.check_expr(scrutinee, env);
        }
        let scrutinee_ty = match_expr
            .scrutinee
            .as_ref()
            .and_then(|s| self.inference.get(s.id()).cloned());

        for arm in &match_expr.arms {
            let mut arm_env = env.clone();
            self.bind_pattern_env(&arm.pattern, scrutinee_ty.as_ref(), &mut arm_env);
            if let Some(guard) = &arm.guard {
                self.check_expr(guard, &arm_env);
                let guard_ty = self.inference.get(guard.id()).cloned().unwrap_or(TypeExpr::Unknown);
                if guard_ty != TypeExpr::Unknown && guard_ty != TypeExpr::Builtin(BuiltinType::Bool) {
                    self.diagnostics
                        .error_staged(
                            DiagnosticStage::Semantic,
                            format!("match guard must be 'bool', found '{guard_ty}'"),
                            guard.span(),
                        )
                        .emit();
                }
            }
            self.check_expr(&arm.body, &arm_env);
        }
    }

    fn bind_pattern_env(&self, pattern: &Pattern, scrutinee_ty: Option<&TypeExpr>, env: &mut Env) {
        match pattern {
            Pattern::Wildcard(_) | Pattern::Literal(_) => {}
            Pattern::Binding(p) => {
                env.insert(p.name.clone(), scrutinee_ty.cloned().unwrap_or(TypeExpr::Unknown));
            }
            Pattern::Struct(s) => {
                let fields = self
                    .module
                    .type_defs
                    .get(&s.name)
                    .map(|d| d.fields.clone());
                for field_pattern in &s.fields {
                    let field_ty = fields
                        .as_ref()
                        .and_then(|fs| fs.iter().find(|f| f.name == field_pattern.name))
                        .map(|f| f.ty.clone());
                    self.bind_pattern_env(&field_pattern.pattern, field_ty.as_ref(), env);
                }
            }
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt, env: &mut Env) {
        match stmt {
            Stmt::VariableDecl(s) => {
                self.check_expr(&s.value, env);
                if let Some(declared) = &s.declared_type {
                    let value_ty = self.inference.get(s.value.id()).cloned().unwrap_or(TypeExpr::Unknown);
                    if value_ty != TypeExpr::Unknown && declared != &value_ty {
                        self.diagnostics
                            .error_staged(
                                DiagnosticStage::Semantic,
                                format!(
                                    "cannot assign value of type '{value_ty}' to '{}' declared as '{declared}'",
                                    s.name
                                ),
                                s.span.range(),
                            )
                            .emit();
                    }
                }
                let ty = self.inference.get(s.id).cloned().unwrap_or(TypeExpr::Unknown);
                env.insert(s.name.clone(), ty);
            }
            Stmt::Assignment(s) => {
                self.check_expr(&s.target, env);
                self.check_expr(&s.value, env);
                let target_ty = self.inference.get(s.target.id()).cloned().unwrap_or(TypeExpr::Unknown);
                let value_ty = self.inference.get(s.value.id()).cloned().unwrap_or(TypeExpr::Unknown);
                if target_ty != TypeExpr::Unknown && value_ty != TypeExpr::Unknown && target_ty != value_ty {
                    self.diagnostics
                        .error_staged(
                            DiagnosticStage::Semantic,
                            format!("cannot assign value of type '{value_ty}' to target of type '{target_ty}'"),
                            s.span.range(),
                        )
                        .emit();
                }
            }
            Stmt::Return(s) => {
                if let Some(value) = &s.value {
                    self.check_expr(value, env);
                }
            }
            Stmt::Pass(_) => {}
            Stmt::Expression(s) => self.check_expr(&s.expr, env),
        }
    }

    fn check_block(&mut self, block: &Block, env: &mut Env) {
        for stmt in &block.stmts {
            self.check_stmt(stmt, env);
        }
    }

    fn check_penalty(&mut self, penalty: &Penalty) {
        if let Some((min, max)) = &penalty.imprisonment {
            if min.approx_seconds() > max.approx_seconds() {
                self.diagnostics
                    .error_staged(
                        DiagnosticStage::Semantic,
                        format!("imprisonment minimum ({min}) exceeds maximum ({max})"),
                        penalty.span.range(),
                    )
                    .emit();
            }
        }
        if let Some((min, max)) = &penalty.fine {
            if min.minor_units > max.minor_units {
                self.diagnostics
                    .error_staged(
                        DiagnosticStage::Semantic,
                        format!(
                            "fine minimum (${:.2}) exceeds maximum (${:.2})",
                            min.as_decimal(),
                            max.as_decimal()
                        ),
                        penalty.span.range(),
                    )
                    .emit();
            }
        }
    }
}

/// Runs the full inference + checking pipeline over `module`, emitting
/// diagnostics into `diagnostics`, and returns the inferred type table for
/// downstream passes (exhaustiveness, the optimizer, the English
/// transpiler) to reuse.
pub fn check_types(module: &Module, diagnostics: &mut Diagnostics) -> TypeInferenceResult {
    let inference = infer_types(module);

    {
        let mut checker = Checker {
            module,
            inference: &inference,
            diagnostics,
        };

        let mut global_env = Env::new();
        for var in &module.variables {
            checker.check_expr(&var.value, &global_env);
            let ty = checker.inference.get(var.id).cloned().unwrap_or(TypeExpr::Unknown);
            global_env.insert(var.name.clone(), ty);
        }

        for def in module.function_defs.values() {
            let mut env = global_env.clone();
            for param in &def.params {
                env.insert(param.name.clone(), param.ty.clone());
            }
            checker.check_block(&def.body, &mut env);
        }

        for statute in module.statutes.values() {
            let mut env = global_env.clone();
            for def in &statute.definitions {
                checker.check_expr(&def.value, &env);
                let ty = checker.inference.get(def.id).cloned().unwrap_or(TypeExpr::Unknown);
                env.insert(def.name.clone(), ty);
            }
            for element in &statute.elements {
                checker.check_expr(&element.description, &env);
            }
            if let Some(penalty) = &statute.penalty {
                checker.check_penalty(penalty);
            }
            for illustration in &statute.illustrations {
                if let Some(body) = &illustration.body {
                    checker.check_block(body, &mut env.clone());
                }
            }
        }
    }

    inference
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::SourceSpan;
    use indexmap::IndexMap;

    fn span() -> SourceSpan {
        SourceSpan::new(0, 1, 1, 1)
    }

    fn int_lit(id: u32, v: i64) -> Expr {
        Expr::Literal(LiteralExpr {
            id: NodeId::from_raw(id),
            span: span(),
            value: Literal::Int(v),
        })
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
    fn literal_infers_its_builtin_type() {
        let module = empty_module();
        let mut inferrer = Inferrer {
            module: &module,
            result: TypeInferenceResult::default(),
        };
        let ty = inferrer.infer_expr(&int_lit(0, 5), &Env::new());
        assert_eq!(ty, TypeExpr::Builtin(BuiltinType::Int));
    }

    #[test]
    fn mismatched_binary_operands_report_error() {
        let mut module = empty_module();
        let lhs = int_lit(1, 1);
        let rhs = Expr::Literal(LiteralExpr {
            id: NodeId::from_raw(2),
            span: span(),
            value: Literal::String("x".to_string()),
        });
        module.variables.push(VariableDeclStmt {
            id: NodeId::from_raw(3),
            span: span(),
            name: "v".to_string(),
            declared_type: None,
            value: Expr::Binary(BinaryExpr {
                id: NodeId::from_raw(4),
                span: span(),
                op: BinaryOp::Add,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            }),
        });

        let mut diagnostics = Diagnostics::new();
        check_types(&module, &mut diagnostics);
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn unresolved_identifier_reports_error() {
        let mut module = empty_module();
        module.variables.push(VariableDeclStmt {
            id: NodeId::from_raw(1),
            span: span(),
            name: "v".to_string(),
            declared_type: None,
            value: Expr::Identifier(IdentifierExpr {
                id: NodeId::from_raw(2),
                span: span(),
                name: "nonexistent".to_string(),
            }),
        });

        let mut diagnostics = Diagnostics::new();
        check_types(&module, &mut diagnostics);
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn penalty_min_exceeding_max_reports_error() {
        let mut module = empty_module();
        module.statutes.insert(
            "s377".to_string(),
            Statute {
                id: NodeId::from_raw(1),
                span: span(),
                section: "377".to_string(),
                title: None,
                definitions: Vec::new(),
                elements: Vec::new(),
                penalty: Some(Penalty {
                    id: NodeId::from_raw(2),
                    span: span(),
                    imprisonment: Some((
                        Duration {
                            years: 5,
                            ..Duration::default()
                        },
                        Duration {
                            years: 1,
                            ..Duration::default()
                        },
                    )),
                    fine: None,
                    supplementary: None,
                }),
                illustrations: Vec::new(),
            },
        );

        let mut diagnostics = Diagnostics::new();
        check_types(&module, &mut diagnostics);
        assert!(diagnostics.has_errors());
    }
}
