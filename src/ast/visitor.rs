//! Read-only traversal over the closed AST node set.
//!
//! A `Visitor` dispatches on node kind; the default per-kind method just
//! recurses into children and returns nothing. Concrete analyses (constant
//! folding's sibling, exhaustiveness, reachability, `Module::references()`)
//! override only the kinds they care about and otherwise fall through to
//! the `walk_*` free functions, which guarantee every child is visited
//! exactly once, in declaration/textual order — the same guarantee the
//! dual [`super::transformer::Transformer`] framework makes for rewrites.

use super::nodes::*;

#[allow(unused_variables)]
pub trait Visitor {
    fn visit_module(&mut self, module: &Module) {
        walk_module(self, module);
    }
    fn visit_import(&mut self, import: &Import) {}
    fn visit_struct_def(&mut self, def: &StructDef) {
        walk_struct_def(self, def);
    }
    fn visit_field_def(&mut self, field: &FieldDef) {}
    fn visit_function_def(&mut self, def: &FunctionDef) {
        walk_function_def(self, def);
    }
    fn visit_param_def(&mut self, param: &ParamDef) {}
    fn visit_statute(&mut self, statute: &Statute) {
        walk_statute(self, statute);
    }
    fn visit_element(&mut self, element: &Element) {
        walk_element(self, element);
    }
    fn visit_penalty(&mut self, penalty: &Penalty) {}
    fn visit_illustration(&mut self, illustration: &Illustration) {
        walk_illustration(self, illustration);
    }
    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }
    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }
    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }
    fn visit_pattern(&mut self, pattern: &Pattern) {
        walk_pattern(self, pattern);
    }
    fn visit_field_pattern(&mut self, field: &FieldPattern) {
        self.visit_pattern(&field.pattern);
    }
    fn visit_match_arm(&mut self, arm: &MatchArm) {
        walk_match_arm(self, arm);
    }
    fn visit_type_expr(&mut self, ty: &TypeExpr) {
        walk_type_expr(self, ty);
    }
}

pub fn walk_module<V: Visitor + ?Sized>(v: &mut V, module: &Module) {
    for import in &module.imports {
        v.visit_import(import);
    }
    for def in module.type_defs.values() {
        v.visit_struct_def(def);
    }
    for def in module.function_defs.values() {
        v.visit_function_def(def);
    }
    for var in &module.variables {
        v.visit_stmt(&Stmt::VariableDecl(var.clone()));
    }
    for statute in module.statutes.values() {
        v.visit_statute(statute);
    }
}

pub fn walk_struct_def<V: Visitor + ?Sized>(v: &mut V, def: &StructDef) {
    for field in &def.fields {
        v.visit_field_def(field);
        v.visit_type_expr(&field.ty);
    }
}

pub fn walk_function_def<V: Visitor + ?Sized>(v: &mut V, def: &FunctionDef) {
    for param in &def.params {
        v.visit_param_def(param);
        v.visit_type_expr(&param.ty);
    }
    if let Some(ret) = &def.return_type {
        v.visit_type_expr(ret);
    }
    v.visit_block(&def.body);
}

pub fn walk_statute<V: Visitor + ?Sized>(v: &mut V, statute: &Statute) {
    for def in &statute.definitions {
        v.visit_stmt(&Stmt::VariableDecl(def.clone()));
    }
    for element in &statute.elements {
        v.visit_element(element);
    }
    if let Some(penalty) = &statute.penalty {
        v.visit_penalty(penalty);
    }
    for illustration in &statute.illustrations {
        v.visit_illustration(illustration);
    }
}

pub fn walk_element<V: Visitor + ?Sized>(v: &mut V, element: &Element) {
    v.visit_expr(&element.description);
}

pub fn walk_illustration<V: Visitor + ?Sized>(v: &mut V, illustration: &Illustration) {
    if let Some(body) = &illustration.body {
        v.visit_block(body);
    }
}

pub fn walk_block<V: Visitor + ?Sized>(v: &mut V, block: &Block) {
    for stmt in &block.stmts {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::VariableDecl(s) => {
            if let Some(ty) = &s.declared_type {
                v.visit_type_expr(ty);
            }
            v.visit_expr(&s.value);
        }
        Stmt::Assignment(s) => {
            v.visit_expr(&s.target);
            v.visit_expr(&s.value);
        }
        Stmt::Return(s) => {
            if let Some(value) = &s.value {
                v.visit_expr(value);
            }
        }
        Stmt::Pass(_) => {}
        Stmt::Expression(s) => v.visit_expr(&s.expr),
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Expr) {
    match expr {
        Expr::Identifier(_) => {}
        Expr::FieldAccess(e) => v.visit_expr(&e.base),
        Expr::IndexAccess(e) => {
            v.visit_expr(&e.base);
            v.visit_expr(&e.index);
        }
        Expr::Call(e) => {
            for arg in &e.args {
                v.visit_expr(arg);
            }
        }
        Expr::Binary(e) => {
            v.visit_expr(&e.lhs);
            v.visit_expr(&e.rhs);
        }
        Expr::Unary(e) => v.visit_expr(&e.operand),
        Expr::Literal(_) => {}
        Expr::StructLiteral(e) => {
            for field in &e.fields {
                v.visit_expr(&field.value);
            }
        }
        Expr::Match(e) => {
            if let Some(scrutinee) = &e.scrutinee {
                v.visit_expr(scrutinee);
            }
            for arm in &e.arms {
                v.visit_match_arm(arm);
            }
        }
        Expr::Pass(_) => {}
    }
}

pub fn walk_match_arm<V: Visitor + ?Sized>(v: &mut V, arm: &MatchArm) {
    v.visit_pattern(&arm.pattern);
    if let Some(guard) = &arm.guard {
        v.visit_expr(guard);
    }
    v.visit_expr(&arm.body);
}

pub fn walk_pattern<V: Visitor + ?Sized>(v: &mut V, pattern: &Pattern) {
    if let Pattern::Struct(s) = pattern {
        for field in &s.fields {
            v.visit_field_pattern(field);
        }
    }
}

pub fn walk_type_expr<V: Visitor + ?Sized>(v: &mut V, ty: &TypeExpr) {
    match ty {
        TypeExpr::Generic { args, .. } => {
            for arg in args {
                v.visit_type_expr(arg);
            }
        }
        TypeExpr::Optional(inner) | TypeExpr::Array(inner) => v.visit_type_expr(inner),
        _ => {}
    }
}
