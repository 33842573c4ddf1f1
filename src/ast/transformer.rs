//! Rewrite traversal over the closed AST node set.
//!
//! Dual to [`super::visitor::Visitor`]: each method returns a (possibly
//! new) node of the same kind. The default implementation recurses into
//! every child, transforms it, and reassembles a node that is structurally
//! equal to the input whenever no override changed anything — this is how
//! the "Transformer identity" property (§8: the identity transformer
//! applied to `m` returns a tree structurally equal to `m`) holds without
//! needing a `Rc`-shared arena: nodes are plain owned trees (the "no
//! cycles in the AST" design note), so "structural sharing" here means
//! "the rebuilt subtree compares equal to the original", not "the same
//! heap allocation" — a deliberate simplification documented in DESIGN.md.
//!
//! Concrete passes ([`crate::optimize::constant_fold`],
//! [`crate::optimize::dead_code`]) override only `transform_expr` (and, for
//! dead-code elimination, `transform_stmt`) and call the `walk_transform_*`
//! free functions for every other kind.

use super::nodes::*;

pub trait Transformer {
    fn transform_module(&mut self, module: &Module) -> Module {
        walk_transform_module(self, module)
    }
    fn transform_struct_def(&mut self, def: &StructDef) -> StructDef {
        def.clone()
    }
    fn transform_function_def(&mut self, def: &FunctionDef) -> FunctionDef {
        walk_transform_function_def(self, def)
    }
    fn transform_statute(&mut self, statute: &Statute) -> Statute {
        walk_transform_statute(self, statute)
    }
    fn transform_element(&mut self, element: &Element) -> Element {
        walk_transform_element(self, element)
    }
    fn transform_penalty(&mut self, penalty: &Penalty) -> Penalty {
        penalty.clone()
    }
    fn transform_illustration(&mut self, illustration: &Illustration) -> Illustration {
        walk_transform_illustration(self, illustration)
    }
    fn transform_block(&mut self, block: &Block) -> Block {
        walk_transform_block(self, block)
    }
    fn transform_stmt(&mut self, stmt: &Stmt) -> Stmt {
        walk_transform_stmt(self, stmt)
    }
    fn transform_expr(&mut self, expr: &Expr) -> Expr {
        walk_transform_expr(self, expr)
    }
    fn transform_pattern(&mut self, pattern: &Pattern) -> Pattern {
        pattern.clone()
    }
    fn transform_match_arm(&mut self, arm: &MatchArm) -> MatchArm {
        walk_transform_match_arm(self, arm)
    }
}

pub fn walk_transform_module<T: Transformer + ?Sized>(t: &mut T, module: &Module) -> Module {
    let mut new_module = module.clone();
    for def in new_module.type_defs.values_mut() {
        *def = t.transform_struct_def(def);
    }
    for def in new_module.function_defs.values_mut() {
        *def = t.transform_function_def(def);
    }
    for var in &mut new_module.variables {
        let stmt = t.transform_stmt(&Stmt::VariableDecl(var.clone()));
        if let Stmt::VariableDecl(v) = stmt {
            *var = v;
        }
    }
    for statute in new_module.statutes.values_mut() {
        *statute = t.transform_statute(statute);
    }
    new_module
}

pub fn walk_transform_function_def<T: Transformer + ?Sized>(
    t: &mut T,
    def: &FunctionDef,
) -> FunctionDef {
    let mut new_def = def.clone();
    new_def.body = t.transform_block(&def.body);
    new_def
}

pub fn walk_transform_statute<T: Transformer + ?Sized>(t: &mut T, statute: &Statute) -> Statute {
    let mut new_statute = statute.clone();
    for def in &mut new_statute.definitions {
        let stmt = t.transform_stmt(&Stmt::VariableDecl(def.clone()));
        if let Stmt::VariableDecl(v) = stmt {
            *def = v;
        }
    }
    for element in &mut new_statute.elements {
        *element = t.transform_element(element);
    }
    if let Some(penalty) = &statute.penalty {
        new_statute.penalty = Some(t.transform_penalty(penalty));
    }
    for illustration in &mut new_statute.illustrations {
        *illustration = t.transform_illustration(illustration);
    }
    new_statute
}

pub fn walk_transform_element<T: Transformer + ?Sized>(t: &mut T, element: &Element) -> Element {
    let mut new_element = element.clone();
    new_element.description = t.transform_expr(&element.description);
    new_element
}

pub fn walk_transform_illustration<T: Transformer + ?Sized>(
    t: &mut T,
    illustration: &Illustration,
) -> Illustration {
    let mut new_illustration = illustration.clone();
    if let Some(body) = &illustration.body {
        new_illustration.body = Some(t.transform_block(body));
    }
    new_illustration
}

pub fn walk_transform_block<T: Transformer + ?Sized>(t: &mut T, block: &Block) -> Block {
    let stmts = block.stmts.iter().map(|s| t.transform_stmt(s)).collect();
    Block {
        id: block.id,
        span: block.span,
        stmts,
    }
}

pub fn walk_transform_stmt<T: Transformer + ?Sized>(t: &mut T, stmt: &Stmt) -> Stmt {
    match stmt {
        Stmt::VariableDecl(s) => Stmt::VariableDecl(VariableDeclStmt {
            value: t.transform_expr(&s.value),
            ..s.clone()
        }),
        Stmt::Assignment(s) => Stmt::Assignment(AssignmentStmt {
            target: t.transform_expr(&s.target),
            value: t.transform_expr(&s.value),
            ..s.clone()
        }),
        Stmt::Return(s) => Stmt::Return(ReturnStmt {
            value: s.value.as_ref().map(|v| t.transform_expr(v)),
            ..s.clone()
        }),
        Stmt::Pass(s) => Stmt::Pass(s.clone()),
        Stmt::Expression(s) => Stmt::Expression(ExpressionStmt {
            expr: t.transform_expr(&s.expr),
            ..s.clone()
        }),
    }
}

pub fn walk_transform_expr<T: Transformer + ?Sized>(t: &mut T, expr: &Expr) -> Expr {
    match expr {
        Expr::Identifier(e) => Expr::Identifier(e.clone()),
        Expr::FieldAccess(e) => Expr::FieldAccess(FieldAccessExpr {
            base: Box::new(t.transform_expr(&e.base)),
            ..e.clone()
        }),
        Expr::IndexAccess(e) => Expr::IndexAccess(IndexAccessExpr {
            base: Box::new(t.transform_expr(&e.base)),
            index: Box::new(t.transform_expr(&e.index)),
            ..e.clone()
        }),
        Expr::Call(e) => Expr::Call(CallExpr {
            args: e.args.iter().map(|a| t.transform_expr(a)).collect(),
            ..e.clone()
        }),
        Expr::Binary(e) => Expr::Binary(BinaryExpr {
            lhs: Box::new(t.transform_expr(&e.lhs)),
            rhs: Box::new(t.transform_expr(&e.rhs)),
            ..e.clone()
        }),
        Expr::Unary(e) => Expr::Unary(UnaryExpr {
            operand: Box::new(t.transform_expr(&e.operand)),
            ..e.clone()
        }),
        Expr::Literal(e) => Expr::Literal(e.clone()),
        Expr::StructLiteral(e) => Expr::StructLiteral(StructLiteralExpr {
            fields: e
                .fields
                .iter()
                .map(|f| FieldAssignment {
                    span: f.span,
                    name: f.name.clone(),
                    value: t.transform_expr(&f.value),
                })
                .collect(),
            ..e.clone()
        }),
        Expr::Match(e) => Expr::Match(Box::new(MatchExpr {
            id: e.id,
            span: e.span,
            scrutinee: e.scrutinee.as_ref().map(|s| t.transform_expr(s)),
            arms: e.arms.iter().map(|a| t.transform_match_arm(a)).collect(),
            ensure_exhaustiveness: e.ensure_exhaustiveness,
        })),
        Expr::Pass(e) => Expr::Pass(e.clone()),
    }
}

pub fn walk_transform_match_arm<T: Transformer + ?Sized>(t: &mut T, arm: &MatchArm) -> MatchArm {
    MatchArm {
        span: arm.span,
        pattern: t.transform_pattern(&arm.pattern),
        guard: arm.guard.as_ref().map(|g| t.transform_expr(g)),
        body: t.transform_expr(&arm.body),
    }
}
