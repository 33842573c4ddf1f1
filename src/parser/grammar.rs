//! Recursive-descent grammar for the Yuho statute DSL.
//!
//! Each `parse_*` function assumes the parser is positioned (modulo
//! trivia) at the start of its production and leaves it positioned right
//! after. Productions that can fail internally still leave a tree behind:
//! malformed input is wrapped in an `Error` node and the parser
//! resynchronizes at the next recognizable item/statement boundary.

use super::core::Parser;
use super::cst::SyntaxKind::{self, *};
use super::cst::{TokenSet, token_sets};

pub(super) fn parse_module(p: &mut Parser) {
    p.start_node(Module);
    while !p.should_stop() {
        match p.peek() {
            KwImport => parse_import(p),
            KwStruct => parse_struct_def(p),
            KwFn => parse_function_def(p),
            KwStatute => parse_statute(p),
            KwLet => parse_variable_decl(p),
            _ => {
                if p.eof() {
                    break;
                }
                p.error_recover(
                    "expected an import, struct, function, statute, or variable declaration",
                    token_sets::ITEM_FIRST,
                );
            }
        }
    }
    p.finish_node();
}

/// Recognizes all three import forms from the source-file grammar:
/// `import "path";`, `import * from "path";`, and
/// `import { a, b } from "path";` (plus a bare dotted-path shorthand,
/// `import a.b.c;`, treated the same as a whole-module import).
fn parse_import(p: &mut Parser) {
    p.start_node(Import);
    p.bump(); // 'import'
    match p.peek() {
        StringLit => {
            p.bump();
        }
        Star => {
            p.bump();
            p.expect(KwFrom, "'from'");
            p.expect(StringLit, "a module path string");
        }
        BraceOpen => {
            p.bump();
            while p.peek() != BraceClose && !p.should_stop() {
                p.expect(Id, "an imported name");
                if p.peek() != BraceClose {
                    p.eat(Comma);
                }
            }
            p.expect(BraceClose, "'}'");
            p.expect(KwFrom, "'from'");
            p.expect(StringLit, "a module path string");
        }
        _ => {
            p.expect(Id, "a module path");
            while p.peek() == Dot {
                p.bump();
                p.expect(Id, "a path segment");
            }
        }
    }
    p.eat(Semicolon);
    p.finish_node();
}

fn parse_struct_def(p: &mut Parser) {
    p.start_node(StructDef);
    p.bump(); // 'struct'
    p.expect(Id, "a struct name");
    if p.expect(BraceOpen, "'{'") {
        while p.peek() != BraceClose && !p.should_stop() {
            parse_field_def(p);
            if p.peek() != BraceClose {
                p.eat(Comma);
            }
        }
        p.expect(BraceClose, "'}'");
    }
    p.finish_node();
}

fn parse_field_def(p: &mut Parser) {
    p.start_node(FieldDef);
    p.expect(Id, "a field name");
    p.expect(Colon, "':'");
    parse_type(p);
    p.finish_node();
}

fn parse_function_def(p: &mut Parser) {
    p.start_node(FunctionDef);
    p.bump(); // 'fn'
    p.expect(Id, "a function name");
    parse_param_list(p);
    if p.eat(Arrow) {
        parse_type(p);
    }
    parse_block(p);
    p.finish_node();
}

fn parse_param_list(p: &mut Parser) {
    p.start_node(ParamList);
    if p.expect(ParenOpen, "'('") {
        while p.peek() != ParenClose && !p.should_stop() {
            parse_param(p);
            if p.peek() != ParenClose {
                p.eat(Comma);
            }
        }
        p.expect(ParenClose, "')'");
    }
    p.finish_node();
}

fn parse_param(p: &mut Parser) {
    p.start_node(ParamDef);
    p.expect(Id, "a parameter name");
    p.expect(Colon, "':'");
    parse_type(p);
    p.finish_node();
}

fn parse_statute(p: &mut Parser) {
    p.start_node(Statute);
    p.bump(); // 'statute'
    p.expect(Id, "a statute name");
    if p.peek() == StringLit {
        p.bump(); // optional title
    }
    if p.expect(BraceOpen, "'{'") {
        while p.peek() != BraceClose && !p.should_stop() {
            match p.peek() {
                KwLet => parse_variable_decl(p),
                KwElement => parse_element(p),
                KwPenalty => parse_penalty(p),
                KwIllustration => parse_illustration(p),
                _ => p.error_recover(
                    "expected a definition, element, penalty, or illustration",
                    TokenSet::new(&[KwLet, KwElement, KwPenalty, KwIllustration, BraceClose]),
                ),
            }
        }
        p.expect(BraceClose, "'}'");
    }
    p.finish_node();
}

fn parse_element(p: &mut Parser) {
    p.start_node(Element);
    p.bump(); // 'element'
    if p.peek() == StringLit || p.peek() == Id {
        p.bump();
    }
    parse_block(p);
    p.finish_node();
}

fn parse_penalty(p: &mut Parser) {
    p.start_node(Penalty);
    p.bump(); // 'penalty'
    parse_block(p);
    p.finish_node();
}

fn parse_illustration(p: &mut Parser) {
    p.start_node(Illustration);
    p.bump(); // 'illustration'
    if p.peek() == StringLit {
        p.bump();
    } else {
        parse_block(p);
    }
    p.finish_node();
}

// ---------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------

fn parse_type(p: &mut Parser) {
    let checkpoint = p.checkpoint();
    match p.peek() {
        k if k.is_builtin_type_keyword() => {
            p.bump();
            p.start_node_at(checkpoint, TypeBuiltin);
            p.finish_node();
        }
        BracketOpen => {
            p.bump();
            p.expect(BracketClose, "']'");
            parse_type(p);
            p.start_node_at(checkpoint, TypeArray);
            p.finish_node();
        }
        Id => {
            p.bump();
            if p.peek() == Lt {
                p.bump();
                p.start_node(TypeGenericArgs);
                parse_type(p);
                while p.eat(Comma) {
                    parse_type(p);
                }
                p.expect(Gt, "'>'");
                p.finish_node();
                p.start_node_at(checkpoint, TypeGeneric);
            } else {
                p.start_node_at(checkpoint, TypeNamed);
            }
            p.finish_node();
        }
        _ => {
            p.error_msg("expected a type");
            return;
        }
    }

    if p.peek() == Question {
        p.bump();
        p.start_node_at(checkpoint, TypeOptional);
        p.finish_node();
    }
}

// ---------------------------------------------------------------------
// Statements / blocks
// ---------------------------------------------------------------------

fn parse_block(p: &mut Parser) {
    p.start_node(Block);
    if p.expect(BraceOpen, "'{'") {
        while p.peek() != BraceClose && !p.should_stop() {
            parse_stmt(p);
        }
        p.expect(BraceClose, "'}'");
    }
    p.finish_node();
}

fn parse_stmt(p: &mut Parser) {
    match p.peek() {
        KwLet => parse_variable_decl(p),
        KwReturn => parse_return_stmt(p),
        KwPass => parse_pass_stmt(p),
        _ => parse_expr_or_assignment_stmt(p),
    }
}

fn parse_variable_decl(p: &mut Parser) {
    p.start_node(VariableDecl);
    p.bump(); // 'let'
    p.expect(Id, "a variable name");
    if p.eat(Colon) {
        parse_type(p);
    }
    p.expect(Equals, "'='");
    parse_expr(p);
    p.eat(Semicolon);
    p.finish_node();
}

fn parse_return_stmt(p: &mut Parser) {
    p.start_node(ReturnStmt);
    p.bump(); // 'return'
    if p.peek() != Semicolon && p.peek() != BraceClose {
        parse_expr(p);
    }
    p.eat(Semicolon);
    p.finish_node();
}

fn parse_pass_stmt(p: &mut Parser) {
    p.start_node(PassStmt);
    p.bump(); // 'pass'
    p.eat(Semicolon);
    p.finish_node();
}

/// Disambiguates `ident = expr;` (assignment) from a bare expression
/// statement by parsing a full expression first, then checking for `=`.
fn parse_expr_or_assignment_stmt(p: &mut Parser) {
    let checkpoint = p.checkpoint();
    parse_expr(p);
    if p.peek() == Equals {
        p.bump();
        parse_expr(p);
        p.eat(Semicolon);
        p.start_node_at(checkpoint, AssignmentStmt);
        p.finish_node();
    } else {
        p.eat(Semicolon);
        p.start_node_at(checkpoint, ExpressionStmt);
        p.finish_node();
    }
}

// ---------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------

/// Binary-operator precedence levels, loosest-binding first.
const BINARY_LEVELS: &[&[SyntaxKind]] = &[
    &[OrOr],
    &[AndAnd],
    &[EqEq, NotEq],
    &[Lt, LtEq, Gt, GtEq],
    &[Plus, Minus],
    &[Star, Slash, Modulo],
];

pub(super) fn parse_expr(p: &mut Parser) {
    parse_binary_expr(p, 0);
}

fn parse_binary_expr(p: &mut Parser, level: usize) {
    if !p.enter_recursion() {
        return;
    }

    if level >= BINARY_LEVELS.len() {
        parse_unary_expr(p);
        p.exit_recursion();
        return;
    }

    let checkpoint = p.checkpoint();
    parse_binary_expr(p, level + 1);

    while BINARY_LEVELS[level].contains(&p.peek()) && !p.should_stop() {
        p.bump();
        parse_binary_expr(p, level + 1);
        p.start_node_at(checkpoint, ExprBinary);
        p.finish_node();
    }

    p.exit_recursion();
}

fn parse_unary_expr(p: &mut Parser) {
    if matches!(p.peek(), Bang | Minus) {
        let checkpoint = p.checkpoint();
        p.bump();
        parse_unary_expr(p);
        p.start_node_at(checkpoint, ExprUnary);
        p.finish_node();
    } else {
        parse_postfix_expr(p);
    }
}

fn parse_postfix_expr(p: &mut Parser) {
    let checkpoint = p.checkpoint();
    parse_primary_expr(p);

    loop {
        match p.peek() {
            Dot => {
                p.bump();
                p.expect(Id, "a field name");
                p.start_node_at(checkpoint, ExprFieldAccess);
                p.finish_node();
            }
            BracketOpen => {
                p.bump();
                parse_expr(p);
                p.expect(BracketClose, "']'");
                p.start_node_at(checkpoint, ExprIndexAccess);
                p.finish_node();
            }
            ParenOpen => {
                parse_arg_list(p);
                p.start_node_at(checkpoint, ExprCall);
                p.finish_node();
            }
            _ => break,
        }
    }
}

fn parse_arg_list(p: &mut Parser) {
    p.start_node(ExprArgList);
    p.bump(); // '('
    while p.peek() != ParenClose && !p.should_stop() {
        parse_expr(p);
        if p.peek() != ParenClose {
            p.eat(Comma);
        }
    }
    p.expect(ParenClose, "')'");
    p.finish_node();
}

fn parse_primary_expr(p: &mut Parser) {
    match p.peek() {
        k if token_sets::LITERAL_FIRST.contains(k) => {
            p.start_node(ExprLiteral);
            p.bump();
            p.finish_node();
        }
        ParenOpen => {
            p.bump();
            parse_expr(p);
            p.expect(ParenClose, "')'");
        }
        KwMatch => parse_match_expr(p),
        KwPass => {
            p.start_node(ExprPass);
            p.bump();
            p.finish_node();
        }
        Id => {
            let checkpoint = p.checkpoint();
            p.bump();
            if p.peek() == BraceOpen && looks_like_struct_literal(p) {
                parse_struct_literal_body(p);
                p.start_node_at(checkpoint, ExprStructLiteral);
                p.finish_node();
            } else {
                p.start_node_at(checkpoint, ExprIdentifier);
                p.finish_node();
            }
        }
        _ => {
            p.error_msg("expected an expression");
        }
    }
}

/// A `{` after an identifier starts a struct literal only if it is
/// followed by `field : expr` or an immediate `}` (empty literal) —
/// otherwise it belongs to an enclosing construct (e.g. the scrutinee of
/// `match x { ... }`, handled separately by `parse_match_expr`).
fn looks_like_struct_literal(p: &mut Parser) -> bool {
    p.peek_nth(1) == BraceClose || (p.peek_nth(1) == Id && p.peek_nth(2) == Colon)
}

fn parse_struct_literal_body(p: &mut Parser) {
    p.bump(); // '{'
    while p.peek() != BraceClose && !p.should_stop() {
        p.start_node(FieldAssignment);
        p.expect(Id, "a field name");
        p.expect(Colon, "':'");
        parse_expr(p);
        p.finish_node();
        if p.peek() != BraceClose {
            p.eat(Comma);
        }
    }
    p.expect(BraceClose, "'}'");
}

fn parse_match_expr(p: &mut Parser) {
    p.start_node(ExprMatch);
    p.bump(); // 'match'
    parse_expr(p);
    if p.expect(BraceOpen, "'{'") {
        p.start_node(MatchArmList);
        while p.peek() != BraceClose && !p.should_stop() {
            parse_match_arm(p);
        }
        p.finish_node();
        p.expect(BraceClose, "'}'");
    }
    p.finish_node();
}

fn parse_match_arm(p: &mut Parser) {
    p.start_node(MatchArm);
    parse_pattern(p);
    if p.eat(KwIf) {
        parse_expr(p);
    }
    p.expect(FatArrow, "'=>'");
    parse_expr(p);
    if p.peek() != BraceClose {
        p.eat(Comma);
    }
    p.finish_node();
}

// ---------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------

fn parse_pattern(p: &mut Parser) {
    match p.peek() {
        Underscore => {
            p.start_node(PatternWildcard);
            p.bump();
            p.finish_node();
        }
        k if token_sets::LITERAL_FIRST.contains(k) => {
            p.start_node(PatternLiteral);
            p.bump();
            p.finish_node();
        }
        Id => {
            let checkpoint = p.checkpoint();
            p.bump();
            if p.peek() == BraceOpen {
                p.bump();
                while p.peek() != BraceClose && !p.should_stop() {
                    parse_field_pattern(p);
                    if p.peek() != BraceClose {
                        p.eat(Comma);
                    }
                }
                p.expect(BraceClose, "'}'");
                p.start_node_at(checkpoint, PatternStruct);
            } else {
                p.start_node_at(checkpoint, PatternBinding);
            }
            p.finish_node();
        }
        _ => {
            p.error_msg("expected a pattern");
        }
    }
}

fn parse_field_pattern(p: &mut Parser) {
    p.start_node(PatternField);
    p.expect(Id, "a field name");
    p.expect(Colon, "':'");
    parse_pattern(p);
    p.finish_node();
}
