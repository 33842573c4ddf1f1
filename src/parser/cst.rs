//! Syntax kinds for the Yuho statute DSL.
//!
//! `SyntaxKind` serves dual roles: token kinds (from the lexer) and node
//! kinds (from the parser). Logos derives token recognition; node kinds
//! lack token/regex attributes. `YuhoLang` implements Rowan's `Language`
//! trait for tree construction. This dual-role design, and the
//! `#[repr(u16)]` transmute bridge to `rowan::SyntaxKind`, follows the
//! query-language parser this crate's pipeline is modeled on.

#![allow(dead_code)]

use logos::Logos;
use rowan::Language;

/// All token and node kinds. Tokens first, then trivia/error, then nodes,
/// then the `__LAST` sentinel. `#[repr(u16)]` enables safe transmute in
/// `kind_from_raw`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    // --- Punctuation ---
    #[token("(")]
    ParenOpen = 0,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    /// `:=`, the `case <pattern> := <body>` arm separator (spec §6.1/§7).
    #[token(":=")]
    ColonEquals,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("_")]
    Underscore,
    #[token("?")]
    Question,

    // --- Operators ---
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("=")]
    Equals,
    #[token("!")]
    Bang,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Modulo,

    // --- Keywords ---
    #[token("import")]
    KwImport,
    #[token("from")]
    KwFrom,
    #[token("struct")]
    KwStruct,
    #[token("fn")]
    KwFn,
    #[token("let")]
    KwLet,
    #[token("return")]
    KwReturn,
    #[token("pass")]
    KwPass,
    #[token("match")]
    KwMatch,
    #[token("if")]
    KwIf,
    #[token("statute")]
    KwStatute,
    #[token("element")]
    KwElement,
    #[token("penalty")]
    KwPenalty,
    #[token("illustration")]
    KwIllustration,
    #[token("true")]
    #[token("TRUE")]
    KwTrue,
    #[token("false")]
    #[token("FALSE")]
    KwFalse,
    #[token("case")]
    KwCase,
    #[token("int")]
    KwInt,
    #[token("float")]
    KwFloat,
    #[token("bool")]
    KwBool,
    #[token("string")]
    KwString,
    #[token("money")]
    KwMoney,
    #[token("percent")]
    KwPercent,
    #[token("date")]
    KwDate,
    #[token("duration")]
    KwDuration,

    // --- Literals ---
    /// `YYYY-MM-DD`. Declared before `FloatLit`/`IntLit` so maximal munch
    /// prefers the longer date form over `int MINUS int MINUS int`.
    #[regex(r"[0-9]{4}-[0-9]{2}-[0-9]{2}")]
    DateLit,
    /// `$123`, `$123.45`, or with thousands separators, `$1,000.00`.
    #[regex(r"\$[0-9]{1,3}(,[0-9]{3})*(\.[0-9]{1,2})?")]
    #[regex(r"\$[0-9]+(\.[0-9]{1,2})?")]
    MoneyLit,
    /// `12%` or `12.5%`. No whitespace allowed before `%`, so `12 % 2`
    /// lexes as `IntLit Modulo IntLit` (arithmetic modulo) while `12%`
    /// lexes as a single percent literal.
    #[regex(r"[0-9]+(\.[0-9]+)?%")]
    PercentLit,
    /// One or more `<int><unit>` components with no separating
    /// whitespace, e.g. `1y6mo`, `3d12h`, `30min`; or the spec's §6.1
    /// spelled-out, comma-separated form, e.g. `5 years, 3 months, 2 days`.
    #[regex(r"[0-9]+(y|mo|d|h|min|s)(?:[0-9]+(?:y|mo|d|h|min|s))*")]
    #[regex(r"[0-9]+ (years|year|months|month|days|day|hours|hour|minutes|minute|seconds|second)(, [0-9]+ (years|year|months|month|days|day|hours|hour|minutes|minute|seconds|second))*")]
    DurationLit,
    #[regex(r"[0-9]+\.[0-9]+")]
    FloatLit,
    #[regex(r"[0-9]+")]
    IntLit,
    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    StringLit,

    /// Identifier. Declared after keywords so exact keyword tokens win.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Id,

    // --- Trivia / error ---
    #[regex(r"[ \t]+")]
    Whitespace,
    #[token("\n")]
    #[token("\r\n")]
    Newline,
    #[regex(r"//[^\n]*", allow_greedy = true)]
    LineComment,
    #[regex(r"/\*(?:[^*]|\*[^/])*\*/")]
    BlockComment,

    /// Coalesced unrecognized characters.
    Garbage,
    Error,

    // --- Node kinds (non-terminals) ---
    Module,
    Import,
    StructDef,
    FieldDef,
    FunctionDef,
    ParamDef,
    ParamList,
    Block,
    VariableDecl,
    AssignmentStmt,
    ReturnStmt,
    PassStmt,
    ExpressionStmt,
    Statute,
    Element,
    Penalty,
    Illustration,

    TypeBuiltin,
    TypeNamed,
    TypeGeneric,
    TypeGenericArgs,
    TypeOptional,
    TypeArray,

    ExprLiteral,
    ExprIdentifier,
    ExprFieldAccess,
    ExprIndexAccess,
    ExprCall,
    ExprArgList,
    ExprBinary,
    ExprUnary,
    ExprPass,
    ExprStructLiteral,
    ExprMatch,
    FieldAssignment,
    MatchArm,
    MatchArmList,

    PatternWildcard,
    PatternLiteral,
    PatternBinding,
    PatternStruct,
    PatternField,

    DurationComponent,

    // Must be last - used for bounds checking in `kind_from_raw`.
    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | Newline | LineComment | BlockComment)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Error | Garbage)
    }

    #[inline]
    pub fn is_builtin_type_keyword(self) -> bool {
        matches!(
            self,
            KwInt | KwFloat | KwBool | KwString | KwMoney | KwPercent | KwDate | KwDuration
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language tag for Rowan's tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum YuhoLang {}

impl Language for YuhoLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: bounds checked above, and SyntaxKind is repr(u16).
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<YuhoLang>;
pub type SyntaxToken = rowan::SyntaxToken<YuhoLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// 128-bit bitset of `SyntaxKind`s for O(1) membership testing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u128);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    #[inline]
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u128;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 128, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn single(kind: SyntaxKind) -> Self {
        let kind = kind as u16;
        assert!(kind < 128, "SyntaxKind value exceeds TokenSet capacity");
        TokenSet(1 << kind)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        if kind >= 128 {
            return false;
        }
        self.0 & (1 << kind) != 0
    }

    #[inline]
    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_set();
        for i in 0..128u16 {
            if self.0 & (1 << i) != 0 && i < __LAST as u16 {
                let kind: SyntaxKind = unsafe { std::mem::transmute(i) };
                list.entry(&kind);
            }
        }
        list.finish()
    }
}

/// Pre-defined token sets for the parser: FIRST sets and recovery sets.
pub mod token_sets {
    use super::*;

    pub const TRIVIA: TokenSet = TokenSet::new(&[Whitespace, Newline, LineComment, BlockComment]);

    pub const LITERAL_FIRST: TokenSet = TokenSet::new(&[
        IntLit,
        FloatLit,
        StringLit,
        MoneyLit,
        PercentLit,
        DateLit,
        DurationLit,
        KwTrue,
        KwFalse,
    ]);

    /// FIRST set of a primary expression.
    pub const EXPR_FIRST: TokenSet = LITERAL_FIRST.union(TokenSet::new(&[
        ParenOpen,
        Id,
        Bang,
        Minus,
        KwMatch,
        KwPass,
    ]));

    pub const TYPE_FIRST: TokenSet = TokenSet::new(&[
        KwInt, KwFloat, KwBool, KwString, KwMoney, KwPercent, KwDate, KwDuration, Id, BracketOpen,
    ]);

    pub const PATTERN_FIRST: TokenSet = LITERAL_FIRST.union(TokenSet::new(&[Underscore, Id]));

    /// Top-level item keywords: used for module-level error recovery.
    pub const ITEM_FIRST: TokenSet = TokenSet::new(&[
        KwImport,
        KwStruct,
        KwFn,
        KwStatute,
        KwLet,
    ]);

    pub const STMT_FIRST: TokenSet = EXPR_FIRST.union(TokenSet::new(&[
        KwLet,
        KwReturn,
        KwPass,
        Id,
    ]));

    pub const BLOCK_RECOVERY: TokenSet = TokenSet::new(&[BraceClose, Semicolon]);
}
