//! Lexer for the Yuho statute DSL.
//!
//! Produces span-based tokens without storing text; text is sliced from
//! source only when needed.
//!
//! ## Error handling
//!
//! The lexer coalesces consecutive error characters into single `Garbage`
//! tokens rather than producing one error per character, keeping the token
//! stream manageable for malformed input.

use logos::Logos;
use rowan::TextRange;
use std::ops::Range;

use super::cst::SyntaxKind;

/// Zero-copy token: kind + span, text retrieved via [`token_text`] when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

impl Token {
    #[inline]
    pub fn new(kind: SyntaxKind, span: TextRange) -> Self {
        Self { kind, span }
    }
}

fn range_to_text_range(range: Range<usize>) -> TextRange {
    TextRange::new((range.start as u32).into(), (range.end as u32).into())
}

/// Tokenizes source into a vector of span-based tokens, coalescing
/// consecutive lexer errors into single `Garbage` tokens.
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = SyntaxKind::lexer(source);
    let mut error_start: Option<usize> = None;

    loop {
        match lexer.next() {
            Some(Ok(kind)) => {
                if let Some(start) = error_start.take() {
                    let end = lexer.span().start;
                    tokens.push(Token::new(
                        SyntaxKind::Garbage,
                        range_to_text_range(start..end),
                    ));
                }
                tokens.push(Token::new(kind, range_to_text_range(lexer.span())));
            }
            Some(Err(())) => {
                if error_start.is_none() {
                    error_start = Some(lexer.span().start);
                }
            }
            None => {
                if let Some(start) = error_start.take() {
                    tokens.push(Token::new(
                        SyntaxKind::Garbage,
                        range_to_text_range(start..source.len()),
                    ));
                }
                break;
            }
        }
    }

    tokens
}

/// Retrieves the text slice for a token. O(1) slice into source.
#[inline]
pub fn token_text<'src>(source: &'src str, token: &Token) -> &'src str {
    &source[std::ops::Range::<usize>::from(token.span)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use SyntaxKind::*;

    fn kinds(source: &str) -> Vec<SyntaxKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_keywords_over_identifiers() {
        assert_eq!(kinds("struct fn statute"), vec![KwStruct, Whitespace, KwFn, Whitespace, KwStatute]);
    }

    #[test]
    fn lexes_money_literal() {
        assert_eq!(kinds("$100.50"), vec![MoneyLit]);
    }

    #[test]
    fn lexes_percent_literal_vs_modulo() {
        assert_eq!(kinds("12%"), vec![PercentLit]);
        assert_eq!(kinds("12 % 2"), vec![IntLit, Whitespace, Modulo, Whitespace, IntLit]);
    }

    #[test]
    fn lexes_date_literal_over_subtraction() {
        assert_eq!(kinds("2024-01-01"), vec![DateLit]);
    }

    #[test]
    fn lexes_duration_literal() {
        assert_eq!(kinds("1y6mo"), vec![DurationLit]);
    }

    #[test]
    fn coalesces_garbage() {
        assert_eq!(kinds("@#^"), vec![Garbage]);
    }
}
