//! Lexers that recognize the shape of operand text.
//!
//! IL operands are classified one at a time, so these lexers only ever see
//! a single operand and the question is whether the whole operand is one
//! token of a given kind.
use logos::{Lexer, Logos};

/// The lexical shapes that an untyped operand may have.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    #[regex(r"-?[0-9]+")]
    Integer,

    #[regex(r"-?[0-9]+\.[0-9]+")]
    Real,

    #[regex(r"-?[0-9]+\.[0-9]+[eE][+-]?[0-9]+")]
    RealExp,

    /// A name, optionally with member access such as `TON1.Q`.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*")]
    Identifier,
}

/// Returns the shape of the text when the entire text is exactly one token.
pub fn shape(text: &str) -> Option<Shape> {
    let mut lexer = Shape::lexer(text);
    match lexer.next() {
        Some(Ok(shape)) if lexer.span() == (0..text.len()) => Some(shape),
        _ => None,
    }
}

pub fn is_identifier(text: &str) -> bool {
    shape(text) == Some(Shape::Identifier)
}

fn segment_value(lex: &mut Lexer<DurationSegment>, suffix: usize) -> u64 {
    let slice = lex.slice();
    // The regex guarantees digits so the only failure is overflow
    slice[..slice.len() - suffix].parse().unwrap_or(u64::MAX)
}

/// One segment of a duration literal such as the `30M` in `T#1H30M`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationSegment {
    #[regex(r"[0-9]+H", |lex| segment_value(lex, 1))]
    Hours(u64),

    #[regex(r"[0-9]+M", |lex| segment_value(lex, 1))]
    Minutes(u64),

    #[regex(r"[0-9]+S", |lex| segment_value(lex, 1))]
    Seconds(u64),

    #[regex(r"[0-9]+MS", |lex| segment_value(lex, 2))]
    Milliseconds(u64),
}
