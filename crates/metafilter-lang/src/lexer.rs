//! Lexer for CQL using logos.

use crate::span::Span;
use logos::Logos;

/// Token types for CQL. Keywords are case-insensitive.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // Logical operators
    #[token("and", ignore(ascii_case))]
    And,
    #[token("or", ignore(ascii_case))]
    Or,
    #[token("not", ignore(ascii_case))]
    Not,

    // Pattern operators
    #[token("like", ignore(ascii_case))]
    Like,
    #[token("ilike", ignore(ascii_case))]
    ILike,

    // Temporal operators
    #[token("before", ignore(ascii_case))]
    Before,
    #[token("after", ignore(ascii_case))]
    After,
    #[token("during", ignore(ascii_case))]
    During,

    // Spatial functions
    #[token("intersects", ignore(ascii_case))]
    Intersects,
    #[token("dwithin", ignore(ascii_case))]
    DWithin,

    // Literals
    #[token("true", ignore(ascii_case))]
    True,
    #[token("false", ignore(ascii_case))]
    False,

    // Well-known text geometry keywords
    #[token("point", ignore(ascii_case))]
    Point,
    #[token("linestring", ignore(ascii_case))]
    LineString,
    #[token("polygon", ignore(ascii_case))]
    Polygon,
    #[token("multipoint", ignore(ascii_case))]
    MultiPoint,
    #[token("multilinestring", ignore(ascii_case))]
    MultiLineString,
    #[token("multipolygon", ignore(ascii_case))]
    MultiPolygon,
    #[token("geometrycollection", ignore(ascii_case))]
    GeometryCollection,

    // Comparison operators
    #[token("=")]
    Eq,
    #[token("<>")]
    #[token("!=")]
    Ne,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    // Date-time literal (ISO 8601, date or date-time)
    #[regex(
        r"[0-9]{4}-[0-9]{2}-[0-9]{2}(T[0-9]{2}:[0-9]{2}(:[0-9]{2}(\.[0-9]+)?)?(Z|[+-][0-9]{2}(:?[0-9]{2})?)?)?",
        |lex| lex.slice().to_string()
    )]
    DateTime(String),

    // Integer literal; wider than i64 is lexed as a float
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    // Float literal, with a fraction or an exponent or both
    #[regex(
        r"-?[0-9]+(\.[0-9]+([eE][+-]?[0-9]+)?|[eE][+-]?[0-9]+)",
        |lex| lex.slice().parse::<f64>().ok()
    )]
    Float(f64),

    // Property name or unit
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_.:\-]*", |lex| lex.slice().to_string())]
    Ident(String),

    // Double-quoted property name
    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    QuotedIdent(String),

    // String literal (single-quoted, '' escapes a quote)
    #[regex(r"'([^']|'')*'", |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].replace("''", "'")
    })]
    String(String),

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token("/")]
    Slash,
}

impl Token {
    /// Check if this token starts a well-known text geometry.
    pub fn is_geometry_keyword(&self) -> bool {
        matches!(
            self,
            Token::Point
                | Token::LineString
                | Token::Polygon
                | Token::MultiPoint
                | Token::MultiLineString
                | Token::MultiPolygon
                | Token::GeometryCollection
        )
    }
}

/// A token with its span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Lexer that produces spanned tokens.
///
/// Lexing stops at the first unrecognized input; its span is kept so the
/// parser can report it instead of a generic end-of-input error.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
    peeked: Option<Option<SpannedToken>>,
    invalid: Option<Span>,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
            peeked: None,
            invalid: None,
        }
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Option<&SpannedToken> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next_inner());
        }
        self.peeked.as_ref().and_then(|o| o.as_ref())
    }

    /// Check whether the next token matches without consuming it.
    pub fn peek_is(&mut self, expected: &Token) -> bool {
        self.peek().is_some_and(|t| &t.token == expected)
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Option<SpannedToken> {
        if let Some(peeked) = self.peeked.take() {
            peeked
        } else {
            self.next_inner()
        }
    }

    fn next_inner(&mut self) -> Option<SpannedToken> {
        if self.invalid.is_some() {
            return None;
        }
        match self.inner.next() {
            Some(Ok(token)) => Some(SpannedToken {
                token,
                span: self.inner.span().into(),
            }),
            Some(Err(())) => {
                let span: Span = self.inner.span().into();
                if let Some(value) = wide_integer(self.inner.slice()) {
                    return Some(SpannedToken {
                        token: Token::Float(value),
                        span,
                    });
                }
                self.invalid = Some(span);
                None
            }
            None => None,
        }
    }

    /// Span of the first unrecognized input, if lexing stopped early.
    pub fn invalid(&self) -> Option<Span> {
        self.invalid
    }
}

impl Iterator for Lexer<'_> {
    type Item = SpannedToken;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// An integer literal that overflowed `i64`.
fn wide_integer(text: &str) -> Option<f64> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Tokenize a source string into a vector of spanned tokens.
pub fn tokenize(source: &str) -> Vec<SpannedToken> {
    Lexer::new(source).collect()
}
