//! Recursive descent parser for CQL.
//!
//! Grammar (keywords are case-insensitive):
//!
//! ```text
//! filter     := or EOF
//! or         := and ("OR" and)*
//! and        := unary ("AND" unary)*
//! unary      := "NOT" unary | primary
//! primary    := "(" or ")" | spatial | comparison
//! spatial    := "INTERSECTS" "(" property "," wkt ")"
//!             | "DWITHIN" "(" property "," wkt "," number "," unit ")"
//! comparison := property ("=" | "<>" | "!=" | "<" | "<=" | ">" | ">=") literal
//!             | property "NOT"? ("LIKE" | "ILIKE") literal
//!             | property ("BEFORE" | "AFTER") literal
//!             | property "DURING" literal "/" literal
//! property   := identifier | "double-quoted"
//! ```

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::{Lexer, SpannedToken, Token};
use crate::span::{Span, Spanned};

/// Parser for CQL filter text.
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    source: &'source str,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            lexer: Lexer::new(source),
            source,
        }
    }

    /// Parse a complete filter expression.
    pub fn parse_filter(&mut self) -> Result<Condition, ParseError> {
        let condition = self.parse_or_condition()?;

        if let Some(tok) = self.lexer.peek() {
            return Err(ParseError::new(
                format!("unexpected {:?} after end of filter", tok.token),
                tok.span,
            )
            .with_hint("combine conditions with AND or OR"));
        }
        if let Some(span) = self.lexer.invalid() {
            return Err(self.unrecognized(span));
        }

        Ok(condition)
    }

    /// Parse OR conditions.
    fn parse_or_condition(&mut self) -> Result<Condition, ParseError> {
        let mut left = self.parse_and_condition()?;

        while self.lexer.peek_is(&Token::Or) {
            self.next_token()?; // consume OR

            let right = self.parse_and_condition()?;
            left = match left {
                Condition::Or(mut conditions) => {
                    conditions.push(right);
                    Condition::Or(conditions)
                }
                _ => Condition::Or(vec![left, right]),
            };
        }

        Ok(left)
    }

    /// Parse AND conditions.
    fn parse_and_condition(&mut self) -> Result<Condition, ParseError> {
        let mut left = self.parse_unary_condition()?;

        while self.lexer.peek_is(&Token::And) {
            self.next_token()?; // consume AND

            let right = self.parse_unary_condition()?;
            left = match left {
                Condition::And(mut conditions) => {
                    conditions.push(right);
                    Condition::And(conditions)
                }
                _ => Condition::And(vec![left, right]),
            };
        }

        Ok(left)
    }

    /// Parse a possibly negated condition.
    fn parse_unary_condition(&mut self) -> Result<Condition, ParseError> {
        if self.lexer.peek_is(&Token::Not) {
            self.next_token()?;
            let inner = self.parse_unary_condition()?;
            return Ok(Condition::Not(Box::new(inner)));
        }
        self.parse_primary_condition()
    }

    /// Parse a parenthesized group, spatial function or comparison.
    fn parse_primary_condition(&mut self) -> Result<Condition, ParseError> {
        let tok = self.next_token()?;

        match tok.token {
            Token::LParen => {
                let condition = self.parse_or_condition()?;
                self.expect_token(Token::RParen)?;
                Ok(condition)
            }
            Token::Intersects => self.parse_spatial(SpatialOp::Intersects),
            Token::DWithin => self.parse_spatial(SpatialOp::DWithin),
            Token::Ident(name) => {
                if self.lexer.peek_is(&Token::LParen) {
                    return Err(ParseError::unsupported_function(&name, tok.span));
                }
                self.parse_comparison(Spanned::new(name, tok.span))
            }
            Token::QuotedIdent(name) => self.parse_comparison(Spanned::new(name, tok.span)),
            other => Err(ParseError::new(
                format!("expected filter condition, found {:?}", other),
                tok.span,
            )),
        }
    }

    /// Parse the operator and operand(s) following a property name.
    fn parse_comparison(&mut self, property: Spanned<String>) -> Result<Condition, ParseError> {
        let op_tok = self.next_token()?;

        let op = match op_tok.token {
            Token::Eq => ComparisonOp::Eq,
            Token::Ne => ComparisonOp::Ne,
            Token::Lt => ComparisonOp::Lt,
            Token::Le => ComparisonOp::Le,
            Token::Gt => ComparisonOp::Gt,
            Token::Ge => ComparisonOp::Ge,
            Token::Like => ComparisonOp::Like,
            Token::ILike => ComparisonOp::ILike,
            Token::Not => {
                let next = self.next_token()?;
                let op = match next.token {
                    Token::Like => ComparisonOp::Like,
                    Token::ILike => ComparisonOp::ILike,
                    other => {
                        return Err(ParseError::new(
                            format!("expected LIKE or ILIKE after NOT, found {:?}", other),
                            next.span,
                        ))
                    }
                };
                let value = self.parse_literal()?;
                return Ok(Condition::Not(Box::new(Condition::Comparison {
                    property,
                    op,
                    value,
                })));
            }
            Token::Before => return self.parse_temporal(property, TemporalOp::Before),
            Token::After => return self.parse_temporal(property, TemporalOp::After),
            Token::During => {
                let start = self.parse_literal()?;
                self.expect_token(Token::Slash)?;
                let end = self.parse_literal()?;
                return Ok(Condition::Temporal {
                    property,
                    op: TemporalOp::During,
                    start,
                    end: Some(end),
                });
            }
            other => {
                let err = ParseError::new(
                    format!("expected comparison operator, found {:?}", other),
                    op_tok.span,
                );
                return Err(if other == Token::LParen {
                    err.with_hint("only INTERSECTS and DWITHIN may be called")
                } else {
                    err
                });
            }
        };

        let value = self.parse_literal()?;
        Ok(Condition::Comparison {
            property,
            op,
            value,
        })
    }

    /// Parse the single instant after BEFORE or AFTER.
    fn parse_temporal(
        &mut self,
        property: Spanned<String>,
        op: TemporalOp,
    ) -> Result<Condition, ParseError> {
        let start = self.parse_literal()?;
        Ok(Condition::Temporal {
            property,
            op,
            start,
            end: None,
        })
    }

    /// Parse INTERSECTS(...) or DWITHIN(...) after the function keyword.
    fn parse_spatial(&mut self, op: SpatialOp) -> Result<Condition, ParseError> {
        self.expect_token(Token::LParen)?;
        let property = self.expect_property()?;
        self.expect_token(Token::Comma)?;
        let geometry = self.parse_geometry()?;

        let (distance, units) = match op {
            SpatialOp::Intersects => (None, None),
            SpatialOp::DWithin => {
                self.expect_token(Token::Comma)?;
                let distance = self.parse_literal()?;
                self.expect_token(Token::Comma)?;
                let units = self.expect_unit()?;
                (Some(distance), Some(units))
            }
        };

        self.expect_token(Token::RParen)?;

        Ok(Condition::Spatial {
            property,
            op,
            geometry,
            distance,
            units,
        })
    }

    /// Parse a well-known text geometry and return its source text.
    fn parse_geometry(&mut self) -> Result<Spanned<String>, ParseError> {
        let keyword = self.next_token()?;
        if !keyword.token.is_geometry_keyword() {
            return Err(ParseError::new(
                format!("expected geometry literal, found {:?}", keyword.token),
                keyword.span,
            )
            .with_hint("write the geometry as well-known text, e.g. POINT(1 2)"));
        }

        let mut depth = 0usize;
        let end = loop {
            let tok = self.next_token()?;
            match tok.token {
                Token::LParen => depth += 1,
                Token::RParen if depth == 0 => {
                    return Err(ParseError::new("unbalanced ')' in geometry", tok.span));
                }
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        break tok.span;
                    }
                }
                // `POINT EMPTY` and friends
                Token::Ident(ref word) if depth == 0 && word.eq_ignore_ascii_case("empty") => {
                    break tok.span;
                }
                _ if depth == 0 => {
                    return Err(ParseError::new(
                        format!("expected '(' after geometry type, found {:?}", tok.token),
                        tok.span,
                    ));
                }
                _ => {}
            }
        };

        let span = keyword.span.merge(end);
        let text = span.slice(self.source).unwrap_or_default().to_string();
        Ok(Spanned::new(text, span))
    }

    /// Parse a literal value.
    fn parse_literal(&mut self) -> Result<Spanned<Literal>, ParseError> {
        let tok = self.next_token()?;
        let literal = match tok.token {
            Token::True => Literal::Bool(true),
            Token::False => Literal::Bool(false),
            Token::Int(i) => Literal::Int(i),
            Token::Float(f) => Literal::Float(f),
            Token::String(s) => Literal::String(s),
            Token::DateTime(s) => Literal::DateTime(s),
            Token::Ident(name) if self.lexer.peek_is(&Token::LParen) => {
                return Err(ParseError::unsupported_function(&name, tok.span));
            }
            ref t if t.is_geometry_keyword() => {
                return Err(ParseError::new(
                    "geometry literal outside of a spatial function",
                    tok.span,
                )
                .with_hint("use INTERSECTS(property, geometry) or DWITHIN(...)"));
            }
            other => {
                return Err(ParseError::new(
                    format!("expected literal value, found {:?}", other),
                    tok.span,
                ))
            }
        };

        Ok(Spanned::new(literal, tok.span))
    }

    /// Expect and consume a property name.
    fn expect_property(&mut self) -> Result<Spanned<String>, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::Ident(name) | Token::QuotedIdent(name) => Ok(Spanned::new(name, tok.span)),
            other => Err(ParseError::new(
                format!("expected property name, found {:?}", other),
                tok.span,
            )),
        }
    }

    /// Expect and consume a distance unit.
    fn expect_unit(&mut self) -> Result<Spanned<String>, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::Ident(unit) | Token::String(unit) => Ok(Spanned::new(unit, tok.span)),
            other => Err(ParseError::new(
                format!("expected distance unit, found {:?}", other),
                tok.span,
            )
            .with_hint("e.g. meters, kilometers, feet")),
        }
    }

    /// Expect and consume a specific token.
    fn expect_token(&mut self, expected: Token) -> Result<SpannedToken, ParseError> {
        let tok = self.next_token()?;
        if std::mem::discriminant(&tok.token) == std::mem::discriminant(&expected) {
            Ok(tok)
        } else {
            Err(ParseError::new(
                format!("expected {:?}, found {:?}", expected, tok.token),
                tok.span,
            ))
        }
    }

    /// Get the next token or error if EOF.
    fn next_token(&mut self) -> Result<SpannedToken, ParseError> {
        match self.lexer.next_token() {
            Some(tok) => Ok(tok),
            None => Err(match self.lexer.invalid() {
                Some(span) => self.unrecognized(span),
                None => ParseError::new(
                    "unexpected end of input",
                    Span::at(self.source.len()),
                ),
            }),
        }
    }

    fn unrecognized(&self, span: Span) -> ParseError {
        let text = span.slice(self.source).unwrap_or_default();
        ParseError::new(format!("unrecognized input '{}'", text), span)
    }
}

/// Parse a source string into a condition.
pub fn parse(source: &str) -> Result<Condition, ParseError> {
    let mut parser = Parser::new(source);
    parser.parse_filter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn property(cond: &Condition) -> &str {
        match cond {
            Condition::Comparison { property, .. }
            | Condition::Temporal { property, .. }
            | Condition::Spatial { property, .. } => &property.value,
            _ => panic!("expected a leaf condition, got {:?}", cond),
        }
    }

    #[test]
    fn test_parse_simple_comparison() {
        let cond = parse("title = 'Alpha'").unwrap();
        if let Condition::Comparison {
            property,
            op,
            value,
        } = cond
        {
            assert_eq!(property.value, "title");
            assert_eq!(property.span, Span::new(0, 5));
            assert_eq!(op, ComparisonOp::Eq);
            assert_eq!(value.value, Literal::String("Alpha".to_string()));
        } else {
            panic!("expected Comparison");
        }
    }

    #[test]
    fn test_parse_quoted_property() {
        let cond = parse(r#""anyText" ILIKE '*Alpha*'"#).unwrap();
        assert_eq!(property(&cond), "anyText");
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let cond = parse("a = 1 OR b = 2 AND c = 3").unwrap();
        if let Condition::Or(children) = cond {
            assert_eq!(children.len(), 2);
            assert_eq!(property(&children[0]), "a");
            assert!(matches!(&children[1], Condition::And(v) if v.len() == 2));
        } else {
            panic!("expected Or");
        }
    }

    #[test]
    fn test_chained_and_is_flat() {
        let cond = parse("a = 1 AND b = 2 AND c = 3").unwrap();
        assert!(matches!(cond, Condition::And(ref v) if v.len() == 3));
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let cond = parse("(a = 1 OR b = 2) AND c = 3").unwrap();
        if let Condition::And(children) = cond {
            assert!(matches!(&children[0], Condition::Or(v) if v.len() == 2));
        } else {
            panic!("expected And");
        }
    }

    #[test]
    fn test_not() {
        let cond = parse("NOT (a = 1 OR b = 2)").unwrap();
        assert!(matches!(cond, Condition::Not(ref inner) if matches!(**inner, Condition::Or(_))));

        let cond = parse("title NOT ILIKE 'x*'").unwrap();
        if let Condition::Not(inner) = cond {
            assert!(matches!(
                *inner,
                Condition::Comparison {
                    op: ComparisonOp::ILike,
                    ..
                }
            ));
        } else {
            panic!("expected Not");
        }
    }

    #[test]
    fn test_all_comparison_operators() {
        let operators = [
            ("=", ComparisonOp::Eq),
            ("<>", ComparisonOp::Ne),
            ("!=", ComparisonOp::Ne),
            ("<", ComparisonOp::Lt),
            ("<=", ComparisonOp::Le),
            (">", ComparisonOp::Gt),
            (">=", ComparisonOp::Ge),
            ("LIKE", ComparisonOp::Like),
            ("ilike", ComparisonOp::ILike),
        ];

        for (text, expected) in operators {
            let source = format!("size {} 18", text);
            match parse(&source) {
                Ok(Condition::Comparison { op, .. }) => assert_eq!(op, expected, "{}", text),
                other => panic!("failed to parse operator {}: {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_temporal() {
        let cond = parse("created BEFORE 2020-01-01T00:00:00Z").unwrap();
        assert_eq!(
            cond,
            Condition::Temporal {
                property: Spanned::new("created".to_string(), Span::new(0, 7)),
                op: TemporalOp::Before,
                start: Spanned::new(
                    Literal::DateTime("2020-01-01T00:00:00Z".to_string()),
                    Span::new(15, 35)
                ),
                end: None,
            }
        );

        let cond = parse("modified DURING 2020-01-01/2020-02-01").unwrap();
        assert!(matches!(
            cond,
            Condition::Temporal {
                op: TemporalOp::During,
                end: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn test_intersects() {
        let cond = parse("INTERSECTS(anyGeo, POLYGON((0 0, 0 2, 2 2, 2 0, 0 0)))").unwrap();
        if let Condition::Spatial {
            property,
            op,
            geometry,
            distance,
            ..
        } = cond
        {
            assert_eq!(property.value, "anyGeo");
            assert_eq!(op, SpatialOp::Intersects);
            assert_eq!(geometry.value, "POLYGON((0 0, 0 2, 2 2, 2 0, 0 0))");
            assert!(distance.is_none());
        } else {
            panic!("expected Spatial");
        }
    }

    #[test]
    fn test_dwithin() {
        let cond = parse("DWITHIN(location, POINT (10.5 -3), 250, meters)").unwrap();
        if let Condition::Spatial {
            geometry,
            distance,
            units,
            ..
        } = cond
        {
            assert_eq!(geometry.value, "POINT (10.5 -3)");
            assert_eq!(distance.unwrap().value, Literal::Int(250));
            assert_eq!(units.unwrap().value, "meters");
        } else {
            panic!("expected Spatial");
        }
    }

    #[test]
    fn test_geometry_collection_nesting() {
        let source = "INTERSECTS(anyGeo, GEOMETRYCOLLECTION(POINT(1 1), LINESTRING(0 0, 1 1)))";
        if let Condition::Spatial { geometry, .. } = parse(source).unwrap() {
            assert_eq!(
                geometry.value,
                "GEOMETRYCOLLECTION(POINT(1 1), LINESTRING(0 0, 1 1))"
            );
        } else {
            panic!("expected Spatial");
        }
    }

    #[test]
    fn test_unsupported_function_in_value() {
        let err = parse("title = proximity(anyText, 3)").unwrap_err();
        assert_eq!(err.message, "unsupported filter function 'proximity'");
        assert_eq!(err.span, Span::new(8, 17));
    }

    #[test]
    fn test_unsupported_function_as_condition() {
        let err = parse("relevance(anyText) > 3").unwrap_err();
        assert!(err.message.contains("relevance"));
    }

    #[test]
    fn test_geometry_outside_spatial_function() {
        let err = parse("location = POINT(1 1)").unwrap_err();
        assert!(err.message.contains("geometry literal"));
    }

    #[test]
    fn test_trailing_tokens() {
        let err = parse("a = 1 b = 2").unwrap_err();
        assert!(err.message.contains("after end of filter"));
    }

    #[test]
    fn test_unrecognized_input() {
        let err = parse("a = 1 AND b = #").unwrap_err();
        assert_eq!(err.message, "unrecognized input '#'");
        assert_eq!(err.span, Span::new(14, 15));
    }

    #[test]
    fn test_unexpected_end() {
        let err = parse("title ILIKE").unwrap_err();
        assert_eq!(err.message, "unexpected end of input");
    }

    #[test]
    fn test_unbalanced_geometry() {
        assert!(parse("INTERSECTS(anyGeo, POINT(1 1)").is_err());
        assert!(parse("INTERSECTS(anyGeo, POINT 1 1)").is_err());
    }
}
