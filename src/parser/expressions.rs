//! Expression parsing module
//!
//! Precedence climbing from conditional expressions down to atoms:
//! conditional, `or`, `and`, `not`, comparison chains, `|`, `^`, `&`,
//! additive, multiplicative, unary, power, then call/attribute/subscript
//! trailers on an atom.

use super::{utils, ParseError};
use crate::ast::*;
use crate::lexer::{FStringPiece, Token, TokenType};

/// Parses a comma-separated expression list; more than one item becomes a tuple
pub fn parse_testlist(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    let first = parse_expression(parser)?;
    if !parser.check(&TokenType::Comma) {
        return Ok(first);
    }

    let mut items = vec![first];
    while parser.match_token(&TokenType::Comma) {
        if !starts_expression(parser.peek()) {
            break;
        }
        items.push(parse_expression(parser)?);
    }
    Ok(Expr::Tuple(items))
}

/// Parses the target of a `for` clause: `x`, `k, v` or `(a, b)`
pub fn parse_target_list(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    let first = parse_bit_or(parser)?;
    if !parser.check(&TokenType::Comma) {
        return Ok(first);
    }

    let mut items = vec![first];
    while parser.match_token(&TokenType::Comma) {
        if parser.check(&TokenType::In) {
            break;
        }
        items.push(parse_bit_or(parser)?);
    }
    Ok(Expr::Tuple(items))
}

const TOO_DEEP: &str = "too many nested parentheses";

/// Parses a full expression including the conditional form
pub fn parse_expression(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    parser.nested(TOO_DEEP, parse_conditional)
}

fn parse_conditional(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    let then_value = parse_or(parser)?;

    if parser.match_token(&TokenType::If) {
        let condition = parse_or(parser)?;
        parser.consume(&TokenType::Else, "expected 'else' in conditional expression")?;
        let else_value = parse_expression(parser)?;
        return Ok(Expr::Conditional {
            condition: Box::new(condition),
            then_value: Box::new(then_value),
            else_value: Box::new(else_value),
        });
    }

    Ok(then_value)
}

fn parse_or(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    let mut expr = parse_and(parser)?;

    while parser.match_token(&TokenType::Or) {
        let right = parse_and(parser)?;
        expr = Expr::Logical {
            left: Box::new(expr),
            operator: LogicalOperator::Or,
            right: Box::new(right),
        };
    }

    Ok(expr)
}

fn parse_and(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    let mut expr = parse_not(parser)?;

    while parser.match_token(&TokenType::And) {
        let right = parse_not(parser)?;
        expr = Expr::Logical {
            left: Box::new(expr),
            operator: LogicalOperator::And,
            right: Box::new(right),
        };
    }

    Ok(expr)
}

fn parse_not(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    if parser.match_token(&TokenType::Not) {
        let operand = parser.nested(TOO_DEEP, parse_not)?;
        return Ok(Expr::Unary {
            operator: UnaryOperator::Not,
            operand: Box::new(operand),
        });
    }

    parse_comparison(parser)
}

fn parse_comparison(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    let left = parse_bit_or(parser)?;
    let mut comparisons = Vec::new();

    loop {
        let operator = if let Some(operator) = utils::compare_operator_from_token(parser.peek()) {
            parser.advance();
            operator
        } else if parser.check(&TokenType::Not) && parser.check_next(&TokenType::In) {
            parser.advance();
            parser.advance();
            CompareOperator::NotIn
        } else if parser.match_token(&TokenType::Is) {
            if parser.match_token(&TokenType::Not) {
                CompareOperator::IsNot
            } else {
                CompareOperator::Is
            }
        } else {
            break;
        };

        comparisons.push((operator, parse_bit_or(parser)?));
    }

    if comparisons.is_empty() {
        Ok(left)
    } else {
        Ok(Expr::Compare {
            left: Box::new(left),
            comparisons,
        })
    }
}

/// Left-associative binary level over `next`, accepting the listed operator tokens
fn parse_binary_level(
    parser: &mut super::Parser,
    operators: &[TokenType],
    next: fn(&mut super::Parser) -> Result<Expr, ParseError>,
) -> Result<Expr, ParseError> {
    let mut expr = next(parser)?;

    while operators.iter().any(|operator| parser.check(operator)) {
        let token = parser.advance();
        let operator = match utils::binary_operator_from_token(token) {
            Some(operator) => operator,
            None => break,
        };
        let right = next(parser)?;
        expr = Expr::Binary {
            left: Box::new(expr),
            operator,
            right: Box::new(right),
        };
    }

    Ok(expr)
}

fn parse_bit_or(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    parse_binary_level(parser, &[TokenType::Pipe], parse_bit_xor)
}

fn parse_bit_xor(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    parse_binary_level(parser, &[TokenType::Caret], parse_bit_and)
}

fn parse_bit_and(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    parse_binary_level(parser, &[TokenType::Ampersand], parse_arith)
}

fn parse_arith(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    parse_binary_level(parser, &[TokenType::Plus, TokenType::Minus], parse_term)
}

fn parse_term(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    parse_binary_level(
        parser,
        &[
            TokenType::Star,
            TokenType::Slash,
            TokenType::DoubleSlash,
            TokenType::Percent,
            TokenType::At,
        ],
        parse_factor,
    )
}

fn parse_factor(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    let operator = if parser.match_token(&TokenType::Minus) {
        Some(UnaryOperator::Negate)
    } else if parser.match_token(&TokenType::Plus) {
        Some(UnaryOperator::Plus)
    } else if parser.match_token(&TokenType::Tilde) {
        Some(UnaryOperator::Invert)
    } else {
        None
    };

    match operator {
        Some(operator) => {
            let operand = parser.nested(TOO_DEEP, parse_factor)?;
            Ok(Expr::Unary {
                operator,
                operand: Box::new(operand),
            })
        }
        None => parse_power(parser),
    }
}

fn parse_power(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    let base = parse_primary(parser)?;

    if parser.match_token(&TokenType::DoubleStar) {
        // Right-associative, and binds tighter than a unary minus on its left.
        let exponent = parser.nested(TOO_DEEP, parse_factor)?;
        return Ok(Expr::Binary {
            left: Box::new(base),
            operator: BinaryOperator::Power,
            right: Box::new(exponent),
        });
    }

    Ok(base)
}

/// Parses an atom followed by any call, attribute or subscript trailers
fn parse_primary(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    let mut expr = parse_atom(parser)?;

    loop {
        if parser.match_token(&TokenType::LeftParen) {
            let arguments = parse_call_arguments(parser)?;
            parser.consume(&TokenType::RightParen, "expected ')' after arguments")?;
            expr = Expr::Call {
                callee: Box::new(expr),
                arguments,
            };
        } else if parser.match_token(&TokenType::Dot) {
            let name = parser.consume_identifier("expected attribute name after '.'")?;
            expr = Expr::Attribute {
                object: Box::new(expr),
                name,
            };
        } else if parser.match_token(&TokenType::LeftBracket) {
            let index = parse_subscript(parser)?;
            parser.consume(&TokenType::RightBracket, "expected ']' after subscript")?;
            expr = Expr::Subscript {
                object: Box::new(expr),
                index: Box::new(index),
            };
        } else {
            break;
        }
    }

    Ok(expr)
}

fn parse_call_arguments(parser: &mut super::Parser) -> Result<Vec<Argument>, ParseError> {
    let mut arguments = Vec::new();
    let mut seen_keyword = false;

    while !parser.check(&TokenType::RightParen) {
        let start = parser.peek();
        let argument = if parser.match_token(&TokenType::DoubleStar) {
            seen_keyword = true;
            Argument::UnpackDict(parse_expression(parser)?)
        } else if parser.match_token(&TokenType::Star) {
            Argument::Unpack(parse_expression(parser)?)
        } else if matches!(start.token_type, TokenType::Identifier(_)) && parser.check_next(&TokenType::Assign) {
            let name = parser.consume_identifier("expected keyword name")?;
            parser.advance();
            seen_keyword = true;
            Argument::Keyword {
                name,
                value: parse_expression(parser)?,
            }
        } else {
            let value = parse_expression(parser)?;
            if seen_keyword {
                return Err(ParseError {
                    message: "positional argument follows keyword argument".to_string(),
                    line: start.line,
                    column: start.column,
                });
            }
            if parser.check(&TokenType::For) {
                // A bare generator argument: `sum(x for x in items)`.
                let generators = parse_comprehension_clauses(parser)?;
                Argument::Positional(Expr::ListComp {
                    element: Box::new(value),
                    generators,
                })
            } else {
                Argument::Positional(value)
            }
        };
        arguments.push(argument);

        if !parser.match_token(&TokenType::Comma) {
            break;
        }
    }

    Ok(arguments)
}

fn parse_subscript(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    let first = parse_slice_item(parser)?;
    if !parser.check(&TokenType::Comma) {
        return Ok(first);
    }

    let mut items = vec![first];
    while parser.match_token(&TokenType::Comma) {
        if parser.check(&TokenType::RightBracket) {
            break;
        }
        items.push(parse_slice_item(parser)?);
    }
    Ok(Expr::Tuple(items))
}

fn parse_slice_item(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    let lower = if parser.check(&TokenType::Colon) {
        None
    } else {
        let expr = parse_expression(parser)?;
        if !parser.check(&TokenType::Colon) {
            return Ok(expr);
        }
        Some(Box::new(expr))
    };

    parser.consume(&TokenType::Colon, "expected ':' in slice")?;
    let upper = if slice_bound_follows(parser) {
        Some(Box::new(parse_expression(parser)?))
    } else {
        None
    };
    let step = if parser.match_token(&TokenType::Colon) && slice_bound_follows(parser) {
        Some(Box::new(parse_expression(parser)?))
    } else {
        None
    };

    Ok(Expr::Slice { lower, upper, step })
}

fn slice_bound_follows(parser: &super::Parser) -> bool {
    !parser.check(&TokenType::Colon) && !parser.check(&TokenType::RightBracket) && !parser.check(&TokenType::Comma)
}

fn parse_comprehension_clauses(parser: &mut super::Parser) -> Result<Vec<Comprehension>, ParseError> {
    let mut generators = Vec::new();

    while parser.match_token(&TokenType::For) {
        let target = parse_target_list(parser)?;
        parser.consume(&TokenType::In, "expected 'in' in comprehension")?;
        let iterable = parse_or(parser)?;
        let mut conditions = Vec::new();
        while parser.match_token(&TokenType::If) {
            conditions.push(parse_or(parser)?);
        }
        generators.push(Comprehension {
            target,
            iterable,
            conditions,
        });
    }

    Ok(generators)
}

fn parse_atom(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    let token = parser.peek();

    match &token.token_type {
        TokenType::Identifier(name) => {
            parser.advance();
            Ok(Expr::Name(name.clone()))
        }
        TokenType::Integer(value) => {
            parser.advance();
            Ok(Expr::Literal(Literal::Integer(*value)))
        }
        TokenType::Float(value) => {
            parser.advance();
            Ok(Expr::Literal(Literal::Float(*value)))
        }
        TokenType::String(_) | TokenType::FString(_) => parse_strings(parser),
        TokenType::True => {
            parser.advance();
            Ok(Expr::Literal(Literal::Boolean(true)))
        }
        TokenType::False => {
            parser.advance();
            Ok(Expr::Literal(Literal::Boolean(false)))
        }
        TokenType::None => {
            parser.advance();
            Ok(Expr::Literal(Literal::None))
        }
        TokenType::Ellipsis => {
            parser.advance();
            Ok(Expr::Literal(Literal::Ellipsis))
        }
        TokenType::LeftParen => {
            parser.advance();
            parse_parenthesized(parser)
        }
        TokenType::LeftBracket => {
            parser.advance();
            parse_list_display(parser)
        }
        TokenType::LeftBrace => {
            parser.advance();
            parse_brace_display(parser)
        }
        _ => Err(ParseError {
            message: format!("invalid syntax: unexpected {}", utils::describe(token)),
            line: token.line,
            column: token.column,
        }),
    }
}

/// Joins adjacent string literals; any f-string in the run makes the whole
/// run an f-string.
fn parse_strings(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    let mut parts: Vec<FStringPart> = Vec::new();
    let mut formatted = false;

    loop {
        let token = parser.peek();
        match &token.token_type {
            TokenType::String(text) => push_literal(&mut parts, text),
            TokenType::FString(pieces) => {
                formatted = true;
                for piece in pieces {
                    match piece {
                        FStringPiece::Literal(text) => push_literal(&mut parts, text),
                        FStringPiece::Expr {
                            source,
                            conversion,
                            format_spec,
                        } => parts.push(FStringPart::Expr {
                            expr: Box::new(parse_fstring_expression(source, token)?),
                            conversion: *conversion,
                            format_spec: format_spec.clone(),
                        }),
                    }
                }
            }
            _ => break,
        }
        parser.advance();
    }

    if formatted {
        return Ok(Expr::FString(parts));
    }

    let text = parts
        .into_iter()
        .map(|part| match part {
            FStringPart::Literal(text) => text,
            FStringPart::Expr { .. } => String::new(),
        })
        .collect();
    Ok(Expr::Literal(Literal::String(text)))
}

fn push_literal(parts: &mut Vec<FStringPart>, text: &str) {
    if let Some(FStringPart::Literal(last)) = parts.last_mut() {
        last.push_str(text);
    } else {
        parts.push(FStringPart::Literal(text.to_string()));
    }
}

fn parse_fstring_expression(source: &str, token: &Token) -> Result<Expr, ParseError> {
    if source.trim().is_empty() {
        return Err(ParseError {
            message: "f-string: empty expression not allowed".to_string(),
            line: token.line,
            column: token.column,
        });
    }
    super::parse_expression_source(source.trim(), token.line)
}

/// Parses after '(': empty tuple, grouping, tuple or generator
fn parse_parenthesized(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    if parser.match_token(&TokenType::RightParen) {
        return Ok(Expr::Tuple(Vec::new()));
    }

    let first = parse_expression(parser)?;

    if parser.check(&TokenType::For) {
        let generators = parse_comprehension_clauses(parser)?;
        parser.consume(&TokenType::RightParen, "expected ')' after generator")?;
        return Ok(Expr::ListComp {
            element: Box::new(first),
            generators,
        });
    }

    if parser.check(&TokenType::Comma) {
        let mut items = vec![first];
        while parser.match_token(&TokenType::Comma) {
            if parser.check(&TokenType::RightParen) {
                break;
            }
            items.push(parse_expression(parser)?);
        }
        parser.consume(&TokenType::RightParen, "expected ')' after tuple")?;
        return Ok(Expr::Tuple(items));
    }

    parser.consume(&TokenType::RightParen, "expected ')'")?;
    Ok(first)
}

fn parse_list_display(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    if parser.match_token(&TokenType::RightBracket) {
        return Ok(Expr::List(Vec::new()));
    }

    let first = parse_expression(parser)?;

    if parser.check(&TokenType::For) {
        let generators = parse_comprehension_clauses(parser)?;
        parser.consume(&TokenType::RightBracket, "expected ']' after comprehension")?;
        return Ok(Expr::ListComp {
            element: Box::new(first),
            generators,
        });
    }

    let mut items = vec![first];
    while parser.match_token(&TokenType::Comma) {
        if parser.check(&TokenType::RightBracket) {
            break;
        }
        items.push(parse_expression(parser)?);
    }
    parser.consume(&TokenType::RightBracket, "expected ']' after list")?;
    Ok(Expr::List(items))
}

fn parse_brace_display(parser: &mut super::Parser) -> Result<Expr, ParseError> {
    if parser.match_token(&TokenType::RightBrace) {
        return Ok(Expr::Dict(Vec::new()));
    }

    let first = parse_expression(parser)?;

    if parser.match_token(&TokenType::Colon) {
        let value = parse_expression(parser)?;
        if parser.check(&TokenType::For) {
            return Err(parser.error_at_current("dict comprehensions are not supported"));
        }
        let mut entries = vec![(first, value)];
        while parser.match_token(&TokenType::Comma) {
            if parser.check(&TokenType::RightBrace) {
                break;
            }
            let key = parse_expression(parser)?;
            parser.consume(&TokenType::Colon, "expected ':' after dict key")?;
            entries.push((key, parse_expression(parser)?));
        }
        parser.consume(&TokenType::RightBrace, "expected '}' after dict")?;
        return Ok(Expr::Dict(entries));
    }

    if parser.check(&TokenType::For) {
        return Err(parser.error_at_current("set comprehensions are not supported"));
    }

    let mut items = vec![first];
    while parser.match_token(&TokenType::Comma) {
        if parser.check(&TokenType::RightBrace) {
            break;
        }
        items.push(parse_expression(parser)?);
    }
    parser.consume(&TokenType::RightBrace, "expected '}' after set")?;
    Ok(Expr::Set(items))
}

fn starts_expression(token: &Token) -> bool {
    matches!(
        token.token_type,
        TokenType::Identifier(_)
            | TokenType::Integer(_)
            | TokenType::Float(_)
            | TokenType::String(_)
            | TokenType::FString(_)
            | TokenType::True
            | TokenType::False
            | TokenType::None
            | TokenType::Ellipsis
            | TokenType::LeftParen
            | TokenType::LeftBracket
            | TokenType::LeftBrace
            | TokenType::Minus
            | TokenType::Plus
            | TokenType::Tilde
            | TokenType::Not
    )
}
