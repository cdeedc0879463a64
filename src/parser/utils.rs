//! Parser utility functions module
//!
//! This module contains helper functions and utilities used throughout the parser.

use super::ParseError;
use crate::ast::{BinaryOperator, CompareOperator};
use crate::lexer::{Token, TokenType};

/// Converts a token to a binary operator
pub fn binary_operator_from_token(token: &Token) -> Option<BinaryOperator> {
    match &token.token_type {
        TokenType::Plus => Some(BinaryOperator::Add),
        TokenType::Minus => Some(BinaryOperator::Subtract),
        TokenType::Star => Some(BinaryOperator::Multiply),
        TokenType::Slash => Some(BinaryOperator::Divide),
        TokenType::DoubleSlash => Some(BinaryOperator::FloorDivide),
        TokenType::Percent => Some(BinaryOperator::Modulo),
        TokenType::At => Some(BinaryOperator::MatMul),
        TokenType::DoubleStar => Some(BinaryOperator::Power),
        TokenType::Pipe => Some(BinaryOperator::BitOr),
        TokenType::Ampersand => Some(BinaryOperator::BitAnd),
        TokenType::Caret => Some(BinaryOperator::BitXor),
        _ => None,
    }
}

/// Converts an augmented assignment token to its operator
pub fn augmented_operator_from_token(token: &Token) -> Option<BinaryOperator> {
    match &token.token_type {
        TokenType::PlusAssign => Some(BinaryOperator::Add),
        TokenType::MinusAssign => Some(BinaryOperator::Subtract),
        TokenType::StarAssign => Some(BinaryOperator::Multiply),
        TokenType::SlashAssign => Some(BinaryOperator::Divide),
        _ => None,
    }
}

/// Converts a single-token comparison to its operator. `not in` and `is not`
/// span two tokens and are handled by the expression parser.
pub fn compare_operator_from_token(token: &Token) -> Option<CompareOperator> {
    match &token.token_type {
        TokenType::EqualEqual => Some(CompareOperator::Equal),
        TokenType::NotEqual => Some(CompareOperator::NotEqual),
        TokenType::Less => Some(CompareOperator::Less),
        TokenType::LessEqual => Some(CompareOperator::LessEqual),
        TokenType::Greater => Some(CompareOperator::Greater),
        TokenType::GreaterEqual => Some(CompareOperator::GreaterEqual),
        TokenType::In => Some(CompareOperator::In),
        _ => None,
    }
}

/// Human-readable token description for error messages
pub fn describe(token: &Token) -> String {
    match &token.token_type {
        TokenType::Newline => "end of line".to_string(),
        TokenType::Indent => "indent".to_string(),
        TokenType::Dedent => "dedent".to_string(),
        TokenType::Eof => "end of input".to_string(),
        TokenType::Identifier(name) => format!("name '{}'", name),
        TokenType::String(_) | TokenType::FString(_) => "string literal".to_string(),
        TokenType::Integer(_) | TokenType::Float(_) => format!("number '{}'", token.lexeme),
        _ => format!("'{}'", token.lexeme),
    }
}

/// Checks if the current token matches the expected type
pub fn match_token(parser: &mut super::Parser, token_type: &TokenType) -> bool {
    if check(parser, token_type) {
        advance(parser);
        return true;
    }
    false
}

/// Checks if the current token matches the expected type without consuming it
pub fn check(parser: &super::Parser, token_type: &TokenType) -> bool {
    if parser.current >= parser.tokens.len() {
        return false;
    }
    std::mem::discriminant(&peek(parser).token_type) == std::mem::discriminant(token_type)
}

/// Checks the token after the current one
pub fn check_next(parser: &super::Parser, token_type: &TokenType) -> bool {
    parser
        .tokens
        .get(parser.current + 1)
        .map(|token| std::mem::discriminant(&token.token_type) == std::mem::discriminant(token_type))
        .unwrap_or(false)
}

/// Advances to the next token and returns the previous one
pub fn advance<'a>(parser: &mut super::Parser<'a>) -> &'a Token {
    if !is_at_end(parser) {
        parser.current += 1;
    }
    previous(parser)
}

/// Checks if the parser has reached the end of tokens
pub fn is_at_end(parser: &super::Parser) -> bool {
    parser.current >= parser.tokens.len() || matches!(peek(parser).token_type, TokenType::Eof)
}

/// Returns the current token without consuming it
pub fn peek<'a>(parser: &super::Parser<'a>) -> &'a Token {
    let tokens: &'a [Token] = parser.tokens;
    &tokens[parser.current.min(tokens.len().saturating_sub(1))]
}

/// Returns the previous token
pub fn previous<'a>(parser: &super::Parser<'a>) -> &'a Token {
    let tokens: &'a [Token] = parser.tokens;
    &tokens[parser.current.saturating_sub(1)]
}

/// Consumes a token of the expected type or returns an error
pub fn consume<'a>(parser: &mut super::Parser<'a>, token_type: &TokenType, message: &str) -> Result<&'a Token, ParseError> {
    if check(parser, token_type) {
        return Ok(advance(parser));
    }

    Err(error_at_current(parser, message))
}

/// Consumes an identifier and returns its name
pub fn consume_identifier(parser: &mut super::Parser, message: &str) -> Result<String, ParseError> {
    if let TokenType::Identifier(name) = &peek(parser).token_type {
        let name = name.clone();
        advance(parser);
        return Ok(name);
    }
    Err(error_at_current(parser, message))
}

/// Builds an error pointing at the current token
pub fn error_at_current(parser: &super::Parser, message: &str) -> ParseError {
    let token = peek(parser);
    ParseError {
        message: format!("{} (found {})", message, describe(token)),
        line: token.line,
        column: token.column,
    }
}
