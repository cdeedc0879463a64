//! Main parser module that orchestrates the parsing process
//!
//! This module provides the main entry point for parsing tokens into an AST.
//! It delegates specific parsing tasks to submodules: declarations (`def`,
//! `class`, imports), statements (simple and compound statements, blocks) and
//! expressions (precedence climbing).

use crate::ast::*;
use crate::lexer::{tokenize, Token, TokenType};

#[cfg(test)]
mod tests;

pub mod declarations;
pub mod expressions;
pub mod statements;
pub mod utils;

/// Deepest nesting of expressions and blocks the parser accepts. Deeper
/// input is a syntax error rather than unbounded recursion.
pub const MAX_NESTING: usize = 64;

/// Error type for parsing failures
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Human-readable error message
    pub message: String,
    /// Line number where the error occurred
    pub line: usize,
    /// Column of the offending token
    pub column: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error on line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Main entry point for parsing tokens into an AST
pub fn parse(tokens: &[Token]) -> Result<Program, ParseError> {
    let mut parser = Parser::new(tokens);
    let statements = parser.parse_program()?;
    Ok(Program { statements })
}

/// Parses a standalone expression from source text.
///
/// Used for f-string fragments and for turning canonical default text back
/// into a tree. `line` offsets reported positions so errors point at the
/// enclosing source.
pub fn parse_expression_source(source: &str, line: usize) -> Result<Expr, ParseError> {
    let tokens = tokenize(source).map_err(|e| ParseError {
        message: e.message,
        line: line + e.line - 1,
        column: e.column,
    })?;
    let mut parser = Parser::new(&tokens);
    let expr = parser.testlist().map_err(|mut e| {
        e.line = line + e.line - 1;
        e
    })?;
    parser.match_token(&TokenType::Newline);
    if !parser.is_at_end() {
        let token = parser.peek();
        return Err(ParseError {
            message: format!("invalid syntax: unexpected {}", utils::describe(token)),
            line: line + token.line - 1,
            column: token.column,
        });
    }
    Ok(expr)
}

/// Main parser struct that coordinates the parsing process
pub struct Parser<'a> {
    /// Reference to the tokens being parsed
    tokens: &'a [Token],
    /// Current position in the token stream
    current: usize,
    /// Nesting levels currently open, bounded by [`MAX_NESTING`]
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            current: 0,
            depth: 0,
        }
    }

    /// Parses the entire program into a list of statements
    pub fn parse_program(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if self.match_token(&TokenType::Newline) {
                continue;
            }
            statements.extend(self.declaration()?);
        }

        Ok(statements)
    }

    /// Parses one logical line or one compound statement.
    pub(crate) fn declaration(&mut self) -> Result<Vec<Statement>, ParseError> {
        if self.check(&TokenType::At) {
            return Ok(vec![declarations::parse_decorated(self)?]);
        }

        if self.match_token(&TokenType::Def) {
            return Ok(vec![Statement::FunctionDef(declarations::parse_function_declaration(self, Vec::new())?)]);
        }

        if self.match_token(&TokenType::Class) {
            return Ok(vec![Statement::ClassDef(declarations::parse_class_declaration(self, Vec::new())?)]);
        }

        if self.match_token(&TokenType::If) {
            return Ok(vec![statements::parse_if_statement(self)?]);
        }

        if self.match_token(&TokenType::While) {
            return Ok(vec![statements::parse_while_statement(self)?]);
        }

        if self.match_token(&TokenType::For) {
            return Ok(vec![statements::parse_for_statement(self)?]);
        }

        if self.match_token(&TokenType::Try) {
            return Ok(vec![statements::parse_try_statement(self)?]);
        }

        if self.check(&TokenType::Indent) {
            let token = self.peek();
            return Err(ParseError {
                message: "unexpected indent".to_string(),
                line: token.line,
                column: token.column,
            });
        }

        statements::parse_simple_statements(self)
    }

    pub(crate) fn block(&mut self) -> Result<Vec<Statement>, ParseError> {
        self.nested("too many statically nested blocks", statements::parse_block)
    }

    /// Runs `parse` one nesting level deeper, failing with `message` once
    /// [`MAX_NESTING`] levels are open.
    pub(crate) fn nested<T>(
        &mut self,
        message: &str,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error_at_current(message));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn expression(&mut self) -> Result<Expr, ParseError> {
        expressions::parse_expression(self)
    }

    pub(crate) fn testlist(&mut self) -> Result<Expr, ParseError> {
        expressions::parse_testlist(self)
    }

    // Token helpers, delegated to `utils`

    pub(crate) fn match_token(&mut self, token_type: &TokenType) -> bool {
        utils::match_token(self, token_type)
    }

    pub(crate) fn check(&self, token_type: &TokenType) -> bool {
        utils::check(self, token_type)
    }

    pub(crate) fn check_next(&self, token_type: &TokenType) -> bool {
        utils::check_next(self, token_type)
    }

    pub(crate) fn advance(&mut self) -> &'a Token {
        utils::advance(self)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        utils::is_at_end(self)
    }

    pub(crate) fn peek(&self) -> &'a Token {
        utils::peek(self)
    }

    pub(crate) fn previous(&self) -> &'a Token {
        utils::previous(self)
    }

    pub(crate) fn consume(&mut self, token_type: &TokenType, message: &str) -> Result<&'a Token, ParseError> {
        utils::consume(self, token_type, message)
    }

    pub(crate) fn consume_identifier(&mut self, message: &str) -> Result<String, ParseError> {
        utils::consume_identifier(self, message)
    }

    pub(crate) fn error_at_current(&self, message: &str) -> ParseError {
        utils::error_at_current(self, message)
    }
}
