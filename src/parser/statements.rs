//! Statement parsing module
//!
//! This module handles parsing of various statement types including:
//! - Indented blocks and inline suites
//! - Control flow statements (if/elif/else, while, for, try)
//! - Simple statements (assignment, return, raise, pass, break, continue)

use super::{declarations, expressions, utils, ParseError};
use crate::ast::*;
use crate::lexer::TokenType;

/// Parses the suite after a compound statement header, starting at the ':'
pub fn parse_block(parser: &mut super::Parser) -> Result<Vec<Statement>, ParseError> {
    parser.consume(&TokenType::Colon, "expected ':'")?;

    if !parser.match_token(&TokenType::Newline) {
        return parse_simple_statements(parser);
    }

    parser.consume(&TokenType::Indent, "expected an indented block")?;

    let mut statements = Vec::new();
    while !parser.check(&TokenType::Dedent) && !parser.is_at_end() {
        if parser.match_token(&TokenType::Newline) {
            continue;
        }
        statements.extend(parser.declaration()?);
    }

    parser.match_token(&TokenType::Dedent);
    Ok(statements)
}

/// Parses if statements, folding `elif` chains into nested else branches
pub fn parse_if_statement(parser: &mut super::Parser) -> Result<Statement, ParseError> {
    let condition = parser.expression()?;
    let then_branch = parser.block()?;

    let else_branch = if parser.match_token(&TokenType::Elif) {
        vec![parse_if_statement(parser)?]
    } else if parser.match_token(&TokenType::Else) {
        parser.block()?
    } else {
        Vec::new()
    };

    Ok(Statement::If {
        condition,
        then_branch,
        else_branch,
    })
}

/// Parses while statements
pub fn parse_while_statement(parser: &mut super::Parser) -> Result<Statement, ParseError> {
    let condition = parser.expression()?;
    let body = parser.block()?;

    Ok(Statement::While { condition, body })
}

/// Parses for statements
pub fn parse_for_statement(parser: &mut super::Parser) -> Result<Statement, ParseError> {
    let target = expressions::parse_target_list(parser)?;
    if !target.is_assignable() {
        return Err(invalid_target(parser, &target));
    }
    parser.consume(&TokenType::In, "expected 'in' after for target")?;
    let iterable = parser.testlist()?;
    let body = parser.block()?;

    Ok(Statement::For { target, iterable, body })
}

/// Parses try statements with any mix of except, else and finally clauses
pub fn parse_try_statement(parser: &mut super::Parser) -> Result<Statement, ParseError> {
    let body = parser.block()?;

    let mut handlers = Vec::new();
    while parser.match_token(&TokenType::Except) {
        let exception_type = if parser.check(&TokenType::Colon) {
            None
        } else {
            Some(parser.expression()?)
        };
        let name = if parser.match_token(&TokenType::As) {
            Some(parser.consume_identifier("expected name after 'as'")?)
        } else {
            None
        };
        let body = parser.block()?;
        handlers.push(ExceptHandler {
            exception_type,
            name,
            body,
        });
    }

    let else_branch = if !handlers.is_empty() && parser.match_token(&TokenType::Else) {
        parser.block()?
    } else {
        Vec::new()
    };

    let has_finally = parser.match_token(&TokenType::Finally);
    let finally = if has_finally { parser.block()? } else { Vec::new() };

    if handlers.is_empty() && !has_finally {
        return Err(parser.error_at_current("expected 'except' or 'finally' block"));
    }

    Ok(Statement::Try {
        body,
        handlers,
        else_branch,
        finally,
    })
}

/// Parses one logical line: simple statements separated by ';'
pub fn parse_simple_statements(parser: &mut super::Parser) -> Result<Vec<Statement>, ParseError> {
    let mut statements = vec![parse_simple_statement(parser)?];

    while parser.match_token(&TokenType::Semicolon) {
        if parser.check(&TokenType::Newline) || parser.is_at_end() {
            break;
        }
        statements.push(parse_simple_statement(parser)?);
    }

    if !parser.match_token(&TokenType::Newline) && !parser.is_at_end() {
        let token = parser.peek();
        return Err(ParseError {
            message: format!("invalid syntax: unexpected {}", utils::describe(token)),
            line: token.line,
            column: token.column,
        });
    }

    Ok(statements)
}

fn parse_simple_statement(parser: &mut super::Parser) -> Result<Statement, ParseError> {
    if parser.match_token(&TokenType::Pass) {
        return Ok(Statement::Pass);
    }
    if parser.match_token(&TokenType::Break) {
        return Ok(Statement::Break);
    }
    if parser.match_token(&TokenType::Continue) {
        return Ok(Statement::Continue);
    }
    if parser.match_token(&TokenType::Return) {
        let value = if at_statement_end(parser) {
            None
        } else {
            Some(parser.testlist()?)
        };
        return Ok(Statement::Return { value });
    }
    if parser.match_token(&TokenType::Raise) {
        return parse_raise_statement(parser);
    }
    if parser.match_token(&TokenType::Import) {
        return declarations::parse_import_declaration(parser);
    }
    if parser.match_token(&TokenType::From) {
        return declarations::parse_from_import_declaration(parser);
    }

    parse_expression_statement(parser)
}

fn parse_raise_statement(parser: &mut super::Parser) -> Result<Statement, ParseError> {
    if at_statement_end(parser) {
        return Ok(Statement::Raise {
            exception: None,
            cause: None,
        });
    }

    let exception = Some(parser.expression()?);
    let cause = if parser.match_token(&TokenType::From) {
        Some(parser.expression()?)
    } else {
        None
    };

    Ok(Statement::Raise { exception, cause })
}

/// Parses expression statements and the three assignment forms
fn parse_expression_statement(parser: &mut super::Parser) -> Result<Statement, ParseError> {
    let first = parser.testlist()?;

    if parser.match_token(&TokenType::Colon) {
        if !matches!(first, Expr::Name(_) | Expr::Attribute { .. } | Expr::Subscript { .. }) {
            return Err(invalid_target(parser, &first));
        }
        let annotation = parser.expression()?;
        let value = if parser.match_token(&TokenType::Assign) {
            Some(parser.testlist()?)
        } else {
            None
        };
        return Ok(Statement::AnnAssign {
            target: first,
            annotation,
            value,
        });
    }

    if let Some(operator) = utils::augmented_operator_from_token(parser.peek()) {
        if !matches!(first, Expr::Name(_) | Expr::Attribute { .. } | Expr::Subscript { .. }) {
            return Err(invalid_target(parser, &first));
        }
        parser.advance();
        let value = parser.testlist()?;
        return Ok(Statement::AugAssign {
            target: first,
            operator,
            value,
        });
    }

    if parser.check(&TokenType::Assign) {
        let mut targets = vec![first];
        while parser.match_token(&TokenType::Assign) {
            targets.push(parser.testlist()?);
        }
        // The last expression in a chain is the value; the rest are targets.
        let value = targets.pop().unwrap_or(Expr::Literal(Literal::None));
        if let Some(bad) = targets.iter().find(|target| !target.is_assignable()) {
            return Err(invalid_target(parser, bad));
        }
        return Ok(Statement::Assign { targets, value });
    }

    Ok(Statement::Expression(first))
}

fn at_statement_end(parser: &super::Parser) -> bool {
    parser.is_at_end()
        || parser.check(&TokenType::Newline)
        || parser.check(&TokenType::Semicolon)
        || parser.check(&TokenType::Dedent)
}

fn invalid_target(parser: &super::Parser, target: &Expr) -> ParseError {
    let token = parser.previous();
    ParseError {
        message: format!("cannot assign to expression '{}'", target),
        line: token.line,
        column: token.column,
    }
}
