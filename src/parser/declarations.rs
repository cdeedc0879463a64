//! Declaration parsing module
//!
//! This module handles parsing of declarations including:
//! - Function declarations (`def`) and their parameter lists
//! - Class declarations with bases and class keywords
//! - Decorator lists
//! - `import` and `from ... import` statements

use super::ParseError;
use crate::ast::*;
use crate::lexer::TokenType;

/// Parses a run of `@decorator` lines followed by a function or class
pub fn parse_decorated(parser: &mut super::Parser) -> Result<Statement, ParseError> {
    let mut decorators = Vec::new();
    while parser.match_token(&TokenType::At) {
        decorators.push(parser.expression()?);
        parser.consume(&TokenType::Newline, "expected newline after decorator")?;
    }

    if parser.match_token(&TokenType::Def) {
        return Ok(Statement::FunctionDef(parse_function_declaration(parser, decorators)?));
    }
    if parser.match_token(&TokenType::Class) {
        return Ok(Statement::ClassDef(parse_class_declaration(parser, decorators)?));
    }

    Err(parser.error_at_current("expected 'def' or 'class' after decorator"))
}

/// Parses function declarations; the `def` keyword is already consumed
pub fn parse_function_declaration(parser: &mut super::Parser, decorators: Vec<Expr>) -> Result<FunctionDef, ParseError> {
    let line = parser.previous().line;
    let name = parser.consume_identifier("expected function name")?;

    parser.consume(&TokenType::LeftParen, "expected '(' after function name")?;
    let parameters = parse_parameters(parser)?;
    parser.consume(&TokenType::RightParen, "expected ')' after parameters")?;

    let return_type = if parser.match_token(&TokenType::Arrow) {
        Some(parser.expression()?)
    } else {
        None
    };

    let body = parser.block()?;

    Ok(FunctionDef {
        name,
        parameters,
        body,
        return_type,
        decorators,
        line,
    })
}

/// Parses a parameter list up to, but not including, the closing ')'
fn parse_parameters(parser: &mut super::Parser) -> Result<Vec<Parameter>, ParseError> {
    let mut parameters: Vec<Parameter> = Vec::new();
    let mut keyword_only = false;
    let mut seen_default = false;

    while !parser.check(&TokenType::RightParen) {
        let start = parser.peek();

        if parser.match_token(&TokenType::Slash) {
            // Positional-only marker; positional-only parameters bind like ordinary ones.
        } else if parser.match_token(&TokenType::DoubleStar) {
            let name = parser.consume_identifier("expected parameter name after '**'")?;
            let annotation = parse_annotation(parser)?;
            parameters.push(Parameter {
                name,
                kind: ParameterKind::KwArgs,
                annotation,
                default: None,
            });
        } else if parser.match_token(&TokenType::Star) {
            keyword_only = true;
            if !parser.check(&TokenType::Comma) && !parser.check(&TokenType::RightParen) {
                let name = parser.consume_identifier("expected parameter name after '*'")?;
                let annotation = parse_annotation(parser)?;
                parameters.push(Parameter {
                    name,
                    kind: ParameterKind::VarArgs,
                    annotation,
                    default: None,
                });
            }
        } else {
            let name = parser.consume_identifier("expected parameter name")?;
            let annotation = parse_annotation(parser)?;
            let default = if parser.match_token(&TokenType::Assign) {
                Some(parser.expression()?)
            } else {
                None
            };

            if !keyword_only {
                if default.is_some() {
                    seen_default = true;
                } else if seen_default {
                    return Err(ParseError {
                        message: "non-default argument follows default argument".to_string(),
                        line: start.line,
                        column: start.column,
                    });
                }
            }

            parameters.push(Parameter {
                name,
                kind: if keyword_only { ParameterKind::KeywordOnly } else { ParameterKind::Positional },
                annotation,
                default,
            });
        }

        if let Some(last) = parameters.last() {
            if parameters[..parameters.len() - 1].iter().any(|p| p.name == last.name) {
                return Err(ParseError {
                    message: format!("duplicate argument '{}' in function definition", last.name),
                    line: start.line,
                    column: start.column,
                });
            }
        }

        if !parser.match_token(&TokenType::Comma) {
            break;
        }
    }

    Ok(parameters)
}

fn parse_annotation(parser: &mut super::Parser) -> Result<Option<Expr>, ParseError> {
    if parser.match_token(&TokenType::Colon) {
        Ok(Some(parser.expression()?))
    } else {
        Ok(None)
    }
}

/// Parses class declarations; the `class` keyword is already consumed
pub fn parse_class_declaration(parser: &mut super::Parser, decorators: Vec<Expr>) -> Result<ClassDef, ParseError> {
    let line = parser.previous().line;
    let name = parser.consume_identifier("expected class name")?;

    let mut bases = Vec::new();
    let mut keywords = Vec::new();
    if parser.match_token(&TokenType::LeftParen) {
        while !parser.check(&TokenType::RightParen) {
            if matches!(parser.peek().token_type, TokenType::Identifier(_)) && parser.check_next(&TokenType::Assign) {
                let keyword = parser.consume_identifier("expected keyword name")?;
                parser.advance();
                keywords.push((keyword, parser.expression()?));
            } else {
                bases.push(parser.expression()?);
            }
            if !parser.match_token(&TokenType::Comma) {
                break;
            }
        }
        parser.consume(&TokenType::RightParen, "expected ')' after class bases")?;
    }

    let body = parser.block()?;

    Ok(ClassDef {
        name,
        bases,
        keywords,
        body,
        decorators,
        line,
    })
}

fn parse_dotted_name(parser: &mut super::Parser) -> Result<String, ParseError> {
    let mut name = parser.consume_identifier("expected module name")?;
    while parser.match_token(&TokenType::Dot) {
        name.push('.');
        name.push_str(&parser.consume_identifier("expected name after '.'")?);
    }
    Ok(name)
}

fn parse_alias(parser: &mut super::Parser) -> Result<Option<String>, ParseError> {
    if parser.match_token(&TokenType::As) {
        Ok(Some(parser.consume_identifier("expected name after 'as'")?))
    } else {
        Ok(None)
    }
}

/// Parses `import a.b [as c], d`; the `import` keyword is already consumed
pub fn parse_import_declaration(parser: &mut super::Parser) -> Result<Statement, ParseError> {
    let mut names = Vec::new();
    loop {
        let name = parse_dotted_name(parser)?;
        let alias = parse_alias(parser)?;
        names.push(ImportName { name, alias });
        if !parser.match_token(&TokenType::Comma) {
            break;
        }
    }
    Ok(Statement::Import { names })
}

/// Parses `from [.]module import names`; the `from` keyword is already consumed
pub fn parse_from_import_declaration(parser: &mut super::Parser) -> Result<Statement, ParseError> {
    let mut module = String::new();
    loop {
        if parser.match_token(&TokenType::Dot) {
            module.push('.');
        } else if parser.match_token(&TokenType::Ellipsis) {
            module.push_str("...");
        } else {
            break;
        }
    }
    if !parser.check(&TokenType::Import) {
        module.push_str(&parse_dotted_name(parser)?);
    }
    if module.is_empty() {
        return Err(parser.error_at_current("expected module name"));
    }

    parser.consume(&TokenType::Import, "expected 'import'")?;

    let mut names = Vec::new();
    if parser.match_token(&TokenType::Star) {
        names.push(ImportName {
            name: "*".to_string(),
            alias: None,
        });
        return Ok(Statement::ImportFrom { module, names });
    }

    let parenthesized = parser.match_token(&TokenType::LeftParen);
    loop {
        if parenthesized && parser.check(&TokenType::RightParen) {
            break;
        }
        let name = parser.consume_identifier("expected name to import")?;
        let alias = parse_alias(parser)?;
        names.push(ImportName { name, alias });
        if !parser.match_token(&TokenType::Comma) {
            break;
        }
    }
    if parenthesized {
        parser.consume(&TokenType::RightParen, "expected ')' after import list")?;
    }

    Ok(Statement::ImportFrom { module, names })
}
