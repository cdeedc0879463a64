//! Source model extraction: text in, [`ProgramModel`] out, no execution.

use tracing::debug;

use super::error::SyntaxError;
use super::model::*;
use crate::ast::{BinaryOperator, ClassDef, Expr, FunctionDef, ParameterKind, Program, Statement};
use crate::lexer::tokenize;
use crate::parser::parse;

/// Parses `source` and walks its top-level statements into a program model.
///
/// Empty source yields an empty model.
pub fn extract(source: &str) -> Result<ProgramModel, SyntaxError> {
    let program = parse_program(source)?;
    let model = build_model(&program);
    debug!(
        imports = model.imports.len(),
        functions = model.functions.len(),
        classes = model.classes.len(),
        globals = model.global_vars.len(),
        "extracted program model"
    );
    Ok(model)
}

/// Lexes and parses `source`, folding both error kinds into [`SyntaxError`].
pub fn parse_program(source: &str) -> Result<Program, SyntaxError> {
    let tokens = tokenize(source)?;
    Ok(parse(&tokens)?)
}

pub fn build_model(program: &Program) -> ProgramModel {
    let mut model = ProgramModel::default();

    for statement in &program.statements {
        match statement {
            Statement::Import { names } => {
                model.imports.extend(names.iter().map(|import| ImportRecord::Module {
                    module: import.name.clone(),
                    alias: import.alias.clone(),
                }));
            }
            Statement::ImportFrom { module, names } => {
                model.imports.extend(names.iter().map(|import| ImportRecord::From {
                    module: module.clone(),
                    name: import.name.clone(),
                    alias: import.alias.clone(),
                }));
            }
            Statement::FunctionDef(function) => model.functions.push(function_record(function)),
            Statement::ClassDef(class) => model.classes.push(class_record(class)),
            Statement::Assign { targets, value } => {
                let mut names = Vec::new();
                for target in targets {
                    collect_target_names(target, &mut names);
                }
                model.global_vars.push(VarRecord {
                    targets: names,
                    value: value.to_string(),
                    annotation: None,
                });
            }
            Statement::AnnAssign {
                target,
                annotation,
                value,
            } => {
                model.global_vars.push(VarRecord {
                    targets: vec![target.to_string()],
                    value: value.as_ref().map(ToString::to_string).unwrap_or_default(),
                    annotation: Some(annotation.to_string()),
                });
            }
            Statement::Expression(_)
            | Statement::AugAssign { .. }
            | Statement::Return { .. }
            | Statement::If { .. }
            | Statement::While { .. }
            | Statement::For { .. }
            | Statement::Try { .. }
            | Statement::Raise { .. }
            | Statement::Pass
            | Statement::Break
            | Statement::Continue => {}
        }
    }

    model
}

pub fn function_record(function: &FunctionDef) -> FunctionRecord {
    let args = function
        .parameters
        .iter()
        .map(|parameter| ArgRecord {
            name: match parameter.kind {
                ParameterKind::VarArgs => format!("*{}", parameter.name),
                ParameterKind::KwArgs => format!("**{}", parameter.name),
                ParameterKind::Positional | ParameterKind::KeywordOnly => parameter.name.clone(),
            },
            type_name: parameter.annotation.as_ref().map(ToString::to_string),
            default: parameter.default.as_ref().map(ToString::to_string),
        })
        .collect();

    FunctionRecord {
        name: function.name.clone(),
        args,
        return_types: function.return_type.as_ref().map(return_types).unwrap_or_default(),
        is_constructor: function.name == "__init__",
        decorators: function.decorators.iter().map(ToString::to_string).collect(),
    }
}

fn class_record(class: &ClassDef) -> ClassRecord {
    let mut attributes = Vec::new();
    let mut methods = Vec::new();

    for statement in &class.body {
        match statement {
            Statement::FunctionDef(function) => methods.push(function_record(function)),
            Statement::Assign { targets, value } => {
                let mut names = Vec::new();
                for target in targets {
                    collect_target_names(target, &mut names);
                }
                let value = value.to_string();
                attributes.extend(names.into_iter().map(|name| AttributeRecord {
                    name,
                    annotation: None,
                    value: value.clone(),
                }));
            }
            Statement::AnnAssign {
                target,
                annotation,
                value,
            } => attributes.push(AttributeRecord {
                name: target.to_string(),
                annotation: Some(annotation.to_string()),
                value: value.as_ref().map(ToString::to_string).unwrap_or_default(),
            }),
            _ => {}
        }
    }

    let init = methods.iter().find(|method| method.is_constructor).cloned();

    ClassRecord {
        name: class.name.clone(),
        bases: class.bases.iter().map(ToString::to_string).collect(),
        attributes,
        methods,
        init,
    }
}

fn collect_target_names(target: &Expr, names: &mut Vec<String>) {
    match target {
        Expr::Tuple(items) | Expr::List(items) => {
            for item in items {
                collect_target_names(item, names);
            }
        }
        other => names.push(other.to_string()),
    }
}

/// Splits a return annotation into member type names. `Union[A, B]` and
/// `A | B` both give `["A", "B"]`.
fn return_types(annotation: &Expr) -> Vec<String> {
    match annotation {
        Expr::Subscript { object, index } if is_union(object) => match index.as_ref() {
            Expr::Tuple(items) => items.iter().map(ToString::to_string).collect(),
            single => vec![single.to_string()],
        },
        Expr::Binary {
            left,
            operator: BinaryOperator::BitOr,
            right,
        } => {
            let mut types = return_types(left);
            types.extend(return_types(right));
            types
        }
        other => vec![other.to_string()],
    }
}

fn is_union(expr: &Expr) -> bool {
    expr.dotted_name()
        .map(|name| name == "Union" || name.ends_with(".Union"))
        .unwrap_or(false)
}
