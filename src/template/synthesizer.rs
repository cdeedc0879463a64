//! Entrypoint signature to field template.

use serde_json::Value as Json;

use super::config::Overrides;
use super::field::{FieldKind, TemplateField};
use super::Template;
use crate::analysis::{literal_eval, ArgRecord};
use crate::ast::{BinaryOperator, Expr, Literal};
use crate::parser::parse_expression_source;

/// Annotations whose argument becomes a list field of the inner type.
const SEQUENCE_CONTAINERS: &[&str] = &["list", "List", "Sequence", "Set", "set", "Tuple", "tuple"];

/// The field's view of a type annotation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TypeInfo {
    pub type_name: String,
    pub optional: bool,
    pub is_list: bool,
}

impl TypeInfo {
    pub fn analyze(annotation: &str) -> Self {
        match parse_expression_source(annotation, 1) {
            Ok(expr) => {
                let (expr, optional) = strip_optional(&expr);
                match sequence_inner(&expr) {
                    Some(inner) => TypeInfo {
                        type_name: inner,
                        optional,
                        is_list: true,
                    },
                    None => TypeInfo {
                        type_name: expr.to_string(),
                        optional,
                        is_list: false,
                    },
                }
            }
            Err(_) => TypeInfo {
                type_name: annotation.trim().to_string(),
                optional: false,
                is_list: false,
            },
        }
    }
}

fn is_none(expr: &Expr) -> bool {
    matches!(expr, Expr::Literal(Literal::None)) || matches!(expr, Expr::Name(name) if name == "None")
}

/// Last segment of `typing.Optional`-style names.
fn short_name(expr: &Expr) -> Option<String> {
    expr.dotted_name()
        .map(|name| name.rsplit('.').next().unwrap_or(&name).to_string())
}

/// Removes `None` from `Optional[X]`, `Union[X, None]` and `X | None`.
fn strip_optional(expr: &Expr) -> (Expr, bool) {
    match expr {
        Expr::Subscript { object, index } => match short_name(object).as_deref() {
            Some("Optional") => (index.as_ref().clone(), true),
            Some("Union") => {
                let members = match index.as_ref() {
                    Expr::Tuple(items) => items.clone(),
                    other => vec![other.clone()],
                };
                let kept: Vec<Expr> = members.iter().filter(|member| !is_none(member)).cloned().collect();
                if kept.len() == members.len() {
                    return (expr.clone(), false);
                }
                let stripped = match kept.len() {
                    1 => kept[0].clone(),
                    _ => Expr::Subscript {
                        object: object.clone(),
                        index: Box::new(Expr::Tuple(kept)),
                    },
                };
                (stripped, true)
            }
            _ => (expr.clone(), false),
        },
        Expr::Binary {
            operator: BinaryOperator::BitOr,
            ..
        } => {
            let mut members = Vec::new();
            flatten_union(expr, &mut members);
            let kept: Vec<Expr> = members.iter().filter(|member| !is_none(member)).cloned().collect();
            if kept.len() == members.len() || kept.is_empty() {
                return (expr.clone(), false);
            }
            let stripped = kept
                .into_iter()
                .reduce(|left, right| Expr::Binary {
                    left: Box::new(left),
                    operator: BinaryOperator::BitOr,
                    right: Box::new(right),
                })
                .unwrap_or_else(|| expr.clone());
            (stripped, true)
        }
        _ => (expr.clone(), false),
    }
}

fn flatten_union(expr: &Expr, members: &mut Vec<Expr>) {
    match expr {
        Expr::Binary {
            left,
            operator: BinaryOperator::BitOr,
            right,
        } => {
            flatten_union(left, members);
            flatten_union(right, members);
        }
        other => members.push(other.clone()),
    }
}

/// Inner type text of a sequence container, or the bare container name.
fn sequence_inner(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Subscript { object, index } => {
            let container = short_name(object)?;
            if !SEQUENCE_CONTAINERS.contains(&container.as_str()) {
                return None;
            }
            Some(match index.as_ref() {
                Expr::Tuple(items) if !items.is_empty() => items.iter().map(Expr::to_string).collect::<Vec<_>>().join(", "),
                index => index.to_string(),
            })
        }
        Expr::Name(name) if SEQUENCE_CONTAINERS.contains(&name.as_str()) => Some(name.clone()),
        _ => None,
    }
}

fn is_skipped(name: &str) -> bool {
    name == "self" || name == "cls" || name.starts_with('*')
}

fn field_for_arg(arg: &ArgRecord) -> TemplateField {
    let info = TypeInfo::analyze(arg.type_name.as_deref().unwrap_or("str"));
    let default = arg.default.as_deref();

    let mut field = TemplateField::new(arg.name.clone());
    field.kind = FieldKind::for_type(&info.type_name, false);
    field.type_name = info.type_name;
    field.is_list = info.is_list;
    field.required = default.is_none() && !info.optional;
    field.default_value = default.and_then(literal_eval).unwrap_or(Json::Null);
    if field.kind == FieldKind::Toggle && default.is_some() && field.default_value.is_null() {
        field.default_value = Json::Bool(false);
    }
    field
}

/// Builds the template for `args` (receiver already stripped), then applies
/// `overrides`. Fields follow signature order; fields only named by an
/// override come after, in override order.
pub fn synthesize(args: &[ArgRecord], overrides: &Overrides) -> Template {
    let mut template = Template::new();

    for arg in args.iter().filter(|arg| !is_skipped(&arg.name)) {
        let mut field = field_for_arg(arg);
        field.show = arg.name != "code";
        if let Some(config) = overrides.get(&arg.name) {
            config.apply(&mut field);
        }
        template.insert(arg.name.clone(), field);
    }

    for (name, config) in overrides {
        if template.contains_key(name) {
            continue;
        }
        let mut field = TemplateField::new(name.clone());
        field.show = name != "code";
        config.apply(&mut field);
        template.insert(name.clone(), field);
    }

    template
}
