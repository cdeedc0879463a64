//! Literal evaluation of canonical source text into JSON values.
//!
//! Accepts the same shapes a literal-only evaluator would: numbers, strings,
//! booleans, `None`, signed numbers and containers of those. Anything else
//! (names, calls, operators) is not a literal and yields `None`.

use serde_json::{Map, Number, Value};

use crate::ast::{Expr, Literal, UnaryOperator};
use crate::parser::parse_expression_source;

/// Evaluates `text` as a literal. `None` when it is not one.
pub fn literal_eval(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    let expr = parse_expression_source(text, 1).ok()?;
    expr_to_json(&expr)
}

pub fn expr_to_json(expr: &Expr) -> Option<Value> {
    match expr {
        Expr::Literal(literal) => literal_to_json(literal),
        Expr::Unary { operator, operand } => {
            let value = expr_to_json(operand)?;
            match (operator, value) {
                (UnaryOperator::Plus, value @ Value::Number(_)) => Some(value),
                (UnaryOperator::Negate, Value::Number(number)) => negate(&number),
                _ => None,
            }
        }
        Expr::List(items) | Expr::Tuple(items) | Expr::Set(items) => {
            items.iter().map(expr_to_json).collect::<Option<Vec<_>>>().map(Value::Array)
        }
        Expr::Dict(entries) => {
            let mut object = Map::new();
            for (key, value) in entries {
                let key = match expr_to_json(key)? {
                    Value::String(key) => key,
                    Value::Number(number) => number.to_string(),
                    Value::Bool(flag) => (if flag { "True" } else { "False" }).to_string(),
                    _ => return None,
                };
                object.insert(key, expr_to_json(value)?);
            }
            Some(Value::Object(object))
        }
        _ => None,
    }
}

fn literal_to_json(literal: &Literal) -> Option<Value> {
    match literal {
        Literal::Integer(value) => Some(Value::Number((*value).into())),
        Literal::Float(value) => Number::from_f64(*value).map(Value::Number),
        Literal::String(value) => Some(Value::String(value.clone())),
        Literal::Boolean(value) => Some(Value::Bool(*value)),
        Literal::None => Some(Value::Null),
        Literal::Ellipsis => None,
    }
}

fn negate(number: &Number) -> Option<Value> {
    if let Some(value) = number.as_i64() {
        return value.checked_neg().map(|negated| Value::Number(negated.into()));
    }
    number
        .as_f64()
        .and_then(|value| Number::from_f64(-value))
        .map(Value::Number)
}
