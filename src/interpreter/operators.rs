use std::cmp::Ordering;

use super::value::{Dict, Value};
use super::{ErrorKind, Interpreter, InterpreterError};
use crate::ast::{BinaryOperator, CompareOperator, UnaryOperator};
use crate::std_lib;

impl Interpreter {
    pub fn binary(&mut self, left: &Value, operator: BinaryOperator, right: &Value) -> Result<Value, InterpreterError> {
        use BinaryOperator::*;

        match (operator, left, right) {
            (Add, Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
            (Add, Value::List(a), Value::List(b)) => {
                let mut items = a.borrow().clone();
                items.extend(b.borrow().iter().cloned());
                Ok(Value::list(items))
            }
            (Add, Value::Tuple(a), Value::Tuple(b)) => {
                let mut items = a.as_ref().clone();
                items.extend(b.iter().cloned());
                Ok(Value::tuple(items))
            }
            (Multiply, Value::Str(text), count) | (Multiply, count, Value::Str(text)) if is_integer(count) => {
                Ok(Value::Str(text.repeat(repeat_count(count))))
            }
            (Multiply, Value::List(items), count) | (Multiply, count, Value::List(items)) if is_integer(count) => {
                let items = items.borrow();
                let times = repeat_count(count);
                let mut repeated = Vec::with_capacity(items.len() * times);
                for _ in 0..times {
                    repeated.extend(items.iter().cloned());
                }
                Ok(Value::list(repeated))
            }
            (Modulo, Value::Str(template), arguments) => std_lib::string::percent_format(self, template, arguments),
            (BitOr, Value::Dict(a), Value::Dict(b)) => {
                let mut merged: Dict = a.borrow().clone();
                for (key, value) in b.borrow().entries() {
                    merged.insert(key.clone(), value.clone());
                }
                Ok(Value::dict(merged))
            }
            (BitAnd | BitOr | BitXor, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(match operator {
                BitAnd => *a & *b,
                BitOr => *a | *b,
                _ => *a ^ *b,
            })),
            _ => self.arithmetic(left, operator, right),
        }
    }

    fn arithmetic(&mut self, left: &Value, operator: BinaryOperator, right: &Value) -> Result<Value, InterpreterError> {
        if let (Some(a), Some(b)) = (left.as_int(), right.as_int()) {
            if let Some(result) = integer_arithmetic(operator, a, b)? {
                return Ok(result);
            }
        } else if let (Some(a), Some(b)) = (left.as_number(), right.as_number()) {
            if let Some(result) = float_arithmetic(operator, a, b)? {
                return Ok(result);
            }
        }

        let hook = match operator {
            BinaryOperator::Add => Some("__add__"),
            BinaryOperator::Subtract => Some("__sub__"),
            BinaryOperator::Multiply => Some("__mul__"),
            _ => None,
        };
        if let (Some(hook), Value::Instance(instance)) = (hook, left) {
            if instance.class.lookup(hook).is_some() {
                let method = self.get_attribute(left, hook)?;
                return self.call(&method, vec![right.clone()], Vec::new());
            }
        }

        Err(InterpreterError::type_error(format!(
            "unsupported operand type(s) for {}: '{}' and '{}'",
            operator.symbol(),
            left.type_name(),
            right.type_name()
        )))
    }

    /// `target op= value`. Lists extend in place; everything else rebinds.
    pub(super) fn augmented(&mut self, current: &Value, operator: BinaryOperator, value: &Value) -> Result<Value, InterpreterError> {
        if let (BinaryOperator::Add, Value::List(items)) = (operator, current) {
            let extra = self.iterate(value)?;
            items.borrow_mut().extend(extra);
            return Ok(current.clone());
        }
        self.binary(current, operator, value)
    }

    pub(super) fn unary(&mut self, operator: UnaryOperator, operand: &Value) -> Result<Value, InterpreterError> {
        match (operator, operand) {
            (UnaryOperator::Not, value) => Ok(Value::Bool(!self.is_truthy(value)?)),
            (UnaryOperator::Negate, Value::Float(value)) => Ok(Value::Float(-value)),
            (UnaryOperator::Negate, value) if value.as_int().is_some() => {
                let number = value.as_int().unwrap_or_default();
                number.checked_neg().map(Value::Int).ok_or_else(overflow)
            }
            (UnaryOperator::Plus, Value::Float(value)) => Ok(Value::Float(*value)),
            (UnaryOperator::Plus, value) if value.as_int().is_some() => Ok(Value::Int(value.as_int().unwrap_or_default())),
            (UnaryOperator::Invert, value) if value.as_int().is_some() => Ok(Value::Int(!value.as_int().unwrap_or_default())),
            (operator, value) => {
                let symbol = match operator {
                    UnaryOperator::Negate => "-",
                    UnaryOperator::Plus => "+",
                    UnaryOperator::Invert => "~",
                    UnaryOperator::Not => "not",
                };
                Err(InterpreterError::type_error(format!(
                    "bad operand type for unary {}: '{}'",
                    symbol,
                    value.type_name()
                )))
            }
        }
    }

    pub(super) fn compare(&mut self, left: &Value, operator: CompareOperator, right: &Value) -> Result<bool, InterpreterError> {
        match operator {
            CompareOperator::Equal => self.values_equal(left, right),
            CompareOperator::NotEqual => Ok(!self.values_equal(left, right)?),
            CompareOperator::Is => Ok(left.is_same(right)),
            CompareOperator::IsNot => Ok(!left.is_same(right)),
            CompareOperator::In => self.contains(right, left),
            CompareOperator::NotIn => Ok(!self.contains(right, left)?),
            CompareOperator::Less
            | CompareOperator::LessEqual
            | CompareOperator::Greater
            | CompareOperator::GreaterEqual => {
                let Some(ordering) = self.partial_order(left, right, operator)? else {
                    return Ok(false);
                };
                Ok(match operator {
                    CompareOperator::Less => ordering == Ordering::Less,
                    CompareOperator::LessEqual => ordering != Ordering::Greater,
                    CompareOperator::Greater => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                })
            }
        }
    }

    /// `==`, honouring a user-defined `__eq__`.
    pub fn values_equal(&mut self, left: &Value, right: &Value) -> Result<bool, InterpreterError> {
        if let Value::Instance(instance) = left {
            if instance.class.lookup("__eq__").is_some() {
                let method = self.get_attribute(left, "__eq__")?;
                let result = self.call(&method, vec![right.clone()], Vec::new())?;
                return self.is_truthy(&result);
            }
        }
        Ok(left.equals(right))
    }

    /// Total order used by `sorted`, `min` and `max`.
    pub fn order(&mut self, left: &Value, right: &Value) -> Result<Ordering, InterpreterError> {
        Ok(self
            .partial_order(left, right, CompareOperator::Less)?
            .unwrap_or(Ordering::Equal))
    }

    /// `None` when the values are unordered, as with NaN.
    fn partial_order(&mut self, left: &Value, right: &Value, operator: CompareOperator) -> Result<Option<Ordering>, InterpreterError> {
        match (left, right) {
            (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
            (Value::List(a), Value::List(b)) => {
                let (a, b) = (a.borrow().clone(), b.borrow().clone());
                self.sequence_order(&a, &b, operator)
            }
            (Value::Tuple(a), Value::Tuple(b)) => {
                let (a, b) = (a.clone(), b.clone());
                self.sequence_order(&a, &b, operator)
            }
            (a, b) => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => Ok(x.partial_cmp(&y)),
                _ => Err(InterpreterError::type_error(format!(
                    "'{}' not supported between instances of '{}' and '{}'",
                    operator.symbol(),
                    a.type_name(),
                    b.type_name()
                ))),
            },
        }
    }

    fn sequence_order(&mut self, a: &[Value], b: &[Value], operator: CompareOperator) -> Result<Option<Ordering>, InterpreterError> {
        for (x, y) in a.iter().zip(b) {
            if self.values_equal(x, y)? {
                continue;
            }
            return self.partial_order(x, y, operator);
        }
        Ok(Some(a.len().cmp(&b.len())))
    }

    pub fn contains(&mut self, container: &Value, item: &Value) -> Result<bool, InterpreterError> {
        match container {
            Value::Str(text) => match item {
                Value::Str(needle) => Ok(text.contains(needle.as_str())),
                other => Err(InterpreterError::type_error(format!(
                    "'in <string>' requires string as left operand, not {}",
                    other.type_name()
                ))),
            },
            Value::List(items) => {
                let items = items.borrow().clone();
                self.any_equal(&items, item)
            }
            Value::Tuple(items) => {
                let items = items.clone();
                self.any_equal(&items, item)
            }
            Value::Dict(dict) => Ok(dict.borrow().contains_key(item)),
            Value::Instance(instance) if instance.class.lookup("__contains__").is_some() => {
                let method = self.get_attribute(container, "__contains__")?;
                let result = self.call(&method, vec![item.clone()], Vec::new())?;
                self.is_truthy(&result)
            }
            other => Err(InterpreterError::type_error(format!(
                "argument of type '{}' is not iterable",
                other.type_name()
            ))),
        }
    }

    fn any_equal(&mut self, items: &[Value], item: &Value) -> Result<bool, InterpreterError> {
        for candidate in items {
            if item.is_same(candidate) || self.values_equal(candidate, item)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn is_integer(value: &Value) -> bool {
    value.as_int().is_some()
}

fn repeat_count(value: &Value) -> usize {
    value.as_int().and_then(|count| usize::try_from(count).ok()).unwrap_or(0)
}

fn overflow() -> InterpreterError {
    InterpreterError::runtime(ErrorKind::RuntimeError, "integer overflow")
}

/// `Ok(None)` means the operator does not apply to integers.
fn integer_arithmetic(operator: BinaryOperator, a: i64, b: i64) -> Result<Option<Value>, InterpreterError> {
    let value = match operator {
        BinaryOperator::Add => a.checked_add(b).ok_or_else(overflow)?,
        BinaryOperator::Subtract => a.checked_sub(b).ok_or_else(overflow)?,
        BinaryOperator::Multiply => a.checked_mul(b).ok_or_else(overflow)?,
        BinaryOperator::Divide => {
            if b == 0 {
                return Err(InterpreterError::zero_division("division by zero"));
            }
            return Ok(Some(Value::Float(a as f64 / b as f64)));
        }
        BinaryOperator::FloorDivide => {
            if b == 0 {
                return Err(InterpreterError::zero_division("integer division or modulo by zero"));
            }
            let quotient = a.checked_div(b).ok_or_else(overflow)?;
            if (a % b != 0) && ((a < 0) != (b < 0)) {
                quotient - 1
            } else {
                quotient
            }
        }
        BinaryOperator::Modulo => {
            if b == 0 {
                return Err(InterpreterError::zero_division("integer modulo by zero"));
            }
            let remainder = a.checked_rem(b).ok_or_else(overflow)?;
            if remainder != 0 && ((remainder < 0) != (b < 0)) {
                remainder + b
            } else {
                remainder
            }
        }
        BinaryOperator::Power => match u32::try_from(b) {
            Ok(exponent) => a.checked_pow(exponent).ok_or_else(overflow)?,
            Err(_) if b < 0 => {
                if a == 0 {
                    return Err(InterpreterError::zero_division("0.0 cannot be raised to a negative power"));
                }
                return Ok(Some(Value::Float((a as f64).powf(b as f64))));
            }
            Err(_) => return Err(overflow()),
        },
        BinaryOperator::BitAnd => a & b,
        BinaryOperator::BitOr => a | b,
        BinaryOperator::BitXor => a ^ b,
        BinaryOperator::MatMul => return Ok(None),
    };
    Ok(Some(Value::Int(value)))
}

fn float_arithmetic(operator: BinaryOperator, a: f64, b: f64) -> Result<Option<Value>, InterpreterError> {
    let value = match operator {
        BinaryOperator::Add => a + b,
        BinaryOperator::Subtract => a - b,
        BinaryOperator::Multiply => a * b,
        BinaryOperator::Divide => {
            if b == 0.0 {
                return Err(InterpreterError::zero_division("float division by zero"));
            }
            a / b
        }
        BinaryOperator::FloorDivide => {
            if b == 0.0 {
                return Err(InterpreterError::zero_division("float floor division by zero"));
            }
            (a / b).floor()
        }
        BinaryOperator::Modulo => {
            if b == 0.0 {
                return Err(InterpreterError::zero_division("float modulo"));
            }
            a - b * (a / b).floor()
        }
        BinaryOperator::Power => a.powf(b),
        BinaryOperator::BitAnd | BinaryOperator::BitOr | BinaryOperator::BitXor | BinaryOperator::MatMul => {
            return Ok(None)
        }
    };
    Ok(Some(Value::Float(value)))
}
