use std::rc::Rc;

use super::environment::{Environment, ScopeKind};
use super::value::{Dict, Value};
use super::{ErrorKind, Interpreter, InterpreterError};
use crate::ast::{format_float, quote_string, Argument, Comprehension, Expr, FStringPart, Literal, LogicalOperator};
use crate::std_lib;

/// Nesting depth at which `repr` stops descending into containers.
const MAX_REPR_DEPTH: usize = 32;

impl Interpreter {
    pub(super) fn evaluate(&mut self, expr: &Expr, env: &Environment) -> Result<Value, InterpreterError> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                Literal::Integer(value) => Value::Int(*value),
                Literal::Float(value) => Value::Float(*value),
                Literal::String(text) => Value::Str(text.clone()),
                Literal::Boolean(flag) => Value::Bool(*flag),
                Literal::None => Value::None,
                Literal::Ellipsis => Value::External(Rc::from("Ellipsis")),
            }),
            Expr::Name(name) => env
                .get(name)
                .or_else(|| self.builtins.get(name).cloned())
                .ok_or_else(|| InterpreterError::name_error(name)),
            Expr::FString(parts) => self.evaluate_fstring(parts, env),
            Expr::Attribute { object, name } => {
                let object = self.evaluate(object, env)?;
                self.get_attribute(&object, name)
            }
            Expr::Subscript { object, index } => {
                let object = self.evaluate(object, env)?;
                match index.as_ref() {
                    Expr::Slice { lower, upper, step } => {
                        let lower = self.evaluate_bound(lower.as_deref(), env)?;
                        let upper = self.evaluate_bound(upper.as_deref(), env)?;
                        let step = self.evaluate_bound(step.as_deref(), env)?;
                        self.slice(&object, lower, upper, step)
                    }
                    index => {
                        let index = self.evaluate(index, env)?;
                        self.get_item(&object, &index)
                    }
                }
            }
            Expr::Slice { .. } => Err(InterpreterError::type_error("slice is only valid inside a subscript")),
            Expr::Call { callee, arguments } => self.evaluate_call(callee, arguments, env),
            Expr::Binary { left, operator, right } => {
                let left = self.evaluate(left, env)?;
                let right = self.evaluate(right, env)?;
                self.binary(&left, *operator, &right)
            }
            Expr::Unary { operator, operand } => {
                let operand = self.evaluate(operand, env)?;
                self.unary(*operator, &operand)
            }
            Expr::Logical { left, operator, right } => {
                let left = self.evaluate(left, env)?;
                let truthy = self.is_truthy(&left)?;
                match (operator, truthy) {
                    (LogicalOperator::And, true) | (LogicalOperator::Or, false) => {
                        self.evaluate(right, env)
                    }
                    _ => Ok(left),
                }
            }
            Expr::Compare { left, comparisons } => {
                let mut current = self.evaluate(left, env)?;
                for (operator, right) in comparisons {
                    let right = self.evaluate(right, env)?;
                    if !self.compare(&current, *operator, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    current = right;
                }
                Ok(Value::Bool(true))
            }
            Expr::Conditional {
                condition,
                then_value,
                else_value,
            } => {
                let condition = self.evaluate(condition, env)?;
                if self.is_truthy(&condition)? {
                    self.evaluate(then_value, env)
                } else {
                    self.evaluate(else_value, env)
                }
            }
            Expr::List(items) => Ok(Value::list(self.evaluate_all(items, env)?)),
            Expr::Tuple(items) => Ok(Value::tuple(self.evaluate_all(items, env)?)),
            Expr::Set(items) => {
                let mut unique: Vec<Value> = Vec::new();
                for item in self.evaluate_all(items, env)? {
                    ensure_hashable(&item)?;
                    if !unique.iter().any(|existing| existing.equals(&item)) {
                        unique.push(item);
                    }
                }
                Ok(Value::list(unique))
            }
            Expr::Dict(entries) => {
                let mut dict = Dict::new();
                for (key, value) in entries {
                    let key = self.evaluate(key, env)?;
                    ensure_hashable(&key)?;
                    let value = self.evaluate(value, env)?;
                    dict.insert(key, value);
                }
                Ok(Value::dict(dict))
            }
            Expr::ListComp { element, generators } => {
                let scope = env.child(ScopeKind::Comprehension);
                let mut items = Vec::new();
                self.comprehension(element, generators, &scope, &mut items)?;
                Ok(Value::list(items))
            }
        }
    }

    fn evaluate_all(&mut self, items: &[Expr], env: &Environment) -> Result<Vec<Value>, InterpreterError> {
        items.iter().map(|item| self.evaluate(item, env)).collect()
    }

    fn evaluate_bound(&mut self, expr: Option<&Expr>, env: &Environment) -> Result<Option<i64>, InterpreterError> {
        let Some(expr) = expr else {
            return Ok(None);
        };
        match self.evaluate(expr, env)? {
            Value::None => Ok(None),
            value => value.as_int().map(Some).ok_or_else(|| {
                InterpreterError::type_error("slice indices must be integers or None")
            }),
        }
    }

    fn evaluate_fstring(&mut self, parts: &[FStringPart], env: &Environment) -> Result<Value, InterpreterError> {
        let mut out = String::new();
        for part in parts {
            match part {
                FStringPart::Literal(text) => out.push_str(text),
                FStringPart::Expr {
                    expr,
                    conversion,
                    format_spec,
                } => {
                    let value = self.evaluate(expr, env)?;
                    let value = match conversion {
                        Some('r') | Some('a') => Value::Str(self.repr(&value)?),
                        Some('s') => Value::Str(self.stringify(&value)?),
                        _ => value,
                    };
                    let text = match format_spec {
                        Some(spec) => std_lib::string::format_value(self, &value, spec)?,
                        None => self.stringify(&value)?,
                    };
                    out.push_str(&text);
                }
            }
        }
        Ok(Value::Str(out))
    }

    fn evaluate_call(&mut self, callee: &Expr, arguments: &[Argument], env: &Environment) -> Result<Value, InterpreterError> {
        if let Expr::Name(name) = callee {
            if name == "super" && arguments.is_empty() && env.get("super").is_none() {
                return self.zero_argument_super(env);
            }
        }

        let function = self.evaluate(callee, env)?;
        let mut positional = Vec::with_capacity(arguments.len());
        let mut keywords = Vec::new();
        for argument in arguments {
            match argument {
                Argument::Positional(expr) => positional.push(self.evaluate(expr, env)?),
                Argument::Keyword { name, value } => {
                    let value = self.evaluate(value, env)?;
                    keywords.push((name.clone(), value));
                }
                Argument::Unpack(expr) => {
                    let value = self.evaluate(expr, env)?;
                    positional.extend(self.iterate(&value)?);
                }
                Argument::UnpackDict(expr) => match self.evaluate(expr, env)? {
                    Value::Dict(dict) => {
                        for (key, value) in dict.borrow().entries() {
                            let Value::Str(key) = key else {
                                return Err(InterpreterError::type_error("keywords must be strings"));
                            };
                            keywords.push((key.clone(), value.clone()));
                        }
                    }
                    other => {
                        return Err(InterpreterError::type_error(format!(
                            "argument after ** must be a mapping, not {}",
                            other.type_name()
                        )))
                    }
                },
            }
        }
        self.call(&function, positional, keywords)
    }

    fn comprehension(
        &mut self,
        element: &Expr,
        generators: &[Comprehension],
        env: &Environment,
        out: &mut Vec<Value>,
    ) -> Result<(), InterpreterError> {
        let Some((first, rest)) = generators.split_first() else {
            out.push(self.evaluate(element, env)?);
            return Ok(());
        };

        let iterable = self.evaluate(&first.iterable, env)?;
        'items: for item in self.iterate(&iterable)? {
            self.assign(&first.target, item, env)?;
            for condition in &first.conditions {
                let keep = self.evaluate(condition, env)?;
                if !self.is_truthy(&keep)? {
                    continue 'items;
                }
            }
            self.comprehension(element, rest, env, out)?;
        }
        Ok(())
    }

    pub(super) fn assign(&mut self, target: &Expr, value: Value, env: &Environment) -> Result<(), InterpreterError> {
        match target {
            Expr::Name(name) => {
                env.define(name.clone(), value);
                Ok(())
            }
            Expr::Attribute { object, name } => {
                let object = self.evaluate(object, env)?;
                self.set_attribute(&object, name, value)
            }
            Expr::Subscript { object, index } => {
                let object = self.evaluate(object, env)?;
                if matches!(index.as_ref(), Expr::Slice { .. }) {
                    return Err(InterpreterError::type_error("slice assignment is not supported"));
                }
                let index = self.evaluate(index, env)?;
                self.set_item(&object, index, value)
            }
            Expr::Tuple(targets) | Expr::List(targets) => {
                let values = self.iterate(&value)?;
                if values.len() > targets.len() {
                    return Err(InterpreterError::value_error(format!(
                        "too many values to unpack (expected {})",
                        targets.len()
                    )));
                }
                if values.len() < targets.len() {
                    return Err(InterpreterError::value_error(format!(
                        "not enough values to unpack (expected {}, got {})",
                        targets.len(),
                        values.len()
                    )));
                }
                for (target, value) in targets.iter().zip(values) {
                    self.assign(target, value, env)?;
                }
                Ok(())
            }
            other => Err(InterpreterError::runtime(
                ErrorKind::RuntimeError,
                format!("cannot assign to expression '{}'", other),
            )),
        }
    }

    /// Materializes an iterable. Everything iterable here is finite.
    pub fn iterate(&mut self, value: &Value) -> Result<Vec<Value>, InterpreterError> {
        match value {
            Value::List(items) => Ok(items.borrow().clone()),
            Value::Tuple(items) => Ok(items.as_ref().clone()),
            Value::Str(text) => Ok(text.chars().map(|c| Value::Str(c.to_string())).collect()),
            Value::Dict(dict) => Ok(dict.borrow().keys()),
            Value::Instance(instance) if instance.class.lookup("__iter__").is_some() => {
                let method = self.get_attribute(value, "__iter__")?;
                let iterator = self.call(&method, Vec::new(), Vec::new())?;
                if matches!(iterator, Value::Instance(_)) {
                    return Err(InterpreterError::type_error("iterator objects are not supported; return a list"));
                }
                self.iterate(&iterator)
            }
            other => Err(InterpreterError::type_error(format!(
                "'{}' object is not iterable",
                other.type_name()
            ))),
        }
    }

    pub fn is_truthy(&mut self, value: &Value) -> Result<bool, InterpreterError> {
        let Value::Instance(instance) = value else {
            return Ok(value.is_truthy_basic());
        };

        if instance.class.lookup("__bool__").is_some() {
            let method = self.get_attribute(value, "__bool__")?;
            return match self.call(&method, Vec::new(), Vec::new())? {
                Value::Bool(flag) => Ok(flag),
                other => Err(InterpreterError::type_error(format!(
                    "__bool__ should return bool, returned {}",
                    other.type_name()
                ))),
            };
        }
        if instance.class.lookup("__len__").is_some() {
            let method = self.get_attribute(value, "__len__")?;
            return match self.call(&method, Vec::new(), Vec::new())?.as_int() {
                Some(length) => Ok(length != 0),
                None => Err(InterpreterError::type_error("__len__ should return an integer")),
            };
        }
        Ok(true)
    }

    /// `str(value)`.
    pub fn stringify(&mut self, value: &Value) -> Result<String, InterpreterError> {
        match value {
            Value::Str(text) => Ok(text.clone()),
            Value::Instance(instance) if instance.class.lookup("__str__").is_some() => {
                let method = self.get_attribute(value, "__str__")?;
                match self.call(&method, Vec::new(), Vec::new())? {
                    Value::Str(text) => Ok(text),
                    other => Err(InterpreterError::type_error(format!(
                        "__str__ returned non-string (type {})",
                        other.type_name()
                    ))),
                }
            }
            other => self.repr(other),
        }
    }

    /// `repr(value)`.
    pub fn repr(&mut self, value: &Value) -> Result<String, InterpreterError> {
        self.repr_nested(value, 0)
    }

    fn repr_nested(&mut self, value: &Value, depth: usize) -> Result<String, InterpreterError> {
        if depth > MAX_REPR_DEPTH {
            return Ok("...".to_string());
        }
        match value {
            Value::None => Ok("None".to_string()),
            Value::Bool(true) => Ok("True".to_string()),
            Value::Bool(false) => Ok("False".to_string()),
            Value::Int(number) => Ok(number.to_string()),
            Value::Float(number) => Ok(format_float(*number)),
            Value::Str(text) => Ok(quote_string(text)),
            Value::List(items) => {
                let items = items.borrow().clone();
                let parts = self.repr_items(&items, depth)?;
                Ok(format!("[{}]", parts.join(", ")))
            }
            Value::Tuple(items) => {
                let parts = self.repr_items(items, depth)?;
                if parts.len() == 1 {
                    Ok(format!("({},)", parts[0]))
                } else {
                    Ok(format!("({})", parts.join(", ")))
                }
            }
            Value::Dict(dict) => {
                let entries = dict.borrow().entries().to_vec();
                let mut parts = Vec::with_capacity(entries.len());
                for (key, value) in &entries {
                    let key = self.repr_nested(key, depth + 1)?;
                    let value = self.repr_nested(value, depth + 1)?;
                    parts.push(format!("{}: {}", key, value));
                }
                Ok(format!("{{{}}}", parts.join(", ")))
            }
            Value::Instance(instance) if instance.class.lookup("__repr__").is_some() => {
                let method = self.get_attribute(value, "__repr__")?;
                match self.call(&method, Vec::new(), Vec::new())? {
                    Value::Str(text) => Ok(text),
                    other => Err(InterpreterError::type_error(format!(
                        "__repr__ returned non-string (type {})",
                        other.type_name()
                    ))),
                }
            }
            Value::External(path) => Ok(path.to_string()),
            other => Ok(format!("{:?}", other)),
        }
    }

    fn repr_items(&mut self, items: &[Value], depth: usize) -> Result<Vec<String>, InterpreterError> {
        items.iter().map(|item| self.repr_nested(item, depth + 1)).collect()
    }

    pub fn get_item(&mut self, object: &Value, index: &Value) -> Result<Value, InterpreterError> {
        match object {
            Value::List(items) => {
                let items = items.borrow();
                let position = sequence_index(index, items.len(), "list")?;
                Ok(items[position].clone())
            }
            Value::Tuple(items) => {
                let position = sequence_index(index, items.len(), "tuple")?;
                Ok(items[position].clone())
            }
            Value::Str(text) => {
                let chars: Vec<char> = text.chars().collect();
                let position = sequence_index(index, chars.len(), "string")?;
                Ok(Value::Str(chars[position].to_string()))
            }
            Value::Dict(dict) => {
                ensure_hashable(index)?;
                let found = dict.borrow().get(index).cloned();
                match found {
                    Some(value) => Ok(value),
                    None => Err(InterpreterError::runtime(ErrorKind::KeyError, self.repr(index)?)),
                }
            }
            Value::Instance(instance) if instance.class.lookup("__getitem__").is_some() => {
                let method = self.get_attribute(object, "__getitem__")?;
                self.call(&method, vec![index.clone()], Vec::new())
            }
            // Generic aliases such as `list[str]` or `Optional[int]`.
            Value::Class(_) | Value::Builtin(_) => Ok(object.clone()),
            Value::External(path) => Ok(Value::External(Rc::from(format!("{}[...]", path)))),
            other => Err(InterpreterError::type_error(format!(
                "'{}' object is not subscriptable",
                other.type_name()
            ))),
        }
    }

    fn slice(&mut self, object: &Value, lower: Option<i64>, upper: Option<i64>, step: Option<i64>) -> Result<Value, InterpreterError> {
        let step = step.unwrap_or(1);
        if step == 0 {
            return Err(InterpreterError::value_error("slice step cannot be zero"));
        }
        match object {
            Value::List(items) => {
                let items = items.borrow();
                let picked = slice_positions(items.len(), lower, upper, step).map(|i| items[i].clone()).collect();
                Ok(Value::list(picked))
            }
            Value::Tuple(items) => {
                let picked = slice_positions(items.len(), lower, upper, step).map(|i| items[i].clone()).collect();
                Ok(Value::tuple(picked))
            }
            Value::Str(text) => {
                let chars: Vec<char> = text.chars().collect();
                Ok(Value::Str(slice_positions(chars.len(), lower, upper, step).map(|i| chars[i]).collect()))
            }
            other => Err(InterpreterError::type_error(format!(
                "'{}' object is not subscriptable",
                other.type_name()
            ))),
        }
    }

    pub fn set_item(&mut self, object: &Value, index: Value, value: Value) -> Result<(), InterpreterError> {
        match object {
            Value::List(items) => {
                let mut items = items.borrow_mut();
                let position = sequence_index(&index, items.len(), "list assignment")?;
                items[position] = value;
                Ok(())
            }
            Value::Dict(dict) => {
                ensure_hashable(&index)?;
                dict.borrow_mut().insert(index, value);
                Ok(())
            }
            Value::Instance(instance) if instance.class.lookup("__setitem__").is_some() => {
                let method = self.get_attribute(object, "__setitem__")?;
                self.call(&method, vec![index, value], Vec::new())?;
                Ok(())
            }
            other => Err(InterpreterError::type_error(format!(
                "'{}' object does not support item assignment",
                other.type_name()
            ))),
        }
    }
}

pub(crate) fn ensure_hashable(value: &Value) -> Result<(), InterpreterError> {
    if value.is_hashable() {
        Ok(())
    } else {
        Err(InterpreterError::type_error(format!("unhashable type: '{}'", value.type_name())))
    }
}

/// Resolves a possibly negative index against a sequence of `len` items.
fn sequence_index(index: &Value, len: usize, what: &str) -> Result<usize, InterpreterError> {
    let Some(raw) = index.as_int() else {
        return Err(InterpreterError::type_error(format!(
            "{} indices must be integers, not {}",
            what.split(' ').next().unwrap_or(what),
            index.type_name()
        )));
    };
    let len = len as i64;
    let position = if raw < 0 { raw + len } else { raw };
    if position < 0 || position >= len {
        return Err(InterpreterError::index_error(format!("{} index out of range", what)));
    }
    Ok(position as usize)
}

/// Positions selected by `[lower:upper:step]`, with the usual clamping.
fn slice_positions(len: usize, lower: Option<i64>, upper: Option<i64>, step: i64) -> impl Iterator<Item = usize> {
    let len = len as i64;
    let normalize = |value: i64| if value < 0 { value + len } else { value };

    let (start, stop) = if step > 0 {
        (
            lower.map(normalize).unwrap_or(0).clamp(0, len),
            upper.map(normalize).unwrap_or(len).clamp(0, len),
        )
    } else {
        (
            lower.map(normalize).unwrap_or(len - 1).clamp(-1, len - 1),
            upper.map(normalize).unwrap_or(-1).clamp(-1, len - 1),
        )
    };

    let mut current = start;
    std::iter::from_fn(move || {
        let in_range = if step > 0 { current < stop } else { current > stop };
        if !in_range {
            return None;
        }
        let position = current as usize;
        // A step past the end of the i64 range can only leave the slice.
        current = current.checked_add(step).unwrap_or(stop);
        Some(position)
    })
}
