//! Global built-in functions.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::ast::BinaryOperator;
use crate::interpreter::value::SuperProxy;
use crate::interpreter::{CallArgs, Dict, ErrorKind, Function, FunctionKind, Interpreter, InterpreterError, Value};

/// Largest `range()` this runtime materializes.
const MAX_RANGE_LEN: i128 = 10_000_000;

pub(crate) fn int_arg(value: &Value) -> Result<i64, InterpreterError> {
    match value {
        Value::Float(_) => Err(InterpreterError::type_error("'float' object cannot be interpreted as an integer")),
        other => other.as_int().ok_or_else(|| {
            InterpreterError::type_error(format!(
                "'{}' object cannot be interpreted as an integer",
                other.type_name()
            ))
        }),
    }
}

pub(crate) fn str_arg<'a>(value: &'a Value, function: &str) -> Result<&'a str, InterpreterError> {
    match value {
        Value::Str(text) => Ok(text),
        other => Err(InterpreterError::type_error(format!(
            "{}() argument must be str, not {}",
            function,
            other.type_name()
        ))),
    }
}

pub fn builtin_print(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("print", 0, usize::MAX, &["sep", "end", "file", "flush"])?;
    let sep = text_option(args.keyword("sep"), " ", "sep")?;
    let end = text_option(args.keyword("end"), "\n", "end")?;

    let mut parts = Vec::with_capacity(args.positional.len());
    for value in &args.positional {
        parts.push(interpreter.stringify(value)?);
    }
    let mut line = parts.join(&sep);
    line.push_str(&end);
    if let Some(stripped) = line.strip_suffix('\n') {
        line.truncate(stripped.len());
    }
    interpreter.write_output(line);
    Ok(Value::None)
}

fn text_option(value: Option<&Value>, default: &str, name: &str) -> Result<String, InterpreterError> {
    match value {
        None | Some(Value::None) => Ok(default.to_string()),
        Some(Value::Str(text)) => Ok(text.clone()),
        Some(other) => Err(InterpreterError::type_error(format!(
            "{} must be None or a string, not {}",
            name,
            other.type_name()
        ))),
    }
}

pub fn builtin_len(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("len", 1, 1, &[])?;
    let value = &args.positional[0];
    let length = match value {
        Value::Str(text) => text.chars().count(),
        Value::List(items) => items.borrow().len(),
        Value::Tuple(items) => items.len(),
        Value::Dict(dict) => dict.borrow().len(),
        Value::Instance(instance) if instance.class.lookup("__len__").is_some() => {
            let method = interpreter.get_attribute(value, "__len__")?;
            return interpreter.call(&method, Vec::new(), Vec::new());
        }
        other => {
            return Err(InterpreterError::type_error(format!(
                "object of type '{}' has no len()",
                other.type_name()
            )))
        }
    };
    Ok(Value::Int(length as i64))
}

pub fn builtin_str(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("str", 0, 1, &[])?;
    match args.arg(0) {
        Some(value) => Ok(Value::Str(interpreter.stringify(value)?)),
        None => Ok(Value::str("")),
    }
}

pub fn builtin_repr(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("repr", 1, 1, &[])?;
    Ok(Value::Str(interpreter.repr(&args.positional[0])?))
}

pub fn builtin_int(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("int", 0, 2, &["base"])?;
    let base = match args.arg_or_keyword(1, "base") {
        Some(base) => int_arg(base)?,
        None => 10,
    };
    let Some(value) = args.arg(0) else {
        return Ok(Value::Int(0));
    };

    match value {
        Value::Int(number) => Ok(Value::Int(*number)),
        Value::Bool(flag) => Ok(Value::Int(i64::from(*flag))),
        Value::Float(number) if number.is_finite() => Ok(Value::Int(number.trunc() as i64)),
        Value::Float(number) => Err(InterpreterError::value_error(format!(
            "cannot convert float {} to integer",
            crate::ast::format_float(*number)
        ))),
        Value::Str(text) => {
            let invalid = || {
                InterpreterError::value_error(format!(
                    "invalid literal for int() with base {}: {}",
                    base,
                    crate::ast::quote_string(text)
                ))
            };
            let radix = u32::try_from(base).ok().filter(|radix| (2..=36).contains(radix)).ok_or_else(|| {
                InterpreterError::value_error("int() base must be >= 2 and <= 36, or 0")
            })?;
            let cleaned: String = text.trim().chars().filter(|c| *c != '_').collect();
            i64::from_str_radix(&cleaned, radix).map(Value::Int).map_err(|_| invalid())
        }
        other => Err(InterpreterError::type_error(format!(
            "int() argument must be a string, a bytes-like object or a real number, not '{}'",
            other.type_name()
        ))),
    }
}

pub fn builtin_float(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("float", 0, 1, &[])?;
    let Some(value) = args.arg(0) else {
        return Ok(Value::Float(0.0));
    };

    match value {
        Value::Str(text) => {
            let trimmed = text.trim();
            let parsed = match trimmed.to_ascii_lowercase().as_str() {
                "inf" | "+inf" | "infinity" | "+infinity" => Some(f64::INFINITY),
                "-inf" | "-infinity" => Some(f64::NEG_INFINITY),
                "nan" | "+nan" | "-nan" => Some(f64::NAN),
                _ => trimmed.replace('_', "").parse::<f64>().ok(),
            };
            parsed.map(Value::Float).ok_or_else(|| {
                InterpreterError::value_error(format!(
                    "could not convert string to float: {}",
                    crate::ast::quote_string(text)
                ))
            })
        }
        other => other.as_number().map(Value::Float).ok_or_else(|| {
            InterpreterError::type_error(format!(
                "float() argument must be a string or a real number, not '{}'",
                other.type_name()
            ))
        }),
    }
}

pub fn builtin_bool(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("bool", 0, 1, &[])?;
    match args.arg(0) {
        Some(value) => Ok(Value::Bool(interpreter.is_truthy(value)?)),
        None => Ok(Value::Bool(false)),
    }
}

pub fn builtin_list(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("list", 0, 1, &[])?;
    match args.arg(0) {
        Some(value) => Ok(Value::list(interpreter.iterate(value)?)),
        None => Ok(Value::list(Vec::new())),
    }
}

pub fn builtin_tuple(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("tuple", 0, 1, &[])?;
    match args.arg(0) {
        Some(Value::Tuple(items)) => Ok(Value::Tuple(Rc::clone(items))),
        Some(value) => Ok(Value::tuple(interpreter.iterate(value)?)),
        None => Ok(Value::tuple(Vec::new())),
    }
}

/// Sets are lists of unique items in first-seen order.
pub fn builtin_set(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("set", 0, 1, &[])?;
    let items = match args.arg(0) {
        Some(value) => interpreter.iterate(value)?,
        None => Vec::new(),
    };
    let mut unique: Vec<Value> = Vec::new();
    for item in items {
        if !item.is_hashable() {
            return Err(InterpreterError::type_error(format!("unhashable type: '{}'", item.type_name())));
        }
        if !unique.iter().any(|existing| existing.equals(&item)) {
            unique.push(item);
        }
    }
    Ok(Value::list(unique))
}

pub fn builtin_dict(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    if args.positional.len() > 1 {
        return Err(InterpreterError::type_error(format!(
            "dict expected at most 1 argument, got {}",
            args.positional.len()
        )));
    }
    let mut dict = Dict::new();
    if let Some(source) = args.arg(0) {
        merge_into(interpreter, &mut dict, source)?;
    }
    for (key, value) in &args.keywords {
        dict.insert(Value::str(key.clone()), value.clone());
    }
    Ok(Value::dict(dict))
}

/// Adds a mapping, or an iterable of key/value pairs, to `dict`.
pub(crate) fn merge_into(interpreter: &mut Interpreter, dict: &mut Dict, source: &Value) -> Result<(), InterpreterError> {
    if let Value::Dict(other) = source {
        for (key, value) in other.borrow().entries() {
            dict.insert(key.clone(), value.clone());
        }
        return Ok(());
    }

    for (index, pair) in interpreter.iterate(source)?.into_iter().enumerate() {
        let items = interpreter.iterate(&pair)?;
        let [key, value]: [Value; 2] = items.try_into().map_err(|items: Vec<Value>| {
            InterpreterError::value_error(format!(
                "dictionary update sequence element #{} has length {}; 2 is required",
                index,
                items.len()
            ))
        })?;
        if !key.is_hashable() {
            return Err(InterpreterError::type_error(format!("unhashable type: '{}'", key.type_name())));
        }
        dict.insert(key, value);
    }
    Ok(())
}

pub fn builtin_range(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("range", 1, 3, &[])?;
    let numbers = args.positional.iter().map(int_arg).collect::<Result<Vec<_>, _>>()?;
    let (start, stop, step) = match numbers.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => return Err(InterpreterError::type_error("range expected at most 3 arguments")),
    };
    if step == 0 {
        return Err(InterpreterError::value_error("range() arg 3 must not be zero"));
    }

    let (start, stop, step) = (i128::from(start), i128::from(stop), i128::from(step));
    let count = if step > 0 {
        (stop - start + step - 1) / step
    } else {
        (start - stop - step - 1) / -step
    }
    .max(0);
    if count > MAX_RANGE_LEN {
        return Err(InterpreterError::runtime(ErrorKind::ValueError, "range() result is too large"));
    }

    let items = (0..count).map(|i| Value::Int((start + i * step) as i64)).collect();
    Ok(Value::list(items))
}

pub fn builtin_enumerate(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("enumerate", 1, 2, &["start"])?;
    let start = match args.arg_or_keyword(1, "start") {
        Some(start) => int_arg(start)?,
        None => 0,
    };
    let items = interpreter.iterate(&args.positional[0])?;
    let pairs = items
        .into_iter()
        .zip(start..)
        .map(|(item, index)| Value::tuple(vec![Value::Int(index), item]))
        .collect();
    Ok(Value::list(pairs))
}

pub fn builtin_zip(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("zip", 0, usize::MAX, &[])?;
    let mut columns = Vec::with_capacity(args.positional.len());
    for value in &args.positional {
        columns.push(interpreter.iterate(value)?);
    }
    let length = columns.iter().map(Vec::len).min().unwrap_or(0);
    let rows = (0..length)
        .map(|row| Value::tuple(columns.iter().map(|column| column[row].clone()).collect()))
        .collect();
    Ok(Value::list(rows))
}

pub fn builtin_map(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("map", 2, usize::MAX, &[])?;
    let function = args.positional[0].clone();
    let mut columns = Vec::new();
    for value in &args.positional[1..] {
        columns.push(interpreter.iterate(value)?);
    }
    let length = columns.iter().map(Vec::len).min().unwrap_or(0);
    let mut results = Vec::with_capacity(length);
    for row in 0..length {
        let arguments = columns.iter().map(|column| column[row].clone()).collect();
        results.push(interpreter.call(&function, arguments, Vec::new())?);
    }
    Ok(Value::list(results))
}

pub fn builtin_filter(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("filter", 2, 2, &[])?;
    let predicate = args.positional[0].clone();
    let mut kept = Vec::new();
    for item in interpreter.iterate(&args.positional[1])? {
        let verdict = if predicate.is_none() {
            item.clone()
        } else {
            interpreter.call(&predicate, vec![item.clone()], Vec::new())?
        };
        if interpreter.is_truthy(&verdict)? {
            kept.push(item);
        }
    }
    Ok(Value::list(kept))
}

pub fn builtin_reversed(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("reversed", 1, 1, &[])?;
    let mut items = interpreter.iterate(&args.positional[0])?;
    items.reverse();
    Ok(Value::list(items))
}

pub fn builtin_min(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    extremum(interpreter, &args, "min", Ordering::Less)
}

pub fn builtin_max(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    extremum(interpreter, &args, "max", Ordering::Greater)
}

fn extremum(interpreter: &mut Interpreter, args: &CallArgs, name: &str, wanted: Ordering) -> Result<Value, InterpreterError> {
    args.expect(name, 1, usize::MAX, &["key", "default"])?;
    let key = args.keyword("key").filter(|key| !key.is_none()).cloned();
    let items = if args.positional.len() == 1 {
        interpreter.iterate(&args.positional[0])?
    } else {
        args.positional.clone()
    };

    let mut best: Option<(Value, Value)> = None;
    for item in items {
        let rank = match &key {
            Some(key) => interpreter.call(key, vec![item.clone()], Vec::new())?,
            None => item.clone(),
        };
        let replace = match &best {
            None => true,
            Some((best_rank, _)) => interpreter.order(&rank, best_rank)? == wanted,
        };
        if replace {
            best = Some((rank, item));
        }
    }

    match (best, args.keyword("default")) {
        (Some((_, item)), _) => Ok(item),
        (None, Some(default)) => Ok(default.clone()),
        (None, None) => Err(InterpreterError::value_error(format!("{}() arg is an empty sequence", name))),
    }
}

pub fn builtin_sum(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("sum", 1, 2, &["start"])?;
    let mut total = args.arg_or_keyword(1, "start").cloned().unwrap_or(Value::Int(0));
    if matches!(total, Value::Str(_)) {
        return Err(InterpreterError::type_error("sum() can't sum strings [use ''.join(seq) instead]"));
    }
    for item in interpreter.iterate(&args.positional[0])? {
        total = interpreter.binary(&total, BinaryOperator::Add, &item)?;
    }
    Ok(total)
}

pub fn builtin_abs(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("abs", 1, 1, &[])?;
    match &args.positional[0] {
        Value::Float(number) => Ok(Value::Float(number.abs())),
        value => match value.as_int() {
            Some(number) => number
                .checked_abs()
                .map(Value::Int)
                .ok_or_else(|| InterpreterError::runtime(ErrorKind::RuntimeError, "integer overflow")),
            None => Err(InterpreterError::type_error(format!(
                "bad operand type for abs(): '{}'",
                value.type_name()
            ))),
        },
    }
}

pub fn builtin_round(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("round", 1, 2, &["ndigits"])?;
    let digits = match args.arg_or_keyword(1, "ndigits") {
        None | Some(Value::None) => None,
        Some(value) => Some(int_arg(value)?),
    };

    match (&args.positional[0], digits) {
        (Value::Float(number), None) => Ok(Value::Int(number.round_ties_even() as i64)),
        (Value::Float(number), Some(digits)) => {
            let scale = 10f64.powi(digits.clamp(-308, 308) as i32);
            Ok(Value::Float((number * scale).round_ties_even() / scale))
        }
        (value, _) => value.as_int().map(Value::Int).ok_or_else(|| {
            InterpreterError::type_error(format!(
                "type {} doesn't define __round__ method",
                value.type_name()
            ))
        }),
    }
}

pub fn builtin_any(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("any", 1, 1, &[])?;
    for item in interpreter.iterate(&args.positional[0])? {
        if interpreter.is_truthy(&item)? {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

pub fn builtin_all(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("all", 1, 1, &[])?;
    for item in interpreter.iterate(&args.positional[0])? {
        if !interpreter.is_truthy(&item)? {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

pub fn builtin_sorted(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("sorted", 1, 1, &["key", "reverse"])?;
    let items = interpreter.iterate(&args.positional[0])?;
    let key = args.keyword("key").cloned();
    let reverse = match args.keyword("reverse") {
        Some(flag) => interpreter.is_truthy(flag)?,
        None => false,
    };
    Ok(Value::list(sort_values(interpreter, items, key.as_ref(), reverse)?))
}

/// Stable sort with an optional key function; comparison errors propagate.
pub(crate) fn sort_values(
    interpreter: &mut Interpreter,
    items: Vec<Value>,
    key: Option<&Value>,
    reverse: bool,
) -> Result<Vec<Value>, InterpreterError> {
    let mut keyed = Vec::with_capacity(items.len());
    for item in items {
        let rank = match key {
            Some(key) if !key.is_none() => interpreter.call(key, vec![item.clone()], Vec::new())?,
            _ => item.clone(),
        };
        keyed.push((rank, item));
    }

    if reverse {
        keyed.reverse();
    }
    let mut sorted = merge_sort(interpreter, keyed)?;
    if reverse {
        sorted.reverse();
    }
    Ok(sorted.into_iter().map(|(_, item)| item).collect())
}

fn merge_sort(interpreter: &mut Interpreter, mut items: Vec<(Value, Value)>) -> Result<Vec<(Value, Value)>, InterpreterError> {
    if items.len() <= 1 {
        return Ok(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(interpreter, items)?;
    let right = merge_sort(interpreter, right)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(a), Some(b)) => interpreter.order(&b.0, &a.0)? == Ordering::Less,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        if take_right {
            merged.extend(right.next());
        } else {
            merged.extend(left.next());
        }
    }
    Ok(merged)
}

pub fn builtin_isinstance(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("isinstance", 2, 2, &[])?;
    Ok(Value::Bool(matches_type(interpreter, &args.positional[0], &args.positional[1])?))
}

fn matches_type(interpreter: &mut Interpreter, value: &Value, info: &Value) -> Result<bool, InterpreterError> {
    match info {
        Value::Class(class) => Ok(match value {
            Value::Instance(instance) => instance.class.is_subclass_of(class),
            _ => class.name == "object" && class.ancestors.is_empty(),
        }),
        Value::Builtin(builtin) => Ok(builtin_type_matches(&builtin.name, value)),
        Value::Tuple(options) => {
            for option in options.iter() {
                if matches_type(interpreter, value, option)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Value::External(_) => Ok(false),
        other => Err(InterpreterError::type_error(format!(
            "isinstance() arg 2 must be a type or tuple of types, not {}",
            other.type_name()
        ))),
    }
}

fn builtin_type_matches(name: &str, value: &Value) -> bool {
    matches!(
        (name, value),
        ("str", Value::Str(_))
            | ("int", Value::Int(_) | Value::Bool(_))
            | ("float", Value::Float(_))
            | ("bool", Value::Bool(_))
            | ("list", Value::List(_))
            | ("set", Value::List(_))
            | ("dict", Value::Dict(_))
            | ("tuple", Value::Tuple(_))
            | ("type", Value::Class(_))
    )
}

pub fn builtin_issubclass(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("issubclass", 2, 2, &[])?;
    let Value::Class(class) = &args.positional[0] else {
        return Err(InterpreterError::type_error("issubclass() arg 1 must be a class"));
    };
    let result = match &args.positional[1] {
        Value::Class(base) => class.is_subclass_of(base),
        Value::Tuple(options) => options.iter().any(|option| match option {
            Value::Class(base) => class.is_subclass_of(base),
            _ => false,
        }),
        _ => false,
    };
    Ok(Value::Bool(result))
}

pub fn builtin_callable(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("callable", 1, 1, &[])?;
    let callable = match &args.positional[0] {
        Value::Function(_) | Value::BoundMethod(_) | Value::Builtin(_) | Value::Class(_) => true,
        Value::Instance(instance) => instance.class.lookup("__call__").is_some(),
        _ => false,
    };
    Ok(Value::Bool(callable))
}

pub fn builtin_getattr(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("getattr", 2, 3, &[])?;
    let name = str_arg(&args.positional[1], "getattr")?;
    match (interpreter.get_attribute(&args.positional[0], name), args.arg(2)) {
        (Ok(value), _) => Ok(value),
        (
            Err(InterpreterError::Runtime {
                kind: ErrorKind::AttributeError,
                ..
            }),
            Some(default),
        ) => Ok(default.clone()),
        (Err(err), _) => Err(err),
    }
}

pub fn builtin_hasattr(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("hasattr", 2, 2, &[])?;
    let name = str_arg(&args.positional[1], "hasattr")?;
    Ok(Value::Bool(interpreter.has_attribute(&args.positional[0], name)?))
}

pub fn builtin_setattr(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("setattr", 3, 3, &[])?;
    let name = str_arg(&args.positional[1], "setattr")?;
    interpreter.set_attribute(&args.positional[0], name, args.positional[2].clone())?;
    Ok(Value::None)
}

pub fn builtin_type(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("type", 1, 1, &[])?;
    Ok(match &args.positional[0] {
        Value::Instance(instance) => Value::Class(Rc::clone(&instance.class)),
        other => {
            let name = other.type_name();
            interpreter
                .builtin(&name)
                .unwrap_or_else(|| Value::External(Rc::from(name.as_str())))
        }
    })
}

fn with_kind(args: &CallArgs, name: &str, kind: FunctionKind) -> Result<Value, InterpreterError> {
    args.expect(name, 1, 1, &[])?;
    match &args.positional[0] {
        Value::Function(function) => Ok(Value::Function(Rc::new(Function {
            kind,
            ..(**function).clone()
        }))),
        other => Err(InterpreterError::type_error(format!(
            "{}() expects a function, not '{}'",
            name,
            other.type_name()
        ))),
    }
}

pub fn builtin_staticmethod(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    with_kind(&args, "staticmethod", FunctionKind::Static)
}

pub fn builtin_classmethod(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    with_kind(&args, "classmethod", FunctionKind::ClassMethod)
}

pub fn builtin_property(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    with_kind(&args, "property", FunctionKind::Property)
}

/// Two-argument `super(Class, obj)`. The zero-argument form is resolved by
/// the interpreter from the calling method.
pub fn builtin_super(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("super", 0, 2, &[])?;
    match (args.arg(0), args.arg(1)) {
        (Some(Value::Class(class)), Some(receiver)) => Ok(Value::Super(Rc::new(SuperProxy {
            class: Rc::clone(class),
            receiver: receiver.clone(),
        }))),
        (None, _) => Err(InterpreterError::runtime(ErrorKind::RuntimeError, "super(): no arguments")),
        _ => Err(InterpreterError::type_error("super() argument 1 must be a type")),
    }
}
