//! Native methods of `list` and `dict`.

use std::cell::RefCell;
use std::rc::Rc;

use super::functions::{int_arg, merge_into, sort_values};
use crate::interpreter::{BuiltinFn, CallArgs, Dict, ErrorKind, Interpreter, InterpreterError, Value};

pub fn list_method(name: &str) -> Option<BuiltinFn> {
    let method: BuiltinFn = match name {
        "append" => list_append,
        "extend" => list_extend,
        "pop" => list_pop,
        "insert" => list_insert,
        "index" => list_index,
        "count" => list_count,
        "remove" => list_remove,
        "sort" => list_sort,
        "reverse" => list_reverse,
        "clear" => list_clear,
        "copy" => list_copy,
        _ => return None,
    };
    Some(method)
}

pub fn dict_method(name: &str) -> Option<BuiltinFn> {
    let method: BuiltinFn = match name {
        "get" => dict_get,
        "keys" => dict_keys,
        "values" => dict_values,
        "items" => dict_items,
        "update" => dict_update,
        "pop" => dict_pop,
        "setdefault" => dict_setdefault,
        "copy" => dict_copy,
        "clear" => dict_clear,
        _ => return None,
    };
    Some(method)
}

fn list_receiver(args: &CallArgs, name: &str) -> Result<Rc<RefCell<Vec<Value>>>, InterpreterError> {
    match args.receiver(name)? {
        Value::List(items) => Ok(Rc::clone(items)),
        other => Err(InterpreterError::type_error(format!(
            "descriptor '{}' requires a 'list' object but received a '{}'",
            name,
            other.type_name()
        ))),
    }
}

fn dict_receiver(args: &CallArgs, name: &str) -> Result<Rc<RefCell<Dict>>, InterpreterError> {
    match args.receiver(name)? {
        Value::Dict(dict) => Ok(Rc::clone(dict)),
        other => Err(InterpreterError::type_error(format!(
            "descriptor '{}' requires a 'dict' object but received a '{}'",
            name,
            other.type_name()
        ))),
    }
}

fn list_append(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("append", 1, 1, &[])?;
    let items = list_receiver(&args, "append")?;
    items.borrow_mut().push(args.positional[0].clone());
    Ok(Value::None)
}

fn list_extend(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("extend", 1, 1, &[])?;
    let items = list_receiver(&args, "extend")?;
    let extra = interpreter.iterate(&args.positional[0])?;
    items.borrow_mut().extend(extra);
    Ok(Value::None)
}

fn list_pop(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("pop", 0, 1, &[])?;
    let items = list_receiver(&args, "pop")?;
    let mut items = items.borrow_mut();
    if items.is_empty() {
        return Err(InterpreterError::index_error("pop from empty list"));
    }
    let len = items.len() as i64;
    let index = match args.arg(0) {
        Some(index) => int_arg(index)?,
        None => -1,
    };
    let position = if index < 0 { index + len } else { index };
    if position < 0 || position >= len {
        return Err(InterpreterError::index_error("pop index out of range"));
    }
    Ok(items.remove(position as usize))
}

fn list_insert(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("insert", 2, 2, &[])?;
    let items = list_receiver(&args, "insert")?;
    let mut items = items.borrow_mut();
    let len = items.len() as i64;
    let index = int_arg(&args.positional[0])?;
    let position = if index < 0 { (index + len).max(0) } else { index.min(len) };
    items.insert(position as usize, args.positional[1].clone());
    Ok(Value::None)
}

/// Position of the first item equal to `needle`. The list is snapshotted
/// first: a user `__eq__` may mutate it.
fn position_of(interpreter: &mut Interpreter, items: &Rc<RefCell<Vec<Value>>>, needle: &Value) -> Result<Option<usize>, InterpreterError> {
    let snapshot = items.borrow().clone();
    for (index, item) in snapshot.iter().enumerate() {
        if interpreter.values_equal(item, needle)? {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

fn list_index(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("index", 1, 1, &[])?;
    let items = list_receiver(&args, "index")?;
    match position_of(interpreter, &items, &args.positional[0])? {
        Some(index) => Ok(Value::Int(index as i64)),
        None => {
            let shown = interpreter.repr(&args.positional[0])?;
            Err(InterpreterError::value_error(format!("{} is not in list", shown)))
        }
    }
}

fn list_count(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("count", 1, 1, &[])?;
    let snapshot = list_receiver(&args, "count")?.borrow().clone();
    let mut count = 0;
    for item in &snapshot {
        if interpreter.values_equal(item, &args.positional[0])? {
            count += 1;
        }
    }
    Ok(Value::Int(count))
}

fn list_remove(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("remove", 1, 1, &[])?;
    let items = list_receiver(&args, "remove")?;
    match position_of(interpreter, &items, &args.positional[0])? {
        Some(index) => {
            items.borrow_mut().remove(index);
            Ok(Value::None)
        }
        None => Err(InterpreterError::value_error("list.remove(x): x not in list")),
    }
}

fn list_sort(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("sort", 0, 0, &["key", "reverse"])?;
    let items = list_receiver(&args, "sort")?;
    let reverse = match args.keyword("reverse") {
        Some(flag) => interpreter.is_truthy(flag)?,
        None => false,
    };
    let snapshot = items.borrow().clone();
    let sorted = sort_values(interpreter, snapshot, args.keyword("key"), reverse)?;
    *items.borrow_mut() = sorted;
    Ok(Value::None)
}

fn list_reverse(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("reverse", 0, 0, &[])?;
    list_receiver(&args, "reverse")?.borrow_mut().reverse();
    Ok(Value::None)
}

fn list_clear(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("clear", 0, 0, &[])?;
    list_receiver(&args, "clear")?.borrow_mut().clear();
    Ok(Value::None)
}

fn list_copy(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("copy", 0, 0, &[])?;
    let items = list_receiver(&args, "copy")?.borrow().clone();
    Ok(Value::list(items))
}

fn checked_key(key: &Value) -> Result<(), InterpreterError> {
    if key.is_hashable() {
        Ok(())
    } else {
        Err(InterpreterError::type_error(format!("unhashable type: '{}'", key.type_name())))
    }
}

fn dict_get(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("get", 1, 2, &[])?;
    let dict = dict_receiver(&args, "get")?;
    checked_key(&args.positional[0])?;
    let found = dict.borrow().get(&args.positional[0]).cloned();
    Ok(found.unwrap_or_else(|| args.arg(1).cloned().unwrap_or(Value::None)))
}

fn dict_keys(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("keys", 0, 0, &[])?;
    let keys = dict_receiver(&args, "keys")?.borrow().keys();
    Ok(Value::list(keys))
}

fn dict_values(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("values", 0, 0, &[])?;
    let values = dict_receiver(&args, "values")?.borrow().values();
    Ok(Value::list(values))
}

fn dict_items(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("items", 0, 0, &[])?;
    let dict = dict_receiver(&args, "items")?;
    let items = dict
        .borrow()
        .entries()
        .iter()
        .map(|(key, value)| Value::tuple(vec![key.clone(), value.clone()]))
        .collect();
    Ok(Value::list(items))
}

fn dict_update(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    if args.positional.len() > 1 {
        return Err(InterpreterError::type_error(format!(
            "update expected at most 1 argument, got {}",
            args.positional.len()
        )));
    }
    let dict = dict_receiver(&args, "update")?;
    let mut updated = dict.borrow().clone();
    if let Some(source) = args.arg(0) {
        merge_into(interpreter, &mut updated, source)?;
    }
    for (key, value) in &args.keywords {
        updated.insert(Value::str(key.clone()), value.clone());
    }
    *dict.borrow_mut() = updated;
    Ok(Value::None)
}

fn dict_pop(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("pop", 1, 2, &[])?;
    let dict = dict_receiver(&args, "pop")?;
    checked_key(&args.positional[0])?;
    let removed = dict.borrow_mut().remove(&args.positional[0]);
    match (removed, args.arg(1)) {
        (Some(value), _) => Ok(value),
        (None, Some(default)) => Ok(default.clone()),
        (None, None) => Err(InterpreterError::runtime(ErrorKind::KeyError, interpreter.repr(&args.positional[0])?)),
    }
}

fn dict_setdefault(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("setdefault", 1, 2, &[])?;
    let dict = dict_receiver(&args, "setdefault")?;
    let key = &args.positional[0];
    checked_key(key)?;
    let existing = dict.borrow().get(key).cloned();
    if let Some(value) = existing {
        return Ok(value);
    }
    let default = args.arg(1).cloned().unwrap_or(Value::None);
    dict.borrow_mut().insert(key.clone(), default.clone());
    Ok(default)
}

fn dict_copy(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("copy", 0, 0, &[])?;
    let copy = dict_receiver(&args, "copy")?.borrow().clone();
    Ok(Value::dict(copy))
}

fn dict_clear(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("clear", 0, 0, &[])?;
    dict_receiver(&args, "clear")?.borrow_mut().clear();
    Ok(Value::None)
}
