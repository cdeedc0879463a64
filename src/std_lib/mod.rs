//! Built-in functions, methods and modules available to submitted code.

pub mod collections;
pub mod functions;
pub mod modules;
pub mod prelude;
pub mod re;
pub mod string;

#[cfg(test)]
mod tests;

use indexmap::IndexMap;

use crate::interpreter::{BuiltinFn, Value};
use self::functions::*;

/// Global built-in namespace of a fresh interpreter.
pub fn builtins() -> IndexMap<String, Value> {
    let table: &[(&str, BuiltinFn)] = &[
        ("print", builtin_print),
        ("len", builtin_len),
        ("str", builtin_str),
        ("int", builtin_int),
        ("float", builtin_float),
        ("bool", builtin_bool),
        ("list", builtin_list),
        ("dict", builtin_dict),
        ("tuple", builtin_tuple),
        ("set", builtin_set),
        ("range", builtin_range),
        ("enumerate", builtin_enumerate),
        ("zip", builtin_zip),
        ("map", builtin_map),
        ("filter", builtin_filter),
        ("reversed", builtin_reversed),
        ("min", builtin_min),
        ("max", builtin_max),
        ("sum", builtin_sum),
        ("abs", builtin_abs),
        ("round", builtin_round),
        ("any", builtin_any),
        ("all", builtin_all),
        ("sorted", builtin_sorted),
        ("isinstance", builtin_isinstance),
        ("issubclass", builtin_issubclass),
        ("callable", builtin_callable),
        ("getattr", builtin_getattr),
        ("hasattr", builtin_hasattr),
        ("setattr", builtin_setattr),
        ("repr", builtin_repr),
        ("type", builtin_type),
        ("staticmethod", builtin_staticmethod),
        ("classmethod", builtin_classmethod),
        ("property", builtin_property),
        ("super", builtin_super),
    ];

    table
        .iter()
        .map(|(name, function)| (name.to_string(), Value::builtin(name, *function)))
        .collect()
}

/// Native method `name` of a built-in value type, if it has one.
pub fn method_for(value: &Value, name: &str) -> Option<BuiltinFn> {
    match value {
        Value::Str(_) => string::method(name),
        Value::List(_) => collections::list_method(name),
        Value::Dict(_) => collections::dict_method(name),
        _ => None,
    }
}
