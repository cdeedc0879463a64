//! Modules importable by submitted code.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use super::prelude;
use crate::interpreter::{CallArgs, Environment, ErrorKind, Interpreter, InterpreterError, Module, Value};

/// Names `typing` exports as markers. Subscripting or inspecting them
/// works; calling them does not.
const TYPING_NAMES: &[&str] = &[
    "Any", "Optional", "Union", "List", "Dict", "Tuple", "Set", "FrozenSet", "Sequence", "Mapping",
    "Iterable", "Iterator", "Callable", "Type", "Literal", "Generic", "Protocol", "Annotated",
    "ClassVar", "Final", "overload", "final",
];

/// Builds module `name`, or `None` when this runtime does not provide it.
pub fn load(interpreter: &mut Interpreter, name: &str) -> Result<Option<Value>, InterpreterError> {
    match name {
        "langflow" => load_prelude(interpreter).map(Some),
        _ if name.starts_with("langflow.") => interpreter.import_module("langflow").map(Some),
        "typing" | "typing_extensions" => Ok(Some(typing_module(name))),
        "re" => Ok(Some(super::re::module())),
        "json" => Ok(Some(json_module())),
        _ => Ok(None),
    }
}

fn new_module(name: &str, attributes: IndexMap<String, Value>) -> Value {
    Value::Module(Rc::new(Module {
        name: name.to_string(),
        attributes: RefCell::new(attributes),
    }))
}

fn load_prelude(interpreter: &mut Interpreter) -> Result<Value, InterpreterError> {
    let program = prelude::program().map_err(|err| {
        InterpreterError::runtime(ErrorKind::RuntimeError, format!("langflow prelude is invalid: {}", err))
    })?;

    let scope = Environment::new_module();
    scope.define("__name__", Value::str("langflow"));
    interpreter.register_module_scope(scope.clone());
    interpreter.execute_module(&program.statements, &scope)?;

    let attributes: IndexMap<String, Value> = scope
        .variables()
        .into_iter()
        .filter(|(name, _)| !name.starts_with("__"))
        .collect();
    debug!(names = attributes.len(), "loaded langflow prelude");
    Ok(new_module("langflow", attributes))
}

fn typing_module(name: &str) -> Value {
    let mut attributes: IndexMap<String, Value> = TYPING_NAMES
        .iter()
        .map(|marker| (marker.to_string(), Value::External(Rc::from(format!("{}.{}", name, marker)))))
        .collect();
    attributes.insert("TYPE_CHECKING".to_string(), Value::Bool(false));
    attributes.insert("cast".to_string(), Value::builtin("cast", typing_cast));
    attributes.insert("TypeVar".to_string(), Value::builtin("TypeVar", typing_type_var));
    new_module(name, attributes)
}

fn typing_cast(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("cast", 2, 2, &[])?;
    Ok(args.positional[1].clone())
}

fn typing_type_var(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    let Some(Value::Str(name)) = args.arg(0) else {
        return Err(InterpreterError::type_error("TypeVar() requires a name"));
    };
    Ok(Value::External(Rc::from(format!("typing.{}", name))))
}

fn json_module() -> Value {
    let mut attributes = IndexMap::new();
    attributes.insert("dumps".to_string(), Value::builtin("dumps", json_dumps));
    attributes.insert("loads".to_string(), Value::builtin("loads", json_loads));
    new_module("json", attributes)
}

/// Writes `", "` and `": "` between items like the default `json.dumps`.
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + std::io::Write>(&mut self, writer: &mut W, first: bool) -> std::io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + std::io::Write>(&mut self, writer: &mut W, first: bool) -> std::io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + std::io::Write>(&mut self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(b": ")
    }
}

fn json_dumps(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("dumps", 1, 1, &["indent", "sort_keys", "default", "ensure_ascii"])?;
    let json = args.positional[0].to_json();
    let indent = match args.keyword("indent") {
        None | Some(Value::None) => None,
        Some(value) => Some(value.as_int().unwrap_or(0).max(0) as usize),
    };

    let mut buffer = Vec::new();
    let written = match indent {
        Some(width) => {
            let indent = " ".repeat(width);
            let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
            let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
            json.serialize(&mut serializer)
        }
        None => {
            let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, SpacedFormatter);
            json.serialize(&mut serializer)
        }
    };
    written.map_err(|err| InterpreterError::type_error(err.to_string()))?;
    String::from_utf8(buffer)
        .map(Value::Str)
        .map_err(|err| InterpreterError::value_error(err.to_string()))
}

fn json_loads(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("loads", 1, 1, &[])?;
    let Value::Str(text) = &args.positional[0] else {
        return Err(InterpreterError::type_error(format!(
            "the JSON object must be str, not {}",
            args.positional[0].type_name()
        )));
    };
    let parsed: serde_json::Value =
        serde_json::from_str(text).map_err(|err| InterpreterError::value_error(err.to_string()))?;
    Ok(Value::from_json(&parsed))
}
