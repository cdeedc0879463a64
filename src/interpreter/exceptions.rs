use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use super::value::{linearize, CallArgs, Class, Instance, Value};
use super::{Interpreter, InterpreterError};

/// Built-in exception hierarchy, parents before children.
const HIERARCHY: &[(&str, Option<&str>)] = &[
    ("BaseException", None),
    ("Exception", Some("BaseException")),
    ("ArithmeticError", Some("Exception")),
    ("ZeroDivisionError", Some("ArithmeticError")),
    ("LookupError", Some("Exception")),
    ("KeyError", Some("LookupError")),
    ("IndexError", Some("LookupError")),
    ("ValueError", Some("Exception")),
    ("TypeError", Some("Exception")),
    ("AttributeError", Some("Exception")),
    ("NameError", Some("Exception")),
    ("RuntimeError", Some("Exception")),
    ("NotImplementedError", Some("RuntimeError")),
    ("RecursionError", Some("RuntimeError")),
    ("AssertionError", Some("Exception")),
    ("ImportError", Some("Exception")),
    ("StopIteration", Some("Exception")),
];

pub(super) fn install(interpreter: &mut Interpreter) {
    let object = new_class("object", Vec::new(), Vec::new());
    interpreter.define_builtin("object", Value::Class(Rc::clone(&object)));

    for (name, parent) in HIERARCHY {
        let bases = match parent {
            Some(parent) => interpreter.exception_classes.get(*parent).cloned().into_iter().collect(),
            None => vec![Rc::clone(&object)],
        };
        let ancestors = linearize(name, &bases).unwrap_or_default();
        let class = new_class(name, bases, ancestors);
        if parent.is_none() {
            let mut attributes = class.attributes.borrow_mut();
            attributes.insert("__init__".to_string(), Value::builtin("__init__", exception_init));
            attributes.insert("__str__".to_string(), Value::builtin("__str__", exception_str));
        }
        interpreter.define_builtin(name, Value::Class(Rc::clone(&class)));
        interpreter.exception_classes.insert(name.to_string(), class);
    }
}

fn new_class(name: &str, bases: Vec<Rc<Class>>, ancestors: Vec<Rc<Class>>) -> Rc<Class> {
    Rc::new(Class {
        name: name.to_string(),
        bases,
        ancestors,
        attributes: RefCell::new(IndexMap::new()),
    })
}

fn exception_init(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    if let Value::Instance(instance) = args.receiver("__init__")? {
        instance
            .attributes
            .borrow_mut()
            .insert("args".to_string(), Value::tuple(args.positional.clone()));
    }
    Ok(Value::None)
}

fn exception_str(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    let receiver = args.receiver("__str__")?.clone();
    let exception_args = match &receiver {
        Value::Instance(instance) => instance.attributes.borrow().get("args").cloned(),
        _ => None,
    };
    let text = match exception_args {
        Some(Value::Tuple(items)) if items.is_empty() => String::new(),
        Some(Value::Tuple(items)) if items.len() == 1 => interpreter.stringify(&items[0])?,
        Some(other) => interpreter.repr(&other)?,
        None => String::new(),
    };
    Ok(Value::Str(text))
}

impl Interpreter {
    /// Class an error is caught as.
    pub(super) fn class_of_error(&self, err: &InterpreterError) -> Rc<Class> {
        let class = match err {
            InterpreterError::Raised {
                exception: Value::Instance(instance),
                ..
            } => Some(Rc::clone(&instance.class)),
            other => self.exception_classes.get(other.exception_name()).cloned(),
        };
        class.unwrap_or_else(|| self.base_exception())
    }

    fn base_exception(&self) -> Rc<Class> {
        match self.exception_classes.get("Exception") {
            Some(class) => Rc::clone(class),
            None => new_class("Exception", Vec::new(), Vec::new()),
        }
    }

    /// Exception object for an error, as bound by `except ... as name`.
    pub(super) fn exception_value(&mut self, err: &InterpreterError) -> Result<Value, InterpreterError> {
        match err {
            InterpreterError::Raised { exception, .. } => Ok(exception.clone()),
            other => {
                let class = self.class_of_error(other);
                self.instantiate(&class, vec![Value::str(other.to_string())], Vec::new())
            }
        }
    }

    /// Turns the operand of `raise` into the error that propagates.
    pub(super) fn raise_value(&mut self, value: Value) -> Result<InterpreterError, InterpreterError> {
        let exception = match value {
            Value::Class(class) if class.inherits_named("BaseException") => self.instantiate(&class, Vec::new(), Vec::new())?,
            instance @ Value::Instance(_) => instance,
            other => {
                return Err(InterpreterError::type_error(format!(
                    "exceptions must derive from BaseException, not {}",
                    other.type_name()
                )))
            }
        };

        let Value::Instance(instance) = &exception else {
            return Err(InterpreterError::type_error("exceptions must derive from BaseException"));
        };
        if !instance.class.inherits_named("BaseException") {
            return Err(InterpreterError::type_error("exceptions must derive from BaseException"));
        }

        let class_name = instance.class.name.clone();
        let message = self.stringify(&exception)?;
        Ok(InterpreterError::Raised {
            exception,
            class_name,
            message,
        })
    }

    pub(super) fn new_instance(class: &Rc<Class>) -> Rc<Instance> {
        Rc::new(Instance {
            class: Rc::clone(class),
            attributes: RefCell::new(IndexMap::new()),
        })
    }
}
