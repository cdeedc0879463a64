use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::environment::Environment;
use super::error::InterpreterError;
use super::Interpreter;
use crate::ast::{ParameterKind, Statement};

/// Signature shared by every native function and native method.
pub type BuiltinFn = fn(&mut Interpreter, CallArgs) -> Result<Value, InterpreterError>;

#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Rc<RefCell<Vec<Value>>>),
    Tuple(Rc<Vec<Value>>),
    Dict(Rc<RefCell<Dict>>),
    Function(Rc<Function>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
    BoundMethod(Rc<BoundMethod>),
    Builtin(Rc<Builtin>),
    Module(Rc<Module>),
    Super(Rc<SuperProxy>),
    /// Stand-in for something imported from a module this runtime does not
    /// provide. Holds the dotted path it was reached through.
    External(Rc<str>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Plain,
    Static,
    ClassMethod,
    Property,
}

#[derive(Clone)]
pub struct Param {
    pub name: String,
    pub kind: ParameterKind,
    /// Evaluated once, when the `def` runs.
    pub default: Option<Value>,
}

#[derive(Clone)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Rc<Vec<Statement>>,
    pub closure: Environment,
    pub kind: FunctionKind,
    /// Class whose body defined this function; enables zero-argument `super()`.
    pub owner: RefCell<Weak<Class>>,
}

pub struct Class {
    pub name: String,
    pub bases: Vec<Rc<Class>>,
    /// Ancestors in lookup order, excluding the class itself.
    pub ancestors: Vec<Rc<Class>>,
    pub attributes: RefCell<IndexMap<String, Value>>,
}

pub struct Instance {
    pub class: Rc<Class>,
    pub attributes: RefCell<IndexMap<String, Value>>,
}

pub struct BoundMethod {
    pub receiver: Value,
    pub function: Rc<Function>,
}

pub struct Builtin {
    pub name: String,
    pub receiver: Option<Value>,
    pub function: BuiltinFn,
}

pub struct Module {
    pub name: String,
    pub attributes: RefCell<IndexMap<String, Value>>,
}

pub struct SuperProxy {
    /// Lookup starts after this class in the receiver's class order.
    pub class: Rc<Class>,
    pub receiver: Value,
}

/// Insertion-ordered mapping with structural key equality.
#[derive(Clone, Default)]
pub struct Dict {
    entries: Vec<(Value, Value)>,
}

/// Arguments handed to a [`BuiltinFn`].
pub struct CallArgs {
    pub receiver: Option<Value>,
    pub positional: Vec<Value>,
    pub keywords: Vec<(String, Value)>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k.equals(key)).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    pub fn insert(&mut self, key: Value, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| k.equals(&key)) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k.equals(key))?;
        Some(self.entries.remove(index).1)
    }

    pub fn keys(&self) -> Vec<Value> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries.iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl CallArgs {
    pub fn new(positional: Vec<Value>) -> Self {
        CallArgs {
            receiver: None,
            positional,
            keywords: Vec::new(),
        }
    }

    pub fn receiver(&self, name: &str) -> Result<&Value, InterpreterError> {
        self.receiver
            .as_ref()
            .ok_or_else(|| InterpreterError::type_error(format!("descriptor '{}' needs a receiver", name)))
    }

    /// Checks the positional count and rejects keywords the builtin does not accept.
    pub fn expect(&self, name: &str, min: usize, max: usize, keywords: &[&str]) -> Result<(), InterpreterError> {
        let count = self.positional.len();
        if count < min || count > max {
            let expected = if min == max {
                format!("exactly {}", min)
            } else if count < min {
                format!("at least {}", min)
            } else {
                format!("at most {}", max)
            };
            let noun = if min == max && min == 1 { "argument" } else { "arguments" };
            return Err(InterpreterError::type_error(format!(
                "{}() takes {} {} ({} given)",
                name, expected, noun, count
            )));
        }
        if let Some((unexpected, _)) = self.keywords.iter().find(|(key, _)| !keywords.contains(&key.as_str())) {
            return Err(InterpreterError::type_error(format!(
                "{}() got an unexpected keyword argument '{}'",
                name, unexpected
            )));
        }
        Ok(())
    }

    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords.iter().find(|(key, _)| key == name).map(|(_, value)| value)
    }

    /// Positional argument `index`, or the keyword of the same meaning.
    pub fn arg_or_keyword(&self, index: usize, name: &str) -> Option<&Value> {
        self.arg(index).or_else(|| self.keyword(name))
    }
}

impl Class {
    /// The class followed by its ancestors.
    pub fn linearization(self: &Rc<Self>) -> Vec<Rc<Class>> {
        let mut order = vec![Rc::clone(self)];
        order.extend(self.ancestors.iter().cloned());
        order
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.attributes.borrow().get(name) {
            return Some(value.clone());
        }
        self.ancestors
            .iter()
            .find_map(|ancestor| ancestor.attributes.borrow().get(name).cloned())
    }

    /// True when `self` is `other` or inherits from it.
    pub fn is_subclass_of(self: &Rc<Self>, other: &Rc<Class>) -> bool {
        Rc::ptr_eq(self, other) || self.ancestors.iter().any(|ancestor| Rc::ptr_eq(ancestor, other))
    }

    pub fn inherits_named(self: &Rc<Self>, name: &str) -> bool {
        self.name == name || self.ancestors.iter().any(|ancestor| ancestor.name == name)
    }
}

/// C3 linearization of `bases`, the order attribute lookup walks.
pub fn linearize(name: &str, bases: &[Rc<Class>]) -> Result<Vec<Rc<Class>>, InterpreterError> {
    let mut sequences: Vec<Vec<Rc<Class>>> = bases.iter().map(|base| base.linearization()).collect();
    sequences.push(bases.to_vec());

    let mut result: Vec<Rc<Class>> = Vec::new();
    loop {
        sequences.retain(|sequence| !sequence.is_empty());
        if sequences.is_empty() {
            return Ok(result);
        }

        let candidate = sequences.iter().find_map(|sequence| {
            let head = &sequence[0];
            let in_tail = sequences
                .iter()
                .any(|other| other.iter().skip(1).any(|class| Rc::ptr_eq(class, head)));
            if in_tail {
                None
            } else {
                Some(Rc::clone(head))
            }
        });

        let Some(next) = candidate else {
            return Err(InterpreterError::type_error(format!(
                "Cannot create a consistent method resolution order (MRO) for class {}",
                name
            )));
        };

        for sequence in sequences.iter_mut() {
            if Rc::ptr_eq(&sequence[0], &next) {
                sequence.remove(0);
            }
        }
        result.push(next);
    }
}

impl Value {
    pub fn str(text: impl Into<String>) -> Self {
        Value::Str(text.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(Rc::new(items))
    }

    pub fn dict(dict: Dict) -> Self {
        Value::Dict(Rc::new(RefCell::new(dict)))
    }

    pub fn builtin(name: &str, function: BuiltinFn) -> Self {
        Value::Builtin(Rc::new(Builtin {
            name: name.to_string(),
            receiver: None,
            function,
        }))
    }

    pub fn type_name(&self) -> String {
        match self {
            Value::None => "NoneType".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "str".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Tuple(_) => "tuple".to_string(),
            Value::Dict(_) => "dict".to_string(),
            Value::Function(_) => "function".to_string(),
            Value::Class(_) => "type".to_string(),
            Value::Instance(instance) => instance.class.name.clone(),
            Value::BoundMethod(_) => "method".to_string(),
            Value::Builtin(_) => "builtin_function_or_method".to_string(),
            Value::Module(_) => "module".to_string(),
            Value::Super(_) => "super".to_string(),
            Value::External(_) => "external".to_string(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Truthiness for values that cannot define their own `__bool__`.
    pub fn is_truthy_basic(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(flag) => *flag,
            Value::Int(value) => *value != 0,
            Value::Float(value) => *value != 0.0,
            Value::Str(text) => !text.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::Dict(dict) => !dict.borrow().is_empty(),
            _ => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Bool(flag) => Some(i64::from(*flag)),
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_hashable(&self) -> bool {
        match self {
            Value::List(_) | Value::Dict(_) => false,
            Value::Tuple(items) => items.iter().all(Value::is_hashable),
            _ => true,
        }
    }

    /// Structural equality without user-defined `__eq__`. Numbers compare
    /// across int, float and bool; reference types compare by identity.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                Rc::ptr_eq(a, b) || sequences_equal(&a.borrow(), &b.borrow())
            }
            (Value::Tuple(a), Value::Tuple(b)) => sequences_equal(a, b),
            (Value::Dict(a), Value::Dict(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.entries()
                        .iter()
                        .all(|(key, value)| b.get(key).map(|other| value.equals(other)).unwrap_or(false))
            }
            (Value::External(a), Value::External(b)) => a == b,
            (a, b) => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => x == y,
                _ => a.is_same(b),
            },
        }
    }

    /// Identity, as `is` sees it.
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Tuple(a), Value::Tuple(b)) => Rc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => Rc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            (Value::BoundMethod(a), Value::BoundMethod(b)) => {
                Rc::ptr_eq(&a.function, &b.function) && a.receiver.is_same(&b.receiver)
            }
            _ => false,
        }
    }

    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(flag) => Value::Bool(*flag),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => Value::Int(value),
                None => Value::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(text) => Value::Str(text.clone()),
            serde_json::Value::Array(items) => Value::list(items.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(object) => {
                let mut dict = Dict::new();
                for (key, value) in object {
                    dict.insert(Value::Str(key.clone()), Value::from_json(value));
                }
                Value::dict(dict)
            }
        }
    }

    /// JSON view of a value. Instances become objects of their attributes;
    /// callables and classes become their names.
    pub fn to_json(&self) -> serde_json::Value {
        self.to_json_bounded(0)
    }

    fn to_json_bounded(&self, depth: usize) -> serde_json::Value {
        use serde_json::Value as Json;

        if depth > MAX_JSON_DEPTH {
            return Json::Null;
        }
        match self {
            Value::None => Json::Null,
            Value::Bool(flag) => Json::Bool(*flag),
            Value::Int(value) => Json::from(*value),
            Value::Float(value) => serde_json::Number::from_f64(*value).map(Json::Number).unwrap_or(Json::Null),
            Value::Str(text) => Json::String(text.clone()),
            Value::List(items) => Json::Array(items.borrow().iter().map(|item| item.to_json_bounded(depth + 1)).collect()),
            Value::Tuple(items) => Json::Array(items.iter().map(|item| item.to_json_bounded(depth + 1)).collect()),
            Value::Dict(dict) => {
                let mut object = serde_json::Map::new();
                for (key, value) in dict.borrow().entries() {
                    object.insert(key.key_text(), value.to_json_bounded(depth + 1));
                }
                Json::Object(object)
            }
            Value::Instance(instance) => {
                let mut object = serde_json::Map::new();
                for (key, value) in instance.attributes.borrow().iter() {
                    object.insert(key.clone(), value.to_json_bounded(depth + 1));
                }
                Json::Object(object)
            }
            Value::Function(function) => Json::String(function.name.clone()),
            Value::Class(class) => Json::String(class.name.clone()),
            Value::BoundMethod(method) => Json::String(method.function.name.clone()),
            Value::Builtin(builtin) => Json::String(builtin.name.clone()),
            Value::Module(module) => Json::String(module.name.clone()),
            Value::Super(proxy) => Json::String(proxy.class.name.clone()),
            Value::External(path) => Json::String(path.to_string()),
        }
    }

    /// Text used when a dict key becomes a JSON object key.
    fn key_text(&self) -> String {
        match self {
            Value::Str(text) => text.clone(),
            Value::None => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(value) => value.to_string(),
            Value::Float(value) => crate::ast::format_float(*value),
            other => other.type_name(),
        }
    }
}

const MAX_JSON_DEPTH: usize = 64;

fn sequences_equal(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(y))
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(flag) => write!(f, "{}", if *flag { "True" } else { "False" }),
            Value::Int(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", crate::ast::format_float(*value)),
            Value::Str(text) => write!(f, "{}", crate::ast::quote_string(text)),
            Value::List(items) => f.debug_list().entries(items.borrow().iter()).finish(),
            Value::Tuple(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Dict(dict) => f
                .debug_map()
                .entries(dict.borrow().entries().iter().map(|(k, v)| (k, v)))
                .finish(),
            Value::Function(function) => write!(f, "<function {}>", function.name),
            Value::Class(class) => write!(f, "<class '{}'>", class.name),
            Value::Instance(instance) => write!(f, "<{} object>", instance.class.name),
            Value::BoundMethod(method) => write!(f, "<bound method {}>", method.function.name),
            Value::Builtin(builtin) => write!(f, "<built-in function {}>", builtin.name),
            Value::Module(module) => write!(f, "<module '{}'>", module.name),
            Value::Super(proxy) => write!(f, "<super: <class '{}'>>", proxy.class.name),
            Value::External(path) => write!(f, "<external '{}'>", path),
        }
    }
}
