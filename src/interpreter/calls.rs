use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::debug;

use super::environment::{Environment, ScopeKind};
use super::value::{linearize, BoundMethod, Builtin, CallArgs, Class, Dict, Function, FunctionKind, Param, SuperProxy, Value};
use super::{ErrorKind, Interpreter, InterpreterError, MAX_CALL_DEPTH};
use crate::ast::{ClassDef, Expr, FunctionDef, ParameterKind};
use crate::std_lib;

impl Interpreter {
    pub(super) fn define_function(&mut self, def: &FunctionDef, env: &Environment) -> Result<Value, InterpreterError> {
        let mut params = Vec::with_capacity(def.parameters.len());
        for parameter in &def.parameters {
            let default = match &parameter.default {
                Some(expr) => Some(self.evaluate(expr, env)?),
                None => None,
            };
            params.push(Param {
                name: parameter.name.clone(),
                kind: parameter.kind,
                default,
            });
        }

        let function = Value::Function(Rc::new(Function {
            name: def.name.clone(),
            params,
            body: Rc::new(def.body.clone()),
            closure: env.closure_scope(),
            kind: FunctionKind::Plain,
            owner: RefCell::new(Weak::new()),
        }));
        self.apply_decorators(function, &def.decorators, env)
    }

    pub(super) fn define_class(&mut self, def: &ClassDef, env: &Environment) -> Result<Value, InterpreterError> {
        let mut bases = Vec::new();
        for base in &def.bases {
            match self.evaluate(base, env)? {
                Value::Class(class) => bases.push(class),
                Value::External(path) => {
                    debug!(class = %def.name, base = %path, "ignoring unavailable base class");
                }
                other => {
                    return Err(InterpreterError::type_error(format!(
                        "bases must be classes, not '{}'",
                        other.type_name()
                    )))
                }
            }
        }
        if bases.is_empty() {
            if let Some(Value::Class(object)) = self.builtin("object") {
                bases.push(object);
            }
        }
        let ancestors = linearize(&def.name, &bases)?;

        let body = env.child(ScopeKind::Class);
        self.execute_block(&def.body, &body)?;
        let attributes: IndexMap<String, Value> = body.variables().into_iter().collect();

        let class = Rc::new(Class {
            name: def.name.clone(),
            bases,
            ancestors,
            attributes: RefCell::new(attributes),
        });
        for member in class.attributes.borrow().values() {
            if let Value::Function(function) = member {
                *function.owner.borrow_mut() = Rc::downgrade(&class);
            }
        }

        self.apply_decorators(Value::Class(class), &def.decorators, env)
    }

    fn apply_decorators(&mut self, mut value: Value, decorators: &[Expr], env: &Environment) -> Result<Value, InterpreterError> {
        for decorator in decorators.iter().rev() {
            let decorator = self.evaluate(decorator, env)?;
            if let Value::External(path) = &decorator {
                debug!(decorator = %path, "skipping unavailable decorator");
                continue;
            }
            value = self.call(&decorator, vec![value], Vec::new())?;
        }
        Ok(value)
    }

    /// Calls any callable value with positional and keyword arguments.
    pub fn call(&mut self, callee: &Value, positional: Vec<Value>, keywords: Vec<(String, Value)>) -> Result<Value, InterpreterError> {
        match callee {
            Value::Function(function) => self.call_function(function, None, positional, keywords),
            Value::BoundMethod(method) => {
                self.call_function(&method.function, Some(method.receiver.clone()), positional, keywords)
            }
            Value::Builtin(builtin) => (builtin.function)(
                self,
                CallArgs {
                    receiver: builtin.receiver.clone(),
                    positional,
                    keywords,
                },
            ),
            Value::Class(class) => self.instantiate(class, positional, keywords),
            Value::Instance(instance) => match instance.class.lookup("__call__") {
                Some(member) => {
                    let bound = self.bind_member(member, callee, &instance.class)?;
                    self.call(&bound, positional, keywords)
                }
                None => Err(InterpreterError::type_error(format!(
                    "'{}' object is not callable",
                    instance.class.name
                ))),
            },
            Value::External(path) => Err(InterpreterError::runtime(
                ErrorKind::RuntimeError,
                format!("'{}' is not available in this runtime", path),
            )),
            other => Err(InterpreterError::type_error(format!(
                "'{}' object is not callable",
                other.type_name()
            ))),
        }
    }

    fn call_function(
        &mut self,
        function: &Rc<Function>,
        receiver: Option<Value>,
        mut positional: Vec<Value>,
        keywords: Vec<(String, Value)>,
    ) -> Result<Value, InterpreterError> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(InterpreterError::runtime(
                ErrorKind::RecursionError,
                "maximum recursion depth exceeded",
            ));
        }

        if let Some(receiver) = receiver {
            positional.insert(0, receiver);
        }
        let env = function.closure.child(ScopeKind::Function);
        bind_arguments(function, &env, positional, keywords)?;

        let owner = function.owner.borrow().upgrade();
        if let (Some(owner), Some(first)) = (owner, function.params.first()) {
            if let Some(receiver) = env.get(&first.name) {
                env.set_super_context(owner, receiver);
            }
        }

        self.depth += 1;
        let body = Rc::clone(&function.body);
        let result = self.execute_block(&body, &env);
        self.depth -= 1;

        match result {
            Ok(()) => Ok(Value::None),
            Err(InterpreterError::Return(value)) => Ok(value),
            Err(err @ (InterpreterError::Break | InterpreterError::Continue)) => {
                Err(InterpreterError::runtime(ErrorKind::RuntimeError, err.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    /// Creates an instance and runs `__init__` when the class has one.
    pub fn instantiate(&mut self, class: &Rc<Class>, positional: Vec<Value>, keywords: Vec<(String, Value)>) -> Result<Value, InterpreterError> {
        let instance = Value::Instance(Self::new_instance(class));

        match class.lookup("__init__") {
            Some(init) => {
                let bound = self.bind_member(init, &instance, class)?;
                let result = self.call(&bound, positional, keywords)?;
                if !result.is_none() {
                    return Err(InterpreterError::type_error(format!(
                        "__init__() should return None, not '{}'",
                        result.type_name()
                    )));
                }
            }
            None if !positional.is_empty() || !keywords.is_empty() => {
                return Err(InterpreterError::type_error(format!("{}() takes no arguments", class.name)));
            }
            None => {}
        }

        Ok(instance)
    }

    /// Binds a class member to the receiver it was reached through.
    fn bind_member(&mut self, member: Value, receiver: &Value, class: &Rc<Class>) -> Result<Value, InterpreterError> {
        match member {
            Value::Function(function) => match function.kind {
                FunctionKind::Plain if matches!(receiver, Value::Class(_)) => Ok(Value::Function(function)),
                FunctionKind::Plain => Ok(Value::BoundMethod(Rc::new(BoundMethod {
                    receiver: receiver.clone(),
                    function,
                }))),
                FunctionKind::Static => Ok(Value::Function(function)),
                FunctionKind::ClassMethod => Ok(Value::BoundMethod(Rc::new(BoundMethod {
                    receiver: Value::Class(Rc::clone(class)),
                    function,
                }))),
                FunctionKind::Property if matches!(receiver, Value::Class(_)) => Ok(Value::Function(function)),
                FunctionKind::Property => self.call_function(&function, Some(receiver.clone()), Vec::new(), Vec::new()),
            },
            Value::Builtin(builtin) if builtin.receiver.is_none() && matches!(receiver, Value::Instance(_)) => {
                Ok(Value::Builtin(Rc::new(Builtin {
                    name: builtin.name.clone(),
                    receiver: Some(receiver.clone()),
                    function: builtin.function,
                })))
            }
            other => Ok(other),
        }
    }

    pub fn get_attribute(&mut self, object: &Value, name: &str) -> Result<Value, InterpreterError> {
        match object {
            Value::Instance(instance) => {
                if name == "__class__" {
                    return Ok(Value::Class(Rc::clone(&instance.class)));
                }
                let member = instance.class.lookup(name);
                if let Some(Value::Function(function)) = &member {
                    if function.kind == FunctionKind::Property {
                        return self.bind_member(Value::Function(Rc::clone(function)), object, &instance.class);
                    }
                }
                let own = instance.attributes.borrow().get(name).cloned();
                if let Some(value) = own {
                    return Ok(value);
                }
                match member {
                    Some(member) => self.bind_member(member, object, &instance.class),
                    None => Err(InterpreterError::attribute_error(&instance.class.name, name)),
                }
            }
            Value::Class(class) => {
                if name == "__name__" {
                    return Ok(Value::str(class.name.clone()));
                }
                match class.lookup(name) {
                    Some(member) => self.bind_member(member, object, class),
                    None => Err(InterpreterError::runtime(
                        ErrorKind::AttributeError,
                        format!("type object '{}' has no attribute '{}'", class.name, name),
                    )),
                }
            }
            Value::Module(module) => {
                let member = module.attributes.borrow().get(name).cloned();
                member.ok_or_else(|| {
                    InterpreterError::runtime(
                        ErrorKind::AttributeError,
                        format!("module '{}' has no attribute '{}'", module.name, name),
                    )
                })
            }
            Value::External(path) => Ok(Value::External(Rc::from(format!("{}.{}", path, name)))),
            Value::Super(proxy) => self.super_attribute(proxy, name),
            Value::Function(function) if name == "__name__" => Ok(Value::str(function.name.clone())),
            Value::Builtin(builtin) if name == "__name__" => Ok(Value::str(builtin.name.clone())),
            _ => match std_lib::method_for(object, name) {
                Some(function) => Ok(Value::Builtin(Rc::new(Builtin {
                    name: name.to_string(),
                    receiver: Some(object.clone()),
                    function,
                }))),
                None => Err(InterpreterError::attribute_error(&object.type_name(), name)),
            },
        }
    }

    fn super_attribute(&mut self, proxy: &SuperProxy, name: &str) -> Result<Value, InterpreterError> {
        let receiver_class = match &proxy.receiver {
            Value::Instance(instance) => Rc::clone(&instance.class),
            Value::Class(class) => Rc::clone(class),
            _ => Rc::clone(&proxy.class),
        };
        let order = receiver_class.linearization();
        let start = order
            .iter()
            .position(|class| Rc::ptr_eq(class, &proxy.class))
            .map(|index| index + 1)
            .unwrap_or(order.len());

        for class in &order[start..] {
            let member = class.attributes.borrow().get(name).cloned();
            if let Some(member) = member {
                return self.bind_member(member, &proxy.receiver, &receiver_class);
            }
        }
        Err(InterpreterError::attribute_error("super", name))
    }

    pub(super) fn zero_argument_super(&self, env: &Environment) -> Result<Value, InterpreterError> {
        match env.super_context() {
            Some((class, receiver)) => Ok(Value::Super(Rc::new(SuperProxy { class, receiver }))),
            None => Err(InterpreterError::runtime(ErrorKind::RuntimeError, "super(): no arguments")),
        }
    }

    pub fn set_attribute(&mut self, object: &Value, name: &str, value: Value) -> Result<(), InterpreterError> {
        match object {
            Value::Instance(instance) => {
                instance.attributes.borrow_mut().insert(name.to_string(), value);
                Ok(())
            }
            Value::Class(class) => {
                class.attributes.borrow_mut().insert(name.to_string(), value);
                Ok(())
            }
            Value::Module(module) => {
                module.attributes.borrow_mut().insert(name.to_string(), value);
                Ok(())
            }
            other => Err(InterpreterError::attribute_error(&other.type_name(), name)),
        }
    }

    /// `hasattr` semantics: only an `AttributeError` means absent.
    pub fn has_attribute(&mut self, object: &Value, name: &str) -> Result<bool, InterpreterError> {
        match self.get_attribute(object, name) {
            Ok(_) => Ok(true),
            Err(InterpreterError::Runtime {
                kind: ErrorKind::AttributeError,
                ..
            }) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// Binds call arguments to a function's parameters in a fresh scope.
fn bind_arguments(
    function: &Function,
    env: &Environment,
    positional: Vec<Value>,
    keywords: Vec<(String, Value)>,
) -> Result<(), InterpreterError> {
    let name = &function.name;
    let positional_params: Vec<&Param> = function
        .params
        .iter()
        .filter(|param| param.kind == ParameterKind::Positional)
        .collect();
    let has_varargs = function.params.iter().any(|param| param.kind == ParameterKind::VarArgs);
    let has_kwargs = function.params.iter().any(|param| param.kind == ParameterKind::KwArgs);

    let mut bound: IndexMap<&str, Value> = IndexMap::new();
    let mut extra_positional = Vec::new();
    let given = positional.len();

    for (index, value) in positional.into_iter().enumerate() {
        match positional_params.get(index) {
            Some(param) => {
                bound.insert(param.name.as_str(), value);
            }
            None if has_varargs => extra_positional.push(value),
            None => {
                let expected = positional_params.len();
                return Err(InterpreterError::type_error(format!(
                    "{}() takes {} positional argument{} but {} {} given",
                    name,
                    expected,
                    if expected == 1 { "" } else { "s" },
                    given,
                    if given == 1 { "was" } else { "were" }
                )));
            }
        }
    }

    let mut extra_keywords = Dict::new();
    for (key, value) in keywords {
        let param = function.params.iter().find(|param| {
            param.name == key && matches!(param.kind, ParameterKind::Positional | ParameterKind::KeywordOnly)
        });
        match param {
            Some(param) => {
                if bound.contains_key(param.name.as_str()) {
                    return Err(InterpreterError::type_error(format!(
                        "{}() got multiple values for argument '{}'",
                        name, key
                    )));
                }
                bound.insert(param.name.as_str(), value);
            }
            None if has_kwargs => extra_keywords.insert(Value::Str(key), value),
            None => {
                return Err(InterpreterError::type_error(format!(
                    "{}() got an unexpected keyword argument '{}'",
                    name, key
                )))
            }
        }
    }

    let mut missing = Vec::new();
    for param in &function.params {
        match param.kind {
            ParameterKind::Positional | ParameterKind::KeywordOnly => {
                let value = match bound.shift_remove(param.name.as_str()) {
                    Some(value) => value,
                    None => match &param.default {
                        Some(default) => default.clone(),
                        None => {
                            missing.push(format!("'{}'", param.name));
                            continue;
                        }
                    },
                };
                env.define(param.name.clone(), value);
            }
            ParameterKind::VarArgs => env.define(param.name.clone(), Value::tuple(std::mem::take(&mut extra_positional))),
            ParameterKind::KwArgs => env.define(param.name.clone(), Value::dict(std::mem::take(&mut extra_keywords))),
        }
    }

    if !missing.is_empty() {
        return Err(InterpreterError::type_error(format!(
            "{}() missing {} required argument{}: {}",
            name,
            missing.len(),
            if missing.len() == 1 { "" } else { "s" },
            missing.join(", ")
        )));
    }
    Ok(())
}
