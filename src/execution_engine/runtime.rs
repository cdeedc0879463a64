//! Source text to a callable bound to the component's entrypoint.
//!
//! Every compile runs in a fresh [`Interpreter`], so module state never leaks
//! from one compile into the next. A [`Runnable`] owns its interpreter and is
//! confined to the thread that built it.

use std::rc::Rc;

use serde_json::Value as Json;
use tracing::{debug, warn};

use super::EngineError;
use crate::analysis::extractor::build_model;
use crate::analysis::{parse_program, resolve, MainClassPolicy};
use crate::interpreter::{Class, Interpreter, InterpreterError, Value};

/// Maps an error raised by submitted code, keeping its message.
pub(crate) fn invocation(err: InterpreterError) -> EngineError {
    warn!(error = %err.describe(), "component code raised");
    EngineError::Invocation {
        message: err.to_string(),
    }
}

/// A module whose top level has run.
pub struct CompiledModule {
    interpreter: Interpreter,
    main_class_name: String,
    main_class: Option<Rc<Class>>,
    /// The class static analysis found the entrypoint method on.
    owner: Option<Rc<Class>>,
    /// Whether static analysis found the entrypoint as a top-level `def`.
    function_declared: bool,
}

impl CompiledModule {
    pub fn compile(source: &str, entrypoint_name: &str, policy: &MainClassPolicy) -> Result<Self, EngineError> {
        if source.trim().is_empty() {
            return Err(EngineError::EmptySource);
        }
        let program = parse_program(source)?;
        let model = build_model(&program);
        let signature = resolve(&model, entrypoint_name, policy);

        let mut interpreter = Interpreter::new();
        interpreter.run(&program).map_err(invocation)?;

        let class_named = |name: &str| match interpreter.globals().get(name) {
            Some(Value::Class(class)) => Some(class),
            _ => None,
        };
        let main_class = class_named(&signature.main_class_name);
        let owner = signature.owner.as_deref().and_then(class_named);
        debug!(
            main_class = %signature.main_class_name,
            owner = ?signature.owner,
            "compiled component source"
        );
        Ok(CompiledModule {
            main_class_name: signature.main_class_name,
            main_class,
            owner,
            function_declared: signature.found && signature.owner.is_none(),
            interpreter,
        })
    }

    pub fn main_class_name(&self) -> &str {
        &self.main_class_name
    }

    /// A new instance of the main class, created with no arguments.
    pub fn instantiate_main(&mut self) -> Result<Option<Value>, EngineError> {
        let Some(class) = self.main_class.clone() else {
            return Ok(None);
        };
        self.interpreter
            .instantiate(&class, Vec::new(), Vec::new())
            .map(Some)
            .map_err(invocation)
    }

    pub fn call_method(&mut self, receiver: &Value, name: &str, positional: Vec<Value>) -> Result<Value, EngineError> {
        let method = self.interpreter.get_attribute(receiver, name).map_err(invocation)?;
        self.interpreter.call(&method, positional, Vec::new()).map_err(invocation)
    }

    /// Binds the entrypoint where static analysis located it: a method of
    /// the class defining it, on a fresh instance, or a top-level function.
    /// An entrypoint the main class only inherits comes next, then any
    /// module-level callable of that name.
    pub fn bind(self, entrypoint_name: &str) -> Result<Runnable, EngineError> {
        if let Some(owner) = self.owner.clone() {
            return self.bind_method(&owner, entrypoint_name);
        }
        if !self.function_declared {
            let inherited = self
                .main_class
                .clone()
                .filter(|class| class.lookup(entrypoint_name).is_some());
            if let Some(class) = inherited {
                return self.bind_method(&class, entrypoint_name);
            }
        }

        let global = self.interpreter.globals().get(entrypoint_name);
        match global {
            Some(target) if is_callable(&target) => Ok(Runnable {
                module: self,
                target,
                instance: None,
                entrypoint_name: entrypoint_name.to_string(),
            }),
            _ => Err(EngineError::EntrypointMissing {
                name: entrypoint_name.to_string(),
            }),
        }
    }

    fn bind_method(mut self, class: &Rc<Class>, entrypoint_name: &str) -> Result<Runnable, EngineError> {
        let instance = self
            .interpreter
            .instantiate(class, Vec::new(), Vec::new())
            .map_err(invocation)?;
        let target = self.interpreter.get_attribute(&instance, entrypoint_name).map_err(invocation)?;
        Ok(Runnable {
            module: self,
            target,
            instance: Some(instance),
            entrypoint_name: entrypoint_name.to_string(),
        })
    }
}

fn is_callable(value: &Value) -> bool {
    match value {
        Value::Function(_) | Value::BoundMethod(_) | Value::Builtin(_) | Value::Class(_) => true,
        Value::Instance(instance) => instance.class.lookup("__call__").is_some(),
        _ => false,
    }
}

pub fn compile_and_bind(source: &str, entrypoint_name: &str) -> Result<Runnable, EngineError> {
    compile_and_bind_with(source, entrypoint_name, &MainClassPolicy::default())
}

pub fn compile_and_bind_with(
    source: &str,
    entrypoint_name: &str,
    policy: &MainClassPolicy,
) -> Result<Runnable, EngineError> {
    CompiledModule::compile(source, entrypoint_name, policy)?.bind(entrypoint_name)
}

/// The component's entrypoint, ready to invoke with keyword arguments.
pub struct Runnable {
    module: CompiledModule,
    target: Value,
    instance: Option<Value>,
    entrypoint_name: String,
}

impl Runnable {
    pub fn entrypoint_name(&self) -> &str {
        &self.entrypoint_name
    }

    /// The component instance the entrypoint is bound to, when it is a method.
    pub fn instance(&self) -> Option<&Value> {
        self.instance.as_ref()
    }

    pub fn call(&mut self, kwargs: Vec<(String, Value)>) -> Result<Value, EngineError> {
        debug!(entrypoint = %self.entrypoint_name, arguments = kwargs.len(), "invoking component");
        self.module.interpreter.call(&self.target, Vec::new(), kwargs).map_err(invocation)
    }

    /// Calls with the members of a JSON object as keyword arguments and
    /// returns the result as JSON. `null` means no arguments.
    pub fn call_json(&mut self, kwargs: &Json) -> Result<Json, EngineError> {
        let kwargs = match kwargs {
            Json::Object(members) => members
                .iter()
                .map(|(name, value)| (name.clone(), Value::from_json(value)))
                .collect(),
            Json::Null => Vec::new(),
            _ => {
                return Err(EngineError::Invocation {
                    message: "keyword arguments must be a JSON object".to_string(),
                })
            }
        };
        self.call(kwargs).map(|result| result.to_json())
    }

    /// Calls a hook such as `build_config` on the bound instance.
    pub fn call_hook(&mut self, name: &str, positional: Vec<Value>) -> Result<Value, EngineError> {
        let Some(instance) = self.instance.clone() else {
            return Err(EngineError::Invocation {
                message: format!("'{}' is not a method, so it has no '{}' hook", self.entrypoint_name, name),
            });
        };
        self.module.call_method(&instance, name, positional)
    }

    /// The instance's `status` attribute, when the component set one.
    pub fn status(&mut self) -> Option<Json> {
        let instance = self.instance.clone()?;
        match self.module.interpreter.get_attribute(&instance, "status") {
            Ok(Value::None) | Err(_) => None,
            Ok(status) => Some(status.to_json()),
        }
    }

    /// Lines the component printed since the last call.
    pub fn output(&mut self) -> Vec<String> {
        self.module.interpreter.take_output()
    }
}
