//! Tree-walking interpreter for the component language.
//!
//! One [`Interpreter`] is one isolated runtime: its own globals, its own
//! module cache and its own copies of the built-in classes. Nothing is shared
//! between instances.

use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use crate::ast::{ExceptHandler, Expr, ImportName, Program, Statement};
use crate::std_lib;

pub use self::environment::{Environment, ScopeKind};
pub use self::error::{ErrorKind, InterpreterError};
pub use self::value::{Builtin, BuiltinFn, CallArgs, Class, Dict, Function, FunctionKind, Instance, Module, Value};

pub mod environment;
pub mod error;
pub mod value;

mod calls;
mod eval;
mod exceptions;
mod operators;

#[cfg(test)]
mod tests;

/// Deepest chain of nested calls before a `RecursionError`.
const MAX_CALL_DEPTH: usize = 64;

pub struct Interpreter {
    globals: Environment,
    builtins: IndexMap<String, Value>,
    exception_classes: IndexMap<String, Rc<Class>>,
    modules: IndexMap<String, Value>,
    /// Scopes of modules evaluated from source, cleared on drop.
    module_scopes: Vec<Environment>,
    /// Exceptions being handled by enclosing `except` blocks, innermost last.
    handling: Vec<InterpreterError>,
    output: Vec<String>,
    depth: usize,
}

impl Interpreter {
    pub fn new() -> Self {
        let mut interpreter = Interpreter {
            globals: Environment::new_module(),
            builtins: std_lib::builtins(),
            exception_classes: IndexMap::new(),
            modules: IndexMap::new(),
            module_scopes: Vec::new(),
            handling: Vec::new(),
            output: Vec::new(),
            depth: 0,
        };
        exceptions::install(&mut interpreter);
        interpreter.globals.define("__name__", Value::str("__main__"));
        interpreter
    }

    /// Executes a module's top level in this interpreter's global scope.
    pub fn run(&mut self, program: &Program) -> Result<(), InterpreterError> {
        let globals = self.globals.clone();
        self.execute_module(&program.statements, &globals)
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    /// Resolves a global name, falling back to the built-ins.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.globals.get(name).or_else(|| self.builtins.get(name).cloned())
    }

    pub fn builtin(&self, name: &str) -> Option<Value> {
        self.builtins.get(name).cloned()
    }

    pub(crate) fn define_builtin(&mut self, name: &str, value: Value) {
        self.builtins.insert(name.to_string(), value);
    }

    pub fn exception_class(&self, name: &str) -> Option<Rc<Class>> {
        self.exception_classes.get(name).cloned()
    }

    /// Lines written by `print` since the last call.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    pub(crate) fn write_output(&mut self, line: String) {
        debug!(target: "component_engine::print", "{}", line);
        self.output.push(line);
    }

    /// Runs statements as a module body; stray `return`/`break`/`continue`
    /// become runtime errors here.
    pub(crate) fn execute_module(&mut self, statements: &[Statement], env: &Environment) -> Result<(), InterpreterError> {
        match self.execute_block(statements, env) {
            Err(err @ (InterpreterError::Return(_) | InterpreterError::Break | InterpreterError::Continue)) => {
                Err(InterpreterError::runtime(ErrorKind::RuntimeError, err.to_string()))
            }
            other => other,
        }
    }

    pub(crate) fn register_module_scope(&mut self, env: Environment) {
        self.module_scopes.push(env);
    }

    /// Loads a module by dotted name, once per interpreter. Names the runtime
    /// does not provide load as external values.
    pub fn import_module(&mut self, name: &str) -> Result<Value, InterpreterError> {
        if let Some(module) = self.modules.get(name) {
            return Ok(module.clone());
        }

        let module = match std_lib::modules::load(self, name)? {
            Some(module) => module,
            None => {
                debug!(module = name, "import resolved to an external value");
                Value::External(Rc::from(name))
            }
        };
        self.modules.insert(name.to_string(), module.clone());
        Ok(module)
    }

    pub fn execute_block(&mut self, statements: &[Statement], env: &Environment) -> Result<(), InterpreterError> {
        for statement in statements {
            self.execute_statement(statement, env)?;
        }
        Ok(())
    }

    fn execute_statement(&mut self, statement: &Statement, env: &Environment) -> Result<(), InterpreterError> {
        match statement {
            Statement::Expression(expr) => {
                self.evaluate(expr, env)?;
                Ok(())
            }
            Statement::Assign { targets, value } => {
                let value = self.evaluate(value, env)?;
                for target in targets {
                    self.assign(target, value.clone(), env)?;
                }
                Ok(())
            }
            Statement::AnnAssign { target, value, .. } => {
                if let Some(value) = value {
                    let value = self.evaluate(value, env)?;
                    self.assign(target, value, env)?;
                }
                Ok(())
            }
            Statement::AugAssign { target, operator, value } => {
                let current = self.evaluate(target, env)?;
                let value = self.evaluate(value, env)?;
                let result = self.augmented(&current, *operator, &value)?;
                self.assign(target, result, env)
            }
            Statement::FunctionDef(def) => {
                let function = self.define_function(def, env)?;
                env.define(def.name.clone(), function);
                Ok(())
            }
            Statement::ClassDef(def) => {
                let class = self.define_class(def, env)?;
                env.define(def.name.clone(), class);
                Ok(())
            }
            Statement::Return { value } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr, env)?,
                    None => Value::None,
                };
                Err(InterpreterError::Return(value))
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.evaluate(condition, env)?;
                if self.is_truthy(&condition)? {
                    self.execute_block(then_branch, env)
                } else {
                    self.execute_block(else_branch, env)
                }
            }
            Statement::While { condition, body } => {
                loop {
                    let value = self.evaluate(condition, env)?;
                    if !self.is_truthy(&value)? {
                        break;
                    }
                    match self.execute_block(body, env) {
                        Ok(()) | Err(InterpreterError::Continue) => {}
                        Err(InterpreterError::Break) => break,
                        Err(err) => return Err(err),
                    }
                }
                Ok(())
            }
            Statement::For { target, iterable, body } => {
                let iterable = self.evaluate(iterable, env)?;
                for item in self.iterate(&iterable)? {
                    self.assign(target, item, env)?;
                    match self.execute_block(body, env) {
                        Ok(()) | Err(InterpreterError::Continue) => {}
                        Err(InterpreterError::Break) => break,
                        Err(err) => return Err(err),
                    }
                }
                Ok(())
            }
            Statement::Try {
                body,
                handlers,
                else_branch,
                finally,
            } => self.execute_try(body, handlers, else_branch, finally, env),
            Statement::Raise { exception, cause: _ } => self.execute_raise(exception.as_ref(), env),
            Statement::Import { names } => self.execute_import(names, env),
            Statement::ImportFrom { module, names } => self.execute_import_from(module, names, env),
            Statement::Pass => Ok(()),
            Statement::Break => Err(InterpreterError::Break),
            Statement::Continue => Err(InterpreterError::Continue),
        }
    }

    fn execute_try(
        &mut self,
        body: &[Statement],
        handlers: &[ExceptHandler],
        else_branch: &[Statement],
        finally: &[Statement],
        env: &Environment,
    ) -> Result<(), InterpreterError> {
        let outcome = match self.execute_block(body, env) {
            Ok(()) => self.execute_block(else_branch, env),
            Err(err) if err.is_exception() => self.handle_exception(err, handlers, env),
            Err(control) => Err(control),
        };

        if !finally.is_empty() {
            self.execute_block(finally, env)?;
        }
        outcome
    }

    fn handle_exception(
        &mut self,
        err: InterpreterError,
        handlers: &[ExceptHandler],
        env: &Environment,
    ) -> Result<(), InterpreterError> {
        let class = self.class_of_error(&err);

        for handler in handlers {
            let matches = match &handler.exception_type {
                None => true,
                Some(expr) => {
                    let filter = self.evaluate(expr, env)?;
                    self.exception_matches(&class, &filter)?
                }
            };
            if !matches {
                continue;
            }

            if let Some(name) = &handler.name {
                let exception = self.exception_value(&err)?;
                env.define(name.clone(), exception);
            }
            self.handling.push(err);
            let result = self.execute_block(&handler.body, env);
            self.handling.pop();
            if let Some(name) = &handler.name {
                env.remove(name);
            }
            return result;
        }

        Err(err)
    }

    fn exception_matches(&self, class: &Rc<Class>, filter: &Value) -> Result<bool, InterpreterError> {
        match filter {
            Value::Class(expected) => Ok(class.is_subclass_of(expected)),
            Value::Tuple(options) => {
                for option in options.iter() {
                    if self.exception_matches(class, option)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            // An exception type from an unavailable module can never match.
            Value::External(_) => Ok(false),
            other => Err(InterpreterError::type_error(format!(
                "catching classes that do not inherit from BaseException is not allowed (got {})",
                other.type_name()
            ))),
        }
    }

    fn execute_raise(&mut self, exception: Option<&Expr>, env: &Environment) -> Result<(), InterpreterError> {
        let Some(expr) = exception else {
            return Err(self
                .handling
                .last()
                .cloned()
                .unwrap_or_else(|| InterpreterError::runtime(ErrorKind::RuntimeError, "No active exception to reraise")));
        };

        let value = self.evaluate(expr, env)?;
        Err(self.raise_value(value)?)
    }

    fn execute_import(&mut self, names: &[ImportName], env: &Environment) -> Result<(), InterpreterError> {
        for import in names {
            let module = self.import_module(&import.name)?;
            match &import.alias {
                Some(alias) => env.define(alias.clone(), module),
                None => {
                    let top = import.name.split('.').next().unwrap_or(&import.name);
                    let binding = if top == import.name { module } else { self.import_module(top)? };
                    env.define(top.to_string(), binding);
                }
            }
        }
        Ok(())
    }

    fn execute_import_from(&mut self, module_name: &str, names: &[ImportName], env: &Environment) -> Result<(), InterpreterError> {
        let module = self.import_module(module_name)?;

        for import in names {
            if import.name == "*" {
                if let Value::Module(module) = &module {
                    for (name, value) in module.attributes.borrow().iter() {
                        if !name.starts_with('_') {
                            env.define(name.clone(), value.clone());
                        }
                    }
                }
                continue;
            }

            let value = match &module {
                Value::Module(module) => module.attributes.borrow().get(&import.name).cloned(),
                _ => None,
            };
            let value = value.unwrap_or_else(|| Value::External(Rc::from(format!("{}.{}", module_name, import.name))));
            env.define(import.alias.clone().unwrap_or_else(|| import.name.clone()), value);
        }
        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        self.globals.clear();
        for scope in &self.module_scopes {
            scope.clear();
        }
        for module in self.modules.values() {
            if let Value::Module(module) = module {
                module.attributes.borrow_mut().clear();
            }
        }
    }
}
