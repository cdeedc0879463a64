use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use super::value::{Class, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Function,
    Class,
    Comprehension,
}

struct Scope {
    variables: IndexMap<String, Value>,
    parent: Option<Environment>,
    kind: ScopeKind,
    /// Set for method calls so `super()` knows its class and receiver.
    super_context: Option<(Rc<Class>, Value)>,
}

/// A chain of lexical scopes. Cloning shares the scope.
#[derive(Clone)]
pub struct Environment {
    scope: Rc<RefCell<Scope>>,
}

impl Environment {
    pub fn new_module() -> Self {
        Self::with_parent(None, ScopeKind::Module)
    }

    fn with_parent(parent: Option<Environment>, kind: ScopeKind) -> Self {
        Environment {
            scope: Rc::new(RefCell::new(Scope {
                variables: IndexMap::new(),
                parent,
                kind,
                super_context: None,
            })),
        }
    }

    pub fn child(&self, kind: ScopeKind) -> Self {
        Self::with_parent(Some(self.clone()), kind)
    }

    pub fn kind(&self) -> ScopeKind {
        self.scope.borrow().kind
    }

    /// Scope a function defined here closes over. Class bodies are skipped:
    /// methods do not see class-level names.
    pub fn closure_scope(&self) -> Environment {
        let mut current = self.clone();
        loop {
            let parent = {
                let scope = current.scope.borrow();
                if scope.kind != ScopeKind::Class {
                    break;
                }
                scope.parent.clone()
            };
            match parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let scope = self.scope.borrow();
        if let Some(value) = scope.variables.get(name) {
            return Some(value.clone());
        }
        scope.parent.as_ref().and_then(|parent| parent.get(name))
    }

    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.scope.borrow_mut().variables.insert(name.into(), value);
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.scope.borrow_mut().variables.shift_remove(name)
    }

    /// Variables of this scope only, in definition order.
    pub fn variables(&self) -> Vec<(String, Value)> {
        self.scope
            .borrow()
            .variables
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    pub fn set_super_context(&self, class: Rc<Class>, receiver: Value) {
        self.scope.borrow_mut().super_context = Some((class, receiver));
    }

    pub fn super_context(&self) -> Option<(Rc<Class>, Value)> {
        let scope = self.scope.borrow();
        if let Some(context) = &scope.super_context {
            return Some(context.clone());
        }
        scope.parent.as_ref().and_then(|parent| parent.super_context())
    }

    /// Drops every binding. Breaks the reference cycles between a module
    /// scope and the functions defined in it.
    pub fn clear(&self) {
        let variables = std::mem::take(&mut self.scope.borrow_mut().variables);
        drop(variables);
    }
}
