use thiserror::Error;

use super::value::Value;

/// Built-in exception classes that runtime faults are raised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TypeError,
    ValueError,
    KeyError,
    IndexError,
    AttributeError,
    NameError,
    RuntimeError,
    NotImplementedError,
    ZeroDivisionError,
    RecursionError,
    AssertionError,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::TypeError => "TypeError",
            ErrorKind::ValueError => "ValueError",
            ErrorKind::KeyError => "KeyError",
            ErrorKind::IndexError => "IndexError",
            ErrorKind::AttributeError => "AttributeError",
            ErrorKind::NameError => "NameError",
            ErrorKind::RuntimeError => "RuntimeError",
            ErrorKind::NotImplementedError => "NotImplementedError",
            ErrorKind::ZeroDivisionError => "ZeroDivisionError",
            ErrorKind::RecursionError => "RecursionError",
            ErrorKind::AssertionError => "AssertionError",
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum InterpreterError {
    /// A fault detected by the runtime itself.
    #[error("{message}")]
    Runtime { kind: ErrorKind, message: String },
    /// An exception object raised by submitted code.
    #[error("{message}")]
    Raised {
        exception: Value,
        class_name: String,
        message: String,
    },
    #[error("'return' outside function")]
    Return(Value),
    #[error("'break' outside loop")]
    Break,
    #[error("'continue' not properly in loop")]
    Continue,
}

impl InterpreterError {
    pub fn runtime(kind: ErrorKind, message: impl Into<String>) -> Self {
        InterpreterError::Runtime {
            kind,
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::runtime(ErrorKind::TypeError, message)
    }

    pub fn value_error(message: impl Into<String>) -> Self {
        Self::runtime(ErrorKind::ValueError, message)
    }

    pub fn name_error(name: &str) -> Self {
        Self::runtime(ErrorKind::NameError, format!("name '{}' is not defined", name))
    }

    pub fn attribute_error(owner: &str, name: &str) -> Self {
        Self::runtime(
            ErrorKind::AttributeError,
            format!("'{}' object has no attribute '{}'", owner, name),
        )
    }

    pub fn index_error(message: impl Into<String>) -> Self {
        Self::runtime(ErrorKind::IndexError, message)
    }

    pub fn zero_division(message: impl Into<String>) -> Self {
        Self::runtime(ErrorKind::ZeroDivisionError, message)
    }

    /// True for errors that `try`/`except` can catch.
    pub fn is_exception(&self) -> bool {
        matches!(self, InterpreterError::Runtime { .. } | InterpreterError::Raised { .. })
    }

    /// Class name of the exception, e.g. `ValueError`.
    pub fn exception_name(&self) -> &str {
        match self {
            InterpreterError::Runtime { kind, .. } => kind.name(),
            InterpreterError::Raised { class_name, .. } => class_name,
            InterpreterError::Return(_) | InterpreterError::Break | InterpreterError::Continue => "SyntaxError",
        }
    }

    /// `Class: message`, the way a traceback's last line reads.
    pub fn describe(&self) -> String {
        let message = self.to_string();
        if message.is_empty() {
            self.exception_name().to_string()
        } else {
            format!("{}: {}", self.exception_name(), message)
        }
    }
}
