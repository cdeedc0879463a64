//! Static analysis, template synthesis and runtime binding for components
//! written in a small indentation-based scripting language.

pub mod analysis;
pub mod ast;
pub mod cli;
pub mod component;
pub mod diagnostics;
pub mod execution_engine;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod std_lib;
pub mod template;

pub use component::ComponentSpec;
pub use execution_engine::{ComponentEngine, EngineConfig, EngineError, FrontendNode, Runnable};
pub use template::{Template, TemplateField};
