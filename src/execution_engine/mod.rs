//! The engine facade: every operation a collaborator calls, behind one
//! configuration and one error type.

use serde::Serialize;
use serde_json::Value as Json;
use thiserror::Error;
use tracing::debug;

use crate::analysis::{extract, literal_eval, resolve, ArgRecord, ArgsView, EntrypointSignature, ProgramModel, SyntaxError};
use crate::component::ComponentSpec;
use crate::template::{self, FieldKind, Template, TemplateField};

pub mod config;
pub mod runtime;

#[cfg(test)]
mod tests;

pub use config::{EngineConfig, PolicyKind};
pub use runtime::{compile_and_bind, compile_and_bind_with, CompiledModule, Runnable};

/// Starter source for a new component.
pub const DEFAULT_COMPONENT_CODE: &str = r#"from langflow import CustomComponent
from typing import Optional, List, Dict, Union
from langflow.field_typing import (
    AgentExecutor,
    BaseChatMemory,
    BaseLanguageModel,
    BaseLLM,
    BaseLoader,
    BaseMemory,
    BaseOutputParser,
    BasePromptTemplate,
    BaseRetriever,
    Callable,
    Chain,
    ChatPromptTemplate,
    Data,
    Document,
    Embeddings,
    NestedDict,
    Object,
    PromptTemplate,
    TextSplitter,
    Tool,
    VectorStore,
)


class Component(CustomComponent):
    display_name: str = "Custom Component"
    description: str = "Create any custom component you want!"

    def build_config(self):
        return {"param": {"display_name": "Parameter"}}

    def build(self, param: Data) -> Data:
        return param
"#;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid code: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("write some code")]
    EmptySource,
    #[error("entrypoint '{name}' not found")]
    EntrypointMissing { name: String },
    #[error("{message}")]
    Invocation { message: String },
    #[error("invalid engine configuration: {0}")]
    Config(String),
}

/// What an editor needs to render a component node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontendNode {
    pub display_name: String,
    pub description: String,
    pub documentation: String,
    pub beta: bool,
    pub main_class: String,
    pub output_types: Vec<String>,
    pub template: Template,
}

#[derive(Debug, Clone, Default)]
pub struct ComponentEngine {
    config: EngineConfig,
}

impl ComponentEngine {
    pub fn new(config: EngineConfig) -> Self {
        ComponentEngine { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A `ComponentSpec` for `source` using the configured entrypoint name.
    pub fn spec(&self, source: impl Into<String>) -> ComponentSpec {
        ComponentSpec::new(source).with_entrypoint(self.config.entrypoint_name.clone())
    }

    pub fn parse(&self, source: &str) -> Result<ProgramModel, EngineError> {
        Ok(extract(source)?)
    }

    /// Signature lookup that degrades to "not found" on unparseable source.
    fn signature(&self, source: &str, entrypoint_name: &str) -> EntrypointSignature {
        match extract(source) {
            Ok(model) => resolve(&model, entrypoint_name, &self.config.policy()),
            Err(err) => {
                debug!(error = %err, "source does not parse; no entrypoint");
                EntrypointSignature::default()
            }
        }
    }

    pub fn get_entrypoint_args(&self, source: &str, entrypoint_name: &str) -> Vec<ArgRecord> {
        self.signature(source, entrypoint_name).args(ArgsView::Raw)
    }

    pub fn get_entrypoint_return_types(&self, source: &str, entrypoint_name: &str) -> Vec<String> {
        self.signature(source, entrypoint_name).return_types
    }

    pub fn get_main_class_name(&self, source: &str) -> String {
        self.signature(source, &self.config.entrypoint_name).main_class_name
    }

    pub fn get_runnable(&self, source: &str, entrypoint_name: &str) -> Result<Runnable, EngineError> {
        compile_and_bind_with(source, entrypoint_name, &self.config.policy())
    }

    /// The component's template; with `update_field`, a reactive rebuild using its
    /// live field values.
    pub fn build_template(&self, spec: &ComponentSpec, update_field: Option<&str>) -> Result<Template, EngineError> {
        match update_field {
            Some(field) => template::rebuild(&self.config, spec, field, spec.field_values()),
            None => template::static_template(&self.config, spec),
        }
    }

    pub fn build_frontend_node(&self, spec: &ComponentSpec) -> Result<FrontendNode, EngineError> {
        let mut template = self.build_template(spec, None)?;
        let model = spec.model()?;
        let signature = resolve(model, spec.entrypoint_name(), &self.config.policy());
        let class = model.class(&signature.main_class_name);

        let text_attribute = |name: &str| {
            class
                .and_then(|class| class.attribute(name))
                .and_then(|attribute| literal_eval(&attribute.value))
                .and_then(|value| value.as_str().map(str::to_string))
        };
        let beta = class
            .and_then(|class| class.attribute("beta"))
            .and_then(|attribute| literal_eval(&attribute.value))
            .and_then(|value| value.as_bool())
            .unwrap_or(true);

        if self.config.include_code_field && !template.contains_key("code") {
            template.insert("code".to_string(), code_field(spec.source()));
        }

        Ok(FrontendNode {
            display_name: text_attribute("display_name").unwrap_or_else(|| match signature.main_class_name.as_str() {
                "" => "Custom Component".to_string(),
                name => name.to_string(),
            }),
            description: text_attribute("description").unwrap_or_default(),
            documentation: text_attribute("documentation").unwrap_or_default(),
            beta,
            main_class: signature.main_class_name,
            output_types: signature.return_types,
            template,
        })
    }
}

/// The editable source itself, shown as a code field.
fn code_field(source: &str) -> TemplateField {
    let mut field = TemplateField::new("code");
    field.type_name = "code".to_string();
    field.kind = FieldKind::Code;
    field.required = true;
    field.multiline = true;
    field.dynamic = true;
    field.default_value = Json::String(source.to_string());
    field
}
