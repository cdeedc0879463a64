//! The component as its editor holds it: source, overrides and live values.

use once_cell::unsync::OnceCell;
use serde_json::{Map, Value as Json};

use crate::analysis::{extract, ProgramModel, SyntaxError};
use crate::template::config::Overrides;

#[cfg(test)]
mod tests;

pub const DEFAULT_ENTRYPOINT: &str = "build";

/// A submission plus what the editor knows about it. The program model is
/// computed on first use and dropped whenever the source changes.
#[derive(Debug, Clone)]
pub struct ComponentSpec {
    source: String,
    entrypoint_name: String,
    field_config_overrides: Overrides,
    field_values: Map<String, Json>,
    model: OnceCell<Result<ProgramModel, SyntaxError>>,
}

impl ComponentSpec {
    pub fn new(source: impl Into<String>) -> Self {
        ComponentSpec {
            source: source.into(),
            entrypoint_name: DEFAULT_ENTRYPOINT.to_string(),
            field_config_overrides: Overrides::new(),
            field_values: Map::new(),
            model: OnceCell::new(),
        }
    }

    pub fn with_entrypoint(mut self, name: impl Into<String>) -> Self {
        self.entrypoint_name = name.into();
        self
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.field_config_overrides = overrides;
        self
    }

    pub fn with_field_values(mut self, values: Map<String, Json>) -> Self {
        self.field_values = values;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
        self.model = OnceCell::new();
    }

    pub fn entrypoint_name(&self) -> &str {
        &self.entrypoint_name
    }

    pub fn overrides(&self) -> &Overrides {
        &self.field_config_overrides
    }

    pub fn field_values(&self) -> &Map<String, Json> {
        &self.field_values
    }

    pub fn set_field_value(&mut self, name: impl Into<String>, value: Json) {
        self.field_values.insert(name.into(), value);
    }

    /// The program model of the current source, parsed at most once.
    pub fn model(&self) -> Result<&ProgramModel, SyntaxError> {
        self.model
            .get_or_init(|| extract(&self.source))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn is_model_cached(&self) -> bool {
        self.model.get().is_some()
    }
}
