use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::EngineError;
use crate::analysis::MainClassPolicy;

/// Which [`MainClassPolicy`] an engine uses; the base class for
/// `component_subclass` comes from [`EngineConfig::component_base`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    FirstDeclared,
    ComponentSubclass,
}

/// Engine settings. Every key is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub entrypoint_name: String,
    pub main_class_policy: PolicyKind,
    pub component_base: String,
    /// Adds a `code` field holding the source to frontend nodes.
    pub include_code_field: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            entrypoint_name: "build".to_string(),
            main_class_policy: PolicyKind::FirstDeclared,
            component_base: "CustomComponent".to_string(),
            include_code_field: true,
        }
    }
}

impl EngineConfig {
    pub fn policy(&self) -> MainClassPolicy {
        match self.main_class_policy {
            PolicyKind::FirstDeclared => MainClassPolicy::FirstDeclared,
            PolicyKind::ComponentSubclass => MainClassPolicy::ComponentSubclass {
                base: self.component_base.clone(),
            },
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, EngineError> {
        serde_json::from_str(text).map_err(|err| EngineError::Config(err.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| EngineError::Config(format!("failed to read {}: {}", path.display(), err)))?;
        let config: EngineConfig = serde_json::from_str(&text)
            .map_err(|err| EngineError::Config(format!("failed to parse {}: {}", path.display(), err)))?;
        debug!(path = %path.display(), ?config, "loaded engine config");
        Ok(config)
    }
}
