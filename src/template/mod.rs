//! Field templates: what an editor renders for a component's inputs.

use indexmap::IndexMap;

pub mod config;
pub mod field;
pub mod rebuilder;
pub mod synthesizer;

#[cfg(test)]
mod tests;

pub use config::{merge_overrides, overrides_from_json, FieldConfig, Overrides};
pub use field::{FieldKind, TemplateField};
pub use rebuilder::{rebuild, static_template};
pub use synthesizer::synthesize;

/// Field name to field, in display order.
pub type Template = IndexMap<String, TemplateField>;
