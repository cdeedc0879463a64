//! Per-field configuration overrides.
//!
//! Overrides reach the synthesizer from three places: a class-level
//! `field_config` literal, the component's `build_config()` hook and the
//! caller. All three use the same JSON shape, one object per field name.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::{debug, warn};

use super::field::{FieldKind, TemplateField};
use super::synthesizer::TypeInfo;

/// Every attribute is optional; `None` leaves the field as it was.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Json>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Json>,
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, alias = "list", skip_serializing_if = "Option::is_none")]
    pub is_list: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic: Option<bool>,
    #[serde(default, alias = "real_time_refresh", skip_serializing_if = "Option::is_none")]
    pub refresh: Option<bool>,
    /// Keys this engine does not understand.
    #[serde(flatten, skip_serializing)]
    pub unknown: IndexMap<String, Json>,
}

impl FieldConfig {
    /// Reads one field's configuration. Malformed entries are skipped with a
    /// warning rather than failing the whole template.
    pub fn from_json(field: &str, json: &Json) -> Option<Self> {
        match serde_json::from_value::<FieldConfig>(json.clone()) {
            Ok(config) => {
                for key in config.unknown.keys() {
                    debug!(field, key = key.as_str(), "ignoring unknown field config key");
                }
                Some(config)
            }
            Err(err) => {
                warn!(field, error = %err, "ignoring unreadable field config");
                None
            }
        }
    }

    /// Takes every attribute `other` sets.
    pub fn merge(&mut self, other: &FieldConfig) {
        fn take<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                slot.clone_from(value);
            }
        }
        take(&mut self.display_name, &other.display_name);
        take(&mut self.info, &other.info);
        take(&mut self.password, &other.password);
        take(&mut self.show, &other.show);
        take(&mut self.advanced, &other.advanced);
        take(&mut self.required, &other.required);
        take(&mut self.multiline, &other.multiline);
        take(&mut self.placeholder, &other.placeholder);
        take(&mut self.options, &other.options);
        take(&mut self.value, &other.value);
        take(&mut self.field_type, &other.field_type);
        take(&mut self.is_list, &other.is_list);
        take(&mut self.dynamic, &other.dynamic);
        take(&mut self.refresh, &other.refresh);
    }

    pub fn apply(&self, field: &mut TemplateField) {
        if let Some(field_type) = &self.field_type {
            let info = TypeInfo::analyze(field_type);
            field.type_name = info.type_name;
            field.is_list = info.is_list;
            field.kind = FieldKind::for_type(&field.type_name, !field.options.is_empty());
        }
        if let Some(display_name) = &self.display_name {
            field.display_name = display_name.clone();
        }
        if let Some(info) = &self.info {
            field.info_text = info.clone();
        }
        if let Some(password) = self.password {
            field.is_password = password;
        }
        if let Some(show) = self.show {
            field.show = show;
        }
        if let Some(advanced) = self.advanced {
            field.advanced = advanced;
        }
        if let Some(required) = self.required {
            field.required = required;
        }
        if let Some(multiline) = self.multiline {
            field.multiline = multiline;
        }
        if let Some(placeholder) = &self.placeholder {
            field.placeholder = placeholder.clone();
        }
        if let Some(options) = &self.options {
            field.set_options(options.clone());
        }
        if let Some(value) = &self.value {
            field.default_value = value.clone();
        }
        if let Some(is_list) = self.is_list {
            field.is_list = is_list;
        }
        if let Some(dynamic) = self.dynamic {
            field.dynamic = dynamic;
        }
        if let Some(refresh) = self.refresh {
            field.refresh = refresh;
        }
    }
}

/// Field name to configuration, in the order fields were configured.
pub type Overrides = IndexMap<String, FieldConfig>;

/// Reads a `{field: {key: value}}` object. Anything that is not an object
/// yields no overrides.
pub fn overrides_from_json(json: &Json) -> Overrides {
    let Json::Object(fields) = json else {
        if !json.is_null() {
            warn!(kind = json_kind(json), "field config is not an object");
        }
        return Overrides::new();
    };

    fields
        .iter()
        .filter_map(|(name, config)| FieldConfig::from_json(name, config).map(|config| (name.clone(), config)))
        .collect()
}

/// Layers overrides; later layers win attribute by attribute.
pub fn merge_overrides<'a>(layers: impl IntoIterator<Item = &'a Overrides>) -> Overrides {
    let mut merged = Overrides::new();
    for layer in layers {
        for (name, config) in layer {
            merged.entry(name.clone()).or_default().merge(config);
        }
    }
    merged
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
