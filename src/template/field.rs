use serde::Serialize;
use serde_json::Value as Json;

/// Widget an editor renders for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Toggle,
    Number,
    Dropdown,
    Dict,
    Code,
    /// A connection to another component's output.
    Handle,
}

impl FieldKind {
    /// Kind for a (stripped, non-container) type name.
    pub fn for_type(type_name: &str, has_options: bool) -> Self {
        let head = type_name.split('[').next().unwrap_or(type_name).trim();
        match head {
            "str" if has_options => FieldKind::Dropdown,
            "str" => FieldKind::Text,
            "bool" => FieldKind::Toggle,
            "int" | "float" => FieldKind::Number,
            "dict" | "Dict" => FieldKind::Dict,
            "code" => FieldKind::Code,
            _ => FieldKind::Handle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateField {
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub is_list: bool,
    pub advanced: bool,
    pub show: bool,
    #[serde(rename = "value")]
    pub default_value: Json,
    pub options: Vec<Json>,
    #[serde(rename = "info")]
    pub info_text: String,
    #[serde(rename = "password")]
    pub is_password: bool,
    pub multiline: bool,
    pub placeholder: String,
    pub dynamic: bool,
    pub refresh: bool,
}

impl TemplateField {
    /// A visible, optional text field with nothing else set.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        TemplateField {
            display_name: name.clone(),
            name,
            type_name: "str".to_string(),
            kind: FieldKind::Text,
            required: false,
            is_list: false,
            advanced: false,
            show: true,
            default_value: Json::Null,
            options: Vec::new(),
            info_text: String::new(),
            is_password: false,
            multiline: false,
            placeholder: String::new(),
            dynamic: false,
            refresh: false,
        }
    }

    /// Fields whose options are recomputed on every reactive rebuild.
    pub fn is_reactive(&self) -> bool {
        self.dynamic || self.refresh
    }

    /// Replaces the options, turning a text field into a dropdown when any
    /// are offered.
    pub fn set_options(&mut self, options: Vec<Json>) {
        self.options = options;
        if self.kind == FieldKind::Text && !self.options.is_empty() {
            self.kind = FieldKind::Dropdown;
        }
    }
}
