//! The program model: what static analysis knows about a submission.
//!
//! Every value that came from source (annotations, defaults, assigned values)
//! is kept as canonical source text. Nothing here is evaluated.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgramModel {
    pub imports: Vec<ImportRecord>,
    pub functions: Vec<FunctionRecord>,
    pub classes: Vec<ClassRecord>,
    pub global_vars: Vec<VarRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportRecord {
    /// `import module [as alias]`
    Module { module: String, alias: Option<String> },
    /// `from module import name [as alias]`
    From {
        module: String,
        name: String,
        alias: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionRecord {
    pub name: String,
    pub args: Vec<ArgRecord>,
    pub return_types: Vec<String>,
    pub is_constructor: bool,
    pub decorators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgRecord {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassRecord {
    pub name: String,
    pub bases: Vec<String>,
    pub attributes: Vec<AttributeRecord>,
    pub methods: Vec<FunctionRecord>,
    pub init: Option<FunctionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeRecord {
    pub name: String,
    pub annotation: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarRecord {
    pub targets: Vec<String>,
    pub value: String,
    pub annotation: Option<String>,
}

impl ProgramModel {
    pub fn class(&self, name: &str) -> Option<&ClassRecord> {
        self.classes.iter().find(|class| class.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionRecord> {
        self.functions.iter().find(|function| function.name == name)
    }
}

impl ClassRecord {
    pub fn method(&self, name: &str) -> Option<&FunctionRecord> {
        self.methods.iter().find(|method| method.name == name)
    }

    /// The last assignment to `name` in the class body wins, as it would at runtime.
    pub fn attribute(&self, name: &str) -> Option<&AttributeRecord> {
        self.attributes.iter().rev().find(|attribute| attribute.name == name)
    }

    /// True when `base` appears among the bases, either bare or as the last
    /// segment of a dotted path.
    pub fn inherits(&self, base: &str) -> bool {
        self.bases
            .iter()
            .any(|candidate| candidate == base || candidate.rsplit('.').next() == Some(base))
    }
}
