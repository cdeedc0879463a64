//! Entrypoint and main-class resolution over a [`ProgramModel`].
//!
//! Resolution never fails: a submission still being written may not declare
//! its entrypoint yet, and callers get empty results instead of an error.

use serde::{Deserialize, Serialize};

use super::model::{ArgRecord, ClassRecord, FunctionRecord, ProgramModel};

/// How the main class is chosen when a submission declares several classes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MainClassPolicy {
    /// The first class in declaration order.
    #[default]
    FirstDeclared,
    /// The first class that inherits `base` and defines the entrypoint method.
    ComponentSubclass { base: String },
}

/// Which parameter list a caller wants for a method entrypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgsView {
    /// The signature exactly as written, receiver included.
    Raw,
    /// The receiver (`self` or `cls`) stripped.
    Bound,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntrypointSignature {
    pub args: Vec<ArgRecord>,
    pub return_types: Vec<String>,
    pub main_class_name: String,
    /// Class that owns the entrypoint method; `None` for a top-level function
    /// or when no entrypoint was found.
    pub owner: Option<String>,
    pub found: bool,
}

impl EntrypointSignature {
    pub fn args(&self, view: ArgsView) -> Vec<ArgRecord> {
        match view {
            ArgsView::Raw => self.args.clone(),
            ArgsView::Bound => {
                let skip = self.owner.is_some()
                    && self
                        .args
                        .first()
                        .map(|arg| arg.name == "self" || arg.name == "cls")
                        .unwrap_or(false);
                self.args.iter().skip(usize::from(skip)).cloned().collect()
            }
        }
    }
}

pub fn select_main_class<'m>(
    model: &'m ProgramModel,
    entrypoint_name: &str,
    policy: &MainClassPolicy,
) -> Option<&'m ClassRecord> {
    match policy {
        MainClassPolicy::FirstDeclared => model.classes.first(),
        MainClassPolicy::ComponentSubclass { base } => model
            .classes
            .iter()
            .find(|class| class.inherits(base) && class.method(entrypoint_name).is_some()),
    }
}

/// Locates the entrypoint: methods first, main class before the others in
/// declaration order, then a top-level function of the same name.
pub fn find_entrypoint<'m>(
    model: &'m ProgramModel,
    entrypoint_name: &str,
    main_class: Option<&'m ClassRecord>,
) -> Option<(Option<&'m ClassRecord>, &'m FunctionRecord)> {
    let main_first = main_class.into_iter().chain(
        model
            .classes
            .iter()
            .filter(|class| !main_class.map(|main| std::ptr::eq(main, *class)).unwrap_or(false)),
    );

    for class in main_first {
        if let Some(method) = class.method(entrypoint_name) {
            return Some((Some(class), method));
        }
    }

    model.function(entrypoint_name).map(|function| (None, function))
}

pub fn resolve(model: &ProgramModel, entrypoint_name: &str, policy: &MainClassPolicy) -> EntrypointSignature {
    let main_class = select_main_class(model, entrypoint_name, policy);
    let main_class_name = main_class.map(|class| class.name.clone()).unwrap_or_default();

    match find_entrypoint(model, entrypoint_name, main_class) {
        Some((owner, function)) => EntrypointSignature {
            args: function.args.clone(),
            return_types: function.return_types.clone(),
            main_class_name,
            owner: owner.map(|class| class.name.clone()),
            found: true,
        },
        None => EntrypointSignature {
            main_class_name,
            ..EntrypointSignature::default()
        },
    }
}
