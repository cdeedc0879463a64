//! Template building with the component's own hooks in the loop.
//!
//! The static template comes from the signature plus three override layers:
//! the main class's literal `field_config`, its `build_config()` result and the
//! caller's overrides. A reactive rebuild then asks the component for fresh
//! options. Nothing is cached between calls, so option lists always reflect
//! the current source and field values.

use serde_json::{Map, Value as Json};
use tracing::{debug, warn};

use super::config::{merge_overrides, overrides_from_json, Overrides};
use super::synthesizer::synthesize;
use super::Template;
use crate::analysis::{literal_eval, resolve, ArgsView, ClassRecord};
use crate::component::ComponentSpec;
use crate::execution_engine::runtime::CompiledModule;
use crate::execution_engine::{EngineConfig, EngineError};
use crate::interpreter::Value;

fn class_field_config(class: &ClassRecord) -> Overrides {
    let Some(attribute) = class.attribute("field_config") else {
        return Overrides::new();
    };
    match literal_eval(&attribute.value) {
        Some(json) => overrides_from_json(&json),
        None => {
            warn!(class = %class.name, value = %attribute.value, "field_config is not a literal; ignoring it");
            Overrides::new()
        }
    }
}

fn hook_overrides(module: &mut CompiledModule) -> Result<Overrides, EngineError> {
    let Some(instance) = module.instantiate_main()? else {
        return Ok(Overrides::new());
    };
    let result = module.call_method(&instance, "build_config", Vec::new())?;
    Ok(overrides_from_json(&result.to_json()))
}

/// The template for the component's current source, without reactive updates.
pub fn static_template(config: &EngineConfig, spec: &ComponentSpec) -> Result<Template, EngineError> {
    if spec.source().trim().is_empty() {
        return Err(EngineError::EmptySource);
    }
    let model = spec.model()?;
    let policy = config.policy();
    let signature = resolve(model, spec.entrypoint_name(), &policy);

    let mut layers = Vec::new();
    if let Some(class) = model.class(&signature.main_class_name) {
        layers.push(class_field_config(class));
        if class.method("build_config").is_some() {
            let mut module = CompiledModule::compile(spec.source(), spec.entrypoint_name(), &policy)?;
            layers.push(hook_overrides(&mut module)?);
        }
    }
    layers.push(spec.overrides().clone());

    let overrides = merge_overrides(&layers);
    let template = synthesize(&signature.args(ArgsView::Bound), &overrides);
    debug!(
        fields = template.len(),
        main_class = %signature.main_class_name,
        found = signature.found,
        "built static template"
    );
    Ok(template)
}

/// Rebuilds after `changed_field` changed in the editor. The changed field
/// and every dynamic or refreshing field take `options` and `value` from the
/// component's hook; all other fields are returned as the static path built
/// them.
pub fn rebuild(
    config: &EngineConfig,
    spec: &ComponentSpec,
    changed_field: &str,
    current_values: &Map<String, Json>,
) -> Result<Template, EngineError> {
    let mut template = static_template(config, spec)?;

    let policy = config.policy();
    let mut module = CompiledModule::compile(spec.source(), spec.entrypoint_name(), &policy)?;
    let Some(instance) = module.instantiate_main()? else {
        debug!("no main class; nothing to refresh");
        return Ok(template);
    };

    let defines_update = spec
        .model()?
        .class(module.main_class_name())
        .is_some_and(|class| class.method("update_build_config").is_some());
    let result = if defines_update {
        let build_config = serde_json::to_value(&template).map_err(|err| EngineError::Invocation {
            message: err.to_string(),
        })?;
        let arguments = vec![
            Value::from_json(&build_config),
            Value::str(changed_field),
            Value::from_json(&Json::Object(current_values.clone())),
        ];
        module.call_method(&instance, "update_build_config", arguments)?
    } else {
        module.call_method(&instance, "build_config", Vec::new())?
    };

    let Json::Object(updates) = result.to_json() else {
        return Err(EngineError::Invocation {
            message: format!("build config hook must return a dict, not {}", result.type_name()),
        });
    };

    let mut refreshed = 0;
    for (name, field) in template.iter_mut() {
        if name != changed_field && !field.is_reactive() {
            continue;
        }
        let Some(Json::Object(update)) = updates.get(name) else {
            continue;
        };
        if let Some(Json::Array(options)) = update.get("options") {
            field.set_options(options.clone());
        }
        if let Some(value) = update.get("value") {
            field.default_value = value.clone();
        }
        refreshed += 1;
    }
    debug!(changed_field, refreshed, "rebuilt template");
    Ok(template)
}
