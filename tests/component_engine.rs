use component_engine::execution_engine::DEFAULT_COMPONENT_CODE;
use component_engine::template::{overrides_from_json, FieldKind};
use component_engine::{ComponentEngine, ComponentSpec, EngineError};
use proptest::prelude::*;
use serde_json::{json, Map, Value as Json};

const PICKER: &str = r#"
from langflow import CustomComponent

class Picker(CustomComponent):
    display_name = "Model Picker"
    field_config = {
        "provider": {"options": ["a", "b"], "real_time_refresh": True},
        "model": {"dynamic": True},
        "api_key": {"password": True, "display_name": "API Key"},
        "code": {"show": False},
    }

    def update_build_config(self, build_config, field_name, field_values):
        provider = field_values.get("provider", "a")
        build_config["model"]["options"] = [provider + "-small", provider + "-large"]
        build_config["temperature"]["value"] = 9.5
        return build_config

    def build(self, provider: str = "a", model: str = "", api_key: str = "", temperature: float = 0.5) -> str:
        return provider + ":" + model
"#;

fn values(pairs: &[(&str, Json)]) -> Map<String, Json> {
    pairs.iter().map(|(name, value)| (name.to_string(), value.clone())).collect()
}

#[test]
fn test_parse_is_deterministic_and_keeps_literal_text() {
    let engine = ComponentEngine::default();
    let first = engine.parse("x = 1\n").unwrap();
    assert_eq!(first, engine.parse("x = 1\n").unwrap());
    assert_eq!(first.global_vars[0].targets, vec!["x"]);
    assert_eq!(first.global_vars[0].value, "1");
}

#[test]
fn test_malformed_fragment_is_a_syntax_error() {
    let engine = ComponentEngine::default();
    assert!(matches!(engine.parse("zzz import os"), Err(EngineError::Syntax(_))));
}

#[test]
fn test_entrypoint_args_keep_declaration_order() {
    let source = r#"
class Loader(Base):
    def build(self, url: str, llm: BaseLLM, template: PromptTemplate) -> Document:
        pass
"#;
    let engine = ComponentEngine::default();
    let args = engine.get_entrypoint_args(source, "build");
    assert_eq!(args.len(), 4);
    assert_eq!(args[1].name, "url");
    assert_eq!(args[1].type_name.as_deref(), Some("str"));
    assert_eq!(engine.get_entrypoint_return_types(source, "build"), vec!["Document"]);
    assert_eq!(engine.get_main_class_name(source), "Loader");
}

#[test]
fn test_function_only_source_has_no_main_class() {
    let engine = ComponentEngine::default();
    let source = "def build(x):\n    return x\n";
    assert_eq!(engine.get_main_class_name(source), "");
    assert!(engine.get_entrypoint_return_types(source, "build").is_empty());
    assert!(engine.get_entrypoint_args("def build(:", "build").is_empty());
}

#[test]
fn test_runnable_from_one_line_function() {
    let engine = ComponentEngine::default();
    assert!(matches!(engine.get_runnable("", "build"), Err(EngineError::EmptySource)));
    let mut runnable = engine.get_runnable("def build(): pass", "build").unwrap();
    assert_eq!(runnable.call_json(&json!({})).unwrap(), Json::Null);
}

#[test]
fn test_template_and_runnable_agree_on_entrypoint() {
    let source = r#"
class A:
    pass

class B:
    def build(self, x: int) -> int:
        return x * 10
"#;
    let engine = ComponentEngine::default();
    let args = engine.get_entrypoint_args(source, "build");
    assert_eq!(args.iter().map(|arg| arg.name.as_str()).collect::<Vec<_>>(), vec!["self", "x"]);
    assert_eq!(engine.get_main_class_name(source), "A");

    let template = engine.build_template(&engine.spec(source), None).unwrap();
    assert_eq!(template.keys().collect::<Vec<_>>(), vec!["x"]);

    let mut runnable = engine.get_runnable(source, "build").unwrap();
    assert_eq!(runnable.call_json(&json!({"x": 4})).unwrap(), json!(40));
}

#[test]
fn test_deeply_nested_submission_is_rejected() {
    let engine = ComponentEngine::default();
    let source = format!("x = {}1{}\n", "[".repeat(2_000), "]".repeat(2_000));
    assert!(matches!(engine.parse(&source), Err(EngineError::Syntax(_))));
    assert!(matches!(engine.get_runnable(&source, "build"), Err(EngineError::Syntax(_))));
    assert!(engine.get_entrypoint_args(&source, "build").is_empty());
    assert!(matches!(engine.build_template(&engine.spec(source), None), Err(EngineError::Syntax(_))));
}

#[test]
fn test_huge_slice_step_stays_inside_the_runtime() {
    let engine = ComponentEngine::default();
    let source = "def build():\n    x = [1, 2, 3]\n    return x[2::9223372036854775807]\n";
    let mut runnable = engine.get_runnable(source, "build").unwrap();
    assert_eq!(runnable.call_json(&json!({})).unwrap(), json!([3]));
}

#[test]
fn test_field_config_reaches_template() {
    let engine = ComponentEngine::default();
    let spec = engine.spec(PICKER);
    let template = engine.build_template(&spec, None).unwrap();

    assert_eq!(
        template.keys().collect::<Vec<_>>(),
        vec!["provider", "model", "api_key", "temperature", "code"]
    );
    assert_eq!(template["provider"].kind, FieldKind::Dropdown);
    assert!(template["provider"].refresh);
    assert!(template["api_key"].is_password);
    assert_eq!(template["api_key"].display_name, "API Key");
    assert_eq!(template["temperature"].kind, FieldKind::Number);
    assert!(!template["code"].show);
}

#[test]
fn test_rebuild_tracks_current_values() {
    let engine = ComponentEngine::default();
    let static_template = engine.build_template(&engine.spec(PICKER), None).unwrap();
    assert!(static_template["model"].options.is_empty());

    let spec = engine.spec(PICKER).with_field_values(values(&[("provider", json!("b"))]));
    let first = engine.build_template(&spec, Some("provider")).unwrap();
    assert_eq!(first["model"].options, vec![json!("b-small"), json!("b-large")]);
    assert_eq!(first["model"].kind, FieldKind::Dropdown);

    let spec = engine.spec(PICKER).with_field_values(values(&[("provider", json!("c"))]));
    let second = engine.build_template(&spec, Some("provider")).unwrap();
    assert_eq!(second["model"].options, vec![json!("c-small"), json!("c-large")]);
    assert_ne!(first["model"].options, second["model"].options);
}

#[test]
fn test_rebuild_leaves_static_fields_alone() {
    let engine = ComponentEngine::default();
    let spec = engine.spec(PICKER).with_field_values(values(&[("provider", json!("b"))]));
    let rebuilt = engine.build_template(&spec, Some("provider")).unwrap();
    assert_eq!(rebuilt["temperature"].default_value, json!(0.5));
    assert_eq!(rebuilt["api_key"], engine.build_template(&spec, None).unwrap()["api_key"]);
}

#[test]
fn test_rebuild_rejects_non_dict_hooks() {
    let source = r#"
class Broken:
    def update_build_config(self, build_config, field_name, field_values):
        return 3

    def build(self, x: str):
        return x
"#;
    let engine = ComponentEngine::default();
    match engine.build_template(&engine.spec(source), Some("x")) {
        Err(EngineError::Invocation { message }) => assert!(message.contains("must return a dict")),
        other => panic!("expected an invocation error, got {:?}", other),
    }
}

#[test]
fn test_caller_overrides_win() {
    let engine = ComponentEngine::default();
    let spec = engine
        .spec(PICKER)
        .with_overrides(overrides_from_json(&json!({"api_key": {"display_name": "Key"}})));
    let template = engine.build_template(&spec, None).unwrap();
    assert_eq!(template["api_key"].display_name, "Key");
    assert!(template["api_key"].is_password);
}

#[test]
fn test_default_component_builds_a_node() {
    let engine = ComponentEngine::default();
    let node = engine.build_frontend_node(&engine.spec(DEFAULT_COMPONENT_CODE)).unwrap();
    assert_eq!(node.display_name, "Custom Component");
    assert_eq!(node.main_class, "Component");
    assert_eq!(node.output_types, vec!["Data"]);
    assert!(node.beta);
    assert_eq!(node.template["param"].display_name, "Parameter");
    assert_eq!(node.template["param"].kind, FieldKind::Handle);
    assert_eq!(node.template["code"].kind, FieldKind::Code);
    assert_eq!(node.template["code"].default_value, json!(DEFAULT_COMPONENT_CODE));

    let mut runnable = engine.get_runnable(DEFAULT_COMPONENT_CODE, "build").unwrap();
    assert_eq!(runnable.call_json(&json!({"param": [1, 2]})).unwrap(), json!([1, 2]));
}

#[test]
fn test_spec_caches_its_model_until_source_changes() {
    let mut spec = ComponentSpec::new("def build(a: int):\n    return a\n");
    assert!(!spec.is_model_cached());
    assert_eq!(spec.model().unwrap().functions.len(), 1);
    assert!(spec.is_model_cached());
    spec.set_source("x = (");
    assert!(!spec.is_model_cached());
    assert!(spec.model().is_err());
}

proptest! {
    #[test]
    fn prop_parse_is_deterministic(
        names in prop::collection::vec("[a-z][a-z0-9_]{0,6}", 1..5),
        values in prop::collection::vec(-1000i64..1000, 1..5),
    ) {
        let mut source = String::new();
        for (name, value) in names.iter().zip(values.iter()) {
            source.push_str(&format!("v_{} = {}\n", name, value));
            source.push_str(&format!("def f_{}(a: int = {}) -> int:\n    return a\n", name, value));
        }
        let engine = ComponentEngine::default();
        let first = engine.parse(&source);
        let second = engine.parse(&source);
        prop_assert!(first.is_ok());
        prop_assert_eq!(first, second);
    }
}
