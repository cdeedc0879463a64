#[cfg(test)]
mod component_tests {
    use serde_json::json;

    use crate::component::ComponentSpec;

    #[test]
    fn test_model_is_cached_until_source_changes() {
        let mut spec = ComponentSpec::new("def build(x: int):\n    return x\n");
        assert!(!spec.is_model_cached());
        assert_eq!(spec.model().unwrap().functions[0].name, "build");
        assert!(spec.is_model_cached());

        spec.set_source("def run():\n    pass\n");
        assert!(!spec.is_model_cached());
        assert_eq!(spec.model().unwrap().functions[0].name, "run");
    }

    #[test]
    fn test_syntax_errors_are_cached_too() {
        let spec = ComponentSpec::new("def build(:\n");
        let first = spec.model().unwrap_err();
        let second = spec.model().unwrap_err();
        assert_eq!(first, second);
        assert_eq!(first.line, 1);
    }

    #[test]
    fn test_builders_and_field_values() {
        let mut spec = ComponentSpec::new("x = 1").with_entrypoint("run");
        spec.set_field_value("model", json!("gpt"));
        assert_eq!(spec.entrypoint_name(), "run");
        assert_eq!(spec.field_values().get("model"), Some(&json!("gpt")));
        assert!(spec.overrides().is_empty());
    }
}
