#[cfg(test)]
mod runtime_tests {
    use serde_json::json;

    use crate::analysis::MainClassPolicy;
    use crate::execution_engine::{compile_and_bind, compile_and_bind_with, EngineError};
    use crate::interpreter::Value;

    #[test]
    fn test_function_entrypoint() {
        let mut runnable = compile_and_bind("def build(x: int, y: int = 2):\n    return x * y\n", "build").unwrap();
        assert!(runnable.instance().is_none());
        let result = runnable.call(vec![("x".to_string(), Value::Int(3))]).unwrap();
        assert!(matches!(result, Value::Int(6)));
    }

    #[test]
    fn test_method_entrypoint_binds_instance() {
        let source = r#"
from langflow import CustomComponent

class Echo(CustomComponent):
    prefix = ">"

    def build(self, text: str) -> str:
        self.status = text
        print("echoing", text)
        return self.prefix + text
"#;
        let mut runnable = compile_and_bind(source, "build").unwrap();
        assert!(runnable.instance().is_some());
        assert_eq!(runnable.call_json(&json!({"text": "hi"})).unwrap(), json!(">hi"));
        assert_eq!(runnable.status(), Some(json!("hi")));
        assert_eq!(runnable.output(), vec!["echoing hi"]);
        assert_eq!(runnable.call_hook("build_config", Vec::new()).unwrap().to_json(), json!({}));
    }

    #[test]
    fn test_call_json_rejects_non_objects() {
        let mut runnable = compile_and_bind("def build():\n    return 1\n", "build").unwrap();
        assert_eq!(runnable.call_json(&json!(null)).unwrap(), json!(1));
        assert!(matches!(runnable.call_json(&json!([1])), Err(EngineError::Invocation { .. })));
    }

    #[test]
    fn test_empty_and_invalid_source() {
        assert!(matches!(compile_and_bind("  \n\t", "build"), Err(EngineError::EmptySource)));
        match compile_and_bind("def build(:\n", "build") {
            Err(EngineError::Syntax(err)) => assert_eq!(err.line, 1),
            _ => panic!("expected a syntax error"),
        }
    }

    #[test]
    fn test_missing_entrypoint() {
        match compile_and_bind("x = 1\n", "build") {
            Err(EngineError::EntrypointMissing { name }) => assert_eq!(name, "build"),
            _ => panic!("expected a missing entrypoint"),
        }
        assert!(matches!(
            compile_and_bind("build = 3\n", "build"),
            Err(EngineError::EntrypointMissing { .. })
        ));
    }

    #[test]
    fn test_errors_keep_their_message() {
        let mut runnable = compile_and_bind("def build():\n    raise ValueError('boom')\n", "build").unwrap();
        assert_eq!(
            runnable.call(Vec::new()).unwrap_err(),
            EngineError::Invocation {
                message: "boom".to_string()
            }
        );

        match compile_and_bind("raise RuntimeError('at import')\n", "build") {
            Err(EngineError::Invocation { message }) => assert_eq!(message, "at import"),
            _ => panic!("expected an invocation error"),
        }
    }

    #[test]
    fn test_compiles_do_not_share_module_state() {
        let source = r#"
calls = []

def build():
    calls.append(1)
    return len(calls)
"#;
        let mut first = compile_and_bind(source, "build").unwrap();
        assert!(matches!(first.call(Vec::new()).unwrap(), Value::Int(1)));
        assert!(matches!(first.call(Vec::new()).unwrap(), Value::Int(2)));

        let mut second = compile_and_bind(source, "build").unwrap();
        assert!(matches!(second.call(Vec::new()).unwrap(), Value::Int(1)));
    }

    #[test]
    fn test_main_class_policy_picks_component_subclass() {
        let source = r#"
from langflow import CustomComponent

class Helper:
    def build(self):
        return "helper"

class Real(CustomComponent):
    def build(self):
        return "real"
"#;
        let mut first = compile_and_bind(source, "build").unwrap();
        assert_eq!(first.call_json(&json!({})).unwrap(), json!("helper"));

        let policy = MainClassPolicy::ComponentSubclass {
            base: "CustomComponent".to_string(),
        };
        let mut subclass = compile_and_bind_with(source, "build", &policy).unwrap();
        assert_eq!(subclass.call_json(&json!({})).unwrap(), json!("real"));
    }

    #[test]
    fn test_entrypoint_on_a_later_class() {
        let source = r#"
class A:
    pass

class B:
    def build(self, x: int):
        return x + 1
"#;
        let mut runnable = compile_and_bind(source, "build").unwrap();
        assert!(runnable.instance().is_some());
        assert_eq!(runnable.call_json(&json!({"x": 1})).unwrap(), json!(2));
    }

    #[test]
    fn test_declared_function_wins_over_inherited_method() {
        let source = r#"
from langflow import CustomComponent

class Empty(CustomComponent):
    pass

def build():
    return "function"
"#;
        let mut runnable = compile_and_bind(source, "build").unwrap();
        assert!(runnable.instance().is_none());
        assert_eq!(runnable.call_json(&json!({})).unwrap(), json!("function"));
    }

    #[test]
    fn test_inherited_build_raises_not_implemented() {
        let source = "from langflow import CustomComponent\n\nclass Empty(CustomComponent):\n    pass\n";
        let mut runnable = compile_and_bind(source, "build").unwrap();
        match runnable.call(Vec::new()) {
            Err(EngineError::Invocation { message }) => assert!(message.contains("must be implemented")),
            _ => panic!("expected NotImplementedError"),
        }
    }
}

#[cfg(test)]
mod config_tests {
    use crate::analysis::MainClassPolicy;
    use crate::execution_engine::{EngineConfig, EngineError, PolicyKind};

    #[test]
    fn test_missing_keys_take_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.entrypoint_name, "build");
        assert!(config.include_code_field);
        assert_eq!(config.policy(), MainClassPolicy::FirstDeclared);
    }

    #[test]
    fn test_policy_kind() {
        let config =
            EngineConfig::from_json_str(r#"{"main_class_policy": "component_subclass", "component_base": "Base"}"#).unwrap();
        assert_eq!(config.main_class_policy, PolicyKind::ComponentSubclass);
        assert_eq!(
            config.policy(),
            MainClassPolicy::ComponentSubclass {
                base: "Base".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_config() {
        assert!(matches!(EngineConfig::from_json_str("{"), Err(EngineError::Config(_))));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"main_class_policy": "newest"}"#),
            Err(EngineError::Config(_))
        ));
    }
}
