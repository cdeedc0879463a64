#[cfg(test)]
mod extractor_tests {
    use crate::analysis::{extract, ImportRecord};

    const COMPONENT: &str = r#"
from langflow import CustomComponent
from langflow.field_typing import BaseLLM, Prompt, Document
import requests as rq

DEFAULT_URL = "https://example.com"
retries: int = 3

class YourComponent(CustomComponent):
    display_name: str = "Your Component"
    description = 'Does things'
    field_config = {"url": {"multiline": True, "required": True}}

    def __init__(self, **data):
        pass

    def build(self, url: str, llm: BaseLLM, template: Prompt) -> Document:
        response = rq.get(url)
        return Document(page_content=response.text)
"#;

    #[test]
    fn test_imports_keep_module_and_name() {
        let model = extract(COMPONENT).unwrap();
        assert_eq!(
            model.imports[0],
            ImportRecord::From {
                module: "langflow".to_string(),
                name: "CustomComponent".to_string(),
                alias: None,
            }
        );
        assert_eq!(model.imports.len(), 5);
        assert_eq!(
            model.imports[4],
            ImportRecord::Module {
                module: "requests".to_string(),
                alias: Some("rq".to_string()),
            }
        );
    }

    #[test]
    fn test_class_members() {
        let model = extract(COMPONENT).unwrap();
        let class = &model.classes[0];

        assert_eq!(class.name, "YourComponent");
        assert_eq!(class.bases, vec!["CustomComponent".to_string()]);
        assert_eq!(class.methods.len(), 2);
        assert!(class.methods[0].is_constructor);
        assert!(!class.methods[1].is_constructor);
        assert_eq!(class.init.as_ref().map(|init| init.name.as_str()), Some("__init__"));

        let display_name = class.attribute("display_name").unwrap();
        assert_eq!(display_name.annotation.as_deref(), Some("str"));
        assert_eq!(display_name.value, "'Your Component'");
        assert_eq!(
            class.attribute("field_config").unwrap().value,
            "{'url': {'multiline': True, 'required': True}}"
        );
    }

    #[test]
    fn test_method_signature() {
        let model = extract(COMPONENT).unwrap();
        let build = &model.classes[0].methods[1];

        let names: Vec<&str> = build.args.iter().map(|arg| arg.name.as_str()).collect();
        assert_eq!(names, vec!["self", "url", "llm", "template"]);
        assert_eq!(build.args[0].type_name, None);
        assert_eq!(build.args[1].type_name.as_deref(), Some("str"));
        assert_eq!(build.return_types, vec!["Document".to_string()]);

        let init = &model.classes[0].methods[0];
        assert_eq!(init.args[1].name, "**data");
    }

    #[test]
    fn test_global_vars() {
        let model = extract("x = 1\na, (b, c) = 1, (2, 3)\nlimit: int\n").unwrap();

        assert_eq!(model.global_vars[0].targets, vec!["x".to_string()]);
        assert_eq!(model.global_vars[0].value, "1");
        assert_eq!(model.global_vars[1].targets, vec!["a", "b", "c"]);
        assert_eq!(model.global_vars[1].value, "(1, (2, 3))");
        assert_eq!(model.global_vars[2].value, "");
        assert_eq!(model.global_vars[2].annotation.as_deref(), Some("int"));
    }

    #[test]
    fn test_return_type_unions() {
        let model = extract(
            "def a() -> Union[Data, Document]:\n    pass\ndef b() -> str | None:\n    pass\ndef c():\n    pass\ndef d() -> List[str]:\n    pass\n",
        )
        .unwrap();

        assert_eq!(model.functions[0].return_types, vec!["Data", "Document"]);
        assert_eq!(model.functions[1].return_types, vec!["str", "None"]);
        assert!(model.functions[2].return_types.is_empty());
        assert_eq!(model.functions[3].return_types, vec!["List[str]"]);
    }

    #[test]
    fn test_defaults_are_canonical_text() {
        let model = extract("def build(a: Optional[List[str]] = None, b=\"x\", c=-1, d={'k': [1, 2]}):\n    pass\n").unwrap();
        let args = &model.functions[0].args;

        assert_eq!(args[0].type_name.as_deref(), Some("Optional[List[str]]"));
        assert_eq!(args[0].default.as_deref(), Some("None"));
        assert_eq!(args[1].default.as_deref(), Some("'x'"));
        assert_eq!(args[2].default.as_deref(), Some("-1"));
        assert_eq!(args[3].default.as_deref(), Some("{'k': [1, 2]}"));
    }

    #[test]
    fn test_serialized_arg_omits_absent_keys() {
        let model = extract("def build(self, url: str = 'a'):\n    pass\n").unwrap();
        let args = serde_json::to_value(&model.functions[0].args).unwrap();

        assert_eq!(args[0], serde_json::json!({"name": "self"}));
        assert_eq!(args[1], serde_json::json!({"name": "url", "type": "str", "default": "'a'"}));
    }

    #[test]
    fn test_empty_source_is_empty_model() {
        let model = extract("").unwrap();
        assert!(model.imports.is_empty());
        assert!(model.functions.is_empty());
        assert!(model.classes.is_empty());
        assert!(model.global_vars.is_empty());
    }

    #[test]
    fn test_syntax_errors() {
        let err = extract("zzz import os").unwrap_err();
        assert_eq!(err.line, 1);

        let err = extract("x = 'unterminated\n").unwrap_err();
        assert_eq!(err.line, 1);

        assert!(extract("def build(self)\n    pass\n").is_err());
    }

    #[test]
    fn test_source_saved_with_byte_order_mark() {
        let model = extract("\u{feff}x = 1\n\ndef build(a: int):\n    return a\n").unwrap();
        assert_eq!(model.global_vars[0].targets, vec!["x"]);
        assert_eq!(model.global_vars[0].value, "1");
        assert_eq!(model.functions[0].name, "build");

        let err = extract("\u{feff}$").unwrap_err();
        assert_eq!((err.line, err.column), (1, 1));
    }

    #[test]
    fn test_deeply_bracketed_source_is_a_syntax_error() {
        assert!(extract(&format!("x = {}\n", "[".repeat(100_000))).is_err());
        assert!(extract(&format!("x = {}1{}\n", "(".repeat(50_000), ")".repeat(50_000))).is_err());
        let args = format!("def build(self, x={}1{}):\n    pass\n", "[".repeat(5_000), "]".repeat(5_000));
        assert!(extract(&args).is_err());
    }

    #[test]
    fn test_statements_outside_the_model_must_still_parse() {
        let model = extract("if True:\n    print('hi')\nfor i in range(3):\n    x = i\n").unwrap();
        assert!(model.global_vars.is_empty());
        assert!(extract("if True:\n    print('hi'\n").is_err());
    }
}

#[cfg(test)]
mod entrypoint_tests {
    use crate::analysis::{extract, resolve, ArgsView, MainClassPolicy};

    #[test]
    fn test_method_entrypoint_views() {
        let model = extract(
            "class Foo(Base):\n    def build(self, url: str, llm, template) -> Document:\n        pass\n",
        )
        .unwrap();
        let signature = resolve(&model, "build", &MainClassPolicy::FirstDeclared);

        assert!(signature.found);
        assert_eq!(signature.main_class_name, "Foo");
        assert_eq!(signature.owner.as_deref(), Some("Foo"));

        let raw = signature.args(ArgsView::Raw);
        assert_eq!(raw.len(), 4);
        assert_eq!(raw[1].name, "url");

        let bound = signature.args(ArgsView::Bound);
        assert_eq!(bound.len(), 3);
        assert_eq!(bound[0].name, "url");
    }

    #[test]
    fn test_top_level_function_entrypoint() {
        let model = extract("def build(x: int, self=None):\n    return x\n").unwrap();
        let signature = resolve(&model, "build", &MainClassPolicy::FirstDeclared);

        assert!(signature.found);
        assert_eq!(signature.main_class_name, "");
        assert_eq!(signature.owner, None);
        assert_eq!(signature.args(ArgsView::Raw), signature.args(ArgsView::Bound));
    }

    #[test]
    fn test_missing_entrypoint_is_empty() {
        let model = extract("class Foo:\n    pass\n").unwrap();
        let signature = resolve(&model, "build", &MainClassPolicy::FirstDeclared);

        assert!(!signature.found);
        assert!(signature.args.is_empty());
        assert!(signature.return_types.is_empty());
        assert_eq!(signature.main_class_name, "Foo");
    }

    #[test]
    fn test_methods_win_over_functions() {
        let source = "def build(a):\n    pass\nclass Foo:\n    def build(self, b):\n        pass\n";
        let model = extract(source).unwrap();
        let signature = resolve(&model, "build", &MainClassPolicy::FirstDeclared);

        assert_eq!(signature.owner.as_deref(), Some("Foo"));
        assert_eq!(signature.args(ArgsView::Bound)[0].name, "b");
    }

    #[test]
    fn test_component_subclass_policy() {
        let source = "\
class Helper:
    def run(self):
        pass

class Other(CustomComponent):
    pass

class Real(langflow.CustomComponent):
    def build(self, text: str) -> str:
        return text
";
        let model = extract(source).unwrap();

        let first = resolve(&model, "build", &MainClassPolicy::FirstDeclared);
        assert_eq!(first.main_class_name, "Helper");
        assert_eq!(first.owner.as_deref(), Some("Real"));

        let policy = MainClassPolicy::ComponentSubclass {
            base: "CustomComponent".to_string(),
        };
        let subclass = resolve(&model, "build", &policy);
        assert_eq!(subclass.main_class_name, "Real");
        assert_eq!(subclass.return_types, vec!["str".to_string()]);

        let none = resolve(&model, "missing", &policy);
        assert_eq!(none.main_class_name, "");
    }
}

#[cfg(test)]
mod literal_tests {
    use crate::analysis::literal_eval;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(literal_eval("1"), Some(json!(1)));
        assert_eq!(literal_eval("-2.5"), Some(json!(-2.5)));
        assert_eq!(literal_eval("'text'"), Some(json!("text")));
        assert_eq!(literal_eval("True"), Some(json!(true)));
        assert_eq!(literal_eval("None"), Some(json!(null)));
    }

    #[test]
    fn test_containers() {
        assert_eq!(literal_eval("[1, 'a', (2, 3)]"), Some(json!([1, "a", [2, 3]])));
        assert_eq!(
            literal_eval("{'options': ['a', 'b'], 'show': False}"),
            Some(json!({"options": ["a", "b"], "show": false}))
        );
    }

    #[test]
    fn test_non_literals() {
        assert_eq!(literal_eval("os.getenv('X')"), None);
        assert_eq!(literal_eval("a + 1"), None);
        assert_eq!(literal_eval("[x]"), None);
        assert_eq!(literal_eval(""), None);
        assert_eq!(literal_eval("not valid ("), None);
        assert_eq!(literal_eval(&"[".repeat(20_000)), None);
    }
}
