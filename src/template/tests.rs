#[cfg(test)]
mod synthesizer_tests {
    use serde_json::json;

    use crate::analysis::ArgRecord;
    use crate::template::synthesizer::TypeInfo;
    use crate::template::{overrides_from_json, synthesize, FieldKind, Overrides};

    fn arg(name: &str, type_name: Option<&str>, default: Option<&str>) -> ArgRecord {
        ArgRecord {
            name: name.to_string(),
            type_name: type_name.map(str::to_string),
            default: default.map(str::to_string),
        }
    }

    #[test]
    fn test_type_analysis() {
        let cases = [
            ("str", "str", false, false),
            ("Optional[str]", "str", true, false),
            ("Optional[List[str]]", "str", true, true),
            ("int | None", "int", true, false),
            ("Union[str, None]", "str", true, false),
            ("Union[str, int]", "Union[str, int]", false, false),
            ("typing.List[Document]", "Document", false, true),
            ("list", "list", false, true),
            ("Tuple[str, int]", "str, int", false, true),
            ("Dict[str, Any]", "Dict[str, Any]", false, false),
        ];
        for (annotation, type_name, optional, is_list) in cases {
            let info = TypeInfo::analyze(annotation);
            assert_eq!(info.type_name, type_name, "{}", annotation);
            assert_eq!(info.optional, optional, "{}", annotation);
            assert_eq!(info.is_list, is_list, "{}", annotation);
        }
    }

    #[test]
    fn test_kinds_and_required() {
        let args = vec![
            arg("url", Some("str"), None),
            arg("verbose", Some("bool"), Some("None")),
            arg("retries", Some("int"), Some("3")),
            arg("headers", Some("Dict[str, str]"), Some("{}")),
            arg("llm", Some("BaseLLM"), None),
            arg("notes", None, None),
            arg("tags", Some("Optional[List[str]]"), None),
        ];
        let template = synthesize(&args, &Overrides::new());

        assert_eq!(template["url"].kind, FieldKind::Text);
        assert!(template["url"].required);
        assert_eq!(template["verbose"].kind, FieldKind::Toggle);
        assert_eq!(template["verbose"].default_value, json!(false));
        assert!(!template["verbose"].required);
        assert_eq!(template["retries"].kind, FieldKind::Number);
        assert_eq!(template["retries"].default_value, json!(3));
        assert_eq!(template["headers"].kind, FieldKind::Dict);
        assert_eq!(template["headers"].default_value, json!({}));
        assert_eq!(template["llm"].kind, FieldKind::Handle);
        assert_eq!(template["notes"].type_name, "str");
        assert!(template["tags"].is_list);
        assert!(!template["tags"].required);
        assert_eq!(template["tags"].type_name, "str");
    }

    #[test]
    fn test_receiver_and_variadics_are_skipped() {
        let args = vec![
            arg("self", None, None),
            arg("x", Some("int"), None),
            arg("*args", None, None),
            arg("**kwargs", None, None),
        ];
        let template = synthesize(&args, &Overrides::new());
        assert_eq!(template.keys().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_non_literal_default_is_null() {
        let template = synthesize(&[arg("when", Some("str"), Some("time.now()"))], &Overrides::new());
        assert!(template["when"].default_value.is_null());
        assert!(!template["when"].required);
    }

    #[test]
    fn test_code_field_hidden_unless_overridden() {
        let args = vec![arg("code", Some("str"), None)];
        assert!(!synthesize(&args, &Overrides::new())["code"].show);

        let overrides = overrides_from_json(&json!({"code": {"show": true}}));
        assert!(synthesize(&args, &overrides)["code"].show);
    }

    #[test]
    fn test_overrides_apply_attribute_by_attribute() {
        let args = vec![arg("api_key", Some("str"), None), arg("model", Some("str"), Some("'a'"))];
        let overrides = overrides_from_json(&json!({
            "api_key": {"password": true, "display_name": "API Key"},
            "model": {"options": ["a", "b"], "real_time_refresh": true},
            "extra": {"field_type": "int", "advanced": true, "bogus": 1},
        }));
        let template = synthesize(&args, &overrides);

        assert_eq!(template.keys().collect::<Vec<_>>(), vec!["api_key", "model", "extra"]);
        let api_key = &template["api_key"];
        assert!(api_key.is_password);
        assert_eq!(api_key.display_name, "API Key");
        assert!(api_key.required);
        assert_eq!(api_key.type_name, "str");

        let model = &template["model"];
        assert_eq!(model.kind, FieldKind::Dropdown);
        assert_eq!(model.options, vec![json!("a"), json!("b")]);
        assert!(model.refresh);
        assert_eq!(model.default_value, json!("a"));

        let extra = &template["extra"];
        assert_eq!(extra.kind, FieldKind::Number);
        assert!(extra.advanced);
        assert!(!extra.required);
    }

    #[test]
    fn test_type_override_sets_list() {
        let overrides = overrides_from_json(&json!({"docs": {"type": "List[Document]"}}));
        let template = synthesize(&[arg("docs", None, None)], &overrides);
        assert_eq!(template["docs"].type_name, "Document");
        assert!(template["docs"].is_list);
        assert_eq!(template["docs"].kind, FieldKind::Handle);
    }

    #[test]
    fn test_unreadable_overrides_are_skipped() {
        let overrides = overrides_from_json(&json!({"a": {"show": "yes"}, "b": {"show": false}}));
        assert!(!overrides.contains_key("a"));
        assert_eq!(overrides["b"].show, Some(false));
        assert!(overrides_from_json(&json!([1, 2])).is_empty());
    }

    #[test]
    fn test_synthesize_is_idempotent() {
        let args = vec![arg("x", Some("Optional[int]"), Some("1"))];
        let overrides = overrides_from_json(&json!({"x": {"info": "count"}}));
        assert_eq!(synthesize(&args, &overrides), synthesize(&args, &overrides));
    }

    #[test]
    fn test_serialized_field_names() {
        let template = synthesize(&[arg("x", Some("int"), Some("2"))], &Overrides::new());
        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(json["x"]["type"], json!("int"));
        assert_eq!(json["x"]["value"], json!(2));
        assert_eq!(json["x"]["kind"], json!("number"));
        assert_eq!(json["x"]["password"], json!(false));
    }
}

#[cfg(test)]
mod config_tests {
    use serde_json::json;

    use crate::template::{merge_overrides, overrides_from_json, FieldConfig, TemplateField};

    #[test]
    fn test_aliases() {
        let config = FieldConfig::from_json("f", &json!({"type": "int", "list": true, "real_time_refresh": true})).unwrap();
        assert_eq!(config.field_type.as_deref(), Some("int"));
        assert_eq!(config.is_list, Some(true));
        assert_eq!(config.refresh, Some(true));
        assert!(config.unknown.is_empty());
    }

    #[test]
    fn test_merge_keeps_unmentioned_attributes() {
        let base = overrides_from_json(&json!({"f": {"display_name": "F", "advanced": true}}));
        let top = overrides_from_json(&json!({"f": {"advanced": false}, "g": {"info": "G"}}));
        let merged = merge_overrides([&base, &top]);
        assert_eq!(merged["f"].display_name.as_deref(), Some("F"));
        assert_eq!(merged["f"].advanced, Some(false));
        assert_eq!(merged["g"].info.as_deref(), Some("G"));
    }

    #[test]
    fn test_apply_leaves_other_attributes() {
        let mut field = TemplateField::new("f");
        field.required = true;
        let config = FieldConfig::from_json("f", &json!({"placeholder": "type here"})).unwrap();
        config.apply(&mut field);
        assert!(field.required);
        assert_eq!(field.placeholder, "type here");
        assert_eq!(field.display_name, "f");
    }
}
