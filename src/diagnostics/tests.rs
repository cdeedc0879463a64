#[cfg(test)]
mod diagnostics_tests {
    use std::path::Path;

    use crate::analysis::SyntaxError;
    use crate::diagnostics::color::plain;
    use crate::diagnostics::{edit_distance, find_name_span, from_engine_error, suggest, Span};
    use crate::execution_engine::EngineError;

    fn render(source: &str, err: EngineError) -> String {
        plain(&from_engine_error(Path::new("component.py"), source, &err))
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("build", "build"), 0);
        assert_eq!(edit_distance("buld", "build"), 1);
        assert_eq!(edit_distance("txet", "text"), 1);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_suggestions_for_syntax_messages() {
        assert!(suggest("expected ')' after parameters").unwrap().contains("')'"));
        assert!(suggest("expected an indented block").unwrap().contains("pass"));
        assert!(suggest("unterminated string literal").is_some());
        assert!(suggest("something else entirely").is_none());
    }

    #[test]
    fn test_syntax_error_points_at_column() {
        let source = "def build(:\n    return 1\n";
        let err = EngineError::Syntax(SyntaxError {
            message: "expected ')' after parameters".to_string(),
            line: 1,
            column: 11,
        });
        let text = render(source, err);
        assert!(text.starts_with("error: invalid code: expected ')' after parameters"));
        assert!(text.contains("--> component.py:1:11"));
        assert!(text.contains("1 | def build(:"));
        assert!(text.contains(&format!(" | {}^", " ".repeat(10))));
        assert!(text.contains("help: try adding a closing parenthesis"));
    }

    #[test]
    fn test_undefined_name_suggests_spelling() {
        let source = "def build(text):\n    return txet.upper()\n";
        let err = EngineError::Invocation {
            message: "name 'txet' is not defined".to_string(),
        };
        let text = render(source, err);
        assert!(text.contains("component raised an error: name 'txet' is not defined"));
        assert!(text.contains("--> component.py:2:12"));
        assert!(text.contains("^^^^"));
        assert!(text.contains("similar spelling exists: 'text'"));
    }

    #[test]
    fn test_missing_entrypoint_finds_near_miss() {
        let source = "class C:\n    def buld(self):\n        pass\n";
        let err = EngineError::EntrypointMissing {
            name: "build".to_string(),
        };
        let text = render(source, err);
        assert!(text.contains("entrypoint 'build' not found"));
        assert!(text.contains("--> component.py:2:9"));
        assert!(text.contains("found 'buld'"));
    }

    #[test]
    fn test_empty_source_has_no_location() {
        let text = render("", EngineError::EmptySource);
        assert!(text.contains("error: write some code"));
        assert!(text.contains("--> component.py\n"));
        assert!(text.contains("def build"));
    }

    #[test]
    fn test_find_name_span_matches_whole_identifiers() {
        let source = "values = 1\nvalue = values\n";
        assert_eq!(
            find_name_span(source, "value"),
            Some(Span {
                line: 2,
                column: 1,
                width: 5
            })
        );
        assert_eq!(find_name_span(source, "missing"), None);
    }
}
