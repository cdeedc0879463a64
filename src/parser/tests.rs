#[cfg(test)]
mod tests {
    use crate::ast::{
        Argument, BinaryOperator, CompareOperator, Expr, FStringPart, Literal, ParameterKind, Program, Statement,
    };
    use crate::lexer::tokenize;
    use crate::parser::{parse, parse_expression_source, ParseError};

    fn parse_source(source: &str) -> Result<Program, ParseError> {
        let tokens = tokenize(source).unwrap();
        parse(&tokens)
    }

    fn render(source: &str) -> String {
        parse_expression_source(source, 1).unwrap().to_string()
    }

    #[test]
    fn test_assignment() {
        let program = parse_source("x = 42").unwrap();

        match &program.statements[0] {
            Statement::Assign { targets, value } => {
                assert_eq!(targets, &vec![Expr::Name("x".to_string())]);
                assert_eq!(value, &Expr::Literal(Literal::Integer(42)));
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_chained_and_tuple_assignment() {
        let program = parse_source("a = b = 1\nx, y = 1, 2\n").unwrap();

        match &program.statements[0] {
            Statement::Assign { targets, .. } => assert_eq!(targets.len(), 2),
            other => panic!("Expected assignment, got {:?}", other),
        }
        match &program.statements[1] {
            Statement::Assign { targets, value } => {
                assert!(matches!(&targets[0], Expr::Tuple(items) if items.len() == 2));
                assert!(matches!(value, Expr::Tuple(items) if items.len() == 2));
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_annotated_and_augmented_assignment() {
        let program = parse_source("count: int = 0\ncount += 1\nname: str\n").unwrap();

        assert!(matches!(&program.statements[0], Statement::AnnAssign { value: Some(_), .. }));
        assert!(matches!(
            &program.statements[1],
            Statement::AugAssign {
                operator: BinaryOperator::Add,
                ..
            }
        ));
        assert!(matches!(&program.statements[2], Statement::AnnAssign { value: None, .. }));
    }

    #[test]
    fn test_function_declaration() {
        let source = "def build(self, url: str, *args, retries: int = 3, **kwargs) -> Document:\n    return url\n";
        let program = parse_source(source).unwrap();

        match &program.statements[0] {
            Statement::FunctionDef(function) => {
                assert_eq!(function.name, "build");
                assert_eq!(function.line, 1);
                let kinds: Vec<ParameterKind> = function.parameters.iter().map(|p| p.kind).collect();
                assert_eq!(
                    kinds,
                    vec![
                        ParameterKind::Positional,
                        ParameterKind::Positional,
                        ParameterKind::VarArgs,
                        ParameterKind::KeywordOnly,
                        ParameterKind::KwArgs,
                    ]
                );
                assert_eq!(function.parameters[1].annotation, Some(Expr::Name("str".to_string())));
                assert_eq!(function.parameters[3].default, Some(Expr::Literal(Literal::Integer(3))));
                assert_eq!(function.return_type, Some(Expr::Name("Document".to_string())));
                assert_eq!(function.body.len(), 1);
            }
            other => panic!("Expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_class_with_decorated_method() {
        let source = "\
class Greeter(CustomComponent, metaclass=Meta):
    display_name = 'Greeter'

    @staticmethod
    def helper():
        pass

    def build(self, name: str) -> str:
        return f'Hello {name}'
";
        let program = parse_source(source).unwrap();

        match &program.statements[0] {
            Statement::ClassDef(class) => {
                assert_eq!(class.name, "Greeter");
                assert_eq!(class.bases, vec![Expr::Name("CustomComponent".to_string())]);
                assert_eq!(class.keywords.len(), 1);
                assert_eq!(class.body.len(), 3);
                match &class.body[1] {
                    Statement::FunctionDef(helper) => {
                        assert_eq!(helper.decorators, vec![Expr::Name("staticmethod".to_string())]);
                    }
                    other => panic!("Expected method, got {:?}", other),
                }
            }
            other => panic!("Expected class, got {:?}", other),
        }
    }

    #[test]
    fn test_control_flow() {
        let source = "\
if a:
    x = 1
elif b:
    x = 2
else:
    x = 3
for k, v in items:
    continue
while True: break
try:
    pass
except ValueError as err:
    raise
finally:
    pass
";
        let program = parse_source(source).unwrap();
        assert_eq!(program.statements.len(), 4);

        match &program.statements[0] {
            Statement::If { else_branch, .. } => {
                assert!(matches!(&else_branch[0], Statement::If { .. }));
            }
            other => panic!("Expected if, got {:?}", other),
        }
        assert!(matches!(&program.statements[1], Statement::For { target: Expr::Tuple(_), .. }));
        assert!(matches!(&program.statements[2], Statement::While { .. }));
        match &program.statements[3] {
            Statement::Try { handlers, finally, .. } => {
                assert_eq!(handlers.len(), 1);
                assert_eq!(handlers[0].name.as_deref(), Some("err"));
                assert_eq!(finally.len(), 1);
            }
            other => panic!("Expected try, got {:?}", other),
        }
    }

    #[test]
    fn test_imports() {
        let program = parse_source("import os, numpy as np\nfrom langflow import (CustomComponent,\n    Data as D)\nfrom . import x\n").unwrap();

        match &program.statements[0] {
            Statement::Import { names } => {
                assert_eq!(names.len(), 2);
                assert_eq!(names[1].alias.as_deref(), Some("np"));
            }
            other => panic!("Expected import, got {:?}", other),
        }
        match &program.statements[1] {
            Statement::ImportFrom { module, names } => {
                assert_eq!(module, "langflow");
                assert_eq!(names[1].name, "Data");
                assert_eq!(names[1].alias.as_deref(), Some("D"));
            }
            other => panic!("Expected from-import, got {:?}", other),
        }
        assert!(matches!(&program.statements[2], Statement::ImportFrom { module, .. } if module == "."));
    }

    #[test]
    fn test_invalid_statement_is_rejected() {
        let err = parse_source("zzz import os").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("invalid syntax"));
    }

    #[test]
    fn test_missing_indented_block() {
        let err = parse_source("def build(self):\nreturn 1\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("indented block"));
    }

    #[test]
    fn test_parameter_errors() {
        assert!(parse_source("def f(a=1, b):\n    pass\n").is_err());
        assert!(parse_source("def f(a, a):\n    pass\n").is_err());
        assert!(parse_source("f(a=1, 2)\n").is_err());
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert!(parse_source("f() = 1\n").is_err());
        assert!(parse_source("1 + 2 = x\n").is_err());
    }

    #[test]
    fn test_comparison_chain() {
        let expr = parse_expression_source("a < b not in c is not d", 1).unwrap();
        match expr {
            Expr::Compare { comparisons, .. } => {
                let operators: Vec<CompareOperator> = comparisons.iter().map(|(op, _)| *op).collect();
                assert_eq!(
                    operators,
                    vec![CompareOperator::Less, CompareOperator::NotIn, CompareOperator::IsNot]
                );
            }
            other => panic!("Expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_call_arguments() {
        let expr = parse_expression_source("f(1, *rest, key='v', **extra)", 1).unwrap();
        match expr {
            Expr::Call { arguments, .. } => {
                assert!(matches!(&arguments[0], Argument::Positional(_)));
                assert!(matches!(&arguments[1], Argument::Unpack(_)));
                assert!(matches!(&arguments[2], Argument::Keyword { name, .. } if name == "key"));
                assert!(matches!(&arguments[3], Argument::UnpackDict(_)));
            }
            other => panic!("Expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_adjacent_strings_and_fstrings() {
        assert_eq!(
            parse_expression_source("'a' 'b'", 1).unwrap(),
            Expr::Literal(Literal::String("ab".to_string()))
        );
        match parse_expression_source("f'x={x + 1}'", 1).unwrap() {
            Expr::FString(parts) => {
                assert_eq!(parts[0], FStringPart::Literal("x=".to_string()));
                assert!(matches!(&parts[1], FStringPart::Expr { expr, .. } if matches!(**expr, Expr::Binary { .. })));
            }
            other => panic!("Expected f-string, got {:?}", other),
        }
    }

    #[test]
    fn test_canonical_rendering() {
        assert_eq!(render("Optional[ str ]"), "Optional[str]");
        assert_eq!(render("Dict[str,int]"), "Dict[str, int]");
        assert_eq!(render("\"hello\""), "'hello'");
        assert_eq!(render("(1 + 2) * 3"), "(1 + 2) * 3");
        assert_eq!(render("1 + (2 * 3)"), "1 + 2 * 3");
        assert_eq!(render("-x ** 2"), "-x ** 2");
        assert_eq!(render("str | None"), "str | None");
        assert_eq!(render("[1, 2.0, None, True]"), "[1, 2.0, None, True]");
        assert_eq!(render("{'a': 1}"), "{'a': 1}");
        assert_eq!(render("(1,)"), "(1,)");
        assert_eq!(render("x[1:2]"), "x[1:2]");
        assert_eq!(render("[x for x in items if x]"), "[x for x in items if x]");
    }

    #[test]
    fn test_trailing_tokens_in_expression_source() {
        assert!(parse_expression_source("a b", 1).is_err());
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        for (open, close) in [("[", "]"), ("(", ")"), ("{", "}")] {
            let source = format!("x = {}1{}\n", open.repeat(10_000), close.repeat(10_000));
            let err = parse_source(&source).unwrap_err();
            assert!(err.message.contains("too many nested parentheses"), "{}", err.message);
            assert_eq!(err.line, 1);
        }
        assert!(parse_source(&format!("x = {}1\n", "-".repeat(10_000))).is_err());
        assert!(parse_source(&format!("x = {}y\n", "not ".repeat(10_000))).is_err());
        assert!(parse_expression_source(&format!("{}1{}", "(".repeat(5_000), ")".repeat(5_000)), 1).is_err());
    }

    #[test]
    fn test_moderate_nesting_parses() {
        let source = format!("x = {}1{}\n", "[".repeat(40), "]".repeat(40));
        assert!(parse_source(&source).is_ok());
    }

    #[test]
    fn test_deeply_nested_blocks_are_an_error() {
        let mut source = String::new();
        for level in 0..200 {
            source.push_str(&format!("{}if x:\n", "    ".repeat(level)));
        }
        source.push_str(&format!("{}pass\n", "    ".repeat(200)));
        let err = parse_source(&source).unwrap_err();
        assert!(err.message.contains("nested blocks"), "{}", err.message);
    }
}
