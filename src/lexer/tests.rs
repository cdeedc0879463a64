#[cfg(test)]
mod lexer_tests {
    use crate::lexer::{tokenize, FStringPiece, TokenType};

    fn kinds(source: &str) -> Vec<TokenType> {
        tokenize(source).unwrap().into_iter().map(|t| t.token_type).collect()
    }

    #[test]
    fn test_basic_assignment() {
        assert_eq!(
            kinds("x = 42"),
            vec![
                TokenType::Identifier("x".to_string()),
                TokenType::Assign,
                TokenType::Integer(42),
                TokenType::Newline,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_indent_and_dedent() {
        let source = "def build():\n    pass\nx = 1\n";
        assert_eq!(
            kinds(source),
            vec![
                TokenType::Def,
                TokenType::Identifier("build".to_string()),
                TokenType::LeftParen,
                TokenType::RightParen,
                TokenType::Colon,
                TokenType::Newline,
                TokenType::Indent,
                TokenType::Pass,
                TokenType::Newline,
                TokenType::Dedent,
                TokenType::Identifier("x".to_string()),
                TokenType::Assign,
                TokenType::Integer(1),
                TokenType::Newline,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_blank_lines_and_comments_do_not_change_indentation() {
        let source = "class A:\n\n    # comment\n    x = 1  # trailing\n\n";
        let tokens = kinds(source);
        assert_eq!(tokens.iter().filter(|t| **t == TokenType::Indent).count(), 1);
        assert_eq!(tokens.iter().filter(|t| **t == TokenType::Dedent).count(), 1);
    }

    #[test]
    fn test_brackets_join_lines() {
        let source = "f(a,\n  b,\n)\n";
        let tokens = kinds(source);
        assert!(!tokens.contains(&TokenType::Indent));
        assert_eq!(tokens.iter().filter(|t| **t == TokenType::Newline).count(), 1);
    }

    #[test]
    fn test_backslash_continuation() {
        let tokens = kinds("x = 1 + \\\n    2\n");
        assert!(!tokens.contains(&TokenType::Indent));
        assert!(tokens.contains(&TokenType::Integer(2)));
    }

    #[test]
    fn test_inconsistent_dedent_is_an_error() {
        let source = "if x:\n        a = 1\n    b = 2\n";
        let err = tokenize(source).unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("unindent"));
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(kinds("'a\\nb'")[0], TokenType::String("a\nb".to_string()));
        assert_eq!(kinds("r'a\\nb'")[0], TokenType::String("a\\nb".to_string()));
        assert_eq!(kinds("\"it's\"")[0], TokenType::String("it's".to_string()));
    }

    #[test]
    fn test_triple_quoted_string_spans_lines() {
        let tokens = tokenize("x = \"\"\"one\ntwo\"\"\"\ny = 2").unwrap();
        assert_eq!(tokens[2].token_type, TokenType::String("one\ntwo".to_string()));
        assert_eq!(tokens[2].line, 1);
        let y = tokens
            .iter()
            .find(|t| t.token_type == TokenType::Identifier("y".to_string()))
            .unwrap();
        assert_eq!(y.line, 3);
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("x = 'abc\ny = 1").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_fstring_pieces() {
        let tokens = kinds("f'Hi {name!r}, {value:.2f} {{x}}'");
        assert_eq!(
            tokens[0],
            TokenType::FString(vec![
                FStringPiece::Literal("Hi ".to_string()),
                FStringPiece::Expr {
                    source: "name".to_string(),
                    conversion: Some('r'),
                    format_spec: None,
                },
                FStringPiece::Literal(", ".to_string()),
                FStringPiece::Expr {
                    source: "value".to_string(),
                    conversion: None,
                    format_spec: Some(".2f".to_string()),
                },
                FStringPiece::Literal(" {x}".to_string()),
            ])
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("1_000")[0], TokenType::Integer(1000));
        assert_eq!(kinds("0x1F")[0], TokenType::Integer(31));
        assert_eq!(kinds("2.5e3")[0], TokenType::Float(2500.0));
        assert_eq!(kinds(".5")[0], TokenType::Float(0.5));
        assert!(tokenize("12abc").is_err());
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("a ** b // c -> d += e != f ...");
        assert!(tokens.contains(&TokenType::DoubleStar));
        assert!(tokens.contains(&TokenType::DoubleSlash));
        assert!(tokens.contains(&TokenType::Arrow));
        assert!(tokens.contains(&TokenType::PlusAssign));
        assert!(tokens.contains(&TokenType::NotEqual));
        assert!(tokens.contains(&TokenType::Ellipsis));
    }

    #[test]
    fn test_token_columns() {
        let tokens = tokenize("x = foo").unwrap();
        assert_eq!(tokens[2].column, 5);
    }

    #[test]
    fn test_leading_byte_order_mark_is_skipped() {
        let tokens = tokenize("\u{feff}x = 1\nclass A:\n    pass\n").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::Identifier("x".to_string()));
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!(tokens[2].column, 5);
        assert!(!tokens.iter().any(|t| t.token_type == TokenType::Indent && t.line == 1));
        assert_eq!(kinds("\u{feff}x = 1"), kinds("x = 1"));
    }

    #[test]
    fn test_byte_order_mark_elsewhere_is_an_error() {
        let err = tokenize("x = 1\n\u{feff}y = 2\n").unwrap_err();
        assert!(err.message.contains("Unexpected character"));
        assert_eq!((err.line, err.column), (2, 1));
    }

    #[test]
    fn test_unexpected_character_points_at_itself() {
        let err = tokenize("$").unwrap_err();
        assert_eq!((err.line, err.column), (1, 1));
        let err = tokenize("x = é$").unwrap_err();
        assert_eq!((err.line, err.column), (1, 6));
    }
}
