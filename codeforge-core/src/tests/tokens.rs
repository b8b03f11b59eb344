#[cfg(test)]
mod suite {
    use crate::diagnostics::{Diagnostic, Phase};
    use crate::tokens::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<(TokenKind, String)> {
        tokenize(source)
            .0
            .into_iter()
            .map(|t| (t.kind, t.lexeme))
            .collect()
    }

    fn tok(kind: TokenKind, lexeme: &str) -> (TokenKind, String) {
        (kind, lexeme.to_string())
    }

    #[test]
    fn basic_test() {
        assert_eq!(tokenize(""), (vec![], vec![]));
        assert_eq!(tokenize("  \n\t \r\n"), (vec![], vec![]));
        assert_eq!(
            tokenize("nmb a =. 2;").0,
            vec![
                TokenSpan {
                    kind: TokenKind::DataType,
                    lexeme: "nmb".to_string(),
                    line: 1,
                    start: 1,
                    end: 4
                },
                TokenSpan {
                    kind: TokenKind::Identifier,
                    lexeme: "a".to_string(),
                    line: 1,
                    start: 5,
                    end: 6
                },
                TokenSpan {
                    kind: TokenKind::Assign,
                    lexeme: "=.".to_string(),
                    line: 1,
                    start: 7,
                    end: 9
                },
                TokenSpan {
                    kind: TokenKind::Number,
                    lexeme: "2".to_string(),
                    line: 1,
                    start: 10,
                    end: 11
                },
                TokenSpan {
                    kind: TokenKind::Semicolon,
                    lexeme: ";".to_string(),
                    line: 1,
                    start: 11,
                    end: 12
                },
            ]
        );
    }

    #[test]
    fn test_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("a >=. b ==. c <. d %. e=.f"),
            vec![
                tok(Identifier, "a"),
                tok(Operator, ">=."),
                tok(Identifier, "b"),
                tok(Operator, "==."),
                tok(Identifier, "c"),
                tok(Operator, "<."),
                tok(Identifier, "d"),
                tok(Operator, "%."),
                tok(Identifier, "e"),
                tok(Assign, "=."),
                tok(Identifier, "f"),
            ]
        );
    }

    #[test]
    fn test_undotted_symbols_are_not_operators() {
        use TokenKind::*;
        let (tokens, errors) = tokenize("x != y");
        assert_eq!(
            tokens.into_iter().map(|t| (t.kind, t.lexeme)).collect::<Vec<_>>(),
            vec![
                tok(Identifier, "x"),
                tok(Unknown, "!"),
                tok(Unknown, "="),
                tok(Identifier, "y"),
            ]
        );
        assert_eq!(
            errors,
            vec![
                Diagnostic::at(Phase::Lexical, "Unexpected '!'", 1),
                Diagnostic::at(Phase::Lexical, "Unexpected '='", 1),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        use TokenKind::*;
        assert_eq!(
            kinds("3.14 42 7.x 12abc"),
            vec![
                tok(Number, "3.14"),
                tok(Number, "42"),
                tok(Number, "7"),
                tok(Unknown, "."),
                tok(Identifier, "x"),
                tok(Unknown, "1"),
                tok(Unknown, "2"),
                tok(Identifier, "abc"),
            ]
        );
    }

    #[test]
    fn test_reserved_words() {
        use TokenKind::*;
        assert_eq!(
            kinds("wish wishlist printO Sring true falsey cter _x1"),
            vec![
                tok(Keyword, "wish"),
                tok(Identifier, "wishlist"),
                tok(Keyword, "printO"),
                tok(DataType, "Sring"),
                tok(Boolean, "true"),
                tok(Identifier, "falsey"),
                tok(DataType, "cter"),
                tok(Identifier, "_x1"),
            ]
        );
        let (tokens, _) = tokenize("oye first");
        assert_eq!(tokens[0].keyword(), Some(crate::tokens::Keyword::Oye));
        assert_eq!(tokens[1].keyword(), Some(crate::tokens::Keyword::First));
        assert_eq!(
            tokenize("flat").0[0].data_type(),
            Some(crate::tokens::DataType::Flat)
        );
    }

    #[test]
    fn test_strings() {
        use TokenKind::*;
        assert_eq!(
            kinds(r#"printO("a \"q\" b", "x//y");"#),
            vec![
                tok(Keyword, "printO"),
                tok(Lparen, "("),
                tok(String, r#""a \"q\" b""#),
                tok(Comma, ","),
                tok(String, r#""x//y""#),
                tok(Rparen, ")"),
                tok(Semicolon, ";"),
            ]
        );
        let (tokens, errors) = tokenize("\"abc");
        assert_eq!(
            tokens.into_iter().map(|t| (t.kind, t.lexeme)).collect::<Vec<_>>(),
            vec![tok(Unknown, "\""), tok(Identifier, "abc")]
        );
        assert_eq!(errors, vec![Diagnostic::at(Phase::Lexical, "Unexpected '\"'", 1)]);
    }

    #[test]
    fn test_comments() {
        let (tokens, errors) = tokenize("nmb x; // printO(x) @\n// all comment\nprintO(x);");
        assert!(errors.is_empty());
        assert_eq!(
            tokens.iter().map(|t| t.line).collect::<Vec<_>>(),
            vec![1, 1, 1, 3, 3, 3, 3, 3]
        );
    }

    #[test]
    fn test_unknown_characters() {
        let (tokens, errors) = tokenize("nmb a =. 5 @ 3;\n#");
        assert_eq!(tokens[4].kind, TokenKind::Unknown);
        assert_eq!(tokens[4].lexeme, "@");
        assert_eq!(tokens[5].lexeme, "3");
        assert_eq!(
            errors,
            vec![
                Diagnostic::at(Phase::Lexical, "Unexpected '@'", 1),
                Diagnostic::at(Phase::Lexical, "Unexpected '#'", 2),
            ]
        );
        assert_eq!(errors[0].to_string(), "Lexical error: Unexpected '@' at line 1");
    }

    #[test]
    fn test_positions_recover_source() {
        let source = "nmb total =. 0;\n  first (nmb i =. 1; i <=. 10; i +. 1) {\n\ttotal =. total +. i; // sum\n  }\nprintO(\"sum\", total);";
        let lines: Vec<Vec<char>> = source.split('\n').map(|l| l.chars().collect()).collect();
        let (tokens, errors) = tokenize(source);
        assert!(errors.is_empty());
        for token in &tokens {
            let text: std::string::String =
                lines[token.line - 1][token.start - 1..token.end - 1].iter().collect();
            assert_eq!(text, token.lexeme);
        }
        assert_eq!(tokens.last().map(|t| t.line), Some(5));
    }
}
