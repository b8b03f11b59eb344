#[cfg(test)]
mod suite {
    use crate::diagnostics::{Diagnostic, Phase};
    use crate::semantic::{analyze, value_type, ValueType};
    use crate::symbols::{build, builtin_names};
    use crate::tokens::{tokenize, DataType};
    use pretty_assertions::assert_eq;

    fn check(source: &str) -> Vec<Diagnostic> {
        let (tokens, _) = tokenize(source);
        let symbols = build(&tokens, &builtin_names());
        analyze(&symbols, &tokens)
    }

    fn semantic(message: &str, line: usize) -> Diagnostic {
        Diagnostic::at(Phase::Semantic, message, line)
    }

    #[test]
    fn test_valid_programs() {
        for source in [
            "nmb a =. 2; nmb b =. 3; nmb c =. a +. b; printO(c);",
            "Ex greet(Sring name) { printO(\"Hello\", name); }\ngreet(\"Bob\");",
            "flat f =. 2.5; flat g =. f *. 1.5; printO(g);",
            "nmb n; enter(\"n?\", nmb, n); oye (n >. \"x\") { printO(n); }",
            "first (nmb i =. 0; i <. 3; i =. i +. 1) { printO(i); }",
        ] {
            assert!(check(source).is_empty(), "{source}");
        }
    }

    #[test]
    fn test_undeclared() {
        assert_eq!(
            check("printO(x);\nnmb y =. 1;\ny =. z;"),
            vec![
                semantic("Variable 'x' used without declaration", 1),
                semantic("Variable 'z' used without declaration", 3),
                semantic("Type mismatch: unknown → nmb", 3),
            ]
        );
    }

    #[test]
    fn test_assignment_types() {
        assert_eq!(
            check("nmb a =. \"hi\";"),
            vec![semantic("Type mismatch: Sring → nmb", 1)]
        );
        assert_eq!(
            check("flat f =. 3;"),
            vec![semantic("Type mismatch: nmb → flat", 1)]
        );
        assert_eq!(
            check("buul b =. true;\nSring s =. b;"),
            vec![semantic("Type mismatch: buul → Sring", 2)]
        );
        assert_eq!(
            check("Ex f() { }\nnmb a =. f;"),
            vec![semantic("Type mismatch: function → nmb", 2)]
        );
    }

    #[test]
    fn test_assignment_looks_at_first_token_only() {
        assert_eq!(
            check("nmb a =. 1 +. \"x\";"),
            vec![semantic("Non-numeric operands for +.", 1)]
        );
    }

    #[test]
    fn test_undeclared_target_is_not_type_checked() {
        assert_eq!(
            check("x =. \"s\";"),
            vec![semantic("Variable 'x' used without declaration", 1)]
        );
    }

    #[test]
    fn test_operand_types() {
        assert_eq!(
            check("flat f =. 1.5; nmb n =. 2; flat g =. f +. n;"),
            vec![semantic("Operand type mismatch for +.", 1)]
        );
        assert_eq!(
            check("Sring s =. \"a\";\nnmb n =. 4 %. s;"),
            vec![semantic("Non-numeric operands for %.", 2)]
        );
        // comparisons are not operand-checked
        assert!(check("oye (\"a\" ==. 1) { }").is_empty());
    }

    #[test]
    fn test_checks_report_in_order() {
        assert_eq!(
            check("nmb a =. \"s\" +. b;"),
            vec![
                semantic("Variable 'b' used without declaration", 1),
                semantic("Type mismatch: Sring → nmb", 1),
                semantic("Non-numeric operands for +.", 1),
            ]
        );
    }

    #[test]
    fn test_value_type() {
        let symbols = build(&tokenize("cter c;").0, &builtin_names());
        assert_eq!(value_type("42", &symbols), ValueType::Data(DataType::Nmb));
        assert_eq!(value_type("12.", &symbols), ValueType::Data(DataType::Flat));
        assert_eq!(value_type("\"\"", &symbols), ValueType::Data(DataType::Sring));
        assert_eq!(value_type("false", &symbols), ValueType::Data(DataType::Buul));
        assert_eq!(value_type("c", &symbols), ValueType::Data(DataType::Cter));
        assert_eq!(value_type("printO", &symbols), ValueType::Function);
        assert_eq!(value_type("nope", &symbols), ValueType::Unknown);
    }
}
