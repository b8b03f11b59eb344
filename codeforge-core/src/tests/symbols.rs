#[cfg(test)]
mod suite {
    use crate::symbols::*;
    use crate::tokens::{tokenize, DataType};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn table(source: &str) -> SymbolTable {
        build(&tokenize(source).0, &builtin_names())
    }

    #[test]
    fn test_variables() {
        let symbols = table("nmb a =. 5;\nflat b =. a;\nnmb a =. 7;\nSring s =. \"hi\";");
        assert_eq!(
            symbols.get("a"),
            Some(&SymbolEntry {
                name: "a".to_string(),
                category: Category::Variable,
                declared_type: Some(DataType::Nmb),
                line: Some(1),
                initializer: Some("5".to_string()),
                params: vec![],
            })
        );
        assert_eq!(symbols.get("b").and_then(|e| e.initializer.clone()), None);
        assert_eq!(
            symbols.get("s").and_then(|e| e.initializer.clone()),
            Some("\"hi\"".to_string())
        );
        assert_eq!(
            symbols.entries().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "s", "Ex", "rat", "enter", "printO"]
        );
    }

    #[test]
    fn test_builtins() {
        let symbols = table("");
        assert_eq!(symbols.len(), 4);
        for name in ["Ex", "rat", "enter", "printO"] {
            assert_eq!(
                symbols.get(name),
                Some(&SymbolEntry::function(name, vec![], None))
            );
        }
        let symbols = build(&tokenize("nmb a;").0, &["a".to_string(), "main".to_string()]);
        assert_eq!(symbols.get("a").map(|e| e.category), Some(Category::Variable));
        assert_eq!(symbols.get("main").map(|e| e.category), Some(Category::Function));
    }

    #[test]
    fn test_loop_variable() {
        let symbols = table("nmb start =. 2;\nfirst (nmb i =. start; i <. 9; i +. 1) { }");
        let entry = symbols.get("i").cloned();
        assert_eq!(
            entry,
            Some(SymbolEntry {
                name: "i".to_string(),
                category: Category::Variable,
                declared_type: Some(DataType::Nmb),
                line: Some(2),
                initializer: Some("start".to_string()),
                params: vec![],
            })
        );
    }

    #[test]
    fn test_functions() {
        let symbols = table("Ex add(nmb x, flat y) {\n  printO(x +. y);\n}");
        assert_eq!(
            symbols.get("add"),
            Some(&SymbolEntry::function(
                "add",
                vec!["x".to_string(), "y".to_string()],
                Some(1)
            ))
        );
        assert_eq!(
            symbols.get("y").and_then(|e| e.declared_type),
            Some(DataType::Flat)
        );
        assert_eq!(
            symbols
                .entries()
                .take(3)
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>(),
            vec!["add", "x", "y"]
        );
    }

    #[test]
    fn test_input_targets() {
        let symbols = table("enter(\"Age?\", nmb, age);\nenter(\"Name?\", Sring who);");
        assert_eq!(
            symbols.get("age").and_then(|e| e.declared_type),
            Some(DataType::Nmb)
        );
        assert_eq!(
            symbols.get("who").and_then(|e| e.declared_type),
            Some(DataType::Sring)
        );
    }

    #[test]
    fn test_first_insert_wins() {
        let mut symbols = SymbolTable::default();
        assert!(symbols.insert(SymbolEntry::variable("a", Some(DataType::Nmb), 1)));
        assert!(symbols.insert(SymbolEntry::function("f", vec![], Some(2))));
        assert!(!symbols.insert(SymbolEntry::variable("a", Some(DataType::Flat), 3)));
        assert_eq!(symbols.len(), 2);
        assert_eq!(
            symbols.get("a").map(|e| (e.declared_type, e.line)),
            Some((Some(DataType::Nmb), Some(1)))
        );
        assert_eq!(
            symbols.entries().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            vec!["a", "f"]
        );
    }

    #[test]
    fn test_undeclared_names_are_not_registered() {
        let symbols = table("x =. 3;\nprintO(y);");
        assert!(!symbols.contains("x"));
        assert!(!symbols.contains("y"));
    }

    #[test]
    fn test_serialize() {
        let symbols = table("nmb a =. 5;");
        assert_eq!(
            serde_json::to_value(&symbols).unwrap()[0],
            json!({
                "name": "a",
                "category": "VARIABLE",
                "declared_type": "nmb",
                "line": 1,
                "initializer": "5",
                "params": []
            })
        );
        assert_eq!(
            serde_json::to_value(&symbols).unwrap()[4]["category"],
            json!("FUNCTION")
        );
    }
}
