#[cfg(test)]
mod suite {
    use crate::toolchain::{compile, compile_with, Options};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::cell::RefCell;

    #[test]
    fn test_compile_and_run() {
        let result = compile("nmb a =. 2; nmb b =. 3; nmb c =. a +. b; printO(c);");
        assert!(!result.has_errors());
        assert_eq!(result.output, vec!["5"]);
    }

    #[test]
    fn test_print_family() {
        let result = compile(
            "flat f =. 7.5;\nnmb n =. 7 /. 2;\nrat(\"f\", f);\nprintO(n, \"a, b\", true);",
        );
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(result.output, vec!["f 7.5", "3 a, b true"]);
    }

    #[test]
    fn test_input() {
        let mut asked = vec![];
        let result = compile_with(
            "nmb age;\nenter(\"Age?\", nmb, age);\nprintO(age +. 1);",
            &Options::default(),
            &mut |_: &str| {},
            &mut |message: &str| {
                asked.push(message.to_string());
                Some("41 years".to_string())
            },
        );
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(result.output, vec!["42"]);
        assert_eq!(asked, vec!["Age?"]);
    }

    #[test]
    fn test_output_is_streamed_before_prompts() {
        let events = RefCell::new(vec![]);
        let result = compile_with(
            "printO(\"Welcome\");\nSring name;\nenter(\"Name?\", name);\nprintO(\"Hi\", name);",
            &Options::default(),
            &mut |line: &str| events.borrow_mut().push(format!("print {line}")),
            &mut |message: &str| {
                events.borrow_mut().push(format!("prompt {message}"));
                Some("Bob".to_string())
            },
        );
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(
            events.into_inner(),
            vec!["print Welcome", "prompt Name?", "print Hi Bob"]
        );
        assert_eq!(result.output, vec!["Welcome", "Hi Bob"]);
    }

    #[test]
    fn test_input_without_reply() {
        let result = compile("Sring name;\nenter(\"Name?\", name);\nprintO(\"[\", name, \"]\");");
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(result.output, vec!["[  ]"]);
    }

    #[test]
    fn test_options() {
        assert_eq!(
            serde_json::from_str::<Options>("{}").unwrap(),
            Options::default()
        );
        assert_eq!(
            serde_json::from_str::<Options>(r#"{ "max_steps": 5 }"#).unwrap(),
            Options { max_steps: 5 }
        );
    }

    #[test]
    fn test_json() {
        let result = compile("nmb x =. 1 /. 0;");
        let json: Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(
            json["errors"],
            json!([{ "phase": "Runtime", "message": "Division by zero", "line": null }])
        );
        assert_eq!(
            json["tokens"][0],
            json!({ "kind": "DATA_TYPE", "lexeme": "nmb", "line": 1, "start": 1, "end": 4 })
        );
        assert_eq!(json["symbols"][0]["name"], json!("x"));
        assert_eq!(json["assembly"], json!("MOV x, 1\nDIV x, 0"));
        assert_eq!(json["ir"].as_array().map(|ir| ir.len()), Some(2));
        assert_eq!(json["output"], json!([]));
    }
}
