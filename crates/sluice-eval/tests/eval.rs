//! End-to-end evaluator tests over parsed sources.

use sluice_eval::{Evaluator, Scope};
use sluice_syntax::{parse_expression, parse_file};
use sluice_value::{record, FromValue, Value};

fn eval_expr<T: FromValue + PartialEq + std::fmt::Debug>(src: &str, scope: &Scope<'_>) -> T {
    let expr = parse_expression(src).expect("expression should parse");
    Evaluator::new(&expr)
        .evaluate::<T>(scope)
        .unwrap_or_else(|err| panic!("evaluating {src:?}: {err}"))
}

fn eval_err(src: &str, scope: &Scope<'_>) -> String {
    let expr = parse_expression(src).expect("expression should parse");
    Evaluator::new(&expr)
        .evaluate::<Value>(scope)
        .expect_err("evaluation should fail")
        .to_string()
}

#[test]
fn expression_corpus() {
    let mut scope = Scope::new();
    scope.insert("foobar", 42i64);

    // Binops.
    assert!(eval_expr::<bool>("false || true", &scope));
    assert!(!eval_expr::<bool>("true && false", &scope));
    assert!(!eval_expr::<bool>("3 == 5", &scope));
    assert!(eval_expr::<bool>("3 != 5", &scope));
    assert!(eval_expr::<bool>("3 < 5", &scope));
    assert!(eval_expr::<bool>("3 <= 5", &scope));
    assert!(!eval_expr::<bool>("3 > 5", &scope));
    assert!(!eval_expr::<bool>("3 >= 5", &scope));
    assert_eq!(eval_expr::<i64>("3 + 5", &scope), 8);
    assert_eq!(eval_expr::<i64>("3 - 5", &scope), -2);
    assert_eq!(eval_expr::<i64>("3 * 5", &scope), 15);
    assert_eq!(eval_expr::<f64>("3.0 / 5.0", &scope), 0.6);
    assert_eq!(eval_expr::<i64>("5 % 3", &scope), 2);
    assert_eq!(eval_expr::<i64>("3 ^ 5", &scope), 243);

    // Precedence.
    assert_eq!(eval_expr::<i64>("3 + 5 * 2", &scope), 13);
    assert_eq!(eval_expr::<i64>("(3 + 5) * 2", &scope), 16);
    assert_eq!(eval_expr::<i64>("2 ^ 3 ^ 2", &scope), 512);

    // Identifier lookup.
    assert_eq!(eval_expr::<i64>("foobar", &scope), 42);

    // Arrays.
    assert_eq!(eval_expr::<Vec<i64>>("[0, 1, 2]", &scope), vec![0, 1, 2]);

    // Access.
    assert_eq!(eval_expr::<i64>("{ a = 15 }.a", &scope), 15);
    assert_eq!(eval_expr::<i64>("{ a = { b = 12 } }.a.b", &scope), 12);

    // Indexing.
    assert_eq!(eval_expr::<i64>("[0, 1, 2][1]", &scope), 1);
    assert_eq!(eval_expr::<i64>("[[1, 2, 3]][0][2]", &scope), 3);

    // Paren.
    assert_eq!(eval_expr::<i64>("(15)", &scope), 15);

    // Unary.
    assert!(!eval_expr::<bool>("!true", &scope));
    assert_eq!(eval_expr::<i64>("-15", &scope), -15);
}

#[test]
fn object_to_map_and_struct() {
    let scope = Scope::new();

    let map: std::collections::HashMap<String, i64> =
        eval_expr("{ a = 5, b = 10 }", &scope);
    assert_eq!(map["a"], 5);
    assert_eq!(map["b"], 10);

    record! {
        #[derive(Debug, Default, PartialEq)]
        struct Person {
            name: String => (key "name"),
            age: i64 => (key "age"),
            country: Option<String> => (key optional "country"),
        }
    }

    let person: Person = eval_expr("{ name = \"John Doe\", age = 42 }", &scope);
    assert_eq!(
        person,
        Person {
            name: "John Doe".to_string(),
            age: 42,
            country: None,
        }
    );
}

#[test]
fn strings_convert_at_decode_time() {
    let scope = Scope::new();
    assert_eq!(eval_expr::<u32>("\"15\"", &scope), 15);
    assert_eq!(eval_expr::<f64>("\"1.5\"", &scope), 1.5);

    let expr = parse_expression("\"-3\"").unwrap();
    let err = Evaluator::new(&expr).evaluate::<u32>(&scope).unwrap_err();
    assert!(err.to_string().contains("cannot convert"), "{err}");
}

#[test]
fn scope_chain_lookup() {
    let mut root = Scope::new();
    root.insert("shadowed", 1i64);
    root.insert("root_only", 10i64);

    let mut child = Scope::with_parent(&root);
    child.insert("shadowed", 2i64);

    assert_eq!(eval_expr::<i64>("shadowed", &child), 2);
    assert_eq!(eval_expr::<i64>("root_only", &child), 10);
    assert_eq!(eval_expr::<i64>("shadowed", &root), 1);
}

#[test]
fn missing_identifier() {
    let scope = Scope::new();
    assert_eq!(
        eval_err("nope", &scope),
        "identifier \"nope\" does not exist"
    );
}

#[test]
fn runtime_errors_are_not_panics() {
    let scope = Scope::new();
    assert_eq!(eval_err("1 / 0", &scope), "division by zero");
    assert_eq!(eval_err("[0, 1][5]", &scope), "index 5 out of range [0, 2)");
    assert_eq!(eval_err("[0, 1][-1]", &scope), "index -1 out of range [0, 2)");
    assert!(eval_err("{ a = 1 }.b", &scope).contains("field \"b\" does not exist"));
    assert!(eval_err("3(1)", &scope).contains("cannot call non-function type"));
    assert!(eval_err("[1, 2].a", &scope).contains("cannot access field"));
    assert!(eval_err("{ a = 1 }[0]", &scope).contains("cannot take an index"));
    assert!(eval_err("!3", &scope).contains("non-boolean"));
    assert!(eval_err("3 || true", &scope).contains("non-boolean"));
}

#[test]
fn float_index_floors() {
    let scope = Scope::new();
    assert_eq!(eval_expr::<i64>("[0, 1, 2][1.9]", &scope), 1);
}

#[test]
fn stdlib_functions_resolve_without_registration() {
    let scope = Scope::new();
    assert_eq!(
        eval_expr::<Vec<Value>>("concat([true, \"foo\"], [], [false, 1])", &scope),
        vec![
            Value::Bool(true),
            Value::string("foo"),
            Value::Bool(false),
            Value::int(1),
        ]
    );

    std::env::set_var("SLUICE_EVAL_TEST_VAR", "Hello!");
    assert_eq!(
        eval_expr::<String>("env(\"SLUICE_EVAL_TEST_VAR\")", &scope),
        "Hello!"
    );

    let decoded: Vec<f64> = eval_expr("json_decode(\"[0, 1, 2]\")", &scope);
    assert_eq!(decoded, vec![0.0, 1.0, 2.0]);

    // Scope variables shadow the stdlib.
    let mut shadowing = Scope::new();
    shadowing.insert("concat", 3i64);
    assert_eq!(eval_expr::<i64>("concat", &shadowing), 3);
}

#[test]
fn custom_functions_coerce_arguments() {
    let mut scope = Scope::new();
    scope.insert_value(
        "add",
        Value::function(sluice_value::FunctionValue::from_fn2(|a: i64, b: i64| {
            Ok(a + b)
        })),
    );

    assert_eq!(eval_expr::<i64>("add(3, \"5\")", &scope), 8);
    assert!(eval_err("add(1)", &scope).contains("expected 2 args, got 1"));
    assert!(eval_err("add(1, true)", &scope).contains("invalid argument 2"));
}

// ---------------------------------------------------------------------------
// Block decoding
// ---------------------------------------------------------------------------

record! {
    #[derive(Debug, Default, PartialEq)]
    struct ServerBlock {
        port: u16 => (attr "port"),
        protocol: String => (attr optional "protocol"),
    }
}

record! {
    #[derive(Debug, Default, PartialEq)]
    struct RootConfig {
        listen: String => (attr "listen"),
        threads: Option<usize> => (attr optional "threads"),
        servers: Vec<ServerBlock> => (block optional "server"),
    }
}

fn decode_file<T: sluice_value::Record + Default>(src: &str) -> Result<T, sluice_eval::Error> {
    let file = parse_file("test.slc", src.as_bytes()).expect("file should parse");
    let mut out = T::default();
    Evaluator::new(&file).evaluate_into(&Scope::new(), &mut out)?;
    Ok(out)
}

#[test]
fn file_body_decodes_into_record() {
    let config: RootConfig = decode_file(
        "listen = \"0.0.0.0:8080\"\nthreads = 4\n\nserver {\n  port = 9001\n}\n",
    )
    .unwrap();

    assert_eq!(config.listen, "0.0.0.0:8080");
    assert_eq!(config.threads, Some(4));
    assert_eq!(
        config.servers,
        vec![ServerBlock {
            port: 9001,
            protocol: String::new(),
        }]
    );
}

#[test]
fn repeated_blocks_decode_in_source_order() {
    let config: RootConfig = decode_file(
        "listen = \"a\"\nserver {\n  port = 1\n}\nserver {\n  port = 2\n  protocol = \"udp\"\n}\n",
    )
    .unwrap();

    assert_eq!(config.servers.len(), 2);
    assert_eq!(config.servers[0].port, 1);
    assert_eq!(config.servers[1].port, 2);
    assert_eq!(config.servers[1].protocol, "udp");
}

#[test]
fn missing_required_attribute() {
    let err = decode_file::<RootConfig>("threads = 1\n").unwrap_err();
    assert!(
        err.to_string()
            .contains("missing required attribute \"listen\""),
        "{err}"
    );
}

#[test]
fn unrecognized_names_are_reported() {
    let err = decode_file::<RootConfig>("listen = \"a\"\nbogus = 1\n").unwrap_err();
    assert!(
        err.to_string().contains("unrecognized attribute name \"bogus\""),
        "{err}"
    );

    let err = decode_file::<RootConfig>("listen = \"a\"\nbogus {\n}\n").unwrap_err();
    assert!(
        err.to_string().contains("unrecognized block name \"bogus\""),
        "{err}"
    );
}

#[test]
fn duplicate_attributes_are_rejected() {
    let err = decode_file::<RootConfig>("listen = \"a\"\nlisten = \"b\"\n").unwrap_err();
    assert!(
        err.to_string()
            .contains("attribute \"listen\" may only be set once"),
        "{err}"
    );
}

#[test]
fn attribute_block_mismatches() {
    let err = decode_file::<RootConfig>("listen {\n}\n").unwrap_err();
    assert!(
        err.to_string()
            .contains("\"listen\" must be an attribute, but is used as a block"),
        "{err}"
    );

    let err = decode_file::<RootConfig>("listen = \"a\"\nserver = 1\n").unwrap_err();
    assert!(
        err.to_string()
            .contains("\"server\" must be a block, but is used as an attribute"),
        "{err}"
    );
}

#[test]
fn labeled_blocks() {
    record! {
        #[derive(Debug, Default, PartialEq)]
        struct Labeled {
            name: String => (label),
            value: i64 => (attr optional "value"),
        }
    }

    record! {
        #[derive(Debug, Default, PartialEq)]
        struct LabeledRoot {
            things: Vec<Labeled> => (block optional "thing"),
        }
    }

    // A labeled source decodes the label into the tagged slot.
    let config: LabeledRoot = decode_file("thing \"x\" {\n  value = 5\n}\n").unwrap();
    assert_eq!(config.things[0].name, "x");
    assert_eq!(config.things[0].value, 5);

    // A missing label is an error when the schema declares one.
    let err = decode_file::<LabeledRoot>("thing {\n}\n").unwrap_err();
    assert!(
        err.to_string().contains("requires non-empty label"),
        "{err}"
    );
}

#[test]
fn label_without_schema_support() {
    record! {
        #[derive(Debug, Default, PartialEq)]
        struct Plain {
            value: i64 => (attr optional "value"),
        }
    }

    record! {
        #[derive(Debug, Default, PartialEq)]
        struct PlainRoot {
            things: Vec<Plain> => (block optional "thing"),
        }
    }

    let err = decode_file::<PlainRoot>("thing \"x\" {\n}\n").unwrap_err();
    assert!(
        err.to_string().contains("does not support specifying labels"),
        "{err}"
    );
}

#[test]
fn single_block_slots_reject_repeats() {
    record! {
        #[derive(Debug, Default, PartialEq)]
        struct Wrapper {
            inner: ServerBlock => (block "server"),
        }
    }

    let config: Wrapper = decode_file("server {\n  port = 80\n}\n").unwrap();
    assert_eq!(config.inner.port, 80);

    let err =
        decode_file::<Wrapper>("server {\n  port = 80\n}\nserver {\n  port = 81\n}\n").unwrap_err();
    assert!(
        err.to_string()
            .contains("block \"server\" may only be specified once"),
        "{err}"
    );
}

#[test]
fn fixed_block_slots_truncate_and_default() {
    record! {
        #[derive(Debug, Default, PartialEq)]
        struct FixedRoot {
            servers: [ServerBlock; 2] => (block optional "server"),
        }
    }

    let config: FixedRoot = decode_file(
        "server {\n  port = 1\n}\nserver {\n  port = 2\n}\nserver {\n  port = 3\n}\n",
    )
    .unwrap();
    assert_eq!(config.servers[0].port, 1);
    assert_eq!(config.servers[1].port, 2);

    let config: FixedRoot = decode_file("server {\n  port = 9\n}\n").unwrap();
    assert_eq!(config.servers[0].port, 9);
    assert_eq!(config.servers[1], ServerBlock::default());
}

#[test]
fn dotted_block_names_match_schemas() {
    record! {
        #[derive(Debug, Default, PartialEq)]
        struct Remote {
            url: String => (attr "url"),
        }
    }

    record! {
        #[derive(Debug, Default, PartialEq)]
        struct Metrics {
            remote: Remote => (block "metrics.remote"),
        }
    }

    let config: Metrics = decode_file("metrics.remote {\n  url = \"http://x\"\n}\n").unwrap();
    assert_eq!(config.remote.url, "http://x");
}

#[test]
fn attribute_values_use_scope_and_expressions() {
    record! {
        #[derive(Debug, Default, PartialEq)]
        struct Computed {
            total: i64 => (attr "total"),
        }
    }

    let file = parse_file("test.slc", b"total = base * 2 + 1\n").unwrap();
    let mut scope = Scope::new();
    scope.insert("base", 20i64);

    let mut out = Computed::default();
    Evaluator::new(&file)
        .evaluate_into(&scope, &mut out)
        .unwrap();
    assert_eq!(out.total, 41);
}

#[test]
fn evaluation_errors_carry_positions() {
    let file = parse_file("conf.slc", b"listen = \"a\"\nthreads = oops\n").unwrap();
    let mut out = RootConfig::default();
    let err = Evaluator::new(&file)
        .evaluate_into(&Scope::new(), &mut out)
        .unwrap_err();

    // The error points at the identifier on line 2.
    assert_eq!(
        err.to_string(),
        "conf.slc:2:11: identifier \"oops\" does not exist"
    );
    assert!(err.position.is_valid());
}

#[test]
fn float_attribute_decodes_exactly() {
    record! {
        #[derive(Debug, Default, PartialEq)]
        struct Holder {
            attr: f64 => (attr "attr"),
        }
    }

    let config: Holder = decode_file("attr = 3.14\n").unwrap();
    assert_eq!(config.attr, 3.14);
}

#[test]
fn expression_node_decodes_into_record() {
    record! {
        #[derive(Debug, Default, PartialEq)]
        struct Pair {
            a: i64 => (key "a"),
            b: i64 => (key "b"),
        }
    }

    let expr = parse_expression("{ a = 1, b = 2 }").unwrap();
    let mut pair = Pair::default();
    Evaluator::new(&expr)
        .evaluate_into(&Scope::new(), &mut pair)
        .unwrap();
    assert_eq!(pair, Pair { a: 1, b: 2 });
}

#[test]
fn nested_decode_errors_describe_their_path() {
    record! {
        #[derive(Debug, Default, PartialEq)]
        struct Shaped {
            items: Vec<i64> => (attr "items"),
        }
    }

    let err = decode_file::<Shaped>("items = [1, 2, \"three\"]\n").unwrap_err();
    assert!(
        err.to_string().contains("index 2: expected number, got string"),
        "{err}"
    );
}
