//! Shared fixtures for the sluice benchmarks.

/// A representative configuration used by the parser and printer benches.
pub const SAMPLE_CONFIG: &str = r#"
log_level = "info"
max_connections = 1024

server "public" {
  listen  = "0.0.0.0:8080"
  timeout = 30

  tls {
    enabled = true
    ciphers = ["a", "b", "c"]
  }
}

server "admin" {
  listen  = "127.0.0.1:9090"
  timeout = 5
}
"#;

/// Expression sources paired with their names, mirroring the operator and
/// access paths the evaluator optimizes for.
pub const EXPRS: &[(&str, &str)] = &[
    ("or", "false || true"),
    ("and", "true && false"),
    ("eq", "3 == 5"),
    ("lt", "3 < 5"),
    ("add", "3 + 5"),
    ("div", "3.0 / 5.0"),
    ("mod", "5 % 3"),
    ("pow", "3 ^ 5"),
    ("binop_chain", "3 + 5 * 2"),
    ("ident_lookup", "foobar"),
    ("array", "[0, 1, 2]"),
    ("object", "{ a = 5, b = 10 }"),
    ("access", "{ a = 15 }.a"),
    ("nested_access", "{ a = { b = 12 } }.a.b"),
    ("index", "[0, 1, 2][1]"),
    ("nested_index", "[[1, 2, 3]][0][2]"),
    ("paren", "(15)"),
    ("unary_not", "!true"),
    ("unary_neg", "-15"),
];
