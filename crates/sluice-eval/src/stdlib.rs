//! The standard library of functions available to every evaluation.
//!
//! Identifier lookup consults the scope chain first and falls back to these
//! functions, so hosts never need to register them.

use std::collections::HashMap;
use std::sync::OnceLock;

use sluice_value::{Error, FunctionValue, Object, Value};

static STDLIB: OnceLock<HashMap<&'static str, Value>> = OnceLock::new();

/// Looks up a standard library identifier.
pub fn lookup(name: &str) -> Option<Value> {
    STDLIB.get_or_init(build).get(name).cloned()
}

fn build() -> HashMap<&'static str, Value> {
    let mut functions = HashMap::new();

    functions.insert(
        "env",
        Value::function(FunctionValue::from_fn1(|name: String| {
            Ok(std::env::var(&name).unwrap_or_default())
        })),
    );

    functions.insert(
        "concat",
        Value::function(FunctionValue::from_fn_variadic(|arrays: Vec<Vec<Value>>| {
            Ok(arrays.into_iter().flatten().collect::<Vec<Value>>())
        })),
    );

    functions.insert(
        "json_decode",
        Value::function(FunctionValue::from_fn1(|text: String| {
            serde_json::from_str::<serde_json::Value>(&text)
                .map(json_to_value)
                .map_err(|err| Error::custom(format!("failed to decode JSON: {err}")))
        })),
    );

    functions
}

/// Converts decoded JSON into a value. JSON numbers always become floats,
/// matching how untyped JSON unmarshalling behaves in most hosts.
fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(value) => Value::Bool(value),
        serde_json::Value::Number(number) => Value::float(number.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(text) => Value::String(text),
        serde_json::Value::Array(elements) => {
            Value::Array(elements.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| (key, json_to_value(value)))
                .collect::<Object>(),
        ),
    }
}
