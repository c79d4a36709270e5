//! Conversion of literal expressions into values.

use sluice_ast::LitKind;
use sluice_syntax::unquote;
use sluice_value::Value;

pub(crate) fn value_from_literal(kind: LitKind, text: &str) -> Result<Value, String> {
    match kind {
        LitKind::Number => match text.parse::<i64>() {
            Ok(value) => Ok(Value::int(value)),
            Err(err) => Err(format!("invalid number literal {text}: {err}")),
        },
        LitKind::Float => match text.parse::<f64>() {
            Ok(value) => Ok(Value::float(value)),
            Err(err) => Err(format!("invalid float literal {text}: {err}")),
        },
        LitKind::String => unquote(text).map(Value::String),
        LitKind::Bool => match text {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(format!("invalid boolean literal {text:?}")),
        },
        LitKind::Null => Ok(Value::Null),
    }
}
