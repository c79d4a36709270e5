//! Cross-kind value conversion.
//!
//! Conversions between kinds are intentionally restricted: numbers render to
//! their decimal strings, and strings parse to numbers. Everything else must
//! already have the right kind (byte arrays and strings additionally have an
//! explicit short-circuit in the decoder).

use crate::error::Error;
use crate::kind::Kind;
use crate::number::Number;
use crate::value::Value;

/// Converts a value to a value of a different kind. The only valid
/// conversions between kinds are between numbers and strings.
pub fn convert_value(value: &Value, to: Kind) -> Result<Value, Error> {
    let from = value.kind();

    if from == to {
        // no-op: the value is already the right kind.
        return Ok(value.clone());
    }

    match (value, to) {
        (Value::Number(number), Kind::String) => Ok(Value::String(number.to_string())),

        (Value::String(text), Kind::Number) => parse_number(text).map(Value::Number),

        _ => Err(Error::custom(format!("cannot assign {from} to {to}"))),
    }
}

/// Parses a string into a number following the conversion lattice: a leading
/// `-` parses signed, a `.`, `e`, or `E` parses floating point, anything else
/// parses unsigned. Empty strings are an error.
pub fn parse_number(text: &str) -> Result<Number, Error> {
    if text.is_empty() {
        return Err(Error::custom(format!(
            "cannot convert string {text:?} to number"
        )));
    }

    if text.starts_with('-') {
        // Starts with a -; parse as a signed int.
        return match text.parse::<i64>() {
            Ok(value) => Ok(Number::from_i64(value)),
            Err(err) => Err(Error::custom(format!(
                "cannot convert string {text:?} to number: {err}"
            ))),
        };
    }

    if text.contains(['.', 'e', 'E']) {
        // Contains something a floating-point number would use; parse float.
        return match text.parse::<f64>() {
            Ok(value) => Ok(Number::from_f64(value)),
            Err(err) => Err(Error::custom(format!(
                "cannot convert string {text:?} to number: {err}"
            ))),
        };
    }

    // Otherwise, treat the number as an unsigned int.
    match text.parse::<u64>() {
        Ok(value) => Ok(Number::from_u64(value)),
        Err(err) => Err(Error::custom(format!(
            "cannot convert string {text:?} to number: {err}"
        ))),
    }
}
