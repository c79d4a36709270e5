//! Error types produced by the value layer.

use std::fmt;

use crate::kind::Kind;
use crate::Value;

/// An error from decoding or converting values.
///
/// Nested [`Error::Element`] and [`Error::Field`] variants accumulate the
/// path to the offending value; rendering flattens the chain into a readable
/// message like:
///
/// ```text
/// {a:{b:[_]}} field a.b[2] should be number, got string
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A value had an unexpected kind.
    Type { value: Box<Value>, expected: Kind },
    /// An object was missing a key required by the decode target.
    MissingKey { missing: String },
    /// An error inside an array element.
    Element { index: usize, inner: Box<Error> },
    /// An error inside an object field.
    Field { field: String, inner: Box<Error> },
    /// Any other failure, such as an impossible conversion.
    Custom(String),
}

impl Error {
    pub fn type_error(value: &Value, expected: Kind) -> Error {
        Error::Type {
            value: Box::new(value.clone()),
            expected,
        }
    }

    pub fn missing_key(missing: impl Into<String>) -> Error {
        Error::MissingKey {
            missing: missing.into(),
        }
    }

    pub fn element(index: usize, inner: Error) -> Error {
        Error::Element {
            index,
            inner: Box::new(inner),
        }
    }

    pub fn field(field: impl Into<String>, inner: Error) -> Error {
        Error::Field {
            field: field.into(),
            inner: Box::new(inner),
        }
    }

    pub fn custom(message: impl Into<String>) -> Error {
        Error::Custom(message.into())
    }
}

enum Segment<'a> {
    Field(&'a str),
    Index(usize),
}

fn flatten(err: &Error) -> (Vec<Segment<'_>>, &Error) {
    let mut segments = Vec::new();
    let mut current = err;
    loop {
        match current {
            Error::Field { field, inner } => {
                segments.push(Segment::Field(field));
                current = inner;
            }
            Error::Element { index, inner } => {
                segments.push(Segment::Index(*index));
                current = inner;
            }
            other => return (segments, other),
        }
    }
}

/// The `{a:{b:[_]}}` shape sketch marking the error location.
fn sketch(segments: &[Segment<'_>]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Field(name) => {
                out.push('{');
                out.push_str(name);
                out.push(':');
            }
            Segment::Index(_) => out.push('['),
        }
    }
    out.push('_');
    for segment in segments.iter().rev() {
        match segment {
            Segment::Field(_) => out.push('}'),
            Segment::Index(_) => out.push(']'),
        }
    }
    out
}

/// The `a.b[2]` form of the error path.
fn path(segments: &[Segment<'_>]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Field(name) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(name);
            }
            Segment::Index(index) => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
        }
    }
    out
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (segments, terminal) = flatten(self);

        if segments.is_empty() {
            return match terminal {
                Error::Type { value, expected } => {
                    write!(f, "expected {expected}, got {}", value.kind())
                }
                Error::MissingKey { missing } => {
                    write!(f, "key {missing:?} does not exist")
                }
                Error::Custom(message) => f.write_str(message),
                _ => unreachable!("flatten returns a terminal error"),
            };
        }

        let has_field = segments
            .iter()
            .any(|segment| matches!(segment, Segment::Field(_)));
        if !has_field {
            // Pure element errors keep the plain nested form.
            for segment in &segments {
                if let Segment::Index(index) = segment {
                    write!(f, "index {index}: ")?;
                }
            }
            return fmt::Display::fmt(terminal, f);
        }

        write!(f, "{} field {}", sketch(&segments), path(&segments))?;
        match terminal {
            Error::Type { value, expected } => {
                write!(f, " should be {expected}, got {}", value.kind())
            }
            other => write!(f, ": {other}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_type_error() {
        let err = Error::type_error(&Value::string("x"), Kind::Number);
        assert_eq!(err.to_string(), "expected number, got string");
    }

    #[test]
    fn nested_path_renders_sketch() {
        let err = Error::field(
            "a",
            Error::field(
                "b",
                Error::element(2, Error::type_error(&Value::string("x"), Kind::Number)),
            ),
        );
        assert_eq!(
            err.to_string(),
            "{a:{b:[_]}} field a.b[2] should be number, got string"
        );
    }

    #[test]
    fn pure_element_errors_keep_index_form() {
        let err = Error::element(3, Error::type_error(&Value::bool(true), Kind::String));
        assert_eq!(err.to_string(), "index 3: expected string, got bool");
    }

    #[test]
    fn missing_key_in_path() {
        let err = Error::field("settings", Error::missing_key("unknown"));
        assert_eq!(
            err.to_string(),
            "{settings:_} field settings: key \"unknown\" does not exist"
        );
    }
}
