//! Encoding host values into [`Value`]s.

use std::collections::{BTreeMap, HashMap};

use crate::number::Number;
use crate::value::{FunctionValue, Object, Value};

/// Host types that can be encoded into a [`Value`].
///
/// Encoding copies: arrays, maps, and records are deep-copied so later
/// mutation of the source cannot reach the encoded value. Capsule types
/// opt in through [`impl_capsule!`](crate::impl_capsule) and carry the host
/// value by reference instead.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

macro_rules! impl_to_value_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Number(Number::from(*self))
                }
            }
        )*
    };
}

impl_to_value_number!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToValue for &str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for FunctionValue {
    fn to_value(&self) -> Value {
        Value::Function(self.clone())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    /// `None` encodes to null.
    fn to_value(&self) -> Value {
        match self {
            Some(value) => value.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue> ToValue for HashMap<String, T> {
    fn to_value(&self) -> Value {
        // Hash maps have no deterministic order; sort keys so equal maps
        // encode to equal objects.
        let mut entries: Vec<(&String, &T)> = self.iter().collect();
        entries.sort_by_key(|(key, _)| key.as_str());
        Value::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key.clone(), value.to_value()))
                .collect::<Object>(),
        )
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_value()))
                .collect::<Object>(),
        )
    }
}
