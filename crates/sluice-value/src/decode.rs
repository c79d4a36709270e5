//! Decoding [`Value`]s into host types.

use std::collections::{BTreeMap, HashMap};

use crate::error::Error;
use crate::kind::Kind;
use crate::number::{Number, NumberClass, NumberType};
use crate::record::Record;
use crate::value::Value;

/// Host types that can be decoded from a [`Value`].
///
/// Implementations apply the conversion lattice: numeric slots accept
/// numbers of any width and decimal strings, string slots accept numbers and
/// byte arrays, and aggregate slots decode elementwise.
///
/// Implementing `FromValue` by hand is the value-level unmarshal hook: the
/// implementation receives the raw value and may resume ordinary decoding
/// with [`Value::decode`] on whatever inner shape it expects. For hooks that
/// only need the text of string-valued input, implement
/// [`FromText`](crate::record::FromText) and wire it up with
/// [`impl_from_text!`](crate::impl_from_text) instead.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, Error>;

    /// True only for `u8`, which makes `Vec<u8>` eligible for the
    /// string-to-byte-sequence short circuit.
    #[doc(hidden)]
    const IS_BYTE: bool = false;
}

/// Extracts a number from a value, converting strings through the lattice.
/// `class` selects how string input is parsed.
fn number_operand(value: &Value, class: NumberClass) -> Result<Number, Error> {
    match value {
        Value::Number(number) => Ok(*number),
        Value::String(text) => match class {
            NumberClass::Int => text
                .parse::<i64>()
                .map(Number::from_i64)
                .map_err(|err| Error::custom(format!("cannot convert {text:?} to number: {err}"))),
            NumberClass::Uint => text
                .parse::<u64>()
                .map(Number::from_u64)
                .map_err(|err| Error::custom(format!("cannot convert {text:?} to number: {err}"))),
            NumberClass::Float => text
                .parse::<f64>()
                .map(Number::from_f64)
                .map_err(|err| Error::custom(format!("cannot convert {text:?} to number: {err}"))),
        },
        other => Err(Error::type_error(other, Kind::Number)),
    }
}

macro_rules! impl_from_value_number {
    ($($ty:ident => $target:ident, $class:ident, $accessor:ident);* $(;)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<$ty, Error> {
                    let number = number_operand(value, NumberClass::$class)?;
                    Ok(number.convert(NumberType::$target).$accessor() as $ty)
                }

                const IS_BYTE: bool = impl_from_value_number!(@is_byte $ty);
            }
        )*
    };
    (@is_byte u8) => { true };
    (@is_byte $ty:ident) => { false };
}

impl_from_value_number! {
    u8 => U8, Uint, as_u64;
    u16 => U16, Uint, as_u64;
    u32 => U32, Uint, as_u64;
    u64 => U64, Uint, as_u64;
    usize => Usize, Uint, as_u64;
    i8 => I8, Int, as_i64;
    i16 => I16, Int, as_i64;
    i32 => I32, Int, as_i64;
    i64 => I64, Int, as_i64;
    isize => Isize, Int, as_i64;
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<f32, Error> {
        let number = number_operand(value, NumberClass::Float)?;
        Ok(number.as_f64() as f32)
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<f64, Error> {
        let number = number_operand(value, NumberClass::Float)?;
        Ok(number.as_f64())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<bool, Error> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(Error::type_error(other, Kind::Bool)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<String, Error> {
        match value {
            Value::String(text) => Ok(text.clone()),
            // Numbers render as their decimal string.
            Value::Number(number) => Ok(number.to_string()),
            // A byte array converts to its verbatim text.
            Value::Array(_) => {
                let bytes = byte_array(value)
                    .ok_or_else(|| Error::type_error(value, Kind::String))?;
                String::from_utf8(bytes)
                    .map_err(|_| Error::custom("byte array is not valid UTF-8".to_string()))
            }
            other => Err(Error::type_error(other, Kind::String)),
        }
    }
}

/// The bytes of an array whose elements were encoded from `u8`, or `None`
/// if any element was not.
fn byte_array(value: &Value) -> Option<Vec<u8>> {
    let Value::Array(elements) = value else {
        return None;
    };
    elements
        .iter()
        .map(|element| match element {
            Value::Number(number) if number.ty() == NumberType::U8 => Some(number.as_u64() as u8),
            _ => None,
        })
        .collect()
}

impl FromValue for Value {
    /// The identity decode: slots of type [`Value`] accept anything.
    fn from_value(value: &Value) -> Result<Value, Error> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    /// Null decodes to `None`; any other value decodes the inner type.
    fn from_value(value: &Value) -> Result<Option<T>, Error> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Vec<T>, Error> {
        match value {
            Value::Array(elements) => elements
                .iter()
                .enumerate()
                .map(|(index, element)| {
                    T::from_value(element).map_err(|err| Error::element(index, err))
                })
                .collect(),
            // A string converts to its byte sequence.
            Value::String(text) if T::IS_BYTE => text
                .bytes()
                .map(|byte| T::from_value(&Value::Number(Number::from(byte))))
                .collect(),
            other => Err(Error::type_error(other, Kind::Array)),
        }
    }
}

impl<T: FromValue + Default, const N: usize> FromValue for [T; N] {
    /// Longer sources silently truncate; shorter sources leave the remaining
    /// elements defaulted.
    fn from_value(value: &Value) -> Result<[T; N], Error> {
        let Value::Array(elements) = value else {
            return Err(Error::type_error(value, Kind::Array));
        };

        let mut out: [T; N] = std::array::from_fn(|_| T::default());
        for (index, element) in elements.iter().take(N).enumerate() {
            out[index] = T::from_value(element).map_err(|err| Error::element(index, err))?;
        }
        Ok(out)
    }
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    fn from_value(value: &Value) -> Result<HashMap<String, T>, Error> {
        match value {
            Value::Object(object) => object
                .iter()
                .map(|(key, entry)| {
                    T::from_value(entry)
                        .map(|decoded| (key.to_string(), decoded))
                        .map_err(|err| Error::field(key, err))
                })
                .collect(),
            other => Err(Error::type_error(other, Kind::Object)),
        }
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: &Value) -> Result<BTreeMap<String, T>, Error> {
        match value {
            Value::Object(object) => object
                .iter()
                .map(|(key, entry)| {
                    T::from_value(entry)
                        .map(|decoded| (key.to_string(), decoded))
                        .map_err(|err| Error::field(key, err))
                })
                .collect(),
            other => Err(Error::type_error(other, Kind::Object)),
        }
    }
}

/// Decodes an object value into a record by key name.
///
/// Source keys route to fields by their tag names; a source key with no
/// matching field is a [`Error::MissingKey`]. Fields absent from the source
/// keep their current contents, so decoding normally starts from
/// `Default::default()`.
pub fn decode_record(value: &Value, target: &mut dyn Record) -> Result<(), Error> {
    let Value::Object(object) = value else {
        return Err(Error::type_error(value, Kind::Object));
    };

    let fields = target.fields();
    for (key, entry) in object.iter() {
        let Some(field) = fields.get(key) else {
            return Err(Error::missing_key(key));
        };
        target
            .set_field(field.index, entry)
            .map_err(|err| Error::field(key, err))?;
    }
    Ok(())
}
