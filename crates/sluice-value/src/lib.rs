//! The dynamically-typed value model for sluice.
//!
//! This crate defines the [`Value`] sum type with explicit [`Kind`]s, the
//! numeric precision model, the cross-kind conversion lattice, structural
//! [`Type`] descriptors, encoding and decoding between host types and
//! values, and the record schema machinery (tags, the process-wide schema
//! cache, and the [`record!`] derivation macro) used to bind configuration
//! to host structs.

pub mod convert;
pub mod decode;
pub mod encode;
pub mod error;
pub mod kind;
pub mod number;
pub mod ops;
pub mod record;
pub mod tags;
pub mod ty;
mod value;

pub use convert::{convert_value, parse_number};
pub use decode::{decode_record, FromValue};
pub use encode::ToValue;
pub use error::Error;
pub use kind::Kind;
pub use number::{Number, NumberClass, NumberType};
pub use ops::{binop, unary};
pub use record::{BlockCardinality, BlockSlot, FromText, Record};
pub use tags::{cached_fields, parse_fields, Field, Fields};
pub use ty::{CapsuleType, FunctionType, ObjectKeyType, StaticType, Type};
pub use value::{CapsuleValue, FunctionValue, Object, Value};
