//! Record derivation.
//!
//! A record is a host struct that decoding can treat as a list of named,
//! typed, flagged slots. The [`record!`](crate::record) macro derives the
//! [`Record`] capability (plus [`FromValue`](crate::FromValue),
//! [`ToValue`](crate::ToValue), and a single-block [`BlockSlot`]) from a
//! plain struct definition whose fields are annotated with their slot role:
//!
//! ```
//! use sluice_value::record;
//!
//! record! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct Endpoint {
//!         pub url: String => (attr "url"),
//!         pub timeout: Option<u64> => (attr optional "timeout"),
//!     }
//! }
//! ```
//!
//! Records must also derive `Default`; decoding starts from the default
//! value, and fields absent from the source are left untouched.

use std::sync::Arc;

use crate::error::Error;
use crate::tags::Fields;
use crate::value::Value;

/// Describes a host record as a list of named, typed, flagged slots.
///
/// Implemented by the [`record!`](crate::record) macro; the methods are
/// object-safe so decoders can drive any record through `&mut dyn Record`.
pub trait Record {
    /// The ordered `(field, tag)` pairs of the record, using the tag grammar
    /// documented in [`tags`](crate::tags).
    fn record_tags() -> &'static [(&'static str, &'static str)]
    where
        Self: Sized;

    /// The short type name, used in diagnostics.
    fn record_name() -> &'static str
    where
        Self: Sized;

    /// The parsed schema, from the process-wide cache.
    fn fields(&self) -> Arc<Fields>;

    /// Assigns the block label. Only called when the schema declares a label
    /// field.
    fn set_label(&mut self, label: &str);

    /// Encodes slot `index` into a value.
    fn field_value(&self, index: usize) -> Value;

    /// Decodes a value into slot `index`. Panics if `index` is out of range;
    /// input-driven failures return an error.
    fn set_field(&mut self, index: usize, value: &Value) -> Result<(), Error>;

    /// The block target for slot `index`. Panics if the slot is not
    /// block-flagged.
    fn block_slot(&mut self, index: usize) -> &mut dyn BlockSlot;
}

/// How many source blocks a block-flagged slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCardinality {
    /// Exactly one block (scalar and option slots).
    Single,
    /// Zero or more blocks (sequence slots).
    Sequence,
    /// Up to `N` blocks; the remainder is reset to defaults.
    Fixed(usize),
}

/// A slot that one or more blocks decode into.
pub trait BlockSlot {
    fn cardinality(&self) -> BlockCardinality;

    /// Prepares the slot to receive `count` blocks: sequences are reset to
    /// `count` defaulted elements, fixed arrays default their tail, options
    /// are allocated, and scalars are untouched.
    fn prepare(&mut self, count: usize);

    /// The record for the `index`th source block.
    fn block(&mut self, index: usize) -> &mut dyn Record;
}

impl<T: Record + Default> BlockSlot for Option<T> {
    fn cardinality(&self) -> BlockCardinality {
        BlockCardinality::Single
    }

    fn prepare(&mut self, _count: usize) {
        if self.is_none() {
            *self = Some(T::default());
        }
    }

    fn block(&mut self, _index: usize) -> &mut dyn Record {
        self.as_mut().expect("prepare allocates the slot")
    }
}

impl<T: Record + Default> BlockSlot for Vec<T> {
    fn cardinality(&self) -> BlockCardinality {
        BlockCardinality::Sequence
    }

    fn prepare(&mut self, count: usize) {
        // Reset the sequence; repeated decodes never accumulate.
        *self = (0..count).map(|_| T::default()).collect();
    }

    fn block(&mut self, index: usize) -> &mut dyn Record {
        &mut self[index]
    }
}

impl<T: Record + Default, const N: usize> BlockSlot for [T; N] {
    fn cardinality(&self) -> BlockCardinality {
        BlockCardinality::Fixed(N)
    }

    fn prepare(&mut self, count: usize) {
        // Elements past the provided blocks reset to their defaults.
        for slot in &mut self[count.min(N)..] {
            *slot = T::default();
        }
    }

    fn block(&mut self, index: usize) -> &mut dyn Record {
        &mut self[index]
    }
}

/// Host types which unmarshal from the text of string-valued input. Wire an
/// implementation into decoding with [`impl_from_text!`](crate::impl_from_text).
pub trait FromText: Sized {
    fn from_text(text: &str) -> Result<Self, Error>;
}

/// Derives [`Record`], [`FromValue`](crate::FromValue),
/// [`ToValue`](crate::ToValue), and [`BlockSlot`] for a struct whose fields
/// are annotated with slot roles:
///
/// | Role                    | Tag form              |
/// |-------------------------|-----------------------|
/// | `(attr "name")`         | `name,attr`           |
/// | `(attr optional "name")`| `name,attr,optional`  |
/// | `(block "name")`        | `name,block`          |
/// | `(block optional "name")`| `name,block,optional`|
/// | `(key "name")`          | `name,key`            |
/// | `(key optional "name")` | `name,key,optional`   |
/// | `(label)`               | `,label`              |
/// | `(skip)`                | `-`                   |
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $fname:ident : $fty:ty => $role:tt
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $fname: $fty,
            )*
        }

        impl $crate::Record for $name {
            fn record_tags() -> &'static [(&'static str, &'static str)] {
                &[$((stringify!($fname), $crate::record!(@tag $role))),*]
            }

            fn record_name() -> &'static str {
                stringify!($name)
            }

            fn fields(&self) -> ::std::sync::Arc<$crate::Fields> {
                $crate::cached_fields(
                    ::std::any::TypeId::of::<$name>(),
                    stringify!($name),
                    <$name as $crate::Record>::record_tags(),
                )
            }

            fn set_label(&mut self, label: &str) {
                let _ = label;
                $($crate::record!(@set_label self, label, $fname, $role);)*
            }

            fn field_value(&self, index: usize) -> $crate::Value {
                let mut slot = 0usize;
                $($crate::record!(@field_value self, slot, index, $fname, $role);)*
                let _ = slot;
                panic!(
                    "field_value index {} out of range for {}",
                    index,
                    stringify!($name),
                )
            }

            fn set_field(
                &mut self,
                index: usize,
                value: &$crate::Value,
            ) -> ::core::result::Result<(), $crate::Error> {
                let mut slot = 0usize;
                $($crate::record!(@set_field self, slot, index, value, $fname, $fty, $role);)*
                let _ = slot;
                panic!(
                    "set_field index {} out of range for {}",
                    index,
                    stringify!($name),
                )
            }

            fn block_slot(&mut self, index: usize) -> &mut dyn $crate::BlockSlot {
                let mut slot = 0usize;
                $($crate::record!(@block_slot self, slot, index, $fname, $role);)*
                let _ = slot;
                panic!(
                    "block_slot index {} is not a block slot in {}",
                    index,
                    stringify!($name),
                )
            }
        }

        impl $crate::FromValue for $name {
            fn from_value(
                value: &$crate::Value,
            ) -> ::core::result::Result<$name, $crate::Error> {
                let mut out = <$name as ::core::default::Default>::default();
                $crate::decode_record(value, &mut out)?;
                ::core::result::Result::Ok(out)
            }
        }

        impl $crate::ToValue for $name {
            fn to_value(&self) -> $crate::Value {
                let fields = $crate::Record::fields(self);
                let mut object = $crate::Object::new();
                for field in fields.iter() {
                    if field.is_ignored() || field.is_label() {
                        continue;
                    }
                    object.insert(field.name, $crate::Record::field_value(self, field.index));
                }
                $crate::Value::Object(object)
            }
        }

        impl $crate::BlockSlot for $name {
            fn cardinality(&self) -> $crate::BlockCardinality {
                $crate::BlockCardinality::Single
            }

            fn prepare(&mut self, _count: usize) {}

            fn block(&mut self, index: usize) -> &mut dyn $crate::Record {
                debug_assert_eq!(index, 0, "single block slots hold one block");
                self
            }
        }
    };

    // -- Tag text for each role --
    (@tag (attr $n:literal)) => { concat!($n, ",attr") };
    (@tag (attr optional $n:literal)) => { concat!($n, ",attr,optional") };
    (@tag (block $n:literal)) => { concat!($n, ",block") };
    (@tag (block optional $n:literal)) => { concat!($n, ",block,optional") };
    (@tag (key $n:literal)) => { concat!($n, ",key") };
    (@tag (key optional $n:literal)) => { concat!($n, ",key,optional") };
    (@tag (label)) => { ",label" };
    (@tag (skip)) => { "-" };

    // -- Label assignment: only the label slot receives the text --
    (@set_label $self:ident, $label:ident, $fname:ident, (label)) => {
        $self.$fname = $label.to_string();
    };
    (@set_label $self:ident, $label:ident, $fname:ident, $role:tt) => {};

    // -- Slot encoding --
    (@field_value $self:ident, $slot:ident, $index:ident, $fname:ident, (skip)) => {
        if $slot == $index {
            return $crate::Value::Null;
        }
        $slot += 1;
    };
    (@field_value $self:ident, $slot:ident, $index:ident, $fname:ident, $role:tt) => {
        if $slot == $index {
            return $crate::ToValue::to_value(&$self.$fname);
        }
        $slot += 1;
    };

    // -- Slot decoding --
    (@set_field $self:ident, $slot:ident, $index:ident, $value:ident, $fname:ident, $fty:ty, (skip)) => {
        if $slot == $index {
            return ::core::result::Result::Ok(());
        }
        $slot += 1;
    };
    (@set_field $self:ident, $slot:ident, $index:ident, $value:ident, $fname:ident, $fty:ty, $role:tt) => {
        if $slot == $index {
            $self.$fname = <$fty as $crate::FromValue>::from_value($value)?;
            return ::core::result::Result::Ok(());
        }
        $slot += 1;
    };

    // -- Block targets --
    (@block_slot $self:ident, $slot:ident, $index:ident, $fname:ident, (block $n:literal)) => {
        if $slot == $index {
            return &mut $self.$fname;
        }
        $slot += 1;
    };
    (@block_slot $self:ident, $slot:ident, $index:ident, $fname:ident, (block optional $n:literal)) => {
        if $slot == $index {
            return &mut $self.$fname;
        }
        $slot += 1;
    };
    (@block_slot $self:ident, $slot:ident, $index:ident, $fname:ident, $role:tt) => {
        $slot += 1;
    };
}

/// Wires a [`FromText`] implementation into decoding: the value converts to
/// a string first (numbers and byte arrays included), then the text hook
/// runs.
#[macro_export]
macro_rules! impl_from_text {
    ($ty:ty) => {
        impl $crate::FromValue for $ty {
            fn from_value(
                value: &$crate::Value,
            ) -> ::core::result::Result<$ty, $crate::Error> {
                let text = <::std::string::String as $crate::FromValue>::from_value(value)?;
                <$ty as $crate::FromText>::from_text(&text)
            }
        }
    };
}

/// Marks a host type as a capsule: it encodes by reference with identity by
/// host type, and decodes only into slots of exactly the same type.
///
/// The type must be `Clone + Send + Sync + 'static`.
#[macro_export]
macro_rules! impl_capsule {
    ($ty:ty) => {
        impl $crate::ToValue for $ty {
            fn to_value(&self) -> $crate::Value {
                $crate::Value::capsule(<$ty as ::core::clone::Clone>::clone(self))
            }
        }

        impl $crate::FromValue for $ty {
            fn from_value(
                value: &$crate::Value,
            ) -> ::core::result::Result<$ty, $crate::Error> {
                match value {
                    $crate::Value::Capsule(capsule) => capsule
                        .downcast_ref::<$ty>()
                        .cloned()
                        .ok_or_else(|| {
                            $crate::Error::custom(format!(
                                "cannot assign capsule of type {} to {}",
                                capsule.capsule_type().name(),
                                ::std::any::type_name::<$ty>(),
                            ))
                        }),
                    other => Err($crate::Error::type_error(other, $crate::Kind::Capsule)),
                }
            }
        }
    };
}
