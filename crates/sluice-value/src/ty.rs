//! Structural type descriptors for values.

use std::any::TypeId;
use std::fmt;

use crate::kind::Kind;

/// A structural descriptor of a value's kind plus arity.
#[derive(Debug, Clone)]
pub enum Type {
    Null,
    /// The sentinel for slots which accept any value.
    Any,
    Number,
    String,
    Bool,
    /// An array with a uniform element type, or [`Type::Any`] elements when
    /// mixed.
    Array(Box<Type>),
    /// A string-keyed mapping with a uniform element type.
    Map(Box<Type>),
    /// An object with ordered, named keys.
    Object(Vec<ObjectKeyType>),
    Function(FunctionType),
    Capsule(CapsuleType),
}

/// An individual key within an object type.
#[derive(Debug, Clone)]
pub struct ObjectKeyType {
    pub name: String,
    pub ty: Type,
}

/// The signature of a function value.
#[derive(Debug, Clone)]
pub struct FunctionType {
    /// Declared parameter types. For variadic functions the final entry is
    /// the element type shared by the variadic tail.
    pub args: Vec<Type>,
    pub variadic: bool,
    /// Functions have exactly one result.
    pub ret: Box<Type>,
}

/// Host-type identity for a capsule.
#[derive(Debug, Clone, Copy)]
pub struct CapsuleType {
    pub(crate) id: TypeId,
    pub(crate) name: &'static str,
}

impl CapsuleType {
    /// The host type name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Type {
    /// The kind of values this type describes.
    pub fn kind(&self) -> Kind {
        match self {
            Type::Null => Kind::Null,
            // Any unwraps on access; treat it as a capsule for reporting.
            Type::Any => Kind::Capsule,
            Type::Number => Kind::Number,
            Type::String => Kind::String,
            Type::Bool => Kind::Bool,
            Type::Array(_) => Kind::Array,
            Type::Map(_) | Type::Object(_) => Kind::Object,
            Type::Function(_) => Kind::Function,
            Type::Capsule(_) => Kind::Capsule,
        }
    }

    /// The element type of an array or map. Panics for other types.
    pub fn elem(&self) -> &Type {
        match self {
            Type::Array(elem) | Type::Map(elem) => elem,
            other => panic!("elem called on non-array and non-map type {other}"),
        }
    }

    /// Structural equality: scalar types are equal per kind, arrays and maps
    /// compare element types, objects compare ordered keys, functions compare
    /// arguments and result, and capsules compare host-type identity.
    pub fn equals(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Null, Type::Null)
            | (Type::Any, Type::Any)
            | (Type::Number, Type::Number)
            | (Type::String, Type::String)
            | (Type::Bool, Type::Bool) => true,

            (Type::Array(a), Type::Array(b)) | (Type::Map(a), Type::Map(b)) => a.equals(b),

            (Type::Object(a), Type::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|(x, y)| x.name == y.name && x.ty.equals(&y.ty))
            }

            (Type::Function(a), Type::Function(b)) => {
                a.args.len() == b.args.len()
                    && a.variadic == b.variadic
                    && a.args.iter().zip(b.args.iter()).all(|(x, y)| x.equals(y))
                    && a.ret.equals(&b.ret)
            }

            (Type::Capsule(a), Type::Capsule(b)) => a.id == b.id,

            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => f.write_str("any"),
            Type::Capsule(capsule) => write!(f, "capsule({})", capsule.name),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Host types with a statically-known value [`Type`]. Used to build function
/// signatures for declared parameters and results.
pub trait StaticType {
    fn static_type() -> Type;
}

macro_rules! impl_static_type {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(
            impl StaticType for $ty {
                fn static_type() -> Type {
                    $kind
                }
            }
        )*
    };
}

impl_static_type! {
    u8 => Type::Number,
    u16 => Type::Number,
    u32 => Type::Number,
    u64 => Type::Number,
    usize => Type::Number,
    i8 => Type::Number,
    i16 => Type::Number,
    i32 => Type::Number,
    i64 => Type::Number,
    isize => Type::Number,
    f32 => Type::Number,
    f64 => Type::Number,
    bool => Type::Bool,
    String => Type::String,
}

impl StaticType for crate::Value {
    fn static_type() -> Type {
        Type::Any
    }
}

impl<T: StaticType> StaticType for Vec<T> {
    fn static_type() -> Type {
        Type::Array(Box::new(T::static_type()))
    }
}

impl<T: StaticType> StaticType for Option<T> {
    fn static_type() -> Type {
        T::static_type()
    }
}

impl<T: StaticType> StaticType for std::collections::HashMap<String, T> {
    fn static_type() -> Type {
        Type::Map(Box::new(T::static_type()))
    }
}

impl<T: StaticType> StaticType for std::collections::BTreeMap<String, T> {
    fn static_type() -> Type {
        Type::Map(Box::new(T::static_type()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_equality_is_per_kind() {
        assert!(Type::Number.equals(&Type::Number));
        assert!(!Type::Number.equals(&Type::String));
    }

    #[test]
    fn array_equality_is_structural() {
        let a = Type::Array(Box::new(Type::Number));
        let b = Type::Array(Box::new(Type::Number));
        let c = Type::Array(Box::new(Type::String));
        assert!(a.equals(&b));
        assert!(!a.equals(&c));
        assert_eq!(a.elem().kind(), Kind::Number);
    }

    #[test]
    fn object_equality_uses_ordered_keys() {
        let make = |names: &[&str]| {
            Type::Object(
                names
                    .iter()
                    .map(|n| ObjectKeyType {
                        name: n.to_string(),
                        ty: Type::Number,
                    })
                    .collect(),
            )
        };
        assert!(make(&["a", "b"]).equals(&make(&["a", "b"])));
        assert!(!make(&["a", "b"]).equals(&make(&["b", "a"])));
        assert!(!make(&["a"]).equals(&make(&["a", "b"])));
    }

    #[test]
    fn function_equality_compares_signature() {
        let sig = |variadic| {
            Type::Function(FunctionType {
                args: vec![Type::Number, Type::String],
                variadic,
                ret: Box::new(Type::Bool),
            })
        };
        assert!(sig(false).equals(&sig(false)));
        assert!(!sig(false).equals(&sig(true)));
    }
}
