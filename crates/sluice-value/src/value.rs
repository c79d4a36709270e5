//! The dynamically-typed value model.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::decode::FromValue;
use crate::encode::ToValue;
use crate::error::Error;
use crate::kind::Kind;
use crate::number::Number;
use crate::ty::{CapsuleType, FunctionType, ObjectKeyType, StaticType, Type};

/// A dynamically-typed value.
///
/// Values are produced by copying: arrays, objects, and maps are deep-copied
/// on construction, so later mutation of the source cannot reach an encoded
/// value. Capsules are the exception and carry the host value by reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The null value. Not valid as an operand in expressions.
    Null,
    Number(Number),
    String(String),
    Bool(bool),
    Array(Vec<Value>),
    Object(Object),
    Function(FunctionValue),
    Capsule(CapsuleValue),
}

impl Value {
    /// A number value from a signed integer.
    pub fn int(value: i64) -> Value {
        Value::Number(Number::from_i64(value))
    }

    /// A number value from an unsigned integer.
    pub fn uint(value: u64) -> Value {
        Value::Number(Number::from_u64(value))
    }

    /// A number value from a float.
    pub fn float(value: f64) -> Value {
        Value::Number(Number::from_f64(value))
    }

    /// A string value.
    pub fn string(value: impl Into<String>) -> Value {
        Value::String(value.into())
    }

    /// A bool value.
    pub fn bool(value: bool) -> Value {
        Value::Bool(value)
    }

    /// An array value from the given elements.
    pub fn array(elements: impl IntoIterator<Item = Value>) -> Value {
        Value::Array(elements.into_iter().collect())
    }

    /// A capsule value wrapping an arbitrary host value by reference.
    pub fn capsule<T: Any + Send + Sync>(value: T) -> Value {
        Value::Capsule(CapsuleValue::new(value))
    }

    /// A function value.
    pub fn function(function: FunctionValue) -> Value {
        Value::Function(function)
    }

    /// The kind of the value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Bool(_) => Kind::Bool,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
            Value::Function(_) => Kind::Function,
            Value::Capsule(_) => Kind::Capsule,
        }
    }

    /// The structural type of the value.
    pub fn ty(&self) -> Type {
        match self {
            Value::Null => Type::Null,
            Value::Number(_) => Type::Number,
            Value::String(_) => Type::String,
            Value::Bool(_) => Type::Bool,
            Value::Array(elements) => {
                let mut elem: Option<Type> = None;
                for element in elements {
                    let ty = element.ty();
                    match &elem {
                        None => elem = Some(ty),
                        Some(existing) if existing.equals(&ty) => {}
                        Some(_) => {
                            elem = Some(Type::Any);
                            break;
                        }
                    }
                }
                Type::Array(Box::new(elem.unwrap_or(Type::Any)))
            }
            Value::Object(object) => Type::Object(
                object
                    .iter()
                    .map(|(name, value)| ObjectKeyType {
                        name: name.to_string(),
                        ty: value.ty(),
                    })
                    .collect(),
            ),
            Value::Function(function) => Type::Function(function.ty.clone()),
            Value::Capsule(capsule) => Type::Capsule(capsule.ty),
        }
    }

    /// The length of an array or object value. Panics for other kinds.
    pub fn len(&self) -> usize {
        match self {
            Value::Array(elements) => elements.len(),
            Value::Object(object) => object.len(),
            other => panic!("len called on {} value", other.kind()),
        }
    }

    /// Whether an array or object value is empty. Panics for other kinds.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element `i` of an array value. Panics for other kinds or when out of
    /// range; callers bounds-check first.
    pub fn index(&self, i: usize) -> &Value {
        match self {
            Value::Array(elements) => &elements[i],
            other => panic!("index called on {} value", other.kind()),
        }
    }

    /// The value for a key of an object value. Panics for other kinds.
    pub fn key(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(object) => object.get(name),
            other => panic!("key called on {} value", other.kind()),
        }
    }

    /// The number payload. Panics for non-number values.
    pub fn number(&self) -> Number {
        match self {
            Value::Number(number) => *number,
            other => panic!("number called on {} value", other.kind()),
        }
    }

    /// Calls a function value with the provided arguments. Panics for
    /// non-function values; callers check the kind first.
    pub fn call(&self, args: &[Value]) -> Result<Value, Error> {
        match self {
            Value::Function(function) => function.call(args),
            other => panic!("call called on {} value", other.kind()),
        }
    }

    /// Decodes the value into a host type.
    pub fn decode<T: FromValue>(&self) -> Result<T, Error> {
        T::from_value(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Number(number) => write!(f, "{number}"),
            Value::String(text) => write!(f, "{text:?}"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Array(elements) => {
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("]")
            }
            Value::Object(object) => {
                if object.len() == 0 {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, (name, value)) in object.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if is_ident(name) {
                        write!(f, "{name} = {value}")?;
                    } else {
                        write!(f, "{name:?} = {value}")?;
                    }
                }
                f.write_str(" }")
            }
            Value::Function(_) => f.write_str("function"),
            Value::Capsule(capsule) => write!(f, "capsule({})", capsule.ty.name()),
        }
    }
}

fn is_ident(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .enumerate()
            .all(|(i, ch)| ch == '_' || ch.is_alphabetic() || (i > 0 && ch.is_numeric()))
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

/// An ordered mapping from strings to values. Keys are unique and iteration
/// follows insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    entries: Vec<(String, Value)>,
}

impl Object {
    pub fn new() -> Object {
        Object::default()
    }

    /// Inserts a key, replacing the value of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The keys of the object, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// The entries of the object, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for Object {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Object {
        let mut object = Object::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

type BoxedFn = Arc<dyn Fn(&[Value]) -> Result<Value, Error> + Send + Sync>;

/// A callable value with a typed signature.
///
/// Arguments are coerced through the conversion lattice when the wrapped
/// host function is invoked. Functions have exactly one result.
#[derive(Clone)]
pub struct FunctionValue {
    ty: FunctionType,
    func: BoxedFn,
}

impl FunctionValue {
    /// Wraps a raw function. The closure receives arity-checked but
    /// otherwise undecoded arguments.
    pub fn new(
        ty: FunctionType,
        func: impl Fn(&[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    ) -> FunctionValue {
        FunctionValue {
            ty,
            func: Arc::new(func),
        }
    }

    /// A function taking no arguments.
    pub fn from_fn0<R, F>(func: F) -> FunctionValue
    where
        R: ToValue + StaticType,
        F: Fn() -> Result<R, Error> + Send + Sync + 'static,
    {
        let ty = FunctionType {
            args: Vec::new(),
            variadic: false,
            ret: Box::new(R::static_type()),
        };
        FunctionValue::new(ty, move |_| func().map(|ret| ret.to_value()))
    }

    /// A function of one decoded argument.
    pub fn from_fn1<A, R, F>(func: F) -> FunctionValue
    where
        A: FromValue + StaticType,
        R: ToValue + StaticType,
        F: Fn(A) -> Result<R, Error> + Send + Sync + 'static,
    {
        let ty = FunctionType {
            args: vec![A::static_type()],
            variadic: false,
            ret: Box::new(R::static_type()),
        };
        FunctionValue::new(ty, move |args| {
            let a = decode_arg::<A>(args, 0)?;
            func(a).map(|ret| ret.to_value())
        })
    }

    /// A function of two decoded arguments.
    pub fn from_fn2<A, B, R, F>(func: F) -> FunctionValue
    where
        A: FromValue + StaticType,
        B: FromValue + StaticType,
        R: ToValue + StaticType,
        F: Fn(A, B) -> Result<R, Error> + Send + Sync + 'static,
    {
        let ty = FunctionType {
            args: vec![A::static_type(), B::static_type()],
            variadic: false,
            ret: Box::new(R::static_type()),
        };
        FunctionValue::new(ty, move |args| {
            let a = decode_arg::<A>(args, 0)?;
            let b = decode_arg::<B>(args, 1)?;
            func(a, b).map(|ret| ret.to_value())
        })
    }

    /// A fully variadic function: every argument shares the element type `A`.
    pub fn from_fn_variadic<A, R, F>(func: F) -> FunctionValue
    where
        A: FromValue + StaticType,
        R: ToValue + StaticType,
        F: Fn(Vec<A>) -> Result<R, Error> + Send + Sync + 'static,
    {
        let ty = FunctionType {
            args: vec![A::static_type()],
            variadic: true,
            ret: Box::new(R::static_type()),
        };
        FunctionValue::new(ty, move |args| {
            let decoded = args
                .iter()
                .enumerate()
                .map(|(i, arg)| {
                    A::from_value(arg)
                        .map_err(|err| Error::custom(format!("invalid argument {}: {err}", i + 1)))
                })
                .collect::<Result<Vec<A>, Error>>()?;
            func(decoded).map(|ret| ret.to_value())
        })
    }

    /// The signature of the function.
    pub fn signature(&self) -> &FunctionType {
        &self.ty
    }

    /// Invokes the function, checking arity first. Argument decoding applies
    /// the conversion lattice; a failed conversion fails the call.
    pub fn call(&self, args: &[Value]) -> Result<Value, Error> {
        if self.ty.variadic {
            let required = self.ty.args.len().saturating_sub(1);
            if args.len() < required {
                return Err(Error::custom(format!(
                    "expected {required} args, got {}",
                    args.len()
                )));
            }
        } else if args.len() != self.ty.args.len() {
            return Err(Error::custom(format!(
                "expected {} args, got {}",
                self.ty.args.len(),
                args.len()
            )));
        }
        (self.func)(args)
    }
}

fn decode_arg<T: FromValue>(args: &[Value], index: usize) -> Result<T, Error> {
    T::from_value(&args[index])
        .map_err(|err| Error::custom(format!("invalid argument {}: {err}", index + 1)))
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionValue({} args)", self.ty.args.len())
    }
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &FunctionValue) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

// ---------------------------------------------------------------------------
// Capsules
// ---------------------------------------------------------------------------

/// An opaque host value with identity by host type.
#[derive(Clone)]
pub struct CapsuleValue {
    pub(crate) ty: CapsuleType,
    value: Arc<dyn Any + Send + Sync>,
}

impl CapsuleValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> CapsuleValue {
        CapsuleValue {
            ty: CapsuleType {
                id: TypeId::of::<T>(),
                name: type_name::<T>(),
            },
            value: Arc::new(value),
        }
    }

    /// The host value, when the capsule holds a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// The host-type identity of the capsule.
    pub fn capsule_type(&self) -> CapsuleType {
        self.ty
    }
}

impl fmt::Debug for CapsuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CapsuleValue({})", self.ty.name())
    }
}

impl PartialEq for CapsuleValue {
    fn eq(&self, other: &CapsuleValue) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}
