// value.rs
//
// Uniform boxed representation for values crossing a generic entry point,
// and the conversions between Rust member types and that representation.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use quiver_identity::{PrimitiveKind, TypeRef};

use crate::accessor::{
    FieldAccessor, Getter, ReturnEntry, ReturnFn, Setter, TypedField, UnaryCall, UnaryEntry,
    downcast_mut,
};
use crate::error::UnboxError;

/// Shared reference to an arbitrary object.
pub type ObjectRef = Arc<dyn Any + Send + Sync>;

/// A boxed value.
///
/// Primitives are boxed exactly once when they cross a generic entry point.
/// `Void` is what generic paths return for members that produce nothing;
/// it is distinct from `Null`, which is an absent reference.
#[derive(Clone)]
pub enum Value {
    Void,
    Null,
    Bool(bool),
    I8(i8),
    Char(char),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Str(Arc<str>),
    Object(ObjectRef),
}

impl Value {
    pub fn str(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Value::Object(Arc::new(value))
    }

    /// Short name of the value's kind, used in unbox diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I8(_) => "i8",
            Value::Char(_) => "char",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Str(_) => "str",
            Value::Object(_) => "object",
        }
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            Value::Bool(_) => Some(PrimitiveKind::Bool),
            Value::I8(_) => Some(PrimitiveKind::I8),
            Value::Char(_) => Some(PrimitiveKind::Char),
            Value::I16(_) => Some(PrimitiveKind::I16),
            Value::I32(_) => Some(PrimitiveKind::I32),
            Value::I64(_) => Some(PrimitiveKind::I64),
            Value::F32(_) => Some(PrimitiveKind::F32),
            Value::F64(_) => Some(PrimitiveKind::F64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn downcast_object<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Value::Object(object) => object.clone().downcast::<T>().ok(),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => f.write_str("Void"),
            Value::Null => f.write_str("Null"),
            Value::Bool(v) => write!(f, "Bool({v})"),
            Value::I8(v) => write!(f, "I8({v})"),
            Value::Char(v) => write!(f, "Char({v:?})"),
            Value::I16(v) => write!(f, "I16({v})"),
            Value::I32(v) => write!(f, "I32({v})"),
            Value::I64(v) => write!(f, "I64({v})"),
            Value::F32(v) => write!(f, "F32({v:?})"),
            Value::F64(v) => write!(f, "F64({v:?})"),
            Value::Str(v) => write!(f, "Str({v:?})"),
            Value::Object(v) => write!(f, "Object({:p})", Arc::as_ptr(v)),
        }
    }
}

/// Floats compare by bit pattern so a stored NaN reads back equal to itself.
/// Objects compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

/// Box a Rust value.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Unbox a Rust value. Exact kind match only.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, UnboxError>;
}

/// A Rust type usable as a field, parameter or return type.
///
/// The default hooks box everything; primitive kinds override them so their
/// accessors and fast paths carry the raw type.
pub trait MemberType: FromValue + IntoValue + Send + Sync + Sized + 'static {
    fn type_ref() -> TypeRef;

    fn field_accessor(get: Getter<Self>, set: Option<Setter<Self>>) -> FieldAccessor {
        let boxed_get: Getter<Value> = Arc::new(move |target: &dyn Any| {
            get(target).map(IntoValue::into_value)
        });
        let boxed_set = set.map(|set| -> Setter<Value> {
            Arc::new(move |target: &mut dyn Any, value: Value| {
                let value = Self::from_value(&value)?;
                set(target, value)
            })
        });
        FieldAccessor::Reference(TypedField {
            get: boxed_get,
            set: boxed_set,
        })
    }

    /// Single-argument fast path taking this type unboxed.
    fn unary_entry<T: Any>(call: UnaryCall<T, Self>) -> Option<UnaryEntry> {
        let _ = call;
        None
    }

    /// Fast path returning this type unboxed.
    fn return_entry(call: ReturnFn<Self>) -> Option<ReturnEntry> {
        let _ = call;
        None
    }
}

macro_rules! primitive_member_types {
    ($($Kind:ident => $ty:ident),* $(,)?) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::$Kind(self)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, UnboxError> {
                    match value {
                        Value::$Kind(v) => Ok(*v),
                        other => Err(UnboxError::new(<$ty as MemberType>::type_ref(), other)),
                    }
                }
            }

            impl MemberType for $ty {
                fn type_ref() -> TypeRef {
                    TypeRef::Primitive(PrimitiveKind::$Kind)
                }

                fn field_accessor(get: Getter<Self>, set: Option<Setter<Self>>) -> FieldAccessor {
                    FieldAccessor::$Kind(TypedField { get, set })
                }

                fn unary_entry<T: Any>(call: UnaryCall<T, Self>) -> Option<UnaryEntry> {
                    Some(UnaryEntry::$Kind(Arc::new(
                        move |target: &mut dyn Any, arg: $ty| {
                            let target = downcast_mut::<T>(target)?;
                            Ok(call(target, arg))
                        },
                    )))
                }

                fn return_entry(call: ReturnFn<Self>) -> Option<ReturnEntry> {
                    Some(ReturnEntry::$Kind(call))
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$Kind(v)
                }
            }
        )*
    };
}

crate::for_each_primitive!(primitive_member_types);

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Void
    }
}

impl FromValue for () {
    fn from_value(value: &Value) -> Result<Self, UnboxError> {
        match value {
            Value::Void => Ok(()),
            other => Err(UnboxError::new(TypeRef::Void, other)),
        }
    }
}

impl MemberType for () {
    fn type_ref() -> TypeRef {
        TypeRef::Void
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Str(Arc::from(self))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, UnboxError> {
        match value {
            Value::Str(s) => Ok(s.to_string()),
            other => Err(UnboxError::new(TypeRef::Str, other)),
        }
    }
}

impl MemberType for String {
    fn type_ref() -> TypeRef {
        TypeRef::Str
    }
}

impl IntoValue for Option<String> {
    fn into_value(self) -> Value {
        match self {
            Some(s) => Value::Str(Arc::from(s)),
            None => Value::Null,
        }
    }
}

impl FromValue for Option<String> {
    fn from_value(value: &Value) -> Result<Self, UnboxError> {
        match value {
            Value::Null => Ok(None),
            Value::Str(s) => Ok(Some(s.to_string())),
            other => Err(UnboxError::new(TypeRef::Str, other)),
        }
    }
}

impl MemberType for Option<String> {
    fn type_ref() -> TypeRef {
        TypeRef::Str
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, UnboxError> {
        Ok(value.clone())
    }
}

impl MemberType for Value {
    fn type_ref() -> TypeRef {
        TypeRef::Any
    }
}

impl<T: Any + Send + Sync> IntoValue for Arc<T> {
    fn into_value(self) -> Value {
        Value::Object(self)
    }
}

impl<T: Any + Send + Sync> FromValue for Arc<T> {
    fn from_value(value: &Value) -> Result<Self, UnboxError> {
        match value {
            Value::Object(object) => object
                .clone()
                .downcast::<T>()
                .map_err(|_| UnboxError::new(Self::type_ref(), value)),
            other => Err(UnboxError::new(Self::type_ref(), other)),
        }
    }
}

impl<T: Any + Send + Sync> MemberType for Arc<T> {
    fn type_ref() -> TypeRef {
        TypeRef::Object(type_name::<T>())
    }
}

impl<T: Any + Send + Sync> IntoValue for Option<Arc<T>> {
    fn into_value(self) -> Value {
        match self {
            Some(object) => Value::Object(object),
            None => Value::Null,
        }
    }
}

impl<T: Any + Send + Sync> FromValue for Option<Arc<T>> {
    fn from_value(value: &Value) -> Result<Self, UnboxError> {
        match value {
            Value::Null => Ok(None),
            other => Arc::<T>::from_value(other).map(Some),
        }
    }
}

impl<T: Any + Send + Sync> MemberType for Option<Arc<T>> {
    fn type_ref() -> TypeRef {
        TypeRef::Object(type_name::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_unbox_exact_kind_only() {
        assert_eq!(i32::from_value(&Value::I32(-7)), Ok(-7));
        let err = i32::from_value(&Value::I64(1)).unwrap_err();
        assert_eq!(err.expected, TypeRef::I32);
        assert_eq!(err.found, "i64");
    }

    #[test]
    fn null_never_unboxes_to_a_primitive() {
        for kind in PrimitiveKind::ALL {
            let err = match kind {
                PrimitiveKind::Bool => bool::from_value(&Value::Null).map(|_| ()),
                PrimitiveKind::I8 => i8::from_value(&Value::Null).map(|_| ()),
                PrimitiveKind::Char => char::from_value(&Value::Null).map(|_| ()),
                PrimitiveKind::I16 => i16::from_value(&Value::Null).map(|_| ()),
                PrimitiveKind::I32 => i32::from_value(&Value::Null).map(|_| ()),
                PrimitiveKind::I64 => i64::from_value(&Value::Null).map(|_| ()),
                PrimitiveKind::F32 => f32::from_value(&Value::Null).map(|_| ()),
                PrimitiveKind::F64 => f64::from_value(&Value::Null).map(|_| ()),
            }
            .unwrap_err();
            assert_eq!(err.found, "null");
            assert_eq!(err.expected, TypeRef::Primitive(kind));
        }
    }

    #[test]
    fn nullable_string_accepts_null() {
        assert_eq!(Option::<String>::from_value(&Value::Null), Ok(None));
        assert_eq!(
            Option::<String>::from_value(&Value::from("hi")),
            Ok(Some("hi".to_string()))
        );
        assert!(String::from_value(&Value::Null).is_err());
    }

    #[test]
    fn objects_downcast_by_type() {
        struct Marker(u8);
        let value = Value::object(Marker(3));
        let marker = Arc::<Marker>::from_value(&value).unwrap();
        assert_eq!(marker.0, 3);
        assert!(Arc::<String>::from_value(&value).is_err());
        assert!(matches!(
            Option::<Arc<Marker>>::from_value(&Value::Null),
            Ok(None)
        ));
    }

    #[test]
    fn floats_compare_by_bits() {
        assert_eq!(Value::F64(f64::NAN), Value::F64(f64::NAN));
        assert_ne!(Value::F32(0.0), Value::F32(-0.0));
    }

    #[test]
    fn void_and_null_are_distinct() {
        assert_ne!(Value::Void, Value::Null);
        assert_eq!(().into_value(), Value::Void);
    }
}
