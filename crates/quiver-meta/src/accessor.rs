//! Typed accessor closures.
//!
//! Every member of a described type carries closures over `&dyn Any` /
//! `&mut dyn Any`. Primitive kinds get their own variant with the raw Rust
//! type in the signature, which is what lets the specialized entry points of
//! a dispatch unit skip boxing entirely.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use quiver_identity::PrimitiveKind;

use crate::error::AccessFault;
use crate::value::{FromValue, Value};

pub type Getter<V> = Arc<dyn Fn(&dyn Any) -> Result<V, AccessFault> + Send + Sync>;
pub type Setter<V> = Arc<dyn Fn(&mut dyn Any, V) -> Result<(), AccessFault> + Send + Sync>;

/// Generic calling convention: boxed arguments in, boxed result out.
pub type InvokeFn =
    Arc<dyn Fn(&mut dyn Any, &[Value]) -> Result<Value, AccessFault> + Send + Sync>;

/// One unboxed argument in, boxed result out.
pub type UnaryFn<V> = Arc<dyn Fn(&mut dyn Any, V) -> Result<Value, AccessFault> + Send + Sync>;

/// Boxed arguments in, unboxed result out.
pub type ReturnFn<V> = Arc<dyn Fn(&mut dyn Any, &[Value]) -> Result<V, AccessFault> + Send + Sync>;

pub type ConstructFn = Arc<dyn Fn(&[Value]) -> Result<Box<dyn Any>, AccessFault> + Send + Sync>;

/// Projects a derived instance onto its embedded base.
pub type Projection = Arc<dyn Fn(&dyn Any) -> Result<&dyn Any, AccessFault> + Send + Sync>;
pub type ProjectionMut =
    Arc<dyn Fn(&mut dyn Any) -> Result<&mut dyn Any, AccessFault> + Send + Sync>;

/// A typed method body with one argument, before type erasure of the target.
pub type UnaryCall<T, A> = Arc<dyn Fn(&mut T, A) -> Value + Send + Sync>;

pub fn downcast_ref<T: Any>(target: &dyn Any) -> Result<&T, AccessFault> {
    target
        .downcast_ref::<T>()
        .ok_or(AccessFault::TargetMismatch {
            expected: type_name::<T>(),
        })
}

pub fn downcast_mut<T: Any>(target: &mut dyn Any) -> Result<&mut T, AccessFault> {
    target
        .downcast_mut::<T>()
        .ok_or(AccessFault::TargetMismatch {
            expected: type_name::<T>(),
        })
}

pub fn projection<F>(f: F) -> Projection
where
    F: for<'a> Fn(&'a dyn Any) -> Result<&'a dyn Any, AccessFault> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub fn projection_mut<F>(f: F) -> ProjectionMut
where
    F: for<'a> Fn(&'a mut dyn Any) -> Result<&'a mut dyn Any, AccessFault>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Getter plus optional setter. `set` is `None` for read-only fields.
pub struct TypedField<V> {
    pub get: Getter<V>,
    pub set: Option<Setter<V>>,
}

impl<V> Clone for TypedField<V> {
    fn clone(&self) -> Self {
        Self {
            get: self.get.clone(),
            set: self.set.clone(),
        }
    }
}

impl<V: 'static> TypedField<V> {
    pub fn project(&self, p: &Projection, pm: &ProjectionMut) -> Self {
        let get = {
            let (get, p) = (self.get.clone(), p.clone());
            Arc::new(move |target: &dyn Any| get(p(target)?)) as Getter<V>
        };
        let set = self.set.as_ref().map(|set| {
            let (set, pm) = (set.clone(), pm.clone());
            Arc::new(move |target: &mut dyn Any, value: V| set(pm(target)?, value)) as Setter<V>
        });
        Self { get, set }
    }
}

fn project_unary<V: 'static>(f: &UnaryFn<V>, pm: &ProjectionMut) -> UnaryFn<V> {
    let (f, pm) = (f.clone(), pm.clone());
    Arc::new(move |target: &mut dyn Any, arg: V| f(pm(target)?, arg))
}

fn project_return<V: 'static>(f: &ReturnFn<V>, pm: &ProjectionMut) -> ReturnFn<V> {
    let (f, pm) = (f.clone(), pm.clone());
    Arc::new(move |target: &mut dyn Any, args: &[Value]| f(pm(target)?, args))
}

macro_rules! define_accessor_enums {
    ($($Kind:ident => $ty:ident),* $(,)?) => {
        /// Accessors for one field, typed by the field's primitive kind.
        #[derive(Clone)]
        pub enum FieldAccessor {
            $($Kind(TypedField<$ty>),)*
            Reference(TypedField<Value>),
        }

        impl FieldAccessor {
            pub fn kind(&self) -> Option<PrimitiveKind> {
                match self {
                    $(FieldAccessor::$Kind(_) => Some(PrimitiveKind::$Kind),)*
                    FieldAccessor::Reference(_) => None,
                }
            }

            pub fn is_writable(&self) -> bool {
                match self {
                    $(FieldAccessor::$Kind(f) => f.set.is_some(),)*
                    FieldAccessor::Reference(f) => f.set.is_some(),
                }
            }

            /// Read and box the value.
            pub fn get_boxed(&self, target: &dyn Any) -> Result<Value, AccessFault> {
                match self {
                    $(FieldAccessor::$Kind(f) => (f.get)(target).map(Value::$Kind),)*
                    FieldAccessor::Reference(f) => (f.get)(target),
                }
            }

            /// Unbox and write the value. Read-only is checked before unboxing.
            pub fn set_boxed(&self, target: &mut dyn Any, value: Value) -> Result<(), AccessFault> {
                match self {
                    $(
                        FieldAccessor::$Kind(f) => {
                            let set = f.set.as_ref().ok_or(AccessFault::ReadOnly)?;
                            set(target, <$ty as FromValue>::from_value(&value)?)
                        }
                    )*
                    FieldAccessor::Reference(f) => {
                        let set = f.set.as_ref().ok_or(AccessFault::ReadOnly)?;
                        set(target, value)
                    }
                }
            }

            pub fn project(&self, p: &Projection, pm: &ProjectionMut) -> Self {
                match self {
                    $(FieldAccessor::$Kind(f) => FieldAccessor::$Kind(f.project(p, pm)),)*
                    FieldAccessor::Reference(f) => FieldAccessor::Reference(f.project(p, pm)),
                }
            }
        }

        /// Single-primitive-argument entry of a method.
        #[derive(Clone)]
        pub enum UnaryEntry {
            $($Kind(UnaryFn<$ty>),)*
        }

        impl UnaryEntry {
            pub fn kind(&self) -> PrimitiveKind {
                match self {
                    $(UnaryEntry::$Kind(_) => PrimitiveKind::$Kind,)*
                }
            }

            pub fn project(&self, pm: &ProjectionMut) -> Self {
                match self {
                    $(UnaryEntry::$Kind(f) => UnaryEntry::$Kind(project_unary(f, pm)),)*
                }
            }
        }

        /// Primitive-return entry of a method.
        #[derive(Clone)]
        pub enum ReturnEntry {
            $($Kind(ReturnFn<$ty>),)*
        }

        impl ReturnEntry {
            pub fn kind(&self) -> PrimitiveKind {
                match self {
                    $(ReturnEntry::$Kind(_) => PrimitiveKind::$Kind,)*
                }
            }

            pub fn project(&self, pm: &ProjectionMut) -> Self {
                match self {
                    $(ReturnEntry::$Kind(f) => ReturnEntry::$Kind(project_return(f, pm)),)*
                }
            }
        }
    };
}

crate::for_each_primitive!(define_accessor_enums);

impl fmt::Debug for FieldAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind().map_or("ref", PrimitiveKind::as_str);
        let mode = if self.is_writable() { "rw" } else { "ro" };
        write!(f, "FieldAccessor({kind}, {mode})")
    }
}

/// Everything needed to call one method through any entry point.
#[derive(Clone)]
pub struct MethodBody {
    pub invoke: InvokeFn,
    pub unary: Option<UnaryEntry>,
    pub returning: Option<ReturnEntry>,
}

impl MethodBody {
    pub fn project(&self, pm: &ProjectionMut) -> Self {
        let invoke = {
            let (f, pm) = (self.invoke.clone(), pm.clone());
            Arc::new(move |target: &mut dyn Any, args: &[Value]| f(pm(target)?, args)) as InvokeFn
        };
        Self {
            invoke,
            unary: self.unary.as_ref().map(|entry| entry.project(pm)),
            returning: self.returning.as_ref().map(|entry| entry.project(pm)),
        }
    }
}

impl fmt::Debug for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodBody")
            .field("unary", &self.unary.as_ref().map(UnaryEntry::kind))
            .field("returning", &self.returning.as_ref().map(ReturnEntry::kind))
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct ConstructorBody {
    pub construct: ConstructFn,
}

impl fmt::Debug for ConstructorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConstructorBody")
    }
}
