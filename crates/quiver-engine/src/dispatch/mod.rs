//! Invoker unit traits and the synthesized (table-driven) implementations.
//!
//! A unit is addressed by the dense indices of its [`Layout`]. Besides the
//! boxed entry points every trait has one entry point per primitive kind
//! that takes or returns the raw value. Those are stamped out by
//! `for_each_primitive!`, so `get_i32`, `set_f64`, `invoke_with_char`,
//! `invoke_bool` and friends all exist.
//!
//! Calling a per-kind entry point with an index outside that kind's bucket
//! (or, for `invoke_<k>`, with a method that does not return `k`) fails with
//! [`InvokeError::InvalidIndex`], exactly like an index past the end.

mod constructors;
mod fields;
mod methods;

pub use constructors::SynthesizedConstructorInvoker;
pub use fields::SynthesizedFieldAccess;
pub use methods::SynthesizedMethodInvoker;

use std::any::Any;

use paste::paste;
use quiver_meta::{AccessFault, TypeInfo, Value};

use crate::error::{EngineFault, InvokeError};
use crate::layout::{Layout, MemberDescriptor};
use crate::strategy::Strategy;

macro_rules! define_unit_traits {
    ($($Kind:ident => $ty:ident),* $(,)?) => {
        paste! {
            /// Index-addressed field access.
            pub trait FieldAccess: Send + Sync {
                fn layout(&self) -> &Layout;
                fn strategy(&self) -> Strategy;

                fn get(&self, index: usize, target: &dyn Any) -> Result<Value, InvokeError>;
                fn set(&self, index: usize, target: &mut dyn Any, value: Value) -> Result<(), InvokeError>;

                $(
                    fn [<get_ $ty>](&self, index: usize, target: &dyn Any) -> Result<$ty, InvokeError>;
                    fn [<set_ $ty>](&self, index: usize, target: &mut dyn Any, value: $ty) -> Result<(), InvokeError>;
                )*
            }

            /// Index-addressed method invocation.
            pub trait MethodInvoker: Send + Sync {
                fn layout(&self) -> &Layout;
                fn strategy(&self) -> Strategy;

                /// Boxed arguments in, boxed result out. Void methods return
                /// [`Value::Void`].
                fn invoke(&self, index: usize, target: &mut dyn Any, args: &[Value]) -> Result<Value, InvokeError>;

                /// Methods of the nullary bucket only.
                fn invoke0(&self, index: usize, target: &mut dyn Any) -> Result<Value, InvokeError>;

                $(
                    fn [<invoke_with_ $ty>](&self, index: usize, target: &mut dyn Any, arg: $ty) -> Result<Value, InvokeError>;
                    fn [<invoke_ $ty>](&self, index: usize, target: &mut dyn Any, args: &[Value]) -> Result<$ty, InvokeError>;
                )*
            }
        }
    };
}

quiver_meta::for_each_primitive!(define_unit_traits);

/// Index-addressed construction.
pub trait ConstructorInvoker: Send + Sync {
    fn layout(&self) -> &Layout;
    fn strategy(&self) -> Strategy;

    fn new_instance(&self, index: usize, args: &[Value]) -> Result<Box<dyn Any>, InvokeError>;
}

pub(crate) fn invalid_index(layout: &Layout, index: usize, view: &'static str) -> InvokeError {
    InvokeError::InvalidIndex {
        index,
        len: layout.len(),
        view,
    }
}

/// Convert an accessor fault, naming the member for read-only writes.
pub(crate) fn access_fault(layout: &Layout, index: usize, fault: AccessFault) -> InvokeError {
    match fault {
        AccessFault::ReadOnly => read_only(layout, index),
        other => InvokeError::from(other),
    }
}

pub(crate) fn read_only(layout: &Layout, index: usize) -> InvokeError {
    InvokeError::UnsupportedOperation {
        operation: "set",
        member: layout
            .member(index)
            .map_or_else(|| index.to_string(), |m| m.name.to_string()),
    }
}

pub(crate) fn missing_member(info: &TypeInfo, member: &MemberDescriptor) -> EngineFault {
    EngineFault {
        type_name: info.name.to_string(),
        member: format!(
            "{} `{}({})` of `{}`",
            member.kind, member.name, member.signature, member.declaring_name
        ),
    }
}

/// Typed entries of one primitive bucket, addressed by global index.
pub(crate) struct KindTable<E> {
    start: usize,
    entries: Box<[E]>,
}

impl<E> KindTable<E> {
    pub(crate) fn new(start: usize, entries: Box<[E]>) -> Self {
        Self { start, entries }
    }

    pub(crate) fn empty() -> Self {
        Self::new(0, Box::default())
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> Option<&E> {
        self.entries.get(index.checked_sub(self.start)?)
    }
}
