//! Type descriptions for the invoker engine.
//!
//! This crate is the introspection side of quiver. Embedding applications
//! describe their types once through [`TypeRegistry::define`] and a
//! [`TypeBuilder`]; the engine then enumerates members through the
//! [`Introspector`] trait without knowing how the descriptions were made.
//!
//! - `value` - the uniform boxed [`Value`] and box/unbox conversions
//! - `accessor` - typed accessor closures, one variant per primitive kind
//! - `handler` - turns ordinary closures into method and constructor bodies
//! - `members` / `type_info` - member definitions and the per-type description
//! - `builder` - fluent registration API
//! - `registry` - key assignment, module interning, the global registry

/// Invoke `$callback!` with the `Kind => type` list of all primitive kinds.
///
/// The list order matches `PrimitiveKind::ALL`. Used to stamp out the
/// per-kind variants, tables and entry points without repeating the list.
#[macro_export]
macro_rules! for_each_primitive {
    ($callback:ident) => {
        $callback! {
            Bool => bool,
            I8 => i8,
            Char => char,
            I16 => i16,
            I32 => i32,
            I64 => i64,
            F32 => f32,
            F64 => f64,
        }
    };
}

pub mod accessor;
mod builder;
mod error;
mod handler;
mod members;
mod registry;
mod type_info;
mod value;

pub use accessor::{
    ConstructFn, ConstructorBody, FieldAccessor, Getter, InvokeFn, MethodBody, Projection,
    ProjectionMut, ReturnEntry, ReturnFn, Setter, TypedField, UnaryEntry, UnaryFn, downcast_mut,
    downcast_ref,
};
pub use builder::TypeBuilder;
pub use error::{AccessFault, MetaError, UnboxError};
pub use handler::{ConstructorHandler, MethodHandler};
pub use members::{ConstructorDef, FieldDef, MemberDecl, MemberOrigin, MethodDef, Visibility};
pub use registry::{Introspector, TypeRegistry, global_registry};
pub use type_info::TypeInfo;
pub use value::{FromValue, IntoValue, MemberType, ObjectRef, Value};

pub use quiver_identity::{ModuleId, PrimitiveKind, TypeKey, TypeRef};
