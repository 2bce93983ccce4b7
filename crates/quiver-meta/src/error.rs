// error.rs
//
// Faults raised by accessor closures and registration errors.

use quiver_identity::TypeRef;
use thiserror::Error;

use crate::Value;

/// A value could not be converted to the declared type.
///
/// Raised for `Null` where a primitive or non-nullable reference is required,
/// and for a value of a different kind. There is no widening.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot unbox {found} as {expected}")]
pub struct UnboxError {
    pub expected: TypeRef,
    pub found: &'static str,
}

impl UnboxError {
    pub fn new(expected: TypeRef, found: &Value) -> Self {
        Self {
            expected,
            found: found.kind_name(),
        }
    }
}

/// Failure inside an accessor, method body or constructor body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessFault {
    #[error("target is not a `{expected}`")]
    TargetMismatch { expected: &'static str },

    #[error(transparent)]
    Unbox(#[from] UnboxError),

    #[error("expected {expected} arguments, found {found}")]
    Arity { expected: usize, found: usize },

    #[error("member is read-only")]
    ReadOnly,
}

/// Registration errors reported by [`crate::TypeBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetaError {
    #[error("duplicate {kind} `{name}({signature})` declared by `{declaring}` on `{type_name}`")]
    DuplicateMember {
        type_name: String,
        kind: &'static str,
        name: String,
        signature: String,
        declaring: String,
    },

    #[error("`{type_name}` inherits from `{base}`, which is not registered")]
    BaseNotRegistered {
        type_name: String,
        base: &'static str,
    },

    #[error("`{type_name}` already has a supertype")]
    MultipleSupertypes { type_name: String },
}
