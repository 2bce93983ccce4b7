// error.rs
//! Engine errors: generation failures (Q1xxx), call-time errors (Q2xxx),
//! configuration errors (Q3xxx) and engine faults (Q9xxx).

#![allow(unused_assignments)] // False positives from thiserror derive

use std::path::PathBuf;

use miette::Diagnostic;
use quiver_identity::TypeKey;
use quiver_meta::{AccessFault, UnboxError};
use thiserror::Error;

use crate::kind::InvokerKind;

/// Why no unit could be generated. Carried inside a
/// [`GenerationResult`](crate::GenerationResult), never raised.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    #[error("type {key} is not described by the introspector")]
    #[diagnostic(code(Q1001), help("register the type before requesting invokers"))]
    UnknownType { key: TypeKey },

    #[error("`{type_name}` has no constructor visible from scope {scope}")]
    #[diagnostic(code(Q1002))]
    NoEligibleConstructors { type_name: String, scope: String },
}

/// Internal inconsistency between a layout and the type description it was
/// built from. Never cached.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[error("layout of `{type_name}` names {member}, which the type description does not have")]
#[diagnostic(code(Q9001), help("this is a bug in the introspector or the engine"))]
pub struct EngineFault {
    pub type_name: String,
    pub member: String,
}

/// Errors raised by a dispatch unit or lookup helper at call time.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("index {index} is not a valid {view} index (layout has {len} members)")]
    #[diagnostic(code(Q2001))]
    InvalidIndex {
        index: usize,
        len: usize,
        view: &'static str,
    },

    #[error("cannot {operation} `{member}`: member is read-only")]
    #[diagnostic(code(Q2002))]
    UnsupportedOperation {
        operation: &'static str,
        member: String,
    },

    #[error("{0}")]
    #[diagnostic(code(Q2003))]
    Unbox(#[from] UnboxError),

    #[error("target is not a `{expected}`")]
    #[diagnostic(code(Q2004))]
    TargetMismatch { expected: &'static str },

    #[error("expected {expected} arguments, found {found}")]
    #[diagnostic(code(Q2005))]
    ArgumentCount { expected: usize, found: usize },

    #[error("no {kind} matches `{name}`")]
    #[diagnostic(code(Q2006))]
    NoSuchMember { kind: &'static str, name: String },

    #[error("call to {kind} `{name}` is ambiguous between {candidates}")]
    #[diagnostic(code(Q2008), help("name the parameter types explicitly"))]
    Ambiguous {
        kind: &'static str,
        name: String,
        candidates: String,
    },

    #[error("{0}")]
    #[diagnostic(code(Q2900))]
    Fault(#[from] EngineFault),
}

impl From<AccessFault> for InvokeError {
    fn from(fault: AccessFault) -> Self {
        match fault {
            AccessFault::TargetMismatch { expected } => InvokeError::TargetMismatch { expected },
            AccessFault::Unbox(err) => InvokeError::Unbox(err),
            AccessFault::Arity { expected, found } => InvokeError::ArgumentCount { expected, found },
            AccessFault::ReadOnly => InvokeError::UnsupportedOperation {
                operation: "set",
                member: "field".to_string(),
            },
        }
    }
}

/// Failure to obtain a usable invoker of a particular kind.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum AcquireError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Generation(#[from] GenerationFailure),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Fault(#[from] EngineFault),

    #[error("expected a {expected} unit, found a {found} unit")]
    #[diagnostic(code(Q2007))]
    WrongKind {
        expected: InvokerKind,
        found: InvokerKind,
    },
}

#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("cannot read config file {}", path.display())]
    #[diagnostic(code(Q3001))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid engine config")]
    #[diagnostic(code(Q3002))]
    Parse(#[from] toml::de::Error),

    #[error("{var}={value:?} is not a valid threshold")]
    #[diagnostic(code(Q3003), help("thresholds are non-negative integers"))]
    InvalidOverride { var: &'static str, value: String },

    #[error("cannot serialize engine config")]
    #[diagnostic(code(Q3004))]
    Serialize(#[from] toml::ser::Error),
}
