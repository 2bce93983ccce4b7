// src/lib.rs
//! quiver: index-addressed member invokers for registered Rust types.
//!
//! Describe a type once with [`TypeRegistry::define`], then ask an
//! [`InvokerCache`] for its field, method or constructor units and call
//! members by dense index (or by name through the lookup helpers).
//!
//! The engine lives in the workspace crates and is re-exported here; this
//! crate adds the `quiver` command-line tool.

pub mod bench;
pub mod cli;
pub mod commands;
pub mod errors;

pub use quiver_engine as engine;
pub use quiver_identity as identity;
pub use quiver_meta as meta;

pub use quiver_engine::{
    AcquireError, CacheStats, ConstructorInvoker, ConstructorLookup, EngineConfig, EngineFault,
    FieldAccess, FieldLookup, GenerationFailure, GenerationResult, GenerationScope, InvokeError,
    InvokerCache, InvokerKind, Layout, MethodInvoker, MethodLookup, ScopeKind, Shape, Strategy,
    Thresholds,
};
pub use quiver_meta::{
    Introspector, MemberDecl, TypeBuilder, TypeInfo, TypeKey, TypeRef, TypeRegistry, Value,
    global_registry,
};
