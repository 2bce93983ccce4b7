//! Invoker generation engine.
//!
//! Given a type described through an [`Introspector`], produces units that
//! read and write fields, invoke methods and run constructors by small dense
//! index instead of by name:
//!
//! 1. [`classify`] orders the eligible members into a [`Layout`] grouped by
//!    calling-convention [`Shape`];
//! 2. [`select`] picks a [`Strategy`] from the member count and
//!    [`Thresholds`];
//! 3. the unit is built as dense dispatch tables ([`dispatch`]) or as a
//!    per-call resolving fallback ([`fallback`]);
//! 4. [`InvokerCache`] keeps one unit per (type, kind, scope) while the type
//!    description it was built from is current.
//!
//! [`FieldLookup`], [`MethodLookup`] and [`ConstructorLookup`] add
//! name-based access on top.
//!
//! [`Introspector`]: quiver_meta::Introspector

pub mod cache;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fallback;
pub mod generate;
pub mod kind;
pub mod layout;
pub mod lookup;
pub mod strategy;

pub use cache::{CacheKey, CacheStats, GenerationEvent, GenerationHook, InvokerCache};
pub use config::{EngineConfig, Thresholds};
pub use dispatch::{
    ConstructorInvoker, FieldAccess, MethodInvoker, SynthesizedConstructorInvoker,
    SynthesizedFieldAccess, SynthesizedMethodInvoker,
};
pub use error::{AcquireError, ConfigError, EngineFault, GenerationFailure, InvokeError};
pub use fallback::{ReflectiveConstructorInvoker, ReflectiveFieldAccess, ReflectiveMethodInvoker};
pub use generate::{
    GeneratedUnit, GenerationResult, Invoker, build_invoker, generate, unit_name,
};
pub use kind::{GenerationScope, InvokerKind, ScopeKind};
pub use layout::{Bucket, Layout, MemberDescriptor, Shape, classify};
pub use lookup::{ConstructorLookup, FieldLookup, MethodLookup};
pub use strategy::{Strategy, select};
