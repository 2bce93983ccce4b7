// quiver-identity/src/lib.rs
//
// Shared identities for the invoker engine: entity ids, primitive kinds,
// canonical type references and the naming scheme for generated units.

mod entities;
mod namer;
mod primitive_kind;
mod type_ref;

pub use entities::{ModuleId, TypeKey, UnitId};
pub use namer::{UnitNameTable, UnitNamer, signature_hash};
pub use primitive_kind::PrimitiveKind;
pub use type_ref::{TypeRef, canonical_signature};
