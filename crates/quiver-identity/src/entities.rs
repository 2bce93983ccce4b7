//! First-class identity types for registered types and generated units.
//!
//! Keys are plain indices handed out by the owning table. They are cheap to
//! copy and hash, and they never alias across entity kinds.

use std::fmt;

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis struct $name(u32);

        impl $name {
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            pub const fn index(self) -> u32 {
                self.0
            }
        }
    };
}

define_entity_id! {
    /// Stable identity for a registered target type.
    ///
    /// Assigned by the type registry the first time a Rust type is seen and
    /// kept for the life of the registry, across re-registrations.
    pub struct TypeKey;
}

define_entity_id! {
    /// Identity for a module path (`geo` in `geo::Point`).
    pub struct ModuleId;
}

define_entity_id! {
    /// Identity for a generated invoker unit name.
    pub struct UnitId;
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit{}", self.0)
    }
}
