// primitive_kind.rs
//
// Primitive kinds that get their own specialized dispatch entry points.

use std::fmt;

/// The eight primitive kinds with unboxed fast paths.
///
/// Declaration order is the order used for per-kind tables; it is not the
/// index order inside a layout (that follows canonical spelling).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Bool,
    I8,
    Char,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Bool,
        PrimitiveKind::I8,
        PrimitiveKind::Char,
        PrimitiveKind::I16,
        PrimitiveKind::I32,
        PrimitiveKind::I64,
        PrimitiveKind::F32,
        PrimitiveKind::F64,
    ];

    /// Canonical keyword for this kind. Also its Rust type name.
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::Char => "char",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
        }
    }

    /// Look up a kind by its keyword.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Position of this kind in [`PrimitiveKind::ALL`].
    pub fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
