//! Member layouts: the ordered, index-addressed member list of one unit.
//!
//! A layout is built once per (type, kind, scope) by [`classify`] and never
//! changes. Indices are dense and 0-based, and every [`Shape`] bucket covers
//! one contiguous index range, so per-shape tables can be addressed with the
//! global index minus the bucket start.

mod classify;

pub use classify::classify;

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use quiver_identity::{ModuleId, PrimitiveKind, TypeKey, TypeRef};
use quiver_meta::Visibility;
use smallvec::SmallVec;

use crate::kind::{GenerationScope, InvokerKind};

/// Calling-convention bucket of a member.
///
/// Fields bucket by their own type. Methods and constructors bucket by their
/// parameter list: none, one primitive, one reference, or several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Nullary,
    Primitive(PrimitiveKind),
    Reference,
    General,
}

impl Shape {
    pub fn of_field(ty: TypeRef) -> Shape {
        match ty.primitive() {
            Some(kind) => Shape::Primitive(kind),
            None => Shape::Reference,
        }
    }

    pub fn of_params(params: &[TypeRef]) -> Shape {
        match params {
            [] => Shape::Nullary,
            [single] => match single.primitive() {
                Some(kind) => Shape::Primitive(kind),
                None => Shape::Reference,
            },
            _ => Shape::General,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Nullary => f.write_str("nullary"),
            Shape::Primitive(kind) => write!(f, "{kind}"),
            Shape::Reference => f.write_str("reference"),
            Shape::General => f.write_str("general"),
        }
    }
}

/// One member of a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor {
    pub index: usize,
    pub kind: InvokerKind,
    pub name: Arc<str>,
    pub declaring: TypeKey,
    pub declaring_name: Arc<str>,
    pub declaring_module: ModuleId,
    /// Inheritance depth: 0 for members declared by the target itself.
    pub depth: u32,
    pub params: SmallVec<[TypeRef; 4]>,
    /// Field type, return type, or the constructed type.
    pub value_type: TypeRef,
    /// Canonical signature: the parameter list, or the field type for fields.
    pub signature: String,
    pub visibility: Visibility,
    pub writable: bool,
    pub shape: Shape,
    /// Position in the type description's member list of this kind.
    pub source: usize,
}

impl MemberDescriptor {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            InvokerKind::Field => {
                write!(f, "{}: {}", self.name, self.value_type)?;
                if !self.writable {
                    f.write_str(" (read-only)")?;
                }
            }
            InvokerKind::Method => {
                write!(f, "{}({}) -> {}", self.name, self.signature, self.value_type)?;
            }
            InvokerKind::Constructor => write!(f, "new({})", self.signature)?,
        }
        if self.depth > 0 {
            write!(f, " [from {}]", self.declaring_name)?;
        }
        Ok(())
    }
}

/// A contiguous index range sharing one shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub shape: Shape,
    pub range: Range<usize>,
}

#[derive(Debug, Clone)]
pub struct Layout {
    target: TypeKey,
    type_name: Arc<str>,
    kind: InvokerKind,
    scope: GenerationScope,
    members: Vec<MemberDescriptor>,
    buckets: Vec<Bucket>,
    signature_hash: u64,
}

impl Layout {
    pub fn target(&self) -> TypeKey {
        self.target
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> InvokerKind {
        self.kind
    }

    pub fn scope(&self) -> GenerationScope {
        self.scope
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    pub fn member(&self, index: usize) -> Option<&MemberDescriptor> {
        self.members.get(index)
    }

    /// Buckets in index order.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn bucket(&self, shape: Shape) -> Option<Range<usize>> {
        self.buckets
            .iter()
            .find(|b| b.shape == shape)
            .map(|b| b.range.clone())
    }

    /// Fx hash over the declaring type, name and signature of every member,
    /// in index order.
    pub fn signature_hash(&self) -> u64 {
        self.signature_hash
    }

    /// Distinct declaring type names, in index order of first appearance.
    pub fn declaring_names(&self) -> impl Iterator<Item = &str> {
        let mut seen: SmallVec<[&str; 4]> = SmallVec::new();
        self.members.iter().filter_map(move |m| {
            let name = &*m.declaring_name;
            if seen.contains(&name) {
                None
            } else {
                seen.push(name);
                Some(name)
            }
        })
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {} layout ({} members, scope {})",
            self.type_name,
            self.kind,
            self.len(),
            self.scope
        )?;
        for bucket in &self.buckets {
            writeln!(
                f,
                "  [{}..{}) {}",
                bucket.range.start, bucket.range.end, bucket.shape
            )?;
            for member in &self.members[bucket.range.clone()] {
                writeln!(f, "    {:>4}  {}", member.index, member)?;
            }
        }
        Ok(())
    }
}
