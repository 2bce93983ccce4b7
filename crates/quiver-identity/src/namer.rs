// namer.rs
//
// Deterministic names for generated invoker units, and the table that
// registers each name exactly once.

use std::hash::Hasher;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHasher};
use smallvec::SmallVec;

use crate::{TypeKey, UnitId};

/// Fx hash over `(declaring type, member name, canonical signature)` triples,
/// in the order given. Layout order is deterministic, so is the hash.
pub fn signature_hash<'a, I>(members: I) -> u64
where
    I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
{
    let mut hasher = FxHasher::default();
    for (declaring, name, signature) in members {
        hasher.write(declaring.as_bytes());
        hasher.write_u8(0xff);
        hasher.write(name.as_bytes());
        hasher.write_u8(0xfe);
        hasher.write(signature.as_bytes());
        hasher.write_u8(0xfd);
    }
    hasher.finish()
}

/// Builds the name of one generated unit.
///
/// ```text
/// geo::Circle#7$MethodInvoker+geo::Shape@public$00c0ffee00c0ffee
/// ```
///
/// Declaring scopes are only listed when they differ from the target, and
/// are deduplicated and sorted so enumeration order never leaks into names.
pub struct UnitNamer<'a> {
    target_name: &'a str,
    target: TypeKey,
    kind: &'a str,
    scope: &'a str,
    declaring: SmallVec<[&'a str; 2]>,
}

impl<'a> UnitNamer<'a> {
    pub fn new(target_name: &'a str, target: TypeKey, kind: &'a str) -> Self {
        Self {
            target_name,
            target,
            kind,
            scope: "public",
            declaring: SmallVec::new(),
        }
    }

    pub fn scope(mut self, scope: &'a str) -> Self {
        self.scope = scope;
        self
    }

    /// Record the declaring scope of a member. No-op for the target itself.
    pub fn declaring(mut self, declaring_name: &'a str) -> Self {
        if declaring_name != self.target_name && !self.declaring.contains(&declaring_name) {
            self.declaring.push(declaring_name);
        }
        self
    }

    pub fn name(mut self, signature_hash: u64) -> String {
        self.declaring.sort_unstable();
        let mut out = format!("{}{}${}", self.target_name, self.target, self.kind);
        for declaring in &self.declaring {
            out.push('+');
            out.push_str(declaring);
        }
        out.push('@');
        out.push_str(self.scope);
        out.push_str(&format!("${signature_hash:016x}"));
        out
    }
}

/// Registers unit names and hands out stable [`UnitId`]s.
///
/// Registering a name that already exists returns the existing id, so a
/// unit regenerated after eviction keeps its identity.
#[derive(Debug, Default)]
pub struct UnitNameTable {
    names: Vec<Arc<str>>,
    lookup: FxHashMap<Arc<str>, UnitId>,
}

impl UnitNameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `name` and whether this call registered it.
    pub fn register(&mut self, name: &str) -> (UnitId, bool) {
        if let Some(id) = self.lookup.get(name) {
            return (*id, false);
        }
        let id = UnitId::new(self.names.len() as u32);
        let owned: Arc<str> = Arc::from(name);
        self.names.push(owned.clone());
        self.lookup.insert(owned, id);
        (id, true)
    }

    pub fn id_of(&self, name: &str) -> Option<UnitId> {
        self.lookup.get(name).copied()
    }

    pub fn name(&self, id: UnitId) -> &str {
        &self.names[id.index() as usize]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
