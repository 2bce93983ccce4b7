// members.rs
//
// Member definitions as stored in a `TypeInfo`.

use std::sync::Arc;

use quiver_identity::{ModuleId, TypeKey, TypeRef, canonical_signature};
use smallvec::SmallVec;

use crate::accessor::{ConstructorBody, FieldAccessor, MethodBody};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Visibility {
    Public,
    /// Visible inside the declaring module.
    Module,
    /// Visible to the declaring type only.
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Module => "module",
            Visibility::Private => "private",
        }
    }
}

/// Name, visibility and static-ness of a member being registered.
///
/// A bare `&str` converts to a public instance member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDecl {
    pub name: Arc<str>,
    pub visibility: Visibility,
    pub is_static: bool,
}

impl MemberDecl {
    pub fn public(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            visibility: Visibility::Public,
            is_static: false,
        }
    }

    pub fn module(name: &str) -> Self {
        Self {
            visibility: Visibility::Module,
            ..Self::public(name)
        }
    }

    pub fn private(name: &str) -> Self {
        Self {
            visibility: Visibility::Private,
            ..Self::public(name)
        }
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

impl From<&str> for MemberDecl {
    fn from(name: &str) -> Self {
        Self::public(name)
    }
}

/// Where a member was declared relative to the described type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberOrigin {
    pub declaring: TypeKey,
    pub declaring_name: Arc<str>,
    pub declaring_module: ModuleId,
    /// 0 for own members, 1 for the direct supertype, and so on.
    pub depth: u32,
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: Arc<str>,
    pub ty: TypeRef,
    pub visibility: Visibility,
    pub is_static: bool,
    pub origin: MemberOrigin,
    pub accessor: FieldAccessor,
}

impl FieldDef {
    pub fn is_writable(&self) -> bool {
        self.accessor.is_writable()
    }
}

#[derive(Debug, Clone)]
pub struct MethodDef {
    pub name: Arc<str>,
    pub params: SmallVec<[TypeRef; 4]>,
    pub ret: TypeRef,
    pub visibility: Visibility,
    pub is_static: bool,
    pub origin: MemberOrigin,
    pub body: MethodBody,
}

impl MethodDef {
    pub fn signature(&self) -> String {
        canonical_signature(&self.params)
    }
}

#[derive(Debug, Clone)]
pub struct ConstructorDef {
    pub params: SmallVec<[TypeRef; 4]>,
    pub visibility: Visibility,
    pub origin: MemberOrigin,
    pub body: ConstructorBody,
}

impl ConstructorDef {
    pub fn signature(&self) -> String {
        canonical_signature(&self.params)
    }
}
