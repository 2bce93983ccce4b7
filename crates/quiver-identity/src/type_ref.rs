// type_ref.rs
//
// Type references as seen by the classifier: just enough to order members,
// pick a shape bucket and check call-site signatures.

use std::borrow::Cow;
use std::fmt;

use crate::PrimitiveKind;

/// A declared parameter, field or return type.
///
/// Reference types spell canonically with a leading `&`, which sorts before
/// every primitive keyword. All single-reference signatures of one arity
/// therefore form one contiguous run when members are sorted by signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    /// Owned string, nullable when declared through `Option<String>`.
    Str,
    /// Shared object reference, named by its Rust type name.
    Object(&'static str),
    /// Any value at all.
    Any,
    /// No value; only valid as a return type.
    Void,
}

impl TypeRef {
    pub const BOOL: TypeRef = TypeRef::Primitive(PrimitiveKind::Bool);
    pub const I8: TypeRef = TypeRef::Primitive(PrimitiveKind::I8);
    pub const CHAR: TypeRef = TypeRef::Primitive(PrimitiveKind::Char);
    pub const I16: TypeRef = TypeRef::Primitive(PrimitiveKind::I16);
    pub const I32: TypeRef = TypeRef::Primitive(PrimitiveKind::I32);
    pub const I64: TypeRef = TypeRef::Primitive(PrimitiveKind::I64);
    pub const F32: TypeRef = TypeRef::Primitive(PrimitiveKind::F32);
    pub const F64: TypeRef = TypeRef::Primitive(PrimitiveKind::F64);

    pub fn primitive(self) -> Option<PrimitiveKind> {
        match self {
            TypeRef::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn is_reference(self) -> bool {
        matches!(self, TypeRef::Str | TypeRef::Object(_) | TypeRef::Any)
    }

    pub fn is_void(self) -> bool {
        matches!(self, TypeRef::Void)
    }

    /// Canonical spelling used for ordering and unit naming.
    pub fn canonical(self) -> Cow<'static, str> {
        match self {
            TypeRef::Primitive(kind) => Cow::Borrowed(kind.as_str()),
            TypeRef::Str => Cow::Borrowed("&str"),
            TypeRef::Any => Cow::Borrowed("&any"),
            TypeRef::Void => Cow::Borrowed("void"),
            TypeRef::Object(name) => Cow::Owned(format!("&{name}")),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Canonical spelling of a parameter list, comma separated.
pub fn canonical_signature(params: &[TypeRef]) -> String {
    let mut out = String::new();
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&param.canonical());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_sort_before_primitives() {
        let mut spellings: Vec<String> = PrimitiveKind::ALL
            .iter()
            .map(|k| TypeRef::Primitive(*k).canonical().into_owned())
            .collect();
        spellings.push(TypeRef::Str.canonical().into_owned());
        spellings.push(TypeRef::Object("geo::Point").canonical().into_owned());
        spellings.push(TypeRef::Any.canonical().into_owned());
        spellings.sort();

        let first_primitive = spellings
            .iter()
            .position(|s| !s.starts_with('&'))
            .unwrap();
        assert_eq!(first_primitive, 3);
        assert!(spellings[first_primitive..].iter().all(|s| !s.starts_with('&')));
    }

    #[test]
    fn canonical_signature_joins_params() {
        assert_eq!(canonical_signature(&[]), "");
        assert_eq!(
            canonical_signature(&[TypeRef::I32, TypeRef::Str, TypeRef::Object("a::B")]),
            "i32,&str,&a::B"
        );
    }
}
