// classify.rs
//
// Member enumeration, filtering and index assignment.

use std::cmp::Ordering;
use std::sync::Arc;

use quiver_identity::{TypeRef, canonical_signature, signature_hash};
use quiver_meta::TypeInfo;
use smallvec::SmallVec;

use super::{Bucket, Layout, MemberDescriptor, Shape};
use crate::error::GenerationFailure;
use crate::kind::{GenerationScope, InvokerKind};

/// Build the layout of `kind` members of `info` visible from `scope`.
///
/// Order: arity, canonical signature, name, inheritance depth, then
/// declaration order. Static members never appear. An empty field or
/// method layout is valid; a constructor layout must not be empty.
#[tracing::instrument(level = "debug", skip(info), fields(type_name = %info.name))]
pub fn classify(
    info: &TypeInfo,
    kind: InvokerKind,
    scope: GenerationScope,
) -> Result<Layout, GenerationFailure> {
    let mut members = match kind {
        InvokerKind::Field => field_candidates(info, scope),
        InvokerKind::Method => method_candidates(info, scope),
        InvokerKind::Constructor => constructor_candidates(info, scope),
    };

    if kind == InvokerKind::Constructor && members.is_empty() {
        return Err(GenerationFailure::NoEligibleConstructors {
            type_name: info.name.to_string(),
            scope: scope.to_string(),
        });
    }

    members.sort_by(member_order);
    for (index, member) in members.iter_mut().enumerate() {
        member.index = index;
    }

    let buckets = buckets(&members);
    let signature_hash = signature_hash(
        members
            .iter()
            .map(|m| (&*m.declaring_name, &*m.name, m.signature.as_str())),
    );

    tracing::debug!(
        %kind,
        members = members.len(),
        buckets = buckets.len(),
        "classified"
    );

    Ok(Layout {
        target: info.key,
        type_name: info.name.clone(),
        kind,
        scope,
        members,
        buckets,
        signature_hash,
    })
}

fn member_order(a: &MemberDescriptor, b: &MemberDescriptor) -> Ordering {
    a.arity()
        .cmp(&b.arity())
        .then_with(|| a.signature.cmp(&b.signature))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.depth.cmp(&b.depth))
        .then_with(|| a.source.cmp(&b.source))
}

fn field_candidates(info: &TypeInfo, scope: GenerationScope) -> Vec<MemberDescriptor> {
    info.fields
        .iter()
        .enumerate()
        .filter(|(_, f)| {
            !f.is_static
                && scope.admits(f.visibility, f.origin.declaring, f.origin.declaring_module)
        })
        .map(|(source, f)| MemberDescriptor {
            index: 0,
            kind: InvokerKind::Field,
            name: f.name.clone(),
            declaring: f.origin.declaring,
            declaring_name: f.origin.declaring_name.clone(),
            declaring_module: f.origin.declaring_module,
            depth: f.origin.depth,
            params: SmallVec::new(),
            value_type: f.ty,
            signature: f.ty.canonical().into_owned(),
            visibility: f.visibility,
            writable: f.is_writable(),
            shape: Shape::of_field(f.ty),
            source,
        })
        .collect()
}

fn method_candidates(info: &TypeInfo, scope: GenerationScope) -> Vec<MemberDescriptor> {
    info.methods
        .iter()
        .enumerate()
        .filter(|(_, m)| {
            !m.is_static
                && scope.admits(m.visibility, m.origin.declaring, m.origin.declaring_module)
        })
        .map(|(source, m)| MemberDescriptor {
            index: 0,
            kind: InvokerKind::Method,
            name: m.name.clone(),
            declaring: m.origin.declaring,
            declaring_name: m.origin.declaring_name.clone(),
            declaring_module: m.origin.declaring_module,
            depth: m.origin.depth,
            params: m.params.clone(),
            value_type: m.ret,
            signature: canonical_signature(&m.params),
            visibility: m.visibility,
            writable: false,
            shape: Shape::of_params(&m.params),
            source,
        })
        .collect()
}

fn constructor_candidates(info: &TypeInfo, scope: GenerationScope) -> Vec<MemberDescriptor> {
    let name: Arc<str> = Arc::from("new");
    info.constructors
        .iter()
        .enumerate()
        .filter(|(_, c)| scope.admits(c.visibility, c.origin.declaring, c.origin.declaring_module))
        .map(|(source, c)| MemberDescriptor {
            index: 0,
            kind: InvokerKind::Constructor,
            name: name.clone(),
            declaring: c.origin.declaring,
            declaring_name: c.origin.declaring_name.clone(),
            declaring_module: c.origin.declaring_module,
            depth: 0,
            params: c.params.clone(),
            value_type: TypeRef::Object(info.rust_name),
            signature: canonical_signature(&c.params),
            visibility: c.visibility,
            writable: false,
            shape: Shape::of_params(&c.params),
            source,
        })
        .collect()
}

/// Group sorted members into maximal runs of one shape.
fn buckets(members: &[MemberDescriptor]) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = Vec::new();
    for member in members {
        match buckets.last_mut() {
            Some(last) if last.shape == member.shape => last.range.end = member.index + 1,
            _ => buckets.push(Bucket {
                shape: member.shape,
                range: member.index..member.index + 1,
            }),
        }
    }
    buckets
}
