//! Name-based lookup over a generated unit.
//!
//! Each helper holds its [`GenerationResult`], so it keeps working after the
//! cache has replaced the unit, and carries description arrays indexed
//! exactly like the layout, so a name resolves to an index once and the
//! index is reused.

use std::any::Any;
use std::sync::Arc;

use quiver_identity::{TypeKey, TypeRef};
use quiver_meta::{FromValue, Value};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::dispatch::{ConstructorInvoker, FieldAccess, MethodInvoker};
use crate::error::{AcquireError, InvokeError};
use crate::generate::GenerationResult;
use crate::layout::{Layout, MemberDescriptor};

type IndexList = SmallVec<[usize; 2]>;

fn index_by_name(layout: &Layout) -> FxHashMap<Arc<str>, IndexList> {
    let mut by_name: FxHashMap<Arc<str>, IndexList> = FxHashMap::default();
    for member in layout.members() {
        by_name
            .entry(member.name.clone())
            .or_default()
            .push(member.index);
    }
    by_name
}

/// How well an argument fits a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fit {
    Exact,
    /// `Any` taking a concrete value, or `Null` taking any reference.
    Loose,
}

/// How `value` fits where `param` is declared, if at all. Exact kinds only;
/// `Null` passes for references. Object types are checked when the member
/// unboxes the argument.
fn fit(param: TypeRef, value: &Value) -> Option<Fit> {
    match (param, value) {
        (TypeRef::Void, _) => None,
        (_, Value::Null) if param.is_reference() => Some(Fit::Loose),
        (TypeRef::Any, _) => Some(Fit::Loose),
        (TypeRef::Primitive(kind), _) => {
            (value.primitive_kind() == Some(kind)).then_some(Fit::Exact)
        }
        (TypeRef::Str, Value::Str(_)) | (TypeRef::Object(_), Value::Object(_)) => {
            Some(Fit::Exact)
        }
        _ => None,
    }
}

/// Number of loosely fitting arguments, or `None` if `args` do not fit.
fn looseness(member: &MemberDescriptor, args: &[Value]) -> Option<usize> {
    if member.params.len() != args.len() {
        return None;
    }
    member
        .params
        .iter()
        .zip(args)
        .try_fold(0, |loose, (param, arg)| match fit(*param, arg)? {
            Fit::Exact => Some(loose),
            Fit::Loose => Some(loose + 1),
        })
}

/// The overload among `candidates` that `args` fit best: fewest loose
/// arguments, then the most derived declaration of that signature. Two
/// different signatures fitting equally well is ambiguous.
fn resolve<'a>(
    kind: &'static str,
    name: &str,
    candidates: impl Iterator<Item = &'a MemberDescriptor>,
    args: &[Value],
) -> Result<usize, InvokeError> {
    let mut best: Vec<&MemberDescriptor> = Vec::new();
    let mut best_loose = usize::MAX;
    for member in candidates {
        let Some(loose) = looseness(member, args) else {
            continue;
        };
        if loose < best_loose {
            best.clear();
            best_loose = loose;
        }
        if loose == best_loose {
            best.push(member);
        }
    }

    let Some(first) = best.first() else {
        return Err(InvokeError::NoSuchMember {
            kind,
            name: format!("{name}/{}", args.len()),
        });
    };
    if best.iter().any(|m| m.params != first.params) {
        let mut signatures: Vec<String> = best
            .iter()
            .map(|m| format!("({})", m.signature))
            .collect();
        signatures.sort_unstable();
        signatures.dedup();
        return Err(InvokeError::Ambiguous {
            kind,
            name: name.to_string(),
            candidates: signatures.join(", "),
        });
    }
    most_derived(best.into_iter()).ok_or_else(|| InvokeError::NoSuchMember {
        kind,
        name: name.to_string(),
    })
}

/// Of several candidates, the one declared closest to the target, then the
/// lowest index.
fn most_derived<'a>(candidates: impl Iterator<Item = &'a MemberDescriptor>) -> Option<usize> {
    candidates
        .min_by_key(|m| (m.depth, m.index))
        .map(|m| m.index)
}

pub struct FieldLookup {
    result: Arc<GenerationResult>,
    access: Arc<dyn FieldAccess>,
    names: Box<[Arc<str>]>,
    types: Box<[TypeRef]>,
    writable: Box<[bool]>,
    by_name: FxHashMap<Arc<str>, IndexList>,
}

impl FieldLookup {
    pub fn new(result: Arc<GenerationResult>) -> Result<Self, AcquireError> {
        let access = result.field_access()?;
        let layout = access.layout();
        let names = layout.members().iter().map(|m| m.name.clone()).collect();
        let types = layout.members().iter().map(|m| m.value_type).collect();
        let writable = layout.members().iter().map(|m| m.writable).collect();
        let by_name = index_by_name(layout);
        Ok(Self {
            result,
            access,
            names,
            types,
            writable,
            by_name,
        })
    }

    pub fn result(&self) -> &Arc<GenerationResult> {
        &self.result
    }

    pub fn access(&self) -> &Arc<dyn FieldAccess> {
        &self.access
    }

    pub fn layout(&self) -> &Layout {
        self.access.layout()
    }

    pub fn field_count(&self) -> usize {
        self.names.len()
    }

    /// Index of the field `name`. A field shadowed by a subtype field of the
    /// same name resolves to the subtype's.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        let indices = self.by_name.get(name)?;
        let members = self.layout().members();
        most_derived(indices.iter().map(move |&i| &members[i]))
    }

    /// Index of the field `name` declared by `declaring`.
    pub fn index_of_declared(&self, name: &str, declaring: TypeKey) -> Option<usize> {
        let members = self.layout().members();
        self.by_name
            .get(name)?
            .iter()
            .copied()
            .find(|&i| members[i].declaring == declaring)
    }

    pub fn field_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|n| &**n)
    }

    pub fn field_type(&self, index: usize) -> Option<TypeRef> {
        self.types.get(index).copied()
    }

    pub fn contains_index(&self, index: usize) -> bool {
        index < self.names.len()
    }

    pub fn is_readable(&self, index: usize) -> bool {
        self.contains_index(index)
    }

    pub fn is_writable(&self, index: usize) -> bool {
        self.writable.get(index).copied().unwrap_or(false)
    }

    fn resolve(&self, name: &str) -> Result<usize, InvokeError> {
        self.index_of(name).ok_or_else(|| InvokeError::NoSuchMember {
            kind: "field",
            name: name.to_string(),
        })
    }

    pub fn get(&self, name: &str, target: &dyn Any) -> Result<Value, InvokeError> {
        self.access.get(self.resolve(name)?, target)
    }

    pub fn get_as<V: FromValue>(&self, name: &str, target: &dyn Any) -> Result<V, InvokeError> {
        Ok(V::from_value(&self.get(name, target)?)?)
    }

    pub fn set(&self, name: &str, target: &mut dyn Any, value: Value) -> Result<(), InvokeError> {
        let index = self.resolve(name)?;
        if !self.writable[index] {
            return Err(InvokeError::UnsupportedOperation {
                operation: "set",
                member: name.to_string(),
            });
        }
        self.access.set(index, target, value)
    }
}

pub struct MethodLookup {
    result: Arc<GenerationResult>,
    invoker: Arc<dyn MethodInvoker>,
    names: Box<[Arc<str>]>,
    signatures: Box<[String]>,
    returns: Box<[TypeRef]>,
    by_name: FxHashMap<Arc<str>, IndexList>,
}

impl MethodLookup {
    pub fn new(result: Arc<GenerationResult>) -> Result<Self, AcquireError> {
        let invoker = result.method_invoker()?;
        let layout = invoker.layout();
        let names = layout.members().iter().map(|m| m.name.clone()).collect();
        let signatures = layout.members().iter().map(|m| m.signature.clone()).collect();
        let returns = layout.members().iter().map(|m| m.value_type).collect();
        let by_name = index_by_name(layout);
        Ok(Self {
            result,
            invoker,
            names,
            signatures,
            returns,
            by_name,
        })
    }

    pub fn result(&self) -> &Arc<GenerationResult> {
        &self.result
    }

    pub fn invoker(&self) -> &Arc<dyn MethodInvoker> {
        &self.invoker
    }

    pub fn layout(&self) -> &Layout {
        self.invoker.layout()
    }

    pub fn method_count(&self) -> usize {
        self.names.len()
    }

    /// Index of the method `name` with exactly `params`.
    pub fn index_of(&self, name: &str, params: &[TypeRef]) -> Option<usize> {
        let members = self.layout().members();
        most_derived(
            self.by_name
                .get(name)?
                .iter()
                .map(move |&i| &members[i])
                .filter(|m| m.params.as_slice() == params),
        )
    }

    /// Every index named `name`, ascending.
    pub fn overloads(&self, name: &str) -> &[usize] {
        self.by_name
            .get(name)
            .map(|indices| indices.as_slice())
            .unwrap_or(&[])
    }

    pub fn method_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|n| &**n)
    }

    pub fn signature(&self, index: usize) -> Option<&str> {
        self.signatures.get(index).map(String::as_str)
    }

    pub fn return_type(&self, index: usize) -> Option<TypeRef> {
        self.returns.get(index).copied()
    }

    pub fn contains_index(&self, index: usize) -> bool {
        index < self.names.len()
    }

    /// Call the overload of `name` that `args` fit best. An exact kind
    /// beats `Any` or a `Null` reference; a tie between different
    /// signatures is [`InvokeError::Ambiguous`].
    pub fn invoke(
        &self,
        name: &str,
        target: &mut dyn Any,
        args: &[Value],
    ) -> Result<Value, InvokeError> {
        let members = self.layout().members();
        let overloads = self.overloads(name).iter().map(move |&i| &members[i]);
        let index = resolve("method", name, overloads, args)?;
        self.invoker.invoke(index, target, args)
    }

    /// Call the method `name` with exactly `params`.
    pub fn invoke_exact(
        &self,
        name: &str,
        params: &[TypeRef],
        target: &mut dyn Any,
        args: &[Value],
    ) -> Result<Value, InvokeError> {
        let index = self
            .index_of(name, params)
            .ok_or_else(|| InvokeError::NoSuchMember {
                kind: "method",
                name: format!("{name}({})", quiver_identity::canonical_signature(params)),
            })?;
        self.invoker.invoke(index, target, args)
    }
}

pub struct ConstructorLookup {
    result: Arc<GenerationResult>,
    invoker: Arc<dyn ConstructorInvoker>,
    signatures: Box<[String]>,
}

impl ConstructorLookup {
    pub fn new(result: Arc<GenerationResult>) -> Result<Self, AcquireError> {
        let invoker = result.constructor_invoker()?;
        let signatures = invoker
            .layout()
            .members()
            .iter()
            .map(|m| m.signature.clone())
            .collect();
        Ok(Self {
            result,
            invoker,
            signatures,
        })
    }

    pub fn result(&self) -> &Arc<GenerationResult> {
        &self.result
    }

    pub fn invoker(&self) -> &Arc<dyn ConstructorInvoker> {
        &self.invoker
    }

    pub fn layout(&self) -> &Layout {
        self.invoker.layout()
    }

    pub fn constructor_count(&self) -> usize {
        self.signatures.len()
    }

    pub fn index_of(&self, params: &[TypeRef]) -> Option<usize> {
        self.layout()
            .members()
            .iter()
            .find(|m| m.params.as_slice() == params)
            .map(|m| m.index)
    }

    pub fn signature(&self, index: usize) -> Option<&str> {
        self.signatures.get(index).map(String::as_str)
    }

    pub fn contains_index(&self, index: usize) -> bool {
        index < self.signatures.len()
    }

    /// Construct through the constructor `args` fit best, resolved like
    /// [`MethodLookup::invoke`].
    pub fn new_instance(&self, args: &[Value]) -> Result<Box<dyn Any>, InvokeError> {
        let index = resolve("constructor", "new", self.layout().members().iter(), args)?;
        self.invoker.new_instance(index, args)
    }

    /// As [`ConstructorLookup::new_instance`], unboxed to `T`.
    pub fn construct<T: Any>(&self, args: &[Value]) -> Result<T, InvokeError> {
        self.new_instance(args)?
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| InvokeError::TargetMismatch {
                expected: std::any::type_name::<T>(),
            })
    }
}
