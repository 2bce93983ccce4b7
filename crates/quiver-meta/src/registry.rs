// registry.rs
//
// Type key assignment, module interning and storage of type descriptions.

use std::any::{Any, TypeId};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use quiver_identity::{ModuleId, TypeKey};
use rustc_hash::FxHashMap;

use crate::builder::TypeBuilder;
use crate::error::MetaError;
use crate::type_info::TypeInfo;

/// Enumerates the members of a type.
///
/// The engine only ever talks to this trait. Returning a new `Arc` for a key
/// tells the engine the description changed; returning `None` that the type
/// is gone.
pub trait Introspector: Send + Sync {
    fn describe(&self, key: TypeKey) -> Option<Arc<TypeInfo>>;
}

impl<I: Introspector + ?Sized> Introspector for Arc<I> {
    fn describe(&self, key: TypeKey) -> Option<Arc<TypeInfo>> {
        (**self).describe(key)
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    keys: FxHashMap<TypeId, TypeKey>,
    types: FxHashMap<TypeKey, Arc<TypeInfo>>,
    modules: Vec<Arc<str>>,
    module_lookup: FxHashMap<Arc<str>, ModuleId>,
}

/// Registry of type descriptions, keyed by a stable [`TypeKey`] per Rust type.
///
/// Keys are assigned on first use and never reused, even after
/// [`TypeRegistry::unregister`].
#[derive(Debug, Default)]
pub struct TypeRegistry {
    inner: RwLock<RegistryInner>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The key of `T`, assigning one if `T` has never been seen.
    pub fn key_for<T: Any>(&self) -> TypeKey {
        let type_id = TypeId::of::<T>();
        if let Some(&key) = self.inner.read().keys.get(&type_id) {
            return key;
        }
        let mut inner = self.inner.write();
        let next = TypeKey::new(inner.keys.len() as u32);
        *inner.keys.entry(type_id).or_insert(next)
    }

    /// The key of `T` if it has ever been assigned one.
    pub fn key_of<T: Any>(&self) -> Option<TypeKey> {
        self.inner.read().keys.get(&TypeId::of::<T>()).copied()
    }

    /// Intern a module path.
    pub fn module_id(&self, path: &str) -> ModuleId {
        if let Some(&id) = self.inner.read().module_lookup.get(path) {
            return id;
        }
        let mut inner = self.inner.write();
        if let Some(&id) = inner.module_lookup.get(path) {
            return id;
        }
        let id = ModuleId::new(inner.modules.len() as u32);
        let path: Arc<str> = Arc::from(path);
        inner.modules.push(path.clone());
        inner.module_lookup.insert(path, id);
        id
    }

    pub fn module_path(&self, id: ModuleId) -> Option<Arc<str>> {
        self.inner.read().modules.get(id.index() as usize).cloned()
    }

    /// Describe `T` under the fully qualified `name` (e.g. `geo::Circle`) and
    /// store the description, replacing any previous one.
    ///
    /// The module is everything before the last `::`; a bare name lives in
    /// the root module `""`.
    pub fn define<T, F>(&self, name: &str, describe: F) -> Result<Arc<TypeInfo>, MetaError>
    where
        T: Any,
        F: for<'r> FnOnce(TypeBuilder<'r, T>) -> TypeBuilder<'r, T>,
    {
        let key = self.key_for::<T>();
        let module_path = name.rsplit_once("::").map_or("", |(module, _)| module);
        let module = self.module_id(module_path);

        let builder = TypeBuilder::new(self, key, Arc::from(name), module, Arc::from(module_path));
        let info = Arc::new(describe(builder).build()?);

        tracing::debug!(
            type_name = name,
            %key,
            fields = info.fields.len(),
            methods = info.methods.len(),
            constructors = info.constructors.len(),
            "defined type"
        );
        self.inner.write().types.insert(key, info.clone());
        Ok(info)
    }

    pub fn info(&self, key: TypeKey) -> Option<Arc<TypeInfo>> {
        self.inner.read().types.get(&key).cloned()
    }

    pub fn info_of<T: Any>(&self) -> Option<Arc<TypeInfo>> {
        let inner = self.inner.read();
        let key = inner.keys.get(&TypeId::of::<T>())?;
        inner.types.get(key).cloned()
    }

    /// Drop the description of `key`. The key itself stays assigned.
    pub fn unregister(&self, key: TypeKey) -> Option<Arc<TypeInfo>> {
        let removed = self.inner.write().types.remove(&key);
        if removed.is_some() {
            tracing::debug!(%key, "unregistered type");
        }
        removed
    }

    /// Number of types currently described.
    pub fn len(&self) -> usize {
        self.inner.read().types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Introspector for TypeRegistry {
    fn describe(&self, key: TypeKey) -> Option<Arc<TypeInfo>> {
        self.info(key)
    }
}

static GLOBAL_REGISTRY: OnceLock<Arc<TypeRegistry>> = OnceLock::new();

/// The process-wide registry.
pub fn global_registry() -> &'static Arc<TypeRegistry> {
    GLOBAL_REGISTRY.get_or_init(|| Arc::new(TypeRegistry::new()))
}
