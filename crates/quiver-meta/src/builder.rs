//! Fluent registration of a type's members.

use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

use quiver_identity::{ModuleId, TypeKey};
use rustc_hash::FxHashSet;

use crate::accessor::{Getter, Setter, downcast_mut, downcast_ref, projection, projection_mut};
use crate::error::MetaError;
use crate::handler::{ConstructorHandler, MethodHandler};
use crate::members::{ConstructorDef, FieldDef, MemberDecl, MemberOrigin, MethodDef, Visibility};
use crate::registry::TypeRegistry;
use crate::type_info::TypeInfo;
use crate::value::MemberType;

/// Collects the members of `T` for [`TypeRegistry::define`].
///
/// Errors (an unregistered supertype, a second supertype) are recorded and
/// reported by [`TypeBuilder::build`], so the fluent chain never breaks.
pub struct TypeBuilder<'r, T> {
    registry: &'r TypeRegistry,
    key: TypeKey,
    name: Arc<str>,
    module: ModuleId,
    module_path: Arc<str>,
    supertype: Option<TypeKey>,
    fields: Vec<FieldDef>,
    methods: Vec<MethodDef>,
    constructors: Vec<ConstructorDef>,
    inherited_fields: Vec<FieldDef>,
    inherited_methods: Vec<MethodDef>,
    error: Option<MetaError>,
    _marker: std::marker::PhantomData<fn(T) -> T>,
}

impl<'r, T: Any> TypeBuilder<'r, T> {
    pub(crate) fn new(
        registry: &'r TypeRegistry,
        key: TypeKey,
        name: Arc<str>,
        module: ModuleId,
        module_path: Arc<str>,
    ) -> Self {
        Self {
            registry,
            key,
            name,
            module,
            module_path,
            supertype: None,
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            inherited_fields: Vec::new(),
            inherited_methods: Vec::new(),
            error: None,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    fn own_origin(&self) -> MemberOrigin {
        MemberOrigin {
            declaring: self.key,
            declaring_name: self.name.clone(),
            declaring_module: self.module,
            depth: 0,
        }
    }

    /// A read-write field.
    pub fn field<V, G, S>(mut self, decl: impl Into<MemberDecl>, get: G, set: S) -> Self
    where
        V: MemberType,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let set: Setter<V> = Arc::new(move |target: &mut dyn Any, value: V| {
            set(downcast_mut::<T>(target)?, value);
            Ok(())
        });
        self.push_field(decl.into(), Self::getter(get), Some(set));
        self
    }

    /// A field without a setter. It is still listed in layouts; writes fail
    /// at call time.
    pub fn readonly_field<V, G>(mut self, decl: impl Into<MemberDecl>, get: G) -> Self
    where
        V: MemberType,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.push_field(decl.into(), Self::getter(get), None);
        self
    }

    fn getter<V, G>(get: G) -> Getter<V>
    where
        V: MemberType,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        Arc::new(move |target: &dyn Any| Ok(get(downcast_ref::<T>(target)?)))
    }

    fn push_field<V: MemberType>(
        &mut self,
        decl: MemberDecl,
        get: Getter<V>,
        set: Option<Setter<V>>,
    ) {
        let origin = self.own_origin();
        self.fields.push(FieldDef {
            name: decl.name,
            ty: V::type_ref(),
            visibility: decl.visibility,
            is_static: decl.is_static,
            origin,
            accessor: V::field_accessor(get, set),
        });
    }

    pub fn method<Args, H>(mut self, decl: impl Into<MemberDecl>, handler: H) -> Self
    where
        H: MethodHandler<T, Args>,
    {
        let decl = decl.into();
        let origin = self.own_origin();
        self.methods.push(MethodDef {
            name: decl.name,
            params: H::params(),
            ret: H::ret(),
            visibility: decl.visibility,
            is_static: decl.is_static,
            origin,
            body: handler.into_body(),
        });
        self
    }

    /// A public constructor.
    pub fn constructor<Args, H>(self, handler: H) -> Self
    where
        H: ConstructorHandler<T, Args>,
    {
        self.constructor_with(Visibility::Public, handler)
    }

    pub fn constructor_with<Args, H>(mut self, visibility: Visibility, handler: H) -> Self
    where
        H: ConstructorHandler<T, Args>,
    {
        let origin = self.own_origin();
        self.constructors.push(ConstructorDef {
            params: H::params(),
            visibility,
            origin,
            body: handler.into_body(),
        });
        self
    }

    /// Make `B` the direct supertype of `T`.
    ///
    /// `B` must already be registered. Its fields and methods (including the
    /// ones it inherited) are copied with their accessors projected through
    /// `project` / `project_mut`, one level deeper. Constructors are not
    /// inherited.
    pub fn inherit<B: Any>(
        mut self,
        project: fn(&T) -> &B,
        project_mut: fn(&mut T) -> &mut B,
    ) -> Self {
        if self.supertype.is_some() {
            self.error.get_or_insert(MetaError::MultipleSupertypes {
                type_name: self.name.to_string(),
            });
            return self;
        }
        let Some(base) = self.registry.info_of::<B>() else {
            self.error.get_or_insert(MetaError::BaseNotRegistered {
                type_name: self.name.to_string(),
                base: type_name::<B>(),
            });
            return self;
        };

        let p = projection(move |target: &dyn Any| {
            Ok(project(downcast_ref::<T>(target)?) as &dyn Any)
        });
        let pm = projection_mut(move |target: &mut dyn Any| {
            Ok(project_mut(downcast_mut::<T>(target)?) as &mut dyn Any)
        });

        self.supertype = Some(base.key);
        self.inherited_fields = base
            .fields
            .iter()
            .map(|f| FieldDef {
                origin: MemberOrigin {
                    depth: f.origin.depth + 1,
                    ..f.origin.clone()
                },
                accessor: f.accessor.project(&p, &pm),
                ..f.clone()
            })
            .collect();
        self.inherited_methods = base
            .methods
            .iter()
            .map(|m| MethodDef {
                origin: MemberOrigin {
                    depth: m.origin.depth + 1,
                    ..m.origin.clone()
                },
                body: m.body.project(&pm),
                ..m.clone()
            })
            .collect();
        self
    }

    /// Finish the description. Rejects duplicate members: two fields with one
    /// name, two methods with one name and signature, or two constructors
    /// with one signature, declared by the same type.
    pub fn build(self) -> Result<TypeInfo, MetaError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let duplicate = |kind: &'static str, name: &str, signature: String| {
            MetaError::DuplicateMember {
                type_name: self.name.to_string(),
                kind,
                name: name.to_string(),
                signature,
                declaring: self.name.to_string(),
            }
        };

        let mut seen = FxHashSet::default();
        for field in &self.fields {
            if !seen.insert(field.name.clone()) {
                return Err(duplicate("field", &field.name, field.ty.canonical().into_owned()));
            }
        }

        let mut seen = FxHashSet::default();
        for method in &self.methods {
            if !seen.insert((method.name.clone(), method.params.clone())) {
                return Err(duplicate("method", &method.name, method.signature()));
            }
        }

        let mut seen = FxHashSet::default();
        for ctor in &self.constructors {
            if !seen.insert(ctor.params.clone()) {
                return Err(duplicate("constructor", "new", ctor.signature()));
            }
        }

        let mut fields = self.fields;
        fields.extend(self.inherited_fields);
        let mut methods = self.methods;
        methods.extend(self.inherited_methods);

        Ok(TypeInfo {
            key: self.key,
            name: self.name,
            module: self.module,
            module_path: self.module_path,
            rust_type: TypeId::of::<T>(),
            rust_name: type_name::<T>(),
            supertype: self.supertype,
            fields,
            methods,
            constructors: self.constructors,
        })
    }
}
