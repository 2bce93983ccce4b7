// type_info.rs
//
// The complete description of one registered type.

use std::any::TypeId;
use std::sync::Arc;

use quiver_identity::{ModuleId, TypeKey, TypeRef};

use crate::members::{ConstructorDef, FieldDef, MethodDef};

/// Everything the engine may learn about a type.
///
/// Fields and methods include those inherited from the supertype chain,
/// in declaration order: own members first, then each supertype's.
/// Descriptions are immutable; re-registering a type replaces the whole
/// `Arc<TypeInfo>`.
#[derive(Debug)]
pub struct TypeInfo {
    pub key: TypeKey,
    /// Fully qualified name, e.g. `geo::Circle`.
    pub name: Arc<str>,
    pub module: ModuleId,
    pub module_path: Arc<str>,
    pub rust_type: TypeId,
    pub rust_name: &'static str,
    pub supertype: Option<TypeKey>,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
    pub constructors: Vec<ConstructorDef>,
}

impl TypeInfo {
    pub fn find_field(&self, name: &str, declaring: TypeKey) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|f| &*f.name == name && f.origin.declaring == declaring)
    }

    pub fn find_method(
        &self,
        name: &str,
        declaring: TypeKey,
        params: &[TypeRef],
    ) -> Option<&MethodDef> {
        self.methods.iter().find(|m| {
            &*m.name == name && m.origin.declaring == declaring && m.params.as_slice() == params
        })
    }

    pub fn find_constructor(&self, params: &[TypeRef]) -> Option<&ConstructorDef> {
        self.constructors
            .iter()
            .find(|c| c.params.as_slice() == params)
    }

    /// Short name without the module path.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit("::").next().unwrap_or(&self.name)
    }
}
