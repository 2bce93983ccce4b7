// kind.rs
//
// Invoker kinds and generation scopes.

use std::fmt;
use std::str::FromStr;

use quiver_identity::{ModuleId, TypeKey};
use quiver_meta::{TypeInfo, Visibility};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InvokerKind {
    Field,
    Method,
    Constructor,
}

impl InvokerKind {
    pub const ALL: [InvokerKind; 3] = [
        InvokerKind::Field,
        InvokerKind::Method,
        InvokerKind::Constructor,
    ];

    /// Unit kind as spelled in generated unit names.
    pub fn unit_suffix(self) -> &'static str {
        match self {
            InvokerKind::Field => "FieldAccess",
            InvokerKind::Method => "MethodInvoker",
            InvokerKind::Constructor => "ConstructorInvoker",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InvokerKind::Field => "field",
            InvokerKind::Method => "method",
            InvokerKind::Constructor => "constructor",
        }
    }
}

impl fmt::Display for InvokerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a unit is generated from, which decides which members it may see.
///
/// - `Public`: public members only.
/// - `Module(m)`: plus module-visible members declared in module `m`.
/// - `Nested { owner, module }`: as `Module(module)`, plus private members
///   declared by `owner` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationScope {
    Public,
    Module(ModuleId),
    Nested { owner: TypeKey, module: ModuleId },
}

impl GenerationScope {
    /// Whether a member with `visibility`, declared by `declaring` in
    /// `declaring_module`, is visible from this scope.
    pub fn admits(
        self,
        visibility: Visibility,
        declaring: TypeKey,
        declaring_module: ModuleId,
    ) -> bool {
        match (visibility, self) {
            (Visibility::Public, _) => true,
            (Visibility::Module, GenerationScope::Module(m))
            | (Visibility::Module, GenerationScope::Nested { module: m, .. }) => {
                m == declaring_module
            }
            (Visibility::Private, GenerationScope::Nested { owner, .. }) => owner == declaring,
            _ => false,
        }
    }
}

impl fmt::Display for GenerationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationScope::Public => f.write_str("public"),
            GenerationScope::Module(m) => write!(f, "module{}", m.index()),
            GenerationScope::Nested { owner, module } => {
                write!(f, "nested{}:module{}", owner, module.index())
            }
        }
    }
}

/// A scope without its module and owner, as named in configuration and on
/// the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    #[default]
    Public,
    Module,
    Nested,
}

impl ScopeKind {
    /// The concrete scope of this kind for code living next to `info`.
    pub fn for_type(self, info: &TypeInfo) -> GenerationScope {
        match self {
            ScopeKind::Public => GenerationScope::Public,
            ScopeKind::Module => GenerationScope::Module(info.module),
            ScopeKind::Nested => GenerationScope::Nested {
                owner: info.key,
                module: info.module,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScopeKind::Public => "public",
            ScopeKind::Module => "module",
            ScopeKind::Nested => "nested",
        }
    }
}

impl FromStr for ScopeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(ScopeKind::Public),
            "module" => Ok(ScopeKind::Module),
            "nested" => Ok(ScopeKind::Nested),
            other => Err(format!(
                "unknown scope '{other}' (expected public, module or nested)"
            )),
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
