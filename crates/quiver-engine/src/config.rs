//! Engine configuration.
//!
//! Loaded from TOML with every field optional; omitted fields keep the
//! `Default` values. Environment variables override the file:
//!
//! | variable | field |
//! |---|---|
//! | `QUIVER_FIELD_THRESHOLD` | `thresholds.fields` |
//! | `QUIVER_METHOD_THRESHOLD` | `thresholds.methods` |
//! | `QUIVER_CONSTRUCTOR_THRESHOLD` | `thresholds.constructors` |

use std::path::Path;

use crate::error::ConfigError;
use crate::kind::{InvokerKind, ScopeKind};

pub const FIELD_THRESHOLD_VAR: &str = "QUIVER_FIELD_THRESHOLD";
pub const METHOD_THRESHOLD_VAR: &str = "QUIVER_METHOD_THRESHOLD";
pub const CONSTRUCTOR_THRESHOLD_VAR: &str = "QUIVER_CONSTRUCTOR_THRESHOLD";

/// Member counts at or above which a unit falls back to per-call resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub fields: usize,
    pub methods: usize,
    pub constructors: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            fields: 256,
            methods: 192,
            constructors: 64,
        }
    }
}

impl Thresholds {
    pub fn for_kind(&self, kind: InvokerKind) -> usize {
        match kind {
            InvokerKind::Field => self.fields,
            InvokerKind::Method => self.methods,
            InvokerKind::Constructor => self.constructors,
        }
    }

    /// Same threshold for every kind.
    pub fn uniform(threshold: usize) -> Self {
        Self {
            fields: threshold,
            methods: threshold,
            constructors: threshold,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scope used when a caller does not name one.
    pub default_scope: ScopeKind,
    pub thresholds: Thresholds,
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Apply `QUIVER_*_THRESHOLD` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply threshold overrides from `lookup`, which maps a variable name to
    /// its value.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let slots = [
            (FIELD_THRESHOLD_VAR, &mut self.thresholds.fields),
            (METHOD_THRESHOLD_VAR, &mut self.thresholds.methods),
            (CONSTRUCTOR_THRESHOLD_VAR, &mut self.thresholds.constructors),
        ];
        for (var, slot) in slots {
            if let Some(value) = lookup(var) {
                *slot = value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidOverride { var, value })?;
                tracing::debug!(var, threshold = *slot, "threshold override");
            }
        }
        Ok(self)
    }

    /// Defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env_overrides()
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_fields_keep_defaults() {
        let config = EngineConfig::from_toml_str("[thresholds]\nmethods = 8\n").unwrap();
        assert_eq!(config.thresholds.methods, 8);
        assert_eq!(config.thresholds.fields, 256);
        assert_eq!(config.thresholds.constructors, 64);
        assert_eq!(config.default_scope, ScopeKind::Public);
    }

    #[test]
    fn scope_parses_lowercase() {
        let config = EngineConfig::from_toml_str("default_scope = \"nested\"").unwrap();
        assert_eq!(config.default_scope, ScopeKind::Nested);
        assert!(EngineConfig::from_toml_str("default_scope = \"everywhere\"").is_err());
    }

    #[test]
    fn overrides_replace_file_values() {
        let config = EngineConfig::default()
            .with_overrides(|var| (var == FIELD_THRESHOLD_VAR).then(|| " 3 ".to_string()))
            .unwrap();
        assert_eq!(config.thresholds.fields, 3);
        assert_eq!(config.thresholds.methods, 192);
    }

    #[test]
    fn bad_override_is_reported() {
        let err = EngineConfig::default()
            .with_overrides(|var| (var == METHOD_THRESHOLD_VAR).then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidOverride { var: METHOD_THRESHOLD_VAR, .. }
        ));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = EngineConfig {
            thresholds: Thresholds::uniform(5),
            default_scope: ScopeKind::Module,
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn serialize_errors_are_reported() {
        // A bare integer is not a TOML document.
        let err = ConfigError::from(toml::to_string(&5u32).unwrap_err());
        assert!(matches!(err, ConfigError::Serialize(_)));
        assert_eq!(
            miette::Diagnostic::code(&err).map(|code| code.to_string()),
            Some("Q3004".to_string())
        );
    }
}
