//! Generated-unit cache.
//!
//! One slot per `(type, kind, scope)`. A slot holds a weak reference to the
//! type description it was generated from and the result itself. The result
//! stays cached for as long as the introspector describes the type with that
//! same `Arc<TypeInfo>`, whether or not any caller still holds it. A
//! replaced or unregistered description regenerates in place and counts as
//! an eviction; [`InvokerCache::purge`] drops slots whose description is
//! gone.
//!
//! Generation for a key runs under that slot's lock: concurrent first use
//! of one key generates once, other keys are not blocked.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use dashmap::DashMap;
use parking_lot::Mutex;
use quiver_identity::{TypeKey, UnitNameTable};
use quiver_meta::{Introspector, TypeInfo, global_registry};
use rustc_hash::FxBuildHasher;

use crate::config::{EngineConfig, Thresholds};
use crate::error::{AcquireError, EngineFault, GenerationFailure};
use crate::generate::{GenerationResult, generate};
use crate::kind::{GenerationScope, InvokerKind};
use crate::lookup::{ConstructorLookup, FieldLookup, MethodLookup};

pub type CacheKey = (TypeKey, InvokerKind, GenerationScope);

/// Called once per generation, after the slot is updated.
pub type GenerationHook = Arc<dyn Fn(&GenerationEvent) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct GenerationEvent {
    pub target: TypeKey,
    pub kind: InvokerKind,
    pub scope: GenerationScope,
    pub result: Arc<GenerationResult>,
    /// The slot held a stale entry before this generation.
    pub replaced: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub generations: u64,
    pub hits: u64,
    pub evictions: u64,
    pub failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    generations: AtomicU64,
    hits: AtomicU64,
    evictions: AtomicU64,
    failures: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            generations: self.generations.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Default)]
struct SlotEntry {
    info: Weak<TypeInfo>,
    result: Option<Arc<GenerationResult>>,
}

impl SlotEntry {
    /// The cached result, if it was generated from `current`.
    fn current(&self, current: &Arc<TypeInfo>) -> Option<&Arc<GenerationResult>> {
        let info = self.info.upgrade()?;
        if Arc::ptr_eq(&info, current) {
            self.result.as_ref()
        } else {
            None
        }
    }
}

type Slot = Arc<Mutex<SlotEntry>>;

pub struct InvokerCache {
    introspector: Arc<dyn Introspector>,
    thresholds: Thresholds,
    slots: DashMap<CacheKey, Slot, FxBuildHasher>,
    names: Mutex<UnitNameTable>,
    counters: Counters,
    hook: Option<GenerationHook>,
}

impl InvokerCache {
    pub fn new(introspector: Arc<dyn Introspector>) -> Self {
        Self::with_config(introspector, &EngineConfig::default())
    }

    pub fn with_config(introspector: Arc<dyn Introspector>, config: &EngineConfig) -> Self {
        Self {
            introspector,
            thresholds: config.thresholds,
            slots: DashMap::with_hasher(FxBuildHasher),
            names: Mutex::new(UnitNameTable::new()),
            counters: Counters::default(),
            hook: None,
        }
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&GenerationEvent) + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// The process-wide cache over [`global_registry`], configured from the
    /// environment.
    pub fn global() -> &'static InvokerCache {
        static GLOBAL: OnceLock<InvokerCache> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let config = EngineConfig::default()
                .with_env_overrides()
                .unwrap_or_else(|err| {
                    tracing::warn!(%err, "ignoring invalid threshold override");
                    EngineConfig::default()
                });
            let registry: Arc<dyn Introspector> = global_registry().clone();
            InvokerCache::with_config(registry, &config)
        })
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// The unit for `(target, kind, scope)`, generating it if the slot has
    /// no result for the type's current description.
    pub fn get(
        &self,
        target: TypeKey,
        kind: InvokerKind,
        scope: GenerationScope,
    ) -> Result<Arc<GenerationResult>, EngineFault> {
        let key = (target, kind, scope);
        let Some(info) = self.introspector.describe(target) else {
            if self.slots.remove(&key).is_some() {
                Counters::bump(&self.counters.evictions);
            }
            Counters::bump(&self.counters.failures);
            tracing::debug!(%target, %kind, "type not described");
            return Ok(Arc::new(GenerationResult::Failed(
                GenerationFailure::UnknownType { key: target },
            )));
        };

        let slot = self.slots.entry(key).or_default().clone();
        let mut entry = slot.lock();

        if let Some(result) = entry.current(&info) {
            Counters::bump(&self.counters.hits);
            tracing::trace!(%target, %kind, %scope, "cache hit");
            return Ok(result.clone());
        }

        // Release the unit built for the old description before generating.
        let replaced = entry.result.take().is_some();
        if replaced {
            Counters::bump(&self.counters.evictions);
            tracing::debug!(%target, %kind, %scope, "regenerating stale unit");
        }

        let result = Arc::new(generate(
            &info,
            kind,
            scope,
            &self.thresholds,
            None,
            &self.names,
        )?);
        if result.is_generated() {
            Counters::bump(&self.counters.generations);
        } else {
            Counters::bump(&self.counters.failures);
        }
        entry.info = Arc::downgrade(&info);
        entry.result = Some(result.clone());
        drop(entry);

        if let Some(hook) = &self.hook {
            hook(&GenerationEvent {
                target,
                kind,
                scope,
                result: result.clone(),
                replaced,
            });
        }
        Ok(result)
    }

    pub fn fields(
        &self,
        target: TypeKey,
        scope: GenerationScope,
    ) -> Result<FieldLookup, AcquireError> {
        FieldLookup::new(self.get(target, InvokerKind::Field, scope)?)
    }

    pub fn methods(
        &self,
        target: TypeKey,
        scope: GenerationScope,
    ) -> Result<MethodLookup, AcquireError> {
        MethodLookup::new(self.get(target, InvokerKind::Method, scope)?)
    }

    pub fn constructors(
        &self,
        target: TypeKey,
        scope: GenerationScope,
    ) -> Result<ConstructorLookup, AcquireError> {
        ConstructorLookup::new(self.get(target, InvokerKind::Constructor, scope)?)
    }

    /// Drop slots whose type description is gone or has been replaced, along
    /// with their results. Returns how many were dropped. Empty slots and
    /// slots busy generating are kept.
    pub fn purge(&self) -> usize {
        let before = self.slots.len();
        self.slots.retain(|(target, _, _), slot| {
            slot.try_lock().is_none_or(|entry| {
                // Empty slots may be about to generate.
                entry.result.is_none()
                    || self
                        .introspector
                        .describe(*target)
                        .is_some_and(|info| entry.current(&info).is_some())
            })
        });
        let purged = before.saturating_sub(self.slots.len());
        if purged > 0 {
            tracing::debug!(purged, "purged stale cache slots");
        }
        purged
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Number of slots, current or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of distinct unit names ever registered.
    pub fn unit_count(&self) -> usize {
        self.names.lock().len()
    }
}
