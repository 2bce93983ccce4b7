// generate.rs
//
// One generation: classify, pick a strategy, build the unit, name it.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use quiver_identity::{UnitId, UnitNameTable, UnitNamer};
use quiver_meta::TypeInfo;

use crate::config::Thresholds;
use crate::dispatch::{
    ConstructorInvoker, FieldAccess, MethodInvoker, SynthesizedConstructorInvoker,
    SynthesizedFieldAccess, SynthesizedMethodInvoker,
};
use crate::error::{AcquireError, EngineFault, GenerationFailure};
use crate::fallback::{ReflectiveConstructorInvoker, ReflectiveFieldAccess, ReflectiveMethodInvoker};
use crate::kind::{GenerationScope, InvokerKind};
use crate::layout::{Layout, classify};
use crate::strategy::{Strategy, select};

/// The invoker handle of a generated unit.
#[derive(Clone)]
pub enum Invoker {
    Fields(Arc<dyn FieldAccess>),
    Methods(Arc<dyn MethodInvoker>),
    Constructors(Arc<dyn ConstructorInvoker>),
}

impl Invoker {
    pub fn kind(&self) -> InvokerKind {
        match self {
            Invoker::Fields(_) => InvokerKind::Field,
            Invoker::Methods(_) => InvokerKind::Method,
            Invoker::Constructors(_) => InvokerKind::Constructor,
        }
    }
}

pub struct GeneratedUnit {
    pub id: UnitId,
    pub name: Arc<str>,
    pub strategy: Strategy,
    pub layout: Arc<Layout>,
    pub invoker: Invoker,
}

impl fmt::Debug for GeneratedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedUnit")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("strategy", &self.strategy)
            .field("members", &self.layout.len())
            .finish_non_exhaustive()
    }
}

/// Outcome of a generation. A type with nothing to generate is a
/// `Failed` result, not an error.
#[derive(Debug)]
pub enum GenerationResult {
    Generated(GeneratedUnit),
    Failed(GenerationFailure),
}

impl GenerationResult {
    pub fn unit(&self) -> Option<&GeneratedUnit> {
        match self {
            GenerationResult::Generated(unit) => Some(unit),
            GenerationResult::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&GenerationFailure> {
        match self {
            GenerationResult::Generated(_) => None,
            GenerationResult::Failed(failure) => Some(failure),
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, GenerationResult::Generated(_))
    }

    fn invoker(&self) -> Result<&Invoker, AcquireError> {
        match self {
            GenerationResult::Generated(unit) => Ok(&unit.invoker),
            GenerationResult::Failed(failure) => Err(failure.clone().into()),
        }
    }

    pub fn field_access(&self) -> Result<Arc<dyn FieldAccess>, AcquireError> {
        match self.invoker()? {
            Invoker::Fields(access) => Ok(access.clone()),
            other => Err(wrong_kind(InvokerKind::Field, other)),
        }
    }

    pub fn method_invoker(&self) -> Result<Arc<dyn MethodInvoker>, AcquireError> {
        match self.invoker()? {
            Invoker::Methods(invoker) => Ok(invoker.clone()),
            other => Err(wrong_kind(InvokerKind::Method, other)),
        }
    }

    pub fn constructor_invoker(&self) -> Result<Arc<dyn ConstructorInvoker>, AcquireError> {
        match self.invoker()? {
            Invoker::Constructors(invoker) => Ok(invoker.clone()),
            other => Err(wrong_kind(InvokerKind::Constructor, other)),
        }
    }
}

fn wrong_kind(expected: InvokerKind, found: &Invoker) -> AcquireError {
    AcquireError::WrongKind {
        expected,
        found: found.kind(),
    }
}

/// Deterministic unit name for `layout`.
pub fn unit_name(layout: &Layout) -> String {
    let scope = layout.scope().to_string();
    let mut namer = UnitNamer::new(layout.type_name(), layout.target(), layout.kind().unit_suffix())
        .scope(&scope);
    for declaring in layout.declaring_names() {
        namer = namer.declaring(declaring);
    }
    namer.name(layout.signature_hash())
}

/// Build the invoker for `layout` with the given strategy.
pub fn build_invoker(
    layout: Arc<Layout>,
    info: &Arc<TypeInfo>,
    strategy: Strategy,
) -> Result<Invoker, EngineFault> {
    let invoker = match (layout.kind(), strategy) {
        (InvokerKind::Field, Strategy::Synthesized) => {
            Invoker::Fields(Arc::new(SynthesizedFieldAccess::build(layout, info)?))
        }
        (InvokerKind::Field, Strategy::Fallback) => {
            Invoker::Fields(Arc::new(ReflectiveFieldAccess::new(layout, info.clone())))
        }
        (InvokerKind::Method, Strategy::Synthesized) => {
            Invoker::Methods(Arc::new(SynthesizedMethodInvoker::build(layout, info)?))
        }
        (InvokerKind::Method, Strategy::Fallback) => {
            Invoker::Methods(Arc::new(ReflectiveMethodInvoker::new(layout, info.clone())))
        }
        (InvokerKind::Constructor, Strategy::Synthesized) => {
            Invoker::Constructors(Arc::new(SynthesizedConstructorInvoker::build(layout, info)?))
        }
        (InvokerKind::Constructor, Strategy::Fallback) => Invoker::Constructors(Arc::new(
            ReflectiveConstructorInvoker::new(layout, info.clone()),
        )),
    };
    Ok(invoker)
}

/// Run one full generation for `info`.
///
/// `strategy` forces a strategy; `None` lets the thresholds decide.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(type_name = %info.name, %kind, %scope)
)]
pub fn generate(
    info: &Arc<TypeInfo>,
    kind: InvokerKind,
    scope: GenerationScope,
    thresholds: &Thresholds,
    strategy: Option<Strategy>,
    names: &Mutex<UnitNameTable>,
) -> Result<GenerationResult, EngineFault> {
    let layout = match classify(info, kind, scope) {
        Ok(layout) => Arc::new(layout),
        Err(failure) => {
            tracing::debug!(%failure, "nothing to generate");
            return Ok(GenerationResult::Failed(failure));
        }
    };
    let strategy = strategy.unwrap_or_else(|| select(&layout, thresholds));
    let invoker = build_invoker(layout.clone(), info, strategy)?;

    let name = unit_name(&layout);
    let (id, fresh) = names.lock().register(&name);
    tracing::debug!(unit = %id, %name, fresh, %strategy, "generated unit");

    Ok(GenerationResult::Generated(GeneratedUnit {
        id,
        name: Arc::from(name),
        strategy,
        layout,
        invoker,
    }))
}
