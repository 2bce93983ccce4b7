// constructors.rs
//
// Synthesized construction.

use std::any::Any;
use std::sync::Arc;

use quiver_meta::{ConstructFn, TypeInfo, Value};

use super::{ConstructorInvoker, access_fault, invalid_index, missing_member};
use crate::error::{EngineFault, InvokeError};
use crate::layout::Layout;
use crate::strategy::Strategy;

/// Construction through a dense table of constructor bodies.
pub struct SynthesizedConstructorInvoker {
    layout: Arc<Layout>,
    constructors: Box<[ConstructFn]>,
}

impl SynthesizedConstructorInvoker {
    pub fn build(layout: Arc<Layout>, info: &TypeInfo) -> Result<Self, EngineFault> {
        let constructors = layout
            .members()
            .iter()
            .map(|m| {
                info.constructors
                    .get(m.source)
                    .filter(|def| def.params == m.params)
                    .map(|def| def.body.construct.clone())
                    .ok_or_else(|| missing_member(info, m))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            layout,
            constructors,
        })
    }
}

impl ConstructorInvoker for SynthesizedConstructorInvoker {
    fn layout(&self) -> &Layout {
        &self.layout
    }

    fn strategy(&self) -> Strategy {
        Strategy::Synthesized
    }

    fn new_instance(&self, index: usize, args: &[Value]) -> Result<Box<dyn Any>, InvokeError> {
        let construct = self
            .constructors
            .get(index)
            .ok_or_else(|| invalid_index(&self.layout, index, "constructor"))?;
        construct(args).map_err(|fault| access_fault(&self.layout, index, fault))
    }
}
