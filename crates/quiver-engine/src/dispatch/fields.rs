// fields.rs
//
// Synthesized field access: one boxed accessor table over the whole layout
// plus one typed table per primitive bucket.

use std::any::Any;
use std::sync::Arc;

use paste::paste;
use quiver_identity::PrimitiveKind;
use quiver_meta::{FieldAccessor, TypeInfo, TypedField, Value};

use super::{FieldAccess, KindTable, access_fault, invalid_index, missing_member, read_only};
use crate::error::{EngineFault, InvokeError};
use crate::layout::{Layout, Shape};
use crate::strategy::Strategy;

macro_rules! synthesized_field_access {
    ($($Kind:ident => $ty:ident),* $(,)?) => {
        paste! {
            /// Field access through dense precomputed tables.
            pub struct SynthesizedFieldAccess {
                layout: Arc<Layout>,
                accessors: Box<[FieldAccessor]>,
                $([<$ty _fields>]: KindTable<TypedField<$ty>>,)*
            }

            impl SynthesizedFieldAccess {
                pub fn build(layout: Arc<Layout>, info: &TypeInfo) -> Result<Self, EngineFault> {
                    let accessors = layout
                        .members()
                        .iter()
                        .map(|m| {
                            info.fields
                                .get(m.source)
                                .filter(|f| f.name == m.name && f.origin.declaring == m.declaring)
                                .map(|f| f.accessor.clone())
                                .ok_or_else(|| missing_member(info, m))
                        })
                        .collect::<Result<Box<[_]>, _>>()?;

                    $(
                        let [<$ty _fields>] = match layout.bucket(Shape::Primitive(PrimitiveKind::$Kind)) {
                            Some(range) => KindTable::new(
                                range.start,
                                range
                                    .map(|index| match &accessors[index] {
                                        FieldAccessor::$Kind(field) => Ok(field.clone()),
                                        _ => Err(missing_member(info, &layout.members()[index])),
                                    })
                                    .collect::<Result<_, _>>()?,
                            ),
                            None => KindTable::empty(),
                        };
                    )*

                    Ok(Self {
                        layout,
                        accessors,
                        $([<$ty _fields>],)*
                    })
                }
            }

            impl FieldAccess for SynthesizedFieldAccess {
                fn layout(&self) -> &Layout {
                    &self.layout
                }

                fn strategy(&self) -> Strategy {
                    Strategy::Synthesized
                }

                fn get(&self, index: usize, target: &dyn Any) -> Result<Value, InvokeError> {
                    let accessor = self
                        .accessors
                        .get(index)
                        .ok_or_else(|| invalid_index(&self.layout, index, "field"))?;
                    accessor
                        .get_boxed(target)
                        .map_err(|fault| access_fault(&self.layout, index, fault))
                }

                fn set(&self, index: usize, target: &mut dyn Any, value: Value) -> Result<(), InvokeError> {
                    let accessor = self
                        .accessors
                        .get(index)
                        .ok_or_else(|| invalid_index(&self.layout, index, "field"))?;
                    accessor
                        .set_boxed(target, value)
                        .map_err(|fault| access_fault(&self.layout, index, fault))
                }

                $(
                    #[inline]
                    fn [<get_ $ty>](&self, index: usize, target: &dyn Any) -> Result<$ty, InvokeError> {
                        let field = self.[<$ty _fields>].get(index).ok_or_else(|| {
                            invalid_index(&self.layout, index, concat!(stringify!($ty), " field"))
                        })?;
                        (field.get)(target).map_err(|fault| access_fault(&self.layout, index, fault))
                    }

                    #[inline]
                    fn [<set_ $ty>](&self, index: usize, target: &mut dyn Any, value: $ty) -> Result<(), InvokeError> {
                        let field = self.[<$ty _fields>].get(index).ok_or_else(|| {
                            invalid_index(&self.layout, index, concat!(stringify!($ty), " field"))
                        })?;
                        let set = field.set.as_ref().ok_or_else(|| read_only(&self.layout, index))?;
                        set(target, value).map_err(|fault| access_fault(&self.layout, index, fault))
                    }
                )*
            }
        }
    };
}

quiver_meta::for_each_primitive!(synthesized_field_access);
