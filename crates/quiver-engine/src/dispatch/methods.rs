// methods.rs
//
// Synthesized method invocation.

use std::any::Any;
use std::ops::Range;
use std::sync::Arc;

use paste::paste;
use quiver_identity::PrimitiveKind;
use quiver_meta::{InvokeFn, MethodBody, ReturnEntry, TypeInfo, UnaryEntry, UnaryFn, Value};

use super::{KindTable, MethodInvoker, access_fault, invalid_index, missing_member};
use crate::error::{EngineFault, InvokeError};
use crate::layout::{Layout, Shape};
use crate::strategy::Strategy;

macro_rules! synthesized_method_invoker {
    ($($Kind:ident => $ty:ident),* $(,)?) => {
        paste! {
            /// Method invocation through dense precomputed tables.
            ///
            /// - `invokers`: boxed entry of every member, by index
            /// - `nullary`: index range valid for `invoke0`
            /// - `returning`: primitive-return entry of every member, if any
            /// - one unary table per primitive bucket
            pub struct SynthesizedMethodInvoker {
                layout: Arc<Layout>,
                invokers: Box<[InvokeFn]>,
                nullary: Range<usize>,
                returning: Box<[Option<ReturnEntry>]>,
                $([<$ty _unary>]: KindTable<UnaryFn<$ty>>,)*
            }

            impl SynthesizedMethodInvoker {
                pub fn build(layout: Arc<Layout>, info: &TypeInfo) -> Result<Self, EngineFault> {
                    let bodies: Vec<&MethodBody> = layout
                        .members()
                        .iter()
                        .map(|m| {
                            info.methods
                                .get(m.source)
                                .filter(|def| {
                                    def.name == m.name
                                        && def.origin.declaring == m.declaring
                                        && def.params == m.params
                                })
                                .map(|def| &def.body)
                                .ok_or_else(|| missing_member(info, m))
                        })
                        .collect::<Result<_, _>>()?;

                    let invokers = bodies.iter().map(|b| b.invoke.clone()).collect();
                    let returning = bodies.iter().map(|b| b.returning.clone()).collect();
                    let nullary = layout.bucket(Shape::Nullary).unwrap_or(0..0);

                    $(
                        let [<$ty _unary>] = match layout.bucket(Shape::Primitive(PrimitiveKind::$Kind)) {
                            Some(range) => KindTable::new(
                                range.start,
                                range
                                    .map(|index| match &bodies[index].unary {
                                        Some(UnaryEntry::$Kind(f)) => Ok(f.clone()),
                                        _ => Err(missing_member(info, &layout.members()[index])),
                                    })
                                    .collect::<Result<_, _>>()?,
                            ),
                            None => KindTable::empty(),
                        };
                    )*

                    Ok(Self {
                        layout,
                        invokers,
                        nullary,
                        returning,
                        $([<$ty _unary>],)*
                    })
                }
            }

            impl MethodInvoker for SynthesizedMethodInvoker {
                fn layout(&self) -> &Layout {
                    &self.layout
                }

                fn strategy(&self) -> Strategy {
                    Strategy::Synthesized
                }

                fn invoke(&self, index: usize, target: &mut dyn Any, args: &[Value]) -> Result<Value, InvokeError> {
                    let invoke = self
                        .invokers
                        .get(index)
                        .ok_or_else(|| invalid_index(&self.layout, index, "method"))?;
                    invoke(target, args).map_err(|fault| access_fault(&self.layout, index, fault))
                }

                fn invoke0(&self, index: usize, target: &mut dyn Any) -> Result<Value, InvokeError> {
                    if !self.nullary.contains(&index) {
                        return Err(invalid_index(&self.layout, index, "nullary method"));
                    }
                    (self.invokers[index])(target, &[])
                        .map_err(|fault| access_fault(&self.layout, index, fault))
                }

                $(
                    #[inline]
                    fn [<invoke_with_ $ty>](&self, index: usize, target: &mut dyn Any, arg: $ty) -> Result<Value, InvokeError> {
                        let f = self.[<$ty _unary>].get(index).ok_or_else(|| {
                            invalid_index(&self.layout, index, concat!("single-", stringify!($ty), " method"))
                        })?;
                        f(target, arg).map_err(|fault| access_fault(&self.layout, index, fault))
                    }

                    #[inline]
                    fn [<invoke_ $ty>](&self, index: usize, target: &mut dyn Any, args: &[Value]) -> Result<$ty, InvokeError> {
                        match self.returning.get(index) {
                            Some(Some(ReturnEntry::$Kind(f))) => {
                                f(target, args).map_err(|fault| access_fault(&self.layout, index, fault))
                            }
                            _ => Err(invalid_index(
                                &self.layout,
                                index,
                                concat!(stringify!($ty), "-returning method"),
                            )),
                        }
                    }
                )*
            }
        }
    };
}

quiver_meta::for_each_primitive!(synthesized_method_invoker);
