//! Fallback units for layouts too large to synthesize.
//!
//! Nothing is precomputed: every call looks the member up in the type
//! description by name, declaring type and parameter signature, then calls
//! it. Results and errors match the synthesized units exactly.

use std::any::Any;
use std::sync::Arc;

use paste::paste;
use quiver_meta::{
    ConstructorDef, FieldAccessor, FieldDef, MethodDef, ReturnEntry, TypeInfo, UnaryEntry, Value,
};

use crate::dispatch::{
    ConstructorInvoker, FieldAccess, MethodInvoker, access_fault, invalid_index, missing_member,
    read_only,
};
use crate::error::InvokeError;
use crate::layout::{Layout, Shape};
use crate::strategy::Strategy;

pub struct ReflectiveFieldAccess {
    layout: Arc<Layout>,
    info: Arc<TypeInfo>,
}

impl ReflectiveFieldAccess {
    pub fn new(layout: Arc<Layout>, info: Arc<TypeInfo>) -> Self {
        Self { layout, info }
    }

    fn resolve(&self, index: usize, view: &'static str) -> Result<&FieldDef, InvokeError> {
        let member = self
            .layout
            .member(index)
            .ok_or_else(|| invalid_index(&self.layout, index, view))?;
        self.info
            .find_field(&member.name, member.declaring)
            .ok_or_else(|| missing_member(&self.info, member).into())
    }
}

pub struct ReflectiveMethodInvoker {
    layout: Arc<Layout>,
    info: Arc<TypeInfo>,
}

impl ReflectiveMethodInvoker {
    pub fn new(layout: Arc<Layout>, info: Arc<TypeInfo>) -> Self {
        Self { layout, info }
    }

    fn resolve(&self, index: usize, view: &'static str) -> Result<&MethodDef, InvokeError> {
        let member = self
            .layout
            .member(index)
            .ok_or_else(|| invalid_index(&self.layout, index, view))?;
        self.info
            .find_method(&member.name, member.declaring, &member.params)
            .ok_or_else(|| missing_member(&self.info, member).into())
    }
}

macro_rules! reflective_units {
    ($($Kind:ident => $ty:ident),* $(,)?) => {
        paste! {
            impl FieldAccess for ReflectiveFieldAccess {
                fn layout(&self) -> &Layout {
                    &self.layout
                }

                fn strategy(&self) -> Strategy {
                    Strategy::Fallback
                }

                fn get(&self, index: usize, target: &dyn Any) -> Result<Value, InvokeError> {
                    self.resolve(index, "field")?
                        .accessor
                        .get_boxed(target)
                        .map_err(|fault| access_fault(&self.layout, index, fault))
                }

                fn set(&self, index: usize, target: &mut dyn Any, value: Value) -> Result<(), InvokeError> {
                    self.resolve(index, "field")?
                        .accessor
                        .set_boxed(target, value)
                        .map_err(|fault| access_fault(&self.layout, index, fault))
                }

                $(
                    fn [<get_ $ty>](&self, index: usize, target: &dyn Any) -> Result<$ty, InvokeError> {
                        const VIEW: &str = concat!(stringify!($ty), " field");
                        match &self.resolve(index, VIEW)?.accessor {
                            FieldAccessor::$Kind(field) => {
                                (field.get)(target).map_err(|fault| access_fault(&self.layout, index, fault))
                            }
                            _ => Err(invalid_index(&self.layout, index, VIEW)),
                        }
                    }

                    fn [<set_ $ty>](&self, index: usize, target: &mut dyn Any, value: $ty) -> Result<(), InvokeError> {
                        const VIEW: &str = concat!(stringify!($ty), " field");
                        match &self.resolve(index, VIEW)?.accessor {
                            FieldAccessor::$Kind(field) => {
                                let set = field.set.as_ref().ok_or_else(|| read_only(&self.layout, index))?;
                                set(target, value).map_err(|fault| access_fault(&self.layout, index, fault))
                            }
                            _ => Err(invalid_index(&self.layout, index, VIEW)),
                        }
                    }
                )*
            }

            impl MethodInvoker for ReflectiveMethodInvoker {
                fn layout(&self) -> &Layout {
                    &self.layout
                }

                fn strategy(&self) -> Strategy {
                    Strategy::Fallback
                }

                fn invoke(&self, index: usize, target: &mut dyn Any, args: &[Value]) -> Result<Value, InvokeError> {
                    (self.resolve(index, "method")?.body.invoke)(target, args)
                        .map_err(|fault| access_fault(&self.layout, index, fault))
                }

                fn invoke0(&self, index: usize, target: &mut dyn Any) -> Result<Value, InvokeError> {
                    const VIEW: &str = "nullary method";
                    if self.layout.member(index).map(|m| m.shape) != Some(Shape::Nullary) {
                        return Err(invalid_index(&self.layout, index, VIEW));
                    }
                    (self.resolve(index, VIEW)?.body.invoke)(target, &[])
                        .map_err(|fault| access_fault(&self.layout, index, fault))
                }

                $(
                    fn [<invoke_with_ $ty>](&self, index: usize, target: &mut dyn Any, arg: $ty) -> Result<Value, InvokeError> {
                        const VIEW: &str = concat!("single-", stringify!($ty), " method");
                        match &self.resolve(index, VIEW)?.body.unary {
                            Some(UnaryEntry::$Kind(f)) => {
                                f(target, arg).map_err(|fault| access_fault(&self.layout, index, fault))
                            }
                            _ => Err(invalid_index(&self.layout, index, VIEW)),
                        }
                    }

                    fn [<invoke_ $ty>](&self, index: usize, target: &mut dyn Any, args: &[Value]) -> Result<$ty, InvokeError> {
                        const VIEW: &str = concat!(stringify!($ty), "-returning method");
                        match &self.resolve(index, VIEW)?.body.returning {
                            Some(ReturnEntry::$Kind(f)) => {
                                f(target, args).map_err(|fault| access_fault(&self.layout, index, fault))
                            }
                            _ => Err(invalid_index(&self.layout, index, VIEW)),
                        }
                    }
                )*
            }
        }
    };
}

quiver_meta::for_each_primitive!(reflective_units);

pub struct ReflectiveConstructorInvoker {
    layout: Arc<Layout>,
    info: Arc<TypeInfo>,
}

impl ReflectiveConstructorInvoker {
    pub fn new(layout: Arc<Layout>, info: Arc<TypeInfo>) -> Self {
        Self { layout, info }
    }

    fn resolve(&self, index: usize) -> Result<&ConstructorDef, InvokeError> {
        let member = self
            .layout
            .member(index)
            .ok_or_else(|| invalid_index(&self.layout, index, "constructor"))?;
        self.info
            .find_constructor(&member.params)
            .ok_or_else(|| missing_member(&self.info, member).into())
    }
}

impl ConstructorInvoker for ReflectiveConstructorInvoker {
    fn layout(&self) -> &Layout {
        &self.layout
    }

    fn strategy(&self) -> Strategy {
        Strategy::Fallback
    }

    fn new_instance(&self, index: usize, args: &[Value]) -> Result<Box<dyn Any>, InvokeError> {
        (self.resolve(index)?.body.construct)(args)
            .map_err(|fault| access_fault(&self.layout, index, fault))
    }
}
