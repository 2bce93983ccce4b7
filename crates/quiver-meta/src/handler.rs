// handler.rs
//
// Turns ordinary Rust closures into method and constructor bodies.
//
// `MethodHandler<T, Args>` is implemented for every `Fn(&mut T, A0, .., An) -> R`
// with `n <= 6`, `ConstructorHandler<T, Args>` for every `Fn(A0, .., An) -> T`.
// The `Args` tuple only exists to keep the impls apart.

use std::any::Any;
use std::sync::Arc;

use paste::paste;
use quiver_identity::TypeRef;
use smallvec::{SmallVec, smallvec};

use crate::accessor::{
    ConstructFn, ConstructorBody, InvokeFn, MethodBody, ReturnFn, UnaryCall, downcast_mut,
};
use crate::error::AccessFault;
use crate::value::{FromValue, MemberType, Value};

pub type ParamList = SmallVec<[TypeRef; 4]>;

/// A closure usable as the body of a method on `T`.
pub trait MethodHandler<T, Args>: Send + Sync + 'static {
    fn params() -> ParamList;
    fn ret() -> TypeRef;
    fn into_body(self) -> MethodBody;
}

/// A closure usable as a constructor of `T`.
pub trait ConstructorHandler<T, Args>: Send + Sync + 'static {
    fn params() -> ParamList;
    fn into_body(self) -> ConstructorBody;
}

#[inline]
fn check_arity(args: &[Value], expected: usize) -> Result<(), AccessFault> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(AccessFault::Arity {
            expected,
            found: args.len(),
        })
    }
}

// Arity one is written out: it is the only arity with a single-argument
// fast path.
impl<T, F, A, R> MethodHandler<T, (A,)> for F
where
    T: Any,
    F: Fn(&mut T, A) -> R + Send + Sync + 'static,
    A: MemberType,
    R: MemberType,
{
    fn params() -> ParamList {
        smallvec![A::type_ref()]
    }

    fn ret() -> TypeRef {
        R::type_ref()
    }

    fn into_body(self) -> MethodBody {
        let f = Arc::new(self);

        let invoke: InvokeFn = {
            let f = f.clone();
            Arc::new(move |target: &mut dyn Any, args: &[Value]| {
                check_arity(args, 1)?;
                let target = downcast_mut::<T>(target)?;
                let arg = A::from_value(&args[0])?;
                Ok(f(target, arg).into_value())
            })
        };

        let unary: UnaryCall<T, A> = {
            let f = f.clone();
            Arc::new(move |target: &mut T, arg: A| f(target, arg).into_value())
        };

        let returning: ReturnFn<R> = Arc::new(move |target: &mut dyn Any, args: &[Value]| {
            check_arity(args, 1)?;
            let target = downcast_mut::<T>(target)?;
            let arg = A::from_value(&args[0])?;
            Ok(f(target, arg))
        });

        MethodBody {
            invoke,
            unary: A::unary_entry::<T>(unary),
            returning: R::return_entry(returning),
        }
    }
}

macro_rules! impl_method_handler {
    ($arity:literal => $($A:ident $idx:tt),*) => {
        paste! {
            impl<T, F, $($A,)* R> MethodHandler<T, ($($A,)*)> for F
            where
                T: Any,
                F: Fn(&mut T, $($A),*) -> R + Send + Sync + 'static,
                $($A: MemberType,)*
                R: MemberType,
            {
                fn params() -> ParamList {
                    smallvec![$(<$A as MemberType>::type_ref()),*]
                }

                fn ret() -> TypeRef {
                    R::type_ref()
                }

                fn into_body(self) -> MethodBody {
                    let f = Arc::new(self);

                    let invoke: InvokeFn = {
                        let f = f.clone();
                        Arc::new(move |target: &mut dyn Any, args: &[Value]| {
                            check_arity(args, $arity)?;
                            let target = downcast_mut::<T>(target)?;
                            $(let [<$A:lower>] = <$A as FromValue>::from_value(&args[$idx])?;)*
                            Ok(f(target, $([<$A:lower>]),*).into_value())
                        })
                    };

                    let returning: ReturnFn<R> = Arc::new(move |target: &mut dyn Any, args: &[Value]| {
                        check_arity(args, $arity)?;
                        let target = downcast_mut::<T>(target)?;
                        $(let [<$A:lower>] = <$A as FromValue>::from_value(&args[$idx])?;)*
                        Ok(f(target, $([<$A:lower>]),*))
                    });

                    MethodBody {
                        invoke,
                        unary: None,
                        returning: R::return_entry(returning),
                    }
                }
            }
        }
    };
}

impl_method_handler!(0 =>);
impl_method_handler!(2 => A0 0, A1 1);
impl_method_handler!(3 => A0 0, A1 1, A2 2);
impl_method_handler!(4 => A0 0, A1 1, A2 2, A3 3);
impl_method_handler!(5 => A0 0, A1 1, A2 2, A3 3, A4 4);
impl_method_handler!(6 => A0 0, A1 1, A2 2, A3 3, A4 4, A5 5);

macro_rules! impl_constructor_handler {
    ($arity:literal => $($A:ident $idx:tt),*) => {
        paste! {
            impl<T, F, $($A,)*> ConstructorHandler<T, ($($A,)*)> for F
            where
                T: Any,
                F: Fn($($A),*) -> T + Send + Sync + 'static,
                $($A: MemberType,)*
            {
                fn params() -> ParamList {
                    smallvec![$(<$A as MemberType>::type_ref()),*]
                }

                fn into_body(self) -> ConstructorBody {
                    let construct: ConstructFn = Arc::new(move |args: &[Value]| {
                        check_arity(args, $arity)?;
                        $(let [<$A:lower>] = <$A as FromValue>::from_value(&args[$idx])?;)*
                        Ok(Box::new(self($([<$A:lower>]),*)) as Box<dyn Any>)
                    });
                    ConstructorBody { construct }
                }
            }
        }
    };
}

impl_constructor_handler!(0 =>);
impl_constructor_handler!(1 => A0 0);
impl_constructor_handler!(2 => A0 0, A1 1);
impl_constructor_handler!(3 => A0 0, A1 1, A2 2);
impl_constructor_handler!(4 => A0 0, A1 1, A2 2, A3 3);
impl_constructor_handler!(5 => A0 0, A1 1, A2 2, A3 3, A4 4);
impl_constructor_handler!(6 => A0 0, A1 1, A2 2, A3 3, A4 4, A5 5);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{ReturnEntry, UnaryEntry};

    #[derive(Debug, Default, PartialEq)]
    struct Counter {
        total: i64,
    }

    fn body<Args, H: MethodHandler<Counter, Args>>(h: H) -> MethodBody {
        h.into_body()
    }

    #[test]
    fn unary_primitive_method_gets_fast_paths() {
        let body = body(|c: &mut Counter, n: i32| {
            c.total += i64::from(n);
            c.total
        });
        let mut counter = Counter::default();

        let Some(UnaryEntry::I32(unary)) = &body.unary else {
            panic!("expected an i32 unary entry, got {:?}", body);
        };
        assert_eq!(unary(&mut counter, 5), Ok(Value::I64(5)));

        let Some(ReturnEntry::I64(returning)) = &body.returning else {
            panic!("expected an i64 return entry, got {:?}", body);
        };
        assert_eq!(returning(&mut counter, &[Value::I32(2)]), Ok(7));
        assert_eq!((body.invoke)(&mut counter, &[Value::I32(1)]), Ok(Value::I64(8)));
    }

    #[test]
    fn generic_invoke_checks_arity_and_target() {
        let body = body(|c: &mut Counter, a: i64, b: i64| c.total = a * b);
        let mut counter = Counter::default();

        assert_eq!(
            (body.invoke)(&mut counter, &[Value::I64(1)]),
            Err(AccessFault::Arity {
                expected: 2,
                found: 1
            })
        );
        let mut wrong = String::new();
        assert!(matches!(
            (body.invoke)(&mut wrong, &[Value::I64(1), Value::I64(2)]),
            Err(AccessFault::TargetMismatch { .. })
        ));
        assert_eq!(
            (body.invoke)(&mut counter, &[Value::I64(6), Value::I64(7)]),
            Ok(Value::Void)
        );
        assert_eq!(counter.total, 42);
        assert!(body.unary.is_none());
        assert!(body.returning.is_none());
    }

    #[test]
    fn reference_argument_has_no_unary_entry() {
        let body = body(|c: &mut Counter, s: String| c.total = s.len() as i64);
        assert!(body.unary.is_none());
        assert_eq!(
            <fn(&mut Counter, String) as MethodHandler<Counter, (String,)>>::params().as_slice(),
            &[TypeRef::Str]
        );
    }

    #[test]
    fn constructor_unboxes_each_parameter() {
        fn ctor<Args, H: ConstructorHandler<Counter, Args>>(h: H) -> ConstructorBody {
            h.into_body()
        }
        let body = ctor(|a: i32, b: i32| Counter {
            total: i64::from(a) + i64::from(b),
        });
        let made = (body.construct)(&[Value::I32(3), Value::I32(4)]).unwrap();
        assert_eq!(made.downcast_ref::<Counter>(), Some(&Counter { total: 7 }));

        let err = (body.construct)(&[Value::I32(3), Value::Null]).err();
        assert!(matches!(err, Some(AccessFault::Unbox(_))));
    }
}
