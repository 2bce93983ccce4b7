// src/bench/synthetic.rs
//
// A synthetic type of configurable width, registered at run time so layouts
// and benchmarks can be driven from the command line.

use std::sync::Arc;

use quiver_meta::{MemberDecl, MetaError, TypeBuilder, TypeInfo, TypeRegistry};
use serde::Serialize;

/// Registered name of [`Wide`].
pub const WIDE_TYPE_NAME: &str = "bench::Wide";

/// Number of distinct constructor signatures [`Wide`] can offer.
pub const MAX_CONSTRUCTORS: usize = 6;

/// How many members of each kind to register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WideShape {
    pub fields: usize,
    pub methods: usize,
    pub constructors: usize,
}

/// Field kinds cycle through this order; field `i` is stored in slot
/// `i / FIELD_KINDS` of its kind's vector.
const FIELD_KINDS: usize = 5;

/// Method shapes cycle: nullary, single i64, single f64, two i64.
const METHOD_SHAPES: usize = 4;

/// A type with `shape.fields` fields and `shape.methods` methods.
///
/// Every seventh field is module-visible and every ninth method private, so
/// the wider scopes see more members than `public`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wide {
    pub longs: Vec<i64>,
    pub ints: Vec<i32>,
    pub reals: Vec<f64>,
    pub flags: Vec<bool>,
    pub labels: Vec<String>,
    pub acc: i64,
}

impl Wide {
    pub fn new(shape: WideShape) -> Self {
        let slots = |kind: usize| (shape.fields + FIELD_KINDS - 1 - kind) / FIELD_KINDS;
        Self {
            longs: vec![0; slots(0)],
            ints: vec![0; slots(1)],
            reals: vec![0.0; slots(2)],
            flags: vec![false; slots(3)],
            labels: vec![String::new(); slots(4)],
            acc: 0,
        }
    }

    fn with_acc(shape: WideShape, acc: i64) -> Self {
        Self {
            acc,
            ..Self::new(shape)
        }
    }
}

pub fn field_name(index: usize) -> String {
    format!("f{index}")
}

pub fn method_name(index: usize) -> String {
    format!("m{index}")
}

fn field_decl(index: usize) -> MemberDecl {
    let name = field_name(index);
    if index % 7 == 6 {
        MemberDecl::module(&name)
    } else {
        MemberDecl::public(&name)
    }
}

fn method_decl(index: usize) -> MemberDecl {
    let name = method_name(index);
    if index % 9 == 8 {
        MemberDecl::private(&name)
    } else {
        MemberDecl::public(&name)
    }
}

fn add_field<'r>(b: TypeBuilder<'r, Wide>, index: usize) -> TypeBuilder<'r, Wide> {
    let slot = index / FIELD_KINDS;
    let decl = field_decl(index);
    match index % FIELD_KINDS {
        0 => b.field(decl, move |w: &Wide| w.longs[slot], move |w: &mut Wide, v| w.longs[slot] = v),
        1 => b.field(decl, move |w: &Wide| w.ints[slot], move |w: &mut Wide, v| w.ints[slot] = v),
        2 => b.field(decl, move |w: &Wide| w.reals[slot], move |w: &mut Wide, v| w.reals[slot] = v),
        3 => b.field(decl, move |w: &Wide| w.flags[slot], move |w: &mut Wide, v| w.flags[slot] = v),
        _ => b.field(
            decl,
            move |w: &Wide| w.labels[slot].clone(),
            move |w: &mut Wide, v| w.labels[slot] = v,
        ),
    }
}

fn add_method<'r>(b: TypeBuilder<'r, Wide>, index: usize) -> TypeBuilder<'r, Wide> {
    let weight = index as i64 + 1;
    let decl = method_decl(index);
    match index % METHOD_SHAPES {
        0 => b.method(decl, move |w: &mut Wide| w.acc + weight),
        1 => b.method(decl, move |w: &mut Wide, v: i64| {
            w.acc = w.acc.wrapping_add(v * weight);
            w.acc
        }),
        2 => b.method(decl, move |_: &mut Wide, v: f64| v * weight as f64),
        _ => b.method(decl, move |w: &mut Wide, a: i64, c: i64| {
            w.acc = a.wrapping_mul(weight).wrapping_add(c);
            w.acc
        }),
    }
}

fn add_constructor<'r>(
    b: TypeBuilder<'r, Wide>,
    index: usize,
    shape: WideShape,
) -> TypeBuilder<'r, Wide> {
    match index {
        0 => b.constructor(move || Wide::new(shape)),
        1 => b.constructor(move |acc: i64| Wide::with_acc(shape, acc)),
        2 => b.constructor(move |scale: f64| Wide::with_acc(shape, scale as i64)),
        3 => b.constructor(move |on: bool| Wide::with_acc(shape, i64::from(on))),
        4 => b.constructor(move |label: String| Wide::with_acc(shape, label.len() as i64)),
        _ => b.constructor(move |a: i64, c: i64| Wide::with_acc(shape, a + c)),
    }
}

/// Describe [`Wide`] with `shape` in `registry`, replacing any earlier
/// description. Constructors are capped at [`MAX_CONSTRUCTORS`].
pub fn register_wide(registry: &TypeRegistry, shape: WideShape) -> Result<Arc<TypeInfo>, MetaError> {
    registry.define::<Wide, _>(WIDE_TYPE_NAME, |b| {
        let mut b = b;
        for index in 0..shape.fields {
            b = add_field(b, index);
        }
        for index in 0..shape.methods {
            b = add_method(b, index);
        }
        for index in 0..shape.constructors.min(MAX_CONSTRUCTORS) {
            b = add_constructor(b, index, shape);
        }
        b
    })
}
