#![allow(dead_code)]

use std::sync::Arc;

use quiver_meta::{MemberDecl, TypeInfo, TypeRegistry, TypeRef, Value};

/// One field of every primitive width, a string, a read-only field and a
/// method of every calling-convention shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gauge {
    pub flag: bool,
    pub initial: char,
    pub tiny: i8,
    pub short: i16,
    pub count: i32,
    pub big: i64,
    pub ratio: f32,
    pub mass: f64,
    pub label: String,
    pub serial: i64,
}

/// Inherits `Gauge` and shadows its `count`.
#[derive(Debug, Default)]
pub struct Dial {
    pub base: Gauge,
    pub count: i64,
}

/// No constructors at all.
#[derive(Debug, Default)]
pub struct Sealed {
    pub value: i32,
}

/// Nullable references, and overloads that differ only in how loosely they
/// take their argument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relay {
    pub note: Option<String>,
    pub peer: Option<Arc<Gauge>>,
    pub hops: i32,
}

pub const GAUGE_FIELDS: usize = 10;

pub fn register_gauge(registry: &TypeRegistry) -> Arc<TypeInfo> {
    registry
        .define::<Gauge, _>("instruments::Gauge", |b| {
            b.field("flag", |g: &Gauge| g.flag, |g: &mut Gauge, v| g.flag = v)
                .field("initial", |g: &Gauge| g.initial, |g: &mut Gauge, v| g.initial = v)
                .field("tiny", |g: &Gauge| g.tiny, |g: &mut Gauge, v| g.tiny = v)
                .field("short", |g: &Gauge| g.short, |g: &mut Gauge, v| g.short = v)
                .field("count", |g: &Gauge| g.count, |g: &mut Gauge, v| g.count = v)
                .field("big", |g: &Gauge| g.big, |g: &mut Gauge, v| g.big = v)
                .field("ratio", |g: &Gauge| g.ratio, |g: &mut Gauge, v| g.ratio = v)
                .field("mass", |g: &Gauge| g.mass, |g: &mut Gauge, v| g.mass = v)
                .field("label", |g: &Gauge| g.label.clone(), |g: &mut Gauge, v| g.label = v)
                .readonly_field("serial", |g: &Gauge| g.serial)
                .readonly_field(MemberDecl::private("calibration"), |g: &Gauge| g.mass * 2.0)
                .method("reset", |g: &mut Gauge| *g = Gauge::default())
                .method("total", |g: &mut Gauge| i64::from(g.count) + g.big)
                .method("bump", |g: &mut Gauge, by: i32| {
                    g.count += by;
                    g.count
                })
                .method("scale", |g: &mut Gauge, f: f64| g.mass * f)
                .method("scale", |g: &mut Gauge, f: i32| g.mass * f64::from(f))
                .method("toggle", |g: &mut Gauge, on: bool| {
                    g.flag = on;
                    !on
                })
                .method("rename", |g: &mut Gauge, label: String| g.label = label)
                .method("add", |g: &mut Gauge, a: i64, b: i64| {
                    g.big = a + b;
                    g.big
                })
                .method(MemberDecl::public("origin").as_static(), |_: &mut Gauge| 0i32)
                .constructor(Gauge::default)
                .constructor(|count: i32| Gauge {
                    count,
                    ..Gauge::default()
                })
                .constructor(|label: String, mass: f64| Gauge {
                    label,
                    mass,
                    ..Gauge::default()
                })
        })
        .unwrap()
}

pub fn register_dial(registry: &TypeRegistry) -> Arc<TypeInfo> {
    registry
        .define::<Dial, _>("instruments::Dial", |b| {
            b.inherit::<Gauge>(|d| &d.base, |d| &mut d.base)
                .field("count", |d: &Dial| d.count, |d: &mut Dial, v| d.count = v)
                .constructor(Dial::default)
        })
        .unwrap()
}

pub fn register_sealed(registry: &TypeRegistry) -> Arc<TypeInfo> {
    registry
        .define::<Sealed, _>("instruments::Sealed", |b| {
            b.field("value", |s: &Sealed| s.value, |s: &mut Sealed, v| s.value = v)
        })
        .unwrap()
}

/// A registry with every fixture type defined.
pub fn register_relay(registry: &TypeRegistry) -> Arc<TypeInfo> {
    registry
        .define::<Relay, _>("instruments::Relay", |b| {
            b.field("note", |r: &Relay| r.note.clone(), |r: &mut Relay, v| r.note = v)
                .field("peer", |r: &Relay| r.peer.clone(), |r: &mut Relay, v| r.peer = v)
                .field("hops", |r: &Relay| r.hops, |r: &mut Relay, v| r.hops = v)
                .method("route", |_: &mut Relay, _: Value| 1i32)
                .method("route", |_: &mut Relay, _: String| 2i32)
                .method("link", |r: &mut Relay, note: Option<String>| {
                    r.note = note;
                    1i32
                })
                .method("link", |r: &mut Relay, peer: Option<Arc<Gauge>>| {
                    r.peer = peer;
                    2i32
                })
                .constructor(Relay::default)
                .constructor(|_: Value| Relay {
                    hops: 1,
                    ..Relay::default()
                })
                .constructor(|note: String| Relay {
                    note: Some(note),
                    hops: 2,
                    ..Relay::default()
                })
        })
        .unwrap()
}

pub fn registry() -> Arc<TypeRegistry> {
    let registry = Arc::new(TypeRegistry::new());
    register_gauge(&registry);
    register_dial(&registry);
    register_sealed(&registry);
    register_relay(&registry);
    registry
}

pub fn sample_gauge() -> Gauge {
    Gauge {
        flag: true,
        initial: 'g',
        tiny: -4,
        short: 300,
        count: 12,
        big: 1 << 40,
        ratio: 0.25,
        mass: 3.5,
        label: "torque".to_string(),
        serial: 77,
    }
}

/// A plausible argument for a parameter of type `param`.
pub fn sample_arg(param: TypeRef) -> Value {
    match param {
        TypeRef::BOOL => Value::Bool(true),
        TypeRef::CHAR => Value::Char('q'),
        TypeRef::I8 => Value::I8(3),
        TypeRef::I16 => Value::I16(-9),
        TypeRef::I32 => Value::I32(4),
        TypeRef::I64 => Value::I64(5),
        TypeRef::F32 => Value::F32(0.5),
        TypeRef::F64 => Value::F64(1.5),
        TypeRef::Str => Value::str("zed"),
        _ => Value::Null,
    }
}
