//! Synthesized units: layouts, typed entry points and call-time errors.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{Gauge, Relay, registry, sample_gauge};
use quiver_engine::{
    GenerationScope, InvokeError, InvokerCache, InvokerKind, Shape, Strategy, Thresholds,
};
use quiver_identity::PrimitiveKind;
use quiver_meta::{TypeRef, TypeRegistry, Value};

fn cache(registry: &Arc<TypeRegistry>) -> InvokerCache {
    InvokerCache::new(registry.clone())
}

fn gauge_key(registry: &TypeRegistry) -> quiver_meta::TypeKey {
    registry.key_of::<Gauge>().unwrap()
}

#[test]
fn layouts_are_dense_and_buckets_are_contiguous() {
    let registry = registry();
    let cache = cache(&registry);
    let key = gauge_key(&registry);

    for kind in InvokerKind::ALL {
        let result = cache.get(key, kind, GenerationScope::Public).unwrap();
        let unit = result.unit().unwrap();
        let layout = &unit.layout;

        for (position, member) in layout.members().iter().enumerate() {
            assert_eq!(member.index, position);
        }

        let mut next = 0;
        for bucket in layout.buckets() {
            assert_eq!(bucket.range.start, next, "{kind} buckets leave a gap");
            assert!(bucket.range.end > bucket.range.start);
            for member in &layout.members()[bucket.range.clone()] {
                assert_eq!(member.shape, bucket.shape);
            }
            next = bucket.range.end;
        }
        assert_eq!(next, layout.len());

        let shapes: HashSet<Shape> = layout.buckets().iter().map(|b| b.shape).collect();
        assert_eq!(shapes.len(), layout.buckets().len(), "{kind} shape split across buckets");
    }
}

#[test]
fn field_layout_orders_by_type_then_name() {
    let registry = registry();
    let cache = cache(&registry);
    let result = cache
        .get(gauge_key(&registry), InvokerKind::Field, GenerationScope::Public)
        .unwrap();
    let names: Vec<&str> = result
        .unit()
        .unwrap()
        .layout
        .members()
        .iter()
        .map(|m| &*m.name)
        .collect();
    assert_eq!(
        names,
        [
            "label", "flag", "initial", "ratio", "mass", "short", "count", "big", "serial",
            "tiny"
        ]
    );
}

#[test]
fn method_layout_groups_by_parameter_shape() {
    let registry = registry();
    let cache = cache(&registry);
    let result = cache
        .get(gauge_key(&registry), InvokerKind::Method, GenerationScope::Public)
        .unwrap();
    let layout = &result.unit().unwrap().layout;

    let names: Vec<&str> = layout.members().iter().map(|m| &*m.name).collect();
    assert_eq!(
        names,
        ["reset", "total", "rename", "toggle", "scale", "bump", "scale", "add"]
    );
    assert_eq!(layout.bucket(Shape::Nullary), Some(0..2));
    assert_eq!(layout.bucket(Shape::Reference), Some(2..3));
    assert_eq!(layout.bucket(Shape::Primitive(PrimitiveKind::Bool)), Some(3..4));
    assert_eq!(layout.bucket(Shape::Primitive(PrimitiveKind::F64)), Some(4..5));
    assert_eq!(layout.bucket(Shape::Primitive(PrimitiveKind::I32)), Some(5..7));
    assert_eq!(layout.bucket(Shape::General), Some(7..8));
    assert_eq!(layout.bucket(Shape::Primitive(PrimitiveKind::Char)), None);
}

#[test]
fn typed_field_access_round_trips_boundary_values() {
    let registry = registry();
    let cache = cache(&registry);
    let fields = cache
        .fields(gauge_key(&registry), GenerationScope::Public)
        .unwrap();
    let access = fields.access().clone();
    assert_eq!(access.strategy(), Strategy::Synthesized);
    let at = |name: &str| fields.index_of(name).unwrap();
    let mut gauge = Gauge::default();

    for v in [false, true] {
        access.set_bool(at("flag"), &mut gauge, v).unwrap();
        assert_eq!(access.get_bool(at("flag"), &gauge).unwrap(), v);
    }
    for v in ['\0', 'é', '\u{1F980}', char::MAX] {
        access.set_char(at("initial"), &mut gauge, v).unwrap();
        assert_eq!(access.get_char(at("initial"), &gauge).unwrap(), v);
    }
    for v in [i8::MIN, -1, 0, i8::MAX] {
        access.set_i8(at("tiny"), &mut gauge, v).unwrap();
        assert_eq!(access.get_i8(at("tiny"), &gauge).unwrap(), v);
    }
    for v in [i16::MIN, 0, i16::MAX] {
        access.set_i16(at("short"), &mut gauge, v).unwrap();
        assert_eq!(access.get_i16(at("short"), &gauge).unwrap(), v);
    }
    for v in [i32::MIN, 0, i32::MAX] {
        access.set_i32(at("count"), &mut gauge, v).unwrap();
        assert_eq!(access.get_i32(at("count"), &gauge).unwrap(), v);
    }
    for v in [i64::MIN, 0, i64::MAX] {
        access.set_i64(at("big"), &mut gauge, v).unwrap();
        assert_eq!(access.get_i64(at("big"), &gauge).unwrap(), v);
    }
    for v in [f32::MIN, -0.0, f32::MIN_POSITIVE, f32::INFINITY, f32::MAX] {
        access.set_f32(at("ratio"), &mut gauge, v).unwrap();
        assert_eq!(access.get_f32(at("ratio"), &gauge).unwrap().to_bits(), v.to_bits());
    }
    for v in [f64::MIN, -0.0, f64::EPSILON, f64::NEG_INFINITY, f64::MAX] {
        access.set_f64(at("mass"), &mut gauge, v).unwrap();
        assert_eq!(access.get_f64(at("mass"), &gauge).unwrap().to_bits(), v.to_bits());
    }

    access.set_f32(at("ratio"), &mut gauge, f32::NAN).unwrap();
    assert!(access.get_f32(at("ratio"), &gauge).unwrap().is_nan());
    access.set_f64(at("mass"), &mut gauge, f64::NAN).unwrap();
    assert!(access.get_f64(at("mass"), &gauge).unwrap().is_nan());
}

#[test]
fn boxed_field_access_matches_typed_access() {
    let registry = registry();
    let cache = cache(&registry);
    let fields = cache
        .fields(gauge_key(&registry), GenerationScope::Public)
        .unwrap();
    let access = fields.access();
    let gauge = sample_gauge();

    assert_eq!(access.get(fields.index_of("label").unwrap(), &gauge).unwrap(), Value::str("torque"));
    assert_eq!(access.get(fields.index_of("tiny").unwrap(), &gauge).unwrap(), Value::I8(-4));
    assert_eq!(access.get(fields.index_of("big").unwrap(), &gauge).unwrap(), Value::I64(1 << 40));
    assert_eq!(access.get(fields.index_of("serial").unwrap(), &gauge).unwrap(), Value::I64(77));

    let mut gauge = sample_gauge();
    let label = fields.index_of("label").unwrap();
    access.set(label, &mut gauge, Value::str("drag")).unwrap();
    assert_eq!(gauge.label, "drag");
    let short = fields.index_of("short").unwrap();
    access.set(short, &mut gauge, Value::I16(-2)).unwrap();
    assert_eq!(gauge.short, -2);
}

#[test]
fn nullable_references_round_trip_null() {
    let registry = registry();
    let key = registry.key_of::<Relay>().unwrap();
    let peer = Arc::new(sample_gauge());

    for (strategy, thresholds) in [
        (Strategy::Synthesized, Thresholds::default()),
        (Strategy::Fallback, Thresholds::uniform(0)),
    ] {
        let cache = InvokerCache::new(registry.clone()).with_thresholds(thresholds);
        let fields = cache.fields(key, GenerationScope::Public).unwrap();
        let access = fields.access();
        assert_eq!(access.strategy(), strategy);
        let note = fields.index_of("note").unwrap();
        let peer_at = fields.index_of("peer").unwrap();
        assert_eq!(fields.field_type(note), Some(TypeRef::Str));
        assert!(matches!(fields.field_type(peer_at), Some(TypeRef::Object(_))));

        let mut relay = Relay::default();
        assert_eq!(access.get(note, &relay).unwrap(), Value::Null, "{strategy}");
        assert_eq!(access.get(peer_at, &relay).unwrap(), Value::Null, "{strategy}");

        access.set(note, &mut relay, Value::str("memo")).unwrap();
        access.set(peer_at, &mut relay, Value::Object(peer.clone())).unwrap();
        assert_eq!(access.get(note, &relay).unwrap(), Value::str("memo"));
        assert_eq!(
            access.get(peer_at, &relay).unwrap(),
            Value::Object(peer.clone()),
            "{strategy}"
        );

        access.set(note, &mut relay, Value::Null).unwrap();
        access.set(peer_at, &mut relay, Value::Null).unwrap();
        assert_eq!(relay, Relay::default(), "{strategy}");
        assert_eq!(access.get(note, &relay).unwrap(), Value::Null);
        assert_eq!(access.get(peer_at, &relay).unwrap(), Value::Null);

        // Null is for references only, and a reference still has a type.
        let hops = fields.index_of("hops").unwrap();
        assert!(matches!(
            access.set(hops, &mut relay, Value::Null),
            Err(InvokeError::Unbox(_))
        ));
        assert!(matches!(
            access.set(peer_at, &mut relay, Value::str("not a gauge")),
            Err(InvokeError::Unbox(_))
        ));
    }
}

#[test]
fn field_errors() {
    let registry = registry();
    let cache = cache(&registry);
    let fields = cache
        .fields(gauge_key(&registry), GenerationScope::Public)
        .unwrap();
    let access = fields.access();
    let mut gauge = sample_gauge();
    let count = fields.index_of("count").unwrap();
    let tiny = fields.index_of("tiny").unwrap();
    let serial = fields.index_of("serial").unwrap();

    assert!(matches!(
        access.get(usize::MAX, &gauge),
        Err(InvokeError::InvalidIndex { index: usize::MAX, .. })
    ));
    assert!(matches!(
        access.get(common::GAUGE_FIELDS, &gauge),
        Err(InvokeError::InvalidIndex { .. })
    ));
    // An index of another kind's bucket is as invalid as one past the end.
    assert!(matches!(access.get_i32(tiny, &gauge), Err(InvokeError::InvalidIndex { .. })));
    assert!(matches!(
        access.set_i8(count, &mut gauge, 1),
        Err(InvokeError::InvalidIndex { .. })
    ));

    assert!(matches!(
        access.set(count, &mut gauge, Value::I64(1)),
        Err(InvokeError::Unbox(_))
    ));
    assert!(matches!(
        access.set(count, &mut gauge, Value::Null),
        Err(InvokeError::Unbox(_))
    ));
    assert_eq!(gauge.count, 12);

    assert_eq!(
        access.set(serial, &mut gauge, Value::I64(1)),
        Err(InvokeError::UnsupportedOperation {
            operation: "set",
            member: "serial".to_string(),
        })
    );
    assert!(matches!(
        access.set_i64(serial, &mut gauge, 1),
        Err(InvokeError::UnsupportedOperation { .. })
    ));
    assert_eq!(gauge.serial, 77);

    let mut stranger = 5u8;
    assert!(matches!(access.get(count, &stranger), Err(InvokeError::TargetMismatch { .. })));
    assert!(matches!(
        access.set_i32(count, &mut stranger, 1),
        Err(InvokeError::TargetMismatch { .. })
    ));
}

#[test]
fn method_fast_paths() {
    let registry = registry();
    let cache = cache(&registry);
    let methods = cache
        .methods(gauge_key(&registry), GenerationScope::Public)
        .unwrap();
    let invoker = methods.invoker();
    assert_eq!(invoker.strategy(), Strategy::Synthesized);
    let mut gauge = sample_gauge();

    let total = methods.index_of("total", &[]).unwrap();
    assert_eq!(invoker.invoke0(total, &mut gauge).unwrap(), Value::I64(12 + (1 << 40)));
    assert_eq!(invoker.invoke_i64(total, &mut gauge, &[]).unwrap(), 12 + (1 << 40));

    let bump = methods.index_of("bump", &[TypeRef::I32]).unwrap();
    assert_eq!(invoker.invoke_with_i32(bump, &mut gauge, 5).unwrap(), Value::I32(17));
    assert_eq!(invoker.invoke_i32(bump, &mut gauge, &[Value::I32(3)]).unwrap(), 20);
    assert_eq!(gauge.count, 20);

    let scale_f = methods.index_of("scale", &[TypeRef::F64]).unwrap();
    let scale_i = methods.index_of("scale", &[TypeRef::I32]).unwrap();
    assert_ne!(scale_f, scale_i);
    assert_eq!(invoker.invoke_with_f64(scale_f, &mut gauge, 2.0).unwrap(), Value::F64(7.0));
    assert_eq!(invoker.invoke_with_i32(scale_i, &mut gauge, 3).unwrap(), Value::F64(10.5));

    let toggle = methods.index_of("toggle", &[TypeRef::BOOL]).unwrap();
    assert!(!invoker.invoke_bool(toggle, &mut gauge, &[Value::Bool(true)]).unwrap());
    assert_eq!(invoker.invoke_with_bool(toggle, &mut gauge, false).unwrap(), Value::Bool(true));
    assert!(!gauge.flag);

    let add = methods.index_of("add", &[TypeRef::I64, TypeRef::I64]).unwrap();
    assert_eq!(
        invoker.invoke(add, &mut gauge, &[Value::I64(-2), Value::I64(9)]).unwrap(),
        Value::I64(7)
    );

    let rename = methods.index_of("rename", &[TypeRef::Str]).unwrap();
    assert_eq!(
        invoker.invoke(rename, &mut gauge, &[Value::str("drag")]).unwrap(),
        Value::Void
    );
    assert_eq!(gauge.label, "drag");

    let reset = methods.index_of("reset", &[]).unwrap();
    assert_eq!(invoker.invoke0(reset, &mut gauge).unwrap(), Value::Void);
    assert_eq!(gauge, Gauge::default());
}

#[test]
fn method_errors() {
    let registry = registry();
    let cache = cache(&registry);
    let methods = cache
        .methods(gauge_key(&registry), GenerationScope::Public)
        .unwrap();
    let invoker = methods.invoker();
    let mut gauge = sample_gauge();
    let bump = methods.index_of("bump", &[TypeRef::I32]).unwrap();
    let scale_f = methods.index_of("scale", &[TypeRef::F64]).unwrap();
    let add = methods.index_of("add", &[TypeRef::I64, TypeRef::I64]).unwrap();

    assert!(matches!(invoker.invoke0(bump, &mut gauge), Err(InvokeError::InvalidIndex { .. })));
    assert!(matches!(
        invoker.invoke_with_i32(scale_f, &mut gauge, 1),
        Err(InvokeError::InvalidIndex { .. })
    ));
    assert!(matches!(
        invoker.invoke_with_i64(add, &mut gauge, 1),
        Err(InvokeError::InvalidIndex { .. })
    ));
    // `scale` returns f64, so it has no i32-returning entry.
    assert!(matches!(
        invoker.invoke_i32(scale_f, &mut gauge, &[Value::F64(1.0)]),
        Err(InvokeError::InvalidIndex { .. })
    ));
    assert!(matches!(
        invoker.invoke(usize::MAX, &mut gauge, &[]),
        Err(InvokeError::InvalidIndex { .. })
    ));
    assert!(matches!(
        invoker.invoke(methods.method_count(), &mut gauge, &[]),
        Err(InvokeError::InvalidIndex { .. })
    ));

    assert_eq!(
        invoker.invoke(add, &mut gauge, &[Value::I64(1)]),
        Err(InvokeError::ArgumentCount {
            expected: 2,
            found: 1
        })
    );
    assert!(matches!(
        invoker.invoke(add, &mut gauge, &[Value::I64(1), Value::I32(1)]),
        Err(InvokeError::Unbox(_))
    ));
    assert!(matches!(
        invoker.invoke(bump, &mut 0u32, &[Value::I32(1)]),
        Err(InvokeError::TargetMismatch { .. })
    ));
    assert_eq!(gauge, sample_gauge());
}

#[test]
fn constructors_build_instances_by_index() {
    let registry = registry();
    let cache = cache(&registry);
    let constructors = cache
        .constructors(gauge_key(&registry), GenerationScope::Public)
        .unwrap();
    let invoker = constructors.invoker();
    assert_eq!(constructors.constructor_count(), 3);

    let empty = constructors.index_of(&[]).unwrap();
    assert_eq!(empty, 0);
    let built = invoker.new_instance(empty, &[]).unwrap();
    assert_eq!(built.downcast_ref::<Gauge>(), Some(&Gauge::default()));

    let with_count = constructors.index_of(&[TypeRef::I32]).unwrap();
    let built = invoker.new_instance(with_count, &[Value::I32(9)]).unwrap();
    assert_eq!(built.downcast_ref::<Gauge>().map(|g| g.count), Some(9));

    let labelled = constructors.index_of(&[TypeRef::Str, TypeRef::F64]).unwrap();
    let built = invoker
        .new_instance(labelled, &[Value::str("valve"), Value::F64(0.5)])
        .unwrap();
    let gauge = built.downcast::<Gauge>().unwrap();
    assert_eq!((gauge.label.as_str(), gauge.mass), ("valve", 0.5));

    assert!(matches!(
        invoker.new_instance(usize::MAX, &[]),
        Err(InvokeError::InvalidIndex { .. })
    ));
    assert!(matches!(
        invoker.new_instance(with_count, &[]),
        Err(InvokeError::ArgumentCount { expected: 1, found: 0 })
    ));
    assert!(matches!(
        invoker.new_instance(with_count, &[Value::str("x")]),
        Err(InvokeError::Unbox(_))
    ));
}

#[test]
fn inherited_members_dispatch_through_the_subtype() {
    let registry = registry();
    let cache = cache(&registry);
    let dial_key = registry.key_of::<common::Dial>().unwrap();
    let gauge_key = gauge_key(&registry);
    let fields = cache.fields(dial_key, GenerationScope::Public).unwrap();
    let methods = cache.methods(dial_key, GenerationScope::Public).unwrap();

    let mut dial = common::Dial::default();
    let own = fields.index_of("count").unwrap();
    let inherited = fields.index_of_declared("count", gauge_key).unwrap();
    assert_ne!(own, inherited);

    fields.access().set_i64(own, &mut dial, 40).unwrap();
    fields.access().set_i32(inherited, &mut dial, 2).unwrap();
    assert_eq!((dial.count, dial.base.count), (40, 2));

    let bump = methods.index_of("bump", &[TypeRef::I32]).unwrap();
    assert_eq!(
        methods.invoker().invoke_with_i32(bump, &mut dial, 1).unwrap(),
        Value::I32(3)
    );
    assert_eq!(dial.base.count, 3);
}

#[test]
fn scope_widens_the_layout() {
    let registry = registry();
    let cache = cache(&registry);
    let key = gauge_key(&registry);
    let info = registry.info(key).unwrap();

    let public = cache.fields(key, GenerationScope::Public).unwrap();
    let nested = cache
        .fields(key, quiver_engine::ScopeKind::Nested.for_type(&info))
        .unwrap();
    assert_eq!(public.field_count(), common::GAUGE_FIELDS);
    assert_eq!(nested.field_count(), common::GAUGE_FIELDS + 1);
    assert!(public.index_of("calibration").is_none());

    let calibration = nested.index_of("calibration").unwrap();
    assert!(!nested.is_writable(calibration));
    assert_eq!(
        nested.access().get_f64(calibration, &sample_gauge()).unwrap(),
        7.0
    );
    assert_ne!(
        public.result().unit().unwrap().name,
        nested.result().unit().unwrap().name
    );
}
