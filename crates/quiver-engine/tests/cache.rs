//! Cache behaviour: single-flight generation, weak entries, staleness.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use common::{Dial, Gauge, Sealed, registry};
use quiver_engine::{
    AcquireError, CacheStats, GenerationFailure, GenerationResult, GenerationScope,
    InvokerCache, InvokerKind,
};

const THREADS: usize = 8;
const ROUNDS: usize = 50;

#[test]
fn concurrent_first_use_generates_once() {
    let registry = registry();
    let key = registry.key_of::<Gauge>().unwrap();
    let generated = Arc::new(AtomicUsize::new(0));
    let cache = {
        let generated = generated.clone();
        InvokerCache::new(registry.clone()).with_hook(move |_| {
            generated.fetch_add(1, Ordering::SeqCst);
        })
    };
    let barrier = Barrier::new(THREADS);

    let units: Vec<usize> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    let first = cache
                        .get(key, InvokerKind::Method, GenerationScope::Public)
                        .unwrap();
                    let unit = Arc::as_ptr(&first) as usize;
                    drop(first);
                    // Nobody holds the result between these calls.
                    for _ in 1..ROUNDS {
                        drop(cache.get(key, InvokerKind::Method, GenerationScope::Public).unwrap());
                    }
                    unit
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(generated.load(Ordering::SeqCst), 1);
    assert!(units.iter().all(|&unit| unit == units[0]));
    assert_eq!(
        cache.stats(),
        CacheStats {
            generations: 1,
            hits: (THREADS * ROUNDS) as u64 - 1,
            evictions: 0,
            failures: 0,
        }
    );
}

#[test]
fn distinct_keys_generate_independently() {
    let registry = registry();
    let key = registry.key_of::<Gauge>().unwrap();
    let cache = InvokerCache::new(registry.clone());
    let barrier = Barrier::new(InvokerKind::ALL.len() * 2);

    let results: Vec<Arc<GenerationResult>> = thread::scope(|s| {
        let handles: Vec<_> = InvokerKind::ALL
            .iter()
            .chain(InvokerKind::ALL.iter())
            .map(|&kind| {
                let barrier = &barrier;
                let cache = &cache;
                s.spawn(move || {
                    barrier.wait();
                    cache.get(key, kind, GenerationScope::Public).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(cache.stats().generations, 3);
    assert_eq!(cache.len(), 3);
    for (i, kind) in InvokerKind::ALL.iter().enumerate() {
        let (a, b) = (&results[i], &results[i + InvokerKind::ALL.len()]);
        assert!(Arc::ptr_eq(a, b));
        assert_eq!(a.unit().unwrap().invoker.kind(), *kind);
    }
}

#[test]
fn dropped_results_stay_cached() {
    let registry = registry();
    let key = registry.key_of::<Gauge>().unwrap();
    let cache = InvokerCache::new(registry.clone());

    let first = cache.get(key, InvokerKind::Field, GenerationScope::Public).unwrap();
    let first_ptr = Arc::as_ptr(&first);
    drop(first);

    let second = cache.get(key, InvokerKind::Field, GenerationScope::Public).unwrap();
    assert_eq!(Arc::as_ptr(&second), first_ptr);
    assert_eq!(
        cache.stats(),
        CacheStats {
            generations: 1,
            hits: 1,
            evictions: 0,
            failures: 0,
        }
    );
}

#[test]
fn regenerated_units_keep_their_name() {
    let registry = registry();
    let key = registry.key_of::<Gauge>().unwrap();
    let replaced = Arc::new(Mutex::new(Vec::new()));
    let cache = {
        let replaced = replaced.clone();
        InvokerCache::new(registry.clone()).with_hook(move |event| {
            replaced.lock().unwrap().push(event.replaced);
        })
    };

    let first_id = cache
        .get(key, InvokerKind::Field, GenerationScope::Public)
        .unwrap()
        .unit()
        .unwrap()
        .id;
    common::register_gauge(&registry);
    let second = cache.get(key, InvokerKind::Field, GenerationScope::Public).unwrap();

    assert_eq!(second.unit().unwrap().id, first_id);
    assert_eq!(*replaced.lock().unwrap(), [false, true]);
    assert_eq!(cache.unit_count(), 1);
    let stats = cache.stats();
    assert_eq!((stats.generations, stats.hits, stats.evictions), (2, 0, 1));
}

#[test]
fn redefined_types_are_regenerated() {
    let registry = registry();
    let key = registry.key_of::<Gauge>().unwrap();
    let cache = InvokerCache::new(registry.clone());

    let held = cache.fields(key, GenerationScope::Public).unwrap();
    common::register_gauge(&registry);
    let fresh = cache.fields(key, GenerationScope::Public).unwrap();

    assert!(!Arc::ptr_eq(held.result(), fresh.result()));
    assert_eq!(cache.stats().evictions, 1);
    // The old unit keeps working for whoever still holds it.
    let gauge = common::sample_gauge();
    let count = held.index_of("count").unwrap();
    assert_eq!(held.access().get_i32(count, &gauge).unwrap(), 12);
    assert_eq!(fresh.access().get_i32(count, &gauge).unwrap(), 12);
}

#[test]
fn unregistered_types_fail_and_are_not_cached() {
    let registry = registry();
    let key = registry.key_of::<Gauge>().unwrap();
    let cache = InvokerCache::new(registry.clone());

    let held = cache.get(key, InvokerKind::Field, GenerationScope::Public).unwrap();
    assert_eq!(cache.len(), 1);
    registry.unregister(key);

    let gone = cache.get(key, InvokerKind::Field, GenerationScope::Public).unwrap();
    assert_eq!(gone.failure(), Some(&GenerationFailure::UnknownType { key }));
    assert!(cache.is_empty());
    assert_eq!(
        gone.field_access().err(),
        Some(AcquireError::Generation(GenerationFailure::UnknownType { key }))
    );
    assert!(matches!(
        cache.fields(key, GenerationScope::Public),
        Err(AcquireError::Generation(GenerationFailure::UnknownType { .. }))
    ));

    let stats = cache.stats();
    assert_eq!((stats.evictions, stats.failures), (1, 2));
    assert!(held.is_generated());
}

#[test]
fn types_without_constructors_report_a_failure() {
    let registry = registry();
    let key = registry.key_of::<Sealed>().unwrap();
    let cache = InvokerCache::new(registry.clone());

    let result = cache
        .get(key, InvokerKind::Constructor, GenerationScope::Public)
        .unwrap();
    assert!(matches!(
        result.failure(),
        Some(GenerationFailure::NoEligibleConstructors { type_name, .. })
            if type_name == "instruments::Sealed"
    ));
    assert!(matches!(
        cache.constructors(key, GenerationScope::Public),
        Err(AcquireError::Generation(_))
    ));
    // The failure is cached like any other result while it is held.
    let stats = cache.stats();
    assert_eq!((stats.failures, stats.hits), (1, 1));

    // Fields of the same type are fine.
    assert!(cache.fields(key, GenerationScope::Public).is_ok());
}

#[test]
fn asking_for_the_wrong_kind_is_an_error() {
    let registry = registry();
    let key = registry.key_of::<Gauge>().unwrap();
    let cache = InvokerCache::new(registry.clone());
    let result = cache.get(key, InvokerKind::Field, GenerationScope::Public).unwrap();

    assert_eq!(
        result.method_invoker().err(),
        Some(AcquireError::WrongKind {
            expected: InvokerKind::Method,
            found: InvokerKind::Field,
        })
    );
    assert!(result.constructor_invoker().is_err());
    assert!(result.field_access().is_ok());
}

#[test]
fn purge_keeps_slots_while_the_description_is_current() {
    let registry = registry();
    let gauge = registry.key_of::<Gauge>().unwrap();
    let dial = registry.key_of::<Dial>().unwrap();
    let cache = InvokerCache::new(registry.clone());

    for kind in InvokerKind::ALL {
        drop(cache.get(gauge, kind, GenerationScope::Public).unwrap());
    }
    let held = cache.fields(dial, GenerationScope::Public).unwrap();
    assert_eq!(cache.len(), 4);

    // Dropped results do not make a slot purgeable.
    assert_eq!(cache.purge(), 0);
    assert_eq!(cache.len(), 4);

    registry.unregister(dial);
    assert_eq!(cache.purge(), 1);
    assert_eq!(cache.len(), 3);
    // A unit held elsewhere keeps working after its slot is gone.
    let mut target = Dial::default();
    held.set("count", &mut target, quiver_meta::Value::I64(5)).unwrap();
    assert_eq!(target.count, 5);

    common::register_gauge(&registry);
    assert_eq!(cache.purge(), 3);
    assert!(cache.is_empty());

    let fresh = cache.get(gauge, InvokerKind::Field, GenerationScope::Public).unwrap();
    assert!(fresh.is_generated());
    assert_eq!(cache.stats().evictions, 0);
}
