//! End-to-end cache lifecycle tests
//!
//! Exercises the full pipeline through the public facade: source → cache →
//! identifier map → serializer → store, over both backends.

use chrono::{TimeZone, Utc};

use viewcache::{
    CacheConfig, CacheScope, ComputationCacheSource, ComputedValue, DurabilityMode,
    ValueDescriptor,
};

fn scope(hour: u32) -> CacheScope {
    CacheScope::new(
        "Risk",
        "Default",
        Utc.with_ymd_and_hms(2024, 3, 15, hour, 0, 0).unwrap(),
    )
}

fn present_value_descriptor() -> ValueDescriptor {
    ValueDescriptor::new("Trade/42", "PresentValue").with_property("Currency", "USD")
}

/// The concrete scenario from the cache contract: a present value is
/// cached, read back bit-identically, and gone after the cycle releases.
#[test]
fn present_value_round_trip_then_release() {
    let source = ComputationCacheSource::in_memory();
    let scope = scope(10);
    let descriptor = present_value_descriptor();

    let cache = source.get_cache(&scope).unwrap();
    assert!(cache.get_value(&descriptor).unwrap().is_none());

    cache
        .put_value(&descriptor, &ComputedValue::Float(1234.56))
        .unwrap();
    assert_eq!(
        cache.get_value(&descriptor).unwrap(),
        Some(ComputedValue::Float(1234.56))
    );

    source.release_cache(&scope).unwrap();

    let cache = source.get_cache(&scope).unwrap();
    assert!(cache.get_value(&descriptor).unwrap().is_none());
}

#[test]
fn same_descriptor_is_independent_across_scopes() {
    let source = ComputationCacheSource::in_memory();
    let descriptor = present_value_descriptor();

    let morning = source.get_cache(&scope(10)).unwrap();
    let evening = source.get_cache(&scope(18)).unwrap();

    morning
        .put_value(&descriptor, &ComputedValue::Float(100.0))
        .unwrap();
    evening
        .put_value(&descriptor, &ComputedValue::Float(200.0))
        .unwrap();

    assert_eq!(
        morning.get_value(&descriptor).unwrap(),
        Some(ComputedValue::Float(100.0))
    );
    assert_eq!(
        evening.get_value(&descriptor).unwrap(),
        Some(ComputedValue::Float(200.0))
    );

    // Releasing one cycle never touches the other
    source.release_cache(&scope(10)).unwrap();
    assert_eq!(
        evening.get_value(&descriptor).unwrap(),
        Some(ComputedValue::Float(200.0))
    );
}

#[test]
fn persistent_backend_behaves_like_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    let source =
        ComputationCacheSource::from_config(&CacheConfig::persistent(dir.path())).unwrap();
    let scope = scope(10);
    let descriptor = present_value_descriptor();

    let cache = source.get_cache(&scope).unwrap();
    cache
        .put_value(&descriptor, &ComputedValue::Float(1234.56))
        .unwrap();
    assert_eq!(
        cache.get_value(&descriptor).unwrap(),
        Some(ComputedValue::Float(1234.56))
    );

    source.release_cache(&scope).unwrap();
    let cache = source.get_cache(&scope).unwrap();
    assert!(cache.get_value(&descriptor).unwrap().is_none());
}

#[test]
fn transactional_entries_survive_a_new_source_over_the_same_root() {
    let dir = tempfile::tempdir().unwrap();
    let config =
        CacheConfig::persistent_with_durability(dir.path(), DurabilityMode::Transactional);
    let scope = scope(10);
    let descriptor = present_value_descriptor();

    {
        let source = ComputationCacheSource::from_config(&config).unwrap();
        let cache = source.get_cache(&scope).unwrap();
        cache
            .put_value(&descriptor, &ComputedValue::Float(1234.56))
            .unwrap();
        // Source dropped without releasing the scope, as after a shutdown
    }

    let source = ComputationCacheSource::from_config(&config).unwrap();
    let cache = source.get_cache(&scope).unwrap();
    assert_eq!(
        cache.get_value(&descriptor).unwrap(),
        Some(ComputedValue::Float(1234.56))
    );
}

#[test]
fn reopened_source_resolves_prior_identifiers_without_aliasing() {
    let dir = tempfile::tempdir().unwrap();
    let config =
        CacheConfig::persistent_with_durability(dir.path(), DurabilityMode::Transactional);
    let scope = scope(10);
    let written = present_value_descriptor();
    let never_written =
        ValueDescriptor::new("Trade/43", "PresentValue").with_property("Currency", "USD");

    {
        let source = ComputationCacheSource::from_config(&config).unwrap();
        let cache = source.get_cache(&scope).unwrap();
        cache
            .put_value(&written, &ComputedValue::Float(1.0))
            .unwrap();
    }

    let source = ComputationCacheSource::from_config(&config).unwrap();
    // The prior process's assignment is loaded, not re-derived from zero
    assert_eq!(source.identifier_map().len(), 1);

    let cache = source.get_cache(&scope).unwrap();
    // A descriptor no process ever wrote must miss, even with stale bytes
    // on disk under other identifiers
    assert!(cache.get_value(&never_written).unwrap().is_none());

    // New assignments continue past the old ones instead of reusing them
    cache
        .put_value(&never_written, &ComputedValue::Float(2.0))
        .unwrap();
    assert_eq!(
        cache.get_value(&written).unwrap(),
        Some(ComputedValue::Float(1.0))
    );
    assert_eq!(
        cache.get_value(&never_written).unwrap(),
        Some(ComputedValue::Float(2.0))
    );
}

#[test]
fn every_value_shape_round_trips() {
    let source = ComputationCacheSource::in_memory();
    let cache = source.get_cache(&scope(10)).unwrap();

    let values = vec![
        ComputedValue::Null,
        ComputedValue::Bool(true),
        ComputedValue::Int(-7),
        ComputedValue::Float(1234.56),
        ComputedValue::String("converged".into()),
        ComputedValue::Bytes(vec![0, 255, 128]),
        ComputedValue::Array(vec![ComputedValue::Int(1), ComputedValue::Float(2.5)]),
    ];

    for (i, value) in values.iter().enumerate() {
        let descriptor = ValueDescriptor::new(format!("Trade/{}", i), "Result");
        cache.put_value(&descriptor, value).unwrap();
        assert_eq!(cache.get_value(&descriptor).unwrap().as_ref(), Some(value));
    }
}

#[test]
fn identifier_map_is_shared_across_the_whole_source() {
    let source = ComputationCacheSource::in_memory();
    let descriptor = present_value_descriptor();

    for hour in 8..12 {
        let cache = source.get_cache(&scope(hour)).unwrap();
        cache
            .put_value(&descriptor, &ComputedValue::Float(hour as f64))
            .unwrap();
    }

    // Four cycles, one descriptor, one identifier
    assert_eq!(source.identifier_map().len(), 1);
}
