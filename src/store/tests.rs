//! Tests for the store module

use serde_json::json;

use super::{Category, MetricStore, StoreError, StoreLimits, UnknownCategory};

// ---------------------------------------------------------------------------
// Category tests
// ---------------------------------------------------------------------------

#[test]
fn test_category_wire_names() {
    assert_eq!(Category::Batch.as_str(), "batch");
    assert_eq!(Category::Epoch.as_str(), "epoch");
    assert_eq!(Category::Train.as_str(), "train");
}

#[test]
fn test_category_parse_roundtrip() {
    for category in Category::ALL {
        let parsed: Category = category.as_str().parse().expect("wire name should parse");
        assert_eq!(parsed, category);
    }
}

#[test]
fn test_category_parse_rejects_unknown() {
    let err = "bogus".parse::<Category>().unwrap_err();
    let UnknownCategory(name) = err;
    assert_eq!(name, "bogus");
}

#[test]
fn test_category_parse_is_case_sensitive() {
    assert!("Epoch".parse::<Category>().is_err());
    assert!("EPOCH".parse::<Category>().is_err());
}

#[test]
fn test_category_serde_uses_wire_names() {
    let json = serde_json::to_string(&Category::Epoch).unwrap();
    assert_eq!(json, "\"epoch\"");
    let back: Category = serde_json::from_str("\"train\"").unwrap();
    assert_eq!(back, Category::Train);
}

// ---------------------------------------------------------------------------
// Save/load tests
// ---------------------------------------------------------------------------

#[test]
fn test_load_before_any_save_is_empty() {
    let store = MetricStore::new();
    for category in Category::ALL {
        assert!(store.load(category, "never-written").is_empty());
    }
}

#[test]
fn test_save_then_load_single_record() {
    let store = MetricStore::new();
    store
        .save(Category::Epoch, "run-1", json!({"loss": 0.5}))
        .expect("save should succeed");

    let history = store.load(Category::Epoch, "run-1");
    assert_eq!(history, vec![json!({"loss": 0.5})]);
}

#[test]
fn test_load_preserves_insertion_order() {
    let store = MetricStore::new();
    for i in 0..10 {
        store
            .save(Category::Batch, "run-1", json!({"step": i}))
            .expect("save should succeed");
    }

    let history = store.load(Category::Batch, "run-1");
    assert_eq!(history.len(), 10);
    for (i, record) in history.iter().enumerate() {
        assert_eq!(record["step"], json!(i));
    }
}

#[test]
fn test_boston_epoch_scenario() {
    let store = MetricStore::new();
    store
        .save(
            Category::Epoch,
            "boston",
            json!({"timestamp": 1000, "logs": {"loss": 0.5}}),
        )
        .expect("save should succeed");
    store
        .save(
            Category::Epoch,
            "boston",
            json!({"timestamp": 2000, "logs": {"loss": 0.3}}),
        )
        .expect("save should succeed");

    let history = store.load(Category::Epoch, "boston");
    assert_eq!(
        history,
        vec![
            json!({"timestamp": 1000, "logs": {"loss": 0.5}}),
            json!({"timestamp": 2000, "logs": {"loss": 0.3}}),
        ]
    );
}

#[test]
fn test_runs_are_isolated() {
    let store = MetricStore::new();
    store
        .save(Category::Epoch, "a", json!({"loss": 1.0}))
        .expect("save should succeed");

    assert!(store.load(Category::Epoch, "b").is_empty());
    assert_eq!(store.load(Category::Epoch, "a").len(), 1);
}

#[test]
fn test_categories_are_isolated() {
    let store = MetricStore::new();
    store
        .save(Category::Batch, "run-1", json!({"loss": 1.0}))
        .expect("save should succeed");

    assert!(store.load(Category::Epoch, "run-1").is_empty());
    assert!(store.load(Category::Train, "run-1").is_empty());
}

#[test]
fn test_load_returns_a_copy() {
    let store = MetricStore::new();
    store
        .save(Category::Train, "run-1", json!({"acc": 0.9}))
        .expect("save should succeed");

    let mut history = store.load(Category::Train, "run-1");
    history.push(json!({"acc": 1.0}));
    history[0] = json!("clobbered");

    // Stored history is unaffected by mutation of the returned value.
    assert_eq!(store.load(Category::Train, "run-1"), vec![json!({"acc": 0.9})]);
}

#[test]
fn test_null_record_is_stored() {
    // A producer that omits the metrics field still gets its write
    // recorded, as a null placeholder.
    let store = MetricStore::new();
    store
        .save(Category::Epoch, "run-1", serde_json::Value::Null)
        .expect("save should succeed");
    assert_eq!(store.load(Category::Epoch, "run-1"), vec![serde_json::Value::Null]);
}

// ---------------------------------------------------------------------------
// Count tests
// ---------------------------------------------------------------------------

#[test]
fn test_counts_start_at_zero() {
    let store = MetricStore::new();
    assert_eq!(store.run_count(), 0);
    assert_eq!(store.record_count(), 0);
}

#[test]
fn test_counts_across_categories() {
    let store = MetricStore::new();
    store.save(Category::Batch, "a", json!(1)).unwrap();
    store.save(Category::Batch, "a", json!(2)).unwrap();
    store.save(Category::Epoch, "a", json!(3)).unwrap();
    store.save(Category::Train, "b", json!(4)).unwrap();

    // "a" in batch and "a" in epoch are distinct logs.
    assert_eq!(store.run_count(), 3);
    assert_eq!(store.record_count(), 4);
}

// ---------------------------------------------------------------------------
// Limit tests
// ---------------------------------------------------------------------------

#[test]
fn test_default_limits_are_unlimited() {
    let limits = StoreLimits::default();
    assert!(limits.max_records_per_run.is_none());
    assert!(limits.max_runs_per_category.is_none());
}

#[test]
fn test_record_limit_refuses_overflow() {
    let store = MetricStore::with_limits(StoreLimits::unlimited().with_max_records_per_run(2));
    store.save(Category::Epoch, "run-1", json!(1)).unwrap();
    store.save(Category::Epoch, "run-1", json!(2)).unwrap();

    let err = store.save(Category::Epoch, "run-1", json!(3)).unwrap_err();
    assert!(matches!(err, StoreError::RecordLimit { limit: 2, .. }));

    // The refused write left no trace.
    assert_eq!(store.load(Category::Epoch, "run-1").len(), 2);
}

#[test]
fn test_run_limit_refuses_new_runs_only() {
    let store = MetricStore::with_limits(StoreLimits::unlimited().with_max_runs_per_category(1));
    store.save(Category::Epoch, "run-1", json!(1)).unwrap();

    let err = store.save(Category::Epoch, "run-2", json!(1)).unwrap_err();
    assert!(matches!(err, StoreError::RunLimit { limit: 1, .. }));

    // Existing runs keep accepting records, and other categories have
    // their own budget.
    store.save(Category::Epoch, "run-1", json!(2)).unwrap();
    store.save(Category::Batch, "run-2", json!(1)).unwrap();
}

#[test]
fn test_zero_record_limit_creates_no_log() {
    let store = MetricStore::with_limits(StoreLimits::unlimited().with_max_records_per_run(0));
    assert!(store.save(Category::Epoch, "run-1", json!(1)).is_err());
    assert_eq!(store.run_count(), 0);
}

// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_save_load_preserves_order_and_content(values in prop::collection::vec(-1e6f64..1e6, 0..50)) {
            let store = MetricStore::new();
            for v in &values {
                store.save(Category::Epoch, "run", json!({"loss": v})).unwrap();
            }

            let history = store.load(Category::Epoch, "run");
            prop_assert_eq!(history.len(), values.len());
            for (record, v) in history.iter().zip(&values) {
                prop_assert_eq!(record["loss"].as_f64().unwrap(), *v);
            }
        }

        #[test]
        fn prop_other_keys_stay_empty(run_id in "[a-z0-9-]{1,20}", other in "[A-Z]{1,20}") {
            let store = MetricStore::new();
            store.save(Category::Batch, &run_id, json!(1)).unwrap();
            prop_assert!(store.load(Category::Batch, &other).is_empty());
            prop_assert!(store.load(Category::Epoch, &run_id).is_empty());
            prop_assert!(store.load(Category::Train, &run_id).is_empty());
        }

        #[test]
        fn prop_record_limit_is_exact(limit in 1usize..20, extra in 1usize..10) {
            let store = MetricStore::with_limits(
                StoreLimits::unlimited().with_max_records_per_run(limit),
            );
            for i in 0..(limit + extra) {
                let _ = store.save(Category::Train, "run", json!(i));
            }
            prop_assert_eq!(store.load(Category::Train, "run").len(), limit);
        }
    }
}
