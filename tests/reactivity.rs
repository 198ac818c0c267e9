//! Reactivity properties
//!
//! Dependency correctness, exactly-once notification and recursive
//! observability, checked over generated data graphs.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use serde_json::json;
use spark_vdom::{Computation, ReactiveObject, Value, observe};

fn object_with_keys(n: usize) -> ReactiveObject {
    ReactiveObject::from_pairs((0..n).map(|i| (format!("k{i}"), i as f64)))
}

/// Indices whose flag is set.
fn selected(mask: &[bool]) -> BTreeSet<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &read)| read.then_some(i))
        .collect()
}

/// A computation that reads exactly `keys` and counts its runs.
fn reader(object: &ReactiveObject, keys: &BTreeSet<usize>) -> (Computation, Rc<Cell<u32>>) {
    let runs = Rc::new(Cell::new(0));
    let object = object.clone();
    let keys: Vec<String> = keys.iter().map(|i| format!("k{i}")).collect();
    let counter = runs.clone();
    let computation = Computation::new("reader", move || {
        counter.set(counter.get() + 1);
        for key in &keys {
            let _ = object.get(key);
        }
    });
    (computation, runs)
}

// =============================================================================
// Nested graphs
// =============================================================================

/// Plain data nested up to a few levels of objects and arrays.
fn nested_json() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        (0i32..100).prop_map(serde_json::Value::from),
        "[a-z]{0,3}".prop_map(serde_json::Value::from),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::Array),
            prop::collection::btree_map("[a-c]", inner, 0..4)
                .prop_map(|map| serde_json::Value::Object(map.into_iter().collect())),
        ]
    })
}

fn nested_root() -> impl Strategy<Value = serde_json::Value> {
    prop::collection::btree_map("[a-d]", nested_json(), 1..4)
        .prop_map(|map| serde_json::Value::Object(map.into_iter().collect()))
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

/// Paths of every object property and array element, read untracked.
fn slot_paths(value: &Value, prefix: &str, out: &mut Vec<String>) {
    match value {
        Value::Object(object) => {
            for key in object.keys() {
                let path = join(prefix, &key);
                slot_paths(&object.get(&key), &path, out);
                out.push(path);
            }
        }
        Value::Array(array) => {
            for (index, item) in array.to_vec().iter().enumerate() {
                let path = join(prefix, &index.to_string());
                slot_paths(item, &path, out);
                out.push(path);
            }
        }
        _ => {}
    }
}

/// Every non-empty prefix of the given paths.
fn prefixes(paths: &[String]) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for path in paths {
        let mut current = String::new();
        for segment in path.split('.') {
            current = join(&current, segment);
            out.insert(current.clone());
        }
    }
    out
}

/// Check every dependency set in the graph against the read prefixes and
/// return how many of them hold `computation`.
fn check_subscriptions(
    value: &Value,
    prefix: &str,
    read: &BTreeSet<String>,
    computation: &Computation,
) -> Result<usize, TestCaseError> {
    let mut subscribed = 0;
    match value {
        Value::Object(object) => {
            for key in object.keys() {
                let path = join(prefix, &key);
                let expected = read.contains(&path);
                let dep = object.dep_of(&key).unwrap();
                prop_assert_eq!(dep.has_subscriber(computation), expected, "property {}", path);
                subscribed += usize::from(expected);
                subscribed += check_subscriptions(&object.get(&key), &path, read, computation)?;
            }
        }
        Value::Array(array) => {
            let items = array.to_vec();
            let expected = (0..items.len()).any(|i| read.contains(&join(prefix, &i.to_string())));
            prop_assert_eq!(array.dep().has_subscriber(computation), expected, "array {}", prefix);
            subscribed += usize::from(expected);
            for (index, item) in items.iter().enumerate() {
                let path = join(prefix, &index.to_string());
                subscribed += check_subscriptions(item, &path, read, computation)?;
            }
        }
        _ => {}
    }
    Ok(subscribed)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// After the first run, a property lists the computation iff it was read.
    #[test]
    fn prop_dependency_sets_match_reads(mask in prop::collection::vec(any::<bool>(), 1..12)) {
        let (n, read) = (mask.len(), selected(&mask));
        let object = object_with_keys(n);
        let (computation, _) = reader(&object, &read);

        for i in 0..n {
            let dep = object.dep_of(&format!("k{i}")).unwrap();
            prop_assert_eq!(dep.has_subscriber(&computation), read.contains(&i));
        }
        prop_assert_eq!(computation.dependency_count(), read.len());
    }

    /// A changed write runs each subscriber once; an unchanged write runs none.
    #[test]
    fn prop_notification_fires_once_per_write(
        (mask, target) in prop::collection::vec(any::<bool>(), 1..12)
            .prop_flat_map(|mask| {
                let n = mask.len();
                (Just(mask), 0..n)
            })
    ) {
        let (n, read) = (mask.len(), selected(&mask));
        let object = object_with_keys(n);
        let (_computation, runs) = reader(&object, &read);
        prop_assert_eq!(runs.get(), 1);

        let key = format!("k{target}");
        prop_assert!(object.set(&key, 1000.0));
        let expected = if read.contains(&target) { 2 } else { 1 };
        prop_assert_eq!(runs.get(), expected);

        prop_assert!(!object.set(&key, 1000.0));
        prop_assert_eq!(runs.get(), expected);
    }

    /// Writes only ever reach live subscribers.
    #[test]
    fn prop_disposed_computation_never_runs(writes in prop::collection::vec(0i32..5, 1..20)) {
        let object = object_with_keys(1);
        let (computation, runs) = reader(&object, &BTreeSet::from([0]));
        computation.dispose();

        for value in writes {
            object.set("k0", value);
        }
        prop_assert_eq!(runs.get(), 1);
        prop_assert_eq!(object.dep_of("k0").unwrap().subscriber_count(), 0);
    }

    /// Reading dotted paths through a nested graph subscribes exactly the
    /// properties and arrays walked, at any depth.
    #[test]
    fn prop_nested_dependency_sets_match_reads(
        data in nested_root(),
        mask in prop::collection::vec(any::<bool>(), 1..16),
    ) {
        let root = observe(data);
        let mut paths = Vec::new();
        slot_paths(&root, "", &mut paths);
        let chosen: Vec<String> = paths
            .iter()
            .enumerate()
            .filter(|(i, _)| mask[i % mask.len()])
            .map(|(_, path)| path.clone())
            .collect();

        let source = root.clone();
        let reads = chosen.clone();
        let computation = Computation::new("paths", move || {
            for path in &reads {
                let _ = source.get_path(path);
            }
        });

        let read = prefixes(&chosen);
        let subscribed = check_subscriptions(&root, "", &read, &computation)?;
        prop_assert_eq!(computation.dependency_count(), subscribed);
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_assigned_object_is_observable() {
    let root = observe(json!({ "slot": null }));
    let root = root.as_object().unwrap().clone();
    root.set("slot", json!({ "a": 1 }));

    let seen = Rc::new(Cell::new(0.0));
    let sink = seen.clone();
    let source = root.clone();
    let computation = Computation::new("nested", move || {
        sink.set(source.get("slot").get("a").as_f64().unwrap_or(-1.0));
    });
    assert_eq!(seen.get(), 1.0);

    let inner = root.get("slot");
    let inner = inner.as_object().unwrap();
    assert!(inner.dep_of("a").unwrap().has_subscriber(&computation));

    inner.set("a", 7);
    assert_eq!(seen.get(), 7.0);
    assert_eq!(computation.run_count(), 2);
}

#[test]
fn test_branch_switch_prunes_stale_dependency() {
    let data = observe(json!({ "flag": true, "a": 1, "b": 2 }));
    let data = data.as_object().unwrap().clone();
    let source = data.clone();
    let computation = Computation::new("branch", move || {
        if source.get("flag").as_bool() == Some(true) {
            let _ = source.get("a");
        } else {
            let _ = source.get("b");
        }
    });
    let a = data.dep_of("a").unwrap();
    let b = data.dep_of("b").unwrap();
    assert!(computation.depends_on(&a));

    data.set("flag", false);
    assert!(!a.has_subscriber(&computation));
    assert!(b.has_subscriber(&computation));

    let runs = computation.run_count();
    data.set("a", 100);
    assert_eq!(computation.run_count(), runs);
}

#[test]
fn test_array_mutations_notify() {
    let data = observe(json!({ "items": ["x"] }));
    let source = data.clone();
    let lengths = Rc::new(Cell::new(0));
    let sink = lengths.clone();
    let _computation = Computation::new("length", move || {
        let items = source.get("items");
        sink.set(items.as_array().map(|a| a.len()).unwrap_or(0));
    });
    assert_eq!(lengths.get(), 1);

    let items = data.get("items");
    let items = items.as_array().unwrap();
    items.push("y");
    assert_eq!(lengths.get(), 2);
    items.remove(0);
    assert_eq!(lengths.get(), 1);
    items.clear();
    assert_eq!(lengths.get(), 0);
}

#[test]
fn test_nested_computations_keep_outer_reads() {
    let data = observe(json!({ "outer": 1, "inner": 2 }));
    let data = data.as_object().unwrap().clone();
    let source = data.clone();
    let inner_slot = Rc::new(std::cell::RefCell::new(None));
    let slot = inner_slot.clone();

    let outer = Computation::new("outer", move || {
        let nested = source.clone();
        let inner = Computation::new("inner", move || {
            let _ = nested.get("inner");
        });
        // Read after the inner computation finished its own run.
        let _ = source.get("outer");
        *slot.borrow_mut() = Some(inner);
    });

    assert!(outer.depends_on(&data.dep_of("outer").unwrap()));
    assert!(!outer.depends_on(&data.dep_of("inner").unwrap()));
    let inner = inner_slot.borrow().clone().unwrap();
    assert!(inner.depends_on(&data.dep_of("inner").unwrap()));
}

#[test]
fn test_values_compare_by_identity() {
    let a = observe(json!({ "x": 1 }));
    let b = observe(json!({ "x": 1 }));
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
    assert_eq!(Value::from(3), Value::from(3.0));
}
