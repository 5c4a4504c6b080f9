//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against its invariants and against a
//! simple reference model of LRU order.

use proptest::prelude::*;
use std::collections::{HashSet, VecDeque};

use crate::cache::CacheStore;

// == Test Configuration ==
const TEST_CAPACITY: usize = 100;

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}(:[0-9])?".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,32}".prop_map(|s| s)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Touch { key: String },
    Delete { key: String },
    DeletePrefix { prefix: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Touch { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        1 => "[a-e]{1}".prop_map(|prefix| CacheOp::DeletePrefix { prefix }),
    ]
}

/// Reference model: front = most recently used.
#[derive(Default)]
struct Model {
    order: VecDeque<(String, String)>,
}

impl Model {
    fn position(&self, key: &str) -> Option<usize> {
        self.order.iter().position(|(k, _)| k == key)
    }

    fn promote(&mut self, key: &str) -> Option<String> {
        let index = self.position(key)?;
        let entry = self.order.remove(index)?;
        let value = entry.1.clone();
        self.order.push_front(entry);
        Some(value)
    }

    fn set(&mut self, key: String, value: String, capacity: usize) {
        if let Some(index) = self.position(&key) {
            self.order.remove(index);
        } else if self.order.len() >= capacity {
            self.order.pop_back();
        }
        self.order.push_front((key, value));
    }

    fn delete(&mut self, key: &str) {
        if let Some(index) = self.position(key) {
            self.order.remove(index);
        }
    }

    fn delete_prefix(&mut self, prefix: &str) {
        self.order.retain(|(k, _)| !k.starts_with(prefix));
    }

    fn keys(&self) -> Vec<String> {
        self.order.iter().map(|(k, _)| k.clone()).collect()
    }
}

/// Every entry has exactly one recency node and vice versa.
fn assert_bijection(store: &CacheStore<String>) -> Result<(), TestCaseError> {
    let by_recency = store.keys_by_recency();
    let unique: HashSet<&String> = by_recency.iter().collect();

    prop_assert_eq!(by_recency.len(), store.len(), "recency index size mismatch");
    prop_assert_eq!(unique.len(), by_recency.len(), "duplicate recency nodes");
    prop_assert_eq!(store.recency_len(), store.len());
    for key in &by_recency {
        prop_assert!(store.peek(key).is_some(), "recency node without entry: {}", key);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // For any sequence of operations the store matches the reference LRU
    // model in both contents and recency order.
    #[test]
    fn prop_matches_reference_model(
        capacity in 1usize..8,
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut store = CacheStore::new(capacity, None);
        let mut model = Model::default();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(&key, value.clone());
                    model.set(key, value, capacity);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(store.get(&key), model.promote(&key));
                }
                CacheOp::Touch { key } => {
                    prop_assert_eq!(store.touch(&key), model.promote(&key).is_some());
                }
                CacheOp::Delete { key } => {
                    store.remove(&key);
                    model.delete(&key);
                }
                CacheOp::DeletePrefix { prefix } => {
                    store.remove_prefix(&prefix);
                    model.delete_prefix(&prefix);
                }
            }

            prop_assert!(store.len() <= capacity, "size {} exceeds capacity {}", store.len(), capacity);
            prop_assert_eq!(store.keys_by_recency(), model.keys());
            assert_bijection(&store)?;
        }
    }

    // Inserting N+1 distinct keys evicts exactly the least recently used one.
    #[test]
    fn prop_capacity_enforcement(
        keys in prop::collection::hash_set("[a-z]{1,12}", 2..40)
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let capacity = keys.len() - 1;
        let mut store = CacheStore::new(capacity, None);

        for key in &keys {
            store.set(key, format!("value_{key}"));
            prop_assert!(store.len() <= capacity);
        }

        prop_assert_eq!(store.len(), capacity);
        prop_assert_eq!(store.stats().evictions, 1);
        prop_assert!(store.peek(&keys[0]).is_none(), "oldest key should be evicted");
        for key in keys.iter().skip(1) {
            prop_assert!(store.peek(key).is_some(), "key '{}' should survive", key);
        }
    }

    // A read promotes its key past every key that was not read.
    #[test]
    fn prop_lru_access_tracking(
        keys in prop::collection::hash_set("[a-z]{1,12}", 3..10),
        new_key in "[0-9]{1,4}"
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let mut store = CacheStore::new(keys.len(), None);
        for key in &keys {
            store.set(key, format!("value_{key}"));
        }

        prop_assert!(store.get(&keys[0]).is_some());
        store.set(&new_key, "new".to_string());

        prop_assert!(store.peek(&keys[0]).is_some(), "read key was evicted");
        prop_assert!(store.peek(&keys[1]).is_none(), "oldest unread key survived");
        prop_assert!(store.peek(&new_key).is_some());
    }

    // Prefix deletion removes exactly the keys that start with the prefix.
    #[test]
    fn prop_prefix_deletion_scope(
        keys in prop::collection::hash_set(key_strategy(), 1..30),
        prefix in "[a-e]{0,2}"
    ) {
        let mut store = CacheStore::new(TEST_CAPACITY, None);
        for key in &keys {
            store.set(key, key.clone());
        }

        let expected = keys.iter().filter(|k| k.starts_with(&prefix)).count();
        prop_assert_eq!(store.remove_prefix(&prefix), expected);

        for key in &keys {
            prop_assert_eq!(store.peek(key).is_some(), !key.starts_with(&prefix));
        }
        assert_bijection(&store)?;
    }

    // Statistics count every lookup exactly once.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = CacheStore::new(TEST_CAPACITY, None);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(&key, value),
                CacheOp::Get { key } => match store.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Touch { key } => {
                    store.touch(&key);
                }
                CacheOp::Delete { key } => {
                    store.remove(&key);
                }
                CacheOp::DeletePrefix { prefix } => {
                    store.remove_prefix(&prefix);
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, store.len(), "Total entries mismatch");
    }
}
