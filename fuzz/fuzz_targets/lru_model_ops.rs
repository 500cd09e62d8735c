#![no_main]

use libfuzzer_sys::fuzz_target;
use lrukit::policy::lru::LruCache;
use lrukit::traits::{CoreCache, LruCacheTrait, MutableCache};

// Fuzz the LRU cache against a naive MRU-first Vec model
//
// Every byte pair is decoded into an operation; after each step the cache
// and the model must agree on length, membership, and full recency order.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let capacity = usize::from(data[0] % 16) + 1;
    let mut cache: LruCache<u8, u8> = LruCache::new(capacity);
    let mut model: Vec<(u8, u8)> = Vec::new();

    let mut idx = 1;
    while idx + 1 < data.len() {
        let key = data[idx + 1] % 32;
        match data[idx] % 6 {
            0 | 1 => {
                // insert; doubled weight to keep the cache populated
                let value = data[idx];
                let previous = model.iter().position(|&(k, _)| k == key).map(|pos| {
                    let old = model.remove(pos).1;
                    model.insert(0, (key, value));
                    old
                });
                if previous.is_none() {
                    if model.len() == capacity {
                        model.pop();
                    }
                    model.insert(0, (key, value));
                }
                assert_eq!(cache.insert(key, value), previous);
            }
            2 => {
                let expected = model.iter().position(|&(k, _)| k == key).map(|pos| {
                    let entry = model.remove(pos);
                    model.insert(0, entry);
                    entry.1
                });
                assert_eq!(cache.get(&key).copied(), expected);
            }
            3 => {
                let expected = model
                    .iter()
                    .position(|&(k, _)| k == key)
                    .map(|pos| model.remove(pos).1);
                assert_eq!(cache.remove(&key), expected);
            }
            4 => {
                let found = model.iter().position(|&(k, _)| k == key);
                if let Some(pos) = found {
                    let entry = model.remove(pos);
                    model.insert(0, entry);
                }
                assert_eq!(cache.touch(&key), found.is_some());
            }
            _ => {
                assert_eq!(cache.pop_lru(), model.pop());
            }
        }

        assert!(cache.len() <= capacity);
        assert_eq!(cache.len(), model.len());
        cache.check_invariants().unwrap();

        let order: Vec<u8> = cache.iter().map(|(k, _)| *k).collect();
        let model_order: Vec<u8> = model.iter().map(|&(k, _)| k).collect();
        assert_eq!(order, model_order);

        idx += 2;
    }
});
