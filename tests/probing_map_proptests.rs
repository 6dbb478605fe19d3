use proptest::prelude::*;
use probing_map::{MapError, ProbingMap, MAX_LOAD_FACTOR};
use std::collections::HashMap;

proptest! {
    // Round trip: the last value put for a key is what `get` returns.
    #[test]
    fn prop_put_then_get(pairs in proptest::collection::vec((any::<u16>(), any::<i64>()), 0..200)) {
        let mut m = ProbingMap::new();
        let mut model = HashMap::new();
        for (k, v) in pairs {
            m.put(k, v);
            model.insert(k, v);
        }
        prop_assert_eq!(m.size(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(m.get(k), Ok(v));
        }
    }

    // Overwrite: the second put returns the first value and keeps the size.
    #[test]
    fn prop_overwrite_returns_previous(k in "[a-z]{1,6}", v1 in any::<i32>(), v2 in any::<i32>()) {
        let mut m = ProbingMap::new();
        prop_assert_eq!(m.put(k.clone(), v1), None);
        let size = m.size();
        prop_assert_eq!(m.put(k.clone(), v2), Some(v1));
        prop_assert_eq!(m.size(), size);
        prop_assert_eq!(m.get(k.as_str()), Ok(&v2));
    }

    // Remove then re-put: the key disappears, the size drops by one, and a
    // fresh put restores it.
    #[test]
    fn prop_remove_then_reput(keys in proptest::collection::hash_set(any::<u32>(), 1..60), pick in any::<prop::sample::Index>(), v in any::<u8>()) {
        let keys: Vec<u32> = keys.into_iter().collect();
        let mut m: ProbingMap<u32, u8> = keys.iter().map(|&k| (k, 0)).collect();
        let k = keys[pick.index(keys.len())];
        let before = m.size();

        prop_assert_eq!(m.remove(&k), Ok(0));
        prop_assert_eq!(m.size(), before - 1);
        prop_assert_eq!(m.get(&k), Err(MapError::NotFound));
        prop_assert!(!m.contains_key(&k));

        prop_assert_eq!(m.put(k, v), None);
        prop_assert_eq!(m.size(), before);
        prop_assert_eq!(m.get(&k), Ok(&v));
    }

    // Growth: whenever a put crosses the threshold the table becomes
    // `2 * len + 3`, and nothing is lost.
    #[test]
    fn prop_growth_keeps_entries(cap in 1usize..16, n in 0u32..150) {
        let mut m = ProbingMap::with_capacity(cap);
        for k in 0..n {
            let len = m.capacity();
            let grows = (m.size() + 1) as f64 / len as f64 > MAX_LOAD_FACTOR;
            m.put(k, k);
            if grows {
                prop_assert_eq!(m.capacity(), 2 * len + 3);
            } else {
                prop_assert_eq!(m.capacity(), len);
            }
        }
        for k in 0..n {
            prop_assert_eq!(m.get(&k), Ok(&k));
        }
    }

    // Count: equals the number of live keys mapped to the value.
    #[test]
    fn prop_count_matches_model(ops in proptest::collection::vec((0u8..20, 0u8..4, any::<bool>()), 0..120), probe in 0u8..4) {
        let mut m = ProbingMap::new();
        let mut model = HashMap::new();
        for (k, v, insert) in ops {
            if insert {
                m.put(k, v);
                model.insert(k, v);
            } else {
                prop_assert_eq!(m.remove(&k).ok(), model.remove(&k));
            }
        }
        let expected = model.values().filter(|&&v| v == probe).count();
        prop_assert_eq!(m.count(&probe), expected);
    }

    // Clear: size zero and every prior key absent, even when repeated.
    #[test]
    fn prop_clear_forgets(keys in proptest::collection::vec(any::<i16>(), 0..100), twice in any::<bool>()) {
        let mut m = ProbingMap::new();
        for &k in &keys {
            m.put(k, ());
        }
        m.clear();
        if twice {
            m.clear();
        }
        prop_assert_eq!(m.size(), 0);
        for k in &keys {
            prop_assert!(!m.contains_key(k));
        }
    }
}
