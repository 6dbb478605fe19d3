#![cfg(test)]

// Property tests for ProbingMap kept inside the crate so they can share the
// deterministic test hashers and inspect the raw table.

use crate::probing_map::test_hashers::{ConstBuildHasher, IdentityBuildHasher};
use crate::probing_map::{ProbingMap, Slot, INITIAL_CAPACITY};
use crate::MapError;
use core::hash::BuildHasher;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::hash_map::RandomState;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations: indices shrink toward earlier keys, and op lists
// shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Count(i32),
    // Extra slots on top of the current size for an explicit resize.
    Resize(usize),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), 0i32..4).prop_map(|(i, v)| Op::Put(i, v)),
            2 => idx.clone().prop_map(Op::Remove),
            2 => idx.clone().prop_map(Op::Get),
            1 => prop_oneof![contains_pool, "[a-z]{0,4}".prop_map(|s| s)].prop_map(Op::Contains),
            1 => (idx.clone(), -3i32..3).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => (0i32..4).prop_map(Op::Count),
            1 => (0usize..6).prop_map(Op::Resize),
            1 => Just(Op::Clear),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Structural checks on the raw table after every step:
// - `size` equals the number of occupied slots;
// - no key is live in two slots;
// - every live key is found by a probe from its home index.
fn check_table<S: BuildHasher>(sut: &ProbingMap<String, i32, S>) -> Result<(), TestCaseError> {
    let live: Vec<&String> = sut
        .table()
        .iter()
        .filter_map(Slot::entry)
        .map(|e| e.key())
        .collect();
    prop_assert_eq!(live.len(), sut.size());
    let distinct: BTreeSet<&String> = live.iter().copied().collect();
    prop_assert_eq!(distinct.len(), live.len(), "duplicate live key");
    for k in live {
        prop_assert!(sut.get(k).is_ok(), "live key {:?} unreachable", k);
    }
    Ok(())
}

fn run<S: BuildHasher>(
    mut sut: ProbingMap<String, i32, S>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();
    for op in ops {
        match op {
            Op::Put(i, v) => {
                let k = pool[i].clone();
                let prev = sut.put(k.clone(), v);
                prop_assert_eq!(prev, model.insert(k, v));
            }
            Op::Remove(i) => {
                let k = &pool[i];
                match model.remove(k) {
                    Some(mv) => prop_assert_eq!(sut.remove(k.as_str()), Ok(mv)),
                    None => prop_assert_eq!(sut.remove(k.as_str()), Err(MapError::NotFound)),
                }
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k.as_str()).ok(), model.get(k));
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(&s));
            }
            Op::Mutate(i, d) => {
                let k = &pool[i];
                match (sut.get_mut(k.as_str()), model.get_mut(k)) {
                    (Ok(sv), Some(mv)) => {
                        *sv += d;
                        *mv += d;
                    }
                    (Err(MapError::NotFound), None) => {}
                    (s, m) => prop_assert!(false, "get_mut mismatch: {:?} vs {:?}", s, m),
                }
            }
            Op::Count(v) => {
                let expected = model.values().filter(|&&mv| mv == v).count();
                prop_assert_eq!(sut.count(&v), expected);
            }
            Op::Resize(extra) => {
                let len = sut.size() + extra;
                prop_assert_eq!(sut.resize_backing_array(len), Ok(()));
                prop_assert_eq!(sut.capacity(), len);
                prop_assert_eq!(sut.tombstones(), 0);
            }
            Op::Clear => {
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), INITIAL_CAPACITY);
            }
            Op::Iterate => {
                let s_keys: BTreeSet<String> = sut.keys().cloned().collect();
                let m_keys: BTreeSet<String> = model.keys().cloned().collect();
                prop_assert_eq!(&s_keys, &m_keys);
                let set_keys: BTreeSet<String> = sut.key_set().into_iter().cloned().collect();
                prop_assert_eq!(&set_keys, &m_keys);

                let mut s_vals: Vec<i32> = sut.values().into_iter().copied().collect();
                let mut m_vals: Vec<i32> = model.values().copied().collect();
                s_vals.sort_unstable();
                m_vals.sort_unstable();
                prop_assert_eq!(s_vals, m_vals);
            }
        }

        check_table(&sut)?;
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.size() <= sut.capacity());
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `put` returns the previous value exactly when the model had one;
// - `get`/`remove`/`contains_key` agree with the model through tombstones,
//   growth, explicit resizes and clears;
// - `count`, `keys`, `key_set` and `values` see live entries only;
// - the raw table never holds a duplicate or unreachable live key.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run(ProbingMap::<String, i32, RandomState>::new(), &pool, ops)?;
    }

    // Same sequence under a constant hasher: one cluster, many tombstones.
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run(ProbingMap::with_hasher(ConstBuildHasher), &pool, ops)?;
    }

    // Small starting tables force growth early and often.
    #[test]
    fn prop_state_machine_small_tables(cap in 1usize..4, (pool, ops) in arb_scenario()) {
        run(ProbingMap::with_capacity_and_hasher(cap, RandomState::new()), &pool, ops)?;
    }
}

// Property: with home index `key % capacity`, the table length after `n`
// fresh puts follows the `2 * len + 3` growth rule exactly.
proptest! {
    #[test]
    fn prop_growth_follows_rule(cap in 1usize..20, n in 0u64..200) {
        let mut m: ProbingMap<u64, u64, IdentityBuildHasher> =
            ProbingMap::with_capacity_and_hasher(cap, IdentityBuildHasher);
        let mut expected = cap;
        for k in 0..n {
            if (k as usize + 1) as f64 / expected as f64 > crate::MAX_LOAD_FACTOR {
                expected = 2 * expected + 3;
            }
            m.put(k, k);
            prop_assert_eq!(m.capacity(), expected);
        }
        for k in 0..n {
            prop_assert_eq!(m.get(&k), Ok(&k));
        }
        prop_assert!(m.load_factor() <= crate::MAX_LOAD_FACTOR);
    }
}
