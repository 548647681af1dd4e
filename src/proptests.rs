use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, u32),
    Remove(u16),
    Get(u16),
    Update(u16, u32),
}

fn key_strategy() -> impl Strategy<Value = u16> + Clone {
    // A narrow key range keeps duplicate inserts and hits on remove frequent.
    0u16..512
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        50 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        30 => key.clone().prop_map(Op::Remove),
        15 => key.clone().prop_map(Op::Get),
        5 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Update(k, v)),
    ];
    prop::collection::vec(op, 0..=1000)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let mut t: OrderedMap<u16, u32> = OrderedMap::new();
        let mut m: BTreeMap<u16, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let was_present = m.contains_key(&key);
                    let before = t.clone();
                    let inserted = t.insert(key, value);
                    prop_assert_eq!(inserted, !was_present);
                    if inserted {
                        m.insert(key, value);
                    } else {
                        // Rejected inserts change neither shape nor value
                        prop_assert!(t == before);
                    }
                }
                Op::Remove(key) => {
                    let before = t.clone();
                    let removed = t.remove(&key);
                    prop_assert_eq!(removed, m.remove(&key).is_some());
                    if !removed {
                        // Removing an absent key leaves the tree untouched
                        prop_assert!(t == before);
                    }
                }
                Op::Get(key) => {
                    let got = t.get(&key).ok().copied();
                    prop_assert_eq!(got, m.get(&key).copied());
                    prop_assert_eq!(t.contains_key(&key), m.contains_key(&key));
                }
                Op::Update(key, value) => {
                    match (t.get_mut(&key), m.get_mut(&key)) {
                        (Ok(got), Some(expected)) => {
                            *got = value;
                            *expected = value;
                        }
                        (Err(KeyNotFound), None) => {}
                        _ => prop_assert!(false, "presence of {} differs", key),
                    }
                }
            }

            t.check_consistency();
            prop_assert_eq!(t.len(), m.len());
            prop_assert_eq!(t.is_empty(), m.is_empty());
        }

        prop_assert!(t.iter().eq(m.iter()));
        let mut visited = Vec::with_capacity(t.len());
        t.traverse_in_order(|key, value| visited.push((*key, *value)));
        prop_assert!(visited.into_iter().eq(m.into_iter()));
    }

    #[test]
    fn prop_clone_is_independent(
        keys in prop::collection::vec(key_strategy(), 0..200),
        extra in key_strategy(),
    ) {
        let original: OrderedMap<u16, u16> = keys.iter().map(|k| (*k, *k)).collect();
        let mut copy = original.clone();
        prop_assert!(copy == original);

        let was_present = original.contains_key(&extra);
        if was_present {
            prop_assert!(copy.remove(&extra));
        } else {
            prop_assert!(copy.insert(extra, extra));
        }
        copy.check_consistency();
        original.check_consistency();
        prop_assert_eq!(original.contains_key(&extra), was_present);
        prop_assert!(copy != original);
    }

    #[test]
    fn prop_height_is_logarithmic(keys in prop::collection::vec(any::<u32>(), 1..2000)) {
        let map: OrderedMap<u32, ()> = keys.into_iter().map(|k| (k, ())).collect();
        let n = map.len() as f64;
        // AVL trees are at most about 1.44 times taller than perfectly balanced ones
        let bound = (1.45 * (n + 2.0).log2()).ceil() as usize;
        prop_assert!(map.height() <= bound);
        prop_assert!(map.height() >= (n + 1.0).log2().ceil() as usize);
    }
}
