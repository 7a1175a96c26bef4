extern crate std;

use std::{ops::Range, prelude::v1::*};

use proptest::prelude::*;

use crate::model::{self, TestNode};

use super::*;

fn init_logger() {
    let _ = pretty_env_logger::try_init();
}

fn insert_find_all(keys: &[u32]) {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for &key in keys {
        assert!(tree.insert(TestNode::new(key)).is_ok());
        tree.assert_invariants();
    }

    for key in keys {
        let node = tree.get(key).expect("item not found");
        assert_eq!(node.key(), key);
    }

    let mut sorted = keys.to_vec();
    sorted.sort_unstable();
    assert_eq!(tree.iter().map(|node| node.key).collect::<Vec<_>>(), sorted);
}

// Calls `f` with every permutation of `keys`.
fn for_each_permutation(keys: &mut [u32], k: usize, f: &mut impl FnMut(&[u32])) {
    if k == keys.len() {
        f(keys);
        return;
    }

    for i in k..keys.len() {
        keys.swap(k, i);
        for_each_permutation(keys, k + 1, f);
        keys.swap(k, i);
    }
}

#[test]
fn two_elems_find() {
    insert_find_all(&[0, 1]);
    insert_find_all(&[1, 0]);
}

#[test]
fn four_elems_find() {
    for_each_permutation(&mut [0, 1, 2, 3], 0, &mut insert_find_all);
}

#[test]
fn six_elems_find() {
    for_each_permutation(&mut [0, 1, 2, 3, 4, 5], 0, &mut insert_find_all);
}

#[test]
fn set_and_tree_agree() {
    init_logger();

    let keys = [41, 7, 19, 3, 88, 62, 19, 5, 70, 41, 12];

    let mut tree: AvlTree<TestNode> = AvlTree::new();
    let mut set = AvlSet::new();

    for key in keys {
        assert_eq!(tree.insert(TestNode::new(key)).is_ok(), set.insert(key));
    }

    tree.assert_invariants();
    set.assert_invariants();

    assert_eq!(tree.len(), set.len());
    assert_eq!(tree.height(), set.height());
    assert!(tree.iter().map(|node| node.key).eq(set.iter().copied()));
}

#[test]
fn heap_sorts_like_avl() {
    init_logger();

    let keys = [41u32, 7, 19, 3, 88, 62, 5, 70, 12];

    let mut heap: MinHeap<u32> = keys.into_iter().collect();
    let set: AvlSet<u32> = keys.into_iter().collect();

    let mut polled = Vec::new();
    while let Some(key) = heap.poll() {
        polled.push(key);
    }

    assert_eq!(polled, set.iter().copied().collect::<Vec<_>>());
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn heap_equivalence(ops in proptest::collection::vec(model::heap_op_strategy(), FUZZ_RANGE)) {
        model::run_heap_equivalence(ops);
    }

    #[test]
    fn avl_equivalence(ops in proptest::collection::vec(model::tree_op_strategy(), FUZZ_RANGE)) {
        model::run_avl_equivalence(ops);
    }
}
