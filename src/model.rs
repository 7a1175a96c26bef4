extern crate std;

use std::{collections::BTreeSet, prelude::v1::*, ptr::NonNull};

use arbitrary::Arbitrary;
use cordyceps::Linked;
use proptest::strategy::{Just, Strategy};

use crate::{
    heap::{MaxHeap, MinHeap},
    AvlTree, Error, Links, TreeNode,
};

#[derive(Debug)]
#[repr(C)]
pub struct TestNode {
    pub links: Links<TestNode>,
    pub key: u32,
}

impl TestNode {
    pub fn new(key: u32) -> Box<TestNode> {
        Box::new(TestNode {
            links: Links::new(),
            key,
        })
    }
}

unsafe impl Linked<Links<TestNode>> for TestNode {
    type Handle = Box<TestNode>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        Box::leak(r).into()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<TestNode>> {
        // SAFETY: Self is #[repr(C)] and `links` is first field
        ptr.cast()
    }
}

impl TreeNode<Links<TestNode>> for TestNode {
    type Key = u32;

    fn key(&self) -> &Self::Key {
        &self.key
    }
}

/// A value an operation acts on: either one already in the model, chosen by index, or a fresh one.
#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

impl ItemValue {
    fn resolve(self, present: &[u32]) -> u32 {
        match self {
            ItemValue::Index(idx) if present.is_empty() => idx as u32,
            ItemValue::Index(idx) => present[idx % present.len()],
            ItemValue::Random(v) => v,
        }
    }
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    // Kept narrow so that heaps see plenty of duplicates.
    fn random_strategy()(
        random in 0u32..64,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

// === heap ===================================================================

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum HeapOp {
    Add(ItemValue),
    Peek,
    Poll,
    Remove(ItemValue),
    Find(ItemValue),
}

pub fn heap_op_strategy() -> impl Strategy<Value = HeapOp> {
    proptest::prop_oneof![
        3 => value_strategy().prop_map(HeapOp::Add),
        1 => Just(HeapOp::Peek),
        1 => Just(HeapOp::Poll),
        1 => value_strategy().prop_map(HeapOp::Remove),
        1 => value_strategy().prop_map(HeapOp::Find),
    ]
}

/// Drives a [`MinHeap`] and a [`MaxHeap`] with `ops`, checking both against a sorted `Vec`.
pub fn run_heap_equivalence(ops: Vec<HeapOp>) {
    // Sorted ascending, duplicates kept.
    let mut sorted: Vec<u32> = Vec::with_capacity(ops.len());
    let mut min: MinHeap<u32> = MinHeap::new();
    let mut max: MaxHeap<u32> = MaxHeap::new();

    for (op_id, op) in ops.into_iter().enumerate() {
        match op {
            HeapOp::Add(item) => {
                let value = item.resolve(&sorted);
                let idx = sorted.partition_point(|&v| v <= value);
                sorted.insert(idx, value);

                min.add(value);
                max.add(value);
            }

            HeapOp::Peek => {
                assert_eq!(min.peek(), sorted.first(), "HeapOp #{op_id}: {op:?}");
                assert_eq!(max.peek(), sorted.last(), "HeapOp #{op_id}: {op:?}");
            }

            HeapOp::Poll => {
                // Both heaps must see the same contents, so poll the min heap and drop the same
                // value from the max heap by removing and re-adding the survivors.
                let expected = (!sorted.is_empty()).then(|| sorted.remove(0));
                assert_eq!(min.poll(), expected, "HeapOp #{op_id}: {op:?}");

                if let Some(value) = expected {
                    let count = max.find(&value).len();
                    max.remove(&value);
                    for _ in 1..count {
                        max.add(value);
                    }
                }
            }

            HeapOp::Remove(item) => {
                let value = item.resolve(&sorted);
                sorted.retain(|&v| v != value);

                min.remove(&value);
                max.remove(&value);

                assert!(min.find(&value).is_empty(), "HeapOp #{op_id}: {op:?}");
                assert!(max.find(&value).is_empty(), "HeapOp #{op_id}: {op:?}");
            }

            HeapOp::Find(item) => {
                let value = item.resolve(&sorted);
                let expected = sorted.iter().filter(|&&v| v == value).count();

                for (heap, found) in [
                    (min.as_slice(), min.find(&value)),
                    (max.as_slice(), max.find(&value)),
                ] {
                    assert_eq!(found.len(), expected, "HeapOp #{op_id}: {op:?}");
                    assert!(found.windows(2).all(|w| w[0] < w[1]));
                    assert!(found.iter().all(|&idx| heap[idx] == value));
                }
            }
        }

        min.assert_invariants();
        max.assert_invariants();

        for heap in [min.as_slice(), max.as_slice()] {
            let mut contents = heap.to_vec();
            contents.sort_unstable();
            assert_eq!(contents, sorted, "after HeapOp #{op_id}: {op:?}");
        }
    }

    // Draining must produce the model in order.
    let mut drained = Vec::with_capacity(sorted.len());
    while let Some(value) = min.poll() {
        min.assert_invariants();
        drained.push(value);
    }
    assert_eq!(drained, sorted);
}

// === avl ====================================================================

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum TreeOp {
    Insert(ItemValue),
    Get(ItemValue),
    Remove(ItemValue),
    First,
    Last,
}

pub fn tree_op_strategy() -> impl Strategy<Value = TreeOp> {
    proptest::prop_oneof![
        3 => value_strategy().prop_map(TreeOp::Insert),
        1 => value_strategy().prop_map(TreeOp::Get),
        1 => value_strategy().prop_map(TreeOp::Remove),
        1 => Just(TreeOp::First),
        1 => Just(TreeOp::Last),
    ]
}

/// Drives an [`AvlTree`] with `ops`, checking it against a [`BTreeSet`].
pub fn run_avl_equivalence(ops: Vec<TreeOp>) {
    let mut btree = BTreeSet::new();
    let mut avl: AvlTree<TestNode> = AvlTree::new();

    #[inline]
    fn ref_key(node: core::pin::Pin<&TestNode>) -> &u32 {
        &node.get_ref().key
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let present = btree.iter().copied().collect::<Vec<_>>();

        match op {
            TreeOp::Insert(item) => {
                let value = item.resolve(&present);

                let from_btree = !btree.insert(value);
                let from_avl = match avl.insert(TestNode::new(value)) {
                    Ok(node) => {
                        assert_eq!(node.key, value, "TreeOp #{op_id}: {op:?}");
                        false
                    }
                    Err(rejected) => {
                        assert_eq!(rejected.key, value, "TreeOp #{op_id}: {op:?}");
                        true
                    }
                };

                assert_eq!(from_btree, from_avl, "TreeOp #{op_id}: {op:?}");
            }

            TreeOp::Get(item) => {
                let value = item.resolve(&present);

                let from_btree = btree.get(&value);
                let from_avl = avl.get(&value).map(ref_key);

                assert_eq!(from_btree, from_avl, "TreeOp #{op_id}: {op:?}");
            }

            TreeOp::Remove(item) => {
                let value = item.resolve(&present);

                let err = avl.remove(&value).expect_err("AVL removal always fails");
                assert_eq!(
                    err,
                    Error::RemoveUnsupported {
                        value: value.to_string()
                    }
                );
            }

            TreeOp::First => {
                let from_btree = btree.first();
                let from_avl = avl.first().map(ref_key);

                assert_eq!(from_btree, from_avl, "TreeOp #{op_id}: {op:?}");
            }

            TreeOp::Last => {
                let from_btree = btree.last();
                let from_avl = avl.last().map(ref_key);

                assert_eq!(from_btree, from_avl, "TreeOp #{op_id}: {op:?}");
            }
        }

        avl.assert_invariants();
        assert_eq!(btree.len(), avl.len());
        assert!(btree.iter().zip(avl.iter()).all(|(&a, b)| a == b.key));
        assert!(avl.height() <= max_avl_height(avl.len()));
    }
}

// The tallest an AVL tree of `len` nodes may be: the smallest `h` whose minimal AVL tree
// (N(h) = N(h - 1) + N(h - 2) + 1) holds more than `len` nodes, minus one.
fn max_avl_height(len: usize) -> usize {
    let (mut smaller, mut min_nodes) = (0usize, 1usize);
    let mut height = 1;

    while min_nodes <= len {
        (smaller, min_nodes) = (min_nodes, min_nodes + smaller + 1);
        height += 1;
    }

    height - 1
}
