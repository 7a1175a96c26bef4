use std::ptr::NonNull;

use cordyceps::Linked;
use ordered_containers::{AvlTree, Links, MaxHeap, MinHeap, TreeNode};

#[derive(Debug)]
#[repr(C)]
struct TestNode {
    links: Links<TestNode>,
    key: u32,
}

impl TestNode {
    fn new(key: u32) -> Box<TestNode> {
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

fn main() {
    let mut min: MinHeap<u32> = MinHeap::new();
    min.add(5).add(3).add(10).add(1).add(1).add(7);
    println!("min heap: {min}");

    min.remove(&1);
    println!("min heap without 1: {min}");
    assert_eq!(min.peek(), Some(&3));

    let mut max: MaxHeap<u32> = [5, 3, 10, 1, 1, 7].into_iter().collect();
    println!("max heap: {max}");
    println!("indices of 1: {:?}", max.find(&1));
    assert_eq!(max.poll(), Some(10));
    max.assert_invariants();

    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for key in [10, 20, 30, 40, 50, 25] {
        tree.insert(TestNode::new(key)).expect("keys are unique");
        tree.assert_invariants();
        println!("{:?}", tree.iter().map(|node| node.key).collect::<Vec<_>>());
    }

    println!("height: {}", tree.height());

    if let Err(err) = tree.remove(&25) {
        println!("{err}");
    }

    let mut dot = String::new();
    tree.dotgraph("avl", &mut dot).expect("writing to a String can't fail");
    println!("{dot}");

    drop(tree);
}
