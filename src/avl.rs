//! A height-balanced binary search tree.
//!
//! Insertion first links the new node in as a leaf, exactly like the unbalanced
//! [`BinarySearchTree`]. It then walks from the new node up to the root, and every node whose
//! balance factor has left `{-1, 0, 1}` is repaired with one of four rotations:
//!
//! ```text
//!   LeftLeft (mirror: RightRight)         LeftRight (mirror: RightLeft)
//!
//!         z                y                  z                 z                y
//!        / \             /   \               / \               / \             /   \
//!       y   D           x     z             x   D             y   D           x     z
//!      / \      ==>    / \   / \           / \       ==>     / \      ==>    / \   / \
//!     x   C           A   B C   D         A   y             x   C           A   B C   D
//!    / \                                     / \           / \
//!   A   B                                   B   C         A   B
//! ```
//!
//! A double rotation first turns the inner grandchild into the outer one, and then performs the
//! corresponding single rotation.

use core::{fmt, pin::Pin, ptr::NonNull};

use crate::{
    bst::{balance_factor, BinarySearchTree},
    comparator::{Compare, Natural},
    error::Error,
    iter::Iter,
    Dir, Links, TreeNode,
};

/// The rotation used to rebalance a node.
///
/// The first direction names the heavy child of the unbalanced node and the second names the heavy
/// child of that child.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Rotation {
    LeftLeft,
    LeftRight,
    RightRight,
    RightLeft,
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rotation::LeftLeft => "left-left",
            Rotation::LeftRight => "left-right",
            Rotation::RightRight => "right-right",
            Rotation::RightLeft => "right-left",
        })
    }
}

/// An intrusive AVL tree.
///
/// After every insertion the heights of the two subtrees of any node differ by at most one, so a
/// tree of `n` nodes is never taller than about `1.44 * log2(n + 2)` levels.
///
/// Removal is not supported; see [`AvlTree::remove`].
pub struct AvlTree<T, C = Natural>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    tree: BinarySearchTree<T, C>,
}

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
    T::Key: Ord,
{
    /// Returns a new empty tree ordered by the keys' natural order.
    pub const fn new() -> AvlTree<T> {
        AvlTree {
            tree: BinarySearchTree::new(),
        }
    }
}

impl<T, C> AvlTree<T, C>
where
    T: TreeNode<Links<T>> + ?Sized,
    C: Compare<T::Key>,
{
    /// Returns a new empty tree ordered by `compare`.
    pub const fn with_comparator(compare: C) -> AvlTree<T, C> {
        AvlTree {
            tree: BinarySearchTree::with_comparator(compare),
        }
    }

    /// Returns the comparator used to order the tree.
    pub fn comparator(&self) -> &C {
        self.tree.comparator()
    }

    /// Returns `true` if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns the number of levels in the tree.
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Returns an iterator over the elements of the tree in ascending key order.
    pub fn iter(&self) -> Iter<'_, T> {
        self.tree.iter()
    }

    /// Returns a reference to the node whose key is equal to `key`.
    pub fn get(&self, key: &T::Key) -> Option<Pin<&T>> {
        self.tree.get(key)
    }

    /// Returns `true` if the tree contains a node whose key is equal to `key`.
    pub fn contains(&self, key: &T::Key) -> bool {
        self.tree.contains(key)
    }

    /// Returns the minimum element of the tree.
    pub fn first(&self) -> Option<Pin<&T>> {
        self.tree.first()
    }

    /// Returns the maximum element of the tree.
    pub fn last(&self) -> Option<Pin<&T>> {
        self.tree.last()
    }

    /// Clears the tree, dropping all elements.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the underlying binary search tree.
    pub fn as_bst(&self) -> &BinarySearchTree<T, C> {
        &self.tree
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        self.tree.check_invariants(true);
    }

    /// Inserts an item into the tree, rebalancing as needed, and returns a reference to it.
    ///
    /// If the tree already holds an item with an equal key, the tree is left unchanged and `item`
    /// is handed back in the `Err` variant.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, item: T::Handle) -> Result<Pin<&T>, T::Handle> {
        let ptr = T::into_ptr(item);

        if let Err(ptr) = self.tree.insert_raw(ptr) {
            return Err(unsafe { T::from_ptr(ptr) });
        }

        // Walk up to the root, rebalancing along the way. After a rotation at `cur`, its parent is
        // the node that took its place, so the walk continues from the top of the rotated
        // subtree.
        let mut opt_cur = Some(ptr);
        while let Some(cur) = opt_cur {
            unsafe {
                self.tree.update_height(cur);
                self.balance(cur);
                opt_cur = T::links(cur).as_ref().parent();
            }
        }

        Ok(unsafe { Pin::new_unchecked(ptr.as_ref()) })
    }

    /// Removal is not supported by this tree.
    ///
    /// Rebalancing after a removal needs cases that this tree does not implement, so rather than
    /// leaving the tree unbalanced this always fails with [`Error::RemoveUnsupported`], naming
    /// `key`. This holds even when the tree is empty or does not contain `key`.
    pub fn remove(&mut self, key: &T::Key) -> Result<T::Handle, Error> {
        Err(Error::remove_unsupported(key))
    }

    // Rebalances `node` if its balance factor is outside {-1, 0, 1}, returning the rotation used.
    //
    // The heights of `node`'s children must be up to date.
    unsafe fn balance(&mut self, node: NonNull<T>) -> Option<Rotation> {
        let rotation = unsafe {
            let links = T::links(node).as_ref();
            let factor = balance_factor(node);

            if factor > 1 {
                let left = links.left().expect("left-heavy node must have a left child");

                match balance_factor(left) {
                    f if f > 0 => Rotation::LeftLeft,
                    f if f < 0 => Rotation::LeftRight,
                    _ => return None,
                }
            } else if factor < -1 {
                let right = links.right().expect("right-heavy node must have a right child");

                match balance_factor(right) {
                    f if f < 0 => Rotation::RightRight,
                    f if f > 0 => Rotation::RightLeft,
                    _ => return None,
                }
            } else {
                return None;
            }
        };

        log::trace!("{rotation} rotation at {:?}", unsafe { node.as_ref().key() });

        unsafe {
            match rotation {
                Rotation::LeftLeft => self.rotate_left_left(node),
                Rotation::LeftRight => self.rotate_left_right(node),
                Rotation::RightRight => self.rotate_right_right(node),
                Rotation::RightLeft => self.rotate_right_left(node),
            }
        }

        Some(rotation)
    }

    #[inline]
    unsafe fn rotate_left_left(&mut self, root: NonNull<T>) {
        unsafe { self.rotate_single(root, Dir::Left) }
    }

    #[inline]
    unsafe fn rotate_left_right(&mut self, root: NonNull<T>) {
        unsafe { self.rotate_double(root, Dir::Left) }
    }

    #[inline]
    unsafe fn rotate_right_right(&mut self, root: NonNull<T>) {
        unsafe { self.rotate_single(root, Dir::Right) }
    }

    #[inline]
    unsafe fn rotate_right_left(&mut self, root: NonNull<T>) {
        unsafe { self.rotate_double(root, Dir::Right) }
    }

    // Lifts the `heavy` child of `root` into `root`'s place, moving `root` down to the other side.
    //
    // The heights of `root` and the lifted child are recomputed. Ancestors are left to the caller.
    unsafe fn rotate_single(&mut self, root: NonNull<T>, heavy: Dir) {
        unsafe {
            let pivot = T::links(root)
                .as_ref()
                .child(heavy)
                .expect("rotated node must have a heavy child");
            let parent = T::links(root).as_ref().parent();

            // `pivot` takes `root`'s place under its former parent, or becomes the tree root.
            self.tree.replace_child_or_set_root(parent, root, Some(pivot));

            // The subtree between `pivot` and `root` moves across to `root`.
            let across = T::links(pivot).as_ref().child(!heavy);
            self.tree.set_child(root, heavy, across);

            self.tree.set_child(pivot, !heavy, Some(root));

            self.tree.update_height(root);
            self.tree.update_height(pivot);
        }
    }

    // Lifts the inner grandchild on the `heavy` side of `root` into `root`'s place.
    unsafe fn rotate_double(&mut self, root: NonNull<T>, heavy: Dir) {
        unsafe {
            let pivot = T::links(root)
                .as_ref()
                .child(heavy)
                .expect("rotated node must have a heavy child");
            let inner = T::links(pivot)
                .as_ref()
                .child(!heavy)
                .expect("inner-heavy child must have an inner child");

            // Preserve the outer subtree of `inner` by handing it to `pivot`.
            let moved = T::links(inner).as_ref().child(heavy);
            self.tree.set_child(pivot, !heavy, moved);

            // Swap `pivot` and `inner` so that `inner` becomes the heavy child of `root`.
            self.tree.set_child(inner, heavy, Some(pivot));
            self.tree.set_child(root, heavy, Some(inner));

            self.tree.update_height(pivot);
            self.tree.update_height(inner);

            self.rotate_single(root, heavy);
        }
    }
}

impl<T, C> fmt::Debug for AvlTree<T, C>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.tree, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TestNode;

    fn keys<C: Compare<u32>>(tree: &AvlTree<TestNode, C>) -> Vec<u32> {
        tree.iter().map(|node| node.key).collect()
    }

    fn root_key<C: Compare<u32>>(tree: &AvlTree<TestNode, C>) -> Option<u32> {
        tree.tree.root.map(|root| unsafe { root.as_ref().key })
    }

    fn insert_all(keys: &[u32]) -> AvlTree<TestNode> {
        let mut tree: AvlTree<TestNode> = AvlTree::new();

        for (count, &key) in keys.iter().enumerate() {
            assert!(tree.insert(TestNode::new(key)).is_ok());
            tree.assert_invariants();
            assert_eq!(tree.len(), count + 1);
        }

        tree
    }

    fn insert_find_all(keys: &[u32]) {
        let tree = insert_all(keys);

        for key in keys {
            let node = tree.get(key).expect("item not found");
            assert_eq!(node.key, *key);
        }
    }

    #[test]
    fn zero_elems_find() {
        insert_find_all(&[]);
    }

    #[test]
    fn single_elem_find() {
        insert_find_all(&[0]);
    }

    #[test]
    fn three_elems_find() {
        insert_find_all(&[0, 1, 2]);
        insert_find_all(&[0, 2, 1]);
        insert_find_all(&[1, 0, 2]);
        insert_find_all(&[1, 2, 0]);
        insert_find_all(&[2, 0, 1]);
        insert_find_all(&[2, 1, 0]);
    }

    #[test]
    fn left_left_rotation() {
        let mut tree: AvlTree<TestNode> = AvlTree::new();
        tree.insert(TestNode::new(3)).unwrap();
        tree.insert(TestNode::new(2)).unwrap();

        let root = tree.tree.root.unwrap();
        assert_eq!(unsafe { balance_factor(root) }, 1);

        tree.insert(TestNode::new(1)).unwrap();
        tree.assert_invariants();

        assert_eq!(root_key(&tree), Some(2));
        assert_eq!(keys(&tree), vec![1, 2, 3]);
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn left_right_rotation() {
        let tree = insert_all(&[30, 20, 25]);

        assert_eq!(root_key(&tree), Some(25));
        assert_eq!(keys(&tree), vec![20, 25, 30]);
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn right_right_rotation() {
        let tree = insert_all(&[1, 2, 3]);

        assert_eq!(root_key(&tree), Some(2));
        assert_eq!(keys(&tree), vec![1, 2, 3]);
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn right_left_rotation() {
        let tree = insert_all(&[30, 40, 35]);

        assert_eq!(root_key(&tree), Some(35));
        assert_eq!(keys(&tree), vec![30, 35, 40]);
        assert_eq!(tree.height(), 2);
    }

    // The double rotations must keep the inner grandchild's own subtrees.
    #[test]
    fn left_right_rotation_moves_subtrees() {
        let tree = insert_all(&[50, 20, 60, 10, 30, 25, 35, 5, 27]);

        assert_eq!(keys(&tree), vec![5, 10, 20, 25, 27, 30, 35, 50, 60]);
        assert_eq!(tree.len(), 9);
    }

    #[test]
    fn right_left_rotation_moves_subtrees() {
        let tree = insert_all(&[20, 10, 50, 40, 60, 35, 45, 70, 43]);

        assert_eq!(keys(&tree), vec![10, 20, 35, 40, 43, 45, 50, 60, 70]);
        assert_eq!(tree.len(), 9);
    }

    #[test]
    fn rotation_below_root_keeps_parent_side() {
        // The right-right rotation at 30 happens in the right subtree of 20.
        let tree = insert_all(&[20, 10, 30, 5, 40, 50]);

        assert_eq!(keys(&tree), vec![5, 10, 20, 30, 40, 50]);
        assert_eq!(root_key(&tree), Some(20));
    }

    #[test]
    fn mixed_insertions_stay_shallow() {
        let tree = insert_all(&[10, 20, 30, 40, 50, 25]);

        assert_eq!(root_key(&tree), Some(30));
        assert_eq!(keys(&tree), vec![10, 20, 25, 30, 40, 50]);
        assert!(tree.height() <= 4);
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn sorted_insertions_stay_balanced() {
        let keys = (0..1000).collect::<Vec<_>>();
        let tree = insert_all(&keys);

        // A perfectly balanced tree of 1000 nodes has 10 levels; an AVL tree is at most ~44%
        // taller.
        assert!(tree.height() <= 14, "height {}", tree.height());
        assert_eq!(tree.first().map(|n| n.key), Some(0));
        assert_eq!(tree.last().map(|n| n.key), Some(999));
    }

    #[test]
    fn duplicate_leaves_tree_unchanged() {
        let mut tree = insert_all(&[4, 2, 6]);

        let rejected = tree.insert(TestNode::new(2)).expect_err("key is a duplicate");
        assert_eq!(rejected.key, 2);
        assert_eq!(tree.len(), 3);
        tree.assert_invariants();
    }

    #[test]
    fn remove_always_fails() {
        let mut empty: AvlTree<TestNode> = AvlTree::new();
        assert_eq!(
            empty.remove(&7).unwrap_err(),
            Error::RemoveUnsupported {
                value: "7".to_string()
            }
        );

        let mut tree = insert_all(&[1, 2, 3]);
        for key in [1, 2, 3, 4] {
            let err = tree.remove(&key).unwrap_err();
            assert!(err.to_string().contains(&key.to_string()));
        }

        assert_eq!(tree.len(), 3);
        tree.assert_invariants();
    }

    #[test]
    fn reversed_comparator() {
        let mut tree: AvlTree<TestNode, _> = AvlTree::with_comparator(crate::Reversed(Natural));

        for key in 0..10 {
            tree.insert(TestNode::new(key)).unwrap();
            tree.assert_invariants();
        }

        assert_eq!(keys(&tree), (0..10).rev().collect::<Vec<_>>());
    }
}
