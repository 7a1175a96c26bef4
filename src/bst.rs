//! An unbalanced binary search tree over intrusive nodes.
//!
//! This is the base on which [`AvlTree`](crate::AvlTree) is built. It handles ordered leaf
//! insertion and lookup, keeps the parent and child links consistent, and caches the height of
//! every node so that balance factors can be read in constant time.

use core::{cmp::Ordering, fmt, pin::Pin, ptr::NonNull};

use cordyceps::Linked;

use crate::{
    comparator::{Compare, Natural},
    iter::Iter,
    Dir, Link, Links, TreeNode,
};

/// An intrusive binary search tree with no balancing.
///
/// Inserting keys in sorted order degrades this tree into a list. Use
/// [`AvlTree`](crate::AvlTree) when the insertion order is not known to be random.
pub struct BinarySearchTree<T, C = Natural>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    pub(crate) root: Link<T>,
    len: usize,
    compare: C,
}

impl<T> BinarySearchTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
    T::Key: Ord,
{
    /// Returns a new empty tree ordered by the keys' natural order.
    pub const fn new() -> BinarySearchTree<T> {
        BinarySearchTree {
            root: None,
            len: 0,
            compare: Natural,
        }
    }
}

impl<T, C> BinarySearchTree<T, C>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns the comparator used to order the tree.
    pub fn comparator(&self) -> &C {
        &self.compare
    }

    /// Returns `true` if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            assert_eq!(empty, self.root.is_none());
        }

        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of levels in the tree.
    ///
    /// An empty tree has height 0 and a tree holding a single element has height 1.
    pub fn height(&self) -> usize {
        edge_height(self.root)
    }

    /// Returns an iterator over the elements of the tree in ascending key order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.root, self.len)
    }

    /// Returns the minimum element of the tree.
    pub fn first(&self) -> Option<Pin<&T>> {
        self.extreme(Dir::Left)
    }

    /// Returns the maximum element of the tree.
    pub fn last(&self) -> Option<Pin<&T>> {
        self.extreme(Dir::Right)
    }

    fn extreme(&self, dir: Dir) -> Option<Pin<&T>> {
        let mut cur = self.root?;

        unsafe {
            while let Some(next) = T::links(cur).as_ref().child(dir) {
                cur = next;
            }

            Some(Pin::new_unchecked(cur.as_ref()))
        }
    }

    /// Clears the tree, dropping all elements.
    pub fn clear(&mut self) {
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            unsafe {
                // Descend to the minimum node.
                let (cur, parent) = self.min_in_subtree(cur);
                let parent = parent.or_else(|| T::links(cur).as_ref().parent());

                let right = T::links(cur).as_ref().right();

                // Elevate the node's right child (which may be None).
                self.replace_child_or_set_root(parent, cur, right);

                // Drop the node.
                T::links(cur).as_mut().clear();
                drop(T::from_ptr(cur));
                self.len -= 1;

                // If the node had no right child, climb to the parent. If the node had no parent,
                // the tree is empty.
                opt_cur = right.or(parent);
            }
        }

        debug_assert!(self.root.is_none());
        debug_assert_eq!(self.len(), 0);
    }

    // Support methods ========================================================

    // Returns the minimum node in the subtree.
    //
    // If the subtree root is not the minimum, also returns the minimum node's parent.
    #[inline]
    unsafe fn min_in_subtree(&self, root: NonNull<T>) -> (NonNull<T>, Option<NonNull<T>>) {
        let mut parent = None;
        let mut cur = root;

        while let Some(left) = unsafe { T::links(cur).as_ref().left() } {
            parent = Some(cur);
            cur = left;
        }

        (cur, parent)
    }

    // Makes `child` the `dir` child of `node`, pointing `child`'s parent link back at `node`.
    //
    // The previous `dir` child of `node` is overwritten, not unlinked.
    #[inline]
    pub(crate) unsafe fn set_child(&mut self, node: NonNull<T>, dir: Dir, child: Link<T>) {
        unsafe {
            T::links(node).as_mut().set_child(dir, child);

            if let Some(child) = child {
                T::links(child).as_mut().set_parent(Some(node));
            }
        }
    }

    // Puts `new_child` where `old_child` was: under `parent`, or at the root if `parent` is
    // `None`.
    //
    // # Safety
    //
    // `old_child` must be a child of `parent`, or the root if `parent` is `None`.
    #[inline]
    pub(crate) unsafe fn replace_child_or_set_root(
        &mut self,
        parent: Link<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        unsafe {
            match parent {
                Some(parent) => {
                    let dir = which_child(parent, old_child);
                    self.set_child(parent, dir, new_child);
                }
                None => {
                    debug_assert_eq!(self.root, Some(old_child));
                    self.root = new_child;

                    if let Some(new_child) = new_child {
                        T::links(new_child).as_mut().set_parent(None);
                    }
                }
            }
        }
    }

    // Recomputes the cached height of `node` from its children, returning whether it changed.
    #[inline]
    pub(crate) unsafe fn update_height(&mut self, node: NonNull<T>) -> bool {
        unsafe {
            let links = T::links(node).as_mut();
            let height = edge_height(links.left()).max(edge_height(links.right()));

            if links.height() == height {
                return false;
            }

            links.set_height(height);
            true
        }
    }
}

impl<T, C> BinarySearchTree<T, C>
where
    T: TreeNode<Links<T>> + ?Sized,
    C: Compare<T::Key>,
{
    /// Returns a new empty tree ordered by `compare`.
    pub const fn with_comparator(compare: C) -> BinarySearchTree<T, C> {
        BinarySearchTree {
            root: None,
            len: 0,
            compare,
        }
    }

    /// Returns a reference to the node whose key is equal to `key`.
    pub fn get(&self, key: &T::Key) -> Option<Pin<&T>> {
        let ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_ref())) }
    }

    /// Returns `true` if the tree contains a node whose key is equal to `key`.
    pub fn contains(&self, key: &T::Key) -> bool {
        self.get_raw(key).is_some()
    }

    pub(crate) fn get_raw(&self, key: &T::Key) -> Link<T> {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;

            unsafe {
                match self.compare.compare(key, cur.as_ref().key()) {
                    Ordering::Less => opt_cur = T::links(cur).as_ref().left(),
                    Ordering::Equal => return Some(cur),
                    Ordering::Greater => opt_cur = T::links(cur).as_ref().right(),
                }
            }
        }
    }

    /// Inserts an item into the tree and returns a reference to it.
    ///
    /// If the tree already holds an item with an equal key, the tree is left unchanged and `item`
    /// is handed back in the `Err` variant.
    ///
    /// This operation completes in _O(h)_ time, where _h_ is the height of the tree.
    pub fn insert(&mut self, item: T::Handle) -> Result<Pin<&T>, T::Handle> {
        let ptr = T::into_ptr(item);

        match self.insert_raw(ptr) {
            Ok(()) => Ok(unsafe { Pin::new_unchecked(ptr.as_ref()) }),
            Err(ptr) => Err(unsafe { T::from_ptr(ptr) }),
        }
    }

    // Links `ptr` in as a new leaf and refreshes the heights of its ancestors.
    //
    // Returns `ptr` unchanged if a node with an equal key is already linked.
    pub(crate) fn insert_raw(&mut self, ptr: NonNull<T>) -> Result<(), NonNull<T>> {
        unsafe { T::links(ptr).as_mut().clear() };

        let Some(root) = self.root else {
            // Tree is empty. Set `ptr` as the root and return.
            self.root = Some(ptr);
            self.len += 1;
            return Ok(());
        };

        let mut parent = root;

        // Descend the tree, looking for a vacant child slot.
        loop {
            let ordering = unsafe { self.compare.compare(ptr.as_ref().key(), parent.as_ref().key()) };

            let dir = match ordering {
                Ordering::Less => Dir::Left,
                Ordering::Greater => Dir::Right,
                Ordering::Equal => {
                    let key = unsafe { ptr.as_ref().key() };
                    log::trace!("rejecting duplicate key {key:?}");
                    return Err(ptr);
                }
            };

            match unsafe { T::links(parent).as_ref().child(dir) } {
                Some(child) => parent = child,
                None => {
                    unsafe { self.set_child(parent, dir, Some(ptr)) };
                    break;
                }
            }
        }

        self.len += 1;

        // Ascend, stopping at the first ancestor whose height did not change.
        let mut opt_cur = Some(parent);
        while let Some(cur) = opt_cur {
            unsafe {
                if !self.update_height(cur) {
                    break;
                }

                opt_cur = T::links(cur).as_ref().parent();
            }
        }

        Ok(())
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        self.check_invariants(false);
    }

    // Checks link consistency, key order, cached heights and the element count. If `balanced` is
    // set, additionally checks that every balance factor is in {-1, 0, 1}.
    pub(crate) fn check_invariants(&self, balanced: bool) {
        let mut count = 0;

        if let Some(root) = self.root {
            unsafe {
                assert_eq!(T::links(root).as_ref().parent(), None, "root has a parent");
                self.assert_invariants_at(root, None, None, balanced, &mut count);
            }
        }

        assert_eq!(count, self.len, "node count does not match tree length");
    }

    unsafe fn assert_invariants_at(
        &self,
        node: NonNull<T>,
        lower: Link<T>,
        upper: Link<T>,
        balanced: bool,
        count: &mut usize,
    ) {
        *count += 1;

        unsafe {
            let key = node.as_ref().key();

            if let Some(lower) = lower {
                let lower_key = lower.as_ref().key();
                assert!(
                    self.compare.greater_than(key, lower_key),
                    "{key:?} is in the right subtree of {lower_key:?}"
                );
            }

            if let Some(upper) = upper {
                let upper_key = upper.as_ref().key();
                assert!(
                    self.compare.less_than(key, upper_key),
                    "{key:?} is in the left subtree of {upper_key:?}"
                );
            }

            let links = T::links(node).as_ref();

            for dir in [Dir::Left, Dir::Right] {
                if let Some(child) = links.child(dir) {
                    // Ensure child's parent link points to this node.
                    let parent = T::links(child)
                        .as_ref()
                        .parent()
                        .expect("child parent pointer not set");
                    assert_eq!(node, parent);

                    let (lower, upper) = match dir {
                        Dir::Left => (lower, Some(node)),
                        Dir::Right => (Some(node), upper),
                    };
                    self.assert_invariants_at(child, lower, upper, balanced, count);
                }
            }

            let expected_height = edge_height(links.left()).max(edge_height(links.right()));
            assert_eq!(
                links.height(),
                expected_height,
                "stale height cached at {key:?}"
            );

            if balanced {
                let factor = balance_factor(node);
                assert!(
                    (-1..=1).contains(&factor),
                    "{key:?} has balance factor {factor}"
                );
            }
        }
    }
}

impl<T, C> Drop for BinarySearchTree<T, C>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, C> fmt::Debug for BinarySearchTree<T, C>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.iter().map(|node| node.key()))
            .finish()
    }
}

// Returns which child of `parent` the node `child` is.
//
// # Safety
//
// `child` must be a child of `parent`.
#[inline]
pub(crate) unsafe fn which_child<T>(parent: NonNull<T>, child: NonNull<T>) -> Dir
where
    T: Linked<Links<T>> + ?Sized,
{
    if unsafe { T::links(parent).as_ref().left() } == Some(child) {
        Dir::Left
    } else {
        Dir::Right
    }
}

// Returns the number of levels in the subtree rooted at `link`: 0 for a missing child, otherwise
// one more than the node's height.
#[inline]
pub(crate) fn edge_height<T>(link: Link<T>) -> usize
where
    T: Linked<Links<T>> + ?Sized,
{
    link.map_or(0, |node| unsafe { T::links(node).as_ref().height() } + 1)
}

// Returns `h(left) - h(right)` for `node`. Positive means left-heavy.
#[inline]
pub(crate) unsafe fn balance_factor<T>(node: NonNull<T>) -> isize
where
    T: Linked<Links<T>> + ?Sized,
{
    let links = unsafe { T::links(node).as_ref() };
    edge_height(links.left()) as isize - edge_height(links.right()) as isize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TestNode;

    fn keys<C: Compare<u32>>(tree: &BinarySearchTree<TestNode, C>) -> Vec<u32> {
        tree.iter().map(|node| node.key).collect()
    }

    #[test]
    fn empty_tree() {
        let tree: BinarySearchTree<TestNode> = BinarySearchTree::new();

        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert!(tree.first().is_none());
        assert!(tree.last().is_none());
        assert!(!tree.contains(&1));
        tree.assert_invariants();
    }

    #[test]
    fn insert_orders_keys() {
        let mut tree: BinarySearchTree<TestNode> = BinarySearchTree::new();

        for key in [8, 3, 10, 1, 6, 14, 4, 7, 13] {
            let node = tree.insert(TestNode::new(key)).expect("key is unique");
            assert_eq!(node.key, key);
            tree.assert_invariants();
        }

        assert_eq!(keys(&tree), vec![1, 3, 4, 6, 7, 8, 10, 13, 14]);
        assert_eq!(tree.first().map(|n| n.key), Some(1));
        assert_eq!(tree.last().map(|n| n.key), Some(14));
        assert_eq!(tree.height(), 4);
        assert!(tree.contains(&6));
        assert!(!tree.contains(&5));
    }

    #[test]
    fn duplicate_is_returned() {
        let mut tree: BinarySearchTree<TestNode> = BinarySearchTree::new();

        assert!(tree.insert(TestNode::new(2)).is_ok());
        let rejected = tree.insert(TestNode::new(2)).expect_err("key is a duplicate");

        assert_eq!(rejected.key, 2);
        assert_eq!(tree.len(), 1);
        tree.assert_invariants();
    }

    #[test]
    fn sorted_input_degenerates() {
        let mut tree: BinarySearchTree<TestNode> = BinarySearchTree::new();

        for key in 0..32 {
            assert!(tree.insert(TestNode::new(key)).is_ok());
        }

        tree.assert_invariants();
        assert_eq!(tree.height(), 32);
        assert_eq!(unsafe { balance_factor(tree.root.unwrap()) }, -31);
    }

    #[test]
    fn custom_comparator() {
        let mut tree: BinarySearchTree<TestNode, _> =
            BinarySearchTree::with_comparator(crate::Reversed(Natural));

        for key in [2, 9, 4] {
            assert!(tree.insert(TestNode::new(key)).is_ok());
        }

        tree.assert_invariants();
        assert_eq!(keys(&tree), vec![9, 4, 2]);
    }

    #[test]
    fn clear_then_reuse() {
        let mut tree: BinarySearchTree<TestNode> = BinarySearchTree::new();

        for key in [5, 2, 8, 1, 3, 9] {
            assert!(tree.insert(TestNode::new(key)).is_ok());
        }

        tree.clear();
        assert!(tree.is_empty());
        tree.assert_invariants();

        assert!(tree.insert(TestNode::new(4)).is_ok());
        assert_eq!(keys(&tree), vec![4]);
    }
}
