extern crate alloc;

use alloc::boxed::Box;
use core::{fmt, marker::PhantomPinned, ptr::NonNull};

use cordyceps::Linked;

use crate::{
    comparator::{Compare, Natural},
    error::Error,
    AvlTree, Links, TreeNode,
};

/// An ordered set based on an [AVL tree].
///
/// ```
/// use ordered_containers::AvlSet;
///
/// let mut set: AvlSet<u32> = [10, 20, 30, 40, 50, 25].into_iter().collect();
///
/// assert!(set.contains(&25));
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [10, 20, 25, 30, 40, 50]);
/// assert!(set.remove(&25).is_err());
/// ```
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
pub struct AvlSet<V: fmt::Debug, C = Natural> {
    tree: AvlTree<SetNode<V>, C>,
}

struct SetNode<V> {
    links: Links<SetNode<V>>,
    value: V,
    _unpin: PhantomPinned,
}

unsafe impl<V> Linked<Links<SetNode<V>>> for SetNode<V> {
    type Handle = Box<Self>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        Box::leak(r).into()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<SetNode<V>>> {
        let ptr = ptr.as_ptr();
        unsafe { NonNull::new_unchecked(core::ptr::addr_of_mut!((*ptr).links)) }
    }
}

impl<V: fmt::Debug> TreeNode<Links<SetNode<V>>> for SetNode<V> {
    type Key = V;

    fn key(&self) -> &Self::Key {
        &self.value
    }
}

impl<V: fmt::Debug> SetNode<V> {
    fn boxed(value: V) -> Box<Self> {
        Box::new(SetNode {
            links: Links::new(),
            value,
            _unpin: PhantomPinned,
        })
    }
}

impl<V: fmt::Debug + Ord> AvlSet<V> {
    /// Creates a new, empty `AvlSet` ordered by `V`'s natural order.
    pub const fn new() -> Self {
        Self {
            tree: AvlTree::new(),
        }
    }
}

impl<V: fmt::Debug, C: Compare<V>> AvlSet<V, C> {
    /// Creates a new, empty `AvlSet` ordered by `compare`.
    pub const fn with_comparator(compare: C) -> Self {
        Self {
            tree: AvlTree::with_comparator(compare),
        }
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the set.
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns the number of levels in the underlying tree.
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Returns `true` if the set contains `value`.
    #[inline]
    pub fn contains(&self, value: &V) -> bool {
        self.tree.contains(value)
    }

    /// Returns the minimum element of the set.
    #[inline]
    pub fn first(&self) -> Option<&V> {
        self.tree.first().map(|node| &node.get_ref().value)
    }

    /// Returns the maximum element of the set.
    #[inline]
    pub fn last(&self) -> Option<&V> {
        self.tree.last().map(|node| &node.get_ref().value)
    }

    /// Returns an iterator over the elements of the set in ascending order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &V> + '_ {
        self.tree.iter().map(|node| &node.value)
    }

    /// Adds `value` to the set.
    ///
    /// Returns `false`, and drops `value`, if an equal element was already present.
    pub fn insert(&mut self, value: V) -> bool {
        self.tree.insert(SetNode::boxed(value)).is_ok()
    }

    /// Removal is not supported; this always returns [`Error::RemoveUnsupported`].
    #[inline]
    pub fn remove(&mut self, value: &V) -> Result<V, Error> {
        self.tree.remove(value).map(|node| {
            let SetNode { value, .. } = *node;
            value
        })
    }

    /// Clears the set, removing all elements.
    #[inline]
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        self.tree.assert_invariants();
    }
}

impl<V: fmt::Debug, C: Compare<V> + Default> Default for AvlSet<V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<V: fmt::Debug, C: Compare<V>> Extend<V> for AvlSet<V, C> {
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<V: fmt::Debug, C: Compare<V> + Default> FromIterator<V> for AvlSet<V, C> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<V: fmt::Debug, C: Compare<V>> fmt::Debug for AvlSet<V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::Reversed;

    #[test]
    fn insert_and_iterate() {
        let mut set = AvlSet::new();

        for (count, value) in [10, 20, 30, 40, 50, 25].into_iter().enumerate() {
            assert!(set.insert(value));
            set.assert_invariants();
            assert_eq!(set.len(), count + 1);
        }

        assert_eq!(set.iter().copied().collect::<Vec<_>>(), [10, 20, 25, 30, 40, 50]);
        assert_eq!(set.iter().len(), 6);
        assert_eq!(set.first(), Some(&10));
        assert_eq!(set.last(), Some(&50));
        assert_eq!(set.height(), 3);
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut set: AvlSet<&str> = AvlSet::new();

        assert!(set.insert("b"));
        assert!(set.insert("a"));
        assert!(!set.insert("b"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn remove_is_unsupported() {
        let mut set: AvlSet<String> = ["x".to_string()].into_iter().collect();

        let err = set.remove(&"x".to_string()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "can't remove \"x\": remove is not implemented for AVL trees"
        );
        assert!(set.contains(&"x".to_string()));
    }

    #[test]
    fn comparator_on_derived_key() {
        #[derive(Debug)]
        struct Job {
            id: u32,
            name: &'static str,
        }

        let by_id = |a: &Job, b: &Job| a.id.cmp(&b.id);
        let mut set: AvlSet<Job, _> = AvlSet::with_comparator(Reversed(by_id));

        set.extend([
            Job { id: 2, name: "build" },
            Job { id: 7, name: "ship" },
            Job { id: 4, name: "test" },
        ]);

        let names = set.iter().map(|job| job.name).collect::<Vec<_>>();
        assert_eq!(names, ["ship", "test", "build"]);
    }

    #[test]
    fn debug_lists_values() {
        let set: AvlSet<i32> = [3, 1, 2].into_iter().collect();
        assert_eq!(format!("{set:?}"), "{1, 2, 3}");
    }

    #[test]
    fn clear_drops_values() {
        use std::rc::Rc;

        let counter = Rc::new(());

        #[derive(Debug)]
        struct Tracked {
            id: u32,
            _guard: Rc<()>,
        }

        let tracked = |id| Tracked {
            id,
            _guard: Rc::clone(&counter),
        };

        let mut set: AvlSet<Tracked, _> =
            AvlSet::with_comparator(|a: &Tracked, b: &Tracked| a.id.cmp(&b.id));
        for id in 0..16 {
            set.insert(tracked(id));
        }
        assert_eq!(Rc::strong_count(&counter), 17);

        set.clear();
        assert!(set.is_empty());
        assert_eq!(Rc::strong_count(&counter), 1);

        set.insert(tracked(1));
        drop(set);
        assert_eq!(Rc::strong_count(&counter), 1);
    }
}
