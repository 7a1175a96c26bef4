//! A binary heap with a pluggable order.
//!
//! The heap is stored as a `Vec` read as a complete binary tree: for an element at index `i`, its
//! children live at `2i + 1` and `2i + 2` and its parent at `(i - 1) / 2`.
//!
//! Whether the heap yields its minimum or its maximum first is decided by the [`HeapOrder`] type
//! parameter, and how two elements compare is decided by the [`Compare`] type parameter:
//!
//! ```
//! use ordered_containers::heap::{MaxHeap, MinHeap};
//!
//! let mut min = MinHeap::new();
//! min.add(5).add(3).add(8);
//! assert_eq!(min.poll(), Some(3));
//!
//! let mut max = MaxHeap::new();
//! max.add(5).add(3).add(8);
//! assert_eq!(max.poll(), Some(8));
//! ```

use core::{fmt, marker::PhantomData};

use crate::comparator::{Compare, Natural};

/// The order a [`Heap`] maintains between every parent and its children.
///
/// There is deliberately no "unordered" heap: a `Heap` cannot be named without choosing an order.
pub trait HeapOrder {
    /// Returns `true` if `first` may sit above `second` in the heap.
    fn ordering_holds<T: ?Sized, C: Compare<T>>(compare: &C, first: &T, second: &T) -> bool;
}

/// Smallest element first.
#[derive(Debug)]
pub enum Min {}

/// Largest element first.
#[derive(Debug)]
pub enum Max {}

impl HeapOrder for Min {
    #[inline]
    fn ordering_holds<T: ?Sized, C: Compare<T>>(compare: &C, first: &T, second: &T) -> bool {
        compare.less_than_or_equal(first, second)
    }
}

impl HeapOrder for Max {
    #[inline]
    fn ordering_holds<T: ?Sized, C: Compare<T>>(compare: &C, first: &T, second: &T) -> bool {
        compare.greater_than_or_equal(first, second)
    }
}

/// A heap that yields its minimum element first.
pub type MinHeap<T, C = Natural> = Heap<T, Min, C>;

/// A heap that yields its maximum element first.
pub type MaxHeap<T, C = Natural> = Heap<T, Max, C>;

/// An array-backed binary heap.
pub struct Heap<T, O: HeapOrder, C = Natural> {
    container: Vec<T>,
    compare: C,
    _order: PhantomData<fn() -> O>,
}

#[inline]
fn left_child_index(parent: usize) -> usize {
    2 * parent + 1
}

#[inline]
fn right_child_index(parent: usize) -> usize {
    2 * parent + 2
}

#[inline]
fn parent_index(child: usize) -> Option<usize> {
    child.checked_sub(1).map(|i| i / 2)
}

impl<T: Ord, O: HeapOrder> Heap<T, O> {
    /// Returns a new, empty heap ordered by `T`'s natural order.
    pub const fn new() -> Self {
        Heap {
            container: Vec::new(),
            compare: Natural,
            _order: PhantomData,
        }
    }
}

impl<T, O: HeapOrder, C: Compare<T>> Heap<T, O, C> {
    /// Returns a new, empty heap ordered by `compare`.
    pub fn with_comparator(compare: C) -> Self {
        Heap {
            container: Vec::new(),
            compare,
            _order: PhantomData,
        }
    }

    /// Returns the comparator used to order the heap.
    pub fn comparator(&self) -> &C {
        &self.compare
    }

    /// Returns `true` if the heap contains no elements.
    pub fn is_empty(&self) -> bool {
        self.container.is_empty()
    }

    /// Returns the number of elements in the heap.
    pub fn len(&self) -> usize {
        self.container.len()
    }

    /// Returns the elements in storage order.
    pub fn as_slice(&self) -> &[T] {
        &self.container
    }

    /// Returns an iterator over the elements in storage order.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.container.iter()
    }

    /// Removes all elements.
    pub fn clear(&mut self) {
        self.container.clear();
    }

    /// Consumes the heap, returning its elements in storage order.
    pub fn into_vec(self) -> Vec<T> {
        self.container
    }

    /// Returns the element at the top of the heap without removing it.
    ///
    /// This is the minimum for a [`MinHeap`] and the maximum for a [`MaxHeap`].
    pub fn peek(&self) -> Option<&T> {
        self.container.first()
    }

    /// Removes and returns the element at the top of the heap.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn poll(&mut self) -> Option<T> {
        if self.container.len() <= 1 {
            return self.container.pop();
        }

        // Move the last element to the head and let it sink.
        let item = self.container.swap_remove(0);
        Self::heapify_down(&mut self.container, &self.compare, 0);

        Some(item)
    }

    /// Adds an element to the heap.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn add(&mut self, item: T) -> &mut Self {
        self.container.push(item);

        let last = self.container.len() - 1;
        Self::heapify_up(&mut self.container, &self.compare, last);

        self
    }

    /// Removes every element equal to `item` under the heap's own comparator.
    pub fn remove(&mut self, item: &T) -> &mut Self {
        let compare = &self.compare;
        let removed = Self::remove_matching(&mut self.container, compare, |elem| {
            compare.equal(item, elem)
        });

        log::debug!("removed {removed} matching elements from heap");
        self
    }

    /// Removes every element equal to `item` under `comparator`.
    ///
    /// `comparator` only decides which elements match. The heap keeps its own order.
    pub fn remove_by<D: Compare<T>>(&mut self, item: &T, comparator: &D) -> &mut Self {
        let removed = Self::remove_matching(&mut self.container, &self.compare, |elem| {
            comparator.equal(item, elem)
        });

        log::debug!("removed {removed} matching elements from heap");
        self
    }

    /// Returns the indices of every element equal to `item`, in ascending order.
    pub fn find(&self, item: &T) -> Vec<usize> {
        self.find_by(item, &self.compare)
    }

    /// Returns the indices of every element equal to `item` under `comparator`, in ascending
    /// order.
    pub fn find_by<D: Compare<T>>(&self, item: &T, comparator: &D) -> Vec<usize> {
        self.container
            .iter()
            .enumerate()
            .filter(|(_, elem)| comparator.equal(item, elem))
            .map(|(index, _)| index)
            .collect()
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        for (index, elem) in self.container.iter().enumerate().skip(1) {
            let parent = parent_index(index).expect("only the root has no parent");
            assert!(
                O::ordering_holds(&self.compare, &self.container[parent], elem),
                "heap order violated between index {parent} and index {index}"
            );
        }
    }

    // Removes matching elements one at a time, returning how many were removed.
    //
    // Every removal moves the last element into the vacated slot, so the next match is searched
    // for again after each removal.
    fn remove_matching<F>(container: &mut Vec<T>, compare: &C, mut matches: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let mut removed = 0;

        while let Some(index) = container.iter().rposition(&mut matches) {
            removed += 1;

            if index == container.len() - 1 {
                container.pop();
                continue;
            }

            drop(container.swap_remove(index));

            let sink = left_child_index(index) < container.len()
                && parent_index(index).map_or(true, |parent| {
                    O::ordering_holds(compare, &container[parent], &container[index])
                });

            if sink {
                Self::heapify_down(container, compare, index);
            } else {
                Self::heapify_up(container, compare, index);
            }
        }

        removed
    }

    // Lifts the element at `start` until it is in order with its parent.
    fn heapify_up(container: &mut [T], compare: &C, start: usize) {
        let mut current = start;

        while let Some(parent) = parent_index(current) {
            if O::ordering_holds(compare, &container[parent], &container[current]) {
                break;
            }

            container.swap(current, parent);
            current = parent;
        }
    }

    // Sinks the element at `start` until it is in order with both of its children.
    fn heapify_down(container: &mut [T], compare: &C, start: usize) {
        let len = container.len();
        let mut current = start;

        while left_child_index(current) < len {
            let left = left_child_index(current);
            let right = right_child_index(current);

            // Pick the child that belongs higher up: the smaller one for a min-heap, the larger
            // one for a max-heap.
            let next = if right < len && O::ordering_holds(compare, &container[right], &container[left])
            {
                right
            } else {
                left
            };

            if O::ordering_holds(compare, &container[current], &container[next]) {
                break;
            }

            container.swap(current, next);
            current = next;
        }
    }
}

impl<T, O: HeapOrder, C: Compare<T> + Default> Default for Heap<T, O, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T, O: HeapOrder, C: Compare<T>> Extend<T> for Heap<T, O, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

impl<T, O: HeapOrder, C: Compare<T> + Default> FromIterator<T> for Heap<T, O, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut heap = Self::default();
        heap.extend(iter);
        heap
    }
}

impl<T: fmt::Debug, O: HeapOrder, C> fmt::Debug for Heap<T, O, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.container.iter()).finish()
    }
}

/// Writes the elements in storage order, separated by commas.
impl<T: fmt::Display, O: HeapOrder, C> fmt::Display for Heap<T, O, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, elem) in self.container.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{elem}")?;
        }

        Ok(())
    }
}
