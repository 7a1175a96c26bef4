//! Comparator-driven ordered containers: a binary heap and an intrusive AVL tree.
//!
//! - [`heap::Heap`] is an array-backed binary heap whose order ([`heap::Min`] or [`heap::Max`]) is
//!   chosen at the type level.
//! - [`AvlTree`] is an intrusive, height-balanced binary search tree. It keeps the balance factor
//!   of every node in `{-1, 0, 1}` after each insertion, using single (LL, RR) and double (LR, RL)
//!   rotations.
//! - [`AvlSet`] is an owning set built on [`AvlTree`].
//!
//! All three are ordered by a [`Compare`] implementation rather than by `Ord` directly.
//!
//! Tree conventions used in comments:
//! - The height of a node `x`, `h(x)`, is the number of edges on the longest path from `x` down to
//!   a leaf. Leaves have height 0; a missing child contributes height -1.
//! - The balance factor of `x` is `h(left(x)) - h(right(x))`. A positive balance factor means the
//!   node is left-heavy.
//!
//! Removal from an AVL tree is not supported. [`AvlTree::remove`] always returns
//! [`Error::RemoveUnsupported`].
//#![no_std]

use core::{cell::UnsafeCell, fmt, marker::PhantomPinned, mem, ops::Not, ptr::NonNull};

use cordyceps::Linked;

pub mod avl;
pub mod bst;
pub mod comparator;
mod debug;
pub mod error;
pub mod heap;
pub mod iter;
pub mod set;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;

pub use avl::AvlTree;
pub use bst::BinarySearchTree;
pub use comparator::{Compare, Natural, Reversed};
pub use error::Error;
pub use heap::{Heap, MaxHeap, MinHeap};
pub use set::AvlSet;

/// A node that can be linked into a [`BinarySearchTree`] or an [`AvlTree`].
///
/// The tree orders nodes by the key returned from [`TreeNode::key`], which must not change while
/// the node is linked.
pub trait TreeNode<L>: Linked<L> {
    type Key: fmt::Debug;

    fn key(&self) -> &Self::Key;
}

/// The links embedded in every tree node.
pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[repr(C)]
struct LinksInner<T: ?Sized> {
    parent: Link<T>,
    children: [Link<T>; 2],
    height: usize,
    _unpin: PhantomPinned,
}

pub(crate) type Link<T> = Option<NonNull<T>>;

impl<T: ?Sized> Links<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                parent: None,
                children: [None; 2],
                height: 0,
                _unpin: PhantomPinned,
            }),
        }
    }

    #[inline]
    pub(crate) fn height(&self) -> usize {
        unsafe { (*self.inner.get()).height }
    }

    #[inline]
    pub(crate) fn parent(&self) -> Link<T> {
        unsafe { (*self.inner.get()).parent }
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link<T> {
        unsafe { (*self.inner.get()).children[dir as usize] }
    }

    #[inline]
    pub(crate) fn left(&self) -> Link<T> {
        self.child(Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Link<T> {
        self.child(Dir::Right)
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().parent, parent)
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().children[dir as usize], child)
    }

    #[inline]
    pub(crate) fn set_height(&mut self, height: usize) {
        self.inner.get_mut().height = height;
    }

    // Resets the links to the unlinked state.
    #[inline]
    pub(crate) fn clear(&mut self) {
        let inner = self.inner.get_mut();
        inner.parent = None;
        inner.children = [None; 2];
        inner.height = 0;
    }
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("parent", &self.parent())
            .field("left", &self.left())
            .field("right", &self.right())
            .field("height", &self.height())
            .finish()
    }
}
