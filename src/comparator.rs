//! Pluggable ordering strategies.
//!
//! Every container in this crate is parameterized over a [`Compare`] implementation rather than
//! requiring `Ord` directly, so that callers can order values by a derived key, reverse an order,
//! or compare types that have no total order of their own.

use core::cmp::Ordering;

/// A total order over values of type `T`.
///
/// Only [`compare`](Compare::compare) is required. The remaining methods are derived from it and
/// are always consistent with it: two values are [`equal`](Compare::equal) exactly when they
/// compare as [`Ordering::Equal`].
pub trait Compare<T: ?Sized> {
    /// Compares `a` with `b`.
    fn compare(&self, a: &T, b: &T) -> Ordering;

    #[inline]
    fn equal(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) == Ordering::Equal
    }

    #[inline]
    fn less_than(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    #[inline]
    fn greater_than(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) == Ordering::Greater
    }

    #[inline]
    fn less_than_or_equal(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) != Ordering::Greater
    }

    #[inline]
    fn greater_than_or_equal(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) != Ordering::Less
    }
}

/// The natural order of a type, as given by its [`Ord`] implementation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Natural;

impl<T: Ord + ?Sized> Compare<T> for Natural {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Inverts the order of the wrapped comparator.
///
/// ```
/// use ordered_containers::comparator::{Compare, Natural, Reversed};
///
/// let rev = Reversed(Natural);
/// assert!(rev.less_than(&2, &1));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Reversed<C>(pub C);

impl<T: ?Sized, C: Compare<T>> Compare<T> for Reversed<C> {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self.0.compare(b, a)
    }
}

impl<T: ?Sized, F> Compare<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_order() {
        assert!(Natural.less_than(&1, &2));
        assert!(Natural.greater_than(&"b", &"a"));
        assert!(Natural.equal(&7, &7));
        assert!(Natural.less_than_or_equal(&7, &7));
        assert!(Natural.greater_than_or_equal(&7, &7));
        assert!(!Natural.less_than_or_equal(&8, &7));
    }

    #[test]
    fn reversed_order() {
        let rev = Reversed(Natural);
        assert_eq!(rev.compare(&1, &2), Ordering::Greater);
        assert!(rev.equal(&3, &3));
        assert!(rev.greater_than_or_equal(&1, &2));
    }

    #[test]
    fn closure_comparator() {
        // Order strings by length only.
        let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len());

        assert!(by_len.equal(&"abc", &"xyz"));
        assert!(by_len.less_than(&"zz", &"aaa"));
        assert!(Reversed(by_len).less_than(&"aaa", &"zz"));
    }
}
