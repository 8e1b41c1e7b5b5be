//! Key ordering.
//!
//! A [`Comparator`] defines the total order the skip map keeps its keys in.
//! Comparison is fallible: a comparator returns `None` when two keys are not
//! mutually comparable, which the map reports as
//! [`Error::Uncomparable`](crate::Error::Uncomparable).
//!
//! ```
//! use core::cmp::Ordering;
//! use nexus_skipmap::{Comparator, Natural, Reverse};
//!
//! assert_eq!(Natural.compare(&1, &2), Some(Ordering::Less));
//! assert_eq!(Reverse(Natural).compare(&1, &2), Some(Ordering::Greater));
//! assert_eq!(Natural.compare(&f64::NAN, &1.0), None);
//!
//! // Any `Fn(&K, &K) -> Ordering` is a comparator.
//! let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len());
//! assert_eq!(by_len.compare(&"ab", &"c"), Some(Ordering::Greater));
//! ```

use core::cmp::Ordering;

/// Ordering function over keys of type `K`.
pub trait Comparator<K: ?Sized> {
    /// Compares `lhs` against `rhs`, or returns `None` if they are not comparable.
    fn compare(&self, lhs: &K, rhs: &K) -> Option<Ordering>;

    /// Returns `true` if this comparator is the keys' natural ordering.
    #[inline]
    fn is_natural(&self) -> bool {
        false
    }
}

/// The keys' natural ordering, via [`PartialOrd`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Natural;

impl<K: PartialOrd + ?Sized> Comparator<K> for Natural {
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Option<Ordering> {
        lhs.partial_cmp(rhs)
    }

    #[inline]
    fn is_natural(&self) -> bool {
        true
    }
}

/// Reverses another comparator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reverse<C>(pub C);

impl<K: ?Sized, C: Comparator<K>> Comparator<K> for Reverse<C> {
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Option<Ordering> {
        self.0.compare(lhs, rhs).map(Ordering::reverse)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Option<Ordering> {
        Some(self(lhs, rhs))
    }
}
