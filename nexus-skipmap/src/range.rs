//! Range views - bounded windows over a [`SkipMap`].
//!
//! A view is a borrow of the backing map plus an optional inclusive lower
//! bound and an optional exclusive upper bound. Nothing is copied: every
//! query resolves through the map's own search, so construction is O(1).
//!
//! Views narrow. A view of a view must lie inside its parent's window, and
//! a bound outside it is rejected with
//! [`Error::InvalidRange`](crate::Error::InvalidRange) rather than clamped.
//!
//! ```
//! use nexus_skipmap::SkipMap;
//!
//! let mut map = SkipMap::new();
//! for k in [2, -5, 12, -22, 7, 10, 11, 32] {
//!     map.put(k, ()).unwrap();
//! }
//!
//! let window = map.sub_range(2, 11).unwrap();
//! assert_eq!(window.keys().unwrap().copied().collect::<Vec<_>>(), vec![2, 7, 10]);
//! assert_eq!(window.first_key(), Ok(&2));
//! assert_eq!(window.last_key(), Ok(&10));
//!
//! let inner = window.sub_range(3, 10).unwrap();
//! assert_eq!(inner.len(), Ok(1));
//! assert!(window.sub_range(0, 5).is_err());
//! ```

use core::cell::Cell;
use core::cmp::Ordering;
use core::fmt;

use rand::rngs::SmallRng;
use rand_core::RngCore;

use crate::compare::{Comparator, Natural};
use crate::error::{Error, Result};
use crate::iter::{Cursor, Iter, IterMut, Keys, Values};
use crate::skipmap::{Relation, SkipMap};

// ============================================================================
// Bounds
// ============================================================================

/// Window `[lower, upper)`; `None` leaves that side open.
#[derive(Clone)]
struct Bounds<K> {
    lower: Option<K>,
    upper: Option<K>,
}

impl<K> Bounds<K> {
    const UNBOUNDED: Self = Self {
        lower: None,
        upper: None,
    };

    /// Validates that closed bounds are ordered and comparable.
    fn new<V, C, R>(
        map: &SkipMap<K, V, C, R>,
        lower: Option<K>,
        upper: Option<K>,
    ) -> Result<Self>
    where
        C: Comparator<K>,
    {
        match (&lower, &upper) {
            (Some(lo), Some(hi)) => {
                if map.compare(lo, hi)? == Ordering::Greater {
                    return Err(invalid("lower bound exceeds upper bound"));
                }
            }
            (Some(bound), None) | (None, Some(bound)) => {
                map.compare(bound, bound)?;
            }
            (None, None) => {}
        }
        Ok(Self { lower, upper })
    }

    #[inline]
    fn is_unbounded(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    /// `lower <= key < upper`.
    fn contains<V, C, R>(&self, map: &SkipMap<K, V, C, R>, key: &K) -> Result<bool>
    where
        C: Comparator<K>,
    {
        if let Some(lower) = &self.lower {
            if map.compare(key, lower)? == Ordering::Less {
                return Ok(false);
            }
        }
        if let Some(upper) = &self.upper {
            if map.compare(key, upper)? != Ordering::Less {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `lower <= key <= upper`: where a narrowed view may put its bounds.
    fn admits<V, C, R>(&self, map: &SkipMap<K, V, C, R>, key: &K) -> Result<bool>
    where
        C: Comparator<K>,
    {
        if let Some(lower) = &self.lower {
            if map.compare(key, lower)? == Ordering::Less {
                return Ok(false);
            }
        }
        if let Some(upper) = &self.upper {
            if map.compare(key, upper)? == Ordering::Greater {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// First and last data node inside the window, or `None` if it is empty.
    ///
    /// The lowest node is the first `>= lower`; the highest is the last
    /// `< upper`. When the lowest node already lies at or past `upper` the
    /// window is empty even though both neighbours exist.
    fn span<V, C, R>(&self, map: &SkipMap<K, V, C, R>) -> Result<Option<(usize, usize)>>
    where
        C: Comparator<K>,
    {
        let first = match &self.lower {
            None => map.first_index(),
            Some(lower) => map.find(lower, Relation::Ge)?,
        };
        let Some(first) = first else {
            return Ok(None);
        };

        let last = match &self.upper {
            None => map.last_index(),
            Some(upper) => {
                if let Some(key) = map.node(first).key() {
                    if map.compare(key, upper)? != Ordering::Less {
                        return Ok(None);
                    }
                }
                map.find(upper, Relation::Lt)?
            }
        };
        Ok(last.map(|last| (first, last)))
    }
}

fn invalid(reason: &'static str) -> Error {
    #[cfg(feature = "tracing")]
    tracing::debug!(reason, "rejected range");
    Error::InvalidRange(reason)
}

// ============================================================================
// Range
// ============================================================================

/// A read-only window over a [`SkipMap`].
///
/// The view holds a shared borrow, so the map cannot change while it
/// exists. That keeps the cached length valid for the view's lifetime.
pub struct Range<'a, K, V, C = Natural, R = SmallRng> {
    map: &'a SkipMap<K, V, C, R>,
    bounds: Bounds<K>,
    /// Length of a bounded window, computed on first use.
    len: Cell<Option<usize>>,
}

impl<'a, K, V, C, R> Range<'a, K, V, C, R>
where
    C: Comparator<K>,
{
    pub(crate) fn new(
        map: &'a SkipMap<K, V, C, R>,
        lower: Option<K>,
        upper: Option<K>,
    ) -> Result<Self> {
        let bounds = Bounds::new(map, lower, upper)?;
        Ok(Self::with_bounds(map, bounds))
    }

    pub(crate) fn unbounded(map: &'a SkipMap<K, V, C, R>) -> Self {
        Self::with_bounds(map, Bounds::UNBOUNDED)
    }

    fn with_bounds(map: &'a SkipMap<K, V, C, R>, bounds: Bounds<K>) -> Self {
        Self {
            map,
            bounds,
            len: Cell::new(None),
        }
    }

    /// Returns the inclusive lower bound, or `None` if the window is open below.
    #[inline]
    pub fn lower_bound(&self) -> Option<&K> {
        self.bounds.lower.as_ref()
    }

    /// Returns the exclusive upper bound, or `None` if the window is open above.
    #[inline]
    pub fn upper_bound(&self) -> Option<&K> {
        self.bounds.upper.as_ref()
    }

    /// Returns the backing map's comparator, or `None` for natural ordering.
    #[inline]
    pub fn comparator(&self) -> Option<&'a C> {
        self.map.comparator()
    }

    /// Returns `true` if `key` falls inside the window (whether or not it is
    /// present in the map).
    #[inline]
    pub fn contains(&self, key: &K) -> Result<bool> {
        self.bounds.contains(self.map, key)
    }

    /// Returns the number of entries inside the window.
    ///
    /// A window over the whole map answers in O(1). A bounded window is
    /// counted by scanning it once; the count is then cached.
    pub fn len(&self) -> Result<usize> {
        if self.bounds.is_unbounded() {
            return Ok(self.map.len());
        }
        if let Some(len) = self.len.get() {
            return Ok(len);
        }
        let len = self.iter()?.count();
        self.len.set(Some(len));
        Ok(len)
    }

    /// Returns `true` if no entry lies inside the window.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.bounds.span(self.map)?.is_none())
    }

    /// Returns `true` if `key` is inside the window and present in the map.
    pub fn contains_key(&self, key: &K) -> Result<bool> {
        Ok(self.contains(key)? && self.map.contains_key(key)?)
    }

    /// Returns the value for `key` if it is inside the window.
    pub fn get(&self, key: &K) -> Result<Option<&'a V>> {
        if !self.contains(key)? {
            return Ok(None);
        }
        self.map.get(key)
    }

    /// Returns the first entry inside the window.
    pub fn first_key_value(&self) -> Result<Option<(&'a K, &'a V)>> {
        let map = self.map;
        Ok(self
            .bounds
            .span(map)?
            .and_then(|(first, _)| map.node(first).kv()))
    }

    /// Returns the last entry inside the window.
    pub fn last_key_value(&self) -> Result<Option<(&'a K, &'a V)>> {
        let map = self.map;
        Ok(self
            .bounds
            .span(map)?
            .and_then(|(_, last)| map.node(last).kv()))
    }

    /// Returns the first key inside the window.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyCollection`] if the window is empty.
    pub fn first_key(&self) -> Result<&'a K> {
        self.first_key_value()?
            .map(|(key, _)| key)
            .ok_or(Error::EmptyCollection)
    }

    /// Returns the last key inside the window.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyCollection`] if the window is empty.
    pub fn last_key(&self) -> Result<&'a K> {
        self.last_key_value()?
            .map(|(key, _)| key)
            .ok_or(Error::EmptyCollection)
    }

    /// Returns an iterator over the window's entries in key order.
    pub fn iter(&self) -> Result<Iter<'a, K, V>> {
        Ok(Iter::new(self.map.nodes(), self.bounds.span(self.map)?))
    }

    /// Returns an iterator over the window's keys.
    pub fn keys(&self) -> Result<Keys<'a, K, V>> {
        Ok(Keys::new(self.iter()?))
    }

    /// Returns an iterator over the window's values.
    pub fn values(&self) -> Result<Values<'a, K, V>> {
        Ok(Values::new(self.iter()?))
    }

    /// Returns a cursor positioned at the window's first entry.
    pub fn cursor(&self) -> Result<Cursor<'a, K, V>> {
        Ok(Cursor::front(self.map.nodes(), self.bounds.span(self.map)?))
    }

    // ========================================================================
    // Narrowing
    // ========================================================================

    /// Narrows to `[lower, upper)`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRange`] if either bound lies outside this window or
    /// `lower > upper`.
    pub fn sub_range(&self, lower: K, upper: K) -> Result<Range<'a, K, V, C, R>> {
        if !self.bounds.admits(self.map, &lower)? || !self.bounds.admits(self.map, &upper)? {
            return Err(invalid("bound outside parent range"));
        }
        Range::new(self.map, Some(lower), Some(upper))
    }

    /// Narrows the upper bound to `upper`, keeping this window's lower bound.
    pub fn head_range(&self, upper: K) -> Result<Range<'a, K, V, C, R>>
    where
        K: Clone,
    {
        if !self.bounds.admits(self.map, &upper)? {
            return Err(invalid("bound outside parent range"));
        }
        Range::new(self.map, self.bounds.lower.clone(), Some(upper))
    }

    /// Narrows the lower bound to `lower`, keeping this window's upper bound.
    pub fn tail_range(&self, lower: K) -> Result<Range<'a, K, V, C, R>>
    where
        K: Clone,
    {
        if !self.bounds.admits(self.map, &lower)? {
            return Err(invalid("bound outside parent range"));
        }
        Range::new(self.map, Some(lower), self.bounds.upper.clone())
    }
}

impl<K: fmt::Debug, V, C, R> fmt::Debug for Range<'_, K, V, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Range")
            .field("lower", &self.bounds.lower)
            .field("upper", &self.bounds.upper)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// RangeMut
// ============================================================================

/// A window over a [`SkipMap`] that can also mutate it.
///
/// Writes are forwarded to the backing map. Keys outside the window are
/// never touched: `put` rejects them and `remove` treats them as absent.
pub struct RangeMut<'a, K, V, C = Natural, R = SmallRng> {
    map: &'a mut SkipMap<K, V, C, R>,
    bounds: Bounds<K>,
}

impl<'a, K, V, C, R> RangeMut<'a, K, V, C, R>
where
    C: Comparator<K>,
{
    pub(crate) fn new(
        map: &'a mut SkipMap<K, V, C, R>,
        lower: Option<K>,
        upper: Option<K>,
    ) -> Result<Self> {
        let bounds = Bounds::new(map, lower, upper)?;
        Ok(Self { map, bounds })
    }

    /// Returns `true` if `key` falls inside the window.
    #[inline]
    pub fn contains(&self, key: &K) -> Result<bool> {
        self.bounds.contains(self.map, key)
    }

    /// Returns the number of entries inside the window.
    ///
    /// Not cached: the window can change through this view.
    pub fn len(&self) -> Result<usize> {
        if self.bounds.is_unbounded() {
            return Ok(self.map.len());
        }
        Ok(Iter::new(self.map.nodes(), self.bounds.span(self.map)?).count())
    }

    /// Returns `true` if no entry lies inside the window.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.bounds.span(self.map)?.is_none())
    }

    /// Returns `true` if `key` is inside the window and present in the map.
    pub fn contains_key(&self, key: &K) -> Result<bool> {
        Ok(self.contains(key)? && self.map.contains_key(key)?)
    }

    /// Returns the value for `key` if it is inside the window.
    pub fn get(&self, key: &K) -> Result<Option<&V>> {
        if !self.contains(key)? {
            return Ok(None);
        }
        self.map.get(key)
    }

    /// Returns a mutable reference to the value for `key` if it is inside the window.
    pub fn get_mut(&mut self, key: &K) -> Result<Option<&mut V>> {
        if !self.contains(key)? {
            return Ok(None);
        }
        self.map.get_mut(key)
    }

    /// Removes `key` from the backing map if it is inside the window.
    pub fn remove(&mut self, key: &K) -> Result<Option<V>> {
        if !self.contains(key)? {
            return Ok(None);
        }
        self.map.remove(key)
    }

    /// Returns an iterator over the window's entries with mutable values.
    pub fn iter_mut(&mut self) -> Result<IterMut<'_, K, V>> {
        let span = self.bounds.span(self.map)?;
        Ok(IterMut::new(self.map.nodes_mut(), span))
    }

    /// Returns a read-only view of the same window.
    pub fn as_range(&self) -> Range<'_, K, V, C, R>
    where
        K: Clone,
    {
        Range::with_bounds(self.map, self.bounds.clone())
    }
}

impl<K, V, C, R> RangeMut<'_, K, V, C, R>
where
    C: Comparator<K>,
    R: RngCore,
{
    /// Inserts or replaces `key` in the backing map.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRange`] if `key` lies outside the window.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>> {
        if !self.contains(&key)? {
            return Err(invalid("key outside range"));
        }
        self.map.put(key, value)
    }
}

impl<K: fmt::Debug, V, C, R> fmt::Debug for RangeMut<'_, K, V, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeMut")
            .field("lower", &self.bounds.lower)
            .field("upper", &self.bounds.upper)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::Reverse;
    use rand::SeedableRng;

    fn make_rng() -> SmallRng {
        SmallRng::seed_from_u64(12345)
    }

    fn map_of(keys: impl IntoIterator<Item = i64>) -> SkipMap<i64, i64> {
        let mut map = SkipMap::with_rng(Natural, make_rng());
        for k in keys {
            map.put(k, k * 2).unwrap();
        }
        map
    }

    fn keys_of<C: Comparator<i64>>(range: &Range<'_, i64, i64, C>) -> Vec<i64> {
        range.keys().unwrap().copied().collect()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    #[test]
    fn sub_range_scattered_keys() {
        let map = map_of([2, -5, 12, -22, 7, 10, 11, 32]);
        let range = map.sub_range(2, 11).unwrap();

        assert_eq!(range.len(), Ok(3));
        assert_eq!(keys_of(&range), vec![2, 7, 10]);
        assert_eq!(range.first_key(), Ok(&2));
        assert_eq!(range.last_key(), Ok(&10));
        assert_eq!(range.lower_bound(), Some(&2));
        assert_eq!(range.upper_bound(), Some(&11));

        let inner = range.sub_range(3, 10).unwrap();
        assert_eq!(inner.len(), Ok(1));
        assert_eq!(keys_of(&inner), vec![7]);
    }

    #[test]
    fn inverted_bounds_rejected() {
        let map = map_of(0..10);
        assert!(matches!(map.sub_range(5, 4), Err(Error::InvalidRange(_))));
    }

    #[test]
    fn equal_bounds_are_empty() {
        let map = map_of(0..10);
        let range = map.sub_range(5, 5).unwrap();
        assert_eq!(range.len(), Ok(0));
        assert_eq!(range.is_empty(), Ok(true));
        assert_eq!(range.first_key(), Err(Error::EmptyCollection));
        assert_eq!(range.last_key(), Err(Error::EmptyCollection));
        assert_eq!(range.iter().unwrap().count(), 0);
    }

    #[test]
    fn window_between_keys_is_empty() {
        // GE(3) is 10 and LT(8) is 0: both exist but lie outside the window.
        let map = map_of([0, 10, 20]);
        let range = map.sub_range(3, 8).unwrap();
        assert_eq!(range.is_empty(), Ok(true));
        assert_eq!(range.len(), Ok(0));
        assert_eq!(range.first_key_value(), Ok(None));
        assert_eq!(range.iter().unwrap().next(), None);
        assert_eq!(range.iter().unwrap().next_back(), None);
    }

    #[test]
    fn window_past_the_end() {
        let map = map_of(0..10);
        assert_eq!(map.tail_range(100).unwrap().len(), Ok(0));
        assert_eq!(map.head_range(-1).unwrap().len(), Ok(0));
        assert_eq!(map.tail_range(100).unwrap().is_empty(), Ok(true));
    }

    #[test]
    fn is_empty_is_not_inverted() {
        let map = map_of(0..10);
        assert_eq!(map.sub_range(2, 5).unwrap().is_empty(), Ok(false));
        assert_eq!(map.sub_range(20, 25).unwrap().is_empty(), Ok(true));
    }

    #[test]
    fn uncomparable_bound() {
        let mut map: SkipMap<f64, ()> = SkipMap::with_rng(Natural, make_rng());
        map.put(1.0, ()).unwrap();
        assert_eq!(map.head_range(f64::NAN).err(), Some(Error::Uncomparable));
        assert_eq!(map.sub_range(0.0, f64::NAN).err(), Some(Error::Uncomparable));
    }

    // ========================================================================
    // Head / tail
    // ========================================================================

    #[test]
    fn head_range_nested() {
        let map = map_of(0..100);
        let head = map.head_range(74).unwrap();

        assert_eq!(head.len(), Ok(74));
        assert_eq!(head.contains_key(&74), Ok(false));
        assert_eq!(head.contains_key(&73), Ok(true));
        assert!(map.contains_key(&74).unwrap());

        let inner = head.head_range(53).unwrap();
        assert_eq!(inner.len(), Ok(53));
        assert_eq!(inner.last_key(), Ok(&52));
    }

    #[test]
    fn tail_range_nested() {
        let map = map_of(0..100);
        let tail = map.tail_range(21).unwrap();

        assert_eq!(tail.len(), Ok(79));
        assert_eq!(tail.first_key(), Ok(&21));

        let inner = tail.tail_range(59).unwrap();
        assert_eq!(inner.len(), Ok(41));
        assert_eq!(inner.first_key(), Ok(&59));
        assert_eq!(inner.last_key(), Ok(&99));
    }

    #[test]
    fn narrowing_outside_parent_rejected() {
        let map = map_of(0..100);
        let range = map.sub_range(10, 20).unwrap();

        assert!(matches!(range.sub_range(5, 15), Err(Error::InvalidRange(_))));
        assert!(matches!(range.sub_range(15, 25), Err(Error::InvalidRange(_))));
        assert!(matches!(range.head_range(21), Err(Error::InvalidRange(_))));
        assert!(matches!(range.tail_range(9), Err(Error::InvalidRange(_))));
        assert!(matches!(range.sub_range(15, 12), Err(Error::InvalidRange(_))));

        // The parent's exclusive upper bound is itself an admissible bound.
        assert_eq!(range.head_range(20).unwrap().len(), Ok(10));
        assert_eq!(range.tail_range(10).unwrap().len(), Ok(10));
    }

    #[test]
    fn narrowing_keeps_other_bound() {
        let map = map_of(0..100);
        let head = map.head_range(50).unwrap();
        let window = head.tail_range(40).unwrap();
        assert_eq!(window.lower_bound(), Some(&40));
        assert_eq!(window.upper_bound(), Some(&50));
        assert_eq!(window.len(), Ok(10));

        let open = map.tail_range(30).unwrap().head_range(35).unwrap();
        assert_eq!(keys_of(&open), vec![30, 31, 32, 33, 34]);
    }

    #[test]
    fn sub_range_of_open_view_is_closed() {
        let map = map_of(0..100);
        let head = map.head_range(50).unwrap();
        let window = head.sub_range(10, 20).unwrap();
        assert_eq!(window.first_key(), Ok(&10));
        assert_eq!(window.len(), Ok(10));
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[test]
    fn full_range_matches_map() {
        let map = map_of(0..50);
        let all = map.as_range();
        assert_eq!(all.len(), Ok(50));
        assert!(all.iter().unwrap().eq(map.iter()));
        assert_eq!(all.lower_bound(), None);
        assert_eq!(all.comparator(), None);
    }

    #[test]
    fn get_respects_window() {
        let map = map_of(0..10);
        let range = map.sub_range(3, 6).unwrap();
        assert_eq!(range.get(&4), Ok(Some(&8)));
        assert_eq!(range.get(&6), Ok(None));
        assert_eq!(range.get(&2), Ok(None));
        assert_eq!(range.contains(&5), Ok(true));
        assert_eq!(range.contains(&6), Ok(false));
    }

    #[test]
    fn iterate_window_backwards() {
        let map = map_of(0..10);
        let range = map.sub_range(3, 7).unwrap();
        let back: Vec<_> = range.iter().unwrap().rev().map(|(k, _)| *k).collect();
        assert_eq!(back, vec![6, 5, 4, 3]);
        let values: Vec<_> = range.values().unwrap().copied().collect();
        assert_eq!(values, vec![6, 8, 10, 12]);
    }

    #[test]
    fn window_cursor_stops_at_bounds() {
        let map = map_of(0..10);
        let range = map.sub_range(3, 5).unwrap();
        let mut cursor = range.cursor().unwrap();
        assert_eq!(cursor.move_next(), Ok((&3, &6)));
        assert_eq!(cursor.move_next(), Ok((&4, &8)));
        assert_eq!(cursor.move_next(), Err(Error::IteratorExhausted));
    }

    #[test]
    fn len_is_cached() {
        let map = map_of(0..1000);
        let range = map.sub_range(100, 300).unwrap();
        assert_eq!(range.len.get(), None);
        assert_eq!(range.len(), Ok(200));
        assert_eq!(range.len.get(), Some(200));
        assert_eq!(range.len(), Ok(200));
    }

    #[test]
    fn views_reflect_backing_map() {
        let mut map = map_of(0..10);
        assert_eq!(map.sub_range(0, 5).unwrap().len(), Ok(5));
        map.remove(&2).unwrap();
        map.put(-1, 0).unwrap();
        assert_eq!(map.sub_range(0, 5).unwrap().len(), Ok(4));
        assert_eq!(map.head_range(5).unwrap().len(), Ok(5));
    }

    #[test]
    fn reverse_ordered_window() {
        let mut map: SkipMap<i64, (), _, _> = SkipMap::with_rng(Reverse(Natural), make_rng());
        for k in 0..10 {
            map.put(k, ()).unwrap();
        }

        // Bounds follow the comparator: 8 sorts before 3.
        let range = map.sub_range(8, 3).unwrap();
        let keys: Vec<_> = range.keys().unwrap().copied().collect();
        assert_eq!(keys, vec![8, 7, 6, 5, 4]);
        assert!(matches!(map.sub_range(3, 8), Err(Error::InvalidRange(_))));
        assert!(range.comparator().is_some());
    }

    #[test]
    fn debug_shows_bounds() {
        let map = map_of(0..3);
        let range = map.head_range(2).unwrap();
        assert_eq!(format!("{range:?}"), "Range { lower: None, upper: Some(2), .. }");
    }

    // ========================================================================
    // RangeMut
    // ========================================================================

    #[test]
    fn range_mut_forwards_writes() {
        let mut map = map_of(0..10);
        {
            let mut window = map.sub_range_mut(3, 6).unwrap();
            assert_eq!(window.len(), Ok(3));
            assert_eq!(window.put(4, 100), Ok(Some(8)));
            assert_eq!(window.remove(&5), Ok(Some(10)));
            assert_eq!(window.len(), Ok(2));
            assert!(window.contains_key(&4).unwrap());
            assert!(!window.contains_key(&5).unwrap());
        }
        assert_eq!(map.get(&4), Ok(Some(&100)));
        assert_eq!(map.len(), 9);
        map.assert_invariants();
    }

    #[test]
    fn range_mut_rejects_outside_keys() {
        let mut map = map_of(0..10);
        {
            let mut window = map.head_range_mut(5).unwrap();
            assert!(matches!(window.put(5, 0), Err(Error::InvalidRange(_))));
            assert_eq!(window.remove(&7), Ok(None));
            assert_eq!(window.get(&7), Ok(None));
            assert_eq!(window.get_mut(&7), Ok(None));
        }
        assert_eq!(map.len(), 10);
        assert_eq!(map.get(&7), Ok(Some(&14)));
    }

    #[test]
    fn range_mut_iter_mut() {
        let mut map = map_of(0..10);
        {
            let mut window = map.tail_range_mut(7).unwrap();
            for (_, value) in window.iter_mut().unwrap() {
                *value = -1;
            }
            if let Some(value) = window.get_mut(&8).unwrap() {
                *value = -8;
            }
            let view = window.as_range();
            assert_eq!(view.first_key(), Ok(&7));
            assert_eq!(view.len(), Ok(3));
        }
        let values: Vec<_> = map.values().copied().collect();
        assert_eq!(values, vec![0, 2, 4, 6, 8, 10, 12, -1, -8, -1]);
    }

    #[test]
    fn range_mut_empty_and_invalid() {
        let mut map = map_of(0..10);
        assert!(matches!(map.sub_range_mut(6, 2), Err(Error::InvalidRange(_))));
        let mut window = map.sub_range_mut(20, 30).unwrap();
        assert_eq!(window.is_empty(), Ok(true));
        assert_eq!(window.put(25, 0), Ok(None));
        assert_eq!(window.is_empty(), Ok(false));
    }
}
