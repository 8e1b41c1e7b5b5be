//! Skip map - a probabilistic sorted map over a node arena.
//!
//! A skip list gives O(log n) expected time for insert, lookup and removal
//! without any rebalancing. Keys are kept in the order defined by a
//! [`Comparator`] (natural ordering by default) and can be traversed in
//! either direction or through bounded [`Range`] views.
//!
//! # Design
//!
//! Nodes live in a [`slab::Slab`] and link to each other by index, so there
//! are no ownership cycles and removal reclaims a node immediately. Two
//! sentinels bound every level: head at index 0 and tail at index 1. Every
//! data node keeps both forward and backward links at each level it
//! participates in, which makes removal and `pop_last` O(1) once the node
//! is known.
//!
//! ```text
//! Level 2:  HEAD ─────────────────────► 50 ─────────────────► TAIL
//! Level 1:  HEAD ────────► 20 ─────────► 50 ─────────────────► TAIL
//! Level 0:  HEAD ──► 10 ──► 20 ──► 30 ──► 50 ──► 60 ──────────► TAIL
//!                ◄──    ◄──    ◄──    ◄──    ◄──    ◄──
//! ```
//!
//! Node heights are drawn once, at insertion, from a geometric distribution
//! capped at [`MAX_HEIGHT`]. The random source is injected, so a seeded
//! generator makes the structure fully deterministic.
//!
//! # Example
//!
//! ```
//! use nexus_skipmap::{Natural, SkipMap};
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//!
//! let mut map = SkipMap::with_rng(Natural, SmallRng::seed_from_u64(12345));
//!
//! map.put(100, "first").unwrap();
//! map.put(50, "second").unwrap();
//!
//! assert_eq!(map.get(&50).unwrap(), Some(&"second"));
//! assert_eq!(map.first_key().unwrap(), &50);
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![50, 100]);
//! ```

use core::cmp::Ordering;
use core::fmt;
use core::mem;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_core::RngCore;
use slab::Slab;

use crate::compare::{Comparator, Natural};
use crate::error::{Error, Result};
use crate::iter::{Cursor, Iter, IterMut, Keys, Values, ValuesMut};
use crate::node::{HEAD, Link, Node, Slot, TAIL};
use crate::range::{Range, RangeMut};

/// Maximum height of any node, and so of the map.
pub const MAX_HEIGHT: usize = 32;

// ============================================================================
// Config
// ============================================================================

/// Construction-time tuning for a [`SkipMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Inverse of the probability that a node reaches the next level.
    ///
    /// - 2: p = 1/2, ~2 links per node on average
    /// - 4: p = 1/4 (Redis-style, default), ~1.33 links per node on average
    ///
    /// Must be a power of 2 and >= 2. Invalid values are rounded up to the
    /// nearest valid value.
    pub level_ratio: u32,
    /// Number of entries to pre-allocate arena slots for.
    pub capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level_ratio: 4,
            capacity: 0,
        }
    }
}

impl Config {
    /// `log2` of the level ratio after rounding it to a valid power of two.
    fn level_divisor(&self) -> u32 {
        let ratio = self
            .level_ratio
            .max(2)
            .checked_next_power_of_two()
            .unwrap_or(1 << 31);
        ratio.trailing_zeros()
    }
}

// ============================================================================
// Relation
// ============================================================================

/// Which neighbour of a target key the search primitive resolves to.
///
/// Encoded as bit flags so that `Ge = Eq | Gt` and `Le = Eq | Lt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum Relation {
    Eq = 0b001,
    Gt = 0b010,
    Ge = 0b011,
    Lt = 0b100,
    Le = 0b101,
}

impl Relation {
    #[inline]
    const fn includes(self, other: Relation) -> bool {
        (self as u8) & (other as u8) != 0
    }
}

// ============================================================================
// SkipMap
// ============================================================================

/// A sorted map backed by a skip list.
///
/// # Type Parameters
///
/// - `K`: Key type
/// - `V`: Value type
/// - `C`: Ordering, a [`Comparator<K>`]; defaults to the keys' [`Natural`] order
/// - `R`: Random source for node heights, any [`RngCore`]; defaults to [`SmallRng`]
///
/// # Errors
///
/// Lookups and mutations return [`Result`] because ordering is fallible:
/// keys the comparator cannot order produce [`Error::Uncomparable`]. Errors
/// are raised before any link is rewritten.
///
/// # Threading
///
/// The map does no internal synchronization. Share it across threads only
/// behind external mutual exclusion.
pub struct SkipMap<K, V, C = Natural, R = SmallRng> {
    /// Node arena. `HEAD` and `TAIL` are always occupied.
    nodes: Slab<Node<K, V>>,
    /// Ordering used for every key comparison.
    cmp: C,
    /// Random source for node heights.
    rng: R,
    /// Number of levels in use: the highest level with a data node, plus one.
    height: usize,
    /// Number of data nodes.
    len: usize,
    /// `log2(level_ratio)`. Scales the geometric distribution in `random_height`.
    level_divisor: u32,
}

impl<K, V> SkipMap<K, V> {
    /// Creates an empty map using the keys' natural ordering and an
    /// entropy-seeded random source.
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<K, V> Default for SkipMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> SkipMap<K, V, C> {
    /// Creates an empty map ordered by `cmp`, with an entropy-seeded random source.
    pub fn with_comparator(cmp: C) -> Self {
        Self::with_rng(cmp, SmallRng::from_entropy())
    }
}

impl<K, V, C, R: RngCore> SkipMap<K, V, C, R> {
    /// Creates an empty map ordered by `cmp`, drawing node heights from `rng`.
    pub fn with_rng(cmp: C, rng: R) -> Self {
        Self::with_config(cmp, rng, Config::default())
    }

    /// Creates an empty map with explicit tuning.
    pub fn with_config(cmp: C, rng: R, config: Config) -> Self {
        let mut nodes = Slab::with_capacity(config.capacity + 2);
        Self::link_sentinels(&mut nodes);
        Self {
            nodes,
            cmp,
            rng,
            height: 0,
            len: 0,
            level_divisor: config.level_divisor(),
        }
    }
}

impl<K, V, C, R> SkipMap<K, V, C, R> {
    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of levels currently in use.
    ///
    /// Zero for an empty map, never more than [`MAX_HEIGHT`].
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the effective level ratio (a power of two).
    #[inline]
    pub fn level_ratio(&self) -> u32 {
        1 << self.level_divisor
    }

    /// Returns the first (smallest) entry, or `None` if empty.
    ///
    /// O(1): the head sentinel links straight to it.
    #[inline]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.nodes[self.nodes[HEAD].next(0)].kv()
    }

    /// Returns the last (largest) entry, or `None` if empty.
    ///
    /// O(1): the tail sentinel links straight back to it.
    #[inline]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.nodes[self.nodes[TAIL].prev(0)].kv()
    }

    /// Returns the first (smallest) key.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyCollection`] if the map is empty.
    pub fn first_key(&self) -> Result<&K> {
        self.first_key_value()
            .map(|(key, _)| key)
            .ok_or(Error::EmptyCollection)
    }

    /// Returns the last (largest) key.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyCollection`] if the map is empty.
    pub fn last_key(&self) -> Result<&K> {
        self.last_key_value()
            .map(|(key, _)| key)
            .ok_or(Error::EmptyCollection)
    }

    /// Removes and returns the first (smallest) entry.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let first = self.first_index()?;
        self.unlink(first)
    }

    /// Removes and returns the last (largest) entry.
    ///
    /// O(1) thanks to backward links; no search is needed.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let last = self.last_index()?;
        self.unlink(last)
    }

    /// Removes all entries.
    ///
    /// Every node is dropped and the arena is reset to just the sentinel
    /// pair, so nothing from before the clear stays reachable.
    pub fn clear(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(len = self.len, height = self.height, "clearing skip map");

        self.nodes.clear();
        Self::link_sentinels(&mut self.nodes);
        self.height = 0;
        self.len = 0;
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Returns an iterator over entries in ascending key order.
    ///
    /// The iterator is double-ended: `.rev()` walks the backward links.
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.nodes, self.span())
    }

    /// Returns an iterator over entries with mutable values, in key order.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let span = self.span();
        IterMut::new(&mut self.nodes, span)
    }

    /// Returns an iterator over keys in ascending order.
    #[inline]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Returns an iterator over values in ascending key order.
    #[inline]
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    /// Returns an iterator over mutable values in ascending key order.
    #[inline]
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.iter_mut())
    }

    /// Returns a cursor positioned at the first entry.
    #[inline]
    pub fn cursor(&self) -> Cursor<'_, K, V> {
        Cursor::front(&self.nodes, self.span())
    }

    /// Returns a cursor positioned at the last entry.
    #[inline]
    pub fn cursor_back(&self) -> Cursor<'_, K, V> {
        Cursor::back(&self.nodes, self.span())
    }

    // ========================================================================
    // Crate-internal access for iterators and range views
    // ========================================================================

    #[inline]
    pub(crate) fn nodes(&self) -> &Slab<Node<K, V>> {
        &self.nodes
    }

    #[inline]
    pub(crate) fn nodes_mut(&mut self) -> &mut Slab<Node<K, V>> {
        &mut self.nodes
    }

    #[inline]
    pub(crate) fn node(&self, idx: usize) -> &Node<K, V> {
        &self.nodes[idx]
    }

    /// First data node, or `None` if empty.
    #[inline]
    pub(crate) fn first_index(&self) -> Option<usize> {
        data_index(self.nodes[HEAD].next(0))
    }

    /// Last data node, or `None` if empty.
    #[inline]
    pub(crate) fn last_index(&self) -> Option<usize> {
        data_index(self.nodes[TAIL].prev(0))
    }

    /// First and last data node, or `None` if empty.
    #[inline]
    pub(crate) fn span(&self) -> Option<(usize, usize)> {
        Some((self.first_index()?, self.last_index()?))
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Allocates head and tail at indices 0 and 1, linked at every level.
    fn link_sentinels(nodes: &mut Slab<Node<K, V>>) {
        let head = nodes.insert(Node::sentinel(Slot::Head, MAX_HEIGHT));
        let tail = nodes.insert(Node::sentinel(Slot::Tail, MAX_HEIGHT));
        debug_assert_eq!((head, tail), (HEAD, TAIL));
    }

    /// Detaches a data node from every level it occupies and frees its slot.
    ///
    /// The node's own links name its neighbours, so no search is needed.
    fn unlink(&mut self, idx: usize) -> Option<(K, V)> {
        let node = self.nodes.remove(idx);
        for (level, link) in node.links.iter().enumerate() {
            self.nodes[link.prev].links[level].next = link.next;
            self.nodes[link.next].links[level].prev = link.prev;
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(index = idx, node_height = node.height(), "unlinked node");

        self.shrink_height();
        self.len -= 1;
        node.into_kv()
    }

    /// Drops empty top levels.
    fn shrink_height(&mut self) {
        while self.height > 0 && self.nodes[HEAD].next(self.height - 1) == TAIL {
            self.height -= 1;

            #[cfg(feature = "tracing")]
            tracing::trace!(height = self.height, "lowered skip map height");
        }
    }
}

impl<K, V, C, R> SkipMap<K, V, C, R>
where
    C: Comparator<K>,
{
    /// Returns the configured comparator, or `None` if the keys' natural
    /// ordering is in use.
    #[inline]
    pub fn comparator(&self) -> Option<&C> {
        (!self.cmp.is_natural()).then_some(&self.cmp)
    }

    /// Returns `true` if the map holds an entry for `key`.
    #[inline]
    pub fn contains_key(&self, key: &K) -> Result<bool> {
        Ok(self.find(key, Relation::Eq)?.is_some())
    }

    /// Returns a reference to the value for `key`, or `None` if absent.
    #[inline]
    pub fn get(&self, key: &K) -> Result<Option<&V>> {
        Ok(self.entry_at(key, Relation::Eq)?.map(|(_, value)| value))
    }

    /// Returns a mutable reference to the value for `key`, or `None` if absent.
    pub fn get_mut(&mut self, key: &K) -> Result<Option<&mut V>> {
        Ok(match self.find(key, Relation::Eq)? {
            Some(idx) => self.nodes[idx].kv_mut().map(|(_, value)| value),
            None => None,
        })
    }

    /// Returns the entry with the smallest key `>= key`.
    #[inline]
    pub fn ceiling(&self, key: &K) -> Result<Option<(&K, &V)>> {
        self.entry_at(key, Relation::Ge)
    }

    /// Returns the entry with the smallest key `> key`.
    #[inline]
    pub fn higher(&self, key: &K) -> Result<Option<(&K, &V)>> {
        self.entry_at(key, Relation::Gt)
    }

    /// Returns the entry with the largest key `<= key`.
    #[inline]
    pub fn floor(&self, key: &K) -> Result<Option<(&K, &V)>> {
        self.entry_at(key, Relation::Le)
    }

    /// Returns the entry with the largest key `< key`.
    #[inline]
    pub fn lower(&self, key: &K) -> Result<Option<(&K, &V)>> {
        self.entry_at(key, Relation::Lt)
    }

    /// Removes the entry for `key`, returning its value, or `None` if absent.
    pub fn remove(&mut self, key: &K) -> Result<Option<V>> {
        Ok(match self.find(key, Relation::Eq)? {
            Some(idx) => self.unlink(idx).map(|(_, value)| value),
            None => None,
        })
    }

    // ========================================================================
    // Range views
    // ========================================================================

    /// Returns a read-only view over the whole map.
    #[inline]
    pub fn as_range(&self) -> Range<'_, K, V, C, R> {
        Range::unbounded(self)
    }

    /// Returns a view of keys in `[lower, upper)`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRange`] if `lower > upper`.
    pub fn sub_range(&self, lower: K, upper: K) -> Result<Range<'_, K, V, C, R>> {
        Range::new(self, Some(lower), Some(upper))
    }

    /// Returns a view of keys `< upper`.
    pub fn head_range(&self, upper: K) -> Result<Range<'_, K, V, C, R>> {
        Range::new(self, None, Some(upper))
    }

    /// Returns a view of keys `>= lower`.
    pub fn tail_range(&self, lower: K) -> Result<Range<'_, K, V, C, R>> {
        Range::new(self, Some(lower), None)
    }

    /// Returns a mutable view of keys in `[lower, upper)`.
    pub fn sub_range_mut(&mut self, lower: K, upper: K) -> Result<RangeMut<'_, K, V, C, R>> {
        RangeMut::new(self, Some(lower), Some(upper))
    }

    /// Returns a mutable view of keys `< upper`.
    pub fn head_range_mut(&mut self, upper: K) -> Result<RangeMut<'_, K, V, C, R>> {
        RangeMut::new(self, None, Some(upper))
    }

    /// Returns a mutable view of keys `>= lower`.
    pub fn tail_range_mut(&mut self, lower: K) -> Result<RangeMut<'_, K, V, C, R>> {
        RangeMut::new(self, Some(lower), None)
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Compares two keys under the configured ordering.
    #[inline]
    pub(crate) fn compare(&self, lhs: &K, rhs: &K) -> Result<Ordering> {
        self.cmp.compare(lhs, rhs).ok_or(Error::Uncomparable)
    }

    /// Resolves `relation` against `key` without recording predecessors.
    #[inline]
    pub(crate) fn find(&self, key: &K, relation: Relation) -> Result<Option<usize>> {
        self.search(key, relation, None)
    }

    fn entry_at(&self, key: &K, relation: Relation) -> Result<Option<(&K, &V)>> {
        Ok(self
            .find(key, relation)?
            .and_then(|idx| self.nodes[idx].kv()))
    }

    /// The single search primitive behind every lookup and insertion.
    ///
    /// Descends from the top level, advancing while the next node sorts
    /// before `key`. The node where each level stops is written to `trace`
    /// (if given). The result is resolved against the level-0 neighbours of
    /// the final stopping point.
    fn search(
        &self,
        key: &K,
        relation: Relation,
        mut trace: Option<&mut [usize; MAX_HEIGHT]>,
    ) -> Result<Option<usize>> {
        let mut current = HEAD;
        for level in (0..self.height).rev() {
            loop {
                let next = self.nodes[current].next(level);
                if !self.precedes(next, key)? {
                    break;
                }
                current = next;
            }
            if let Some(trace) = trace.as_deref_mut() {
                trace[level] = current;
            }
        }

        // `current` is the last node below `key`; `next` is the first at or above it.
        let next = self.nodes[current].next(0);
        let exact = relation != Relation::Lt && self.matches(next, key)?;
        Ok(if exact && relation.includes(Relation::Eq) {
            Some(next)
        } else if relation.includes(Relation::Gt) {
            // Strict GT steps over an exact match.
            data_index(if exact { self.nodes[next].next(0) } else { next })
        } else if relation.includes(Relation::Lt) {
            data_index(current)
        } else {
            None
        })
    }

    /// `true` if the node at `idx` sorts strictly before `key`.
    /// Sentinels are resolved without calling the comparator.
    #[inline]
    fn precedes(&self, idx: usize, key: &K) -> Result<bool> {
        match &self.nodes[idx].slot {
            Slot::Head => Ok(true),
            Slot::Tail => Ok(false),
            Slot::Entry(node_key, _) => Ok(self.compare(node_key, key)? == Ordering::Less),
        }
    }

    /// `true` if the node at `idx` is a data node whose key equals `key`.
    #[inline]
    fn matches(&self, idx: usize, key: &K) -> Result<bool> {
        match &self.nodes[idx].slot {
            Slot::Entry(node_key, _) => Ok(self.compare(node_key, key)? == Ordering::Equal),
            _ => Ok(false),
        }
    }
}

impl<K, V, C, R> SkipMap<K, V, C, R>
where
    C: Comparator<K>,
    R: RngCore,
{
    /// Associates `value` with `key`.
    ///
    /// If the key already exists its value is replaced in place and the old
    /// value returned; the node keeps its height and position.
    ///
    /// # Errors
    ///
    /// [`Error::Uncomparable`] if `key` cannot be ordered, either against
    /// itself or against a key already in the map. The map is unchanged.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>> {
        // Reject keys the ordering cannot handle even when the map is empty.
        self.compare(&key, &key)?;

        let mut trace = [HEAD; MAX_HEIGHT];
        if let Some(idx) = self.search(&key, Relation::Eq, Some(&mut trace))? {
            return Ok(self.nodes[idx]
                .kv_mut()
                .map(|(_, slot)| mem::replace(slot, value)));
        }

        // Levels above the current height keep HEAD as their predecessor.
        let node_height = self.random_height();
        if node_height > self.height {
            #[cfg(feature = "tracing")]
            tracing::trace!(from = self.height, to = node_height, "raised skip map height");
            self.height = node_height;
        }

        let idx = self.nodes.insert(Node::entry(key, value, node_height));
        for level in 0..self.nodes[idx].height() {
            let prev = trace[level];
            let next = self.nodes[prev].next(level);
            self.nodes[idx].links[level] = Link { next, prev };
            self.nodes[prev].links[level].next = idx;
            self.nodes[next].links[level].prev = idx;
        }
        self.len += 1;

        #[cfg(feature = "tracing")]
        tracing::trace!(index = idx, node_height, len = self.len, "inserted node");

        Ok(None)
    }

    /// Inserts every entry of `iter`, stopping at the first comparison error.
    ///
    /// Entries inserted before the error stay in the map.
    pub fn try_extend<I>(&mut self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in iter {
            self.put(key, value)?;
        }
        Ok(())
    }

    /// Draws a node height in `1..=MAX_HEIGHT`.
    ///
    /// Every `level_divisor` trailing one bits add a level, giving
    /// `P(height > h) = level_ratio^-h`.
    #[inline]
    fn random_height(&mut self) -> usize {
        let r = self.rng.next_u64();
        let height = 1 + (r.trailing_ones() / self.level_divisor) as usize;
        height.min(MAX_HEIGHT)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C, R> fmt::Debug for SkipMap<K, V, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, C, R> IntoIterator for &'a SkipMap<K, V, C, R> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, C, R> IntoIterator for &'a mut SkipMap<K, V, C, R> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// `Some(idx)` unless `idx` is a sentinel.
#[inline]
fn data_index(idx: usize) -> Option<usize> {
    (idx != HEAD && idx != TAIL).then_some(idx)
}

#[cfg(test)]
impl<K, V, C, R> SkipMap<K, V, C, R>
where
    C: Comparator<K>,
{
    /// Walks every level and checks the structural invariants.
    pub(crate) fn assert_invariants(&self) {
        assert!(self.height <= MAX_HEIGHT);
        assert_eq!(self.nodes.len(), self.len + 2, "arena holds only live nodes");

        for level in 0..MAX_HEIGHT {
            let mut prev = HEAD;
            let mut current = self.nodes[HEAD].next(level);
            let mut count = 0;
            while current != TAIL {
                let node = &self.nodes[current];
                assert!(node.height() > level, "node linked above its height");
                assert_eq!(node.prev(level), prev, "backward link mismatch");
                if let (Some(a), Some(b)) = (self.nodes[prev].key(), node.key()) {
                    assert_eq!(self.compare(a, b), Ok(Ordering::Less), "keys out of order");
                }
                prev = current;
                current = node.next(level);
                count += 1;
            }
            assert_eq!(self.nodes[TAIL].prev(level), prev, "tail backward link mismatch");

            if level == 0 {
                assert_eq!(count, self.len);
            }
            if level >= self.height {
                assert_eq!(count, 0, "data node above current height");
            } else {
                assert!(count > 0, "empty level below current height");
            }
        }
    }
}
