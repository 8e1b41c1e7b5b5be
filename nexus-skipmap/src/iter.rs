//! Ordered iteration over level-0 links.
//!
//! Every iterator here walks a closed span `[first, last]` of data nodes,
//! stopping by identity against the precomputed end node rather than by
//! comparing keys. The same types serve the whole map and bounded
//! [`Range`](crate::Range) views.

use core::iter::FusedIterator;

use slab::Slab;

use crate::error::{Error, Result};
use crate::node::Node;

// ============================================================================
// Iter
// ============================================================================

/// An iterator over entries in key order.
pub struct Iter<'a, K, V> {
    nodes: &'a Slab<Node<K, V>>,
    front: usize,
    back: usize,
    done: bool,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(nodes: &'a Slab<Node<K, V>>, span: Option<(usize, usize)>) -> Self {
        let (front, back, done) = match span {
            Some((first, last)) => (first, last, false),
            None => (0, 0, true),
        };
        Self {
            nodes,
            front,
            back,
            done,
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let node = &self.nodes[self.front];
        if self.front == self.back {
            self.done = true;
        } else {
            self.front = node.next(0);
        }
        node.kv()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let node = &self.nodes[self.back];
        if self.front == self.back {
            self.done = true;
        } else {
            self.back = node.prev(0);
        }
        node.kv()
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

// ============================================================================
// IterMut
// ============================================================================

/// An iterator over entries with mutable values, in key order.
///
/// The arena is split into per-node handles once, at construction, with a
/// single `Slab::iter_mut` pass. Each step takes its node's handle out, so a
/// yielded `&mut V` never shares a borrow with a later step.
pub struct IterMut<'a, K, V> {
    /// Handle for every arena slot, `None` once yielded or if vacant.
    slots: Vec<Option<&'a mut Node<K, V>>>,
    front: usize,
    back: usize,
    done: bool,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(nodes: &'a mut Slab<Node<K, V>>, span: Option<(usize, usize)>) -> Self {
        let (front, back, done) = match span {
            Some((first, last)) => (first, last, false),
            None => (0, 0, true),
        };

        let mut slots = Vec::new();
        if !done {
            slots.reserve(nodes.len());
            // Slab iterates in ascending slot order.
            for (idx, node) in nodes.iter_mut() {
                slots.resize_with(idx, || None);
                slots.push(Some(node));
            }
        }

        Self {
            slots,
            front,
            back,
            done,
        }
    }

    /// Removes the handle for `idx`; each slot can be taken once.
    #[inline]
    fn take(&mut self, idx: usize) -> Option<&'a mut Node<K, V>> {
        self.slots.get_mut(idx)?.take()
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let node = self.take(self.front)?;
        if self.front == self.back {
            self.done = true;
        } else {
            self.front = node.next(0);
        }
        node.kv_mut()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let node = self.take(self.back)?;
        if self.front == self.back {
            self.done = true;
        } else {
            self.back = node.prev(0);
        }
        node.kv_mut()
    }
}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

// ============================================================================
// Keys / Values
// ============================================================================

/// An iterator over keys in order.
#[derive(Clone)]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over values in key order.
#[derive(Clone)]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// An iterator over mutable values in key order.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> ValuesMut<'a, K, V> {
    pub(crate) fn new(inner: IterMut<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

// ============================================================================
// Cursor
// ============================================================================

/// A bidirectional cursor over a span of entries.
///
/// The cursor points at the next entry to yield. [`move_next`](Self::move_next)
/// yields it and steps forward; [`move_prev`](Self::move_prev) yields it and
/// steps backward. Stepping off either end of the span leaves the cursor
/// exhausted, and any further move reports [`Error::IteratorExhausted`].
///
/// ```
/// use nexus_skipmap::{Error, SkipMap};
///
/// let mut map = SkipMap::new();
/// map.put(1, 'a').unwrap();
/// map.put(2, 'b').unwrap();
///
/// let mut cursor = map.cursor();
/// assert_eq!(cursor.move_next(), Ok((&1, &'a')));
/// assert_eq!(cursor.peek(), Some((&2, &'b')));
/// assert_eq!(cursor.move_next(), Ok((&2, &'b')));
/// assert!(!cursor.has_next());
/// assert_eq!(cursor.move_next(), Err(Error::IteratorExhausted));
/// ```
pub struct Cursor<'a, K, V> {
    nodes: &'a Slab<Node<K, V>>,
    current: Option<usize>,
    first: usize,
    last: usize,
}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(crate) fn front(nodes: &'a Slab<Node<K, V>>, span: Option<(usize, usize)>) -> Self {
        Self::at(nodes, span, |(first, _)| first)
    }

    pub(crate) fn back(nodes: &'a Slab<Node<K, V>>, span: Option<(usize, usize)>) -> Self {
        Self::at(nodes, span, |(_, last)| last)
    }

    fn at(
        nodes: &'a Slab<Node<K, V>>,
        span: Option<(usize, usize)>,
        start: impl FnOnce((usize, usize)) -> usize,
    ) -> Self {
        let (first, last) = span.unwrap_or((0, 0));
        Self {
            nodes,
            current: span.map(start),
            first,
            last,
        }
    }

    /// Returns `true` if the cursor points at an entry.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.current.is_some()
    }

    /// Returns the entry under the cursor without moving.
    #[inline]
    pub fn peek(&self) -> Option<(&'a K, &'a V)> {
        let nodes = self.nodes;
        self.current.and_then(|idx| nodes[idx].kv())
    }

    /// Yields the entry under the cursor and steps forward.
    pub fn move_next(&mut self) -> Result<(&'a K, &'a V)> {
        let nodes = self.nodes;
        let idx = self.current.ok_or(Error::IteratorExhausted)?;
        let node = &nodes[idx];
        self.current = (idx != self.last).then(|| node.next(0));
        node.kv().ok_or(Error::IteratorExhausted)
    }

    /// Yields the entry under the cursor and steps backward.
    pub fn move_prev(&mut self) -> Result<(&'a K, &'a V)> {
        let nodes = self.nodes;
        let idx = self.current.ok_or(Error::IteratorExhausted)?;
        let node = &nodes[idx];
        self.current = (idx != self.first).then(|| node.prev(0));
        node.kv().ok_or(Error::IteratorExhausted)
    }
}

impl<'a, K, V> Iterator for Cursor<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.move_next().ok()
    }
}
