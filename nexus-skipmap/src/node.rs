//! Arena node: a key/value slot plus per-level links.
//!
//! Links are arena indices. Forward and backward links are stored together
//! as one [`Link`] per level, so a node's height is simply `links.len()` and
//! both directions always have the same length.

use smallvec::SmallVec;

/// Arena index of the head sentinel.
pub(crate) const HEAD: usize = 0;

/// Arena index of the tail sentinel.
pub(crate) const TAIL: usize = 1;

/// Links stored inline before spilling to the heap. Mean height is ~1.33
/// at the default level ratio.
const INLINE_LINKS: usize = 4;

/// Forward and backward neighbour at one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Link {
    pub(crate) next: usize,
    pub(crate) prev: usize,
}

/// What a node holds. Sentinels never carry user data and sort outside
/// every key without consulting the comparator.
#[derive(Debug)]
pub(crate) enum Slot<K, V> {
    Head,
    Tail,
    Entry(K, V),
}

#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) slot: Slot<K, V>,
    pub(crate) links: SmallVec<[Link; INLINE_LINKS]>,
}

impl<K, V> Node<K, V> {
    /// Sentinel linked head -> tail at every level.
    pub(crate) fn sentinel(slot: Slot<K, V>, height: usize) -> Self {
        debug_assert!(!matches!(slot, Slot::Entry(..)));
        Self {
            slot,
            links: SmallVec::from_elem(
                Link {
                    next: TAIL,
                    prev: HEAD,
                },
                height,
            ),
        }
    }

    /// Data node. Links are filled in when the node is spliced.
    pub(crate) fn entry(key: K, value: V, height: usize) -> Self {
        debug_assert!(height > 0);
        Self {
            slot: Slot::Entry(key, value),
            links: SmallVec::from_elem(
                Link {
                    next: TAIL,
                    prev: HEAD,
                },
                height,
            ),
        }
    }

    #[inline]
    pub(crate) fn height(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub(crate) fn next(&self, level: usize) -> usize {
        self.links[level].next
    }

    #[inline]
    pub(crate) fn prev(&self, level: usize) -> usize {
        self.links[level].prev
    }

    #[inline]
    pub(crate) fn key(&self) -> Option<&K> {
        match &self.slot {
            Slot::Entry(key, _) => Some(key),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn kv(&self) -> Option<(&K, &V)> {
        match &self.slot {
            Slot::Entry(key, value) => Some((key, value)),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn kv_mut(&mut self) -> Option<(&K, &mut V)> {
        match &mut self.slot {
            Slot::Entry(key, value) => Some((key, value)),
            _ => None,
        }
    }

    /// Consumes a detached node, yielding its entry.
    pub(crate) fn into_kv(self) -> Option<(K, V)> {
        match self.slot {
            Slot::Entry(key, value) => Some((key, value)),
            _ => None,
        }
    }
}
