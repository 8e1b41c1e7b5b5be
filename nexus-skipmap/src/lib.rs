//! An in-memory sorted map built on a skip list.
//!
//! Entries live in a single arena and are threaded together by per-level
//! forward and backward links. Every lookup, insert, delete and relational
//! query resolves through one search primitive that descends the levels
//! top-down and lands on the neighbour a [relation](SkipMap::ceiling) asks
//! for.
//!
//! ```text
//! level 2:  HEAD ─────────────────────► 30 ─────────────────► TAIL
//! level 1:  HEAD ─────────► 10 ───────► 30 ───────► 50 ─────► TAIL
//! level 0:  HEAD ─► 5 ────► 10 ─► 20 ─► 30 ─► 40 ─► 50 ─────► TAIL
//! ```
//!
//! # Quick Start
//!
//! ```
//! use nexus_skipmap::SkipMap;
//!
//! let mut prices = SkipMap::new();
//! prices.put(101, "bid").unwrap();
//! prices.put(99, "ask").unwrap();
//! prices.put(100, "mid").unwrap();
//!
//! assert_eq!(prices.first_key(), Ok(&99));
//! assert_eq!(prices.ceiling(&100), Ok(Some((&100, &"mid"))));
//! assert_eq!(prices.higher(&100), Ok(Some((&101, &"bid"))));
//!
//! let keys: Vec<_> = prices.keys().copied().collect();
//! assert_eq!(keys, vec![99, 100, 101]);
//! ```
//!
//! # Ordering
//!
//! Keys are ordered by a [`Comparator`]. [`Natural`] uses the key's own
//! `PartialOrd`; [`Reverse`] flips another comparator; any
//! `Fn(&K, &K) -> Ordering` closure works too. Comparison is fallible: a
//! pair of keys with no defined order (`NaN`, for instance) surfaces as
//! [`Error::Uncomparable`] and leaves the map untouched.
//!
//! # Range Views
//!
//! [`Range`] and [`RangeMut`] are bounded windows `[lower, upper)` over a
//! map. They borrow it rather than copy it, and can be narrowed further.
//!
//! ```
//! use nexus_skipmap::SkipMap;
//!
//! let mut map = SkipMap::new();
//! for k in 0..100 {
//!     map.put(k, k * k).unwrap();
//! }
//!
//! let tail = map.tail_range(21).unwrap();
//! assert_eq!(tail.len(), Ok(79));
//! assert_eq!(tail.tail_range(59).unwrap().len(), Ok(41));
//! ```
//!
//! # Feature Flags
//!
//! - `tracing` - Emit `tracing` events on height changes, clears and
//!   rejected ranges

#![warn(missing_docs)]

pub mod compare;
pub mod error;
pub mod iter;
mod node;
pub mod range;
pub mod skipmap;

pub use compare::{Comparator, Natural, Reverse};
pub use error::{Error, Result};
pub use iter::{Cursor, Iter, IterMut, Keys, Values, ValuesMut};
pub use range::{Range, RangeMut};
pub use skipmap::{Config, MAX_HEIGHT, SkipMap};
