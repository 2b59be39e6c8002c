//! # minpq-rs
//!
//! An indexed min-priority queue built on a d-ary heap.
//!
//! Alongside the heap array the queue keeps a hash map from each value to its
//! current slot, so membership tests and priority lookups are O(1) expected and
//! priority updates are O(log_d n) instead of a linear scan. This is the shape
//! Dijkstra and A* open sets want.
//!
//! ## Example
//!
//! ```rust
//! use minpq_rs::{Error, MinPq};
//!
//! let mut pq: MinPq<&str, f32> = MinPq::new(2, 0);
//! pq.insert("foo", 1.0);
//! pq.insert("bar", 0.0);
//!
//! pq.update_priority("bar", 2.0).unwrap();
//! assert_eq!(pq.current_priority("bar"), Some(&2.0));
//! assert_eq!(pq.update_priority("baz", 1.0), Err(Error::NotFound));
//!
//! assert_eq!(pq.pop(), Some(("foo", 1.0)));
//! assert_eq!(pq.pop(), Some(("bar", 2.0)));
//! assert_eq!(pq.pop(), None);
//! ```
//!
//! Only min-priority order is supported; wrap priorities in
//! [`std::cmp::Reverse`] (or negate them) for max-first behavior. Values must
//! be unique: [`MinPq::insert`] does not check, [`MinPq::try_insert`] does.

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use log::{debug, trace};

mod error;

pub use error::{Error, Result};

// =============================================================================
// Configuration
// =============================================================================

/// Branching factor used by [`Default`] and [`FromIterator`].
pub const DEFAULT_BRANCHING_FACTOR: usize = 4;
/// Smallest branching factor that still forms a tree.
pub const MIN_BRANCHING_FACTOR: usize = 2;

// =============================================================================
// Heap node
// =============================================================================

#[derive(Clone, Debug)]
struct Node<V, P> {
    value: V,
    priority: P,
}

// =============================================================================
// MinPq
// =============================================================================

/// An indexed d-ary min-heap keyed by value.
///
/// Invariants held between public calls:
/// - every non-root slot has a priority no smaller than its parent's
/// - `index[heap[i].value] == i` for every slot `i`
/// - `heap` is dense and `index` covers exactly the queued values
///
/// Ties are broken by position only: equal priorities never swap, so the pop
/// order among them is unspecified.
#[derive(Clone)]
pub struct MinPq<V, P, S = RandomState> {
    heap: Vec<Node<V, P>>,
    /// value -> slot in `heap`
    index: HashMap<V, usize, S>,
    degree: usize,
}

impl<V, P> MinPq<V, P, RandomState>
where
    V: Hash + Eq + Clone,
    P: PartialOrd,
{
    /// Creates an empty queue whose heap nodes have up to `branching_factor`
    /// children. `capacity` pre-sizes storage and may be zero.
    ///
    /// # Panics
    ///
    /// Panics if `branching_factor` is less than [`MIN_BRANCHING_FACTOR`].
    pub fn new(branching_factor: usize, capacity: usize) -> Self {
        Self::with_hasher(branching_factor, capacity, RandomState::new())
    }

    /// Like [`MinPq::new`], but reports a bad branching factor as an error.
    pub fn try_new(branching_factor: usize, capacity: usize) -> Result<Self> {
        Self::try_with_hasher(branching_factor, capacity, RandomState::new())
    }

    /// A classic binary heap with no preallocation.
    pub fn binary() -> Self {
        Self::new(2, 0)
    }
}

impl<V, P, S> MinPq<V, P, S> {
    pub fn try_with_hasher(
        branching_factor: usize,
        capacity: usize,
        hasher: S,
    ) -> Result<Self> {
        if branching_factor < MIN_BRANCHING_FACTOR {
            trace!("rejecting branching factor {branching_factor}");
            return Err(Error::InvalidBranchingFactor(branching_factor));
        }
        trace!("new queue: branching_factor={branching_factor} capacity={capacity}");
        Ok(Self {
            heap: Vec::with_capacity(capacity),
            index: HashMap::with_capacity_and_hasher(capacity, hasher),
            degree: branching_factor,
        })
    }

    /// # Panics
    ///
    /// Panics if `branching_factor` is less than [`MIN_BRANCHING_FACTOR`].
    pub fn with_hasher(branching_factor: usize, capacity: usize, hasher: S) -> Self {
        match Self::try_with_hasher(branching_factor, capacity, hasher) {
            Ok(queue) => queue,
            Err(err) => panic!("{err}"),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn branching_factor(&self) -> usize {
        self.degree
    }

    pub fn capacity(&self) -> usize {
        self.heap.capacity().min(self.index.capacity())
    }

    /// Approximate bytes held by the heap array and the index map.
    pub fn memory_usage(&self) -> usize {
        let slot_bytes = std::mem::size_of::<V>() + std::mem::size_of::<usize>();
        self.heap.capacity() * std::mem::size_of::<Node<V, P>>()
            + self.index.capacity() * slot_bytes
    }

    /// The minimum-priority entry, without removing it.
    pub fn peek(&self) -> Option<(&V, &P)> {
        self.heap.first().map(|node| (&node.value, &node.priority))
    }

    /// Entries in heap-array order, which is not priority order beyond the
    /// first element.
    pub fn iter(&self) -> Iter<'_, V, P> {
        Iter {
            inner: self.heap.iter(),
        }
    }

    pub fn clear(&mut self) {
        debug!("clearing {} queued entries", self.heap.len());
        self.heap.clear();
        self.index.clear();
    }

    #[inline]
    fn parent(&self, slot: usize) -> usize {
        debug_assert!(slot > 0);
        (slot - 1) / self.degree
    }

    #[inline]
    fn first_child(&self, slot: usize) -> usize {
        slot.saturating_mul(self.degree).saturating_add(1)
    }
}

impl<V, P, S> MinPq<V, P, S>
where
    V: Hash + Eq + Clone,
    P: PartialOrd,
    S: BuildHasher,
{
    /// Adds `value` with `priority`.
    ///
    /// `value` must not already be queued. This is not checked in release
    /// builds; a duplicate leaves the index pointing at only one of the two
    /// nodes. Use [`MinPq::contains`] first or call [`MinPq::try_insert`].
    pub fn insert(&mut self, value: V, priority: P) {
        debug_assert!(
            !self.index.contains_key(&value),
            "value inserted twice into MinPq"
        );
        let slot = self.heap.len();
        self.index.insert(value.clone(), slot);
        self.heap.push(Node { value, priority });
        self.sift_up(slot);
    }

    /// Adds `value` unless it is already queued, in which case the queue is
    /// left unchanged and [`Error::AlreadyPresent`] is returned.
    pub fn try_insert(&mut self, value: V, priority: P) -> Result<()> {
        if self.index.contains_key(&value) {
            trace!("try_insert: value already queued (len={})", self.heap.len());
            return Err(Error::AlreadyPresent);
        }
        self.insert(value, priority);
        Ok(())
    }

    /// Inserts `value` if absent, otherwise moves it to `priority`.
    /// Returns `true` when the value was newly inserted.
    pub fn push_or_update(&mut self, value: V, priority: P) -> bool {
        match self.index.get(&value) {
            Some(&slot) => {
                self.set_priority_at(slot, priority);
                false
            }
            None => {
                self.insert(value, priority);
                true
            }
        }
    }

    /// Removes and returns the minimum-priority entry, or `None` when empty.
    pub fn pop(&mut self) -> Option<(V, P)> {
        if self.heap.is_empty() {
            return None;
        }
        let root = self.heap.swap_remove(0);
        self.index.remove(&root.value);
        if !self.heap.is_empty() {
            self.reindex(0);
            self.sift_down(0);
        }
        Some((root.value, root.priority))
    }

    /// Removes `value` from anywhere in the queue.
    pub fn remove<Q>(&mut self, value: &Q) -> Option<(V, P)>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.index.remove(value)?;
        let node = self.heap.swap_remove(slot);
        if slot < self.heap.len() {
            // The former last node now sits at `slot` and may belong above or
            // below it.
            self.reindex(slot);
            if self.sift_up(slot) == slot {
                self.sift_down(slot);
            }
        }
        Some((node.value, node.priority))
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(value)
    }

    /// The priority `value` is currently queued with, or `None` if absent.
    pub fn current_priority<Q>(&self, value: &Q) -> Option<&P>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(value).map(|&slot| &self.heap[slot].priority)
    }

    /// Changes the priority of a queued value.
    ///
    /// Returns [`Error::NotFound`] without touching the queue if `value` is
    /// absent.
    pub fn update_priority<Q>(&mut self, value: &Q, priority: P) -> Result<()>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&slot) = self.index.get(value) else {
            trace!("update_priority: value not queued (len={})", self.heap.len());
            return Err(Error::NotFound);
        };
        self.set_priority_at(slot, priority);
        Ok(())
    }

    pub fn reserve(&mut self, additional: usize) {
        self.heap.reserve(additional);
        self.index.reserve(additional);
    }

    pub fn shrink_to_fit(&mut self) {
        let before = self.memory_usage();
        self.heap.shrink_to_fit();
        self.index.shrink_to_fit();
        debug!("shrink_to_fit: {} -> {} bytes", before, self.memory_usage());
    }

    /// Drains the queue in ascending priority order.
    pub fn into_sorted_vec(mut self) -> Vec<(V, P)> {
        let mut out = Vec::with_capacity(self.heap.len());
        while let Some(entry) = self.pop() {
            out.push(entry);
        }
        out
    }

    // -------------------------------------------------------------------------
    // Heap repair
    // -------------------------------------------------------------------------

    /// Only one side of a single changed node can be out of order: a raised
    /// priority can only conflict with children, a lowered one with the parent.
    fn set_priority_at(&mut self, slot: usize, priority: P) {
        let raised = priority > self.heap[slot].priority;
        self.heap[slot].priority = priority;
        if raised {
            self.sift_down(slot);
        } else {
            self.sift_up(slot);
        }
    }

    /// Moves the node at `slot` toward the root while it is strictly smaller
    /// than its parent. Returns the slot it settles in.
    fn sift_up(&mut self, mut slot: usize) -> usize {
        while slot > 0 {
            let parent = self.parent(slot);
            if self.heap[slot].priority < self.heap[parent].priority {
                self.swap_slots(slot, parent);
                slot = parent;
            } else {
                break;
            }
        }
        slot
    }

    /// Moves the node at `slot` toward the leaves while it is strictly greater
    /// than its smallest child.
    fn sift_down(&mut self, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let first = self.first_child(slot);
            if first >= len {
                break;
            }
            let end = first.saturating_add(self.degree).min(len);
            let mut min = first;
            for child in first + 1..end {
                if self.heap[child].priority < self.heap[min].priority {
                    min = child;
                }
            }
            if self.heap[slot].priority > self.heap[min].priority {
                self.swap_slots(slot, min);
                slot = min;
            } else {
                break;
            }
        }
    }

    #[inline]
    fn swap_slots(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.reindex(a);
        self.reindex(b);
    }

    /// Points the index entry of the node at `slot` back at `slot`.
    #[inline]
    fn reindex(&mut self, slot: usize) {
        let node = &self.heap[slot];
        let found = self.index.get_mut(&node.value).map(|entry| *entry = slot);
        debug_assert!(found.is_some(), "heap node missing from index");
    }
}

impl<V, P, S> Default for MinPq<V, P, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(DEFAULT_BRANCHING_FACTOR, 0, S::default())
    }
}

impl<V: std::fmt::Debug, P: std::fmt::Debug, S> std::fmt::Debug for MinPq<V, P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V, P, S> Extend<(V, P)> for MinPq<V, P, S>
where
    V: Hash + Eq + Clone,
    P: PartialOrd,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (V, P)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (value, priority) in iter {
            self.insert(value, priority);
        }
    }
}

impl<V, P> FromIterator<(V, P)> for MinPq<V, P, RandomState>
where
    V: Hash + Eq + Clone,
    P: PartialOrd,
{
    fn from_iter<I: IntoIterator<Item = (V, P)>>(iter: I) -> Self {
        let mut queue = Self::default();
        queue.extend(iter);
        queue
    }
}

impl<V, P, S> IntoIterator for MinPq<V, P, S>
where
    V: Hash + Eq + Clone,
    P: PartialOrd,
    S: BuildHasher,
{
    type Item = (V, P);
    type IntoIter = IntoIter<V, P, S>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { queue: self }
    }
}

impl<'a, V, P, S> IntoIterator for &'a MinPq<V, P, S> {
    type Item = (&'a V, &'a P);
    type IntoIter = Iter<'a, V, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Iterators
// =============================================================================

pub struct Iter<'a, V, P> {
    inner: std::slice::Iter<'a, Node<V, P>>,
}

impl<'a, V, P> Iterator for Iter<'a, V, P> {
    type Item = (&'a V, &'a P);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|node| (&node.value, &node.priority))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V, P> ExactSizeIterator for Iter<'_, V, P> {}

/// Consuming iterator yielding entries in pop order.
pub struct IntoIter<V, P, S = RandomState> {
    queue: MinPq<V, P, S>,
}

impl<V, P, S> Iterator for IntoIter<V, P, S>
where
    V: Hash + Eq + Clone,
    P: PartialOrd,
    S: BuildHasher,
{
    type Item = (V, P);

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.queue.len();
        (len, Some(len))
    }
}

impl<V, P, S> ExactSizeIterator for IntoIter<V, P, S>
where
    V: Hash + Eq + Clone,
    P: PartialOrd,
    S: BuildHasher,
{
}
