//! Persistent (immutable) vector based on a Relaxed Radix Balanced tree.
//!
//! This module provides [`PersistentVector`], an immutable dynamic array
//! that uses structural sharing for efficient operations, and
//! [`TransientVector`], a single-owner builder for batch appends.
//!
//! # Overview
//!
//! `PersistentVector` is a 32-way branching trie in the style of Clojure's
//! and Scala's vectors, extended with relaxed nodes so that elements can be
//! inserted anywhere. It provides:
//!
//! - O(log32 N) random access (effectively O(1) for practical sizes)
//! - amortized O(1) `push_back` and `push_front` through the focus window
//! - O(log N) `insert`, `update`, `take`, `drop_first` and `split_at`
//! - O(1) len and `is_empty`
//!
//! All operations return new vectors without modifying the original,
//! and structural sharing ensures memory efficiency.
//!
//! # Internal Structure
//!
//! The vector consists of:
//! - A root node. Append-only tries stay strict and are indexed by bit
//!   shifts; any other write degrades the affected path to relaxed nodes,
//!   which carry a cumulative size table.
//! - A focus window of up to 32 elements held outside the trie. Repeated
//!   writes next to the window are absorbed there and pushed into the trie
//!   as one buffer when the window fills up or the write position moves.
//!
//! # Examples
//!
//! ```rust
//! use rrb_vector::persistent::PersistentVector;
//!
//! let vector = PersistentVector::new()
//!     .push_back(1)
//!     .push_back(2)
//!     .push_back(3);
//!
//! assert_eq!(vector.get(0), Some(&1));
//! assert_eq!(vector.get(1), Some(&2));
//! assert_eq!(vector.get(2), Some(&3));
//!
//! // Structural sharing: the original vector is preserved
//! let inserted = vector.insert(1, 10).unwrap();
//! assert_eq!(vector.len(), 3);     // Original unchanged
//! assert_eq!(inserted.len(), 4);   // New vector
//! assert_eq!(inserted.get(1), Some(&10));
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;

use arrayvec::ArrayVec;

use super::ReferenceCounter;

mod error;
mod iter;
mod leaf;
mod node;
mod relaxed;
mod size_table;
mod strict;
mod transient;

pub use error::VectorError;
pub use iter::{PersistentVectorIntoIterator, PersistentVectorIterator};
pub use transient::TransientVector;

use leaf::LeafNode;
use node::{BRANCHING_FACTOR, Child, Node};

// =============================================================================
// PersistentVector Definition
// =============================================================================

/// A persistent (immutable) vector based on a Relaxed Radix Balanced tree.
///
/// `PersistentVector` is an immutable data structure that uses structural
/// sharing to provide efficient operations while maintaining immutability.
///
/// # Time Complexity
///
/// | Operation           | Complexity                 |
/// |---------------------|----------------------------|
/// | `new`               | O(1)                       |
/// | `get`               | O(log32 N)                 |
/// | `push_back`         | O(log32 N) amortized O(1)  |
/// | `push_front`        | O(log N) amortized O(1)    |
/// | `insert`            | O(log N)                   |
/// | `update`            | O(log N)                   |
/// | `take`/`drop_first` | O(log N)                   |
/// | `len`               | O(1)                       |
/// | `iter`              | O(N)                       |
///
/// # Examples
///
/// ```rust
/// use rrb_vector::persistent::PersistentVector;
///
/// let vector: PersistentVector<i32> = (0..100).collect();
/// assert_eq!(vector.len(), 100);
/// assert_eq!(vector.get(50), Some(&50));
/// ```
#[derive(Clone)]
pub struct PersistentVector<T> {
    /// Total number of elements
    length: usize,
    /// Root of the trie; `None` when every element lives in the focus
    root: Option<Child<T>>,
    /// Uncommitted buffer covering `focus_start..focus_start + focus.len()`
    focus: ReferenceCounter<[T]>,
    /// Global index of the first focus element
    focus_start: usize,
}

impl<T> PersistentVector<T> {
    /// Creates a new empty vector.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = PersistentVector::new();
    /// assert!(vector.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::from_root(None)
    }

    /// Creates a vector containing a single element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::singleton(42);
    /// assert_eq!(vector.len(), 1);
    /// assert_eq!(vector.get(0), Some(&42));
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self {
            length: 1,
            root: None,
            focus: ReferenceCounter::from(vec![element]),
            focus_start: 0,
        }
    }

    /// A vector holding exactly the elements of `root`, with an empty focus
    /// at its end.
    fn from_root(root: Option<Child<T>>) -> Self {
        let length = root.as_ref().map_or(0, |root| root.len());
        Self {
            length,
            root,
            focus: ReferenceCounter::from(Vec::new()),
            focus_start: length,
        }
    }

    /// Assembles a vector from a trie and a focus window starting at
    /// `focus_start`.
    pub(super) fn from_trie(root: Option<Child<T>>, focus: Vec<T>, focus_start: usize) -> Self {
        let root_length = root.as_ref().map_or(0, |root| root.len());
        Self {
            length: root_length + focus.len(),
            root,
            focus: ReferenceCounter::from(focus),
            focus_start,
        }
    }

    /// Returns the number of elements in the vector.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.len(), 5);
    /// ```
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the vector contains no elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let empty: PersistentVector<i32> = PersistentVector::new();
    /// assert!(empty.is_empty());
    ///
    /// let non_empty = empty.push_back(1);
    /// assert!(!non_empty.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[inline]
    fn root(&self) -> Option<&Child<T>> {
        self.root.as_ref()
    }

    #[inline]
    fn focus(&self) -> &[T] {
        &self.focus
    }

    #[inline]
    const fn focus_start(&self) -> usize {
        self.focus_start
    }

    #[inline]
    fn focus_end(&self) -> usize {
        self.focus_start + self.focus.len()
    }

    fn into_parts(self) -> (Option<Child<T>>, ReferenceCounter<[T]>) {
        (self.root, self.focus)
    }

    /// Maps a global index outside the focus window to its index in the trie.
    #[inline]
    fn root_index(&self, index: usize) -> usize {
        if index < self.focus_start {
            index
        } else {
            index - self.focus.len()
        }
    }

    /// Returns a reference to the element at the given index.
    ///
    /// Returns `None` if the index is out of bounds.
    ///
    /// # Complexity
    ///
    /// O(1) inside the focus window, O(log32 N) otherwise
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.get(0), Some(&1));
    /// assert_eq!(vector.get(4), Some(&5));
    /// assert_eq!(vector.get(10), None);
    /// ```
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.length {
            return None;
        }
        if (self.focus_start..self.focus_end()).contains(&index) {
            return self.focus.get(index - self.focus_start);
        }
        self.root.as_ref()?.get(self.root_index(index))
    }

    /// Returns a reference to the first element.
    ///
    /// Returns `None` if the vector is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.first(), Some(&1));
    ///
    /// let empty: PersistentVector<i32> = PersistentVector::new();
    /// assert_eq!(empty.first(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns a reference to the last element.
    ///
    /// Returns `None` if the vector is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.last(), Some(&5));
    /// ```
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.length.checked_sub(1).and_then(|index| self.get(index))
    }

    /// Returns an iterator over references to the elements.
    ///
    /// The iterator yields elements from front to back in O(N) time using
    /// a stack-based walk that visits each node exactly once.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let collected: Vec<&i32> = vector.iter().collect();
    /// assert_eq!(collected, vec![&1, &2, &3, &4, &5]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentVectorIterator<'_, T> {
        PersistentVectorIterator::new(self)
    }
}

impl<T: Clone> PersistentVector<T> {
    /// Appends an element to the back of the vector.
    ///
    /// # Complexity
    ///
    /// O(log32 N) amortized O(1) due to the focus window
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::new()
    ///     .push_back(1)
    ///     .push_back(2)
    ///     .push_back(3);
    ///
    /// assert_eq!(vector.len(), 3);
    /// assert_eq!(vector.get(2), Some(&3));
    /// ```
    #[must_use]
    pub fn push_back(&self, element: T) -> Self {
        self.insert_unchecked(self.length, element)
    }

    /// Prepends an element to the front of the vector.
    ///
    /// # Complexity
    ///
    /// O(log N) amortized O(1) due to the focus window
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// let with_zero = vector.push_front(0);
    ///
    /// assert_eq!(with_zero.get(0), Some(&0));
    /// assert_eq!(with_zero.get(1), Some(&1));
    /// ```
    #[must_use]
    pub fn push_front(&self, element: T) -> Self {
        self.insert_unchecked(0, element)
    }

    /// Inserts an element at `index`, shifting later elements back.
    ///
    /// `index == self.len()` appends.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IndexOutOfBounds`] if `index > self.len()`.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..5).collect();
    /// let inserted = vector.insert(2, 100).unwrap();
    ///
    /// let collected: Vec<i32> = inserted.iter().copied().collect();
    /// assert_eq!(collected, vec![0, 1, 100, 2, 3, 4]);
    /// assert!(vector.insert(6, 0).is_err());
    /// ```
    pub fn insert(&self, index: usize, element: T) -> Result<Self, VectorError> {
        if index > self.length {
            return Err(VectorError::IndexOutOfBounds {
                index,
                length: self.length,
            });
        }
        Ok(self.insert_unchecked(index, element))
    }

    /// Inserts through the focus window, evicting it into the trie first when
    /// it is full or `index` is not adjacent to it.
    fn insert_unchecked(&self, index: usize, element: T) -> Self {
        let adjacent =
            self.focus.is_empty() || (self.focus_start..=self.focus_end()).contains(&index);
        if adjacent && self.focus.len() < BRANCHING_FACTOR {
            let focus_start = if self.focus.is_empty() {
                index
            } else {
                self.focus_start
            };
            let mut focus = self.focus.to_vec();
            focus.insert(index - focus_start, element);
            return Self {
                length: self.length + 1,
                root: self.root.clone(),
                focus: ReferenceCounter::from(focus),
                focus_start,
            };
        }

        Self {
            length: self.length + 1,
            root: self.evict_focus(),
            focus: ReferenceCounter::from(vec![element]),
            focus_start: index,
        }
    }

    /// Returns the root with the focus window pushed into it.
    fn evict_focus(&self) -> Option<Child<T>> {
        if self.focus.is_empty() {
            return self.root.clone();
        }
        tracing::trace!(
            focus_start = self.focus_start,
            focus_length = self.focus.len(),
            "evicting focus into trie"
        );
        Some(ReferenceCounter::new(match &self.root {
            None => Node::Leaf(LeafNode::from_vec(self.focus.to_vec())),
            Some(root) => Node::push_focus(root, self.focus_start, &self.focus),
        }))
    }

    /// Replaces the element at `index`.
    ///
    /// An index equal to `self.len()` appends, matching [`insert`](Self::insert)
    /// at the same position.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IndexOutOfBounds`] if `index > self.len()`.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let updated = vector.update(2, 100).unwrap();
    ///
    /// assert_eq!(updated.get(2), Some(&100));
    /// assert_eq!(vector.get(2), Some(&3)); // Original unchanged
    ///
    /// let appended = vector.update(5, 6).unwrap();
    /// assert_eq!(appended.len(), 6);
    /// ```
    pub fn update(&self, index: usize, element: T) -> Result<Self, VectorError> {
        if index == self.length {
            return Ok(self.push_back(element));
        }
        if index > self.length {
            return Err(VectorError::IndexOutOfBounds {
                index,
                length: self.length,
            });
        }

        if (self.focus_start..self.focus_end()).contains(&index) {
            let mut focus = self.focus.to_vec();
            focus[index - self.focus_start] = element;
            return Ok(Self {
                length: self.length,
                root: self.root.clone(),
                focus: ReferenceCounter::from(focus),
                focus_start: self.focus_start,
            });
        }

        let root_index = self.root_index(index);
        Ok(Self {
            length: self.length,
            root: self
                .root
                .as_ref()
                .map(|root| ReferenceCounter::new(root.replace(root_index, element))),
            focus: self.focus.clone(),
            focus_start: self.focus_start,
        })
    }

    /// Appends multiple elements to the back of the vector.
    ///
    /// The elements are written through a [`TransientVector`], so only the
    /// nodes along the right edge are copied, once.
    ///
    /// # Complexity
    ///
    /// O(M + log N) where M = `iter.count()`, N = `self.len()`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// let extended = vector.push_back_many(4..=6);
    ///
    /// assert_eq!(extended.len(), 6);
    /// let collected: Vec<i32> = extended.iter().copied().collect();
    /// assert_eq!(collected, vec![1, 2, 3, 4, 5, 6]);
    /// ```
    #[must_use]
    pub fn push_back_many<I>(&self, iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut elements = iter.into_iter().peekable();
        if elements.peek().is_none() {
            return self.clone();
        }
        let mut transient = self.transient();
        transient.extend(elements);
        transient.persistent()
    }

    /// Creates a `PersistentVector` from a slice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::from_slice(&[1, 2, 3, 4, 5]);
    /// assert_eq!(vector.len(), 5);
    /// assert_eq!(vector.get(0), Some(&1));
    /// ```
    #[must_use]
    pub fn from_slice(slice: &[T]) -> Self {
        slice.iter().cloned().collect()
    }

    /// Appends another vector to this vector.
    ///
    /// # Complexity
    ///
    /// O(M + log N) where M is the length of other
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector1: PersistentVector<i32> = (1..=3).collect();
    /// let vector2: PersistentVector<i32> = (4..=6).collect();
    /// let combined = vector1.append(&vector2);
    ///
    /// assert_eq!(combined.len(), 6);
    /// ```
    #[must_use]
    pub fn append(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        self.push_back_many(other.iter().cloned())
    }

    /// Removes the last element from the vector.
    ///
    /// Returns `None` if the vector is empty, otherwise returns the new vector
    /// and the removed element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let (remaining, element) = vector.pop_back().unwrap();
    ///
    /// assert_eq!(element, 5);
    /// assert_eq!(remaining.len(), 4);
    /// ```
    #[must_use]
    pub fn pop_back(&self) -> Option<(Self, T)> {
        let last = self.last()?.clone();
        if !self.focus.is_empty() && self.focus_end() == self.length {
            let remaining = Self {
                length: self.length - 1,
                root: self.root.clone(),
                focus: ReferenceCounter::from(&self.focus[..self.focus.len() - 1]),
                focus_start: self.focus_start,
            };
            return Some((remaining, last));
        }
        Some((self.take(self.length - 1), last))
    }

    /// Removes the first element from the vector.
    ///
    /// Returns `None` if the vector is empty, otherwise returns the new vector
    /// and the removed element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let (remaining, element) = vector.pop_front().unwrap();
    ///
    /// assert_eq!(element, 1);
    /// assert_eq!(remaining.len(), 4);
    /// assert_eq!(remaining.get(0), Some(&2));
    /// ```
    #[must_use]
    pub fn pop_front(&self) -> Option<(Self, T)> {
        let first = self.first()?.clone();
        if !self.focus.is_empty() && self.focus_start == 0 {
            let remaining = Self {
                length: self.length - 1,
                root: self.root.clone(),
                focus: ReferenceCounter::from(&self.focus[1..]),
                focus_start: 0,
            };
            return Some((remaining, first));
        }
        Some((self.drop_first(1), first))
    }

    /// Returns a new vector containing the first `count` elements.
    ///
    /// If `count` exceeds the vector's length, returns a copy of the entire
    /// vector. The trie is cut along a single path, so the prefix shares every
    /// node left of the cut.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.take(3), PersistentVector::from_slice(&[1, 2, 3]));
    /// assert_eq!(vector.take(10).len(), 5);
    /// assert!(vector.take(0).is_empty());
    /// ```
    #[must_use]
    pub fn take(&self, count: usize) -> Self {
        if count >= self.length {
            return self.clone();
        }
        if count == 0 {
            return Self::new();
        }

        if count <= self.focus_start {
            return Self::from_root(trie_prefix(self.root.as_ref(), count));
        }
        if count >= self.focus_end() {
            return Self {
                length: count,
                root: trie_prefix(self.root.as_ref(), count - self.focus.len()),
                focus: self.focus.clone(),
                focus_start: self.focus_start,
            };
        }
        Self::from_root(trie_prefix(self.evict_focus().as_ref(), count))
    }

    /// Returns a new vector with the first `count` elements removed.
    ///
    /// If `count` exceeds the vector's length, returns an empty vector.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.drop_first(2), PersistentVector::from_slice(&[3, 4, 5]));
    /// assert!(vector.drop_first(10).is_empty());
    /// assert_eq!(vector.drop_first(0).len(), 5);
    /// ```
    #[must_use]
    pub fn drop_first(&self, count: usize) -> Self {
        if count == 0 {
            return self.clone();
        }
        if count >= self.length {
            return Self::new();
        }

        if count >= self.focus_end() {
            return Self::from_root(trie_suffix(
                self.root.as_ref(),
                count - self.focus.len(),
            ));
        }
        if count <= self.focus_start {
            return Self {
                length: self.length - count,
                root: trie_suffix(self.root.as_ref(), count),
                focus: self.focus.clone(),
                focus_start: self.focus_start - count,
            };
        }
        Self::from_root(trie_suffix(self.evict_focus().as_ref(), count))
    }

    /// Splits the vector at the given index.
    ///
    /// This is equivalent to `(self.take(index), self.drop_first(index))`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let (left, right) = vector.split_at(2);
    /// assert_eq!(left.len(), 2);
    /// assert_eq!(right.get(0), Some(&3));
    /// ```
    #[must_use]
    pub fn split_at(&self, index: usize) -> (Self, Self) {
        (self.take(index), self.drop_first(index))
    }

    /// Opens a [`TransientVector`] session over this vector.
    ///
    /// The builder shares every node with `self` until it writes to it. When
    /// the focus window sits at the end it becomes the builder's tail;
    /// otherwise it is pushed into the trie first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..10).collect();
    /// let mut transient = vector.transient();
    /// transient.push_back(10);
    /// let extended = transient.persistent();
    ///
    /// assert_eq!(vector.len(), 10);
    /// assert_eq!(extended.len(), 11);
    /// ```
    #[must_use]
    pub fn transient(&self) -> TransientVector<T> {
        if self.focus_end() == self.length {
            let tail: ArrayVec<T, BRANCHING_FACTOR> = self.focus.iter().cloned().collect();
            TransientVector::from_trie(self.root.clone(), tail)
        } else {
            TransientVector::from_trie(self.evict_focus(), ArrayVec::new())
        }
    }
}

/// The first `count` elements of a trie, with single-child levels removed.
fn trie_prefix<T: Clone>(root: Option<&Child<T>>, count: usize) -> Option<Child<T>> {
    let root = root?;
    (count > 0).then(|| Node::collapse(Node::take(root, count)))
}

/// A trie without its first `count` elements, with single-child levels
/// removed.
fn trie_suffix<T: Clone>(root: Option<&Child<T>>, count: usize) -> Option<Child<T>> {
    let root = root?;
    (count < root.len()).then(|| Node::collapse(Node::drop_front(root, count)))
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentVector<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FromIterator<T> for PersistentVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        TransientVector::from_iter(iter).persistent()
    }
}

impl<T: Clone> Extend<T> for PersistentVector<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        *self = self.push_back_many(iter);
    }
}

impl<T: Clone> IntoIterator for PersistentVector<T> {
    type Item = T;
    type IntoIter = PersistentVectorIntoIterator<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        PersistentVectorIntoIterator::new(self)
    }
}

impl<'a, T> IntoIterator for &'a PersistentVector<T> {
    type Item = &'a T;
    type IntoIter = PersistentVectorIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> Index<usize> for PersistentVector<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Some(element) => element,
            None => panic!(
                "index out of bounds: the len is {} but the index is {index}",
                self.length
            ),
        }
    }
}

impl<T: PartialEq> PartialEq for PersistentVector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for PersistentVector<T> {}

/// Hashes the length first, then each element in order, so equal vectors
/// hash equally regardless of their internal shape.
///
/// # Examples
///
/// ```rust
/// use rrb_vector::persistent::PersistentVector;
/// use std::collections::HashMap;
///
/// let mut map: HashMap<PersistentVector<i32>, &str> = HashMap::new();
/// let key: PersistentVector<i32> = (1..=3).collect();
/// map.insert(key.clone(), "value");
///
/// let same_elements = PersistentVector::new().push_front(3).push_front(2).push_front(1);
/// assert_eq!(map.get(&same_elements), Some(&"value"));
/// ```
impl<T: Hash> Hash for PersistentVector<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        for (position, element) in self.iter().enumerate() {
            if position > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for PersistentVector<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentVectorVisitor<T> {
    marker: std::marker::PhantomData<T>,
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Visitor<'de> for PersistentVectorVisitor<T>
where
    T: serde::Deserialize<'de> + Clone,
{
    type Value = PersistentVector<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut transient = TransientVector::new();
        while let Some(element) = seq.next_element()? {
            transient.push_back(element);
        }
        Ok(transient.persistent())
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentVector<T>
where
    T: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(PersistentVectorVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================


// =============================================================================
// Thread Safety Tests (arc feature only)
// =============================================================================


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_serialize_empty() {
        let vector: PersistentVector<i32> = PersistentVector::new();
        assert_eq!(serde_json::to_string(&vector).unwrap(), "[]");
    }

    #[rstest]
    fn test_serialize_with_inner_focus() {
        let vector: PersistentVector<i32> = (1..=3).collect();
        let vector = vector.insert(1, 10).unwrap();
        assert_eq!(serde_json::to_string(&vector).unwrap(), "[1,10,2,3]");
    }

    #[rstest]
    fn test_roundtrip_large() {
        let original: PersistentVector<i32> = (1..=1000).collect();
        let json = serde_json::to_string(&original).unwrap();
        let restored: PersistentVector<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(original, restored);
    }

    #[rstest]
    fn test_deserialize_rejects_non_sequence() {
        let result: Result<PersistentVector<i32>, _> = serde_json::from_str("{\"a\": 1}");
        assert!(result.is_err());
    }
}
