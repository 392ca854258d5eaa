//! Transient (single-owner, mutable) vector builder.

use std::marker::PhantomData;
use std::num::NonZeroU64;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use arrayvec::ArrayVec;

use super::PersistentVector;
use super::error::VectorError;
use super::leaf::LeafNode;
use super::node::{BRANCHING_FACTOR, Child, Node, ensure_owned};
use crate::persistent::ReferenceCounter;

// =============================================================================
// Edit Tokens
// =============================================================================

/// Identifies one transient editing session.
///
/// Every node a session allocates or copies carries the session's token, and
/// a node is only mutated in place when its token matches. Tokens are never
/// reused, so nodes tagged by a committed session are never written again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EditToken(NonZeroU64);

impl EditToken {
    /// Draws a fresh token.
    pub(crate) fn acquire() -> Self {
        static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);
        let token = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
        Self(NonZeroU64::new(token).unwrap_or(NonZeroU64::MIN))
    }
}

// =============================================================================
// TransientVector Definition
// =============================================================================

/// A transient (temporarily mutable) vector for efficient batch appends.
///
/// `TransientVector` writes straight into trie nodes it owns instead of
/// copying the path from the root on every write. Appends go into a tail
/// buffer and every full tail is pushed into the trie in place. Call
/// [`persistent()`](Self::persistent) to freeze the result into a
/// [`PersistentVector`].
///
/// # Design
///
/// - Each builder holds a unique session token. Nodes shared with a
///   persistent vector are copied once, on first write, and tagged with it.
/// - `persistent()` consumes the builder, so a committed session cannot be
///   written to again.
/// - `PhantomData<Rc<()>>` makes the builder `!Send` and `!Sync`.
///
/// # Examples
///
/// ```rust
/// use rrb_vector::persistent::TransientVector;
///
/// let mut transient = TransientVector::new();
/// for element in 0..100 {
///     transient.push_back(element);
/// }
///
/// let vector = transient.persistent();
/// assert_eq!(vector.len(), 100);
/// assert_eq!(vector.get(42), Some(&42));
/// ```
///
/// # Transient-Persistent Pattern
///
/// ```rust
/// use rrb_vector::persistent::PersistentVector;
///
/// let original: PersistentVector<i32> = (0..50).collect();
///
/// let mut transient = original.transient();
/// transient.push_back(50).push_back(51);
/// transient.update(0, -1).unwrap();
///
/// let updated = transient.persistent();
/// assert_eq!(updated.len(), 52);
/// assert_eq!(updated.get(0), Some(&-1));
/// assert_eq!(original.get(0), Some(&0)); // Original unchanged
/// ```
pub struct TransientVector<T> {
    root: Option<Child<T>>,
    /// Number of elements under `root`.
    root_length: usize,
    tail: ArrayVec<T, BRANCHING_FACTOR>,
    edit: EditToken,
    /// Marker to ensure `!Send` and `!Sync`.
    _marker: PhantomData<Rc<()>>,
}

static_assertions::assert_not_impl_any!(TransientVector<i32>: Send, Sync);
static_assertions::assert_not_impl_any!(TransientVector<String>: Send, Sync);

// Even with Arc nodes the builder stays on one thread.
#[cfg(feature = "arc")]
mod arc_send_sync_verification_vector {
    use super::TransientVector;
    use std::sync::Arc;

    static_assertions::assert_not_impl_any!(TransientVector<Arc<i32>>: Send, Sync);
}

// =============================================================================
// TransientVector Implementation
// =============================================================================

impl<T> TransientVector<T> {
    /// Creates a new empty `TransientVector`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::TransientVector;
    ///
    /// let transient: TransientVector<i32> = TransientVector::new();
    /// assert!(transient.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::from_trie(None, ArrayVec::new())
    }

    /// Starts a session over an existing trie and tail.
    pub(super) fn from_trie(root: Option<Child<T>>, tail: ArrayVec<T, BRANCHING_FACTOR>) -> Self {
        let edit = EditToken::acquire();
        let root_length = root.as_ref().map_or(0, |root| root.len());
        tracing::debug!(
            ?edit,
            length = root_length + tail.len(),
            "starting transient vector session"
        );
        Self {
            root,
            root_length,
            tail,
            edit,
            _marker: PhantomData,
        }
    }

    /// Returns the number of elements in the builder.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.root_length + self.tail.len()
    }

    /// Returns `true` if the builder contains no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a reference to the element at the given index.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::TransientVector;
    ///
    /// let mut transient = TransientVector::new();
    /// transient.push_back("a").push_back("b");
    /// assert_eq!(transient.get(1), Some(&"b"));
    /// assert_eq!(transient.get(2), None);
    /// ```
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.root_length {
            self.root.as_ref()?.get(index)
        } else {
            self.tail.get(index - self.root_length)
        }
    }
}

impl<T: Clone> TransientVector<T> {
    /// Appends an element and returns the builder for chaining.
    ///
    /// # Complexity
    ///
    /// Amortized O(1)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::TransientVector;
    ///
    /// let mut transient = TransientVector::new();
    /// transient.push_back(1).push_back(2).push_back(3);
    /// assert_eq!(transient.len(), 3);
    /// ```
    pub fn push_back(&mut self, element: T) -> &mut Self {
        if self.tail.is_full() {
            self.flush_tail();
        }
        self.tail.push(element);
        self
    }

    /// Replaces the element at `index`, writing in place into owned nodes.
    ///
    /// Like [`PersistentVector::update`], an index equal to the length appends.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IndexOutOfBounds`] if `index > self.len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::{TransientVector, VectorError};
    ///
    /// let mut transient: TransientVector<i32> = (0..10).collect();
    /// transient.update(3, 30).unwrap();
    /// assert_eq!(transient.get(3), Some(&30));
    ///
    /// assert_eq!(
    ///     transient.update(11, 0).err(),
    ///     Some(VectorError::IndexOutOfBounds { index: 11, length: 10 })
    /// );
    /// ```
    pub fn update(&mut self, index: usize, element: T) -> Result<&mut Self, VectorError> {
        let length = self.len();
        if index == length {
            return Ok(self.push_back(element));
        }
        if index > length {
            return Err(VectorError::IndexOutOfBounds { index, length });
        }

        if index < self.root_length {
            if let Some(root) = self.root.as_mut() {
                ensure_owned(root, self.edit).set_in_place(index, element, self.edit);
            }
        } else {
            self.tail[index - self.root_length] = element;
        }
        Ok(self)
    }

    /// Freezes the builder into a [`PersistentVector`].
    ///
    /// The tail becomes the new vector's focus window, so further appends on
    /// the persistent side continue from where the builder stopped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrb_vector::persistent::TransientVector;
    ///
    /// let transient: TransientVector<i32> = (1..=3).collect();
    /// let vector = transient.persistent();
    /// assert_eq!(vector.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    /// ```
    ///
    /// The builder is consumed, so it cannot be written to after the commit:
    ///
    /// ```compile_fail,E0382
    /// use rrb_vector::persistent::TransientVector;
    ///
    /// let mut transient: TransientVector<i32> = TransientVector::new();
    /// let vector = transient.persistent();
    /// transient.push_back(1);
    /// ```
    #[must_use]
    pub fn persistent(self) -> PersistentVector<T> {
        tracing::debug!(edit = ?self.edit, length = self.len(), "committing transient vector");
        let focus: Vec<T> = self.tail.into_iter().collect();
        PersistentVector::from_trie(self.root, focus, self.root_length)
    }

    /// Pushes the full tail into the trie.
    fn flush_tail(&mut self) {
        let elements: Vec<T> = std::mem::take(&mut self.tail).into_iter().collect();
        let count = elements.len();
        let edit = self.edit;

        self.root = Some(match self.root.take() {
            None => ReferenceCounter::new(Node::Leaf(LeafNode::owned(elements, edit))),
            Some(mut root) if root.has_relaxed_capacity(self.root_length, count) => {
                ensure_owned(&mut root, edit).append_in_place(elements, edit);
                root
            }
            Some(root) => {
                ReferenceCounter::new(Node::push_focus(&root, self.root_length, &elements))
            }
        });
        self.root_length += count;
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for TransientVector<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Extend<T> for TransientVector<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.push_back(element);
        }
    }
}

impl<T: Clone> FromIterator<T> for TransientVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut transient = Self::new();
        transient.extend(iter);
        transient
    }
}

// =============================================================================
// Tests
// =============================================================================
