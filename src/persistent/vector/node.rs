//! Trie nodes shared by persistent vectors and transient builders.
//!
//! A trie is built from three node shapes:
//!
//! - [`LeafNode`]: holds elements directly.
//! - [`StrictNode`]: a densely packed internal node indexed by bit shifts.
//!   Every child except the last is full and all leaves sit at the same depth.
//! - [`RelaxedNode`]: an internal node with a variable number of children and
//!   a cumulative size table, allowing inserts and splits anywhere.
//!
//! Nodes published in a persistent vector are never mutated. Writes copy the
//! path from the root to the affected leaf and share everything else. The only
//! in-place writes happen through [`ensure_owned`], which first checks the
//! node's [`EditToken`].

use super::error::VectorError;
use super::leaf::LeafNode;
use super::relaxed::RelaxedNode;
use super::strict::StrictNode;
use super::transient::EditToken;
use crate::persistent::ReferenceCounter;

// =============================================================================
// Constants
// =============================================================================

/// Bits of the index consumed by each strict level.
pub(super) const BITS_PER_LEVEL: usize = 5;

/// Branching factor of strict nodes (2^5 = 32).
pub(super) const BRANCHING_FACTOR: usize = 1 << BITS_PER_LEVEL;

/// Target lower bound for relaxed node degree.
pub(super) const MIN_DEGREE: usize = BRANCHING_FACTOR / 2;

/// Upper bound for relaxed node degree.
pub(super) const MAX_DEGREE: usize = BRANCHING_FACTOR + BRANCHING_FACTOR / 2;

/// Upper bound for the number of elements in a leaf.
pub(super) const MAX_LEAF_LENGTH: usize = MAX_DEGREE;

// Degrading a strict node to a relaxed one must not change its expected size.
static_assertions::const_assert_eq!(MIN_DEGREE + MAX_DEGREE, 2 * BRANCHING_FACTOR);
static_assertions::const_assert!(MAX_DEGREE / 2 >= MIN_DEGREE);

/// A reference-counted link to a node.
pub(crate) type Child<T> = ReferenceCounter<Node<T>>;

// =============================================================================
// Node Definition
// =============================================================================

#[derive(Clone)]
pub(crate) enum Node<T> {
    Leaf(LeafNode<T>),
    Strict(StrictNode<T>),
    Relaxed(RelaxedNode<T>),
}

impl<T> Node<T> {
    /// Number of elements reachable under this node.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Leaf(leaf) => leaf.len(),
            Self::Strict(strict) => strict.len(),
            Self::Relaxed(relaxed) => relaxed.len(),
        }
    }

    /// Height of the node expressed as a bit shift; leaves are at zero.
    #[cfg(test)]
    pub(crate) const fn shift(&self) -> usize {
        match self {
            Self::Leaf(_) => 0,
            Self::Strict(strict) => strict.shift(),
            Self::Relaxed(relaxed) => relaxed.shift(),
        }
    }

    /// Child links of an internal node, empty for leaves.
    #[inline]
    pub(crate) fn children(&self) -> &[Child<T>] {
        match self {
            Self::Leaf(_) => &[],
            Self::Strict(strict) => strict.children(),
            Self::Relaxed(relaxed) => relaxed.children(),
        }
    }

    pub(crate) const fn edit(&self) -> Option<EditToken> {
        match self {
            Self::Leaf(leaf) => leaf.edit(),
            Self::Strict(strict) => strict.edit(),
            Self::Relaxed(relaxed) => relaxed.edit(),
        }
    }

    fn set_edit(&mut self, edit: EditToken) {
        match self {
            Self::Leaf(leaf) => leaf.set_edit(edit),
            Self::Strict(strict) => strict.set_edit(edit),
            Self::Relaxed(relaxed) => relaxed.set_edit(edit),
        }
    }

    /// Returns the element at `index`, local to this node.
    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        match self {
            Self::Leaf(leaf) => leaf.get(index),
            Self::Strict(strict) => strict.get(index),
            Self::Relaxed(relaxed) => relaxed.get(index),
        }
    }

    /// Whether `count` elements can be pushed at `index` without changing the
    /// height of this node.
    pub(crate) fn has_relaxed_capacity(&self, index: usize, count: usize) -> bool {
        match self {
            Self::Leaf(leaf) => leaf.has_capacity(count),
            Self::Strict(strict) => strict.has_relaxed_capacity(index, count),
            Self::Relaxed(relaxed) => relaxed.has_relaxed_capacity(index, count),
        }
    }

    /// Strips single-child internal nodes off the top of a root.
    pub(crate) fn collapse(mut root: Child<T>) -> Child<T> {
        while let [only] = root.children() {
            let only = only.clone();
            root = only;
        }
        root
    }
}

impl<T: Clone> Node<T> {
    /// Inserts `buffer` at `index` and returns the replacement node.
    ///
    /// The result has the same height as `this` whenever
    /// [`has_relaxed_capacity`](Self::has_relaxed_capacity) holds; otherwise it
    /// is one level taller.
    pub(crate) fn push_focus(this: &Child<T>, index: usize, buffer: &[T]) -> Self {
        match this.as_ref() {
            Self::Leaf(leaf) => leaf.push_focus(this, index, buffer),
            Self::Strict(strict) => strict.push_focus(this, index, buffer),
            Self::Relaxed(relaxed) => relaxed.push_focus(index, buffer),
        }
    }

    /// Returns a copy of this node with the element at `index` replaced.
    pub(crate) fn replace(&self, index: usize, element: T) -> Self {
        match self {
            Self::Leaf(leaf) => Self::Leaf(leaf.replace(index, element)),
            Self::Strict(strict) => Self::Strict(strict.replace(index, element)),
            Self::Relaxed(relaxed) => Self::Relaxed(relaxed.replace(index, element)),
        }
    }

    /// Splits this node into two nodes of the same height.
    ///
    /// Internal nodes are cut at their child midpoint; a strict node is first
    /// degraded to a relaxed one. A node with a single child splits that child
    /// and wraps each half.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::UnsplittableNode`] if the node holds fewer than
    /// two elements.
    pub(crate) fn split(&self) -> Result<(Self, Self), VectorError> {
        let length = self.len();
        if length < 2 {
            return Err(VectorError::UnsplittableNode { length });
        }
        Ok(match self {
            Self::Leaf(leaf) => {
                let (left, right) = leaf.halve();
                (Self::Leaf(left), Self::Leaf(right))
            }
            Self::Strict(strict) => {
                let (left, right) = strict.to_relaxed().split()?;
                (Self::Relaxed(left), Self::Relaxed(right))
            }
            Self::Relaxed(relaxed) => {
                let (left, right) = relaxed.split()?;
                (Self::Relaxed(left), Self::Relaxed(right))
            }
        })
    }

    /// Keeps the first `count` elements of `this`.
    ///
    /// `count` must be greater than zero.
    pub(crate) fn take(this: &Child<T>, count: usize) -> Child<T> {
        if count >= this.len() {
            return this.clone();
        }
        ReferenceCounter::new(match this.as_ref() {
            Self::Leaf(leaf) => Self::Leaf(leaf.take(count)),
            Self::Strict(strict) => Self::Strict(strict.take(count)),
            Self::Relaxed(relaxed) => Self::Relaxed(relaxed.take(count)),
        })
    }

    /// Removes the first `count` elements of `this`.
    ///
    /// `count` must be smaller than the node's length.
    pub(crate) fn drop_front(this: &Child<T>, count: usize) -> Child<T> {
        if count == 0 {
            return this.clone();
        }
        ReferenceCounter::new(match this.as_ref() {
            Self::Leaf(leaf) => Self::Leaf(leaf.drop_front(count)),
            Self::Strict(strict) => Self::Relaxed(strict.to_relaxed().drop_front(count)),
            Self::Relaxed(relaxed) => Self::Relaxed(relaxed.drop_front(count)),
        })
    }

    // -------------------------------------------------------------------------
    // In-place operations for transient sessions
    // -------------------------------------------------------------------------

    /// Appends `elements` at the end of an owned node.
    ///
    /// The caller must have checked
    /// [`has_relaxed_capacity`](Self::has_relaxed_capacity) at the node's end.
    pub(crate) fn append_in_place(&mut self, elements: Vec<T>, edit: EditToken) {
        match self {
            Self::Leaf(leaf) => leaf.extend_in_place(elements),
            Self::Strict(strict) => {
                if strict.has_strict_capacity(strict.len(), elements.len()) {
                    let leaf = ReferenceCounter::new(Self::Leaf(LeafNode::owned(elements, edit)));
                    strict.append_leaf_in_place(leaf, edit);
                } else {
                    let mut relaxed = strict.to_relaxed();
                    relaxed.set_edit(edit);
                    relaxed.append_in_place(elements, edit);
                    *self = Self::Relaxed(relaxed);
                }
            }
            Self::Relaxed(relaxed) => relaxed.append_in_place(elements, edit),
        }
    }

    /// Overwrites the element at `index` in an owned node.
    pub(crate) fn set_in_place(&mut self, index: usize, element: T, edit: EditToken) {
        match self {
            Self::Leaf(leaf) => leaf.set_in_place(index, element),
            Self::Strict(strict) => strict.set_in_place(index, element, edit),
            Self::Relaxed(relaxed) => relaxed.set_in_place(index, element, edit),
        }
    }
}

/// Makes the node in `slot` exclusively owned by the session `edit` and
/// returns it for mutation.
///
/// A node whose token already matches is mutated where it is. Any other node
/// is shallow-copied, tagged with `edit`, and the copy replaces it in `slot`.
pub(crate) fn ensure_owned<T: Clone>(slot: &mut Child<T>, edit: EditToken) -> &mut Node<T> {
    if slot.edit() != Some(edit) {
        let mut copy = slot.as_ref().clone();
        copy.set_edit(edit);
        *slot = ReferenceCounter::new(copy);
    }
    ReferenceCounter::make_mut(slot)
}

// =============================================================================
// Invariant checks (tests only)
// =============================================================================

#[cfg(test)]
impl<T> Node<T> {
    /// Walks the whole subtree asserting every structural invariant.
    pub(crate) fn assert_invariants(&self) {
        match self {
            Self::Leaf(leaf) => {
                assert!(leaf.len() <= MAX_LEAF_LENGTH, "leaf of {} elements", leaf.len());
            }
            Self::Strict(strict) => {
                let children = strict.children();
                assert!(!children.is_empty(), "strict node without children");
                assert!(children.len() <= BRANCHING_FACTOR);
                let child_capacity = 1 << strict.shift();
                for (position, child) in children.iter().enumerate() {
                    assert_eq!(child.shift() + BITS_PER_LEVEL, strict.shift());
                    assert!(
                        !matches!(child.as_ref(), Self::Relaxed(_)),
                        "strict node with a relaxed child"
                    );
                    if position + 1 < children.len() {
                        assert_eq!(child.len(), child_capacity, "non-final strict child not full");
                    }
                    child.assert_invariants();
                }
                let total: usize = children.iter().map(|child| child.len()).sum();
                assert_eq!(total, strict.len());
            }
            Self::Relaxed(relaxed) => {
                let children = relaxed.children();
                assert!(!children.is_empty(), "relaxed node without children");
                assert!(children.len() <= MAX_DEGREE, "relaxed node of {}", children.len());
                assert_eq!(
                    super::size_table::verify(children, relaxed.end_indices()),
                    Ok(())
                );
                for child in children {
                    assert_eq!(child.shift() + BITS_PER_LEVEL, relaxed.shift());
                    assert!(!child.is_empty_node(), "empty child");
                    child.assert_invariants();
                }
            }
        }
    }

    fn is_empty_node(&self) -> bool {
        self.len() == 0
    }

    pub(crate) const fn is_strict(&self) -> bool {
        matches!(self, Self::Strict(_))
    }

    pub(crate) const fn is_relaxed(&self) -> bool {
        matches!(self, Self::Relaxed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn leaf(range: std::ops::Range<usize>) -> Child<usize> {
        ReferenceCounter::new(Node::Leaf(LeafNode::from_vec(range.collect())))
    }

    #[rstest]
    fn test_degree_bounds_average_to_branching_factor() {
        assert_eq!((MIN_DEGREE + MAX_DEGREE) / 2, BRANCHING_FACTOR);
    }

    #[rstest]
    fn test_split_rejects_single_element() {
        let node = leaf(0..1);
        assert_eq!(
            node.split().err(),
            Some(VectorError::UnsplittableNode { length: 1 })
        );
    }

    #[rstest]
    fn test_split_leaf_halves() {
        let node = leaf(0..10);
        let (left, right) = node.split().unwrap();
        assert_eq!(left.len() + right.len(), 10);
        assert_eq!(left.get(4), Some(&4));
        assert_eq!(right.get(0), Some(&5));
    }

    #[rstest]
    fn test_collapse_strips_single_child_chains() {
        let inner = leaf(0..32);
        let wrapped = ReferenceCounter::new(Node::Strict(StrictNode::new(
            BITS_PER_LEVEL,
            vec![inner.clone()],
        )));
        let collapsed = Node::collapse(wrapped);
        assert!(ReferenceCounter::ptr_eq(&collapsed, &inner));
    }

    #[rstest]
    fn test_ensure_owned_copies_foreign_node() {
        let edit = EditToken::acquire();
        let original = leaf(0..4);
        let mut slot = original.clone();
        ensure_owned(&mut slot, edit).set_in_place(0, 99, edit);

        assert!(!ReferenceCounter::ptr_eq(&slot, &original));
        assert_eq!(original.get(0), Some(&0));
        assert_eq!(slot.get(0), Some(&99));
        assert_eq!(slot.edit(), Some(edit));
    }

    #[rstest]
    fn test_ensure_owned_reuses_owned_node() {
        let edit = EditToken::acquire();
        let mut slot = leaf(0..4);
        ensure_owned(&mut slot, edit);
        let owned = ReferenceCounter::as_ptr(&slot);
        ensure_owned(&mut slot, edit).set_in_place(1, 7, edit);

        assert_eq!(ReferenceCounter::as_ptr(&slot), owned);
        assert_eq!(slot.get(1), Some(&7));
    }

    #[rstest]
    fn test_ensure_owned_rejects_other_session() {
        let first = EditToken::acquire();
        let second = EditToken::acquire();
        let mut slot = leaf(0..4);
        ensure_owned(&mut slot, first);
        let owned_by_first = ReferenceCounter::as_ptr(&slot);
        ensure_owned(&mut slot, second);

        assert_ne!(ReferenceCounter::as_ptr(&slot), owned_by_first);
        assert_eq!(slot.edit(), Some(second));
    }
}
