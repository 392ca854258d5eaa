//! Leaf nodes: the terminal level of the trie.

use super::node::{BITS_PER_LEVEL, BRANCHING_FACTOR, Child, MAX_LEAF_LENGTH, Node};
use super::relaxed::RelaxedNode;
use super::strict::StrictNode;
use super::transient::EditToken;
use crate::persistent::ReferenceCounter;

/// A node holding up to [`MAX_LEAF_LENGTH`] elements directly.
#[derive(Clone)]
pub(crate) struct LeafNode<T> {
    elements: Vec<T>,
    edit: Option<EditToken>,
}

impl<T> LeafNode<T> {
    #[inline]
    pub(crate) const fn from_vec(elements: Vec<T>) -> Self {
        Self {
            elements,
            edit: None,
        }
    }

    /// Creates a leaf already owned by the transient session `edit`.
    #[inline]
    pub(crate) const fn owned(elements: Vec<T>, edit: EditToken) -> Self {
        Self {
            elements,
            edit: Some(edit),
        }
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.elements.get(index)
    }

    #[inline]
    pub(crate) fn elements(&self) -> &[T] {
        &self.elements
    }

    #[inline]
    pub(crate) const fn edit(&self) -> Option<EditToken> {
        self.edit
    }

    #[inline]
    pub(crate) const fn set_edit(&mut self, edit: EditToken) {
        self.edit = Some(edit);
    }

    /// Whether `count` more elements fit without exceeding the leaf bound.
    #[inline]
    pub(crate) const fn has_capacity(&self, count: usize) -> bool {
        self.elements.len() + count <= MAX_LEAF_LENGTH
    }

    pub(crate) fn extend_in_place(&mut self, elements: Vec<T>) {
        self.elements.extend(elements);
    }

    pub(crate) fn set_in_place(&mut self, index: usize, element: T) {
        if let Some(slot) = self.elements.get_mut(index) {
            *slot = element;
        }
    }
}

impl<T: Clone> LeafNode<T> {
    /// Inserts `buffer` at `index`.
    ///
    /// - An empty leaf adopts the buffer.
    /// - A full-width buffer landing on either end of a full-width leaf yields
    ///   a two-child strict node, so pure appends stay on the strict path.
    /// - If the merged contents fit, the result is a single larger leaf.
    /// - Otherwise the merged contents are cut at the midpoint into two leaves
    ///   under a relaxed node.
    pub(crate) fn push_focus(&self, this: &Child<T>, index: usize, buffer: &[T]) -> Node<T> {
        if self.elements.is_empty() {
            return Node::Leaf(Self::from_vec(buffer.to_vec()));
        }

        let length = self.len();
        if length == BRANCHING_FACTOR
            && buffer.len() == BRANCHING_FACTOR
            && (index == 0 || index == length)
        {
            let incoming = ReferenceCounter::new(Node::Leaf(Self::from_vec(buffer.to_vec())));
            let children = if index == 0 {
                vec![incoming, this.clone()]
            } else {
                vec![this.clone(), incoming]
            };
            return Node::Strict(StrictNode::new(BITS_PER_LEVEL, children));
        }

        let merged = self.spliced(index, buffer);
        if merged.len() <= MAX_LEAF_LENGTH {
            return Node::Leaf(Self::from_vec(merged));
        }

        let (left, right) = Self::from_vec(merged).halve();
        tracing::trace!(
            left = left.len(),
            right = right.len(),
            "split overflowing leaf"
        );
        Node::Relaxed(RelaxedNode::from_children(
            BITS_PER_LEVEL,
            vec![
                ReferenceCounter::new(Node::Leaf(left)),
                ReferenceCounter::new(Node::Leaf(right)),
            ],
        ))
    }

    /// Inserts `buffer` at `index` and cuts the result into two leaves.
    ///
    /// Used by a relaxed parent when this leaf cannot absorb the buffer.
    pub(crate) fn merge_halves(&self, index: usize, buffer: &[T]) -> (Self, Self) {
        Self::from_vec(self.spliced(index, buffer)).halve()
    }

    fn spliced(&self, index: usize, buffer: &[T]) -> Vec<T> {
        let mut merged = Vec::with_capacity(self.len() + buffer.len());
        merged.extend_from_slice(&self.elements[..index]);
        merged.extend_from_slice(buffer);
        merged.extend_from_slice(&self.elements[index..]);
        merged
    }

    pub(crate) fn replace(&self, index: usize, element: T) -> Self {
        let mut elements = self.elements.clone();
        elements[index] = element;
        Self::from_vec(elements)
    }

    /// Cuts the leaf at its midpoint.
    pub(crate) fn halve(&self) -> (Self, Self) {
        let middle = self.len() / 2;
        (
            Self::from_vec(self.elements[..middle].to_vec()),
            Self::from_vec(self.elements[middle..].to_vec()),
        )
    }

    pub(crate) fn take(&self, count: usize) -> Self {
        Self::from_vec(self.elements[..count].to_vec())
    }

    pub(crate) fn drop_front(&self, count: usize) -> Self {
        Self::from_vec(self.elements[count..].to_vec())
    }
}
