//! Strict nodes: densely packed internal nodes indexed by bit arithmetic.
//!
//! A strict node at shift `s` routes a local index `i` to child `i >> s` and
//! passes `i & ((1 << s) - 1)` down. This only works while every child except
//! the last is full, so strict nodes only grow by whole-leaf appends at their
//! end. Any other write degrades the node to a [`RelaxedNode`].

use super::leaf::LeafNode;
use super::node::{BITS_PER_LEVEL, BRANCHING_FACTOR, Child, Node, ensure_owned};
use super::relaxed::RelaxedNode;
use super::transient::EditToken;
use crate::persistent::ReferenceCounter;

#[derive(Clone)]
pub(crate) struct StrictNode<T> {
    /// `height * BITS_PER_LEVEL`; always at least `BITS_PER_LEVEL`.
    shift: usize,
    /// Total number of elements under this node.
    length: usize,
    children: Vec<Child<T>>,
    edit: Option<EditToken>,
}

impl<T> StrictNode<T> {
    pub(crate) fn new(shift: usize, children: Vec<Child<T>>) -> Self {
        let length = children.iter().map(|child| child.len()).sum();
        Self {
            shift,
            length,
            children,
            edit: None,
        }
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.length
    }

    #[cfg(test)]
    pub(crate) const fn shift(&self) -> usize {
        self.shift
    }

    #[inline]
    pub(crate) fn children(&self) -> &[Child<T>] {
        &self.children
    }

    #[inline]
    pub(crate) const fn edit(&self) -> Option<EditToken> {
        self.edit
    }

    #[inline]
    pub(crate) const fn set_edit(&mut self, edit: EditToken) {
        self.edit = Some(edit);
    }

    /// Maximum number of elements this node can reach at its height.
    #[inline]
    const fn capacity(&self) -> usize {
        BRANCHING_FACTOR << self.shift
    }

    #[inline]
    const fn is_full(&self) -> bool {
        self.length == self.capacity()
    }

    #[inline]
    const fn low_bits(&self) -> usize {
        (1 << self.shift) - 1
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.children
            .get(index >> self.shift)?
            .get(index & self.low_bits())
    }

    /// Whether pushing `count` elements at `index` is a whole-leaf append at a
    /// leaf-aligned end.
    #[inline]
    const fn is_aligned_append(&self, index: usize, count: usize) -> bool {
        index == self.length && count == BRANCHING_FACTOR && self.length % BRANCHING_FACTOR == 0
    }

    pub(crate) const fn has_strict_capacity(&self, index: usize, count: usize) -> bool {
        self.is_aligned_append(index, count) && !self.is_full()
    }

    /// A strict node only lacks room when an aligned append would have to grow
    /// it. Every other push degrades it to a relaxed node, which always has a
    /// spare slot because `BRANCHING_FACTOR < MAX_DEGREE`.
    pub(crate) const fn has_relaxed_capacity(&self, index: usize, count: usize) -> bool {
        !(self.is_aligned_append(index, count) && self.is_full())
    }

    /// Converts this node to a relaxed node over the same children.
    ///
    /// The derived size table is `(i + 1) << shift` for every full child.
    pub(crate) fn to_relaxed(&self) -> RelaxedNode<T> {
        tracing::trace!(
            shift = self.shift,
            children = self.children.len(),
            "degrading strict node to relaxed"
        );
        RelaxedNode::from_children(self.shift, self.children.clone())
    }
}

/// Builds a chain of single-child strict nodes reaching from `shift` down to
/// `leaf`. A shift of zero returns the leaf itself.
pub(crate) fn new_path<T>(shift: usize, leaf: Child<T>, edit: Option<EditToken>) -> Child<T> {
    let length = leaf.len();
    let mut node = leaf;
    let mut level = BITS_PER_LEVEL;
    while level <= shift {
        node = ReferenceCounter::new(Node::Strict(StrictNode {
            shift: level,
            length,
            children: vec![node],
            edit,
        }));
        level += BITS_PER_LEVEL;
    }
    node
}

impl<T: Clone> StrictNode<T> {
    /// Pushes `buffer` at `index`.
    ///
    /// A whole-leaf append stays strict: it descends into the last child while
    /// that child has room, adds a skinny branch otherwise, and wraps `this`
    /// together with a new branch in a taller strict node when the node is
    /// full. Anything else degrades to a relaxed node first.
    pub(crate) fn push_focus(&self, this: &Child<T>, index: usize, buffer: &[T]) -> Node<T> {
        if !self.is_aligned_append(index, buffer.len()) {
            return self.to_relaxed().push_focus(index, buffer);
        }

        let leaf = ReferenceCounter::new(Node::Leaf(LeafNode::from_vec(buffer.to_vec())));
        if self.is_full() {
            tracing::debug!(shift = self.shift + BITS_PER_LEVEL, "growing strict trie");
            return Node::Strict(Self::new(
                self.shift + BITS_PER_LEVEL,
                vec![this.clone(), new_path(self.shift, leaf, None)],
            ));
        }
        Node::Strict(self.append_leaf(leaf))
    }

    /// Appends a full leaf to a node that is not full.
    fn append_leaf(&self, leaf: Child<T>) -> Self {
        let leaf_length = leaf.len();
        let mut children = self.children.clone();

        let descended = if self.shift > BITS_PER_LEVEL
            && let Some(last) = children.last_mut()
            && let Node::Strict(child) = last.as_ref()
            && !child.is_full()
        {
            *last = ReferenceCounter::new(Node::Strict(child.append_leaf(leaf.clone())));
            true
        } else {
            false
        };
        if !descended {
            children.push(new_path(self.shift - BITS_PER_LEVEL, leaf, None));
        }

        Self {
            shift: self.shift,
            length: self.length + leaf_length,
            children,
            edit: None,
        }
    }

    pub(crate) fn replace(&self, index: usize, element: T) -> Self {
        let slot = index >> self.shift;
        let mut children = self.children.clone();
        children[slot] = ReferenceCounter::new(
            self.children[slot].replace(index & self.low_bits(), element),
        );
        Self {
            shift: self.shift,
            length: self.length,
            children,
            edit: None,
        }
    }

    /// Keeps the first `count` elements. A prefix of a strict node is strict.
    pub(crate) fn take(&self, count: usize) -> Self {
        let slot = (count - 1) >> self.shift;
        let local = count - (slot << self.shift);
        let mut children = self.children[..slot].to_vec();
        children.push(Node::take(&self.children[slot], local));
        Self {
            shift: self.shift,
            length: count,
            children,
            edit: None,
        }
    }

    /// Appends a full leaf in place, copying only nodes not yet owned by
    /// `edit`. The node must not be full.
    pub(crate) fn append_leaf_in_place(&mut self, leaf: Child<T>, edit: EditToken) {
        self.length += leaf.len();

        let descend = self.shift > BITS_PER_LEVEL
            && self.children.last().is_some_and(
                |last| matches!(last.as_ref(), Node::Strict(child) if !child.is_full()),
            );
        if descend
            && let Some(last) = self.children.last_mut()
            && let Node::Strict(child) = ensure_owned(last, edit)
        {
            child.append_leaf_in_place(leaf, edit);
        } else {
            self.children
                .push(new_path(self.shift - BITS_PER_LEVEL, leaf, Some(edit)));
        }
    }

    pub(crate) fn set_in_place(&mut self, index: usize, element: T, edit: EditToken) {
        let low_bits = self.low_bits();
        if let Some(slot) = self.children.get_mut(index >> self.shift) {
            ensure_owned(slot, edit).set_in_place(index & low_bits, element, edit);
        }
    }
}
