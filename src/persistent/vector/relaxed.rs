//! Relaxed nodes: internal nodes with a variable degree and a size table.
//!
//! A relaxed node holds between [`MIN_DEGREE`](super::node::MIN_DEGREE) and
//! [`MAX_DEGREE`] children of any size. Lookups search the cumulative size
//! table instead of shifting, which is what allows inserts in the middle of
//! the trie, splits, and slicing.

use super::error::VectorError;
use super::leaf::LeafNode;
use super::node::{BITS_PER_LEVEL, Child, MAX_DEGREE, Node, ensure_owned};
use super::size_table;
use super::strict::new_path;
use super::transient::EditToken;
use crate::persistent::ReferenceCounter;

#[derive(Clone)]
pub(crate) struct RelaxedNode<T> {
    shift: usize,
    children: Vec<Child<T>>,
    /// `end_indices[i]` is the number of elements under children `0..=i`.
    end_indices: Vec<usize>,
    edit: Option<EditToken>,
}

impl<T> RelaxedNode<T> {
    /// Creates a relaxed node, deriving the size table from `children`.
    pub(crate) fn from_children(shift: usize, children: Vec<Child<T>>) -> Self {
        let end_indices = size_table::from_children(&children);
        Self {
            shift,
            children,
            end_indices,
            edit: None,
        }
    }

    /// Creates a relaxed node from an explicit size table.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::SizeTableMismatch`] if the table does not match
    /// the children.
    pub(crate) fn try_from_parts(
        shift: usize,
        children: Vec<Child<T>>,
        end_indices: Vec<usize>,
    ) -> Result<Self, VectorError> {
        size_table::verify(&children, &end_indices)?;
        Ok(Self {
            shift,
            children,
            end_indices,
            edit: None,
        })
    }

    /// Creates a relaxed node from an explicit size table.
    ///
    /// # Panics
    ///
    /// Panics if the table does not match the children. A wrong table would
    /// silently misroute every later lookup.
    fn from_parts(shift: usize, children: Vec<Child<T>>, end_indices: Vec<usize>) -> Self {
        match Self::try_from_parts(shift, children, end_indices) {
            Ok(node) => node,
            Err(error) => panic!("{error}"),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.end_indices.last().copied().unwrap_or(0)
    }

    #[cfg(test)]
    pub(crate) const fn shift(&self) -> usize {
        self.shift
    }

    #[inline]
    pub(crate) fn children(&self) -> &[Child<T>] {
        &self.children
    }

    #[cfg(test)]
    pub(crate) fn end_indices(&self) -> &[usize] {
        &self.end_indices
    }

    #[inline]
    pub(crate) const fn edit(&self) -> Option<EditToken> {
        self.edit
    }

    #[inline]
    pub(crate) const fn set_edit(&mut self, edit: EditToken) {
        self.edit = Some(edit);
    }

    /// Returns the slot holding `index` and the index local to that slot.
    #[inline]
    fn locate(&self, index: usize) -> (usize, usize) {
        let slot = size_table::slot_for(&self.end_indices, index);
        (slot, index - size_table::start_of(&self.end_indices, slot))
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        let (slot, local) = self.locate(index);
        self.children[slot].get(local)
    }

    /// Whether `count` elements fit at `index` without growing this node: the
    /// target child can take them, or there is a spare slot to restructure
    /// that child into.
    pub(crate) fn has_relaxed_capacity(&self, index: usize, count: usize) -> bool {
        if self.children.len() < MAX_DEGREE {
            return true;
        }
        let (slot, local) = self.locate(index);
        self.children[slot].has_relaxed_capacity(local, count)
    }

    /// Cuts the child array at its midpoint. Requires at least two children.
    fn halve(&self) -> (Self, Self) {
        let middle = self.children.len() / 2;
        let offset = self.end_indices[middle - 1];
        tracing::trace!(
            shift = self.shift,
            left = middle,
            right = self.children.len() - middle,
            "splitting relaxed node"
        );
        (
            Self::from_parts(
                self.shift,
                self.children[..middle].to_vec(),
                self.end_indices[..middle].to_vec(),
            ),
            Self::from_parts(
                self.shift,
                self.children[middle..].to_vec(),
                size_table::rebase(&self.end_indices[middle..], offset),
            ),
        )
    }
}

impl<T: Clone> RelaxedNode<T> {
    /// Splits this node in two at the same height.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::UnsplittableNode`] if the node holds a single
    /// child that itself cannot be split.
    pub(crate) fn split(&self) -> Result<(Self, Self), VectorError> {
        if let [only] = self.children.as_slice() {
            let (left, right) = only.split()?;
            return Ok((
                Self::from_children(self.shift, vec![ReferenceCounter::new(left)]),
                Self::from_children(self.shift, vec![ReferenceCounter::new(right)]),
            ));
        }
        if self.children.is_empty() {
            return Err(VectorError::UnsplittableNode { length: 0 });
        }
        Ok(self.halve())
    }

    /// Pushes `buffer` at `index`.
    ///
    /// When the node has no room it is split first and the push retried on a
    /// new two-child parent, which makes the result one level taller.
    pub(crate) fn push_focus(&self, index: usize, buffer: &[T]) -> Node<T> {
        if self.has_relaxed_capacity(index, buffer.len()) {
            return Node::Relaxed(self.insert_focus(index, buffer));
        }
        let (left, right) = match self.split() {
            Ok(halves) => halves,
            // A node without room holds MAX_DEGREE children.
            Err(error) => unreachable!("{error}"),
        };
        tracing::debug!(shift = self.shift + BITS_PER_LEVEL, "growing relaxed trie");
        let parent = Self::from_children(
            self.shift + BITS_PER_LEVEL,
            vec![
                ReferenceCounter::new(Node::Relaxed(left)),
                ReferenceCounter::new(Node::Relaxed(right)),
            ],
        );
        Node::Relaxed(parent.insert_focus(index, buffer))
    }

    /// Pushes `buffer` at `index` into a node that has room for it.
    fn insert_focus(&self, index: usize, buffer: &[T]) -> Self {
        let (slot, local) = self.locate(index);
        let child = &self.children[slot];

        if child.has_relaxed_capacity(local, buffer.len()) {
            let mut children = self.children.clone();
            children[slot] = ReferenceCounter::new(Node::push_focus(child, local, buffer));
            let mut end_indices = self.end_indices.clone();
            size_table::shift_suffix(&mut end_indices, slot, buffer.len());
            return Self::from_parts(self.shift, children, end_indices);
        }

        let mut children = self.children.clone();
        match child.as_ref() {
            Node::Leaf(leaf) if local == 0 || local == leaf.len() => {
                let position = if local == 0 { slot } else { slot + 1 };
                let incoming = LeafNode::from_vec(buffer.to_vec());
                children.insert(position, ReferenceCounter::new(Node::Leaf(incoming)));
                Self::from_children(self.shift, children)
            }
            Node::Leaf(leaf) => {
                let (left, right) = leaf.merge_halves(local, buffer);
                children.splice(
                    slot..=slot,
                    [
                        ReferenceCounter::new(Node::Leaf(left)),
                        ReferenceCounter::new(Node::Leaf(right)),
                    ],
                );
                Self::from_children(self.shift, children)
            }
            Node::Strict(strict) => {
                children[slot] = ReferenceCounter::new(Node::Relaxed(strict.to_relaxed()));
                Self::from_parts(self.shift, children, self.end_indices.clone())
                    .insert_focus(index, buffer)
            }
            Node::Relaxed(relaxed) => {
                let (left, right) = relaxed.halve();
                children.splice(
                    slot..=slot,
                    [
                        ReferenceCounter::new(Node::Relaxed(left)),
                        ReferenceCounter::new(Node::Relaxed(right)),
                    ],
                );
                Self::from_children(self.shift, children).insert_focus(index, buffer)
            }
        }
    }

    pub(crate) fn replace(&self, index: usize, element: T) -> Self {
        let (slot, local) = self.locate(index);
        let mut children = self.children.clone();
        children[slot] = ReferenceCounter::new(self.children[slot].replace(local, element));
        Self {
            shift: self.shift,
            children,
            end_indices: self.end_indices.clone(),
            edit: None,
        }
    }

    /// Keeps the first `count` elements, `0 < count < len`.
    pub(crate) fn take(&self, count: usize) -> Self {
        let (slot, local) = self.locate(count - 1);
        let mut children = self.children[..slot].to_vec();
        children.push(Node::take(&self.children[slot], local + 1));
        let mut end_indices = self.end_indices[..slot].to_vec();
        end_indices.push(count);
        Self::from_parts(self.shift, children, end_indices)
    }

    /// Removes the first `count` elements, `0 < count < len`.
    pub(crate) fn drop_front(&self, count: usize) -> Self {
        let (slot, local) = self.locate(count);
        let mut children = Vec::with_capacity(self.children.len() - slot);
        children.push(Node::drop_front(&self.children[slot], local));
        children.extend_from_slice(&self.children[slot + 1..]);
        Self::from_parts(
            self.shift,
            children,
            size_table::rebase(&self.end_indices[slot..], count),
        )
    }

    /// Appends `elements` at the end of an owned node with room for them.
    ///
    /// Fills the last child while it can take the elements, otherwise hangs a
    /// new branch off a spare slot.
    pub(crate) fn append_in_place(&mut self, elements: Vec<T>, edit: EditToken) {
        let count = elements.len();
        let length = self.len();
        let last_slot = self.children.len() - 1;
        let local = length - size_table::start_of(&self.end_indices, last_slot);

        if self.children[last_slot].has_relaxed_capacity(local, count) {
            ensure_owned(&mut self.children[last_slot], edit).append_in_place(elements, edit);
            self.end_indices[last_slot] += count;
        } else {
            let leaf = ReferenceCounter::new(Node::Leaf(LeafNode::owned(elements, edit)));
            self.children
                .push(new_path(self.shift - BITS_PER_LEVEL, leaf, Some(edit)));
            self.end_indices.push(length + count);
        }
        debug_assert_eq!(size_table::verify(&self.children, &self.end_indices), Ok(()));
    }

    pub(crate) fn set_in_place(&mut self, index: usize, element: T, edit: EditToken) {
        let (slot, local) = self.locate(index);
        ensure_owned(&mut self.children[slot], edit).set_in_place(local, element, edit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistent::vector::node::{BRANCHING_FACTOR, MAX_LEAF_LENGTH};
    use rstest::rstest;

    fn leaf(range: std::ops::Range<usize>) -> Child<usize> {
        ReferenceCounter::new(Node::Leaf(LeafNode::from_vec(range.collect())))
    }

    /// Leaves of the given lengths holding consecutive integers from zero.
    fn consecutive_leaves(lengths: &[usize]) -> Vec<Child<usize>> {
        let mut start = 0;
        lengths
            .iter()
            .map(|&length| {
                let child = leaf(start..start + length);
                start += length;
                child
            })
            .collect()
    }

    fn collect(node: &Node<usize>) -> Vec<usize> {
        (0..node.len()).map(|index| *node.get(index).unwrap()).collect()
    }

    #[rstest]
    fn test_lookup_through_size_table() {
        let node = RelaxedNode::from_children(BITS_PER_LEVEL, consecutive_leaves(&[3, 7, 1, 5]));
        assert_eq!(node.len(), 16);
        for index in 0..16 {
            assert_eq!(node.get(index), Some(&index));
        }
        assert_eq!(node.get(16), None);
    }

    #[rstest]
    fn test_try_from_parts_rejects_wrong_table() {
        let result =
            RelaxedNode::try_from_parts(BITS_PER_LEVEL, consecutive_leaves(&[3, 7]), vec![3, 11]);
        assert_eq!(
            result.err(),
            Some(VectorError::SizeTableMismatch {
                slot: 1,
                expected: 11,
                actual: 10
            })
        );
    }

    #[rstest]
    #[should_panic(expected = "size table mismatch")]
    fn test_from_parts_fails_loudly() {
        let _ = RelaxedNode::from_parts(BITS_PER_LEVEL, consecutive_leaves(&[3, 7]), vec![4, 10]);
    }

    #[rstest]
    fn test_split_preserves_counts_and_order() {
        let lengths: Vec<usize> = (1..=20).collect();
        let node = RelaxedNode::from_children(BITS_PER_LEVEL, consecutive_leaves(&lengths));
        let (left, right) = node.split().unwrap();

        assert_eq!(left.len() + right.len(), node.len());
        assert_eq!(left.children().len(), 10);
        assert_eq!(right.children().len(), 10);

        let rejoined: Vec<&Child<usize>> =
            left.children().iter().chain(right.children()).collect();
        for (original, split) in node.children().iter().zip(rejoined) {
            assert!(ReferenceCounter::ptr_eq(original, split));
        }

        let left = Node::Relaxed(left);
        let right = Node::Relaxed(right);
        left.assert_invariants();
        right.assert_invariants();
        let mut elements = collect(&left);
        elements.extend(collect(&right));
        assert_eq!(elements, collect(&Node::Relaxed(node)));
    }

    #[rstest]
    fn test_split_rebases_nested_relaxed_children() {
        let lower_left = ReferenceCounter::new(Node::Relaxed(RelaxedNode::from_children(
            BITS_PER_LEVEL,
            consecutive_leaves(&[4, 6]),
        )));
        let lower_right = ReferenceCounter::new(Node::Relaxed(RelaxedNode::from_children(
            BITS_PER_LEVEL,
            vec![leaf(10..13), leaf(13..20)],
        )));
        let upper = RelaxedNode::from_children(2 * BITS_PER_LEVEL, vec![lower_left, lower_right]);
        let (left, right) = upper.split().unwrap();

        assert_eq!(left.end_indices(), &[10]);
        assert_eq!(right.end_indices(), &[10]);
        assert_eq!(collect(&Node::Relaxed(right)), (10..20).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_split_single_child_splits_grandchildren() {
        let node = RelaxedNode::from_children(BITS_PER_LEVEL, vec![leaf(0..9)]);
        let (left, right) = node.split().unwrap();
        assert_eq!(left.len(), 4);
        assert_eq!(right.len(), 5);
        assert_eq!(right.get(0), Some(&4));
    }

    #[rstest]
    fn test_insert_into_child_with_room_shifts_suffix() {
        let node = RelaxedNode::from_children(BITS_PER_LEVEL, consecutive_leaves(&[10, 10, 10]));
        let pushed = node.push_focus(12, &[100, 101, 102]);

        let Node::Relaxed(relaxed) = &pushed else {
            panic!("expected a relaxed node");
        };
        assert_eq!(relaxed.end_indices(), &[10, 23, 33]);
        assert!(ReferenceCounter::ptr_eq(&relaxed.children()[0], &node.children()[0]));
        assert!(ReferenceCounter::ptr_eq(&relaxed.children()[2], &node.children()[2]));
        let expected: Vec<usize> = (0..12).chain(100..103).chain(12..30).collect();
        assert_eq!(collect(&pushed), expected);
    }

    #[rstest]
    fn test_insert_at_full_leaf_start_adds_sibling() {
        let node = RelaxedNode::from_children(
            BITS_PER_LEVEL,
            consecutive_leaves(&[MAX_LEAF_LENGTH, MAX_LEAF_LENGTH]),
        );
        let buffer: Vec<usize> = (1000..1010).collect();
        let pushed = node.push_focus(MAX_LEAF_LENGTH, &buffer);

        assert_eq!(pushed.children().len(), 3);
        assert_eq!(pushed.children()[1].len(), 10);
        assert_eq!(pushed.get(MAX_LEAF_LENGTH), Some(&1000));
        assert_eq!(pushed.get(MAX_LEAF_LENGTH + 10), Some(&MAX_LEAF_LENGTH));
        pushed.assert_invariants();
    }

    #[rstest]
    fn test_insert_inside_full_leaf_splits_it() {
        let node = RelaxedNode::from_children(
            BITS_PER_LEVEL,
            consecutive_leaves(&[MAX_LEAF_LENGTH, MAX_LEAF_LENGTH]),
        );
        let buffer: Vec<usize> = (1000..1020).collect();
        let pushed = node.push_focus(10, &buffer);

        assert_eq!(pushed.children().len(), 3);
        assert_eq!(pushed.len(), 2 * MAX_LEAF_LENGTH + 20);
        let expected: Vec<usize> = (0..10)
            .chain(1000..1020)
            .chain(10..2 * MAX_LEAF_LENGTH)
            .collect();
        assert_eq!(collect(&pushed), expected);
        pushed.assert_invariants();
    }

    #[rstest]
    fn test_full_node_splits_before_push() {
        let node = RelaxedNode::from_children(
            BITS_PER_LEVEL,
            consecutive_leaves(&[MAX_LEAF_LENGTH; MAX_DEGREE]),
        );
        let buffer: Vec<usize> = (0..BRANCHING_FACTOR).map(|value| value + 1_000_000).collect();
        let pushed = node.push_focus(5, &buffer);

        assert_eq!(pushed.shift(), 2 * BITS_PER_LEVEL);
        assert_eq!(pushed.children().len(), 2);
        assert_eq!(pushed.len(), node.len() + BRANCHING_FACTOR);
        assert_eq!(pushed.get(5), Some(&1_000_000));
        assert_eq!(pushed.get(5 + BRANCHING_FACTOR), Some(&5));
        pushed.assert_invariants();
    }

    #[rstest]
    fn test_growth_reuses_split_halves() {
        let node = RelaxedNode::from_children(
            BITS_PER_LEVEL,
            consecutive_leaves(&[MAX_LEAF_LENGTH; MAX_DEGREE]),
        );
        let (left, right) = node.split().unwrap();
        let pushed = node.push_focus(5, &[usize::MAX]);

        let [pushed_left, pushed_right] = pushed.children() else {
            panic!("expected a two-child parent");
        };
        assert_eq!(pushed_left.len(), left.len() + 1);
        assert_eq!(pushed_right.len(), right.len());
        assert_eq!(pushed_right.children().len(), right.children().len());
        for (shared, original) in pushed_right.children().iter().zip(right.children()) {
            assert!(ReferenceCounter::ptr_eq(shared, original));
        }
        for (shared, original) in pushed_right
            .children()
            .iter()
            .zip(&node.children()[MAX_DEGREE / 2..])
        {
            assert!(ReferenceCounter::ptr_eq(shared, original));
        }
    }

    #[rstest]
    fn test_take_and_drop_front() {
        let node = RelaxedNode::from_children(BITS_PER_LEVEL, consecutive_leaves(&[5, 5, 5]));
        let taken = node.take(7);
        assert_eq!(taken.end_indices(), &[5, 7]);
        assert_eq!(collect(&Node::Relaxed(taken)), (0..7).collect::<Vec<_>>());

        let dropped = node.drop_front(7);
        assert_eq!(dropped.end_indices(), &[3, 8]);
        assert_eq!(collect(&Node::Relaxed(dropped)), (7..15).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_replace_shares_untouched_children() {
        let node = RelaxedNode::from_children(BITS_PER_LEVEL, consecutive_leaves(&[4, 4]));
        let replaced = node.replace(5, 99);
        assert_eq!(replaced.get(5), Some(&99));
        assert_eq!(node.get(5), Some(&5));
        assert!(ReferenceCounter::ptr_eq(&replaced.children()[0], &node.children()[0]));
    }
}
