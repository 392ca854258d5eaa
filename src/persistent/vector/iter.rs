//! Iterators over [`PersistentVector`].
//!
//! Both iterators walk the trie depth-first with an explicit stack, visiting
//! every node once, and splice the focus window in at its start index. Full
//! iteration is therefore O(N) rather than O(N log N).

use std::slice;

use smallvec::SmallVec;

use super::PersistentVector;
use super::node::{Child, Node};
use crate::persistent::ReferenceCounter;

/// Path depth kept inline before a traversal stack spills to the heap.
const INLINE_DEPTH: usize = 8;

// =============================================================================
// Borrowing Iterator
// =============================================================================

/// Depth-first walk over the leaves of a borrowed trie.
struct TrieWalk<'a, T> {
    /// Child arrays of the internal nodes on the current path, each with the
    /// index of the next child to visit.
    stack: SmallVec<[(&'a [Child<T>], usize); INLINE_DEPTH]>,
    leaf: slice::Iter<'a, T>,
}

impl<'a, T> TrieWalk<'a, T> {
    fn new(root: Option<&'a Child<T>>) -> Self {
        let mut walk = Self {
            stack: SmallVec::new(),
            leaf: slice::Iter::default(),
        };
        if let Some(root) = root {
            walk.enter(root);
        }
        walk
    }

    fn enter(&mut self, node: &'a Node<T>) {
        match node {
            Node::Leaf(leaf) => self.leaf = leaf.elements().iter(),
            Node::Strict(_) | Node::Relaxed(_) => self.stack.push((node.children(), 0)),
        }
    }

    /// Moves to the next non-exhausted leaf, returning `false` at the end.
    fn advance(&mut self) -> bool {
        while let Some((children, next)) = self.stack.last_mut() {
            let children: &'a [Child<T>] = *children;
            let Some(child) = children.get(*next) else {
                self.stack.pop();
                continue;
            };
            *next += 1;
            self.enter(child);
            if self.leaf.len() > 0 {
                return true;
            }
        }
        false
    }
}

impl<'a, T> Iterator for TrieWalk<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(element) = self.leaf.next() {
                return Some(element);
            }
            if !self.advance() {
                return None;
            }
        }
    }
}

/// An iterator over references to elements of a [`PersistentVector`].
///
/// Created by [`PersistentVector::iter`].
pub struct PersistentVectorIterator<'a, T> {
    trie: TrieWalk<'a, T>,
    focus: slice::Iter<'a, T>,
    focus_start: usize,
    /// Number of elements already returned.
    position: usize,
    length: usize,
}

impl<'a, T> PersistentVectorIterator<'a, T> {
    pub(super) fn new(vector: &'a PersistentVector<T>) -> Self {
        Self {
            trie: TrieWalk::new(vector.root()),
            focus: vector.focus().iter(),
            focus_start: vector.focus_start(),
            position: 0,
            length: vector.len(),
        }
    }
}

impl<'a, T> Iterator for PersistentVectorIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.length {
            return None;
        }
        let element = if self.position >= self.focus_start && self.focus.len() > 0 {
            self.focus.next()
        } else {
            self.trie.next()
        };
        self.position += 1;
        element
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.length - self.position;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for PersistentVectorIterator<'_, T> {}

// =============================================================================
// Owning Iterator
// =============================================================================

/// An owning iterator over elements of a [`PersistentVector`].
///
/// Holds reference-counted handles to the nodes on its current path, so the
/// trie stays alive while the iterator does. Elements are cloned out as
/// they are returned.
pub struct PersistentVectorIntoIterator<T> {
    stack: SmallVec<[(Child<T>, usize); INLINE_DEPTH]>,
    /// Current leaf and the index of its next element.
    leaf: Option<(Child<T>, usize)>,
    focus: ReferenceCounter<[T]>,
    focus_index: usize,
    focus_start: usize,
    position: usize,
    length: usize,
}

impl<T: Clone> PersistentVectorIntoIterator<T> {
    pub(super) fn new(vector: PersistentVector<T>) -> Self {
        let length = vector.len();
        let focus_start = vector.focus_start();
        let (root, focus) = vector.into_parts();
        let mut iterator = Self {
            stack: SmallVec::new(),
            leaf: None,
            focus,
            focus_index: 0,
            focus_start,
            position: 0,
            length,
        };
        if let Some(root) = root {
            iterator.enter(root);
        }
        iterator
    }

    fn enter(&mut self, node: Child<T>) {
        if matches!(node.as_ref(), Node::Leaf(_)) {
            self.leaf = Some((node, 0));
        } else {
            self.stack.push((node, 0));
        }
    }

    fn next_in_trie(&mut self) -> Option<T> {
        loop {
            if let Some((leaf, index)) = self.leaf.as_mut()
                && let Some(element) = leaf.get(*index)
            {
                *index += 1;
                return Some(element.clone());
            }
            self.leaf = None;

            let (node, next) = self.stack.last_mut()?;
            let Some(child) = node.children().get(*next).cloned() else {
                self.stack.pop();
                continue;
            };
            *next += 1;
            self.enter(child);
        }
    }
}

impl<T: Clone> Iterator for PersistentVectorIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.length {
            return None;
        }
        let element = if self.position >= self.focus_start && self.focus_index < self.focus.len() {
            self.focus_index += 1;
            self.focus.get(self.focus_index - 1).cloned()
        } else {
            self.next_in_trie()
        };
        self.position += 1;
        element
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.length - self.position;
        (remaining, Some(remaining))
    }
}

impl<T: Clone> ExactSizeIterator for PersistentVectorIntoIterator<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// A vector whose focus window sits in the middle of the trie.
    fn with_inner_focus() -> PersistentVector<usize> {
        let base: PersistentVector<usize> = (0..100).filter(|value| *value != 50).collect();
        base.insert(50, 50).unwrap()
    }

    #[rstest]
    fn test_iter_splices_inner_focus() {
        let vector = with_inner_focus();
        assert_eq!(vector.focus_start(), 50);
        let collected: Vec<usize> = vector.iter().copied().collect();
        assert_eq!(collected, (0..100).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_into_iter_splices_inner_focus() {
        let collected: Vec<usize> = with_inner_focus().into_iter().collect();
        assert_eq!(collected, (0..100).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_exact_size_counts_down() {
        let vector: PersistentVector<i32> = (0..70).collect();
        let mut iterator = vector.iter();
        assert_eq!(iterator.len(), 70);
        iterator.nth(9);
        assert_eq!(iterator.len(), 60);
    }

    #[rstest]
    fn test_deep_trie_walk() {
        let vector: PersistentVector<usize> = (0..40_000).collect();
        assert!(vector.iter().copied().eq(0..40_000));
        assert!(vector.into_iter().eq(0..40_000));
    }

    #[rstest]
    fn test_empty_iterators() {
        let vector: PersistentVector<i32> = PersistentVector::new();
        assert_eq!(vector.iter().next(), None);
        assert_eq!(vector.into_iter().next(), None);
    }
}
