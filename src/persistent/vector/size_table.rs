//! Cumulative size tables for relaxed nodes.
//!
//! Entry `i` of a size table is the number of elements held by children
//! `0..=i`. Every operation that changes a relaxed node's child array goes
//! through [`from_children`] or [`shift_suffix`], and [`verify`] is the one
//! place the table is reconciled against the children.

use super::error::VectorError;
use super::node::Child;

/// Rebuilds the cumulative size table for `children`.
pub(super) fn from_children<T>(children: &[Child<T>]) -> Vec<usize> {
    let mut total = 0;
    children
        .iter()
        .map(|child| {
            total += child.len();
            total
        })
        .collect()
}

/// Adds `delta` to every entry at or after `slot`.
pub(super) fn shift_suffix(end_indices: &mut [usize], slot: usize, delta: usize) {
    for end in &mut end_indices[slot..] {
        *end += delta;
    }
}

/// Subtracts `offset` from every entry, rebasing a table cut from the
/// right-hand side of another.
pub(super) fn rebase(end_indices: &[usize], offset: usize) -> Vec<usize> {
    end_indices.iter().map(|end| end - offset).collect()
}

/// Checks that `end_indices` matches the sizes of `children`.
pub(super) fn verify<T>(children: &[Child<T>], end_indices: &[usize]) -> Result<(), VectorError> {
    if children.len() != end_indices.len() {
        return Err(VectorError::SizeTableMismatch {
            slot: children.len().min(end_indices.len()),
            expected: end_indices.last().copied().unwrap_or(0),
            actual: children.iter().map(|child| child.len()).sum(),
        });
    }

    let mut total = 0;
    for (slot, (child, &expected)) in children.iter().zip(end_indices).enumerate() {
        total += child.len();
        if total != expected {
            return Err(VectorError::SizeTableMismatch {
                slot,
                expected,
                actual: total,
            });
        }
    }
    Ok(())
}

/// Returns the slot holding `index`.
///
/// An index equal to the final cumulative count belongs to the last slot, so
/// inserting at the end and appending land in the same child.
pub(super) fn slot_for(end_indices: &[usize], index: usize) -> usize {
    let slot = end_indices.partition_point(|&end| end <= index);
    slot.min(end_indices.len().saturating_sub(1))
}

/// Returns the number of elements held by the slots before `slot`.
pub(super) fn start_of(end_indices: &[usize], slot: usize) -> usize {
    if slot == 0 { 0 } else { end_indices[slot - 1] }
}
