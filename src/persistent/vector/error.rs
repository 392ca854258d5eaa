//! Error types for [`PersistentVector`](super::PersistentVector) and its nodes.

use thiserror::Error;

/// Errors reported by vector operations.
///
/// # Examples
///
/// ```rust
/// use rrb_vector::persistent::{PersistentVector, VectorError};
///
/// let vector: PersistentVector<i32> = (0..3).collect();
/// let error = vector.insert(10, 42).unwrap_err();
/// assert_eq!(error, VectorError::IndexOutOfBounds { index: 10, length: 3 });
/// assert_eq!(format!("{error}"), "index 10 is out of bounds for a vector of length 3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VectorError {
    /// The index lies outside the valid range of the operation.
    #[error("index {index} is out of bounds for a vector of length {length}")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The length of the vector at the time of the request.
        length: usize,
    },

    /// A relaxed node's cumulative size table disagrees with its children.
    #[error(
        "size table mismatch at slot {slot}: table records {expected} elements but children hold {actual}"
    )]
    SizeTableMismatch {
        /// The first slot whose cumulative count is wrong.
        slot: usize,
        /// The cumulative count stored in the table.
        expected: usize,
        /// The cumulative count derived from the children.
        actual: usize,
    },

    /// The node holds too few elements to be split in two.
    #[error("cannot split a node holding {length} element(s)")]
    UnsplittableNode {
        /// The number of elements under the node.
        length: usize,
    },
}
