//! Persistent (immutable) vector and its transient builder.
//!
//! - [`PersistentVector`]: Persistent vector (Relaxed Radix Balanced tree)
//! - [`TransientVector`]: Single-owner builder that writes into nodes in place
//!
//! # Structural Sharing
//!
//! Every write returns a new vector that shares all untouched nodes with the
//! vector it came from. Only the path from the root to the written position
//! is copied.
//!
//! # Examples
//!
//! ```rust
//! use rrb_vector::persistent::PersistentVector;
//!
//! let vector: PersistentVector<i32> = (0..100).collect();
//! assert_eq!(vector.get(50), Some(&50));
//!
//! // Structural sharing: the original vector is preserved
//! let updated = vector.update(50, 999).unwrap();
//! assert_eq!(vector.get(50), Some(&50));     // Original unchanged
//! assert_eq!(updated.get(50), Some(&999));   // New version
//!
//! // Inserting in the middle keeps every other element in order
//! let inserted = vector.insert(10, -1).unwrap();
//! assert_eq!(inserted.get(10), Some(&-1));
//! assert_eq!(inserted.get(11), Some(&10));
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod vector;

pub use vector::PersistentVector;
pub use vector::PersistentVectorIntoIterator;
pub use vector::PersistentVectorIterator;
pub use vector::TransientVector;
pub use vector::VectorError;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod reference_counter_tests {
    use super::ReferenceCounter;
    use rstest::rstest;

    #[rstest]
    fn test_make_mut_copies_only_when_shared() {
        let mut shared: ReferenceCounter<Vec<i32>> = ReferenceCounter::new(vec![1, 2]);
        let other = shared.clone();
        ReferenceCounter::make_mut(&mut shared).push(3);
        assert_eq!(*other, vec![1, 2]);
        assert_eq!(*shared, vec![1, 2, 3]);

        let before = ReferenceCounter::as_ptr(&shared);
        ReferenceCounter::make_mut(&mut shared).push(4);
        assert_eq!(before, ReferenceCounter::as_ptr(&shared));
    }

    #[rstest]
    fn test_reference_counter_strong_count() {
        let reference_counter: ReferenceCounter<i32> = ReferenceCounter::new(42);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 1);
        let reference_counter_clone = reference_counter.clone();
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 2);
        drop(reference_counter_clone);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 1);
    }
}
