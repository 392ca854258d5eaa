//! # rrb_vector
//!
//! A persistent vector for Rust built on a Relaxed Radix Balanced tree.
//!
//! ## Overview
//!
//! - **Persistent Vector**: immutable, structurally shared, with O(log N)
//!   insertion at any index and effectively constant-time random access
//! - **Focus Window**: a small buffer outside the trie that absorbs runs of
//!   writes at one position
//! - **Transient Builder**: a single-owner session that appends in place and
//!   freezes back into a persistent vector
//!
//! ## Feature Flags
//!
//! - `arc`: use `Arc` instead of `Rc` so vectors are `Send` and `Sync`
//! - `serde`: `Serialize`/`Deserialize` as a sequence
//!
//! ## Example
//!
//! ```rust
//! use rrb_vector::prelude::*;
//!
//! let vector: PersistentVector<i32> = (0..1000).collect();
//! let inserted = vector.insert(500, -1).unwrap();
//!
//! assert_eq!(vector.len(), 1000);
//! assert_eq!(inserted.len(), 1001);
//! assert_eq!(inserted[500], -1);
//! assert_eq!(inserted[501], 500);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports the vector, its builder, iterators and error type.
///
/// # Usage
///
/// ```rust
/// use rrb_vector::prelude::*;
/// ```
pub mod prelude {
    pub use crate::persistent::*;
}

pub mod persistent;
