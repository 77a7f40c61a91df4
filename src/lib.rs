//! # pvec
//!
//! Persistent vectors for Rust: immutable indexed sequences with structural
//! sharing, plus transients for fast batch construction.
//!
//! ## Overview
//!
//! - **`PersistentVector`**: 32-way trie with a tail buffer. `get`, `set`,
//!   `push_back` and `pop_back` are O(log32 N); appends are amortized O(1).
//! - **`TransientVector`**: an editing session that mutates nodes it owns in
//!   place and copies shared nodes once, then hands back a persistent vector.
//! - **Iterators**: borrowing and owning front-to-back traversal, O(N) for a
//!   full pass.
//!
//! ## Feature Flags
//!
//! - `arc`: share nodes through `Arc` instead of `Rc`, making
//!   `PersistentVector` `Send + Sync`
//!
//! ## Example
//!
//! ```rust
//! use pvec::prelude::*;
//!
//! let vector: PersistentVector<i32> = (0..5).collect();
//! let updated = vector.set(0, 10).unwrap().push_back(5);
//!
//! assert_eq!(format!("{vector}"), "[0, 1, 2, 3, 4]");
//! assert_eq!(format!("{updated}"), "[10, 1, 2, 3, 4, 5]");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types.
///
/// # Usage
///
/// ```rust
/// use pvec::prelude::*;
/// ```
pub mod prelude {
    pub use crate::persistent::*;
}

pub mod persistent;
