//! Persistent (immutable) vectors and their transient companions.
//!
//! - [`PersistentVector`]: immutable indexed sequence (32-way trie + tail)
//! - [`TransientVector`]: single-owner editing session over a vector's trie
//! - [`VectorIterator`] and [`VectorIntoIterator`]: front-to-back traversal
//! - [`VectorError`]: failures reported by both vector kinds
//!
//! # Structural Sharing
//!
//! Every update on a [`PersistentVector`] returns a new vector that shares
//! all untouched subtrees with the original, so old versions stay valid and
//! cheap to keep around.
//!
//! # Examples
//!
//! ## `PersistentVector`
//!
//! ```rust
//! use pvec::persistent::PersistentVector;
//!
//! let vector: PersistentVector<i32> = (0..100).collect();
//! assert_eq!(vector.get(50), Ok(&50));
//!
//! // Structural sharing: the original vector is preserved
//! let updated = vector.set(50, 999).unwrap();
//! assert_eq!(vector.get(50), Ok(&50));     // Original unchanged
//! assert_eq!(updated.get(50), Ok(&999));   // New version
//! ```
//!
//! ## `TransientVector`
//!
//! ```rust
//! use pvec::persistent::PersistentVector;
//!
//! let vector: PersistentVector<i32> = (0..10).collect();
//!
//! let mut transient = vector.transient();
//! for value in 10..1000 {
//!     transient.push_back(value).unwrap();
//! }
//! let grown = transient.persistent().unwrap();
//!
//! assert_eq!(grown.len(), 1000);
//! assert_eq!(vector.len(), 10); // Original unchanged
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

mod error;
mod iterator;
mod node;
mod transient;
mod vector;

pub use error::IndexOutOfBoundsError;
pub use error::VectorError;
pub use iterator::VectorIntoIterator;
pub use iterator::VectorIterator;
pub use transient::TransientVector;
pub use vector::PersistentVector;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod reference_counter_tests {
    use super::ReferenceCounter;
    use rstest::rstest;

    #[rstest]
    fn test_reference_counter_clone() {
        let reference_counter: ReferenceCounter<i32> = ReferenceCounter::new(42);
        let reference_counter_clone = reference_counter.clone();
        assert_eq!(*reference_counter, *reference_counter_clone);
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

    #[rstest]
    fn test_make_mut_copies_only_when_shared() {
        let mut unique: ReferenceCounter<Vec<i32>> = ReferenceCounter::new(vec![1]);
        let before = ReferenceCounter::as_ptr(&unique);
        ReferenceCounter::make_mut(&mut unique).push(2);
        assert_eq!(before, ReferenceCounter::as_ptr(&unique));

        let observer = unique.clone();
        ReferenceCounter::make_mut(&mut unique).push(3);
        assert_eq!(*observer, vec![1, 2]);
        assert_eq!(*unique, vec![1, 2, 3]);
    }
}
