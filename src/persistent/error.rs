//! Error types for persistent and transient vectors.
//!
//! Every failure is local and synchronous: the receiver is left exactly as it
//! was before the failing call, and retrying the same call fails the same way.

/// Represents an access to an index outside `0..length`.
///
/// # Examples
///
/// ```rust
/// use pvec::persistent::IndexOutOfBoundsError;
///
/// let error = IndexOutOfBoundsError { index: 5, length: 3 };
/// assert_eq!(
///     format!("{error}"),
///     "index 5 out of bounds for vector of length 3"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOutOfBoundsError {
    /// The index that was requested.
    pub index: usize,
    /// The length of the vector at the time of the request.
    pub length: usize,
}

impl std::fmt::Display for IndexOutOfBoundsError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "index {} out of bounds for vector of length {}",
            self.index, self.length
        )
    }
}

impl std::error::Error for IndexOutOfBoundsError {}

/// Errors reported by [`PersistentVector`](super::PersistentVector) and
/// [`TransientVector`](super::TransientVector) operations.
///
/// # Examples
///
/// ```rust
/// use pvec::persistent::{PersistentVector, VectorError};
///
/// let empty: PersistentVector<i32> = PersistentVector::new();
/// assert_eq!(empty.pop_back().unwrap_err(), VectorError::EmptyCollection);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorError {
    /// `get` or `set` was called with an index `>= len()`.
    IndexOutOfBounds(IndexOutOfBoundsError),
    /// `pop_back` was called on an empty vector.
    EmptyCollection,
    /// A transient was used after it was converted to a persistent vector.
    EditAfterCommit,
}

impl VectorError {
    pub(crate) const fn index_out_of_bounds(index: usize, length: usize) -> Self {
        Self::IndexOutOfBounds(IndexOutOfBoundsError { index, length })
    }
}

impl std::fmt::Display for VectorError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfBounds(error) => write!(formatter, "{error}"),
            Self::EmptyCollection => write!(formatter, "vector is already empty"),
            Self::EditAfterCommit => write!(
                formatter,
                "transient has already been converted to a persistent vector"
            ),
        }
    }
}

impl std::error::Error for VectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IndexOutOfBounds(error) => Some(error),
            Self::EmptyCollection | Self::EditAfterCommit => None,
        }
    }
}

impl From<IndexOutOfBoundsError> for VectorError {
    fn from(error: IndexOutOfBoundsError) -> Self {
        Self::IndexOutOfBounds(error)
    }
}
