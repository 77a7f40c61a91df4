//! Persistent (immutable) vector based on a 32-way trie with a tail buffer.
//!
//! This module provides [`PersistentVector`], an immutable indexed sequence
//! that uses structural sharing for efficient non-destructive updates.
//!
//! # Overview
//!
//! `PersistentVector` is a 32-way branching trie in the style of Clojure's
//! `PersistentVector`. It provides:
//!
//! - O(log32 N) random access (effectively O(1) for practical sizes)
//! - O(log32 N) `push_back`, amortized O(1) thanks to the tail buffer
//! - O(log32 N) `pop_back`
//! - O(log32 N) `set`
//! - O(1) `len` and `is_empty`
//!
//! All operations return new vectors without modifying the original,
//! and structural sharing ensures memory efficiency.
//!
//! # Internal Structure
//!
//! The vector consists of:
//! - A root node (absent while the vector holds 32 elements or fewer)
//! - A tail buffer (up to 32 elements) holding the most recently pushed block
//! - A `shift`, equal to `5 * (height - 1)`, telling how many index bits the
//!   root level consumes
//!
//! # Examples
//!
//! ```rust
//! use pvec::persistent::PersistentVector;
//!
//! let vector = PersistentVector::new()
//!     .push_back(1)
//!     .push_back(2)
//!     .push_back(3);
//!
//! assert_eq!(vector.get(0), Ok(&1));
//! assert_eq!(vector.get(2), Ok(&3));
//!
//! // Structural sharing: the original vector is preserved
//! let extended = vector.push_back(4);
//! assert_eq!(vector.len(), 3);     // Original unchanged
//! assert_eq!(extended.len(), 4);   // New vector
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

use super::ReferenceCounter;
use super::error::VectorError;
use super::iterator::{VectorIntoIterator, VectorIterator};
use super::node::{BITS_PER_LEVEL, BRANCHING_FACTOR, Branch, Leaf, MASK, Node, leaf_at, new_path};
use super::transient::TransientVector;

// =============================================================================
// PersistentVector Definition
// =============================================================================

/// A persistent (immutable) vector based on a 32-way trie.
///
/// # Time Complexity
///
/// | Operation        | Complexity                |
/// |------------------|---------------------------|
/// | `new`            | O(1)                      |
/// | `get`            | O(log32 N)                |
/// | `set`            | O(log32 N)                |
/// | `push_back`      | O(log32 N) amortized O(1) |
/// | `pop_back`       | O(log32 N)                |
/// | `len`            | O(1)                      |
/// | `transient`      | O(1) plus a tail copy     |
/// | `iter`           | O(1) to create, O(N) to iterate |
///
/// # Examples
///
/// ```rust
/// use pvec::persistent::PersistentVector;
///
/// let vector: PersistentVector<i32> = (0..100).collect();
/// assert_eq!(vector.len(), 100);
/// assert_eq!(vector.get(50), Ok(&50));
/// ```
pub struct PersistentVector<T> {
    /// Total number of elements
    pub(super) length: usize,
    /// Shift amount for index calculation: (height - 1) * `BITS_PER_LEVEL`
    pub(super) shift: usize,
    /// Root node of the trie, absent while `length <= 32`
    pub(super) root: Option<Node<T>>,
    /// Tail buffer, holding exactly the elements past the trie
    pub(super) tail: ReferenceCounter<Leaf<T>>,
}

impl<T> Clone for PersistentVector<T> {
    fn clone(&self) -> Self {
        Self {
            length: self.length,
            shift: self.shift,
            root: self.root.clone(),
            tail: self.tail.clone(),
        }
    }
}

impl<T> PersistentVector<T> {
    /// Creates a new empty vector.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvec::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = PersistentVector::new();
    /// assert!(vector.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            length: 0,
            shift: 0,
            root: None,
            tail: ReferenceCounter::new(Leaf::empty()),
        }
    }

    /// Creates a vector containing a single element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvec::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::singleton(42);
    /// assert_eq!(vector.len(), 1);
    /// assert_eq!(vector.get(0), Ok(&42));
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self {
            length: 1,
            shift: 0,
            root: None,
            tail: ReferenceCounter::new(Leaf::singleton(element)),
        }
    }

    /// Returns the number of elements in the vector.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the vector contains no elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvec::persistent::PersistentVector;
    ///
    /// let empty: PersistentVector<i32> = PersistentVector::new();
    /// assert!(empty.is_empty());
    /// assert!(!empty.push_back(1).is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the starting index of the tail buffer.
    #[inline]
    const fn tail_offset(&self) -> usize {
        tail_offset(self.length)
    }

    #[cfg(test)]
    pub(crate) const fn shift(&self) -> usize {
        self.shift
    }

    /// Returns the leaf holding `index`, which must be below `len()`.
    pub(crate) fn leaf_for(&self, index: usize) -> Option<&ReferenceCounter<Leaf<T>>> {
        if index >= self.tail_offset() {
            Some(&self.tail)
        } else {
            leaf_at(self.root.as_ref()?, self.shift, index)
        }
    }

    /// Returns a reference to the element at the given index.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IndexOutOfBounds`] if `index >= len()`.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvec::persistent::{PersistentVector, VectorError};
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.get(0), Ok(&1));
    /// assert_eq!(vector.get(4), Ok(&5));
    /// assert!(matches!(vector.get(10), Err(VectorError::IndexOutOfBounds(_))));
    /// ```
    pub fn get(&self, index: usize) -> Result<&T, VectorError> {
        if index >= self.length {
            return Err(VectorError::index_out_of_bounds(index, self.length));
        }

        let element = self
            .leaf_for(index)
            .and_then(|leaf| leaf.elements.get(index & MASK));

        debug_assert!(element.is_some(), "trie has no element at in-bounds index {index}");
        element.ok_or_else(|| VectorError::index_out_of_bounds(index, self.length))
    }

    /// Returns a reference to the first element, or `None` if empty.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(0).ok()
    }

    /// Returns a reference to the last element, or `None` if empty.
    ///
    /// # Complexity
    ///
    /// O(1) - the last element is always in the tail
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvec::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.last(), Some(&5));
    /// ```
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tail.elements.last()
    }

    /// Returns an iterator over references to the elements.
    ///
    /// The iterator keeps one ancestor per trie level and only refreshes the
    /// levels that change at each leaf boundary, so iteration is O(N).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvec::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let collected: Vec<&i32> = vector.iter().collect();
    /// assert_eq!(collected, vec![&1, &2, &3, &4, &5]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> VectorIterator<'_, T> {
        VectorIterator::new(
            self.length,
            self.shift,
            self.root.as_ref(),
            self.tail.elements.as_slice(),
        )
    }
}

impl<T: Clone> PersistentVector<T> {
    /// Returns a new vector with the element at `index` replaced.
    ///
    /// Only the nodes on the path from the root to the target leaf are
    /// copied; every other subtree is shared with `self`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IndexOutOfBounds`] if `index >= len()`.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvec::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let updated = vector.set(2, 100).unwrap();
    ///
    /// assert_eq!(updated.get(2), Ok(&100));
    /// assert_eq!(vector.get(2), Ok(&3)); // Original unchanged
    /// ```
    pub fn set(&self, index: usize, element: T) -> Result<Self, VectorError> {
        if index >= self.length {
            return Err(VectorError::index_out_of_bounds(index, self.length));
        }

        if index >= self.tail_offset() {
            let mut tail = self.tail.elements.clone();
            tail[index & MASK] = element;

            return Ok(Self {
                length: self.length,
                shift: self.shift,
                root: self.root.clone(),
                tail: ReferenceCounter::new(Leaf::new(None, tail)),
            });
        }

        let root = self
            .root
            .as_ref()
            .map(|root| Self::set_in_node(root, self.shift, index, element));

        Ok(Self {
            length: self.length,
            shift: self.shift,
            root,
            tail: self.tail.clone(),
        })
    }

    /// Path-copies `node` down to the leaf holding `index`.
    fn set_in_node(node: &Node<T>, level: usize, index: usize, element: T) -> Node<T> {
        match node {
            Node::Leaf(leaf) => {
                let mut elements = leaf.elements.clone();
                if let Some(slot) = elements.get_mut(index & MASK) {
                    *slot = element;
                }
                Node::leaf(Leaf::new(None, elements))
            }
            Node::Branch(branch) => {
                let subindex = (index >> level) & MASK;
                let mut copy = branch.copy_for(None);
                if let Some(child) = branch.child(subindex) {
                    copy.children[subindex] = Some(Self::set_in_node(
                        child,
                        level - BITS_PER_LEVEL,
                        index,
                        element,
                    ));
                }
                Node::branch(copy)
            }
        }
    }

    /// Appends an element to the back of the vector.
    ///
    /// Returns a new vector with the element at the end.
    ///
    /// # Complexity
    ///
    /// O(log32 N) amortized O(1) due to the tail buffer
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvec::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::new()
    ///     .push_back(1)
    ///     .push_back(2)
    ///     .push_back(3);
    ///
    /// assert_eq!(vector.len(), 3);
    /// assert_eq!(vector.get(2), Ok(&3));
    /// ```
    #[must_use]
    pub fn push_back(&self, element: T) -> Self {
        if !self.tail.elements.is_full() {
            let mut tail = self.tail.elements.clone();
            tail.push(element);

            return Self {
                length: self.length + 1,
                shift: self.shift,
                root: self.root.clone(),
                tail: ReferenceCounter::new(Leaf::new(None, tail)),
            };
        }

        self.push_tail_to_root(element)
    }

    /// Moves the full tail into the trie and starts a new tail with `element`.
    fn push_tail_to_root(&self, element: T) -> Self {
        // The old tail is shared, not copied.
        let tail_leaf = Node::Leaf(self.tail.clone());
        let new_tail = ReferenceCounter::new(Leaf::singleton(element));

        if self.length == BRANCHING_FACTOR {
            return Self {
                length: self.length + 1,
                shift: 0,
                root: Some(tail_leaf),
                tail: new_tail,
            };
        }

        if (self.length >> BITS_PER_LEVEL) > (1 << self.shift) {
            // Root is saturated: grow one level.
            let mut new_root = Branch::new(None);
            new_root.children[0] = self.root.clone();
            new_root.children[1] = Some(new_path(None, self.shift, tail_leaf));

            return Self {
                length: self.length + 1,
                shift: self.shift + BITS_PER_LEVEL,
                root: Some(Node::branch(new_root)),
                tail: new_tail,
            };
        }

        let root = self
            .root
            .as_ref()
            .map(|root| Self::push_leaf(root, self.shift, self.length - 1, tail_leaf));

        Self {
            length: self.length + 1,
            shift: self.shift,
            root,
            tail: new_tail,
        }
    }

    /// Path-copies along `index` and hangs `leaf` off the first missing child.
    fn push_leaf(node: &Node<T>, level: usize, index: usize, leaf: Node<T>) -> Node<T> {
        let Some(branch) = node.as_branch() else {
            return node.clone();
        };

        let subindex = (index >> level) & MASK;
        let mut copy = branch.copy_for(None);

        let child = if level == BITS_PER_LEVEL {
            leaf
        } else {
            match branch.child(subindex) {
                Some(child) => Self::push_leaf(child, level - BITS_PER_LEVEL, index, leaf),
                None => new_path(None, level - BITS_PER_LEVEL, leaf),
            }
        };
        copy.children[subindex] = Some(child);

        Node::branch(copy)
    }

    /// Removes the last element from the vector.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::EmptyCollection`] if the vector is empty.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvec::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let remaining = vector.pop_back().unwrap();
    ///
    /// assert_eq!(remaining.len(), 4);
    /// assert_eq!(remaining.last(), Some(&4));
    /// ```
    pub fn pop_back(&self) -> Result<Self, VectorError> {
        if self.length == 0 {
            return Err(VectorError::EmptyCollection);
        }

        if self.length == 1 {
            return Ok(Self::new());
        }

        if self.tail.elements.len() > 1 {
            let mut tail = self.tail.elements.clone();
            tail.pop();

            return Ok(Self {
                length: self.length - 1,
                shift: self.shift,
                root: self.root.clone(),
                tail: ReferenceCounter::new(Leaf::new(None, tail)),
            });
        }

        let Some(root) = self.root.as_ref() else {
            return Ok(Self::new());
        };

        // Offset of the last trie leaf, which becomes the new tail.
        let new_trie_size = self.length - BRANCHING_FACTOR - 1;

        if new_trie_size == 0 {
            return Ok(Self {
                length: BRANCHING_FACTOR,
                shift: 0,
                root: None,
                tail: root
                    .as_leaf()
                    .cloned()
                    .unwrap_or_else(|| ReferenceCounter::new(Leaf::empty())),
            });
        }

        if new_trie_size == 1 << self.shift {
            return Ok(self.lower_trie(root));
        }

        Ok(self.pop_trie(root, new_trie_size))
    }

    /// Drops one level: root child 1 holds nothing but the leaf being
    /// recovered, reached by following child 0 all the way down.
    fn lower_trie(&self, root: &Node<T>) -> Self {
        let lower_shift = self.shift - BITS_PER_LEVEL;
        let branch = root.as_branch();

        let new_root = branch.and_then(|branch| branch.child(0)).cloned();
        let tail = branch
            .and_then(|branch| branch.child(1))
            .and_then(|child| leaf_at(child, lower_shift, 0))
            .cloned()
            .unwrap_or_else(|| ReferenceCounter::new(Leaf::empty()));

        Self {
            length: self.length - 1,
            shift: lower_shift,
            root: new_root,
            tail,
        }
    }

    /// Detaches the last trie leaf and makes it the tail, keeping the height.
    fn pop_trie(&self, root: &Node<T>, new_trie_size: usize) -> Self {
        let diverges = new_trie_size ^ (new_trie_size - 1);
        let (new_root, tail) = Self::detach_last_leaf(root, self.shift, new_trie_size, diverges);

        Self {
            length: self.length - 1,
            shift: self.shift,
            root: Some(new_root),
            tail: tail.unwrap_or_else(|| ReferenceCounter::new(Leaf::empty())),
        }
    }

    /// Path-copies towards `index` until the level where the paths to `index`
    /// and `index - 1` split, clears that slot, and walks the detached
    /// subtree down to its leaf.
    fn detach_last_leaf(
        node: &Node<T>,
        level: usize,
        index: usize,
        diverges: usize,
    ) -> (Node<T>, Option<ReferenceCounter<Leaf<T>>>) {
        let Some(branch) = node.as_branch() else {
            return (node.clone(), None);
        };

        let subindex = (index >> level) & MASK;
        let mut copy = branch.copy_for(None);

        let tail = if (diverges >> level) != 0 {
            copy.children[subindex] = None;
            branch
                .child(subindex)
                .and_then(|child| leaf_at(child, level - BITS_PER_LEVEL, index))
                .cloned()
        } else if let Some(child) = branch.child(subindex) {
            let (new_child, tail) =
                Self::detach_last_leaf(child, level - BITS_PER_LEVEL, index, diverges);
            copy.children[subindex] = Some(new_child);
            tail
        } else {
            None
        };

        (Node::branch(copy), tail)
    }

    /// Appends every element of `iter`, building through a transient session.
    ///
    /// The original vector is unchanged.
    ///
    /// # Complexity
    ///
    /// O(M) node writes for M new elements, plus one path copy per touched
    /// shared node.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvec::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// let extended = vector.push_back_many(4..=6);
    ///
    /// assert_eq!(extended.len(), 6);
    /// assert_eq!(vector.len(), 3);
    /// ```
    #[must_use]
    pub fn push_back_many<I>(&self, iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        self.transient().append_all(iter)
    }

    /// Starts a transient editing session over this vector.
    ///
    /// The session shares the whole trie with `self` and copies nodes only
    /// when it first writes through them, so `self` is never affected.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvec::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..10).collect();
    /// let mut transient = vector.transient();
    /// transient.push_back(10).unwrap().set(0, -1).unwrap();
    /// let edited = transient.persistent().unwrap();
    ///
    /// assert_eq!(edited.len(), 11);
    /// assert_eq!(edited.get(0), Ok(&-1));
    /// assert_eq!(vector.get(0), Ok(&0));
    /// ```
    #[must_use]
    pub fn transient(&self) -> TransientVector<T> {
        TransientVector::from_persistent(self)
    }
}

/// Index of the first tail element for a vector of `length` elements.
#[inline]
pub(crate) const fn tail_offset(length: usize) -> usize {
    if length == 0 {
        0
    } else {
        (length - 1) & !MASK
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentVector<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FromIterator<T> for PersistentVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        TransientVector::new().append_all(iter)
    }
}

impl<T: Clone> IntoIterator for PersistentVector<T> {
    type Item = T;
    type IntoIter = VectorIntoIterator<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        VectorIntoIterator::new(self)
    }
}

impl<'a, T> IntoIterator for &'a PersistentVector<T> {
    type Item = &'a T;
    type IntoIter = VectorIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for PersistentVector<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.length != other.length {
            return false;
        }
        self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq> Eq for PersistentVector<T> {}

impl<T: Hash> Hash for PersistentVector<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        let mut first = true;
        for element in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

// =============================================================================
// Tests
// =============================================================================
