//! Transient (temporarily mutable) companion of [`PersistentVector`].
//!
//! A [`TransientVector`] is an editing session: it owns a fresh
//! [`OwnerToken`], stamps every node it creates with it, and writes in place
//! through nodes that carry its token and are referenced by nobody else.
//! Nodes inherited from a persistent vector are copied the first time the
//! session writes through them, then reused for every later write. Building
//! N elements therefore costs O(N) node copies instead of O(N log N).
//!
//! A session ends with [`TransientVector::persistent`], which retires the
//! token for good. Every call made afterwards fails with
//! [`VectorError::EditAfterCommit`].

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use arrayvec::ArrayVec;

use super::ReferenceCounter;
use super::error::VectorError;
use super::iterator::VectorIterator;
use super::node::{
    BITS_PER_LEVEL, BRANCHING_FACTOR, Branch, Leaf, MASK, Node, OwnerToken, editable_branch,
    editable_leaf, into_leaf_elements, leaf_at, new_path,
};
use super::vector::{PersistentVector, tail_offset};

// =============================================================================
// TransientVector Definition
// =============================================================================

/// A transient (temporarily mutable) vector for efficient batch updates.
///
/// Obtain one from [`PersistentVector::transient`] or
/// [`TransientVector::new`], edit it through `&mut self`, then call
/// [`persistent`](Self::persistent) exactly once.
///
/// # Design
///
/// - The tail is a fixed-capacity 32-slot buffer owned by the session
/// - Mutating methods return `&mut Self` so calls can be chained
/// - `PhantomData<Rc<()>>` ensures `!Send` and `!Sync`: a session has one
///   sequential owner
/// - Clone is intentionally not implemented
///
/// # Examples
///
/// ```rust
/// use pvec::persistent::{TransientVector, VectorError};
///
/// let mut transient = TransientVector::new();
/// for index in 0..100 {
///     transient.push_back(index).unwrap();
/// }
/// transient.pop_back().unwrap().set(0, -1).unwrap();
///
/// let vector = transient.persistent().unwrap();
/// assert_eq!(vector.len(), 99);
/// assert_eq!(vector.get(0), Ok(&-1));
///
/// // The session is over.
/// assert_eq!(transient.push_back(1).unwrap_err(), VectorError::EditAfterCommit);
/// ```
pub struct TransientVector<T> {
    length: usize,
    shift: usize,
    root: Option<Node<T>>,
    tail: ArrayVec<T, BRANCHING_FACTOR>,
    /// `None` once the session has been committed.
    owner: Option<OwnerToken>,
    _marker: PhantomData<Rc<()>>,
}

static_assertions::assert_not_impl_any!(TransientVector<i32>: Send, Sync);
static_assertions::assert_not_impl_any!(TransientVector<String>: Send, Sync);

#[cfg(feature = "arc")]
mod arc_send_sync_verification {
    use super::TransientVector;
    use std::sync::Arc;

    static_assertions::assert_not_impl_any!(TransientVector<Arc<i32>>: Send, Sync);
}

impl<T> TransientVector<T> {
    /// Creates a new empty session.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvec::persistent::TransientVector;
    ///
    /// let transient: TransientVector<i32> = TransientVector::new();
    /// assert!(transient.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            length: 0,
            shift: 0,
            root: None,
            tail: ArrayVec::new(),
            owner: Some(OwnerToken::fresh()),
            _marker: PhantomData,
        }
    }

    /// Returns the number of elements.
    ///
    /// After [`persistent`](Self::persistent) this is the length the session
    /// was committed with.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the session holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns `false` once the session has been committed.
    #[inline]
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        self.owner.is_some()
    }

    fn owner(&self) -> Result<OwnerToken, VectorError> {
        self.owner.ok_or(VectorError::EditAfterCommit)
    }

    #[cfg(test)]
    pub(crate) const fn shift(&self) -> usize {
        self.shift
    }

    /// Returns a reference to the element at the given index.
    ///
    /// # Errors
    ///
    /// - [`VectorError::EditAfterCommit`] if the session has been committed
    /// - [`VectorError::IndexOutOfBounds`] if `index >= len()`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvec::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..50).collect();
    /// let transient = vector.transient();
    /// assert_eq!(transient.get(40), Ok(&40));
    /// ```
    pub fn get(&self, index: usize) -> Result<&T, VectorError> {
        self.owner()?;

        if index >= self.length {
            return Err(VectorError::index_out_of_bounds(index, self.length));
        }

        let element = if index >= tail_offset(self.length) {
            self.tail.get(index & MASK)
        } else {
            self.root
                .as_ref()
                .and_then(|root| leaf_at(root, self.shift, index))
                .and_then(|leaf| leaf.elements.get(index & MASK))
        };

        debug_assert!(element.is_some(), "trie has no element at in-bounds index {index}");
        element.ok_or_else(|| VectorError::index_out_of_bounds(index, self.length))
    }

    /// Returns an iterator over the current contents.
    ///
    /// The iterator borrows the session, so the session cannot change while
    /// it is alive.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::EditAfterCommit`] if the session has been
    /// committed.
    pub fn iter(&self) -> Result<VectorIterator<'_, T>, VectorError> {
        self.owner()?;
        Ok(VectorIterator::new(
            self.length,
            self.shift,
            self.root.as_ref(),
            self.tail.as_slice(),
        ))
    }

    /// Ends the session and returns the resulting persistent vector.
    ///
    /// The owner token is retired, so no node of the returned vector can be
    /// written through again. The tail buffer is handed over at its logical
    /// length.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::EditAfterCommit`] if the session was already
    /// committed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvec::persistent::{TransientVector, VectorError};
    ///
    /// let mut transient = TransientVector::new();
    /// transient.push_back("a").unwrap();
    ///
    /// let vector = transient.persistent().unwrap();
    /// assert_eq!(vector.len(), 1);
    /// assert_eq!(transient.persistent().unwrap_err(), VectorError::EditAfterCommit);
    /// ```
    pub fn persistent(&mut self) -> Result<PersistentVector<T>, VectorError> {
        self.owner()?;
        Ok(self.commit())
    }

    fn commit(&mut self) -> PersistentVector<T> {
        self.owner = None;
        let tail = std::mem::take(&mut self.tail);

        PersistentVector {
            length: self.length,
            shift: self.shift,
            root: self.root.take(),
            tail: ReferenceCounter::new(Leaf::new(None, tail)),
        }
    }
}

impl<T: Clone> TransientVector<T> {
    /// Opens a session sharing `vector`'s trie; only the tail is copied.
    pub(crate) fn from_persistent(vector: &PersistentVector<T>) -> Self {
        Self {
            length: vector.length,
            shift: vector.shift,
            root: vector.root.clone(),
            tail: vector.tail.elements.clone(),
            owner: Some(OwnerToken::fresh()),
            _marker: PhantomData,
        }
    }

    /// Appends every element of `elements` and commits.
    pub(crate) fn append_all<I>(mut self, elements: I) -> PersistentVector<T>
    where
        I: IntoIterator<Item = T>,
    {
        if let Some(owner) = self.owner {
            for element in elements {
                self.append(owner, element);
            }
        }
        self.commit()
    }

    /// Replaces the element at `index` in place.
    ///
    /// # Errors
    ///
    /// - [`VectorError::EditAfterCommit`] if the session has been committed
    /// - [`VectorError::IndexOutOfBounds`] if `index >= len()`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvec::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..100).collect();
    /// let mut transient = vector.transient();
    /// transient.set(5, 500).unwrap().set(95, 9500).unwrap();
    ///
    /// let updated = transient.persistent().unwrap();
    /// assert_eq!(updated.get(5), Ok(&500));
    /// assert_eq!(vector.get(5), Ok(&5));
    /// ```
    pub fn set(&mut self, index: usize, element: T) -> Result<&mut Self, VectorError> {
        let owner = self.owner()?;

        if index >= self.length {
            return Err(VectorError::index_out_of_bounds(index, self.length));
        }

        if index >= tail_offset(self.length) {
            self.tail[index & MASK] = element;
        } else if let Some(root) = self.root.as_mut() {
            Self::set_in_node(root, self.shift, index, element, owner);
        }

        Ok(self)
    }

    fn set_in_node(node: &mut Node<T>, level: usize, index: usize, element: T, owner: OwnerToken) {
        if level == 0 {
            if let Some(slot) =
                editable_leaf(node, owner).and_then(|leaf| leaf.elements.get_mut(index & MASK))
            {
                *slot = element;
            }
            return;
        }

        let child = editable_branch(node, owner)
            .and_then(|branch| branch.children[(index >> level) & MASK].as_mut());
        if let Some(child) = child {
            Self::set_in_node(child, level - BITS_PER_LEVEL, index, element, owner);
        }
    }

    /// Appends an element in place.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::EditAfterCommit`] if the session has been
    /// committed.
    ///
    /// # Complexity
    ///
    /// Amortized O(1); O(log32 N) when the tail moves into the trie.
    pub fn push_back(&mut self, element: T) -> Result<&mut Self, VectorError> {
        let owner = self.owner()?;
        self.append(owner, element);
        Ok(self)
    }

    fn append(&mut self, owner: OwnerToken, element: T) {
        if !self.tail.is_full() {
            self.tail.push(element);
            self.length += 1;
            return;
        }

        let full_tail = std::mem::take(&mut self.tail);
        self.tail.push(element);
        let tail_leaf = Node::leaf(Leaf::new(Some(owner), full_tail));

        if self.length == BRANCHING_FACTOR {
            self.root = Some(tail_leaf);
        } else if (self.length >> BITS_PER_LEVEL) > (1 << self.shift) {
            let mut new_root = Branch::new(Some(owner));
            new_root.children[0] = self.root.take();
            new_root.children[1] = Some(new_path(Some(owner), self.shift, tail_leaf));
            self.root = Some(Node::branch(new_root));
            self.shift += BITS_PER_LEVEL;
        } else if let Some(root) = self.root.as_mut() {
            Self::push_leaf(root, self.shift, self.length - 1, tail_leaf, owner);
        }

        self.length += 1;
    }

    fn push_leaf(node: &mut Node<T>, level: usize, index: usize, leaf: Node<T>, owner: OwnerToken) {
        let Some(branch) = editable_branch(node, owner) else {
            return;
        };

        let subindex = (index >> level) & MASK;
        if level == BITS_PER_LEVEL {
            branch.children[subindex] = Some(leaf);
            return;
        }

        match branch.children[subindex].as_mut() {
            Some(child) => Self::push_leaf(child, level - BITS_PER_LEVEL, index, leaf, owner),
            None => {
                branch.children[subindex] =
                    Some(new_path(Some(owner), level - BITS_PER_LEVEL, leaf));
            }
        }
    }

    /// Removes the last element in place.
    ///
    /// When the tail runs dry, the last trie leaf becomes the new tail. Its
    /// elements are moved out if the session holds the only reference and
    /// cloned otherwise, so the tail never aliases a shared leaf.
    ///
    /// # Errors
    ///
    /// - [`VectorError::EditAfterCommit`] if the session has been committed
    /// - [`VectorError::EmptyCollection`] if the session is empty
    pub fn pop_back(&mut self) -> Result<&mut Self, VectorError> {
        let owner = self.owner()?;

        if self.length == 0 {
            return Err(VectorError::EmptyCollection);
        }

        if self.length == 1 || self.tail.len() > 1 {
            self.tail.pop();
            self.length -= 1;
            return Ok(self);
        }

        let new_trie_size = self.length - BRANCHING_FACTOR - 1;

        if new_trie_size == 0 {
            self.tail = self
                .root
                .take()
                .and_then(|root| into_leaf_elements(root, 0, 0))
                .unwrap_or_default();
            self.shift = 0;
        } else if new_trie_size == 1 << self.shift {
            self.lower_trie();
        } else {
            self.pop_trie(new_trie_size, owner);
        }

        self.length -= 1;
        Ok(self)
    }

    fn lower_trie(&mut self) {
        let lower_shift = self.shift - BITS_PER_LEVEL;

        let (new_root, second) = match self.root.take() {
            Some(Node::Branch(branch)) => match ReferenceCounter::try_unwrap(branch) {
                Ok(mut branch) => (branch.children[0].take(), branch.children[1].take()),
                Err(shared) => (shared.children[0].clone(), shared.children[1].clone()),
            },
            other => (other, None),
        };

        self.root = new_root;
        self.tail = second
            .and_then(|node| into_leaf_elements(node, lower_shift, 0))
            .unwrap_or_default();
        self.shift = lower_shift;
    }

    fn pop_trie(&mut self, new_trie_size: usize, owner: OwnerToken) {
        let diverges = new_trie_size ^ (new_trie_size - 1);
        let shift = self.shift;

        let detached = self
            .root
            .as_mut()
            .and_then(|root| Self::detach_last_leaf(root, shift, new_trie_size, diverges, owner));

        self.tail = detached
            .and_then(|(node, level)| into_leaf_elements(node, level, new_trie_size))
            .unwrap_or_default();
    }

    /// Claims every node above the split level, then unlinks the subtree
    /// holding the last leaf and returns it with its level.
    fn detach_last_leaf(
        node: &mut Node<T>,
        level: usize,
        index: usize,
        diverges: usize,
        owner: OwnerToken,
    ) -> Option<(Node<T>, usize)> {
        let branch = editable_branch(node, owner)?;
        let subindex = (index >> level) & MASK;

        if (diverges >> level) != 0 {
            return branch.children[subindex]
                .take()
                .map(|child| (child, level - BITS_PER_LEVEL));
        }

        let child = branch.children[subindex].as_mut()?;
        Self::detach_last_leaf(child, level - BITS_PER_LEVEL, index, diverges, owner)
    }
}

impl<T> Default for TransientVector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for TransientVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.iter() {
            Ok(iter) => formatter
                .debug_struct("TransientVector")
                .field("elements", &iter.collect::<Vec<_>>())
                .finish(),
            Err(_) => formatter
                .debug_struct("TransientVector")
                .field("committed", &true)
                .finish(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
