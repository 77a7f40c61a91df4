//! Iterators over [`PersistentVector`](super::PersistentVector) and
//! [`TransientVector`](super::TransientVector).
//!
//! [`VectorIterator`] walks the trie leaf by leaf. It keeps one ancestor per
//! branch level and, at each 32-element boundary, refreshes only the levels
//! whose 5-bit index group changed. Crossing into a new leaf therefore costs
//! O(1) amortized and a full traversal is O(N).

use std::iter::FusedIterator;

use smallvec::SmallVec;

use super::ReferenceCounter;
use super::node::{BITS_PER_LEVEL, BRANCHING_FACTOR, Branch, Leaf, MASK, Node};
use super::vector::{PersistentVector, tail_offset};

/// Enough levels for any length addressable on 64-bit targets.
const INLINE_LEVELS: usize = 8;

// =============================================================================
// Borrowing Iterator
// =============================================================================

/// An iterator over references to the elements of a vector, front to back.
///
/// Created by [`PersistentVector::iter`](super::PersistentVector::iter) and
/// [`TransientVector::iter`](super::TransientVector::iter).
///
/// # Examples
///
/// ```rust
/// use pvec::persistent::PersistentVector;
///
/// let vector: PersistentVector<i32> = (0..100).collect();
/// let mut iter = vector.iter();
///
/// assert_eq!(iter.len(), 100);
/// assert_eq!(iter.next(), Some(&0));
/// assert_eq!(iter.len(), 99);
/// assert_eq!(iter.sum::<i32>(), (1..100).sum());
/// ```
pub struct VectorIterator<'a, T> {
    length: usize,
    tail_offset: usize,
    tail: &'a [T],
    /// Branch ancestors of the current leaf; index 0 is the leaf's parent and
    /// the last entry is the root.
    stack: SmallVec<[&'a Branch<T>; INLINE_LEVELS]>,
    leaf: &'a [T],
    index: usize,
    /// Next index at which `leaf` must be replaced.
    jump: usize,
}

impl<'a, T> VectorIterator<'a, T> {
    pub(crate) fn new(
        length: usize,
        shift: usize,
        root: Option<&'a Node<T>>,
        tail: &'a [T],
    ) -> Self {
        let mut iterator = Self {
            length,
            tail_offset: tail_offset(length),
            tail,
            stack: SmallVec::with_capacity(shift / BITS_PER_LEVEL),
            leaf: tail,
            index: 0,
            jump: BRANCHING_FACTOR,
        };

        match root {
            None => {}
            Some(Node::Leaf(leaf)) => iterator.leaf = leaf.elements.as_slice(),
            Some(node) => match iterator.descend_leftmost(node) {
                Some(leaf) => iterator.leaf = leaf,
                None => iterator.index = length,
            },
        }

        iterator
    }

    /// Fills the stack with the leftmost path below `node` and returns the
    /// elements of the leftmost leaf.
    fn descend_leftmost(&mut self, node: &'a Node<T>) -> Option<&'a [T]> {
        let mut node = node;

        while let Node::Branch(branch) = node {
            let branch: &'a Branch<T> = branch;
            self.stack.push(branch);
            node = branch.child(0)?;
        }
        self.stack.reverse();

        let leaf: &'a Leaf<T> = node.as_leaf()?;
        Some(leaf.elements.as_slice())
    }

    /// Re-targets the stack at the leaf starting at `self.index`.
    ///
    /// `index ^ (index - 1)` has a bit set for every index bit that flipped,
    /// so it tells how many levels above the leaf parent have to change.
    fn refresh_stack(&mut self) -> Option<()> {
        let index = self.index;
        let diff = index ^ (index - 1);

        let mut level = 2 * BITS_PER_LEVEL;
        let mut updates = 0;
        while level < usize::BITS as usize && (diff >> level) != 0 {
            updates += 1;
            level += BITS_PER_LEVEL;
        }
        level -= BITS_PER_LEVEL;

        while updates > 0 {
            let parent: &'a Branch<T> = self.stack.get(updates).copied()?;
            self.stack[updates - 1] = parent.child((index >> level) & MASK)?.as_branch()?;
            updates -= 1;
            level -= BITS_PER_LEVEL;
        }

        let parent: &'a Branch<T> = self.stack.first().copied()?;
        let leaf: &'a Leaf<T> = parent
            .child((index >> BITS_PER_LEVEL) & MASK)?
            .as_leaf()?;
        self.leaf = leaf.elements.as_slice();
        Some(())
    }
}

impl<T> Clone for VectorIterator<'_, T> {
    fn clone(&self) -> Self {
        Self {
            length: self.length,
            tail_offset: self.tail_offset,
            tail: self.tail,
            stack: self.stack.clone(),
            leaf: self.leaf,
            index: self.index,
            jump: self.jump,
        }
    }
}

impl<'a, T> Iterator for VectorIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.length {
            return None;
        }

        if self.index == self.jump {
            if self.index >= self.tail_offset {
                self.leaf = self.tail;
            } else {
                self.jump += BRANCHING_FACTOR;
                if self.refresh_stack().is_none() {
                    self.index = self.length;
                    return None;
                }
            }
        }

        let element = self.leaf.get(self.index & MASK)?;
        self.index += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.length - self.index;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for VectorIterator<'_, T> {
    fn len(&self) -> usize {
        self.length - self.index
    }
}

impl<T> FusedIterator for VectorIterator<'_, T> {}

// =============================================================================
// Owning Iterator
// =============================================================================

/// An owning iterator over the elements of a [`PersistentVector`].
///
/// Elements are cloned out of the trie, since the nodes may still be shared
/// with other vectors. The current leaf is looked up once per 32 elements.
///
/// # Examples
///
/// ```rust
/// use pvec::persistent::PersistentVector;
///
/// let vector: PersistentVector<String> =
///     ["a", "b", "c"].into_iter().map(String::from).collect();
/// let joined: String = vector.into_iter().collect();
/// assert_eq!(joined, "abc");
/// ```
pub struct VectorIntoIterator<T> {
    vector: PersistentVector<T>,
    leaf: Option<ReferenceCounter<Leaf<T>>>,
    index: usize,
}

impl<T> VectorIntoIterator<T> {
    pub(crate) const fn new(vector: PersistentVector<T>) -> Self {
        Self {
            vector,
            leaf: None,
            index: 0,
        }
    }
}

impl<T: Clone> Iterator for VectorIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.vector.len() {
            return None;
        }

        if self.leaf.is_none() || self.index & MASK == 0 {
            self.leaf = self.vector.leaf_for(self.index).cloned();
        }

        let element = self
            .leaf
            .as_ref()
            .and_then(|leaf| leaf.elements.get(self.index & MASK))
            .cloned();

        match element {
            Some(element) => {
                self.index += 1;
                Some(element)
            }
            None => {
                self.index = self.vector.len();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vector.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<T: Clone> ExactSizeIterator for VectorIntoIterator<T> {
    fn len(&self) -> usize {
        self.vector.len() - self.index
    }
}

impl<T: Clone> FusedIterator for VectorIntoIterator<T> {}

// =============================================================================
// Tests
// =============================================================================
