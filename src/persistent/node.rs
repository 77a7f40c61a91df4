//! Trie nodes shared by [`PersistentVector`](super::PersistentVector) and
//! [`TransientVector`](super::TransientVector).
//!
//! A node is either a branch (up to 32 children) or a leaf (up to 32
//! elements). Both carry an optional [`OwnerToken`]: nodes created by a
//! transient session are stamped with that session's token and may be edited
//! in place by it; every other node is treated as immutable and copied on
//! first touch.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use arrayvec::ArrayVec;

use super::ReferenceCounter;

// =============================================================================
// Constants
// =============================================================================

/// Branching factor (2^5 = 32)
pub(crate) const BRANCHING_FACTOR: usize = 32;

/// Bits per level in the trie
pub(crate) const BITS_PER_LEVEL: usize = 5;

/// Bit mask for extracting index within a node
pub(crate) const MASK: usize = BRANCHING_FACTOR - 1;

// =============================================================================
// Owner Token
// =============================================================================

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// Identity of one transient editing session.
///
/// Tokens come from a process-wide counter and are never reissued, so a node
/// stamped by a finished session can never match a live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct OwnerToken(NonZeroU64);

impl OwnerToken {
    /// Allocates a token no other session has seen.
    pub(crate) fn fresh() -> Self {
        let id = NEXT_OWNER.fetch_add(1, Ordering::Relaxed);
        Self(NonZeroU64::new(id).unwrap_or(NonZeroU64::MIN))
    }
}

// =============================================================================
// Node Definitions
// =============================================================================

/// Leaf payload: the elements of one 32-element block.
#[derive(Clone)]
pub(crate) struct Leaf<T> {
    pub(crate) owner: Option<OwnerToken>,
    pub(crate) elements: ArrayVec<T, BRANCHING_FACTOR>,
}

impl<T> Leaf<T> {
    pub(crate) const fn new(
        owner: Option<OwnerToken>,
        elements: ArrayVec<T, BRANCHING_FACTOR>,
    ) -> Self {
        Self { owner, elements }
    }

    pub(crate) const fn empty() -> Self {
        Self::new(None, ArrayVec::new_const())
    }

    pub(crate) fn singleton(element: T) -> Self {
        let mut elements = ArrayVec::new();
        elements.push(element);
        Self::new(None, elements)
    }
}

impl<T: Clone> Leaf<T> {
    fn copy_for(&self, owner: Option<OwnerToken>) -> Self {
        Self::new(owner, self.elements.clone())
    }
}

/// Branch payload: child slots packed from the left.
pub(crate) struct Branch<T> {
    pub(crate) owner: Option<OwnerToken>,
    pub(crate) children: [Option<Node<T>>; BRANCHING_FACTOR],
}

impl<T> Branch<T> {
    pub(crate) fn new(owner: Option<OwnerToken>) -> Self {
        Self {
            owner,
            children: std::array::from_fn(|_| None),
        }
    }

    #[inline]
    pub(crate) fn child(&self, slot: usize) -> Option<&Node<T>> {
        self.children[slot].as_ref()
    }

    /// Shallow copy: children are shared, only the slot array is new.
    pub(crate) fn copy_for(&self, owner: Option<OwnerToken>) -> Self {
        Self {
            owner,
            children: self.children.clone(),
        }
    }
}

impl<T> Clone for Branch<T> {
    fn clone(&self) -> Self {
        self.copy_for(self.owner)
    }
}

/// Reference to a trie node.
///
/// Cloning a `Node` only bumps a reference count.
pub(crate) enum Node<T> {
    Branch(ReferenceCounter<Branch<T>>),
    Leaf(ReferenceCounter<Leaf<T>>),
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Branch(branch) => Self::Branch(branch.clone()),
            Self::Leaf(leaf) => Self::Leaf(leaf.clone()),
        }
    }
}

impl<T> Node<T> {
    #[inline]
    pub(crate) fn branch(branch: Branch<T>) -> Self {
        Self::Branch(ReferenceCounter::new(branch))
    }

    #[inline]
    pub(crate) fn leaf(leaf: Leaf<T>) -> Self {
        Self::Leaf(ReferenceCounter::new(leaf))
    }

    #[inline]
    pub(crate) fn as_branch(&self) -> Option<&Branch<T>> {
        match self {
            Self::Branch(branch) => Some(&**branch),
            Self::Leaf(_) => None,
        }
    }

    #[inline]
    pub(crate) const fn as_leaf(&self) -> Option<&ReferenceCounter<Leaf<T>>> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Branch(_) => None,
        }
    }
}

// =============================================================================
// Navigation
// =============================================================================

/// Descends from `root`, a node at `shift`, to the leaf that holds `index`.
///
/// Each branch level consumes the 5 index bits `(index >> level) & MASK`.
pub(crate) fn leaf_at<T>(
    root: &Node<T>,
    shift: usize,
    index: usize,
) -> Option<&ReferenceCounter<Leaf<T>>> {
    let mut node = root;
    let mut level = shift;

    while level > 0 {
        node = node.as_branch()?.child((index >> level) & MASK)?;
        level -= BITS_PER_LEVEL;
    }

    node.as_leaf()
}

/// Wraps `node` in a chain of single-child branches, `level / 5` deep.
pub(crate) fn new_path<T>(owner: Option<OwnerToken>, level: usize, node: Node<T>) -> Node<T> {
    let mut top = node;
    let mut level = level;

    while level > 0 {
        let mut branch = Branch::new(owner);
        branch.children[0] = Some(top);
        top = Node::branch(branch);
        level -= BITS_PER_LEVEL;
    }

    top
}

// =============================================================================
// Ownership
// =============================================================================

/// A session may write through a node only if it stamped the node and no
/// other vector or session can observe it.
#[inline]
fn is_owned_by<N>(
    node: &ReferenceCounter<N>,
    node_owner: Option<OwnerToken>,
    owner: OwnerToken,
) -> bool {
    node_owner == Some(owner) && ReferenceCounter::strong_count(node) == 1
}

/// Makes the branch behind `node` writable by `owner`, copying it first when
/// it belongs to someone else.
///
/// Returns `None` when `node` is a leaf.
pub(crate) fn editable_branch<T>(node: &mut Node<T>, owner: OwnerToken) -> Option<&mut Branch<T>> {
    match node {
        Node::Branch(branch) => {
            if !is_owned_by(branch, branch.owner, owner) {
                *branch = ReferenceCounter::new(branch.copy_for(Some(owner)));
            }
            Some(ReferenceCounter::make_mut(branch))
        }
        Node::Leaf(_) => None,
    }
}

/// Leaf counterpart of [`editable_branch`].
pub(crate) fn editable_leaf<T: Clone>(node: &mut Node<T>, owner: OwnerToken) -> Option<&mut Leaf<T>> {
    match node {
        Node::Leaf(leaf) => {
            if !is_owned_by(leaf, leaf.owner, owner) {
                *leaf = ReferenceCounter::new(leaf.copy_for(Some(owner)));
            }
            Some(ReferenceCounter::make_mut(leaf))
        }
        Node::Branch(_) => None,
    }
}

/// Consumes a detached subtree rooted at `level` and returns the elements of
/// the leaf holding `index`.
///
/// Nodes nobody else references are taken apart without copying; shared ones
/// are left intact and only the final leaf's elements are cloned.
pub(crate) fn into_leaf_elements<T: Clone>(
    node: Node<T>,
    level: usize,
    index: usize,
) -> Option<ArrayVec<T, BRANCHING_FACTOR>> {
    let mut node = node;
    let mut level = level;

    while level > 0 {
        let slot = (index >> level) & MASK;
        node = match node {
            Node::Branch(branch) => match ReferenceCounter::try_unwrap(branch) {
                Ok(mut branch) => branch.children[slot].take()?,
                Err(shared) => shared.children[slot].clone()?,
            },
            Node::Leaf(_) => return None,
        };
        level -= BITS_PER_LEVEL;
    }

    match node {
        Node::Leaf(leaf) => Some(ReferenceCounter::unwrap_or_clone(leaf).elements),
        Node::Branch(_) => None,
    }
}

// =============================================================================
// Tests
// =============================================================================
