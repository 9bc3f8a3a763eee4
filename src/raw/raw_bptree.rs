use core::borrow::Borrow;
use core::fmt;

use alloc::vec::Vec;
use tracing::{debug, trace, warn};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{InternalNode, LeafNode, Node, SearchResult};
use crate::Comparator;

/// The core B+Tree implementation backing `BPTree`.
pub(crate) struct RawBPTree<K, V> {
    /// Arena storing all tree nodes. Nodes are never freed.
    nodes: Arena<Node<K, V>>,
    /// Handle to the root node. Starts out as an empty leaf.
    root: Handle,
    /// Maximum children per internal node and buckets per leaf.
    branching_factor: usize,
    /// Number of insertions performed, duplicates included.
    len: usize,
    /// Handle to the leftmost leaf. Splits only add leaves to the right of
    /// an existing one, so this is fixed at construction.
    first_leaf: Handle,
    /// Handle to the rightmost leaf, for backward iteration.
    last_leaf: Handle,
}

impl<K, V> RawBPTree<K, V> {
    /// Creates a new tree holding a single empty leaf.
    pub(crate) fn new(branching_factor: usize) -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::Leaf(LeafNode::with_capacity(branching_factor)));
        Self {
            nodes,
            root,
            branching_factor,
            len: 0,
            first_leaf: root,
            last_leaf: root,
        }
    }

    /// Returns the number of insertions performed.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn branching_factor(&self) -> usize {
        self.branching_factor
    }

    pub(crate) fn first_leaf(&self) -> Handle {
        self.first_leaf
    }

    pub(crate) fn last_leaf(&self) -> Handle {
        self.last_leaf
    }

    /// Returns a reference to a node by handle.
    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    /// Returns the number of levels, counting the leaf level.
    pub(crate) fn height(&self) -> usize {
        let mut height = 1;
        let mut current = self.root;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(0);
            height += 1;
        }
        height
    }

    /// Returns the smallest key stored under `handle`, following first children down to a leaf.
    pub(crate) fn first_leaf_key(&self, handle: Handle) -> Option<&K> {
        let mut current = handle;
        loop {
            match self.nodes.get(current) {
                Node::Internal(internal) => current = internal.child(0),
                Node::Leaf(leaf) => return leaf.first_key(),
            }
        }
    }

    /// Writes the key lists of every node, one line per level.
    ///
    /// Each `{...}` group on a line holds the children of one node from the
    /// line above, left to right.
    pub(crate) fn write_levels(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    where
        K: fmt::Display,
    {
        let mut level: Vec<Vec<Handle>> = alloc::vec![alloc::vec![self.root]];
        while !level.is_empty() {
            let mut next_level = Vec::new();
            for (group_idx, group) in level.iter().enumerate() {
                if group_idx > 0 {
                    f.write_str(", ")?;
                }
                f.write_str("{")?;
                for (node_idx, &handle) in group.iter().enumerate() {
                    if node_idx > 0 {
                        f.write_str(", ")?;
                    }
                    let node = self.nodes.get(handle);
                    write_keys(f, node.keys())?;
                    if let Node::Internal(internal) = node {
                        next_level.push(internal.children().to_vec());
                    }
                }
                f.write_str("}")?;
            }
            f.write_str("\n")?;
            level = next_level;
        }
        Ok(())
    }
}

fn write_keys<K: fmt::Display>(f: &mut fmt::Formatter<'_>, keys: &[K]) -> fmt::Result {
    f.write_str("[")?;
    for (idx, key) in keys.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key}")?;
    }
    f.write_str("]")
}

impl<K: Clone + Ord, V> RawBPTree<K, V> {
    /// Finds the leaf holding `key` and its index within that leaf.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<(Handle, usize)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let leaf_handle = self.descend(key, Comparator::Equal);
        match self.nodes.get(leaf_handle).as_leaf().search(key) {
            SearchResult::Found(idx) => Some((leaf_handle, idx)),
            SearchResult::NotFound(_) => None,
        }
    }

    /// Returns every value stored under `key`, in insertion order.
    pub(crate) fn bucket<Q>(&self, key: &Q) -> Option<&[V]>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (leaf_handle, idx) = self.search(key)?;
        Some(self.nodes.get(leaf_handle).as_leaf().bucket(idx))
    }

    /// Inserts `value` under `key`, keeping any values already stored there.
    pub(crate) fn insert(&mut self, key: K, value: V) {
        let root = self.root;
        self.insert_into(root, key, value);
        self.len += 1;
    }

    /// Inserts below `handle`, splitting on the way back up.
    ///
    /// Every level re-checks the current root after handling its own child, so
    /// the root is replaced by whichever frame first sees it overflow.
    fn insert_into(&mut self, handle: Handle, key: K, value: V) {
        let child = match self.nodes.get(handle) {
            Node::Internal(internal) => Some(internal.child(internal.route(&key))),
            Node::Leaf(_) => None,
        };

        match child {
            Some(child) => {
                self.insert_into(child, key, value);
                if self.nodes.get(child).is_overflow(self.branching_factor) {
                    let (separator, sibling) = self.split(child);
                    let parent = self.nodes.get_mut(handle).as_internal_mut();
                    if let Some(displaced) = parent.adopt(separator, sibling) {
                        warn!(node = ?handle, ?displaced, ?sibling, "separator already present, child slot overwritten");
                    }
                }
            }
            None => {
                self.nodes.get_mut(handle).as_leaf_mut().insert(key, value);
            }
        }

        if self.nodes.get(self.root).is_overflow(self.branching_factor) {
            self.replace_root();
        }
    }

    /// Splits an overflowing node and returns the separator for its new right sibling.
    fn split(&mut self, handle: Handle) -> (K, Handle) {
        let sibling = match self.nodes.get_mut(handle) {
            Node::Internal(internal) => {
                let right = internal.split();
                trace!(node = ?handle, left_keys = internal.keys().len(), right_keys = right.keys().len(), "split internal node");
                Node::Internal(right)
            }
            Node::Leaf(leaf) => {
                let mut right = leaf.split();
                right.set_prev(Some(handle));
                right.set_next(leaf.next());
                trace!(leaf = ?handle, left_keys = leaf.key_count(), right_keys = right.key_count(), "split leaf");
                Node::Leaf(right)
            }
        };

        let sibling_handle = self.nodes.alloc(sibling);

        // Splice the new leaf into the chain behind the one it came from.
        if let Node::Leaf(right) = self.nodes.get(sibling_handle) {
            let old_next = right.next();
            self.nodes.get_mut(handle).as_leaf_mut().set_next(Some(sibling_handle));
            match old_next {
                Some(old_next) => self.nodes.get_mut(old_next).as_leaf_mut().set_prev(Some(sibling_handle)),
                None => self.last_leaf = sibling_handle,
            }
        }

        let separator = self
            .first_leaf_key(sibling_handle)
            .cloned()
            .expect("`RawBPTree::split()` - split produced an empty sibling!");
        (separator, sibling_handle)
    }

    /// Splits the overflowing root and grows the tree by one level above it.
    fn replace_root(&mut self) {
        let old_root = self.root;
        let (separator, sibling) = self.split(old_root);

        let mut new_root = InternalNode::with_first_child(old_root, self.branching_factor);
        new_root.adopt(separator, sibling);
        self.root = self.nodes.alloc(Node::Internal(new_root));

        debug!(root = ?self.root, height = self.height(), "replaced overflowing root");
    }

    /// Walks from the root to the leaf where a scan for `key` under `comparator` starts.
    ///
    /// `<=` scans begin at the leftmost leaf regardless of `key`.
    fn descend<Q>(&self, key: &Q, comparator: Comparator) -> Handle
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = match comparator {
                Comparator::AtMost => internal.child(0),
                Comparator::Equal | Comparator::AtLeast => internal.child(internal.route(key)),
            };
        }
        current
    }

    /// Collects every value whose key satisfies `comparator` against `key`, in key order.
    pub(crate) fn range_search<Q>(&self, key: &Q, comparator: Comparator) -> Vec<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut range = Vec::new();
        let mut current = Some(self.descend(key, comparator));

        while let Some(leaf_handle) = current {
            let leaf = self.nodes.get(leaf_handle).as_leaf();
            for idx in 0..leaf.key_count() {
                let stored: &Q = leaf.key(idx).borrow();
                if comparator.exhausted(stored, key) {
                    return range;
                }
                if comparator.matches(stored, key) {
                    range.extend(leaf.bucket(idx));
                }
            }
            current = leaf.next();
        }

        range
    }
}
