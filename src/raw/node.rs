use core::borrow::Borrow;

use alloc::vec::Vec;
use smallvec::{SmallVec, smallvec};

use super::handle::Handle;

/// The values stored under a single key, in insertion order.
///
/// Most keys are inserted once, so one value lives inline.
pub(crate) type Bucket<V> = SmallVec<[V; 1]>;

#[allow(clippy::large_enum_variant)]
pub(crate) enum Node<K, V> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K, V>),
}

// B+Tree: Internal nodes store separator keys and child handles.
pub(crate) struct InternalNode<K> {
    // keys[i] is the first leaf key reachable under children[i + 1].
    keys: Vec<K>,
    children: Vec<Handle>,
}

// B+Tree: Leaf nodes store keys and their value buckets.
pub(crate) struct LeafNode<K, V> {
    prev: Option<Handle>,
    next: Option<Handle>,
    keys: Vec<K>,
    values: Vec<Bucket<V>>,
}

/// Result of searching for a key in a node.
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is where it would be inserted.
    NotFound(usize),
}

#[inline]
fn binary_search<K, Q>(keys: &[K], key: &Q) -> SearchResult
where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
{
    match keys.binary_search_by(|k| k.borrow().cmp(key)) {
        Ok(idx) => SearchResult::Found(idx),
        Err(idx) => SearchResult::NotFound(idx),
    }
}

impl<K, V> Node<K, V> {
    /// Returns true if this node holds more entries than `branching_factor` allows.
    ///
    /// Internal nodes count children, leaves count value buckets.
    #[inline]
    pub(crate) fn is_overflow(&self, branching_factor: usize) -> bool {
        match self {
            Node::Internal(internal) => internal.is_overflow(branching_factor),
            Node::Leaf(leaf) => leaf.is_overflow(branching_factor),
        }
    }

    /// Returns the keys of this node.
    pub(crate) fn keys(&self) -> &[K] {
        match self {
            Node::Internal(internal) => internal.keys(),
            Node::Leaf(leaf) => leaf.keys(),
        }
    }

    /// Returns the leaf node, panicking if this is not a leaf.
    pub(crate) fn as_leaf(&self) -> &LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the leaf node mutably, panicking if this is not a leaf.
    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the internal node mutably, panicking if this is not internal.
    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }
}

impl<K> InternalNode<K> {
    /// Creates an internal node over a single child, as a new root does before adopting a sibling.
    pub(crate) fn with_first_child(child: Handle, capacity: usize) -> Self {
        let mut children = Vec::with_capacity(capacity + 1);
        children.push(child);
        Self {
            keys: Vec::with_capacity(capacity),
            children,
        }
    }

    pub(crate) fn is_overflow(&self, branching_factor: usize) -> bool {
        self.children.len() > branching_factor
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    /// Returns the index of the child whose subtree would hold `key`.
    ///
    /// A key equal to a separator belongs to the right-hand child, because the
    /// separator is that child's smallest key.
    #[inline]
    pub(crate) fn route<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match binary_search(&self.keys, key) {
            SearchResult::Found(idx) => idx + 1,
            SearchResult::NotFound(idx) => idx,
        }
    }

    /// Links a freshly split `sibling` in behind the child it was split from.
    ///
    /// If `separator` is already present the slot to its right is overwritten and
    /// the displaced child is returned. Well-formed trees never take that path.
    pub(crate) fn adopt(&mut self, separator: K, sibling: Handle) -> Option<Handle>
    where
        K: Ord,
    {
        match binary_search(&self.keys, &separator) {
            SearchResult::Found(idx) => Some(core::mem::replace(&mut self.children[idx + 1], sibling)),
            SearchResult::NotFound(idx) => {
                self.keys.insert(idx, separator);
                self.children.insert(idx + 1, sibling);
                None
            }
        }
    }

    /// Moves the upper half of this node into a new sibling.
    ///
    /// The key just left of the moved range is dropped from both halves; the
    /// caller promotes the sibling's first leaf key in its place.
    pub(crate) fn split(&mut self) -> InternalNode<K> {
        let begin = self.keys.len() / 2 + 1;

        let right = InternalNode {
            keys: self.keys.drain(begin..).collect(),
            children: self.children.drain(begin..).collect(),
        };
        self.keys.truncate(begin - 1);

        right
    }
}

impl<K, V> LeafNode<K, V> {
    /// Creates a new empty leaf node.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            prev: None,
            next: None,
            keys: Vec::with_capacity(capacity + 1),
            values: Vec::with_capacity(capacity + 1),
        }
    }

    /// Returns the number of keys in this node.
    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn is_overflow(&self, branching_factor: usize) -> bool {
        self.values.len() > branching_factor
    }

    /// Returns the previous leaf handle.
    pub(crate) fn prev(&self) -> Option<Handle> {
        self.prev
    }

    /// Sets the previous leaf handle.
    pub(crate) fn set_prev(&mut self, prev: Option<Handle>) {
        self.prev = prev;
    }

    /// Returns the next leaf handle.
    pub(crate) fn next(&self) -> Option<Handle> {
        self.next
    }

    /// Sets the next leaf handle.
    pub(crate) fn set_next(&mut self, next: Option<Handle>) {
        self.next = next;
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn bucket(&self, index: usize) -> &[V] {
        &self.values[index]
    }

    /// Returns the smallest key in this leaf, if any.
    pub(crate) fn first_key(&self) -> Option<&K> {
        self.keys.first()
    }

    /// Searches for a key in this leaf.
    #[inline]
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        binary_search(&self.keys, key)
    }

    /// Adds `value` to the bucket for `key`, creating the key if it is new.
    /// Returns true if the key was not present before.
    pub(crate) fn insert(&mut self, key: K, value: V) -> bool
    where
        K: Ord,
    {
        match self.search(&key) {
            SearchResult::Found(idx) => {
                self.values[idx].push(value);
                false
            }
            SearchResult::NotFound(idx) => {
                self.keys.insert(idx, key);
                self.values.insert(idx, smallvec![value]);
                true
            }
        }
    }

    /// Moves the upper half of this leaf into a new sibling.
    ///
    /// The left half keeps the extra key when the count is odd. Chain links are
    /// left to the caller, which owns the arena the sibling is placed in.
    pub(crate) fn split(&mut self) -> LeafNode<K, V> {
        let mid = self.keys.len().div_ceil(2);

        LeafNode {
            prev: None,
            next: None,
            keys: self.keys.drain(mid..).collect(),
            values: self.values.drain(mid..).collect(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec;

    fn handles(range: core::ops::Range<usize>) -> Vec<Handle> {
        range.map(Handle::from_index).collect()
    }

    fn internal(keys: Vec<i32>, children: Vec<Handle>) -> InternalNode<i32> {
        assert_eq!(children.len(), keys.len() + 1);
        InternalNode { keys, children }
    }

    #[test]
    fn route_sends_separator_matches_right() {
        let node = internal(vec![10, 20], handles(0..3));
        assert_eq!(node.route(&5), 0);
        assert_eq!(node.route(&10), 1);
        assert_eq!(node.route(&15), 1);
        assert_eq!(node.route(&20), 2);
        assert_eq!(node.route(&99), 2);
    }

    #[test]
    fn adopt_places_sibling_after_original_child() {
        let mut node = internal(vec![10, 30], handles(0..3));
        assert_eq!(node.adopt(20, Handle::from_index(7)), None);
        assert_eq!(node.keys(), &[10, 20, 30]);
        assert_eq!(
            node.children(),
            &[Handle::from_index(0), Handle::from_index(1), Handle::from_index(7), Handle::from_index(2)]
        );
    }

    #[test]
    fn adopt_existing_separator_overwrites_right_slot() {
        let mut node = internal(vec![10, 30], handles(0..3));
        assert_eq!(node.adopt(30, Handle::from_index(9)), Some(Handle::from_index(2)));
        assert_eq!(node.keys(), &[10, 30]);
        assert_eq!(node.child(2), Handle::from_index(9));
    }

    #[test]
    fn internal_split_drops_promoted_key() {
        // Four children overflow a branching factor of three.
        let mut left = internal(vec![10, 20, 30], handles(0..4));
        assert!(left.is_overflow(3));

        let right = left.split();
        assert_eq!(left.keys(), &[10]);
        assert_eq!(left.children(), handles(0..2).as_slice());
        assert_eq!(right.keys(), &[30]);
        assert_eq!(right.children(), handles(2..4).as_slice());
    }

    #[test]
    fn internal_split_with_even_key_count() {
        let mut left = internal(vec![1, 2, 3, 4], handles(0..5));
        let right = left.split();
        // begin = 4 / 2 + 1 = 3, key 3 is promoted.
        assert_eq!(left.keys(), &[1, 2]);
        assert_eq!(left.children().len(), 3);
        assert_eq!(right.keys(), &[4]);
        assert_eq!(right.children().len(), 2);
    }

    #[test]
    fn internal_split_at_minimum_factor_leaves_keyless_sibling() {
        let mut left = internal(vec![1, 2], handles(0..3));
        assert!(left.is_overflow(2));
        let right = left.split();
        assert_eq!(left.keys(), &[1]);
        assert_eq!(left.children().len(), 2);
        assert!(right.keys().is_empty());
        assert_eq!(right.children(), &[Handle::from_index(2)]);
    }

    #[test]
    fn leaf_insert_buckets_duplicates() {
        let mut leaf: LeafNode<i32, &str> = LeafNode::with_capacity(3);
        assert!(leaf.insert(8, "a"));
        assert!(leaf.insert(3, "b"));
        assert!(!leaf.insert(8, "c"));
        assert_eq!(leaf.keys(), &[3, 8]);
        assert_eq!(leaf.bucket(0), &["b"]);
        assert_eq!(leaf.bucket(1), &["a", "c"]);
        assert_eq!(leaf.first_key(), Some(&3));
    }

    #[test]
    fn leaf_overflow_counts_buckets_not_values() {
        let mut leaf: LeafNode<i32, i32> = LeafNode::with_capacity(3);
        for _ in 0..10 {
            leaf.insert(1, 1);
        }
        assert!(!leaf.is_overflow(3));
        for key in 2..=4 {
            leaf.insert(key, key);
        }
        assert!(leaf.is_overflow(3));
    }

    #[test]
    fn leaf_split_keeps_larger_half_on_the_left() {
        let mut left: LeafNode<i32, i32> = LeafNode::with_capacity(4);
        for key in 1..=5 {
            left.insert(key, key * 10);
        }
        let right = left.split();
        assert_eq!(left.keys(), &[1, 2, 3]);
        assert_eq!(right.keys(), &[4, 5]);
        assert_eq!(right.bucket(0), &[40]);
        assert!(right.prev().is_none() && right.next().is_none());
    }

    #[test]
    fn empty_leaf_has_no_first_key() {
        let leaf: LeafNode<i32, i32> = LeafNode::with_capacity(3);
        assert_eq!(leaf.first_key(), None);
        assert_eq!(leaf.key_count(), 0);
    }
}
