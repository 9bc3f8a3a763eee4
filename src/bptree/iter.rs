use core::fmt;
use core::iter::FusedIterator;

use crate::raw::{Handle, LeafNode, RawBPTree};

/// An iterator over the entries of a `BPTree`, in ascending key order.
///
/// Keys with several values are yielded once per value, in insertion order.
/// The iterator walks the leaf chain forward from the first leaf and, from the
/// back, along the `prev` links from the last leaf.
///
/// This `struct` is created by the [`iter`] method on [`BPTree`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use bptree_index::BPTree;
///
/// let mut tree = BPTree::new(3);
/// tree.insert(2, "b");
/// tree.insert(1, "a");
/// tree.insert(2, "c");
///
/// let mut iter = tree.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next_back(), Some((&2, &"c")));
/// assert_eq!(iter.next(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: super::BPTree::iter
/// [`BPTree`]: super::BPTree
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    tree: &'a RawBPTree<K, V>,
    front: Cursor,
    back: Cursor,
    remaining: usize,
}

// Front cursor: next entry to yield.
// Back cursor: one past the last entry to yield, so `key` and `value` count down to 0.
#[derive(Clone, Copy)]
struct Cursor {
    leaf: Handle,
    key: usize,
    value: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(super) fn new(tree: &'a RawBPTree<K, V>) -> Self {
        let last_leaf = tree.last_leaf();
        let leaf = tree.node(last_leaf).as_leaf();
        Iter {
            tree,
            front: Cursor {
                leaf: tree.first_leaf(),
                key: 0,
                value: 0,
            },
            back: Cursor {
                leaf: last_leaf,
                key: leaf.key_count(),
                value: last_bucket_len(leaf),
            },
            remaining: tree.len(),
        }
    }
}

fn last_bucket_len<K, V>(leaf: &LeafNode<K, V>) -> usize {
    match leaf.key_count() {
        0 => 0,
        count => leaf.bucket(count - 1).len(),
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

impl<'a, K: 'a, V: 'a> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let tree = self.tree;
        loop {
            let leaf = tree.node(self.front.leaf).as_leaf();
            if self.front.key == leaf.key_count() {
                self.front = Cursor {
                    leaf: leaf.next()?,
                    key: 0,
                    value: 0,
                };
                continue;
            }

            let bucket = leaf.bucket(self.front.key);
            if let Some(value) = bucket.get(self.front.value) {
                let key = leaf.key(self.front.key);
                self.front.value += 1;
                self.remaining -= 1;
                return Some((key, value));
            }

            self.front.key += 1;
            self.front.value = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: 'a, V: 'a> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let tree = self.tree;
        loop {
            let leaf = tree.node(self.back.leaf).as_leaf();
            if self.back.key == 0 {
                let prev_handle = leaf.prev()?;
                let prev = tree.node(prev_handle).as_leaf();
                self.back = Cursor {
                    leaf: prev_handle,
                    key: prev.key_count(),
                    value: last_bucket_len(prev),
                };
                continue;
            }

            if self.back.value > 0 {
                self.back.value -= 1;
                self.remaining -= 1;
                let idx = self.back.key - 1;
                return Some((leaf.key(idx), &leaf.bucket(idx)[self.back.value]));
            }

            self.back.key -= 1;
            self.back.value = match self.back.key {
                0 => 0,
                key => leaf.bucket(key - 1).len(),
            };
        }
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
