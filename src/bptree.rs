use core::borrow::Borrow;
use core::fmt;

use alloc::vec::Vec;
use tracing::debug;

use crate::error::{Error, Result};
use crate::raw::RawBPTree;
use crate::Comparator;

mod iter;

pub use iter::Iter;

/// The smallest branching factor a tree accepts.
///
/// With a factor of 1 every freshly grown root would already overflow.
pub const MIN_BRANCHING_FACTOR: usize = 2;

/// The branching factor used by [`BPTree::default`].
pub const DEFAULT_BRANCHING_FACTOR: usize = 3;

/// An in-memory index based on a [B+ tree] that keeps every value inserted under a key.
///
/// Keys must implement [`Ord`]. Inserting a key that is already present does not replace
/// anything: the value is appended to that key's bucket, and lookups return the bucket's
/// values in insertion order. All values live in the leaves, which are chained together in
/// ascending key order so range searches and iteration walk the chain instead of
/// re-descending the tree.
///
/// The branching factor bounds both the children of an internal node and the number of
/// distinct keys in a leaf. It is fixed at construction.
///
/// It is a logic error for a key to be modified in such a way that the key's ordering relative to
/// any other key, as determined by the [`Ord`] trait, changes while it is in the tree.
///
/// # Examples
///
/// ```
/// use bptree_index::{BPTree, Comparator};
///
/// let mut prices = BPTree::new(3);
/// prices.insert(250, "espresso");
/// prices.insert(450, "latte");
/// prices.insert(250, "americano");
/// prices.insert(300, "cortado");
///
/// // Duplicates are kept, and every insert is counted.
/// assert_eq!(prices.len(), 4);
/// assert_eq!(prices.get(&250), Some(&"espresso"));
/// assert_eq!(prices.get_all(&250), Some(&["espresso", "americano"][..]));
///
/// // Range searches return values in ascending key order.
/// assert_eq!(
///     prices.range_search(&300, Comparator::AtMost),
///     [&"espresso", &"americano", &"cortado"]
/// );
/// assert_eq!(prices.range_search(&300, Comparator::AtLeast), [&"cortado", &"latte"]);
/// ```
///
/// Comparators can also be given as strings. Anything other than `<=`, `==` or `>=`, or a
/// missing key, yields an empty result instead of an error:
///
/// ```
/// use bptree_index::BPTree;
///
/// let mut tree = BPTree::new(3);
/// tree.extend([(1, 'a'), (2, 'b'), (3, 'c')]);
///
/// assert_eq!(tree.range_search_str(Some(&2), ">="), [&'b', &'c']);
/// assert!(tree.range_search_str(Some(&2), "<").is_empty());
/// assert!(tree.range_search_str(None, "==").is_empty());
/// ```
///
/// [B+ tree]: https://en.wikipedia.org/wiki/B%2B_tree
pub struct BPTree<K, V> {
    raw: RawBPTree<K, V>,
}

impl<K, V> BPTree<K, V> {
    /// Creates an empty tree with the given branching factor.
    ///
    /// # Panics
    ///
    /// Panics if `branching_factor` is less than [`MIN_BRANCHING_FACTOR`].
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BPTree;
    ///
    /// let tree: BPTree<u32, &str> = BPTree::new(4);
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.branching_factor(), 4);
    /// ```
    #[must_use]
    pub fn new(branching_factor: usize) -> Self {
        assert!(
            branching_factor >= MIN_BRANCHING_FACTOR,
            "`BPTree::new()` - branching factor must be at least {MIN_BRANCHING_FACTOR}, got {branching_factor}"
        );
        BPTree {
            raw: RawBPTree::new(branching_factor),
        }
    }

    /// Creates an empty tree, or reports a branching factor below [`MIN_BRANCHING_FACTOR`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBranchingFactor`] if `branching_factor` is too small.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::{BPTree, Error};
    ///
    /// assert!(BPTree::<i32, i32>::try_new(3).is_ok());
    /// assert_eq!(
    ///     BPTree::<i32, i32>::try_new(1).err(),
    ///     Some(Error::InvalidBranchingFactor { given: 1, min: 2 })
    /// );
    /// ```
    pub fn try_new(branching_factor: usize) -> Result<Self> {
        if branching_factor < MIN_BRANCHING_FACTOR {
            return Err(Error::InvalidBranchingFactor {
                given: branching_factor,
                min: MIN_BRANCHING_FACTOR,
            });
        }
        Ok(BPTree::new(branching_factor))
    }

    /// Returns the number of insertions performed, counting every duplicate.
    ///
    /// This is the number of stored values, not the number of distinct keys.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns true if nothing has been inserted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Returns the branching factor fixed at construction.
    #[must_use]
    pub const fn branching_factor(&self) -> usize {
        self.raw.branching_factor()
    }

    /// Returns the number of levels in the tree, including the leaf level.
    ///
    /// A tree whose root is still a leaf has height 1.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Gets an iterator over every `(key, value)` pair in ascending key order.
    ///
    /// Values sharing a key are yielded in insertion order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BPTree;
    ///
    /// let mut tree = BPTree::new(3);
    /// tree.extend([(3, 'c'), (1, 'a'), (3, 'd'), (2, 'b')]);
    ///
    /// let pairs: Vec<_> = tree.iter().collect();
    /// assert_eq!(pairs, [(&1, &'a'), (&2, &'b'), (&3, &'c'), (&3, &'d')]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.raw)
    }
}

impl<K: Clone + Ord, V> BPTree<K, V> {
    /// Inserts `value` under `key`.
    ///
    /// If `key` is already present the value joins the end of its bucket; nothing is replaced.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) {
        self.raw.insert(key, value);
    }

    /// Inserts `value` under `key`, rejecting a missing key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingKey`] if `key` is `None`; the tree is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::{BPTree, Error};
    ///
    /// let mut tree = BPTree::new(3);
    /// assert_eq!(tree.try_insert(Some(1), "one"), Ok(()));
    /// assert_eq!(tree.try_insert(None, "nothing"), Err(Error::MissingKey));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn try_insert(&mut self, key: Option<K>, value: V) -> Result<()> {
        let key = key.ok_or(Error::MissingKey)?;
        self.insert(key, value);
        Ok(())
    }

    /// Returns the first value inserted under `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BPTree;
    ///
    /// let mut tree = BPTree::new(3);
    /// tree.insert(8, "eighth");
    /// tree.insert(8, "octave");
    /// assert_eq!(tree.get(&8), Some(&"eighth"));
    /// assert_eq!(tree.get(&9), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.bucket(key)?.first()
    }

    /// Returns every value inserted under `key`, in insertion order.
    #[must_use]
    pub fn get_all<Q>(&self, key: &Q) -> Option<&[V]>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.bucket(key)
    }

    /// Returns true if at least one value has been inserted under `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).is_some()
    }

    /// Returns the values of every key that satisfies `comparator` against `key`.
    ///
    /// Values are ordered by ascending key, and by insertion order within a key.
    ///
    /// # Complexity
    ///
    /// O(log n + m) where m is the number of entries visited along the leaf chain.
    #[must_use]
    pub fn range_search<Q>(&self, key: &Q, comparator: Comparator) -> Vec<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.range_search(key, comparator)
    }

    /// Like [`range_search`](Self::range_search), with the comparator spelled as `<=`, `==` or `>=`.
    ///
    /// A missing key or any other comparator string yields an empty vector.
    #[must_use]
    pub fn range_search_str<Q>(&self, key: Option<&Q>, comparator: &str) -> Vec<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let comparator = match comparator.parse::<Comparator>() {
            Ok(comparator) => comparator,
            Err(err) => {
                debug!(%err, "range search ignored");
                return Vec::new();
            }
        };
        match key {
            Some(key) => self.raw.range_search(key, comparator),
            None => {
                debug!(%comparator, "range search without a key ignored");
                Vec::new()
            }
        }
    }
}

impl<K: fmt::Display, V> fmt::Display for BPTree<K, V> {
    /// Renders the key lists of every node, one line per level.
    ///
    /// ```
    /// use bptree_index::BPTree;
    ///
    /// let mut tree = BPTree::new(3);
    /// tree.extend([5, 4, 3, 6, 7].map(|k| (k, ())));
    /// assert_eq!(tree.to_string(), "{[5]}\n{[3, 4], [5, 6, 7]}\n");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.raw.write_levels(f)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BPTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for BPTree<K, V> {
    fn default() -> Self {
        BPTree::new(DEFAULT_BRANCHING_FACTOR)
    }
}

impl<K: Clone + Ord, V> Extend<(K, V)> for BPTree<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a BPTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}
