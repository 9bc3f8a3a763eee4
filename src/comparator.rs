use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use alloc::string::ToString;

use crate::error::Error;

/// The three range-search modes supported by [`BPTree::range_search`].
///
/// Each mode is tested against the key stored in the tree (`stored`) and the
/// key supplied by the caller (`query`).
///
/// # Examples
///
/// ```
/// use bptree_index::Comparator;
///
/// let comparator: Comparator = ">=".parse().unwrap();
/// assert_eq!(comparator, Comparator::AtLeast);
/// assert!(comparator.matches(&7, &5));
/// assert!("<".parse::<Comparator>().is_err());
/// ```
///
/// [`BPTree::range_search`]: crate::BPTree::range_search
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Comparator {
    /// `<=`: every stored key less than or equal to the query.
    AtMost,
    /// `==`: the stored key equal to the query.
    Equal,
    /// `>=`: every stored key greater than or equal to the query.
    AtLeast,
}

impl Comparator {
    /// Returns the operator spelling of this comparator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Comparator::AtMost => "<=",
            Comparator::Equal => "==",
            Comparator::AtLeast => ">=",
        }
    }

    /// Returns true if a key stored in the tree satisfies this comparator against `query`.
    #[inline]
    #[must_use]
    pub fn matches<Q>(self, stored: &Q, query: &Q) -> bool
    where
        Q: ?Sized + Ord,
    {
        let ordering = stored.cmp(query);
        match self {
            Comparator::AtMost => ordering != Ordering::Greater,
            Comparator::Equal => ordering == Ordering::Equal,
            Comparator::AtLeast => ordering != Ordering::Less,
        }
    }

    /// Returns true if neither `stored` nor any larger key can satisfy this comparator.
    ///
    /// Scans walk the leaf chain in ascending order, so they stop at the first exhausted key.
    #[inline]
    #[must_use]
    pub fn exhausted<Q>(self, stored: &Q, query: &Q) -> bool
    where
        Q: ?Sized + Ord,
    {
        match self {
            Comparator::AtMost | Comparator::Equal => stored > query,
            Comparator::AtLeast => false,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Comparator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<=" => Ok(Comparator::AtMost),
            "==" => Ok(Comparator::Equal),
            ">=" => Ok(Comparator::AtLeast),
            other => Err(Error::UnknownComparator(other.to_string())),
        }
    }
}
