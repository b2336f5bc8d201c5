use std::{error, fmt};

/// Error enumerates over all possible errors that this package
/// shall return.
#[derive(Debug, PartialEq)]
pub enum Error<K>
where
    K: Clone + Ord,
{
    /// min(), max(), floor(), ceiling(), delete_min() or delete_max()
    /// called on an empty instance.
    Underflow,
    /// floor() or ceiling() found no qualifying key in the index.
    NoSuchBound,
    /// select() called with a rank outside `0..len()`.
    OutOfRange(usize),
    /// Returned by create() API when key is already present.
    OverwriteKey,
    /// Fatal case, two red links in a row.
    ConsecutiveReds,
    /// Fatal case, red link leaning right, carries the parent key.
    RightRed(K),
    /// Fatal case, breaking black balance. The String component of this
    /// variant can be used for debugging.
    UnbalancedBlacks(String),
    /// Fatal case, index entries are not in sort-order.
    SortError(K, K),
    /// Fatal case, subtree size of node does not match its children.
    SizeMismatch(K),
    /// Fatal case, rank(select(r)) != r.
    RankMismatch(usize),
}

impl<K> fmt::Display for Error<K>
where
    K: Clone + Ord + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Underflow => write!(f, "underflow, symbol table is empty"),
            Error::NoSuchBound => write!(f, "no key qualifies as bound"),
            Error::OutOfRange(rank) => write!(f, "rank {} out of range", rank),
            Error::OverwriteKey => write!(f, "key already present"),
            Error::ConsecutiveReds => write!(f, "consecutive red links"),
            Error::RightRed(key) => write!(f, "red right link under {:?}", key),
            Error::UnbalancedBlacks(msg) => write!(f, "unbalanced blacks {}", msg),
            Error::SortError(a, b) => write!(f, "sort error {:?} {:?}", a, b),
            Error::SizeMismatch(key) => write!(f, "size mismatch at {:?}", key),
            Error::RankMismatch(rank) => write!(f, "rank mismatch at {}", rank),
        }
    }
}

impl<K> error::Error for Error<K> where K: Clone + Ord + fmt::Debug {}
