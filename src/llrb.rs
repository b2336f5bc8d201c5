use std::{
    borrow::Borrow,
    cmp::{Ord, Ordering},
    fmt, mem,
    ops::{Bound, Deref, RangeBounds},
};

use log::{debug, trace};
use rand::Rng;

use crate::depth::Depth;
use crate::error::Error;
use crate::iter::{Keys, Range};
use crate::node::{self, is_black, is_red, Node};

/// Batch size used by iterators while scanning the tree.
pub(crate) const ITER_LIMIT: usize = 100;

/// Llrb manage a single instance of in-memory symbol table using
/// [left-leaning-red-black][llrb] tree. Every node carries the size of
/// its sub-tree, which makes rank and select queries logarithmic.
///
/// Insert and delete are iterative, the path walked down the tree is
/// kept in an explicit stack and replayed on the way back up.
///
/// [llrb]: https://en.wikipedia.org/wiki/Left-leaning_red-black_tree
#[derive(Clone)]
pub struct Llrb<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    name: String,
    root: Option<Box<Node<K, V>>>,
}

/// Direction taken from a node while walking down the tree.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Side {
    Left,
    Right,
}

/// Nodes detached while walking down, along with the child link each one
/// was left through.
type Path<K, V> = Vec<(Box<Node<K, V>>, Side)>;

type Delmin<K, V> = (Option<Box<Node<K, V>>>, Box<Node<K, V>>);

/// Different ways to construct a new Llrb instance.
impl<K, V> Llrb<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    /// Create an empty instance of Llrb, identified by `name`.
    /// Applications can choose unique names.
    pub fn new<S>(name: S) -> Llrb<K, V>
    where
        S: AsRef<str>,
    {
        Llrb {
            name: name.as_ref().to_string(),
            root: Default::default(),
        }
    }

    /// Create a new instance of Llrb tree and load it with entries
    /// from `iter`. Note that iterator should return (key, value) tuples,
    /// where key must be ``unique``.
    pub fn load_from<S, I>(name: S, iter: I) -> Result<Llrb<K, V>, Error<K>>
    where
        S: AsRef<str>,
        I: Iterator<Item = (K, V)>,
    {
        let mut llrb = Llrb::new(name);
        for (key, value) in iter {
            llrb.create(key, value)?;
        }
        debug!("load_from(): {} loaded {} entries", llrb.name, llrb.len());
        Ok(llrb)
    }
}

/// Maintenance API.
impl<K, V> Llrb<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    /// Identify this instance. Applications can choose unique names while
    /// creating Llrb instances.
    #[inline]
    pub fn id(&self) -> String {
        self.name.clone()
    }

    /// Return number of entries in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        node::size(self.root_deref())
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Return the height of the tree, counted in links. An empty tree
    /// and a single-node tree both have height zero.
    pub fn height(&self) -> usize {
        let mut stack: Vec<(&Node<K, V>, usize)> = vec![];
        stack.extend(self.root_deref().map(|n| (n, 0)));
        let mut height = 0;
        while let Some((node, depth)) = stack.pop() {
            height = std::cmp::max(height, depth);
            stack.extend(node.left_deref().map(|n| (n, depth + 1)));
            stack.extend(node.right_deref().map(|n| (n, depth + 1)));
        }
        height
    }

    /// Return quickly with basic statisics, only entries() method is valid
    /// with this statisics.
    pub fn stats(&self) -> Stats {
        Stats::new(self.len(), mem::size_of::<Node<K, V>>())
    }

    #[inline]
    pub(crate) fn root_deref(&self) -> Option<&Node<K, V>> {
        self.root.as_ref().map(Deref::deref)
    }
}

/// Write operations on Llrb instance.
impl<K, V> Llrb<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    /// Create a new {key, value} entry in the index. If key is already
    /// present return error and leave the index untouched.
    pub fn create(&mut self, key: K, value: V) -> Result<(), Error<K>> {
        if self.contains(&key) {
            return Err(Error::OverwriteKey);
        }
        self.set(key, value);
        Ok(())
    }

    /// Set value for key. If there is an existing entry for key,
    /// overwrite the old value with new value and return the old value.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let (mut root, old_value) = Llrb::insert(self.root.take(), key, value);
        root.set_black();
        self.root = Some(root);
        old_value
    }

    /// Put value for key. `Some(value)` behaves like [`Llrb::set`], while
    /// `None` is an alias for [`Llrb::delete`]. In both cases the previous
    /// value for key, if any, is returned.
    pub fn put(&mut self, key: K, value: Option<V>) -> Option<V> {
        match value {
            Some(value) => self.set(key, value),
            None => self.delete(&key),
        }
    }

    /// Delete key from this instance and return its value. If key is
    /// not present, then delete is effectively a no-op.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if !self.contains(key) {
            debug!("delete(): {} key not found", self.name);
            return None;
        }

        let mut root = self.root.take()?;
        Llrb::seed_root(&mut root);
        let (root, old_value) = Llrb::do_delete(root, key);
        self.root = root.map(|mut root| {
            root.set_black();
            root
        });
        Some(old_value)
    }

    /// Delete the smallest key from this instance and return the entry.
    pub fn delete_min(&mut self) -> Result<(K, V), Error<K>> {
        let mut root = self.root.take().ok_or(Error::Underflow)?;
        Llrb::seed_root(&mut root);
        let (root, old_node) = Llrb::do_delete_min(root);
        self.root = root.map(|mut root| {
            root.set_black();
            root
        });
        let Node { key, value, .. } = *old_node;
        Ok((key, value))
    }

    /// Delete the largest key from this instance and return the entry.
    pub fn delete_max(&mut self) -> Result<(K, V), Error<K>> {
        let mut root = self.root.take().ok_or(Error::Underflow)?;
        Llrb::seed_root(&mut root);
        let (root, old_node) = Llrb::do_delete_max(root);
        self.root = root.map(|mut root| {
            root.set_black();
            root
        });
        let Node { key, value, .. } = *old_node;
        Ok((key, value))
    }

    /// Validate LLRB tree with following rules:
    ///
    /// * Keys are in strict sorted order across the whole tree.
    /// * No red link leans right.
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * Number of blacks should be same under left child and right child.
    /// * Size of every node is the count of its sub-tree.
    /// * rank() and select() are inverse of each other.
    ///
    /// Additionally return full statistics on the tree. Refer to [`Stats`]
    /// for more information.
    pub fn validate(&self) -> Result<Stats, Error<K>> {
        let root = self.root_deref();
        let (red, nb, d) = (is_red(root), 0, 0);
        let mut stats = Stats::new(self.len(), mem::size_of::<Node<K, V>>());
        stats.set_depths(Depth::new());
        let blacks = Llrb::validate_tree(root, red, nb, d, (None, None), &mut stats)?;
        stats.set_blacks(blacks);

        for rank in 0..self.len() {
            let key = self.select(rank)?;
            if self.rank(&key) != rank {
                return Err(Error::RankMismatch(rank));
            }
        }
        stats.set_height(self.height());
        debug!("validate(): {} ok, {} entries", self.name, stats.entries());
        Ok(stats)
    }
}

/// Read operations on Llrb instance.
impl<K, V> Llrb<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    /// Get the value for key.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self.root_deref();
        while let Some(nref) = node {
            node = match nref.key.borrow().cmp(key) {
                Ordering::Less => nref.right_deref(),
                Ordering::Greater => nref.left_deref(),
                Ordering::Equal => return Some(nref.value.clone()),
            };
        }
        None
    }

    /// Check whether key is present in this instance.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self.root_deref();
        while let Some(nref) = node {
            node = match nref.key.borrow().cmp(key) {
                Ordering::Less => nref.right_deref(),
                Ordering::Greater => nref.left_deref(),
                Ordering::Equal => return true,
            };
        }
        false
    }

    /// Return the smallest key.
    pub fn min(&self) -> Result<K, Error<K>> {
        let mut nref = self.root_deref().ok_or(Error::Underflow)?;
        while let Some(left) = nref.left_deref() {
            nref = left;
        }
        Ok(nref.key.clone())
    }

    /// Return the largest key.
    pub fn max(&self) -> Result<K, Error<K>> {
        let mut nref = self.root_deref().ok_or(Error::Underflow)?;
        while let Some(right) = nref.right_deref() {
            nref = right;
        }
        Ok(nref.key.clone())
    }

    /// Return the largest key less than or equal to `key`.
    pub fn floor<Q>(&self, key: &Q) -> Result<K, Error<K>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = Some(self.root_deref().ok_or(Error::Underflow)?);
        let mut best: Option<&Node<K, V>> = None;
        while let Some(nref) = node {
            node = match nref.key.borrow().cmp(key) {
                Ordering::Equal => return Ok(nref.key.clone()),
                Ordering::Greater => nref.left_deref(),
                Ordering::Less => {
                    best = Some(nref);
                    nref.right_deref()
                }
            };
        }
        best.map(|n| n.key.clone()).ok_or(Error::NoSuchBound)
    }

    /// Return the smallest key greater than or equal to `key`.
    pub fn ceiling<Q>(&self, key: &Q) -> Result<K, Error<K>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = Some(self.root_deref().ok_or(Error::Underflow)?);
        let mut best: Option<&Node<K, V>> = None;
        while let Some(nref) = node {
            node = match nref.key.borrow().cmp(key) {
                Ordering::Equal => return Ok(nref.key.clone()),
                Ordering::Less => nref.right_deref(),
                Ordering::Greater => {
                    best = Some(nref);
                    nref.left_deref()
                }
            };
        }
        best.map(|n| n.key.clone()).ok_or(Error::NoSuchBound)
    }

    /// Return the key of given `rank`, that is, the key with exactly
    /// `rank` smaller keys in the index.
    pub fn select(&self, rank: usize) -> Result<K, Error<K>> {
        if rank >= self.len() {
            return Err(Error::OutOfRange(rank));
        }
        let mut rank = rank;
        let mut node = self.root_deref();
        while let Some(nref) = node {
            let left_size = node::size(nref.left_deref());
            node = match left_size.cmp(&rank) {
                Ordering::Greater => nref.left_deref(),
                Ordering::Less => {
                    rank -= left_size + 1;
                    nref.right_deref()
                }
                Ordering::Equal => return Ok(nref.key.clone()),
            };
        }
        unreachable!("select(): size fields out of sync, call the programmer")
    }

    /// Return the number of keys strictly less than `key`.
    pub fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut rank = 0;
        let mut node = self.root_deref();
        while let Some(nref) = node {
            node = match nref.key.borrow().cmp(key) {
                Ordering::Greater => nref.left_deref(),
                Ordering::Less => {
                    rank += 1 + node::size(nref.left_deref());
                    nref.right_deref()
                }
                Ordering::Equal => return rank + node::size(nref.left_deref()),
            };
        }
        rank
    }

    /// Return the number of keys in the closed range `[low, high]`.
    pub fn len_between<Q>(&self, low: &Q, high: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if low > high {
            0
        } else if self.contains(high) {
            self.rank(high) - self.rank(low) + 1
        } else {
            self.rank(high) - self.rank(low)
        }
    }

    /// Return a random entry from this index.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<(K, V)> {
        let mut nref = self.root_deref()?;

        let mut at_depth = rng.gen::<u8>() % 40;
        loop {
            let next = match rng.gen::<u8>() % 2 {
                0 => nref.left_deref(),
                _ => nref.right_deref(),
            };
            match next {
                Some(next) if at_depth > 0 => {
                    at_depth -= 1;
                    nref = next;
                }
                _ => break Some((nref.key.clone(), nref.value.clone())),
            }
        }
    }

    /// Return an iterator over all entries in this instance.
    pub fn iter(&self) -> Range<K, V> {
        self.range::<K, _>(..)
    }

    /// Range over all entries from low to high.
    pub fn range<Q, R>(&self, range: R) -> Range<K, V>
    where
        K: Borrow<Q>,
        R: RangeBounds<Q>,
        Q: Ord + ToOwned<Owned = K> + ?Sized,
    {
        let low: Bound<K> = match range.start_bound() {
            Bound::Included(key) => Bound::Included(key.to_owned()),
            Bound::Excluded(key) => Bound::Excluded(key.to_owned()),
            Bound::Unbounded => Bound::Unbounded,
        };
        let high: Bound<K> = match range.end_bound() {
            Bound::Included(key) => Bound::Included(key.to_owned()),
            Bound::Excluded(key) => Bound::Excluded(key.to_owned()),
            Bound::Unbounded => Bound::Unbounded,
        };
        Range::new(self.root_deref(), low, high, ITER_LIMIT)
    }

    /// Return all keys in ascending order.
    pub fn keys(&self) -> Keys<K, V> {
        Keys::new(self.range::<K, _>(..))
    }

    /// Return keys in the closed range `[low, high]` in ascending order.
    /// If `low` is greater than `high` the sequence is empty.
    pub fn keys_between<Q>(&self, low: &Q, high: &Q) -> Keys<K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        // narrow the bounds down to keys present in the index.
        match (self.ceiling(low), self.floor(high)) {
            (Ok(low), Ok(high)) if low <= high => {
                let (low, high) = (Bound::Included(low), Bound::Included(high));
                Keys::new(Range::new(self.root_deref(), low, high, ITER_LIMIT))
            }
            _ => Keys::new(Range::empty()),
        }
    }
}

// Iterative insert, delete and delete-min/max. Nodes are detached from
// their parent on the way down, pushed on a path stack, and re-attached
// on the way up.
impl<K, V> Llrb<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    fn insert(node: Option<Box<Node<K, V>>>, key: K, value: V) -> (Box<Node<K, V>>, Option<V>) {
        let mut path: Vec<Box<Node<K, V>>> = vec![];
        let mut next = node;
        while let Some(mut node) = next {
            next = match node.key.cmp(&key) {
                Ordering::Greater => node.left.take(),
                Ordering::Less => node.right.take(),
                Ordering::Equal => {
                    // no structural change, put the path back as it was.
                    let old_value = node.set_value(value);
                    return (Llrb::relink(path, node), Some(old_value));
                }
            };
            path.push(node);
        }
        trace!("insert(): new node at depth {}", path.len());

        let mut child = Node::new(key, value, false /*black*/);
        while let Some(mut parent) = path.pop() {
            if child.key < parent.key {
                parent.left = Some(child);
            } else {
                parent.right = Some(child);
            }
            child = node::walkuprot_23(parent);
        }
        (child, None)
    }

    // Re-attach detached nodes to their parents, without rebalancing.
    fn relink(mut path: Vec<Box<Node<K, V>>>, mut child: Box<Node<K, V>>) -> Box<Node<K, V>> {
        while let Some(mut parent) = path.pop() {
            if child.key < parent.key {
                parent.left = Some(child);
            } else {
                parent.right = Some(child);
            }
            child = parent;
        }
        child
    }

    // If both children of root are black, set root to red.
    fn seed_root(root: &mut Node<K, V>) {
        if !is_red(root.left_deref()) && !is_red(root.right_deref()) {
            trace!("seed_root(): paint root red");
            root.set_red();
        }
    }

    // Pop the path stack, attaching the child to the recorded side of its
    // parent and rebalancing the parent, until the stack is exhausted.
    fn unwind(mut path: Path<K, V>, mut child: Option<Box<Node<K, V>>>) -> Option<Box<Node<K, V>>> {
        while let Some((mut parent, side)) = path.pop() {
            match side {
                Side::Left => parent.left = child,
                Side::Right => parent.right = child,
            }
            child = Some(node::fixup(parent));
        }
        child
    }

    fn do_delete_min(mut node: Box<Node<K, V>>) -> Delmin<K, V> {
        let mut path: Path<K, V> = vec![];
        loop {
            if node.left.is_none() {
                break;
            }
            let left = node.left_deref();
            if is_black(left) && is_black(left.and_then(Node::left_deref)) {
                node = node::move_red_left(node);
            }
            match node.left.take() {
                Some(left) => {
                    path.push((node, Side::Left));
                    node = left;
                }
                None => panic!("do_delete_min(): fatal logic, call the programmer"),
            }
        }
        trace!("do_delete_min(): path depth {}", path.len());
        debug_assert!(node.right.is_none());
        (Llrb::unwind(path, None), node)
    }

    fn do_delete_max(mut node: Box<Node<K, V>>) -> Delmin<K, V> {
        let mut path: Path<K, V> = vec![];
        loop {
            if is_red(node.left_deref()) {
                node = node::rotate_right(node);
            }
            if node.right.is_none() {
                break;
            }
            let right = node.right_deref();
            if is_black(right) && is_black(right.and_then(Node::left_deref)) {
                node = node::move_red_right(node);
            }
            match node.right.take() {
                Some(right) => {
                    path.push((node, Side::Right));
                    node = right;
                }
                None => panic!("do_delete_max(): fatal logic, call the programmer"),
            }
        }
        trace!("do_delete_max(): path depth {}", path.len());
        debug_assert!(node.left.is_none());
        (Llrb::unwind(path, None), node)
    }

    // key must be present in the tree rooted at node.
    fn do_delete<Q>(mut node: Box<Node<K, V>>, key: &Q) -> (Option<Box<Node<K, V>>>, V)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut path: Path<K, V> = vec![];
        let (tail, old_value) = loop {
            if node.key.borrow().gt(key) {
                let left = node.left_deref();
                if is_black(left) && is_black(left.and_then(Node::left_deref)) {
                    node = node::move_red_left(node);
                }
                match node.left.take() {
                    Some(left) => {
                        path.push((node, Side::Left));
                        node = left;
                    }
                    None => panic!("do_delete(): fatal logic, call the programmer"),
                }
                continue;
            }

            if is_red(node.left_deref()) {
                node = node::rotate_right(node);
            }
            if node.key.borrow().eq(key) && node.right.is_none() {
                // leaf equivalent, drop this node.
                debug_assert!(node.left.is_none());
                break (None, node.value);
            }

            let right = node.right_deref();
            if is_black(right) && is_black(right.and_then(Node::left_deref)) {
                node = node::move_red_right(node);
            }

            if node.key.borrow().eq(key) {
                // splice in-order successor in place of this node.
                let right = match node.right.take() {
                    Some(right) => right,
                    None => panic!("do_delete(): fatal logic, call the programmer"),
                };
                let (right, mut succ) = Llrb::do_delete_min(right);
                node.right = right;
                mem::swap(&mut node.key, &mut succ.key);
                let old_value = node.set_value(succ.value);
                break (Some(node::fixup(node)), old_value);
            }

            match node.right.take() {
                Some(right) => {
                    path.push((node, Side::Right));
                    node = right;
                }
                None => panic!("do_delete(): fatal logic, call the programmer"),
            }
        };
        trace!("do_delete(): path depth {}", path.len());
        (Llrb::unwind(path, tail), old_value)
    }

    fn validate_tree(
        node: Option<&Node<K, V>>,
        fromred: bool,
        mut nb: usize,
        depth: usize,
        (low, high): (Option<&K>, Option<&K>),
        stats: &mut Stats,
    ) -> Result<usize, Error<K>> {
        let node = match node {
            None => {
                stats.sample_depth(depth);
                return Ok(nb);
            }
            Some(node) => node,
        };

        let red = !node.is_black();
        if fromred && red {
            return Err(Error::ConsecutiveReds);
        }
        if is_red(node.right_deref()) {
            return Err(Error::RightRed(node.key.clone()));
        }
        if !red {
            nb += 1;
        }
        if let Some(low) = low {
            if node.key.le(low) {
                return Err(Error::SortError(low.clone(), node.key.clone()));
            }
        }
        if let Some(high) = high {
            if node.key.ge(high) {
                return Err(Error::SortError(node.key.clone(), high.clone()));
            }
        }
        let (left, right) = (node.left_deref(), node.right_deref());
        if node.size != 1 + node::size(left) + node::size(right) {
            return Err(Error::SizeMismatch(node.key.clone()));
        }

        let key = Some(&node.key);
        let lblacks = Llrb::validate_tree(left, red, nb, depth + 1, (low, key), stats)?;
        let rblacks = Llrb::validate_tree(right, red, nb, depth + 1, (key, high), stats)?;
        if lblacks != rblacks {
            let err = format!("left: {} right: {}", lblacks, rblacks);
            return Err(Error::UnbalancedBlacks(err));
        }
        Ok(lblacks)
    }
}

impl<K, V> fmt::Debug for Llrb<K, V>
where
    K: Clone + Ord + fmt::Debug,
    V: Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Statistics on [`Llrb`] tree. Serves two purpose:
///
/// * To get partial but quick statistics via [`Llrb::stats`] method.
/// * To get full statisics via [`Llrb::validate`] method.
#[derive(Default, Debug)]
pub struct Stats {
    entries: usize, // number of entries in the tree.
    node_size: usize,
    blacks: Option<usize>,
    height: Option<usize>,
    depths: Option<Depth>,
}

impl Stats {
    fn new(entries: usize, node_size: usize) -> Stats {
        Stats {
            entries,
            node_size,
            blacks: Default::default(),
            height: Default::default(),
            depths: Default::default(),
        }
    }

    #[inline]
    fn set_blacks(&mut self, blacks: usize) {
        self.blacks = Some(blacks)
    }

    #[inline]
    fn set_height(&mut self, height: usize) {
        self.height = Some(height)
    }

    #[inline]
    fn set_depths(&mut self, depths: Depth) {
        self.depths = Some(depths)
    }

    #[inline]
    fn sample_depth(&mut self, depth: usize) {
        if let Some(depths) = self.depths.as_mut() {
            depths.sample(depth)
        }
    }

    /// Return number entries in [`Llrb`] instance.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Return node-size, including over-head for `Llrb<k,V>`. Although
    /// the node overhead is constant, the node size varies based on
    /// key and value types. EG:
    ///
    /// ```
    /// use llrb_symtab::Llrb;
    /// let mut llrb: Llrb<u64,u64> = Llrb::new("myinstance");
    ///
    /// // size of key: 8 bytes
    /// // size of value: 8 bytes
    /// // overhead is 32 bytes
    /// assert_eq!(llrb.stats().node_size(), 48);
    /// ```
    #[inline]
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Return number of black nodes from root to leaf, on both left
    /// and right child.
    #[inline]
    pub fn blacks(&self) -> Option<usize> {
        self.blacks
    }

    /// Return the height of the tree, in links.
    #[inline]
    pub fn height(&self) -> Option<usize> {
        self.height
    }

    /// Return [`Depth`] statistics.
    pub fn depths(&self) -> Option<Depth> {
        match &self.depths {
            Some(depths) if depths.samples() > 0 => Some(depths.clone()),
            _ => None,
        }
    }
}
