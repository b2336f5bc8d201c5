use std::ops::Bound;

use crate::node::Node;

#[derive(Clone, Copy, PartialEq)]
enum Order {
    Ascending,
    Descending,
}

/// Iterator over a range of entries in [`Llrb`](crate::Llrb).
///
/// Entries are copied out of the tree in batches of a fixed size. Once a
/// batch is drained the next one is fetched by walking again from the
/// root, starting just past the last key handed out. The range yields
/// ascending keys by default; [`Range::rev`] turns it around.
#[derive(Clone)]
pub struct Range<'a, K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    root: Option<&'a Node<K, V>>,
    batch: std::vec::IntoIter<(K, V)>,
    low: Bound<K>,
    high: Bound<K>,
    order: Order,
    limit: usize,
    done: bool,
}

impl<'a, K, V> Range<'a, K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    pub(crate) fn new(
        root: Option<&'a Node<K, V>>,
        low: Bound<K>,
        high: Bound<K>,
        limit: usize,
    ) -> Range<'a, K, V> {
        Range {
            root,
            batch: vec![].into_iter(),
            low,
            high,
            order: Order::Ascending,
            limit,
            done: limit == 0,
        }
    }

    // range that yields nothing.
    pub(crate) fn empty() -> Range<'a, K, V> {
        Range::new(None, Bound::Unbounded, Bound::Unbounded, 0)
    }

    /// Walk the entries not yet returned in the opposite direction.
    pub fn rev(mut self) -> Range<'a, K, V> {
        // entries sitting in the current batch were never handed out,
        // widen the resume bound to cover them again.
        if let Some((key, _)) = self.batch.as_slice().first() {
            match self.order {
                Order::Ascending => self.low = Bound::Included(key.clone()),
                Order::Descending => self.high = Bound::Included(key.clone()),
            }
            self.done = self.limit == 0;
        }
        self.batch = vec![].into_iter();
        self.order = match self.order {
            Order::Ascending => Order::Descending,
            Order::Descending => Order::Ascending,
        };
        self
    }

    fn below_low(&self, key: &K) -> bool {
        match &self.low {
            Bound::Included(low) => key < low,
            Bound::Excluded(low) => key <= low,
            Bound::Unbounded => false,
        }
    }

    fn above_high(&self, key: &K) -> bool {
        match &self.high {
            Bound::Included(high) => key > high,
            Bound::Excluded(high) => key >= high,
            Bound::Unbounded => false,
        }
    }

    // Collect up to `limit` in-range entries, in iteration order, with an
    // explicit stack. Sub-trees that fall outside either bound are skipped.
    fn fill(&self) -> Vec<(K, V)> {
        let ascending = self.order == Order::Ascending;
        let near = |n: &'a Node<K, V>| {
            if ascending {
                n.left_deref()
            } else {
                n.right_deref()
            }
        };
        let far = |n: &'a Node<K, V>| {
            if ascending {
                n.right_deref()
            } else {
                n.left_deref()
            }
        };

        let mut acc = Vec::with_capacity(self.limit);
        let mut stack: Vec<&'a Node<K, V>> = vec![];
        let mut node = self.root;
        loop {
            while let Some(n) = node {
                let (before, beyond) = if ascending {
                    (self.below_low(&n.key), self.above_high(&n.key))
                } else {
                    (self.above_high(&n.key), self.below_low(&n.key))
                };
                node = if before {
                    far(n)
                } else if beyond {
                    near(n)
                } else {
                    stack.push(n);
                    near(n)
                };
            }
            match stack.pop() {
                Some(n) => {
                    acc.push((n.key.clone(), n.value.clone()));
                    if acc.len() >= self.limit {
                        break;
                    }
                    node = far(n);
                }
                None => break,
            }
        }
        acc
    }
}

impl<'a, K, V> Iterator for Range<'a, K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.batch.next() {
            return Some(item);
        }
        if self.done {
            return None;
        }

        let acc = self.fill();
        self.done = acc.len() < self.limit;
        if let Some((key, _)) = acc.last() {
            let resume = Bound::Excluded(key.clone());
            match self.order {
                Order::Ascending => self.low = resume,
                Order::Descending => self.high = resume,
            }
        }
        self.batch = acc.into_iter();
        self.batch.next()
    }
}

/// Lazy sequence of keys from [`Llrb`](crate::Llrb), in ascending
/// order. Returned by [`Llrb::keys`](crate::Llrb::keys) and
/// [`Llrb::keys_between`](crate::Llrb::keys_between).
#[derive(Clone)]
pub struct Keys<'a, K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    range: Range<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    pub(crate) fn new(range: Range<'a, K, V>) -> Keys<'a, K, V> {
        Keys { range }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(|(key, _)| key)
    }
}

#[cfg(test)]
#[path = "iter_test.rs"]
mod iter_test;
