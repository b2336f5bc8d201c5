use std::ops::{Deref, DerefMut};

use log::trace;

/// Node corresponds to a single entry in Llrb instance.
#[derive(Clone)]
pub struct Node<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) black: bool,                    // store: black or red
    pub(crate) size: usize,                    // store: nodes in this sub-tree
    pub(crate) left: Option<Box<Node<K, V>>>,  // store: left child
    pub(crate) right: Option<Box<Node<K, V>>>, // store: right child
}

// Primary operations on a single node.
impl<K, V> Node<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    // CREATE operation
    pub(crate) fn new(key: K, value: V, black: bool) -> Box<Node<K, V>> {
        Box::new(Node {
            key,
            value,
            black,
            size: 1,
            left: None,
            right: None,
        })
    }

    /// Return the key of this entry.
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Return the value of this entry.
    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Return the number of entries in the sub-tree rooted at this node.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub(crate) fn left_deref(&self) -> Option<&Node<K, V>> {
        self.left.as_ref().map(Deref::deref)
    }

    #[inline]
    pub(crate) fn right_deref(&self) -> Option<&Node<K, V>> {
        self.right.as_ref().map(Deref::deref)
    }

    // prepend operation, equivalent to SET / INSERT / UPDATE
    #[inline]
    pub(crate) fn set_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    #[inline]
    pub(crate) fn update_size(&mut self) {
        self.size = 1 + size(self.left_deref()) + size(self.right_deref());
    }

    #[inline]
    pub(crate) fn set_red(&mut self) {
        self.black = false
    }

    #[inline]
    pub(crate) fn set_black(&mut self) {
        self.black = true
    }

    #[inline]
    pub(crate) fn toggle_link(&mut self) {
        self.black = !self.black
    }

    #[inline]
    pub(crate) fn is_black(&self) -> bool {
        self.black
    }
}

pub(crate) fn is_red<K, V>(node: Option<&Node<K, V>>) -> bool
where
    K: Clone + Ord,
    V: Clone,
{
    node.map_or(false, |node| !node.is_black())
}

pub(crate) fn is_black<K, V>(node: Option<&Node<K, V>>) -> bool
where
    K: Clone + Ord,
    V: Clone,
{
    node.map_or(true, |node| node.is_black())
}

pub(crate) fn size<K, V>(node: Option<&Node<K, V>>) -> usize
where
    K: Clone + Ord,
    V: Clone,
{
    node.map_or(0, |node| node.size)
}

// is the left child red, and its left child red as well.
#[inline]
fn is_red_red_left<K, V>(node: &Node<K, V>) -> bool
where
    K: Clone + Ord,
    V: Clone,
{
    let left = node.left_deref();
    is_red(left) && is_red(left.and_then(Node::left_deref))
}

//--------- rotation routines for 2-3 algorithm ----------------

//              (i)                       (i)
//               |                         |
//              node                       x
//              /  \                      / \
//             /    (r)                 (r)  \
//            /       \                 /     \
//          left       x             node      xr
//                    / \            /  \
//                  xl   xr       left   xl
//
pub(crate) fn rotate_left<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>>
where
    K: Clone + Ord,
    V: Clone,
{
    let mut x = match node.right.take() {
        Some(x) if !x.is_black() => x,
        _ => panic!("rotateleft(): rotating a black link ? Call the programmer"),
    };
    node.right = x.left.take();
    x.black = node.black;
    x.size = node.size;
    node.set_red();
    node.update_size();
    x.left = Some(node);
    x
}

//              (i)                       (i)
//               |                         |
//              node                       x
//              /  \                      / \
//            (r)   \                   (r)  \
//           /       \                 /      \
//          x       right             xl      node
//         / \                                / \
//       xl   xr                             xr  right
//
pub(crate) fn rotate_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>>
where
    K: Clone + Ord,
    V: Clone,
{
    let mut x = match node.left.take() {
        Some(x) if !x.is_black() => x,
        _ => panic!("rotateright(): rotating a black link ? Call the programmer"),
    };
    node.left = x.right.take();
    x.black = node.black;
    x.size = node.size;
    node.set_red();
    node.update_size();
    x.right = Some(node);
    x
}

//        (x)                   (!x)
//         |                     |
//        node                  node
//        / \                   / \
//      (y) (z)              (!y) (!z)
//     /      \              /      \
//   left    right         left    right
//
pub(crate) fn flip<K, V>(node: &mut Node<K, V>)
where
    K: Clone + Ord,
    V: Clone,
{
    if let Some(left) = node.left.as_mut() {
        left.toggle_link();
    }
    if let Some(right) = node.right.as_mut() {
        right.toggle_link();
    }
    node.toggle_link();
}

/// Restore the local LLRB shape of `node`, given that both its sub-trees
/// are valid, and recompute its size.
pub(crate) fn fixup<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>>
where
    K: Clone + Ord,
    V: Clone,
{
    if is_red(node.right_deref()) {
        trace!("fixup(): rotate left");
        node = rotate_left(node);
    }
    if is_red_red_left(&node) {
        trace!("fixup(): rotate right");
        node = rotate_right(node);
    }
    if is_red(node.left_deref()) && is_red(node.right_deref()) {
        flip(node.deref_mut());
    }
    node.update_size();
    node
}

/// Fix-up applied while climbing back after an insert. Unlike
/// [`fixup`] a right leaning red link is rotated only when the left
/// link is black, a 4-node is split by flip instead.
pub(crate) fn walkuprot_23<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>>
where
    K: Clone + Ord,
    V: Clone,
{
    if is_red(node.right_deref()) && !is_red(node.left_deref()) {
        trace!("walkuprot_23(): rotate left");
        node = rotate_left(node);
    }
    if is_red_red_left(&node) {
        trace!("walkuprot_23(): rotate right");
        node = rotate_right(node);
    }
    if is_red(node.left_deref()) && is_red(node.right_deref()) {
        flip(node.deref_mut());
    }
    node.update_size();
    node
}

// Assuming that node is red and both node.left and node.left.left
// are black, make node.left or one of its children red.
pub(crate) fn move_red_left<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>>
where
    K: Clone + Ord,
    V: Clone,
{
    flip(node.deref_mut());
    let ok = node.right_deref().map_or(false, |r| is_red(r.left_deref()));
    if ok {
        trace!("move_red_left(): borrow from right sibling");
        node.right = node.right.take().map(rotate_right);
        node = rotate_left(node);
        flip(node.deref_mut());
    }
    node
}

// Assuming that node is red and both node.right and node.right.left
// are black, make node.right or one of its children red.
pub(crate) fn move_red_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>>
where
    K: Clone + Ord,
    V: Clone,
{
    flip(node.deref_mut());
    let ok = node.left_deref().map_or(false, |l| is_red(l.left_deref()));
    if ok {
        trace!("move_red_right(): borrow from left sibling");
        node = rotate_right(node);
        flip(node.deref_mut());
    }
    node
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
