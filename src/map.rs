//! An ordered map implemented with an AVL tree.

use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::fmt;
use std::iter::FusedIterator;
use std::mem;
use std::ops::Index;

use tracing::trace;

use crate::error::KeyNotFound;

/// An ordered map implemented with an AVL tree.
///
/// Keys are unique. Inserting a key that is already present is rejected
/// and leaves the map untouched; values are changed in place through
/// [`get_mut`](OrderedMap::get_mut).
///
/// ```
/// use ordered_map::OrderedMap;
/// let mut map = OrderedMap::new();
/// map.insert(0, "zero");
/// map.insert(1, "one");
/// map.insert(2, "two");
/// assert_eq!(map.get(&1), Ok(&"one"));
/// map.remove(&1);
/// assert!(map.get(&1).is_err());
/// ```
///
/// Equality is structural: two maps are equal only if their trees have the
/// same shape and hold equal entries at every position. Use
/// [`same_entries`](OrderedMap::same_entries) to compare contents alone.
#[derive(Clone)]
pub struct OrderedMap<K, V> {
    root: Link<K, V>,
    num_nodes: usize,
}

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
    height: usize,
}

type Link<K, V> = Option<Box<Node<K, V>>>;

/// An iterator over the entries of a map, sorted by key.
pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
    remaining: usize,
}

/// A mutable iterator over the entries of a map, sorted by key.
pub struct IterMut<'a, K, V> {
    stack: Vec<(&'a K, &'a mut V, Option<&'a mut Node<K, V>>)>,
    remaining: usize,
}

/// An owning iterator over the entries of a map, sorted by key.
pub struct IntoIter<K, V> {
    stack: Vec<Box<Node<K, V>>>,
    remaining: usize,
}

/// An iterator over the keys of a map, in ascending order.
pub struct Keys<'a, K, V> {
    iter: Iter<'a, K, V>,
}

/// An iterator over the values of a map, sorted by key.
pub struct Values<'a, K, V> {
    iter: Iter<'a, K, V>,
}

/// A mutable iterator over the values of a map, sorted by key.
pub struct ValuesMut<'a, K, V> {
    iter: IterMut<'a, K, V>,
}

impl<K: Ord, V> OrderedMap<K, V> {
    /// Returns true if the map contains a value for the key.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// Fails with [`KeyNotFound`] if the map holds no such key.
    pub fn get<Q>(&self, key: &Q) -> Result<&V, KeyNotFound>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|node| &node.value).ok_or(KeyNotFound)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// Fails with [`KeyNotFound`] if the map holds no such key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V, KeyNotFound>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_mut(key)
            .map(|node| &mut node.value)
            .ok_or(KeyNotFound)
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|node| (&node.key, &node.value))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// Returns false and leaves the map unchanged if the key is already present.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let inserted = Self::insert_into(&mut self.root, key, value);
        if inserted {
            self.num_nodes += 1;
        }
        inserted
    }

    /// Removes a key from the map.
    /// Returns whether the key was previously in the map.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).is_some()
    }

    /// Removes a key from the map.
    /// Returns the stored key and value if the key was previously in the map.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let entry = Self::remove_from(&mut self.root, key)?;
        debug_assert!(self.num_nodes >= 1);
        self.num_nodes -= 1;
        Some(entry)
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        // Check tree nodes
        let num_nodes = Self::check_subtree(&self.root);
        assert_eq!(num_nodes, self.num_nodes);

        // Check key order across the whole tree
        let mut prev_key: Option<&K> = None;
        for key in self.keys() {
            if let Some(prev_key) = prev_key {
                assert!(prev_key < key);
            }
            prev_key = Some(key);
        }
    }

    #[cfg(any(test, feature = "consistency_check"))]
    fn check_subtree(link: &Link<K, V>) -> usize {
        match link {
            None => 0,
            Some(node) => {
                let left_height = Node::height(&node.left);
                let right_height = Node::height(&node.right);

                // Check links to child nodes
                if let Some(left) = &node.left {
                    assert!(left.key < node.key);
                }
                if let Some(right) = &node.right {
                    assert!(right.key > node.key);
                }

                // Check height
                assert_eq!(node.height, 1 + cmp::max(left_height, right_height));

                // Check AVL condition (nearly balance)
                assert!(left_height <= right_height + 1);
                assert!(right_height <= left_height + 1);

                1 + Self::check_subtree(&node.left) + Self::check_subtree(&node.right)
            }
        }
    }

    fn find<Q>(&self, key: &Q) -> Option<&Node<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(node.key.borrow()) {
                Ordering::Equal => return Some(node),
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        None
    }

    fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut Node<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            current = match key.cmp(node.key.borrow()) {
                Ordering::Equal => return Some(node),
                Ordering::Less => node.left.as_deref_mut(),
                Ordering::Greater => node.right.as_deref_mut(),
            };
        }
        None
    }

    /// Inserts below `link` and rebalances every node on the way back up.
    /// Returns false without touching the subtree if the key is present.
    fn insert_into(link: &mut Link<K, V>, key: K, value: V) -> bool {
        match link {
            None => {
                *link = Some(Node::create(key, value));
                true
            }
            Some(node) => {
                let inserted = match key.cmp(&node.key) {
                    Ordering::Less => Self::insert_into(&mut node.left, key, value),
                    Ordering::Greater => Self::insert_into(&mut node.right, key, value),
                    Ordering::Equal => false,
                };
                if inserted {
                    Self::rebalance(node);
                }
                inserted
            }
        }
    }

    fn remove_from<Q>(link: &mut Link<K, V>, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = link.as_deref_mut()?;
        let removed = match key.cmp(node.key.borrow()) {
            Ordering::Less => Self::remove_from(&mut node.left, key),
            Ordering::Greater => Self::remove_from(&mut node.right, key),
            Ordering::Equal => return Self::unlink(link),
        };
        if removed.is_some() {
            Self::rebalance(node);
        }
        removed
    }
}

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty map.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
        }
    }

    /// Returns true if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the height of the tree, i.e. the number of nodes on the
    /// longest path from the root down to a leaf.
    pub fn height(&self) -> usize {
        Node::height(&self.root)
    }

    /// Clears the map, deallocating all memory.
    pub fn clear(&mut self) {
        self.root = None;
        self.num_nodes = 0;
    }

    /// Returns the key-value pair stored at the root of the tree.
    pub fn root_key_value(&self) -> Option<(&K, &V)> {
        self.root.as_deref().map(|node| (&node.key, &node.value))
    }

    /// Returns the key-value pair with the smallest key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some((&node.key, &node.value))
    }

    /// Returns the key-value pair with the largest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some((&node.key, &node.value))
    }

    /// Calls `visit` on every entry, in ascending key order.
    /// The walk completes before this returns.
    pub fn traverse_in_order<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        Self::traverse_subtree(&self.root, &mut visit);
    }

    /// Returns true if both maps hold equal entries, regardless of the shape
    /// of their trees.
    pub fn same_entries(&self, other: &Self) -> bool
    where
        K: PartialEq,
        V: PartialEq,
    {
        self.len() == other.len() && self.iter().eq(other.iter())
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    /// Gets a mutable iterator over the entries of the map, sorted by key.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self)
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { iter: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { iter: self.iter() }
    }

    /// Gets a mutable iterator over the values of the map, in order by key.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            iter: self.iter_mut(),
        }
    }

    /// Returns the keys in pre-order, which pins down the shape of the tree.
    #[cfg(test)]
    pub(crate) fn preorder_keys(&self) -> Vec<&K> {
        fn walk<'a, K, V>(link: &'a Link<K, V>, keys: &mut Vec<&'a K>) {
            if let Some(node) = link {
                keys.push(&node.key);
                walk(&node.left, keys);
                walk(&node.right, keys);
            }
        }
        let mut keys = Vec::with_capacity(self.num_nodes);
        walk(&self.root, &mut keys);
        keys
    }

    fn traverse_subtree<F>(link: &Link<K, V>, visit: &mut F)
    where
        F: FnMut(&K, &V),
    {
        if let Some(node) = link {
            Self::traverse_subtree(&node.left, visit);
            visit(&node.key, &node.value);
            Self::traverse_subtree(&node.right, visit);
        }
    }

    /// Unlinks the node at `link` and returns its entry.
    /// A node with two children stays in place and takes over the entry of
    /// its in-order successor, which is unlinked from the right subtree.
    fn unlink(link: &mut Link<K, V>) -> Option<(K, V)> {
        let node = link.as_deref_mut()?;
        if node.left.is_some() && node.right.is_some() {
            let (key, value) = Self::remove_min(&mut node.right)?;
            let entry = (
                mem::replace(&mut node.key, key),
                mem::replace(&mut node.value, value),
            );
            Self::rebalance(node);
            Some(entry)
        } else {
            // Node is stem or leaf, splice its only child into the link
            let node = link.take()?;
            let Node {
                key,
                value,
                left,
                right,
                ..
            } = *node;
            *link = left.or(right);
            Some((key, value))
        }
    }

    /// Unlinks the node with the smallest key below `link`,
    /// rebalancing the left edge on the way back up.
    fn remove_min(link: &mut Link<K, V>) -> Option<(K, V)> {
        let node = link.as_deref_mut()?;
        if node.left.is_some() {
            let min = Self::remove_min(&mut node.left);
            Self::rebalance(node);
            min
        } else {
            let node = link.take()?;
            let Node {
                key, value, right, ..
            } = *node;
            *link = right;
            Some((key, value))
        }
    }

    /// Promotes the right child of `node` into its place.
    /// Only the two nodes involved get their heights adjusted.
    fn rotate_left(node: &mut Node<K, V>) {
        debug_assert!(node.right.is_some());
        if let Some(mut right) = node.right.take() {
            node.right = right.left.take();
            mem::swap(node, &mut *right);
            // `node` now holds the promoted child, `right` the former pivot
            right.update_height();
            node.left = Some(right);
            node.update_height();
            trace!(height = node.height, "rotated left");
        }
    }

    /// Promotes the left child of `node` into its place.
    /// Only the two nodes involved get their heights adjusted.
    fn rotate_right(node: &mut Node<K, V>) {
        debug_assert!(node.left.is_some());
        if let Some(mut left) = node.left.take() {
            node.left = left.right.take();
            mem::swap(node, &mut *left);
            // `node` now holds the promoted child, `left` the former pivot
            left.update_height();
            node.right = Some(left);
            node.update_height();
            trace!(height = node.height, "rotated right");
        }
    }

    /// Adjusts the height of `node` and restores the AVL condition there.
    /// Children must already be balanced, with a height difference of at most 2.
    /// A child with balance factor 0 is handled by a single rotation.
    fn rebalance(node: &mut Node<K, V>) {
        node.update_height();
        let balance = node.balance_factor();
        debug_assert!((-2..=2).contains(&balance));
        if balance > 1 {
            // Left heavy, rotate left child first for the left-right case
            if let Some(left) = node.left.as_deref_mut() {
                if left.balance_factor() < 0 {
                    Self::rotate_left(left);
                }
            }
            Self::rotate_right(node);
        } else if balance < -1 {
            // Right heavy, rotate right child first for the right-left case
            if let Some(right) = node.right.as_deref_mut() {
                if right.balance_factor() > 0 {
                    Self::rotate_right(right);
                }
            }
            Self::rotate_left(node);
        }
    }
}

impl<K, V> Node<K, V> {
    fn create(key: K, value: V) -> Box<Self> {
        Box::new(Node {
            key,
            value,
            left: None,
            right: None,
            height: 1,
        })
    }

    fn height(link: &Link<K, V>) -> usize {
        link.as_ref().map_or(0, |node| node.height)
    }

    fn update_height(&mut self) {
        self.height = 1 + cmp::max(Self::height(&self.left), Self::height(&self.right));
    }

    fn balance_factor(&self) -> isize {
        Self::height(&self.left) as isize - Self::height(&self.right) as isize
    }

    fn structurally_equal(lhs: &Link<K, V>, rhs: &Link<K, V>) -> bool
    where
        K: PartialEq,
        V: PartialEq,
    {
        match (lhs, rhs) {
            (None, None) => true,
            (Some(lhs), Some(rhs)) => {
                lhs.key == rhs.key
                    && lhs.value == rhs.value
                    && Self::structurally_equal(&lhs.left, &rhs.left)
                    && Self::structurally_equal(&lhs.right, &rhs.right)
            }
            _ => false,
        }
    }
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.num_nodes == other.num_nodes && Node::structurally_equal(&self.root, &other.root)
    }
}

impl<K: Eq, V: Eq> Eq for OrderedMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, Q, V> Index<&Q> for OrderedMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }
}

/// Keeps the first value for each key, as [`OrderedMap::insert`] does.
impl<K: Ord, V> Extend<(K, V)> for OrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for OrderedMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        Self::from_iter(entries)
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut OrderedMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V> IntoIterator for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(map: &'a OrderedMap<K, V>) -> Self {
        let mut iter = Self {
            stack: Vec::with_capacity(map.height()),
            remaining: map.len(),
        };
        iter.push_left_edge(map.root.as_deref());
        iter
    }

    fn push_left_edge(&mut self, mut current: Option<&'a Node<K, V>>) {
        while let Some(node) = current {
            self.stack.push(node);
            current = node.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_edge(node.right.as_deref());
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> IterMut<'a, K, V> {
    fn new(map: &'a mut OrderedMap<K, V>) -> Self {
        let mut iter = Self {
            stack: Vec::with_capacity(map.height()),
            remaining: map.num_nodes,
        };
        iter.push_left_edge(map.root.as_deref_mut());
        iter
    }

    fn push_left_edge(&mut self, mut current: Option<&'a mut Node<K, V>>) {
        while let Some(node) = current {
            let Node {
                key,
                value,
                left,
                right,
                ..
            } = node;
            self.stack.push((&*key, value, right.as_deref_mut()));
            current = left.as_deref_mut();
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value, right) = self.stack.pop()?;
        self.push_left_edge(right);
        self.remaining -= 1;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

impl<K, V> IntoIter<K, V> {
    fn new(mut map: OrderedMap<K, V>) -> Self {
        let mut iter = Self {
            stack: Vec::with_capacity(map.height()),
            remaining: map.num_nodes,
        };
        iter.push_left_edge(map.root.take());
        iter
    }

    fn push_left_edge(&mut self, mut current: Link<K, V>) {
        while let Some(mut node) = current {
            current = node.left.take();
            self.stack.push(node);
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let Node {
            key, value, right, ..
        } = *node;
        self.push_left_edge(right);
        self.remaining -= 1;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            iter: self.iter.clone(),
        }
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}
