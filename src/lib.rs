//! An arena-backed AVL tree.
#![cfg_attr(not(any(test, feature = "std")), no_std)]

// Conventions used in comments:
// - The height of a node `x` is denoted `h(x)`. A missing child has height -1; a leaf has height 0.
// - The balance factor of a node `x` is `h(left(x)) - h(right(x))`.
//
// The invariants of the tree, which hold whenever no public method is executing:
// 1. Keys are in search tree order: left subtree < node < right subtree.
// 2. Every balance factor is -1, 0 or 1.
// 3. Every cached height equals `1 + max(h(left), h(right))`.
// 4. Every child's parent link points at the node that links to it, and the root has no parent.
// 5. `len` equals the number of live nodes.
//
// Every mutation ends with an ascent from some node to the root, recomputing `h(x)` and rotating
// at each node `x` whose balance factor has reached ±2. A rotation replaces the local subtree
// root, so the ascent continues from the parent of whichever node ends up on top.

extern crate alloc;

use alloc::vec::Vec;
use core::{borrow::Borrow, cmp::Ordering, fmt};

mod debug;
mod error;
#[cfg(any(test, feature = "model"))]
pub mod model;
mod node;
mod nullable;
#[cfg(test)]
mod tests;

pub use error::Error;
pub use node::NodeRef;

use node::{Arena, Dir, Link, Links, NodeId};

/// An ordered map backed by an AVL tree.
///
/// Lookup, insertion and removal complete in _O(log(n))_ time. Nodes are stored in an arena
/// owned by the tree; child and parent links are handles into that arena.
pub struct AvlTree<K, V> {
    arena: Arena<K, V>,
    root: Link,
    len: usize,
}

impl<K, V> AvlTree<K, V> {
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<K, V> {
        AvlTree {
            arena: Arena::new(),
            root: None,
            len: 0,
        }
    }

    /// Returns `true` if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        let empty = self.len() == 0;
        debug_assert_eq!(empty, self.root.is_none());
        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the height of the tree, or -1 if it is empty.
    pub fn height(&self) -> i32 {
        self.height_of(self.root).into()
    }

    /// Returns a reference to the root node, if any.
    pub fn root(&self) -> Option<NodeRef<'_, K, V>> {
        self.root.map(|root| NodeRef::new(self, root))
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.len = 0;
    }

    #[inline]
    fn links(&self, node: NodeId) -> &Links {
        &self.arena.get(node).links
    }

    #[inline]
    fn links_mut(&mut self, node: NodeId) -> &mut Links {
        &mut self.arena.get_mut(node).links
    }

    /// Returns the height of the linked node.
    #[inline]
    fn height_of(&self, link: Link) -> i8 {
        link.map(|n| self.links(n).height()).unwrap_or(-1)
    }

    fn update_height(&mut self, node: NodeId) {
        let links = self.links(node);
        let height = 1 + self.height_of(links.left()).max(self.height_of(links.right()));
        self.links_mut(node).set_height(height);
    }

    fn balance_factor(&self, node: NodeId) -> i32 {
        let links = self.links(node);
        i32::from(self.height_of(links.left())) - i32::from(self.height_of(links.right()))
    }

    fn maybe_set_parent(&mut self, link: Link, parent: Link) {
        let Some(node) = link else {
            return;
        };

        self.links_mut(node).set_parent(parent);
    }

    #[inline]
    fn replace_child_or_set_root(&mut self, parent: Link, old_child: NodeId, new_child: Link) {
        match parent {
            Some(parent) => self.replace_child(parent, old_child, new_child),
            None => self.root = new_child,
        }
    }

    // Replaces the child link of `parent` pointing at `old_child` with `new_child`.
    //
    // `new_child`'s parent link is not updated.
    fn replace_child(&mut self, parent: NodeId, old_child: NodeId, new_child: Link) {
        let dir = self.which_child(parent, old_child);
        self.links_mut(parent).set_child(dir, new_child);
    }

    fn which_child(&self, parent: NodeId, child: NodeId) -> Dir {
        let links = self.links(parent);
        if links.left() == Some(child) {
            Dir::Left
        } else {
            debug_assert_eq!(
                links.right(),
                Some(child),
                "`child` must be a child of `parent`"
            );
            Dir::Right
        }
    }

    // Rotates `down` in direction `dir`, lifting its `!dir` child `up` into its place.
    //
    // Returns `up`, the new root of the subtree.
    fn rotate(&mut self, down: NodeId, dir: Dir) -> NodeId {
        let up = self
            .links(down)
            .child(!dir)
            .expect("rotation requires a child to lift");

        // `across` moves from the `dir` child of `up` to the `!dir` child of `down`.
        let across = self.links(up).child(dir);
        self.links_mut(down).set_child(!dir, across);
        self.maybe_set_parent(across, Some(down));

        self.links_mut(up).set_child(dir, Some(down));
        let parent = self.links_mut(down).set_parent(Some(up));
        self.links_mut(up).set_parent(parent);
        self.replace_child_or_set_root(parent, down, Some(up));

        // `down` is now below `up`.
        self.update_height(down);
        self.update_height(up);

        up
    }

    // Recomputes the height of `node` and restores its balance with a single or double rotation.
    //
    // Returns the root of the subtree formerly rooted at `node`.
    fn rebalance(&mut self, node: NodeId) -> NodeId {
        self.update_height(node);

        let heavy = match self.balance_factor(node) {
            2.. => Dir::Left,
            ..=-2 => Dir::Right,
            _ => return node,
        };

        let child = self
            .links(node)
            .child(heavy)
            .expect("heavy side of an unbalanced node must not be empty");

        // If the heavy child leans the other way, straighten it first so that a single rotation
        // at `node` suffices. Ties take the single rotation.
        let inner = self.height_of(self.links(child).child(!heavy));
        let outer = self.height_of(self.links(child).child(heavy));
        if inner > outer {
            self.rotate(child, heavy);
        }

        self.rotate(node, !heavy)
    }

    // Rebalances every node on the path from `start` to the root.
    fn rebalance_to_root(&mut self, start: Link) {
        let mut opt_cur = start;

        while let Some(cur) = opt_cur {
            let top = self.rebalance(cur);
            opt_cur = self.links(top).parent();
        }
    }

    // Returns the maximum node in the subtree rooted at `root`.
    fn max_in_subtree(&self, root: NodeId) -> NodeId {
        let mut cur = root;

        while let Some(right) = self.links(cur).right() {
            cur = right;
        }

        cur
    }

    // Detaches `node` from its children, returning the root of the subtree that must take its
    // place and the node from which rebalancing resumes.
    //
    // `node`'s parent link is left untouched, as is the replacement's parent link.
    fn splice(&mut self, node: NodeId) -> (Link, Link) {
        let links = self.links(node);
        let parent = links.parent();

        match (links.left(), links.right()) {
            // A leaf leaves a hole; its parent lost height.
            (None, None) => (None, parent),

            (Some(child), None) | (None, Some(child)) => (Some(child), Some(child)),

            (Some(left), Some(right)) => {
                if self.links(left).right().is_none() {
                    // `left` is the predecessor. It adopts `right` and takes `node`'s place.
                    self.links_mut(left).set_right(Some(right));
                    self.links_mut(right).set_parent(Some(left));
                    (Some(left), Some(left))
                } else if self.links(right).left().is_none() {
                    // `right` is the successor. It adopts `left` and takes `node`'s place.
                    self.links_mut(right).set_left(Some(left));
                    self.links_mut(left).set_parent(Some(right));
                    (Some(right), Some(right))
                } else {
                    // The predecessor lies strictly below `left`. Elevate its left child into its
                    // slot, then promote it into `node`'s position with both of `node`'s
                    // children. The height change originates at the predecessor's old parent.
                    let pred = self.max_in_subtree(left);
                    let pred_parent = self
                        .links(pred)
                        .parent()
                        .expect("predecessor below `left` must have a parent");

                    let pred_left = self.links(pred).left();
                    self.links_mut(pred_parent).set_right(pred_left);
                    self.maybe_set_parent(pred_left, Some(pred_parent));

                    self.links_mut(pred).set_left(Some(left));
                    self.links_mut(left).set_parent(Some(pred));
                    self.links_mut(pred).set_right(Some(right));
                    self.links_mut(right).set_parent(Some(pred));

                    (Some(pred), Some(pred_parent))
                }
            }
        }
    }

    // Unlinks `node`, rebalances the tree and frees the node's slot.
    fn remove_at(&mut self, node: NodeId) -> (K, V) {
        let parent = self.links(node).parent();
        let (replacement, anchor) = self.splice(node);

        self.replace_child_or_set_root(parent, node, replacement);
        self.maybe_set_parent(replacement, parent);
        self.len -= 1;

        let removed = self.arena.free(node);
        self.rebalance_to_root(anchor);

        (removed.key, removed.value)
    }

    // Returns the nodes of the tree in key order.
    fn in_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        let mut opt_cur = self.root;

        loop {
            while let Some(cur) = opt_cur {
                stack.push(cur);
                opt_cur = self.links(cur).left();
            }

            let Some(cur) = stack.pop() else {
                break;
            };

            out.push(cur);
            opt_cur = self.links(cur).right();
        }

        out
    }
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Returns a reference to the value corresponding to `key`.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.get_raw(key)?;
        Some(&self.arena.get(node).value)
    }

    /// Returns a mutable reference to the value corresponding to `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.get_raw(key)?;
        Some(&mut self.arena.get_mut(node).value)
    }

    /// Returns `true` if the tree contains a value for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).is_some()
    }

    fn get_raw<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;
            let node = self.arena.get(cur);

            match key.cmp(node.key.borrow()) {
                Ordering::Less => opt_cur = node.links.left(),
                Ordering::Equal => return Some(cur),
                Ordering::Greater => opt_cur = node.links.right(),
            }
        }
    }

    /// Inserts a key-value pair into the tree.
    ///
    /// Returns `false` without modifying the tree if `key` is already present; the existing value
    /// is kept and `value` is dropped.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let Some(root) = self.root else {
            // Tree is empty. The new node becomes the root.
            self.root = Some(self.arena.alloc(key, value, None));
            self.len += 1;
            return true;
        };

        let mut parent = root;

        // Descend the tree, looking for an empty slot.
        let dir = loop {
            let node = self.arena.get(parent);

            let dir = match key.cmp(&node.key) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return false,
                Ordering::Greater => Dir::Right,
            };

            match node.links.child(dir) {
                Some(child) => parent = child,
                None => break dir,
            }
        };

        let node = self.arena.alloc(key, value, Some(parent));
        self.links_mut(parent).set_child(dir, Some(node));
        self.len += 1;

        self.rebalance_to_root(Some(parent));

        true
    }

    /// Removes `key` from the tree, returning `true` if it was present.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).is_some()
    }

    /// Removes `key` from the tree, returning the stored key and value if it was present.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.get_raw(key)?;
        Some(self.remove_at(node))
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let count = match self.root {
            Some(root) => {
                assert_eq!(self.links(root).parent(), None, "root has a parent link");
                self.assert_invariants_at(root).1
            }
            None => 0,
        };

        assert_eq!(count, self.len, "reachable nodes differ from `len`");
        assert_eq!(self.arena.live(), self.len, "live slots differ from `len`");

        let order = self.in_order();
        for pair in order.windows(2) {
            assert!(
                self.arena.get(pair[0]).key < self.arena.get(pair[1]).key,
                "keys out of order"
            );
        }
    }

    // Checks the subtree rooted at `node`, returning its height and node count.
    fn assert_invariants_at(&self, node: NodeId) -> (i8, usize) {
        let mut heights = [-1; 2];
        let mut count = 1;

        for dir in [Dir::Left, Dir::Right] {
            if let Some(child) = self.links(node).child(dir) {
                // Ensure child's parent link points to this node.
                let parent = self
                    .links(child)
                    .parent()
                    .expect("child parent link not set");
                assert_eq!(node, parent);

                let (height, child_count) = self.assert_invariants_at(child);
                heights[dir as usize] = height;
                count += child_count;
            }
        }

        let height = 1 + heights[0].max(heights[1]);
        assert_eq!(self.links(node).height(), height, "stale cached height");
        assert!(
            (heights[0] - heights[1]).abs() <= 1,
            "balance factor out of range"
        );

        (height, count)
    }
}

impl<K, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.in_order().into_iter().map(|id| {
                let node = self.arena.get(id);
                (&node.key, &node.value)
            }))
            .finish()
    }
}
