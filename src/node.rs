use alloc::vec::Vec;
use core::{fmt, mem, ops::Not};

use crate::AvlTree;

/// A handle to a node slot in a tree's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

pub(crate) type Link = Option<NodeId>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

pub(crate) struct Links {
    parent: Link,
    children: [Link; 2],
    height: i8,
}

impl Links {
    // New nodes are always inserted as leaves.
    const fn leaf(parent: Link) -> Self {
        Links {
            parent,
            children: [None; 2],
            height: 0,
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.left().is_none() && self.right().is_none()
    }

    #[inline]
    pub(crate) fn height(&self) -> i8 {
        self.height
    }

    #[inline]
    pub(crate) fn parent(&self) -> Link {
        self.parent
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link {
        self.children[dir as usize]
    }

    #[inline]
    pub(crate) fn left(&self) -> Link {
        self.child(Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Link {
        self.child(Dir::Right)
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Link) -> Link {
        mem::replace(&mut self.parent, parent)
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Link) -> Link {
        mem::replace(&mut self.children[dir as usize], child)
    }

    #[inline]
    pub(crate) fn set_left(&mut self, left: Link) -> Link {
        self.set_child(Dir::Left, left)
    }

    #[inline]
    pub(crate) fn set_right(&mut self, right: Link) -> Link {
        self.set_child(Dir::Right, right)
    }

    #[inline]
    pub(crate) fn set_height(&mut self, height: i8) {
        self.height = height;
    }
}

pub(crate) struct Node<K, V> {
    pub(crate) links: Links,
    pub(crate) key: K,
    pub(crate) value: V,
}

/// Dense node storage. Vacated slots are recycled before the arena grows.
pub(crate) struct Arena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<NodeId>,
}

impl<K, V> Arena<K, V> {
    pub(crate) const fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Stores a new leaf node and returns its handle.
    pub(crate) fn alloc(&mut self, key: K, value: V, parent: Link) -> NodeId {
        let node = Node {
            links: Links::leaf(parent),
            key,
            value,
        };

        if let Some(id) = self.free.pop() {
            debug_assert!(self.slots[id.index()].is_none());
            self.slots[id.index()] = Some(node);
            return id;
        }

        let id = NodeId(u32::try_from(self.slots.len()).expect("node arena exhausted"));
        self.slots.push(Some(node));
        id
    }

    /// Vacates the slot of `id`, returning the node that lived there.
    ///
    /// The caller must have unlinked the node from the tree beforehand.
    pub(crate) fn free(&mut self, id: NodeId) -> Node<K, V> {
        let node = self.slots[id.index()]
            .take()
            .expect("freed a vacant node slot");
        self.free.push(id);
        node
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &Node<K, V> {
        self.slots[id.index()]
            .as_ref()
            .expect("dangling node handle")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.slots[id.index()]
            .as_mut()
            .expect("dangling node handle")
    }

    /// Returns the number of occupied slots.
    pub(crate) fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

/// A shared reference to a single node of an [`AvlTree`].
///
/// Node references allow the shape of a tree to be inspected from [`AvlTree::root`] downward.
pub struct NodeRef<'tree, K, V> {
    tree: &'tree AvlTree<K, V>,
    id: NodeId,
}

// Derived impls would require `K: Copy` and `V: Copy`.
impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<'_, K, V> {}

impl<'tree, K, V> NodeRef<'tree, K, V> {
    pub(crate) fn new(tree: &'tree AvlTree<K, V>, id: NodeId) -> Self {
        NodeRef { tree, id }
    }

    #[inline]
    fn node(&self) -> &'tree Node<K, V> {
        self.tree.arena.get(self.id)
    }

    #[inline]
    fn follow(&self, link: Link) -> Option<NodeRef<'tree, K, V>> {
        link.map(|id| NodeRef::new(self.tree, id))
    }

    pub fn key(&self) -> &'tree K {
        &self.node().key
    }

    pub fn value(&self) -> &'tree V {
        &self.node().value
    }

    /// Returns the height of the subtree rooted at this node. Leaves have height 0.
    pub fn height(&self) -> i32 {
        self.node().links.height().into()
    }

    /// Returns the height of the left subtree minus the height of the right subtree.
    pub fn balance_factor(&self) -> i32 {
        self.tree.balance_factor(self.id)
    }

    /// Returns `true` if the subtree heights of this node differ by at most one.
    pub fn is_balanced(&self) -> bool {
        self.balance_factor().abs() <= 1
    }

    pub fn is_leaf(&self) -> bool {
        self.node().links.is_leaf()
    }

    pub fn left(&self) -> Option<NodeRef<'tree, K, V>> {
        self.follow(self.node().links.left())
    }

    pub fn right(&self) -> Option<NodeRef<'tree, K, V>> {
        self.follow(self.node().links.right())
    }

    /// Returns the structural parent of this node, or `None` for the tree root.
    pub fn parent(&self) -> Option<NodeRef<'tree, K, V>> {
        self.follow(self.node().links.parent())
    }
}

impl<K, V> PartialEq for NodeRef<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl<K, V> Eq for NodeRef<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for NodeRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key())
            .field("value", self.value())
            .field("height", &self.height())
            .finish()
    }
}
