//! A self-balancing order-maintenance tree: stable handles, O(1) successor
//! and predecessor from a handle, O(log n) insertion next to a handle.
//!
//! The tree never compares payloads against each other. Callers decide
//! where a new element belongs (by walking down from the root using their
//! own ordering, or simply knowing the neighbor to splice next to) and then
//! call [`Tree::insert_after`] / [`Tree::insert_before`]. This lets the same
//! implementation back both the beachline (spliced next to a known arc) and
//! the circle-event queue (spliced after a key-comparison walk).
//!
//! Rebalancing is the classical red-black scheme, adapted from the
//! structural (non-keyed) insertion used by sweep-line beachlines: a new
//! node is always inserted as a tree child of an existing node (never by
//! descending a search path), so insertion only needs "insert as the
//! structural successor/predecessor of this handle".

use std::fmt;

/// A stable handle into a [`Tree`]. Valid until the node it names is removed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

struct Node<T> {
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    red: bool,
    payload: T,
}

pub struct Tree<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    root: Option<NodeId>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Tree {
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn first(&self) -> Option<NodeId> {
        self.head
    }

    pub fn last(&self) -> Option<NodeId> {
        self.tail
    }

    pub fn get(&self, id: NodeId) -> &T {
        &self.node(id).payload
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.node_mut(id).payload
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).left
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).right
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next
    }

    fn node(&self, id: NodeId) -> &Node<T> {
        self.slots[id.0].as_ref().expect("dangling NodeId")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        self.slots[id.0].as_mut().expect("dangling NodeId")
    }

    fn alloc(&mut self, payload: T) -> NodeId {
        let node = Node {
            parent: None,
            left: None,
            right: None,
            prev: None,
            next: None,
            red: true,
            payload,
        };
        self.len += 1;
        if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(node);
            NodeId(idx)
        } else {
            self.slots.push(Some(node));
            NodeId(self.slots.len() - 1)
        }
    }

    fn is_red(&self, id: Option<NodeId>) -> bool {
        id.is_some_and(|id| self.node(id).red)
    }

    fn first_of(&self, mut id: NodeId) -> NodeId {
        while let Some(l) = self.node(id).left {
            id = l;
        }
        id
    }

    fn rotate_left(&mut self, p: NodeId) {
        let q = self.node(p).right.expect("rotate_left needs a right child");
        let parent = self.node(p).parent;
        match parent {
            Some(gp) if self.node(gp).left == Some(p) => self.node_mut(gp).left = Some(q),
            Some(gp) => self.node_mut(gp).right = Some(q),
            None => self.root = Some(q),
        }
        self.node_mut(q).parent = parent;
        self.node_mut(p).parent = Some(q);
        let q_left = self.node(q).left;
        self.node_mut(p).right = q_left;
        if let Some(ql) = q_left {
            self.node_mut(ql).parent = Some(p);
        }
        self.node_mut(q).left = Some(p);
    }

    fn rotate_right(&mut self, p: NodeId) {
        let q = self.node(p).left.expect("rotate_right needs a left child");
        let parent = self.node(p).parent;
        match parent {
            Some(gp) if self.node(gp).left == Some(p) => self.node_mut(gp).left = Some(q),
            Some(gp) => self.node_mut(gp).right = Some(q),
            None => self.root = Some(q),
        }
        self.node_mut(q).parent = parent;
        self.node_mut(p).parent = Some(q);
        let q_right = self.node(q).right;
        self.node_mut(p).left = q_right;
        if let Some(qr) = q_right {
            self.node_mut(qr).parent = Some(p);
        }
        self.node_mut(q).right = Some(p);
    }

    /// Insert `payload` as the immediate in-order successor of `after`, or
    /// as the very first element if `after` is `None` (into an empty tree,
    /// this makes it the root).
    pub fn insert_after(&mut self, after: Option<NodeId>, payload: T) -> NodeId {
        let successor = self.alloc(payload);
        let parent;

        match after {
            Some(node_id) => {
                let old_next = self.node(node_id).next;
                self.node_mut(successor).prev = Some(node_id);
                self.node_mut(successor).next = old_next;
                if let Some(n) = old_next {
                    self.node_mut(n).prev = Some(successor);
                }
                self.node_mut(node_id).next = Some(successor);

                if let Some(r) = self.node(node_id).right {
                    let leftmost = self.first_of(r);
                    self.node_mut(leftmost).left = Some(successor);
                    parent = Some(leftmost);
                } else {
                    self.node_mut(node_id).right = Some(successor);
                    parent = Some(node_id);
                }
            }
            None => {
                if let Some(root) = self.root {
                    let first = self.first_of(root);
                    self.node_mut(successor).prev = None;
                    self.node_mut(successor).next = Some(first);
                    self.node_mut(first).prev = Some(successor);
                    self.node_mut(first).left = Some(successor);
                    parent = Some(first);
                } else {
                    self.node_mut(successor).prev = None;
                    self.node_mut(successor).next = None;
                    self.root = Some(successor);
                    parent = None;
                }
            }
        }

        if self.node(successor).prev.is_none() {
            self.head = Some(successor);
        }
        if self.node(successor).next.is_none() {
            self.tail = Some(successor);
        }

        self.node_mut(successor).parent = parent;
        self.node_mut(successor).left = None;
        self.node_mut(successor).right = None;
        self.node_mut(successor).red = true;

        self.insert_fixup(successor);
        successor
    }

    /// Insert `payload` as the immediate in-order predecessor of `before`.
    pub fn insert_before(&mut self, before: NodeId, payload: T) -> NodeId {
        match self.node(before).prev {
            Some(p) => self.insert_after(Some(p), payload),
            None => self.insert_after(None, payload),
        }
    }

    /// Insert into an empty tree, making `payload` the sole node.
    pub fn insert_root(&mut self, payload: T) -> NodeId {
        assert!(self.root.is_none(), "insert_root called on non-empty tree");
        self.insert_after(None, payload)
    }

    fn insert_fixup(&mut self, mut node: NodeId) {
        let mut parent = self.node(node).parent;
        while let Some(p) = parent {
            if !self.node(p).red {
                break;
            }
            let grandpa = self.node(p).parent.expect("red node always has a grandparent");
            if Some(p) == self.node(grandpa).left {
                let uncle = self.node(grandpa).right;
                if self.is_red(uncle) {
                    self.node_mut(p).red = false;
                    self.node_mut(uncle.unwrap()).red = false;
                    self.node_mut(grandpa).red = true;
                    node = grandpa;
                } else {
                    let mut p = p;
                    if Some(node) == self.node(p).right {
                        self.rotate_left(p);
                        node = p;
                        p = self.node(node).parent.unwrap();
                    }
                    self.node_mut(p).red = false;
                    self.node_mut(grandpa).red = true;
                    self.rotate_right(grandpa);
                }
            } else {
                let uncle = self.node(grandpa).left;
                if self.is_red(uncle) {
                    self.node_mut(p).red = false;
                    self.node_mut(uncle.unwrap()).red = false;
                    self.node_mut(grandpa).red = true;
                    node = grandpa;
                } else {
                    let mut p = p;
                    if Some(node) == self.node(p).left {
                        self.rotate_right(p);
                        node = p;
                        p = self.node(node).parent.unwrap();
                    }
                    self.node_mut(p).red = false;
                    self.node_mut(grandpa).red = true;
                    self.rotate_left(grandpa);
                }
            }
            parent = self.node(node).parent;
        }
        self.node_mut(self.root.unwrap()).red = false;
    }

    /// Remove `id` from the tree, returning its payload. Handles linking to
    /// neighbors and all rebalancing.
    pub fn remove(&mut self, id: NodeId) -> T {
        self.len -= 1;

        let prev = self.node(id).prev;
        let next = self.node(id).next;
        if let Some(n) = next {
            self.node_mut(n).prev = prev;
        }
        if let Some(p) = prev {
            self.node_mut(p).next = next;
        }
        if self.head == Some(id) {
            self.head = next;
        }
        if self.tail == Some(id) {
            self.tail = prev;
        }

        let mut parent = self.node(id).parent;
        let left = self.node(id).left;
        let right = self.node(id).right;
        let id_red = self.node(id).red;

        let succ = if left.is_none() {
            right
        } else if right.is_none() {
            left
        } else {
            Some(self.first_of(right.unwrap()))
        };

        if let Some(p) = parent {
            if self.node(p).left == Some(id) {
                self.node_mut(p).left = succ;
            } else {
                self.node_mut(p).right = succ;
            }
        } else {
            self.root = succ;
        }

        let is_red;
        let fix_node;
        if let (Some(left), Some(right)) = (left, right) {
            let next_id = succ.unwrap();
            is_red = self.node(next_id).red;
            self.node_mut(next_id).red = id_red;
            self.node_mut(next_id).left = Some(left);
            self.node_mut(left).parent = Some(next_id);
            if next_id != right {
                let next_parent = self.node(next_id).parent.unwrap();
                let moved = self.node(next_id).right;
                self.node_mut(next_id).parent = self.node(id).parent;
                self.node_mut(next_parent).left = moved;
                if let Some(m) = moved {
                    self.node_mut(m).parent = Some(next_parent);
                }
                self.node_mut(next_id).right = Some(right);
                self.node_mut(right).parent = Some(next_id);
                fix_node = moved;
                parent = Some(next_parent);
            } else {
                self.node_mut(next_id).parent = parent;
                parent = Some(next_id);
                fix_node = self.node(next_id).right;
            }
        } else {
            is_red = id_red;
            fix_node = succ;
        }

        if let Some(f) = fix_node {
            self.node_mut(f).parent = parent;
        }

        let payload = self.dealloc(id);

        if is_red {
            return payload;
        }
        if let Some(f) = fix_node {
            if self.node(f).red {
                self.node_mut(f).red = false;
                return payload;
            }
        }

        self.delete_fixup(fix_node, parent);
        payload
    }

    fn delete_fixup(&mut self, mut node: Option<NodeId>, mut parent: Option<NodeId>) {
        loop {
            if node == self.root || self.is_red(node) {
                break;
            }
            let p = match parent {
                Some(p) => p,
                None => break,
            };
            if node == self.node(p).left {
                let mut sibling = self.node(p).right.expect("sibling must exist");
                if self.node(sibling).red {
                    self.node_mut(sibling).red = false;
                    self.node_mut(p).red = true;
                    self.rotate_left(p);
                    sibling = self.node(p).right.expect("sibling must exist");
                }
                let sib_left = self.node(sibling).left;
                let sib_right = self.node(sibling).right;
                if self.is_red(sib_left) || self.is_red(sib_right) {
                    if !self.is_red(sib_right) {
                        self.node_mut(sib_left.unwrap()).red = false;
                        self.node_mut(sibling).red = true;
                        self.rotate_right(sibling);
                        sibling = self.node(p).right.expect("sibling must exist");
                    }
                    self.node_mut(sibling).red = self.node(p).red;
                    self.node_mut(p).red = false;
                    self.node_mut(self.node(sibling).right.unwrap()).red = false;
                    self.rotate_left(p);
                    node = self.root;
                    break;
                }
                self.node_mut(sibling).red = true;
                node = Some(p);
                parent = self.node(p).parent;
            } else {
                let mut sibling = self.node(p).left.expect("sibling must exist");
                if self.node(sibling).red {
                    self.node_mut(sibling).red = false;
                    self.node_mut(p).red = true;
                    self.rotate_right(p);
                    sibling = self.node(p).left.expect("sibling must exist");
                }
                let sib_left = self.node(sibling).left;
                let sib_right = self.node(sibling).right;
                if self.is_red(sib_left) || self.is_red(sib_right) {
                    if !self.is_red(sib_left) {
                        self.node_mut(sib_right.unwrap()).red = false;
                        self.node_mut(sibling).red = true;
                        self.rotate_left(sibling);
                        sibling = self.node(p).left.expect("sibling must exist");
                    }
                    self.node_mut(sibling).red = self.node(p).red;
                    self.node_mut(p).red = false;
                    self.node_mut(self.node(sibling).left.unwrap()).red = false;
                    self.rotate_right(p);
                    node = self.root;
                    break;
                }
                self.node_mut(sibling).red = true;
                node = Some(p);
                parent = self.node(p).parent;
            }
        }
        if let Some(n) = node {
            self.node_mut(n).red = false;
        }
    }

    fn dealloc(&mut self, id: NodeId) -> T {
        let node = self.slots[id.0].take().expect("dangling NodeId");
        self.free.push(id.0);
        node.payload
    }

    /// In-order iterator over payloads, for diagnostics and tests.
    pub fn iter(&self) -> TreeIter<'_, T> {
        TreeIter {
            tree: self,
            next: self.head,
        }
    }
}

pub struct TreeIter<'a, T> {
    tree: &'a Tree<T>,
    next: Option<NodeId>,
}

impl<'a, T> Iterator for TreeIter<'a, T> {
    type Item = (NodeId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.next(id);
        Some((id, self.tree.get(id)))
    }
}
