//! Arena-backed doubly linked key list.
//!
//! Stores nodes in a `Vec<Option<Node>>` with a free list, linking them by
//! [`NodeId`] index instead of pointers. Handles stay stable across
//! unrelated insertions and removals, so an external map can hold a
//! `NodeId` per key and splice in O(1).
//!
//! ## Architecture
//!
//! ```text
//!   slots: Vec<Option<Node<T>>>        free: [1]
//!   ┌────────┬──────────────────────────────────────────┐
//!   │ NodeId │ Node { value, prev, next }               │
//!   ├────────┼──────────────────────────────────────────┤
//!   │ 0      │ { value: A, prev: None, next: Some(2) }  │
//!   │ 1      │ (free)                                   │
//!   │ 2      │ { value: B, prev: Some(0), next: None }  │
//!   └────────┴──────────────────────────────────────────┘
//!
//!   head ─► [0] ◄──► [2] ◄── tail
//! ```
//!
//! ## Operations
//! - `push_front`: new node at the head, O(1)
//! - `pop_back` / `peek_back`: tail access, O(1)
//! - `remove(id)` / `move_to_front(id)`: splice by handle, O(1)
//!
//! `debug_validate_invariants()` is available in debug/test builds.

/// Stable handle into a [`KeyList`].
///
/// A `NodeId` stays valid until its node is removed; the index may then be
/// reused by a later insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// Doubly linked list over an arena of reusable slots.
#[derive(Debug)]
pub struct KeyList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl<T> KeyList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with reserved slot capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Returns the number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list has no live nodes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the value at the back without removing it.
    pub fn peek_back(&self) -> Option<&T> {
        self.tail.and_then(|id| self.node(id)).map(|node| &node.value)
    }

    /// Inserts a value at the front and returns its handle.
    pub fn push_front(&mut self, value: T) -> NodeId {
        let id = self.alloc(Node {
            value,
            prev: None,
            next: self.head,
        });
        if let Some(head) = self.head {
            if let Some(node) = self.node_mut(head) {
                node.prev = Some(id);
            }
        } else {
            self.tail = Some(id);
        }
        self.head = Some(id);
        id
    }

    /// Removes and returns the back value.
    pub fn pop_back(&mut self) -> Option<T> {
        let id = self.tail?;
        self.remove(id)
    }

    /// Removes the node `id` and returns its value.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        self.detach(id)?;
        let node = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(node.value)
    }

    /// Moves an existing node to the front; returns `false` if `id` is not
    /// a live node.
    pub fn move_to_front(&mut self, id: NodeId) -> bool {
        if self.node(id).is_none() {
            return false;
        }
        if Some(id) == self.head {
            return true;
        }
        self.detach(id);
        let head = self.head;
        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = head;
        }
        if let Some(head) = self.head {
            if let Some(node) = self.node_mut(head) {
                node.prev = Some(id);
            }
        } else {
            self.tail = Some(id);
        }
        self.head = Some(id);
        true
    }

    /// Removes all nodes and resets internal state.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterates values from front to back.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let mut current = self.head;
        std::iter::from_fn(move || {
            let node = self.node(current?)?;
            current = node.next;
            Some(&node.value)
        })
    }

    fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    fn alloc(&mut self, node: Node<T>) -> NodeId {
        let idx = if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(node);
            idx
        } else {
            self.slots.push(Some(node));
            self.slots.len() - 1
        };
        self.len += 1;
        NodeId(idx)
    }

    /// Unlinks `id` from its neighbors without freeing the slot.
    fn detach(&mut self, id: NodeId) -> Option<()> {
        let (prev, next) = {
            let node = self.node(id)?;
            (node.prev, node.next)
        };
        match prev {
            Some(prev_id) => {
                if let Some(node) = self.node_mut(prev_id) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(next_id) => {
                if let Some(node) = self.node_mut(next_id) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
        Some(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let live = self.slots.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(self.len, live);

        let mut walked = 0;
        let mut prev: Option<NodeId> = None;
        let mut current = self.head;
        while let Some(id) = current {
            let node = self.node(id).expect("linked node must be live");
            assert_eq!(node.prev, prev);
            prev = Some(id);
            current = node.next;
            walked += 1;
            assert!(walked <= self.len, "cycle in list links");
        }
        assert_eq!(walked, self.len);
        assert_eq!(self.tail, prev);

        for &idx in &self.free {
            assert!(idx < self.slots.len());
            assert!(self.slots[idx].is_none());
        }
    }
}

impl<T> Default for KeyList<T> {
    fn default() -> Self {
        Self::new()
    }
}
