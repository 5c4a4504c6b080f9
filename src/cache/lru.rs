//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.
//!
//! The recency list is a doubly-linked list stored in an arena: nodes live in
//! a `Vec` and link to each other by index, so promotion, removal and
//! eviction are O(1) without shared or cyclic references. Freed slots are
//! recycled through a free list.

// == Node Handle ==
/// Stable handle to a node in the recency index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }
}

#[derive(Debug)]
struct Node {
    key: String,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// - Head = Most recently used
/// - Tail = Least recently used
#[derive(Debug, Default)]
pub struct LruTracker {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    // == Insert ==
    /// Inserts a key as most recently used and returns its handle.
    ///
    /// The caller owns the key-to-handle mapping; inserting the same key
    /// twice yields two independent nodes.
    pub fn push_front(&mut self, key: String) -> NodeId {
        let node = Node {
            key,
            prev: None,
            next: None,
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                index
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.link_front(index);
        self.len += 1;
        NodeId(index)
    }

    // == Touch ==
    /// Marks a node as recently used (moves to head).
    pub fn touch(&mut self, id: NodeId) {
        if self.head == Some(id.0) || self.node(id.0).is_none() {
            return;
        }
        self.unlink(id.0);
        self.link_front(id.0);
    }

    // == Remove ==
    /// Removes a node from the tracker, returning its key.
    pub fn remove(&mut self, id: NodeId) -> Option<String> {
        self.node(id.0)?;
        self.unlink(id.0);
        let node = self.slots[id.0].take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(node.key)
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let tail = self.tail?;
        self.remove(NodeId(tail))
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    #[cfg(test)]
    pub fn peek_oldest(&self) -> Option<&str> {
        self.tail
            .and_then(|index| self.node(index))
            .map(|node| node.key.as_str())
    }

    /// Returns the key stored at `id`.
    pub fn key(&self, id: NodeId) -> Option<&str> {
        self.node(id.0).map(|node| node.key.as_str())
    }

    /// Iterates keys from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = self.node(cursor?)?;
            cursor = node.next;
            Some(node.key.as_str())
        })
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn node(&self, index: usize) -> Option<&Node> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, index: usize) -> &mut Node {
        self.slots[index]
            .as_mut()
            .expect("recency list links point at live nodes")
    }

    fn link_front(&mut self, index: usize) {
        let old_head = self.head;
        {
            let node = self.node_mut(index);
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => self.node_mut(head).prev = Some(index),
            None => self.tail = Some(index),
        }
        self.head = Some(index);
    }

    fn unlink(&mut self, index: usize) {
        let (prev, next) = {
            let node = self.node_mut(index);
            (node.prev.take(), node.next.take())
        };
        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }
    }
}
