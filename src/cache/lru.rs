//! Recency List Module
//!
//! Doubly-linked list ordered by access recency, used by the LRU cache.

// == Recency List ==
/// Tracks access order for LRU eviction strategy.
///
/// Nodes live in a slot arena and link to each other by index, so a caller
/// holding a slot index can promote or unlink its node in O(1):
/// - Front (head) = Most recently used
/// - Back (tail) = Least recently used
///
/// Freed slots are recycled before the arena grows.
#[derive(Debug)]
pub(crate) struct RecencyList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

#[derive(Debug)]
struct Node<T> {
    item: T,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<T> RecencyList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts an item as most recently used and returns its slot.
    pub fn push_front(&mut self, item: T) -> usize {
        let node = Node {
            item,
            prev: None,
            next: self.head,
        };

        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        match self.head {
            Some(old_head) => self.node_mut(old_head).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
        self.len += 1;
        idx
    }

    // == Move To Front ==
    /// Marks the item in `idx` as most recently used.
    pub fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);

        let old_head = self.head;
        {
            let node = self.node_mut(idx);
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => self.node_mut(h).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    // == Remove ==
    /// Unlinks the item in `idx` and frees the slot.
    ///
    /// Returns None if the slot is not occupied.
    pub fn remove(&mut self, idx: usize) -> Option<T> {
        if self.slots.get(idx)?.is_none() {
            return None;
        }
        self.unlink(idx);
        let node = self.slots[idx].take()?;
        self.free.push(idx);
        self.len -= 1;
        Some(node.item)
    }

    // == Pop Back ==
    /// Removes and returns the least recently used item.
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Peek Back ==
    /// Returns the least recently used item without removing it.
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|idx| self.get(idx))
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.slots.get(idx)?.as_ref().map(|node| &node.item)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.slots.get_mut(idx)?.as_mut().map(|node| &mut node.item)
    }

    // == Iterate ==
    /// Iterates from most to least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
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

    /// Detaches a node from its neighbours, leaving its own links stale.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
    }

    // Linked slots are always occupied; a vacant one here is list corruption.
    fn node(&self, idx: usize) -> &Node<T> {
        match self.slots[idx].as_ref() {
            Some(node) => node,
            None => unreachable!("recency list links to vacant slot {idx}"),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<T> {
        match self.slots[idx].as_mut() {
            Some(node) => node,
            None => unreachable!("recency list links to vacant slot {idx}"),
        }
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Front-to-back iterator over a [`RecencyList`].
pub(crate) struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = self.list.node(idx);
        self.cursor = node.next;
        Some(&node.item)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn order(list: &RecencyList<&'static str>) -> Vec<&'static str> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_list_new() {
        let list: RecencyList<&str> = RecencyList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.back().is_none());
    }

    #[test]
    fn test_push_front_orders_newest_first() {
        let mut list = RecencyList::new();

        list.push_front("key1");
        list.push_front("key2");
        list.push_front("key3");

        assert_eq!(list.len(), 3);
        assert_eq!(order(&list), vec!["key3", "key2", "key1"]);
        // key1 is oldest (added first)
        assert_eq!(list.back(), Some(&"key1"));
    }

    #[test]
    fn test_move_to_front() {
        let mut list = RecencyList::new();

        let a = list.push_front("a");
        list.push_front("b");
        list.push_front("c");

        list.move_to_front(a);

        assert_eq!(order(&list), vec!["a", "c", "b"]);
        assert_eq!(list.back(), Some(&"b"));
    }

    #[test]
    fn test_move_tail_and_head() {
        let mut list = RecencyList::new();

        let a = list.push_front("a");
        let b = list.push_front("b");

        // Head is a no-op
        list.move_to_front(b);
        assert_eq!(order(&list), vec!["b", "a"]);

        list.move_to_front(a);
        assert_eq!(order(&list), vec!["a", "b"]);
        assert_eq!(list.back(), Some(&"b"));
    }

    #[test]
    fn test_pop_back_evicts_in_order() {
        let mut list = RecencyList::new();

        let a = list.push_front("a");
        let b = list.push_front("b");
        let c = list.push_front("c");

        // Trace: [c, b, a] -> a to front [a, c, b] -> c [c, a, b] -> b [b, c, a]
        list.move_to_front(a);
        list.move_to_front(c);
        list.move_to_front(b);

        assert_eq!(list.pop_back(), Some("a"));
        assert_eq!(list.pop_back(), Some("c"));
        assert_eq!(list.pop_back(), Some("b"));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_middle() {
        let mut list = RecencyList::new();

        list.push_front("key1");
        let k2 = list.push_front("key2");
        list.push_front("key3");

        assert_eq!(list.remove(k2), Some("key2"));
        assert_eq!(list.len(), 2);
        assert_eq!(order(&list), vec!["key3", "key1"]);

        // Second removal of the same slot is a miss
        assert_eq!(list.remove(k2), None);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut list: RecencyList<&str> = RecencyList::new();
        assert_eq!(list.remove(99), None);
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut list = RecencyList::new();

        let a = list.push_front("a");
        list.push_front("b");
        list.remove(a);

        let c = list.push_front("c");
        assert_eq!(c, a);
        assert_eq!(order(&list), vec!["c", "b"]);
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut list = RecencyList::new();
        let idx = list.push_front(1);

        if let Some(item) = list.get_mut(idx) {
            *item = 10;
        }
        assert_eq!(list.get(idx), Some(&10));
    }

    #[test]
    fn test_clear() {
        let mut list = RecencyList::new();
        list.push_front("a");
        list.push_front("b");

        list.clear();

        assert!(list.is_empty());
        assert!(list.back().is_none());
        assert_eq!(list.iter().count(), 0);
    }
}
