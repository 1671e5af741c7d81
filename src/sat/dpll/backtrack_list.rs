//! An arena-backed doubly linked list supporting detach/reattach of
//! interior nodes that restores exact neighbor links. Used by the clause
//! database to hold the currently-active clauses.
//!
//! Nodes are never deallocated: `extract` unlinks a node from the live
//! chain and hands back a token carrying the neighbors it had at that
//! instant; `restore` splices it back between exactly those neighbors.
//! This sidesteps the cyclic-ownership doubly linked list the reference
//! implementation builds out of `unique_ptr` — there is nothing here for
//! the borrow checker to fight.

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Handle(usize);

struct Node<T> {
    value: T,
    prev: Option<Handle>,
    next: Option<Handle>,
}

/// A node removed from the list, remembering exactly where it used to sit.
pub struct Detached {
    handle: Handle,
    prev: Option<Handle>,
    next: Option<Handle>,
}

impl Detached {
    pub fn handle(&self) -> Handle {
        self.handle
    }
}

pub struct BacktrackList<T> {
    nodes: Vec<Node<T>>,
    head: Option<Handle>,
    tail: Option<Handle>,
    len: usize,
}

impl<T> BacktrackList<T> {
    pub fn new() -> Self {
        BacktrackList { nodes: Vec::new(), head: None, tail: None, len: 0 }
    }

    pub fn push_back(&mut self, value: T) -> Handle {
        let handle = Handle(self.nodes.len());
        let prev = self.tail;
        self.nodes.push(Node { value, prev, next: None });
        match prev {
            Some(p) => self.nodes[p.0].next = Some(handle),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
        self.len += 1;
        handle
    }

    #[inline]
    pub fn get(&self, h: Handle) -> &T {
        &self.nodes[h.0].value
    }

    #[inline]
    pub fn get_mut(&mut self, h: Handle) -> &mut T {
        &mut self.nodes[h.0].value
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Unlinks `h` from the chain, patching its former neighbors (and the
    /// list's head/tail) to close the gap.
    pub fn extract(&mut self, h: Handle) -> Detached {
        let (prev, next) = {
            let node = &self.nodes[h.0];
            (node.prev, node.next)
        };

        match prev {
            Some(p) => self.nodes[p.0].next = next,
            None => self.head = next,
        }
        match next {
            Some(nx) => self.nodes[nx.0].prev = prev,
            None => self.tail = prev,
        }

        self.len -= 1;
        Detached { handle: h, prev, next }
    }

    /// Re-splices a detached node at its recorded position. Contract:
    /// callers restore in the exact reverse order they extracted, which is
    /// what every snapshot/rewind path in the clause database does.
    pub fn restore(&mut self, node: Detached) {
        let Detached { handle, prev, next } = node;
        self.nodes[handle.0].prev = prev;
        self.nodes[handle.0].next = next;

        match prev {
            Some(p) => self.nodes[p.0].next = Some(handle),
            None => self.head = Some(handle),
        }
        match next {
            Some(nx) => self.nodes[nx.0].prev = Some(handle),
            None => self.tail = Some(handle),
        }

        self.len += 1;
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter { list: self, cur: self.head }
    }

    /// Snapshot of the handles currently attached, in order. The clause
    /// database walks this instead of `iter()` directly, since propagation
    /// detaches nodes mid-walk.
    pub fn handles(&self) -> Vec<Handle> {
        self.iter().map(|(h, _)| h).collect()
    }
}

pub struct Iter<'a, T> {
    list: &'a BacktrackList<T>,
    cur: Option<Handle>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Handle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let h = self.cur?;
        self.cur = self.list.nodes[h.0].next;
        Some((h, &self.list.nodes[h.0].value))
    }
}
