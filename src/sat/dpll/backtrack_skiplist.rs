//! A backtrackable skip list over a fixed, sorted set of elements built
//! once at construction. Layer heights are chosen at build time and never
//! change; `extract`/`restore` only unlink/relink the element at the
//! layers it already occupies, so the round trip is exact — unlike a
//! textbook skip list, this one never re-levels.

use rand::Rng;

const MAX_LOG: usize = 8;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Handle(usize);

struct Entry<T> {
    value: T,
    height: usize,
    prev: [Option<usize>; MAX_LOG],
    next: [Option<usize>; MAX_LOG],
}

/// An element removed from every layer it occupied, remembering its
/// per-layer neighbors at the moment of extraction.
pub struct Detached {
    handle: Handle,
    height: usize,
    prev: [Option<usize>; MAX_LOG],
    next: [Option<usize>; MAX_LOG],
}

impl Detached {
    pub fn handle(&self) -> Handle {
        self.handle
    }
}

pub struct BacktrackSkiplist<T> {
    entries: Vec<Entry<T>>,
    head: [Option<usize>; MAX_LOG],
    len: usize,
}

impl<T: Ord + Copy> BacktrackSkiplist<T> {
    /// `values` need not be pre-sorted; this sorts ascending before
    /// assigning layer heights, per the tower-building construction.
    pub fn new(mut values: Vec<T>, rng: &mut impl Rng) -> Self {
        values.sort();

        let mut entries: Vec<Entry<T>> = values
            .into_iter()
            .map(|value| Entry { value, height: 1, prev: [None; MAX_LOG], next: [None; MAX_LOG] })
            .collect();

        for e in entries.iter_mut() {
            let mut height = 1;
            while height < MAX_LOG && rng.gen_bool(0.5) {
                height += 1;
            }
            e.height = height;
        }

        let mut head = [None; MAX_LOG];
        for layer in 0..MAX_LOG {
            let mut prev_idx: Option<usize> = None;
            for i in 0..entries.len() {
                if entries[i].height > layer {
                    entries[i].prev[layer] = prev_idx;
                    if let Some(p) = prev_idx {
                        entries[p].next[layer] = Some(i);
                    } else {
                        head[layer] = Some(i);
                    }
                    prev_idx = Some(i);
                }
            }
        }

        let len = entries.len();
        BacktrackSkiplist { entries, head, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Standard skip-list descent from the highest occupied layer.
    pub fn find(&self, target: &T) -> Option<Handle> {
        let mut cur: Option<usize> = None;
        for layer in (0..MAX_LOG).rev() {
            loop {
                let next = match cur {
                    Some(c) => self.entries[c].next[layer],
                    None => self.head[layer],
                };
                match next {
                    Some(ni) if self.entries[ni].value <= *target => cur = Some(ni),
                    _ => break,
                }
            }
        }
        match cur {
            Some(c) if self.entries[c].value == *target => Some(Handle(c)),
            _ => None,
        }
    }

    pub fn get(&self, h: Handle) -> &T {
        &self.entries[h.0].value
    }

    /// Unlinks the element at every layer it occupies.
    pub fn extract(&mut self, h: Handle) -> Detached {
        let height = self.entries[h.0].height;
        let mut prev = [None; MAX_LOG];
        let mut next = [None; MAX_LOG];

        for layer in 0..height {
            let p = self.entries[h.0].prev[layer];
            let nx = self.entries[h.0].next[layer];
            prev[layer] = p;
            next[layer] = nx;

            match p {
                Some(pi) => self.entries[pi].next[layer] = nx,
                None => self.head[layer] = nx,
            }
            if let Some(ni) = nx {
                self.entries[ni].prev[layer] = p;
            }
        }

        self.len -= 1;
        Detached { handle: h, height, prev, next }
    }

    /// Re-splices the element at every layer using its recorded neighbors.
    pub fn restore(&mut self, node: Detached) {
        let Detached { handle, height, prev, next } = node;

        for layer in 0..height {
            self.entries[handle.0].prev[layer] = prev[layer];
            self.entries[handle.0].next[layer] = next[layer];

            match prev[layer] {
                Some(pi) => self.entries[pi].next[layer] = Some(handle.0),
                None => self.head[layer] = Some(handle.0),
            }
            if let Some(ni) = next[layer] {
                self.entries[ni].prev[layer] = Some(handle.0);
            }
        }

        self.len += 1;
    }

    /// Forward iteration over the currently-attached elements at layer 0.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { list: self, cur: self.head[0] }
    }
}

pub struct Iter<'a, T> {
    list: &'a BacktrackSkiplist<T>,
    cur: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Handle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.cur?;
        self.cur = self.list.entries[i].next[0];
        Some((Handle(i), &self.list.entries[i].value))
    }
}
