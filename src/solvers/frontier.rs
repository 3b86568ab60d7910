use std::{cmp::Ordering, collections::BinaryHeap};

use crate::maze::Cell;

/// A frontier entry: the cost `g` a cell was reached with and its priority `key`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Entry {
    pub key: f64,
    pub g: f64,
    pub seq: u64,
    pub cell: Cell,
}

impl Ord for Entry {
    /// Reversed so that `BinaryHeap` pops the smallest key first. Equal keys
    /// pop in insertion order, then row-major coordinate order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

/// Stable min-priority queue with lazy deletion.
///
/// Entries are never updated in place. A cell that gets a better cost is
/// pushed again and the caller discards outdated entries when they surface.
#[derive(Debug, Default)]
pub(crate) struct Frontier {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cell: Cell, g: f64, key: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { key, g, seq, cell });
    }

    /// Pops entries until one satisfies `is_live`.
    pub fn pop_live(&mut self, is_live: impl Fn(&Entry) -> bool) -> Option<Entry> {
        while let Some(entry) = self.heap.pop() {
            if is_live(&entry) {
                return Some(entry);
            }
        }
        None
    }

    /// Discards outdated entries from the top and returns the best live one.
    pub fn peek_live(&mut self, is_live: impl Fn(&Entry) -> bool) -> Option<Entry> {
        while let Some(&top) = self.heap.peek() {
            if is_live(&top) {
                return Some(top);
            }
            self.heap.pop();
        }
        None
    }
}
