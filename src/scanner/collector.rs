use serde::Serialize;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::entry::Entry;

/// Entries ordered by size, largest first, ties in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RankedResult {
    entries: Vec<Entry>,
}

impl RankedResult {
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at a 1-based position, as shown to the user.
    pub fn get(&self, index: usize) -> Option<&Entry> {
        index.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Sum of the ranked sizes.
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }
}

impl<'a> IntoIterator for &'a RankedResult {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Heap slot. Larger size ranks higher; for equal sizes the earlier entry ranks higher.
#[derive(Debug)]
struct Ranked {
    size: u64,
    seq: u64,
    entry: Entry,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.size
            .cmp(&other.size)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

/// Keeps the `capacity` largest entries seen so far.
///
/// Backed by a min-heap so the weakest kept entry is always on top:
/// `consider` is O(log N) and the whole pass O(E log N).
#[derive(Debug)]
pub struct TopNCollector {
    capacity: usize,
    heap: BinaryHeap<Reverse<Ranked>>,
    seen: u64,
}

impl TopNCollector {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.min(1024) + 1),
            seen: 0,
        }
    }

    /// Offer an entry. At capacity it only gets in by beating the current minimum.
    pub fn consider(&mut self, entry: Entry) {
        let seq = self.seen;
        self.seen += 1;

        if self.capacity == 0 {
            return;
        }

        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(Ranked {
                size: entry.size,
                seq,
                entry,
            }));
            return;
        }

        let beats_min = self
            .heap
            .peek()
            .is_some_and(|Reverse(min)| entry.size > min.size);

        if beats_min {
            self.heap.pop();
            self.heap.push(Reverse(Ranked {
                size: entry.size,
                seq,
                entry,
            }));
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of entries offered so far
    pub fn seen(&self) -> u64 {
        self.seen
    }

    pub fn results(self) -> RankedResult {
        let entries = self
            .heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(ranked)| ranked.entry)
            .collect();
        RankedResult { entries }
    }
}
