use crate::{Comparator, MinHeap};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::trace;

/// Heap slot: the item along with the priority it was queued with
#[derive(Debug, Clone)]
struct Queued<K> {
    item: K,
    priority: f64,
}

/// Min-priority queue with mutable priorities
///
/// The heap orders slots by priority, while lookups (`has_value`,
/// `find_by_value`, `change_priority`) compare the items themselves. The
/// `priorities` map holds exactly the items currently present in the heap.
pub struct PriorityQueue<K> {
    heap: MinHeap<Queued<K>>,
    priorities: HashMap<K, f64>,
    by_value: Comparator<Queued<K>>,
}

impl<K> PriorityQueue<K>
where
    K: Clone + Eq + Hash + 'static,
{
    pub fn new() -> Self {
        let by_priority = Comparator::new(|a: &Queued<K>, b: &Queued<K>| {
            a.priority.partial_cmp(&b.priority).unwrap_or(Ordering::Equal)
        });
        let by_value = Comparator::new(|a: &Queued<K>, b: &Queued<K>| {
            if a.item == b.item {
                Ordering::Equal
            } else {
                // Only equality matters for lookups
                Ordering::Less
            }
        });

        Self {
            heap: MinHeap::with_comparator(by_priority),
            priorities: HashMap::new(),
            by_value,
        }
    }

    fn probe(item: &K) -> Queued<K> {
        Queued {
            item: item.clone(),
            priority: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Queue `item` with the given priority, lower values are polled first
    ///
    /// Adding an item already queued adds another slot; [`Self::priority`]
    /// reports the lowest priority among its slots.
    pub fn add(&mut self, item: K, priority: f64) -> &mut Self {
        self.priorities
            .entry(item.clone())
            .and_modify(|current| *current = current.min(priority))
            .or_insert(priority);
        self.heap.add(Queued { item, priority });
        self
    }

    /// Item with the lowest priority, without removing it
    pub fn peek(&self) -> Option<&K> {
        self.heap.peek().map(|queued| &queued.item)
    }

    /// Remove and return the item with the lowest priority
    pub fn poll(&mut self) -> Option<K> {
        let queued = self.heap.poll()?;
        let remaining = self
            .find_by_value(&queued.item)
            .into_iter()
            .map(|index| self.heap.as_slice()[index].priority)
            .min_by(f64::total_cmp);
        match remaining {
            Some(priority) => {
                self.priorities.insert(queued.item.clone(), priority);
            }
            None => {
                self.priorities.remove(&queued.item);
            }
        }
        Some(queued.item)
    }

    /// Remove every occurrence of `item`
    pub fn remove(&mut self, item: &K) -> &mut Self {
        let probe = Self::probe(item);
        self.heap.remove_by(&probe, &self.by_value);
        self.priorities.remove(item);
        self
    }

    /// Re-queue `item` with a new priority (decrease-key)
    pub fn change_priority(&mut self, item: K, priority: f64) -> &mut Self {
        trace!(priority, "changing queued item priority");
        self.remove(&item);
        self.add(item, priority)
    }

    /// Heap indices holding `item`, compared by value rather than priority
    pub fn find_by_value(&self, item: &K) -> Vec<usize> {
        self.heap.find_by(&Self::probe(item), &self.by_value)
    }

    pub fn has_value(&self, item: &K) -> bool {
        !self.find_by_value(item).is_empty()
    }

    /// Current priority of a queued item
    pub fn priority(&self, item: &K) -> Option<f64> {
        self.priorities.get(item).copied()
    }

    /// Queued items and their priorities, in heap order
    pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> {
        self.heap.iter().map(|queued| (&queued.item, queued.priority))
    }
}

impl<K> Default for PriorityQueue<K>
where
    K: Clone + Eq + Hash + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
