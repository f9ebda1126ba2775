use crate::Comparator;
use std::fmt;
use std::marker::PhantomData;

/// Ordering policy of a [`Heap`]
///
/// A heap has no usable ordering on its own: it must be specialized with a
/// policy deciding whether a parent/child pair is correctly ordered.
pub trait HeapOrder {
    /// Whether `first` may sit above `second` in the heap
    fn pair_is_in_correct_order<T>(compare: &Comparator<T>, first: &T, second: &T) -> bool;
}

/// Smallest element at the root
#[derive(Debug, Clone, Copy, Default)]
pub struct MinOrder;

/// Largest element at the root
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxOrder;

impl HeapOrder for MinOrder {
    fn pair_is_in_correct_order<T>(compare: &Comparator<T>, first: &T, second: &T) -> bool {
        compare.less_or_equal(first, second)
    }
}

impl HeapOrder for MaxOrder {
    fn pair_is_in_correct_order<T>(compare: &Comparator<T>, first: &T, second: &T) -> bool {
        compare.greater_or_equal(first, second)
    }
}

pub type MinHeap<T> = Heap<T, MinOrder>;
pub type MaxHeap<T> = Heap<T, MaxOrder>;

/// Array-backed binary heap
///
/// The element at index `i` has its children at `2i + 1` and `2i + 2`.
/// Indices returned by [`Heap::find`] are only valid until the next mutation.
pub struct Heap<T, O: HeapOrder> {
    container: Vec<T>,
    compare: Comparator<T>,
    _order: PhantomData<O>,
}

impl<T: PartialOrd, O: HeapOrder> Heap<T, O> {
    /// Create a heap ordered by the natural ordering of `T`
    pub fn new() -> Self {
        Self::with_comparator(Comparator::natural())
    }
}

impl<T: PartialOrd, O: HeapOrder> Default for Heap<T, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, O: HeapOrder> Heap<T, O> {
    pub fn with_comparator(compare: Comparator<T>) -> Self {
        Self {
            container: Vec::new(),
            compare,
            _order: PhantomData,
        }
    }

    pub fn left_child_index(parent_index: usize) -> usize {
        2 * parent_index + 1
    }

    pub fn right_child_index(parent_index: usize) -> usize {
        2 * parent_index + 2
    }

    /// Parent index, `None` for the root
    pub fn parent_index(child_index: usize) -> Option<usize> {
        child_index.checked_sub(1).map(|i| i / 2)
    }

    fn has_left_child(&self, parent_index: usize) -> bool {
        Self::left_child_index(parent_index) < self.container.len()
    }

    fn has_right_child(&self, parent_index: usize) -> bool {
        Self::right_child_index(parent_index) < self.container.len()
    }

    fn in_order(&self, first: usize, second: usize) -> bool {
        O::pair_is_in_correct_order(
            &self.compare,
            &self.container[first],
            &self.container[second],
        )
    }

    pub fn len(&self) -> usize {
        self.container.len()
    }

    pub fn is_empty(&self) -> bool {
        self.container.is_empty()
    }

    /// Heap contents in array order
    pub fn as_slice(&self) -> &[T] {
        &self.container
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.container.iter()
    }

    /// Root element without removing it
    pub fn peek(&self) -> Option<&T> {
        self.container.first()
    }

    /// Remove and return the root element
    pub fn poll(&mut self) -> Option<T> {
        if self.container.len() <= 1 {
            return self.container.pop();
        }

        let item = self.container.swap_remove(0);
        self.heapify_down(0);
        Some(item)
    }

    pub fn add(&mut self, item: T) -> &mut Self {
        self.container.push(item);
        self.heapify_up(self.container.len() - 1);
        self
    }

    /// Indices of every element equal to `item` under the heap comparator
    pub fn find(&self, item: &T) -> Vec<usize> {
        self.find_by(item, &self.compare)
    }

    /// Indices of every element equal to `item` under a custom comparator
    pub fn find_by(&self, item: &T, comparator: &Comparator<T>) -> Vec<usize> {
        self.container
            .iter()
            .enumerate()
            .filter(|(_, candidate)| comparator.equal(item, candidate))
            .map(|(index, _)| index)
            .collect()
    }

    /// Remove every occurrence of `item` under the heap comparator
    pub fn remove(&mut self, item: &T) -> &mut Self {
        let compare = self.compare.clone();
        self.remove_by(item, &compare)
    }

    /// Remove every occurrence of `item` under a custom comparator
    ///
    /// Each removed slot is filled with the last element, which is then sifted
    /// down if it has children and still sits correctly below its parent (or
    /// is the root), and sifted up otherwise.
    pub fn remove_by(&mut self, item: &T, comparator: &Comparator<T>) -> &mut Self {
        let occurrences = self.find_by(item, comparator).len();

        for _ in 0..occurrences {
            // Positions move after every re-heapify, look the item up again
            let Some(index) = self.find_by(item, comparator).pop() else {
                break;
            };

            if index == self.container.len() - 1 {
                self.container.pop();
                continue;
            }

            self.container.swap_remove(index);

            let parent_in_order = match Self::parent_index(index) {
                None => true,
                Some(parent) => self.in_order(parent, index),
            };

            if self.has_left_child(index) && parent_in_order {
                self.heapify_down(index);
            } else {
                self.heapify_up(index);
            }
        }

        self
    }

    /// Move the element at `start_index` up until its parent is in order
    pub fn heapify_up(&mut self, start_index: usize) {
        let mut current = start_index;

        while let Some(parent) = Self::parent_index(current) {
            if self.in_order(parent, current) {
                break;
            }
            self.container.swap(current, parent);
            current = parent;
        }
    }

    /// Move the element at `start_index` down until both children are in order
    pub fn heapify_down(&mut self, start_index: usize) {
        let mut current = start_index;

        while self.has_left_child(current) {
            let left = Self::left_child_index(current);
            let right = Self::right_child_index(current);
            let next = if self.has_right_child(current) && self.in_order(right, left) {
                right
            } else {
                left
            };

            if self.in_order(current, next) {
                break;
            }

            self.container.swap(current, next);
            current = next;
        }
    }
}

impl<T: fmt::Debug, O: HeapOrder> fmt::Debug for Heap<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.container).finish()
    }
}

impl<T: fmt::Display, O: HeapOrder> fmt::Display for Heap<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.container.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn min_heap_of(items: &[i32]) -> MinHeap<i32> {
        let mut heap = MinHeap::new();
        for &item in items {
            heap.add(item);
        }
        heap
    }

    fn drain<O: HeapOrder>(heap: &mut Heap<i32, O>) -> Vec<i32> {
        std::iter::from_fn(|| heap.poll()).collect()
    }

    #[test]
    fn test_empty_heap() {
        let mut heap = MinHeap::<i32>::new();
        assert!(heap.is_empty());
        assert_eq!(heap.peek(), None);
        assert_eq!(heap.poll(), None);
    }

    #[test]
    fn test_min_heap_polls_ascending() {
        let mut heap = min_heap_of(&[5, 3, 10, 1, 1, 7]);
        assert_eq!(heap.peek(), Some(&1));
        assert_eq!(heap.len(), 6);
        assert_eq!(drain(&mut heap), vec![1, 1, 3, 5, 7, 10]);
    }

    #[test]
    fn test_max_heap_polls_descending() {
        let mut heap = MaxHeap::new();
        for item in [5, 3, 10, 1, 7] {
            heap.add(item);
        }
        assert_eq!(heap.peek(), Some(&10));
        assert_eq!(drain(&mut heap), vec![10, 7, 5, 3, 1]);
    }

    #[test]
    fn test_parent_and_children_indices() {
        assert_eq!(MinHeap::<i32>::parent_index(0), None);
        assert_eq!(MinHeap::<i32>::parent_index(1), Some(0));
        assert_eq!(MinHeap::<i32>::parent_index(2), Some(0));
        assert_eq!(MinHeap::<i32>::parent_index(6), Some(2));
        assert_eq!(MinHeap::<i32>::left_child_index(2), 5);
        assert_eq!(MinHeap::<i32>::right_child_index(2), 6);
    }

    #[test]
    fn test_find_returns_all_indices() {
        let heap = min_heap_of(&[3, 12, 3, 11]);
        let mut found = heap.find(&3);
        found.sort();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|&i| heap.as_slice()[i] == 3));
        assert!(heap.find(&42).is_empty());
    }

    #[test]
    fn test_remove_sifts_down() {
        // Ascending inserts keep the array in insertion order
        let mut heap = min_heap_of(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(heap.as_slice(), &[1, 2, 3, 4, 5, 6, 7, 8]);

        // 8 replaces 2 at index 1 and must travel down past 4
        heap.remove(&2);
        assert_eq!(heap.as_slice(), &[1, 4, 3, 8, 5, 6, 7]);
        assert_eq!(drain(&mut heap), vec![1, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_remove_sifts_up() {
        let mut heap = min_heap_of(&[1, 10, 2, 11, 12, 3, 4]);
        assert_eq!(heap.as_slice(), &[1, 10, 2, 11, 12, 3, 4]);

        // 4 replaces 11 at index 3 and is smaller than its parent 10
        heap.remove(&11);
        assert_eq!(heap.as_slice(), &[1, 4, 2, 10, 12, 3]);
        assert_eq!(drain(&mut heap), vec![1, 2, 3, 4, 10, 12]);
    }

    #[test]
    fn test_remove_all_duplicates() {
        let mut heap = min_heap_of(&[3, 12, 3, 11, 3, 7]);
        heap.remove(&3);
        assert!(heap.find(&3).is_empty());
        assert_eq!(heap.peek(), Some(&7));
        assert_eq!(drain(&mut heap), vec![7, 11, 12]);
    }

    #[test]
    fn test_remove_last_and_root() {
        let mut heap = min_heap_of(&[1, 2]);
        heap.remove(&2);
        assert_eq!(heap.as_slice(), &[1]);
        heap.remove(&1);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_remove_with_custom_comparator() {
        let mut heap = min_heap_of(&[1, 2, 3, 4, 5, 6]);
        let same_parity = Comparator::new(|a: &i32, b: &i32| (a % 2).cmp(&(b % 2)));
        heap.remove_by(&0, &same_parity);
        assert_eq!(drain(&mut heap), vec![1, 3, 5]);
    }

    #[test]
    fn test_peek_tracks_minimum_through_mixed_operations() {
        let mut heap = MinHeap::new();
        let mut reference: Vec<i32> = Vec::new();
        let ops = [9, 4, -1, 7, 4, 12, 0, 3];

        for (step, &value) in ops.iter().enumerate() {
            heap.add(value);
            reference.push(value);
            if step % 3 == 2 {
                let polled = heap.poll();
                reference.sort();
                assert_eq!(polled, Some(reference.remove(0)));
            }
            if step == 5 {
                heap.remove(&4);
                reference.retain(|&v| v != 4);
            }
            assert_eq!(heap.peek(), reference.iter().min());
        }
    }

    #[test]
    fn test_display() {
        let heap = min_heap_of(&[1, 2, 3]);
        assert_eq!(heap.to_string(), "1,2,3");
    }
}
