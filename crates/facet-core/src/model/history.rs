use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 10;

/// Bounded undo stack. Pushing past capacity silently drops the oldest entry.
#[derive(Debug, Clone, PartialEq)]
pub struct History<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: T) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop_back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{HISTORY_CAPACITY, History};

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut history = History::new();
        for value in 0..15 {
            history.push(value);
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        let drained: Vec<_> = std::iter::from_fn(|| history.pop()).collect();
        assert_eq!(drained, (5..15).rev().collect::<Vec<_>>());
    }

    #[test]
    fn pop_on_empty_is_none() {
        let mut history: History<u8> = History::with_capacity(2);
        assert!(history.pop().is_none());
        assert!(history.is_empty());
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut history = History::with_capacity(0);
        history.push(1);
        assert!(history.is_empty());
    }
}
