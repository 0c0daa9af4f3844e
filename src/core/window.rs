//! Fixed-capacity rolling windows over recent samples.
//!
//! The estimators smooth their statistics over the most recent N samples.
//! Pushing beyond capacity evicts the oldest sample first.

use std::collections::VecDeque;

/// A FIFO buffer that holds at most `capacity` samples.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    samples: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// Create an empty window. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one if the window is full.
    ///
    /// Returns the evicted sample, if any.
    pub fn push(&mut self, sample: T) -> Option<T> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently pushed sample.
    pub fn latest(&self) -> Option<&T> {
        self.samples.back()
    }

    /// The last `n` samples (or fewer), oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &T> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip)
    }

    /// All samples, oldest first.
    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, T> {
        self.samples.iter()
    }

    /// Consecutive (older, newer) pairs, oldest first.
    pub fn pairs(&self) -> impl Iterator<Item = (&T, &T)> {
        self.samples.iter().zip(self.samples.iter().skip(1))
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_never_exceeds_capacity() {
        for capacity in [1, 10, 20] {
            let mut window = RollingWindow::new(capacity);
            for i in 0..(capacity * 3 + 1) {
                window.push(i);
                assert!(window.len() <= capacity);
            }
            assert!(window.is_full());
        }
    }

    #[test]
    fn test_window_evicts_oldest_first() {
        let mut window = RollingWindow::new(3);
        assert_eq!(window.push(1), None);
        assert_eq!(window.push(2), None);
        assert_eq!(window.push(3), None);
        assert_eq!(window.push(4), Some(1));

        let contents: Vec<_> = window.iter().copied().collect();
        assert_eq!(contents, vec![2, 3, 4]);
        assert_eq!(window.latest(), Some(&4));
    }

    #[test]
    fn test_recent_and_pairs() {
        let mut window = RollingWindow::new(10);
        for i in 0..5 {
            window.push(i);
        }

        let recent: Vec<_> = window.recent(2).copied().collect();
        assert_eq!(recent, vec![3, 4]);

        let recent: Vec<_> = window.recent(50).copied().collect();
        assert_eq!(recent.len(), 5);

        let pairs: Vec<_> = window.pairs().map(|(a, b)| (*a, *b)).collect();
        assert_eq!(pairs, vec![(0, 1), (1, 2), (2, 3), (3, 4)]);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut window = RollingWindow::new(0);
        window.push('a');
        window.push('b');
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.latest(), Some(&'b'));
    }
}
