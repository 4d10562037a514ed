//! Bounded FIFO history of the most recent readings.

use crate::reading::Reading;

/// Default number of readings a baseline is computed over.
pub const DEFAULT_WINDOW_CAPACITY: usize = 10;

/// A bounded circular buffer of readings.
///
/// Pure bookkeeping: no statistics live here. When full, pushing evicts and
/// returns the oldest reading.
#[derive(Clone, Debug)]
pub struct BaselineWindow {
    buffer: Vec<Option<Reading>>,
    head: usize,
    len: usize,
}

impl BaselineWindow {
    /// Create a window with the given capacity (at least 1).
    pub fn new(capacity: usize) -> Self {
        let cap = capacity.max(1);
        Self {
            buffer: vec![None; cap],
            head: 0,
            len: 0,
        }
    }

    /// Append to the tail, returning the evicted head if capacity was exceeded.
    pub fn push(&mut self, reading: Reading) -> Option<Reading> {
        let evicted = self.buffer[self.head].replace(reading);
        self.head = (self.head + 1) % self.buffer.len();
        if self.len < self.buffer.len() {
            self.len += 1;
        }
        evicted
    }

    /// Iterate over readings in insertion order (oldest first).
    pub fn iter(&self) -> WindowIter<'_> {
        let start = if self.len < self.buffer.len() {
            0
        } else {
            self.head
        };
        WindowIter {
            buffer: &self.buffer,
            pos: start,
            remaining: self.len,
        }
    }

    /// Reading values, oldest first.
    pub fn values(&self) -> Vec<f64> {
        self.iter().map(|r| r.value).collect()
    }

    /// Most recently pushed reading.
    pub fn latest(&self) -> Option<&Reading> {
        if self.len == 0 {
            return None;
        }
        let idx = (self.head + self.buffer.len() - 1) % self.buffer.len();
        self.buffer[idx].as_ref()
    }

    /// Number of readings currently held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no reading has been pushed since creation or `clear`.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the window holds `capacity` readings.
    pub fn is_full(&self) -> bool {
        self.len == self.buffer.len()
    }

    /// Maximum number of readings held.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Drop every reading.
    pub fn clear(&mut self) {
        for slot in &mut self.buffer {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

impl Default for BaselineWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

/// Iterator over a [`BaselineWindow`].
pub struct WindowIter<'a> {
    buffer: &'a [Option<Reading>],
    pos: usize,
    remaining: usize,
}

impl<'a> Iterator for WindowIter<'a> {
    type Item = &'a Reading;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.buffer[self.pos].as_ref();
        self.pos = (self.pos + 1) % self.buffer.len();
        self.remaining -= 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn reading(value: f64) -> Reading {
        let ts = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Reading::new(value, ts)
    }

    #[test]
    fn push_below_capacity_evicts_nothing() {
        let mut w = BaselineWindow::new(3);
        assert!(w.push(reading(1.0)).is_none());
        assert!(w.push(reading(2.0)).is_none());
        assert_eq!(w.len(), 2);
        assert!(!w.is_full());
        assert_eq!(w.values(), vec![1.0, 2.0]);
    }

    #[test]
    fn push_past_capacity_returns_oldest() {
        let mut w = BaselineWindow::new(3);
        for v in [1.0, 2.0, 3.0] {
            w.push(reading(v));
        }
        assert!(w.is_full());

        let evicted = w.push(reading(4.0)).unwrap();
        assert_eq!(evicted.value, 1.0);
        assert_eq!(w.values(), vec![2.0, 3.0, 4.0]);

        let evicted = w.push(reading(5.0)).unwrap();
        assert_eq!(evicted.value, 2.0);
        assert_eq!(w.values(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn eleventh_push_drops_first_reading() {
        let mut w = BaselineWindow::default();
        for i in 1..=11 {
            w.push(reading(i as f64));
        }
        assert_eq!(w.len(), 10);
        assert!(!w.values().contains(&1.0));
        assert_eq!(w.values().first(), Some(&2.0));
        assert_eq!(w.latest().map(|r| r.value), Some(11.0));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut w = BaselineWindow::new(0);
        assert_eq!(w.capacity(), 1);
        w.push(reading(1.0));
        assert_eq!(w.push(reading(2.0)).map(|r| r.value), Some(1.0));
        assert_eq!(w.values(), vec![2.0]);
    }

    #[test]
    fn clear_resets() {
        let mut w = BaselineWindow::new(4);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            w.push(reading(v));
        }
        w.clear();
        assert!(w.is_empty());
        assert!(w.latest().is_none());
        w.push(reading(9.0));
        assert_eq!(w.values(), vec![9.0]);
    }

    proptest! {
        #[test]
        fn length_is_min_of_pushes_and_capacity(
            capacity in 1usize..32,
            values in prop::collection::vec(-50.0f64..80.0, 0..100),
        ) {
            let mut w = BaselineWindow::new(capacity);
            for v in &values {
                w.push(reading(*v));
            }
            prop_assert_eq!(w.len(), values.len().min(capacity));

            let tail: Vec<f64> = values
                .iter()
                .skip(values.len().saturating_sub(capacity))
                .copied()
                .collect();
            prop_assert_eq!(w.values(), tail);
        }
    }
}
