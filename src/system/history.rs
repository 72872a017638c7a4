use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 60;

/// Fixed-length window of percentage samples. Slots that have not been
/// filled yet hold `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySeries {
    samples: VecDeque<Option<f32>>,
}

impl HistorySeries {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: std::iter::repeat_n(None, capacity).collect(),
        }
    }

    /// Drops the oldest slot and appends `value`; the length never changes.
    pub fn push(&mut self, value: f32) {
        self.samples.pop_front();
        self.samples.push_back(Some(value));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.iter().all(Option::is_none)
    }

    pub fn samples(&self) -> impl Iterator<Item = Option<f32>> + '_ {
        self.samples.iter().copied()
    }

    pub fn latest(&self) -> Option<f32> {
        self.samples.back().copied().flatten()
    }

    /// Values from the first real sample onward, clamped to 0..=100.
    /// Non-finite values become 0.
    pub fn points(&self) -> Vec<f32> {
        self.samples
            .iter()
            .skip_while(|s| s.is_none())
            .map(|s| match s {
                Some(v) if v.is_finite() => v.clamp(0.0, 100.0),
                _ => 0.0,
            })
            .collect()
    }
}

impl Default for HistorySeries {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Trend series shown on the monitor view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryStore {
    pub memory: HistorySeries,
    pub swap: HistorySeries,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            memory: HistorySeries::new(capacity),
            swap: HistorySeries::new(capacity),
        }
    }

    pub fn record(&mut self, memory_percent: f32, swap_percent: f32) {
        self.memory.push(memory_percent);
        self.swap.push(swap_percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_series_is_all_gaps() {
        let series = HistorySeries::new(60);
        assert_eq!(series.len(), 60);
        assert!(series.is_empty());
        assert!(series.points().is_empty());
        assert_eq!(series.latest(), None);
    }

    #[test]
    fn push_keeps_length_fixed() {
        let mut series = HistorySeries::new(5);
        for i in 0..12 {
            series.push(i as f32);
            assert_eq!(series.len(), 5);
        }
        assert_eq!(series.points(), vec![7.0, 8.0, 9.0, 10.0, 11.0]);
    }

    #[test]
    fn full_window_holds_last_pushes_in_order() {
        let mut series = HistorySeries::default();
        for i in 0..60 {
            series.push(i as f32);
        }
        let stored: Vec<_> = series.samples().collect();
        let expected: Vec<_> = (0..60).map(|i| Some(i as f32)).collect();
        assert_eq!(stored, expected);
    }

    #[test]
    fn points_skip_leading_gaps() {
        let mut series = HistorySeries::new(4);
        series.push(10.0);
        series.push(20.0);
        assert_eq!(series.points(), vec![10.0, 20.0]);
        assert_eq!(series.latest(), Some(20.0));
    }

    #[test]
    fn points_are_clamped() {
        let mut series = HistorySeries::new(3);
        series.push(-5.0);
        series.push(150.0);
        series.push(f32::NAN);
        assert_eq!(series.points(), vec![0.0, 100.0, 0.0]);
    }

    #[test]
    fn zero_capacity_is_bumped_to_one() {
        let mut series = HistorySeries::new(0);
        series.push(1.0);
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn store_records_both_series() {
        let mut store = HistoryStore::new(3);
        store.record(40.0, 5.0);
        assert_eq!(store.memory.latest(), Some(40.0));
        assert_eq!(store.swap.latest(), Some(5.0));
        assert_eq!(store.memory.len(), 3);
    }
}
