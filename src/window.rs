use std::collections::VecDeque;

use chrono::{Duration, NaiveDateTime};

use crate::observation::Observation;

/// The set of prior observations still within the time threshold of the most
/// recently consumed one, oldest first.
///
/// Invariant: `left_index + len()` equals the number of observations consumed
/// so far, i.e. the global index the next observation will receive. The
/// buffer only grows at the tail and shrinks at the head; it never reorders.
#[derive(Debug, Default)]
pub struct LiveWindow {
    observations: VecDeque<Observation>,
    left_index: u64,
}

impl LiveWindow {
    pub fn new() -> LiveWindow {
        LiveWindow {
            observations: VecDeque::new(),
            left_index: 0,
        }
    }

    /// Global index of the oldest live observation. When the window is empty
    /// this equals the index the next observation will receive.
    pub fn left_index(&self) -> u64 {
        self.left_index
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    /// Drops every observation older than `time_threshold` relative to
    /// `current` and advances `left_index` by the number dropped.
    ///
    /// Input is sorted by timestamp, so staleness is monotone from head to
    /// tail: the scan stops at the first element that is still live. The
    /// bound is closed, an element exactly `time_threshold` old stays live.
    /// Returns the number of evicted observations.
    pub fn evict(
        &mut self,
        current: NaiveDateTime,
        time_threshold: Duration,
    ) -> usize {
        let mut evicted = 0;
        while let Some(head) = self.observations.front() {
            if current - head.timestamp <= time_threshold {
                break;
            }
            self.observations.pop_front();
            evicted += 1;
        }
        self.left_index += evicted as u64;
        evicted as usize
    }

    /// Appends the observation just processed. Must be called after emission
    /// so the new point is never paired with itself.
    pub fn push(
        &mut self,
        observation: Observation,
    ) {
        self.observations.push_back(observation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs_at(minutes: i64) -> Observation {
        let base = NaiveDateTime::parse_from_str("01/01/2020 00:00", "%m/%d/%Y %H:%M").unwrap();
        Observation {
            timestamp: base + Duration::minutes(minutes),
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    #[test]
    fn evicts_stale_head_and_advances_left_index() {
        let mut window = LiveWindow::new();
        window.push(obs_at(0));
        window.push(obs_at(30));
        window.push(obs_at(50));

        let evicted = window.evict(obs_at(100).timestamp, Duration::minutes(60));

        assert_eq!(evicted, 1);
        assert_eq!(window.len(), 2);
        assert_eq!(window.left_index(), 1);
    }

    #[test]
    fn keeps_element_exactly_at_threshold() {
        let mut window = LiveWindow::new();
        window.push(obs_at(0));

        let evicted = window.evict(obs_at(60).timestamp, Duration::minutes(60));

        assert_eq!(evicted, 0);
        assert_eq!(window.len(), 1);
        assert_eq!(window.left_index(), 0);
    }

    #[test]
    fn clears_fully_stale_window() {
        let mut window = LiveWindow::new();
        window.push(obs_at(0));
        window.push(obs_at(5));
        window.push(obs_at(10));

        let evicted = window.evict(obs_at(500).timestamp, Duration::minutes(60));

        assert_eq!(evicted, 3);
        assert!(window.is_empty());
        assert_eq!(window.left_index(), 3);
    }

    #[test]
    fn eviction_on_empty_window_is_a_noop() {
        let mut window = LiveWindow::new();
        let evicted = window.evict(obs_at(0).timestamp, Duration::minutes(60));
        assert_eq!(evicted, 0);
        assert_eq!(window.left_index(), 0);
    }

    #[test]
    fn left_index_plus_len_tracks_consumed_count() {
        let mut window = LiveWindow::new();
        let threshold = Duration::minutes(15);
        for i in 0..20 {
            let obs = obs_at(i * 10);
            window.evict(obs.timestamp, threshold);
            window.push(obs);
            assert_eq!(window.left_index() + window.len() as u64, (i + 1) as u64);
        }
    }
}
