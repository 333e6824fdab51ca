//! Bounded-duration FIFO of timestamped samples.
//!
//! Every stateful component keeps its history in one of these.  Entries are
//! stored newest first; each [`add`](SlidingTimeWindow::add) evicts every
//! entry more than `duration` microseconds older than the new sample, so the
//! memory held is proportional to `duration × frame rate` and never to total
//! runtime.

use std::collections::VecDeque;

#[derive(Clone, Debug)]
pub struct SlidingTimeWindow<T> {
    duration: u64,
    /// `(timestamp, sample)`, newest at the front.
    entries:  VecDeque<(u64, T)>,
}

impl<T> SlidingTimeWindow<T> {
    /// # Panics
    /// If `duration` is zero.
    pub fn new(duration: u64) -> Self {
        assert!(duration > 0, "sliding window duration must be non-zero");
        SlidingTimeWindow { duration, entries: VecDeque::new() }
    }

    /// Append a sample, then drop everything older than `duration` relative
    /// to `ts`.
    ///
    /// # Panics
    /// If `ts` is not strictly newer than the most recent timestamp.  Frames
    /// must arrive in order and never twice.
    pub fn add(&mut self, ts: u64, sample: T) {
        if let Some(newest) = self.newest_timestamp() {
            assert!(ts != newest, "duplicate window timestamp {ts}");
            assert!(ts > newest, "window timestamp {ts} is older than {newest}");
        }
        self.entries.push_front((ts, sample));
        self.expire(ts);
    }

    /// Drop entries whose age relative to `ts` exceeds the duration, without
    /// adding anything.
    pub fn expire(&mut self, ts: u64) {
        while let Some(&(oldest, _)) = self.entries.back() {
            if ts.saturating_sub(oldest) > self.duration {
                self.entries.pop_back();
            } else {
                break;
            }
        }
    }

    /// `(ts − oldest) / duration`, or 0 when empty.
    ///
    /// Not clamped: right after an `add` the result is at most 1, but asking
    /// about a later `ts` than the newest entry can report more than 1.
    ///
    /// # Panics
    /// If `ts` is older than the oldest buffered timestamp.
    pub fn fullness(&self, ts: u64) -> f64 {
        match self.oldest_timestamp() {
            None => 0.0,
            Some(oldest) => {
                assert!(ts >= oldest, "fullness queried at {ts}, before oldest sample {oldest}");
                (ts - oldest) as f64 / self.duration as f64
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn newest_timestamp(&self) -> Option<u64> {
        self.entries.front().map(|&(ts, _)| ts)
    }

    pub fn oldest_timestamp(&self) -> Option<u64> {
        self.entries.back().map(|&(ts, _)| ts)
    }

    pub fn newest(&self) -> Option<&T> {
        self.entries.front().map(|(_, s)| s)
    }

    /// `(timestamp, sample)` pairs, newest first.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &T)> + '_ {
        self.entries.iter().map(|(ts, s)| (*ts, s))
    }

    /// Samples, newest first.
    pub fn samples(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter().map(|(_, s)| s)
    }

    /// Timestamps, newest first.
    pub fn timestamps(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().map(|&(ts, _)| ts)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
