//! Frame rate bookkeeping.

#[derive(Clone, Debug, Default)]
pub struct FrameCounter {
    frames:   u64,
    first_ts: u64,
    last_ts:  u64,
}

impl FrameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, ts: u64) {
        if self.frames == 0 {
            self.first_ts = ts;
        }
        self.last_ts = ts;
        self.frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames per second between the first and last frame, or `None` with
    /// fewer than two frames or no elapsed time.
    pub fn fps(&self) -> Option<f64> {
        let secs = self.last_ts.saturating_sub(self.first_ts) as f64 / 1_000_000.0;
        if self.frames < 2 || secs == 0.0 {
            return None;
        }
        // the first frame opens the interval, it doesn't complete one
        Some((self.frames - 1) as f64 / secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn no_rate_without_two_frames() {
        let mut fc = FrameCounter::new();
        assert_eq!(fc.fps(), None);
        fc.update(1_000);
        assert_eq!(fc.fps(), None);
    }

    #[test]
    fn hundred_hertz() {
        let mut fc = FrameCounter::new();
        for i in 0..101 {
            fc.update(5_000_000 + i * 10_000);
        }
        assert_eq!(fc.frames(), 101);
        assert_relative_eq!(fc.fps().unwrap(), 100.0, epsilon = 1e-9);
    }
}
