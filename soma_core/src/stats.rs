//! Running moments over fixed-size vectors, plus the descriptive statistics
//! the debouncers rely on.

use std::collections::BTreeMap;

use num_traits::ToPrimitive;

// ════════════════════════════════════════════════════════════════════════════
// RunningStats
// ════════════════════════════════════════════════════════════════════════════

/// Per-dimension sum, sum of squares and count over `N`-dimensional
/// observations.  Mean and population variance are derived on demand.
#[derive(Clone, Debug, PartialEq)]
pub struct RunningStats<const N: usize> {
    count:  usize,
    sum:    [f64; N],
    sum_sq: [f64; N],
}

impl<const N: usize> RunningStats<N> {
    pub fn new() -> Self {
        RunningStats { count: 0, sum: [0.0; N], sum_sq: [0.0; N] }
    }

    pub fn update(&mut self, v: &[f64; N]) {
        self.count += 1;
        for (i, &x) in v.iter().enumerate() {
            self.sum[i]    += x;
            self.sum_sq[i] += x * x;
        }
    }

    /// Number of observations accumulated so far.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// # Panics
    /// With zero observations, or if `i >= N`.
    pub fn mean(&self, i: usize) -> f64 {
        assert!(self.count > 0, "mean of dimension {i} requested with no observations");
        self.sum[i] / self.count as f64
    }

    /// Population (biased) variance, `E[x²] − E[x]²`.
    ///
    /// Floating-point cancellation leaves a residue of a few ULPs of `E[x²]`
    /// on either side of zero for a constant dimension.  Anything within
    /// `max(count, 4)` ULPs of `E[x²]` is reported as exactly 0, so callers
    /// can rely on `variance == 0.0` to detect a constant dimension.
    ///
    /// # Panics
    /// With zero observations, or if `i >= N`.
    pub fn variance(&self, i: usize) -> f64 {
        let m = self.mean(i);
        let mean_sq = self.sum_sq[i] / self.count as f64;
        let var = mean_sq - m * m;
        let tolerance = mean_sq * f64::EPSILON * self.count.max(4) as f64;
        if var <= tolerance {
            0.0
        } else {
            var
        }
    }

    pub fn std_dev(&self, i: usize) -> f64 {
        self.variance(i).sqrt()
    }
}

impl<const N: usize> Default for RunningStats<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Slice helpers
// ════════════════════════════════════════════════════════════════════════════

/// Most frequent value.  Ties go to the smallest value.
pub fn mode<T: Ord + Copy>(xs: &[T]) -> Option<T> {
    mode_of(xs.iter().copied())
}

/// [`mode`] over any iterator, for callers that don't hold a slice.
pub fn mode_of<T: Ord + Copy>(xs: impl IntoIterator<Item = T>) -> Option<T> {
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for x in xs {
        *counts.entry(x).or_insert(0) += 1;
    }
    // BTreeMap iterates in ascending order; only a strictly larger count
    // replaces the current best, so the smallest tied value wins.
    let mut best: Option<(T, usize)> = None;
    for (x, n) in counts {
        if best.map_or(true, |(_, b)| n > b) {
            best = Some((x, n));
        }
    }
    best.map(|(x, _)| x)
}

pub fn average<T: ToPrimitive>(xs: &[T]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    let sum: f64 = xs.iter().filter_map(ToPrimitive::to_f64).sum();
    Some(sum / xs.len() as f64)
}

/// Population variance.
pub fn variance<T: ToPrimitive>(xs: &[T]) -> Option<f64> {
    let mean = average(xs)?;
    let ss: f64 = xs
        .iter()
        .filter_map(ToPrimitive::to_f64)
        .map(|x| (x - mean) * (x - mean))
        .sum();
    Some(ss / xs.len() as f64)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    const REFERENCE: [i32; 13] = [0, 1, 0, 6, 3, 2, 7, 4, 5, 2, 2, 6, 1];

    #[test]
    fn reference_helpers() {
        assert_eq!(mode(&REFERENCE), Some(2));
        assert_eq!(average(&REFERENCE), Some(3.0));
        assert_eq!((variance(&REFERENCE).unwrap() * 100.0).round(), 523.0);
    }

    #[test]
    fn running_stats_match_reference() {
        let mut s = RunningStats::<1>::new();
        for x in REFERENCE {
            s.update(&[x as f64]);
        }
        assert_eq!(s.count(), 13);
        assert_relative_eq!(s.mean(0), 3.0);
        assert_relative_eq!(s.variance(0), 68.0 / 13.0, epsilon = 1e-12);
        assert_eq!((s.variance(0) * 100.0).round(), 523.0);
    }

    #[test]
    fn dimensions_are_independent() {
        let mut s = RunningStats::<2>::new();
        s.update(&[1.0, 10.0]);
        s.update(&[3.0, 10.0]);
        assert_relative_eq!(s.mean(0), 2.0);
        assert_relative_eq!(s.variance(0), 1.0);
        assert_relative_eq!(s.mean(1), 10.0);
        assert_eq!(s.variance(1), 0.0);
    }

    #[test]
    fn cancellation_never_yields_negative_variance() {
        let mut s = RunningStats::<1>::new();
        for _ in 0..1_000 {
            s.update(&[0.1 + 1e8]);
        }
        assert!(s.variance(0) >= 0.0);
        assert!(!s.std_dev(0).is_nan());
    }

    #[test]
    fn constant_dimension_has_exactly_zero_variance() {
        // 0.7 is not representable, so E[x²] − E[x]² leaves ~1.7e-16
        let mut s = RunningStats::<2>::new();
        for _ in 0..3 {
            s.update(&[0.7, 0.7]);
        }
        assert_eq!(s.variance(0), 0.0);
        assert_eq!(s.std_dev(1), 0.0);
    }

    #[test]
    fn small_genuine_spread_survives_tolerance() {
        let mut s = RunningStats::<1>::new();
        s.update(&[0.7]);
        s.update(&[0.7 + 1e-6]);
        assert_relative_eq!(s.variance(0), 0.25e-12, max_relative = 1e-3);
    }

    #[test]
    #[should_panic(expected = "no observations")]
    fn mean_without_observations_panics() {
        RunningStats::<3>::new().mean(0);
    }

    #[test]
    fn mode_ties_go_to_smallest() {
        assert_eq!(mode(&[5u32, 3, 5, 3, 9]), Some(3));
        assert_eq!(mode::<u32>(&[]), None);
        assert_eq!(mode_of([4u32, 4, 1]), Some(4));
    }

    #[test]
    fn empty_slices_have_no_moments() {
        assert_eq!(average::<f32>(&[]), None);
        assert_eq!(variance::<u8>(&[]), None);
    }

    proptest! {
        #[test]
        fn variance_is_never_negative(xs in prop::collection::vec(-1e6f64..1e6, 1..100)) {
            let mut s = RunningStats::<1>::new();
            for x in &xs {
                s.update(&[*x]);
            }
            prop_assert!(s.variance(0) >= 0.0);
        }
    }
}
