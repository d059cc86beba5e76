//! Percentiles and histogram over sorted completion times.

use crate::models::Minutes;

/// Number of histogram bins.
pub const HISTOGRAM_BINS: usize = 10;

/// Value at percentile `percent` (0..=100) of an ascending slice, using
/// index `min(floor(len * percent / 100), len - 1)`, rounded to whole minutes.
pub fn percentile_minutes(sorted: &[f64], percent: u32) -> Minutes {
    if sorted.is_empty() {
        return 0;
    }
    let index = (sorted.len() * percent as usize / 100).min(sorted.len() - 1);
    sorted[index].round() as Minutes
}

/// One equal-width histogram bin. The last bin also holds the maximum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HistogramBin {
    pub min_minutes: Minutes,
    pub max_minutes: Minutes,
    pub count: usize,
}

/// Ten equal-width bins spanning `[min, max]` of an ascending slice.
///
/// Bins are half-open `[lo, hi)`; the upper edge of the last bin is pushed to
/// `max + 1` so the largest sample is counted.
pub fn histogram(sorted: &[f64]) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    let width = (max - min) / HISTOGRAM_BINS as f64;
    let edge = |i: usize| min + i as f64 * width;

    (0..HISTOGRAM_BINS)
        .map(|i| {
            let lo = edge(i);
            let hi = if i + 1 == HISTOGRAM_BINS { max + 1.0 } else { edge(i + 1) };
            // sorted input: count by bounding the half-open range
            let start = sorted.partition_point(|&d| d < lo);
            let end = sorted.partition_point(|&d| d < hi);
            HistogramBin {
                min_minutes: lo.round() as Minutes,
                max_minutes: hi.round() as Minutes,
                count: end.saturating_sub(start),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_indexing() {
        let sorted: Vec<f64> = (1..=100).map(f64::from).collect();
        assert_eq!(percentile_minutes(&sorted, 50), 51);
        assert_eq!(percentile_minutes(&sorted, 95), 96);
        assert_eq!(percentile_minutes(&sorted, 100), 100);
        assert_eq!(percentile_minutes(&[], 50), 0);
    }

    #[test]
    fn test_percentile_rounds() {
        let sorted = [10.4, 10.6, 11.5];
        assert_eq!(percentile_minutes(&sorted, 0), 10);
        assert_eq!(percentile_minutes(&sorted, 50), 11);
        assert_eq!(percentile_minutes(&sorted, 90), 12);
    }

    #[test]
    fn test_histogram_counts_everything() {
        let sorted: Vec<f64> = (0..=100).map(f64::from).collect();
        let bins = histogram(&sorted);

        assert_eq!(bins.len(), HISTOGRAM_BINS);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), sorted.len());
        assert_eq!(bins[0].min_minutes, 0);
        assert_eq!(bins[0].max_minutes, 10);
        assert_eq!(bins[0].count, 10);
        assert_eq!(bins[9].max_minutes, 101);
        assert_eq!(bins[9].count, 11);
    }

    #[test]
    fn test_histogram_single_value() {
        let sorted = [42.0; 7];
        let bins = histogram(&sorted);

        assert_eq!(bins.len(), HISTOGRAM_BINS);
        assert!(bins[..9].iter().all(|b| b.count == 0));
        assert_eq!(bins[9].count, 7);
        assert_eq!(bins[9].min_minutes, 42);
        assert_eq!(bins[9].max_minutes, 43);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(histogram(&[]).is_empty());
    }
}
