//! Fisher-Jenks natural breaks.
//!
//! The optimal partition of a sorted sample into `k` contiguous classes that
//! minimizes the total within-class sum of squared deviations, found by
//! dynamic programming over prefix sums.
//!
//! The search is O(n²·k) in time and O(n·k) in memory. Samples are one value
//! per region at one date, which keeps `n` at the number of regions; feeding
//! raw record collections through it does not scale.

use serde::Serialize;

/// Ordered class boundaries `[min, b1, …, b(k-1), max]`.
///
/// Value `v` belongs to class `i` when `bounds[i] <= v <= bounds[i + 1]`;
/// a value on an interior boundary belongs to the lower class.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ClassBreaks(Vec<f64>);

impl ClassBreaks {
    /// Wrap explicit boundaries; requires at least two finite, non-decreasing values.
    pub fn new(bounds: Vec<f64>) -> Option<Self> {
        let valid = bounds.len() >= 2
            && bounds.iter().all(|b| b.is_finite())
            && bounds.windows(2).all(|w| w[0] <= w[1]);
        valid.then_some(ClassBreaks(bounds))
    }

    pub fn bounds(&self) -> &[f64] {
        &self.0
    }

    pub fn class_count(&self) -> usize {
        self.0.len() - 1
    }

    pub fn min(&self) -> f64 {
        self.0[0]
    }

    pub fn max(&self) -> f64 {
        self.0[self.0.len() - 1]
    }

    /// `(lower, upper)` of every class in order.
    pub fn intervals(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.0.windows(2).map(|w| (w[0], w[1]))
    }

    /// Class index of `value`, or `None` when it lies outside `[min, max]`.
    pub fn class_of(&self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            return None;
        }
        if value == self.max() {
            return Some(self.class_count() - 1);
        }
        self.intervals()
            .position(|(lower, upper)| lower <= value && value <= upper)
    }
}

/// Compute natural breaks for `values` with `k` classes.
///
/// Non-finite values are ignored; `None` means nothing finite was left. When
/// fewer than `k` values or fewer than `k` distinct values remain, a single
/// class `[min, max]` is returned. A `k` of zero is treated as one.
pub fn classify(values: &[f64], k: usize) -> Option<ClassBreaks> {
    let mut data: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if data.is_empty() {
        return None;
    }
    data.sort_by(f64::total_cmp);

    let k = k.max(1);
    let n = data.len();
    let min = data[0];
    let max = data[n - 1];
    let distinct = 1 + data.windows(2).filter(|w| w[0] != w[1]).count();

    if k == 1 || n < k || distinct < k {
        if k > 1 {
            log::debug!(
                "natural_breaks: {} values ({} distinct) for {} classes, using a single class",
                n,
                distinct,
                k
            );
        }
        return Some(ClassBreaks(vec![min, max]));
    }

    let splits = optimal_splits(&data, k);
    let mut bounds = Vec::with_capacity(k + 1);
    bounds.push(min);
    // The last element of each lower class is the boundary.
    bounds.extend(splits.iter().map(|&split| data[split - 1]));
    bounds.push(max);
    Some(ClassBreaks(bounds))
}

/// Start offsets of classes 2..=k in the optimal partition of sorted `data`.
fn optimal_splits(data: &[f64], k: usize) -> Vec<usize> {
    let n = data.len();
    let mut sum = vec![0.0; n + 1];
    let mut sum_sq = vec![0.0; n + 1];
    for (i, &value) in data.iter().enumerate() {
        sum[i + 1] = sum[i] + value;
        sum_sq[i + 1] = sum_sq[i] + value * value;
    }

    // Sum of squared deviations of data[j..i].
    let segment_cost = |j: usize, i: usize| -> f64 {
        let count = (i - j) as f64;
        let s = sum[i] - sum[j];
        (sum_sq[i] - sum_sq[j]) - s * s / count
    };

    // cost[c][i]: best total for the first i values in c classes.
    // split[c][i]: where the last of those c classes starts.
    let mut cost = vec![vec![f64::INFINITY; n + 1]; k + 1];
    let mut split = vec![vec![0usize; n + 1]; k + 1];
    for i in 1..=n {
        cost[1][i] = segment_cost(0, i);
    }
    for c in 2..=k {
        for i in c..=n {
            for j in (c - 1)..i {
                let candidate = cost[c - 1][j] + segment_cost(j, i);
                if candidate < cost[c][i] {
                    cost[c][i] = candidate;
                    split[c][i] = j;
                }
            }
        }
    }

    let mut splits = vec![0usize; k - 1];
    let mut end = n;
    for c in (2..=k).rev() {
        let start = split[c][end];
        splits[c - 2] = start;
        end = start;
    }
    splits
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_three_obvious_clusters() {
        let values = [1.0, 2.0, 3.0, 10.0, 11.0, 12.0, 20.0, 21.0, 22.0];
        let breaks = classify(&values, 3).unwrap();
        assert_eq!(breaks.bounds(), &[1.0, 3.0, 12.0, 22.0]);
    }

    #[test]
    fn test_unsorted_input() {
        let values = [22.0, 1.0, 11.0, 3.0, 21.0, 2.0, 12.0, 10.0, 20.0];
        let breaks = classify(&values, 3).unwrap();
        assert_eq!(breaks.bounds(), &[1.0, 3.0, 12.0, 22.0]);
    }

    #[test]
    fn test_outlier_gets_own_class() {
        let breaks = classify(&[1.0, 2.0, 3.0, 4.0, 100.0], 2).unwrap();
        assert_eq!(breaks.bounds(), &[1.0, 4.0, 100.0]);
    }

    #[test]
    fn test_single_value_fallback() {
        let breaks = classify(&[5.0], 5).unwrap();
        assert_eq!(breaks.bounds(), &[5.0, 5.0]);
        assert_eq!(breaks.class_of(5.0), Some(0));
    }

    #[test]
    fn test_exactly_k_distinct_values() {
        let breaks = classify(&[1.0, 2.0, 3.0, 4.0, 100.0], 5).unwrap();
        assert_eq!(breaks.bounds(), &[1.0, 1.0, 2.0, 3.0, 4.0, 100.0]);
        for (expected, v) in [1.0, 2.0, 3.0, 4.0, 100.0].into_iter().enumerate() {
            assert_eq!(breaks.class_of(v), Some(expected));
        }
    }

    #[test]
    fn test_fewer_distinct_than_k() {
        let breaks = classify(&[2.0, 2.0, 2.0, 7.0, 7.0, 7.0], 5).unwrap();
        assert_eq!(breaks.bounds(), &[2.0, 7.0]);
    }

    #[test]
    fn test_fewer_values_than_k() {
        let breaks = classify(&[3.0, 9.0], 5).unwrap();
        assert_eq!(breaks.bounds(), &[3.0, 9.0]);
    }

    #[test]
    fn test_empty_and_non_finite() {
        assert_eq!(classify(&[], 5), None);
        assert_eq!(classify(&[f64::NAN, f64::INFINITY], 5), None);
        let breaks = classify(&[f64::NAN, 4.0, 6.0], 1).unwrap();
        assert_eq!(breaks.bounds(), &[4.0, 6.0]);
    }

    #[test]
    fn test_class_of_boundaries() {
        let breaks = ClassBreaks::new(vec![0.0, 10.0, 20.0]).unwrap();
        assert_eq!(breaks.class_of(0.0), Some(0));
        assert_eq!(breaks.class_of(10.0), Some(0));
        assert_eq!(breaks.class_of(10.5), Some(1));
        assert_eq!(breaks.class_of(20.0), Some(1));
        assert_eq!(breaks.class_of(-1.0), None);
        assert_eq!(breaks.class_of(21.0), None);
        assert_eq!(breaks.class_of(f64::NAN), None);
    }

    #[test]
    fn test_class_of_max_with_repeated_upper_bounds() {
        let breaks = ClassBreaks::new(vec![1.0, 5.0, 5.0, 5.0]).unwrap();
        assert_eq!(breaks.class_of(5.0), Some(2));
        assert_eq!(breaks.class_of(3.0), Some(0));
    }

    #[test]
    fn test_new_rejects_invalid() {
        assert!(ClassBreaks::new(vec![1.0]).is_none());
        assert!(ClassBreaks::new(vec![2.0, 1.0]).is_none());
        assert!(ClassBreaks::new(vec![0.0, f64::NAN]).is_none());
    }

    proptest! {
        #[test]
        fn prop_breaks_shape(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..60), k in 1usize..8) {
            let breaks = classify(&values, k).unwrap();
            let bounds = breaks.bounds();
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            let mut sorted = values.clone();
            sorted.sort_by(f64::total_cmp);
            sorted.dedup();
            let expected_len = if sorted.len() >= k { k + 1 } else { 2 };

            prop_assert_eq!(bounds.len(), expected_len);
            prop_assert!(bounds.windows(2).all(|w| w[0] <= w[1]));
            prop_assert_eq!(bounds[0], min);
            prop_assert_eq!(bounds[bounds.len() - 1], max);
        }

        #[test]
        fn prop_every_value_has_a_class(values in prop::collection::vec(-1.0e3f64..1.0e3, 1..60), k in 1usize..8) {
            let breaks = classify(&values, k).unwrap();
            let classes = breaks.class_count();
            for v in &values {
                let class = breaks.class_of(*v);
                prop_assert!(matches!(class, Some(c) if c < classes));
            }
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(breaks.class_of(max), Some(classes - 1));
        }
    }
}
