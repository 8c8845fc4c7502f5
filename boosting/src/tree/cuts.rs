use ndarray::ArrayView2;
use rayon::prelude::*;

/// Per-feature split candidates used by the `hist` tree method.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FeatureCuts {
    cuts: Vec<Vec<f64>>,
}

impl FeatureCuts {
    /// Sketches at most `max_bin - 1` ascending cut points per feature.
    ///
    /// Features with few distinct values get every midpoint, which makes `hist`
    /// and `exact` agree on them.
    pub(crate) fn build(features: ArrayView2<'_, f32>, max_bin: usize) -> Self {
        let cuts = (0..features.ncols())
            .into_par_iter()
            .map(|feature| {
                let mut values: Vec<f32> = features
                    .column(feature)
                    .iter()
                    .copied()
                    .filter(|v| !v.is_nan())
                    .collect();
                values.sort_by(f32::total_cmp);

                let mut distinct = values.clone();
                distinct.dedup();

                if distinct.len() <= max_bin {
                    return distinct
                        .windows(2)
                        .map(|w| (f64::from(w[0]) + f64::from(w[1])) / 2.0)
                        .collect();
                }

                let mut cuts: Vec<f64> = (1..max_bin)
                    .map(|k| f64::from(values[k * values.len() / max_bin]))
                    .collect();
                cuts.dedup();
                cuts.retain(|&c| c > f64::from(values[0]));
                cuts
            })
            .collect();

        Self { cuts }
    }

    /// The smallest cut strictly above `lo` as long as it does not exceed `hi`.
    ///
    /// Splitting at that cut separates `lo` (left) from `hi` (right).
    pub(crate) fn between(&self, feature: usize, lo: f32, hi: f32) -> Option<f64> {
        let cuts = &self.cuts[feature];
        let (lo, hi) = (f64::from(lo), f64::from(hi));

        let idx = cuts.partition_point(|&c| c <= lo);
        cuts.get(idx).copied().filter(|&c| c <= hi)
    }

    #[cfg(test)]
    pub(crate) fn of(&self, feature: usize) -> &[f64] {
        &self.cuts[feature]
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;

    #[test]
    fn few_distinct_values_yield_midpoints() {
        let features = Array2::from_shape_vec((4, 1), vec![1.0, 3.0, 1.0, f32::NAN]).unwrap();
        let cuts = FeatureCuts::build(features.view(), 256);

        assert_eq!(cuts.of(0), &[2.0]);
        assert_eq!(cuts.between(0, 1.0, 3.0), Some(2.0));
        assert_eq!(cuts.between(0, 3.0, 3.0), None);
    }

    #[test]
    fn many_distinct_values_are_sketched() {
        let features = Array2::from_shape_vec((100, 1), (0..100).map(|v| v as f32).collect()).unwrap();
        let cuts = FeatureCuts::build(features.view(), 4);

        assert_eq!(cuts.of(0), &[25.0, 50.0, 75.0]);
        assert_eq!(cuts.between(0, 24.0, 25.0), Some(25.0));
        assert_eq!(cuts.between(0, 25.0, 26.0), None);
    }
}
