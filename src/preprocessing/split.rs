//! Stratified train/test splitting

use crate::error::{MaintenanceError, Result};
use crate::utils::series_to_labels;
use ndarray::{Array1, Axis};
use polars::prelude::*;
use rand::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Output of a split: `(x_train, x_test, y_train, y_test)`
pub type SplitData = (DataFrame, DataFrame, Array1<i64>, Array1<i64>);

/// Split a table into train/test partitions, stratified on `target_col`.
///
/// The target column is removed from the features and returned as integer
/// labels. `n_test = ceil(test_size * n)` rows go to the test partition and
/// each class contributes its proportional share, rounded by largest
/// remainder. Within a partition rows keep their original relative order.
pub fn stratified_split(df: &DataFrame, target_col: &str, test_size: f64, seed: u64) -> Result<SplitData> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(MaintenanceError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: "must be in the open interval (0, 1)".to_string(),
        });
    }

    let target = df
        .column(target_col)
        .map_err(|_| MaintenanceError::FeatureNotFound(target_col.to_string()))?;
    let y = series_to_labels(target.as_materialized_series())?;
    let x = df.drop(target_col)?;

    let n = y.len();
    let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, &label) in y.iter().enumerate() {
        class_indices.entry(label).or_default().push(i);
    }

    for (&class, indices) in &class_indices {
        if indices.len() < 2 {
            return Err(MaintenanceError::StratificationError {
                class,
                count: indices.len(),
            });
        }
    }

    let n_classes = class_indices.len();
    let n_test = (test_size * n as f64).ceil() as usize;
    let n_train = n - n_test;
    if n_test < n_classes || n_train < n_classes {
        return Err(MaintenanceError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: format!(
                "{} rows give {} train / {} test, each partition needs at least {} (one per class)",
                n, n_train, n_test, n_classes
            ),
        });
    }

    let counts: Vec<(i64, usize)> = class_indices.iter().map(|(&c, idx)| (c, idx.len())).collect();
    let test_counts = allocate_test_counts(&counts, n, n_test);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train_idx = Vec::with_capacity(n_train);
    let mut test_idx = Vec::with_capacity(n_test);

    for ((_, indices), &n_class_test) in class_indices.iter().zip(test_counts.iter()) {
        let mut shuffled = indices.clone();
        shuffled.shuffle(&mut rng);
        test_idx.extend_from_slice(&shuffled[..n_class_test]);
        train_idx.extend_from_slice(&shuffled[n_class_test..]);
    }

    train_idx.sort_unstable();
    test_idx.sort_unstable();

    debug!(
        train = train_idx.len(),
        test = test_idx.len(),
        classes = n_classes,
        "stratified split"
    );

    let x_train = take_rows(&x, &train_idx)?;
    let x_test = take_rows(&x, &test_idx)?;
    let y_train = y.select(Axis(0), &train_idx);
    let y_test = y.select(Axis(0), &test_idx);

    Ok((x_train, x_test, y_train, y_test))
}

/// Proportional allocation of `n_draws` over classes, largest remainder first.
/// Ties go to the larger class, then the smaller label.
fn allocate_test_counts(counts: &[(i64, usize)], n_total: usize, n_draws: usize) -> Vec<usize> {
    let continuous: Vec<f64> = counts
        .iter()
        .map(|&(_, c)| c as f64 * n_draws as f64 / n_total as f64)
        .collect();

    let mut allocated: Vec<usize> = continuous.iter().map(|v| v.floor() as usize).collect();
    let mut remaining = n_draws.saturating_sub(allocated.iter().sum());

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = continuous[a] - continuous[a].floor();
        let rb = continuous[b] - continuous[b].floor();
        rb.partial_cmp(&ra)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(counts[b].1.cmp(&counts[a].1))
            .then(counts[a].0.cmp(&counts[b].0))
    });

    for &i in order.iter().cycle() {
        if remaining == 0 {
            break;
        }
        if allocated[i] < counts[i].1 {
            allocated[i] += 1;
            remaining -= 1;
        }
    }

    allocated
}

/// Gather rows by position into a new frame
fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
    let idx = IdxCa::from_vec("idx".into(), idx);
    Ok(df.take(&idx)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled_df(n_neg: usize, n_pos: usize) -> DataFrame {
        let n = n_neg + n_pos;
        let feature: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let target: Vec<i64> = (0..n).map(|i| if i < n_neg { 0 } else { 1 }).collect();
        df!("feature" => &feature, "target" => &target).unwrap()
    }

    #[test]
    fn test_split_preserves_rows_and_removes_target() {
        let df = labelled_df(80, 20);
        let (x_train, x_test, y_train, y_test) = stratified_split(&df, "target", 0.2, 42).unwrap();

        assert_eq!(x_train.height() + x_test.height(), 100);
        assert_eq!(x_train.height(), y_train.len());
        assert_eq!(x_test.height(), y_test.len());
        assert!(x_train.column("target").is_err());
        assert_eq!(x_test.height(), 20);
    }

    #[test]
    fn test_split_is_stratified() {
        let df = labelled_df(73, 27);
        let (_, _, y_train, y_test) = stratified_split(&df, "target", 0.25, 7).unwrap();

        let overall = 27.0 / 100.0;
        let pos_train = y_train.iter().filter(|&&v| v == 1).count() as f64;
        let pos_test = y_test.iter().filter(|&&v| v == 1).count() as f64;

        assert!((pos_train - overall * y_train.len() as f64).abs() <= 1.0);
        assert!((pos_test - overall * y_test.len() as f64).abs() <= 1.0);
    }

    #[test]
    fn test_split_is_reproducible() {
        let df = labelled_df(30, 10);
        let (a, _, _, _) = stratified_split(&df, "target", 0.2, 42).unwrap();
        let (b, _, _, _) = stratified_split(&df, "target", 0.2, 42).unwrap();
        assert!(a.equals(&b));
    }

    #[test]
    fn test_features_stay_aligned_with_labels() {
        let df = labelled_df(12, 8);
        let (x_train, _, y_train, _) = stratified_split(&df, "target", 0.3, 3).unwrap();

        let feature = x_train.column("feature").unwrap().f64().unwrap();
        for (f, &label) in feature.into_iter().zip(y_train.iter()) {
            let expected = if f.unwrap() < 12.0 { 0 } else { 1 };
            assert_eq!(label, expected);
        }
    }

    #[test]
    fn test_singleton_class_cannot_be_stratified() {
        let df = labelled_df(9, 1);
        let err = stratified_split(&df, "target", 0.2, 42).unwrap_err();
        assert!(matches!(err, MaintenanceError::StratificationError { class: 1, count: 1 }));
    }

    #[test]
    fn test_invalid_test_size() {
        let df = labelled_df(8, 2);
        assert!(stratified_split(&df, "target", 0.0, 42).is_err());
        assert!(stratified_split(&df, "target", 1.0, 42).is_err());
    }

    #[test]
    fn test_allocation_largest_remainder() {
        // 8 / 2 with 2 draws: 1.6 and 0.4 -> remainder favours the larger class
        let alloc = allocate_test_counts(&[(0, 8), (1, 2)], 10, 2);
        assert_eq!(alloc, vec![2, 0]);

        let alloc = allocate_test_counts(&[(0, 80), (1, 20)], 100, 20);
        assert_eq!(alloc, vec![16, 4]);
    }
}
