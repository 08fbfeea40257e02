//! Synthetic data generation module
//!
//! Oversampling used to balance the training partition:
//! - SMOTE (Synthetic Minority Over-sampling Technique)

mod smote;

pub use smote::SMOTE;

use crate::error::Result;
use crate::utils::{array2_to_frame, column_names, frame_to_array2};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Result of resampling
#[derive(Debug, Clone)]
pub struct ResampleResult {
    /// Resampled features
    pub x: Array2<f64>,
    /// Resampled labels
    pub y: Array1<i64>,
    /// Number of synthetic samples generated per class, in label order
    pub n_synthetic: Vec<usize>,
}

/// Trait for samplers
pub trait Sampler: Send + Sync {
    /// Fit the sampler on data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<()>;

    /// Resample data
    fn resample(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult>;

    /// Fit and resample in one step
    fn fit_resample(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult> {
        self.fit(x, y)?;
        self.resample(x, y)
    }
}

fn default_seed() -> u64 {
    42
}

/// Balancing technique applied to the training partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BalanceMethod {
    Smote {
        k_neighbors: usize,
        sampling_strategy: f64,
        #[serde(default = "default_seed")]
        seed: u64,
    },
}

impl Default for BalanceMethod {
    fn default() -> Self {
        BalanceMethod::Smote {
            k_neighbors: 5,
            sampling_strategy: 1.0,
            seed: default_seed(),
        }
    }
}

impl BalanceMethod {
    fn sampler(&self) -> Box<dyn Sampler> {
        match self {
            BalanceMethod::Smote {
                k_neighbors,
                sampling_strategy,
                seed,
            } => Box::new(
                SMOTE::new()
                    .with_k_neighbors(*k_neighbors)
                    .with_sampling_strategy(*sampling_strategy)
                    .with_seed(*seed),
            ),
        }
    }
}

/// Oversample the training partition.
///
/// Original rows keep their positions; synthetic rows are appended. The
/// returned frame has the same column names as `x_train`, all `Float64`.
pub fn balance(
    x_train: &DataFrame,
    y_train: &Array1<i64>,
    method: &BalanceMethod,
) -> Result<(DataFrame, Array1<i64>)> {
    let names = column_names(x_train);
    let x = frame_to_array2(x_train)?;

    let mut sampler = method.sampler();
    let result = sampler.fit_resample(&x, y_train)?;

    info!(
        "Balanced training data: {} -> {} rows ({:?})",
        y_train.len(),
        result.y.len(),
        class_counts(&result.y)
    );

    let frame = array2_to_frame(&result.x, &names)?;
    Ok((frame, result.y))
}

/// Get class distribution
pub fn class_counts(y: &Array1<i64>) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for &label in y.iter() {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

/// Get indices for each class
pub fn class_indices(y: &Array1<i64>) -> BTreeMap<i64, Vec<usize>> {
    let mut indices = BTreeMap::new();
    for (i, &label) in y.iter().enumerate() {
        indices.entry(label).or_insert_with(Vec::new).push(i);
    }
    indices
}
