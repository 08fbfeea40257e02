//! maintenance-ml - Predictive-maintenance failure classification
//!
//! Loads machine sensor records, prepares them for a binary "will this
//! machine fail" classifier, trains the classifier and evaluates it.
//!
//! # Modules
//!
//! ## Data
//! - [`utils`] - CSV loading and DataFrame / ndarray conversion
//! - [`preprocessing`] - Cleaning, column dropping, target binarization,
//!   stratified split, one-hot encoding, standardization
//! - [`synthetic`] - SMOTE oversampling of the training partition
//!
//! ## Models
//! - [`training`] - Logistic regression, decision tree and SVM classifiers,
//!   model factory, training and evaluation
//!
//! ## Orchestration
//! - [`pipeline`] - Pipeline configuration and the end-to-end run
//!
//! ## Output
//! - [`export`] - Model persistence
//! - [`visualization`] - Confusion matrix heatmap
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data
pub mod utils;
pub mod preprocessing;
pub mod synthetic;

// Models
pub mod training;

// Orchestration
pub mod pipeline;

// Output
pub mod export;
pub mod visualization;
pub mod cli;

pub use error::{MaintenanceError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{MaintenanceError, Result};

    // Data
    pub use crate::utils::{frame_to_array2, load_csv, DataLoader};

    // Preprocessing
    pub use crate::preprocessing::{
        binarize_target, clean, drop_columns, fit_encode, fit_scale, stratified_split, Encoder,
        Scaler, ScalerType,
    };

    // Balancing
    pub use crate::synthetic::{balance, BalanceMethod, Sampler, SMOTE};

    // Training
    pub use crate::training::{
        evaluate, get_model, train, Classifier, ClassificationReport, ConfusionMatrix, Evaluation,
        ModelType,
    };

    // Pipeline
    pub use crate::pipeline::{run_pipeline, PipelineConfig, PipelineOutput};

    // Export
    pub use crate::export::{load_model, save_model};

    // Visualization
    pub use crate::visualization::{confusion_matrix_plot, write_confusion_matrix_html};
}
