//! Model training module
//!
//! Binary failure classifiers and their training / evaluation:
//! - Logistic regression (gradient descent, L2)
//! - Decision tree (CART)
//! - Support Vector Machine (SMO, RBF kernel)

mod engine;
mod factory;
pub mod decision_tree;
pub mod linear_models;
pub mod metrics;
pub mod svm;

pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use engine::{evaluate, train, Evaluation};
pub use factory::{get_model, Classifier, ModelType, SUPPORTED_MODELS};
pub use linear_models::LogisticRegression;
pub use metrics::{ClassMetrics, ClassificationReport, ConfusionMatrix};
pub use svm::{KernelType, SVMClassifier, SVMConfig};
