//! Model factory

use super::decision_tree::DecisionTree;
use super::linear_models::LogisticRegression;
use super::svm::{SVMClassifier, SVMConfig};
use crate::error::{MaintenanceError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Names accepted by [`get_model`]
pub const SUPPORTED_MODELS: [&str; 3] = ["logistic", "decision_tree", "svm"];

/// Supported model families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Logistic,
    DecisionTree,
    Svm,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Logistic => "logistic",
            ModelType::DecisionTree => "decision_tree",
            ModelType::Svm => "svm",
        }
    }

    /// Fresh, untrained classifier with default hyperparameters
    pub fn build(&self) -> Classifier {
        match self {
            ModelType::Logistic => Classifier::Logistic(LogisticRegression::new().with_max_iter(1000)),
            ModelType::DecisionTree => Classifier::DecisionTree(DecisionTree::new()),
            ModelType::Svm => Classifier::Svm(SVMClassifier::new(SVMConfig::default())),
        }
    }
}

impl FromStr for ModelType {
    type Err = MaintenanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "logistic" => Ok(ModelType::Logistic),
            "decision_tree" => Ok(ModelType::DecisionTree),
            "svm" => Ok(ModelType::Svm),
            other => Err(MaintenanceError::UnsupportedModel(other.to_string())),
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A binary classifier over {0, 1} labels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Classifier {
    Logistic(LogisticRegression),
    DecisionTree(DecisionTree),
    Svm(SVMClassifier),
}

impl Classifier {
    pub fn model_type(&self) -> ModelType {
        match self {
            Classifier::Logistic(_) => ModelType::Logistic,
            Classifier::DecisionTree(_) => ModelType::DecisionTree,
            Classifier::Svm(_) => ModelType::Svm,
        }
    }

    pub fn is_fitted(&self) -> bool {
        match self {
            Classifier::Logistic(m) => m.is_fitted,
            Classifier::DecisionTree(m) => m.is_fitted(),
            Classifier::Svm(m) => m.is_fitted(),
        }
    }

    /// Fit in place
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<()> {
        if let Some(bad) = y.iter().find(|&&v| v != 0 && v != 1) {
            return Err(MaintenanceError::InvalidInput(format!(
                "expected binary labels 0/1, found {}",
                bad
            )));
        }

        match self {
            Classifier::Logistic(m) => {
                let y_f64 = y.mapv(|v| v as f64);
                m.fit(x, &y_f64)?;
            }
            Classifier::DecisionTree(m) => {
                m.fit(x, y)?;
            }
            Classifier::Svm(m) => {
                m.fit(x, y)?;
            }
        }
        Ok(())
    }

    /// Predict {0, 1} labels
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<i64>> {
        match self {
            Classifier::Logistic(m) => Ok(m.predict(x)?.mapv(|v| v as i64)),
            Classifier::DecisionTree(m) => m.predict(x),
            Classifier::Svm(m) => m.predict(x),
        }
    }
}

/// Fresh, untrained classifier for `name`.
///
/// Accepts `logistic`, `decision_tree` or `svm`; anything else is
/// `UnsupportedModel`. Each call returns an independent value.
pub fn get_model(name: &str) -> Result<Classifier> {
    Ok(name.parse::<ModelType>()?.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_known_names() {
        for name in SUPPORTED_MODELS {
            let model = get_model(name).unwrap();
            assert_eq!(model.model_type().as_str(), name);
            assert!(!model.is_fitted());
        }
    }

    #[test]
    fn test_unsupported_name_is_reported() {
        let err = get_model("random_forest").unwrap_err();
        assert!(matches!(err, MaintenanceError::UnsupportedModel(ref n) if n == "random_forest"));
        assert!(err.to_string().contains("random_forest"));
    }

    #[test]
    fn test_instances_are_independent() {
        let mut a = get_model("logistic").unwrap();
        let b = get_model("logistic").unwrap();

        let x = array![[0.0], [1.0], [4.0], [5.0]];
        let y = array![0, 0, 1, 1];
        a.fit(&x, &y).unwrap();

        assert!(a.is_fitted());
        assert!(!b.is_fitted());
    }

    #[test]
    fn test_non_binary_labels_rejected() {
        let mut model = get_model("decision_tree").unwrap();
        let err = model.fit(&array![[0.0], [1.0]], &array![0, 3]).unwrap_err();
        assert!(matches!(err, MaintenanceError::InvalidInput(_)));
    }
}
