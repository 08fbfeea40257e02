//! Integration test: model factory, training, evaluation and persistence

use maintenance_ml::error::MaintenanceError;
use maintenance_ml::export::{load_model, save_model};
use maintenance_ml::pipeline::{run_pipeline, PipelineConfig};
use maintenance_ml::preprocessing::{Encoder, Scaler};
use maintenance_ml::training::{
    evaluate, get_model, train, Classifier, ConfusionMatrix, ModelType, SUPPORTED_MODELS,
};
use ndarray::{array, Array1, Array2};
use polars::prelude::*;
use tempfile::TempDir;

/// Two well separated clusters, failures at high torque and tool wear
fn separable_data() -> (Array2<f64>, Array1<i64>) {
    let n = 40;
    let mut x = Array2::zeros((n, 2));
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let failing = i % 4 == 0;
        let offset = if failing { 3.0 } else { -1.0 };
        x[[i, 0]] = offset + (i as f64 * 0.37).sin() * 0.5;
        x[[i, 1]] = offset + (i as f64 * 0.91).cos() * 0.5;
        y[i] = failing as i64;
    }
    (x, y)
}

fn maintenance_frame() -> DataFrame {
    let n = 60;
    let types = ["L", "M", "H"];
    let mut udi = Vec::with_capacity(n);
    let mut product = Vec::with_capacity(n);
    let mut kind = Vec::with_capacity(n);
    let mut torque = Vec::with_capacity(n);
    let mut wear = Vec::with_capacity(n);
    let mut failure = Vec::with_capacity(n);

    for i in 0..n {
        let failing = i % 6 == 0;
        udi.push(i as i64 + 1);
        product.push(format!("{}{}", types[i % 3], 10000 + i));
        kind.push(types[i % 3]);
        torque.push(if failing { 65.0 + (i % 5) as f64 } else { 35.0 + (i % 11) as f64 });
        wear.push(if failing { 200 + (i % 7) as i64 } else { (i * 3 % 120) as i64 });
        failure.push(match (failing, i % 12) {
            (false, _) => "No Failure",
            (true, 0) => "Overstrain Failure",
            (true, _) => "Tool Wear Failure",
        });
    }

    df!(
        "UDI" => udi,
        "Product ID" => product,
        "Type" => kind,
        "Torque [Nm]" => torque,
        "Tool wear [min]" => wear,
        "Failure Type" => failure,
    )
    .unwrap()
}

#[test]
fn test_factory_returns_independent_models() {
    let (x, y) = separable_data();

    let mut first = get_model("logistic").unwrap();
    let second = get_model("logistic").unwrap();
    train(&mut first, &x, &y).unwrap();

    assert!(first.is_fitted());
    assert!(!second.is_fitted());
}

#[test]
fn test_factory_covers_supported_names() {
    for name in SUPPORTED_MODELS {
        let model = get_model(name).unwrap();
        assert_eq!(model.model_type().as_str(), name);
        assert_eq!(name.parse::<ModelType>().unwrap(), model.model_type());
    }
}

#[test]
fn test_unsupported_model_names_the_value() {
    let err = get_model("random_forest").unwrap_err();
    assert!(matches!(err, MaintenanceError::UnsupportedModel(ref name) if name == "random_forest"));
    assert!(err.to_string().contains("random_forest"));
}

#[test]
fn test_train_rejects_mismatched_labels() {
    let (x, _) = separable_data();
    let y = Array1::from_vec(vec![0i64, 1, 0]);

    let mut model = get_model("decision_tree").unwrap();
    let err = train(&mut model, &x, &y).unwrap_err();
    assert!(matches!(err, MaintenanceError::ShapeError { .. }));
}

#[test]
fn test_evaluate_known_predictions() {
    let y_true = array![0i64, 0, 0, 1, 1, 0, 1, 0];
    let y_pred = array![0i64, 1, 0, 1, 0, 0, 1, 0];

    let cm = ConfusionMatrix::from_predictions(&y_true, &y_pred).unwrap();
    assert_eq!(cm.matrix, [[4, 1], [1, 2]]);
}

#[test]
fn test_all_models_separate_clean_data() {
    let (x, y) = separable_data();

    for name in SUPPORTED_MODELS {
        let mut model = get_model(name).unwrap();
        train(&mut model, &x, &y).unwrap();

        let evaluation = evaluate(&model, &x, &y).unwrap();
        assert_eq!(evaluation.confusion_matrix.fp(), 0, "{}", name);
        assert_eq!(evaluation.confusion_matrix.fn_(), 0, "{}", name);
        assert!((evaluation.report.accuracy - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_persisted_model_predicts_identically() {
    let output = run_pipeline(&maintenance_frame(), &PipelineConfig::default()).unwrap();
    let x_train = output.train_matrix().unwrap();
    let x_test = output.test_matrix().unwrap();
    let tmp = TempDir::new().unwrap();

    for name in SUPPORTED_MODELS {
        let mut model = get_model(name).unwrap();
        train(&mut model, &x_train, &output.y_train).unwrap();

        let path = save_model(&model, name, tmp.path().join("artifacts")).unwrap();
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), format!("{}.bin", name));

        let restored: Classifier = load_model(&path).unwrap();
        assert_eq!(restored.model_type(), model.model_type());
        assert_eq!(
            restored.predict(&x_test).unwrap(),
            model.predict(&x_test).unwrap(),
            "{}",
            name
        );
    }
}

#[test]
fn test_persisted_transformers_reproduce_features() {
    let df = maintenance_frame();
    let output = run_pipeline(&df, &PipelineConfig::default()).unwrap();
    let tmp = TempDir::new().unwrap();

    let encoder = output.encoder.clone().unwrap();
    let scaler = output.scaler.clone().unwrap();
    let encoder_path = save_model(&encoder, "encoder", tmp.path()).unwrap();
    let scaler_path = save_model(&scaler, "scaler", tmp.path()).unwrap();

    let encoder: Encoder = load_model(&encoder_path).unwrap();
    let scaler: Scaler = load_model(&scaler_path).unwrap();

    // Score the raw rows the same way the pipeline prepared the test split
    let raw = df
        .drop_many(["UDI", "Product ID", "Failure Type"])
        .head(Some(5));
    let features = scaler.transform(&encoder.transform(&raw).unwrap()).unwrap();

    assert_eq!(features.get_column_names(), output.x_test.get_column_names());
    assert_eq!(features.height(), 5);
}

#[test]
fn test_config_json_round_trip() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("pipeline.json");

    let config = PipelineConfig::default()
        .with_split(0.3, 7)
        .with_categorical_cols(["Type"])
        .with_scaling(false);
    config.save(&path).unwrap();

    let loaded = PipelineConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}
