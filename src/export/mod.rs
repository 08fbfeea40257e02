//! Model export and serialization module
//!
//! Trained classifiers, encoders and scalers are persisted as bincode
//! artifacts named `<dir>/<name>.bin`.

mod serializer;

pub use serializer::{
    artifact_path, load_model, save_model, ARTIFACT_EXTENSION, DEFAULT_ARTIFACT_DIR,
};
