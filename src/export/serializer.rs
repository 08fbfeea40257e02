//! Artifact persistence
//!
//! Values are written as a bincode envelope holding the payload and an
//! FNV-1a checksum, so truncated or foreign files fail loudly on load.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{MaintenanceError, Result};

/// File extension of persisted artifacts
pub const ARTIFACT_EXTENSION: &str = "bin";

/// Directory used when the caller does not pick one
pub const DEFAULT_ARTIFACT_DIR: &str = "artifacts";

/// On-disk envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SerializedArtifact {
    magic: [u8; 4],
    format_version: u32,
    /// Rust type name of the payload, for error messages
    kind: String,
    payload: Vec<u8>,
    checksum: u64,
}

impl SerializedArtifact {
    const MAGIC: [u8; 4] = [b'P', b'M', b'M', b'L'];
    const VERSION: u32 = 1;

    fn new(kind: &str, payload: Vec<u8>) -> Self {
        let checksum = Self::compute_checksum(&payload);
        Self {
            magic: Self::MAGIC,
            format_version: Self::VERSION,
            kind: kind.to_string(),
            payload,
            checksum,
        }
    }

    /// FNV-1a
    fn compute_checksum(data: &[u8]) -> u64 {
        const FNV_OFFSET: u64 = 14695981039346656037;
        const FNV_PRIME: u64 = 1099511628211;

        let mut hash = FNV_OFFSET;
        for byte in data {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }

    fn verify(&self) -> Result<()> {
        if self.magic != Self::MAGIC {
            return Err(MaintenanceError::SerializationError(
                "not a model artifact (bad magic bytes)".to_string(),
            ));
        }
        if self.format_version != Self::VERSION {
            return Err(MaintenanceError::SerializationError(format!(
                "unsupported artifact format version {}",
                self.format_version
            )));
        }
        if Self::compute_checksum(&self.payload) != self.checksum {
            return Err(MaintenanceError::SerializationError(
                "Checksum verification failed".to_string(),
            ));
        }
        Ok(())
    }
}

/// Path an artifact called `name` gets inside `dir`
pub fn artifact_path(name: &str, dir: impl AsRef<Path>) -> PathBuf {
    dir.as_ref().join(format!("{}.{}", name, ARTIFACT_EXTENSION))
}

/// Persist `value` to `<dir>/<name>.bin`, creating `dir` if needed.
/// Returns the written path.
pub fn save_model<T: Serialize>(value: &T, name: &str, dir: impl AsRef<Path>) -> Result<PathBuf> {
    if name.is_empty() {
        return Err(MaintenanceError::InvalidParameter {
            name: "name".to_string(),
            value: String::new(),
            reason: "artifact name must not be empty".to_string(),
        });
    }

    fs::create_dir_all(dir.as_ref())?;
    let path = artifact_path(name, dir);

    let payload = bincode::serialize(value)?;
    let artifact = SerializedArtifact::new(std::any::type_name::<T>(), payload);

    let mut writer = BufWriter::new(File::create(&path)?);
    bincode::serialize_into(&mut writer, &artifact)?;
    writer.flush()?;

    info!("Saved artifact to {}", path.display());
    Ok(path)
}

/// Load a value written by [`save_model`]
pub fn load_model<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let mut bytes = Vec::new();
    BufReader::new(File::open(path.as_ref())?).read_to_end(&mut bytes)?;

    if !bytes.starts_with(&SerializedArtifact::MAGIC) {
        return Err(MaintenanceError::SerializationError(format!(
            "{} is not a model artifact (bad magic bytes)",
            path.as_ref().display()
        )));
    }

    // Length prefixes in a corrupt file must not trigger huge allocations
    let artifact: SerializedArtifact = bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_limit(bytes.len() as u64)
        .deserialize(&bytes)?;
    artifact.verify()?;

    bincode::deserialize(&artifact.payload).map_err(|e| {
        MaintenanceError::SerializationError(format!(
            "{} does not hold a {} (stored: {}): {}",
            path.as_ref().display(),
            std::any::type_name::<T>(),
            artifact.kind,
            e
        ))
    })
}
