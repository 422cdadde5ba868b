//! Model artifacts on disk
//!
//! Reads model/explainer bytes and their JSON manifests, and verifies SHA-256
//! checksums when one is configured.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("checksum mismatch for {}: expected {expected}, got {actual}", path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("invalid manifest {}: {reason}", path.display())]
    InvalidManifest { path: PathBuf, reason: String },
}

/// Lowercase hex SHA-256 of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Read an artifact, verifying its checksum when `expected_sha256` is given
pub fn read_artifact(path: &Path, expected_sha256: Option<&str>) -> Result<Vec<u8>, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(expected) = expected_sha256 {
        let actual = sha256_hex(&bytes);
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            return Err(ArtifactError::ChecksumMismatch {
                path: path.to_path_buf(),
                expected: expected.trim().to_lowercase(),
                actual,
            });
        }
        log::debug!("Checksum verified for {}", path.display());
    }

    Ok(bytes)
}

/// Read and parse a JSON file (manifest or background matrix)
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = read_artifact(path, None)?;
    serde_json::from_slice(&bytes).map_err(|e| ArtifactError::InvalidManifest {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Manifest sidecar next to an artifact: `model.onnx` → `model.json`
pub fn manifest_path_for(artifact: &Path) -> PathBuf {
    artifact.with_extension("json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_value() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_read_artifact_verifies_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"abc").unwrap();

        let ok = read_artifact(&path, Some("BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD"));
        assert_eq!(ok.unwrap(), b"abc");

        match read_artifact(&path, Some("00")) {
            Err(ArtifactError::ChecksumMismatch { expected, actual, .. }) => {
                assert_eq!(expected, "00");
                assert_eq!(actual, sha256_hex(b"abc"));
            }
            other => panic!("Expected ChecksumMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.onnx");
        assert!(matches!(read_artifact(&path, None), Err(ArtifactError::NotFound(_))));
    }

    #[test]
    fn test_manifest_path_for() {
        assert_eq!(
            manifest_path_for(Path::new("models/rf.onnx")),
            PathBuf::from("models/rf.json")
        );
    }
}
