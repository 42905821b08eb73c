//! Schema validation hook.
//!
//! After the proto is staged it is handed to a [`SchemaValidator`]; the
//! artifacts are only moved into place when validation succeeds. The default
//! validator runs `protoc` over the staged file and discards its output.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable pointing at an explicit `protoc` binary.
pub const PROTOC_ENV: &str = "PROTOC";

/// Loads a staged proto file and reports whether it is well formed.
pub trait SchemaValidator {
    fn validate(&self, proto: &Path) -> Result<()>;
}

/// Any `Fn(&Path) -> Result<(), String>` is a validator; the message becomes
/// the reason of [`Error::Validation`].
impl<F> SchemaValidator for F
where
    F: Fn(&Path) -> core::result::Result<(), String>,
{
    fn validate(&self, proto: &Path) -> Result<()> {
        self(proto).map_err(|message| Error::Validation {
            path: proto.to_path_buf(),
            message,
        })
    }
}

/// Accepts every schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipValidation;

impl SchemaValidator for SkipValidation {
    fn validate(&self, proto: &Path) -> Result<()> {
        debug!(path = %proto.display(), "Skipping schema validation.");
        Ok(())
    }
}

/// Validates by compiling the schema with `protoc`.
#[derive(Debug, Clone)]
pub struct ProtocValidator {
    protoc: PathBuf,
}

impl ProtocValidator {
    pub fn new(protoc: impl Into<PathBuf>) -> Self {
        Self {
            protoc: protoc.into(),
        }
    }

    /// Locate `protoc`: the `PROTOC` environment variable first, then `PATH`.
    pub fn discover() -> Result<Self> {
        if let Some(path) = std::env::var_os(PROTOC_ENV).filter(|p| !p.is_empty()) {
            return Ok(Self::new(path));
        }
        which::which("protoc").map(Self::new).map_err(|err| {
            Error::io(
                "protoc not found on PATH (set PROTOC or skip validation)",
                std::io::Error::new(std::io::ErrorKind::NotFound, err),
            )
        })
    }

    pub fn protoc(&self) -> &Path {
        &self.protoc
    }
}

impl SchemaValidator for ProtocValidator {
    fn validate(&self, proto: &Path) -> Result<()> {
        let (Some(dir), Some(file)) = (proto.parent(), proto.file_name()) else {
            return Err(Error::Validation {
                path: proto.to_path_buf(),
                message: "not a file path".to_string(),
            });
        };
        // Descriptor output is discarded; only the exit status matters.
        let scratch = tempfile::tempdir()
            .map_err(|err| Error::io("Failed to create scratch directory", err))?;

        debug!(protoc = %self.protoc.display(), path = %proto.display(), "Running protoc.");
        let output = Command::new(&self.protoc)
            .arg(format!("--proto_path={}", dir.display()))
            .arg(format!(
                "--descriptor_set_out={}",
                scratch.path().join("schema.pb").display()
            ))
            .arg(file)
            .output()
            .map_err(|err| {
                Error::io(format!("Failed to run {}", self.protoc.display()), err)
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Error::Validation {
                path: proto.to_path_buf(),
                message: stderr.trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_validator_maps_message() {
        let reject = |_: &Path| -> core::result::Result<(), String> { Err("bad field".to_string()) };
        let err = reject.validate(Path::new("/tmp/main.proto")).unwrap_err();
        match err {
            Error::Validation { path, message } => {
                assert_eq!(path, Path::new("/tmp/main.proto"));
                assert_eq!(message, "bad field");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_skip_validation_accepts_anything() {
        assert!(SkipValidation.validate(Path::new("missing.proto")).is_ok());
    }

    #[test]
    fn test_missing_protoc_binary_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let proto = dir.path().join("main.proto");
        std::fs::write(&proto, "syntax = \"proto3\";\n").unwrap();

        let validator = ProtocValidator::new(dir.path().join("no-such-protoc"));
        let err = validator.validate(&proto).unwrap_err();
        assert!(matches!(err, Error::Io { .. }), "got {err}");
    }
}
