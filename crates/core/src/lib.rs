//! Generates a gRPC interface definition and a metadata document from the
//! operation spec (`wrap.yml`) of a wrapped command-line executable.
//!
//! The proto declares one RPC method per operation; the metadata document
//! maps every generated identifier back to the user-authored name and its
//! annotations, so downstream tools can present wire payloads in terms of
//! the operation spec.

pub mod emitter;
pub mod error;
pub mod ir;
pub mod meta;
pub mod spec;
pub mod validate;
pub mod writer;

use std::path::PathBuf;

use tracing::{debug, info};

pub use emitter::{Artifacts, generate};
pub use error::{Error, Result};
pub use ir::WrapperKind;
pub use spec::OperationSpec;
pub use validate::{PROTOC_ENV, ProtocValidator, SchemaValidator, SkipValidation};
pub use writer::{META_FILE, PROTO_FILE, WRAP_FILE, WrittenArtifacts, write_artifacts};

/// Environment variable naming the input directory.
pub const WRAP_DIR_ENV: &str = "WRAP_DIR";
/// Environment variable naming the output directory.
pub const API_DIR_ENV: &str = "API_DIR";
/// Environment variable selecting the wrapper adapter.
pub const WRAPPER_ENV: &str = "WRAPPER";

pub const DEFAULT_WRAP_DIR: &str = "/wrap";
pub const DEFAULT_API_DIR: &str = "/api";

/// Inputs of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Directory holding `wrap.yml`
    pub wrap_dir: PathBuf,
    /// Directory receiving `main.proto` and `meta.yml`
    pub api_dir: PathBuf,
    pub wrapper: WrapperKind,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            wrap_dir: PathBuf::from(DEFAULT_WRAP_DIR),
            api_dir: PathBuf::from(DEFAULT_API_DIR),
            wrapper: WrapperKind::Generic,
        }
    }
}

impl GenerateOptions {
    pub fn spec_path(&self) -> PathBuf {
        self.wrap_dir.join(WRAP_FILE)
    }
}

/// Run the whole pipeline: read `wrap.yml`, generate, validate and write.
///
/// Nothing is written unless generation and validation both succeed.
pub fn generate_api(
    options: &GenerateOptions,
    validator: &dyn SchemaValidator,
) -> Result<WrittenArtifacts> {
    let spec_path = options.spec_path();
    debug!(
        spec = %spec_path.display(),
        wrapper = ?options.wrapper,
        "Loading operation spec."
    );
    let spec = OperationSpec::load(&spec_path)?;
    if spec.operations.is_empty() {
        info!(spec = %spec_path.display(), "Operation spec declares no operations.");
    }
    debug!(
        operations = spec.operations.len(),
        has_async = spec.has_async(),
        "Parsed operation spec."
    );

    let artifacts = generate(&spec, options.wrapper)?;
    write_artifacts(&options.api_dir, &artifacts, validator)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_use_container_layout() {
        let options = GenerateOptions::default();
        assert_eq!(options.spec_path(), PathBuf::from("/wrap/wrap.yml"));
        assert_eq!(options.api_dir, PathBuf::from("/api"));
        assert_eq!(options.wrapper, WrapperKind::Generic);
    }
}
