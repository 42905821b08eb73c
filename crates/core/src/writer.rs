//! Artifact writing.
//!
//! Both files are staged in a temporary directory next to their destination,
//! the staged proto is validated, and only then are the files renamed into
//! place. A rejected schema leaves the output directory untouched.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::emitter::Artifacts;
use crate::error::{Error, Result};
use crate::validate::SchemaValidator;

/// Input document name inside the wrap directory.
pub const WRAP_FILE: &str = "wrap.yml";
/// Interface definition name inside the API directory.
pub const PROTO_FILE: &str = "main.proto";
/// Metadata document name inside the API directory.
pub const META_FILE: &str = "meta.yml";

/// Paths of the written artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub proto: PathBuf,
    pub metadata: PathBuf,
}

/// Validate and write both artifacts into `api_dir`, creating it if needed.
///
/// Each file is replaced by a rename, but the pair is not: if moving
/// `meta.yml` fails after `main.proto` was moved, the new proto sits next to
/// the previous metadata.
pub fn write_artifacts(
    api_dir: &Path,
    artifacts: &Artifacts,
    validator: &dyn SchemaValidator,
) -> Result<WrittenArtifacts> {
    fs::create_dir_all(api_dir)
        .map_err(|err| Error::io(format!("Failed to create {}", api_dir.display()), err))?;

    // Staged inside api_dir so the final rename never crosses filesystems.
    let staging = tempfile::Builder::new()
        .prefix(".protowrap-")
        .tempdir_in(api_dir)
        .map_err(|err| Error::io("Failed to create staging directory", err))?;

    let staged_proto = staging.path().join(PROTO_FILE);
    let staged_meta = staging.path().join(META_FILE);
    write_file(&staged_proto, &artifacts.proto)?;
    write_file(&staged_meta, &artifacts.metadata)?;

    validator.validate(&staged_proto)?;
    debug!(path = %staged_proto.display(), "Schema validated.");

    let written = WrittenArtifacts {
        proto: api_dir.join(PROTO_FILE),
        metadata: api_dir.join(META_FILE),
    };
    rename(&staged_proto, &written.proto)?;
    rename(&staged_meta, &written.metadata)?;

    info!(
        proto = %written.proto.display(),
        metadata = %written.metadata.display(),
        "Wrote artifacts."
    );
    Ok(written)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)
        .map_err(|err| Error::io(format!("Failed to write {}", path.display()), err))
}

fn rename(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to)
        .map_err(|err| Error::io(format!("Failed to move artifact to {}", to.display()), err))
}
