//! Error types for schema generation.
//!
//! Every variant is fatal for the run. Normalization errors surface before
//! anything is written, so a failed run never leaves a half-written artifact
//! pair behind.

use std::path::PathBuf;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the generator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The operation spec uses a name the generator keeps for itself.
    #[error("{subject} uses the reserved name \"{name}\"")]
    ReservedName { subject: String, name: String },

    /// Two user-declared names normalize to the same generated identifier.
    #[error("{subject} translates to \"{identifier}\", which is already used by {existing}")]
    Collision {
        subject: String,
        identifier: String,
        existing: String,
    },

    /// A name normalizes to something that is not a usable proto identifier.
    #[error("{subject} translates to \"{identifier}\", which is not a valid identifier")]
    InvalidName { subject: String, identifier: String },

    /// A streamed message field whose type proto does not allow in a `oneof`.
    #[error("{subject} has type \"{field_type}\", which cannot be part of the streamed `oneof {oneof}`")]
    OneofField {
        subject: String,
        field_type: String,
        oneof: &'static str,
    },

    /// The emitted schema was rejected by the schema loader.
    #[error("generated schema {path} was rejected: {message}")]
    Validation { path: PathBuf, message: String },

    /// Reading the input or writing an output artifact failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The input document is not a valid operation spec.
    #[error("failed to parse operation spec {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The metadata document could not be serialized.
    #[error("failed to serialize metadata: {0}")]
    Metadata(#[source] serde_yaml::Error),
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
