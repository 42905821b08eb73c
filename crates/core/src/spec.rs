//! Operation spec structs for serde deserialization.
//!
//! This module models the `wrap.yml` document that describes the operations of
//! a wrapped executable. Mappings keep their declaration order, since field
//! tags and emission order are derived from it.

use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Root of the input document.
#[derive(Debug, Default, Deserialize)]
pub struct OperationSpec {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Operations keyed by their user-facing name, in declaration order.
    #[serde(default, deserialize_with = "ordered_map")]
    pub operations: Vec<(String, Operation)>,
}

/// A single executable action, becoming one RPC method.
#[derive(Debug, Default, Deserialize)]
pub struct Operation {
    /// Owning service; `Main` when absent.
    pub service: Option<String>,
    pub description: Option<String>,
    /// REST hints, copied to the metadata document untouched.
    pub rest: Option<serde_yaml::Value>,
    /// Streaming mode; absent or null means [`StreamMode::None`].
    pub stream: Option<StreamMode>,
    #[serde(default, rename = "async")]
    pub is_async: bool,
    #[serde(default, deserialize_with = "ordered_map")]
    pub parameters: Vec<(String, FieldSpec)>,
    #[serde(default, deserialize_with = "ordered_map")]
    pub results: Vec<(String, FieldSpec)>,
}

/// A declared parameter or result.
///
/// `default` is only meaningful for parameters and is ignored on results.
#[derive(Debug, Default, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub description: Option<String>,
    pub default: Option<serde_yaml::Value>,
    pub mime_type: Option<String>,
    /// Location hint (body, header, ...).
    #[serde(rename = "in")]
    pub location: Option<String>,
    /// Raw proto fragment defining a nested message for this field.
    pub proto: Option<String>,
}

/// Streaming mode of an operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamMode {
    #[default]
    None,
    In,
    Out,
    Bi,
}

impl StreamMode {
    /// Whether the request side is a stream.
    pub fn streams_input(self) -> bool {
        matches!(self, StreamMode::In | StreamMode::Bi)
    }

    /// Whether the response side is a stream.
    pub fn streams_output(self) -> bool {
        matches!(self, StreamMode::Out | StreamMode::Bi)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StreamMode::None => "none",
            StreamMode::In => "in",
            StreamMode::Out => "out",
            StreamMode::Bi => "bi",
        }
    }
}

impl Operation {
    pub fn stream_mode(&self) -> StreamMode {
        self.stream.unwrap_or_default()
    }
}

impl OperationSpec {
    /// Parse an operation spec from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        parse(yaml, "<inline>")
    }

    /// Read and parse an operation spec file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|err| Error::io(format!("Failed to read {}", path.display()), err))?;
        parse(&contents, &path.display().to_string())
    }

    /// Whether any operation is asynchronous.
    pub fn has_async(&self) -> bool {
        self.operations.iter().any(|(_, op)| op.is_async)
    }
}

fn parse(yaml: &str, origin: &str) -> Result<OperationSpec> {
    // An empty document is an empty spec, not an error.
    if yaml.trim().is_empty() {
        return Ok(OperationSpec::default());
    }
    serde_yaml::from_str(yaml).map_err(|source| Error::Parse {
        origin: origin.to_string(),
        source,
    })
}

/// Deserialize a mapping into `(key, value)` pairs, keeping document order.
/// A null mapping is treated as empty.
fn ordered_map<'de, D, T>(deserializer: D) -> core::result::Result<Vec<(String, T)>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct OrderedVisitor<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedVisitor<T> {
        type Value = Vec<(String, T)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a mapping")
        }

        fn visit_unit<E: serde::de::Error>(self) -> core::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: serde::de::Error>(self) -> core::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A: MapAccess<'de>>(
            self,
            mut map: A,
        ) -> core::result::Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, T>()? {
                entries.push((key, value));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_any(OrderedVisitor(PhantomData))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_declaration_order() {
        let spec = OperationSpec::from_yaml(
            r"
title: Files
operations:
  zeta:
    parameters:
      second: { type: string }
      first: { type: integer }
  alpha: {}
",
        )
        .unwrap();

        let names: Vec<_> = spec.operations.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha"]);

        let params: Vec<_> = spec.operations[0]
            .1
            .parameters
            .iter()
            .map(|(n, _)| n.as_str())
            .collect();
        assert_eq!(params, ["second", "first"]);
    }

    #[test]
    fn test_null_mappings_are_empty() {
        let spec = OperationSpec::from_yaml(
            r"
operations:
  ping:
    parameters:
    results: ~
",
        )
        .unwrap();
        let (_, op) = &spec.operations[0];
        assert!(op.parameters.is_empty());
        assert!(op.results.is_empty());
        assert_eq!(op.stream_mode(), StreamMode::None);
        assert!(!op.is_async);
    }

    #[test]
    fn test_field_attributes() {
        let spec = OperationSpec::from_yaml(
            r"
operations:
  upload:
    service: Storage
    async: true
    stream: in
    parameters:
      payload:
        type: bytes
        mime_type: application/octet-stream
        in: body
        default: ''
",
        )
        .unwrap();
        let (_, op) = &spec.operations[0];
        assert_eq!(op.service.as_deref(), Some("Storage"));
        assert!(op.is_async);
        assert_eq!(op.stream_mode(), StreamMode::In);
        let (_, payload) = &op.parameters[0];
        assert_eq!(payload.field_type.as_deref(), Some("bytes"));
        assert_eq!(payload.location.as_deref(), Some("body"));
        assert_eq!(
            payload.mime_type.as_deref(),
            Some("application/octet-stream")
        );
        assert!(payload.default.is_some());
    }

    #[test]
    fn test_unknown_stream_mode_is_rejected() {
        let err = OperationSpec::from_yaml("operations:\n  x:\n    stream: sideways\n").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "got {err}");
    }

    #[test]
    fn test_empty_document() {
        let spec = OperationSpec::from_yaml("  \n").unwrap();
        assert!(spec.operations.is_empty());
        assert!(!spec.has_async());
    }
}
