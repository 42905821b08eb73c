//! Normalized intermediate representation.
//!
//! This module defines what the normalizer hands to the emitter:
//! - SchemaIr: the whole generation run
//! - MethodIr: one RPC method with its request/response messages
//! - MessageIr / FieldIr: generated messages and their fields
//! - FieldType: the resolved wire type of a field

use crate::spec::StreamMode;

use super::config::ConfigMessage;

/// Name of the execution configuration message.
pub const CONFIG_MESSAGE: &str = "Config";
/// Field carrying the configuration in every parameters message.
pub const CONFIG_FIELD: &str = "config";
/// Fixed return type of operations without results.
pub const EMPTY_MESSAGE: &str = "Empty";
/// Fixed return type of async operations.
pub const INVOCATION_MESSAGE: &str = "Invocation";
/// Request type of the async status-polling service.
pub const INVOCATION_REF_MESSAGE: &str = "InvocationRef";
/// Service that tracks async invocations.
pub const OPERATIONS_SERVICE: &str = "Operations";
/// Service used when an operation does not name one.
pub const DEFAULT_SERVICE: &str = "Main";

/// Primitive types with a fixed proto mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl Primitive {
    /// Look up a declared type name in the primitive table.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "integer" => Some(Primitive::Integer),
            "number" => Some(Primitive::Number),
            "boolean" => Some(Primitive::Boolean),
            "object" => Some(Primitive::Object),
            "array" => Some(Primitive::Array),
            _ => None,
        }
    }

    pub fn proto_type(self) -> &'static str {
        match self {
            Primitive::Integer => "int64",
            Primitive::Number => "double",
            Primitive::Boolean => "bool",
            Primitive::Object => "map<string, google.protobuf.Any>",
            Primitive::Array => "repeated google.protobuf.Any",
        }
    }
}

/// Resolved type of a generated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Mapped through the primitive table.
    Primitive(Primitive),
    /// Nested message synthesized from an inline proto fragment.
    Nested { name: String, body: String },
    /// Any other type name, passed through verbatim.
    Named(String),
}

impl FieldType {
    /// Type expression as written in the field declaration.
    pub fn proto_type(&self) -> &str {
        match self {
            FieldType::Primitive(p) => p.proto_type(),
            FieldType::Nested { name, .. } => name,
            FieldType::Named(name) => name,
        }
    }

    /// Whether the field may sit inside a `oneof`: repeated and map fields
    /// may not.
    pub fn allowed_in_oneof(&self) -> bool {
        match self {
            FieldType::Primitive(p) => !matches!(p, Primitive::Array | Primitive::Object),
            FieldType::Nested { .. } => true,
            FieldType::Named(name) => {
                let name = name.trim_start();
                !(name.split_whitespace().next() == Some("repeated")
                    || name.starts_with("map<")
                    || name.starts_with("map <"))
            }
        }
    }
}

/// Which side of a method a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Parameter,
    Result,
}

impl FieldRole {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldRole::Parameter => "parameter",
            FieldRole::Result => "result",
        }
    }
}

/// User-facing attributes of a declared field, kept for the metadata document.
#[derive(Debug, Clone)]
pub struct FieldOrigin {
    pub role: FieldRole,
    /// Name as written in wrap.yml (e.g. "filePattern")
    pub original_name: String,
    pub description: Option<String>,
    /// Always `None` for results
    pub default: Option<serde_yaml::Value>,
    pub mime_type: Option<String>,
    pub location: Option<String>,
}

/// A generated message field.
#[derive(Debug, Clone)]
pub struct FieldIr {
    /// snake_case identifier (e.g. "file_pattern")
    pub name: String,
    pub tag: u32,
    pub ty: FieldType,
    /// `None` for generator-owned fields (the `config` field)
    pub origin: Option<FieldOrigin>,
}

/// How the fields of a message are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLayout {
    /// Plain field list.
    Flat,
    /// All fields wrapped in a `oneof` with the given name.
    OneOf(&'static str),
}

/// A generated request or response message.
#[derive(Debug, Clone)]
pub struct MessageIr {
    /// Message name (e.g. "ListFilesParameters")
    pub name: String,
    pub layout: MessageLayout,
    pub fields: Vec<FieldIr>,
}

impl MessageIr {
    /// Nested message definitions carried by this message's fields.
    pub fn nested_types(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().filter_map(|f| match &f.ty {
            FieldType::Nested { name, body } => Some((name.as_str(), body.as_str())),
            _ => None,
        })
    }
}

/// What a method returns.
#[derive(Debug, Clone)]
pub enum ResultsIr {
    /// A generated results message.
    Message(MessageIr),
    /// No declared results: the fixed `Empty` type.
    Empty,
    /// Async: returns `Invocation`; results are normalized for metadata only.
    Async(Vec<FieldIr>),
}

impl ResultsIr {
    /// Name of the message the RPC returns.
    pub fn type_name(&self) -> &str {
        match self {
            ResultsIr::Message(message) => &message.name,
            ResultsIr::Empty => EMPTY_MESSAGE,
            ResultsIr::Async(_) => INVOCATION_MESSAGE,
        }
    }
}

/// A normalized operation.
#[derive(Debug, Clone)]
pub struct MethodIr {
    /// PascalCase identifier (e.g. "ListFiles")
    pub name: String,
    /// Owning service
    pub service: String,
    /// Operation name as written in wrap.yml (e.g. "list_files")
    pub operation_name: String,
    pub description: Option<String>,
    pub rest: Option<serde_yaml::Value>,
    pub stream: StreamMode,
    pub is_async: bool,
    pub parameters: MessageIr,
    pub results: ResultsIr,
}

impl MethodIr {
    /// Whether the request side is streamed.
    pub fn streams_request(&self) -> bool {
        self.stream.streams_input()
    }

    /// Whether the response side is streamed. Async methods always return a
    /// single invocation handle.
    pub fn streams_response(&self) -> bool {
        !self.is_async && self.stream.streams_output()
    }

    /// Fully qualified key used in the metadata document (e.g. "Main.ListFiles").
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.service, self.name)
    }
}

/// Normalized result of one generation run.
#[derive(Debug)]
pub struct SchemaIr {
    pub title: Option<String>,
    pub description: Option<String>,
    pub config: ConfigMessage,
    /// Methods in declaration order
    pub methods: Vec<MethodIr>,
    /// Services in the order they were first encountered
    pub services: Vec<String>,
    /// Whether any method is async
    pub has_async: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_in_oneof() {
        assert!(FieldType::Primitive(Primitive::Integer).allowed_in_oneof());
        assert!(!FieldType::Primitive(Primitive::Array).allowed_in_oneof());
        assert!(!FieldType::Primitive(Primitive::Object).allowed_in_oneof());
        assert!(FieldType::Named("bytes".to_string()).allowed_in_oneof());
        assert!(FieldType::Named("repeatedly".to_string()).allowed_in_oneof());
        assert!(!FieldType::Named("repeated bytes".to_string()).allowed_in_oneof());
        assert!(!FieldType::Named("map<string, string>".to_string()).allowed_in_oneof());
        assert!(
            FieldType::Nested {
                name: "Info".to_string(),
                body: "string a = 1;".to_string()
            }
            .allowed_in_oneof()
        );
    }
}
