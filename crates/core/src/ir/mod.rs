//! Intermediate representation for operation spec to proto generation.
//!
//! The IR sits between the parsed `wrap.yml` and the emitted artifacts:
//! 1. Normalization: naming rules, collisions, types and message shapes
//! 2. Emission: IR nodes to proto text via the `Emit` trait
//!
//! Every naming decision is made during normalization, so emission is purely
//! mechanical string building and the metadata document can be filled from
//! the same nodes.
//!
//! ## Module Structure
//!
//! - `types`: IR nodes (SchemaIr, MethodIr, MessageIr, FieldIr, FieldType)
//! - `config`: the fixed `Config` message and wrapper-specific extensions
//! - `normalize`: OperationSpec -> SchemaIr conversion
//! - `emit`: IR -> proto text (via Emit trait)
//! - `utils`: identifier case conversion and text helpers

mod config;
mod emit;
mod normalize;
mod types;
pub mod utils;

pub use config::{ConfigField, ConfigMessage, WrapperKind};
pub use emit::{Emit, ProtoWriter};
pub use normalize::{normalize_spec, resolve_field_type};
pub use types::{
    CONFIG_FIELD, CONFIG_MESSAGE, DEFAULT_SERVICE, EMPTY_MESSAGE, FieldIr, FieldOrigin, FieldRole,
    FieldType, INVOCATION_MESSAGE, INVOCATION_REF_MESSAGE, MessageIr, MessageLayout, MethodIr,
    OPERATIONS_SERVICE, Primitive, ResultsIr, SchemaIr,
};
