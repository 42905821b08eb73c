//! Normalization from operation spec to IR.
//!
//! This module handles all the naming and validation rules:
//! - Service grouping and reserved names
//! - Method and field identifier derivation
//! - Collision detection across methods, fields and top-level proto names
//! - Field type resolution and streaming/async message shapes
//!
//! Normalization is all-or-nothing: the first violation aborts the run.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::spec::{FieldSpec, Operation, OperationSpec};

use super::config::{ConfigMessage, WrapperKind};
use super::types::{
    CONFIG_FIELD, CONFIG_MESSAGE, DEFAULT_SERVICE, EMPTY_MESSAGE, FieldIr, FieldOrigin, FieldRole,
    FieldType, INVOCATION_MESSAGE, INVOCATION_REF_MESSAGE, MessageIr, MessageLayout, MethodIr,
    OPERATIONS_SERVICE, Primitive, ResultsIr, SchemaIr,
};
use super::utils::{capitalize_first, is_proto_identifier, to_pascal_case, to_snake_case};

/// Top-level names emitted by the generator itself.
const FIXED_TYPES: [&str; 4] = [
    CONFIG_MESSAGE,
    EMPTY_MESSAGE,
    INVOCATION_MESSAGE,
    INVOCATION_REF_MESSAGE,
];

/// First tag of a parameters message; tag 1 is the `config` field.
const FIRST_PARAMETER_TAG: u32 = 2;
const FIRST_RESULT_TAG: u32 = 1;

/// Proto top-level names (messages and services share one namespace),
/// mapped to a description of their owner for error messages.
#[derive(Debug, Default)]
struct SymbolTable {
    owners: HashMap<String, String>,
}

impl SymbolTable {
    fn claim(&mut self, name: &str, owner: String, subject: impl FnOnce() -> String) -> Result<()> {
        if let Some(existing) = self.owners.get(name) {
            return Err(Error::Collision {
                subject: subject(),
                identifier: name.to_string(),
                existing: existing.clone(),
            });
        }
        self.owners.insert(name.to_string(), owner);
        Ok(())
    }
}

/// Normalize an operation spec into IR.
pub fn normalize_spec(spec: &OperationSpec, wrapper: WrapperKind) -> Result<SchemaIr> {
    let mut symbols = SymbolTable::default();
    let mut methods = Vec::with_capacity(spec.operations.len());
    let mut services: Vec<String> = Vec::new();
    // (service, method) -> operation that claimed it
    let mut method_owners: HashMap<(String, String), &str> = HashMap::new();

    for (op_name, op) in &spec.operations {
        let service = resolve_service(op_name, op)?;
        if !services.contains(&service) {
            symbols.claim(&service, format!("service \"{service}\""), || {
                format!("service \"{service}\" of operation \"{op_name}\"")
            })?;
            services.push(service.clone());
        }

        let method_name = to_pascal_case(op_name);
        if !is_proto_identifier(&method_name) {
            return Err(Error::InvalidName {
                subject: format!("operation \"{op_name}\""),
                identifier: method_name,
            });
        }

        let key = (service.clone(), method_name.clone());
        if let Some(existing) = method_owners.get(&key) {
            return Err(Error::Collision {
                subject: format!("operation \"{op_name}\""),
                identifier: format!("{service}.{method_name}"),
                existing: format!("operation \"{existing}\""),
            });
        }
        method_owners.insert(key, op_name);

        let method = normalize_operation(op_name, op, service, method_name, &mut symbols)?;
        trace!(
            method = %method.qualified_name(),
            operation = %op_name,
            "Normalized operation."
        );
        methods.push(method);
    }

    debug!(
        methods = methods.len(),
        services = services.len(),
        "Normalized operation spec."
    );

    Ok(SchemaIr {
        title: spec.title.clone(),
        description: spec.description.clone(),
        config: ConfigMessage::for_wrapper(wrapper),
        has_async: methods.iter().any(|m| m.is_async),
        methods,
        services,
    })
}

/// Resolve and check the owning service of an operation.
fn resolve_service(op_name: &str, op: &Operation) -> Result<String> {
    let Some(service) = op.service.as_deref() else {
        return Ok(DEFAULT_SERVICE.to_string());
    };
    let subject = || format!("service of operation \"{op_name}\"");

    if service == OPERATIONS_SERVICE || FIXED_TYPES.contains(&service) {
        return Err(Error::ReservedName {
            subject: subject(),
            name: service.to_string(),
        });
    }
    if !is_proto_identifier(service) {
        return Err(Error::InvalidName {
            subject: subject(),
            identifier: service.to_string(),
        });
    }
    Ok(service.to_string())
}

fn normalize_operation(
    op_name: &str,
    op: &Operation,
    service: String,
    method_name: String,
    symbols: &mut SymbolTable,
) -> Result<MethodIr> {
    let stream = op.stream_mode();
    let owner = format!("operation \"{op_name}\"");

    // Parameters: config is always tag 1, declared parameters follow.
    let params_name = format!("{method_name}Parameters");
    symbols.claim(&params_name, owner.clone(), || owner.clone())?;

    let mut param_fields = vec![FieldIr {
        name: CONFIG_FIELD.to_string(),
        tag: 1,
        ty: FieldType::Named(CONFIG_MESSAGE.to_string()),
        origin: None,
    }];
    let input_oneof = stream.streams_input().then_some("input");
    param_fields.extend(normalize_fields(
        op_name,
        FieldRole::Parameter,
        &op.parameters,
        FIRST_PARAMETER_TAG,
        input_oneof,
    )?);

    let parameters = MessageIr {
        name: params_name,
        layout: input_oneof.map_or(MessageLayout::Flat, MessageLayout::OneOf),
        fields: param_fields,
    };

    // Async results never become a message, so they are not streamed.
    let output_oneof = (!op.is_async && stream.streams_output()).then_some("output");
    let result_fields = normalize_fields(
        op_name,
        FieldRole::Result,
        &op.results,
        FIRST_RESULT_TAG,
        output_oneof,
    )?;
    let results = if op.is_async {
        ResultsIr::Async(result_fields)
    } else if result_fields.is_empty() {
        ResultsIr::Empty
    } else {
        let results_name = format!("{method_name}Results");
        symbols.claim(&results_name, owner.clone(), || owner.clone())?;
        ResultsIr::Message(MessageIr {
            name: results_name,
            layout: output_oneof.map_or(MessageLayout::Flat, MessageLayout::OneOf),
            fields: result_fields,
        })
    };

    Ok(MethodIr {
        name: method_name,
        service,
        operation_name: op_name.to_string(),
        description: op.description.clone(),
        rest: op.rest.clone(),
        stream,
        is_async: op.is_async,
        parameters,
        results,
    })
}

/// Normalize the declared parameters or results of one operation.
///
/// `oneof` names the block the fields are wrapped in when the side is
/// streamed.
fn normalize_fields(
    op_name: &str,
    role: FieldRole,
    entries: &[(String, FieldSpec)],
    first_tag: u32,
    oneof: Option<&'static str>,
) -> Result<Vec<FieldIr>> {
    // field identifier -> declared name
    let mut taken: HashMap<String, &str> = HashMap::new();
    let mut fields = Vec::with_capacity(entries.len());
    let mut tag = first_tag;

    for (name, spec) in entries {
        let subject = || format!("{} \"{name}\" of operation \"{op_name}\"", role.as_str());
        let field_name = to_snake_case(name);

        if !is_proto_identifier(&field_name) {
            return Err(Error::InvalidName {
                subject: subject(),
                identifier: field_name,
            });
        }
        if role == FieldRole::Parameter && field_name == CONFIG_FIELD {
            return Err(Error::ReservedName {
                subject: subject(),
                name: field_name,
            });
        }
        if let Some(existing) = taken.get(field_name.as_str()) {
            return Err(Error::Collision {
                subject: subject(),
                identifier: field_name,
                existing: format!("{} \"{existing}\"", role.as_str()),
            });
        }
        taken.insert(field_name.clone(), name);

        let ty = resolve_field_type(&field_name, spec);
        if let Some(oneof) = oneof
            && !ty.allowed_in_oneof()
        {
            return Err(Error::OneofField {
                subject: subject(),
                field_type: ty.proto_type().to_string(),
                oneof,
            });
        }

        fields.push(FieldIr {
            ty,
            tag,
            origin: Some(FieldOrigin {
                role,
                original_name: name.clone(),
                description: spec.description.clone(),
                default: match role {
                    FieldRole::Parameter => spec.default.clone(),
                    FieldRole::Result => None,
                },
                mime_type: spec.mime_type.clone(),
                location: spec.location.clone(),
            }),
            name: field_name,
        });
        tag += 1;
    }

    Ok(fields)
}

/// Resolve the wire type of a declared field.
///
/// An inline proto fragment wins over the declared type; otherwise the
/// primitive table applies, and anything else passes through verbatim.
pub fn resolve_field_type(field_name: &str, spec: &FieldSpec) -> FieldType {
    if let Some(body) = spec.proto.as_deref().filter(|p| !p.trim().is_empty()) {
        return FieldType::Nested {
            name: capitalize_first(field_name),
            body: body.to_string(),
        };
    }

    let declared = spec.field_type.as_deref().map(str::trim).unwrap_or("string");
    match Primitive::from_type_name(declared) {
        Some(primitive) => FieldType::Primitive(primitive),
        None => FieldType::Named(declared.to_string()),
    }
}
