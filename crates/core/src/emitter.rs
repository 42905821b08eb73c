//! Proto and metadata emitter.
//!
//! The pipeline is:
//! 1. Parse: wrap.yml -> OperationSpec
//! 2. Normalize: OperationSpec -> SchemaIr (all naming rules resolved)
//! 3. Emit: SchemaIr -> proto text + metadata document, in one traversal
//!
//! Both artifacts are filled from the same walk so that every documented
//! identifier is one the proto declares.

use tracing::debug;

use crate::error::Result;
use crate::ir::{Emit, MethodIr, ProtoWriter, ResultsIr, SchemaIr, WrapperKind, normalize_spec};
use crate::meta::{MessageMeta, MetaDocument, MethodMeta, field_map};
use crate::spec::OperationSpec;

const HEAD_TEMPLATE: &str = include_str!("templates/head.proto");
const ASYNC_TEMPLATE: &str = include_str!("templates/async.proto");

/// The two generated artifacts of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    /// Interface definition (`main.proto`)
    pub proto: String,
    /// Metadata document (`meta.yml`)
    pub metadata: String,
}

/// Generate both artifacts from a parsed spec.
pub fn generate(spec: &OperationSpec, wrapper: WrapperKind) -> Result<Artifacts> {
    let ir = normalize_spec(spec, wrapper)?;
    emit(&ir)
}

/// Emit both artifacts from normalized IR.
pub fn emit(ir: &SchemaIr) -> Result<Artifacts> {
    let mut emitter = Emitter::new(ir);
    for method in &ir.methods {
        emitter.method(method);
    }
    emitter.finish()
}

/// Accumulates proto text, per-service RPC lines and metadata for one run.
#[derive(Debug)]
struct Emitter {
    proto: ProtoWriter,
    /// (service, rpc lines) in first-encounter order
    services: Vec<(String, Vec<String>)>,
    meta: MetaDocument,
}

impl Emitter {
    fn new(ir: &SchemaIr) -> Self {
        let mut proto = ProtoWriter::new();
        proto.block(HEAD_TEMPLATE);
        if ir.has_async {
            proto.block(ASYNC_TEMPLATE);
        }
        ir.config.emit(&mut proto);

        Self {
            proto,
            services: ir
                .services
                .iter()
                .map(|service| (service.clone(), Vec::new()))
                .collect(),
            meta: MetaDocument {
                title: ir.title.clone(),
                description: ir.description.clone(),
                ..MetaDocument::default()
            },
        }
    }

    fn method(&mut self, method: &MethodIr) {
        debug!(
            method = %method.qualified_name(),
            stream = method.stream.as_str(),
            is_async = method.is_async,
            "Emitting method."
        );

        method.parameters.emit(&mut self.proto);
        self.meta.messages.insert(
            method.parameters.name.clone(),
            MessageMeta {
                fields: field_map(&method.parameters.fields),
            },
        );

        let mut method_meta = MethodMeta::new(method);
        match &method.results {
            ResultsIr::Message(message) => {
                message.emit(&mut self.proto);
                self.meta.messages.insert(
                    message.name.clone(),
                    MessageMeta {
                        fields: field_map(&message.fields),
                    },
                );
            }
            ResultsIr::Async(fields) => {
                method_meta.async_results = Some(field_map(fields));
            }
            ResultsIr::Empty => {}
        }

        self.register_rpc(method);
        self.meta
            .services
            .entry(&method.service)
            .methods
            .push(method.name.clone());
        self.meta
            .methods
            .insert(method.qualified_name(), method_meta);
    }

    fn register_rpc(&mut self, method: &MethodIr) {
        let request = if method.streams_request() { "stream " } else { "" };
        let response = if method.streams_response() { "stream " } else { "" };
        let line = format!(
            "rpc {}({request}{}) returns ({response}{}) {{}}",
            method.name,
            method.parameters.name,
            method.results.type_name()
        );

        match self.services.iter_mut().find(|(name, _)| *name == method.service) {
            Some((_, lines)) => lines.push(line),
            None => self.services.push((method.service.clone(), vec![line])),
        }
    }

    fn finish(mut self) -> Result<Artifacts> {
        for (service, lines) in &self.services {
            self.proto.open(&format!("service {service}"));
            for line in lines {
                self.proto.line(line);
            }
            self.proto.close();
            self.proto.blank();
        }

        Ok(Artifacts {
            proto: self.proto.finish(),
            metadata: self.meta.to_yaml()?,
        })
    }
}
