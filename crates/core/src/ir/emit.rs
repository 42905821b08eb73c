//! Proto text emission via the Emit trait.
//!
//! Each IR node that maps to a proto declaration implements `Emit` and writes
//! itself into a [`ProtoWriter`], which owns the output buffer and the current
//! indentation.

use super::config::ConfigMessage;
use super::types::{CONFIG_MESSAGE, FieldIr, MessageIr, MessageLayout};
use super::utils::dedent;

const INDENT: &str = "  ";

/// Line-oriented output buffer for proto text.
#[derive(Debug, Default)]
pub struct ProtoWriter {
    out: String,
    depth: usize,
}

impl ProtoWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line at the current indentation. Empty lines carry no
    /// trailing whitespace.
    pub fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.out.push_str(INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Append every line of a text block verbatim at the current indentation.
    pub fn block(&mut self, text: &str) {
        for line in text.lines() {
            self.line(line);
        }
    }

    /// Open a `{` block and indent what follows.
    pub fn open(&mut self, header: &str) {
        self.line(&format!("{header} {{"));
        self.depth += 1;
    }

    /// Close the innermost block.
    pub fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Trait for writing IR nodes as proto declarations.
pub trait Emit {
    fn emit(&self, out: &mut ProtoWriter);
}

impl Emit for FieldIr {
    fn emit(&self, out: &mut ProtoWriter) {
        out.line(&format!(
            "{} {} = {};",
            self.ty.proto_type(),
            self.name,
            self.tag
        ));
    }
}

impl Emit for MessageIr {
    fn emit(&self, out: &mut ProtoWriter) {
        out.open(&format!("message {}", self.name));

        // Nested types stay at message level: proto does not allow message
        // declarations inside a oneof.
        for (name, body) in self.nested_types() {
            out.open(&format!("message {name}"));
            for line in dedent(body) {
                out.line(line);
            }
            out.close();
        }

        match self.layout {
            MessageLayout::Flat => {
                for field in &self.fields {
                    field.emit(out);
                }
            }
            MessageLayout::OneOf(name) => {
                out.open(&format!("oneof {name}"));
                for field in &self.fields {
                    field.emit(out);
                }
                out.close();
            }
        }

        out.close();
        out.blank();
    }
}

impl Emit for ConfigMessage {
    fn emit(&self, out: &mut ProtoWriter) {
        out.open(&format!("message {CONFIG_MESSAGE}"));
        for field in &self.fields {
            out.line(&format!("{} {} = {};", field.ty, field.name, field.tag));
        }
        out.close();
        out.blank();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ir::config::WrapperKind;
    use crate::ir::types::{FieldType, Primitive};

    fn field(name: &str, tag: u32, ty: FieldType) -> FieldIr {
        FieldIr {
            name: name.to_string(),
            tag,
            ty,
            origin: None,
        }
    }

    #[test]
    fn test_writer_indentation() {
        let mut out = ProtoWriter::new();
        out.open("message A");
        out.line("string a = 1;");
        out.line("");
        out.open("oneof b");
        out.line("bool c = 2;");
        out.close();
        out.close();
        assert_eq!(
            out.finish(),
            "message A {\n  string a = 1;\n\n  oneof b {\n    bool c = 2;\n  }\n}\n"
        );
    }

    #[test]
    fn test_flat_message() {
        let message = MessageIr {
            name: "RunParameters".to_string(),
            layout: MessageLayout::Flat,
            fields: vec![
                field("config", 1, FieldType::Named("Config".to_string())),
                field("count", 2, FieldType::Primitive(Primitive::Integer)),
            ],
        };
        let mut out = ProtoWriter::new();
        message.emit(&mut out);
        assert_eq!(
            out.finish(),
            "message RunParameters {\n  Config config = 1;\n  int64 count = 2;\n}\n\n"
        );
    }

    #[test]
    fn test_oneof_message_with_nested_type() {
        let message = MessageIr {
            name: "UploadParameters".to_string(),
            layout: MessageLayout::OneOf("input"),
            fields: vec![
                field("config", 1, FieldType::Named("Config".to_string())),
                field(
                    "file_info",
                    2,
                    FieldType::Nested {
                        name: "File_info".to_string(),
                        body: "\n      string name = 1;\n      int64 size = 2;\n".to_string(),
                    },
                ),
            ],
        };
        let mut out = ProtoWriter::new();
        message.emit(&mut out);
        assert_eq!(
            out.finish(),
            "message UploadParameters {\n\
             \x20 message File_info {\n\
             \x20   string name = 1;\n\
             \x20   int64 size = 2;\n\
             \x20 }\n\
             \x20 oneof input {\n\
             \x20   Config config = 1;\n\
             \x20   File_info file_info = 2;\n\
             \x20 }\n\
             }\n\n"
        );
    }

    #[test]
    fn test_config_message() {
        let mut out = ProtoWriter::new();
        ConfigMessage::for_wrapper(WrapperKind::Python).emit(&mut out);
        let text = out.finish();
        assert!(text.starts_with("message Config {\n  map<string, string> env = 10;\n"));
        assert!(text.contains("  repeated string exclude_results = 200;\n"));
        assert!(text.contains("  bool py_install_requirements = 303;\n}\n"));
    }
}
