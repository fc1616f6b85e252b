// src/proto/mod.rs

//! Protocol schema loading and shape validation
//!
//! Schemas are parsed in-process with the pure-Rust protobuf frontend;
//! read or parse errors are propagated unchanged from it. A schema is
//! only accepted if it defines exactly one service and contains no
//! streaming methods. Streaming methods are not supported; this is a
//! deliberate, permanent restriction of the component model mapping.

use crate::error::{Error, Result};
use protobuf::descriptor::field_descriptor_proto::{Label, Type};
use protobuf::descriptor::{DescriptorProto, FileDescriptorProto};
use std::path::{Path, PathBuf};

/// Package names the component module already uses as import aliases
/// or package identifiers; a schema declaring one would generate
/// colliding Go code
const RESERVED_PACKAGES: &[&str] = &["gen", "impl", "context", "fmt", "errors", "main"];

/// One unary RPC method
#[derive(Debug, Clone)]
pub struct Method {
    /// Go identifier of the method
    pub name: String,
    /// Name as declared in the schema
    pub proto_name: String,
    /// Simple name of the input message
    pub input: String,
    /// Simple name of the output message
    pub output: String,
}

/// The schema's single service
#[derive(Debug, Clone)]
pub struct Service {
    /// Go identifier of the service
    pub name: String,
    /// Name as declared in the schema
    pub proto_name: String,
    pub methods: Vec<Method>,
}

/// One message field, carried with its Go rendering
#[derive(Debug, Clone)]
pub struct Field {
    pub go_name: String,
    pub go_type: String,
}

/// A message declaration
#[derive(Debug, Clone)]
pub struct Message {
    pub name: String,
    pub fields: Vec<Field>,
}

/// A loaded, shape-validated protocol schema
#[derive(Debug, Clone)]
pub struct ProtoSchema {
    /// Absolute path of the schema file
    pub path: PathBuf,
    /// Schema basename without the .proto suffix; names the generated
    /// protocol module
    pub name: String,
    /// Declared proto package, used as the Go package name
    pub package: String,
    pub service: Service,
    pub messages: Vec<Message>,
}

impl ProtoSchema {
    /// Load and validate the schema at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let shape_err = |reason: String| Error::SchemaShape {
            path: path.to_path_buf(),
            reason,
        };

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| shape_err("schema path has no file name".to_string()))?;
        let name = file_name
            .strip_suffix(".proto")
            .ok_or_else(|| shape_err("schema file must have suffix .proto".to_string()))?
            .to_string();

        let include = path.parent().unwrap_or_else(|| Path::new("."));
        let parsed = protobuf_parse::Parser::new()
            .pure()
            .include(include)
            .input(path)
            .parse_and_typecheck()?;

        let descriptor = parsed
            .file_descriptors
            .iter()
            .find(|fd| fd.name() == file_name)
            .ok_or_else(|| shape_err("schema compiler produced no descriptor".to_string()))?;

        Self::from_descriptor(descriptor, path, name)
    }

    fn from_descriptor(fd: &FileDescriptorProto, path: &Path, name: String) -> Result<Self> {
        let shape_err = |reason: String| Error::SchemaShape {
            path: path.to_path_buf(),
            reason,
        };

        let package = fd.package().to_string();
        if package.is_empty() {
            return Err(shape_err("schema must declare a package".to_string()));
        }
        if RESERVED_PACKAGES.contains(&package.as_str()) {
            return Err(shape_err(format!(
                "package name '{package}' collides with an identifier reserved by the generated code"
            )));
        }

        if fd.service.len() != 1 {
            return Err(shape_err(format!(
                "protocol must define a single service, found {}",
                fd.service.len()
            )));
        }
        let svc = &fd.service[0];

        let mut methods = Vec::with_capacity(svc.method.len());
        for method in &svc.method {
            if method.client_streaming() || method.server_streaming() {
                return Err(shape_err(format!(
                    "method {}: streaming methods are not supported",
                    method.name()
                )));
            }
            methods.push(Method {
                name: go_name(method.name()),
                proto_name: method.name().to_string(),
                input: simple_type_name(method.input_type()),
                output: simple_type_name(method.output_type()),
            });
        }

        let messages = fd.message_type.iter().map(convert_message).collect();

        Ok(Self {
            path: path.to_path_buf(),
            name,
            package,
            service: Service {
                name: go_name(svc.name()),
                proto_name: svc.name().to_string(),
                methods,
            },
            messages,
        })
    }

    /// Look up a message by simple name
    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.name == name)
    }
}

/// Generated names are derived from package names; an export and import
/// schema sharing one would collide in the component module
pub fn ensure_distinct(export: &ProtoSchema, import: &ProtoSchema) -> Result<()> {
    if export.package == import.package {
        return Err(Error::SchemaShape {
            path: import.path.clone(),
            reason: format!(
                "import schema shares package '{}' with the export schema",
                import.package
            ),
        });
    }
    Ok(())
}

fn convert_message(msg: &DescriptorProto) -> Message {
    Message {
        name: msg.name().to_string(),
        fields: msg
            .field
            .iter()
            .map(|f| Field {
                go_name: go_name(f.name()),
                go_type: go_type(f),
            })
            .collect(),
    }
}

/// Strip a fully qualified type name (".pkg.Message") to its simple name
fn simple_type_name(qualified: &str) -> String {
    qualified.rsplit('.').next().unwrap_or(qualified).to_string()
}

/// Go rendering of a field type
fn go_type(field: &protobuf::descriptor::FieldDescriptorProto) -> String {
    let base = match field.type_() {
        Type::TYPE_DOUBLE => "float64".to_string(),
        Type::TYPE_FLOAT => "float32".to_string(),
        Type::TYPE_INT64 | Type::TYPE_SFIXED64 | Type::TYPE_SINT64 => "int64".to_string(),
        Type::TYPE_UINT64 | Type::TYPE_FIXED64 => "uint64".to_string(),
        Type::TYPE_INT32 | Type::TYPE_SFIXED32 | Type::TYPE_SINT32 => "int32".to_string(),
        Type::TYPE_UINT32 | Type::TYPE_FIXED32 => "uint32".to_string(),
        Type::TYPE_BOOL => "bool".to_string(),
        Type::TYPE_STRING => "string".to_string(),
        Type::TYPE_BYTES => "[]byte".to_string(),
        // Enums travel as their wire representation
        Type::TYPE_ENUM => "int32".to_string(),
        Type::TYPE_MESSAGE | Type::TYPE_GROUP => {
            format!("*{}", simple_type_name(field.type_name()))
        }
    };
    if field.label() == Label::LABEL_REPEATED {
        format!("[]{base}")
    } else {
        base
    }
}

/// Derive the Go identifier for a proto name: underscore-separated
/// words become capitalized segments
pub fn go_name(proto_name: &str) -> String {
    let mut out = String::with_capacity(proto_name.len());
    let mut capitalize = true;
    for ch in proto_name.chars() {
        if ch == '_' {
            capitalize = true;
            continue;
        }
        if capitalize {
            out.extend(ch.to_uppercase());
            capitalize = false;
        } else {
            out.push(ch);
        }
    }
    out
}
