// src/codegen/mod.rs

//! Go source generation for protocol and component modules
//!
//! Three generated surfaces: message types and RPC stubs for each
//! protocol module, and the component adapter that bridges the module
//! implementation to the native bindings. All output is deterministic
//! for a given schema; nothing here touches the filesystem.

pub mod component;
pub mod grpc;
pub mod types;
mod writer;

/// Options shared by the stub generators
#[derive(Debug, Clone, Default)]
pub struct CodegenConfig {
    /// Emit the mustEmbed guard forcing server implementations to embed
    /// the Unimplemented struct
    pub require_unimplemented: bool,
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use crate::proto::{Field, Message, Method, ProtoSchema, Service};
    use std::path::PathBuf;

    fn field(go_name: &str, go_type: &str) -> Field {
        Field {
            go_name: go_name.to_string(),
            go_type: go_type.to_string(),
        }
    }

    fn message(name: &str, fields: Vec<Field>) -> Message {
        Message {
            name: name.to_string(),
            fields,
        }
    }

    /// The canonical greeter schema: Greeter.SayHello(HelloRequest) ->
    /// HelloReply, one string field each
    pub fn helloworld() -> ProtoSchema {
        ProtoSchema {
            path: PathBuf::from("/fixtures/helloworld.proto"),
            name: "helloworld".to_string(),
            package: "helloworld".to_string(),
            service: Service {
                name: "Greeter".to_string(),
                proto_name: "Greeter".to_string(),
                methods: vec![Method {
                    name: "SayHello".to_string(),
                    proto_name: "SayHello".to_string(),
                    input: "HelloRequest".to_string(),
                    output: "HelloReply".to_string(),
                }],
            },
            messages: vec![
                message("HelloRequest", vec![field("Name", "string")]),
                message("HelloReply", vec![field("Message", "string")]),
            ],
        }
    }

    /// An import-side schema: Producer.Produce(ProduceRequest) ->
    /// ProduceReply
    pub fn prodcon() -> ProtoSchema {
        ProtoSchema {
            path: PathBuf::from("/fixtures/prodcon.proto"),
            name: "prodcon".to_string(),
            package: "prodcon".to_string(),
            service: Service {
                name: "Producer".to_string(),
                proto_name: "Producer".to_string(),
                methods: vec![Method {
                    name: "Produce".to_string(),
                    proto_name: "Produce".to_string(),
                    input: "ProduceRequest".to_string(),
                    output: "ProduceReply".to_string(),
                }],
            },
            messages: vec![
                message("ProduceRequest", vec![field("Value", "int32")]),
                message("ProduceReply", vec![field("Ok", "bool")]),
            ],
        }
    }
}
