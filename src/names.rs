// src/names.rs

//! Fixed module identities for the generated hierarchy
//!
//! Every module the transformation produces is addressed by a stable,
//! hierarchical name. The implementation package is always renamed to
//! `weld/application/impl`, generated protocol modules live under
//! `weld/proto/`, and the component glue module is
//! `weld/application/component`. The gRPC stub modules are external Go
//! modules that stand in for the real gRPC runtime inside a component.

use std::fmt;

/// Base path for application modules (impl and component)
pub const APP_BASE: &str = "weld/application";

/// Base path for generated protocol modules
pub const PROTO_BASE: &str = "weld/proto";

/// Identity the implementation package is renamed to
pub const IMPL_MODULE: &str = "weld/application/impl";

/// Identity of the generated component glue module
pub const COMPONENT_MODULE: &str = "weld/application/component";

/// Import path of the generated native bindings inside the component
pub const BINDINGS_PACKAGE: &str = "weld/application/component/gen";

/// Stub module that replaces google.golang.org/grpc
pub const GRPC_STUB: &str = "weld.dev/stubs/grpc";

/// The gRPC runtime import the stub replaces
pub const GRPC_IMPORT: &str = "google.golang.org/grpc";

/// The protobuf runtime import, dropped with no substitute
pub const PROTOBUF_IMPORT: &str = "google.golang.org/protobuf";

/// File name of the side-channel metadata next to the module's go.mod
pub const METADATA_FILE: &str = "weld_metadata.yaml";

/// Prefix for identifiers exported by the native bindings
pub const BINDINGS_IDENT_PREFIX: &str = "WeldApplication";

/// A hierarchical module identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleName(String);

impl ModuleName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Identity of the generated protocol module for a schema name
    pub fn proto(schema_name: &str) -> Self {
        Self(format!("{}/{}", PROTO_BASE, schema_name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, used as the Go package name of the module
    pub fn package(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
