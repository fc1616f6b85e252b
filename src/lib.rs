// src/lib.rs

//! Weld
//!
//! Rewrites a self-contained gRPC Go module into the module hierarchy of
//! a WebAssembly component: generated protocol modules, a component
//! adapter wired to native bindings, and the implementation itself with
//! its sources and dependency manifest rewritten against a replacement
//! ledger.
//!
//! # Pipeline
//!
//! - Package loader: copy, rename, and validate the input module
//! - Protocol code generator: RPC stubs, message types, component glue
//! - Replacement ledger: import rewrites with exhaustiveness tracking
//! - Source and manifest rewriters: consume the ledger
//! - Orchestrator: deferred dependency resolution, output on full success

pub mod codegen;
mod error;
pub mod exec;
pub mod ledger;
pub mod manifest;
pub mod metadata;
pub mod names;
pub mod pkg;
pub mod proto;
pub mod source;
pub mod transform;

pub use codegen::CodegenConfig;
pub use error::{Error, Result};
pub use ledger::{Replacement, ReplacementLedger};
pub use manifest::Manifest;
pub use metadata::Metadata;
pub use names::ModuleName;
pub use pkg::ImplPackage;
pub use proto::ProtoSchema;
pub use transform::{CommandQueue, TransformConfig};
