// src/transform/mod.rs

//! Transformation orchestrator
//!
//! Drives the whole pipeline inside a temporary work area:
//!
//! 1. load and validate the implementation package
//! 2. generate one protocol module per schema (export, optional import)
//! 3. generate the component module, including the native bindings
//! 4. rewrite the implementation sources and manifest against the ledger
//! 5. finalize: drain the deferred dependency-resolution queue, in order
//! 6. copy the work area to the output directory
//!
//! Any failure aborts the remaining steps; the work area is removed on
//! every exit path and the output directory is only created on full
//! success, so there is no partial-success state.
//!
//! Dependency resolution is deferred because the generated modules
//! reference each other by identity: the component's replace directives
//! point at the protocol modules, the implementation's at both. Running
//! `go mod tidy` eagerly per module would resolve against modules that
//! do not exist yet, so the queue is drained only after every module is
//! on disk, in enqueue order.

use crate::codegen::{self, CodegenConfig};
use crate::error::{Error, Result};
use crate::exec;
use crate::ledger::{Replacement, ReplacementLedger};
use crate::manifest::Manifest;
use crate::metadata::ProtoSpec;
use crate::names::{
    ModuleName, COMPONENT_MODULE, GRPC_IMPORT, GRPC_STUB, IMPL_MODULE, PROTOBUF_IMPORT,
};
use crate::pkg::ImplPackage;
use crate::proto::{self, ProtoSchema};
use crate::source;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Go language version written into generated manifests when the input
/// module does not declare one
const DEFAULT_GO_VERSION: &str = "1.21";

/// Inputs for one transformation run
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Path of the implementation module to transform
    pub module_path: PathBuf,
    /// Schema of the service the module implements
    pub export_proto: PathBuf,
    /// Schema of the remote service the module calls, if any
    pub import_proto: Option<PathBuf>,
    /// Destination directory; must not exist
    pub output_dir: PathBuf,
    /// Interface-description directory passed to the binding generator
    pub wit_path: PathBuf,
    /// World name passed to the binding generator
    pub wit_world: String,
    pub codegen: CodegenConfig,
}

/// One deferred external command
#[derive(Debug)]
struct QueuedCommand {
    program: String,
    args: Vec<String>,
    cwd: PathBuf,
}

/// Ordered queue of deferred build-finalization commands
///
/// Commands are appended as modules are generated and executed only by
/// [`drain`](Self::drain), preserving enqueue order. The queue is an
/// explicit value threaded through the pipeline; nothing accumulates
/// commands behind the orchestrator's back.
#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Vec<QueuedCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command to run during finalization
    pub fn push(&mut self, program: &str, args: &[&str], cwd: &Path) {
        debug!("deferring: {} {:?} in {}", program, args, cwd.display());
        self.commands.push(QueuedCommand {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            cwd: cwd.to_path_buf(),
        });
    }

    /// Run every queued command in enqueue order, stopping at the first
    /// failure
    pub fn drain(&mut self) -> Result<()> {
        for cmd in self.commands.drain(..) {
            let args: Vec<&str> = cmd.args.iter().map(String::as_str).collect();
            exec::run_captured(&cmd.program, &args, &cmd.cwd)?;
        }
        Ok(())
    }
}

/// Run one full transformation
pub fn run(config: &TransformConfig) -> Result<()> {
    if config.output_dir.exists() {
        return Err(Error::Usage(format!(
            "output directory {} already exists",
            config.output_dir.display()
        )));
    }

    let work = TempDir::new()?;
    info!("work area: {}", work.path().display());

    let pkg = ImplPackage::load(&config.module_path, work.path())?;

    let export = ProtoSchema::load(&config.export_proto)?;
    let import = match &config.import_proto {
        Some(path) => Some(ProtoSchema::load(path)?),
        None => None,
    };
    if let Some(import) = &import {
        proto::ensure_distinct(&export, import)?;
    }
    check_roles(&pkg, import.as_ref())?;

    // Generated manifests inherit the input module's language version
    let go_version = Manifest::from_file(&pkg.manifest_path())?
        .go_version
        .unwrap_or_else(|| DEFAULT_GO_VERSION.to_string());

    let mut queue = CommandQueue::new();

    write_proto_module(work.path(), &export, &config.codegen, &go_version, &mut queue)?;
    if let Some(import) = &import {
        write_proto_module(work.path(), import, &config.codegen, &go_version, &mut queue)?;
    }

    write_component_module(
        work.path(),
        &export,
        import.as_ref(),
        config,
        &go_version,
        &mut queue,
    )?;

    rewrite_impl(&pkg, &export, import.as_ref(), &mut queue)?;

    info!("finalizing: resolving dependencies of the generated modules");
    queue.drain()?;

    copy_tree(work.path(), &config.output_dir)?;
    info!("transformed module written to {}", config.output_dir.display());
    Ok(())
}

/// The schemas handed in must agree with the roles the module declares
fn check_roles(pkg: &ImplPackage, import: Option<&ProtoSchema>) -> Result<()> {
    match (&pkg.metadata.import, import) {
        (Some(_), None) => Err(Error::Usage(
            "module metadata declares an import protocol but no import schema was given"
                .to_string(),
        )),
        (None, Some(schema)) => Err(Error::Usage(format!(
            "import schema {} given but the module metadata declares no import protocol",
            schema.path.display()
        ))),
        _ => Ok(()),
    }
}

/// Generate one protocol module under `<work>/proto/<name>` and defer
/// its dependency resolution
fn write_proto_module(
    work: &Path,
    schema: &ProtoSchema,
    codegen_config: &CodegenConfig,
    go_version: &str,
    queue: &mut CommandQueue,
) -> Result<()> {
    let dir = work.join("proto").join(&schema.name);
    std::fs::create_dir_all(&dir).map_err(|e| Error::path_io(&dir, e))?;
    info!("generating protocol module {}", ModuleName::proto(&schema.name));

    write_file(&dir.join("grpc.go"), &codegen::grpc::generate(schema, codegen_config))?;
    write_file(&dir.join("types.go"), &codegen::types::generate(schema))?;

    let mut manifest = Manifest::default();
    manifest.set_module_name(&ModuleName::proto(&schema.name));
    manifest.go_version = Some(go_version.to_string());
    manifest.write_to(&dir.join("go.mod"))?;

    queue.push("go", &["mod", "tidy"], &dir);
    Ok(())
}

/// Generate the component module under `<work>/component`: native
/// bindings via the external generator, the adapter source, and a
/// manifest redirecting the generated-module identities to their
/// on-disk siblings
fn write_component_module(
    work: &Path,
    export: &ProtoSchema,
    import: Option<&ProtoSchema>,
    config: &TransformConfig,
    go_version: &str,
    queue: &mut CommandQueue,
) -> Result<()> {
    let dir = work.join("component");
    std::fs::create_dir_all(&dir).map_err(|e| Error::path_io(&dir, e))?;
    info!("generating component module {COMPONENT_MODULE}");

    let wit = config
        .wit_path
        .canonicalize()
        .map_err(|e| Error::path_io(&config.wit_path, e))?;
    let wit = wit.to_string_lossy();
    exec::run_captured(
        "wit-bindgen",
        &["tiny-go", &wit, "--world", &config.wit_world, "--out-dir=gen"],
        &dir,
    )?;

    let adapter = codegen::component::generate(export, import, &config.wit_world)?;
    write_file(&dir.join("component.go"), &adapter)?;

    let mut manifest = Manifest::default();
    manifest.set_module_name(&ModuleName::new(COMPONENT_MODULE));
    manifest.go_version = Some(go_version.to_string());
    manifest.add_replace(
        ModuleName::proto(&export.name).as_str(),
        &format!("../proto/{}", export.name),
    )?;
    if let Some(import) = import {
        manifest.add_replace(
            ModuleName::proto(&import.name).as_str(),
            &format!("../proto/{}", import.name),
        )?;
    }
    manifest.add_replace(IMPL_MODULE, "../impl")?;
    manifest.write_to(&dir.join("go.mod"))?;

    queue.push("go", &["mod", "tidy"], &dir);
    Ok(())
}

/// Rewrite the implementation sources and manifest against the ledger
/// and defer the module's dependency resolution
fn rewrite_impl(
    pkg: &ImplPackage,
    export: &ProtoSchema,
    import: Option<&ProtoSchema>,
    queue: &mut CommandQueue,
) -> Result<()> {
    info!("rewriting implementation sources in {}", pkg.dir.display());

    // Source pass: protocol imports must be redirected somewhere in the
    // package; a direct grpc import need not exist
    let mut sources = ReplacementLedger::new();
    register_proto(&mut sources, &pkg.metadata.export, export);
    if let (Some(spec), Some(schema)) = (&pkg.metadata.import, import) {
        register_proto(&mut sources, spec, schema);
    }
    sources.register(GRPC_IMPORT, Replacement::to_path(GRPC_STUB), false);

    for path in &pkg.sources {
        source::rewrite_file(path, &mut sources)?.write(path)?;
    }
    sources.assert_exhausted("source")?;

    // Manifest pass: the grpc requirement must exist and go; the
    // protobuf runtime and any stray requirement on a declared proto
    // import path are dropped if present, but a module need not
    // require its protocol packages
    let mut deps = ReplacementLedger::new();
    deps.register(GRPC_IMPORT, Replacement::drop(), true);
    deps.register(PROTOBUF_IMPORT, Replacement::drop(), false);
    deps.register(pkg.metadata.export.import.clone(), Replacement::drop(), false);
    if let Some(spec) = &pkg.metadata.import {
        deps.register(spec.import.clone(), Replacement::drop(), false);
    }

    let manifest_path = pkg.manifest_path();
    let mut manifest = Manifest::from_file(&manifest_path)?;
    manifest.rewrite(&mut deps);
    deps.assert_exhausted("manifest")?;

    manifest.add_replace(
        ModuleName::proto(&export.name).as_str(),
        &format!("../proto/{}", export.name),
    )?;
    if let Some(import) = import {
        manifest.add_replace(
            ModuleName::proto(&import.name).as_str(),
            &format!("../proto/{}", import.name),
        )?;
    }
    manifest.write_to(&manifest_path)?;

    queue.push("go", &["mod", "tidy"], &pkg.dir);
    Ok(())
}

/// Redirect a declared protocol import to its generated module identity
fn register_proto(ledger: &mut ReplacementLedger, spec: &ProtoSpec, schema: &ProtoSchema) {
    ledger.register(
        spec.import.clone(),
        Replacement::to_path(ModuleName::proto(&schema.name).as_str()),
        true,
    );
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).map_err(|e| Error::path_io(path, e))
}

/// Copy the finished work area to the destination, preserving layout
fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| {
            Error::Internal(format!("walking work area {}: {e}", from.display()))
        })?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .expect("walkdir yields paths under its root");
        let dest = to.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest).map_err(|e| Error::path_io(&dest, e))?;
        } else if entry.file_type().is_file() {
            std::fs::copy(entry.path(), &dest).map_err(|e| Error::path_io(&dest, e))?;
        }
    }
    Ok(())
}
