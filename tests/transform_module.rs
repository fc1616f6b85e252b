// tests/transform_module.rs

//! Integration tests for the rewrite pipeline on a synthetic module.
//! Steps that shell out to the Go toolchain are exercised separately
//! through the command queue; everything up to finalization runs here
//! for real.

mod common;

use std::fs;
use tempfile::TempDir;
use weld::names::{ModuleName, GRPC_IMPORT, GRPC_STUB, PROTOBUF_IMPORT};
use weld::{
    source, CodegenConfig, Error, ImplPackage, Manifest, ProtoSchema, Replacement,
    ReplacementLedger, TransformConfig,
};

#[test]
fn test_module_rewrite_end_to_end() {
    let dir = TempDir::new().unwrap();
    let module = dir.path().join("greeter");
    let proto = common::write_greeter_module(&module);

    let work = TempDir::new().unwrap();
    let pkg = ImplPackage::load(&module, work.path()).unwrap();
    let schema = ProtoSchema::load(&proto).unwrap();
    let proto_module = ModuleName::proto(&schema.name);

    // Source pass over the whole package
    let mut sources = ReplacementLedger::new();
    sources.register(
        pkg.metadata.export.import.clone(),
        Replacement::to_path(proto_module.as_str()),
        true,
    );
    sources.register(GRPC_IMPORT, Replacement::to_path(GRPC_STUB), false);
    for path in &pkg.sources {
        source::rewrite_file(path, &mut sources).unwrap().write(path).unwrap();
    }
    sources.assert_exhausted("source").unwrap();

    let rewritten = fs::read_to_string(pkg.dir.join("main.go")).unwrap();
    assert!(rewritten.starts_with("package impl\n"));
    assert!(rewritten.contains("func Main() {"));
    assert!(rewritten.contains("pb \"weld/proto/helloworld\""));
    assert!(rewritten.contains("\"weld.dev/stubs/grpc\""));
    assert!(!rewritten.contains("example.com/protos/helloworld"));

    // Manifest pass
    let mut deps = ReplacementLedger::new();
    deps.register(GRPC_IMPORT, Replacement::drop(), true);
    deps.register(PROTOBUF_IMPORT, Replacement::drop(), false);
    let mut manifest = Manifest::from_file(&pkg.manifest_path()).unwrap();
    manifest.rewrite(&mut deps);
    deps.assert_exhausted("manifest").unwrap();
    manifest
        .add_replace(proto_module.as_str(), "../proto/helloworld")
        .unwrap();
    manifest.write_to(&pkg.manifest_path()).unwrap();

    let on_disk = fs::read_to_string(pkg.manifest_path()).unwrap();
    assert!(on_disk.starts_with("module weld/application/impl\n"));
    assert!(!on_disk.contains("google.golang.org/grpc"));
    assert!(!on_disk.contains("google.golang.org/protobuf"));
    assert!(on_disk.contains("replace weld/proto/helloworld => ../proto/helloworld"));
}

#[test]
fn test_multi_service_schema_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let module = dir.path().join("greeter");
    common::write_greeter_module(&module);

    let bad = dir.path().join("bad.proto");
    fs::write(
        &bad,
        "syntax = \"proto3\";\npackage bad;\n\
         service A { rpc M (E) returns (E) {} }\n\
         service B { rpc M (E) returns (E) {} }\n\
         message E {}\n",
    )
    .unwrap();

    let out = dir.path().join("out");
    let config = TransformConfig {
        module_path: module,
        export_proto: bad,
        import_proto: None,
        output_dir: out.clone(),
        wit_path: dir.path().to_path_buf(),
        wit_world: "greeter-interface".to_string(),
        codegen: CodegenConfig::default(),
    };

    let err = weld::transform::run(&config).unwrap_err();
    assert!(matches!(err, Error::SchemaShape { .. }));
    assert!(!out.exists(), "failed run must not create the output directory");
}

#[test]
fn test_import_schema_without_declared_role_is_rejected() {
    let dir = TempDir::new().unwrap();
    let module = dir.path().join("greeter");
    common::write_greeter_module(&module);
    let import = dir.path().join("prodcon.proto");
    fs::write(&import, common::PRODCON_PROTO).unwrap();

    let out = dir.path().join("out");
    let config = TransformConfig {
        module_path: module.clone(),
        export_proto: module.join("helloworld.proto"),
        import_proto: Some(import),
        output_dir: out.clone(),
        wit_path: dir.path().to_path_buf(),
        wit_world: "w".to_string(),
        codegen: CodegenConfig::default(),
    };

    let err = weld::transform::run(&config).unwrap_err();
    assert!(matches!(err, Error::Usage(_)), "{err}");
    assert!(!out.exists());
}

#[test]
fn test_unconsumed_proto_replacement_is_a_bug_report() {
    // A module that never imports its declared protocol: the mandatory
    // ledger entry survives the pass and the pipeline must say which
    let dir = TempDir::new().unwrap();
    let module = dir.path().join("greeter");
    common::write_greeter_module(&module);
    fs::write(module.join("main.go"), "package main\n\nfunc main() {}\n").unwrap();

    let work = TempDir::new().unwrap();
    let pkg = ImplPackage::load(&module, work.path()).unwrap();

    let mut sources = ReplacementLedger::new();
    sources.register(
        pkg.metadata.export.import.clone(),
        Replacement::to_path("weld/proto/helloworld"),
        true,
    );
    for path in &pkg.sources {
        source::rewrite_file(path, &mut sources).unwrap();
    }
    let err = sources.assert_exhausted("source").unwrap_err();
    assert!(err.to_string().contains("example.com/protos/helloworld"));
}
