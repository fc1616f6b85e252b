// tests/codegen_output.rs

//! Generated-code checks against real parsed schemas: the greeter
//! scenario from end to end of the generator surface.

mod common;

use std::fs;
use tempfile::TempDir;
use weld::codegen::{component, grpc, types};
use weld::{CodegenConfig, ProtoSchema};

fn load(name: &str, text: &str) -> ProtoSchema {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    ProtoSchema::load(&path).unwrap()
}

#[test]
fn test_greeter_stub_module_surface() {
    let schema = load("helloworld.proto", common::HELLOWORLD_PROTO);

    let stubs = grpc::generate(&schema, &CodegenConfig::default());
    assert!(stubs.contains("package helloworld"));
    assert!(stubs.contains("Greeter_SayHello_FullMethodName = \"/helloworld.Greeter/SayHello\""));
    assert!(stubs.contains("type GreeterClient interface {"));
    assert!(stubs.contains("type GreeterServer interface {"));
    assert!(stubs.contains("func RegisterGreeterServer(s interface{}, srv GreeterServer) {"));

    let messages = types::generate(&schema);
    assert!(messages.contains("type HelloRequest struct {"));
    assert!(messages.contains("func (x *HelloReply) GetMessage() string {"));
}

#[test]
fn test_greeter_component_adapter() {
    let export = load("helloworld.proto", common::HELLOWORLD_PROTO);
    let out = component::generate(&export, None, "greeter-interface").unwrap();

    assert!(out.contains("package main"));
    assert!(out.contains("gen.SetExportsWeldApplicationGreeter(a)"));
    assert!(out.contains(
        "func (helloworldImpl) SayHello(arg gen.WeldApplicationGreeterHelloRequest) \
         gen.Result[gen.WeldApplicationGreeterHelloReply, int32] {"
    ));
    assert!(out.contains("param := helloworld.HelloRequest{Name: arg.Name}"));
    assert!(out.contains("impl.Main()"));
}

#[test]
fn test_import_export_pair_generates_both_adapters() {
    let export = load("helloworld.proto", common::HELLOWORLD_PROTO);
    let import = load("prodcon.proto", common::PRODCON_PROTO);
    let out = component::generate(&export, Some(&import), "w").unwrap();

    assert!(out.contains("prodcon \"weld/proto/prodcon\""));
    assert!(out.contains("prodcon.SetProducerClientImplementation(c)"));
    assert!(out.contains("res := gen.WeldApplicationProducerProduce(param)"));
    assert!(out.contains("gen.WeldApplicationProducerInitComponent()"));
    // Generated names must never collide between the two sides
    assert!(!out.contains("helloworldClientImpl"));
}
