// src/codegen/grpc.rs

//! RPC stub generation (grpc.go of a protocol module)
//!
//! For the schema's service this emits the client capability interface,
//! a default unimplemented client, a settable active client slot, and
//! the server-side equivalents. Implementations are swapped in at
//! runtime through the Set functions; until then every method returns a
//! not-implemented error. Naming is derived purely from the schema's
//! service and method names.

use crate::codegen::writer::GoWriter;
use crate::codegen::CodegenConfig;
use crate::proto::ProtoSchema;

/// Generate the RPC stub file for a protocol module
pub fn generate(schema: &ProtoSchema, config: &CodegenConfig) -> String {
    let mut g = GoWriter::new();
    let svc = &schema.service;
    let client = format!("{}Client", svc.name);
    let server = format!("{}Server", svc.name);

    g.p("// Code generated by weld. DO NOT EDIT.");
    g.p(format!("// source: {}.proto", schema.name));
    g.blank();
    g.p(format!("package {}", schema.package));
    g.blank();

    // A service without methods needs neither import nor constants;
    // unused Go imports are compile errors
    if !svc.methods.is_empty() {
        g.p("import (");
        g.p("\"context\"");
        g.p("\"errors\"");
        g.p(")");
        g.blank();

        g.p("const (");
        for method in &svc.methods {
            g.p(format!(
                "{}_{}_FullMethodName = \"/{}.{}/{}\"",
                svc.name, method.name, schema.package, svc.proto_name, method.proto_name
            ));
        }
        g.p(")");
        g.blank();
    }

    // Client capability interface
    g.p(format!(
        "// {client} is the client API for the {} service.",
        svc.name
    ));
    g.p(format!("type {client} interface {{"));
    for method in &svc.methods {
        g.p(client_signature(method));
    }
    g.p("}");
    g.blank();

    g.p(format!("type unimplemented{client} struct{{}}"));
    g.blank();
    for method in &svc.methods {
        g.p(format!(
            "func (unimplemented{client}) {} {{",
            client_signature(method)
        ));
        g.p(format!(
            "return nil, errors.New(\"method {} not implemented\")",
            method.name
        ));
        g.p("}");
        g.blank();
    }

    // Active client implementation slot
    g.p(format!(
        "var clientImplementation {client} = unimplemented{client}{{}}"
    ));
    g.blank();
    g.p(format!("func New{client}(cc interface{{}}) {client} {{"));
    g.p("return clientImplementation");
    g.p("}");
    g.blank();
    g.p(format!("func Set{client}Implementation(impl {client}) {{"));
    g.p("clientImplementation = impl");
    g.p("}");
    g.blank();

    let must_or_should = if config.require_unimplemented {
        "must"
    } else {
        "should"
    };

    // Server capability interface
    g.p(format!(
        "// {server} is the server API for the {} service.",
        svc.name
    ));
    g.p(format!(
        "// All implementations {must_or_should} embed Unimplemented{server} for forward compatibility."
    ));
    g.p(format!("type {server} interface {{"));
    for method in &svc.methods {
        g.p(server_signature(method));
    }
    if config.require_unimplemented {
        g.p(format!("mustEmbedUnimplemented{server}()"));
    }
    g.p("}");
    g.blank();

    // Active server implementation slot
    g.p(format!(
        "var ServerImplementation {server} = Unimplemented{server}{{}}"
    ));
    g.blank();

    g.p(format!("type Unimplemented{server} struct{{}}"));
    g.blank();
    for method in &svc.methods {
        g.p(format!(
            "func (Unimplemented{server}) {} {{",
            server_signature(method)
        ));
        g.p(format!(
            "return nil, errors.New(\"method {} not implemented\")",
            method.name
        ));
        g.p("}");
        g.blank();
    }
    if config.require_unimplemented {
        g.p(format!(
            "func (Unimplemented{server}) mustEmbedUnimplemented{server}() {{}}"
        ));
        g.blank();
    }

    g.p(format!(
        "func Register{server}(s interface{{}}, srv {server}) {{"
    ));
    g.p("ServerImplementation = srv");
    g.p("}");

    g.finish()
}

fn client_signature(method: &crate::proto::Method) -> String {
    format!(
        "{}(ctx context.Context, in *{}, opts ...interface{{}}) (*{}, error)",
        method.name, method.input, method.output
    )
}

fn server_signature(method: &crate::proto::Method) -> String {
    format!(
        "{}(context.Context, *{}) (*{}, error)",
        method.name, method.input, method.output
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::test_fixtures::helloworld;

    #[test]
    fn test_stub_surface_for_greeter() {
        let schema = helloworld();
        let out = generate(&schema, &CodegenConfig::default());

        assert!(out.contains("package helloworld"));
        assert!(out.contains("Greeter_SayHello_FullMethodName = \"/helloworld.Greeter/SayHello\""));
        assert!(out.contains("type GreeterClient interface {"));
        assert!(out
            .contains("SayHello(ctx context.Context, in *HelloRequest, opts ...interface{}) (*HelloReply, error)"));
        assert!(out.contains("type unimplementedGreeterClient struct{}"));
        assert!(out.contains("func SetGreeterClientImplementation(impl GreeterClient) {"));
        assert!(out.contains("type GreeterServer interface {"));
        assert!(out.contains("var ServerImplementation GreeterServer = UnimplementedGreeterServer{}"));
        assert!(out.contains("func RegisterGreeterServer(s interface{}, srv GreeterServer) {"));
        assert!(out.contains("errors.New(\"method SayHello not implemented\")"));
        // Opt-in embedding is off by default
        assert!(!out.contains("mustEmbedUnimplementedGreeterServer"));
    }

    #[test]
    fn test_zero_method_service_imports_nothing() {
        let mut schema = helloworld();
        schema.service.methods.clear();
        let out = generate(&schema, &CodegenConfig::default());

        assert!(!out.contains("import ("));
        assert!(!out.contains("\"context\""));
        assert!(!out.contains("\"errors\""));
        assert!(!out.contains("FullMethodName"));
        // The interface surface is still emitted
        assert!(out.contains("type GreeterClient interface {"));
        assert!(out.contains("var ServerImplementation GreeterServer = UnimplementedGreeterServer{}"));
    }

    #[test]
    fn test_require_unimplemented_adds_embedding_guard() {
        let schema = helloworld();
        let out = generate(
            &schema,
            &CodegenConfig {
                require_unimplemented: true,
            },
        );
        assert!(out.contains("mustEmbedUnimplementedGreeterServer()"));
        assert!(out.contains("// All implementations must embed"));
    }
}
