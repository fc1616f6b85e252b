// src/codegen/component.rs

//! Component adapter generation (component.go)
//!
//! Bridges the module's service implementation to the host-facing
//! capability interface of the native bindings. Export-side handlers
//! map a bindings input into the internal request message, invoke the
//! active server implementation, and return a tagged Result value.
//! Import-side handlers are the inverse: they map an internal request
//! into the bindings call shape and unwrap the host's Result. All field
//! mapping copies same-named fields; field-name identity between the
//! internal and external message shapes is a structural precondition of
//! this generator, not something it infers.

use crate::codegen::writer::GoWriter;
use crate::error::{Error, Result};
use crate::names::{BINDINGS_IDENT_PREFIX, BINDINGS_PACKAGE, IMPL_MODULE, PROTO_BASE};
use crate::proto::{Message, ProtoSchema};

/// Generate component.go for the export schema and optional import
/// schema. `wit_world` only documents the go:generate invocation.
pub fn generate(
    export: &ProtoSchema,
    import: Option<&ProtoSchema>,
    wit_world: &str,
) -> Result<String> {
    let mut g = GoWriter::new();

    g.p("// Code generated by weld. DO NOT EDIT.");
    g.blank();
    g.p("package main");
    g.blank();

    // Standard-library imports are only referenced from method
    // handlers; unused Go imports are compile errors
    let needs_context = !export.service.methods.is_empty()
        || import.is_some_and(|i| !i.service.methods.is_empty());
    let needs_fmt = import.is_some_and(|i| !i.service.methods.is_empty());

    g.p("import (");
    if needs_context {
        g.p("\"context\"");
    }
    if needs_fmt {
        g.p("\"fmt\"");
    }
    if needs_context || needs_fmt {
        g.blank();
    }
    g.p(format!("gen \"{BINDINGS_PACKAGE}\""));
    g.p(format!("impl \"{IMPL_MODULE}\""));
    g.p(format!("{} \"{}/{}\"", export.package, PROTO_BASE, export.name));
    if let Some(import) = import {
        g.p(format!("{} \"{}/{}\"", import.package, PROTO_BASE, import.name));
    }
    g.p(")");
    g.blank();

    g.p(format!("type {} struct{{}}", export_struct(export)));
    if let Some(import) = import {
        g.p(format!("type {} struct{{}}", import_struct(import)));
    }
    g.blank();

    gen_init(&mut g, export, import);
    g.blank();
    gen_init_component(&mut g, export, import);
    g.blank();

    for method in &export.service.methods {
        gen_export_method(&mut g, export, method)?;
        g.blank();
    }

    if let Some(import) = import {
        for method in &import.service.methods {
            gen_import_method(&mut g, import, method)?;
            g.blank();
        }
    }

    g.p(format!(
        "//go:generate wit-bindgen tiny-go ../../wit --world {wit_world} --out-dir=gen"
    ));
    g.p("func main() {}");

    Ok(g.finish())
}

fn export_struct(export: &ProtoSchema) -> String {
    format!("{}Impl", export.package)
}

fn import_struct(import: &ProtoSchema) -> String {
    format!("{}ClientImpl", import.package)
}

/// Identifier exported by the native bindings for a schema-level name
fn bindings_ident(schema: &ProtoSchema, suffix: &str) -> String {
    format!("gen.{}{}{}", BINDINGS_IDENT_PREFIX, schema.service.name, suffix)
}

/// Wire both adapter structs into their implementation slots
fn gen_init(g: &mut GoWriter, export: &ProtoSchema, import: Option<&ProtoSchema>) {
    g.p("func init() {");
    g.p(format!("a := {}{{}}", export_struct(export)));
    g.p(format!(
        "gen.SetExports{}{}(a)",
        BINDINGS_IDENT_PREFIX, export.service.name
    ));
    if let Some(import) = import {
        g.blank();
        g.p(format!("c := {}{{}}", import_struct(import)));
        g.p(format!(
            "{}.Set{}ClientImplementation(c)",
            import.package, import.service.name
        ));
    }
    g.p("}");
}

/// The component entry hook: run the module's renamed entry point, then
/// initialize the downstream component if one is imported
fn gen_init_component(g: &mut GoWriter, export: &ProtoSchema, import: Option<&ProtoSchema>) {
    g.p(format!("func ({}) InitComponent() {{", export_struct(export)));
    g.p("impl.Main()");
    if let Some(import) = import {
        g.p(format!("{}()", bindings_ident(import, "InitComponent")));
    }
    g.p("}");
}

fn gen_export_method(
    g: &mut GoWriter,
    export: &ProtoSchema,
    method: &crate::proto::Method,
) -> Result<()> {
    let input = lookup_message(export, &method.input)?;
    let output = lookup_message(export, &method.output)?;
    let arg_type = bindings_ident(export, &method.input);
    let out_type = bindings_ident(export, &method.output);
    let ret_type = format!("gen.Result[{out_type}, int32]");

    g.p(format!(
        "func ({}) {}(arg {}) {} {{",
        export_struct(export),
        method.name,
        arg_type,
        ret_type
    ));
    g.p(format!(
        "param := {}.{}{{{}}}",
        export.package,
        method.input,
        field_map(input, "arg")
    ));
    g.p(format!(
        "res, err := {}.ServerImplementation.{}(context.TODO(), &param)",
        export.package, method.name
    ));
    g.p("if err != nil {");
    g.p(format!(
        "return {ret_type}{{Kind: gen.Err, Err: 1, Val: {out_type}{{}}}}"
    ));
    g.p("}");
    g.p(format!(
        "return {ret_type}{{Kind: gen.Ok, Err: 0, Val: {out_type}{{{}}}}}",
        field_map(output, "res")
    ));
    g.p("}");
    Ok(())
}

fn gen_import_method(
    g: &mut GoWriter,
    import: &ProtoSchema,
    method: &crate::proto::Method,
) -> Result<()> {
    let input = lookup_message(import, &method.input)?;
    let output = lookup_message(import, &method.output)?;

    g.p(format!(
        "func ({}) {}(ctx context.Context, in *{}.{}, opts ...interface{{}}) (*{}.{}, error) {{",
        import_struct(import),
        method.name,
        import.package,
        method.input,
        import.package,
        method.output
    ));
    g.p(format!(
        "param := {}{{{}}}",
        bindings_ident(import, &method.input),
        field_map(input, "in")
    ));
    g.p(format!(
        "res := {}(param)",
        bindings_ident(import, &method.name)
    ));
    g.p("if res.IsErr() {");
    g.p(format!(
        "return nil, fmt.Errorf(\"call {} failed with code: %v\", res.UnwrapErr())",
        method.name
    ));
    g.p("}");
    g.p("resu := res.Unwrap()");
    g.p(format!(
        "return &{}.{}{{{}}}, nil",
        import.package,
        method.output,
        field_map(output, "resu")
    ));
    g.p("}");
    Ok(())
}

/// Copy same-named fields from `src` into a struct literal body
fn field_map(message: &Message, src: &str) -> String {
    message
        .fields
        .iter()
        .map(|f| format!("{}: {}.{}", f.go_name, src, f.go_name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn lookup_message<'a>(schema: &'a ProtoSchema, name: &str) -> Result<&'a Message> {
    schema.message(name).ok_or_else(|| Error::SchemaShape {
        path: schema.path.clone(),
        reason: format!("message {name} is not defined in the schema"),
    })
}
