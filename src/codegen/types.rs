// src/codegen/types.rs

//! Message type generation (types.go of a protocol module)
//!
//! Emits plain Go structs for the schema's messages plus nil-safe
//! getters, which is the surface implementation code written against
//! the original protobuf codegen expects.

use crate::codegen::writer::GoWriter;
use crate::proto::{Field, ProtoSchema};

/// Generate the message types file for a protocol module
pub fn generate(schema: &ProtoSchema) -> String {
    let mut g = GoWriter::new();

    g.p("// Code generated by weld. DO NOT EDIT.");
    g.p(format!("// source: {}.proto", schema.name));
    g.blank();
    g.p(format!("package {}", schema.package));
    g.blank();

    for message in &schema.messages {
        g.p(format!("type {} struct {{", message.name));
        for field in &message.fields {
            g.p(format!("{} {}", field.go_name, field.go_type));
        }
        g.p("}");
        g.blank();

        for field in &message.fields {
            g.p(format!(
                "func (x *{}) Get{}() {} {{",
                message.name, field.go_name, field.go_type
            ));
            g.p("if x != nil {");
            g.p(format!("return x.{}", field.go_name));
            g.p("}");
            g.p(format!("return {}", zero_value(field)));
            g.p("}");
            g.blank();
        }
    }

    g.finish()
}

/// Go zero value for a field's type
fn zero_value(field: &Field) -> &'static str {
    match field.go_type.as_str() {
        "string" => "\"\"",
        "bool" => "false",
        t if t.starts_with("[]") || t.starts_with('*') => "nil",
        _ => "0",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::test_fixtures::helloworld;

    #[test]
    fn test_structs_and_getters() {
        let schema = helloworld();
        let out = generate(&schema);

        assert!(out.contains("type HelloRequest struct {"));
        assert!(out.contains("\tName string"));
        assert!(out.contains("func (x *HelloRequest) GetName() string {"));
        assert!(out.contains("return \"\""));
        assert!(out.contains("type HelloReply struct {"));
    }

    #[test]
    fn test_zero_values_by_type() {
        let field = |go_type: &str| Field {
            go_name: "F".to_string(),
            go_type: go_type.to_string(),
        };
        assert_eq!(zero_value(&field("string")), "\"\"");
        assert_eq!(zero_value(&field("bool")), "false");
        assert_eq!(zero_value(&field("int64")), "0");
        assert_eq!(zero_value(&field("[]string")), "nil");
        assert_eq!(zero_value(&field("*Inner")), "nil");
    }
}
