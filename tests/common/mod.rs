// tests/common/mod.rs

//! Shared fixtures for integration tests: a minimal gRPC Go module with
//! its protocol schemas and side-channel metadata.

use std::fs;
use std::path::{Path, PathBuf};

pub const HELLOWORLD_PROTO: &str = r#"syntax = "proto3";

package helloworld;

service Greeter {
  rpc SayHello (HelloRequest) returns (HelloReply) {}
}

message HelloRequest {
  string name = 1;
}

message HelloReply {
  string message = 1;
}
"#;

pub const PRODCON_PROTO: &str = r#"syntax = "proto3";

package prodcon;

service Producer {
  rpc Produce (ProduceRequest) returns (ProduceReply) {}
}

message ProduceRequest {
  int32 value = 1;
}

message ProduceReply {
  bool ok = 1;
}
"#;

const MAIN_GO: &str = r#"package main

import (
	"context"
	pb "example.com/protos/helloworld"
	"google.golang.org/grpc"
)

type server struct {
	pb.UnimplementedGreeterServer
}

func (s *server) SayHello(ctx context.Context, in *pb.HelloRequest) (*pb.HelloReply, error) {
	return &pb.HelloReply{Message: "Hello " + in.GetName()}, nil
}

func main() {
	s := grpc.NewServer()
	pb.RegisterGreeterServer(s, &server{})
}
"#;

const GO_MOD: &str = "module example.com/greeter

go 1.21

require (
\tgoogle.golang.org/grpc v1.58.0
\tgoogle.golang.org/protobuf v1.31.0
)
";

/// Write a complete greeter module under `dir` and return the path of
/// its export schema
pub fn write_greeter_module(dir: &Path) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("go.mod"), GO_MOD).unwrap();
    fs::write(dir.join("main.go"), MAIN_GO).unwrap();
    let proto = dir.join("helloworld.proto");
    fs::write(&proto, HELLOWORLD_PROTO).unwrap();
    fs::write(
        dir.join("weld_metadata.yaml"),
        "proto-map:\n\
         - name: helloworld\n  path: helloworld.proto\n  import: example.com/protos/helloworld\n  role: export\n",
    )
    .unwrap();
    proto
}
