// src/main.rs

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use weld::{CodegenConfig, TransformConfig};

#[derive(Parser)]
#[command(name = "weld")]
#[command(author, version, about = "Rewrite a gRPC Go module into a WebAssembly component", long_about = None)]
struct Cli {
    /// Path of the Go module to transform
    #[arg(long)]
    module_path: PathBuf,

    /// Protocol schema of the service the module implements
    #[arg(long)]
    export_proto: PathBuf,

    /// Protocol schema of the remote service the module calls
    #[arg(long)]
    import_proto: Option<PathBuf>,

    /// Destination directory for the transformed module; must not exist
    #[arg(long)]
    output_dir: PathBuf,

    /// Directory of interface descriptions for the binding generator
    #[arg(long)]
    wit_path: PathBuf,

    /// World name for the binding generator
    #[arg(long)]
    wit_world: String,

    /// Generated server interfaces demand embedding the Unimplemented struct
    #[arg(long)]
    require_unimplemented: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = TransformConfig {
        module_path: cli.module_path,
        export_proto: cli.export_proto,
        import_proto: cli.import_proto,
        output_dir: cli.output_dir,
        wit_path: cli.wit_path,
        wit_world: cli.wit_world,
        codegen: CodegenConfig {
            require_unimplemented: cli.require_unimplemented,
        },
    };

    info!("transforming module {}", config.module_path.display());
    weld::transform::run(&config)?;
    Ok(())
}
