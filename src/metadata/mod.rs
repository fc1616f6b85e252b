// src/metadata/mod.rs

//! Side-channel metadata (weld_metadata.yaml) parsing
//!
//! The implementation module declares which protocol schemas play which
//! role in a YAML file next to its go.mod:
//!
//! ```yaml
//! proto-map:
//!   - name: helloworld
//!     path: ../protos/helloworld.proto
//!     import: helloworld.example.com/helloworld
//!     role: export
//! ```
//!
//! Exactly one `export` entry is required and at most one `import`
//! entry is allowed. Relative schema paths are resolved against the
//! metadata file's own directory, and every referenced schema file must
//! exist on disk.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A protocol schema assigned a role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoSpec {
    /// Name of the protocol, used for the generated module identity
    pub name: String,
    /// Absolute path of the schema file
    pub path: PathBuf,
    /// Import path the implementation sources use for the generated
    /// protocol code; rewritten to the generated module identity
    pub import: String,
}

/// Validated protocol role declarations for one module
#[derive(Debug, Clone)]
pub struct Metadata {
    pub export: ProtoSpec,
    pub import: Option<ProtoSpec>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum Role {
    Import,
    Export,
}

#[derive(Debug, Deserialize)]
struct ProtoEntry {
    name: String,
    path: String,
    import: String,
    role: Role,
}

#[derive(Debug, Deserialize)]
struct MetadataFile {
    #[serde(rename = "proto-map")]
    proto_map: Option<Vec<ProtoEntry>>,
}

impl Metadata {
    /// Load and validate the metadata file at `path`
    pub fn from_file(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|e| Error::path_io(path, e))?;
        Self::parse(&text, path)
    }

    /// Parse metadata text; `path` anchors relative schema paths and is
    /// used for diagnostics
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let file: MetadataFile = serde_yaml::from_str(text)?;

        let entries = file.proto_map.ok_or_else(|| Error::Metadata {
            path: path.to_path_buf(),
            reason: "no protocol maps defined".to_string(),
        })?;

        let anchor = path.parent().unwrap_or_else(|| Path::new("."));

        let mut export: Option<ProtoSpec> = None;
        let mut import: Option<ProtoSpec> = None;

        for entry in entries {
            let schema_path = resolve_schema_path(anchor, &entry.path)?;
            let spec = ProtoSpec {
                name: entry.name,
                path: schema_path,
                import: entry.import,
            };
            let slot = match entry.role {
                Role::Export => &mut export,
                Role::Import => &mut import,
            };
            if slot.is_some() {
                return Err(Error::Metadata {
                    path: path.to_path_buf(),
                    reason: format!(
                        "more than one {} protocol declared",
                        match entry.role {
                            Role::Export => "export",
                            Role::Import => "import",
                        }
                    ),
                });
            }
            *slot = Some(spec);
        }

        let export = export.ok_or_else(|| Error::Metadata {
            path: path.to_path_buf(),
            reason: "protocol metadata does not define an export protocol".to_string(),
        })?;

        Ok(Metadata { export, import })
    }
}

/// Resolve a schema path against the metadata file's directory and
/// verify it exists, failing fast with the offending path
fn resolve_schema_path(anchor: &Path, raw: &str) -> Result<PathBuf> {
    let candidate = if Path::new(raw).is_absolute() {
        PathBuf::from(raw)
    } else {
        anchor.join(raw)
    };
    if !candidate.exists() {
        return Err(Error::Metadata {
            path: candidate.clone(),
            reason: "protocol file does not exist".to_string(),
        });
    }
    // Canonicalize so downstream steps can copy from any working dir
    candidate.canonicalize().map_err(|e| Error::path_io(candidate, e))
}
