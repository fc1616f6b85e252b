// src/pkg/mod.rs

//! Implementation package loading and validation
//!
//! Copies an externally authored Go module into the work area under the
//! fixed `impl` name, rewrites its manifest identity, and validates the
//! expected entry-point-bearing shape: a single package named `main`.
//! All validation problems are aggregated and reported together rather
//! than failing on the first. The side-channel metadata is read from
//! the original module directory, so relative schema paths resolve
//! against where the author wrote them.

use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::metadata::Metadata;
use crate::names::{ModuleName, IMPL_MODULE, METADATA_FILE};
use crate::source;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// A validated implementation package inside the work area
#[derive(Debug)]
pub struct ImplPackage {
    /// Root of the copied module (`<work>/impl`)
    pub dir: PathBuf,
    /// Protocol role declarations from the side-channel metadata
    pub metadata: Metadata,
    /// Non-test source files of the single package, in sorted order
    pub sources: Vec<PathBuf>,
}

impl ImplPackage {
    /// Copy the module at `module_path` into `work_dir/impl`, rename
    /// its manifest identity, and validate the package shape
    pub fn load(module_path: &Path, work_dir: &Path) -> Result<Self> {
        if !module_path.is_dir() {
            return Err(Error::Usage(format!(
                "implementation module path {} is not a directory",
                module_path.display()
            )));
        }

        let impl_dir = work_dir.join("impl");
        info!(
            "copying implementation module {} -> {}",
            module_path.display(),
            impl_dir.display()
        );
        copy_tree(module_path, &impl_dir)?;

        // Trivial identity rewrite: the copied module always answers to
        // the fixed impl name
        let manifest_path = impl_dir.join("go.mod");
        let mut manifest = Manifest::from_file(&manifest_path)?;
        manifest.set_module_name(&ModuleName::new(IMPL_MODULE));
        manifest.write_to(&manifest_path)?;

        let sources = list_sources(&impl_dir)?;
        validate_package(&impl_dir, &sources)?;

        let metadata = Metadata::from_file(&module_path.join(METADATA_FILE))?;

        Ok(Self {
            dir: impl_dir,
            metadata,
            sources,
        })
    }

    /// Path of the package's dependency manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join("go.mod")
    }
}

/// Copy a module tree, preserving layout. Regular files and directories
/// only; the metadata file is not part of the transformed module.
fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| Error::Package {
            problems: vec![format!("walking {}: {e}", from.display())],
        })?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .expect("walkdir yields paths under its root");
        if rel.as_os_str().is_empty() {
            std::fs::create_dir_all(to).map_err(|e| Error::path_io(to, e))?;
            continue;
        }
        if entry.file_name() == METADATA_FILE {
            continue;
        }
        let dest = to.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest).map_err(|e| Error::path_io(&dest, e))?;
        } else if entry.file_type().is_file() {
            std::fs::copy(entry.path(), &dest).map_err(|e| Error::path_io(&dest, e))?;
        } else {
            debug!("skipping non-regular file {}", entry.path().display());
        }
    }
    Ok(())
}

/// Non-test Go sources in the package root, sorted for determinism
fn list_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| Error::path_io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::path_io(dir, e))?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.ends_with(".go") && !name.ends_with("_test.go") && path.is_file() {
            sources.push(path);
        }
    }
    sources.sort();
    Ok(sources)
}

/// Enforce the single-package, entry-point-bearing shape, aggregating
/// every problem found
fn validate_package(dir: &Path, sources: &[PathBuf]) -> Result<()> {
    let mut problems = Vec::new();
    let mut packages = BTreeSet::new();

    if sources.is_empty() {
        problems.push(format!("{}: module contains no Go sources", dir.display()));
    }

    for path in sources {
        match source::declared_package(path) {
            Ok(name) => {
                packages.insert(name);
            }
            Err(err) => problems.push(err.to_string()),
        }
    }

    if packages.len() > 1 {
        problems.push(format!(
            "input module must contain only a single package, found: {}",
            packages.iter().cloned().collect::<Vec<_>>().join(", ")
        ));
    } else if let Some(name) = packages.iter().next() {
        if name != "main" {
            problems.push(format!("package must be named main not {name}"));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::Package { problems })
    }
}
