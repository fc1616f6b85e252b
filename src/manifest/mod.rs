// src/manifest/mod.rs

//! Dependency manifest (go.mod) parsing and rewriting
//!
//! The manifest is a line-oriented directive format: `module` declares
//! the module identity, `require` declares dependencies (single line or
//! block form), `replace` redirects an original module path to a
//! substitute. Directives the rewriter does not model (`exclude`,
//! `retract`, `toolchain`, `godebug`) round-trip unchanged in meaning;
//! whitespace and block grouping are normalized on serialization.

use crate::error::{Error, Result};
use crate::ledger::ReplacementLedger;
use crate::names::ModuleName;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A `require` directive: dependency path plus version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Require {
    pub path: String,
    pub version: String,
}

/// A `replace` directive: original path redirected to a substitute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    pub original: String,
    pub original_version: Option<String>,
    pub target: String,
    pub target_version: Option<String>,
}

/// Structured representation of a dependency manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub module: Option<String>,
    pub go_version: Option<String>,
    pub requires: Vec<Require>,
    pub replaces: Vec<Replace>,
    /// Directives preserved verbatim (one flattened line each)
    pub extras: Vec<String>,
}

/// Directives whose contents we carry through without modeling them
const PASSTHROUGH: &[&str] = &["exclude", "retract", "toolchain", "godebug"];

impl Manifest {
    /// Load and parse a manifest file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|e| Error::path_io(path, e))?;
        Self::parse(&text, path)
    }

    /// Parse manifest text. `path` is used for diagnostics only.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let mut manifest = Manifest::default();
        // Directive of the currently open block, if any
        let mut block: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let fail = |reason: &str| Error::ManifestParse {
                path: path.to_path_buf(),
                line: line_no,
                reason: reason.to_string(),
            };

            // Strip comments, then surrounding whitespace
            let line = match raw.find("//") {
                Some(pos) => &raw[..pos],
                None => raw,
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(directive) = &block {
                if line == ")" {
                    block = None;
                    continue;
                }
                manifest.parse_directive(directive.clone(), line, &fail)?;
                continue;
            }

            let (directive, rest) = match line.split_once(char::is_whitespace) {
                Some((d, r)) => (d, r.trim()),
                None => (line, ""),
            };

            if rest == "(" {
                if !matches!(directive, "require" | "replace")
                    && !PASSTHROUGH.contains(&directive)
                {
                    return Err(fail(&format!("directive '{directive}' cannot open a block")));
                }
                block = Some(directive.to_string());
                continue;
            }

            match directive {
                "module" => {
                    if rest.is_empty() {
                        return Err(fail("module directive requires a path"));
                    }
                    manifest.module = Some(rest.to_string());
                }
                "go" => {
                    if rest.is_empty() {
                        return Err(fail("go directive requires a version"));
                    }
                    manifest.go_version = Some(rest.to_string());
                }
                _ => manifest.parse_directive(directive.to_string(), rest, &fail)?,
            }
        }

        if block.is_some() {
            return Err(Error::ManifestParse {
                path: path.to_path_buf(),
                line: text.lines().count(),
                reason: "unterminated block".to_string(),
            });
        }

        Ok(manifest)
    }

    fn parse_directive(
        &mut self,
        directive: String,
        body: &str,
        fail: &dyn Fn(&str) -> Error,
    ) -> Result<()> {
        match directive.as_str() {
            "require" => {
                let (path, version) = body
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| fail("require needs 'path version'"))?;
                self.requires.push(Require {
                    path: path.to_string(),
                    version: version.trim().to_string(),
                });
            }
            "replace" => {
                let (old, new) = body
                    .split_once("=>")
                    .ok_or_else(|| fail("replace needs 'original => target'"))?;
                let (original, original_version) = split_versioned(old);
                let (target, target_version) = split_versioned(new);
                if original.is_empty() || target.is_empty() {
                    return Err(fail("replace needs 'original => target'"));
                }
                self.replaces.push(Replace {
                    original,
                    original_version,
                    target,
                    target_version,
                });
            }
            d if PASSTHROUGH.contains(&d) => {
                self.extras.push(format!("{d} {body}"));
            }
            other => return Err(fail(&format!("unknown directive '{other}'"))),
        }
        Ok(())
    }

    /// Set the declared module identity
    pub fn set_module_name(&mut self, name: &ModuleName) {
        self.module = Some(name.as_str().to_string());
    }

    /// Apply the ledger: drop every `require` whose path has a
    /// registered replacement (marking the entry seen), then drop every
    /// `replace` whose original name matches a ledger entry, regardless
    /// of its target.
    pub fn rewrite(&mut self, ledger: &mut ReplacementLedger) {
        self.requires.retain(|req| ledger.lookup(&req.path).is_none());
        self.replaces.retain(|rep| !ledger.contains(&rep.original));
    }

    /// Add a requirement; rejects a duplicate for the same path
    pub fn add_require(&mut self, path: &str, version: &str) -> Result<()> {
        if self.requires.iter().any(|r| r.path == path) {
            return Err(Error::ManifestParse {
                path: PathBuf::new(),
                line: 0,
                reason: format!("duplicate requirement for '{path}'"),
            });
        }
        self.requires.push(Require {
            path: path.to_string(),
            version: version.to_string(),
        });
        Ok(())
    }

    /// Add a replacement directive; rejects a duplicate for the same
    /// original name
    pub fn add_replace(&mut self, original: &str, target: &str) -> Result<()> {
        if self.replaces.iter().any(|r| r.original == original) {
            return Err(Error::ManifestParse {
                path: PathBuf::new(),
                line: 0,
                reason: format!("duplicate replacement for '{original}'"),
            });
        }
        self.replaces.push(Replace {
            original: original.to_string(),
            original_version: None,
            target: target.to_string(),
            target_version: None,
        });
        Ok(())
    }

    /// Serialize and write with atomic-replace discipline: the text is
    /// written to a temp file in the target directory and renamed over
    /// the destination, so callers never observe a partial manifest.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::path_io(path, e))?;
        tmp.write_all(self.to_text().as_bytes())
            .map_err(|e| Error::path_io(path, e))?;
        tmp.persist(path)
            .map_err(|e| Error::path_io(path, e.error))?;
        Ok(())
    }

    /// Deterministic serialization; directive order is preserved,
    /// whitespace and block grouping are normalized
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

/// Split `path [version]` into its parts
fn split_versioned(s: &str) -> (String, Option<String>) {
    let s = s.trim();
    match s.split_once(char::is_whitespace) {
        Some((path, version)) => (path.to_string(), Some(version.trim().to_string())),
        None => (s.to_string(), None),
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sections: Vec<String> = Vec::new();

        if let Some(module) = &self.module {
            sections.push(format!("module {module}\n"));
        }
        if let Some(go) = &self.go_version {
            sections.push(format!("go {go}\n"));
        }

        match self.requires.as_slice() {
            [] => {}
            [single] => sections.push(format!("require {} {}\n", single.path, single.version)),
            many => {
                let mut block = String::from("require (\n");
                for req in many {
                    block.push_str(&format!("\t{} {}\n", req.path, req.version));
                }
                block.push_str(")\n");
                sections.push(block);
            }
        }

        if !self.replaces.is_empty() {
            let mut block = String::new();
            for rep in &self.replaces {
                block.push_str("replace ");
                block.push_str(&rep.original);
                if let Some(v) = &rep.original_version {
                    block.push(' ');
                    block.push_str(v);
                }
                block.push_str(" => ");
                block.push_str(&rep.target);
                if let Some(v) = &rep.target_version {
                    block.push(' ');
                    block.push_str(v);
                }
                block.push('\n');
            }
            sections.push(block);
        }

        for extra in &self.extras {
            sections.push(format!("{extra}\n"));
        }

        write!(f, "{}", sections.join("\n"))
    }
}
