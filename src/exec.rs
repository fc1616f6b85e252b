// src/exec.rs

//! External command execution
//!
//! Toolchain commands (go, wit-bindgen) run with stdin closed and both
//! output streams captured. A non-zero exit is fatal and carries the
//! full command line plus the combined output, which is the only place
//! toolchain diagnostics surface.

use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Run `program` with `args` in `cwd`, returning the combined
/// stdout/stderr text on success
pub fn run_captured(program: &str, args: &[&str], cwd: &Path) -> Result<String> {
    debug!("Executing: {} {:?} in {}", program, args, cwd.display());

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| Error::path_io(cwd, e))?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(Error::Subprocess {
            command: command_line(program, args),
            status: output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string()),
            output: combined,
        });
    }

    for line in combined.lines() {
        debug!("[{}] {}", program, line);
    }
    Ok(combined)
}

fn command_line(program: &str, args: &[&str]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
