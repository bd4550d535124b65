//! Host capabilities.
//!
//! Everything the evaluator does outside its own memory (reading files for
//! `file` and `use`, running commands for `extern`) goes through the [`Host`]
//! trait.  [`NativeHost`] talks to the operating system; [`MemoryHost`]
//! serves canned files and command output for tests and embedding.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

pub trait Host {
    /// Read a whole file.
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Run `command` through the shell with `input` (if any) as standard
    /// input, returning its standard output.
    fn run_command(&self, command: &str, input: Option<&str>) -> io::Result<Vec<u8>>;
}

// ── NativeHost ────────────────────────────────────────────────────────────────

/// The real file system and `sh -c`.  A command's standard error goes
/// straight to ours.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeHost;

impl Host for NativeHost {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn run_command(&self, command: &str, input: Option<&str>) -> io::Result<Vec<u8>> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        // Input goes through a uniquely named temp file, removed on drop.
        let _stdin_file = match input {
            Some(text) => match stdin_file(text) {
                Ok((file, handle)) => {
                    cmd.stdin(Stdio::from(handle));
                    Some(file)
                }
                Err(e) => {
                    warn!(error = %e, "could not stage input for external command");
                    return Ok(Vec::new());
                }
            },
            None => {
                cmd.stdin(Stdio::null());
                None
            }
        };

        debug!(command, "running external command");
        let output = cmd.output()?;
        Ok(output.stdout)
    }
}

/// Write `text` to a fresh temp file and open a second handle at its start.
fn stdin_file(text: &str) -> io::Result<(NamedTempFile, fs::File)> {
    let mut file = NamedTempFile::new()?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    let handle = file.reopen()?;
    Ok((file, handle))
}

// ── MemoryHost ────────────────────────────────────────────────────────────────

/// An in-memory host.  Unknown files are `NotFound`; unknown commands
/// produce empty output.  Every command invocation is recorded.
#[derive(Debug, Default)]
pub struct MemoryHost {
    files: HashMap<PathBuf, Vec<u8>>,
    commands: HashMap<String, Vec<u8>>,
    /// `(command, input)` for each `run_command` call, in order.
    pub calls: RefCell<Vec<(String, Option<String>)>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    /// Script the output of `command`.  An unscripted `cat` echoes its input.
    pub fn with_command(mut self, command: impl Into<String>, output: impl Into<Vec<u8>>) -> Self {
        self.commands.insert(command.into(), output.into());
        self
    }
}

impl Host for MemoryHost {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn run_command(&self, command: &str, input: Option<&str>) -> io::Result<Vec<u8>> {
        self.calls
            .borrow_mut()
            .push((command.to_string(), input.map(str::to_string)));
        if command == "cat" && !self.commands.contains_key(command) {
            return Ok(input.unwrap_or_default().as_bytes().to_vec());
        }
        Ok(self.commands.get(command).cloned().unwrap_or_default())
    }
}
