//! Process invocation used by the vendor adapters.
//!
//! Adapters never spawn processes themselves; they describe the command with
//! a [`ToolCommand`] and hand it to a [`CommandRunner`]. Environment
//! overrides travel with the command and are applied to the child only.

use crate::error::{GpuError, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Mutex;

/// A fully described invocation of a vendor tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Variables set on the child process only
    pub env: Vec<(String, String)>,
    /// Append stderr to the returned output
    pub merge_stderr: bool,
}

impl ToolCommand {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            merge_stderr: false,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn merge_stderr(mut self) -> Self {
        self.merge_stderr = true;
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured output of a successful invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
}

impl ToolOutput {
    pub fn new<B: Into<Vec<u8>>>(stdout: B) -> Self {
        Self {
            stdout: stdout.into(),
        }
    }

    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Runs vendor tools and resolves them on the lookup path
pub trait CommandRunner: Send + Sync {
    /// Run the command, failing when it cannot start or exits non-zero
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput>;

    /// Resolve a program name or path to an executable, like `which`
    fn lookup(&self, program: &str) -> Option<PathBuf>;
}

/// Runner backed by `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        SystemRunner
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        log::debug!("Running {}", command);

        let output = Command::new(&command.program)
            .args(&command.args)
            .envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .output()
            .map_err(|e| GpuError::execution(command.to_string(), e.to_string()))?;

        let mut stdout = output.stdout;
        if command.merge_stderr {
            stdout.extend_from_slice(&output.stderr);
        }

        if !output.status.success() {
            let detail = if command.merge_stderr {
                String::from_utf8_lossy(&stdout).trim().to_string()
            } else {
                String::from_utf8_lossy(&output.stderr).trim().to_string()
            };
            let reason = if detail.is_empty() {
                format!("exited with {}", output.status)
            } else {
                format!("exited with {}: {}", output.status, detail)
            };
            return Err(GpuError::execution(command.to_string(), reason));
        }

        Ok(ToolOutput { stdout })
    }

    fn lookup(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

/// Scripted outcome for one program in a [`ScriptedRunner`]
#[derive(Debug, Clone)]
enum Script {
    Output(Vec<u8>),
    Failure(String),
}

/// Runner that replays canned tool output instead of spawning processes
///
/// Responses are keyed by program name. Every command handed to `run` is
/// recorded and can be inspected with [`ScriptedRunner::invocations`].
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    scripts: HashMap<String, Script>,
    on_path: HashMap<String, PathBuf>,
    invocations: Mutex<Vec<ToolCommand>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `program` with `stdout` and mark it as resolvable
    pub fn with_output<B: Into<Vec<u8>>>(mut self, program: &str, stdout: B) -> Self {
        self.scripts
            .insert(program.to_string(), Script::Output(stdout.into()));
        self.on_path
            .insert(program.to_string(), PathBuf::from(program));
        self
    }

    /// Make `program` fail with a non-zero exit
    pub fn with_failure(mut self, program: &str, reason: &str) -> Self {
        self.scripts
            .insert(program.to_string(), Script::Failure(reason.to_string()));
        self
    }

    /// Resolve `program` on lookup without scripting its output
    pub fn with_resolvable(mut self, program: &str, path: &str) -> Self {
        self.on_path
            .insert(program.to_string(), PathBuf::from(path));
        self
    }

    pub fn invocations(&self) -> Vec<ToolCommand> {
        self.invocations
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        if let Ok(mut calls) = self.invocations.lock() {
            calls.push(command.clone());
        }

        match self.scripts.get(&command.program) {
            Some(Script::Output(stdout)) => Ok(ToolOutput::new(stdout.clone())),
            Some(Script::Failure(reason)) => {
                Err(GpuError::execution(command.to_string(), reason.clone()))
            }
            None => Err(GpuError::execution(
                command.to_string(),
                "No such file or directory",
            )),
        }
    }

    fn lookup(&self, program: &str) -> Option<PathBuf> {
        self.on_path.get(program).cloned()
    }
}
