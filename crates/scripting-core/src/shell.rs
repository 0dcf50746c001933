//! Shell command invocation: spawn one OS process, stream its output, and
//! validate its exit code against an expected set.
//!
//! Stdout and stderr are read line-by-line on dedicated threads feeding a
//! channel, which avoids pipe-buffer deadlocks while still letting callers
//! observe output incrementally through [`ShellOptions::output_handler`].
//! The invoker has no timeout and no retries; a wrapped process runs until
//! it exits on its own, and retry policy belongs to the caller.

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc;

use crate::error::{Result, ScriptError};
use crate::logging::Logger;

/// Outcome of one external process execution.
#[derive(Debug)]
pub struct ShellCommandResult {
    pub exit_code: i32,
    /// Whether the exit code was in the invocation's expected set. Not the
    /// same as `exit_code == 0`: a caller expecting `{0, 3}` gets a
    /// successful result for an exit of 3.
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Options for a single invocation.
pub struct ShellOptions<'a> {
    /// Exit codes treated as success. Anything else raises
    /// [`ScriptError::UnexpectedExitCode`].
    pub expected_exit_codes: Vec<i32>,
    /// Called once per decoded output line (newline stripped); the first
    /// argument is a stdout line, the second a stderr line, exactly one of
    /// which is non-empty per call. When absent, output is only buffered
    /// for error reporting.
    pub output_handler: Option<&'a mut dyn FnMut(&str, &str)>,
    /// Run the command line through the platform shell (`sh -c` / `cmd /C`),
    /// for commands that need shell built-ins.
    pub use_shell: bool,
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Environment overlay applied to the child only; the parent process
    /// environment is never mutated.
    pub env: Vec<(String, String)>,
}

impl Default for ShellOptions<'_> {
    fn default() -> Self {
        Self {
            expected_exit_codes: vec![0],
            output_handler: None,
            use_shell: false,
            cwd: None,
            env: Vec::new(),
        }
    }
}

/// The subprocess-spawning seam. Stateless; shared by all scripts.
pub trait Shell: Send + Sync {
    fn invoke(
        &self,
        logger: &dyn Logger,
        command: &str,
        args: &[String],
        options: ShellOptions<'_>,
    ) -> Result<ShellCommandResult>;
}

/// Real implementation over `std::process::Command`.
pub struct SystemShell;

enum Chunk {
    Out(String),
    Err(String),
}

impl Shell for SystemShell {
    fn invoke(
        &self,
        _logger: &dyn Logger,
        command: &str,
        args: &[String],
        mut options: ShellOptions<'_>,
    ) -> Result<ShellCommandResult> {
        let mut cmd = build_command(command, args, options.use_shell);
        if let Some(cwd) = &options.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &options.env {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| ScriptError::ProcessSpawn {
            command: command.to_string(),
            source,
        })?;

        let (tx, rx) = mpsc::channel();
        let tx_err = tx.clone();
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        let stdout_thread = std::thread::spawn(move || {
            if let Some(pipe) = stdout_pipe {
                for line in BufReader::new(pipe).lines().map_while(|l| l.ok()) {
                    if tx.send(Chunk::Out(line)).is_err() {
                        break;
                    }
                }
            }
        });
        let stderr_thread = std::thread::spawn(move || {
            if let Some(pipe) = stderr_pipe {
                for line in BufReader::new(pipe).lines().map_while(|l| l.ok()) {
                    if tx_err.send(Chunk::Err(line)).is_err() {
                        break;
                    }
                }
            }
        });

        let mut stdout_buf = String::new();
        let mut stderr_buf = String::new();
        for chunk in rx {
            match chunk {
                Chunk::Out(line) => {
                    stdout_buf.push_str(&line);
                    stdout_buf.push('\n');
                    if let Some(handler) = options.output_handler.as_mut() {
                        handler(&line, "");
                    }
                }
                Chunk::Err(line) => {
                    stderr_buf.push_str(&line);
                    stderr_buf.push('\n');
                    if let Some(handler) = options.output_handler.as_mut() {
                        handler("", &line);
                    }
                }
            }
        }
        let _ = stdout_thread.join();
        let _ = stderr_thread.join();

        let status = child.wait()?;
        // A signal death has no exit code; -1 never matches an expected set.
        let exit_code = status.code().unwrap_or(-1);
        check_exit_code(&options.expected_exit_codes, exit_code)?;

        Ok(ShellCommandResult {
            exit_code,
            success: options.expected_exit_codes.contains(&exit_code),
            stdout: stdout_buf,
            stderr: stderr_buf,
        })
    }
}

fn build_command(command: &str, args: &[String], use_shell: bool) -> Command {
    if use_shell {
        let line = std::iter::once(command)
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(line);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(line);
            cmd
        }
    } else {
        let mut cmd = Command::new(command);
        cmd.args(args);
        cmd
    }
}

/// Validate an exit code against the expected set. The error message
/// wording is a stable cross-component contract.
pub(crate) fn check_exit_code(expected: &[i32], actual: i32) -> Result<()> {
    if expected.contains(&actual) {
        return Ok(());
    }
    let expected = expected
        .iter()
        .map(|code| code.to_string())
        .collect::<Vec<_>>()
        .join(",");
    Err(ScriptError::UnexpectedExitCode { expected, actual })
}
