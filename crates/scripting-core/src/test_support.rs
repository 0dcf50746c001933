//! Shared test doubles for crate-internal tests.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::ProjectConfig;
use crate::error::Result;
use crate::logging::{LogLevel, Logger};
use crate::script::ScriptContext;
use crate::shell::{check_exit_code, Shell, ShellCommandResult, ShellOptions};

/// Logger double that appends `"<level>: <message>\n"` to an ordered
/// transcript, so tests can assert on exact log sequences.
pub(crate) struct RecordingLogger {
    transcript: Mutex<String>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self {
            transcript: Mutex::new(String::new()),
        }
    }

    /// The full recorded transcript, in emission order.
    pub fn transcript(&self) -> String {
        self.transcript.lock().expect("transcript poisoned").clone()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        let mut t = self.transcript.lock().expect("transcript poisoned");
        t.push_str(&format!("{level}: {message}\n"));
    }
}

/// One scripted response for a command.
#[derive(Debug, Clone)]
pub(crate) struct FakeInvocation {
    pub exit_code: i32,
    pub stdout: String,
}

impl FakeInvocation {
    pub fn ok(stdout: &str) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.to_string(),
        }
    }

    pub fn exit(exit_code: i32) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
        }
    }
}

/// Scripted [`Shell`] double: responses are queued per command name and the
/// last queued response persists (so restart loops keep observing it);
/// commands with no queue succeed silently. Every call is recorded.
pub(crate) struct FakeShell {
    responses: Mutex<HashMap<String, VecDeque<FakeInvocation>>>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
    env_seen: Mutex<Vec<Vec<(String, String)>>>,
}

impl FakeShell {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            env_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn on(&self, command: &str, response: FakeInvocation) {
        self.responses
            .lock()
            .unwrap()
            .entry(command.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    /// Environment overlays observed, one entry per invocation.
    pub fn env_overlays(&self) -> Vec<Vec<(String, String)>> {
        self.env_seen.lock().unwrap().clone()
    }
}

impl Shell for FakeShell {
    fn invoke(
        &self,
        _logger: &dyn Logger,
        command: &str,
        args: &[String],
        mut options: ShellOptions<'_>,
    ) -> Result<ShellCommandResult> {
        self.calls
            .lock()
            .unwrap()
            .push((command.to_string(), args.to_vec()));
        self.env_seen.lock().unwrap().push(options.env.clone());

        let response = {
            let mut responses = self.responses.lock().unwrap();
            match responses.get_mut(command) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
                Some(queue) => queue
                    .front()
                    .cloned()
                    .unwrap_or_else(|| FakeInvocation::exit(0)),
                None => FakeInvocation::exit(0),
            }
        };

        if !response.stdout.is_empty() {
            if let Some(handler) = options.output_handler.as_mut() {
                handler(&response.stdout, "");
            }
        }
        check_exit_code(&options.expected_exit_codes, response.exit_code)?;
        Ok(ShellCommandResult {
            exit_code: response.exit_code,
            success: options.expected_exit_codes.contains(&response.exit_code),
            stdout: response.stdout,
            stderr: String::new(),
        })
    }
}

/// Build a [`ScriptContext`] with a recording logger and the given fake
/// shell, rooted in the system temp dir.
pub(crate) fn test_context(
    shell: FakeShell,
) -> (ScriptContext, Arc<RecordingLogger>, Arc<FakeShell>) {
    test_context_in(std::env::temp_dir(), shell)
}

/// Same, rooted in an explicit project directory.
pub(crate) fn test_context_in(
    project_root: PathBuf,
    shell: FakeShell,
) -> (ScriptContext, Arc<RecordingLogger>, Arc<FakeShell>) {
    let logger = Arc::new(RecordingLogger::new());
    let shell = Arc::new(shell);
    let ctx = ScriptContext::new(
        ProjectConfig::new(project_root),
        logger.clone(),
        shell.clone(),
    );
    (ctx, logger, shell)
}
