//! The script contract and its lifecycle runner.
//!
//! Scripts are plain value types implementing [`Script`]; the lifecycle
//! (starting/successful/failed logging, elapsed time, error propagation) is
//! a single free function, [`run_script`], applied uniformly to every one
//! of them. One script embeds another through
//! [`ScriptContext::invoke_script`], which runs the sub-script's full
//! lifecycle in-process with the parent's logger.

use std::sync::Arc;
use std::time::Instant;

use crate::config::ProjectConfig;
use crate::error::{Result, ScriptError};
use crate::logging::Logger;
use crate::shell::{Shell, ShellCommandResult, ShellOptions};

/// One named, independently dispatchable or embeddable unit of workflow
/// logic. Constructed per invocation with fully resolved options; holds no
/// state across invocations.
pub trait Script {
    /// Unique identifier, used for CLI dispatch and lifecycle logging.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// External tools this script needs. Validated before `main()` runs;
    /// a missing entry fails the script without executing its body.
    fn required_dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    fn main(&self, ctx: &ScriptContext) -> Result<()>;
}

/// Services and configuration shared by all scripts in one process run.
/// The logger and shell are stateless; there is no shared mutable state
/// between script executions.
pub struct ScriptContext {
    config: ProjectConfig,
    logger: Arc<dyn Logger>,
    shell: Arc<dyn Shell>,
}

impl ScriptContext {
    pub fn new(config: ProjectConfig, logger: Arc<dyn Logger>, shell: Arc<dyn Shell>) -> Self {
        Self {
            config,
            logger,
            shell,
        }
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }

    /// Invoke an external command through the shared [`Shell`], logging the
    /// command line first.
    pub fn invoke_shell<I, S>(
        &self,
        command: &str,
        args: I,
        options: ShellOptions<'_>,
    ) -> Result<ShellCommandResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        self.logger
            .info(&format!("Executing: {} {}", command, args.join(",")));
        self.shell.invoke(self.logger.as_ref(), command, &args, options)
    }

    /// Run another script's full lifecycle in-process, with this context's
    /// logger and shell. The sub-script's failure propagates unchanged.
    pub fn invoke_script(&self, script: &dyn Script) -> Result<()> {
        run_script(script, self)
    }
}

/// Execute a script's lifecycle: log the start, run the body, log the
/// outcome with elapsed whole seconds, and re-raise any failure.
///
/// Exactly one "starting" line and exactly one of "successful"/"failed" is
/// emitted per call, in that order.
pub fn run_script(script: &dyn Script, ctx: &ScriptContext) -> Result<()> {
    let logger = ctx.logger();
    logger.info(&format!("Script \"{}\" starting...", script.name()));
    let start = Instant::now();

    let result = check_required_dependencies(script, ctx).and_then(|()| script.main(ctx));

    let elapsed = start.elapsed().as_secs();
    match &result {
        Ok(()) => logger.info(&format!(
            "Script \"{}\" successful after {} s",
            script.name(),
            elapsed
        )),
        Err(err) => logger.error(&format!(
            "Script \"{}\" failed after {} s with: {}",
            script.name(),
            elapsed,
            err
        )),
    }
    result
}

/// Pre-flight check: every declared dependency must resolve either on the
/// PATH or in the project's `node_modules/.bin`.
fn check_required_dependencies(script: &dyn Script, ctx: &ScriptContext) -> Result<()> {
    for dependency in script.required_dependencies() {
        let local_bin = ctx
            .config()
            .project_root
            .join("node_modules/.bin")
            .join(&dependency);
        if which::which(&dependency).is_err() && !local_bin.exists() {
            return Err(ScriptError::MissingDependency(dependency));
        }
    }
    Ok(())
}
