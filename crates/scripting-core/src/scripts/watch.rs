//! Incremental-compilation watch loop.
//!
//! Runs the TypeScript compiler in `--watch` mode under an unconditional
//! restart loop: on abnormal exit it sleeps a fixed backoff and restarts,
//! forever, except for the Windows Ctrl-C status code which ends the whole
//! script cleanly. Output lines are classified to drive a notification
//! seam; actually displaying desktop notifications is a collaborator's
//! concern, not ours.

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;

use crate::error::{Result, ScriptError};
use crate::script::{Script, ScriptContext};
use crate::shell::ShellOptions;

/// Windows STATUS_CONTROL_C_EXIT (0xC000013A) as the i32 a child reports.
const CONTROL_C_EXIT_CODE: i32 = 0xC000_013A_u32 as i32;

/// Receives compilation-cycle notifications. Desktop display is out of
/// scope; the default sink just traces.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// Default sink: surfaces notifications as debug traces only.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str) {
        tracing::debug!("notification: {title}: {message}");
    }
}

/// Start incremental TypeScript compilation and keep it running.
pub struct WatchScript {
    /// Disable the visual notifications.
    pub disable_notifications: bool,
    /// Pause between abnormal exit and restart.
    pub restart_delay: Duration,
    pub notifier: Arc<dyn Notifier>,
}

impl Default for WatchScript {
    fn default() -> Self {
        Self {
            disable_notifications: false,
            restart_delay: Duration::from_secs(1),
            notifier: Arc::new(LogNotifier),
        }
    }
}

impl Script for WatchScript {
    fn name(&self) -> &str {
        "watch"
    }

    fn description(&self) -> &str {
        "Start TypeScript incremental compilation. Run it in an external \
         terminal and restart your application without a compile step once \
         it reports completion."
    }

    fn main(&self, ctx: &ScriptContext) -> Result<()> {
        ctx.logger().info(
            "\n==========================================\n\
             Starting incremental compilation...\n\
             ==========================================\n",
        );

        let project_name = project_name(ctx);
        let root = ctx.config().project_root.to_string_lossy().into_owned();
        let tsc = ctx
            .config()
            .project_root
            .join("node_modules/typescript/lib/tsc.js")
            .to_string_lossy()
            .into_owned();

        let error_marker = Regex::new(r"(: error)|(error)").expect("static regex");
        let complete_marker =
            Regex::new(r"(Compilation complete)|(Found 0 errors)").expect("static regex");

        let mut ignore_next_complete = false;
        loop {
            let mut handler = |stdout: &str, stderr: &str| {
                if !stdout.is_empty() {
                    ctx.logger().info(stdout);
                    if !self.disable_notifications {
                        // The complete marker wins: "Found 0 errors" would
                        // otherwise match the error marker too.
                        if complete_marker.is_match(stdout) {
                            if !ignore_next_complete {
                                self.notifier
                                    .notify(&project_name, "incremental compilation done");
                            }
                            ignore_next_complete = false;
                        } else if error_marker.is_match(stdout) {
                            self.notifier
                                .notify(&project_name, "incremental compilation error");
                            // Swallow the next "done" so a stale success is
                            // not announced right after an error cycle.
                            ignore_next_complete = true;
                        }
                    }
                }
                if !stderr.is_empty() && stderr != "Debugger attached." {
                    ctx.logger().error(stderr);
                }
            };

            let outcome = ctx.invoke_shell(
                "node",
                [
                    tsc.clone(),
                    "--project".to_string(),
                    root.clone(),
                    "--watch".to_string(),
                    "--pretty".to_string(),
                ],
                ShellOptions {
                    output_handler: Some(&mut handler),
                    ..Default::default()
                },
            );

            match outcome {
                Ok(_) => {}
                Err(ScriptError::UnexpectedExitCode { actual, .. })
                    if actual == CONTROL_C_EXIT_CODE =>
                {
                    ctx.logger().error("Exiting...");
                    return Ok(());
                }
                Err(err) => {
                    ctx.logger().error(&format!(
                        "Error, restarting incremental compilation in a second : {err}"
                    ));
                    std::thread::sleep(self.restart_delay);
                }
            }
        }
    }
}

/// Title for notifications: the watched project's package.json name, or a
/// generic fallback.
fn project_name(ctx: &ScriptContext) -> String {
    let manifest = ctx.config().project_root.join("package.json");
    std::fs::read_to_string(&manifest)
        .ok()
        .and_then(|text| serde_json::from_str::<serde_json::Value>(&text).ok())
        .and_then(|json| json.get("name")?.as_str().map(str::to_string))
        .unwrap_or_else(|| "watch".to_string())
}
