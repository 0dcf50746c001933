//! The `sonar` analysis script: probe the server, initialize the project on
//! first use, then run the scanner against the current local branch.

use std::path::Path;

use crate::error::Result;
use crate::script::{Script, ScriptContext};
use crate::scripts::sonar_init::SonarInitScript;
use crate::shell::ShellOptions;
use crate::sonar::{sonar_project_information, SonarClient};

/// The scanner is a project-local npm install, like ESLint.
pub(crate) fn sonar_scanner_path(project_root: &Path) -> String {
    project_root
        .join("node_modules/.bin/sonar-scanner")
        .to_string_lossy()
        .into_owned()
}

/// Analyze the current local branch and send the results to the Sonar
/// server. Requires git v2.22+ (`git branch --show-current`).
#[derive(Debug, Default)]
pub struct SonarScript {
    /// Compare the analyzed code to this target branch (usually `develop`).
    pub target_branch: Option<String>,
}

impl Script for SonarScript {
    fn name(&self) -> &str {
        "sonar"
    }

    fn description(&self) -> &str {
        "Analyze current local branch source code and send results to Sonar server"
    }

    fn main(&self, ctx: &ScriptContext) -> Result<()> {
        let info = sonar_project_information(ctx.config())?;
        let current_branch = find_current_git_branch(ctx)?;

        let client = SonarClient::new()?;
        if !client.project_already_exists(
            ctx.logger(),
            &info.sonar_project_key,
            &info.sonar_host_url,
        )? {
            ctx.logger().warn(&format!(
                "'{}' Sonar project does not yet exist on {} ! Initializing it first...",
                info.sonar_project_key, info.sonar_host_url
            ));
            ctx.invoke_script(&SonarInitScript)?;
        }

        ctx.logger().info(&format!(
            "Analyzing current branch \"{current_branch}\" source code..."
        ));

        let mut args = vec![format!("-Dsonar.branch.name={current_branch}")];
        if let Some(target) = &self.target_branch {
            args.push(format!("-Dsonar.branch.target={target}"));
        }
        ctx.invoke_shell(
            &sonar_scanner_path(&ctx.config().project_root),
            args,
            ShellOptions::default(),
        )?;
        Ok(())
    }
}

/// Trimmed single-line output of `git branch --show-current`.
fn find_current_git_branch(ctx: &ScriptContext) -> Result<String> {
    let mut current_branch = String::new();
    {
        let mut handler = |stdout: &str, _stderr: &str| {
            if !stdout.trim().is_empty() {
                current_branch = stdout.trim().to_string();
            }
        };
        ctx.invoke_shell(
            "git",
            ["branch", "--show-current"],
            ShellOptions {
                output_handler: Some(&mut handler),
                ..Default::default()
            },
        )?;
    }
    Ok(current_branch)
}
