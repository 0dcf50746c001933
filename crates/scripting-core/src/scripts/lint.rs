use crate::error::Result;
use crate::script::{Script, ScriptContext};
use crate::shell::ShellOptions;

fn eslint_path(ctx: &ScriptContext) -> String {
    ctx.config()
        .project_root
        .join("node_modules/.bin/eslint")
        .to_string_lossy()
        .into_owned()
}

fn project_root(ctx: &ScriptContext) -> String {
    ctx.config().project_root.to_string_lossy().into_owned()
}

/// Run the ESLint validation over the project.
pub struct LintScript;

impl Script for LintScript {
    fn name(&self) -> &str {
        "lint"
    }

    fn description(&self) -> &str {
        "Run the ESLint validation (including Prettier rules)."
    }

    fn main(&self, ctx: &ScriptContext) -> Result<()> {
        ctx.invoke_shell(
            &eslint_path(ctx),
            [project_root(ctx)],
            ShellOptions::default(),
        )?;
        Ok(())
    }
}

/// Same validation, with automatic fixes applied.
pub struct LintFixScript;

impl Script for LintFixScript {
    fn name(&self) -> &str {
        "lint-fix"
    }

    fn description(&self) -> &str {
        "Fix the code using the ESLint validation (including Prettier rules)."
    }

    fn main(&self, ctx: &ScriptContext) -> Result<()> {
        ctx.invoke_shell(
            &eslint_path(ctx),
            ["--fix".to_string(), project_root(ctx)],
            ShellOptions::default(),
        )?;
        Ok(())
    }
}
