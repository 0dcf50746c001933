use crate::error::{Result, ScriptError};
use crate::script::{Script, ScriptContext};
use crate::shell::ShellOptions;

const DEFAULT_JUNIT_REPORT: &str = "output/test-results/report.xml";

/// Run the unit tests through Jest.
#[derive(Debug, Default)]
pub struct TestUnitsScript {
    /// Stop the execution of the tests as soon as an error occurs.
    pub bail: bool,
    /// Configure the tests to be run by a CI server (junit report).
    pub jenkins: bool,
    /// Relative path of the junit report, when `jenkins` is set.
    pub report: Option<String>,
}

impl Script for TestUnitsScript {
    fn name(&self) -> &str {
        "test-units"
    }

    fn description(&self) -> &str {
        "Run the unit tests."
    }

    fn required_dependencies(&self) -> Vec<String> {
        let mut deps = vec!["jest".to_string()];
        if self.jenkins {
            deps.push("jest-junit".to_string());
        }
        deps
    }

    fn main(&self, ctx: &ScriptContext) -> Result<()> {
        let jest = ctx
            .config()
            .project_root
            .join("node_modules/jest/bin/jest")
            .to_string_lossy()
            .into_owned();

        let mut args = vec![
            "--experimental-vm-modules".to_string(),
            jest,
            "--ci".to_string(),
            "--no-colors".to_string(),
            "--runInBand".to_string(),
            "--detectOpenHandles".to_string(),
        ];
        if self.bail {
            args.push("--bail".to_string());
        }

        // Scripts never mutate the ambient environment; the test runtime
        // selector and the junit report path travel on the child only.
        let mut env = vec![("NODE_APP_INSTANCE".to_string(), "tests".to_string())];
        if self.jenkins {
            let report = self
                .report
                .clone()
                .unwrap_or_else(|| DEFAULT_JUNIT_REPORT.to_string());
            ctx.logger()
                .info(&format!("Exporting tests to junit file {report}"));
            env.push(("JEST_JUNIT_OUTPUT_FILE".to_string(), report));
            args.push("--reporters".to_string());
            args.push("default".to_string());
            args.push("--reporters".to_string());
            args.push("jest-junit".to_string());
        }

        let outcome = ctx.invoke_shell(
            "node",
            args,
            ShellOptions {
                env,
                ..Default::default()
            },
        );
        if outcome.is_err() {
            return Err(ScriptError::Script("Some unit tests failed".into()));
        }

        ctx.logger()
            .info("type 'run show-coverage' to display the HTML coverage report");
        Ok(())
    }
}
