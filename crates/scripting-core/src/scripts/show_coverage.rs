use std::path::PathBuf;

use crate::error::Result;
use crate::script::{Script, ScriptContext};

const DEFAULT_REPORT_DIR: &str = "output/coverage";

/// Open the HTML coverage report in the default viewer.
#[derive(Debug, Default)]
pub struct ShowCoverageScript {
    /// Relative path to the coverage report directory.
    pub report: Option<String>,
}

impl ShowCoverageScript {
    fn report_path(&self, ctx: &ScriptContext) -> PathBuf {
        ctx.config()
            .project_root
            .join(self.report.as_deref().unwrap_or(DEFAULT_REPORT_DIR))
            .join("lcov-report/index.html")
    }
}

impl Script for ShowCoverageScript {
    fn name(&self) -> &str {
        "show-coverage"
    }

    fn description(&self) -> &str {
        "Open the tests coverage report."
    }

    // nyc produces the lcov-report directory this script opens.
    fn required_dependencies(&self) -> Vec<String> {
        vec!["nyc".to_string()]
    }

    fn main(&self, ctx: &ScriptContext) -> Result<()> {
        let report = self.report_path(ctx);
        ctx.logger()
            .info(&format!("Opening coverage report {}", report.display()));
        open::that(&report)?;
        Ok(())
    }
}
