//! Project configuration, constructed once at process entry and passed by
//! reference to every component that needs it. No hidden statics.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Root of the project the scripts operate on.
    pub project_root: PathBuf,
    /// Where build/test artifacts (coverage, junit reports) are written.
    pub output_dir: PathBuf,
}

impl ProjectConfig {
    pub fn new(project_root: PathBuf) -> Self {
        let output_dir = project_root.join("output");
        Self {
            project_root,
            output_dir,
        }
    }
}
