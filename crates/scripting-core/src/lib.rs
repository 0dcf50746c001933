//! `scripting-core` — script framework and subprocess orchestration for the
//! `run` CLI.
//!
//! A "script" is one named unit of developer-workflow logic (lint, unit
//! tests, Sonar analysis, ...). Every script is dual-purpose: the CLI can
//! dispatch it directly, and another script can embed it in-process via
//! [`ScriptContext::invoke_script`]. The pieces:
//!
//! ```text
//! Script trait        ← name/description/main, implemented by value types
//!     │
//! run_script()        ← uniform starting/successful/failed lifecycle logging
//!     │
//! ScriptContext       ← config + Logger + Shell, shared by all scripts
//!     │
//! Shell trait         ← subprocess spawn, stream capture, exit-code checks
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod properties;
pub mod script;
pub mod scripts;
pub mod shell;
pub mod sonar;

pub use config::ProjectConfig;
pub use error::{Result, ScriptError};
pub use logging::{ConsoleLogger, LogLevel, Logger};
pub use script::{run_script, Script, ScriptContext};
pub use scripts::{
    LintFixScript, LintScript, ShowCoverageScript, SonarInitScript, SonarScript, TestUnitsScript,
    WatchScript,
};
pub use shell::{Shell, ShellCommandResult, ShellOptions, SystemShell};

#[cfg(test)]
pub(crate) mod test_support;
