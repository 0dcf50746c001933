//! The concrete scripts the CLI dispatches.

pub mod lint;
pub mod show_coverage;
pub mod sonar;
pub mod sonar_init;
pub mod test_units;
pub mod watch;

pub use lint::{LintFixScript, LintScript};
pub use show_coverage::ShowCoverageScript;
pub use sonar::SonarScript;
pub use sonar_init::SonarInitScript;
pub use test_units::TestUnitsScript;
pub use watch::WatchScript;
