mod root;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use scripting_core::{
    run_script, ConsoleLogger, LintFixScript, LintScript, ProjectConfig, Script, ScriptContext,
    ShowCoverageScript, SonarInitScript, SonarScript, SystemShell, TestUnitsScript, WatchScript,
};

#[derive(Parser)]
#[command(
    name = "run",
    about = "Run project scripts — lint, test, watch, and Sonar analysis",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from package.json or .git/)
    #[arg(long, global = true, env = "RUN_SCRIPTS_ROOT")]
    root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the project source code with eslint
    Lint,

    /// Fix what eslint can fix in the project source code
    LintFix,

    /// Run the unit tests
    TestUnits {
        /// Stop at the first test failure
        #[arg(long)]
        bail: bool,

        /// Export the results to a junit report file
        #[arg(long)]
        jenkins: bool,

        /// Junit report file path, relative to the project root
        #[arg(long)]
        report: Option<String>,
    },

    /// Open the unit tests coverage report in a browser
    ShowCoverage {
        /// Coverage directory, relative to the project root
        #[arg(long)]
        report: Option<String>,
    },

    /// Analyze the current branch source code with Sonar
    Sonar {
        /// Branch the current branch will be compared to on the Sonar server
        #[arg(long = "target-branch", short = 't')]
        target_branch: Option<String>,
    },

    /// Initialize the Sonar project on the Sonar server
    SonarInit,

    /// Start TypeScript incremental compilation
    Watch {
        /// Disable the desktop notifications
        #[arg(long = "dn")]
        disable_notifications: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .without_time()
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let ctx = ScriptContext::new(
        ProjectConfig::new(root),
        Arc::new(ConsoleLogger),
        Arc::new(SystemShell),
    );

    let script: Box<dyn Script> = match cli.command {
        Commands::Lint => Box::new(LintScript),
        Commands::LintFix => Box::new(LintFixScript),
        Commands::TestUnits {
            bail,
            jenkins,
            report,
        } => Box::new(TestUnitsScript {
            bail,
            jenkins,
            report,
        }),
        Commands::ShowCoverage { report } => Box::new(ShowCoverageScript { report }),
        Commands::Sonar { target_branch } => Box::new(SonarScript { target_branch }),
        Commands::SonarInit => Box::new(SonarInitScript),
        Commands::Watch {
            disable_notifications,
        } => Box::new(WatchScript {
            disable_notifications,
            ..WatchScript::default()
        }),
    };

    if let Err(e) = run_script(script.as_ref(), &ctx).map_err(anyhow::Error::from) {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
