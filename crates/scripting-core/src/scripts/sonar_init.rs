//! The `sonar-init` script: create the Sonar project on first use. A leaf
//! variant of the same reachability/existence checks as `sonar`, reusable
//! standalone from the CLI or embedded as a sub-script.

use crate::error::Result;
use crate::script::{Script, ScriptContext};
use crate::scripts::sonar::sonar_scanner_path;
use crate::shell::ShellOptions;
use crate::sonar::{dashboard_url, sonar_project_information, SonarClient};

/// Initialize the Sonar project for this repository, unless it already
/// exists on the server.
#[derive(Debug, Default)]
pub struct SonarInitScript;

impl Script for SonarInitScript {
    fn name(&self) -> &str {
        "sonar-init"
    }

    fn description(&self) -> &str {
        "Initialize the Sonar project on the configured Sonar server"
    }

    fn main(&self, ctx: &ScriptContext) -> Result<()> {
        let info = sonar_project_information(ctx.config())?;
        let key = &info.sonar_project_key;
        let host = &info.sonar_host_url;

        ctx.logger()
            .info(&format!("Initializing '{key}' Sonar project..."));

        let client = SonarClient::new()?;
        if client.project_already_exists(ctx.logger(), key, host)? {
            ctx.logger().warn(&format!(
                "'{key}' Sonar project already exists at {} ! Skipping sonar initialization...",
                dashboard_url(host, key)
            ));
            return Ok(());
        }

        // A parameterless scanner run registers the project on the server.
        ctx.invoke_shell(
            &sonar_scanner_path(&ctx.config().project_root),
            Vec::<String>::new(),
            ShellOptions::default(),
        )?;

        ctx.logger().info(&format!(
            "'{key}' Sonar project successfully initialized, and available at {}",
            dashboard_url(host, key)
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::run_script;
    use crate::sonar::SONAR_PROPERTIES_FILE;
    use crate::test_support::{test_context_in, FakeInvocation, FakeShell};
    use std::path::Path;

    fn write_properties(dir: &Path, host: &str) {
        std::fs::write(
            dir.join(SONAR_PROPERTIES_FILE),
            format!("sonar.host.url={host}\nsonar.projectKey=my-test-project-key\n"),
        )
        .unwrap();
    }

    fn mock_sonar(server: &mut mockito::Server, project_status: usize) -> String {
        let host = format!("{}/sonar/", server.url());
        server.mock("HEAD", "/sonar/").with_status(200).create();
        server
            .mock("GET", "/sonar/api/project_branches/list")
            .match_query(mockito::Matcher::UrlEncoded(
                "project".into(),
                "my-test-project-key".into(),
            ))
            .with_status(project_status)
            .create();
        host
    }

    #[test]
    fn fails_without_properties_file() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, logger, shell) = test_context_in(dir.path().to_path_buf(), FakeShell::new());

        let err = run_script(&SonarInitScript, &ctx).unwrap_err();
        assert!(err.to_string().contains("sonar-project.properties"));

        let transcript = logger.transcript();
        assert!(transcript.starts_with("info: Script \"sonar-init\" starting...\n"));
        assert!(transcript.contains("error: Script \"sonar-init\" failed after 0 s with: "));
        assert!(shell.calls().is_empty());
    }

    #[test]
    fn skips_initialization_with_a_warning_when_the_project_exists() {
        let mut server = mockito::Server::new();
        let host = mock_sonar(&mut server, 200);
        let dir = tempfile::tempdir().unwrap();
        write_properties(dir.path(), &host);
        let (ctx, logger, shell) = test_context_in(dir.path().to_path_buf(), FakeShell::new());

        run_script(&SonarInitScript, &ctx).unwrap();

        let dashboard = dashboard_url(&host, "my-test-project-key");
        let transcript = logger.transcript();
        assert!(transcript.contains("info: Initializing 'my-test-project-key' Sonar project...\n"));
        assert!(transcript.contains(&format!(
            "warn: 'my-test-project-key' Sonar project already exists at {dashboard} ! \
             Skipping sonar initialization...\n"
        )));
        assert!(transcript.ends_with("info: Script \"sonar-init\" successful after 0 s\n"));
        assert!(shell.calls().is_empty());
    }

    #[test]
    fn initializes_the_project_when_it_does_not_yet_exist() {
        let mut server = mockito::Server::new();
        let host = mock_sonar(&mut server, 404);
        let dir = tempfile::tempdir().unwrap();
        write_properties(dir.path(), &host);
        let (ctx, logger, shell) = test_context_in(dir.path().to_path_buf(), FakeShell::new());

        run_script(&SonarInitScript, &ctx).unwrap();

        let dashboard = dashboard_url(&host, "my-test-project-key");
        let transcript = logger.transcript();
        assert!(transcript.contains("info: Initializing 'my-test-project-key' Sonar project...\n"));
        assert!(transcript.contains(&format!(
            "info: 'my-test-project-key' Sonar project successfully initialized, \
             and available at {dashboard}\n"
        )));
        assert!(transcript.ends_with("info: Script \"sonar-init\" successful after 0 s\n"));
        assert!(!transcript.contains("warn"));

        let calls = shell.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, sonar_scanner_path(dir.path()));
        assert!(calls[0].1.is_empty());
    }

    #[test]
    fn fails_when_project_creation_fails() {
        let mut server = mockito::Server::new();
        let host = mock_sonar(&mut server, 404);
        let dir = tempfile::tempdir().unwrap();
        write_properties(dir.path(), &host);

        let shell = FakeShell::new();
        shell.on(&sonar_scanner_path(dir.path()), FakeInvocation::exit(2));
        let (ctx, logger, _shell) = test_context_in(dir.path().to_path_buf(), shell);

        let err = run_script(&SonarInitScript, &ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected success codes were \"0\", but the process exited with \"2\"."
        );
        assert!(!logger.transcript().contains("successfully initialized"));
    }

    #[test]
    fn fails_when_the_server_is_not_found() {
        let mut server = mockito::Server::new();
        let host = format!("{}/sonar/", server.url());
        server.mock("HEAD", "/sonar/").with_status(404).create();
        let dir = tempfile::tempdir().unwrap();
        write_properties(dir.path(), &host);
        let (ctx, logger, shell) = test_context_in(dir.path().to_path_buf(), FakeShell::new());

        run_script(&SonarInitScript, &ctx).unwrap_err();

        let transcript = logger.transcript();
        assert!(transcript.contains("info: Initializing 'my-test-project-key' Sonar project...\n"));
        assert!(transcript
            .contains(&format!("error: \"{host}\" Sonar server is not reachable.\n")));
        assert!(transcript.contains("error: Script \"sonar-init\" failed after 0 s with: "));
        assert!(shell.calls().is_empty());
    }
}
