//! Shared pieces of the Sonar workflow: project identity loaded from
//! `sonar-project.properties`, and the HTTP probes against the Sonar
//! server (reachability, then project existence).

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use reqwest::{StatusCode, Url};

use crate::config::ProjectConfig;
use crate::error::{Result, ScriptError};
use crate::logging::Logger;
use crate::properties;

pub const SONAR_PROPERTIES_FILE: &str = "sonar-project.properties";

const REACHABILITY_TIMEOUT: Duration = Duration::from_secs(20);
const EXISTENCE_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECTS: usize = 5;

/// Project identity read from `sonar-project.properties`. Both fields are
/// validated non-empty before any network or process call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SonarProjectInformation {
    pub sonar_host_url: String,
    pub sonar_project_key: String,
}

/// Load and validate the Sonar project identity from the project root.
pub fn sonar_project_information(config: &ProjectConfig) -> Result<SonarProjectInformation> {
    let path = config.project_root.join(SONAR_PROPERTIES_FILE);
    let props = properties::load(&path)?;
    let sonar_host_url = required_property(&props, "sonar.host.url")?;
    let sonar_project_key = required_property(&props, "sonar.projectKey")?;
    Ok(SonarProjectInformation {
        sonar_host_url,
        sonar_project_key,
    })
}

fn required_property(props: &properties::Properties, name: &str) -> Result<String> {
    match props.get(name) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ScriptError::MissingProperty {
            property: name.to_string(),
            file: SONAR_PROPERTIES_FILE.to_string(),
        }),
    }
}

/// Read-only probes against the Sonar HTTP API.
pub struct SonarClient {
    http: Client,
}

impl SonarClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self { http })
    }

    /// Check whether the project already exists on the Sonar server.
    ///
    /// Probes reachability first (HEAD on the host URL), then queries the
    /// branches-list endpoint for the project key. A 404 from the endpoint
    /// means "does not exist yet" and is not an error; any other non-2xx
    /// status is an unexpected API response.
    pub fn project_already_exists(
        &self,
        logger: &dyn Logger,
        sonar_project_key: &str,
        sonar_host_url: &str,
    ) -> Result<bool> {
        self.probe_reachability(logger, sonar_host_url)?;

        logger.debug(&format!(
            "*** Calling Sonar API to check whether {sonar_project_key} project exists in {sonar_host_url} Sonar instance..."
        ));
        let endpoint = branches_list_endpoint(sonar_host_url)?;
        let response = self
            .http
            .get(endpoint)
            .query(&[("project", sonar_project_key)])
            .timeout(EXISTENCE_TIMEOUT)
            .send()?;

        let status = response.status();
        logger.debug(&format!("*** Sonar API response : status {status}"));
        if status.is_success() {
            return Ok(true);
        }
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Err(ScriptError::UnexpectedApiResponse {
            status,
            body: response.text().unwrap_or_default(),
        })
    }

    /// Lightweight HEAD probe, following redirects, with a bounded timeout.
    /// Logs and fails when the host does not answer with a success status.
    fn probe_reachability(&self, logger: &dyn Logger, sonar_host_url: &str) -> Result<()> {
        logger.debug(&format!(
            "*** Calling Sonar host check whether {sonar_host_url} Sonar instance is reachable..."
        ));
        let url = parse_url(sonar_host_url)?;
        let outcome = self
            .http
            .head(url)
            .timeout(REACHABILITY_TIMEOUT)
            .send()
            .and_then(|response| response.error_for_status());
        if let Err(source) = outcome {
            logger.error(&format!(
                "\"{sonar_host_url}\" Sonar server is not reachable."
            ));
            return Err(ScriptError::UnreachableServer {
                url: sonar_host_url.to_string(),
                source,
            });
        }
        Ok(())
    }
}

/// Dashboard URL for a project, tolerant of host URLs with or without a
/// trailing slash.
pub fn dashboard_url(sonar_host_url: &str, sonar_project_key: &str) -> String {
    format!(
        "{}/dashboard?id={}",
        sonar_host_url.trim_end_matches('/'),
        sonar_project_key
    )
}

/// Join the fixed branches-list API path onto the host URL, preserving any
/// base path the host carries.
fn branches_list_endpoint(sonar_host_url: &str) -> Result<Url> {
    let mut url = parse_url(sonar_host_url)?;
    let path = format!(
        "{}/api/project_branches/list",
        url.path().trim_end_matches('/')
    );
    url.set_path(&path);
    url.set_query(None);
    Ok(url)
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|err| ScriptError::InvalidUrl {
        url: raw.to_string(),
        message: err.to_string(),
    })
}
