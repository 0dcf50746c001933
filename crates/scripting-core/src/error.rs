use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised by scripts and the services they call.
///
/// Nested script failures are propagated as-is (never rewrapped), so the
/// message a script raises is the message the CLI prints and the lifecycle
/// runner logs.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// A required file does not exist.
    #[error("{source}, open '{path}'")]
    MissingFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A required property is absent or empty in a properties file.
    #[error("\"{property}\" property must be defined in \"{file}\" file!")]
    MissingProperty { property: String, file: String },

    /// The executable could not be started at all.
    #[error("failed to spawn \"{command}\": {source}")]
    ProcessSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process exited with a code outside the expected set.
    ///
    /// The message wording is a stable contract: callers and tests match on
    /// it verbatim.
    #[error("Expected success codes were \"{expected}\", but the process exited with \"{actual}\".")]
    UnexpectedExitCode { expected: String, actual: i32 },

    /// The Sonar host did not answer the reachability probe. The offending
    /// URL is logged by the workflow; the message is the probe's own error.
    #[error("{source}")]
    UnreachableServer {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The Sonar API answered the existence probe with something outside
    /// the {2xx, 404} contract. Carries the raw response for diagnostics.
    #[error("Unexpected response from Sonar API! (status {status})")]
    UnexpectedApiResponse { status: StatusCode, body: String },

    #[error("invalid URL \"{url}\": {message}")]
    InvalidUrl { url: String, message: String },

    /// Pre-flight dependency check failed before the script body ran.
    #[error("the \"{0}\" required dependency was not found in your project!")]
    MissingDependency(String),

    /// A failure raised by a script body itself.
    #[error("{0}")]
    Script(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScriptError>;
