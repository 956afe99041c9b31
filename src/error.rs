//! Error types for the skill

use thiserror::Error;

/// Result type for skill operations
pub type Result<T> = std::result::Result<T, SkillError>;

/// Errors that escape the skill's own recovery paths
#[derive(Error, Debug)]
pub enum SkillError {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    /// I/O error while reading the configuration file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Request could not be queued on the MQTT client
    #[error("MQTT client error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Broker connection failed or dropped
    #[error("MQTT connection error: {0}")]
    Connection(#[from] rumqttc::ConnectionError),

    /// The task driving the broker connection is gone
    #[error("MQTT event loop stopped")]
    EventLoopStopped,

    /// Payload encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Reason a track lookup did not yield an identifier.
///
/// Every variant is recovered inside the skill; the caller only ever sees the
/// phrase returned by [`LookupFailure::phrase`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    #[error("transport error calling {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("HTTP error calling {url} => {status} : {body}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("response body is not valid JSON: {0}")]
    InvalidBody(String),

    #[error("no results in response")]
    NoResults,

    #[error("malformed track record: {0}")]
    MalformedRecord(String),

    #[error("first result has no identifier")]
    MissingIdentifier,
}

impl LookupFailure {
    /// Text spoken back to the user for this failure
    pub fn phrase<'a>(&self, phrases: &'a crate::config::SkillConfig) -> &'a str {
        match self {
            LookupFailure::Transport { .. }
            | LookupFailure::HttpStatus { .. }
            | LookupFailure::InvalidBody(_)
            | LookupFailure::NoResults => &phrases.not_found_phrase,
            LookupFailure::MissingIdentifier => &phrases.no_identifier_phrase,
            LookupFailure::MalformedRecord(_) => &phrases.malformed_phrase,
        }
    }
}
