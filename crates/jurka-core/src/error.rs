use thiserror::Error;

use crate::identity::IdentityMatch;

/// Failures raised by the credential, identity and query layers.
///
/// Collaborator failures are wrapped transparently so callers see the
/// upstream message unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("No base URL configured. Run: jurka auth login")]
    NoBaseUrl,
    #[error("No token found for {base_url}. Run: jurka auth login")]
    NoToken { base_url: String },
    #[error("Invalid base URL '{0}': expected an absolute http(s) URL")]
    InvalidBaseUrl(String),
    #[error("No users found for '{0}'")]
    IdentityNotFound(String),
    #[error("Multiple users matched '{fragment}' ({} candidates)", .candidates.len())]
    AmbiguousIdentity {
        fragment: String,
        candidates: Vec<IdentityMatch>,
    },
    #[error("Invalid issue key '{0}': expected PROJECT-123")]
    InvalidIssueKey(String),
    #[error("Invalid query state: {0}")]
    InvalidQueryState(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Keyring error: {0}")]
    Keyring(String),
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Unable to resolve a config directory; set JURKA_CONFIG_HOME")]
    NoConfigDir,
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Tracker request failed: {0}")]
    Transport(String),
    #[error("Tracker request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Tracker response was malformed JSON: {0}")]
    Malformed(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
