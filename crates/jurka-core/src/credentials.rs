//! Resolution of the (base URL, bearer token) pair used by every command.
//!
//! Base URL tiers, highest first: override argument, `JIRA_BASE_URL`, the
//! config store. Token tiers depend on where the base URL came from:
//!
//! - override token always wins;
//! - an override base URL consults the secret store under that URL before
//!   `JIRA_BEARER_TOKEN`, so a credential stays scoped to the URL it is sent to;
//! - any other base URL consults `JIRA_BEARER_TOKEN` before the secret store.

use std::fmt;

use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::config::ConfigStore;
use crate::error::{CoreError, CoreResult};
use crate::secrets::SecretStore;

pub const TOKEN_ENV: &str = "JIRA_BEARER_TOKEN";
pub const BASE_URL_ENV: &str = "JIRA_BASE_URL";

/// Trim whitespace and trailing slashes, then require an absolute http(s) URL.
pub fn normalize_base_url(raw: &str) -> CoreResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|_| CoreError::InvalidBaseUrl(raw.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(CoreError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

#[derive(Clone)]
pub struct Credential {
    base_url: String,
    token: SecretString,
}

impl fmt::Debug for Credential {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credential")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Credential {
    pub fn new(base_url: &str, token: SecretString) -> CoreResult<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseUrlSource {
    Override,
    Environment,
    ConfigStore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Override,
    Environment,
    SecretStore,
}

impl TokenSource {
    /// Token tiers to try, in order, for a base URL from `base_source`.
    pub fn order_for(base_source: BaseUrlSource) -> [TokenSource; 3] {
        match base_source {
            BaseUrlSource::Override => [Self::Override, Self::SecretStore, Self::Environment],
            BaseUrlSource::Environment | BaseUrlSource::ConfigStore => {
                [Self::Override, Self::Environment, Self::SecretStore]
            }
        }
    }
}

/// Snapshot of the two process-environment variables the resolver reads.
#[derive(Clone, Default)]
pub struct Environment {
    pub base_url: Option<String>,
    pub token: Option<SecretString>,
}

impl Environment {
    pub fn capture() -> Self {
        Self {
            base_url: non_empty_var(BASE_URL_ENV),
            token: non_empty_var(TOKEN_ENV).map(SecretString::from),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    pub credential: Credential,
    pub base_url_source: BaseUrlSource,
    pub token_source: TokenSource,
}

pub struct CredentialResolver<'a> {
    config: &'a dyn ConfigStore,
    secrets: &'a dyn SecretStore,
    env: Environment,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(config: &'a dyn ConfigStore, secrets: &'a dyn SecretStore) -> Self {
        Self {
            config,
            secrets,
            env: Environment::default(),
        }
    }

    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    pub fn resolve(
        &self,
        override_base_url: Option<&str>,
        override_token: Option<&str>,
    ) -> CoreResult<Credential> {
        self.resolve_with_sources(override_base_url, override_token)
            .map(|resolved| resolved.credential)
    }

    pub fn resolve_with_sources(
        &self,
        override_base_url: Option<&str>,
        override_token: Option<&str>,
    ) -> CoreResult<ResolvedCredential> {
        let (base_url, base_url_source) = self.resolve_base_url(override_base_url)?;
        for source in TokenSource::order_for(base_url_source) {
            let token = match source {
                TokenSource::Override => self.token_from_override(override_token),
                TokenSource::Environment => self.token_from_env(),
                TokenSource::SecretStore => self.token_from_store(&base_url)?,
            };
            if let Some(token) = token {
                debug!(
                    base_url = %base_url,
                    base_url_source = ?base_url_source,
                    token_source = ?source,
                    "resolved credential"
                );
                return Ok(ResolvedCredential {
                    credential: Credential { base_url, token },
                    base_url_source,
                    token_source: source,
                });
            }
        }
        Err(CoreError::NoToken { base_url })
    }

    /// Base URL alone, for flows that never send a token (logout, open without validation).
    pub fn resolve_base_url(
        &self,
        override_base_url: Option<&str>,
    ) -> CoreResult<(String, BaseUrlSource)> {
        for source in [
            BaseUrlSource::Override,
            BaseUrlSource::Environment,
            BaseUrlSource::ConfigStore,
        ] {
            let candidate = match source {
                BaseUrlSource::Override => non_empty(override_base_url).map(str::to_string),
                BaseUrlSource::Environment => self.base_url_from_env(),
                BaseUrlSource::ConfigStore => self.config.get()?,
            };
            if let Some(raw) = candidate {
                return Ok((normalize_base_url(&raw)?, source));
            }
        }
        Err(CoreError::NoBaseUrl)
    }

    fn base_url_from_env(&self) -> Option<String> {
        non_empty(self.env.base_url.as_deref()).map(str::to_string)
    }

    fn token_from_override(&self, override_token: Option<&str>) -> Option<SecretString> {
        non_empty(override_token).map(|token| SecretString::from(token.to_string()))
    }

    fn token_from_env(&self) -> Option<SecretString> {
        self.env
            .token
            .as_ref()
            .filter(|token| !token.expose_secret().trim().is_empty())
            .cloned()
    }

    fn token_from_store(&self, base_url: &str) -> CoreResult<Option<SecretString>> {
        Ok(self
            .secrets
            .get(base_url)?
            .filter(|token| !token.expose_secret().trim().is_empty()))
    }
}
