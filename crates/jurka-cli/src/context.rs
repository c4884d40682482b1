use anyhow::{Context as _, Result};

use jurka_core::config::FileConfigStore;
use jurka_core::credentials::{BaseUrlSource, Credential, CredentialResolver, Environment};
use jurka_core::secrets::KeyringSecretStore;
use jurka_core::tracker::HttpTrackerClient;

/// Per-invocation overrides plus the stores they fall back to.
pub struct Context {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub config: FileConfigStore,
    pub secrets: KeyringSecretStore,
    env: Environment,
}

impl Context {
    pub fn new(base_url: Option<String>, token: Option<String>) -> Result<Self> {
        Ok(Self {
            base_url,
            token,
            config: FileConfigStore::from_env()?,
            secrets: KeyringSecretStore::default(),
            env: Environment::capture(),
        })
    }

    pub fn resolver(&self) -> CredentialResolver<'_> {
        CredentialResolver::new(&self.config, &self.secrets).with_env(self.env.clone())
    }

    pub fn credential(&self) -> Result<Credential> {
        Ok(self
            .resolver()
            .resolve(self.base_url.as_deref(), self.token.as_deref())?)
    }

    pub fn base_url(&self) -> Result<(String, BaseUrlSource)> {
        Ok(self.resolver().resolve_base_url(self.base_url.as_deref())?)
    }

    pub fn tracker(&self) -> Result<HttpTrackerClient> {
        HttpTrackerClient::new().context("create tracker client")
    }
}
