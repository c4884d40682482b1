//! Token storage in the OS keyring, one entry per base URL.

use secrecy::{ExposeSecret, SecretString};

use crate::error::StoreError;

pub const KEYRING_SERVICE: &str = "jira-bearer";

/// Durable key/value store holding one token per normalized base URL.
pub trait SecretStore {
    fn get(&self, base_url: &str) -> Result<Option<SecretString>, StoreError>;
    fn set(&self, base_url: &str, token: &SecretString) -> Result<(), StoreError>;
    fn delete(&self, base_url: &str) -> Result<(), StoreError>;
}

/// Secret store backed by the platform keyring.
#[derive(Debug, Clone)]
pub struct KeyringSecretStore {
    service_name: String,
}

impl Default for KeyringSecretStore {
    fn default() -> Self {
        Self::new(KEYRING_SERVICE)
    }
}

impl KeyringSecretStore {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn entry(&self, base_url: &str) -> Result<keyring::Entry, StoreError> {
        keyring::Entry::new(&self.service_name, base_url)
            .map_err(|error| StoreError::Keyring(error.to_string()))
    }
}

impl SecretStore for KeyringSecretStore {
    fn get(&self, base_url: &str) -> Result<Option<SecretString>, StoreError> {
        match self.entry(base_url)?.get_password() {
            Ok(token) => Ok(Some(SecretString::from(token))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(StoreError::Keyring(error.to_string())),
        }
    }

    fn set(&self, base_url: &str, token: &SecretString) -> Result<(), StoreError> {
        self.entry(base_url)?
            .set_password(token.expose_secret())
            .map_err(|error| StoreError::Keyring(error.to_string()))
    }

    fn delete(&self, base_url: &str) -> Result<(), StoreError> {
        match self.entry(base_url)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(StoreError::Keyring(error.to_string())),
        }
    }
}
